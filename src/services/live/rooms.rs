use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::{debug, info};

use super::LiveService;
use super::hub::{RoomEvent, RoomHub};
use crate::config::AppConfig;
use crate::models::common::pagination::DEFAULT_PAGE_SIZE;
use crate::models::live::messages::LiveWsMessage;
use crate::models::live::{
    CreateLiveRoomRequest, IceServer, IceServersResponse, JoinOutcome, LiveRoomStatus,
    MAX_PARTICIPANTS, MIN_PARTICIPANTS, NewLiveRoom,
};
use crate::models::users::entities::UserRole;
use crate::models::{ApiResponse, ErrorCode, PaginationQuery};
use crate::services::notifications::NotificationDispatcher;
use crate::services::{bad_request, conflict, current_user, forbidden, not_found, storage_error};

const MAX_ROOM_TITLE_CHARS: usize = 200;

pub async fn create_room(
    service: &LiveService,
    body: CreateLiveRoomRequest,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    if !user.role.can_teach() {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "Only teachers can start a live session",
        ));
    }

    let title = body.title.trim();
    if title.is_empty() || title.chars().count() > MAX_ROOM_TITLE_CHARS {
        return Ok(bad_request(
            ErrorCode::ValidationFailed,
            format!("Title must be 1-{MAX_ROOM_TITLE_CHARS} characters"),
        ));
    }
    let max_participants = body
        .max_participants
        .unwrap_or(AppConfig::get().live.max_participants);
    if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&max_participants) {
        return Ok(bad_request(
            ErrorCode::ValidationFailed,
            format!("max_participants must be between {MIN_PARTICIPANTS} and {MAX_PARTICIPANTS}"),
        ));
    }

    let storage = service.get_storage(request);
    let new_room = NewLiveRoom {
        id: uuid::Uuid::new_v4().to_string(),
        teacher_id: user.id,
        title: title.to_string(),
        description: body
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
        max_participants,
    };

    match storage.create_live_room(new_room).await {
        Ok(room) => {
            info!("Live room {} opened by user {}", room.id, user.id);
            NotificationDispatcher::notify_live_stream(&storage, &room).await;
            Ok(HttpResponse::Created().json(ApiResponse::success(room, "直播间已创建")))
        }
        Err(e) => Ok(storage_error(e, "创建直播间失败")),
    }
}

pub async fn active_rooms(
    service: &LiveService,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage
        .list_live_rooms(Some(LiveRoomStatus::Active), None, page, size)
        .await
    {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询直播间失败")),
    }
}

/// 教师自己的直播间，含已结束的
pub async fn my_rooms(
    service: &LiveService,
    query: PaginationQuery,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let (page, size) = query.normalized(DEFAULT_PAGE_SIZE);
    let storage = service.get_storage(request);

    match storage.list_live_rooms(None, Some(user.id), page, size).await {
        Ok(resp) => Ok(HttpResponse::Ok().json(ApiResponse::success(resp, "查询成功"))),
        Err(e) => Ok(storage_error(e, "查询直播间失败")),
    }
}

pub async fn get_room(
    service: &LiveService,
    room_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);

    match storage.get_live_room(room_id).await {
        Ok(Some(summary)) => Ok(HttpResponse::Ok().json(ApiResponse::success(summary, "查询成功"))),
        Ok(None) => Ok(not_found(ErrorCode::LiveRoomNotFound, "Live room not found")),
        Err(e) => Ok(storage_error(e, "查询直播间失败")),
    }
}

/// 重复加入视为成功
pub async fn join_room(
    service: &LiveService,
    room_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.join_live_room(room_id, user.id).await {
        Ok(JoinOutcome::Joined) => {
            info!("User {} joined live room {}", user.id, room_id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("已加入直播间")))
        }
        Ok(JoinOutcome::AlreadyJoined) => {
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("已在直播间中")))
        }
        Ok(JoinOutcome::NotFound) => Ok(not_found(ErrorCode::LiveRoomNotFound, "Live room not found")),
        Ok(JoinOutcome::Ended) => Ok(conflict(ErrorCode::LiveRoomEnded, "Live room has ended")),
        Ok(JoinOutcome::Full) => Ok(conflict(ErrorCode::LiveRoomFull, "Live room is full")),
        Err(e) => Ok(storage_error(e, "加入直播间失败")),
    }
}

pub async fn leave_room(
    service: &LiveService,
    room_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    match storage.leave_live_room(room_id, user.id).await {
        Ok(_) => {
            // 关闭该用户仍在线的信令连接
            let closed = RoomHub::get().publish(room_id, RoomEvent::left(room_id, user.id));
            debug!("User {} left live room {room_id}, {closed} sockets signalled", user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success_empty("已离开直播间")))
        }
        Err(e) => Ok(storage_error(e, "离开直播间失败")),
    }
}

/// 结束直播并通知所有在线连接
pub async fn end_room(
    service: &LiveService,
    room_id: &str,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let user = match current_user(request) {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };
    let storage = service.get_storage(request);

    let summary = match storage.get_live_room(room_id).await {
        Ok(Some(summary)) => summary,
        Ok(None) => return Ok(not_found(ErrorCode::LiveRoomNotFound, "Live room not found")),
        Err(e) => return Ok(storage_error(e, "查询直播间失败")),
    };
    if summary.room.teacher_id != user.id && user.role != UserRole::Admin {
        return Ok(forbidden(
            ErrorCode::Forbidden,
            "Only the host can end this live session",
        ));
    }
    if !summary.room.is_active() {
        return Ok(conflict(ErrorCode::LiveRoomEnded, "Live room has already ended"));
    }

    match storage.end_live_room(room_id).await {
        Ok(Some(room)) => {
            let reached = RoomHub::get().publish(
                room_id,
                RoomEvent::new(
                    user.id,
                    LiveWsMessage::RoomEnded {
                        room_id: room.id.clone(),
                    },
                ),
            );
            info!("Live room {} ended by user {}, {reached} sockets notified", room.id, user.id);
            Ok(HttpResponse::Ok().json(ApiResponse::success(room, "直播已结束")))
        }
        Ok(None) => Ok(not_found(ErrorCode::LiveRoomNotFound, "Live room not found")),
        Err(e) => Ok(storage_error(e, "结束直播失败")),
    }
}

pub fn ice_servers() -> HttpResponse {
    let ice_servers = AppConfig::get()
        .live
        .ice_servers
        .iter()
        .map(|url| IceServer {
            urls: vec![url.clone()],
        })
        .collect();
    HttpResponse::Ok().json(ApiResponse::success(
        IceServersResponse { ice_servers },
        "查询成功",
    ))
}
