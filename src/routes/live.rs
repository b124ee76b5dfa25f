use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::PaginationQuery;
use crate::models::live::{CreateLiveRoomRequest, LiveSocketQuery};
use crate::models::users::entities::UserRole;
use crate::services::LiveService;
use crate::utils::SafeRoomId;

static LIVE_SERVICE: Lazy<LiveService> = Lazy::new(LiveService::new_lazy);

pub async fn create_room(
    req: HttpRequest,
    body: web::Json<CreateLiveRoomRequest>,
) -> ActixResult<HttpResponse> {
    LIVE_SERVICE.create_room(body.into_inner(), &req).await
}

pub async fn active_rooms(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    LIVE_SERVICE.active_rooms(query.into_inner(), &req).await
}

pub async fn my_rooms(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    LIVE_SERVICE.my_rooms(query.into_inner(), &req).await
}

pub async fn get_room(req: HttpRequest, room_id: SafeRoomId) -> ActixResult<HttpResponse> {
    LIVE_SERVICE.get_room(&room_id.0, &req).await
}

pub async fn join_room(req: HttpRequest, room_id: SafeRoomId) -> ActixResult<HttpResponse> {
    LIVE_SERVICE.join_room(&room_id.0, &req).await
}

pub async fn leave_room(req: HttpRequest, room_id: SafeRoomId) -> ActixResult<HttpResponse> {
    LIVE_SERVICE.leave_room(&room_id.0, &req).await
}

pub async fn end_room(req: HttpRequest, room_id: SafeRoomId) -> ActixResult<HttpResponse> {
    LIVE_SERVICE.end_room(&room_id.0, &req).await
}

pub async fn ice_servers() -> ActixResult<HttpResponse> {
    Ok(LIVE_SERVICE.ice_servers())
}

pub async fn live_socket(
    req: HttpRequest,
    body: web::Payload,
    query: web::Query<LiveSocketQuery>,
) -> ActixResult<HttpResponse> {
    LIVE_SERVICE.connect(query.into_inner(), body, &req).await
}

// `/ws` 在 JWT 中间件之外，自行校验查询参数中的 token
pub fn configure_live_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/live")
            .route("/ws", web::get().to(live_socket))
            .service(
                web::scope("")
                    .wrap(middlewares::RequireJWT)
                    .route("/rooms", web::get().to(active_rooms))
                    .route("/ice-servers", web::get().to(ice_servers))
                    .route("/rooms/{room_id}", web::get().to(get_room))
                    .route("/rooms/{room_id}/join", web::post().to(join_room))
                    .route("/rooms/{room_id}/leave", web::post().to(leave_room))
                    .service(
                        web::scope("")
                            .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                            .route("/rooms", web::post().to(create_room))
                            .route("/my-rooms", web::get().to(my_rooms))
                            .route("/rooms/{room_id}/end", web::post().to(end_room)),
                    ),
            ),
    );
}
