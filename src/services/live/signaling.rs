//! 直播信令与聊天 WebSocket
//!
//! `GET /api/v1/live/ws?token=<access_token>&room_id=<uuid>`
//!
//! SDP / ICE 的 `data` 字段原样转发，服务端只负责填写 `from` 并按 `to` 路由。

use std::time::Duration;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use actix_ws::Message;
use futures_util::StreamExt;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::LiveService;
use super::hub::{RoomEvent, RoomHub};
use crate::models::ErrorCode;
use crate::models::live::LiveSocketQuery;
use crate::models::live::messages::{LiveWsMessage, MAX_CHAT_CHARS};
use crate::models::users::entities::User;
use crate::services::{forbidden, not_found, socket_user, storage_error};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

pub async fn connect(
    service: &LiveService,
    query: LiveSocketQuery,
    body: web::Payload,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request);
    let cache = service.get_cache(request);

    let user = match socket_user(&query.token, &storage, &cache).await {
        Ok(user) => user,
        Err(resp) => return Ok(resp),
    };

    let room = match storage.get_live_room(&query.room_id).await {
        Ok(Some(summary)) if summary.room.is_active() => summary.room,
        Ok(_) => return Ok(not_found(ErrorCode::LiveRoomNotFound, "No active live room with this id")),
        Err(e) => return Ok(storage_error(e, "查询直播间失败")),
    };

    if room.teacher_id != user.id {
        match storage.is_live_participant(&room.id, user.id).await {
            Ok(true) => {}
            Ok(false) => {
                return Ok(forbidden(
                    ErrorCode::Forbidden,
                    "Join the live room before connecting",
                ));
            }
            Err(e) => return Ok(storage_error(e, "查询直播参与者失败")),
        }
    }

    let (response, session, stream) = actix_ws::handle(request, body)?;
    actix_web::rt::spawn(run_session(room.id, user, session, stream));
    Ok(response)
}

/// 填写服务端字段；房间不符时返回错误提示
fn stamp(message: LiveWsMessage, room_id: &str, user: &User) -> Result<LiveWsMessage, String> {
    if let Some(claimed) = message.room_id()
        && claimed != room_id
    {
        return Err(format!("This socket is bound to room {room_id}"));
    }

    match message {
        LiveWsMessage::Offer(mut p) => {
            p.from = Some(user.id);
            Ok(LiveWsMessage::Offer(p))
        }
        LiveWsMessage::Answer(mut p) => {
            p.from = Some(user.id);
            Ok(LiveWsMessage::Answer(p))
        }
        LiveWsMessage::IceCandidate(mut p) => {
            p.from = Some(user.id);
            Ok(LiveWsMessage::IceCandidate(p))
        }
        LiveWsMessage::Join(mut p) => {
            p.from = Some(user.id);
            Ok(LiveWsMessage::Join(p))
        }
        LiveWsMessage::Leave(mut p) => {
            p.from = Some(user.id);
            Ok(LiveWsMessage::Leave(p))
        }
        LiveWsMessage::Chat(mut c) => {
            let text = c.text.trim();
            if text.is_empty() || text.chars().count() > MAX_CHAT_CHARS {
                return Err(format!("Chat text must be 1-{MAX_CHAT_CHARS} characters"));
            }
            c.text = text.to_string();
            c.from = Some(user.id);
            c.from_name = Some(user.full_name.clone());
            c.sent_at = Some(chrono::Utc::now().timestamp());
            Ok(LiveWsMessage::Chat(c))
        }
        other => Err(format!(
            "Unsupported message type: {}",
            serde_json::to_value(&other)
                .ok()
                .and_then(|v| v["type"].as_str().map(str::to_string))
                .unwrap_or_default()
        )),
    }
}

async fn send(session: &mut actix_ws::Session, message: &LiveWsMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => session.text(json).await.is_ok(),
        Err(_) => true,
    }
}

async fn run_session(
    room_id: String,
    user: User,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    let hub = RoomHub::get();
    let mut rx = hub.subscribe(&room_id);
    info!("User {} connected to live room {}", user.id, room_id);

    send(
        &mut session,
        &LiveWsMessage::Connected {
            user_id: user.id,
            room_id: room_id.clone(),
        },
    )
    .await;
    hub.publish(
        &room_id,
        RoomEvent::new(
            user.id,
            LiveWsMessage::presence(true, &room_id, user.id, &user.full_name),
        ),
    );

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);

    loop {
        tokio::select! {
            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match serde_json::from_str::<LiveWsMessage>(&text) {
                            Ok(LiveWsMessage::Ping) => {
                                if !send(&mut session, &LiveWsMessage::Pong).await {
                                    break;
                                }
                            }
                            Ok(message) => match stamp(message, &room_id, &user) {
                                Ok(stamped) => {
                                    hub.publish(&room_id, RoomEvent::new(user.id, stamped));
                                }
                                Err(reason) => {
                                    if !send(&mut session, &LiveWsMessage::error(reason)).await {
                                        break;
                                    }
                                }
                            },
                            Err(e) => {
                                debug!("Unparseable live message from user {}: {}", user.id, e);
                                if !send(&mut session, &LiveWsMessage::error("Malformed message")).await {
                                    break;
                                }
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if session.pong(&data).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!("Live socket error for user {} in room {}: {:?}", user.id, room_id, e);
                        break;
                    }
                    _ => {}
                }
            }

            event = rx.recv() => {
                match event {
                    Ok(event) if event.is_for(user.id) => {
                        if !send(&mut session, &event.message).await || event.closes_session() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Live socket for user {} in room {} lagged by {} messages", user.id, room_id, n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }

            _ = heartbeat.tick() => {
                if session.ping(b"").await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = session.close(None).await;
    hub.publish(
        &room_id,
        RoomEvent::new(
            user.id,
            LiveWsMessage::presence(false, &room_id, user.id, &user.full_name),
        ),
    );
    drop(rx);
    hub.release(&room_id);
    info!("User {} disconnected from live room {}", user.id, room_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::live::messages::{ChatPayload, SignalPayload};
    use crate::models::users::entities::{UserRole, UserStatus};

    fn user() -> User {
        User {
            id: 7,
            username: "grace".into(),
            email: "grace@example.com".into(),
            password_hash: String::new(),
            full_name: "Grace Hopper".into(),
            avatar_url: None,
            role: UserRole::User,
            status: UserStatus::Active,
            last_login: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_stamp_overrides_client_from() {
        let msg = LiveWsMessage::Answer(SignalPayload {
            room_id: "r1".into(),
            from: Some(999),
            to: Some(3),
            data: serde_json::json!({"sdp": "v=0"}),
        });
        match stamp(msg, "r1", &user()).unwrap() {
            LiveWsMessage::Answer(p) => {
                assert_eq!(p.from, Some(7));
                assert_eq!(p.to, Some(3));
                assert_eq!(p.data["sdp"], "v=0");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_stamp_rejects_other_room() {
        let msg = LiveWsMessage::Offer(SignalPayload {
            room_id: "r2".into(),
            from: None,
            to: None,
            data: serde_json::Value::Null,
        });
        assert!(stamp(msg, "r1", &user()).is_err());
    }

    #[test]
    fn test_chat_stamped_and_limited() {
        let chat = |text: String| {
            LiveWsMessage::Chat(ChatPayload {
                room_id: "r1".into(),
                from: None,
                from_name: Some("spoofed".into()),
                text,
                sent_at: None,
            })
        };
        match stamp(chat(" hi ".into()), "r1", &user()).unwrap() {
            LiveWsMessage::Chat(c) => {
                assert_eq!(c.text, "hi");
                assert_eq!(c.from_name.as_deref(), Some("Grace Hopper"));
                assert!(c.sent_at.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(stamp(chat("x".repeat(MAX_CHAT_CHARS + 1)), "r1", &user()).is_err());
    }

    #[test]
    fn test_server_only_types_refused() {
        let msg = LiveWsMessage::RoomEnded {
            room_id: "r1".into(),
        };
        assert!(stamp(msg, "r1", &user()).is_err());
        let left = LiveWsMessage::Left {
            room_id: "r1".into(),
        };
        assert!(stamp(left, "r1", &user()).is_err());
    }
}
