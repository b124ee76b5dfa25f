/*!
 * 通知推送 WebSocket
 *
 * ```text
 * ws://host/api/v1/ws?token=<access_token>
 * ```
 *
 * 服务端消息：
 * ```json
 * {"type": "connected", "user_id": 3, "unread_count": 2}
 * {"type": "notification", "payload": {"id": 12, "notification_type": "new_lesson", "title": "New lesson: Ownership", "message": "...", "related_id": 7, "link": "/learning/courses/3", "created_at": "2026-01-24T12:00:00Z"}}
 * {"type": "unread_count", "count": 0}
 * ```
 *
 * 客户端只需发送 `{"type": "ping"}`，服务端回 `{"type": "pong"}`。
 */

use std::time::Duration;

use actix_ws::Message;
use dashmap::DashMap;
use futures_util::StreamExt;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::models::notifications::Notification;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
/// 每个用户的待推送上限，超出后旧消息被丢弃，客户端可通过 REST 补齐
const USER_CHANNEL_CAPACITY: usize = 64;

static CONNECTION_MANAGER: Lazy<ConnectionManager> =
    Lazy::new(|| ConnectionManager::new(USER_CHANNEL_CAPACITY));

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    Connected { user_id: i64, unread_count: i64 },
    Notification { payload: NotificationPayload },
    UnreadCount { count: i64 },
    Ping,
    Pong,
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: i64,
    pub notification_type: String,
    pub title: String,
    pub message: String,
    pub related_id: Option<i64>,
    pub link: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Notification> for NotificationPayload {
    fn from(n: Notification) -> Self {
        Self {
            id: n.id,
            notification_type: n.notification_type.to_string(),
            title: n.title,
            message: n.message,
            related_id: n.related_id,
            link: n.link,
            created_at: n.created_at,
        }
    }
}

/// 用户 id 到广播通道；同一用户的多个标签页共享一个通道
pub struct ConnectionManager {
    capacity: usize,
    connections: DashMap<i64, broadcast::Sender<WsMessage>>,
}

impl ConnectionManager {
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            connections: DashMap::new(),
        }
    }

    pub fn get() -> &'static Self {
        &CONNECTION_MANAGER
    }

    pub fn register(&self, user_id: i64) -> broadcast::Receiver<WsMessage> {
        self.connections
            .entry(user_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 最后一个标签页断开后才移除
    pub fn unregister(&self, user_id: i64) {
        self.connections
            .remove_if(&user_id, |_, sender| sender.receiver_count() == 0);
    }

    fn send_to_user(&self, user_id: i64, message: WsMessage) -> bool {
        self.connections
            .get(&user_id)
            .is_some_and(|sender| sender.send(message).is_ok())
    }

    /// 用户不在线时返回 false，通知仍在库里
    pub fn push_notification(&self, notification: Notification) -> bool {
        let user_id = notification.user_id;
        self.send_to_user(
            user_id,
            WsMessage::Notification {
                payload: notification.into(),
            },
        )
    }

    /// 已读状态变化后同步给该用户的其他标签页
    pub fn push_unread_count(&self, user_id: i64, count: i64) -> bool {
        self.send_to_user(user_id, WsMessage::UnreadCount { count })
    }

    pub fn online_count(&self) -> usize {
        self.connections
            .iter()
            .filter(|entry| entry.receiver_count() > 0)
            .count()
    }

    pub fn is_online(&self, user_id: i64) -> bool {
        self.connections
            .get(&user_id)
            .is_some_and(|s| s.receiver_count() > 0)
    }
}

/// 客户端文本帧的应答；`None` 表示无需回复
fn reply_to(text: &str) -> Option<WsMessage> {
    match serde_json::from_str::<WsMessage>(text) {
        Ok(WsMessage::Ping) => Some(WsMessage::Pong),
        Ok(WsMessage::Pong) => None,
        Ok(other) => Some(WsMessage::Error {
            message: format!("Unexpected message from client: {other:?}"),
        }),
        Err(_) => Some(WsMessage::Error {
            message: "Malformed message".to_string(),
        }),
    }
}

async fn send(session: &mut actix_ws::Session, message: &WsMessage) -> bool {
    match serde_json::to_string(message) {
        Ok(json) => session.text(json).await.is_ok(),
        Err(e) => {
            warn!("Failed to encode socket message: {e}");
            true
        }
    }
}

pub struct WebSocketService;

impl WebSocketService {
    pub async fn handle_connection(
        user_id: i64,
        unread_count: i64,
        mut session: actix_ws::Session,
        mut stream: actix_ws::MessageStream,
    ) {
        let manager = ConnectionManager::get();
        let mut rx = manager.register(user_id);
        info!("Notification socket connected for user {user_id}");

        let mut open = send(
            &mut session,
            &WsMessage::Connected {
                user_id,
                unread_count,
            },
        )
        .await;
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);

        while open {
            tokio::select! {
                frame = stream.next() => match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(reply) = reply_to(&text) {
                            open = send(&mut session, &reply).await;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => open = session.pong(&data).await.is_ok(),
                    Some(Ok(Message::Close(_))) | None => open = false,
                    Some(Err(e)) => {
                        warn!("Notification socket error for user {user_id}: {e:?}");
                        open = false;
                    }
                    Some(Ok(other)) => debug!("Ignoring frame from user {user_id}: {other:?}"),
                },
                pushed = rx.recv() => match pushed {
                    Ok(message) => open = send(&mut session, &message).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Notification socket for user {user_id} skipped {n} messages");
                    }
                    Err(broadcast::error::RecvError::Closed) => open = false,
                },
                _ = heartbeat.tick() => open = session.ping(b"").await.is_ok(),
            }
        }

        let _ = session.close(None).await;
        drop(rx);
        manager.unregister(user_id);
        info!("Notification socket disconnected for user {user_id}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notifications::NotificationType;

    fn notification(user_id: i64) -> Notification {
        Notification {
            id: 1,
            user_id,
            title: "New quiz".into(),
            message: "Try it".into(),
            notification_type: NotificationType::NewQuiz,
            related_id: Some(4),
            link: None,
            is_read: false,
            created_at: chrono::Utc::now(),
            read_at: None,
        }
    }

    #[tokio::test]
    async fn test_push_reaches_every_tab() {
        let manager = ConnectionManager::new(8);
        let mut first = manager.register(42);
        let mut second = manager.register(42);

        assert!(manager.push_notification(notification(42)));
        for rx in [&mut first, &mut second] {
            match rx.recv().await.unwrap() {
                WsMessage::Notification { payload } => {
                    assert_eq!(payload.notification_type, "new_quiz");
                    assert_eq!(payload.related_id, Some(4));
                }
                other => panic!("unexpected {other:?}"),
            }
        }

        assert!(manager.push_unread_count(42, 0));
        assert!(matches!(
            first.recv().await.unwrap(),
            WsMessage::UnreadCount { count: 0 }
        ));

        assert!(!manager.push_notification(notification(7)));
    }

    #[test]
    fn test_unregister_keeps_live_receivers() {
        let manager = ConnectionManager::new(8);
        let first = manager.register(1);
        let second = manager.register(1);
        drop(first);
        manager.unregister(1);
        assert!(manager.is_online(1));
        assert_eq!(manager.online_count(), 1);

        drop(second);
        manager.unregister(1);
        assert!(!manager.is_online(1));
        assert_eq!(manager.online_count(), 0);
    }

    #[test]
    fn test_client_frames() {
        assert!(matches!(reply_to(r#"{"type":"ping"}"#), Some(WsMessage::Pong)));
        assert!(reply_to(r#"{"type":"pong"}"#).is_none());
        assert!(matches!(reply_to("not json"), Some(WsMessage::Error { .. })));
        assert!(matches!(
            reply_to(r#"{"type":"unread_count","count":3}"#),
            Some(WsMessage::Error { .. })
        ));

        let json = serde_json::to_value(WsMessage::Connected {
            user_id: 3,
            unread_count: 2,
        })
        .unwrap();
        assert_eq!(json["type"], "connected");
        assert_eq!(json["unread_count"], 2);
    }
}
