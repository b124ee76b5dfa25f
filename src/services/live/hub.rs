//! 直播间内存广播
//!
//! 每个房间一个 broadcast 通道，所有连接订阅同一通道后按投递规则各自过滤。

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::AppConfig;
use crate::models::live::messages::LiveWsMessage;

static ROOM_HUB: Lazy<RoomHub> = Lazy::new(|| RoomHub::new(AppConfig::get().live.channel_capacity));

/// 房间内的一条消息，`sender` 由服务端写入
#[derive(Debug, Clone)]
pub struct RoomEvent {
    pub sender: i64,
    pub to: Option<i64>,
    pub message: LiveWsMessage,
}

impl RoomEvent {
    pub fn new(sender: i64, message: LiveWsMessage) -> Self {
        let to = match &message {
            LiveWsMessage::Offer(p)
            | LiveWsMessage::Answer(p)
            | LiveWsMessage::IceCandidate(p)
            | LiveWsMessage::Join(p)
            | LiveWsMessage::Leave(p) => p.to,
            _ => None,
        };
        Self {
            sender,
            to,
            message,
        }
    }

    /// 只发给离开者本人，其所有连接收到后关闭
    pub fn left(room_id: &str, user_id: i64) -> Self {
        Self {
            sender: user_id,
            to: Some(user_id),
            message: LiveWsMessage::Left {
                room_id: room_id.to_string(),
            },
        }
    }

    /// 投递后应关闭连接
    pub fn closes_session(&self) -> bool {
        matches!(
            self.message,
            LiveWsMessage::RoomEnded { .. } | LiveWsMessage::Left { .. }
        )
    }

    /// 指定了 `to` 只投递给对方；聊天与结束通知发给所有人（含发送者）；其余不回显
    pub fn is_for(&self, user_id: i64) -> bool {
        if let Some(to) = self.to {
            return to == user_id;
        }
        match self.message {
            LiveWsMessage::Chat(_) | LiveWsMessage::RoomEnded { .. } => true,
            _ => self.sender != user_id,
        }
    }
}

pub struct RoomHub {
    rooms: DashMap<String, broadcast::Sender<RoomEvent>>,
    capacity: usize,
}

impl RoomHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn get() -> &'static Self {
        &ROOM_HUB
    }

    pub fn subscribe(&self, room_id: &str) -> broadcast::Receiver<RoomEvent> {
        self.rooms
            .entry(room_id.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// 返回收到消息的连接数；房间无人在线时为 0
    pub fn publish(&self, room_id: &str, event: RoomEvent) -> usize {
        match self.rooms.get(room_id) {
            Some(sender) => sender.send(event).unwrap_or(0),
            None => 0,
        }
    }

    /// 最后一个连接断开后移除通道
    pub fn release(&self, room_id: &str) {
        if self
            .rooms
            .remove_if(room_id, |_, sender| sender.receiver_count() == 0)
            .is_some()
        {
            debug!("Live room channel {} released", room_id);
        }
    }

    pub fn connection_count(&self, room_id: &str) -> usize {
        self.rooms
            .get(room_id)
            .map_or(0, |sender| sender.receiver_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::live::messages::{ChatPayload, SignalPayload};

    fn offer(to: Option<i64>) -> LiveWsMessage {
        LiveWsMessage::Offer(SignalPayload {
            room_id: "room".into(),
            from: Some(1),
            to,
            data: serde_json::json!({"sdp": "v=0"}),
        })
    }

    #[test]
    fn test_directed_signal_reaches_only_target() {
        let event = RoomEvent::new(1, offer(Some(3)));
        assert!(event.is_for(3));
        assert!(!event.is_for(2));
        assert!(!event.is_for(1));
    }

    #[test]
    fn test_broadcast_signal_skips_sender() {
        let event = RoomEvent::new(1, offer(None));
        assert!(event.is_for(2));
        assert!(!event.is_for(1));
    }

    #[test]
    fn test_chat_echoes_to_sender() {
        let chat = LiveWsMessage::Chat(ChatPayload {
            room_id: "room".into(),
            from: Some(1),
            from_name: Some("Ada".into()),
            text: "hello".into(),
            sent_at: None,
        });
        let event = RoomEvent::new(1, chat);
        assert!(event.is_for(1));
        assert!(event.is_for(5));
    }

    #[test]
    fn test_left_targets_only_leaver() {
        let event = RoomEvent::left("room", 4);
        assert!(event.is_for(4));
        assert!(!event.is_for(1));
        assert!(event.closes_session());

        let ended = RoomEvent::new(
            1,
            LiveWsMessage::RoomEnded {
                room_id: "room".into(),
            },
        );
        assert!(ended.is_for(4) && ended.closes_session());
        assert!(!RoomEvent::new(1, offer(None)).closes_session());
    }

    #[tokio::test]
    async fn test_left_delivered_to_every_socket_of_leaver() {
        let hub = RoomHub::new(8);
        let mut first_tab = hub.subscribe("r");
        let mut second_tab = hub.subscribe("r");
        assert_eq!(hub.publish("r", RoomEvent::left("r", 9)), 2);

        for rx in [&mut first_tab, &mut second_tab] {
            let event = rx.recv().await.unwrap();
            assert!(event.is_for(9));
            assert_eq!(
                event.message,
                LiveWsMessage::Left {
                    room_id: "r".into()
                }
            );
        }
    }

    #[tokio::test]
    async fn test_publish_and_release() {
        let hub = RoomHub::new(8);
        assert_eq!(hub.publish("r", RoomEvent::new(1, LiveWsMessage::Ping)), 0);

        let mut rx = hub.subscribe("r");
        assert_eq!(hub.connection_count("r"), 1);
        assert_eq!(hub.publish("r", RoomEvent::new(1, offer(None))), 1);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.sender, 1);

        drop(rx);
        hub.release("r");
        assert_eq!(hub.connection_count("r"), 0);
    }
}
