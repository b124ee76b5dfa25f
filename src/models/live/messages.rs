use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub const MAX_CHAT_CHARS: usize = 2000;

/// 信令负载；`data` 原样转发，服务端不解析
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub struct SignalPayload {
    pub room_id: String,
    /// 由服务端填写，客户端传入的值会被覆盖
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<i64>,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub struct ChatPayload {
    pub room_id: String,
    #[serde(default)]
    pub from: Option<i64>,
    #[serde(default)]
    pub from_name: Option<String>,
    pub text: String,
    #[serde(default)]
    pub sent_at: Option<i64>,
}

/// 直播 WebSocket 消息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub enum LiveWsMessage {
    Offer(SignalPayload),
    Answer(SignalPayload),
    IceCandidate(SignalPayload),
    Join(SignalPayload),
    Leave(SignalPayload),
    Chat(ChatPayload),
    RoomEnded { room_id: String },
    /// 用户已通过 REST 离开房间，其连接随后关闭
    Left { room_id: String },
    Connected { user_id: i64, room_id: String },
    Ping,
    Pong,
    Error { message: String },
}

impl LiveWsMessage {
    /// 客户端声明的房间 ID
    pub fn room_id(&self) -> Option<&str> {
        match self {
            LiveWsMessage::Offer(p)
            | LiveWsMessage::Answer(p)
            | LiveWsMessage::IceCandidate(p)
            | LiveWsMessage::Join(p)
            | LiveWsMessage::Leave(p) => Some(&p.room_id),
            LiveWsMessage::Chat(c) => Some(&c.room_id),
            LiveWsMessage::RoomEnded { room_id }
            | LiveWsMessage::Left { room_id }
            | LiveWsMessage::Connected { room_id, .. } => {
                Some(room_id)
            }
            _ => None,
        }
    }

    pub fn presence(join: bool, room_id: &str, user_id: i64, name: &str) -> Self {
        let payload = SignalPayload {
            room_id: room_id.to_string(),
            from: Some(user_id),
            to: None,
            data: serde_json::json!({ "name": name }),
        };
        if join {
            LiveWsMessage::Join(payload)
        } else {
            LiveWsMessage::Leave(payload)
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        LiveWsMessage::Error {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ice_candidate_keeps_data_opaque() {
        let raw = r#"{"type":"ice-candidate","room_id":"r1","to":7,"from":99,"data":{"candidate":"candidate:1 1 UDP 2122 192.0.2.1 5000 typ host","sdpMid":"0"}}"#;
        let msg: LiveWsMessage = serde_json::from_str(raw).unwrap();

        match msg {
            LiveWsMessage::IceCandidate(p) => {
                assert_eq!(p.room_id, "r1");
                assert_eq!(p.to, Some(7));
                assert_eq!(p.data["sdpMid"], "0");
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[test]
    fn test_room_ended_wire_name() {
        let json = serde_json::to_value(LiveWsMessage::RoomEnded {
            room_id: "abc".into(),
        })
        .unwrap();
        assert_eq!(json["type"], "room-ended");
        assert_eq!(json["room_id"], "abc");
    }

    #[test]
    fn test_ping_and_unknown_type() {
        assert_eq!(
            serde_json::from_str::<LiveWsMessage>(r#"{"type":"ping"}"#).unwrap(),
            LiveWsMessage::Ping
        );
        assert!(serde_json::from_str::<LiveWsMessage>(r#"{"type":"hangup"}"#).is_err());
    }
}
