//! 直播间与信令消息

pub mod messages;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::PaginationInfo;

pub const MIN_PARTICIPANTS: i32 = 2;
pub const MAX_PARTICIPANTS: i32 = 500;

crate::models::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
    pub enum LiveRoomStatus {
        Active => "active",
        Ended => "ended",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub struct LiveRoom {
    /// UUID v4
    pub id: String,
    pub teacher_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: LiveRoomStatus,
    pub max_participants: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub ended_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl LiveRoom {
    pub fn is_active(&self) -> bool {
        self.status == LiveRoomStatus::Active
    }
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub struct LiveRoomSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub room: LiveRoom,
    pub teacher_name: String,
    pub participant_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub struct LiveRoomListResponse {
    pub items: Vec<LiveRoomSummary>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub struct CreateLiveRoomRequest {
    pub title: String,
    pub description: Option<String>,
    pub max_participants: Option<i32>,
}

/// 存储层新建直播间
#[derive(Debug, Clone)]
pub struct NewLiveRoom {
    pub id: String,
    pub teacher_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub max_participants: i32,
}

/// 加入直播间的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined,
    AlreadyJoined,
    NotFound,
    Ended,
    Full,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub struct IceServer {
    pub urls: Vec<String>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/live.ts")]
pub struct IceServersResponse {
    pub ice_servers: Vec<IceServer>,
}

/// 信令 WebSocket 握手参数
#[derive(Debug, Deserialize)]
pub struct LiveSocketQuery {
    pub token: String,
    pub room_id: String,
}
