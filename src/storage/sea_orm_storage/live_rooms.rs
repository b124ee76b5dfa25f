//! 直播间存储操作

use std::collections::HashMap;

use super::SeaOrmStorage;
use crate::entity::live_room_participants::{
    ActiveModel as ParticipantActiveModel, Column as ParticipantColumn,
    Entity as LiveRoomParticipants,
};
use crate::entity::live_rooms::{ActiveModel, Column, Entity as LiveRooms, Model as RoomModel};
use crate::errors::{LearnHubError, Result};
use crate::models::{
    PaginationInfo,
    live::{JoinOutcome, LiveRoom, LiveRoomListResponse, LiveRoomStatus, LiveRoomSummary, NewLiveRoom},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};

impl SeaOrmStorage {
    pub async fn create_live_room_impl(&self, room: NewLiveRoom) -> Result<LiveRoom> {
        let model = ActiveModel {
            id: Set(room.id),
            teacher_id: Set(room.teacher_id),
            title: Set(room.title),
            description: Set(room.description),
            status: Set(LiveRoomStatus::Active.to_string()),
            max_participants: Set(room.max_participants),
            created_at: Set(chrono::Utc::now().timestamp()),
            ended_at: Set(None),
        }
        .insert(&self.db)
        .await
        .map_err(|e| LearnHubError::from_db("创建直播间失败", e))?;

        Ok(model.into_room())
    }

    async fn participant_counts(&self, room_ids: Vec<String>) -> Result<HashMap<String, i64>> {
        if room_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let rows = LiveRoomParticipants::find()
            .select_only()
            .column(ParticipantColumn::RoomId)
            .column_as(ParticipantColumn::Id.count(), "participant_count")
            .filter(ParticipantColumn::RoomId.is_in(room_ids))
            .group_by(ParticipantColumn::RoomId)
            .into_tuple::<(String, i64)>()
            .all(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计直播参与者失败: {e}")))?;

        Ok(rows.into_iter().collect())
    }

    async fn summarize_rooms(&self, rooms: Vec<RoomModel>) -> Result<Vec<LiveRoomSummary>> {
        let teachers = self
            .user_summaries(rooms.iter().map(|r| r.teacher_id).collect())
            .await?;
        let counts = self
            .participant_counts(rooms.iter().map(|r| r.id.clone()).collect())
            .await?;

        Ok(rooms
            .into_iter()
            .map(|m| {
                let participant_count = counts.get(&m.id).copied().unwrap_or(0);
                let teacher_name = teachers
                    .get(&m.teacher_id)
                    .map(|t| t.full_name.clone())
                    .unwrap_or_default();
                LiveRoomSummary {
                    room: m.into_room(),
                    teacher_name,
                    participant_count,
                }
            })
            .collect())
    }

    pub async fn get_live_room_impl(&self, id: &str) -> Result<Option<LiveRoomSummary>> {
        let Some(room) = LiveRooms::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询直播间失败: {e}")))?
        else {
            return Ok(None);
        };

        Ok(self.summarize_rooms(vec![room]).await?.pop())
    }

    pub async fn list_live_rooms_impl(
        &self,
        status: Option<LiveRoomStatus>,
        teacher_id: Option<i64>,
        page: u64,
        size: u64,
    ) -> Result<LiveRoomListResponse> {
        let page = page.max(1);
        let size = size.clamp(1, 100);

        let mut select = LiveRooms::find();
        if let Some(status) = status {
            select = select.filter(Column::Status.eq(status.to_string()));
        }
        if let Some(teacher_id) = teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }

        let paginator = select
            .order_by_desc(Column::CreatedAt)
            .order_by_asc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询直播间总数失败: {e}")))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询直播间页数失败: {e}")))?;
        let rooms = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询直播间列表失败: {e}")))?;

        Ok(LiveRoomListResponse {
            items: self.summarize_rooms(rooms).await?,
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 加入直播间；房主不占名额，也不写参与者记录
    pub async fn join_live_room_impl(&self, room_id: &str, user_id: i64) -> Result<JoinOutcome> {
        let room_id = room_id.to_string();

        self.db
            .transaction::<_, JoinOutcome, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(room) = LiveRooms::find_by_id(room_id.clone()).one(txn).await? else {
                        return Ok(JoinOutcome::NotFound);
                    };
                    if room.status != LiveRoomStatus::Active.to_string() {
                        return Ok(JoinOutcome::Ended);
                    }
                    if room.teacher_id == user_id {
                        return Ok(JoinOutcome::AlreadyJoined);
                    }

                    let joined = LiveRoomParticipants::find()
                        .filter(ParticipantColumn::RoomId.eq(room_id.clone()))
                        .filter(ParticipantColumn::UserId.eq(user_id))
                        .count(txn)
                        .await?;
                    if joined > 0 {
                        return Ok(JoinOutcome::AlreadyJoined);
                    }

                    let current = LiveRoomParticipants::find()
                        .filter(ParticipantColumn::RoomId.eq(room_id.clone()))
                        .filter(ParticipantColumn::UserId.ne(room.teacher_id))
                        .count(txn)
                        .await?;
                    if current >= room.max_participants.max(0) as u64 {
                        return Ok(JoinOutcome::Full);
                    }

                    ParticipantActiveModel {
                        room_id: Set(room_id),
                        user_id: Set(user_id),
                        joined_at: Set(chrono::Utc::now().timestamp()),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    Ok(JoinOutcome::Joined)
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("加入直播间失败: {e}")))
    }

    pub async fn leave_live_room_impl(&self, room_id: &str, user_id: i64) -> Result<bool> {
        let result = LiveRoomParticipants::delete_many()
            .filter(ParticipantColumn::RoomId.eq(room_id))
            .filter(ParticipantColumn::UserId.eq(user_id))
            .exec(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("离开直播间失败: {e}")))?;

        Ok(result.rows_affected > 0)
    }

    pub async fn is_live_participant_impl(&self, room_id: &str, user_id: i64) -> Result<bool> {
        let count = LiveRoomParticipants::find()
            .filter(ParticipantColumn::RoomId.eq(room_id))
            .filter(ParticipantColumn::UserId.eq(user_id))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("查询直播参与者失败: {e}")))?;

        Ok(count > 0)
    }

    /// 结束直播并清空参与者
    pub async fn end_live_room_impl(&self, room_id: &str) -> Result<Option<LiveRoom>> {
        let room_id = room_id.to_string();

        let ended = self
            .db
            .transaction::<_, Option<RoomModel>, DbErr>(|txn| {
                Box::pin(async move {
                    let Some(room) = LiveRooms::find_by_id(room_id.clone()).one(txn).await? else {
                        return Ok(None);
                    };

                    let mut active: ActiveModel = room.into();
                    active.status = Set(LiveRoomStatus::Ended.to_string());
                    active.ended_at = Set(Some(chrono::Utc::now().timestamp()));
                    let saved = active.update(txn).await?;

                    LiveRoomParticipants::delete_many()
                        .filter(ParticipantColumn::RoomId.eq(room_id))
                        .exec(txn)
                        .await?;

                    Ok(Some(saved))
                })
            })
            .await
            .map_err(|e| LearnHubError::database_operation(format!("结束直播失败: {e}")))?;

        Ok(ended.map(|m| m.into_room()))
    }

    pub async fn count_active_live_rooms_impl(&self) -> Result<i64> {
        let count = LiveRooms::find()
            .filter(Column::Status.eq(LiveRoomStatus::Active.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| LearnHubError::database_operation(format!("统计直播间失败: {e}")))?;

        Ok(count as i64)
    }
}
