use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 直播间表，id 为 UUID 字符串
        manager
            .create_table(
                Table::create()
                    .table(LiveRooms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LiveRooms::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(LiveRooms::TeacherId).big_integer().not_null())
                    .col(ColumnDef::new(LiveRooms::Title).string().not_null())
                    .col(ColumnDef::new(LiveRooms::Description).text().null())
                    .col(ColumnDef::new(LiveRooms::Status).string().not_null())
                    .col(
                        ColumnDef::new(LiveRooms::MaxParticipants)
                            .integer()
                            .not_null()
                            .default(100),
                    )
                    .col(ColumnDef::new(LiveRooms::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(LiveRooms::EndedAt).big_integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(LiveRooms::Table, LiveRooms::TeacherId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // 直播间参与者表
        manager
            .create_table(
                Table::create()
                    .table(LiveRoomParticipants::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(LiveRoomParticipants::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(LiveRoomParticipants::RoomId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LiveRoomParticipants::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(LiveRoomParticipants::JoinedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LiveRoomParticipants::Table, LiveRoomParticipants::RoomId)
                            .to(LiveRooms::Table, LiveRooms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(LiveRoomParticipants::Table, LiveRoomParticipants::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_live_room_participants_pair")
                    .table(LiveRoomParticipants::Table)
                    .col(LiveRoomParticipants::RoomId)
                    .col(LiveRoomParticipants::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_live_rooms_status")
                    .table(LiveRooms::Table)
                    .col(LiveRooms::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(LiveRoomParticipants::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(LiveRooms::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum LiveRooms {
    #[sea_orm(iden = "live_rooms")]
    Table,
    Id,
    TeacherId,
    Title,
    Description,
    Status,
    MaxParticipants,
    CreatedAt,
    EndedAt,
}

#[derive(DeriveIden)]
enum LiveRoomParticipants {
    #[sea_orm(iden = "live_room_participants")]
    Table,
    Id,
    RoomId,
    UserId,
    JoinedAt,
}
