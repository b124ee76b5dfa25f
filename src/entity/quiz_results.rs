//! 测验成绩实体

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "quiz_results")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    #[sea_orm(column_type = "Double")]
    pub score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
    pub taken_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::quizzes::Entity",
        from = "Column::QuizId",
        to = "super::quizzes::Column::Id",
        on_delete = "Cascade"
    )]
    Quiz,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::quizzes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Quiz.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_result(self) -> crate::models::courses::quiz::QuizResult {
        use chrono::{DateTime, Utc};

        crate::models::courses::quiz::QuizResult {
            id: self.id,
            quiz_id: self.quiz_id,
            user_id: self.user_id,
            score: self.score,
            correct_count: self.correct_count,
            total_questions: self.total_questions,
            taken_at: DateTime::<Utc>::from_timestamp(self.taken_at, 0).unwrap_or_default(),
        }
    }
}
