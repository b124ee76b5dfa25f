//! SeaORM 实体定义
//!
//! 与 models 模块中的业务实体分离：Storage 层读写这些实体，再转换为业务模型。

pub mod prelude;

pub mod assignments;
pub mod backup_records;
pub mod categories;
pub mod course_categories;
pub mod course_follows;
pub mod courses;
pub mod enrollments;
pub mod favorite_courses;
pub mod follows;
pub mod lesson_progress;
pub mod lessons;
pub mod live_room_participants;
pub mod live_rooms;
pub mod notifications;
pub mod payments;
pub mod questions;
pub mod quiz_results;
pub mod quizzes;
pub mod submissions;
pub mod system_settings;
pub mod users;
