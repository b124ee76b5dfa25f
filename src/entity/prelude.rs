//! 预导入模块

pub use super::assignments::Entity as Assignments;
pub use super::backup_records::Entity as BackupRecords;
pub use super::categories::Entity as Categories;
pub use super::course_categories::Entity as CourseCategories;
pub use super::course_follows::Entity as CourseFollows;
pub use super::courses::Entity as Courses;
pub use super::enrollments::Entity as Enrollments;
pub use super::favorite_courses::Entity as FavoriteCourses;
pub use super::follows::Entity as Follows;
pub use super::lesson_progress::Entity as LessonProgress;
pub use super::lessons::Entity as Lessons;
pub use super::live_room_participants::Entity as LiveRoomParticipants;
pub use super::live_rooms::Entity as LiveRooms;
pub use super::notifications::Entity as Notifications;
pub use super::payments::Entity as Payments;
pub use super::questions::Entity as Questions;
pub use super::quiz_results::Entity as QuizResults;
pub use super::quizzes::Entity as Quizzes;
pub use super::submissions::Entity as Submissions;
pub use super::system_settings::Entity as SystemSettings;
pub use super::users::Entity as Users;
