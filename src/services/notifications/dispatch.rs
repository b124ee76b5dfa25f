//! 站内通知扇出
//!
//! 先批量落库，再通过通知 WebSocket 推送给在线用户。
//! 任何失败只记录日志，不影响触发它的业务操作。

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info};

use crate::errors::Result;
use crate::models::courses::entities::{Course, Lesson};
use crate::models::courses::quiz::Quiz;
use crate::models::live::LiveRoom;
use crate::models::notifications::{NewNotification, NotificationType};
use crate::models::payments::Payment;
use crate::services::websocket::ConnectionManager;
use crate::storage::Storage;

pub struct NotificationDispatcher;

/// 合并多组接收者，按首次出现的顺序去重，并排除 `exclude`
pub fn merge_recipients(groups: Vec<Vec<i64>>, exclude: Option<i64>) -> Vec<i64> {
    let mut seen = HashSet::new();
    groups
        .into_iter()
        .flatten()
        .filter(|id| Some(*id) != exclude && seen.insert(*id))
        .collect()
}

fn or_empty(result: Result<Vec<i64>>, what: &str) -> Vec<i64> {
    result.unwrap_or_else(|e| {
        error!("Failed to load {what} for notification fan-out: {e}");
        Vec::new()
    })
}

impl NotificationDispatcher {
    /// 写入并推送，返回成功写入的条数
    pub async fn deliver(storage: &Arc<dyn Storage>, items: Vec<NewNotification>) -> usize {
        if items.is_empty() {
            return 0;
        }
        match storage.create_notifications(items).await {
            Ok(created) => {
                let count = created.len();
                let manager = ConnectionManager::get();
                let pushed = created
                    .into_iter()
                    .filter(|n| manager.push_notification(n.clone()))
                    .count();
                debug!("Delivered {count} notifications, {pushed} pushed live");
                count
            }
            Err(e) => {
                error!("Failed to persist notifications: {e}");
                0
            }
        }
    }

    async fn fan_out<F>(storage: &Arc<dyn Storage>, recipients: Vec<i64>, build: F) -> usize
    where
        F: Fn(i64) -> NewNotification,
    {
        let items = recipients.into_iter().map(build).collect();
        Self::deliver(storage, items).await
    }

    /// 选课学生与教师粉丝
    pub async fn notify_new_lesson(
        storage: &Arc<dyn Storage>,
        course: &Course,
        lesson: &Lesson,
    ) -> usize {
        let enrolled = or_empty(
            storage.list_enrolled_student_ids(course.id).await,
            "enrolled students",
        );
        let followers = or_empty(storage.list_follower_ids(course.teacher_id).await, "followers");
        let recipients = merge_recipients(vec![enrolled, followers], Some(course.teacher_id));

        let title = format!("New lesson: {}", lesson.title);
        let message = format!("\"{}\" has a new lesson available.", course.title);
        let count = Self::fan_out(storage, recipients, |user_id| {
            NewNotification::new(user_id, NotificationType::NewLesson, &title, &message)
                .related(lesson.id)
                .link(format!("/learning/courses/{}", course.id))
        })
        .await;
        info!("New lesson {} announced to {count} users", lesson.id);
        count
    }

    /// 仅选课学生
    pub async fn notify_new_quiz(storage: &Arc<dyn Storage>, course: &Course, quiz: &Quiz) -> usize {
        let enrolled = or_empty(
            storage.list_enrolled_student_ids(course.id).await,
            "enrolled students",
        );
        let recipients = merge_recipients(vec![enrolled], Some(course.teacher_id));

        let title = format!("New quiz: {}", quiz.title);
        let message = format!("A new quiz was published in \"{}\".", course.title);
        Self::fan_out(storage, recipients, |user_id| {
            NewNotification::new(user_id, NotificationType::NewQuiz, &title, &message)
                .related(quiz.id)
                .link(format!("/learning/quizzes/{}", quiz.id))
        })
        .await
    }

    /// 课程上架后通知教师的粉丝
    pub async fn notify_new_course(storage: &Arc<dyn Storage>, course: &Course) -> usize {
        let followers = or_empty(storage.list_follower_ids(course.teacher_id).await, "followers");
        let recipients = merge_recipients(vec![followers], Some(course.teacher_id));

        let title = format!("New course: {}", course.title);
        let message = "A teacher you follow published a new course.".to_string();
        Self::fan_out(storage, recipients, |user_id| {
            NewNotification::new(user_id, NotificationType::NewCourse, &title, &message)
                .related(course.id)
                .link(format!("/courses/{}", course.id))
        })
        .await
    }

    /// 教师任一课程的学生与粉丝
    pub async fn notify_live_stream(storage: &Arc<dyn Storage>, room: &LiveRoom) -> usize {
        let students = or_empty(
            storage.list_teacher_student_ids(room.teacher_id).await,
            "teacher students",
        );
        let followers = or_empty(storage.list_follower_ids(room.teacher_id).await, "followers");
        let recipients = merge_recipients(vec![students, followers], Some(room.teacher_id));

        let title = format!("Live now: {}", room.title);
        let message = room
            .description
            .clone()
            .unwrap_or_else(|| "A live session has started.".to_string());
        Self::fan_out(storage, recipients, |user_id| {
            NewNotification::new(user_id, NotificationType::LiveStream, &title, &message)
                .link(format!("/live/{}", room.id))
        })
        .await
    }

    pub async fn notify_enrollment_success(
        storage: &Arc<dyn Storage>,
        user_id: i64,
        course: &Course,
    ) -> usize {
        let item = NewNotification::new(
            user_id,
            NotificationType::EnrollmentSuccess,
            &format!("Enrolled in {}", course.title),
            "You can start learning right away.",
        )
        .related(course.id)
        .link(format!("/learning/courses/{}", course.id));
        Self::deliver(storage, vec![item]).await
    }

    pub async fn notify_payment_update(
        storage: &Arc<dyn Storage>,
        payment: &Payment,
        message: &str,
    ) -> usize {
        let item = NewNotification::new(
            payment.user_id,
            NotificationType::PaymentUpdate,
            &format!("Payment #{} is now {}", payment.id, payment.status),
            message,
        )
        .related(payment.id)
        .link("/payments");
        Self::deliver(storage, vec![item]).await
    }

    /// 审核结果通知教师；`reason` 为空表示通过
    pub async fn notify_course_review(
        storage: &Arc<dyn Storage>,
        course: &Course,
        reason: Option<&str>,
    ) -> usize {
        let (title, message) = match reason {
            None => (
                format!("Course approved: {}", course.title),
                "Your course is now visible in the catalog.".to_string(),
            ),
            Some(reason) => (
                format!("Course rejected: {}", course.title),
                format!("Reason: {reason}"),
            ),
        };
        let item = NewNotification::new(
            course.teacher_id,
            NotificationType::CourseReview,
            &title,
            &message,
        )
        .related(course.id)
        .link(format!("/teacher/courses/{}", course.id));
        Self::deliver(storage, vec![item]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_dedups_in_order() {
        let merged = merge_recipients(vec![vec![5, 3, 5], vec![3, 9, 1]], None);
        assert_eq!(merged, vec![5, 3, 9, 1]);
    }

    #[test]
    fn test_merge_excludes_actor() {
        let merged = merge_recipients(vec![vec![1, 2], vec![2, 7]], Some(2));
        assert_eq!(merged, vec![1, 7]);
        assert!(merge_recipients(vec![], Some(1)).is_empty());
    }
}
