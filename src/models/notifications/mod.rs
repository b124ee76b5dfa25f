//! 站内通知

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::common::{PaginationInfo, PaginationQuery};

pub const MAX_TITLE_CHARS: usize = 200;
pub const MAX_MESSAGE_CHARS: usize = 1000;

crate::models::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
    pub enum NotificationType {
        NewLesson => "new_lesson",
        NewQuiz => "new_quiz",
        NewCourse => "new_course",
        LiveStream => "live_stream",
        EnrollmentSuccess => "enrollment_success",
        PaymentUpdate => "payment_update",
        CourseReview => "course_review",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Option<i64>,
    pub link: Option<String>,
    pub is_read: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub read_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// 待写入的通知，构造时完成截断
#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: i64,
    pub title: String,
    pub message: String,
    pub notification_type: NotificationType,
    pub related_id: Option<i64>,
    pub link: Option<String>,
}

fn truncate_chars(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

impl NewNotification {
    pub fn new(
        user_id: i64,
        notification_type: NotificationType,
        title: &str,
        message: &str,
    ) -> Self {
        Self {
            user_id,
            title: truncate_chars(title, MAX_TITLE_CHARS),
            message: truncate_chars(message, MAX_MESSAGE_CHARS),
            notification_type,
            related_id: None,
            link: None,
        }
    }

    pub fn related(mut self, related_id: i64) -> Self {
        self.related_id = Some(related_id);
        self
    }

    pub fn link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct NotificationListParams {
    #[serde(flatten)]
    #[ts(flatten)]
    pub pagination: PaginationQuery,
    #[serde(default)]
    pub unread_only: bool,
}

/// 通知列表响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct NotificationListResponse {
    pub items: Vec<Notification>,
    pub pagination: PaginationInfo,
}

/// 未读通知数量响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

/// 标记全部已读响应
#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/notification.ts")]
pub struct MarkAllReadResponse {
    pub marked_count: i64,
}

/// 通知 WebSocket 握手参数
#[derive(Debug, Deserialize)]
pub struct NotificationSocketQuery {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncates_by_characters() {
        let title = "课".repeat(250);
        let message = "m".repeat(1200);
        let n = NewNotification::new(1, NotificationType::NewLesson, &title, &message);

        assert_eq!(n.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(n.message.len(), MAX_MESSAGE_CHARS);
    }

    #[test]
    fn test_short_values_unchanged() {
        let n = NewNotification::new(7, NotificationType::NewQuiz, "Quiz", "Try it")
            .related(3)
            .link("/learning/quizzes/3");
        assert_eq!(n.title, "Quiz");
        assert_eq!(n.related_id, Some(3));
        assert_eq!(n.link.as_deref(), Some("/learning/quizzes/3"));
    }

    #[test]
    fn test_notification_type_wire_names() {
        assert_eq!(NotificationType::EnrollmentSuccess.as_str(), "enrollment_success");
        assert_eq!(
            "course_review".parse::<NotificationType>(),
            Ok(NotificationType::CourseReview)
        );
    }
}
