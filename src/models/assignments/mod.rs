//! 课程作业、提交与评分

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::courses::requests::clean_title;
use crate::models::users::entities::UserSummary;

/// 评分上限，0..=10
pub const MAX_GRADE: f64 = 10.0;
pub const MAX_SUBMISSION_CHARS: usize = 20_000;
pub const MAX_FEEDBACK_CHARS: usize = 2_000;

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Assignment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub description: String,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Assignment {
    pub fn is_past_due(&self, now: chrono::DateTime<chrono::Utc>) -> bool {
        self.due_at.is_some_and(|due| now > due)
    }
}

/// 一次提交；重复提交生成新版本，旧版本保留
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct Submission {
    pub id: i64,
    pub assignment_id: i64,
    pub user_id: i64,
    pub version: i32,
    pub content: String,
    pub is_late: bool,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
    pub grade: Option<f64>,
    pub feedback: Option<String>,
    pub graded_by: Option<i64>,
    pub graded_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct CreateAssignmentRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CreateAssignmentRequest {
    pub fn into_new(self) -> Result<NewAssignment, String> {
        Ok(NewAssignment {
            title: clean_title(&self.title)?,
            description: self.description.trim().to_string(),
            due_at: self.due_at.map(|d| d.timestamp()),
        })
    }
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct UpdateAssignmentRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<chrono::DateTime<chrono::Utc>>,
    /// 为 true 时取消截止时间，忽略 due_at
    #[serde(default)]
    pub clear_due_at: bool,
}

impl UpdateAssignmentRequest {
    pub fn into_update(self) -> Result<AssignmentUpdate, String> {
        let title = match self.title {
            Some(title) => Some(clean_title(&title)?),
            None => None,
        };
        let due_at = if self.clear_due_at {
            Some(None)
        } else {
            self.due_at.map(|d| Some(d.timestamp()))
        };
        Ok(AssignmentUpdate {
            title,
            description: self.description.map(|d| d.trim().to_string()),
            due_at,
        })
    }
}

/// 存储层入参，时间为 Unix 秒
#[derive(Debug, Clone)]
pub struct NewAssignment {
    pub title: String,
    pub description: String,
    pub due_at: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_at: Option<Option<i64>>,
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct SubmitAssignmentRequest {
    pub content: String,
}

impl SubmitAssignmentRequest {
    pub fn clean_content(&self) -> Result<String, String> {
        let content = self.content.trim();
        if content.is_empty() {
            return Err("Submission content is required".to_string());
        }
        if content.chars().count() > MAX_SUBMISSION_CHARS {
            return Err(format!(
                "Submission must be at most {MAX_SUBMISSION_CHARS} characters"
            ));
        }
        Ok(content.to_string())
    }
}

#[derive(Debug, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct GradeSubmissionRequest {
    pub grade: f64,
    pub feedback: Option<String>,
}

impl GradeSubmissionRequest {
    /// 返回 (分数, 评语)，分数保留两位小数
    pub fn validate(&self) -> Result<(f64, Option<String>), String> {
        if !self.grade.is_finite() || !(0.0..=MAX_GRADE).contains(&self.grade) {
            return Err(format!("Grade must be between 0 and {MAX_GRADE}"));
        }
        let feedback = self
            .feedback
            .as_deref()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        if feedback
            .as_ref()
            .is_some_and(|f| f.chars().count() > MAX_FEEDBACK_CHARS)
        {
            return Err(format!(
                "Feedback must be at most {MAX_FEEDBACK_CHARS} characters"
            ));
        }
        Ok(((self.grade * 100.0).round() / 100.0, feedback))
    }
}

/// 教师端列表项
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: Assignment,
    /// 提交过的学生数
    pub submitter_count: i64,
    /// 最新版本已评分的学生数
    pub graded_count: i64,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct AssignmentListResponse {
    pub items: Vec<AssignmentSummary>,
}

/// 学生端：作业及自己的最新提交
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct MyAssignmentItem {
    #[serde(flatten)]
    #[ts(flatten)]
    pub assignment: Assignment,
    pub latest_submission: Option<Submission>,
}

#[derive(Debug, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct MyAssignmentListResponse {
    pub course_id: i64,
    pub items: Vec<MyAssignmentItem>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct SubmissionWithStudent {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: Submission,
    pub student: UserSummary,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/assignment.ts")]
pub struct MySubmission {
    #[serde(flatten)]
    #[ts(flatten)]
    pub submission: Submission,
    pub assignment_title: String,
    pub course_id: i64,
    pub course_title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(value: f64) -> GradeSubmissionRequest {
        GradeSubmissionRequest {
            grade: value,
            feedback: Some("  Solid work  ".to_string()),
        }
    }

    #[test]
    fn test_grade_bounds() {
        assert_eq!(
            grade(8.456).validate().unwrap(),
            (8.46, Some("Solid work".to_string()))
        );
        assert!(grade(0.0).validate().is_ok());
        assert!(grade(10.0).validate().is_ok());
        assert!(grade(10.01).validate().is_err());
        assert!(grade(-1.0).validate().is_err());
        assert!(grade(f64::NAN).validate().is_err());
    }

    #[test]
    fn test_update_can_clear_due_date() {
        let update = UpdateAssignmentRequest {
            due_at: Some(chrono::Utc::now()),
            clear_due_at: true,
            ..Default::default()
        }
        .into_update()
        .unwrap();
        assert_eq!(update.due_at, Some(None));

        let untouched = UpdateAssignmentRequest::default().into_update().unwrap();
        assert!(untouched.due_at.is_none() && untouched.title.is_none());
        assert!(
            UpdateAssignmentRequest {
                title: Some("   ".to_string()),
                ..Default::default()
            }
            .into_update()
            .is_err()
        );
    }

    #[test]
    fn test_submission_content_trimmed() {
        let req = SubmitAssignmentRequest {
            content: "  fn main() {}  ".to_string(),
        };
        assert_eq!(req.clean_content().unwrap(), "fn main() {}");
        let empty = SubmitAssignmentRequest {
            content: " ".to_string(),
        };
        assert!(empty.clean_content().is_err());
    }

    #[test]
    fn test_past_due() {
        let now = chrono::Utc::now();
        let mut assignment = Assignment {
            id: 1,
            course_id: 1,
            title: "Borrow checker".to_string(),
            description: String::new(),
            due_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(!assignment.is_past_due(now));
        assignment.due_at = Some(now - chrono::TimeDelta::hours(1));
        assert!(assignment.is_past_due(now));
    }
}
