use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

crate::models::string_enum! {
    #[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
    pub enum AnswerOption {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct Quiz {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub duration_minutes: i32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizSummary {
    #[serde(flatten)]
    #[ts(flatten)]
    pub quiz: Quiz,
    pub question_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_answer: AnswerOption,
}

/// 作答时下发的题目，不含答案
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct PublicQuestion {
    pub id: i64,
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            question_text: q.question_text,
            option_a: q.option_a,
            option_b: q.option_b,
            option_c: q.option_c,
            option_d: q.option_d,
        }
    }
}

/// 新建题目请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuestionRequest {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_answer: String,
}

/// 校验通过的题目
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuestion {
    pub question_text: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: Option<String>,
    pub option_d: Option<String>,
    pub correct_answer: AnswerOption,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl QuestionRequest {
    /// 题干、A、B 选项必填，答案必须指向存在的选项
    pub fn validate(self) -> Result<NewQuestion, String> {
        let question_text = self.question_text.trim().to_string();
        if question_text.is_empty() {
            return Err("Question text is required".to_string());
        }
        let option_a = self.option_a.trim().to_string();
        let option_b = self.option_b.trim().to_string();
        if option_a.is_empty() || option_b.is_empty() {
            return Err("Options A and B are required".to_string());
        }
        let option_c = non_blank(self.option_c);
        let option_d = non_blank(self.option_d);

        let correct_answer = self
            .correct_answer
            .trim()
            .to_ascii_uppercase()
            .parse::<AnswerOption>()
            .map_err(|_| "Correct answer must be one of A, B, C, D".to_string())?;

        let present = match correct_answer {
            AnswerOption::A | AnswerOption::B => true,
            AnswerOption::C => option_c.is_some(),
            AnswerOption::D => option_d.is_some(),
        };
        if !present {
            return Err(format!(
                "Correct answer {correct_answer} refers to an empty option"
            ));
        }

        Ok(NewQuestion {
            question_text,
            option_a,
            option_b,
            option_c,
            option_d,
            correct_answer,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuizResult {
    pub id: i64,
    pub quiz_id: i64,
    pub user_id: i64,
    /// 百分制，保留两位小数
    pub score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
    pub taken_at: chrono::DateTime<chrono::Utc>,
}

/// 存储层新增成绩
#[derive(Debug, Clone)]
pub struct NewQuizResult {
    pub quiz_id: i64,
    pub user_id: i64,
    pub score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
}

/// 单题批改结果
#[derive(Debug, Clone, Serialize, TS)]
#[ts(export, export_to = "../frontend/src/types/generated/quiz.ts")]
pub struct QuestionOutcome {
    pub question_id: i64,
    pub selected: Option<AnswerOption>,
    pub correct_answer: AnswerOption,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradedQuiz {
    pub correct_count: i32,
    pub total_questions: i32,
    pub score: f64,
}

/// 批改：score = correct / total * 100，保留两位小数；未作答或非法选项按错误计
pub fn grade_answers(
    questions: &[Question],
    answers: &HashMap<i64, String>,
) -> (GradedQuiz, Vec<QuestionOutcome>) {
    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .map(|q| {
            let selected = answers
                .get(&q.id)
                .and_then(|a| a.trim().to_ascii_uppercase().parse::<AnswerOption>().ok());
            QuestionOutcome {
                question_id: q.id,
                selected,
                correct_answer: q.correct_answer,
                is_correct: selected == Some(q.correct_answer),
            }
        })
        .collect();

    let total = outcomes.len() as i32;
    let correct = outcomes.iter().filter(|o| o.is_correct).count() as i32;
    let score = if total == 0 {
        0.0
    } else {
        (f64::from(correct) / f64::from(total) * 10000.0).round() / 100.0
    };

    (
        GradedQuiz {
            correct_count: correct,
            total_questions: total,
            score,
        },
        outcomes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, answer: AnswerOption) -> Question {
        Question {
            id,
            quiz_id: 1,
            question_text: format!("Q{id}"),
            option_a: "a".into(),
            option_b: "b".into(),
            option_c: Some("c".into()),
            option_d: None,
            correct_answer: answer,
        }
    }

    fn request(answer: &str) -> QuestionRequest {
        QuestionRequest {
            question_text: "What is 2 + 2?".into(),
            option_a: "3".into(),
            option_b: "4".into(),
            option_c: Some("  ".into()),
            option_d: None,
            correct_answer: answer.into(),
        }
    }

    #[test]
    fn test_grade_rounds_to_two_decimals() {
        let questions = vec![
            question(1, AnswerOption::A),
            question(2, AnswerOption::B),
            question(3, AnswerOption::C),
        ];
        let answers = HashMap::from([(1, "a".to_string()), (2, "B".to_string()), (3, "D".to_string())]);

        let (graded, outcomes) = grade_answers(&questions, &answers);
        assert_eq!(graded.correct_count, 2);
        assert_eq!(graded.total_questions, 3);
        assert_eq!(graded.score, 66.67);
        assert!(outcomes[0].is_correct);
        assert!(!outcomes[2].is_correct);
    }

    #[test]
    fn test_grade_unanswered_counts_wrong() {
        let questions = vec![question(1, AnswerOption::A), question(2, AnswerOption::A)];
        let answers = HashMap::from([(1, "A".to_string()), (2, "Z".to_string())]);

        let (graded, outcomes) = grade_answers(&questions, &answers);
        assert_eq!(graded.score, 50.0);
        assert_eq!(outcomes[1].selected, None);
    }

    #[test]
    fn test_grade_empty_quiz() {
        let (graded, _) = grade_answers(&[], &HashMap::new());
        assert_eq!(graded.score, 0.0);
    }

    #[test]
    fn test_question_validation() {
        assert!(request("b").validate().is_ok());
        assert!(request("E").validate().is_err());
        // C 选项为空白，不能作为答案
        assert!(request("C").validate().is_err());

        let mut blank = request("A");
        blank.question_text = "   ".into();
        assert!(blank.validate().is_err());

        let validated = request("B").validate().unwrap();
        assert_eq!(validated.option_c, None);
    }
}
