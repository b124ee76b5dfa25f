pub mod assignments;
pub mod content;
pub mod dashboard;
pub mod enroll;
pub mod favorites;
pub mod progress;
pub mod quizzes;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::PaginationQuery;
use crate::models::assignments::SubmitAssignmentRequest;
use crate::models::courses::requests::SubmitQuizRequest;
use crate::models::learning::LessonProgressRequest;
use crate::storage::Storage;

/// 学生端：选课、学习进度、收藏关注与测验
pub struct LearningService {
    storage: Option<Arc<dyn Storage>>,
}

super::service_handles!(LearningService);

impl LearningService {
    pub async fn enroll(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        enroll::enroll(self, course_id, request).await
    }

    pub async fn my_courses(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        enroll::my_courses(self, query, request).await
    }

    pub async fn course_progress(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        progress::course_progress(self, course_id, request).await
    }

    pub async fn record_lesson_progress(
        &self,
        lesson_id: i64,
        body: LessonProgressRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        progress::record_lesson_progress(self, lesson_id, body, request).await
    }

    pub async fn toggle_favorite(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        favorites::toggle_favorite(self, course_id, request).await
    }

    pub async fn favorites(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        favorites::list_favorites(self, query, request).await
    }

    pub async fn toggle_follow(
        &self,
        teacher_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        favorites::toggle_follow(self, teacher_id, request).await
    }

    pub async fn following(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        favorites::list_following(self, query, request).await
    }

    pub async fn course_lessons(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        content::course_lessons(self, course_id, request).await
    }

    pub async fn lesson_detail(
        &self,
        lesson_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        content::lesson_detail(self, lesson_id, request).await
    }

    pub async fn course_quizzes(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        content::course_quizzes(self, course_id, request).await
    }

    pub async fn take_quiz(&self, quiz_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        quizzes::take_quiz(self, quiz_id, request).await
    }

    pub async fn submit_quiz(
        &self,
        quiz_id: i64,
        body: SubmitQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        quizzes::submit_quiz(self, quiz_id, body, request).await
    }

    pub async fn my_quiz_results(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        quizzes::my_quiz_results(self, query, request).await
    }

    pub async fn dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::dashboard(self, request).await
    }

    pub async fn follow_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        favorites::follow_course(self, course_id, request).await
    }

    pub async fn unfollow_course(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        favorites::unfollow_course(self, course_id, request).await
    }

    pub async fn followed_courses(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        favorites::followed_courses(self, query, request).await
    }

    // 作业
    pub async fn course_assignments(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::course_assignments(self, course_id, request).await
    }

    pub async fn submit_assignment(
        &self,
        assignment_id: i64,
        body: SubmitAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::submit_assignment(self, assignment_id, body, request).await
    }

    pub async fn my_submissions(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::my_submissions(self, query, request).await
    }
}
