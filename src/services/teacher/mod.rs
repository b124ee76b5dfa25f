pub mod assignments;
pub mod courses;
pub mod dashboard;
pub mod lessons;
pub mod quizzes;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::models::assignments::{
    CreateAssignmentRequest, GradeSubmissionRequest, UpdateAssignmentRequest,
};
use crate::models::courses::entities::Course;
use crate::models::courses::quiz::QuestionRequest;
use crate::models::courses::requests::{
    CourseListParams, CreateCourseRequest, CreateLessonRequest, CreateQuizRequest,
    UpdateCourseRequest, UpdateLessonRequest, UpdateQuizRequest,
};
use crate::models::users::entities::{User, UserRole};
use crate::models::{ErrorCode, PaginationQuery};
use crate::storage::Storage;

use super::{forbidden, not_found, storage_error};

/// 教师工作台，课程级操作只允许课程所有者（管理员除外）
pub struct TeacherService {
    storage: Option<Arc<dyn Storage>>,
}

super::service_handles!(TeacherService);

/// 加载课程并确认归属
pub(crate) async fn load_owned_course(
    storage: &Arc<dyn Storage>,
    course_id: i64,
    user: &User,
) -> Result<Course, HttpResponse> {
    match storage.get_course_by_id(course_id).await {
        Ok(Some(course)) if course.teacher_id == user.id || user.role == UserRole::Admin => Ok(course),
        Ok(Some(_)) => Err(forbidden(
            ErrorCode::CoursePermissionDenied,
            "You do not own this course",
        )),
        Ok(None) => Err(not_found(ErrorCode::CourseNotFound, "Course not found")),
        Err(e) => Err(storage_error(e, "查询课程失败")),
    }
}

impl TeacherService {
    pub async fn dashboard(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::dashboard(self, request).await
    }

    pub async fn reports(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        dashboard::reports(self, request).await
    }

    pub async fn followers(
        &self,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        dashboard::followers(self, query, request).await
    }

    // 课程
    pub async fn list_courses(
        &self,
        params: CourseListParams,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::list_courses(self, params, request).await
    }

    pub async fn create_course(
        &self,
        body: CreateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::create_course(self, body, request).await
    }

    pub async fn get_course(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::get_course(self, id, request).await
    }

    pub async fn update_course(
        &self,
        id: i64,
        body: UpdateCourseRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::update_course(self, id, body, request).await
    }

    pub async fn delete_course(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::delete_course(self, id, request).await
    }

    pub async fn course_stats(&self, id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        courses::course_stats(self, id, request).await
    }

    pub async fn course_students(
        &self,
        id: i64,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        courses::course_students(self, id, query, request).await
    }

    // 课时
    pub async fn list_lessons(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        lessons::list_lessons(self, course_id, request).await
    }

    pub async fn create_lesson(
        &self,
        course_id: i64,
        body: CreateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lessons::create_lesson(self, course_id, body, request).await
    }

    pub async fn update_lesson(
        &self,
        lesson_id: i64,
        body: UpdateLessonRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        lessons::update_lesson(self, lesson_id, body, request).await
    }

    pub async fn delete_lesson(&self, lesson_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        lessons::delete_lesson(self, lesson_id, request).await
    }

    // 测验
    pub async fn list_quizzes(&self, course_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        quizzes::list_quizzes(self, course_id, request).await
    }

    pub async fn create_quiz(
        &self,
        course_id: i64,
        body: CreateQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        quizzes::create_quiz(self, course_id, body, request).await
    }

    pub async fn get_quiz(&self, quiz_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        quizzes::get_quiz(self, quiz_id, request).await
    }

    pub async fn update_quiz(
        &self,
        quiz_id: i64,
        body: UpdateQuizRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        quizzes::update_quiz(self, quiz_id, body, request).await
    }

    pub async fn delete_quiz(&self, quiz_id: i64, request: &HttpRequest) -> ActixResult<HttpResponse> {
        quizzes::delete_quiz(self, quiz_id, request).await
    }

    pub async fn add_question(
        &self,
        quiz_id: i64,
        body: QuestionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        quizzes::add_question(self, quiz_id, body, request).await
    }

    pub async fn delete_question(
        &self,
        question_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        quizzes::delete_question(self, question_id, request).await
    }

    pub async fn quiz_results(
        &self,
        quiz_id: i64,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        quizzes::quiz_results(self, quiz_id, query, request).await
    }

    pub async fn course_followers(
        &self,
        course_id: i64,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::course_followers(self, course_id, query, request).await
    }

    // 作业
    pub async fn list_assignments(
        &self,
        course_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::list_assignments(self, course_id, request).await
    }

    pub async fn create_assignment(
        &self,
        course_id: i64,
        body: CreateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::create_assignment(self, course_id, body, request).await
    }

    pub async fn update_assignment(
        &self,
        assignment_id: i64,
        body: UpdateAssignmentRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::update_assignment(self, assignment_id, body, request).await
    }

    pub async fn delete_assignment(
        &self,
        assignment_id: i64,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::delete_assignment(self, assignment_id, request).await
    }

    pub async fn assignment_submissions(
        &self,
        assignment_id: i64,
        query: PaginationQuery,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::assignment_submissions(self, assignment_id, query, request).await
    }

    pub async fn grade_submission(
        &self,
        submission_id: i64,
        body: GradeSubmissionRequest,
        request: &HttpRequest,
    ) -> ActixResult<HttpResponse> {
        assignments::grade_submission(self, submission_id, body, request).await
    }
}
