use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::PaginationQuery;
use crate::models::assignments::{
    CreateAssignmentRequest, GradeSubmissionRequest, UpdateAssignmentRequest,
};
use crate::models::courses::quiz::QuestionRequest;
use crate::models::courses::requests::{
    CourseListParams, CreateCourseRequest, CreateLessonRequest, CreateQuizRequest,
    UpdateCourseRequest, UpdateLessonRequest, UpdateQuizRequest,
};
use crate::models::users::entities::UserRole;
use crate::services::TeacherService;
use crate::utils::{SafeCourseIdI64, SafeIDI64, SafeQuizIdI64};

static TEACHER_SERVICE: Lazy<TeacherService> = Lazy::new(TeacherService::new_lazy);

pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.dashboard(&req).await
}

pub async fn reports(req: HttpRequest) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.reports(&req).await
}

pub async fn followers(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.followers(query.into_inner(), &req).await
}

// 课程
pub async fn list_courses(
    req: HttpRequest,
    query: web::Query<CourseListParams>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.list_courses(query.into_inner(), &req).await
}

pub async fn create_course(
    req: HttpRequest,
    body: web::Json<CreateCourseRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.create_course(body.into_inner(), &req).await
}

pub async fn get_course(req: HttpRequest, id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.get_course(id.0, &req).await
}

pub async fn update_course(
    req: HttpRequest,
    id: SafeCourseIdI64,
    body: web::Json<UpdateCourseRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .update_course(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_course(req: HttpRequest, id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.delete_course(id.0, &req).await
}

pub async fn course_stats(req: HttpRequest, id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.course_stats(id.0, &req).await
}

pub async fn course_students(
    req: HttpRequest,
    id: SafeCourseIdI64,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .course_students(id.0, query.into_inner(), &req)
        .await
}

// 课时
pub async fn list_lessons(req: HttpRequest, id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.list_lessons(id.0, &req).await
}

pub async fn create_lesson(
    req: HttpRequest,
    id: SafeCourseIdI64,
    body: web::Json<CreateLessonRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .create_lesson(id.0, body.into_inner(), &req)
        .await
}

pub async fn update_lesson(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateLessonRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .update_lesson(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_lesson(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.delete_lesson(id.0, &req).await
}

// 测验
pub async fn list_quizzes(req: HttpRequest, id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.list_quizzes(id.0, &req).await
}

pub async fn create_quiz(
    req: HttpRequest,
    id: SafeCourseIdI64,
    body: web::Json<CreateQuizRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .create_quiz(id.0, body.into_inner(), &req)
        .await
}

pub async fn get_quiz(req: HttpRequest, quiz_id: SafeQuizIdI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.get_quiz(quiz_id.0, &req).await
}

pub async fn update_quiz(
    req: HttpRequest,
    quiz_id: SafeQuizIdI64,
    body: web::Json<UpdateQuizRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .update_quiz(quiz_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_quiz(req: HttpRequest, quiz_id: SafeQuizIdI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.delete_quiz(quiz_id.0, &req).await
}

pub async fn add_question(
    req: HttpRequest,
    quiz_id: SafeQuizIdI64,
    body: web::Json<QuestionRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .add_question(quiz_id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_question(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.delete_question(id.0, &req).await
}

pub async fn quiz_results(
    req: HttpRequest,
    quiz_id: SafeQuizIdI64,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .quiz_results(quiz_id.0, query.into_inner(), &req)
        .await
}

// 作业
pub async fn list_assignments(req: HttpRequest, id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.list_assignments(id.0, &req).await
}

pub async fn create_assignment(
    req: HttpRequest,
    id: SafeCourseIdI64,
    body: web::Json<CreateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .create_assignment(id.0, body.into_inner(), &req)
        .await
}

pub async fn update_assignment(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<UpdateAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .update_assignment(id.0, body.into_inner(), &req)
        .await
}

pub async fn delete_assignment(req: HttpRequest, id: SafeIDI64) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE.delete_assignment(id.0, &req).await
}

pub async fn assignment_submissions(
    req: HttpRequest,
    id: SafeIDI64,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .assignment_submissions(id.0, query.into_inner(), &req)
        .await
}

pub async fn grade_submission(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<GradeSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .grade_submission(id.0, body.into_inner(), &req)
        .await
}

pub async fn course_followers(
    req: HttpRequest,
    id: SafeCourseIdI64,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    TEACHER_SERVICE
        .course_followers(id.0, query.into_inner(), &req)
        .await
}

// 教师与管理员；课程归属在业务层检查
pub fn configure_teacher_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/teacher")
            .wrap(middlewares::RequireJWT)
            .service(
                web::scope("")
                    .wrap(middlewares::RequireRole::new_any(UserRole::teacher_roles()))
                    .route("/dashboard", web::get().to(dashboard))
                    .route("/reports", web::get().to(reports))
                    .route("/followers", web::get().to(followers))
                    .route("/courses", web::get().to(list_courses))
                    .route("/courses", web::post().to(create_course))
                    .route("/courses/{course_id}", web::get().to(get_course))
                    .route("/courses/{course_id}", web::put().to(update_course))
                    .route("/courses/{course_id}", web::delete().to(delete_course))
                    .route("/courses/{course_id}/stats", web::get().to(course_stats))
                    .route("/courses/{course_id}/students", web::get().to(course_students))
                    .route("/courses/{course_id}/followers", web::get().to(course_followers))
                    .route("/courses/{course_id}/assignments", web::get().to(list_assignments))
                    .route("/courses/{course_id}/assignments", web::post().to(create_assignment))
                    .route("/courses/{course_id}/lessons", web::get().to(list_lessons))
                    .route("/courses/{course_id}/lessons", web::post().to(create_lesson))
                    .route("/courses/{course_id}/quizzes", web::get().to(list_quizzes))
                    .route("/courses/{course_id}/quizzes", web::post().to(create_quiz))
                    .route("/lessons/{id}", web::put().to(update_lesson))
                    .route("/lessons/{id}", web::delete().to(delete_lesson))
                    .route("/quizzes/{quiz_id}", web::get().to(get_quiz))
                    .route("/quizzes/{quiz_id}", web::put().to(update_quiz))
                    .route("/quizzes/{quiz_id}", web::delete().to(delete_quiz))
                    .route("/quizzes/{quiz_id}/questions", web::post().to(add_question))
                    .route("/quizzes/{quiz_id}/results", web::get().to(quiz_results))
                    .route("/questions/{id}", web::delete().to(delete_question))
                    .route("/assignments/{id}", web::put().to(update_assignment))
                    .route("/assignments/{id}", web::delete().to(delete_assignment))
                    .route("/assignments/{id}/submissions", web::get().to(assignment_submissions))
                    .route("/submissions/{id}/grade", web::put().to(grade_submission)),
            ),
    );
}
