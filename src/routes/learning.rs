use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::PaginationQuery;
use crate::models::assignments::SubmitAssignmentRequest;
use crate::models::courses::requests::SubmitQuizRequest;
use crate::models::learning::LessonProgressRequest;
use crate::services::LearningService;
use crate::utils::{SafeCourseIdI64, SafeIDI64, SafeQuizIdI64};

static LEARNING_SERVICE: Lazy<LearningService> = Lazy::new(LearningService::new_lazy);

pub async fn dashboard(req: HttpRequest) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.dashboard(&req).await
}

pub async fn enroll(req: HttpRequest, course_id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.enroll(course_id.0, &req).await
}

pub async fn my_courses(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.my_courses(query.into_inner(), &req).await
}

pub async fn course_progress(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.course_progress(course_id.0, &req).await
}

pub async fn record_lesson_progress(
    req: HttpRequest,
    lesson_id: SafeIDI64,
    body: web::Json<LessonProgressRequest>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .record_lesson_progress(lesson_id.0, body.into_inner(), &req)
        .await
}

pub async fn toggle_favorite(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.toggle_favorite(course_id.0, &req).await
}

pub async fn favorites(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.favorites(query.into_inner(), &req).await
}

pub async fn toggle_follow(req: HttpRequest, teacher_id: SafeIDI64) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.toggle_follow(teacher_id.0, &req).await
}

pub async fn following(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.following(query.into_inner(), &req).await
}

pub async fn course_lessons(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.course_lessons(course_id.0, &req).await
}

pub async fn lesson_detail(req: HttpRequest, lesson_id: SafeIDI64) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.lesson_detail(lesson_id.0, &req).await
}

pub async fn course_quizzes(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.course_quizzes(course_id.0, &req).await
}

pub async fn take_quiz(req: HttpRequest, quiz_id: SafeQuizIdI64) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.take_quiz(quiz_id.0, &req).await
}

pub async fn submit_quiz(
    req: HttpRequest,
    quiz_id: SafeQuizIdI64,
    body: web::Json<SubmitQuizRequest>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .submit_quiz(quiz_id.0, body.into_inner(), &req)
        .await
}

pub async fn my_quiz_results(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.my_quiz_results(query.into_inner(), &req).await
}

// 学生端，任意已登录角色
pub async fn follow_course(req: HttpRequest, course_id: SafeCourseIdI64) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.follow_course(course_id.0, &req).await
}

pub async fn unfollow_course(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.unfollow_course(course_id.0, &req).await
}

pub async fn followed_courses(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.followed_courses(query.into_inner(), &req).await
}

pub async fn course_assignments(
    req: HttpRequest,
    course_id: SafeCourseIdI64,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.course_assignments(course_id.0, &req).await
}

pub async fn submit_assignment(
    req: HttpRequest,
    id: SafeIDI64,
    body: web::Json<SubmitAssignmentRequest>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE
        .submit_assignment(id.0, body.into_inner(), &req)
        .await
}

pub async fn my_submissions(
    req: HttpRequest,
    query: web::Query<PaginationQuery>,
) -> ActixResult<HttpResponse> {
    LEARNING_SERVICE.my_submissions(query.into_inner(), &req).await
}

pub fn configure_learning_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/learning")
            .wrap(middlewares::RequireJWT)
            .route("/dashboard", web::get().to(dashboard))
            .route("/courses", web::get().to(my_courses))
            .route("/courses/{course_id}/enroll", web::post().to(enroll))
            .route("/courses/{course_id}/progress", web::get().to(course_progress))
            .route("/courses/{course_id}/favorite", web::post().to(toggle_favorite))
            .route("/courses/{course_id}/lessons", web::get().to(course_lessons))
            .route("/courses/{course_id}/quizzes", web::get().to(course_quizzes))
            .route("/courses/{course_id}/assignments", web::get().to(course_assignments))
            .route("/courses/{course_id}/follow", web::post().to(follow_course))
            .route("/courses/{course_id}/follow", web::delete().to(unfollow_course))
            .route("/followed-courses", web::get().to(followed_courses))
            .route("/assignments/{id}/submit", web::post().to(submit_assignment))
            .route("/submissions", web::get().to(my_submissions))
            .route("/lessons/{id}", web::get().to(lesson_detail))
            .route("/lessons/{id}/progress", web::post().to(record_lesson_progress))
            .route("/favorites", web::get().to(favorites))
            .route("/teachers/{id}/follow", web::post().to(toggle_follow))
            .route("/following", web::get().to(following))
            .route("/quizzes/results", web::get().to(my_quiz_results))
            .route("/quizzes/{quiz_id}", web::get().to(take_quiz))
            .route("/quizzes/{quiz_id}/submit", web::post().to(submit_quiz)),
    );
}
