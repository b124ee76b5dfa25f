pub mod admin;
pub mod auth;
pub mod catalog;
pub mod frontend;
pub mod learning;
pub mod live;
pub mod notifications;
pub mod payments;
pub mod system;
pub mod teacher;

pub use admin::configure_admin_routes;
pub use auth::configure_auth_routes;
pub use catalog::configure_catalog_routes;
pub use frontend::configure_frontend_routes;
pub use learning::configure_learning_routes;
pub use live::configure_live_routes;
pub use notifications::configure_notification_routes;
pub use payments::configure_payment_routes;
pub use system::configure_system_routes;
pub use teacher::configure_teacher_routes;

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use actix_web::http::StatusCode;
    use actix_web::{App, test, web};
    use serde_json::json;

    use super::*;
    use crate::cache::ObjectCache;
    use crate::cache::object_cache::moka::MokaObjectCache;
    use crate::models::courses::entities::{Course, CourseStatus};
    use crate::models::courses::quiz::QuestionRequest;
    use crate::models::courses::requests::{CreateLessonRequest, NewCourse};
    use crate::models::live::NewLiveRoom;
    use crate::models::users::entities::{User, UserRole, UserStatus};
    use crate::models::users::requests::NewUser;
    use crate::storage::Storage;
    use crate::storage::sea_orm_storage::SeaOrmStorage;

    struct Fixture {
        storage: Arc<dyn Storage>,
        cache: Arc<dyn ObjectCache>,
    }

    impl Fixture {
        async fn new() -> Self {
            Self {
                storage: Arc::new(SeaOrmStorage::in_memory().await.unwrap()),
                cache: Arc::new(MokaObjectCache::new(1000, Duration::from_secs(60))),
            }
        }

        async fn user(&self, name: &str, role: UserRole) -> (User, String) {
            let user = self
                .storage
                .create_user(NewUser {
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    password_hash: "x".to_string(),
                    full_name: name.to_string(),
                    role,
                })
                .await
                .unwrap();
            let tokens = user
                .generate_token_pair(chrono::TimeDelta::minutes(5), chrono::TimeDelta::days(1))
                .unwrap();
            (user, format!("Bearer {}", tokens.access_token))
        }

        async fn course(&self, teacher: &User, price: i64) -> Course {
            self.storage
                .create_course(NewCourse {
                    teacher_id: teacher.id,
                    title: format!("{} teaches Rust", teacher.username),
                    description: "Traits and lifetimes".to_string(),
                    price,
                    thumbnail_url: None,
                    status: CourseStatus::Active,
                    category_ids: vec![],
                })
                .await
                .unwrap()
        }
    }

    fn authed(req: test::TestRequest, token: &str) -> test::TestRequest {
        req.insert_header(("Authorization", token.to_string()))
    }

    macro_rules! app {
        ($fixture:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($fixture.storage.clone()))
                    .app_data(web::Data::new($fixture.cache.clone()))
                    .configure(configure_catalog_routes)
                    .configure(configure_payment_routes)
                    .configure(configure_admin_routes)
                    .configure(configure_teacher_routes)
                    .configure(configure_learning_routes)
                    .configure(configure_live_routes),
            )
            .await
        };
    }

    #[test_log::test(actix_web::test)]
    async fn test_admin_scope_requires_admin_role() {
        let fixture = Fixture::new().await;
        let (_, student) = fixture.user("student", UserRole::User).await;
        let (_, teacher) = fixture.user("teacher", UserRole::Teacher).await;
        let (_, admin) = fixture.user("admin", UserRole::Admin).await;
        let app = app!(fixture);

        let anonymous = test::TestRequest::get().uri("/api/v1/admin/categories").to_request();
        assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::UNAUTHORIZED);

        for (token, expected) in [
            (&student, StatusCode::FORBIDDEN),
            (&teacher, StatusCode::FORBIDDEN),
            (&admin, StatusCode::OK),
        ] {
            let req = test::TestRequest::get()
                .uri("/api/v1/admin/categories")
                .insert_header(("Authorization", token.as_str()))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }

    #[test_log::test(actix_web::test)]
    async fn test_teacher_scope_admits_teachers_and_admins() {
        let fixture = Fixture::new().await;
        let (_, student) = fixture.user("student", UserRole::User).await;
        let (_, teacher) = fixture.user("teacher", UserRole::Teacher).await;
        let (_, admin) = fixture.user("admin", UserRole::Admin).await;
        let app = app!(fixture);

        for (token, expected) in [
            (&student, StatusCode::FORBIDDEN),
            (&teacher, StatusCode::OK),
            (&admin, StatusCode::OK),
        ] {
            let req = test::TestRequest::get()
                .uri("/api/v1/teacher/courses")
                .insert_header(("Authorization", token.as_str()))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), expected);
        }
    }

    #[test_log::test(actix_web::test)]
    async fn test_catalog_is_public() {
        let fixture = Fixture::new().await;
        let app = app!(fixture);

        let req = test::TestRequest::get().uri("/api/v1/catalog/categories").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
    }

    #[test_log::test(actix_web::test)]
    async fn test_paying_for_free_course_is_rejected() {
        let fixture = Fixture::new().await;
        let (teacher, _) = fixture.user("teacher", UserRole::Teacher).await;
        let (_, student) = fixture.user("student", UserRole::User).await;
        let free = fixture
            .storage
            .create_course(NewCourse {
                teacher_id: teacher.id,
                title: "Free intro".to_string(),
                description: "No charge".to_string(),
                price: 0,
                thumbnail_url: None,
                status: CourseStatus::Active,
                category_ids: vec![],
            })
            .await
            .unwrap();
        let app = app!(fixture);

        let req = test::TestRequest::post()
            .uri("/api/v1/payments")
            .insert_header(("Authorization", student.as_str()))
            .set_json(serde_json::json!({ "course_id": free.id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert!(body["message"].is_string());
    }

    #[test_log::test(actix_web::test)]
    async fn test_students_cannot_open_live_rooms() {
        let fixture = Fixture::new().await;
        let (_, student) = fixture.user("student", UserRole::User).await;
        let (_, teacher) = fixture.user("teacher", UserRole::Teacher).await;
        let app = app!(fixture);

        let create = |token: &str| {
            test::TestRequest::post()
                .uri("/api/v1/live/rooms")
                .insert_header(("Authorization", token.to_string()))
                .set_json(serde_json::json!({ "title": "Office hours", "max_participants": 5 }))
                .to_request()
        };
        assert_eq!(
            test::call_service(&app, create(&student)).await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            test::call_service(&app, create(&teacher)).await.status(),
            StatusCode::CREATED
        );

        let list = test::TestRequest::get()
            .uri("/api/v1/live/rooms")
            .insert_header(("Authorization", student.as_str()))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, list).await;
        assert_eq!(body["data"]["items"].as_array().map(Vec::len), Some(1));
    }

    #[test_log::test(actix_web::test)]
    async fn test_course_content_requires_enrollment() {
        let fixture = Fixture::new().await;
        let (teacher, owner) = fixture.user("teacher", UserRole::Teacher).await;
        let (enrolled, student) = fixture.user("student", UserRole::User).await;
        let (_, outsider) = fixture.user("outsider", UserRole::User).await;
        let course = fixture.course(&teacher, 0).await;
        let lesson = fixture
            .storage
            .create_lesson(
                course.id,
                CreateLessonRequest {
                    title: "Lifetimes".to_string(),
                    content: "full notes".to_string(),
                    duration_minutes: 12,
                    video_url: None,
                    video_required: false,
                    position: None,
                },
            )
            .await
            .unwrap();
        fixture.storage.enroll_user(enrolled.id, course.id).await.unwrap();
        let app = app!(fixture);

        let lessons = format!("/api/v1/learning/courses/{}/lessons", course.id);
        let detail = format!("/api/v1/learning/lessons/{}", lesson.id);
        let quizzes = format!("/api/v1/learning/courses/{}/quizzes", course.id);

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            authed(test::TestRequest::get().uri(&lessons), &student).to_request(),
        )
        .await;
        assert_eq!(body["data"]["items"][0]["content"], "full notes");
        assert_eq!(body["data"]["items"][0]["completed"], false);

        let body: serde_json::Value = test::call_and_read_body_json(
            &app,
            authed(test::TestRequest::get().uri(&detail), &student).to_request(),
        )
        .await;
        assert_eq!(body["data"]["lesson"]["id"], lesson.id);
        assert!(body["data"]["progress"].is_null());

        for uri in [&lessons, &detail, &quizzes] {
            let resp = test::call_service(&app, authed(test::TestRequest::get().uri(uri), &outsider).to_request()).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN, "{uri}");
            let resp = test::call_service(&app, authed(test::TestRequest::get().uri(uri), &owner).to_request()).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        }
    }

    #[test_log::test(actix_web::test)]
    async fn test_enroll_paid_and_repeated() {
        let fixture = Fixture::new().await;
        let (teacher, _) = fixture.user("teacher", UserRole::Teacher).await;
        let (_, student) = fixture.user("student", UserRole::User).await;
        let paid = fixture.course(&teacher, 4900).await;
        let free = fixture.course(&teacher, 0).await;
        let app = app!(fixture);

        let enroll = |id: i64| test::TestRequest::post().uri(&format!("/api/v1/learning/courses/{id}/enroll"));

        let resp = test::call_service(&app, authed(enroll(paid.id), &student).to_request()).await;
        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 1070);

        let first = test::call_service(&app, authed(enroll(free.id), &student).to_request()).await;
        assert!(first.status().is_success());
        let again = test::call_service(&app, authed(enroll(free.id), &student).to_request()).await;
        assert_eq!(again.status(), StatusCode::CONFLICT);
    }

    #[test_log::test(actix_web::test)]
    async fn test_settled_payment_cannot_be_approved_or_rejected() {
        let fixture = Fixture::new().await;
        let (teacher, _) = fixture.user("teacher", UserRole::Teacher).await;
        let (buyer, _) = fixture.user("buyer", UserRole::User).await;
        let (_, admin) = fixture.user("admin", UserRole::Admin).await;
        let paid = fixture.course(&teacher, 1500).await;
        let payment = fixture
            .storage
            .create_payment(buyer.id, paid.id, paid.price, "bank_transfer".to_string())
            .await
            .unwrap();
        fixture.storage.approve_payment(payment.id).await.unwrap();
        let app = app!(fixture);

        let approve = test::TestRequest::post().uri(&format!("/api/v1/admin/payments/{}/approve", payment.id));
        assert_eq!(
            test::call_service(&app, authed(approve, &admin).to_request()).await.status(),
            StatusCode::CONFLICT
        );

        let reject = test::TestRequest::post()
            .uri(&format!("/api/v1/admin/payments/{}/reject", payment.id))
            .set_json(serde_json::json!({ "reason": "duplicate" }));
        assert_eq!(
            test::call_service(&app, authed(reject, &admin).to_request()).await.status(),
            StatusCode::CONFLICT
        );
    }

    #[test_log::test(actix_web::test)]
    async fn test_teacher_cannot_touch_another_teachers_content() {
        let fixture = Fixture::new().await;
        let (owner, _) = fixture.user("owner", UserRole::Teacher).await;
        let (_, intruder) = fixture.user("intruder", UserRole::Teacher).await;
        let course = fixture.course(&owner, 0).await;
        let lesson = fixture
            .storage
            .create_lesson(
                course.id,
                CreateLessonRequest {
                    title: "Borrowing".to_string(),
                    content: "notes".to_string(),
                    duration_minutes: 5,
                    video_url: None,
                    video_required: false,
                    position: None,
                },
            )
            .await
            .unwrap();
        let (quiz, _) = fixture
            .storage
            .create_quiz(
                course.id,
                "Checkpoint".to_string(),
                10,
                vec![QuestionRequest {
                    question_text: "Which type moves?".to_string(),
                    option_a: "String".to_string(),
                    option_b: "i32".to_string(),
                    option_c: None,
                    option_d: None,
                    correct_answer: "A".to_string(),
                }],
            )
            .await
            .unwrap();
        let app = app!(fixture);

        let edit = json!({ "title": "Hijacked" });
        let attempts = [
            test::TestRequest::put()
                .uri(&format!("/api/v1/teacher/courses/{}", course.id))
                .set_json(&edit),
            test::TestRequest::delete().uri(&format!("/api/v1/teacher/courses/{}", course.id)),
            test::TestRequest::put()
                .uri(&format!("/api/v1/teacher/lessons/{}", lesson.id))
                .set_json(&edit),
            test::TestRequest::delete().uri(&format!("/api/v1/teacher/lessons/{}", lesson.id)),
            test::TestRequest::put()
                .uri(&format!("/api/v1/teacher/quizzes/{}", quiz.id))
                .set_json(&edit),
            test::TestRequest::delete().uri(&format!("/api/v1/teacher/quizzes/{}", quiz.id)),
        ];
        for attempt in attempts {
            let resp = test::call_service(&app, authed(attempt, &intruder).to_request()).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }
        assert_eq!(
            fixture.storage.get_course_by_id(course.id).await.unwrap().unwrap().title,
            course.title
        );
        assert!(fixture.storage.get_quiz_by_id(quiz.id).await.unwrap().is_some());
    }

    #[test_log::test(actix_web::test)]
    async fn test_admin_cannot_delete_or_lock_self() {
        let fixture = Fixture::new().await;
        let (admin_user, admin) = fixture.user("admin", UserRole::Admin).await;
        let (student_user, _) = fixture.user("student", UserRole::User).await;
        let app = app!(fixture);

        let delete = test::TestRequest::delete().uri(&format!("/api/v1/admin/users/{}", admin_user.id));
        let resp = test::call_service(&app, authed(delete, &admin).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 1061);

        let lock = test::TestRequest::post().uri(&format!("/api/v1/admin/users/{}/toggle-lock", admin_user.id));
        assert_eq!(
            test::call_service(&app, authed(lock, &admin).to_request()).await.status(),
            StatusCode::BAD_REQUEST
        );

        let bulk = test::TestRequest::post()
            .uri("/api/v1/admin/users/bulk-lock")
            .set_json(json!({ "ids": [admin_user.id, student_user.id], "lock": true }));
        let body: serde_json::Value = test::call_and_read_body_json(&app, authed(bulk, &admin).to_request()).await;
        assert_eq!(body["data"]["affected"], 1);
        assert_eq!(body["data"]["skipped"], json!([admin_user.id]));

        let me = fixture.storage.get_user_by_id(admin_user.id).await.unwrap().unwrap();
        assert_eq!(me.status, UserStatus::Active);
        let locked = fixture.storage.get_user_by_id(student_user.id).await.unwrap().unwrap();
        assert_eq!(locked.status, UserStatus::Locked);
    }

    #[test_log::test(actix_web::test)]
    async fn test_duplicate_category_name_conflicts() {
        let fixture = Fixture::new().await;
        let (_, admin) = fixture.user("admin", UserRole::Admin).await;
        let app = app!(fixture);

        let create = || {
            test::TestRequest::post()
                .uri("/api/v1/admin/categories")
                .set_json(json!({ "name": "Systems" }))
        };
        assert_eq!(
            test::call_service(&app, authed(create(), &admin).to_request()).await.status(),
            StatusCode::CREATED
        );
        let resp = test::call_service(&app, authed(create(), &admin).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 1052);
    }

    #[test_log::test(actix_web::test)]
    async fn test_joining_ended_room_conflicts() {
        let fixture = Fixture::new().await;
        let (teacher, _) = fixture.user("teacher", UserRole::Teacher).await;
        let (_, student) = fixture.user("student", UserRole::User).await;
        let room = fixture
            .storage
            .create_live_room(NewLiveRoom {
                id: uuid::Uuid::new_v4().to_string(),
                teacher_id: teacher.id,
                title: "Office hours".to_string(),
                description: None,
                max_participants: 5,
            })
            .await
            .unwrap();
        fixture.storage.end_live_room(&room.id).await.unwrap();
        let app = app!(fixture);

        let join = test::TestRequest::post().uri(&format!("/api/v1/live/rooms/{}/join", room.id));
        let resp = test::call_service(&app, authed(join, &student).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["code"], 1059);
    }

    #[test_log::test(actix_web::test)]
    async fn test_assignment_submit_and_grade() {
        let fixture = Fixture::new().await;
        let (teacher, owner) = fixture.user("teacher", UserRole::Teacher).await;
        let (_, other_teacher) = fixture.user("other", UserRole::Teacher).await;
        let (enrolled, student) = fixture.user("student", UserRole::User).await;
        let (_, outsider) = fixture.user("outsider", UserRole::User).await;
        let course = fixture.course(&teacher, 0).await;
        fixture.storage.enroll_user(enrolled.id, course.id).await.unwrap();
        let app = app!(fixture);

        let create = test::TestRequest::post()
            .uri(&format!("/api/v1/teacher/courses/{}/assignments", course.id))
            .set_json(json!({ "title": "Write a parser" }));
        let resp = test::call_service(&app, authed(create, &owner).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        let assignment_id = body["data"]["id"].as_i64().unwrap();

        let submit = || {
            test::TestRequest::post()
                .uri(&format!("/api/v1/learning/assignments/{assignment_id}/submit"))
                .set_json(json!({ "content": "fn parse() {}" }))
        };
        assert_eq!(
            test::call_service(&app, authed(submit(), &outsider).to_request()).await.status(),
            StatusCode::FORBIDDEN
        );
        let resp = test::call_service(&app, authed(submit(), &student).to_request()).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["version"], 1);
        let submission_id = body["data"]["id"].as_i64().unwrap();

        let grade = |value: f64| {
            test::TestRequest::put()
                .uri(&format!("/api/v1/teacher/submissions/{submission_id}/grade"))
                .set_json(json!({ "grade": value }))
        };
        assert_eq!(
            test::call_service(&app, authed(grade(11.0), &owner).to_request()).await.status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            test::call_service(&app, authed(grade(8.0), &other_teacher).to_request()).await.status(),
            StatusCode::FORBIDDEN
        );
        let body: serde_json::Value =
            test::call_and_read_body_json(&app, authed(grade(8.0), &owner).to_request()).await;
        assert_eq!(body["data"]["grade"], 8.0);

        let mine = test::TestRequest::get().uri(&format!("/api/v1/learning/courses/{}/assignments", course.id));
        let body: serde_json::Value = test::call_and_read_body_json(&app, authed(mine, &student).to_request()).await;
        assert_eq!(body["data"]["items"][0]["latest_submission"]["grade"], 8.0);
    }

    #[test_log::test(actix_web::test)]
    async fn test_course_follow_twice_conflicts() {
        let fixture = Fixture::new().await;
        let (teacher, owner) = fixture.user("teacher", UserRole::Teacher).await;
        let (_, student) = fixture.user("student", UserRole::User).await;
        let course = fixture.course(&teacher, 0).await;
        let app = app!(fixture);

        let follow = || test::TestRequest::post().uri(&format!("/api/v1/learning/courses/{}/follow", course.id));
        assert_eq!(
            test::call_service(&app, authed(follow(), &student).to_request()).await.status(),
            StatusCode::OK
        );
        assert_eq!(
            test::call_service(&app, authed(follow(), &student).to_request()).await.status(),
            StatusCode::CONFLICT
        );

        let followers = test::TestRequest::get().uri(&format!("/api/v1/teacher/courses/{}/followers", course.id));
        let body: serde_json::Value = test::call_and_read_body_json(&app, authed(followers, &owner).to_request()).await;
        assert_eq!(body["data"]["pagination"]["total"], 1);

        let unfollow = || test::TestRequest::delete().uri(&format!("/api/v1/learning/courses/{}/follow", course.id));
        assert_eq!(
            test::call_service(&app, authed(unfollow(), &student).to_request()).await.status(),
            StatusCode::OK
        );
        assert_eq!(
            test::call_service(&app, authed(unfollow(), &student).to_request()).await.status(),
            StatusCode::NOT_FOUND
        );
    }

    #[test_log::test(actix_web::test)]
    async fn test_teacher_search_and_stats_are_public() {
        let fixture = Fixture::new().await;
        let (teacher, _) = fixture.user("grace", UserRole::Teacher).await;
        fixture.course(&teacher, 0).await;
        let app = app!(fixture);

        let req = test::TestRequest::get().uri("/api/v1/catalog/teachers/search?keyword=gra").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["items"][0]["teacher"]["id"], teacher.id);
        assert_eq!(body["data"]["items"][0]["active_course_count"], 1);

        let req = test::TestRequest::get().uri("/api/v1/catalog/teachers/suggest?term=g").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], json!([]));

        let long = "x".repeat(101);
        let req = test::TestRequest::get()
            .uri(&format!("/api/v1/catalog/teachers/search?keyword={long}"))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/v1/catalog/stats").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["published_courses"], 1);
        assert_eq!(body["data"]["total_teachers"], 1);
    }
}
