//! 基于内存 SQLite 的存储层测试

use std::sync::Arc;

use super::SeaOrmStorage;
use crate::models::categories::CategoryDeleteOutcome;
use crate::models::courses::entities::{Course, CourseDeleteOutcome, CourseStatus};
use crate::models::courses::quiz::QuestionRequest;
use crate::models::assignments::NewAssignment;
use crate::models::courses::requests::{CourseUpdate, CreateLessonRequest, NewCourse};
use crate::models::live::{JoinOutcome, NewLiveRoom};
use crate::models::payments::{PaymentApproval, PaymentStatus, PaymentTransition};
use crate::models::users::entities::{User, UserRole};
use crate::models::users::requests::NewUser;
use crate::services::notifications::NotificationDispatcher;
use crate::storage::Storage;

async fn memory_storage() -> Arc<dyn Storage> {
    Arc::new(SeaOrmStorage::in_memory().await.unwrap())
}

async fn user(storage: &Arc<dyn Storage>, name: &str, role: UserRole) -> User {
    storage
        .create_user(NewUser {
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "x".to_string(),
            full_name: name.to_uppercase(),
            role,
        })
        .await
        .unwrap()
}

async fn course(storage: &Arc<dyn Storage>, teacher: &User, price: i64, category_ids: Vec<i64>) -> Course {
    storage
        .create_course(NewCourse {
            teacher_id: teacher.id,
            title: "Ownership in Practice".to_string(),
            description: "Borrowing without tears".to_string(),
            price,
            thumbnail_url: None,
            status: CourseStatus::Active,
            category_ids,
        })
        .await
        .unwrap()
}

fn lesson(title: &str) -> CreateLessonRequest {
    CreateLessonRequest {
        title: title.to_string(),
        content: "notes".to_string(),
        duration_minutes: 10,
        video_url: None,
        video_required: false,
        position: None,
    }
}

fn question(correct: &str) -> QuestionRequest {
    QuestionRequest {
        question_text: "Which type moves?".to_string(),
        option_a: "String".to_string(),
        option_b: "i32".to_string(),
        option_c: None,
        option_d: None,
        correct_answer: correct.to_string(),
    }
}

#[test_log::test(tokio::test)]
async fn test_category_delete_refused_while_in_use() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "turing", UserRole::Teacher).await;
    let category = storage
        .create_category("Systems".to_string(), None)
        .await
        .unwrap();
    let used = course(&storage, &teacher, 0, vec![category.id]).await;

    assert_eq!(
        storage.delete_category(category.id).await.unwrap(),
        CategoryDeleteOutcome::InUse(1)
    );

    assert_eq!(storage.delete_course(used.id).await.unwrap(), CourseDeleteOutcome::Deleted);
    assert_eq!(
        storage.delete_category(category.id).await.unwrap(),
        CategoryDeleteOutcome::Deleted
    );
    assert!(storage.get_category_by_id(category.id).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_payment_transition_checks_current_status() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "knuth", UserRole::Teacher).await;
    let student = user(&storage, "liskov", UserRole::User).await;
    let paid = course(&storage, &teacher, 2500, vec![]).await;
    let payment = storage
        .create_payment(student.id, paid.id, paid.price, "bank_transfer".to_string())
        .await
        .unwrap();

    let confirmed = storage
        .transition_payment(
            payment.id,
            PaymentStatus::CONFIRMABLE,
            PaymentStatus::WaitingConfirm,
            None,
        )
        .await
        .unwrap();
    assert!(matches!(
        confirmed,
        PaymentTransition::Changed(ref p) if p.status == PaymentStatus::WaitingConfirm
    ));

    // 第二次确认时状态已不是 pending
    assert!(matches!(
        storage
            .transition_payment(
                payment.id,
                PaymentStatus::CONFIRMABLE,
                PaymentStatus::WaitingConfirm,
                None,
            )
            .await
            .unwrap(),
        PaymentTransition::Rejected { current: PaymentStatus::WaitingConfirm }
    ));

    assert!(matches!(
        storage.approve_payment(payment.id).await.unwrap(),
        PaymentApproval::Approved { .. }
    ));
    // 审核通过后驳回与取消都不再生效，状态与备注保持不变
    for (from, to) in [
        (PaymentStatus::REJECTABLE, PaymentStatus::Rejected),
        (PaymentStatus::CANCELLABLE, PaymentStatus::Failed),
    ] {
        assert!(matches!(
            storage
                .transition_payment(payment.id, from, to, Some("late".to_string()))
                .await
                .unwrap(),
            PaymentTransition::Rejected { current: PaymentStatus::Success }
        ));
    }
    let stored = storage.get_payment_by_id(payment.id).await.unwrap().unwrap();
    assert_eq!(stored.status, PaymentStatus::Success);
    assert!(stored.note.is_none());

    assert!(matches!(
        storage
            .transition_payment(9999, PaymentStatus::REJECTABLE, PaymentStatus::Rejected, None)
            .await
            .unwrap(),
        PaymentTransition::NotFound
    ));
}

#[test_log::test(tokio::test)]
async fn test_payment_approval_enrolls_once() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "hopper", UserRole::Teacher).await;
    let student = user(&storage, "lovelace", UserRole::User).await;
    let paid = course(&storage, &teacher, 4900, vec![]).await;

    let payment = storage
        .create_payment(student.id, paid.id, paid.price, "bank_transfer".to_string())
        .await
        .unwrap();
    assert!(storage.has_blocking_payment(student.id, paid.id).await.unwrap());

    let enrollment = match storage.approve_payment(payment.id).await.unwrap() {
        PaymentApproval::Approved { payment, enrollment } => {
            assert_eq!(payment.status, PaymentStatus::Success);
            enrollment
        }
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(enrollment.user_id, student.id);
    assert!(enrollment.is_active());

    assert!(matches!(
        storage.approve_payment(payment.id).await.unwrap(),
        PaymentApproval::AlreadySucceeded
    ));
    assert_eq!(storage.list_enrolled_student_ids(paid.id).await.unwrap(), vec![student.id]);

    // 有成功支付的课程不能删除
    assert_eq!(
        storage.delete_course(paid.id).await.unwrap(),
        CourseDeleteOutcome::HasPayments
    );
}

#[test_log::test(tokio::test)]
async fn test_quiz_with_invalid_question_rolls_back() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "knuth", UserRole::Teacher).await;
    let owned = course(&storage, &teacher, 0, vec![]).await;

    let err = storage
        .create_quiz(owned.id, "Week 1".to_string(), 20, vec![question("A"), question("Z")])
        .await
        .unwrap_err();
    assert!(err.message().contains("Question 2"));
    assert!(storage.list_quizzes(owned.id).await.unwrap().is_empty());

    let (quiz, questions) = storage
        .create_quiz(owned.id, "Week 1".to_string(), 20, vec![question("A"), question("b")])
        .await
        .unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(storage.list_quizzes(owned.id).await.unwrap()[0].quiz.id, quiz.id);
}

#[test_log::test(tokio::test)]
async fn test_progress_recomputed_and_sticky() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "ritchie", UserRole::Teacher).await;
    let student = user(&storage, "thompson", UserRole::User).await;
    let free = course(&storage, &teacher, 0, vec![]).await;
    storage.enroll_user(student.id, free.id).await.unwrap();

    let first = storage.create_lesson(free.id, lesson("Intro")).await.unwrap();
    storage.create_lesson(free.id, lesson("Traits")).await.unwrap();

    let (progress, course_progress) = storage
        .record_lesson_progress(student.id, &first, 300.0, true)
        .await
        .unwrap();
    assert!(progress.completed);
    assert_eq!(course_progress, 50.0);

    // 已完成的课时不会因后续上报而回退
    let (progress, course_progress) = storage
        .record_lesson_progress(student.id, &first, 10.0, false)
        .await
        .unwrap();
    assert!(progress.completed);
    assert_eq!(progress.watched_seconds, 300.0);
    assert_eq!(course_progress, 50.0);

    let enrollment = storage.get_enrollment(student.id, free.id).await.unwrap().unwrap();
    assert_eq!(enrollment.progress, 50.0);
}

#[test_log::test(tokio::test)]
async fn test_live_room_capacity_excludes_host() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "host", UserRole::Teacher).await;
    let a = user(&storage, "alice", UserRole::User).await;
    let b = user(&storage, "bob", UserRole::User).await;
    let c = user(&storage, "carol", UserRole::User).await;

    let room = storage
        .create_live_room(NewLiveRoom {
            id: uuid::Uuid::new_v4().to_string(),
            teacher_id: teacher.id,
            title: "Office hours".to_string(),
            description: None,
            max_participants: 2,
        })
        .await
        .unwrap();

    assert_eq!(storage.join_live_room(&room.id, teacher.id).await.unwrap(), JoinOutcome::AlreadyJoined);
    assert_eq!(storage.join_live_room(&room.id, a.id).await.unwrap(), JoinOutcome::Joined);
    assert_eq!(storage.join_live_room(&room.id, a.id).await.unwrap(), JoinOutcome::AlreadyJoined);
    assert_eq!(storage.join_live_room(&room.id, b.id).await.unwrap(), JoinOutcome::Joined);
    assert_eq!(storage.join_live_room(&room.id, c.id).await.unwrap(), JoinOutcome::Full);

    assert!(storage.leave_live_room(&room.id, b.id).await.unwrap());
    assert_eq!(storage.join_live_room(&room.id, c.id).await.unwrap(), JoinOutcome::Joined);

    let ended = storage.end_live_room(&room.id).await.unwrap().unwrap();
    assert!(!ended.is_active());
    assert!(ended.ended_at.is_some());
    assert!(!storage.is_live_participant(&room.id, c.id).await.unwrap());
    assert_eq!(storage.join_live_room(&room.id, a.id).await.unwrap(), JoinOutcome::Ended);
    assert_eq!(storage.join_live_room("missing", a.id).await.unwrap(), JoinOutcome::NotFound);
}

#[test_log::test(tokio::test)]
async fn test_lesson_fan_out_dedups_and_skips_teacher() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "liskov", UserRole::Teacher).await;
    let both = user(&storage, "both", UserRole::User).await;
    let follower = user(&storage, "fan", UserRole::User).await;
    let owned = course(&storage, &teacher, 0, vec![]).await;

    storage.enroll_user(both.id, owned.id).await.unwrap();
    assert!(storage.toggle_follow(both.id, teacher.id).await.unwrap());
    assert!(storage.toggle_follow(follower.id, teacher.id).await.unwrap());

    let new_lesson = storage.create_lesson(owned.id, lesson("Subtyping")).await.unwrap();
    let delivered = NotificationDispatcher::notify_new_lesson(&storage, &owned, &new_lesson).await;
    assert_eq!(delivered, 2);

    assert_eq!(storage.count_unread_notifications(both.id).await.unwrap(), 1);
    assert_eq!(storage.count_unread_notifications(follower.id).await.unwrap(), 1);
    assert_eq!(storage.count_unread_notifications(teacher.id).await.unwrap(), 0);
}

#[test_log::test(tokio::test)]
async fn test_submissions_versioned_and_graded() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "hopper", UserRole::Teacher).await;
    let student = user(&storage, "hamilton", UserRole::User).await;
    let owned = course(&storage, &teacher, 0, vec![]).await;
    let assignment = storage
        .create_assignment(
            owned.id,
            NewAssignment {
                title: "Implement a linked list".to_string(),
                description: String::new(),
                due_at: Some(chrono::Utc::now().timestamp() - 3600),
            },
        )
        .await
        .unwrap();

    let first = storage
        .create_submission(&assignment, student.id, "v1".to_string())
        .await
        .unwrap();
    let second = storage
        .create_submission(&assignment, student.id, "v2".to_string())
        .await
        .unwrap();
    assert_eq!((first.version, second.version), (1, 2));
    assert!(second.is_late);

    let mine = storage.list_my_assignments(student.id, owned.id).await.unwrap();
    assert_eq!(mine[0].latest_submission.as_ref().map(|s| s.version), Some(2));

    // 只给旧版本评分，最新版本仍算未评
    storage
        .grade_submission(first.id, 6.5, None, teacher.id)
        .await
        .unwrap();
    let summary = &storage.list_assignments(owned.id).await.unwrap()[0];
    assert_eq!((summary.submitter_count, summary.graded_count), (1, 0));

    let graded = storage
        .grade_submission(second.id, 9.0, Some("Nice".to_string()), teacher.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(graded.grade, Some(9.0));
    assert_eq!(graded.graded_by, Some(teacher.id));
    let summary = &storage.list_assignments(owned.id).await.unwrap()[0];
    assert_eq!(summary.graded_count, 1);

    let history = storage
        .list_user_submissions(student.id, 1, 10)
        .await
        .unwrap();
    assert_eq!(history.pagination.total, 2);
    assert_eq!(history.items[0].course_title, owned.title);
    assert_eq!(history.items[0].assignment_title, "Implement a linked list");

    assert!(storage.delete_assignment(assignment.id).await.unwrap());
    assert!(storage.get_submission_by_id(first.id).await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn test_course_follow_lists_active_courses() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "lovelace", UserRole::Teacher).await;
    let student = user(&storage, "babbage", UserRole::User).await;
    let followed = course(&storage, &teacher, 0, vec![]).await;

    assert!(storage.follow_course(student.id, followed.id).await.unwrap());
    assert!(!storage.follow_course(student.id, followed.id).await.unwrap());

    let followers = storage
        .list_course_followers(followed.id, 1, 10)
        .await
        .unwrap();
    assert_eq!(followers.items.len(), 1);
    assert_eq!(followers.items[0].user.id, student.id);
    assert_eq!(
        storage
            .list_followed_courses(student.id, 1, 10)
            .await
            .unwrap()
            .pagination
            .total,
        1
    );

    // 下架后不再出现在关注列表
    storage
        .update_course(
            followed.id,
            CourseUpdate {
                status: Some(CourseStatus::Pending),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(
        storage
            .list_followed_courses(student.id, 1, 10)
            .await
            .unwrap()
            .items
            .is_empty()
    );

    assert!(storage.unfollow_course(student.id, followed.id).await.unwrap());
    assert!(!storage.unfollow_course(student.id, followed.id).await.unwrap());
}

#[test_log::test(tokio::test)]
async fn test_home_statistics_count_active_courses() {
    let storage = memory_storage().await;
    let teacher = user(&storage, "ritchie", UserRole::Teacher).await;
    let student = user(&storage, "thompson", UserRole::User).await;
    let live = course(&storage, &teacher, 0, vec![]).await;
    storage.create_lesson(live.id, lesson("Pointers")).await.unwrap();
    storage.create_lesson(live.id, lesson("Arrays")).await.unwrap();
    storage.enroll_user(student.id, live.id).await.unwrap();

    let draft = storage
        .create_course(NewCourse {
            teacher_id: teacher.id,
            title: "Unreleased".to_string(),
            description: String::new(),
            price: 0,
            thumbnail_url: None,
            status: CourseStatus::Pending,
            category_ids: vec![],
        })
        .await
        .unwrap();
    storage.create_lesson(draft.id, lesson("Draft")).await.unwrap();
    storage.enroll_user(student.id, draft.id).await.unwrap();

    let stats = storage.get_home_statistics(0).await.unwrap();
    assert_eq!(stats.total_courses, 2);
    assert_eq!(stats.published_courses, 1);
    assert_eq!(stats.total_lessons, 2);
    assert_eq!(stats.total_students, 1);
    assert_eq!(stats.total_teachers, 1);
    assert_eq!(stats.new_courses_this_month, 1);

    let future = chrono::Utc::now().timestamp() + 86_400;
    assert_eq!(
        storage.get_home_statistics(future).await.unwrap().new_courses_this_month,
        0
    );
}

#[test_log::test(tokio::test)]
async fn test_teacher_search_skips_students() {
    let storage = memory_storage().await;
    let ada = user(&storage, "ada", UserRole::Teacher).await;
    let alan = user(&storage, "alan", UserRole::Teacher).await;
    user(&storage, "alice", UserRole::User).await;
    course(&storage, &alan, 0, vec![]).await;

    let found = storage
        .search_teachers(Some("a".to_string()), 1, 12)
        .await
        .unwrap();
    let ids: Vec<i64> = found.items.iter().map(|t| t.teacher.id).collect();
    assert_eq!(ids, vec![ada.id, alan.id]);
    assert_eq!(found.items[1].active_course_count, 1);
    assert_eq!(found.items[1].top_courses.len(), 1);

    let suggestions = storage.suggest_teachers("al", 10).await.unwrap();
    assert_eq!(suggestions.len(), 1);
    assert_eq!(suggestions[0].id, alan.id);
    assert_eq!(suggestions[0].active_course_count, 1);
}
