//! Runs against a real PostgreSQL database. Each test returns early when
//! `DATABASE_URL` is not set.

use std::env;
use std::sync::Arc;

use chrono::Utc;
use sqlx::PgPool;
use tutoring_backend::{
    config::Config,
    database::{
        pool::{create_pool, run_migrations},
        PgStore, Store,
    },
    error::Error,
    models::{
        answer::NewAnswer,
        question::{NewQuestion, Question, QuestionType},
        test::{NewTest, Test},
        test_attempt::AttemptCompletion,
        user::{NewUser, Role, User},
    },
};
use uuid::Uuid;

async fn connect() -> Option<(PgStore, PgPool)> {
    dotenvy::dotenv().ok();
    let database_url = env::var("DATABASE_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())?;
    let config = Config {
        server_address: "127.0.0.1:0".to_string(),
        jwt_secret: "test_secret_key".to_string(),
        database_url: Some(database_url),
        database_max_connections: 10,
        log_json: false,
    };
    let pool = create_pool(&config).await.expect("pool");
    run_migrations(&pool).await.expect("migrations");
    Some((PgStore::new(pool.clone()), pool))
}

async fn seed_user(store: &PgStore, prefix: &str, role: Role) -> User {
    store
        .create_user_if_absent(NewUser {
            email: format!("{}_{}@example.com", prefix, Uuid::new_v4()),
            name: prefix.to_string(),
            role,
        })
        .await
        .expect("seed user")
}

async fn seed_test(store: &PgStore, tutor: &User) -> (Test, Vec<Question>) {
    store
        .create_test_with_questions(
            NewTest {
                title: "Algebra Quiz".into(),
                description: None,
                created_by: tutor.id,
            },
            vec![
                NewQuestion {
                    content: "x + 1 = 3".into(),
                    question_type: QuestionType::MultipleChoice,
                    options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
                    correct_answer: "B".into(),
                    points: 2,
                },
                NewQuestion {
                    content: "Sky is blue".into(),
                    question_type: QuestionType::TrueFalse,
                    options: vec![],
                    correct_answer: "True".into(),
                    points: 1,
                },
            ],
        )
        .await
        .expect("seed test")
}

fn graded(questions: &[Question]) -> Vec<NewAnswer> {
    questions
        .iter()
        .map(|q| NewAnswer {
            question_id: q.id,
            selected_option: q.correct_answer.clone(),
            is_correct: true,
        })
        .collect()
}

fn finished() -> AttemptCompletion {
    AttemptCompletion {
        score: 100.0,
        end_time: Utc::now(),
    }
}

#[tokio::test]
async fn create_user_if_absent_returns_existing_row() {
    let Some((store, _)) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let first = seed_user(&store, "tutor", Role::Tutor).await;
    let again = store
        .create_user_if_absent(NewUser {
            email: first.email.clone(),
            name: "Someone Else".into(),
            role: Role::Student,
        })
        .await
        .unwrap();

    assert_eq!(again.id, first.id);
    assert_eq!(again.role, Role::Tutor);
    assert_eq!(again.name, "tutor");
}

#[tokio::test]
async fn questions_are_stored_in_authoring_order() {
    let Some((store, _)) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let tutor = seed_user(&store, "tutor", Role::Tutor).await;
    let (test, created) = seed_test(&store, &tutor).await;

    let stored = store.list_questions(test.id).await.unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0].id, created[0].id);
    assert_eq!(stored[0].options, vec!["A", "B", "C", "D"]);
    assert_eq!(stored[1].question_type, QuestionType::TrueFalse);
    assert!(stored.iter().all(|q| q.test_id == test.id));
}

#[tokio::test]
async fn assigning_same_pair_twice_keeps_one_row() {
    let Some((store, _)) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let tutor = seed_user(&store, "tutor", Role::Tutor).await;
    let alice = seed_user(&store, "alice", Role::Student).await;
    let bob = seed_user(&store, "bob", Role::Student).await;
    let (test, _) = seed_test(&store, &tutor).await;

    store
        .assign_test(test.id, vec![alice.id], tutor.id)
        .await
        .unwrap();
    let all = store
        .assign_test(test.id, vec![alice.id, bob.id], tutor.id)
        .await
        .unwrap();

    assert_eq!(all.len(), 2);
    assert!(store.is_assigned(test.id, alice.id).await.unwrap());
    assert!(store.is_assigned(test.id, bob.id).await.unwrap());
    let assigned = store.list_tests_assigned_to(bob.id).await.unwrap();
    assert_eq!(assigned.len(), 1);
}

#[tokio::test]
async fn assign_with_unknown_student_writes_nothing() {
    let Some((store, _)) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let tutor = seed_user(&store, "tutor", Role::Tutor).await;
    let alice = seed_user(&store, "alice", Role::Student).await;
    let (test, _) = seed_test(&store, &tutor).await;

    let result = store
        .assign_test(test.id, vec![alice.id, Uuid::new_v4()], tutor.id)
        .await;

    assert!(result.is_err());
    assert!(store.list_assignments(test.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn second_completion_is_a_conflict_and_writes_no_answers() {
    let Some((store, _)) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let tutor = seed_user(&store, "tutor", Role::Tutor).await;
    let alice = seed_user(&store, "alice", Role::Student).await;
    let (test, questions) = seed_test(&store, &tutor).await;
    let attempt = store
        .create_attempt(test.id, alice.id, Utc::now())
        .await
        .unwrap();
    assert!(!attempt.completed);

    let completed = store
        .complete_attempt(attempt.id, graded(&questions), finished())
        .await
        .unwrap();
    assert!(completed.completed);
    assert_eq!(completed.score, Some(100.0));

    let err = store
        .complete_attempt(attempt.id, graded(&questions), finished())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Conflict(_)));
    assert_eq!(
        store.list_answers(attempt.id).await.unwrap().len(),
        questions.len()
    );
}

#[tokio::test]
async fn concurrent_completions_let_exactly_one_through() {
    let Some((store, _)) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let store = Arc::new(store);
    let tutor = seed_user(&store, "tutor", Role::Tutor).await;
    let alice = seed_user(&store, "alice", Role::Student).await;
    let (test, questions) = seed_test(&store, &tutor).await;
    let attempt = store
        .create_attempt(test.id, alice.id, Utc::now())
        .await
        .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let answers = graded(&questions);
            tokio::spawn(async move {
                store
                    .complete_attempt(attempt.id, answers, finished())
                    .await
            })
        })
        .collect();

    let mut succeeded = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => succeeded += 1,
            Err(Error::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {}", other),
        }
    }

    assert_eq!(succeeded, 1);
    assert_eq!(conflicts, 7);
    assert_eq!(
        store.list_answers(attempt.id).await.unwrap().len(),
        questions.len()
    );
}

#[tokio::test]
async fn schema_rejects_completed_attempt_without_score() {
    let Some((store, pool)) = connect().await else {
        eprintln!("DATABASE_URL not set; skipping");
        return;
    };
    let tutor = seed_user(&store, "tutor", Role::Tutor).await;
    let alice = seed_user(&store, "alice", Role::Student).await;
    let (test, _) = seed_test(&store, &tutor).await;
    let attempt = store
        .create_attempt(test.id, alice.id, Utc::now())
        .await
        .unwrap();

    let err = sqlx::query("UPDATE test_attempts SET completed = TRUE WHERE id = $1")
        .bind(attempt.id)
        .execute(&pool)
        .await
        .unwrap_err();
    let code = err
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());
    assert_eq!(code.as_deref(), Some("23514"));

    let unchanged = store.get_attempt(attempt.id).await.unwrap();
    assert!(!unchanged.completed);
}
