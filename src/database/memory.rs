//! In-process [`Store`] used when no `DATABASE_URL` is configured and by the
//! test suites. A single lock guards all tables, so every multi-row write is
//! atomic with respect to other callers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::store::{already_submitted, Store};
use crate::error::{Error, Result};
use crate::models::answer::{Answer, NewAnswer};
use crate::models::question::{NewQuestion, Question};
use crate::models::test::{NewTest, Test};
use crate::models::test_assignment::TestAssignment;
use crate::models::test_attempt::{AttemptCompletion, TestAttempt};
use crate::models::user::{NewUser, Role, User};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    tests: Vec<Test>,
    questions: Vec<Question>,
    assignments: Vec<TestAssignment>,
    attempts: Vec<TestAttempt>,
    answers: Vec<Answer>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(kind: &str, id: Uuid) -> Error {
    Error::NotFound(format!("{} {} not found", kind, id))
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: Uuid) -> Result<User> {
        let tables = self.tables.read().await;
        tables
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| not_found("User", id))
    }

    async fn create_user_if_absent(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.users.iter().find(|u| u.email == user.email) {
            return Ok(existing.clone());
        }
        let row = User {
            id: Uuid::new_v4(),
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.push(row.clone());
        Ok(row)
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>> {
        let tables = self.tables.read().await;
        let mut users: Vec<User> = tables
            .users
            .iter()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
        Ok(users)
    }

    async fn create_test_with_questions(
        &self,
        test: NewTest,
        questions: Vec<NewQuestion>,
    ) -> Result<(Test, Vec<Question>)> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == test.created_by) {
            return Err(not_found("User", test.created_by));
        }

        let created = Test {
            id: Uuid::new_v4(),
            title: test.title,
            description: test.description,
            created_by: test.created_by,
            created_at: Utc::now(),
        };
        let stored: Vec<Question> = questions
            .into_iter()
            .enumerate()
            .map(|(position, q)| Question {
                id: Uuid::new_v4(),
                test_id: created.id,
                position: position as i32,
                content: q.content,
                question_type: q.question_type,
                options: q.options,
                correct_answer: q.correct_answer,
                points: q.points,
            })
            .collect();

        tables.tests.push(created.clone());
        tables.questions.extend(stored.iter().cloned());
        Ok((created, stored))
    }

    async fn get_test(&self, id: Uuid) -> Result<Test> {
        let tables = self.tables.read().await;
        tables
            .tests
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Test", id))
    }

    async fn list_tests_created_by(&self, user_id: Uuid) -> Result<Vec<Test>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tests
            .iter()
            .rev()
            .filter(|t| t.created_by == user_id)
            .cloned()
            .collect())
    }

    async fn list_tests_assigned_to(&self, student_id: Uuid) -> Result<Vec<Test>> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .rev()
            .filter(|a| a.student_id == student_id)
            .filter_map(|a| tables.tests.iter().find(|t| t.id == a.test_id).cloned())
            .collect())
    }

    async fn list_questions(&self, test_id: Uuid) -> Result<Vec<Question>> {
        let tables = self.tables.read().await;
        let mut questions: Vec<Question> = tables
            .questions
            .iter()
            .filter(|q| q.test_id == test_id)
            .cloned()
            .collect();
        questions.sort_by_key(|q| q.position);
        Ok(questions)
    }

    async fn get_question(&self, id: Uuid) -> Result<Question> {
        let tables = self.tables.read().await;
        tables
            .questions
            .iter()
            .find(|q| q.id == id)
            .cloned()
            .ok_or_else(|| not_found("Question", id))
    }

    async fn assign_test(
        &self,
        test_id: Uuid,
        student_ids: Vec<Uuid>,
        assigned_by: Uuid,
    ) -> Result<Vec<TestAssignment>> {
        let mut tables = self.tables.write().await;
        if !tables.tests.iter().any(|t| t.id == test_id) {
            return Err(not_found("Test", test_id));
        }
        // Check every reference before writing anything.
        if let Some(missing) = student_ids
            .iter()
            .find(|id| !tables.users.iter().any(|u| u.id == **id))
        {
            return Err(not_found("User", *missing));
        }

        let now = Utc::now();
        for student_id in student_ids {
            let exists = tables
                .assignments
                .iter()
                .any(|a| a.test_id == test_id && a.student_id == student_id);
            if !exists {
                tables.assignments.push(TestAssignment {
                    id: Uuid::new_v4(),
                    test_id,
                    student_id,
                    assigned_by,
                    assigned_at: now,
                });
            }
        }

        Ok(tables
            .assignments
            .iter()
            .filter(|a| a.test_id == test_id)
            .cloned()
            .collect())
    }

    async fn list_assignments(&self, test_id: Uuid) -> Result<Vec<TestAssignment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .filter(|a| a.test_id == test_id)
            .cloned()
            .collect())
    }

    async fn is_assigned(&self, test_id: Uuid, student_id: Uuid) -> Result<bool> {
        let tables = self.tables.read().await;
        Ok(tables
            .assignments
            .iter()
            .any(|a| a.test_id == test_id && a.student_id == student_id))
    }

    async fn create_attempt(
        &self,
        test_id: Uuid,
        student_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<TestAttempt> {
        let mut tables = self.tables.write().await;
        if !tables.tests.iter().any(|t| t.id == test_id) {
            return Err(not_found("Test", test_id));
        }
        let attempt = TestAttempt {
            id: Uuid::new_v4(),
            test_id,
            student_id,
            start_time,
            end_time: None,
            score: None,
            completed: false,
        };
        tables.attempts.push(attempt.clone());
        Ok(attempt)
    }

    async fn get_attempt(&self, id: Uuid) -> Result<TestAttempt> {
        let tables = self.tables.read().await;
        tables
            .attempts
            .iter()
            .find(|a| a.id == id)
            .cloned()
            .ok_or_else(|| not_found("Attempt", id))
    }

    async fn list_attempts_by_student(&self, student_id: Uuid) -> Result<Vec<TestAttempt>> {
        let tables = self.tables.read().await;
        let mut attempts: Vec<TestAttempt> = tables
            .attempts
            .iter()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();
        attempts.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(attempts)
    }

    async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        answers: Vec<NewAnswer>,
        completion: AttemptCompletion,
    ) -> Result<TestAttempt> {
        let mut tables = self.tables.write().await;
        let idx = tables
            .attempts
            .iter()
            .position(|a| a.id == attempt_id)
            .ok_or_else(|| not_found("Attempt", attempt_id))?;
        if tables.attempts[idx].completed {
            return Err(already_submitted(attempt_id));
        }

        let now = Utc::now();
        let rows: Vec<Answer> = answers
            .into_iter()
            .map(|a| Answer {
                id: Uuid::new_v4(),
                attempt_id,
                question_id: a.question_id,
                selected_option: a.selected_option,
                is_correct: a.is_correct,
                created_at: now,
            })
            .collect();
        tables.answers.extend(rows);

        let attempt = &mut tables.attempts[idx];
        attempt.completed = true;
        attempt.score = Some(completion.score);
        attempt.end_time = Some(completion.end_time);
        Ok(attempt.clone())
    }

    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .answers
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::QuestionType;

    async fn seed_user(store: &MemoryStore, email: &str, role: Role) -> User {
        store
            .create_user_if_absent(NewUser {
                email: email.to_string(),
                name: email.to_string(),
                role,
            })
            .await
            .unwrap()
    }

    async fn seed_test(store: &MemoryStore, tutor: &User) -> (Test, Vec<Question>) {
        store
            .create_test_with_questions(
                NewTest {
                    title: "Quiz".into(),
                    description: None,
                    created_by: tutor.id,
                },
                vec![NewQuestion {
                    content: "Sky is blue".into(),
                    question_type: QuestionType::TrueFalse,
                    options: vec![],
                    correct_answer: "True".into(),
                    points: 1,
                }],
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_user_if_absent_returns_existing_row() {
        let store = MemoryStore::new();
        let first = seed_user(&store, "t@example.com", Role::Tutor).await;
        let second = seed_user(&store, "t@example.com", Role::Student).await;
        assert_eq!(first.id, second.id);
        assert_eq!(second.role, Role::Tutor);
    }

    #[tokio::test]
    async fn assigning_same_pair_twice_keeps_one_row() {
        let store = MemoryStore::new();
        let tutor = seed_user(&store, "t@example.com", Role::Tutor).await;
        let student = seed_user(&store, "s@example.com", Role::Student).await;
        let (test, _) = seed_test(&store, &tutor).await;

        store.assign_test(test.id, vec![student.id], tutor.id).await.unwrap();
        let all = store.assign_test(test.id, vec![student.id], tutor.id).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn assign_with_unknown_student_writes_nothing() {
        let store = MemoryStore::new();
        let tutor = seed_user(&store, "t@example.com", Role::Tutor).await;
        let student = seed_user(&store, "s@example.com", Role::Student).await;
        let (test, _) = seed_test(&store, &tutor).await;

        let err = store
            .assign_test(test.id, vec![student.id, Uuid::new_v4()], tutor.id)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(store.list_assignments(test.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn complete_attempt_rejects_second_completion() {
        let store = MemoryStore::new();
        let tutor = seed_user(&store, "t@example.com", Role::Tutor).await;
        let student = seed_user(&store, "s@example.com", Role::Student).await;
        let (test, questions) = seed_test(&store, &tutor).await;
        let attempt = store
            .create_attempt(test.id, student.id, Utc::now())
            .await
            .unwrap();

        let answers = vec![NewAnswer {
            question_id: questions[0].id,
            selected_option: "True".into(),
            is_correct: true,
        }];
        let completion = AttemptCompletion {
            score: 100.0,
            end_time: Utc::now(),
        };
        store
            .complete_attempt(attempt.id, answers.clone(), completion.clone())
            .await
            .unwrap();
        let err = store
            .complete_attempt(attempt.id, answers, completion)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Conflict(_)));
        assert_eq!(store.list_answers(attempt.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_completions_let_exactly_one_through() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let tutor = seed_user(&store, "t@example.com", Role::Tutor).await;
        let student = seed_user(&store, "s@example.com", Role::Student).await;
        let (test, questions) = seed_test(&store, &tutor).await;
        let attempt = store
            .create_attempt(test.id, student.id, Utc::now())
            .await
            .unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                let answers = vec![NewAnswer {
                    question_id: questions[0].id,
                    selected_option: "True".into(),
                    is_correct: true,
                }];
                tokio::spawn(async move {
                    store
                        .complete_attempt(
                            attempt.id,
                            answers,
                            AttemptCompletion {
                                score: 100.0,
                                end_time: Utc::now(),
                            },
                        )
                        .await
                })
            })
            .collect();

        let mut succeeded = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => succeeded += 1,
                Err(err) => assert!(matches!(err, Error::Conflict(_))),
            }
        }

        assert_eq!(succeeded, 1);
        assert_eq!(store.list_answers(attempt.id).await.unwrap().len(), 1);
    }
}
