use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::store::{already_submitted, Store};
use crate::error::Result;
use crate::models::answer::{Answer, NewAnswer};
use crate::models::question::{NewQuestion, Question};
use crate::models::test::{NewTest, Test};
use crate::models::test_assignment::TestAssignment;
use crate::models::test_attempt::{AttemptCompletion, TestAttempt};
use crate::models::user::{NewUser, Role, User};

const USER_COLUMNS: &str = "id, email, name, role, created_at";
const TEST_COLUMNS: &str = "id, title, description, created_by, created_at";
const QUESTION_COLUMNS: &str =
    "id, test_id, position, content, question_type, options, correct_answer, points";
const ASSIGNMENT_COLUMNS: &str = "id, test_id, student_id, assigned_by, assigned_at";
const ATTEMPT_COLUMNS: &str = "id, test_id, student_id, start_time, end_time, score, completed";
const ANSWER_COLUMNS: &str =
    "id, attempt_id, question_id, selected_option, is_correct, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn get_user(&self, id: Uuid) -> Result<User> {
        let user =
            sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(user)
    }

    async fn create_user_if_absent(&self, user: NewUser) -> Result<User> {
        // The no-op update makes RETURNING yield the existing row on conflict.
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (id, email, name, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(user.email)
        .bind(user.name)
        .bind(user.role)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users_by_role(&self, role: Role) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 ORDER BY name, email"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create_test_with_questions(
        &self,
        test: NewTest,
        questions: Vec<NewQuestion>,
    ) -> Result<(Test, Vec<Question>)> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Test>(&format!(
            r#"
            INSERT INTO tests (id, title, description, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {TEST_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(test.title)
        .bind(test.description)
        .bind(test.created_by)
        .fetch_one(&mut *tx)
        .await?;

        let mut stored = Vec::with_capacity(questions.len());
        for (position, q) in questions.into_iter().enumerate() {
            let row = sqlx::query_as::<_, Question>(&format!(
                r#"
                INSERT INTO questions (
                    id, test_id, position, content, question_type, options, correct_answer, points
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING {QUESTION_COLUMNS}
                "#
            ))
            .bind(Uuid::new_v4())
            .bind(created.id)
            .bind(position as i32)
            .bind(q.content)
            .bind(q.question_type)
            .bind(q.options)
            .bind(q.correct_answer)
            .bind(q.points)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(row);
        }

        tx.commit().await?;
        Ok((created, stored))
    }

    async fn get_test(&self, id: Uuid) -> Result<Test> {
        let test =
            sqlx::query_as::<_, Test>(&format!("SELECT {TEST_COLUMNS} FROM tests WHERE id = $1"))
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(test)
    }

    async fn list_tests_created_by(&self, user_id: Uuid) -> Result<Vec<Test>> {
        let tests = sqlx::query_as::<_, Test>(&format!(
            "SELECT {TEST_COLUMNS} FROM tests WHERE created_by = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    async fn list_tests_assigned_to(&self, student_id: Uuid) -> Result<Vec<Test>> {
        let tests = sqlx::query_as::<_, Test>(
            r#"
            SELECT t.id, t.title, t.description, t.created_by, t.created_at
            FROM tests t
            JOIN test_assignments a ON a.test_id = t.id
            WHERE a.student_id = $1
            ORDER BY a.assigned_at DESC
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(tests)
    }

    async fn list_questions(&self, test_id: Uuid) -> Result<Vec<Question>> {
        let questions = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE test_id = $1 ORDER BY position"
        ))
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(questions)
    }

    async fn get_question(&self, id: Uuid) -> Result<Question> {
        let question = sqlx::query_as::<_, Question>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(question)
    }

    async fn assign_test(
        &self,
        test_id: Uuid,
        student_ids: Vec<Uuid>,
        assigned_by: Uuid,
    ) -> Result<Vec<TestAssignment>> {
        let mut tx = self.pool.begin().await?;

        for student_id in student_ids {
            sqlx::query(
                r#"
                INSERT INTO test_assignments (id, test_id, student_id, assigned_by)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (test_id, student_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(test_id)
            .bind(student_id)
            .bind(assigned_by)
            .execute(&mut *tx)
            .await?;
        }

        let assignments = sqlx::query_as::<_, TestAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM test_assignments WHERE test_id = $1 ORDER BY assigned_at"
        ))
        .bind(test_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(assignments)
    }

    async fn list_assignments(&self, test_id: Uuid) -> Result<Vec<TestAssignment>> {
        let assignments = sqlx::query_as::<_, TestAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM test_assignments WHERE test_id = $1 ORDER BY assigned_at"
        ))
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(assignments)
    }

    async fn is_assigned(&self, test_id: Uuid, student_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM test_assignments WHERE test_id = $1 AND student_id = $2)",
        )
        .bind(test_id)
        .bind(student_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn create_attempt(
        &self,
        test_id: Uuid,
        student_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<TestAttempt> {
        let attempt = sqlx::query_as::<_, TestAttempt>(&format!(
            r#"
            INSERT INTO test_attempts (id, test_id, student_id, start_time, completed)
            VALUES ($1, $2, $3, $4, FALSE)
            RETURNING {ATTEMPT_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(test_id)
        .bind(student_id)
        .bind(start_time)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn get_attempt(&self, id: Uuid) -> Result<TestAttempt> {
        let attempt = sqlx::query_as::<_, TestAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM test_attempts WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn list_attempts_by_student(&self, student_id: Uuid) -> Result<Vec<TestAttempt>> {
        let attempts = sqlx::query_as::<_, TestAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM test_attempts WHERE student_id = $1 ORDER BY start_time DESC"
        ))
        .bind(student_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(attempts)
    }

    async fn complete_attempt(
        &self,
        attempt_id: Uuid,
        answers: Vec<NewAnswer>,
        completion: AttemptCompletion,
    ) -> Result<TestAttempt> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent submissions of the same attempt.
        let attempt = sqlx::query_as::<_, TestAttempt>(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM test_attempts WHERE id = $1 FOR UPDATE"
        ))
        .bind(attempt_id)
        .fetch_one(&mut *tx)
        .await?;

        if attempt.completed {
            return Err(already_submitted(attempt_id));
        }

        for answer in answers {
            sqlx::query(
                r#"
                INSERT INTO answers (id, attempt_id, question_id, selected_option, is_correct)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(attempt_id)
            .bind(answer.question_id)
            .bind(answer.selected_option)
            .bind(answer.is_correct)
            .execute(&mut *tx)
            .await?;
        }

        let updated = sqlx::query_as::<_, TestAttempt>(&format!(
            r#"
            UPDATE test_attempts
            SET completed = TRUE, score = $1, end_time = $2
            WHERE id = $3
            RETURNING {ATTEMPT_COLUMNS}
            "#
        ))
        .bind(completion.score)
        .bind(completion.end_time)
        .bind(attempt_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(updated)
    }

    async fn list_answers(&self, attempt_id: Uuid) -> Result<Vec<Answer>> {
        let answers = sqlx::query_as::<_, Answer>(&format!(
            "SELECT {ANSWER_COLUMNS} FROM answers WHERE attempt_id = $1 ORDER BY created_at"
        ))
        .bind(attempt_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(answers)
    }
}
