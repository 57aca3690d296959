use crate::database::SharedStore;
use crate::dto::test_dto::{
    CreateQuestion, CreateTestPayload, CreateTestResponse, QuestionView, TestDetailResponse,
    TestQuestions,
};
use crate::error::{Error, Result};
use crate::middleware::auth::Session;
use crate::models::question::{NewQuestion, QuestionType, FALSE_OPTION, TRUE_OPTION};
use crate::models::test::NewTest;
use crate::models::user::Role;
use crate::services::user_service::UserService;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct TestService {
    store: SharedStore,
    users: UserService,
}

/// A test that passed validation but is not stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct TestDraft {
    pub title: String,
    pub description: Option<String>,
    pub questions: Vec<NewQuestion>,
}

impl TestService {
    pub fn new(store: SharedStore) -> Self {
        let users = UserService::new(store.clone());
        Self { store, users }
    }

    pub async fn create_test(
        &self,
        session: &Session,
        payload: CreateTestPayload,
    ) -> Result<CreateTestResponse> {
        session.require_role(Role::Tutor)?;
        // Nothing is written unless the whole payload is valid.
        let draft = validate_test(payload)?;

        let author = self.users.ensure_user(session, Role::Tutor).await?;
        let (test, questions) = self
            .store
            .create_test_with_questions(
                NewTest {
                    title: draft.title,
                    description: draft.description,
                    created_by: author.id,
                },
                draft.questions,
            )
            .await?;

        tracing::info!(
            test_id = %test.id,
            questions = questions.len(),
            "test created"
        );
        Ok(CreateTestResponse {
            test: test.into(),
            questions,
        })
    }

    /// The creator sees correct answers; an assigned student does not.
    pub async fn get_test(&self, session: &Session, test_id: Uuid) -> Result<TestDetailResponse> {
        let test = self.store.get_test(test_id).await?;
        let caller = self
            .users
            .current_user(session)
            .await?
            .ok_or_else(|| Error::Forbidden("You do not have access to this test".to_string()))?;

        let is_creator = test.created_by == caller.id;
        if !is_creator && !self.store.is_assigned(test.id, caller.id).await? {
            return Err(Error::Forbidden(
                "You do not have access to this test".to_string(),
            ));
        }

        let questions = self.store.list_questions(test.id).await?;
        let total_points = questions.iter().map(|q| i64::from(q.points)).sum();
        let questions = if is_creator {
            TestQuestions::Authoring(questions)
        } else {
            TestQuestions::Taking(questions.iter().map(QuestionView::from).collect())
        };

        Ok(TestDetailResponse {
            test: test.into(),
            total_points,
            questions,
        })
    }
}

pub fn validate_test(payload: CreateTestPayload) -> Result<TestDraft> {
    payload.validate()?;
    let title = payload.title.trim().to_string();
    if title.is_empty() {
        return Err(Error::BadRequest("Title is required".to_string()));
    }

    let questions = payload
        .questions
        .into_iter()
        .enumerate()
        .map(|(idx, q)| validate_question(idx + 1, q))
        .collect::<Result<Vec<_>>>()?;

    Ok(TestDraft {
        title,
        description: payload.description,
        questions,
    })
}

fn validate_question(number: usize, q: CreateQuestion) -> Result<NewQuestion> {
    q.validate()?;
    let content = q.content.trim().to_string();
    if content.is_empty() {
        return Err(Error::BadRequest(format!(
            "Question {}: content is required",
            number
        )));
    }
    if q.correct_answer.trim().is_empty() {
        return Err(Error::BadRequest(format!(
            "Question {}: correct answer is required",
            number
        )));
    }

    let options = match q.question_type {
        QuestionType::MultipleChoice => {
            let options: Vec<String> = q
                .options
                .into_iter()
                .filter(|opt| !opt.trim().is_empty())
                .collect();
            if !options.contains(&q.correct_answer) {
                return Err(Error::BadRequest(format!(
                    "Question {}: correct answer must be one of the options",
                    number
                )));
            }
            options
        }
        QuestionType::TrueFalse => {
            if q.correct_answer != TRUE_OPTION && q.correct_answer != FALSE_OPTION {
                return Err(Error::BadRequest(format!(
                    "Question {}: correct answer must be \"True\" or \"False\"",
                    number
                )));
            }
            Vec::new()
        }
    };

    Ok(NewQuestion {
        content,
        question_type: q.question_type,
        options,
        correct_answer: q.correct_answer,
        points: q.points,
    })
}
