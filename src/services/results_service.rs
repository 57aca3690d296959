use std::collections::HashMap;

use futures::future::try_join_all;
use uuid::Uuid;

use crate::database::SharedStore;
use crate::dto::attempt_dto::{AnswerBreakdown, ResultsResponse};
use crate::error::Result;
use crate::middleware::auth::Session;
use crate::models::question::Question;
use crate::services::attempt_service::AttemptService;
use crate::services::grading_service::display_score;

#[derive(Clone)]
pub struct ResultsService {
    store: SharedStore,
    attempts: AttemptService,
}

impl ResultsService {
    pub fn new(store: SharedStore) -> Self {
        let attempts = AttemptService::new(store.clone());
        Self { store, attempts }
    }

    /// Read-only join of attempt, test and answered questions.
    pub async fn results(&self, session: &Session, attempt_id: Uuid) -> Result<ResultsResponse> {
        let (attempt, test) = self.attempts.visible_attempt(session, attempt_id).await?;
        let answers = self.store.list_answers(attempt.id).await?;

        // One lookup per answered question, all in flight at once.
        let questions: HashMap<Uuid, Question> = try_join_all(
            answers
                .iter()
                .map(|a| self.store.get_question(a.question_id)),
        )
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

        let mut breakdown: Vec<AnswerBreakdown> = answers
            .into_iter()
            .filter_map(|a| {
                let q = questions.get(&a.question_id)?;
                Some(AnswerBreakdown {
                    question_id: q.id,
                    position: q.position,
                    content: q.content.clone(),
                    question_type: q.question_type,
                    choices: q.choices(),
                    selected_option: a.selected_option,
                    correct_answer: q.correct_answer.clone(),
                    is_correct: a.is_correct,
                    points: q.points,
                })
            })
            .collect();
        breakdown.sort_by_key(|b| b.position);

        Ok(ResultsResponse {
            display_score: attempt.score.map(display_score),
            correct_count: breakdown.iter().filter(|b| b.is_correct).count(),
            total_count: breakdown.len(),
            answers: breakdown,
            attempt,
            test: test.into(),
        })
    }
}
