use std::collections::HashMap;

use uuid::Uuid;

use crate::models::answer::NewAnswer;
use crate::models::question::Question;

#[derive(Debug, Clone, PartialEq)]
pub struct GradeOutcome {
    pub answers: Vec<NewAnswer>,
    pub earned_points: i64,
    pub total_points: i64,
    /// Unrounded percentage in `0.0..=100.0`.
    pub score: f64,
}

impl GradeOutcome {
    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_correct).count()
    }
}

pub struct GradingService;

impl GradingService {
    /// Grades one submission. Every question yields exactly one answer; a
    /// missing selection is recorded as the empty string.
    pub fn grade(questions: &[Question], selections: &HashMap<Uuid, String>) -> GradeOutcome {
        let mut total_points: i64 = 0;
        let mut earned_points: i64 = 0;
        let mut answers = Vec::with_capacity(questions.len());

        for q in questions {
            let selected_option = selections.get(&q.id).cloned().unwrap_or_default();
            let is_correct = q.is_correct(&selected_option);

            total_points += i64::from(q.points);
            if is_correct {
                earned_points += i64::from(q.points);
            }

            answers.push(NewAnswer {
                question_id: q.id,
                selected_option,
                is_correct,
            });
        }

        GradeOutcome {
            answers,
            earned_points,
            total_points,
            score: percentage(earned_points, total_points),
        }
    }

    /// Questions with no selection, or an empty one.
    pub fn unanswered_count(questions: &[Question], selections: &HashMap<Uuid, String>) -> usize {
        questions
            .iter()
            .filter(|q| selections.get(&q.id).map_or(true, |s| s.is_empty()))
            .count()
    }
}

pub fn percentage(earned_points: i64, total_points: i64) -> f64 {
    if total_points > 0 {
        (earned_points as f64 / total_points as f64) * 100.0
    } else {
        0.0
    }
}

/// Scores are stored unrounded; rounding happens only when presenting them.
pub fn display_score(score: f64) -> i64 {
    score.round() as i64
}
