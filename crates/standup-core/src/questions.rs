//! Question registry: which questions a team is asked, in which order

use std::collections::HashSet;
use uuid::Uuid;

use crate::model::Question;

/// Ordered view over the question list
///
/// The backing slice must be in insertion order; sorting by display order is
/// stable so equal orders keep that sequence.
#[derive(Debug, Clone, Copy)]
pub struct QuestionRegistry<'a> {
    questions: &'a [Question],
}

impl<'a> QuestionRegistry<'a> {
    pub fn new(questions: &'a [Question]) -> Self {
        Self { questions }
    }

    pub fn get(&self, id: Uuid) -> Option<&'a Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    /// Active questions shown to `team_id` on the submission form
    pub fn applicable(&self, team_id: Uuid) -> Vec<&'a Question> {
        self.ordered(|q| q.is_active && q.applies_to(team_id))
    }

    /// Questions a report for `team_id` has rows for
    ///
    /// Inactive questions are included only when `answered` contains them,
    /// so retired questions still show up for historical data.
    pub fn for_report(&self, team_id: Uuid, answered: &HashSet<Uuid>) -> Vec<&'a Question> {
        self.ordered(|q| q.applies_to(team_id) && (q.is_active || answered.contains(&q.id)))
    }

    fn ordered(&self, keep: impl Fn(&Question) -> bool) -> Vec<&'a Question> {
        let mut selected: Vec<&Question> = self.questions.iter().filter(|q| keep(q)).collect();
        selected.sort_by_key(|q| q.display_order);
        selected
    }
}
