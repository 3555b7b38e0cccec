use super::score::overall_percent;
use super::*;

/// Lightweight description of the stage being played
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageView {
    pub id: StageId,
    pub name: String,
    pub question_count: usize,
}

/// Immutable view of the game for rendering
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GameSnapshot {
    pub phase: GamePhase,
    /// Only present while a game is in progress
    pub step: Option<QuestionStep>,
    pub stage_index: usize,
    pub question_index: usize,
    pub total_stages: usize,
    pub seconds_remaining: u32,
    pub stage: Option<StageView>,
    pub question: Option<Question>,
    pub self_answer: Option<usize>,
    pub self_source: Option<AnswerSource>,
    /// Hidden until the question is revealed
    pub counterpart_answer: Option<usize>,
    pub counterpart_source: Option<AnswerSource>,
    /// The other participant has locked in (answer itself may still be hidden)
    pub counterpart_locked: bool,
    pub cumulative_score: u32,
    pub stage_results: Vec<StageResult>,
    /// Resolved share of the current stage's questions
    pub stage_progress: f32,
    /// Percentage across all stages, once the summary is reached
    pub overall_percent: Option<u8>,
}

impl CompatibilityGame {
    /// Snapshot of the session plus derived view fields. Side-effect free.
    pub fn state(&self) -> GameSnapshot {
        let s = &self.session;
        let in_progress = s.phase == GamePhase::InProgress;
        let revealing = in_progress && s.step == QuestionStep::Revealing;

        let stage = if in_progress {
            self.stages.get(s.stage_index)
        } else {
            None
        };
        let question = stage.and_then(|st| st.questions.get(s.question_index));

        let stage_progress = match stage {
            Some(st) => {
                let resolved = s.question_index + usize::from(revealing);
                resolved as f32 / st.questions.len() as f32
            }
            None if s.phase == GamePhase::Summary => 1.0,
            None => 0.0,
        };

        let counterpart = if revealing { s.counterpart_answer } else { None };

        GameSnapshot {
            phase: s.phase,
            step: in_progress.then_some(s.step),
            stage_index: s.stage_index,
            question_index: s.question_index,
            total_stages: self.stages.len(),
            seconds_remaining: s.seconds_remaining,
            stage: stage.map(|st| StageView {
                id: st.id.clone(),
                name: st.name.clone(),
                question_count: st.questions.len(),
            }),
            question: question.cloned(),
            self_answer: s.self_answer.map(|a| a.index),
            self_source: s.self_answer.map(|a| a.source),
            counterpart_answer: counterpart.map(|a| a.index),
            counterpart_source: counterpart.map(|a| a.source),
            counterpart_locked: s.counterpart_answer.is_some(),
            cumulative_score: s.cumulative_score,
            stage_results: s.stage_results.clone(),
            stage_progress,
            overall_percent: (s.phase == GamePhase::Summary)
                .then(|| overall_percent(&s.stage_results)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    #[test]
    fn test_idle_snapshot() {
        let game = game(CounterpartMode::Simulated);
        let snap = game.state();
        assert_eq!(snap.phase, GamePhase::Idle);
        assert!(snap.step.is_none());
        assert!(snap.stage.is_none());
        assert!(snap.question.is_none());
        assert_eq!(snap.total_stages, 0);
        assert_eq!(snap.stage_progress, 0.0);
    }

    #[test]
    fn test_in_progress_snapshot() {
        let mut game = game(CounterpartMode::Simulated);
        game.start(vec![stage("dates", 4)]).unwrap();

        let snap = game.state();
        assert_eq!(snap.step, Some(QuestionStep::AwaitingAnswer));
        assert_eq!(snap.stage.as_ref().map(|s| s.id.as_str()), Some("dates"));
        assert_eq!(snap.stage.as_ref().map(|s| s.question_count), Some(4));
        assert_eq!(
            snap.question.as_ref().map(|q| q.prompt.as_str()),
            Some("dates question 1")
        );
        assert_eq!(snap.stage_progress, 0.0);

        game.submit_answer(2).unwrap();
        let snap = game.state();
        assert_eq!(snap.step, Some(QuestionStep::Revealing));
        assert_eq!(snap.self_answer, Some(2));
        assert!(snap.counterpart_answer.is_some());
        assert_eq!(snap.counterpart_source, Some(AnswerSource::Simulated));
        assert_eq!(snap.stage_progress, 0.25);
    }

    #[test]
    fn test_remote_answer_hidden_until_reveal() {
        let mut game = game(CounterpartMode::Remote);
        game.start(vec![stage("dates", 1)]).unwrap();
        game.record_counterpart_answer(3).unwrap();

        let snap = game.state();
        assert!(snap.counterpart_locked);
        assert!(snap.counterpart_answer.is_none());

        game.submit_answer(3).unwrap();
        let snap = game.state();
        assert_eq!(snap.counterpart_answer, Some(3));
        assert_eq!(snap.cumulative_score, 20);
    }

    #[test]
    fn test_summary_snapshot() {
        let mut game = game(CounterpartMode::Remote);
        game.start(vec![stage("a", 1), stage("b", 1)]).unwrap();
        game.submit_answer(0).unwrap();
        game.record_counterpart_answer(0).unwrap();
        game.advance();
        game.submit_answer(0).unwrap();
        game.record_counterpart_answer(1).unwrap();
        game.advance();

        let snap = game.state();
        assert_eq!(snap.phase, GamePhase::Summary);
        assert!(snap.step.is_none());
        assert!(snap.question.is_none());
        assert_eq!(snap.stage_progress, 1.0);
        assert_eq!(snap.stage_results.len(), 2);
        assert_eq!(snap.stage_results[0].percent, 100);
        assert_eq!(snap.stage_results[1].percent, 50);
        assert_eq!(snap.overall_percent, Some(75));
    }

    #[test]
    fn test_state_is_pure() {
        let mut game = game(CounterpartMode::Simulated);
        game.start(vec![stage("a", 2)]).unwrap();
        assert_eq!(game.state(), game.state());
    }
}
