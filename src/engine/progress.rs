//! Run lifecycle: starting, advancing through questions and stages, restarting

use super::score::stage_result;
use super::*;

impl CompatibilityGame {
    /// Begin a new run over the given stages
    pub fn start(&mut self, stages: Vec<Stage>) -> GameResult<()> {
        if self.session.phase == GamePhase::InProgress {
            return Err(GameError::InvalidState(
                "Cannot start a game while one is in progress".to_string(),
            ));
        }
        if self.config.question_seconds == 0 {
            return Err(GameError::InvalidConfiguration(
                "Question countdown must be at least one second".to_string(),
            ));
        }
        validate_stages(&stages)?;

        self.stages = stages;
        self.begin_run();
        Ok(())
    }

    /// Restart with the same stages. Only allowed from the summary.
    pub fn play_again(&mut self) -> GameResult<()> {
        if self.session.phase != GamePhase::Summary {
            return Err(GameError::InvalidState(format!(
                "Cannot play again while the game is {:?}",
                self.session.phase
            )));
        }
        self.begin_run();
        Ok(())
    }

    /// Alias of [`play_again`](Self::play_again)
    pub fn reset(&mut self) -> GameResult<()> {
        self.play_again()
    }

    /// Abandon an in-progress run and go back to idle.
    /// Returns false if no run is in progress; the summary is only left via `play_again`.
    pub fn cancel(&mut self) -> bool {
        if self.session.phase != GamePhase::InProgress {
            return false;
        }
        tracing::info!(phase = ?self.session.phase, "Game cancelled");
        self.run += 1;
        self.session = GameSession::new(GamePhase::Idle, self.config.question_seconds);
        true
    }

    fn begin_run(&mut self) {
        self.run += 1;
        self.session = GameSession::new(GamePhase::InProgress, self.config.question_seconds);
        tracing::info!(
            run = self.run,
            stages = self.stages.len(),
            "Compatibility game started"
        );
    }

    /// Move past the current question.
    ///
    /// Normally called once the reveal pause is over. Calling it while the
    /// question is still unanswered skips it without scoring.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.session.phase != GamePhase::InProgress {
            return AdvanceOutcome::Ignored;
        }
        if self.session.step == QuestionStep::AwaitingAnswer {
            tracing::debug!(
                stage = self.session.stage_index,
                question = self.session.question_index,
                "Skipping unanswered question"
            );
        }

        let question_seconds = self.config.question_seconds;
        let stage = &self.stages[self.session.stage_index];

        if self.session.question_index + 1 < stage.questions.len() {
            self.session.question_index += 1;
            self.session.begin_question(question_seconds);
            return AdvanceOutcome::NextQuestion;
        }

        let result = stage_result(stage, self.session.cumulative_score);
        tracing::info!(
            stage = %result.stage_id,
            points = result.points,
            percent = result.percent,
            "Stage completed"
        );
        self.session.stage_results.push(result.clone());
        self.session.cumulative_score = 0;

        if self.session.stage_index + 1 < self.stages.len() {
            self.session.stage_index += 1;
            self.session.question_index = 0;
            self.session.begin_question(question_seconds);
            AdvanceOutcome::NextStage(result)
        } else {
            self.session.phase = GamePhase::Summary;
            self.session.self_answer = None;
            self.session.counterpart_answer = None;
            tracing::info!(run = self.run, "Compatibility game finished");
            AdvanceOutcome::Finished(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;

    /// Answer the current question with both participants picking `(mine, theirs)`
    fn answer(game: &mut CompatibilityGame, mine: usize, theirs: usize) {
        game.submit_answer(mine).unwrap();
        game.record_counterpart_answer(theirs).unwrap();
    }

    #[test]
    fn test_start_resets_session() {
        let mut game = game(CounterpartMode::Simulated);
        game.start(vec![stage("a", 2)]).unwrap();

        let session = game.session();
        assert_eq!(session.phase, GamePhase::InProgress);
        assert_eq!(session.step, QuestionStep::AwaitingAnswer);
        assert_eq!(session.stage_index, 0);
        assert_eq!(session.question_index, 0);
        assert_eq!(session.seconds_remaining, 30);
        assert_eq!(session.cumulative_score, 0);
        assert!(session.self_answer.is_none());
        assert!(session.counterpart_answer.is_none());
        assert!(session.stage_results.is_empty());
    }

    #[test]
    fn test_start_rejects_bad_configuration() {
        let mut game = game(CounterpartMode::Simulated);
        let err = game.start(vec![stage("a", 0)]).unwrap_err();
        assert!(matches!(err, GameError::InvalidConfiguration(_)));
        assert_eq!(game.phase(), GamePhase::Idle);
    }

    #[test]
    fn test_start_rejects_zero_second_countdown() {
        let mut game = CompatibilityGame::new(GameConfig {
            question_seconds: 0,
            ..GameConfig::default()
        });
        assert!(matches!(
            game.start(vec![stage("a", 1)]),
            Err(GameError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_start_while_in_progress_fails() {
        let mut game = game(CounterpartMode::Simulated);
        game.start(vec![stage("a", 1)]).unwrap();
        assert!(matches!(
            game.start(vec![stage("b", 1)]),
            Err(GameError::InvalidState(_))
        ));
        assert_eq!(game.stages()[0].id, "a");
    }

    #[test]
    fn test_two_question_scenario() {
        let mut game = game(CounterpartMode::Simulated);
        game.start(vec![stage("a", 2)]).unwrap();

        game.submit_answer(1).unwrap();
        let after_first = game.session().cumulative_score;
        assert!(after_first == 10 || after_first == 20);

        assert_eq!(game.advance(), AdvanceOutcome::NextQuestion);
        let session = game.session();
        assert_eq!(session.question_index, 1);
        assert!(session.self_answer.is_none());
        assert!(session.counterpart_answer.is_none());
        assert_eq!(session.seconds_remaining, 30);

        game.submit_answer(2).unwrap();
        let total = game.session().cumulative_score;

        match game.advance() {
            AdvanceOutcome::Finished(result) => assert_eq!(result.points, total),
            other => panic!("Expected Finished, got {:?}", other),
        }
        assert_eq!(game.phase(), GamePhase::Summary);
        assert_eq!(game.session().stage_results.len(), 1);
        assert_eq!(game.session().stage_results[0].points, total);
    }

    #[test]
    fn test_stage_score_sums_and_resets() {
        let mut game = game(CounterpartMode::Remote);
        game.start(vec![stage("a", 3), stage("b", 1)]).unwrap();

        answer(&mut game, 0, 0); // 20
        game.advance();
        answer(&mut game, 1, 2); // 10
        game.advance();
        answer(&mut game, 3, 3); // 20
        assert_eq!(game.session().cumulative_score, 50);

        match game.advance() {
            AdvanceOutcome::NextStage(result) => {
                assert_eq!(result.stage_id, "a");
                assert_eq!(result.points, 50);
                assert_eq!(result.max_points, 60);
                assert_eq!(result.percent, 83);
            }
            other => panic!("Expected NextStage, got {:?}", other),
        }

        let session = game.session();
        assert_eq!(session.cumulative_score, 0);
        assert_eq!(session.stage_index, 1);
        assert_eq!(session.question_index, 0);
        assert_eq!(session.seconds_remaining, 30);
    }

    #[test]
    fn test_advance_exhausts_all_stages() {
        let mut game = game(CounterpartMode::Simulated);
        let stages = vec![stage("a", 2), stage("b", 3), stage("c", 1)];
        let total_questions: usize = stages.iter().map(|s| s.questions.len()).sum();
        game.start(stages).unwrap();

        for n in 0..total_questions {
            assert_eq!(game.phase(), GamePhase::InProgress);
            game.submit_answer(n % OPTION_COUNT).unwrap();
            game.advance();
        }

        assert_eq!(game.phase(), GamePhase::Summary);
        assert_eq!(game.session().stage_results.len(), 3);
        assert_eq!(game.advance(), AdvanceOutcome::Ignored);
        assert_eq!(game.session().stage_results.len(), 3);
    }

    #[test]
    fn test_advance_without_answers_skips() {
        let mut game = game(CounterpartMode::Simulated);
        game.start(vec![stage("a", 2), stage("b", 2)]).unwrap();

        for _ in 0..4 {
            game.advance();
        }

        assert_eq!(game.phase(), GamePhase::Summary);
        let results = &game.session().stage_results;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.points == 0 && r.percent == 0));
    }

    #[test]
    fn test_play_again_only_from_summary() {
        let mut game = game(CounterpartMode::Simulated);
        assert!(matches!(game.play_again(), Err(GameError::InvalidState(_))));

        game.start(vec![stage("a", 1)]).unwrap();
        assert!(matches!(game.reset(), Err(GameError::InvalidState(_))));

        game.submit_answer(0).unwrap();
        game.advance();
        assert_eq!(game.phase(), GamePhase::Summary);

        let key_before = game.question_key();
        game.play_again().unwrap();
        let session = game.session();
        assert_eq!(session.phase, GamePhase::InProgress);
        assert!(session.stage_results.is_empty());
        assert_eq!(session.cumulative_score, 0);
        assert_ne!(game.question_key(), key_before);
    }

    #[test]
    fn test_start_allowed_from_summary() {
        let mut game = game(CounterpartMode::Simulated);
        game.start(vec![stage("a", 1)]).unwrap();
        game.advance();
        assert_eq!(game.phase(), GamePhase::Summary);

        game.start(vec![stage("b", 2)]).unwrap();
        assert_eq!(game.phase(), GamePhase::InProgress);
        assert_eq!(game.stages()[0].id, "b");
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut game = game(CounterpartMode::Simulated);
        assert!(!game.cancel());

        game.start(vec![stage("a", 2)]).unwrap();
        game.submit_answer(0).unwrap();
        let key = game.question_key();

        assert!(game.cancel());
        assert_eq!(game.phase(), GamePhase::Idle);
        assert_eq!(game.session().cumulative_score, 0);
        assert_ne!(game.question_key(), key);
        assert_eq!(game.advance(), AdvanceOutcome::Ignored);
    }

    #[test]
    fn test_cancel_keeps_summary() {
        let mut game = game(CounterpartMode::Simulated);
        game.start(vec![stage("a", 1)]).unwrap();
        game.submit_answer(1).unwrap();
        game.advance();
        assert_eq!(game.phase(), GamePhase::Summary);

        assert!(!game.cancel());
        assert_eq!(game.phase(), GamePhase::Summary);
        assert_eq!(game.session().stage_results.len(), 1);
        assert!(game.play_again().is_ok());
    }
}
