//! Answer recording and the per-question countdown

use super::score::question_points;
use super::*;

impl CompatibilityGame {
    /// Record the local participant's pick for the current question
    pub fn submit_answer(&mut self, index: usize) -> GameResult<AnswerOutcome> {
        self.ensure_in_progress("submit an answer")?;
        if index >= OPTION_COUNT {
            return Err(GameError::InvalidAnswerIndex(index));
        }
        if self.session.step == QuestionStep::Revealing || self.session.self_answer.is_some() {
            return Err(GameError::AlreadyAnswered);
        }

        self.session.self_answer = Some(RecordedAnswer {
            index,
            source: AnswerSource::Player,
        });
        tracing::debug!(
            stage = self.session.stage_index,
            question = self.session.question_index,
            index,
            "Answer submitted"
        );

        if self.config.counterpart == CounterpartMode::Simulated {
            let simulated = self.random_option();
            self.session.counterpart_answer = Some(RecordedAnswer {
                index: simulated,
                source: AnswerSource::Simulated,
            });
        }

        Ok(self.try_resolve())
    }

    /// Record the peer's pick (two-party calls only)
    pub fn record_counterpart_answer(&mut self, index: usize) -> GameResult<AnswerOutcome> {
        self.ensure_in_progress("record a counterpart answer")?;
        if self.config.counterpart != CounterpartMode::Remote {
            return Err(GameError::InvalidState(
                "Counterpart answers are simulated in this game".to_string(),
            ));
        }
        if index >= OPTION_COUNT {
            return Err(GameError::InvalidAnswerIndex(index));
        }
        if self.session.step == QuestionStep::Revealing
            || self.session.counterpart_answer.is_some()
        {
            return Err(GameError::AlreadyAnswered);
        }

        self.session.counterpart_answer = Some(RecordedAnswer {
            index,
            source: AnswerSource::Player,
        });
        tracing::debug!(
            stage = self.session.stage_index,
            question = self.session.question_index,
            index,
            "Counterpart answer recorded"
        );

        Ok(self.try_resolve())
    }

    /// One elapsed second of the current question's countdown.
    ///
    /// Only counts while the question is unresolved. Reaching zero fills
    /// every empty slot with a random pick, which resolves the question.
    pub fn tick(&mut self) -> TickOutcome {
        if self.session.phase != GamePhase::InProgress
            || self.session.step == QuestionStep::Revealing
        {
            return TickOutcome::Ignored;
        }

        self.session.seconds_remaining = self.session.seconds_remaining.saturating_sub(1);
        if self.session.seconds_remaining > 0 {
            return TickOutcome::Counting {
                seconds_remaining: self.session.seconds_remaining,
            };
        }

        if self.session.self_answer.is_none() {
            let index = self.random_option();
            self.session.self_answer = Some(RecordedAnswer {
                index,
                source: AnswerSource::Timeout,
            });
        }
        if self.session.counterpart_answer.is_none() {
            let index = self.random_option();
            let source = match self.config.counterpart {
                CounterpartMode::Simulated => AnswerSource::Simulated,
                CounterpartMode::Remote => AnswerSource::Timeout,
            };
            self.session.counterpart_answer = Some(RecordedAnswer { index, source });
        }
        tracing::info!(
            stage = self.session.stage_index,
            question = self.session.question_index,
            "Question timed out, answers auto-picked"
        );

        match self.try_resolve() {
            AnswerOutcome::Revealed(reveal) => TickOutcome::TimedOut(reveal),
            // Both slots were filled above
            AnswerOutcome::AwaitingCounterpart => TickOutcome::Ignored,
        }
    }

    /// Score the question once both slots are filled
    fn try_resolve(&mut self) -> AnswerOutcome {
        let (mine, theirs) = match (self.session.self_answer, self.session.counterpart_answer) {
            (Some(mine), Some(theirs)) => (mine, theirs),
            _ => return AnswerOutcome::AwaitingCounterpart,
        };

        let points = question_points(mine.index, theirs.index);
        self.session.cumulative_score += points;
        self.session.step = QuestionStep::Revealing;

        AnswerOutcome::Revealed(AnswerReveal {
            stage_index: self.session.stage_index,
            question_index: self.session.question_index,
            self_answer: mine.index,
            self_source: mine.source,
            counterpart_answer: theirs.index,
            counterpart_source: theirs.source,
            matched: mine.index == theirs.index,
            points,
            cumulative_score: self.session.cumulative_score,
        })
    }
}
