//! Timer-driven host for one compatibility game
//!
//! Wraps the clock-free engine with the two timers a call screen needs:
//! the once-per-second countdown while a question is open, and the reveal
//! pause after it resolves. Every mutation is pushed to subscribers.

use crate::engine::{
    AdvanceOutcome, AnswerOutcome, CompatibilityGame, GameResult, GameSnapshot, QuestionKey,
    TickOutcome,
};
use crate::protocol::ServerMessage;
use crate::types::*;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// RFC 3339 time at which a reveal started now ends; saturates for huge delays
fn reveal_deadline(delay: Duration) -> String {
    let now = chrono::Utc::now();
    let millis = i64::try_from(delay.as_millis()).unwrap_or(i64::MAX);
    chrono::TimeDelta::try_milliseconds(millis)
        .and_then(|delta| now.checked_add_signed(delta))
        .unwrap_or(chrono::DateTime::<chrono::Utc>::MAX_UTC)
        .to_rfc3339()
}

#[derive(Default)]
struct Timers {
    ticker: Option<JoinHandle<()>>,
    reveal: Option<JoinHandle<()>>,
}

pub struct LiveGame {
    engine: Mutex<CompatibilityGame>,
    timers: Mutex<Timers>,
    updates: broadcast::Sender<ServerMessage>,
    counterpart: CounterpartMode,
    tick_interval: Duration,
    reveal_delay: Duration,
}

impl LiveGame {
    pub fn new(config: GameConfig) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(64);
        Arc::new(Self {
            counterpart: config.counterpart,
            tick_interval: Duration::from_millis(config.tick_interval_ms.max(1)),
            reveal_delay: Duration::from_millis(config.reveal_delay_ms),
            engine: Mutex::new(CompatibilityGame::new(config)),
            timers: Mutex::new(Timers::default()),
            updates: tx,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerMessage> {
        self.updates.subscribe()
    }

    pub fn counterpart_mode(&self) -> CounterpartMode {
        self.counterpart
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        self.engine.lock().await.state()
    }

    /// Send to every subscriber of this game
    pub fn publish(&self, msg: ServerMessage) {
        // No receivers connected is fine
        let _ = self.updates.send(msg);
    }

    pub async fn start(self: &Arc<Self>, stages: Vec<Stage>) -> GameResult<GameSnapshot> {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.start(stages)?;
            engine.state()
        };

        self.cancel_reveal().await;
        self.restart_ticker().await;
        self.publish(ServerMessage::GameState {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    pub async fn play_again(self: &Arc<Self>) -> GameResult<GameSnapshot> {
        let snapshot = {
            let mut engine = self.engine.lock().await;
            engine.play_again()?;
            engine.state()
        };

        self.cancel_reveal().await;
        self.restart_ticker().await;
        self.publish(ServerMessage::GameState {
            state: snapshot.clone(),
        });
        Ok(snapshot)
    }

    /// Abandon the running game and stop both timers. Returns false if none was running.
    pub async fn cancel(&self) -> bool {
        let (cancelled, snapshot) = {
            let mut engine = self.engine.lock().await;
            let cancelled = engine.cancel();
            (cancelled, engine.state())
        };

        self.stop_timers().await;
        if cancelled {
            self.publish(ServerMessage::GameState { state: snapshot });
        }
        cancelled
    }

    pub async fn submit_answer(self: &Arc<Self>, index: usize) -> GameResult<AnswerOutcome> {
        let (outcome, key, snapshot) = {
            let mut engine = self.engine.lock().await;
            let outcome = engine.submit_answer(index)?;
            (outcome, engine.question_key(), engine.state())
        };

        self.after_answer(&outcome, key, snapshot).await;
        Ok(outcome)
    }

    pub async fn record_counterpart_answer(
        self: &Arc<Self>,
        index: usize,
    ) -> GameResult<AnswerOutcome> {
        let (outcome, key, snapshot) = {
            let mut engine = self.engine.lock().await;
            let outcome = engine.record_counterpart_answer(index)?;
            (outcome, engine.question_key(), engine.state())
        };

        if outcome == AnswerOutcome::AwaitingCounterpart {
            self.publish(ServerMessage::CounterpartLocked);
        }
        self.after_answer(&outcome, key, snapshot).await;
        Ok(outcome)
    }

    /// Stop everything; called when the hosting screen goes away
    pub async fn shutdown(&self) {
        self.stop_timers().await;
        tracing::debug!("Live game shut down");
    }

    async fn after_answer(
        self: &Arc<Self>,
        outcome: &AnswerOutcome,
        key: QuestionKey,
        snapshot: GameSnapshot,
    ) {
        match outcome {
            AnswerOutcome::Revealed(reveal) => {
                self.stop_ticker().await;
                self.begin_reveal(reveal.clone(), key, snapshot).await;
            }
            AnswerOutcome::AwaitingCounterpart => {
                self.publish(ServerMessage::GameState { state: snapshot });
            }
        }
    }

    /// Announce the resolved answers and schedule the move to the next question.
    /// Both updates are published before the reveal task is spawned.
    async fn begin_reveal(
        self: &Arc<Self>,
        reveal: AnswerReveal,
        key: QuestionKey,
        snapshot: GameSnapshot,
    ) {
        self.publish(ServerMessage::AnswerRevealed {
            reveal,
            reveal_until: reveal_deadline(self.reveal_delay),
        });
        self.publish(ServerMessage::GameState { state: snapshot });

        let weak = Arc::downgrade(self);
        let delay = self.reveal_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(game) = weak.upgrade() {
                game.finish_reveal(key).await;
            }
        });

        if let Some(old) = self.timers.lock().await.reveal.replace(handle) {
            old.abort();
        }
    }

    async fn finish_reveal(self: &Arc<Self>, key: QuestionKey) {
        let (outcome, snapshot) = {
            let mut engine = self.engine.lock().await;
            if engine.question_key() != key {
                tracing::debug!("Stale reveal callback ignored");
                return;
            }
            let outcome = engine.advance();
            (outcome, engine.state())
        };

        match outcome {
            AdvanceOutcome::Ignored => return,
            AdvanceOutcome::NextQuestion => {
                self.publish(ServerMessage::GameState { state: snapshot });
                self.restart_ticker().await;
            }
            AdvanceOutcome::NextStage(result) => {
                self.publish(ServerMessage::StageCompleted { result });
                self.publish(ServerMessage::GameState { state: snapshot });
                self.restart_ticker().await;
            }
            AdvanceOutcome::Finished(result) => {
                self.publish(ServerMessage::StageCompleted { result });
                self.publish(ServerMessage::Summary {
                    results: snapshot.stage_results.clone(),
                    overall_percent: snapshot.overall_percent.unwrap_or(0),
                });
                self.publish(ServerMessage::GameState { state: snapshot });
            }
        }
    }

    async fn restart_ticker(self: &Arc<Self>) {
        let handle = self.spawn_ticker();
        if let Some(old) = self.timers.lock().await.ticker.replace(handle) {
            old.abort();
        }
    }

    /// Count down the open question, once per interval, until it resolves
    fn spawn_ticker(self: &Arc<Self>) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let period = self.tick_interval;

        tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let Some(game) = weak.upgrade() else {
                    break;
                };

                let (outcome, key, snapshot) = {
                    let mut engine = game.engine.lock().await;
                    let outcome = engine.tick();
                    (outcome, engine.question_key(), engine.state())
                };

                match outcome {
                    TickOutcome::Counting { seconds_remaining } => {
                        game.publish(ServerMessage::Tick { seconds_remaining });
                    }
                    TickOutcome::TimedOut(reveal) => {
                        game.begin_reveal(reveal, key, snapshot).await;
                        break;
                    }
                    TickOutcome::Ignored => break,
                }
            }
        })
    }

    async fn stop_ticker(&self) {
        if let Some(handle) = self.timers.lock().await.ticker.take() {
            handle.abort();
        }
    }

    async fn cancel_reveal(&self) {
        if let Some(handle) = self.timers.lock().await.reveal.take() {
            handle.abort();
        }
    }

    async fn stop_timers(&self) {
        let mut timers = self.timers.lock().await;
        if let Some(handle) = timers.ticker.take() {
            handle.abort();
        }
        if let Some(handle) = timers.reveal.take() {
            handle.abort();
        }
    }
}
