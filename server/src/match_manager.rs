use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tictactoe_engine::{
    Board, Difficulty, Mark, MatchId, MatchState, MoveResult, Outcome, SessionRng, Turn,
};
use tokio::sync::Mutex;

use crate::broadcaster::MatchBroadcaster;
use crate::id_generator::generate_match_id;
use crate::log;
use crate::server_config::ServerConfig;
use crate::stats::MatchStats;

#[derive(Clone, Copy, Debug)]
pub struct MatchSnapshot {
    pub board: Board,
    pub turn: Turn,
    pub outcome: Outcome,
    pub difficulty: Difficulty,
}

struct SessionInner {
    state: MatchState,
    rng: SessionRng,
}

#[derive(Clone)]
struct MatchSession {
    difficulty: Difficulty,
    inner: Arc<Mutex<SessionInner>>,
}

#[derive(Clone)]
pub struct MatchManager<B: MatchBroadcaster> {
    sessions: Arc<Mutex<HashMap<MatchId, MatchSession>>>,
    stats: Arc<Mutex<MatchStats>>,
    broadcaster: B,
    config: ServerConfig,
}

impl<B: MatchBroadcaster> MatchManager<B> {
    pub fn new(config: ServerConfig, broadcaster: B) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            stats: Arc::new(Mutex::new(MatchStats::default())),
            broadcaster,
            config,
        }
    }

    pub async fn start_match(&self, difficulty: Difficulty) -> MatchId {
        let match_id = MatchId::new(generate_match_id());
        let rng = match self.config.rng_seed {
            Some(seed) => SessionRng::new(seed),
            None => SessionRng::from_random(),
        };

        let session = MatchSession {
            difficulty,
            inner: Arc::new(Mutex::new(SessionInner {
                state: MatchState::new(difficulty),
                rng,
            })),
        };

        let mut sessions = self.sessions.lock().await;
        sessions.insert(match_id.clone(), session);
        log!("[match:{}] started at difficulty {}", match_id, difficulty);

        match_id
    }

    pub async fn submit_human_move(
        &self,
        match_id: &MatchId,
        index: usize,
    ) -> Result<MoveResult, String> {
        let session = self.get_session(match_id).await?;

        let (result, engine_pending) = {
            let mut inner = session.inner.lock().await;
            let result = inner.state.submit_human_move(index);

            match result {
                MoveResult::Applied(applied) => {
                    self.broadcaster
                        .notify_move_applied(match_id.clone(), applied.index, applied.mark)
                        .await;

                    if applied.outcome.is_terminal() {
                        self.finish_match(match_id, applied.outcome, inner.state.human_mark())
                            .await;
                        (result, false)
                    } else {
                        (result, true)
                    }
                }
                MoveResult::Rejected(rejection) => {
                    log!(
                        "[match:{}] rejected human move at {}: {:?}",
                        match_id,
                        index,
                        rejection
                    );
                    (result, false)
                }
            }
        };

        if engine_pending {
            self.play_engine_reply(&session, match_id).await;
        }

        Ok(result)
    }

    pub async fn reset_match(&self, match_id: &MatchId) -> Result<(), String> {
        let session = self.get_session(match_id).await?;

        let mut inner = session.inner.lock().await;
        inner.state = MatchState::new(session.difficulty);
        log!("[match:{}] reset", match_id);

        Ok(())
    }

    pub async fn remove_match(&self, match_id: &MatchId) {
        let mut sessions = self.sessions.lock().await;
        if sessions.remove(match_id).is_some() {
            log!("[match:{}] removed", match_id);
        }
    }

    pub async fn snapshot(&self, match_id: &MatchId) -> Result<MatchSnapshot, String> {
        let session = self.get_session(match_id).await?;

        let inner = session.inner.lock().await;
        Ok(MatchSnapshot {
            board: *inner.state.board(),
            turn: inner.state.turn(),
            outcome: inner.state.outcome(),
            difficulty: inner.state.difficulty(),
        })
    }

    pub async fn stats(&self) -> MatchStats {
        *self.stats.lock().await
    }

    pub async fn reset_stats(&self) {
        self.stats.lock().await.reset();
        log!("Match statistics reset");
    }

    async fn get_session(&self, match_id: &MatchId) -> Result<MatchSession, String> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(match_id)
            .cloned()
            .ok_or_else(|| format!("Unknown match: {}", match_id))
    }

    // The state is already latched to the engine's turn, so the delay is
    // purely pacing; a human move arriving meanwhile is rejected.
    async fn play_engine_reply(&self, session: &MatchSession, match_id: &MatchId) {
        if self.config.engine_move_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.engine_move_delay_ms)).await;
        }

        let mut inner = session.inner.lock().await;
        if inner.state.is_over() || inner.state.turn() != Turn::Engine {
            // The match was reset or discarded while the reply was pending.
            return;
        }

        let SessionInner { state, rng } = &mut *inner;
        match state.play_engine_turn(rng) {
            Ok(applied) => {
                self.broadcaster
                    .notify_move_applied(match_id.clone(), applied.index, applied.mark)
                    .await;

                if applied.outcome.is_terminal() {
                    let human_mark = state.human_mark();
                    self.finish_match(match_id, applied.outcome, human_mark).await;
                }
            }
            Err(e) => {
                log!("[match:{}] engine turn failed: {}", match_id, e);
            }
        }
    }

    async fn finish_match(&self, match_id: &MatchId, outcome: Outcome, human_mark: Mark) {
        {
            let mut stats = self.stats.lock().await;
            stats.record(outcome, human_mark);
        }

        self.broadcaster
            .notify_match_ended(match_id.clone(), outcome)
            .await;
        log!("[match:{}] finished: {:?}", match_id, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcaster::{ChannelBroadcaster, MatchEvent};
    use tictactoe_engine::MoveRejection;
    use tokio::sync::mpsc::{self, UnboundedReceiver, error::TryRecvError};

    fn test_manager(
        difficulty: Difficulty,
        delay_ms: u64,
    ) -> (
        MatchManager<ChannelBroadcaster>,
        UnboundedReceiver<MatchEvent>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        let config = ServerConfig {
            default_difficulty: difficulty,
            engine_move_delay_ms: delay_ms,
            rng_seed: Some(42),
        };
        (MatchManager::new(config, ChannelBroadcaster::new(tx)), rx)
    }

    #[tokio::test]
    async fn test_human_and_engine_moves_emit_events() {
        let (manager, mut rx) = test_manager(Difficulty::Hard, 0);
        let match_id = manager.start_match(Difficulty::Hard).await;

        let result = manager.submit_human_move(&match_id, 4).await.unwrap();
        assert!(matches!(result, MoveResult::Applied(_)));

        assert_eq!(
            rx.recv().await.unwrap(),
            MatchEvent::MoveApplied {
                match_id: match_id.clone(),
                index: 4,
                mark: Mark::X,
            }
        );
        assert_eq!(
            rx.recv().await.unwrap(),
            MatchEvent::MoveApplied {
                match_id: match_id.clone(),
                index: 0,
                mark: Mark::O,
            }
        );

        let snapshot = manager.snapshot(&match_id).await.unwrap();
        assert_eq!(snapshot.board[4], Mark::X);
        assert_eq!(snapshot.board[0], Mark::O);
        assert_eq!(snapshot.turn, Turn::Human);
        assert_eq!(snapshot.outcome, Outcome::InProgress);
    }

    #[tokio::test]
    async fn test_occupied_cell_is_a_noop_and_emits_nothing() {
        let (manager, mut rx) = test_manager(Difficulty::Hard, 0);
        let match_id = manager.start_match(Difficulty::Hard).await;

        manager.submit_human_move(&match_id, 4).await.unwrap();
        while rx.try_recv().is_ok() {}

        let result = manager.submit_human_move(&match_id, 4).await.unwrap();
        assert_eq!(result, MoveResult::Rejected(MoveRejection::CellOccupied));
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn test_unknown_match_is_an_error() {
        let (manager, _rx) = test_manager(Difficulty::Easy, 0);
        let match_id = MatchId::new("no-such-match-1".to_string());

        assert!(manager.submit_human_move(&match_id, 0).await.is_err());
        assert!(manager.snapshot(&match_id).await.is_err());
        assert!(manager.reset_match(&match_id).await.is_err());
    }

    #[tokio::test]
    async fn test_match_runs_to_completion_and_records_stats() {
        let (manager, mut rx) = test_manager(Difficulty::Hard, 0);
        let match_id = manager.start_match(Difficulty::Hard).await;

        loop {
            let snapshot = manager.snapshot(&match_id).await.unwrap();
            if snapshot.outcome.is_terminal() {
                break;
            }
            let index = snapshot
                .board
                .iter()
                .position(|&cell| cell == Mark::Empty)
                .unwrap();
            let result = manager.submit_human_move(&match_id, index).await.unwrap();
            assert!(matches!(result, MoveResult::Applied(_)));
        }

        let mut last_event = None;
        while let Ok(event) = rx.try_recv() {
            last_event = Some(event);
        }
        let snapshot = manager.snapshot(&match_id).await.unwrap();
        assert_eq!(
            last_event,
            Some(MatchEvent::MatchEnded {
                match_id: match_id.clone(),
                outcome: snapshot.outcome,
            })
        );

        let stats = manager.stats().await;
        assert_eq!(stats.games_played, 1);
        // A first-free-cell player cannot beat the exhaustive search.
        assert_eq!(stats.human_wins, 0);
    }

    #[tokio::test]
    async fn test_reset_gives_a_fresh_match() {
        let (manager, _rx) = test_manager(Difficulty::Hard, 0);
        let match_id = manager.start_match(Difficulty::Hard).await;

        manager.submit_human_move(&match_id, 4).await.unwrap();
        manager.reset_match(&match_id).await.unwrap();

        let snapshot = manager.snapshot(&match_id).await.unwrap();
        assert!(snapshot.board.iter().all(|&cell| cell == Mark::Empty));
        assert_eq!(snapshot.turn, Turn::Human);
        assert_eq!(snapshot.outcome, Outcome::InProgress);
        assert_eq!(manager.stats().await.games_played, 0);
    }

    #[tokio::test]
    async fn test_removed_match_rejects_further_moves() {
        let (manager, _rx) = test_manager(Difficulty::Easy, 0);
        let match_id = manager.start_match(Difficulty::Easy).await;

        manager.remove_match(&match_id).await;
        assert!(manager.submit_human_move(&match_id, 0).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_human_move_during_engine_delay_is_rejected() {
        let (manager, _rx) = test_manager(Difficulty::Hard, 100);
        let match_id = manager.start_match(Difficulty::Hard).await;

        let task_manager = manager.clone();
        let task_id = match_id.clone();
        let reply =
            tokio::spawn(async move { task_manager.submit_human_move(&task_id, 4).await });

        tokio::time::sleep(Duration::from_millis(20)).await;
        let result = manager.submit_human_move(&match_id, 0).await.unwrap();
        assert_eq!(result, MoveResult::Rejected(MoveRejection::NotHumanTurn));

        let applied = reply.await.unwrap().unwrap();
        assert!(matches!(applied, MoveResult::Applied(_)));

        let snapshot = manager.snapshot(&match_id).await.unwrap();
        assert_eq!(snapshot.turn, Turn::Human);
        assert_eq!(snapshot.board[0], Mark::O);
    }
}
