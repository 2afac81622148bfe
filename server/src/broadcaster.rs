use std::future::Future;

use tictactoe_engine::{MatchId, Mark, Outcome};
use tokio::sync::mpsc::UnboundedSender;

#[derive(Clone, Debug, PartialEq)]
pub enum MatchEvent {
    MoveApplied {
        match_id: MatchId,
        index: usize,
        mark: Mark,
    },
    MatchEnded {
        match_id: MatchId,
        outcome: Outcome,
    },
}

pub trait MatchBroadcaster: Send + Sync + Clone + 'static {
    fn notify_move_applied(
        &self,
        match_id: MatchId,
        index: usize,
        mark: Mark,
    ) -> impl Future<Output = ()> + Send;

    fn notify_match_ended(
        &self,
        match_id: MatchId,
        outcome: Outcome,
    ) -> impl Future<Output = ()> + Send;
}

#[derive(Clone)]
pub struct ChannelBroadcaster {
    tx: UnboundedSender<MatchEvent>,
}

impl ChannelBroadcaster {
    pub fn new(tx: UnboundedSender<MatchEvent>) -> Self {
        Self { tx }
    }
}

impl MatchBroadcaster for ChannelBroadcaster {
    async fn notify_move_applied(&self, match_id: MatchId, index: usize, mark: Mark) {
        // A dropped receiver just means nobody is listening anymore.
        let _ = self.tx.send(MatchEvent::MoveApplied {
            match_id,
            index,
            mark,
        });
    }

    async fn notify_match_ended(&self, match_id: MatchId, outcome: Outcome) {
        let _ = self.tx.send(MatchEvent::MatchEnded { match_id, outcome });
    }
}
