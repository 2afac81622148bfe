use tictactoe_engine::{Mark, Outcome};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStats {
    pub human_wins: u64,
    pub engine_wins: u64,
    pub draws: u64,
    pub games_played: u64,
}

impl MatchStats {
    pub fn record(&mut self, outcome: Outcome, human_mark: Mark) {
        match outcome {
            Outcome::Win { mark, .. } if mark == human_mark => self.human_wins += 1,
            Outcome::Win { .. } => self.engine_wins += 1,
            Outcome::Draw => self.draws += 1,
            Outcome::InProgress => return,
        }
        self.games_played += 1;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
