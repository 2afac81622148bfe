use crate::board::{Board, empty_board};
use crate::bot_controller::choose_move;
use crate::evaluator::evaluate;
use crate::session_rng::SessionRng;
use crate::types::{Difficulty, Mark, Outcome};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    Human,
    Engine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveRejection {
    MatchOver,
    NotHumanTurn,
    OutOfBounds,
    CellOccupied,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedMove {
    pub index: usize,
    pub mark: Mark,
    pub outcome: Outcome,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    Applied(AppliedMove),
    Rejected(MoveRejection),
}

#[derive(Clone, Debug)]
pub struct MatchState {
    board: Board,
    human_mark: Mark,
    engine_mark: Mark,
    difficulty: Difficulty,
    turn: Turn,
    outcome: Outcome,
    last_move: Option<usize>,
}

impl MatchState {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            board: empty_board(),
            human_mark: Mark::X,
            engine_mark: Mark::O,
            difficulty,
            turn: Turn::Human,
            outcome: Outcome::InProgress,
            last_move: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn with_position(board: Board, turn: Turn, difficulty: Difficulty) -> Self {
        let outcome = evaluate(&board);
        Self {
            board,
            human_mark: Mark::X,
            engine_mark: Mark::O,
            difficulty,
            turn,
            outcome,
            last_move: None,
        }
    }

    pub fn submit_human_move(&mut self, index: usize) -> MoveResult {
        if self.outcome.is_terminal() {
            return MoveResult::Rejected(MoveRejection::MatchOver);
        }
        if self.turn != Turn::Human {
            return MoveResult::Rejected(MoveRejection::NotHumanTurn);
        }
        if index >= self.board.len() {
            return MoveResult::Rejected(MoveRejection::OutOfBounds);
        }
        if self.board[index] != Mark::Empty {
            return MoveResult::Rejected(MoveRejection::CellOccupied);
        }

        MoveResult::Applied(self.apply(index, self.human_mark, Turn::Engine))
    }

    pub fn play_engine_turn(&mut self, rng: &mut SessionRng) -> Result<AppliedMove, String> {
        if self.outcome.is_terminal() {
            return Err("Engine turn requested on a finished match".to_string());
        }
        if self.turn != Turn::Engine {
            return Err("Engine turn requested while the human is to move".to_string());
        }

        let index = choose_move(&self.board, self.engine_mark, self.difficulty, rng)?;
        Ok(self.apply(index, self.engine_mark, Turn::Human))
    }

    fn apply(&mut self, index: usize, mark: Mark, next_turn: Turn) -> AppliedMove {
        self.board[index] = mark;
        self.last_move = Some(index);

        // Always recomputed from scratch, never patched incrementally.
        self.outcome = evaluate(&self.board);
        if !self.outcome.is_terminal() {
            self.turn = next_turn;
        }

        AppliedMove {
            index,
            mark,
            outcome: self.outcome,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn human_mark(&self) -> Mark {
        self.human_mark
    }

    pub fn engine_mark(&self) -> Mark {
        self.engine_mark
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn last_move(&self) -> Option<usize> {
        self.last_move
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_terminal()
    }
}
