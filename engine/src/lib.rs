pub mod board;
pub mod bot_controller;
pub mod evaluator;
pub mod game_state;
pub mod identifiers;
pub mod session_rng;
pub mod types;

pub use board::{Board, LINES, available_moves, empty_board, is_full};
pub use bot_controller::choose_move;
pub use evaluator::evaluate;
pub use game_state::{AppliedMove, MatchState, MoveRejection, MoveResult, Turn};
pub use identifiers::MatchId;
pub use session_rng::SessionRng;
pub use types::{Difficulty, Mark, Outcome};
