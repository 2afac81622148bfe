use crate::board::{Board, LINES, is_full};
use crate::types::{Mark, Outcome};

pub fn evaluate(board: &Board) -> Outcome {
    for line in LINES {
        let mark = board[line[0]];
        if mark != Mark::Empty && board[line[1]] == mark && board[line[2]] == mark {
            return Outcome::Win { mark, line };
        }
    }

    if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::InProgress
    }
}
