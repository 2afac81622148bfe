use crate::board::{Board, available_moves};
use crate::evaluator::evaluate;
use crate::session_rng::SessionRng;
use crate::types::{Difficulty, Mark, Outcome};

const WIN_SCORE: i32 = 10;

pub fn choose_move(
    board: &Board,
    to_move: Mark,
    difficulty: Difficulty,
    rng: &mut SessionRng,
) -> Result<usize, String> {
    if to_move == Mark::Empty {
        return Err("Cannot choose a move for the empty mark".to_string());
    }
    if evaluate(board).is_terminal() {
        return Err("Move requested on a terminal board".to_string());
    }

    let moves = available_moves(board);
    if moves.is_empty() {
        return Err("Move requested on a full board".to_string());
    }

    let index = match difficulty {
        Difficulty::Easy => random_move(&moves, rng),
        Difficulty::Medium => {
            // Re-rolled on every call, not fixed per match.
            if rng.random_bool() {
                random_move(&moves, rng)
            } else {
                best_minimax_move(board, to_move, &moves)
            }
        }
        Difficulty::Hard => best_minimax_move(board, to_move, &moves),
    };

    Ok(index)
}

fn random_move(moves: &[usize], rng: &mut SessionRng) -> usize {
    moves[rng.random_range(0..moves.len())]
}

fn best_minimax_move(board: &Board, to_move: Mark, moves: &[usize]) -> usize {
    let mut board = *board;
    let mut best_index = moves[0];
    let mut best_score = i32::MIN;

    for &index in moves {
        board[index] = to_move;
        let score = minimax(&mut board, 0, false, to_move, i32::MIN, i32::MAX);
        board[index] = Mark::Empty;

        // Strict comparison keeps the lowest index among equal-best moves.
        if score > best_score {
            best_score = score;
            best_index = index;
        }
    }

    best_index
}

fn minimax(
    board: &mut Board,
    depth: i32,
    is_maximizing: bool,
    maximizer: Mark,
    mut alpha: i32,
    mut beta: i32,
) -> i32 {
    match evaluate(board) {
        Outcome::Win { mark, .. } => {
            return if mark == maximizer {
                WIN_SCORE - depth
            } else {
                depth - WIN_SCORE
            };
        }
        Outcome::Draw => return 0,
        Outcome::InProgress => {}
    }

    if is_maximizing {
        let mut max_eval = i32::MIN;
        for index in 0..board.len() {
            if board[index] != Mark::Empty {
                continue;
            }

            board[index] = maximizer;
            let eval = minimax(board, depth + 1, false, maximizer, alpha, beta);
            board[index] = Mark::Empty;

            max_eval = max_eval.max(eval);
            alpha = alpha.max(eval);
            if beta <= alpha {
                return max_eval;
            }
        }
        max_eval
    } else {
        let minimizer = maximizer.opponent().unwrap();
        let mut min_eval = i32::MAX;
        for index in 0..board.len() {
            if board[index] != Mark::Empty {
                continue;
            }

            board[index] = minimizer;
            let eval = minimax(board, depth + 1, true, maximizer, alpha, beta);
            board[index] = Mark::Empty;

            min_eval = min_eval.min(eval);
            beta = beta.min(eval);
            if beta <= alpha {
                return min_eval;
            }
        }
        min_eval
    }
}
