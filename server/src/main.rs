mod broadcaster;
mod id_generator;
mod logger;
mod match_manager;
mod server_config;
mod stats;

use clap::Parser;
use tictactoe_engine::{Difficulty, Mark, MoveRejection, MoveResult, Outcome};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver};

use broadcaster::{ChannelBroadcaster, MatchEvent};
use match_manager::{MatchManager, MatchSnapshot};
use server_config::load_config;
use stats::MatchStats;

#[derive(Parser)]
#[command(name = "tictactoe_server")]
struct Args {
    #[arg(long)]
    config: Option<String>,

    #[arg(long, value_parser = parse_difficulty)]
    difficulty: Option<Difficulty>,

    #[arg(long)]
    use_log_prefix: bool,
}

fn parse_difficulty(value: &str) -> Result<Difficulty, String> {
    value.parse()
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let prefix = if args.use_log_prefix {
        Some("Server".to_string())
    } else {
        None
    };
    logger::init_logger(prefix);

    let config = load_config(args.config.as_deref())?;
    let difficulty = args.difficulty.unwrap_or(config.default_difficulty);

    let (tx, mut rx) = mpsc::unbounded_channel();
    let manager = MatchManager::new(config, ChannelBroadcaster::new(tx));

    log!("Match server ready, difficulty {}", difficulty);

    let mut match_id = manager.start_match(difficulty).await;
    print_help();
    print_board(&manager.snapshot(&match_id).await?);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "q" | "quit" => break,
            "n" | "new" => {
                manager.remove_match(&match_id).await;
                match_id = manager.start_match(difficulty).await;
                print_board(&manager.snapshot(&match_id).await?);
            }
            "r" | "reset" => {
                manager.reset_match(&match_id).await?;
                print_board(&manager.snapshot(&match_id).await?);
            }
            "s" | "stats" => print_stats(&manager.stats().await),
            "c" | "clear-stats" => {
                manager.reset_stats().await;
                print_stats(&manager.stats().await);
            }
            "h" | "help" => print_help(),
            _ => match input.parse::<usize>() {
                Ok(index) => {
                    let result = manager.submit_human_move(&match_id, index).await?;
                    if let MoveResult::Rejected(rejection) = result {
                        println!("Move rejected: {}", describe_rejection(rejection));
                    }

                    drain_events(&mut rx);
                    let snapshot = manager.snapshot(&match_id).await?;
                    print_board(&snapshot);

                    if snapshot.outcome.is_terminal() {
                        print_outcome(snapshot.outcome);
                        print_stats(&manager.stats().await);
                        println!("Type 'n' for a new match or 'q' to quit.");
                    }
                }
                Err(_) => println!("Unrecognized input: '{}' (type 'h' for help)", input),
            },
        }
    }

    log!("Shutting down");
    Ok(())
}

fn drain_events(rx: &mut UnboundedReceiver<MatchEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            MatchEvent::MoveApplied { index, mark, .. } => {
                let who = if mark == Mark::X { "You" } else { "Computer" };
                println!("{} placed {} at cell {}", who, mark, index);
            }
            MatchEvent::MatchEnded { .. } => {}
        }
    }
}

fn print_board(snapshot: &MatchSnapshot) {
    println!();
    for row in 0..3 {
        let cells: Vec<String> = (0..3)
            .map(|col| {
                let index = row * 3 + col;
                let cell = snapshot.board[index];
                if cell == Mark::Empty {
                    index.to_string()
                } else {
                    cell.to_string()
                }
            })
            .collect();
        println!(" {} ", cells.join(" | "));
        if row < 2 {
            println!("---+---+---");
        }
    }
    println!();
}

fn print_outcome(outcome: Outcome) {
    match outcome {
        Outcome::Win { mark, line } if mark == Mark::X => {
            println!("You win! Line: {:?}", line);
        }
        Outcome::Win { line, .. } => {
            println!("Computer wins this round. Line: {:?}", line);
        }
        Outcome::Draw => println!("It's a draw."),
        Outcome::InProgress => {}
    }
}

fn print_stats(stats: &MatchStats) {
    println!(
        "Games: {} | You: {} | Computer: {} | Draws: {}",
        stats.games_played, stats.human_wins, stats.engine_wins, stats.draws
    );
}

fn describe_rejection(rejection: MoveRejection) -> &'static str {
    match rejection {
        MoveRejection::MatchOver => "the match is already over",
        MoveRejection::NotHumanTurn => "it is not your turn",
        MoveRejection::OutOfBounds => "cell index must be 0-8",
        MoveRejection::CellOccupied => "that cell is already taken",
    }
}

fn print_help() {
    println!("Enter a cell index (0-8) to place your mark.");
    println!("Commands: n(ew match), r(eset), s(tats), c(lear-stats), h(elp), q(uit)");
}
