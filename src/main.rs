use std::collections::BTreeMap;
use std::error::Error;

use chrono::{DateTime, Local};
use clap::Parser;
use crossterm::style::Stylize;
use serde::Serialize;

use matik::puzzle::{Difficulty, Operation};
use matik::runtime::StdinAnswerSource;
use matik::session::{Session, SessionConfig};
use matik::stats::{OperationStats, SessionSummary};

/// adaptive arithmetic drill for the terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "An arithmetic drill that adapts puzzle difficulty to your recent accuracy, speed, and streak, and learns your difficulty curve as the session progresses."
)]
struct Cli {
    /// number of puzzles in the session
    #[clap(short = 'r', long, default_value_t = 20)]
    rounds: usize,

    /// difficulty level of the first puzzle
    #[clap(short = 'd', long, value_enum, default_value_t = Difficulty::Easy)]
    difficulty: Difficulty,

    /// fix every puzzle to one operation instead of a random mix
    #[clap(short = 'o', long, value_enum)]
    operation: Option<Operation>,

    /// learner name used in the greeting
    #[clap(short = 'n', long, default_value = "Learner")]
    name: String,

    /// print the end-of-session report as json
    #[clap(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct SessionReport {
    started_at: DateTime<Local>,
    summary: SessionSummary,
    operations: BTreeMap<Operation, OperationStats>,
    recommended_difficulty: Difficulty,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let started_at = Local::now();

    let config = SessionConfig {
        rounds: cli.rounds,
        starting_difficulty: cli.difficulty,
        operation: cli.operation,
    };
    let mut session = Session::new(config, rand::thread_rng());
    let mut source = StdinAnswerSource::new();

    println!("=== matik ===");
    println!(
        "Welcome, {}! {} rounds, operation: {}.",
        cli.name,
        cli.rounds,
        cli.operation
            .map_or_else(|| "mixed".to_string(), |op| op.to_string())
    );

    while !session.is_finished() {
        let outcome = session.play_round(&mut source)?;

        if outcome.correct {
            println!("{} (answer: {})", "Correct!".green(), outcome.puzzle.answer);
        } else {
            println!(
                "{} The answer was {}.",
                "Incorrect.".red(),
                outcome.puzzle.answer
            );
        }
        println!(
            "Next difficulty: {}",
            outcome.next_difficulty.to_string().to_uppercase()
        );
        if outcome.round % 5 == 0 {
            println!("{}", session.engine().explain());
        }
    }

    let report = SessionReport {
        started_at,
        summary: session.log().summary(),
        operations: session.log().operation_breakdown(),
        recommended_difficulty: session.engine().last_difficulty(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &SessionReport) {
    let summary = &report.summary;
    println!();
    println!("=== Session Summary ===");
    println!("Rounds: {}", summary.total);
    println!("Correct: {}", summary.correct);
    println!("Accuracy: {:.1}%", summary.accuracy * 100.0);
    println!(
        "Average response time: {:.2}s (spread {:.2}s)",
        summary.avg_response_secs, summary.response_spread_secs
    );
    println!("Current streak: {}", summary.streak);
    if !report.operations.is_empty() {
        println!("By operation:");
        for (operation, stats) in &report.operations {
            println!(
                "  {}  {} attempts, {:.1}% correct, avg {:.2}s",
                operation,
                stats.attempts,
                stats.accuracy * 100.0,
                stats.avg_response_secs
            );
        }
    }
    println!(
        "Recommended next level: {}",
        report.recommended_difficulty.to_string().to_uppercase()
    );
}
