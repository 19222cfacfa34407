use std::collections::VecDeque;
use std::io::{self, Write};
use std::time::Instant;

use crate::puzzle::{Difficulty, Puzzle};

/// A raw learner answer plus how long it took to arrive.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedAnswer {
    pub raw: String,
    pub elapsed_secs: f64,
}

/// Everything a source needs to pose one round.
#[derive(Debug)]
pub struct RoundContext<'a> {
    pub round: usize,
    pub total_rounds: usize,
    pub difficulty: Difficulty,
    pub puzzle: &'a Puzzle,
}

/// Source of learner answers. The production implementation talks to the
/// terminal; test implementations script a whole session headlessly.
pub trait AnswerSource {
    /// Pose the round and collect a raw, passively timed answer.
    fn collect(&mut self, ctx: &RoundContext<'_>) -> io::Result<TimedAnswer>;
}

/// Production source: prints the round to stdout and reads one line from
/// stdin. End of input yields an empty answer rather than an error.
#[derive(Debug, Default)]
pub struct StdinAnswerSource;

impl StdinAnswerSource {
    pub fn new() -> Self {
        Self
    }
}

impl AnswerSource for StdinAnswerSource {
    fn collect(&mut self, ctx: &RoundContext<'_>) -> io::Result<TimedAnswer> {
        let mut stdout = io::stdout();
        writeln!(stdout)?;
        writeln!(
            stdout,
            "Round {}/{} | Difficulty: {}",
            ctx.round,
            ctx.total_rounds,
            ctx.difficulty.to_string().to_uppercase()
        )?;
        writeln!(stdout, "Solve: {}", ctx.puzzle.question)?;
        write!(stdout, "Your answer: ")?;
        stdout.flush()?;

        let started = Instant::now();
        let mut raw = String::new();
        io::stdin().read_line(&mut raw)?;
        Ok(TimedAnswer {
            raw,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }
}

/// Scripted source for unit and integration tests: replays queued answers
/// in order and falls back to empty input when exhausted.
#[derive(Debug, Default)]
pub struct ScriptedAnswerSource {
    answers: VecDeque<TimedAnswer>,
}

impl ScriptedAnswerSource {
    pub fn new(answers: Vec<TimedAnswer>) -> Self {
        Self {
            answers: answers.into(),
        }
    }

    /// Convenience for scripting the same raw answer/latency repeatedly.
    pub fn repeating(raw: &str, elapsed_secs: f64, count: usize) -> Self {
        Self::new(vec![
            TimedAnswer {
                raw: raw.to_string(),
                elapsed_secs,
            };
            count
        ])
    }
}

impl AnswerSource for ScriptedAnswerSource {
    fn collect(&mut self, _ctx: &RoundContext<'_>) -> io::Result<TimedAnswer> {
        Ok(self.answers.pop_front().unwrap_or(TimedAnswer {
            raw: String::new(),
            elapsed_secs: 0.0,
        }))
    }
}

/// Test source that answers every puzzle correctly with a fixed latency.
#[derive(Debug)]
pub struct OracleAnswerSource {
    pub elapsed_secs: f64,
}

impl AnswerSource for OracleAnswerSource {
    fn collect(&mut self, ctx: &RoundContext<'_>) -> io::Result<TimedAnswer> {
        Ok(TimedAnswer {
            raw: ctx.puzzle.answer.to_string(),
            elapsed_secs: self.elapsed_secs,
        })
    }
}
