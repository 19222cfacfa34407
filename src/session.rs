use std::io;

use rand::Rng;

use crate::engine::{AdaptiveEngine, DecisionSource, EngineConfig};
use crate::puzzle::{generate_puzzle, Difficulty, Operation, Puzzle};
use crate::runtime::{AnswerSource, RoundContext};
use crate::stats::AttemptLog;

/// Absolute tolerance when comparing a learner answer to the exact one.
pub const ANSWER_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub rounds: usize,
    pub starting_difficulty: Difficulty,
    /// Fix every puzzle to one operation; `None` mixes all four.
    pub operation: Option<Operation>,
}

/// Everything the caller needs to report one finished round.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    pub round: usize,
    pub puzzle: Puzzle,
    pub difficulty: Difficulty,
    pub given: Option<f64>,
    pub correct: bool,
    pub response_secs: f64,
    pub next_difficulty: Difficulty,
    pub decision_source: DecisionSource,
}

/// One drill session: owns the attempt log, the difficulty engine, and
/// the puzzle RNG. Drives the ask/answer/log/decide/train cycle; all
/// printing stays with the caller.
pub struct Session<R: Rng> {
    config: SessionConfig,
    log: AttemptLog,
    engine: AdaptiveEngine,
    rng: R,
    played: usize,
}

impl<R: Rng> Session<R> {
    pub fn new(config: SessionConfig, rng: R) -> Self {
        let engine = AdaptiveEngine::new(config.starting_difficulty);
        Self {
            config,
            log: AttemptLog::new(),
            engine,
            rng,
            played: 0,
        }
    }

    pub fn with_engine_config(config: SessionConfig, engine_config: EngineConfig, rng: R) -> Self {
        let engine = AdaptiveEngine::with_config(config.starting_difficulty, engine_config);
        Self {
            config,
            log: AttemptLog::new(),
            engine,
            rng,
            played: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.played >= self.config.rounds
    }

    pub fn rounds_played(&self) -> usize {
        self.played
    }

    pub fn log(&self) -> &AttemptLog {
        &self.log
    }

    pub fn engine(&self) -> &AdaptiveEngine {
        &self.engine
    }

    /// Play one round: generate a puzzle at the current difficulty,
    /// collect and grade the answer, log the attempt, then ask the engine
    /// for the next difficulty and record that decision as training data.
    pub fn play_round(&mut self, source: &mut dyn AnswerSource) -> io::Result<RoundOutcome> {
        let difficulty = self.engine.last_difficulty();
        let puzzle = generate_puzzle(&mut self.rng, difficulty, self.config.operation);
        self.played += 1;

        let answer = source.collect(&RoundContext {
            round: self.played,
            total_rounds: self.config.rounds,
            difficulty,
            puzzle: &puzzle,
        })?;

        let given = parse_answer(&answer.raw);
        let correct = given.is_some_and(|value| (value - puzzle.answer).abs() <= ANSWER_TOLERANCE);

        self.log.log_attempt(
            &puzzle.question,
            puzzle.answer,
            given,
            correct,
            answer.elapsed_secs,
            difficulty,
            puzzle.operation,
        );

        let next_difficulty = self.engine.predict_next(&self.log);
        let decision_source = self.engine.decision_source();
        self.engine.add_training_example(&self.log, next_difficulty);

        Ok(RoundOutcome {
            round: self.played,
            puzzle,
            difficulty,
            given,
            correct,
            response_secs: answer.elapsed_secs,
            next_difficulty,
            decision_source,
        })
    }
}

/// Parse a raw learner answer. Anything that is not a finite number is the
/// "not a number" sentinel, graded as incorrect rather than an error.
fn parse_answer(raw: &str) -> Option<f64> {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ScriptedAnswerSource, TimedAnswer};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Answers every puzzle with the exact answer plus a fixed offset.
    struct OffsetSource {
        offset: f64,
    }

    impl AnswerSource for OffsetSource {
        fn collect(&mut self, ctx: &RoundContext<'_>) -> io::Result<TimedAnswer> {
            Ok(TimedAnswer {
                raw: format!("{}", ctx.puzzle.answer + self.offset),
                elapsed_secs: 2.0,
            })
        }
    }

    fn session(rounds: usize) -> Session<StdRng> {
        Session::new(
            SessionConfig {
                rounds,
                starting_difficulty: Difficulty::Easy,
                operation: Some(Operation::Add),
            },
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn test_parse_answer_accepts_numbers() {
        assert_eq!(parse_answer("12"), Some(12.0));
        assert_eq!(parse_answer("  -3.5 "), Some(-3.5));
        assert_eq!(parse_answer("7\n"), Some(7.0));
    }

    #[test]
    fn test_parse_answer_rejects_non_numbers() {
        assert_eq!(parse_answer(""), None);
        assert_eq!(parse_answer("twelve"), None);
        assert_eq!(parse_answer("1.2.3"), None);
        assert_eq!(parse_answer("nan"), None);
        assert_eq!(parse_answer("inf"), None);
    }

    #[test]
    fn test_answers_within_tolerance_are_correct() {
        let mut session = session(1);
        let outcome = session
            .play_round(&mut OffsetSource { offset: 0.005 })
            .unwrap();
        assert!(outcome.correct);
        assert_eq!(outcome.response_secs, 2.0);
    }

    #[test]
    fn test_answers_outside_tolerance_are_incorrect() {
        let mut session = session(1);
        let outcome = session
            .play_round(&mut OffsetSource { offset: 0.02 })
            .unwrap();
        assert!(!outcome.correct);
    }

    #[test]
    fn test_unparsable_answer_counts_as_incorrect_round() {
        let mut session = session(1);
        let mut source = ScriptedAnswerSource::repeating("banana", 1.0, 1);
        let outcome = session.play_round(&mut source).unwrap();
        assert!(!outcome.correct);
        assert_eq!(outcome.given, None);
        assert_eq!(session.log().latest().and_then(|a| a.given), None);
    }

    #[test]
    fn test_round_is_logged_and_trained() {
        let mut session = session(3);
        let mut source = ScriptedAnswerSource::repeating("0", 1.0, 3);
        for expected_round in 1..=3 {
            let outcome = session.play_round(&mut source).unwrap();
            assert_eq!(outcome.round, expected_round);
        }
        assert!(session.is_finished());
        assert_eq!(session.log().len(), 3);
        assert_eq!(session.engine().training_len(), 3);
    }

    #[test]
    fn test_outcome_reports_the_difficulty_that_was_asked() {
        let mut session = session(2);
        let mut source = OffsetSource { offset: 0.0 };
        let first = session.play_round(&mut source).unwrap();
        assert_eq!(first.difficulty, Difficulty::Easy);
        // One fast correct answer raises the level for the next round
        assert_eq!(first.next_difficulty, Difficulty::Medium);
        let second = session.play_round(&mut source).unwrap();
        assert_eq!(second.difficulty, Difficulty::Medium);
    }
}
