use crate::puzzle::{Difficulty, Operation};
use crate::util::{mean, std_dev};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;

/// One solved problem instance. Immutable once recorded.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub question: String,
    pub expected: f64,
    /// Parsed learner answer; `None` when the input was not a number.
    pub given: Option<f64>,
    pub correct: bool,
    pub response_secs: f64,
    pub difficulty: Difficulty,
    pub operation: Operation,
    pub recorded_at: DateTime<Local>,
}

/// Whole-session aggregates for the end-of-session report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub avg_response_secs: f64,
    pub response_spread_secs: f64,
    pub streak: u32,
}

/// Per-operation aggregates, keyed by [`Operation`] in the breakdown map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationStats {
    pub attempts: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub avg_response_secs: f64,
}

/// Ordered record of every attempt in the session. Append-only; the
/// sequence order is the chronological solve order.
#[derive(Debug, Default)]
pub struct AttemptLog {
    attempts: Vec<Attempt>,
}

impl AttemptLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::too_many_arguments)]
    pub fn log_attempt(
        &mut self,
        question: &str,
        expected: f64,
        given: Option<f64>,
        correct: bool,
        response_secs: f64,
        difficulty: Difficulty,
        operation: Operation,
    ) {
        self.attempts.push(Attempt {
            question: question.to_string(),
            expected,
            given,
            correct,
            response_secs,
            difficulty,
            operation,
            recorded_at: Local::now(),
        });
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn latest(&self) -> Option<&Attempt> {
        self.attempts.last()
    }

    fn window(&self, n: usize) -> &[Attempt] {
        let start = self.attempts.len().saturating_sub(n);
        &self.attempts[start..]
    }

    /// Fraction correct among the last `min(n, len)` attempts.
    /// 0.0 on an empty log.
    pub fn accuracy_last_n(&self, n: usize) -> f64 {
        let window = self.window(n);
        if window.is_empty() {
            return 0.0;
        }
        window.iter().filter(|a| a.correct).count() as f64 / window.len() as f64
    }

    /// Mean response time over the last `min(n, len)` attempts.
    /// 0.0 on an empty log.
    pub fn avg_time_last_n(&self, n: usize) -> f64 {
        let times: Vec<f64> = self.window(n).iter().map(|a| a.response_secs).collect();
        mean(&times).unwrap_or(0.0)
    }

    /// Consecutive correct attempts ending at the most recent one.
    pub fn current_streak(&self) -> u32 {
        self.attempts.iter().rev().take_while(|a| a.correct).count() as u32
    }

    pub fn summary(&self) -> SessionSummary {
        let total = self.attempts.len();
        let correct = self.attempts.iter().filter(|a| a.correct).count();
        let times: Vec<f64> = self.attempts.iter().map(|a| a.response_secs).collect();
        SessionSummary {
            total,
            correct,
            accuracy: if total > 0 {
                correct as f64 / total as f64
            } else {
                0.0
            },
            avg_response_secs: mean(&times).unwrap_or(0.0),
            response_spread_secs: std_dev(&times).unwrap_or(0.0),
            streak: self.current_streak(),
        }
    }

    /// Aggregates split by operation, for the end-of-session report.
    pub fn operation_breakdown(&self) -> BTreeMap<Operation, OperationStats> {
        let mut grouped: BTreeMap<Operation, Vec<&Attempt>> = BTreeMap::new();
        for attempt in &self.attempts {
            grouped.entry(attempt.operation).or_default().push(attempt);
        }
        grouped
            .into_iter()
            .map(|(operation, attempts)| {
                let correct = attempts.iter().filter(|a| a.correct).count();
                let times: Vec<f64> = attempts.iter().map(|a| a.response_secs).collect();
                (
                    operation,
                    OperationStats {
                        attempts: attempts.len(),
                        correct,
                        accuracy: correct as f64 / attempts.len() as f64,
                        avg_response_secs: mean(&times).unwrap_or(0.0),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_with(results: &[(bool, f64)]) -> AttemptLog {
        let mut log = AttemptLog::new();
        for &(correct, secs) in results {
            log.log_attempt(
                "2 + 2 = ?",
                4.0,
                if correct { Some(4.0) } else { Some(5.0) },
                correct,
                secs,
                Difficulty::Easy,
                Operation::Add,
            );
        }
        log
    }

    #[test]
    fn test_empty_log_statistics_are_zero() {
        let log = AttemptLog::new();
        assert!(log.is_empty());
        for n in [1, 5, 100] {
            assert_eq!(log.accuracy_last_n(n), 0.0);
            assert_eq!(log.avg_time_last_n(n), 0.0);
        }
        assert_eq!(log.current_streak(), 0);
    }

    #[test]
    fn test_accuracy_over_short_log_uses_all_attempts() {
        let log = log_with(&[(true, 2.0), (false, 3.0), (true, 4.0)]);
        // Window larger than the log covers the whole log
        assert_eq!(log.accuracy_last_n(10), 2.0 / 3.0);
        assert_eq!(log.avg_time_last_n(10), 3.0);
    }

    #[test]
    fn test_accuracy_respects_trailing_window() {
        let log = log_with(&[(false, 1.0), (false, 1.0), (true, 2.0), (true, 2.0)]);
        assert_eq!(log.accuracy_last_n(2), 1.0);
        assert_eq!(log.accuracy_last_n(4), 0.5);
        assert_eq!(log.avg_time_last_n(2), 2.0);
        assert_eq!(log.avg_time_last_n(4), 1.5);
    }

    #[test]
    fn test_streak_counts_trailing_correct_answers() {
        let log = log_with(&[(true, 1.0), (false, 1.0), (true, 1.0), (true, 1.0)]);
        assert_eq!(log.current_streak(), 2);
    }

    #[test]
    fn test_streak_resets_after_incorrect_attempt() {
        let mut log = log_with(&[(true, 1.0), (true, 1.0), (true, 1.0)]);
        assert_eq!(log.current_streak(), 3);
        log.log_attempt(
            "3 + 3 = ?",
            6.0,
            None,
            false,
            1.0,
            Difficulty::Easy,
            Operation::Add,
        );
        assert_eq!(log.current_streak(), 0);
        log.log_attempt(
            "4 + 4 = ?",
            8.0,
            Some(8.0),
            true,
            1.0,
            Difficulty::Easy,
            Operation::Add,
        );
        assert_eq!(log.current_streak(), 1);
    }

    #[test]
    fn test_attempts_keep_insertion_order() {
        let log = log_with(&[(true, 1.0), (false, 2.0)]);
        let attempts = log.attempts();
        assert_eq!(attempts.len(), 2);
        assert!(attempts[0].correct);
        assert!(!attempts[1].correct);
        assert_eq!(log.latest().map(|a| a.correct), Some(false));
    }

    #[test]
    fn test_unparsable_answer_is_recorded_without_a_value() {
        let mut log = AttemptLog::new();
        log.log_attempt(
            "6 / 2 = ?",
            3.0,
            None,
            false,
            2.5,
            Difficulty::Medium,
            Operation::Div,
        );
        assert_eq!(log.latest().and_then(|a| a.given), None);
        assert!(!log.latest().map(|a| a.correct).unwrap());
    }

    #[test]
    fn test_summary_aggregates_whole_log() {
        let log = log_with(&[(true, 2.0), (false, 4.0), (true, 6.0), (true, 4.0)]);
        let summary = log.summary();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.correct, 3);
        assert_eq!(summary.accuracy, 0.75);
        assert_eq!(summary.avg_response_secs, 4.0);
        assert_eq!(summary.streak, 2);
        assert!(summary.response_spread_secs > 0.0);
    }

    #[test]
    fn test_summary_of_empty_log() {
        let summary = AttemptLog::new().summary();
        assert_eq!(
            summary,
            SessionSummary {
                total: 0,
                correct: 0,
                accuracy: 0.0,
                avg_response_secs: 0.0,
                response_spread_secs: 0.0,
                streak: 0,
            }
        );
    }

    #[test]
    fn test_operation_breakdown_groups_by_operation() {
        let mut log = AttemptLog::new();
        log.log_attempt(
            "2 + 2 = ?",
            4.0,
            Some(4.0),
            true,
            2.0,
            Difficulty::Easy,
            Operation::Add,
        );
        log.log_attempt(
            "3 + 3 = ?",
            6.0,
            Some(7.0),
            false,
            4.0,
            Difficulty::Easy,
            Operation::Add,
        );
        log.log_attempt(
            "2 * 5 = ?",
            10.0,
            Some(10.0),
            true,
            1.0,
            Difficulty::Easy,
            Operation::Mul,
        );

        let breakdown = log.operation_breakdown();
        assert_eq!(breakdown.len(), 2);
        let add = &breakdown[&Operation::Add];
        assert_eq!(add.attempts, 2);
        assert_eq!(add.correct, 1);
        assert_eq!(add.accuracy, 0.5);
        assert_eq!(add.avg_response_secs, 3.0);
        let mul = &breakdown[&Operation::Mul];
        assert_eq!(mul.attempts, 1);
        assert_eq!(mul.accuracy, 1.0);
    }
}
