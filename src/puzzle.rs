use clap::ValueEnum;
use rand::Rng;
use serde::Serialize;

/// Difficulty level of a puzzle, ordered easiest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Ordinal encoding used for comparisons and classifier labels.
    pub fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
        }
    }

    /// Inverse of [`Difficulty::index`]; out-of-range values clamp to `Hard`.
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Difficulty::Easy,
            1 => Difficulty::Medium,
            _ => Difficulty::Hard,
        }
    }

    /// One level harder, capped at `Hard`.
    pub fn step_up(self) -> Self {
        match self {
            Difficulty::Easy => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Hard => Difficulty::Hard,
        }
    }

    /// One level easier, floored at `Easy`.
    pub fn step_down(self) -> Self {
        match self {
            Difficulty::Hard => Difficulty::Medium,
            Difficulty::Medium | Difficulty::Easy => Difficulty::Easy,
        }
    }
}

/// Arithmetic operation a puzzle is built from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    ValueEnum,
    strum_macros::Display,
)]
pub enum Operation {
    #[value(alias = "+")]
    #[strum(serialize = "+")]
    Add,
    #[value(alias = "-")]
    #[strum(serialize = "-")]
    Sub,
    #[value(alias = "*")]
    #[strum(serialize = "*")]
    Mul,
    #[value(alias = "/")]
    #[strum(serialize = "/")]
    Div,
}

pub const OPERATIONS: [Operation; 4] = [
    Operation::Add,
    Operation::Sub,
    Operation::Mul,
    Operation::Div,
];

/// A generated arithmetic problem with its exact answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Puzzle {
    pub question: String,
    pub answer: f64,
    pub operation: Operation,
    pub operands: (i64, i64),
}

fn operand_bounds(difficulty: Difficulty) -> (i64, i64) {
    match difficulty {
        Difficulty::Easy => (1, 10),
        Difficulty::Medium => (5, 20),
        Difficulty::Hard => (10, 100),
    }
}

/// Generate one puzzle at the given difficulty. `operation` fixes the
/// operation; `None` picks one at random. Deterministic for a given `rng`.
pub fn generate_puzzle(
    rng: &mut impl Rng,
    difficulty: Difficulty,
    operation: Option<Operation>,
) -> Puzzle {
    let operation =
        operation.unwrap_or_else(|| OPERATIONS[rng.gen_range(0..OPERATIONS.len())]);
    let (lo, hi) = operand_bounds(difficulty);

    let (a, b, answer) = match operation {
        Operation::Add => {
            let a = rng.gen_range(lo..=hi);
            let b = rng.gen_range(lo..=hi);
            (a, b, (a + b) as f64)
        }
        Operation::Sub => {
            let a = rng.gen_range(lo..=hi);
            // Keep results non-negative at the easiest level
            let b = if difficulty == Difficulty::Easy {
                rng.gen_range(lo..=a)
            } else {
                rng.gen_range(lo..=hi)
            };
            (a, b, (a - b) as f64)
        }
        Operation::Mul => {
            let (a, b) = match difficulty {
                Difficulty::Easy => (rng.gen_range(1..=10), rng.gen_range(1..=10)),
                Difficulty::Medium => (rng.gen_range(2..=12), rng.gen_range(2..=12)),
                Difficulty::Hard => (rng.gen_range(5..=20), rng.gen_range(2..=12)),
            };
            (a, b, (a * b) as f64)
        }
        Operation::Div => {
            // Built from a product so the quotient is exact
            let (b, q) = if difficulty == Difficulty::Easy {
                (rng.gen_range(1..=10), rng.gen_range(1..=10))
            } else {
                (rng.gen_range(1 + lo / 2..=hi / 2 + 1), rng.gen_range(lo..=hi))
            };
            let a = b * q;
            (a, b, a as f64 / b as f64)
        }
    };

    Puzzle {
        question: format!("{} {} {} = ?", a, operation, b),
        answer,
        operation,
        operands: (a, b),
    }
}
