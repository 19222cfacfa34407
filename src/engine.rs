use crate::classifier::{DecisionTree, FeatureVector};
use crate::puzzle::Difficulty;
use crate::stats::AttemptLog;

/// Tuning knobs for the difficulty engine. Every threshold the decision
/// rule compares against lives here rather than inline.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// How many trailing attempts feed the rolling statistics.
    pub history_window: usize,
    /// Training examples required before the classifier takes over.
    pub min_training_samples: usize,
    /// Average response times are capped here before entering the features.
    pub response_cap_secs: f64,
    /// Window accuracy at or above this raises the level...
    pub raise_accuracy: f64,
    /// ...provided answers come this fast...
    pub fast_response_secs: f64,
    /// ...or the streak is at least this long.
    pub raise_streak: u32,
    /// Window accuracy below this lowers the level.
    pub drop_accuracy: f64,
    /// Depth limit for the fitted decision tree.
    pub max_tree_depth: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_window: 8,
            min_training_samples: 12,
            response_cap_secs: 30.0,
            raise_accuracy: 0.8,
            fast_response_secs: 8.0,
            raise_streak: 3,
            drop_accuracy: 0.5,
            max_tree_depth: 5,
        }
    }
}

/// Rolling performance snapshot the decision is based on.
/// Computed fresh from the log on every query, never cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Features {
    pub accuracy: f64,
    pub avg_response_secs: f64,
    pub streak: u32,
    pub last_correct: bool,
    pub difficulty: Difficulty,
}

impl Features {
    /// Numeric encoding consumed by the classifier.
    pub fn to_vector(self) -> FeatureVector {
        [
            self.accuracy,
            self.avg_response_secs,
            self.streak as f64,
            if self.last_correct { 1.0 } else { 0.0 },
            self.difficulty.index() as f64,
        ]
    }
}

/// How the next difficulty gets decided: the fixed threshold rule until
/// enough examples accumulate, then a fitted tree.
#[derive(Debug)]
pub enum DecisionStrategy {
    Heuristic,
    Trained(DecisionTree),
}

impl DecisionStrategy {
    pub fn is_trained(&self) -> bool {
        matches!(self, DecisionStrategy::Trained(_))
    }
}

/// Reportable tag for the active decision path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum DecisionSource {
    #[strum(serialize = "heuristic")]
    Heuristic,
    #[strum(serialize = "trained classifier")]
    TrainedClassifier,
}

/// One (features, chosen next difficulty) pair in the training set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingExample {
    pub features: FeatureVector,
    pub label: usize,
}

/// Turns recent performance into difficulty decisions and learns to
/// reproduce its own decision pattern over time.
///
/// The training labels are the engine's previously chosen difficulties,
/// so the fitted tree approximates the threshold rule across feature
/// space rather than any external ground truth. That feedback loop is
/// load-bearing; the labels are not graded against later outcomes.
#[derive(Debug)]
pub struct AdaptiveEngine {
    config: EngineConfig,
    strategy: DecisionStrategy,
    examples: Vec<TrainingExample>,
    last_difficulty: Difficulty,
}

impl AdaptiveEngine {
    pub fn new(starting_difficulty: Difficulty) -> Self {
        Self::with_config(starting_difficulty, EngineConfig::default())
    }

    pub fn with_config(starting_difficulty: Difficulty, config: EngineConfig) -> Self {
        Self {
            config,
            strategy: DecisionStrategy::Heuristic,
            examples: Vec::new(),
            last_difficulty: starting_difficulty,
        }
    }

    /// The current working difficulty: the most recent decision, or the
    /// starting difficulty before any decision has been made.
    pub fn last_difficulty(&self) -> Difficulty {
        self.last_difficulty
    }

    pub fn training_len(&self) -> usize {
        self.examples.len()
    }

    pub fn strategy(&self) -> &DecisionStrategy {
        &self.strategy
    }

    /// Build the feature snapshot from the log's trailing window.
    pub fn features(&self, log: &AttemptLog) -> Features {
        let window = self.config.history_window;
        Features {
            accuracy: log.accuracy_last_n(window),
            avg_response_secs: log
                .avg_time_last_n(window)
                .min(self.config.response_cap_secs),
            streak: log.current_streak(),
            last_correct: log.latest().is_some_and(|a| a.correct),
            difficulty: self.last_difficulty,
        }
    }

    /// The fixed threshold rule. Raise wins over lower; lower is only
    /// considered when raise does not fire.
    pub fn heuristic_decision(&self, features: &Features) -> Difficulty {
        let c = &self.config;
        if features.accuracy >= c.raise_accuracy
            && (features.avg_response_secs <= c.fast_response_secs
                || features.streak >= c.raise_streak)
        {
            features.difficulty.step_up()
        } else if features.accuracy < c.drop_accuracy
            || (!features.last_correct && features.streak == 0)
        {
            features.difficulty.step_down()
        } else {
            features.difficulty
        }
    }

    /// Decide the next difficulty from the log and make it current.
    pub fn predict_next(&mut self, log: &AttemptLog) -> Difficulty {
        let features = self.features(log);
        let next = match &self.strategy {
            DecisionStrategy::Heuristic => self.heuristic_decision(&features),
            DecisionStrategy::Trained(tree) => {
                Difficulty::from_index(tree.predict(&features.to_vector()))
            }
        };
        self.last_difficulty = next;
        next
    }

    /// Record the decision just taken as a training example, and refit the
    /// classifier on the whole accumulated set once it is large enough.
    /// Every call past the threshold triggers a full refit.
    pub fn add_training_example(&mut self, log: &AttemptLog, chosen: Difficulty) {
        let features = self.features(log);
        self.examples.push(TrainingExample {
            features: features.to_vector(),
            label: chosen.index(),
        });
        if self.examples.len() >= self.config.min_training_samples {
            self.refit();
        }
    }

    fn refit(&mut self) {
        let samples: Vec<FeatureVector> = self.examples.iter().map(|e| e.features).collect();
        let labels: Vec<usize> = self.examples.iter().map(|e| e.label).collect();
        self.strategy = DecisionStrategy::Trained(DecisionTree::fit(
            &samples,
            &labels,
            self.config.max_tree_depth,
        ));
    }

    pub fn decision_source(&self) -> DecisionSource {
        match self.strategy {
            DecisionStrategy::Heuristic => DecisionSource::Heuristic,
            DecisionStrategy::Trained(_) => DecisionSource::TrainedClassifier,
        }
    }

    /// One-line answer to "how was the last difficulty chosen?".
    pub fn explain(&self) -> String {
        match self.decision_source() {
            DecisionSource::Heuristic => format!(
                "Using heuristic ({} of {} training examples).",
                self.examples.len(),
                self.config.min_training_samples
            ),
            DecisionSource::TrainedClassifier => "Using trained classifier.".to_string(),
        }
    }
}
