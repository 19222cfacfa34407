use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Number of features every sample carries.
pub const FEATURE_COUNT: usize = 5;

/// One training or prediction sample.
pub type FeatureVector = [f64; FEATURE_COUNT];

// Minimum impurity improvement for a split to be worth keeping.
const MIN_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        label: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// A small CART-style decision tree over fixed-width numeric samples.
///
/// Fitting never fails: degenerate inputs (a single class, identical
/// samples, or nothing at all) collapse into a leaf, and predictions only
/// ever return labels seen during training.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    root: Node,
}

impl DecisionTree {
    /// Fit a tree on the full sample set using gini impurity, growing at
    /// most `max_depth` levels of splits.
    pub fn fit(samples: &[FeatureVector], labels: &[usize], max_depth: usize) -> Self {
        let count = samples.len().min(labels.len());
        let indices: Vec<usize> = (0..count).collect();
        DecisionTree {
            root: grow(samples, labels, &indices, max_depth),
        }
    }

    pub fn predict(&self, features: &FeatureVector) -> usize {
        let mut node = &self.root;
        loop {
            match node {
                Node::Leaf { label } => return *label,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }
}

fn grow(samples: &[FeatureVector], labels: &[usize], indices: &[usize], depth_left: usize) -> Node {
    let majority = majority_label(labels, indices);
    if depth_left == 0 || indices.len() < 2 || is_pure(labels, indices) {
        return Node::Leaf { label: majority };
    }

    match best_split(samples, labels, indices) {
        None => Node::Leaf { label: majority },
        Some((feature, threshold)) => {
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| samples[i][feature] <= threshold);
            Node::Split {
                feature,
                threshold,
                left: Box::new(grow(samples, labels, &left, depth_left - 1)),
                right: Box::new(grow(samples, labels, &right, depth_left - 1)),
            }
        }
    }
}

/// Best (feature, threshold) by weighted gini, or `None` when no split
/// improves on the parent impurity.
fn best_split(
    samples: &[FeatureVector],
    labels: &[usize],
    indices: &[usize],
) -> Option<(usize, f64)> {
    let parent_impurity = gini(labels, indices);
    let mut best: Option<(f64, usize, f64)> = None;

    for feature in 0..FEATURE_COUNT {
        let mut values: Vec<f64> = indices.iter().map(|&i| samples[i][feature]).collect();
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;
            let (left, right): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .copied()
                .partition(|&i| samples[i][feature] <= threshold);
            if left.is_empty() || right.is_empty() {
                continue;
            }
            let weighted = (left.len() as f64 * gini(labels, &left)
                + right.len() as f64 * gini(labels, &right))
                / indices.len() as f64;
            let current_best = best.map_or(parent_impurity, |(impurity, _, _)| impurity);
            if weighted + MIN_GAIN < current_best {
                best = Some((weighted, feature, threshold));
            }
        }
    }

    best.map(|(_, feature, threshold)| (feature, threshold))
}

fn is_pure(labels: &[usize], indices: &[usize]) -> bool {
    indices
        .windows(2)
        .all(|pair| labels[pair[0]] == labels[pair[1]])
}

fn gini(labels: &[usize], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &i in indices {
        *counts.entry(labels[i]).or_insert(0) += 1;
    }
    let total = indices.len() as f64;
    1.0 - counts
        .values()
        .map(|&count| {
            let p = count as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Most frequent label among `indices`; ties go to the smallest label,
/// and an empty selection maps to label 0.
fn majority_label(labels: &[usize], indices: &[usize]) -> usize {
    let mut counts: BTreeMap<usize, usize> = BTreeMap::new();
    for &i in indices {
        *counts.entry(labels[i]).or_insert(0) += 1;
    }
    let mut best_label = 0;
    let mut best_count = 0;
    for (label, count) in counts {
        if count > best_count {
            best_label = label;
            best_count = count;
        }
    }
    best_label
}
