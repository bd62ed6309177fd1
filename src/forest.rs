use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::rolling::running_mean;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub seed: u64,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    pub bootstrap: bool,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            min_samples_split: 2,
            max_depth: None,
            bootstrap: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Node {
    Leaf(f64),
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn fit(x: &[Vec<f64>], y: &[f64], sample: &mut [usize], cfg: &ForestConfig) -> Self {
        let mut tree = RegressionTree { nodes: Vec::new() };
        tree.grow(x, y, sample, 0, cfg);
        tree
    }

    fn grow(
        &mut self,
        x: &[Vec<f64>],
        y: &[f64],
        sample: &mut [usize],
        depth: usize,
        cfg: &ForestConfig,
    ) -> usize {
        let id = self.nodes.len();
        self.nodes.push(Node::Leaf(running_mean(sample.iter().map(|&i| y[i]))));

        let depth_reached = cfg.max_depth.is_some_and(|d| depth >= d);
        if sample.len() < cfg.min_samples_split.max(2) || depth_reached {
            return id;
        }
        let Some((feature, threshold)) = best_split(x, y, sample) else {
            return id;
        };

        sample.sort_by(|&a, &b| {
            let la = x[a][feature] <= threshold;
            let lb = x[b][feature] <= threshold;
            lb.cmp(&la).then(a.cmp(&b))
        });
        let cut = sample
            .iter()
            .take_while(|&&i| x[i][feature] <= threshold)
            .count();
        if cut == 0 || cut == sample.len() {
            return id;
        }

        let (lhs, rhs) = sample.split_at_mut(cut);
        let left = self.grow(x, y, lhs, depth + 1, cfg);
        let right = self.grow(x, y, rhs, depth + 1, cfg);
        self.nodes[id] = Node::Split {
            feature,
            threshold,
            left,
            right,
        };
        id
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut at = 0usize;
        loop {
            match self.nodes[at] {
                Node::Leaf(v) => return v,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = row.get(feature).copied().unwrap_or(0.0);
                    at = if v <= threshold { left } else { right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

// Lowest total squared error over every feature; ties keep the first candidate.
fn best_split(x: &[Vec<f64>], y: &[f64], sample: &[usize]) -> Option<(usize, f64)> {
    let n_features = x.get(sample[0])?.len();
    let mut order = sample.to_vec();
    let mut best: Option<(f64, usize, f64)> = None;

    let total_sum: f64 = sample.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = sample.iter().map(|&i| y[i] * y[i]).sum();
    let n = sample.len() as f64;
    let parent_sse = total_sq - total_sum * total_sum / n;
    // Pure node, or labels too large to score: keep it a leaf.
    if !parent_sse.is_finite() || parent_sse <= 1e-12 {
        return None;
    }

    for f in 0..n_features {
        order.sort_by(|&a, &b| x[a][f].total_cmp(&x[b][f]).then(a.cmp(&b)));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..order.len() {
            let prev = order[k - 1];
            left_sum += y[prev];
            left_sq += y[prev] * y[prev];

            let lo = x[prev][f];
            let hi = x[order[k]][f];
            if lo >= hi {
                continue;
            }
            let nl = k as f64;
            let nr = n - nl;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse =
                (left_sq - left_sum * left_sum / nl) + (right_sq - right_sum * right_sum / nr);
            if !sse.is_finite() {
                continue;
            }

            if best.is_none_or(|(b, _, _)| sse < b) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some((sse, f, threshold));
            }
        }
    }

    best.map(|(_, f, t)| (f, t))
}

#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<RegressionTree>,
    n_features: usize,
}

impl Forest {
    /// `None` for an empty or ragged training set.
    pub fn fit(x: &[Vec<f64>], y: &[f64], cfg: &ForestConfig) -> Option<Self> {
        if x.is_empty() || x.len() != y.len() {
            return None;
        }
        let n_features = x[0].len();
        if x.iter().any(|row| row.len() != n_features) {
            return None;
        }

        let mut rng = StdRng::seed_from_u64(cfg.seed);
        let n = x.len();
        let trees = (0..cfg.n_estimators.max(1))
            .map(|_| {
                let mut sample: Vec<usize> = if cfg.bootstrap {
                    (0..n).map(|_| rng.gen_range(0..n)).collect()
                } else {
                    (0..n).collect()
                };
                RegressionTree::fit(x, y, &mut sample, cfg)
            })
            .collect();

        Some(Self { trees, n_features })
    }

    /// Tree outputs averaged in build order.
    pub fn predict(&self, row: &[f64]) -> f64 {
        running_mean(self.trees.iter().map(|t| t.predict(row)))
    }

    pub fn predict_batch(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|r| self.predict(r)).collect()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}
