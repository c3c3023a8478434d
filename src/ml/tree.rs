use crate::utils::error::{PredictorError, Result};
use ndarray::{ArrayView1, ArrayView2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    sse: f64,
}

/// CART regression tree stored as a flat node arena; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    /// Grows a tree over `samples` (row indices, duplicates allowed for bootstrap draws).
    pub fn grow(
        x: ArrayView2<f64>,
        y: ArrayView1<f64>,
        samples: Vec<usize>,
        max_depth: Option<usize>,
        min_samples_split: usize,
    ) -> Self {
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack = vec![(0usize, samples, 0usize)];

        while let Some((id, samples, depth)) = stack.pop() {
            let value = mean(y, &samples);
            let splittable =
                samples.len() >= min_samples_split && max_depth.map_or(true, |d| depth < d);

            let split = if splittable {
                best_split(x, y, &samples, value)
            } else {
                None
            };

            match split {
                Some(split) => {
                    let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
                        .iter()
                        .partition(|&&row| x[[row, split.feature]] <= split.threshold);

                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::Leaf { value: 0.0 });
                    nodes.push(Node::Leaf { value: 0.0 });
                    nodes[id] = Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    };

                    stack.push((right, right_samples, depth + 1));
                    stack.push((left, left_samples, depth + 1));
                }
                None => nodes[id] = Node::Leaf { value },
            }
        }

        Self { nodes }
    }

    /// Walks from the root to a leaf. `None` when the row is narrower than a
    /// split feature or a child index leaves the arena.
    pub fn predict_row(&self, row: ArrayView1<f64>) -> Option<f64> {
        let mut id = 0;
        // 子節點索引一定大於父節點，步數不會超過節點數
        for _ in 0..self.nodes.len() {
            match *self.nodes.get(id)? {
                Node::Leaf { value } => return Some(value),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if *row.get(feature)? <= threshold { left } else { right };
                }
            }
        }
        None
    }

    /// Checks a deserialized tree: split features below `n_features`, children
    /// inside the arena and after their parent.
    pub fn check(&self, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(PredictorError::prediction("regression tree has no nodes"));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = *node
            {
                if feature >= n_features {
                    return Err(PredictorError::ShapeMismatch {
                        stage: "random forest".to_string(),
                        expected: n_features,
                        found: feature + 1,
                    });
                }
                for child in [left, right] {
                    if child <= id || child >= self.nodes.len() {
                        return Err(PredictorError::prediction(format!(
                            "tree node {} points to invalid child {}",
                            id, child
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            if let Node::Split { left, right, .. } = self.nodes[id] {
                stack.push((left, depth + 1));
                stack.push((right, depth + 1));
            }
        }
        deepest
    }
}

fn mean(y: ArrayView1<f64>, samples: &[usize]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|&row| y[row]).sum::<f64>() / samples.len() as f64
}

/// 以節點平均值置中後計算 SSE，避免房價平方造成的精度流失
fn best_split(
    x: ArrayView2<f64>,
    y: ArrayView1<f64>,
    samples: &[usize],
    node_mean: f64,
) -> Option<SplitCandidate> {
    let n = samples.len();
    let parent_sse: f64 = samples
        .iter()
        .map(|&row| (y[row] - node_mean).powi(2))
        .sum();
    if parent_sse <= 0.0 {
        return None;
    }

    let total_sum: f64 = samples.iter().map(|&row| y[row] - node_mean).sum();
    let total_sq = parent_sse;
    let mut best: Option<SplitCandidate> = None;
    let mut order = samples.to_vec();

    for feature in 0..x.ncols() {
        order.sort_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for k in 1..n {
            let centered = y[order[k - 1]] - node_mean;
            left_sum += centered;
            left_sq += centered * centered;

            let lo = x[[order[k - 1], feature]];
            let hi = x[[order[k], feature]];
            if lo >= hi {
                continue;
            }

            let left_n = k as f64;
            let right_n = (n - k) as f64;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;
            let sse = (left_sq - left_sum * left_sum / left_n)
                + (right_sq - right_sum * right_sum / right_n);

            if best.map_or(true, |b| sse < b.sse) {
                let mut threshold = lo + (hi - lo) / 2.0;
                if threshold >= hi {
                    threshold = lo;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    sse,
                });
            }
        }
    }

    best.filter(|b| b.sse < parent_sse)
}
