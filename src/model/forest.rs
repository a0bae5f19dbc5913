use serde::Deserialize;

use super::ArtifactError;
use crate::inference::predictor::{Model, ModelError, RawOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Task {
    Regression,
    Classification,
}

/// One node of an exported decision tree. Samples with
/// `features[feature] <= threshold` go to `left`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// Averaged ensemble of decision trees (a single tree is an ensemble of one).
///
/// Regression leaves hold one value; classification leaves hold a class
/// distribution of width `n_classes`, and the predicted code is the arg-max
/// of the averaged distribution.
#[derive(Debug, Clone, Deserialize)]
pub struct TreeEnsemble {
    pub feature_names: Vec<String>,
    pub task: Task,
    #[serde(default)]
    pub n_classes: Option<usize>,
    pub trees: Vec<Vec<Node>>,
}

impl TreeEnsemble {
    pub fn check(&self) -> Result<(), ArtifactError> {
        let leaf_width = match (self.task, self.n_classes) {
            (Task::Regression, _) => 1,
            (Task::Classification, Some(n)) if n > 0 => n,
            (Task::Classification, _) => return Err(ArtifactError::NoClasses),
        };
        if self.trees.is_empty() {
            return Err(ArtifactError::NoTrees);
        }

        for (t, tree) in self.trees.iter().enumerate() {
            if tree.is_empty() {
                return Err(ArtifactError::EmptyTree { tree: t });
            }
            for (i, node) in tree.iter().enumerate() {
                match node {
                    Node::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } => {
                        if *feature >= self.feature_names.len() {
                            return Err(ArtifactError::FeatureOutOfRange {
                                tree: t,
                                node: i,
                                feature: *feature,
                            });
                        }
                        if !threshold.is_finite() {
                            return Err(ArtifactError::NonFiniteThreshold { tree: t, node: i });
                        }
                        // Children must point forward so every walk terminates.
                        for child in [*left, *right] {
                            if child <= i || child >= tree.len() {
                                return Err(ArtifactError::BadChild {
                                    tree: t,
                                    node: i,
                                    child,
                                });
                            }
                        }
                    }
                    Node::Leaf { value } => {
                        if value.len() != leaf_width {
                            return Err(ArtifactError::LeafWidth {
                                tree: t,
                                node: i,
                                width: value.len(),
                                expected: leaf_width,
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    fn leaf<'a>(tree: &'a [Node], features: &[f64]) -> Result<&'a [f64], ModelError> {
        let mut idx = 0;
        loop {
            match tree.get(idx) {
                Some(Node::Leaf { value }) => return Ok(value.as_slice()),
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let x = features
                        .get(*feature)
                        .ok_or_else(|| ModelError::Corrupt(format!("feature {feature}")))?;
                    let next = if *x <= *threshold { *left } else { *right };
                    if next <= idx {
                        return Err(ModelError::Corrupt(format!("backward edge at node {idx}")));
                    }
                    idx = next;
                }
                None => return Err(ModelError::Corrupt(format!("node {idx} missing"))),
            }
        }
    }
}

impl Model for TreeEnsemble {
    fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    fn predict(&self, features: &[f64]) -> Result<RawOutput, ModelError> {
        if features.len() != self.feature_names.len() {
            return Err(ModelError::ShapeMismatch {
                expected: self.feature_names.len(),
                got: features.len(),
            });
        }
        let n_trees = self.trees.len() as f64;

        match self.task {
            Task::Regression => {
                let mut total = 0.0;
                for tree in &self.trees {
                    let leaf = Self::leaf(tree, features)?;
                    total += leaf.first().copied().unwrap_or_default();
                }
                Ok(RawOutput::Score(total / n_trees))
            }
            Task::Classification => {
                let width = self.n_classes.unwrap_or_default();
                let mut votes = vec![0.0; width];
                for tree in &self.trees {
                    let leaf = Self::leaf(tree, features)?;
                    for (acc, p) in votes.iter_mut().zip(leaf) {
                        *acc += p;
                    }
                }
                // First maximum wins on ties.
                let mut best = 0;
                for (code, score) in votes.iter().enumerate() {
                    if *score > votes[best] {
                        best = code;
                    }
                }
                Ok(RawOutput::ClassCode(best))
            }
        }
    }

    fn class_count(&self) -> Option<usize> {
        match self.task {
            Task::Regression => None,
            Task::Classification => self.n_classes,
        }
    }
}
