//! Flat-array decision tree backend.

use super::{Classifier, ClassifierError, Features, FEATURE_NAMES};
use serde::{Deserialize, Serialize};

/// A tree node. Children always sit at higher indices than their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, else `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

/// Decision tree evaluated from node 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    pub fn new(nodes: Vec<TreeNode>) -> Result<Self, ClassifierError> {
        let tree = Self { nodes };
        tree.validate()?;
        Ok(tree)
    }

    /// Check structure so evaluation always terminates in a leaf.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.nodes.is_empty() {
            return Err(ClassifierError::InvalidModel("decision tree has no nodes".to_string()));
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= FEATURE_NAMES.len() {
                    return Err(ClassifierError::InvalidModel(format!(
                        "node {index} splits on unknown feature {feature}"
                    )));
                }
                if !threshold.is_finite() {
                    return Err(ClassifierError::InvalidModel(format!(
                        "node {index} has a non-finite threshold"
                    )));
                }
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(ClassifierError::InvalidModel(format!(
                            "node {index} has out-of-order child {child}"
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    fn predict_one(&self, x: &Features) -> Result<i64, ClassifierError> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { class }) => return Ok(*class),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if x[*feature] <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(ClassifierError::Prediction(format!(
                        "tree walked to missing node {index}"
                    )))
                }
            }
        }
    }
}

impl Classifier for DecisionTree {
    fn predict(&self, features: &[Features]) -> Result<Vec<i64>, ClassifierError> {
        features.iter().map(|x| self.predict_one(x)).collect()
    }

    fn name(&self) -> &'static str {
        "decision_tree"
    }
}
