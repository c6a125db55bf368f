use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{FEATURE_COUNT, Prediction};
use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("failed to read model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model artifact: {0}")]
    Invalid(String),
}

/// 决策树节点；特征值 `<= threshold` 走左子树
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: [f64; 2],
    },
}

/// 序列化的模型文件
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// 随机森林：各树叶子分布归一化后取平均
    Forest { trees: Vec<Vec<TreeNode>> },
    /// 逻辑回归：bot = sigmoid(w·x + b)
    Logistic { weights: Vec<f64>, intercept: f64 },
}

impl ModelArtifact {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let artifact: Self = serde_json::from_str(&raw)?;
        artifact.validate()?;
        tracing::info!(
            "Loaded {} model from {}",
            artifact.kind(),
            path.as_ref().display()
        );
        Ok(artifact)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ModelArtifact::Forest { .. } => "forest",
            ModelArtifact::Logistic { .. } => "logistic",
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelArtifact::Forest { trees } => {
                if trees.is_empty() {
                    return Err(ModelError::Invalid("forest has no trees".into()));
                }
                for (t, nodes) in trees.iter().enumerate() {
                    if nodes.is_empty() {
                        return Err(ModelError::Invalid(format!("tree {t} is empty")));
                    }
                    for (i, node) in nodes.iter().enumerate() {
                        match *node {
                            TreeNode::Split {
                                feature,
                                left,
                                right,
                                ..
                            } => {
                                if feature >= FEATURE_COUNT {
                                    return Err(ModelError::Invalid(format!(
                                        "tree {t} node {i}: feature index {feature} out of range"
                                    )));
                                }
                                // 子节点必须排在父节点之后，保证遍历一定终止
                                for child in [left, right] {
                                    if child <= i || child >= nodes.len() {
                                        return Err(ModelError::Invalid(format!(
                                            "tree {t} node {i}: child {child} out of range"
                                        )));
                                    }
                                }
                            }
                            TreeNode::Leaf { value } => {
                                if value.iter().any(|v| *v < 0.0) || value.iter().sum::<f64>() <= 0.0 {
                                    return Err(ModelError::Invalid(format!(
                                        "tree {t} node {i}: leaf has no positive weight"
                                    )));
                                }
                            }
                        }
                    }
                }
                Ok(())
            }
            ModelArtifact::Logistic { weights, .. } => {
                if weights.len() != FEATURE_COUNT {
                    return Err(ModelError::Invalid(format!(
                        "expected {FEATURE_COUNT} weights, got {}",
                        weights.len()
                    )));
                }
                Ok(())
            }
        }
    }

    pub(super) fn evaluate(&self, features: &[f64]) -> Result<Prediction, AppError> {
        match self {
            ModelArtifact::Forest { trees } => {
                let mut human = 0.0;
                let mut bot = 0.0;
                for nodes in trees {
                    let leaf = walk(nodes, features)?;
                    human += leaf.human_probability;
                    bot += leaf.bot_probability;
                }
                let n = trees.len() as f64;
                Prediction::from_weights(human / n, bot / n)
            }
            ModelArtifact::Logistic { weights, intercept } => {
                let z = weights
                    .iter()
                    .zip(features)
                    .map(|(w, x)| w * x)
                    .sum::<f64>()
                    + intercept;
                let bot = 1.0 / (1.0 + (-z).exp());
                Prediction::from_weights(1.0 - bot, bot)
            }
        }
    }
}

fn walk(nodes: &[TreeNode], features: &[f64]) -> Result<Prediction, AppError> {
    let mut idx = 0;
    loop {
        match nodes.get(idx) {
            Some(TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            }) => {
                let value = features.get(*feature).ok_or_else(|| {
                    AppError::Classifier(format!("feature index {feature} out of range"))
                })?;
                let next = if *value <= *threshold { *left } else { *right };
                if next <= idx {
                    return Err(AppError::Classifier(format!(
                        "tree node {idx} points backwards to {next}"
                    )));
                }
                idx = next;
            }
            Some(TreeNode::Leaf { value }) => return Prediction::from_weights(value[0], value[1]),
            None => {
                return Err(AppError::Classifier(format!(
                    "tree node {idx} does not exist"
                )));
            }
        }
    }
}
