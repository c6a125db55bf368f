// 分类器模块
// 训练好的模型作为黑盒使用：固定顺序的特征向量 -> (人类概率, 机器人概率)

mod features;
mod model;

pub use features::{FEATURE_COUNT, FEATURE_NAMES, FeatureVector};
pub use model::{ModelArtifact, ModelError, TreeNode};

use crate::error::AppError;

/// 两类概率分布，取值 [0, 1]，和为 1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub human_probability: f64,
    pub bot_probability: f64,
}

impl Prediction {
    /// 由任意非负权重归一化得到分布
    pub fn from_weights(human: f64, bot: f64) -> Result<Self, AppError> {
        let total = human + bot;
        if total.is_nan() || total <= 0.0 || human < 0.0 || bot < 0.0 {
            return Err(AppError::Classifier(format!(
                "invalid class weights [{human}, {bot}]"
            )));
        }
        Ok(Self {
            human_probability: human / total,
            bot_probability: bot / total,
        })
    }

    pub fn bot_percent(&self) -> f64 {
        self.bot_probability * 100.0
    }

    pub fn human_percent(&self) -> f64 {
        self.human_probability * 100.0
    }
}

pub trait Classifier: Send + Sync {
    fn predict_proba(&self, features: &[f64]) -> Result<Prediction, AppError>;
}

impl Classifier for ModelArtifact {
    fn predict_proba(&self, features: &[f64]) -> Result<Prediction, AppError> {
        if features.len() != FEATURE_COUNT {
            return Err(AppError::Classifier(format!(
                "expected {FEATURE_COUNT} features, got {}",
                features.len()
            )));
        }
        if let Some(pos) = features.iter().position(|v| !v.is_finite()) {
            return Err(AppError::Classifier(format!(
                "feature {} is not a finite number",
                FEATURE_NAMES[pos]
            )));
        }
        self.evaluate(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_are_normalized() {
        let p = Prediction::from_weights(3.0, 1.0).unwrap();
        assert_eq!(p.human_probability, 0.75);
        assert_eq!(p.bot_probability, 0.25);
        assert_eq!(p.bot_percent() + p.human_percent(), 100.0);
    }

    #[test]
    fn empty_weights_are_rejected() {
        assert!(Prediction::from_weights(0.0, 0.0).is_err());
        assert!(Prediction::from_weights(-1.0, 2.0).is_err());
        assert!(Prediction::from_weights(f64::NAN, 1.0).is_err());
    }
}
