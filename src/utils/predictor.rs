use crate::config::EdgePolicy;
use crate::error::ModelError;
use crate::utils::features::{FeatureVector, FEATURE_NAMES};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Anything that turns a feature vector into a signed point margin.
///
/// The sign convention is whatever the model was trained with; callers do
/// not reinterpret it.
pub trait MarginModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError>;
}

impl<F> MarginModel for F
where
    F: Fn(&FeatureVector) -> Result<f64, ModelError>,
{
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self(features)
    }
}

/// Raw model margin and the damped margin that gets compared to the market
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub raw: f64,
    pub damped: f64,
}

/// Score one game: a single model call, then damping. The sign is untouched.
pub fn predict_margin<M>(
    features: &FeatureVector,
    model: &M,
    policy: &EdgePolicy,
) -> Result<Margin, ModelError>
where
    M: MarginModel + ?Sized,
{
    let raw = model.predict(features)?;
    if !raw.is_finite() {
        return Err(ModelError::NonFinite(raw));
    }
    Ok(Margin {
        raw,
        damped: raw * policy.damping_factor,
    })
}

/// Linear regression exported as feature names plus weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearMarginModel {
    #[serde(default)]
    pub intercept: f64,
    pub features: Vec<String>,
    pub coefficients: Vec<f64>,
}

impl LinearMarginModel {
    fn validate(&self) -> Result<(), ModelError> {
        if self.features.len() != self.coefficients.len() {
            return Err(ModelError::LengthMismatch {
                expected: self.features.len(),
                actual: self.coefficients.len(),
            });
        }
        if let Some(unknown) = self
            .features
            .iter()
            .find(|name| !FEATURE_NAMES.contains(&name.as_str()))
        {
            return Err(ModelError::UnknownFeature(unknown.clone()));
        }
        Ok(())
    }
}

impl MarginModel for LinearMarginModel {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        self.validate()?;
        let inputs = features
            .select(&self.features)
            .ok_or_else(|| ModelError::Failed("feature selection failed".to_string()))?;
        let dot: f64 = inputs
            .iter()
            .zip(&self.coefficients)
            .map(|(x, w)| x * w)
            .sum();
        Ok(self.intercept + dot)
    }
}

/// On-disk model description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSpec {
    Linear(LinearMarginModel),
    /// Unweighted mean of the member predictions
    Ensemble { members: Vec<ModelSpec> },
}

impl ModelSpec {
    pub fn validate(&self) -> Result<(), ModelError> {
        match self {
            ModelSpec::Linear(linear) => linear.validate(),
            ModelSpec::Ensemble { members } => {
                if members.is_empty() {
                    return Err(ModelError::Empty);
                }
                members.iter().try_for_each(ModelSpec::validate)
            }
        }
    }
}

impl MarginModel for ModelSpec {
    fn predict(&self, features: &FeatureVector) -> Result<f64, ModelError> {
        match self {
            ModelSpec::Linear(linear) => linear.predict(features),
            ModelSpec::Ensemble { members } => {
                if members.is_empty() {
                    return Err(ModelError::Empty);
                }
                let mut total = 0.0;
                for member in members {
                    total += member.predict(features)?;
                }
                Ok(total / members.len() as f64)
            }
        }
    }
}

/// Load and validate a JSON model file
pub fn load_model(path: impl AsRef<Path>) -> Result<ModelSpec> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file {}", path.display()))?;
    let model: ModelSpec = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse model file {}", path.display()))?;
    model
        .validate()
        .with_context(|| format!("Invalid model file {}", path.display()))?;
    Ok(model)
}
