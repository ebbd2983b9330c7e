//! Ordered rule table backend.

use super::{Classifier, ClassifierError, Features};
use serde::{Deserialize, Serialize};

/// Half-open range `[min, max)`; a missing side is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value < max)
    }
}

/// A rule matches when both feature bounds contain the row's values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub class: i64,
    #[serde(default)]
    pub moisture: Bounds,
    #[serde(default)]
    pub light: Bounds,
}

impl Rule {
    pub fn matches(&self, x: &Features) -> bool {
        self.moisture.contains(x[0]) && self.light.contains(x[1])
    }
}

/// First matching rule wins; `default_class` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    pub rules: Vec<Rule>,
    pub default_class: i64,
}

impl RuleTable {
    pub fn new(rules: Vec<Rule>, default_class: i64) -> Self {
        Self { rules, default_class }
    }

    pub fn validate(&self) -> Result<(), ClassifierError> {
        for (index, rule) in self.rules.iter().enumerate() {
            for bounds in [rule.moisture, rule.light] {
                if let (Some(min), Some(max)) = (bounds.min, bounds.max) {
                    if min >= max {
                        return Err(ClassifierError::InvalidModel(format!(
                            "rule {index} has an empty range [{min}, {max})"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn predict_one(&self, x: &Features) -> i64 {
        self.rules
            .iter()
            .find(|rule| rule.matches(x))
            .map_or(self.default_class, |rule| rule.class)
    }
}

impl Classifier for RuleTable {
    fn predict(&self, features: &[Features]) -> Result<Vec<i64>, ClassifierError> {
        Ok(features.iter().map(|x| self.predict_one(x)).collect())
    }

    fn name(&self) -> &'static str {
        "rule_table"
    }
}
