use std::path::Path;

use serde::Deserialize;

use super::features::{FeatureVector, FEATURE_NAMES};
use super::{ClassifierError, RiskModel};

const LEAF: i64 = -1;

/// A fitted decision tree in flat-array form.
///
/// Node `i` is a leaf when `children_left[i] == -1`. Otherwise the sample goes
/// left when `x[feature[i]] <= threshold[i]`. Leaves predict the class with the
/// largest entry in `value[i]`.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTreeModel {
    classes: Vec<String>,
    children_left: Vec<i64>,
    children_right: Vec<i64>,
    feature: Vec<i64>,
    threshold: Vec<f64>,
    value: Vec<Vec<f64>>,
}

impl DecisionTreeModel {
    /// Load and validate a tree exported as JSON.
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ClassifierError::ModelLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let model = Self::from_json(&raw)?;
        tracing::info!(
            path = %path.display(),
            nodes = model.node_count(),
            classes = ?model.classes,
            "Risk model loaded"
        );
        Ok(model)
    }

    pub fn from_json(raw: &str) -> Result<Self, ClassifierError> {
        let model: Self =
            serde_json::from_str(raw).map_err(|e| ClassifierError::MalformedModel(e.to_string()))?;
        model.validate()?;
        Ok(model)
    }

    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        let n = self.node_count();
        if n == 0 {
            return Err(ClassifierError::MalformedModel("tree has no nodes".into()));
        }
        if self.classes.is_empty() {
            return Err(ClassifierError::MalformedModel("tree has no classes".into()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(ClassifierError::MalformedModel(
                "node arrays differ in length".into(),
            ));
        }

        for i in 0..n {
            if self.value[i].len() != self.classes.len() {
                return Err(ClassifierError::MalformedModel(format!(
                    "node {i} has {} class weights, expected {}",
                    self.value[i].len(),
                    self.classes.len()
                )));
            }

            let (left, right) = (self.children_left[i], self.children_right[i]);
            if left == LEAF {
                continue;
            }

            // Children always come after their parent, which also rules out cycles.
            let in_range = |child: i64| child > i as i64 && (child as usize) < n;
            if !in_range(left) || !in_range(right) {
                return Err(ClassifierError::MalformedModel(format!(
                    "node {i} has invalid children ({left}, {right})"
                )));
            }
            let feature = self.feature[i];
            if feature < 0 || feature as usize >= FEATURE_NAMES.len() {
                return Err(ClassifierError::MalformedModel(format!(
                    "node {i} splits on unknown feature {feature}"
                )));
            }
        }

        Ok(())
    }

    fn leaf_for(&self, x: &[f64]) -> usize {
        let mut node = 0usize;
        while self.children_left[node] != LEAF {
            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        node
    }
}

impl RiskModel for DecisionTreeModel {
    fn predict(&self, features: &FeatureVector) -> Result<String, ClassifierError> {
        let leaf = self.leaf_for(features.as_slice());
        let weights = &self.value[leaf];

        let best = weights
            .iter()
            .enumerate()
            .fold(None::<(usize, f64)>, |best, (idx, &w)| match best {
                Some((_, bw)) if bw >= w => best,
                _ => Some((idx, w)),
            })
            .map(|(idx, _)| idx)
            .ok_or_else(|| ClassifierError::Inference(format!("leaf {leaf} has no weights")))?;

        Ok(self.classes[best].clone())
    }
}
