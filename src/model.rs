//! Pre-trained CLV regression model: artifact loading, validation and inference

use crate::error::ModelError;
use crate::request::{FEATURE_NAMES, N_FEATURES};
use ndarray::{Array1, Array2, ArrayView1};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// On-disk model artifact, tagged by `kind`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// `intercept + Σ coefficients[i] * x[i]`
    Linear {
        intercept: f64,
        coefficients: Vec<f64>,
    },
    /// Regression trees combined by `aggregation` on top of `base_score`
    TreeEnsemble {
        #[serde(default)]
        aggregation: Aggregation,
        #[serde(default)]
        base_score: f64,
        trees: Vec<Tree>,
    },
}

/// How tree outputs are combined
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Boosted trees: outputs are added
    #[default]
    Sum,
    /// Random forest: outputs are averaged
    Mean,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

/// Tree node; the root is `nodes[0]`
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Node {
    /// `x[feature] <= threshold` descends into `left`, otherwise `right`
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf(f64),
}

#[derive(Debug, Deserialize)]
struct ArtifactFile {
    #[serde(default)]
    features: Option<Vec<String>>,
    #[serde(flatten)]
    artifact: ModelArtifact,
}

/// A validated, immutable regression model
#[derive(Debug, Clone, PartialEq)]
pub struct ClvModel {
    artifact: ModelArtifact,
}

impl ClvModel {
    /// Validate an artifact and wrap it as a model
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, ModelError> {
        validate(&artifact)?;
        Ok(Self { artifact })
    }

    /// Parse a model from its JSON text
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        let file: ArtifactFile = serde_json::from_str(json).map_err(|source| ModelError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        Self::from_file_contents(file)
    }

    fn from_file_contents(file: ArtifactFile) -> Result<Self, ModelError> {
        if let Some(names) = &file.features {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES) {
                return Err(ModelError::invalid(format!(
                    "feature names {:?} do not match expected {:?}",
                    names, FEATURE_NAMES
                )));
            }
        }
        Self::from_artifact(file.artifact)
    }

    /// Short human-readable description of the model
    pub fn describe(&self) -> String {
        match &self.artifact {
            ModelArtifact::Linear { .. } => "linear regression".to_string(),
            ModelArtifact::TreeEnsemble {
                aggregation, trees, ..
            } => format!("tree ensemble ({} trees, {:?})", trees.len(), aggregation),
        }
    }

    /// Predict one value per row of an (n, 3) feature matrix
    pub fn predict(&self, features: &Array2<f64>) -> crate::Result<Array1<f64>> {
        if features.ncols() != N_FEATURES {
            anyhow::bail!(
                "Feature matrix must have exactly {} columns, got {}",
                N_FEATURES,
                features.ncols()
            );
        }

        let predictions = features
            .outer_iter()
            .map(|row| self.predict_row(row))
            .collect::<Array1<f64>>();

        debug!(rows = features.nrows(), "model inference complete");
        Ok(predictions)
    }

    fn predict_row(&self, row: ArrayView1<f64>) -> f64 {
        match &self.artifact {
            ModelArtifact::Linear {
                intercept,
                coefficients,
            } => {
                intercept
                    + row
                        .iter()
                        .zip(coefficients.iter())
                        .map(|(x, w)| x * w)
                        .sum::<f64>()
            }
            ModelArtifact::TreeEnsemble {
                aggregation,
                base_score,
                trees,
            } => {
                let total: f64 = trees.iter().map(|tree| tree.evaluate(row)).sum();
                match aggregation {
                    Aggregation::Sum => base_score + total,
                    Aggregation::Mean => base_score + total / trees.len() as f64,
                }
            }
        }
    }
}

impl Tree {
    /// Walk from the root to a leaf. Validation guarantees termination.
    fn evaluate(&self, row: ArrayView1<f64>) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// Load and validate a model artifact from a JSON file
pub fn load_model<P: AsRef<Path>>(path: P) -> Result<ClvModel, ModelError> {
    let path = path.as_ref();
    info!(path = %path.display(), "Loading CLV model");

    let contents = fs::read_to_string(path).map_err(|source| ModelError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let file: ArtifactFile =
        serde_json::from_str(&contents).map_err(|source| ModelError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let model = ClvModel::from_file_contents(file)?;
    info!(model = %model.describe(), "Model loaded successfully");
    Ok(model)
}

fn validate(artifact: &ModelArtifact) -> Result<(), ModelError> {
    match artifact {
        ModelArtifact::Linear {
            intercept,
            coefficients,
        } => {
            if coefficients.len() != N_FEATURES {
                return Err(ModelError::invalid(format!(
                    "linear model needs {} coefficients, got {}",
                    N_FEATURES,
                    coefficients.len()
                )));
            }
            if !intercept.is_finite() || coefficients.iter().any(|c| !c.is_finite()) {
                return Err(ModelError::invalid("linear model has non-finite parameters"));
            }
        }
        ModelArtifact::TreeEnsemble {
            base_score, trees, ..
        } => {
            if trees.is_empty() {
                return Err(ModelError::invalid("tree ensemble has no trees"));
            }
            if !base_score.is_finite() {
                return Err(ModelError::invalid("tree ensemble base_score is not finite"));
            }
            for (tree_idx, tree) in trees.iter().enumerate() {
                validate_tree(tree).map_err(|msg| {
                    ModelError::invalid(format!("tree {}: {}", tree_idx, msg))
                })?;
            }
        }
    }
    Ok(())
}

fn validate_tree(tree: &Tree) -> Result<(), String> {
    if tree.nodes.is_empty() {
        return Err("no nodes".to_string());
    }

    // Children must point forward, so every path ends at a leaf.
    for (idx, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Leaf(value) if !value.is_finite() => {
                return Err(format!("node {} has a non-finite leaf value", idx));
            }
            Node::Leaf(_) => {}
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= N_FEATURES {
                    return Err(format!(
                        "node {} splits on feature {} (only {} features)",
                        idx, feature, N_FEATURES
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {} has a non-finite threshold", idx));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= tree.nodes.len() {
                        return Err(format!("node {} has invalid child index {}", idx, child));
                    }
                }
            }
        }
    }
    Ok(())
}
