//! Gradient-boosted tree ensemble
//!
//! Binary trees stored as flat node arrays, root at index 0. A row goes
//! left when `x < threshold`; a NaN follows the node's missing branch.
//! The probability is `sigmoid(base_score + sum of reached leaves)`.
//!
//! Attributions use path attribution: walking the decision path, each split
//! credits its feature with the change in expected value between the node
//! and the child taken. This needs the expected value of every internal
//! node, so ensembles exported without them can score but not explain.

use crate::linear::sigmoid;
use creditx_core::{Error, Explainer, FeatureSchema, Result, Scorer};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeSpec {
    Split {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
        #[serde(default)]
        missing_left: Option<bool>,
        /// Expected raw output of the subtree
        #[serde(default)]
        value: Option<f64>,
    },
    Leaf {
        leaf: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub nodes: Vec<NodeSpec>,
}

/// Persisted form of the ensemble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeEnsembleSpec {
    #[serde(default)]
    pub base_score: f64,
    pub trees: Vec<TreeSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        missing_left: bool,
        value: Option<f64>,
    },
    Leaf {
        value: f64,
    },
}

impl Node {
    /// Expected value of the subtree rooted here, when known
    #[inline]
    fn expected(&self) -> Option<f64> {
        match self {
            Node::Split { value, .. } => *value,
            Node::Leaf { value } => Some(*value),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn bind(spec: &TreeSpec, schema: &FeatureSchema, tree_index: usize) -> Result<Self> {
        if spec.nodes.is_empty() {
            return Err(Error::SchemaLoad(format!("tree {} has no nodes", tree_index)));
        }

        let count = spec.nodes.len();
        let mut nodes = Vec::with_capacity(count);
        for (i, node) in spec.nodes.iter().enumerate() {
            let bound = match node {
                NodeSpec::Leaf { leaf } => {
                    if !leaf.is_finite() {
                        return Err(Error::SchemaLoad(format!(
                            "tree {} node {} has a non-finite leaf",
                            tree_index, i
                        )));
                    }
                    Node::Leaf { value: *leaf }
                }
                NodeSpec::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    missing_left,
                    value,
                } => {
                    let feature = schema.position(feature).ok_or_else(|| {
                        Error::SchemaLoad(format!(
                            "tree {} node {} splits on unknown feature '{}'",
                            tree_index, i, feature
                        ))
                    })?;
                    // Children strictly after the parent: no cycles, every walk ends
                    for child in [*left, *right] {
                        if child <= i || child >= count {
                            return Err(Error::SchemaLoad(format!(
                                "tree {} node {} has invalid child index {}",
                                tree_index, i, child
                            )));
                        }
                    }
                    Node::Split {
                        feature,
                        threshold: *threshold,
                        left: *left,
                        right: *right,
                        missing_left: missing_left.unwrap_or(true),
                        value: *value,
                    }
                }
            };
            nodes.push(bound);
        }

        Ok(Self { nodes })
    }

    #[inline]
    fn next(&self, node: &Node, features: &[f64]) -> Result<Option<usize>> {
        match *node {
            Node::Leaf { .. } => Ok(None),
            Node::Split {
                feature,
                threshold,
                left,
                right,
                missing_left,
                ..
            } => {
                let x = features.get(feature).copied().ok_or_else(|| {
                    Error::Scoring(format!("row has no column {}", feature))
                })?;
                let go_left = if x.is_nan() { missing_left } else { x < threshold };
                Ok(Some(if go_left { left } else { right }))
            }
        }
    }

    /// Raw value of the leaf this row reaches
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        let mut index = 0;
        loop {
            let node = &self.nodes[index];
            match self.next(node, features)? {
                Some(child) => index = child,
                None => return Ok(node.expected().unwrap_or(0.0)),
            }
        }
    }

    /// Add this tree's path contributions into `out`
    fn attribute(&self, features: &[f64], out: &mut [f64]) -> Result<()> {
        let mut index = 0;
        loop {
            let node = self.nodes[index];
            let Some(child) = self.next(&node, features)? else {
                return Ok(());
            };
            if let Node::Split { feature, value, .. } = node {
                let parent = value.ok_or_else(|| {
                    Error::Unavailable("tree node carries no expected value".to_string())
                })?;
                let reached = self.nodes[child].expected().ok_or_else(|| {
                    Error::Unavailable("tree node carries no expected value".to_string())
                })?;
                out[feature] += reached - parent;
            }
            index = child;
        }
    }

    fn has_node_values(&self) -> bool {
        self.nodes.iter().all(|n| n.expected().is_some())
    }
}

/// Tree ensemble bound to schema columns
#[derive(Debug, Clone, PartialEq)]
pub struct TreeEnsemble {
    base_score: f64,
    trees: Vec<Tree>,
    dim: usize,
}

impl TreeEnsembleSpec {
    pub fn bind(&self, schema: &FeatureSchema) -> Result<TreeEnsemble> {
        if self.trees.is_empty() {
            return Err(Error::SchemaLoad("tree ensemble has no trees".to_string()));
        }
        if !self.base_score.is_finite() {
            return Err(Error::SchemaLoad("base_score is not finite".to_string()));
        }
        let trees = self
            .trees
            .iter()
            .enumerate()
            .map(|(i, tree)| Tree::bind(tree, schema, i))
            .collect::<Result<Vec<_>>>()?;

        Ok(TreeEnsemble {
            base_score: self.base_score,
            trees,
            dim: schema.len(),
        })
    }
}

impl TreeEnsemble {
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }

    /// Whether every internal node carries the expected value attribution needs
    pub fn supports_attribution(&self) -> bool {
        self.trees.iter().all(Tree::has_node_values)
    }

    fn check_width(&self, features: &[f64]) -> Result<()> {
        if features.len() == self.dim {
            Ok(())
        } else {
            Err(Error::Scoring(format!(
                "tree ensemble expects {} columns, row has {}",
                self.dim,
                features.len()
            )))
        }
    }

    /// Raw log-odds
    pub fn margin(&self, features: &[f64]) -> Result<f64> {
        self.check_width(features)?;
        let mut z = self.base_score;
        for tree in &self.trees {
            z += tree.predict(features)?;
        }
        if z.is_finite() {
            Ok(z)
        } else {
            Err(Error::Scoring(format!("ensemble margin is not finite: {}", z)))
        }
    }
}

impl Scorer for TreeEnsemble {
    fn predict_probability(&self, features: &[f64]) -> Result<f64> {
        self.margin(features).map(sigmoid)
    }
}

impl Explainer for TreeEnsemble {
    fn explain(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.check_width(features)?;
        let mut out = vec![0.0; self.dim];
        for tree in &self.trees {
            tree.attribute(features, &mut out)?;
        }
        Ok(out)
    }
}
