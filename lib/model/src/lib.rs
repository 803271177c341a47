//! # creditx Model
//!
//! Concrete scorers behind the opaque [`Scorer`](creditx_core::Scorer) and
//! [`Explainer`](creditx_core::Explainer) capabilities.
//!
//! - [`LogisticModel`] - Logistic regression with log-odds attributions
//! - [`TreeEnsemble`] - Gradient-boosted trees with path attributions
//! - [`ModelSpec`] - The `model.json` artifact, tagged by `"type"`

pub mod artifact;
pub mod forest;
pub mod linear;

pub use artifact::{BoundModel, ModelSpec};
pub use forest::{Node, NodeSpec, Tree, TreeEnsemble, TreeEnsembleSpec, TreeSpec};
pub use linear::{sigmoid, LogisticModel, LogisticSpec};
