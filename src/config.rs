//! Canvas-wide defaults, loadable from JSON.

use crate::error::Result;
use crate::shape::EdgeShape;
use crate::viewport::TransformMatrix;
use serde::{Deserialize, Serialize};

/// How the controller picks a priority when a request does not carry one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriorityStrategy {
    /// Every entity gets the same priority.
    Constant(i32),
    /// 0, 1, 2, ... so later entities stack on top. Restarts on clear.
    Incremental,
}

impl Default for PriorityStrategy {
    fn default() -> Self {
        Self::Constant(0)
    }
}

/// Defaults applied by [`GraphStoreController`](crate::GraphStoreController)
/// and the initial viewport of a [`CanvasView`](crate::CanvasView).
///
/// # Example
///
/// ```
/// use slint_graph_canvas::{CanvasConfig, PriorityStrategy};
///
/// let config = CanvasConfig::from_json(
///     r#"{ "edge_priority": "incremental", "default_edge_shape": { "type": "straight" } }"#,
/// )
/// .unwrap();
/// assert_eq!(config.edge_priority, PriorityStrategy::Incremental);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub default_edge_shape: EdgeShape,
    pub node_priority: PriorityStrategy,
    pub edge_priority: PriorityStrategy,
    pub viewport: TransformMatrix,
}

impl CanvasConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
