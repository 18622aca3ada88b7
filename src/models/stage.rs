use serde::{Deserialize, Serialize};

/// Pipeline stage model
///
/// Stages form an ordered sequence; position encodes pipeline progression
/// (index 0 = earliest, last index = terminal "won" stage). The id is stable
/// across renames so columns and remote rows stay attached to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stage {
    pub id: String,
    pub name: String,
    /// Win probability in percent (0-100). Semantics depend on forecast mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prob: Option<f64>,
    /// Optional WIP cap for the stage's column.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wip: Option<i64>,
}

impl Stage {
    /// Create a new stage with a fresh id
    pub fn new(name: &str, prob: Option<f64>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            prob,
            wip: None,
        }
    }

    /// Create a stage with a fixed id (templates, fixtures)
    pub fn with_id(id: &str, name: &str, prob: Option<f64>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            prob,
            wip: None,
        }
    }
}
