use serde::{Serialize, Deserialize};
use serde_json::Value;
use uuid::Uuid;

/// Side effect requested by the action form, executed later by the effect runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Command {
    #[serde(rename_all = "camelCase")]
    SetProperty {
        action_id: String,
        property_name: String,
        value: Value,
    },
    DeleteAction {
        id: String,
        name: String,
    },
    RunAction {
        id: String,
    },
    /// Client-side navigation, no state mutation.
    Navigate {
        url: String,
    },
}

impl Command {
    pub fn action_id(&self) -> Option<&str> {
        match self {
            Command::SetProperty { action_id, .. } => Some(action_id),
            Command::DeleteAction { id, .. } | Command::RunAction { id } => Some(id),
            Command::Navigate { .. } => None,
        }
    }
}

/// A command plus the correlation id used in logs.
#[derive(Debug, Clone)]
pub struct Envelope {
    pub id: Uuid,
    pub command: Command,
}

impl Envelope {
    pub fn new(command: Command) -> Self {
        Self {
            id: Uuid::new_v4(),
            command,
        }
    }
}
