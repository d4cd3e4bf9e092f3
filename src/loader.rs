use anyhow::{Result, Context as AnyhowContext};
use serde::{Serialize, Deserialize};
use std::collections::HashMap;
use std::fs;
use serde_json::Value;
use crate::model::{ActionEntity, Datasource, FormConfig, Plugin};
use crate::runtime::storage::InMemoryAppState;

/// Serialized application state: entities plus per-plugin form configs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct AppSnapshot {
    pub actions: Vec<ActionEntity>,
    pub plugins: Vec<Plugin>,
    pub datasources: Vec<Datasource>,
    /// Keyed by plugin id.
    pub editor_configs: HashMap<String, FormConfig>,
    /// Keyed by plugin id.
    pub setting_configs: HashMap<String, FormConfig>,
    /// Current form values keyed by form name.
    pub forms: HashMap<String, Value>,
}

impl AppSnapshot {
    pub fn into_state(self) -> InMemoryAppState {
        let state = InMemoryAppState::new();
        for action in self.actions {
            state.insert_action(action);
        }
        for plugin in self.plugins {
            state.insert_plugin(plugin);
        }
        for datasource in self.datasources {
            state.insert_datasource(datasource);
        }
        for (plugin_id, config) in self.editor_configs {
            state.insert_editor_config(&plugin_id, config);
        }
        for (plugin_id, config) in self.setting_configs {
            state.insert_setting_config(&plugin_id, config);
        }
        for (form_name, values) in self.forms {
            state.insert_form_values(&form_name, values);
        }
        state
    }
}

pub fn load_snapshot_from_yaml(file_path: &str) -> Result<AppSnapshot> {
    let yaml_content = fs::read_to_string(file_path)
        .with_context(|| format!("Failed to read YAML file from {}", file_path))?;

    let snapshot: AppSnapshot = serde_yaml::from_str(&yaml_content)
        .with_context(|| format!("Failed to deserialize YAML content from {}", file_path))?;

    Ok(snapshot)
}
