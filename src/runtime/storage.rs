use async_trait::async_trait;
use serde_json::Value;
use anyhow::Result;
use dashmap::{DashMap, DashSet};
use std::sync::Arc;
use crate::form::path::{parse_path, set_at_path};
use crate::error::FormError;
use crate::model::{ActionEntity, ActionResponse, Datasource, FormConfig, Plugin};

// --- Interfaces ---

/// Action 实体存储
#[async_trait]
pub trait ActionStore: Send + Sync {
    async fn get_action(&self, id: &str) -> Result<Option<ActionEntity>>;
    async fn put_action(&self, action: ActionEntity) -> Result<()>;
    /// Returns whether an action was removed.
    async fn delete_action(&self, id: &str) -> Result<bool>;

    /// Writes one leaf of a stored action. Last writer wins.
    async fn set_action_property(&self, id: &str, property_name: &str, value: Value) -> Result<()> {
        let segments = parse_path(property_name)?;
        let action = self
            .get_action(id)
            .await?
            .ok_or_else(|| FormError::ActionNotFound(id.to_string()))?;

        let mut doc = action.to_value();
        set_at_path(&mut doc, &segments, value)?;
        self.put_action(ActionEntity::from_value(doc)?).await
    }
}

#[async_trait]
pub trait PluginStore: Send + Sync {
    async fn get_plugin(&self, id: &str) -> Result<Option<Plugin>>;
    async fn editor_config(&self, plugin_id: &str) -> Result<Option<FormConfig>>;
    async fn setting_config(&self, plugin_id: &str) -> Result<Option<FormConfig>>;
}

#[async_trait]
pub trait DatasourceStore: Send + Sync {
    async fn datasources_by_plugin(&self, plugin_id: &str) -> Result<Vec<Datasource>>;
    async fn get_datasource(&self, id: &str) -> Result<Option<Datasource>>;
}

/// UI state of the query pane: in-flight flags, last responses, run errors.
#[async_trait]
pub trait QueryPaneStore: Send + Sync {
    async fn is_running(&self, action_id: &str) -> Result<bool>;
    async fn set_running(&self, action_id: &str, running: bool) -> Result<()>;
    async fn is_deleting(&self, action_id: &str) -> Result<bool>;
    async fn set_deleting(&self, action_id: &str, deleting: bool) -> Result<()>;
    async fn response(&self, action_id: &str) -> Result<Option<ActionResponse>>;
    async fn set_response(&self, action_id: &str, response: Option<ActionResponse>) -> Result<()>;
    async fn run_error(&self, action_id: &str) -> Result<Option<String>>;
    async fn set_run_error(&self, action_id: &str, message: Option<String>) -> Result<()>;
}

#[async_trait]
pub trait FormStore: Send + Sync {
    async fn form_values(&self, form_name: &str) -> Result<Option<Value>>;
    async fn set_form_values(&self, form_name: &str, values: Value) -> Result<()>;
}

/// Every store the action form and the effect runner read from or write to.
#[derive(Clone)]
pub struct Repositories {
    pub actions: Arc<dyn ActionStore>,
    pub plugins: Arc<dyn PluginStore>,
    pub datasources: Arc<dyn DatasourceStore>,
    pub query_pane: Arc<dyn QueryPaneStore>,
    pub forms: Arc<dyn FormStore>,
}

impl Repositories {
    pub fn in_memory(state: Arc<InMemoryAppState>) -> Self {
        Self {
            actions: state.clone(),
            plugins: state.clone(),
            datasources: state.clone(),
            query_pane: state.clone(),
            forms: state,
        }
    }

    /// Same stores, but actions live in `actions` (e.g. Redis).
    pub fn with_action_store(mut self, actions: Arc<dyn ActionStore>) -> Self {
        self.actions = actions;
        self
    }
}

// --- In-Memory Implementation ---

pub struct InMemoryAppState {
    actions: DashMap<String, ActionEntity>,
    plugins: DashMap<String, Plugin>,
    editor_configs: DashMap<String, FormConfig>,
    setting_configs: DashMap<String, FormConfig>,
    datasources: DashMap<String, Datasource>,
    running: DashSet<String>,
    deleting: DashSet<String>,
    responses: DashMap<String, ActionResponse>,
    run_errors: DashMap<String, String>,
    forms: DashMap<String, Value>,
}

impl InMemoryAppState {
    pub fn new() -> Self {
        Self {
            actions: DashMap::new(),
            plugins: DashMap::new(),
            editor_configs: DashMap::new(),
            setting_configs: DashMap::new(),
            datasources: DashMap::new(),
            running: DashSet::new(),
            deleting: DashSet::new(),
            responses: DashMap::new(),
            run_errors: DashMap::new(),
            forms: DashMap::new(),
        }
    }

    pub fn insert_action(&self, action: ActionEntity) {
        self.actions.insert(action.id().to_string(), action);
    }

    pub fn insert_plugin(&self, plugin: Plugin) {
        self.plugins.insert(plugin.id.clone(), plugin);
    }

    pub fn insert_editor_config(&self, plugin_id: &str, config: FormConfig) {
        self.editor_configs.insert(plugin_id.to_string(), config);
    }

    pub fn insert_setting_config(&self, plugin_id: &str, config: FormConfig) {
        self.setting_configs.insert(plugin_id.to_string(), config);
    }

    pub fn insert_datasource(&self, datasource: Datasource) {
        self.datasources.insert(datasource.id.clone(), datasource);
    }

    pub fn insert_form_values(&self, form_name: &str, values: Value) {
        self.forms.insert(form_name.to_string(), values);
    }
}

impl Default for InMemoryAppState {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ActionStore for InMemoryAppState {
    async fn get_action(&self, id: &str) -> Result<Option<ActionEntity>> {
        Ok(self.actions.get(id).map(|a| a.value().clone()))
    }

    async fn put_action(&self, action: ActionEntity) -> Result<()> {
        self.insert_action(action);
        Ok(())
    }

    async fn delete_action(&self, id: &str) -> Result<bool> {
        Ok(self.actions.remove(id).is_some())
    }

    async fn set_action_property(&self, id: &str, property_name: &str, value: Value) -> Result<()> {
        let segments = parse_path(property_name)?;
        // Hold the entry guard across read-modify-write so concurrent writers serialize.
        let mut entry = self
            .actions
            .get_mut(id)
            .ok_or_else(|| FormError::ActionNotFound(id.to_string()))?;

        let mut doc = entry.to_value();
        set_at_path(&mut doc, &segments, value)?;
        *entry = ActionEntity::from_value(doc)?;
        Ok(())
    }
}

#[async_trait]
impl PluginStore for InMemoryAppState {
    async fn get_plugin(&self, id: &str) -> Result<Option<Plugin>> {
        Ok(self.plugins.get(id).map(|p| p.value().clone()))
    }

    async fn editor_config(&self, plugin_id: &str) -> Result<Option<FormConfig>> {
        Ok(self.editor_configs.get(plugin_id).map(|c| c.value().clone()))
    }

    async fn setting_config(&self, plugin_id: &str) -> Result<Option<FormConfig>> {
        Ok(self.setting_configs.get(plugin_id).map(|c| c.value().clone()))
    }
}

#[async_trait]
impl DatasourceStore for InMemoryAppState {
    async fn datasources_by_plugin(&self, plugin_id: &str) -> Result<Vec<Datasource>> {
        let mut found: Vec<Datasource> = self
            .datasources
            .iter()
            .filter(|ds| ds.plugin_id == plugin_id)
            .map(|ds| ds.value().clone())
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn get_datasource(&self, id: &str) -> Result<Option<Datasource>> {
        Ok(self.datasources.get(id).map(|ds| ds.value().clone()))
    }
}

#[async_trait]
impl QueryPaneStore for InMemoryAppState {
    async fn is_running(&self, action_id: &str) -> Result<bool> {
        Ok(self.running.contains(action_id))
    }

    async fn set_running(&self, action_id: &str, running: bool) -> Result<()> {
        toggle(&self.running, action_id, running);
        Ok(())
    }

    async fn is_deleting(&self, action_id: &str) -> Result<bool> {
        Ok(self.deleting.contains(action_id))
    }

    async fn set_deleting(&self, action_id: &str, deleting: bool) -> Result<()> {
        toggle(&self.deleting, action_id, deleting);
        Ok(())
    }

    async fn response(&self, action_id: &str) -> Result<Option<ActionResponse>> {
        Ok(self.responses.get(action_id).map(|r| r.value().clone()))
    }

    async fn set_response(&self, action_id: &str, response: Option<ActionResponse>) -> Result<()> {
        match response {
            Some(r) => {
                self.responses.insert(action_id.to_string(), r);
            }
            None => {
                self.responses.remove(action_id);
            }
        }
        Ok(())
    }

    async fn run_error(&self, action_id: &str) -> Result<Option<String>> {
        Ok(self.run_errors.get(action_id).map(|m| m.value().clone()))
    }

    async fn set_run_error(&self, action_id: &str, message: Option<String>) -> Result<()> {
        match message {
            Some(m) => {
                self.run_errors.insert(action_id.to_string(), m);
            }
            None => {
                self.run_errors.remove(action_id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl FormStore for InMemoryAppState {
    async fn form_values(&self, form_name: &str) -> Result<Option<Value>> {
        Ok(self.forms.get(form_name).map(|v| v.value().clone()))
    }

    async fn set_form_values(&self, form_name: &str, values: Value) -> Result<()> {
        self.insert_form_values(form_name, values);
        Ok(())
    }
}

fn toggle(set: &DashSet<String>, key: &str, on: bool) {
    if on {
        set.insert(key.to_string());
    } else {
        set.remove(key);
    }
}
