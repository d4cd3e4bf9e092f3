pub mod diff;
pub mod initial;
pub mod merge;
pub mod path;
pub mod reconcile;

use anyhow::Result;
use serde::{Serialize, Deserialize};
use serde_json::Value;
use tracing::{debug, info};
use crate::form::diff::{diff, DifferenceEntry};
use crate::form::initial::config_initial_values;
use crate::form::merge::merge_all;
use crate::form::reconcile::reconcile;
use crate::model::{ActionResponse, Datasource, DatasourceOption, FormConfig, Plugin, RouteParams};
use crate::routes::create_datasource_url;
use crate::runtime::command::Command;
use crate::runtime::engine::Dispatcher;
use crate::runtime::storage::Repositories;

pub const SAAS_EDITOR_FORM: &str = "SaaSEditorForm";

/// Everything the form renderer needs for one render of the action editor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionFormProps {
    pub form_name: String,
    pub action_name: String,
    pub plugin_id: String,
    pub plugin: Option<Plugin>,
    pub editor_config: Option<FormConfig>,
    pub setting_config: Option<FormConfig>,
    pub response_type: Option<String>,
    pub documentation_link: Option<String>,
    pub initial_values: Value,
    pub data_sources: Vec<Datasource>,
    pub datasource_options: Vec<DatasourceOption>,
    pub executed_query_data: Option<ActionResponse>,
    pub run_error_message: Option<String>,
    pub is_running: bool,
    pub is_deleting: bool,
    pub form_data: Option<Value>,
    pub difference: Vec<DifferenceEntry>,
}

/// Output of one render pass: props for the renderer and the property updates
/// needed to bring the stored action in line with its initial values.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub props: ActionFormProps,
    pub commands: Vec<Command>,
}

/// The SaaS action editor bound to one route.
///
/// Reads go through the repositories; every write leaves as a [`Command`]
/// on the dispatcher.
pub struct ActionForm {
    route: RouteParams,
    repos: Repositories,
    dispatcher: Dispatcher,
}

impl ActionForm {
    pub fn new(route: RouteParams, repos: Repositories, dispatcher: Dispatcher) -> Self {
        Self { route, repos, dispatcher }
    }

    pub fn route(&self) -> &RouteParams {
        &self.route
    }

    /// Rebinds the form to another route. Callbacks use the new ids from here on.
    pub fn set_route(&mut self, route: RouteParams) {
        self.route = route;
    }

    pub async fn render_pass(&self) -> Result<RenderPass> {
        let api_id = self.route.api_id.as_str();
        let action = self.repos.actions.get_action(api_id).await?;

        let action_name = action.as_ref().map(|a| a.name().to_string()).unwrap_or_default();
        let plugin_id = action.as_ref().map(|a| a.plugin_id().to_string()).unwrap_or_default();

        let (plugin, editor_config, setting_config) = if plugin_id.is_empty() {
            (None, None, None)
        } else {
            (
                self.repos.plugins.get_plugin(&plugin_id).await?,
                self.repos.plugins.editor_config(&plugin_id).await?,
                self.repos.plugins.setting_config(&plugin_id).await?,
            )
        };

        let action_value = action.as_ref().map(|a| a.to_value());
        let editor_defaults = config_initial_values(editor_config.as_deref());
        let setting_defaults = config_initial_values(setting_config.as_deref());
        let initial_values = merge_all(
            [Some(&editor_defaults), Some(&setting_defaults), action_value.as_ref()]
                .into_iter()
                .flatten(),
        );

        let difference = match &action_value {
            Some(stored) => diff(stored, &initial_values),
            None => Vec::new(),
        };
        let commands = reconcile(api_id, &difference);

        let data_sources = self.repos.datasources.datasources_by_plugin(&plugin_id).await?;
        let mut datasource_options = Vec::with_capacity(data_sources.len());
        for ds in &data_sources {
            let image = if plugin.as_ref().is_some_and(|p| p.id == ds.plugin_id) {
                plugin.as_ref().and_then(|p| p.icon_location.clone())
            } else {
                self.repos.plugins.get_plugin(&ds.plugin_id).await?.and_then(|p| p.icon_location)
            };
            datasource_options.push(DatasourceOption {
                label: ds.name.clone(),
                value: ds.id.clone(),
                image,
            });
        }

        let pane = &self.repos.query_pane;
        let props = ActionFormProps {
            form_name: SAAS_EDITOR_FORM.to_string(),
            action_name,
            response_type: plugin.as_ref().and_then(|p| p.response_type.clone()),
            documentation_link: plugin.as_ref().and_then(|p| p.documentation_link.clone()),
            plugin_id,
            plugin,
            editor_config,
            setting_config,
            initial_values,
            data_sources,
            datasource_options,
            executed_query_data: pane.response(api_id).await?,
            run_error_message: pane.run_error(api_id).await?,
            is_running: pane.is_running(api_id).await?,
            is_deleting: pane.is_deleting(api_id).await?,
            form_data: self.repos.forms.form_values(SAAS_EDITOR_FORM).await?,
            difference,
        };

        Ok(RenderPass { props, commands })
    }

    /// Render pass plus dispatch of its property updates.
    ///
    /// Dispatch waits for room in the command queue, so the effect runner has to
    /// be draining it concurrently (see [`crate::session::EditorSession`]).
    pub async fn render(&self) -> Result<ActionFormProps> {
        let pass = self.render_pass().await?;
        if !pass.commands.is_empty() {
            info!(action_id = %self.route.api_id, count = pass.commands.len(), "Reconciling action with form defaults");
        }
        for command in pass.commands {
            self.dispatcher.dispatch(command).await?;
        }
        Ok(pass.props)
    }

    pub async fn on_delete_click(&self) -> Result<()> {
        let id = self.route.api_id.clone();
        // Name comes from the store as it is now, not from an earlier render
        let name = self.repos.actions.get_action(&id).await?
            .map(|a| a.name().to_string())
            .unwrap_or_default();
        self.dispatcher.dispatch(Command::DeleteAction { id, name }).await?;
        Ok(())
    }

    pub async fn on_run_click(&self) -> Result<()> {
        let id = self.route.api_id.clone();
        self.dispatcher.dispatch(Command::RunAction { id }).await?;
        Ok(())
    }

    pub async fn on_create_datasource_click(&self) -> Result<()> {
        let url = create_datasource_url(&self.route.application_id, &self.route.page_id);
        debug!(%url, "Create datasource");
        self.dispatcher.dispatch(Command::Navigate { url }).await?;
        Ok(())
    }

    /// A single edit coming from the form renderer.
    pub async fn set_property(&self, property_name: &str, value: Value) -> Result<()> {
        self.dispatcher
            .dispatch(Command::SetProperty {
                action_id: self.route.api_id.clone(),
                property_name: property_name.to_string(),
                value,
            })
            .await?;
        Ok(())
    }
}
