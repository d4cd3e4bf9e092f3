use async_trait::async_trait;
use serde_json::{Map, Value, json};
use anyhow::Result;
use tracing::info;
use crate::executors::ActionExecutor;
use crate::model::{ActionEntity, ActionResponse, Datasource};

/// Dry-run executor: answers with the action's own configuration.
#[derive(Debug)]
pub struct EchoExecutor;

pub const ECHO_EXECUTOR: &str = "echo";

#[async_trait]
impl ActionExecutor for EchoExecutor {
    fn name(&self) -> &str {
        ECHO_EXECUTOR
    }

    fn validate(&self, _action: &ActionEntity) -> Result<()> {
        Ok(())
    }

    async fn execute(&self, action: &ActionEntity, datasource: Option<&Datasource>) -> Result<ActionResponse> {
        info!(action_id = action.id(), "[ECHO] {}", action.name());
        let body = json!({
            "actionConfiguration": action.action_configuration().cloned().unwrap_or(Value::Null),
            "datasource": datasource.map(|ds| ds.id.clone()),
        });

        Ok(ActionResponse {
            body,
            status_code: "200".to_string(),
            headers: Map::new(),
            is_execution_success: true,
            request: None,
            duration_ms: 0,
        })
    }
}
