use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::timeout;
use anyhow::{Result, anyhow};
use serde_json::Value;
use tracing::{info, error, warn, debug};
use uuid::Uuid;
use crate::config::RunnerSettings;
use crate::error::FormError;
use crate::executors::ExecutorRegistry;
use crate::model::ActionResponse;
use crate::runtime::command::{Command, Envelope};
use crate::runtime::navigator::Navigator;
use crate::runtime::storage::Repositories;

/// Sending half of the command queue. Cheap to clone; the runner stops once
/// every dispatcher is dropped.
#[derive(Clone)]
pub struct Dispatcher {
    sender: mpsc::Sender<Envelope>,
}

impl Dispatcher {
    pub async fn dispatch(&self, command: Command) -> Result<Uuid> {
        let envelope = Envelope::new(command);
        let id = envelope.id;
        self.sender.send(envelope).await
            .map_err(|e| anyhow!("Command channel closed: {}", e))?;
        Ok(id)
    }
}

/// Executes queued commands against the repositories.
pub struct EffectRunner {
    repos: Repositories,
    executors: Arc<ExecutorRegistry>,
    navigator: Arc<dyn Navigator>,
    settings: RunnerSettings,
    receiver: Option<mpsc::Receiver<Envelope>>,
    in_flight: JoinSet<()>,
}

impl EffectRunner {
    pub fn new(
        repos: Repositories,
        executors: ExecutorRegistry,
        navigator: Arc<dyn Navigator>,
        settings: RunnerSettings,
    ) -> (Self, Dispatcher) {
        let (tx, rx) = mpsc::channel(settings.queue_capacity.max(1));
        let runner = Self {
            repos,
            executors: Arc::new(executors),
            navigator,
            settings,
            receiver: Some(rx),
            in_flight: JoinSet::new(),
        };
        (runner, Dispatcher { sender: tx })
    }

    /// Drains the queue until every dispatcher is gone, then waits for in-flight runs.
    pub async fn run_worker(&mut self) {
        let Some(mut rx) = self.receiver.take() else {
            warn!("Effect runner already started");
            return;
        };
        info!("Effect runner started.");

        while let Some(envelope) = rx.recv().await {
            let command_id = envelope.id;
            let action_id = envelope.command.action_id().unwrap_or("-").to_string();
            if let Err(e) = self.apply(envelope.command).await {
                error!(%command_id, %action_id, error = ?e, "Command failed");
            }
            // Reap finished runs so the set does not grow unbounded
            while self.in_flight.try_join_next().is_some() {}
        }

        while self.in_flight.join_next().await.is_some() {}
        info!("Effect runner stopped.");
    }

    /// Executes one command. Runs are spawned; everything else completes in place.
    pub async fn apply(&mut self, command: Command) -> Result<()> {
        match command {
            Command::SetProperty { action_id, property_name, value } => {
                debug!(%action_id, property = %property_name, "Setting action property");
                self.repos.actions.set_action_property(&action_id, &property_name, value).await
            }
            Command::DeleteAction { id, name } => self.delete_action(&id, &name).await,
            Command::RunAction { id } => self.start_run(id).await,
            Command::Navigate { url } => {
                self.navigator.push(&url);
                Ok(())
            }
        }
    }

    async fn delete_action(&self, id: &str, name: &str) -> Result<()> {
        let pane = &self.repos.query_pane;
        pane.set_deleting(id, true).await?;

        let removed = self.repos.actions.delete_action(id).await;

        pane.set_response(id, None).await?;
        pane.set_run_error(id, None).await?;
        pane.set_deleting(id, false).await?;

        if removed? {
            info!(action_id = id, action_name = name, "Action deleted");
            Ok(())
        } else {
            Err(FormError::ActionNotFound(id.to_string()).into())
        }
    }

    async fn start_run(&mut self, id: String) -> Result<()> {
        let pane = self.repos.query_pane.clone();
        pane.set_running(&id, true).await?;
        pane.set_run_error(&id, None).await?;

        let repos = self.repos.clone();
        let executors = self.executors.clone();
        let default_timeout = self.settings.run_timeout();

        self.in_flight.spawn(async move {
            let outcome = execute_run(&repos, &executors, &id, default_timeout).await;
            if let Err(e) = record_outcome(&repos, &id, outcome).await {
                error!(action_id = %id, error = ?e, "Failed to record run outcome");
            }
            if let Err(e) = repos.query_pane.set_running(&id, false).await {
                error!(action_id = %id, error = ?e, "Failed to clear running flag");
            }
        });
        Ok(())
    }
}

async fn execute_run(
    repos: &Repositories,
    executors: &ExecutorRegistry,
    id: &str,
    default_timeout: Duration,
) -> Result<ActionResponse> {
    let action = repos.actions.get_action(id).await?
        .ok_or_else(|| FormError::ActionNotFound(id.to_string()))?;

    let package_name = repos.plugins.get_plugin(action.plugin_id()).await?
        .map(|p| p.package_name)
        .unwrap_or_default();
    let executor = executors.resolve(&package_name)
        .ok_or_else(|| FormError::ExecutorNotFound(package_name.clone()))?;
    executor.validate(&action)?;

    let datasource = match action.datasource_id() {
        Some(ds_id) => repos.datasources.get_datasource(ds_id).await?,
        None => None,
    };

    let limit = action_timeout(action.action_configuration()).unwrap_or(default_timeout);
    let started = Instant::now();
    info!(action_id = id, executor = executor.name(), "Running action");

    match timeout(limit, executor.execute(&action, datasource.as_ref())).await {
        Ok(result) => {
            let mut response = result?;
            if response.duration_ms == 0 {
                response.duration_ms = started.elapsed().as_millis() as u64;
            }
            Ok(response)
        }
        Err(_) => Err(FormError::RunTimedOut {
            action_id: id.to_string(),
            timeout_ms: limit.as_millis() as u64,
        }
        .into()),
    }
}

async fn record_outcome(repos: &Repositories, id: &str, outcome: Result<ActionResponse>) -> Result<()> {
    let pane = &repos.query_pane;
    match outcome {
        Ok(response) => {
            if !response.is_execution_success {
                let message = match &response.body {
                    Value::String(s) => s.clone(),
                    _ => format!("Execution failed with status {}", response.status_code),
                };
                pane.set_run_error(id, Some(message)).await?;
            }
            info!(action_id = id, status = %response.status_code, "Run finished");
            pane.set_response(id, Some(response)).await
        }
        Err(e) => {
            warn!(action_id = id, error = %e, "Run failed");
            pane.set_run_error(id, Some(e.to_string())).await
        }
    }
}

/// `actionConfiguration.timeoutInMillisecond`, given as a number or a numeric string.
fn action_timeout(config: Option<&Value>) -> Option<Duration> {
    let raw = config?.get("timeoutInMillisecond")?;
    let millis = match raw {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse::<u64>().ok()?,
        _ => return None,
    };
    (millis > 0).then(|| Duration::from_millis(millis))
}
