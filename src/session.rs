use std::sync::Arc;
use anyhow::{Result, anyhow};
use tokio::task::JoinHandle;
use tracing::{info, warn};
use crate::config::RunnerSettings;
use crate::executors::ExecutorRegistry;
use crate::form::{ActionForm, RenderPass};
use crate::model::{ActionEntity, ActionResponse, RouteParams};
use crate::runtime::engine::EffectRunner;
use crate::runtime::navigator::History;
use crate::runtime::storage::{ActionStore, QueryPaneStore, Repositories};

/// An action form wired to an effect runner that works on its own task.
///
/// The runner drains the command queue while the form dispatches, so a render
/// producing more updates than `queue_capacity` never blocks.
pub struct EditorSession {
    form: ActionForm,
    repos: Repositories,
    worker: JoinHandle<()>,
}

/// Result of a run: the stored response and the run error message, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub response: Option<ActionResponse>,
    pub error: Option<String>,
}

impl EditorSession {
    pub fn start(
        route: RouteParams,
        repos: Repositories,
        executors: ExecutorRegistry,
        settings: RunnerSettings,
    ) -> Self {
        let history = Arc::new(History::new());
        let (mut runner, dispatcher) = EffectRunner::new(repos.clone(), executors, history, settings);
        let worker = tokio::spawn(async move { runner.run_worker().await });
        let form = ActionForm::new(route, repos.clone(), dispatcher);
        Self { form, repos, worker }
    }

    /// One render pass without dispatching anything.
    pub async fn preview(&self) -> Result<RenderPass> {
        self.form.render_pass().await
    }

    /// Renders once, waits for the property updates to land and returns the stored action.
    pub async fn apply(self) -> Result<Option<ActionEntity>> {
        self.form.render().await?;
        let api_id = self.form.route().api_id.clone();
        let repos = self.finish().await?;
        repos.actions.get_action(&api_id).await
    }

    /// Runs the action and waits for the run to finish.
    pub async fn run(self) -> Result<RunOutcome> {
        self.form.on_run_click().await?;
        let api_id = self.form.route().api_id.clone();
        let repos = self.finish().await?;

        let error = repos.query_pane.run_error(&api_id).await?;
        if let Some(message) = &error {
            warn!(action_id = %api_id, "Run reported an error: {}", message);
        }
        Ok(RunOutcome {
            response: repos.query_pane.response(&api_id).await?,
            error,
        })
    }

    /// Closes the queue and waits for the runner to drain it and its in-flight runs.
    pub async fn finish(self) -> Result<Repositories> {
        let Self { form, repos, worker } = self;
        drop(form);
        worker.await.map_err(|e| anyhow!("Effect runner task failed: {}", e))?;
        info!("Editor session finished.");
        Ok(repos)
    }
}
