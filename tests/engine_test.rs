use async_trait::async_trait;
use anyhow::Result;
use saas_editor::config::RunnerSettings;
use saas_editor::executors::{ActionExecutor, ExecutorRegistry};
use saas_editor::model::builder::ActionBuilder;
use saas_editor::model::{ActionEntity, ActionResponse, Datasource, Plugin};
use saas_editor::runtime::command::Command;
use saas_editor::runtime::engine::EffectRunner;
use saas_editor::runtime::navigator::History;
use saas_editor::runtime::storage::{ActionStore, InMemoryAppState, QueryPaneStore, Repositories};
use serde_json::{json, Map};
use std::sync::Arc;
use std::time::Duration;

/// Answers after `delay` with the given status.
#[derive(Debug)]
struct StubExecutor {
    delay: Duration,
    status: u16,
}

#[async_trait]
impl ActionExecutor for StubExecutor {
    fn name(&self) -> &str {
        "stub-plugin"
    }

    fn validate(&self, _action: &ActionEntity) -> Result<()> {
        Ok(())
    }

    async fn execute(&self, action: &ActionEntity, _datasource: Option<&Datasource>) -> Result<ActionResponse> {
        tokio::time::sleep(self.delay).await;
        let success = (200..300).contains(&self.status);
        Ok(ActionResponse {
            body: if success { json!({ "ran": action.id() }) } else { json!("upstream exploded") },
            status_code: self.status.to_string(),
            headers: Map::new(),
            is_execution_success: success,
            request: None,
            duration_ms: 0,
        })
    }
}

fn state_with(action: ActionEntity) -> Arc<InMemoryAppState> {
    let state = InMemoryAppState::new();
    state.insert_plugin(Plugin {
        id: "p-stub".to_string(),
        name: "Stub".to_string(),
        package_name: "stub-plugin".to_string(),
        response_type: None,
        documentation_link: None,
        icon_location: None,
    });
    state.insert_action(action);
    Arc::new(state)
}

fn build_runner(state: Arc<InMemoryAppState>, executor: Option<StubExecutor>, settings: RunnerSettings) -> (EffectRunner, saas_editor::runtime::engine::Dispatcher, Arc<History>) {
    let mut executors = ExecutorRegistry::new();
    if let Some(e) = executor {
        executors.register(Arc::new(e));
    }
    let history = Arc::new(History::new());
    let (runner, dispatcher) = EffectRunner::new(Repositories::in_memory(state), executors, history.clone(), settings);
    (runner, dispatcher, history)
}

#[tokio::test]
async fn test_run_success_records_response() {
    let state = state_with(ActionBuilder::new("a1").plugin("p-stub").build());
    let (mut runner, dispatcher, _) = build_runner(
        state.clone(),
        Some(StubExecutor { delay: Duration::from_millis(5), status: 200 }),
        RunnerSettings::default(),
    );

    dispatcher.dispatch(Command::RunAction { id: "a1".to_string() }).await.unwrap();
    drop(dispatcher);
    runner.run_worker().await;

    let response = state.response("a1").await.unwrap().expect("response missing");
    assert_eq!(response.body, json!({ "ran": "a1" }));
    assert_eq!(response.status_code, "200");
    assert!(response.duration_ms >= 5);
    assert!(!state.is_running("a1").await.unwrap());
}

#[tokio::test]
async fn test_run_timeout_clears_running_and_sets_error() {
    let action = ActionBuilder::new("slow")
        .plugin("p-stub")
        .config("timeoutInMillisecond", 20)
        .build();
    let state = state_with(action);
    let (mut runner, dispatcher, _) = build_runner(
        state.clone(),
        Some(StubExecutor { delay: Duration::from_secs(5), status: 200 }),
        RunnerSettings::default(),
    );

    dispatcher.dispatch(Command::RunAction { id: "slow".to_string() }).await.unwrap();
    drop(dispatcher);
    runner.run_worker().await;

    assert!(!state.is_running("slow").await.unwrap());
    assert_eq!(state.response("slow").await.unwrap(), None);
    let message = state.run_error("slow").await.unwrap().expect("error missing");
    assert!(message.contains("timed out after 20ms"), "{}", message);
}

#[tokio::test]
async fn test_run_default_timeout_from_settings() {
    let state = state_with(ActionBuilder::new("a1").plugin("p-stub").build());
    let settings = RunnerSettings { run_timeout_ms: 10, ..RunnerSettings::default() };
    let (mut runner, dispatcher, _) = build_runner(
        state.clone(),
        Some(StubExecutor { delay: Duration::from_secs(5), status: 200 }),
        settings,
    );

    dispatcher.dispatch(Command::RunAction { id: "a1".to_string() }).await.unwrap();
    drop(dispatcher);
    runner.run_worker().await;

    assert!(state.run_error("a1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_failed_execution_surfaces_error_message() {
    let state = state_with(ActionBuilder::new("a1").plugin("p-stub").build());
    let (mut runner, dispatcher, _) = build_runner(
        state.clone(),
        Some(StubExecutor { delay: Duration::ZERO, status: 500 }),
        RunnerSettings::default(),
    );

    dispatcher.dispatch(Command::RunAction { id: "a1".to_string() }).await.unwrap();
    drop(dispatcher);
    runner.run_worker().await;

    assert_eq!(state.run_error("a1").await.unwrap().as_deref(), Some("upstream exploded"));
    let response = state.response("a1").await.unwrap().unwrap();
    assert!(!response.is_execution_success);
}

#[tokio::test]
async fn test_run_without_executor_reports_error() {
    let state = state_with(ActionBuilder::new("a1").plugin("p-stub").build());
    let (mut runner, dispatcher, _) = build_runner(state.clone(), None, RunnerSettings::default());

    dispatcher.dispatch(Command::RunAction { id: "a1".to_string() }).await.unwrap();
    drop(dispatcher);
    runner.run_worker().await;

    let message = state.run_error("a1").await.unwrap().unwrap();
    assert!(message.contains("stub-plugin"), "{}", message);
    assert!(!state.is_running("a1").await.unwrap());
}

#[tokio::test]
async fn test_delete_removes_action() {
    let state = state_with(ActionBuilder::new("a1").plugin("p-stub").build());
    let (mut runner, dispatcher, _) = build_runner(
        state.clone(),
        Some(StubExecutor { delay: Duration::ZERO, status: 200 }),
        RunnerSettings::default(),
    );

    runner.apply(Command::RunAction { id: "a1".to_string() }).await.unwrap();
    dispatcher
        .dispatch(Command::DeleteAction { id: "a1".to_string(), name: "a1".to_string() })
        .await
        .unwrap();
    drop(dispatcher);
    runner.run_worker().await;

    assert!(state.get_action("a1").await.unwrap().is_none());
    assert!(!state.is_deleting("a1").await.unwrap());
}

#[tokio::test]
async fn test_delete_unknown_action_fails_without_side_effects() {
    let state = state_with(ActionBuilder::new("a1").build());
    let (mut runner, _dispatcher, _) = build_runner(state.clone(), None, RunnerSettings::default());

    let result = runner
        .apply(Command::DeleteAction { id: "ghost".to_string(), name: "Ghost".to_string() })
        .await;

    assert!(result.is_err());
    assert!(!state.is_deleting("ghost").await.unwrap());
    assert!(state.get_action("a1").await.unwrap().is_some());
}

#[tokio::test]
async fn test_set_property_errors_do_not_stop_worker() {
    let state = state_with(ActionBuilder::new("a1").build());
    let (mut runner, dispatcher, history) = build_runner(state.clone(), None, RunnerSettings::default());

    let bad = [
        Command::SetProperty { action_id: "ghost".to_string(), property_name: "name".to_string(), value: json!("x") },
        Command::SetProperty { action_id: "a1".to_string(), property_name: "a..b".to_string(), value: json!(1) },
    ];
    for command in bad {
        dispatcher.dispatch(command).await.unwrap();
    }
    dispatcher
        .dispatch(Command::SetProperty { action_id: "a1".to_string(), property_name: "name".to_string(), value: json!("Renamed") })
        .await
        .unwrap();
    dispatcher.dispatch(Command::Navigate { url: "/somewhere".to_string() }).await.unwrap();
    drop(dispatcher);
    runner.run_worker().await;

    assert_eq!(state.get_action("a1").await.unwrap().unwrap().name(), "Renamed");
    assert_eq!(history.current().as_deref(), Some("/somewhere"));
}

#[tokio::test]
async fn test_last_writer_wins_on_same_leaf() {
    let state = state_with(ActionBuilder::new("a1").build());
    let (mut runner, dispatcher, _) = build_runner(state.clone(), None, RunnerSettings::default());

    for value in ["first", "second", "third"] {
        dispatcher
            .dispatch(Command::SetProperty {
                action_id: "a1".to_string(),
                property_name: "actionConfiguration.path".to_string(),
                value: json!(value),
            })
            .await
            .unwrap();
    }
    drop(dispatcher);
    runner.run_worker().await;

    let stored = state.get_action("a1").await.unwrap().unwrap();
    assert_eq!(stored.action_configuration(), Some(&json!({ "path": "third" })));
}

#[tokio::test]
async fn test_huge_array_index_is_rejected_and_worker_continues() {
    let state = state_with(ActionBuilder::new("a1").name("Original").build());
    let (mut runner, dispatcher, _) = build_runner(state.clone(), None, RunnerSettings::default());

    for path in ["actionConfiguration.headers[18446744073709551615]", "actionConfiguration.headers[10000000000]"] {
        dispatcher
            .dispatch(Command::SetProperty { action_id: "a1".to_string(), property_name: path.to_string(), value: json!(1) })
            .await
            .unwrap();
    }
    dispatcher
        .dispatch(Command::SetProperty { action_id: "a1".to_string(), property_name: "name".to_string(), value: json!("after") })
        .await
        .unwrap();
    drop(dispatcher);

    let worker = tokio::spawn(async move { runner.run_worker().await });
    worker.await.expect("worker panicked");

    let stored = state.get_action("a1").await.unwrap().unwrap();
    assert_eq!(stored.name(), "after");
    assert_eq!(stored.action_configuration(), None);
}
