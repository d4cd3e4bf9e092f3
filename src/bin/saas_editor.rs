use clap::{Args, Parser, Subcommand};
use saas_editor::config::{load_settings_from_yaml, Settings};
use saas_editor::executors::ExecutorRegistry;
use saas_editor::executors::builtin::EchoExecutor;
use saas_editor::executors::http::HttpExecutor;
use saas_editor::loader::load_snapshot_from_yaml;
use saas_editor::model::RouteParams;
use saas_editor::runtime::redis_storage::RedisActionStore;
use saas_editor::runtime::storage::{ActionStore, Repositories};
use saas_editor::session::EditorSession;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{Result, Context as AnyhowContext};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings YAML file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Target {
    /// Application state snapshot (YAML)
    #[arg(long, short)]
    state: PathBuf,

    #[arg(long, default_value = "app")]
    app: String,

    #[arg(long, default_value = "page")]
    page: String,

    /// Action id (the route's apiId)
    #[arg(long, short)]
    action: String,

    /// Copy the snapshot's actions into Redis before starting
    #[arg(long)]
    seed_redis: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the props of one render pass as JSON
    Props(Target),
    /// Print the property updates a render pass would dispatch
    Reconcile(Target),
    /// Render once, apply the property updates and print the resulting action
    Apply(Target),
    /// Run the action and print its response
    Run(Target),
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings> {
    let settings = match path {
        Some(p) => load_settings_from_yaml(&p.to_string_lossy())?,
        None => Settings::default(),
    };
    Ok(settings.apply_env_overrides(|key| std::env::var(key).ok()))
}

async fn build_repositories(target: &Target, settings: &Settings) -> Result<Repositories> {
    let snapshot = load_snapshot_from_yaml(&target.state.to_string_lossy())?;
    let actions = snapshot.actions.clone();
    let repos = Repositories::in_memory(Arc::new(snapshot.into_state()));

    let Some(url) = settings.redis.url.as_deref() else {
        return Ok(repos);
    };

    info!("Using Redis action store: {}", url);
    let client = redis::Client::open(url).context("Invalid Redis URL")?;
    let store = Arc::new(RedisActionStore::new(client, settings.redis.prefix.clone()));
    if target.seed_redis {
        for action in actions {
            store.put_action(action).await?;
        }
    }
    Ok(repos.with_action_store(store))
}

fn build_executors(settings: &Settings) -> ExecutorRegistry {
    let mut executors = ExecutorRegistry::new();
    executors.register(Arc::new(HttpExecutor::new()));
    executors.register(Arc::new(EchoExecutor));
    if let Some(name) = settings.runner.default_executor.as_deref() {
        if !executors.use_fallback(name) {
            warn!("Unknown default executor: {}", name);
        }
    }
    executors
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_ref())?;

    let target = match &cli.command {
        Commands::Props(t) | Commands::Reconcile(t) | Commands::Apply(t) | Commands::Run(t) => t,
    };
    let repos = build_repositories(target, &settings).await?;
    let route = RouteParams::new(&target.app, &target.page, &target.action);
    let session = EditorSession::start(route, repos, build_executors(&settings), settings.runner.clone());

    match cli.command {
        Commands::Props(_) => {
            let pass = session.preview().await?;
            println!("{}", serde_json::to_string_pretty(&pass.props)?);
        }
        Commands::Reconcile(_) => {
            let pass = session.preview().await?;
            println!("{}", serde_json::to_string_pretty(&pass.commands)?);
        }
        Commands::Apply(t) => {
            let action = session.apply().await?
                .with_context(|| format!("Action {} not found", t.action))?;
            println!("{}", serde_json::to_string_pretty(&action)?);
        }
        Commands::Run(_) => {
            let outcome = session.run().await?;
            println!("{}", serde_json::to_string_pretty(&outcome.response)?);
        }
    }

    Ok(())
}
