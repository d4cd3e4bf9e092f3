use async_trait::async_trait;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use crate::model::{ActionEntity, ActionResponse, Datasource};

pub mod builtin;
pub mod http;

/// 插件执行接口：运行一个 Action 并返回执行结果
#[async_trait]
pub trait ActionExecutor: Send + Sync + Debug {
    /// Plugin package name this executor serves.
    fn name(&self) -> &str;
    fn validate(&self, action: &ActionEntity) -> Result<()>;
    async fn execute(&self, action: &ActionEntity, datasource: Option<&Datasource>) -> Result<ActionResponse>;
}

/// Executors keyed by plugin package name, with an optional catch-all.
#[derive(Debug, Default, Clone)]
pub struct ExecutorRegistry {
    executors: HashMap<String, Arc<dyn ActionExecutor>>,
    fallback: Option<Arc<dyn ActionExecutor>>,
}

impl ExecutorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, executor: Arc<dyn ActionExecutor>) {
        self.executors.insert(executor.name().to_string(), executor);
    }

    pub fn set_fallback(&mut self, executor: Arc<dyn ActionExecutor>) {
        self.fallback = Some(executor);
    }

    /// Uses a registered executor by name as the catch-all. Returns false if unknown.
    pub fn use_fallback(&mut self, name: &str) -> bool {
        match self.executors.get(name) {
            Some(executor) => {
                self.fallback = Some(executor.clone());
                true
            }
            None => false,
        }
    }

    pub fn resolve(&self, package_name: &str) -> Option<Arc<dyn ActionExecutor>> {
        self.executors
            .get(package_name)
            .cloned()
            .or_else(|| self.fallback.clone())
    }
}
