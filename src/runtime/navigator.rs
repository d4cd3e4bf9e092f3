use std::sync::Mutex;
use tracing::info;

/// 路由导航接口
pub trait Navigator: Send + Sync {
    fn push(&self, url: &str);
}

/// Records every pushed URL; `current()` is the last one.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<String>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn current(&self) -> Option<String> {
        self.entries.lock().ok().and_then(|e| e.last().cloned())
    }
}

impl Navigator for History {
    fn push(&self, url: &str) {
        info!(url, "Navigating");
        match self.entries.lock() {
            Ok(mut entries) => entries.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }
    }
}
