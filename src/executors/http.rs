use async_trait::async_trait;
use serde_json::{Map, Value, json};
use anyhow::{Result, anyhow};
use std::time::Instant;
use reqwest::Client;
use crate::executors::ActionExecutor;
use crate::model::{ActionEntity, ActionResponse, Datasource};

pub const REST_API_PLUGIN: &str = "restapi-plugin";

#[derive(Debug)]
pub struct HttpExecutor {
    client: Client,
}

impl HttpExecutor {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Datasource base url joined with the action path; a bare action `url` otherwise.
    pub fn resolve_url(action: &ActionEntity, datasource: Option<&Datasource>) -> Option<String> {
        let config = action.action_configuration();
        let path = config.and_then(|c| c.get("path")).and_then(|v| v.as_str()).unwrap_or("");
        let base = datasource
            .and_then(|ds| ds.datasource_configuration.get("url"))
            .and_then(|v| v.as_str())
            .or_else(|| config.and_then(|c| c.get("url")).and_then(|v| v.as_str()))?;

        if path.is_empty() {
            return Some(base.to_string());
        }
        Some(format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/')))
    }
}

impl Default for HttpExecutor {
    fn default() -> Self {
        Self::new()
    }
}

/// `[{ "key": .., "value": .. }]` lists used for headers and query parameters.
fn key_value_pairs(list: Option<&Value>) -> Vec<(String, String)> {
    list.and_then(|v| v.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let key = item.get("key")?.as_str()?;
                    if key.is_empty() {
                        return None;
                    }
                    let value = match item.get("value") {
                        Some(Value::String(s)) => s.clone(),
                        Some(Value::Null) | None => String::new(),
                        Some(other) => other.to_string(),
                    };
                    Some((key.to_string(), value))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl ActionExecutor for HttpExecutor {
    fn name(&self) -> &str {
        REST_API_PLUGIN
    }

    fn validate(&self, action: &ActionEntity) -> Result<()> {
        if action.action_configuration().is_none() {
            return Err(anyhow!("Missing actionConfiguration on action {}", action.id()));
        }
        Ok(())
    }

    async fn execute(&self, action: &ActionEntity, datasource: Option<&Datasource>) -> Result<ActionResponse> {
        let url = Self::resolve_url(action, datasource)
            .ok_or_else(|| anyhow!("No url configured for action {}", action.id()))?;
        let config = action.action_configuration();

        let method_str = config
            .and_then(|c| c.get("httpMethod"))
            .and_then(|v| v.as_str())
            .unwrap_or("GET");
        let method = method_str.parse::<reqwest::Method>()
            .map_err(|_| anyhow!("Invalid HTTP method: {}", method_str))?;

        let headers = key_value_pairs(config.and_then(|c| c.get("headers")));
        let query = key_value_pairs(config.and_then(|c| c.get("queryParameters")));

        let mut builder = self.client.request(method.clone(), &url).query(&query);
        for (k, v) in &headers {
            builder = builder.header(k, v);
        }

        // Body: JSON when it parses as JSON, raw text otherwise
        match config.and_then(|c| c.get("body")) {
            Some(Value::String(s)) if !s.is_empty() => {
                builder = match serde_json::from_str::<Value>(s) {
                    Ok(json_body) => builder.json(&json_body),
                    Err(_) => builder.body(s.clone()),
                };
            }
            Some(v @ (Value::Object(_) | Value::Array(_))) => {
                builder = builder.json(v);
            }
            _ => {}
        }

        let started = Instant::now();
        let response = builder.send().await?;
        let status = response.status();

        let mut response_headers = Map::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                response_headers.insert(name.to_string(), json!([v]));
            }
        }

        let text = response.text().await?;
        let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        Ok(ActionResponse {
            body,
            status_code: status.as_u16().to_string(),
            headers: response_headers,
            is_execution_success: status.is_success(),
            request: Some(json!({
                "url": url,
                "httpMethod": method.as_str(),
                "headers": headers.iter().map(|(k, v)| json!({ "key": k, "value": v })).collect::<Vec<_>>(),
            })),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }
}
