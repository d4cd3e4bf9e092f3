pub mod builder;

use serde::{Serialize, Deserialize};
use serde_json::{Map, Value};
use crate::error::FormError;

/// 持久化的 Action 实体 (one configured API/query operation)
///
/// Kept as a raw JSON object so that any leaf can be addressed by a property path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Value", into = "Value")]
pub struct ActionEntity(Map<String, Value>);

impl ActionEntity {
    pub fn from_value(value: Value) -> Result<Self, FormError> {
        match value {
            Value::Object(map) => {
                if !matches!(map.get("id"), Some(Value::String(_))) {
                    return Err(FormError::MissingId);
                }
                Ok(Self(map))
            }
            other => Err(FormError::NotAnObject(json_type_name(&other).to_string())),
        }
    }

    pub fn id(&self) -> &str {
        self.str_field("id").unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.str_field("name").unwrap_or_default()
    }

    pub fn plugin_id(&self) -> &str {
        self.str_field("pluginId").unwrap_or_default()
    }

    /// The datasource may be embedded (`{ "id": .. }`) or referenced by a bare id string.
    pub fn datasource_id(&self) -> Option<&str> {
        match self.0.get("datasource") {
            Some(Value::String(id)) => Some(id.as_str()),
            Some(Value::Object(ds)) => ds.get("id").and_then(|v| v.as_str()),
            _ => None,
        }
    }

    pub fn action_configuration(&self) -> Option<&Value> {
        self.0.get("actionConfiguration")
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }
}

impl TryFrom<Value> for ActionEntity {
    type Error = FormError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_value(value)
    }
}

impl From<ActionEntity> for Value {
    fn from(entity: ActionEntity) -> Self {
        Value::Object(entity.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default)]
    pub response_type: Option<String>,
    #[serde(default)]
    pub documentation_link: Option<String>,
    #[serde(default)]
    pub icon_location: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Datasource {
    pub id: String,
    pub name: String,
    pub plugin_id: String,
    #[serde(default)]
    pub datasource_configuration: Value,
}

/// Dropdown entry handed to the form renderer for datasource selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatasourceOption {
    pub label: String,
    pub value: String,
    pub image: Option<String>,
}

/// 插件表单配置节点
/// A section (has `children`) or a single control of an editor/setting config.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FormNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub control_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FormNode>>,
    /// Renderer-specific keys (placeholders, validation hints, ...), passed through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type FormConfig = Vec<FormNode>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub body: Value,
    pub status_code: String,
    #[serde(default)]
    pub headers: Map<String, Value>,
    pub is_execution_success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<Value>,
    #[serde(default)]
    pub duration_ms: u64,
}

/// Route parameters of the SaaS editor page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RouteParams {
    pub application_id: String,
    pub page_id: String,
    #[serde(default)]
    pub plugin_package_name: String,
    pub api_id: String,
}

impl RouteParams {
    pub fn new(application_id: &str, page_id: &str, api_id: &str) -> Self {
        Self {
            application_id: application_id.to_string(),
            page_id: page_id.to_string(),
            plugin_package_name: String::new(),
            api_id: api_id.to_string(),
        }
    }
}

pub(crate) fn json_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
