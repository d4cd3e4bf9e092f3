use serde_json::{Map, Value};
use tracing::warn;
use crate::form::path::{parse_path, set_at_path};
use crate::model::FormNode;

pub const KEY_VALUE_ARRAY: &str = "KEYVALUE_ARRAY";

/// Collects the `initialValue` of every control in a plugin form config into one
/// nested object keyed by each control's `configProperty`.
pub fn config_initial_values(config: Option<&[FormNode]>) -> Value {
    let mut values = Value::Object(Map::new());
    if let Some(sections) = config {
        for section in sections {
            collect(section, &mut values);
        }
    }
    values
}

fn collect(node: &FormNode, values: &mut Value) {
    if let Some(children) = &node.children {
        for child in children {
            collect(child, values);
        }
        return;
    }

    let (Some(property), Some(initial)) = (&node.config_property, &node.initial_value) else {
        return;
    };

    match (node.control_type.as_deref(), initial) {
        (Some(KEY_VALUE_ARRAY), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                write(values, &property.replacen('*', &index.to_string(), 1), item.clone());
            }
        }
        _ => write(values, property, initial.clone()),
    }
}

fn write(values: &mut Value, property: &str, value: Value) {
    let result = parse_path(property).and_then(|segments| set_at_path(values, &segments, value));
    if let Err(e) = result {
        warn!(config_property = property, error = %e, "Skipping control with unusable configProperty");
    }
}
