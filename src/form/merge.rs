use serde_json::Value;

/// Recursively merges `source` into `target`.
///
/// Objects merge key by key and arrays merge index by index, with surplus
/// source elements appended. Any other source value replaces the target.
pub fn merge(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target_map), Value::Object(source_map)) => {
            for (key, source_value) in source_map {
                match target_map.get_mut(key) {
                    Some(existing) => merge(existing, source_value),
                    None => {
                        target_map.insert(key.clone(), source_value.clone());
                    }
                }
            }
        }
        (Value::Array(target_arr), Value::Array(source_arr)) => {
            for (i, source_value) in source_arr.iter().enumerate() {
                if i < target_arr.len() {
                    merge(&mut target_arr[i], source_value);
                } else {
                    target_arr.push(source_value.clone());
                }
            }
        }
        (target, source) => *target = source.clone(),
    }
}

/// Folds `layers` left to right into a fresh object; later layers win.
pub fn merge_all<'a>(layers: impl IntoIterator<Item = &'a Value>) -> Value {
    let mut merged = Value::Object(serde_json::Map::new());
    for layer in layers {
        merge(&mut merged, layer);
    }
    merged
}
