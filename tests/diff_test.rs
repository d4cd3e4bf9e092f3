use saas_editor::form::diff::{diff, DiffKind, DifferenceEntry};
use saas_editor::form::initial::config_initial_values;
use saas_editor::form::merge::{merge, merge_all};
use saas_editor::form::path::PathSegment;
use saas_editor::model::builder::FormConfigBuilder;
use saas_editor::model::FormNode;
use serde_json::json;

fn key(k: &str) -> PathSegment {
    PathSegment::Key(k.to_string())
}

#[test]
fn test_diff_equal_documents() {
    let doc = json!({ "a": [1, { "b": null }], "c": "x" });
    assert!(diff(&doc, &doc).is_empty());
}

#[test]
fn test_diff_object_keys() {
    let lhs = json!({ "keep": 1, "gone": true, "changed": "a" });
    let rhs = json!({ "keep": 1, "changed": "b", "added": { "x": 1 } });

    let entries = diff(&lhs, &rhs);
    assert_eq!(entries.len(), 3);
    assert!(entries.contains(&DifferenceEntry::new(
        vec![key("gone")],
        DiffKind::Deleted { lhs: json!(true) },
    )));
    assert!(entries.contains(&DifferenceEntry::new(
        vec![key("changed")],
        DiffKind::Edited { lhs: json!("a"), rhs: json!("b") },
    )));
    assert!(entries.contains(&DifferenceEntry::new(
        vec![key("added")],
        DiffKind::New { rhs: json!({ "x": 1 }) },
    )));
}

#[test]
fn test_diff_arrays_grow_and_shrink() {
    let grown = diff(&json!({ "h": [1] }), &json!({ "h": [1, 2, 3] }));
    assert_eq!(
        grown,
        vec![
            DifferenceEntry::new(vec![key("h")], DiffKind::Array { index: 1, item: Box::new(DiffKind::New { rhs: json!(2) }) }),
            DifferenceEntry::new(vec![key("h")], DiffKind::Array { index: 2, item: Box::new(DiffKind::New { rhs: json!(3) }) }),
        ]
    );

    let shrunk = diff(&json!([1, 2]), &json!([1]));
    assert_eq!(
        shrunk,
        vec![DifferenceEntry::new(
            vec![],
            DiffKind::Array { index: 1, item: Box::new(DiffKind::Deleted { lhs: json!(2) }) },
        )]
    );
}

#[test]
fn test_diff_recurses_into_array_elements() {
    let lhs = json!({ "headers": [{ "key": "a" }] });
    let rhs = json!({ "headers": [{ "key": "a", "value": "" }] });

    assert_eq!(
        diff(&lhs, &rhs),
        vec![DifferenceEntry::new(
            vec![key("headers"), PathSegment::Index(0), key("value")],
            DiffKind::New { rhs: json!("") },
        )]
    );
}

#[test]
fn test_difference_entry_wire_format() {
    let entry = DifferenceEntry::new(
        vec![key("headers")],
        DiffKind::Array { index: 0, item: Box::new(DiffKind::New { rhs: json!("x") }) },
    );
    let encoded = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        encoded,
        json!({ "path": ["headers"], "kind": "A", "index": 0, "item": { "kind": "N", "rhs": "x" } })
    );

    let negative = json!({ "path": ["headers"], "kind": "A", "index": -1, "item": { "kind": "N", "rhs": "x" } });
    assert!(serde_json::from_value::<DifferenceEntry>(negative).is_err());
}

#[test]
fn test_merge_objects_and_arrays() {
    let mut target = json!({ "a": { "x": 1, "y": 2 }, "list": [{ "k": 1 }, { "k": 2 }], "s": "old" });
    let source = json!({ "a": { "y": 20, "z": 30 }, "list": [{ "v": 9 }], "s": "new" });
    merge(&mut target, &source);

    assert_eq!(
        target,
        json!({
            "a": { "x": 1, "y": 20, "z": 30 },
            "list": [{ "k": 1, "v": 9 }, { "k": 2 }],
            "s": "new"
        })
    );
}

#[test]
fn test_merge_all_later_layers_win() {
    let defaults = json!({ "actionConfiguration": { "path": "/default", "timeoutInMillisecond": 10000 } });
    let settings = json!({ "executeOnLoad": false });
    let action = json!({ "id": "a1", "actionConfiguration": { "path": "/users" } });

    let merged = merge_all([&defaults, &settings, &action]);
    assert_eq!(
        merged,
        json!({
            "id": "a1",
            "executeOnLoad": false,
            "actionConfiguration": { "path": "/users", "timeoutInMillisecond": 10000 }
        })
    );
}

#[test]
fn test_config_initial_values_walks_sections() {
    let config = FormConfigBuilder::new()
        .section("Query")
            .control("actionConfiguration.formData.command", "DROP_DOWN")
                .initial("LIST")
                .build()
            .control("actionConfiguration.formData.limit", "INPUT_TEXT")
                .build()
            .subsection(FormNode {
                children: Some(vec![FormNode {
                    config_property: Some("actionConfiguration.formData.sheet".to_string()),
                    initial_value: Some(json!("Sheet1")),
                    ..FormNode::default()
                }]),
                ..FormNode::default()
            })
            .build()
        .section("Settings")
            .control("executeOnLoad", "SWITCH")
                .initial(false)
                .build()
            .build()
        .build();

    assert_eq!(
        config_initial_values(Some(config.as_slice())),
        json!({
            "actionConfiguration": { "formData": { "command": "LIST", "sheet": "Sheet1" } },
            "executeOnLoad": false
        })
    );
}

#[test]
fn test_config_initial_values_key_value_array() {
    let config = FormConfigBuilder::new()
        .section("Headers")
            .control("actionConfiguration.headers[*].key", "KEYVALUE_ARRAY")
                .initial(json!(["Accept", "Content-Type"]))
                .build()
            .build()
        .build();

    assert_eq!(
        config_initial_values(Some(config.as_slice())),
        json!({ "actionConfiguration": { "headers": [{ "key": "Accept" }, { "key": "Content-Type" }] } })
    );
}

#[test]
fn test_config_initial_values_missing_config() {
    assert_eq!(config_initial_values(None), json!({}));
    assert_eq!(config_initial_values(Some(&[][..])), json!({}));
}

#[test]
fn test_config_initial_values_key_value_array_replaces_first_star_only() {
    let config = FormConfigBuilder::new()
        .section("Params")
            .control("actionConfiguration.params[*].key*", "KEYVALUE_ARRAY")
                .initial(json!(["page", "limit"]))
                .build()
            .build()
        .build();

    assert_eq!(
        config_initial_values(Some(config.as_slice())),
        json!({ "actionConfiguration": { "params": [{ "key*": "page" }, { "key*": "limit" }] } })
    );
}
