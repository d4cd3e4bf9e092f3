use crate::model::{ActionEntity, FormNode, FormConfig};
use serde_json::{Map, Value};

pub struct ActionBuilder {
    fields: Map<String, Value>,
    configuration: Map<String, Value>,
}

impl ActionBuilder {
    pub fn new(id: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("id".to_string(), Value::String(id.to_string()));
        fields.insert("name".to_string(), Value::String(id.to_string()));
        Self {
            fields,
            configuration: Map::new(),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.fields.insert("name".to_string(), Value::String(name.to_string()));
        self
    }

    pub fn plugin(mut self, plugin_id: &str) -> Self {
        self.fields.insert("pluginId".to_string(), Value::String(plugin_id.to_string()));
        self
    }

    pub fn page(mut self, page_id: &str) -> Self {
        self.fields.insert("pageId".to_string(), Value::String(page_id.to_string()));
        self
    }

    pub fn datasource(mut self, datasource_id: &str) -> Self {
        let mut ds = Map::new();
        ds.insert("id".to_string(), Value::String(datasource_id.to_string()));
        self.fields.insert("datasource".to_string(), Value::Object(ds));
        self
    }

    /// Top-level field of the entity.
    pub fn field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Key under `actionConfiguration`.
    pub fn config(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.configuration.insert(key.to_string(), value.into());
        self
    }

    pub fn build(mut self) -> ActionEntity {
        if !self.configuration.is_empty() {
            self.fields.insert("actionConfiguration".to_string(), Value::Object(self.configuration));
        }
        ActionEntity(self.fields)
    }
}

/// Builds editor/setting configs: a list of sections holding controls.
pub struct FormConfigBuilder {
    sections: Vec<FormNode>,
}

impl FormConfigBuilder {
    pub fn new() -> Self {
        Self { sections: Vec::new() }
    }

    pub fn section(self, label: &str) -> SectionBuilder {
        SectionBuilder {
            config_builder: self,
            node: FormNode {
                label: Some(label.to_string()),
                children: Some(Vec::new()),
                ..FormNode::default()
            },
        }
    }

    pub fn build(self) -> FormConfig {
        self.sections
    }
}

impl Default for FormConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct SectionBuilder {
    config_builder: FormConfigBuilder,
    node: FormNode,
}

impl SectionBuilder {
    pub fn control(self, config_property: &str, control_type: &str) -> ControlBuilder {
        ControlBuilder {
            section_builder: self,
            node: FormNode {
                config_property: Some(config_property.to_string()),
                control_type: Some(control_type.to_string()),
                ..FormNode::default()
            },
        }
    }

    /// Nested section without controls of its own.
    pub fn subsection(mut self, node: FormNode) -> Self {
        self.node.children.get_or_insert_with(Vec::new).push(node);
        self
    }

    pub fn build(mut self) -> FormConfigBuilder {
        self.config_builder.sections.push(self.node);
        self.config_builder
    }
}

pub struct ControlBuilder {
    section_builder: SectionBuilder,
    node: FormNode,
}

impl ControlBuilder {
    pub fn label(mut self, label: &str) -> Self {
        self.node.label = Some(label.to_string());
        self
    }

    pub fn initial(mut self, value: impl Into<Value>) -> Self {
        self.node.initial_value = Some(value.into());
        self
    }

    pub fn attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.node.extra.insert(key.to_string(), value.into());
        self
    }

    pub fn build(mut self) -> SectionBuilder {
        self.section_builder
            .node
            .children
            .get_or_insert_with(Vec::new)
            .push(self.node);
        self.section_builder
    }
}
