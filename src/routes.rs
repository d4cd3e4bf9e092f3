use std::fmt;

/// Tabs of the integration (datasource) editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationTab {
    New,
    Active,
}

impl IntegrationTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationTab::New => "NEW",
            IntegrationTab::Active => "ACTIVE",
        }
    }
}

impl fmt::Display for IntegrationTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrationEditorMode {
    Auto,
    Mock,
}

impl IntegrationEditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntegrationEditorMode::Auto => "auto",
            IntegrationEditorMode::Mock => "mock",
        }
    }
}

impl fmt::Display for IntegrationEditorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn builder_page_url(application_id: &str, page_id: &str) -> String {
    format!("/applications/{}/pages/{}/edit", application_id, page_id)
}

pub fn integration_editor_url(
    application_id: &str,
    page_id: &str,
    tab: IntegrationTab,
    mode: Option<IntegrationEditorMode>,
) -> String {
    let mut url = format!("{}/datasources/{}", builder_page_url(application_id, page_id), tab);
    if let Some(mode) = mode {
        url.push_str("?mode=");
        url.push_str(mode.as_str());
    }
    url
}

/// Where "create datasource" leads: the NEW tab in auto mode.
pub fn create_datasource_url(application_id: &str, page_id: &str) -> String {
    integration_editor_url(application_id, page_id, IntegrationTab::New, Some(IntegrationEditorMode::Auto))
}
