//! Opt-in third-party analytics loader.

use serde::Serialize;
use serde_json::{Value, json};
use vitrine_dom::{ElementData, TagName};
use vitrine_types::config::{AnalyticsConfig, AnalyticsProvider};
use vitrine_types::error::{Result, VitrineError};

use crate::event::{EventResponse, PageEvent};
use crate::page::{Host, Widget};

pub const PLAUSIBLE_SCRIPT: &str = "https://plausible.io/js/script.js";
pub const FATHOM_SCRIPT: &str = "https://cdn.usefathom.com/script.js";

/// An event handed to the provider's queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
    pub name: String,
    pub payload: Value,
}

pub struct Analytics {
    config: AnalyticsConfig,
    /// Set once the Plausible queue exists on the page.
    plausible_queue: Option<Vec<TrackedEvent>>,
}

impl Analytics {
    pub fn new(config: &AnalyticsConfig) -> Self {
        Self {
            config: config.clone(),
            plausible_queue: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Events queued for Plausible, if it was loaded.
    pub fn queued(&self) -> &[TrackedEvent] {
        self.plausible_queue.as_deref().unwrap_or(&[])
    }

    /// Record a custom event. Does nothing while disabled.
    pub fn track_event(&mut self, name: &str, props: Value) {
        if !self.config.enabled {
            return;
        }
        log::info!("Event tracked: {name} {props}");
        if let Some(queue) = self.plausible_queue.as_mut() {
            queue.push(TrackedEvent {
                name: name.to_string(),
                payload: json!({ "props": props }),
            });
        }
    }

    fn load_plausible(&mut self, host: &mut Host) -> Result<()> {
        let script = ElementData::new(TagName::Script)
            .with_attr("defer", "")
            .with_attr("src", PLAUSIBLE_SCRIPT)
            .with_attr("data-domain", &host.viewport.hostname);
        inject(host, script)?;
        self.plausible_queue = Some(Vec::new());
        log::info!("Plausible Analytics loaded");
        Ok(())
    }

    fn load_fathom(&self, host: &mut Host) -> Result<()> {
        let script = ElementData::new(TagName::Script)
            .with_attr("src", FATHOM_SCRIPT)
            .with_attr("data-site", &self.config.site_id)
            .with_attr("defer", "");
        inject(host, script)?;
        log::info!("Fathom Analytics loaded");
        Ok(())
    }
}

fn inject(host: &mut Host, script: ElementData) -> Result<()> {
    let head = host
        .doc
        .head()
        .ok_or_else(|| VitrineError::Dom("document has no <head>".into()))?;
    let node = host.doc.create_element(script);
    host.doc.append_child(head, node);
    Ok(())
}

impl Widget for Analytics {
    fn name(&self) -> &'static str {
        "analytics"
    }

    fn install(&mut self, host: &mut Host) -> Result<()> {
        if !self.config.enabled {
            return Ok(());
        }
        match self.config.provider {
            AnalyticsProvider::Plausible => self.load_plausible(host),
            AnalyticsProvider::Fathom => self.load_fathom(host),
            AnalyticsProvider::Simple => {
                log::info!("Analytics provider not configured");
                Ok(())
            },
        }
    }

    fn handle_event(&mut self, _host: &mut Host, _event: &PageEvent) -> EventResponse {
        EventResponse::IGNORED
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::test_utils::page_with;

    fn config(enabled: bool, provider: AnalyticsProvider) -> AnalyticsConfig {
        AnalyticsConfig {
            enabled,
            provider,
            site_id: "ABCDEF".into(),
        }
    }

    fn page(cfg: AnalyticsConfig) -> Page {
        let mut page = page_with("<p>hi</p>").with_location("https://example.org/");
        page.install(Box::new(Analytics::new(&cfg))).unwrap();
        page
    }

    fn scripts(page: &Page) -> usize {
        page.host().query_all("head script").unwrap().len()
    }

    #[test]
    fn disabled_injects_nothing() {
        let mut page = page(config(false, AnalyticsProvider::Plausible));
        assert_eq!(scripts(&page), 0);
        let a = page.widget_mut::<Analytics>().unwrap();
        a.track_event("signup", json!({"plan": "free"}));
        assert!(a.queued().is_empty());
    }

    #[test]
    fn plausible_script_and_queue() {
        let mut page = page(config(true, AnalyticsProvider::Plausible));
        assert!(page.to_html().contains(
            r#"<script defer="" src="https://plausible.io/js/script.js" data-domain="example.org"></script>"#
        ));
        let a = page.widget_mut::<Analytics>().unwrap();
        a.track_event("download", json!({"file": "cv.pdf"}));
        assert_eq!(
            a.queued(),
            &[TrackedEvent {
                name: "download".into(),
                payload: json!({"props": {"file": "cv.pdf"}}),
            }]
        );
    }

    #[test]
    fn fathom_script_carries_site_id() {
        let mut page = page(config(true, AnalyticsProvider::Fathom));
        assert!(page.to_html().contains(
            r#"<script src="https://cdn.usefathom.com/script.js" data-site="ABCDEF" defer=""></script>"#
        ));
        let a = page.widget_mut::<Analytics>().unwrap();
        a.track_event("x", Value::Null);
        assert!(a.queued().is_empty());
    }

    #[test]
    fn simple_provider_injects_nothing() {
        let page = page(config(true, AnalyticsProvider::Simple));
        assert_eq!(scripts(&page), 0);
        assert!(page.widget::<Analytics>().unwrap().is_enabled());
    }
}
