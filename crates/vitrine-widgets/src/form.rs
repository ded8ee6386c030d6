//! Contact form validation and submission.
//!
//! Bound to `#contact-form`. A filled honeypot field silently drops the
//! submission. Valid submissions to a Formspree action are posted through
//! the page's [`FormTransport`](crate::host::FormTransport); any other
//! action succeeds locally.

use std::sync::LazyLock;

use regex::Regex;
use vitrine_dom::{NodeId, Selector};
use vitrine_types::config::FormConfig;
use vitrine_types::error::Result;

use crate::event::{EventResponse, PageEvent, TimerTag};
use crate::host::TimerId;
use crate::page::{Host, Widget};

pub const SUCCESS_MESSAGE: &str = "\u{2713} Message sent! I'll get back to you soon.";
pub const SUBMIT_ERROR_MESSAGE: &str = "Error submitting form. Please try again.";

/// Why a submission was rejected before sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all required fields.")]
    MissingFields,
    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

/// Check the three required fields (already trimmed).
pub fn validate(name: &str, email: &str, message: &str) -> std::result::Result<(), ValidationError> {
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !is_valid_email(email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(())
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

/// `local@domain.tld`: no whitespace, exactly one `@`, and a dot in the
/// domain with something on both sides of it.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Status message styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Default)]
struct FormNodes {
    form: NodeId,
    name: Option<NodeId>,
    email: Option<NodeId>,
    message: Option<NodeId>,
    honeypot: Option<NodeId>,
    status: Option<NodeId>,
    submit: Option<NodeId>,
    /// Named controls and their values at install time.
    defaults: Vec<(NodeId, String)>,
}

pub struct FormHandler {
    success_hide_ms: u64,
    nodes: Option<FormNodes>,
    hide_timer: Option<TimerId>,
}

impl FormHandler {
    pub fn new(config: &FormConfig) -> Self {
        Self {
            success_hide_ms: config.success_hide_ms,
            nodes: None,
            hide_timer: None,
        }
    }

    /// Whether a contact form was found at install.
    pub fn is_active(&self) -> bool {
        self.nodes.is_some()
    }

    fn on_submit(&mut self, host: &mut Host) {
        let Some(nodes) = &self.nodes else {
            return;
        };
        let value = |n: Option<NodeId>| {
            n.map(|n| host.doc.form_value(n).trim().to_string())
                .unwrap_or_default()
        };

        // Any honeypot content counts, whitespace included.
        if nodes
            .honeypot
            .is_some_and(|n| !host.doc.form_value(n).is_empty())
        {
            log::info!("honeypot triggered, dropping submission");
            return;
        }
        if let Err(e) = validate(
            &value(nodes.name),
            &value(nodes.email),
            &value(nodes.message),
        ) {
            log::debug!("form rejected: {e:?}");
            self.show_message(host, &e.to_string(), MessageKind::Error);
            return;
        }

        let action = host
            .doc
            .attr(nodes.form, "action")
            .unwrap_or("")
            .to_string();
        if action.contains("formspree") {
            self.submit_remote(host, &action);
        } else {
            self.succeed(host);
        }
    }

    fn submit_remote(&mut self, host: &mut Host, action: &str) {
        let Some(nodes) = &self.nodes else {
            return;
        };
        let fields: Vec<(String, String)> = nodes
            .defaults
            .iter()
            .filter_map(|&(n, _)| {
                let name = host.doc.attr(n, "name")?;
                Some((name.to_string(), host.doc.form_value(n)))
            })
            .collect();

        let submit = nodes.submit;
        let original_text = submit.map(|b| host.doc.text_content(b));
        if let Some(b) = submit {
            host.doc.set_text_content(b, "Sending...");
            host.doc.set_attr(b, "disabled", "");
        }

        let outcome = host.transport.post(action, &fields);

        if let (Some(b), Some(text)) = (submit, original_text) {
            host.doc.set_text_content(b, &text);
            host.doc.remove_attr(b, "disabled");
        }
        match outcome {
            Ok(status) if (200..300).contains(&status) => self.succeed(host),
            Ok(status) => {
                log::warn!("form endpoint answered {status}");
                self.show_message(host, SUBMIT_ERROR_MESSAGE, MessageKind::Error);
            },
            Err(e) => {
                log::warn!("form submission failed: {e}");
                self.show_message(host, SUBMIT_ERROR_MESSAGE, MessageKind::Error);
            },
        }
    }

    fn succeed(&mut self, host: &mut Host) {
        self.show_message(host, SUCCESS_MESSAGE, MessageKind::Success);
        self.reset(host);
    }

    /// Restore every named control to its install-time value.
    pub fn reset(&self, host: &mut Host) {
        if let Some(nodes) = &self.nodes {
            for (n, default) in &nodes.defaults {
                host.doc.set_form_value(*n, default);
            }
        }
    }

    fn show_message(&mut self, host: &mut Host, text: &str, kind: MessageKind) {
        let Some(status) = self.nodes.as_ref().and_then(|n| n.status) else {
            return;
        };
        host.doc.set_text_content(status, text);
        host.doc
            .set_attr(status, "class", &format!("form-message form-{}", kind.as_str()));
        host.doc.set_style(status, "display", "block");
        if let Some(id) = self.hide_timer.take() {
            host.timers.cancel(id);
        }
        if kind == MessageKind::Success {
            self.hide_timer = Some(
                host.timers
                    .schedule(self.success_hide_ms, TimerTag::FormMessageHide),
            );
        }
    }
}

impl Widget for FormHandler {
    fn name(&self) -> &'static str {
        "contact-form"
    }

    fn install(&mut self, host: &mut Host) -> Result<()> {
        let doc = &host.doc;
        let Some(form) = doc.get_element_by_id("contact-form") else {
            log::debug!("no #contact-form on page");
            return Ok(());
        };
        let controls = Selector::parse("input[name], textarea[name], select[name]")?;
        let defaults = doc
            .query_all(form, &controls)
            .into_iter()
            .map(|n| (n, doc.form_value(n)))
            .collect();
        self.nodes = Some(FormNodes {
            form,
            name: doc.get_element_by_id("name"),
            email: doc.get_element_by_id("email"),
            message: doc.get_element_by_id("message"),
            honeypot: doc.get_element_by_id("website"),
            status: doc.get_element_by_id("form-message"),
            submit: doc.query(form, &Selector::parse("button[type='submit']")?),
            defaults,
        });
        Ok(())
    }

    fn handle_event(&mut self, host: &mut Host, event: &PageEvent) -> EventResponse {
        let form = self.nodes.as_ref().map(|n| n.form);
        match event {
            PageEvent::Submit { form: submitted } if Some(*submitted) == form => {
                self.on_submit(host);
                EventResponse::CONSUMED
            },
            PageEvent::Timer(TimerTag::FormMessageHide) => {
                self.hide_timer = None;
                if let Some(status) = self.nodes.as_ref().and_then(|n| n.status) {
                    host.doc.set_style(status, "display", "none");
                }
                EventResponse::HANDLED
            },
            _ => EventResponse::IGNORED,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::RecordingTransport;
    use crate::page::Page;
    use crate::test_utils::{CONTACT_PAGE, page_with};

    fn contact_page(action: &str, transport: RecordingTransport) -> Page {
        let html = CONTACT_PAGE.replace("{action}", action);
        let mut page = page_with(&html).with_transport(transport);
        page.install(Box::new(FormHandler::new(&FormConfig::default())))
            .unwrap();
        page
    }

    fn fill(page: &mut Page, name: &str, email: &str, message: &str) {
        page.input("#name", name).unwrap();
        page.input("#email", email).unwrap();
        page.input("#message", message).unwrap();
    }

    fn status(page: &Page) -> (String, String, Option<String>) {
        let doc = page.doc();
        let n = doc.get_element_by_id("form-message").unwrap();
        (
            doc.text_content(n),
            doc.attr(n, "class").unwrap_or("").to_string(),
            doc.style(n, "display"),
        )
    }

    fn value(page: &Page, id: &str) -> String {
        let doc = page.doc();
        doc.form_value(doc.get_element_by_id(id).unwrap())
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@b.co"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a@.b"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("a@b@c.de"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("a@b.c\n"));
        assert!(!is_valid_email("a@b.c d"));
        assert!(is_valid_email("a@b..c"));
    }

    #[test]
    fn validation_messages() {
        assert_eq!(
            validate("", "a@b.co", "hi").unwrap_err().to_string(),
            "Please fill in all required fields."
        );
        assert_eq!(
            validate("Ada", "nope", "hi").unwrap_err().to_string(),
            "Please enter a valid email address."
        );
        assert!(validate("Ada", "a@b.co", "hi").is_ok());
    }

    #[test]
    fn missing_fields_never_reach_transport() {
        let transport = RecordingTransport::responding(200);
        let log = transport.log();
        let mut page = contact_page("https://formspree.io/f/abc", transport);
        fill(&mut page, "Ada", "ada@example.com", "   ");
        let r = page.submit("#contact-form").unwrap();
        assert!(r.prevent_default);
        assert!(log.borrow().is_empty());
        let (text, class, display) = status(&page);
        assert_eq!(text, "Please fill in all required fields.");
        assert_eq!(class, "form-message form-error");
        assert_eq!(display.as_deref(), Some("block"));
    }

    #[test]
    fn invalid_email_message_is_specific() {
        let transport = RecordingTransport::responding(200);
        let log = transport.log();
        let mut page = contact_page("https://formspree.io/f/abc", transport);
        fill(&mut page, "Ada", "ada-at-example", "Hello");
        page.submit("#contact-form").unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(status(&page).0, "Please enter a valid email address.");
        // Errors stay up.
        page.advance(10_000);
        assert_eq!(status(&page).2.as_deref(), Some("block"));
    }

    #[test]
    fn honeypot_drops_silently() {
        let transport = RecordingTransport::responding(200);
        let log = transport.log();
        let mut page = contact_page("https://formspree.io/f/abc", transport);
        fill(&mut page, "Bot", "bot@spam.io", "buy");
        page.input("#website", "http://spam.example").unwrap();
        assert!(page.submit("#contact-form").unwrap().prevent_default);
        assert!(log.borrow().is_empty());
        assert_eq!(status(&page).0, "");
        assert_eq!(value(&page, "name"), "Bot");
    }

    #[test]
    fn whitespace_honeypot_still_drops() {
        let transport = RecordingTransport::responding(200);
        let log = transport.log();
        let mut page = contact_page("https://formspree.io/f/abc", transport);
        fill(&mut page, "Bot", "bot@spam.io", "buy");
        page.input("#website", "  ").unwrap();
        page.submit("#contact-form").unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(status(&page).0, "");
    }

    #[test]
    fn formspree_success_posts_and_resets() {
        let transport = RecordingTransport::responding(200);
        let log = transport.log();
        let mut page = contact_page("https://formspree.io/f/abc", transport);
        fill(&mut page, "Ada", "ada@example.com", "Hello there");
        page.submit("#contact-form").unwrap();

        let sent = log.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].action, "https://formspree.io/f/abc");
        assert!(sent[0].fields.contains(&("email".to_string(), "ada@example.com".to_string())));
        assert!(sent[0].fields.contains(&("message".to_string(), "Hello there".to_string())));

        let (text, class, _) = status(&page);
        assert_eq!(text, SUCCESS_MESSAGE);
        assert_eq!(class, "form-message form-success");
        assert_eq!(value(&page, "name"), "");
        assert_eq!(value(&page, "message"), "");

        let doc = page.doc();
        let button = page.host().query("button[type='submit']").unwrap().unwrap();
        assert_eq!(doc.text_content(button), "Send");
        assert!(doc.attr(button, "disabled").is_none());
    }

    #[test]
    fn success_message_hides_after_delay() {
        let mut page = contact_page("/thanks", RecordingTransport::responding(200));
        fill(&mut page, "Ada", "ada@example.com", "Hi");
        page.submit("#contact-form").unwrap();
        assert_eq!(status(&page).2.as_deref(), Some("block"));
        page.advance(4999);
        assert_eq!(status(&page).2.as_deref(), Some("block"));
        page.advance(1);
        assert_eq!(status(&page).2.as_deref(), Some("none"));
    }

    #[test]
    fn local_action_skips_transport() {
        let transport = RecordingTransport::responding(500);
        let log = transport.log();
        let mut page = contact_page("/contact", transport);
        fill(&mut page, "Ada", "ada@example.com", "Hi");
        page.submit("#contact-form").unwrap();
        assert!(log.borrow().is_empty());
        assert_eq!(status(&page).0, SUCCESS_MESSAGE);
    }

    #[test]
    fn endpoint_error_keeps_fields() {
        let mut page = contact_page("https://formspree.io/f/abc", RecordingTransport::responding(422));
        fill(&mut page, "Ada", "ada@example.com", "Hi");
        page.submit("#contact-form").unwrap();
        assert_eq!(status(&page).0, SUBMIT_ERROR_MESSAGE);
        assert_eq!(value(&page, "name"), "Ada");
    }

    #[test]
    fn transport_failure_is_reported() {
        let mut page = contact_page("https://formspree.io/f/abc", RecordingTransport::failing("offline"));
        fill(&mut page, "Ada", "ada@example.com", "Hi");
        page.submit("#contact-form").unwrap();
        assert_eq!(status(&page).0, SUBMIT_ERROR_MESSAGE);
        assert_eq!(status(&page).1, "form-message form-error");
    }

    #[test]
    fn reset_restores_install_defaults() {
        let html = CONTACT_PAGE
            .replace("{action}", "/contact")
            .replace(r#"id="name" name="name""#, r#"id="name" name="name" value="Your name""#);
        let mut page = page_with(&html);
        page.install(Box::new(FormHandler::new(&FormConfig::default())))
            .unwrap();
        fill(&mut page, "Ada", "ada@example.com", "Hi");
        page.submit("#contact-form").unwrap();
        assert_eq!(value(&page, "name"), "Your name");
    }

    #[test]
    fn page_without_form_is_inert() {
        let mut page = page_with("<form id=other></form>");
        page.install(Box::new(FormHandler::new(&FormConfig::default())))
            .unwrap();
        assert!(!page.widget::<FormHandler>().unwrap().is_active());
        assert!(!page.submit("#other").unwrap().handled);
    }
}
