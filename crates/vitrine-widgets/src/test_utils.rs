//! Shared fixtures for widget tests.

use vitrine_dom::parse_html;
use vitrine_types::error::{Result, VitrineError};

use crate::host::{KeyValueStore, MemoryClipboard, MemoryStore, RecordingTransport};
use crate::page::Page;

/// A page over `html` with in-memory host services and a transport that
/// answers 200.
pub fn page_with(html: &str) -> Page {
    Page::new(parse_html(html))
        .with_store(MemoryStore::new())
        .with_clipboard(MemoryClipboard::new())
        .with_transport(RecordingTransport::responding(200))
}

/// A store whose every operation fails.
pub struct FailingStore;

impl KeyValueStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(VitrineError::Storage("store offline".into()))
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
        Err(VitrineError::Storage("store offline".into()))
    }

    fn remove(&mut self, _key: &str) -> Result<()> {
        Err(VitrineError::Storage("store offline".into()))
    }
}

pub const GALLERY_PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>Photos</title></head>
<body>
  <h1>Photos</h1>
  <div class="gallery" data-gallery="trip">
    <img id="t1" class="lightbox-trigger" src="img/1.jpg" alt="One">
    <img id="t2" class="lightbox-trigger" src="img/2.jpg" data-fullsize="img/2-full.jpg" alt="Two" data-caption="Second shot">
    <img id="t3" class="lightbox-trigger" src="img/3.jpg" alt="Three">
  </div>
  <img id="solo" class="lightbox-trigger" src="img/solo.jpg">
  <a id="linked" class="lightbox-trigger" href="img/linked-full.jpg"><img src="img/linked-thumb.jpg"></a>
</body></html>"#;

pub const THEME_PAGE: &str = r#"<!DOCTYPE html>
<html><head></head>
<body>
  <button id="theme-toggle" aria-label="Toggle theme">
    <span class="theme-icon"></span><span class="theme-text"></span>
  </button>
</body></html>"#;

pub const NAV_PAGE: &str = r#"<header>
  <button class="menu-toggle" aria-label="Menu"><span></span></button>
  <nav>
    <ul>
      <li><a href="index.html">Home</a></li>
      <li><a href="about.html">About</a></li>
      <li><a href="projects.html">Projects</a></li>
    </ul>
  </nav>
</header>"#;

pub const CODE_PAGE: &str = r#"<article>
  <pre id="rust"><code>fn main() {}</code></pre>
  <pre id="shell" style="position: absolute">ls -la</pre>
  <div id="snippet"><code class="code-block">x = 1</code></div>
  <p>inline <code>y</code> stays bare</p>
</article>"#;

pub const CONTACT_PAGE: &str = r#"<form id="contact-form" action="{action}" method="POST">
  <input type="text" id="name" name="name">
  <input type="email" id="email" name="email">
  <textarea id="message" name="message"></textarea>
  <input type="text" id="website" name="website" class="honeypot">
  <button type="submit">Send</button>
  <div id="form-message" class="form-message"></div>
</form>"#;

pub const SKILLS_PAGE: &str = r#"<section>
  <div id="c1" class="card">Project</div>
  <div class="timeline-item">2024</div>
  <div class="skill-category">
    <div class="skill-bar"><div id="rust-bar" class="skill-fill" style="width: 90%"></div></div>
  </div>
</section>"#;
