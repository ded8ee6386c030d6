//! Host services the widgets reach through the [`Page`](crate::page::Page):
//! preference storage, clipboard, timers, the form transport and its TLS
//! connector.

pub mod clipboard;
pub mod storage;
pub mod timers;
pub mod tls;
pub mod transport;

pub use clipboard::{Clipboard, MemoryClipboard, UnavailableClipboard};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use timers::{TimerId, Timers};
#[cfg(feature = "tls-rustls")]
pub use tls::RustlsConnector;
pub use tls::{Connection, TlsConnector};
pub use transport::{FormSubmission, FormTransport, HttpTransport, RecordingTransport};
