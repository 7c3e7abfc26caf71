//! LexiMind: a headless controller for the LexiMind document-search page.
//!
//! The server renders the page; this crate parses it, keeps a typed model of
//! the elements it drives, and reacts to [`UiEvent`]s from a host. Anything
//! the host has to do on its behalf comes back as an [`Effect`].

pub mod app;
pub mod config;
pub mod context;
pub mod dom;
pub mod error;
pub mod interaction;
pub mod modal;
pub mod results;
pub mod shell;
pub mod storage;
pub mod transport;
pub mod upload;

pub use app::{App, AppOptions, SubmitOutcome};
pub use config::{Config, Settings};
pub use context::{AppContext, Effect, InputExclusivity, Navigation};
pub use dom::{ElementId, Page};
pub use error::{Result, UiError};
pub use interaction::{ClickTarget, ElementRole, UiEvent};
pub use transport::{HttpTransport, Transport};
