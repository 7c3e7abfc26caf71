//! Application context shared by every controller.
//!
//! Controllers receive `&mut AppContext` instead of reaching into globals.
//! The context owns the element registry, the timer queue, the outbox of
//! effects for the host, and the environment capabilities.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::dom::{DomRegistry, ElementId, FormSpec};
use crate::error::{Result, UiError};
use crate::storage::{LocalStore, MemoryStore};

/// Something the host must carry out on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Blocking user-facing message.
    Alert(String),
    Navigate(Navigation),
    /// Clipboard unavailable: present this text for manual selection.
    ManualCopy(String),
    /// Open the native file picker bound to the file input.
    OpenFilePicker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Reload the current location.
    Reload,
    To(Url),
}

/// Deferred work scheduled by a controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerAction {
    /// Put a card's copy label back. Ignored if the card was re-rendered.
    RestoreCardCopyLabel {
        generation: u64,
        position: usize,
        label: String,
    },
    /// Put the modal copy button's markup back.
    RestoreModalCopyLabel { label: String },
}

/// Fire-and-forget timers keyed by deadline.
#[derive(Debug, Default)]
pub struct TimerQueue {
    pending: Vec<(Instant, TimerAction)>,
}

impl TimerQueue {
    pub fn schedule(&mut self, after: Duration, action: TimerAction) {
        self.schedule_at(Instant::now() + after, action);
    }

    pub fn schedule_at(&mut self, deadline: Instant, action: TimerAction) {
        self.pending.push((deadline, action));
    }

    /// Remove and return every action due at `now`, earliest first.
    pub fn due(&mut self, now: Instant) -> Vec<TimerAction> {
        let mut due: Vec<(Instant, TimerAction)> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].0 <= now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|(deadline, _)| *deadline);
        due.into_iter().map(|(_, action)| action).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// System clipboard access.
pub trait Clipboard: Send {
    fn write_text(&mut self, text: &str) -> Result<()>;
}

/// Clipboard kept in memory; clones share the same contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Arc<Mutex<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| UiError::Clipboard(e.to_string()))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

/// Clipboard backed by the operating system.
#[cfg(feature = "system-clipboard")]
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

#[cfg(feature = "system-clipboard")]
impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let inner = arboard::Clipboard::new().map_err(|e| UiError::Clipboard(e.to_string()))?;
        Ok(Self { inner })
    }
}

#[cfg(feature = "system-clipboard")]
impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<()> {
        self.inner
            .set_text(text.to_string())
            .map_err(|e| UiError::Clipboard(e.to_string()))
    }
}

/// What the hosting environment can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether a dropped file can be written into the file input.
    pub file_list_assignment: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            file_list_assignment: true,
        }
    }
}

/// How the text input and the file selection exclude each other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InputExclusivity {
    /// Choosing a file clears the text, and typing text drops the file.
    #[default]
    TwoWay,
    /// Choosing a file clears the text; typing leaves the file alone.
    FileClearsText,
}

impl std::str::FromStr for InputExclusivity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "two-way" => Ok(Self::TwoWay),
            "file-clears-text" => Ok(Self::FileClearsText),
            other => Err(format!("unknown input exclusivity: {}", other)),
        }
    }
}

/// Shared state handed to every controller.
pub struct AppContext {
    pub dom: DomRegistry,
    pub form: FormSpec,
    pub location: Option<Url>,
    pub timers: TimerQueue,
    pub clipboard: Option<Box<dyn Clipboard>>,
    pub store: Box<dyn LocalStore>,
    pub capabilities: Capabilities,
    pub exclusivity: InputExclusivity,
    effects: Vec<Effect>,
}

impl AppContext {
    pub fn new(dom: DomRegistry, form: FormSpec, location: Option<Url>) -> Self {
        Self {
            dom,
            form,
            location,
            timers: TimerQueue::default(),
            clipboard: None,
            store: Box::new(MemoryStore::new()),
            capabilities: Capabilities::default(),
            exclusivity: InputExclusivity::default(),
            effects: Vec::new(),
        }
    }

    pub fn emit(&mut self, effect: Effect) {
        debug!("Effect: {:?}", effect);
        self.effects.push(effect);
    }

    pub fn alert(&mut self, message: &str) {
        self.emit(Effect::Alert(message.to_string()));
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Whether the form has something to submit.
    pub fn can_submit(&self, file_selected: bool) -> bool {
        !self.dom.text_value().trim().is_empty() || file_selected
    }

    /// Enable or disable the submit button from the can-submit predicate.
    pub fn refresh_submit_button(&mut self, file_selected: bool) {
        let enabled = self.can_submit(file_selected);
        self.dom.update(ElementId::SubmitButton, |button| {
            if enabled {
                button.remove_attr("disabled");
                button.remove_class("bg-gray-400");
                button.remove_class("cursor-not-allowed");
                button.set_style("opacity", "");
            } else {
                button.set_attr("disabled", "true");
                button.add_class("bg-gray-400");
                button.add_class("cursor-not-allowed");
                button.set_style("opacity", "0.6");
            }
        });
    }
}
