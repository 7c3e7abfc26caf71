//! Typed interaction model.
//!
//! Interactive controls declare what they do through a `data-role`
//! attribute. Older markup that only carries the legacy class names still
//! resolves to the same roles.

use std::collections::BTreeMap;

use scraper::ElementRef;

use crate::dom::markup::parse_float_prefix;
use crate::dom::ElementId;
use crate::modal::ModalPayload;
use crate::upload::FileRef;

pub const ROLE_ATTR: &str = "data-role";

/// What an interactive control is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementRole {
    ViewDetails,
    Copy,
    CaseTitle,
}

impl ElementRole {
    pub fn from_attr(value: &str) -> Option<Self> {
        match value.trim() {
            "view-details" => Some(Self::ViewDetails),
            "copy" => Some(Self::Copy),
            "case-title" => Some(Self::CaseTitle),
            _ => None,
        }
    }

    fn from_class(class: &str) -> Option<Self> {
        match class {
            "view-details" | "view-details-btn" => Some(Self::ViewDetails),
            "copy-text" => Some(Self::Copy),
            "case-title" => Some(Self::CaseTitle),
            _ => None,
        }
    }

    /// Role of a parsed element. An explicit `data-role` wins over classes.
    pub fn resolve(element: &ElementRef<'_>) -> Option<Self> {
        let value = element.value();
        if let Some(role) = value.attr(ROLE_ATTR) {
            return Self::from_attr(role);
        }
        value.classes().find_map(Self::from_class)
    }
}

/// Dataset and text of an interactive control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlData {
    /// `data-*` attributes with the prefix stripped.
    pub dataset: BTreeMap<String, String>,
    /// Trimmed text content.
    pub text: String,
}

impl ControlData {
    pub fn from_element(element: &ElementRef<'_>) -> Self {
        let dataset = element
            .value()
            .attrs()
            .filter_map(|(name, value)| {
                name.strip_prefix("data-")
                    .map(|key| (key.to_string(), value.to_string()))
            })
            .collect();
        let text = element.text().collect::<String>().trim().to_string();
        Self { dataset, text }
    }

    /// A non-empty `data-<key>` value.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.dataset
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    /// Modal payload built only from this control's own attributes.
    pub fn delegated_payload(&self, role: ElementRole) -> ModalPayload {
        let (title, preview_key) = match role {
            ElementRole::CaseTitle => (
                self.data("case").unwrap_or(&self.text).to_string(),
                "content",
            ),
            _ => (self.data("case").unwrap_or_default().to_string(), "preview"),
        };
        ModalPayload {
            title,
            score: self
                .data("score")
                .and_then(parse_float_prefix)
                .unwrap_or(0.0),
            rank: self.data("rank").unwrap_or("-").to_string(),
            preview: self.data(preview_key).unwrap_or_default().to_string(),
        }
    }
}

/// Action bound to a rendered control.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    OpenDetails(ModalPayload),
    CopyText(String),
}

/// What a click landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickTarget {
    /// A page-level element.
    Element(ElementId),
    /// A control inside the rendered card at `position` (0-based).
    Card { position: usize, role: ElementRole },
    /// A role-bearing control outside the results list.
    Control { role: ElementRole, data: ControlData },
    /// Inside the modal dialog but not on a control.
    ModalContent,
}

/// Input events a host feeds into the app.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    Click(ClickTarget),
    KeyDown(String),
    /// New value of the text input.
    TextInput(String),
    FileChosen(FileRef),
    FilesDropped(Vec<FileRef>),
    DragOver,
    DragLeave,
    SortChanged(String),
    FilterChanged(String),
}
