//! Page element registry.
//!
//! The controller never holds a live browser DOM. It holds a typed model of
//! the handful of elements it drives, resolved once from server markup. Any
//! element may be missing on a given page variant, so every lookup returns
//! an `Option` and callers skip behavior silently when it is `None`.

pub mod markup;
pub mod page;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::upload::FileRef;

pub use page::{FormSpec, Page};

/// Elements the controller knows how to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementId {
    Body,
    Form,
    TextInput,
    SubmitButton,
    ThemeToggle,
    UploadZone,
    FileInput,
    FilePreview,
    FileName,
    FileSize,
    RemoveFile,
    CaseModal,
    ModalClose,
    ModalCloseBottom,
    ModalCopy,
    ModalCaseTitle,
    ModalSimilarity,
    ModalRank,
    ModalCaseContent,
    LoadingOverlay,
    LoadingSkeletons,
    HandLoading,
    ResultsControls,
    ResultsContainer,
    SortSelect,
    FilterSelect,
    VisibleResults,
    TotalResults,
    NoResults,
    Sidebar,
    SidebarToggle,
    ChatbotToggle,
    ChatbotPanel,
    ChatbotClose,
    ChatBody,
    ForceReset,
    MainContainer,
    CategoryResult,
    SearchResults,
}

impl ElementId {
    pub const ALL: [ElementId; 39] = [
        ElementId::Body,
        ElementId::Form,
        ElementId::TextInput,
        ElementId::SubmitButton,
        ElementId::ThemeToggle,
        ElementId::UploadZone,
        ElementId::FileInput,
        ElementId::FilePreview,
        ElementId::FileName,
        ElementId::FileSize,
        ElementId::RemoveFile,
        ElementId::CaseModal,
        ElementId::ModalClose,
        ElementId::ModalCloseBottom,
        ElementId::ModalCopy,
        ElementId::ModalCaseTitle,
        ElementId::ModalSimilarity,
        ElementId::ModalRank,
        ElementId::ModalCaseContent,
        ElementId::LoadingOverlay,
        ElementId::LoadingSkeletons,
        ElementId::HandLoading,
        ElementId::ResultsControls,
        ElementId::ResultsContainer,
        ElementId::SortSelect,
        ElementId::FilterSelect,
        ElementId::VisibleResults,
        ElementId::TotalResults,
        ElementId::NoResults,
        ElementId::Sidebar,
        ElementId::SidebarToggle,
        ElementId::ChatbotToggle,
        ElementId::ChatbotPanel,
        ElementId::ChatbotClose,
        ElementId::ChatBody,
        ElementId::ForceReset,
        ElementId::MainContainer,
        ElementId::CategoryResult,
        ElementId::SearchResults,
    ];

    /// Form controls whose current value the registry tracks.
    pub const VALUE_CONTROLS: [ElementId; 3] = [
        ElementId::TextInput,
        ElementId::SortSelect,
        ElementId::FilterSelect,
    ];

    /// Selectors tried in order; the first one that matches wins.
    pub fn selectors(self) -> &'static [&'static str] {
        match self {
            ElementId::Body => &["body"],
            ElementId::Form => &["form"],
            ElementId::TextInput => &[r#"textarea[name="text_input"]"#],
            ElementId::SubmitButton => &[r#"button[type="submit"]"#],
            ElementId::ThemeToggle => &["#theme-toggle"],
            ElementId::UploadZone => &["#upload-zone"],
            ElementId::FileInput => &["#file-input"],
            ElementId::FilePreview => &["#file-preview"],
            ElementId::FileName => &["#file-name"],
            ElementId::FileSize => &["#file-size"],
            ElementId::RemoveFile => &["#remove-file"],
            ElementId::CaseModal => &["#case-modal"],
            ElementId::ModalClose => &["#modal-close"],
            ElementId::ModalCloseBottom => &["#modal-close-bottom"],
            ElementId::ModalCopy => &["#modal-copy"],
            ElementId::ModalCaseTitle => &["#modal-case-title"],
            ElementId::ModalSimilarity => &["#modal-similarity"],
            ElementId::ModalRank => &["#modal-rank"],
            ElementId::ModalCaseContent => &["#modal-case-content"],
            ElementId::LoadingOverlay => &["#loading-overlay"],
            ElementId::LoadingSkeletons => &["#loading-skeletons"],
            ElementId::HandLoading => &["#hand-loading"],
            ElementId::ResultsControls => &["#results-controls"],
            ElementId::ResultsContainer => &["#results-container"],
            ElementId::SortSelect => &["#sort-select"],
            ElementId::FilterSelect => &["#filter-select"],
            ElementId::VisibleResults => &["#visible-results"],
            ElementId::TotalResults => &["#total-results-2"],
            ElementId::NoResults => &["#no-results"],
            ElementId::Sidebar => &["#right-sidebar"],
            ElementId::SidebarToggle => &["#sidebar-toggle-btn"],
            ElementId::ChatbotToggle => &["#chatbot-toggle-btn"],
            ElementId::ChatbotPanel => &["#chatbot-panel"],
            ElementId::ChatbotClose => &["#chatbot-close-btn"],
            ElementId::ChatBody => &["#chat-body", "#chat-messages"],
            ElementId::ForceReset => &["#force-reset-btn"],
            ElementId::MainContainer => &[
                ".main-container",
                r#"div[style*="max-width: 1200px"]"#,
            ],
            ElementId::CategoryResult => &["#category-result"],
            ElementId::SearchResults => &["#search-results"],
        }
    }
}

/// Controller-side state of one page element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    classes: BTreeSet<String>,
    style: BTreeMap<String, String>,
    attrs: BTreeMap<String, String>,
    /// Inner markup or text content, whichever was last written.
    content: String,
    /// Form control value (textarea text, select value).
    value: String,
    /// Value restored by a form reset.
    default_value: String,
    /// Files held by a file input.
    files: Vec<FileRef>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    pub fn add_class(&mut self, class: &str) {
        self.classes.insert(class.to_string());
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.remove(class);
    }

    /// Flip a class, returning whether it is now present.
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.classes.remove(class) {
            false
        } else {
            self.classes.insert(class.to_string());
            true
        }
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    /// Set an inline style property. An empty value removes it.
    pub fn set_style(&mut self, property: &str, value: &str) {
        if value.is_empty() {
            self.style.remove(property);
        } else {
            self.style.insert(property.to_string(), value.to_string());
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        self.attrs.insert(name.to_string(), value.to_string());
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.remove(name);
    }

    pub fn is_disabled(&self) -> bool {
        self.attrs.contains_key("disabled")
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn set_default_value(&mut self, value: impl Into<String>) {
        self.default_value = value.into();
    }

    /// Restore the value the markup shipped with.
    pub fn reset_value(&mut self) {
        self.value = self.default_value.clone();
    }

    pub fn files(&self) -> &[FileRef] {
        &self.files
    }

    pub fn set_files(&mut self, files: Vec<FileRef>) {
        self.files = files;
    }

    /// Clear a file input, mirroring `input.value = ''`.
    pub fn clear_files(&mut self) {
        self.files.clear();
        self.value.clear();
    }

    pub(crate) fn from_parts(
        classes: BTreeSet<String>,
        style: BTreeMap<String, String>,
        attrs: BTreeMap<String, String>,
        content: String,
    ) -> Self {
        Self {
            classes,
            style,
            attrs,
            content,
            ..Default::default()
        }
    }
}

/// Registry of the elements present on the current page.
#[derive(Debug, Clone, Default)]
pub struct DomRegistry {
    elements: HashMap<ElementId, Element>,
}

impl DomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ElementId, element: Element) {
        self.elements.insert(id, element);
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.contains_key(&id)
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.get_mut(&id)
    }

    /// Run `f` against an element if the page has it.
    pub fn update(&mut self, id: ElementId, f: impl FnOnce(&mut Element)) -> bool {
        match self.elements.get_mut(&id) {
            Some(element) => {
                f(element);
                true
            }
            None => false,
        }
    }

    pub fn text_value(&self) -> &str {
        self.get(ElementId::TextInput)
            .map(Element::value)
            .unwrap_or("")
    }

    /// Restore every tracked control to its markup value.
    pub fn reset_values(&mut self) {
        for id in ElementId::VALUE_CONTROLS {
            self.update(id, Element::reset_value);
        }
    }
}

/// Parse an inline `style` attribute into property/value pairs.
pub fn parse_style(style: &str) -> BTreeMap<String, String> {
    style
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            let value = value.trim();
            if property.is_empty() {
                return None;
            }
            Some((property.to_ascii_lowercase(), value.to_string()))
        })
        .collect()
}
