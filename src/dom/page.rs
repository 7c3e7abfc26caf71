//! Server-rendered page parsing.

use std::collections::BTreeSet;

use scraper::{ElementRef, Html};
use tracing::debug;
use url::Url;

use super::markup::selector;
use super::{parse_style, DomRegistry, Element, ElementId};
use crate::error::Result;

/// Default name of the file part when the file input carries no `name`.
pub const DEFAULT_FILE_FIELD: &str = "file";
/// Name of the free-text field.
pub const TEXT_FIELD: &str = "text_input";

/// What the page's form declares about submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    /// Raw `action` attribute; empty means the page itself.
    pub action: String,
    /// Upper-cased method, `POST` unless declared otherwise.
    pub method: String,
    /// Name the text input submits under.
    pub text_field: String,
    /// Name the file input submits under.
    pub file_field: String,
    /// Other named fields and their markup values.
    pub fields: Vec<(String, String)>,
    /// Fields whose current value lives on a registry element.
    pub bindings: Vec<(String, ElementId)>,
}

impl Default for FormSpec {
    fn default() -> Self {
        Self {
            action: String::new(),
            method: "POST".to_string(),
            text_field: TEXT_FIELD.to_string(),
            file_field: DEFAULT_FILE_FIELD.to_string(),
            fields: Vec::new(),
            bindings: Vec::new(),
        }
    }
}

impl FormSpec {
    /// Registry element holding the live value of field `name`.
    pub fn binding(&self, name: &str) -> Option<ElementId> {
        self.bindings
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, id)| *id)
    }
}

/// A parsed page: its location, the elements present, and the raw markup
/// result cards are read from.
#[derive(Debug, Clone)]
pub struct Page {
    pub location: Option<Url>,
    pub dom: DomRegistry,
    pub form: FormSpec,
    /// Markup the server shipped. Result cards are parsed from this, never
    /// from rendered output.
    pub source: String,
}

impl Page {
    /// Parse a full HTML document.
    pub fn parse(html: &str, location: Option<Url>) -> Result<Self> {
        let document = Html::parse_document(html);
        let mut dom = DomRegistry::new();

        for id in ElementId::ALL {
            if let Some(found) = find_first(&document, id.selectors())? {
                dom.insert(id, element_state(id, found));
            }
        }

        let form = parse_form(&document)?;
        debug!(
            "Parsed page with {} known elements (action={:?})",
            ElementId::ALL.iter().filter(|id| dom.contains(**id)).count(),
            form.action
        );

        Ok(Self {
            location,
            dom,
            form,
            source: html.to_string(),
        })
    }
}

fn find_first<'a>(document: &'a Html, selectors: &[&str]) -> Result<Option<ElementRef<'a>>> {
    for css in selectors {
        let sel = selector(css)?;
        if let Some(found) = document.select(&sel).next() {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn element_state(id: ElementId, found: ElementRef<'_>) -> Element {
    let value = found.value();
    let classes: BTreeSet<String> = value.classes().map(str::to_string).collect();
    let style = value.attr("style").map(parse_style).unwrap_or_default();
    let attrs = value
        .attrs()
        .filter(|(name, _)| *name != "class" && *name != "style")
        .map(|(name, v)| (name.to_string(), v.to_string()))
        .collect();

    let mut element = Element::from_parts(classes, style, attrs, found.inner_html());
    match id {
        ElementId::TextInput => {
            let text: String = found.text().collect();
            element.set_value(text.clone());
            element.set_default_value(text);
        }
        ElementId::SortSelect | ElementId::FilterSelect => {
            let selected = selected_option(found);
            element.set_value(selected.clone());
            element.set_default_value(selected);
        }
        _ => {}
    }
    element
}

/// Value of a `<select>`: the `selected` option, else the first one.
fn selected_option(select: ElementRef<'_>) -> String {
    let Ok(options) = selector("option") else {
        return String::new();
    };
    let mut first = None;
    for option in select.select(&options) {
        let value = option
            .value()
            .attr("value")
            .map(str::to_string)
            .unwrap_or_else(|| option.text().collect::<String>().trim().to_string());
        if option.value().attr("selected").is_some() {
            return value;
        }
        first.get_or_insert(value);
    }
    first.unwrap_or_default()
}

fn parse_form(document: &Html) -> Result<FormSpec> {
    let mut spec = FormSpec::default();
    let Some(form) = document.select(&selector("form")?).next() else {
        return Ok(spec);
    };

    spec.action = form.value().attr("action").unwrap_or_default().to_string();
    if let Some(method) = form.value().attr("method").filter(|m| !m.is_empty()) {
        spec.method = method.to_ascii_uppercase();
    }

    for input in form.select(&selector("input[name]")?) {
        let name = input.value().attr("name").unwrap_or_default();
        let kind = input
            .value()
            .attr("type")
            .unwrap_or("text")
            .to_ascii_lowercase();
        match kind.as_str() {
            "file" => spec.file_field = name.to_string(),
            "submit" | "button" | "reset" | "image" => {}
            "checkbox" | "radio" if input.value().attr("checked").is_none() => {}
            _ => spec.fields.push((
                name.to_string(),
                input.value().attr("value").unwrap_or("on").to_string(),
            )),
        }
    }

    for select in form.select(&selector("select[name]")?) {
        let name = select.value().attr("name").unwrap_or_default();
        spec.fields.push((name.to_string(), selected_option(select)));
        if let Some(id) = tracked_control(select)? {
            spec.bindings.push((name.to_string(), id));
        }
    }

    if let Some(textarea) = form.select(&selector("textarea[name]")?).next() {
        if let Some(name) = textarea.value().attr("name") {
            spec.text_field = name.to_string();
        }
    }

    Ok(spec)
}

/// The value-tracking registry element this control resolves to, if any.
fn tracked_control(control: ElementRef<'_>) -> Result<Option<ElementId>> {
    for id in ElementId::VALUE_CONTROLS {
        for css in id.selectors() {
            if selector(css)?.matches(&control) {
                return Ok(Some(id));
            }
        }
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><body class="bg-white">
<form action="/analyze" method="post">
  <input type="hidden" name="mode" value="cases">
  <input type="file" id="file-input" name="pdf_file">
  <textarea name="text_input">  preset </textarea>
  <select id="sort-select" name="sort"><option value="similarity-desc">Best</option><option value="name-asc" selected>Name</option></select>
  <button type="submit" class="btn">Analyze</button>
</form>
<div id="results-container"></div>
<div class="main-container" style="margin-right: 160px"></div>
</body></html>"#;

    #[test]
    fn test_parse_resolves_present_elements() {
        let page = Page::parse(PAGE, None).unwrap();
        assert!(page.dom.contains(ElementId::Body));
        assert!(page.dom.contains(ElementId::ResultsContainer));
        assert!(page.dom.contains(ElementId::SubmitButton));
        assert!(!page.dom.contains(ElementId::CaseModal));
        assert!(!page.dom.contains(ElementId::ChatBody));

        let main = page.dom.get(ElementId::MainContainer).unwrap();
        assert_eq!(main.style("margin-right"), Some("160px"));
        assert!(page.dom.get(ElementId::Body).unwrap().has_class("bg-white"));
    }

    #[test]
    fn test_parse_reads_form_values() {
        let page = Page::parse(PAGE, None).unwrap();
        assert_eq!(page.dom.text_value(), "  preset ");
        assert_eq!(page.dom.get(ElementId::SortSelect).unwrap().value(), "name-asc");
        assert_eq!(page.form.action, "/analyze");
        assert_eq!(page.form.method, "POST");
        assert_eq!(page.form.file_field, "pdf_file");
        assert_eq!(page.form.text_field, "text_input");
        assert!(page
            .form
            .fields
            .contains(&("mode".to_string(), "cases".to_string())));
        assert!(page
            .form
            .fields
            .contains(&("sort".to_string(), "name-asc".to_string())));
        assert_eq!(page.form.binding("sort"), Some(ElementId::SortSelect));
        assert_eq!(page.form.binding("mode"), None);
    }

    #[test]
    fn test_parse_without_form_uses_defaults() {
        let page = Page::parse("<html><body></body></html>", None).unwrap();
        assert_eq!(page.form, FormSpec::default());
    }
}
