//! Submission and reset helpers.

use reqwest::Method;
use scraper::Html;
use url::Url;

use crate::context::AppContext;
use crate::dom::markup::selector;
use crate::error::{Result, UiError};
use crate::transport::SubmitRequest;
use crate::upload::FileRef;

pub const EMPTY_SUBMIT_MESSAGE: &str = "Please provide text or upload a PDF.";
pub const SUBMIT_FAILED_MESSAGE: &str =
    "An error occurred while processing your request. Try again.";

/// Marker the server's markup must contain for a fragment swap.
pub const RESULTS_CONTAINER_MARKER: &str = r#"id="results-container""#;

/// The chat panel's single greeting after a reset.
pub const CHAT_GREETING: &str = r#"<div style="background: linear-gradient(135deg,#8B5CF6,#3B82F6); color:#fff; padding:10px 14px; border-radius:12px; margin-bottom:8px;">Hi! I’m your LexiMind Assistant. Ask me anything about your document.</div>"#;

/// Query parameter appended by a reset.
pub const RESET_PARAM: &str = "reset";

/// Where the form submits: its `action` resolved against the page, or the
/// page itself when no action is declared.
pub fn resolve_action(location: Option<&Url>, action: &str) -> Result<Url> {
    match location {
        Some(base) if action.trim().is_empty() => Ok(base.clone()),
        Some(base) => Ok(base.join(action.trim())?),
        None => Url::parse(action.trim()).map_err(|_| UiError::NoLocation),
    }
}

/// Assemble the multipart request for the current form state.
pub fn build_request(ctx: &AppContext, file: Option<&FileRef>) -> Result<SubmitRequest> {
    let url = resolve_action(ctx.location.as_ref(), &ctx.form.action)?;
    let method = Method::from_bytes(ctx.form.method.as_bytes()).unwrap_or(Method::POST);

    let mut fields: Vec<(String, String)> = ctx
        .form
        .fields
        .iter()
        .filter(|(name, _)| *name != ctx.form.text_field)
        .map(|(name, markup)| {
            let value = ctx
                .form
                .binding(name)
                .and_then(|id| ctx.dom.get(id))
                .map_or(markup.as_str(), |control| control.value());
            (name.clone(), value.to_string())
        })
        .collect();
    fields.push((ctx.form.text_field.clone(), ctx.dom.text_value().to_string()));

    Ok(SubmitRequest {
        url,
        method,
        fields,
        file: file.map(|f| (ctx.form.file_field.clone(), f.clone())),
    })
}

/// Inner markup of the response's results container, if it has one.
pub fn extract_results_fragment(body: &str) -> Option<String> {
    if !body.contains(RESULTS_CONTAINER_MARKER) {
        return None;
    }
    let document = Html::parse_document(body);
    let container = selector("#results-container").ok()?;
    document.select(&container).next().map(|el| el.inner_html())
}

/// Current path with a cache-busting `reset` stamp.
pub fn reset_location(location: &Url, stamp: i64) -> Url {
    let mut target = location.clone();
    target.set_query(Some(&format!("{}={}", RESET_PARAM, stamp)));
    target.set_fragment(None);
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{DomRegistry, Element, ElementId, FormSpec};

    #[test]
    fn test_resolve_action() {
        let page = Url::parse("http://localhost:5000/search?q=1").unwrap();
        assert_eq!(
            resolve_action(Some(&page), "").unwrap().as_str(),
            "http://localhost:5000/search?q=1"
        );
        assert_eq!(
            resolve_action(Some(&page), "/analyze").unwrap().as_str(),
            "http://localhost:5000/analyze"
        );
        assert!(matches!(
            resolve_action(None, "/analyze"),
            Err(UiError::NoLocation)
        ));
        assert!(resolve_action(None, "http://example.com/a").is_ok());
    }

    #[test]
    fn test_build_request_collects_fields_and_file() {
        let mut dom = DomRegistry::new();
        let mut text = Element::new();
        text.set_value("contract dispute");
        dom.insert(ElementId::TextInput, text);
        let form = FormSpec {
            action: "/analyze".to_string(),
            method: "PUT".to_string(),
            fields: vec![
                ("mode".to_string(), "cases".to_string()),
                ("text_input".to_string(), "stale".to_string()),
            ],
            ..FormSpec::default()
        };
        let ctx = AppContext::new(dom, form, Url::parse("http://localhost/").ok());
        let file = FileRef::in_memory("a.pdf", "application/pdf", vec![1, 2]);

        let request = build_request(&ctx, Some(&file)).unwrap();

        assert_eq!(request.url.as_str(), "http://localhost/analyze");
        assert_eq!(request.method, Method::PUT);
        assert_eq!(
            request.fields,
            vec![
                ("mode".to_string(), "cases".to_string()),
                ("text_input".to_string(), "contract dispute".to_string()),
            ]
        );
        let (field, sent) = request.file.unwrap();
        assert_eq!(field, "file");
        assert_eq!(sent.name, "a.pdf");
    }

    #[test]
    fn test_build_request_reads_bound_controls_live() {
        let mut dom = DomRegistry::new();
        let mut sort = Element::new();
        sort.set_default_value("similarity-desc");
        sort.set_value("name-asc");
        dom.insert(ElementId::SortSelect, sort);
        let form = FormSpec {
            fields: vec![
                ("sort".to_string(), "similarity-desc".to_string()),
                ("min".to_string(), "0".to_string()),
            ],
            bindings: vec![
                ("sort".to_string(), ElementId::SortSelect),
                ("min".to_string(), ElementId::FilterSelect),
            ],
            ..FormSpec::default()
        };
        let ctx = AppContext::new(dom, form, Url::parse("http://localhost/").ok());

        let request = build_request(&ctx, None).unwrap();

        // FilterSelect is absent from the registry, so its markup value stands.
        assert_eq!(
            request.fields,
            vec![
                ("sort".to_string(), "name-asc".to_string()),
                ("min".to_string(), "0".to_string()),
                ("text_input".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_extract_results_fragment() {
        let body = r#"<html><body><div id="results-container"><div class="result-card"><h4>X</h4></div></div></body></html>"#;
        assert_eq!(
            extract_results_fragment(body).as_deref(),
            Some(r#"<div class="result-card"><h4>X</h4></div>"#)
        );
        assert_eq!(extract_results_fragment("<html><body>done</body></html>"), None);
    }

    #[test]
    fn test_reset_location_replaces_query() {
        let page = Url::parse("http://localhost:5000/analyze?reset=1#top").unwrap();
        assert_eq!(
            reset_location(&page, 1700000000000).as_str(),
            "http://localhost:5000/analyze?reset=1700000000000"
        );
    }
}
