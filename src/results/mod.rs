//! Results pipeline: parse cards, sort, filter, render.
//!
//! The baseline list is captured once per initialization and never
//! mutated. The current view is a list of indices into it, so a filter or
//! sort can reorder or drop items but never introduce one.

pub mod card;
pub mod sort;

use std::time::Duration;

use tracing::{debug, info};

use crate::context::{AppContext, TimerAction};
use crate::dom::markup::clone_card;
use crate::dom::{DomRegistry, ElementId};
use crate::error::Result;
use crate::interaction::{ElementRole, Intent};
use crate::modal::{ModalPayload, COPIED_LABEL};

pub use card::{parse_cards, CardNode, CardSelectors};
pub use sort::{parse_threshold, SortOrder};

pub const CARD_COPY_FEEDBACK: Duration = Duration::from_millis(1400);

/// One search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultItem {
    pub node: CardNode,
    pub title: String,
    pub score: f64,
    /// 1-based position in document order.
    pub rank: usize,
}

/// A card clone placed in the results container.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard {
    pub html: String,
    /// 1-based position in the current view.
    pub rank: usize,
    pub bindings: Vec<(ElementRole, Intent)>,
    /// Text currently shown on the card's copy control.
    pub copy_label: Option<String>,
}

impl RenderedCard {
    pub fn intent(&self, role: ElementRole) -> Option<&Intent> {
        self.bindings
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, intent)| intent)
    }
}

#[derive(Debug)]
pub struct ResultsPipeline {
    selectors: CardSelectors,
    original: Vec<ResultItem>,
    current: Vec<usize>,
    rendered: Vec<RenderedCard>,
    generation: u64,
}

impl ResultsPipeline {
    pub fn new() -> Result<Self> {
        Ok(Self {
            selectors: CardSelectors::new()?,
            original: Vec::new(),
            current: Vec::new(),
            rendered: Vec::new(),
            generation: 0,
        })
    }

    /// Whether `markup` contains any result card.
    pub fn has_cards(&self, markup: &str) -> bool {
        !parse_cards(markup, &self.selectors).is_empty()
    }

    /// Rebuild the baseline from server markup and render all of it.
    pub fn initialize(&mut self, dom: &mut DomRegistry, markup: &str) {
        self.original = parse_cards(markup, &self.selectors)
            .into_iter()
            .enumerate()
            .map(|(index, node)| ResultItem {
                title: node.title.clone(),
                score: node.score,
                rank: index + 1,
                node,
            })
            .collect();
        self.current = (0..self.original.len()).collect();
        info!("Initialized {} results", self.original.len());

        dom.update(ElementId::ResultsControls, |controls| {
            controls.remove_class("hidden")
        });
        self.render(dom);
    }

    pub fn original(&self) -> &[ResultItem] {
        &self.original
    }

    /// Items in the current view, in display order.
    pub fn current(&self) -> impl Iterator<Item = &ResultItem> + '_ {
        self.current.iter().map(move |&i| &self.original[i])
    }

    pub fn current_len(&self) -> usize {
        self.current.len()
    }

    pub fn rendered(&self) -> &[RenderedCard] {
        &self.rendered
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Reorder the current view. Unknown criteria leave it untouched.
    pub fn sort(&mut self, criterion: &str) {
        let Some(order) = SortOrder::parse(criterion) else {
            return;
        };
        let original = &self.original;
        self.current
            .sort_by(|&a, &b| order.compare(&original[a], &original[b]));
    }

    /// Indices of baseline items scoring at least `min_score`, in
    /// baseline order. `None` and NaN mean no threshold.
    pub fn filter(&self, min_score: Option<f64>) -> Vec<usize> {
        let threshold = min_score.filter(|t| !t.is_nan()).unwrap_or(0.0);
        self.original
            .iter()
            .enumerate()
            .filter(|(_, item)| item.score >= threshold)
            .map(|(i, _)| i)
            .collect()
    }

    /// Replace the current view. Indices outside the baseline are dropped.
    pub fn set_current(&mut self, indices: Vec<usize>) {
        let len = self.original.len();
        self.current = indices.into_iter().filter(|&i| i < len).collect();
    }

    /// Sort control changed.
    pub fn apply_sort(&mut self, dom: &mut DomRegistry, value: &str) {
        dom.update(ElementId::SortSelect, |select| select.set_value(value));
        self.sort(value);
        self.render(dom);
    }

    /// Filter control changed: refilter from the baseline, then re-apply
    /// whatever sort is selected.
    pub fn apply_filter(&mut self, dom: &mut DomRegistry, value: &str) {
        dom.update(ElementId::FilterSelect, |select| select.set_value(value));
        let indices = self.filter(Some(parse_threshold(value)));
        self.set_current(indices);
        let criterion = dom
            .get(ElementId::SortSelect)
            .map(|select| select.value().to_string())
            .unwrap_or_default();
        self.sort(&criterion);
        self.render(dom);
    }

    /// Rebuild the results container from the current view.
    pub fn render(&mut self, dom: &mut DomRegistry) {
        if !dom.contains(ElementId::ResultsContainer) {
            return;
        }
        self.generation += 1;
        dom.update(ElementId::NoResults, |el| el.add_class("hidden"));

        self.rendered = self
            .current
            .iter()
            .enumerate()
            .map(|(position, &index)| render_card(&self.original[index], position + 1))
            .collect();

        let html: String = self.rendered.iter().map(|card| card.html.as_str()).collect();
        dom.update(ElementId::ResultsContainer, |container| {
            container.set_content(html)
        });
        if self.rendered.is_empty() {
            dom.update(ElementId::NoResults, |el| el.remove_class("hidden"));
        }

        let visible = self.current.len().to_string();
        let total = self.original.len().to_string();
        dom.update(ElementId::VisibleResults, |el| el.set_content(visible));
        dom.update(ElementId::TotalResults, |el| el.set_content(total));
        debug!(
            "Rendered {} of {} results (generation {})",
            self.current.len(),
            self.original.len(),
            self.generation
        );
    }

    /// Intent bound to a control in the card at `position`.
    pub fn intent(&self, position: usize, role: ElementRole) -> Option<&Intent> {
        self.rendered.get(position)?.intent(role)
    }

    /// Flash copy feedback on a card and schedule the revert.
    pub fn show_copy_feedback(&mut self, ctx: &mut AppContext, position: usize) {
        let generation = self.generation;
        let Some(card) = self.rendered.get_mut(position) else {
            return;
        };
        let Some(current) = card.copy_label.as_mut() else {
            return;
        };
        let label = std::mem::replace(current, COPIED_LABEL.to_string());
        ctx.timers.schedule(
            CARD_COPY_FEEDBACK,
            TimerAction::RestoreCardCopyLabel {
                generation,
                position,
                label,
            },
        );
    }

    /// Revert a card's copy label, unless it has since been re-rendered.
    pub fn restore_copy_label(&mut self, generation: u64, position: usize, label: String) {
        if generation != self.generation {
            return;
        }
        if let Some(card) = self.rendered.get_mut(position) {
            card.copy_label = Some(label);
        }
    }
}

fn render_card(item: &ResultItem, rank: usize) -> RenderedCard {
    let node = &item.node;
    let html = clone_card(&node.markup, &format!("#{}", rank));
    let mut bindings = Vec::new();

    if let Some(view) = node.control(ElementRole::ViewDetails) {
        let payload = ModalPayload {
            title: view.data("case").unwrap_or(&item.title).to_string(),
            score: view
                .data("score")
                .and_then(crate::dom::markup::parse_float_prefix)
                .unwrap_or(item.score),
            rank: rank.to_string(),
            preview: view.data("preview").unwrap_or(&node.preview).to_string(),
        };
        bindings.push((ElementRole::ViewDetails, Intent::OpenDetails(payload)));
    }

    let copy_label = node.control(ElementRole::Copy).map(|copy| {
        let text = copy.data("preview").unwrap_or(&node.preview).to_string();
        bindings.push((ElementRole::Copy, Intent::CopyText(text)));
        copy.text.clone()
    });

    if let Some(title) = node.control(ElementRole::CaseTitle) {
        bindings.push((
            ElementRole::CaseTitle,
            Intent::OpenDetails(title.delegated_payload(ElementRole::CaseTitle)),
        ));
    }

    RenderedCard {
        html,
        rank,
        bindings,
        copy_label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    fn card(title: &str, score: &str) -> String {
        format!(
            r#"<div class="result-card"><span class="rank-badge">#0</span><h4>{}</h4><div class="similarity-fill" data-score="{}"></div><p class="case-preview-text">{} text</p><button class="view-details">View</button><button class="copy-text">Copy</button></div>"#,
            title, score, title
        )
    }

    fn page(cards: &[(&str, &str)]) -> String {
        let body: String = cards.iter().map(|(t, s)| card(t, s)).collect();
        format!(
            r#"<html><body><div id="results-container">{}</div></body></html>"#,
            body
        )
    }

    fn results_dom() -> DomRegistry {
        let mut dom = DomRegistry::new();
        for id in [
            ElementId::ResultsContainer,
            ElementId::ResultsControls,
            ElementId::NoResults,
            ElementId::VisibleResults,
            ElementId::TotalResults,
            ElementId::SortSelect,
        ] {
            dom.insert(id, Element::new());
        }
        dom.update(ElementId::ResultsControls, |c| c.add_class("hidden"));
        dom.update(ElementId::NoResults, |c| c.add_class("hidden"));
        dom
    }

    fn scores(pipeline: &ResultsPipeline) -> Vec<f64> {
        pipeline.current().map(|item| item.score).collect()
    }

    #[test]
    fn test_initialize_builds_ranked_baseline() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(&mut dom, &page(&[("A", "0.9"), ("B", "0.3"), ("C", "0.6")]));

        let ranks: Vec<usize> = pipeline.original().iter().map(|i| i.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(scores(&pipeline), vec![0.9, 0.3, 0.6]);
        assert!(!dom.get(ElementId::ResultsControls).unwrap().has_class("hidden"));
        assert_eq!(dom.get(ElementId::VisibleResults).unwrap().content(), "3");
        assert_eq!(dom.get(ElementId::TotalResults).unwrap().content(), "3");
    }

    #[test]
    fn test_filter_then_sort_scenario() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(&mut dom, &page(&[("A", "0.9"), ("B", "0.3"), ("C", "0.6")]));

        let kept = pipeline.filter(Some(0.5));
        pipeline.set_current(kept);
        assert_eq!(scores(&pipeline), vec![0.9, 0.6]);

        pipeline.sort("similarity-desc");
        pipeline.render(&mut dom);
        assert_eq!(scores(&pipeline), vec![0.9, 0.6]);
        let ranks: Vec<usize> = pipeline.rendered().iter().map(|c| c.rank).collect();
        assert_eq!(ranks, vec![1, 2]);
        assert!(pipeline.rendered()[1].html.contains(r#"<span class="rank-badge">#2</span>"#));
        assert!(pipeline.rendered()[1].html.contains("width: 60%"));
        assert_eq!(dom.get(ElementId::VisibleResults).unwrap().content(), "2");
        assert_eq!(dom.get(ElementId::TotalResults).unwrap().content(), "3");
    }

    #[test]
    fn test_filter_preserves_baseline_order_for_every_threshold() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(
            &mut dom,
            &page(&[("A", "0.2"), ("B", "0.8"), ("C", "0.5"), ("D", "0.5"), ("E", "1")]),
        );
        pipeline.sort("name-desc");

        for step in 0..=12 {
            let t = step as f64 / 10.0;
            let kept = pipeline.filter(Some(t));
            let expected: Vec<usize> = pipeline
                .original()
                .iter()
                .enumerate()
                .filter(|(_, item)| item.score >= t)
                .map(|(i, _)| i)
                .collect();
            assert_eq!(kept, expected, "threshold {}", t);
        }
        assert_eq!(pipeline.filter(None).len(), 5);
        assert_eq!(pipeline.filter(Some(f64::NAN)).len(), 5);
    }

    #[test]
    fn test_sort_desc_then_asc_reverses() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(&mut dom, &page(&[("A", "0.4"), ("B", "0.9"), ("C", "0.1")]));

        pipeline.sort("similarity-desc");
        let desc = scores(&pipeline);
        pipeline.sort("similarity-asc");
        let mut asc = scores(&pipeline);
        asc.reverse();
        assert_eq!(desc, asc);
        assert_eq!(desc, vec![0.9, 0.4, 0.1]);
    }

    #[test]
    fn test_sort_by_name_and_unknown_criterion() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(
            &mut dom,
            &page(&[("delta", "0.1"), ("Alpha", "0.2"), ("charlie", "0.3")]),
        );

        pipeline.sort("relevance");
        let titles: Vec<&str> = pipeline.current().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["delta", "Alpha", "charlie"]);

        pipeline.sort("name-asc");
        let titles: Vec<&str> = pipeline.current().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Alpha", "charlie", "delta"]);

        pipeline.sort("name-desc");
        let titles: Vec<&str> = pipeline.current().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["delta", "charlie", "Alpha"]);
    }

    #[test]
    fn test_empty_view_shows_placeholder() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(&mut dom, &page(&[("A", "0.2")]));
        assert!(dom.get(ElementId::NoResults).unwrap().has_class("hidden"));

        pipeline.apply_filter(&mut dom, "0.5");

        assert!(pipeline.rendered().is_empty());
        assert_eq!(dom.get(ElementId::ResultsContainer).unwrap().content(), "");
        assert!(!dom.get(ElementId::NoResults).unwrap().has_class("hidden"));
        assert_eq!(dom.get(ElementId::VisibleResults).unwrap().content(), "0");
    }

    #[test]
    fn test_apply_filter_reapplies_selected_sort() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(&mut dom, &page(&[("A", "0.6"), ("B", "0.3"), ("C", "0.9")]));
        pipeline.apply_sort(&mut dom, "similarity-desc");

        pipeline.apply_filter(&mut dom, "0.5");

        assert_eq!(scores(&pipeline), vec![0.9, 0.6]);
    }

    #[test]
    fn test_render_binds_card_intents() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(&mut dom, &page(&[("A", "0.25"), ("B", "0.75")]));
        pipeline.sort("similarity-desc");
        pipeline.render(&mut dom);

        match pipeline.intent(0, ElementRole::ViewDetails) {
            Some(Intent::OpenDetails(payload)) => {
                assert_eq!(payload.title, "B");
                assert_eq!(payload.score, 0.75);
                assert_eq!(payload.rank, "1");
                assert_eq!(payload.preview, "B text");
            }
            other => panic!("unexpected intent {:?}", other),
        }
        assert_eq!(
            pipeline.intent(1, ElementRole::Copy),
            Some(&Intent::CopyText("A text".to_string()))
        );
        assert!(pipeline.intent(2, ElementRole::Copy).is_none());
    }

    #[test]
    fn test_stale_copy_label_restore_is_ignored() {
        let mut dom = results_dom();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(&mut dom, &page(&[("A", "0.25")]));
        let generation = pipeline.generation();
        pipeline.render(&mut dom);

        pipeline.restore_copy_label(generation, 0, "stale".to_string());
        assert_eq!(pipeline.rendered()[0].copy_label.as_deref(), Some("Copy"));
    }

    #[test]
    fn test_render_without_container_is_noop() {
        let mut dom = DomRegistry::new();
        let mut pipeline = ResultsPipeline::new().unwrap();
        pipeline.initialize(&mut dom, &page(&[("A", "0.25")]));
        assert_eq!(pipeline.original().len(), 1);
        assert!(pipeline.rendered().is_empty());
    }
}
