//! Result card parsing.

use scraper::{ElementRef, Html, Selector};

use crate::dom::markup::{parse_float_prefix, selector};
use crate::error::Result;
use crate::interaction::{ControlData, ElementRole};

pub const CARD_SELECTOR: &str = ".result-card";

/// Selectors used to read a result card, compiled once.
#[derive(Debug)]
pub struct CardSelectors {
    pub card: Selector,
    pub title: Selector,
    pub score: Selector,
    pub preview: Selector,
    pub any: Selector,
}

impl CardSelectors {
    pub fn new() -> Result<Self> {
        Ok(Self {
            card: selector(CARD_SELECTOR)?,
            title: selector("h4")?,
            score: selector(".similarity-fill")?,
            preview: selector(".case-preview-text")?,
            any: selector("*")?,
        })
    }
}

/// One result card as the server rendered it.
#[derive(Debug, Clone, PartialEq)]
pub struct CardNode {
    /// Outer markup of the card; every render clones from this.
    pub markup: String,
    pub title: String,
    pub score: f64,
    pub preview: String,
    /// First control of each role inside the card, in document order.
    pub controls: Vec<(ElementRole, ControlData)>,
}

impl CardNode {
    pub fn parse(card: ElementRef<'_>, selectors: &CardSelectors) -> Self {
        let title = card
            .select(&selectors.title)
            .next()
            .map(|h| h.text().collect::<String>().trim().to_string())
            .unwrap_or_default();
        let score = card
            .select(&selectors.score)
            .next()
            .and_then(|fill| fill.value().attr("data-score"))
            .and_then(parse_float_prefix)
            .unwrap_or(0.0);
        let preview = card
            .select(&selectors.preview)
            .next()
            .map(|p| p.text().collect::<String>())
            .unwrap_or_default();

        let mut controls: Vec<(ElementRole, ControlData)> = Vec::new();
        for element in card.select(&selectors.any) {
            if element.id() == card.id() {
                continue;
            }
            if let Some(role) = ElementRole::resolve(&element) {
                if !controls.iter().any(|(r, _)| *r == role) {
                    controls.push((role, ControlData::from_element(&element)));
                }
            }
        }

        Self {
            markup: card.html(),
            title,
            score,
            preview,
            controls,
        }
    }

    pub fn control(&self, role: ElementRole) -> Option<&ControlData> {
        self.controls
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, data)| data)
    }
}

/// Parse every result card in `markup`, in document order.
pub fn parse_cards(markup: &str, selectors: &CardSelectors) -> Vec<CardNode> {
    let document = Html::parse_document(markup);
    document
        .select(&selectors.card)
        .map(|card| CardNode::parse(card, selectors))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CARD: &str = r#"
<div class="result-card">
  <span class="rank-badge">#1</span>
  <h4 class="case-title" data-case="Alpha v. Beta"> Alpha v. Beta </h4>
  <div class="similarity-bar"><div class="similarity-fill" data-score="0.82"></div></div>
  <p class="case-preview-text">Alpha preview</p>
  <button class="view-details" data-case="Alpha (full)">View</button>
  <button class="view-details-btn">Second view</button>
  <button data-role="copy" data-preview="override">Copy</button>
</div>"#;

    #[test]
    fn test_parse_card_fields() {
        let selectors = CardSelectors::new().unwrap();
        let cards = parse_cards(CARD, &selectors);
        assert_eq!(cards.len(), 1);
        let card = &cards[0];
        assert_eq!(card.title, "Alpha v. Beta");
        assert_eq!(card.score, 0.82);
        assert_eq!(card.preview, "Alpha preview");
        assert!(card.markup.starts_with(r#"<div class="result-card">"#));
    }

    #[test]
    fn test_parse_card_keeps_first_control_per_role() {
        let selectors = CardSelectors::new().unwrap();
        let card = &parse_cards(CARD, &selectors)[0];
        assert_eq!(card.controls.len(), 3);
        let view = card.control(ElementRole::ViewDetails).unwrap();
        assert_eq!(view.data("case"), Some("Alpha (full)"));
        let copy = card.control(ElementRole::Copy).unwrap();
        assert_eq!(copy.text, "Copy");
        assert_eq!(copy.data("preview"), Some("override"));
        assert!(card.control(ElementRole::CaseTitle).is_some());
    }

    #[test]
    fn test_card_without_score_defaults_to_zero() {
        let selectors = CardSelectors::new().unwrap();
        let cards = parse_cards(
            r#"<div class="result-card"><div class="similarity-fill" data-score="n/a"></div></div>"#,
            &selectors,
        );
        assert_eq!(cards[0].score, 0.0);
        assert_eq!(cards[0].title, "");
    }
}
