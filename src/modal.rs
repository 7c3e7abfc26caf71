//! Detail overlay for a single result.

use std::time::Duration;

use tracing::{debug, warn};

use crate::context::{AppContext, Effect, TimerAction};
use crate::dom::ElementId;

pub const COPIED_LABEL: &str = "✅ Copied!";
pub const MODAL_COPY_FEEDBACK: Duration = Duration::from_millis(1500);

/// Data shown in the modal.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalPayload {
    pub title: String,
    /// Similarity in `[0, 1]`.
    pub score: f64,
    /// Rank label without the leading `#`; `-` when unknown.
    pub rank: String,
    pub preview: String,
}

impl Default for ModalPayload {
    fn default() -> Self {
        Self {
            title: "Unknown".to_string(),
            score: 0.0,
            rank: "-".to_string(),
            preview: String::new(),
        }
    }
}

/// Similarity as shown in the modal: `score * 100` with one decimal.
pub fn format_similarity(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

#[derive(Debug, Default)]
pub struct ModalController {
    current: Option<ModalPayload>,
}

impl ModalController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload currently on screen.
    pub fn current(&self) -> Option<&ModalPayload> {
        self.current.as_ref()
    }

    pub fn is_open(&self, ctx: &AppContext) -> bool {
        ctx.dom
            .get(ElementId::CaseModal)
            .is_some_and(|modal| modal.has_class("show"))
    }

    pub fn open(&mut self, ctx: &mut AppContext, payload: ModalPayload) {
        let ready = [
            ElementId::CaseModal,
            ElementId::ModalCaseTitle,
            ElementId::ModalCaseContent,
        ]
        .iter()
        .all(|id| ctx.dom.contains(*id));
        if !ready {
            debug!("Modal markup missing, ignoring open for {}", payload.title);
            return;
        }

        ctx.dom
            .update(ElementId::ModalCaseTitle, |el| el.set_content(payload.title.clone()));
        ctx.dom.update(ElementId::ModalSimilarity, |el| {
            el.set_content(format_similarity(payload.score))
        });
        ctx.dom
            .update(ElementId::ModalRank, |el| el.set_content(format!("#{}", payload.rank)));
        ctx.dom.update(ElementId::ModalCaseContent, |el| {
            el.set_content(payload.preview.clone())
        });
        ctx.dom.update(ElementId::CaseModal, |modal| {
            modal.remove_class("hidden");
            modal.add_class("show");
        });
        ctx.dom
            .update(ElementId::Body, |body| body.set_style("overflow", "hidden"));
        self.current = Some(payload);
    }

    pub fn close(&mut self, ctx: &mut AppContext) {
        let closed = ctx.dom.update(ElementId::CaseModal, |modal| {
            modal.add_class("hidden");
            modal.remove_class("show");
        });
        if closed {
            ctx.dom
                .update(ElementId::Body, |body| body.set_style("overflow", ""));
            self.current = None;
        }
    }

    /// Escape closes the modal only while it is showing.
    pub fn key_down(&mut self, ctx: &mut AppContext, key: &str) {
        if key == "Escape" && self.is_open(ctx) {
            self.close(ctx);
        }
    }

    /// Copy the modal's preview text and flash feedback on the button.
    pub fn copy(&self, ctx: &mut AppContext) {
        if !ctx.dom.contains(ElementId::ModalCopy) {
            return;
        }
        let Some(text) = ctx
            .dom
            .get(ElementId::ModalCaseContent)
            .map(|el| el.content().to_string())
        else {
            return;
        };

        match ctx.clipboard.as_mut() {
            Some(clipboard) => {
                if let Err(e) = clipboard.write_text(&text) {
                    warn!("Clipboard error: {}", e);
                }
            }
            None => ctx.emit(Effect::ManualCopy(text)),
        }

        let mut original = String::new();
        ctx.dom.update(ElementId::ModalCopy, |button| {
            original = button.content().to_string();
            button.set_content(COPIED_LABEL);
        });
        ctx.timers.schedule(
            MODAL_COPY_FEEDBACK,
            TimerAction::RestoreModalCopyLabel { label: original },
        );
    }

    pub fn restore_copy_label(&self, ctx: &mut AppContext, label: String) {
        ctx.dom.update(ElementId::ModalCopy, |button| button.set_content(label));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::MemoryClipboard;
    use crate::dom::{DomRegistry, Element, FormSpec};

    fn modal_page() -> AppContext {
        let mut dom = DomRegistry::new();
        for id in [
            ElementId::Body,
            ElementId::CaseModal,
            ElementId::ModalCaseTitle,
            ElementId::ModalSimilarity,
            ElementId::ModalRank,
            ElementId::ModalCaseContent,
            ElementId::ModalCopy,
        ] {
            dom.insert(id, Element::new());
        }
        dom.update(ElementId::CaseModal, |m| m.add_class("hidden"));
        dom.update(ElementId::ModalCopy, |b| b.set_content("Copy"));
        AppContext::new(dom, FormSpec::default(), None)
    }

    fn payload() -> ModalPayload {
        ModalPayload {
            title: "Smith v. Jones".to_string(),
            score: 0.8766,
            rank: "3".to_string(),
            preview: "The court held...".to_string(),
        }
    }

    #[test]
    fn test_open_populates_and_locks_scroll() {
        let mut ctx = modal_page();
        let mut modal = ModalController::new();
        modal.open(&mut ctx, payload());

        assert!(modal.is_open(&ctx));
        assert_eq!(ctx.dom.get(ElementId::ModalCaseTitle).unwrap().content(), "Smith v. Jones");
        assert_eq!(ctx.dom.get(ElementId::ModalSimilarity).unwrap().content(), "87.7%");
        assert_eq!(ctx.dom.get(ElementId::ModalRank).unwrap().content(), "#3");
        assert!(!ctx.dom.get(ElementId::CaseModal).unwrap().has_class("hidden"));
        assert_eq!(
            ctx.dom.get(ElementId::Body).unwrap().style("overflow"),
            Some("hidden")
        );

        modal.close(&mut ctx);
        assert!(!modal.is_open(&ctx));
        assert_eq!(ctx.dom.get(ElementId::Body).unwrap().style("overflow"), None);
    }

    #[test]
    fn test_escape_only_closes_open_modal() {
        let mut ctx = modal_page();
        let mut modal = ModalController::new();
        modal.key_down(&mut ctx, "Escape");
        assert!(ctx.dom.get(ElementId::CaseModal).unwrap().has_class("hidden"));

        modal.open(&mut ctx, payload());
        modal.key_down(&mut ctx, "Enter");
        assert!(modal.is_open(&ctx));
        modal.key_down(&mut ctx, "Escape");
        assert!(!modal.is_open(&ctx));
    }

    #[test]
    fn test_open_without_markup_is_ignored() {
        let mut ctx = AppContext::new(DomRegistry::new(), FormSpec::default(), None);
        let mut modal = ModalController::new();
        modal.open(&mut ctx, payload());
        assert!(modal.current().is_none());
    }

    #[test]
    fn test_copy_uses_clipboard_and_schedules_revert() {
        let mut ctx = modal_page();
        let clipboard = MemoryClipboard::new();
        ctx.clipboard = Some(Box::new(clipboard.clone()));
        let mut modal = ModalController::new();
        modal.open(&mut ctx, payload());

        modal.copy(&mut ctx);

        assert_eq!(clipboard.contents().as_deref(), Some("The court held..."));
        assert_eq!(ctx.dom.get(ElementId::ModalCopy).unwrap().content(), COPIED_LABEL);
        assert_eq!(ctx.timers.len(), 1);
    }

    #[test]
    fn test_copy_without_clipboard_falls_back_to_manual_selection() {
        let mut ctx = modal_page();
        let mut modal = ModalController::new();
        modal.open(&mut ctx, payload());

        modal.copy(&mut ctx);

        assert_eq!(
            ctx.take_effects(),
            vec![Effect::ManualCopy("The court held...".to_string())]
        );
    }
}
