//! Sidebar and chat panel layout.
//!
//! Both panels push the main container aside by the same margin, so the
//! margin is derived from the combined state rather than set by whichever
//! panel moved last.

use crate::dom::{DomRegistry, ElementId};

pub const MARGIN_PANEL_OPEN: &str = "320px";
pub const MARGIN_PANELS_CLOSED: &str = "160px";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutAction {
    ToggleSidebar,
    ToggleChat,
    CloseChat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutState {
    pub sidebar_open: bool,
    pub chat_open: bool,
}

impl LayoutState {
    pub fn reduce(self, action: LayoutAction) -> Self {
        match action {
            LayoutAction::ToggleSidebar => Self {
                sidebar_open: !self.sidebar_open,
                ..self
            },
            LayoutAction::ToggleChat => Self {
                chat_open: !self.chat_open,
                ..self
            },
            LayoutAction::CloseChat => Self {
                chat_open: false,
                ..self
            },
        }
    }

    pub fn margin_right(&self) -> &'static str {
        if self.sidebar_open || self.chat_open {
            MARGIN_PANEL_OPEN
        } else {
            MARGIN_PANELS_CLOSED
        }
    }

    /// Write panel positions and the shared margin to the page.
    pub fn apply(&self, dom: &mut DomRegistry) {
        let sidebar_open = self.sidebar_open;
        dom.update(ElementId::Sidebar, |sidebar| {
            sidebar.set_style(
                "transform",
                if sidebar_open {
                    "translateX(0)"
                } else {
                    "translateX(110%)"
                },
            );
            sidebar.set_style("opacity", if sidebar_open { "1" } else { "0" });
        });
        dom.update(ElementId::SidebarToggle, |button| {
            button.set_style(
                "transform",
                if sidebar_open {
                    "rotate(180deg)"
                } else {
                    "rotate(0deg)"
                },
            )
        });

        let chat_open = self.chat_open;
        dom.update(ElementId::ChatbotPanel, |panel| {
            panel.set_style(
                "transform",
                if chat_open {
                    "translateX(0)"
                } else {
                    "translateX(100%)"
                },
            )
        });
        dom.update(ElementId::ChatbotToggle, |button| {
            button.set_style("display", if chat_open { "none" } else { "flex" })
        });

        let margin = self.margin_right();
        dom.update(ElementId::MainContainer, |main| {
            main.set_style("margin-right", margin)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Element;

    #[test]
    fn test_margin_reflects_both_panels() {
        let closed = LayoutState::default();
        assert_eq!(closed.margin_right(), MARGIN_PANELS_CLOSED);

        let sidebar = closed.reduce(LayoutAction::ToggleSidebar);
        assert_eq!(sidebar.margin_right(), MARGIN_PANEL_OPEN);

        let both = sidebar.reduce(LayoutAction::ToggleChat);
        assert_eq!(both.margin_right(), MARGIN_PANEL_OPEN);

        // Closing the chat must not collapse the margin while the sidebar is open.
        let sidebar_only = both.reduce(LayoutAction::CloseChat);
        assert!(sidebar_only.sidebar_open);
        assert_eq!(sidebar_only.margin_right(), MARGIN_PANEL_OPEN);

        let none = sidebar_only.reduce(LayoutAction::ToggleSidebar);
        assert_eq!(none.margin_right(), MARGIN_PANELS_CLOSED);
    }

    #[test]
    fn test_close_chat_is_idempotent() {
        let state = LayoutState::default().reduce(LayoutAction::CloseChat);
        assert_eq!(state, LayoutState::default());
    }

    #[test]
    fn test_apply_writes_panel_styles() {
        let mut dom = DomRegistry::new();
        for id in [
            ElementId::Sidebar,
            ElementId::SidebarToggle,
            ElementId::ChatbotPanel,
            ElementId::ChatbotToggle,
            ElementId::MainContainer,
        ] {
            dom.insert(id, Element::new());
        }

        let state = LayoutState {
            sidebar_open: false,
            chat_open: true,
        };
        state.apply(&mut dom);

        let sidebar = dom.get(ElementId::Sidebar).unwrap();
        assert_eq!(sidebar.style("transform"), Some("translateX(110%)"));
        assert_eq!(sidebar.style("opacity"), Some("0"));
        assert_eq!(
            dom.get(ElementId::ChatbotPanel).unwrap().style("transform"),
            Some("translateX(0)")
        );
        assert_eq!(
            dom.get(ElementId::ChatbotToggle).unwrap().style("display"),
            Some("none")
        );
        assert_eq!(
            dom.get(ElementId::MainContainer).unwrap().style("margin-right"),
            Some("320px")
        );
    }
}
