//! Page chrome: panels, theme, loading state, submit and reset helpers.

pub mod layout;
pub mod submit;
pub mod theme;

use tracing::{debug, warn};

use crate::context::AppContext;
use crate::dom::ElementId;

pub use layout::{LayoutAction, LayoutState};
pub use theme::Theme;

pub const ANALYZING_LABEL: &str = r#"<span class="loading-spinner"></span> Analyzing..."#;
pub const ANALYZE_LABEL: &str = "Analyze";

#[derive(Debug, Default)]
pub struct ShellController {
    layout: LayoutState,
    theme: Theme,
}

impl ShellController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layout(&self) -> LayoutState {
        self.layout
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Apply the persisted theme. Store failures fall back to light.
    pub fn load_theme(&mut self, ctx: &mut AppContext) {
        self.theme = match Theme::load(&*ctx.store) {
            Ok(theme) => theme,
            Err(e) => {
                warn!("Could not read theme preference: {}", e);
                Theme::default()
            }
        };
        self.apply_theme(ctx);
    }

    pub fn toggle_theme(&mut self, ctx: &mut AppContext) {
        if !ctx.dom.contains(ElementId::ThemeToggle) {
            return;
        }
        self.theme = self.theme.toggled();
        if let Err(e) = self.theme.save(&mut *ctx.store) {
            warn!("Could not persist theme preference: {}", e);
        }
        debug!("Theme is now {}", self.theme.as_str());
        self.apply_theme(ctx);
    }

    fn apply_theme(&self, ctx: &mut AppContext) {
        let dark = self.theme == Theme::Dark;
        ctx.dom.update(ElementId::Body, |body| {
            if dark {
                body.add_class(theme::DARK_MODE_CLASS);
            } else {
                body.remove_class(theme::DARK_MODE_CLASS);
            }
        });
        let icon = self.theme.icon();
        ctx.dom
            .update(ElementId::ThemeToggle, |toggle| toggle.set_content(icon));
    }

    pub fn toggle_sidebar(&mut self, ctx: &mut AppContext) {
        if ctx.dom.contains(ElementId::SidebarToggle) && ctx.dom.contains(ElementId::Sidebar) {
            self.layout_action(ctx, LayoutAction::ToggleSidebar);
        }
    }

    pub fn toggle_chat(&mut self, ctx: &mut AppContext) {
        if ctx.dom.contains(ElementId::ChatbotToggle) && ctx.dom.contains(ElementId::ChatbotPanel) {
            self.layout_action(ctx, LayoutAction::ToggleChat);
        }
    }

    pub fn close_chat(&mut self, ctx: &mut AppContext) {
        if ctx.dom.contains(ElementId::ChatbotClose) && ctx.dom.contains(ElementId::ChatbotPanel) {
            self.layout_action(ctx, LayoutAction::CloseChat);
        }
    }

    fn layout_action(&mut self, ctx: &mut AppContext, action: LayoutAction) {
        self.layout = self.layout.reduce(action);
        self.layout.apply(&mut ctx.dom);
    }

    pub fn show_loading(&self, ctx: &mut AppContext) {
        ctx.dom.update(ElementId::LoadingOverlay, |overlay| {
            overlay.remove_class("hidden");
            overlay.add_class("flex");
        });
        ctx.dom
            .update(ElementId::LoadingSkeletons, |el| el.remove_class("hidden"));
        ctx.dom
            .update(ElementId::HandLoading, |el| el.add_class("show"));
        ctx.dom.update(ElementId::SubmitButton, |button| {
            button.set_content(ANALYZING_LABEL);
            button.set_attr("disabled", "true");
            button.add_class("opacity-75");
            button.add_class("cursor-wait");
        });
    }

    pub fn hide_loading(&self, ctx: &mut AppContext) {
        ctx.dom.update(ElementId::LoadingOverlay, |overlay| {
            overlay.add_class("hidden");
            overlay.remove_class("flex");
        });
        ctx.dom
            .update(ElementId::LoadingSkeletons, |el| el.add_class("hidden"));
        ctx.dom
            .update(ElementId::HandLoading, |el| el.remove_class("show"));
        ctx.dom.update(ElementId::SubmitButton, |button| {
            button.set_content(ANALYZE_LABEL);
            button.remove_attr("disabled");
            button.remove_class("opacity-75");
            button.remove_class("cursor-wait");
        });
    }

    /// Replace the chat history with the greeting.
    pub fn reset_chat(&self, ctx: &mut AppContext) {
        ctx.dom
            .update(ElementId::ChatBody, |chat| chat.set_content(submit::CHAT_GREETING));
    }
}
