//! The page application: boots controllers over a parsed page and routes
//! host events to them.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::context::{
    AppContext, Capabilities, Clipboard, Effect, InputExclusivity, Navigation, TimerAction,
};
use crate::dom::{DomRegistry, ElementId, Page};
use crate::error::Result;
use crate::interaction::{ClickTarget, ControlData, ElementRole, Intent, UiEvent};
use crate::modal::ModalController;
use crate::results::ResultsPipeline;
use crate::shell::submit::{
    build_request, extract_results_fragment, reset_location, EMPTY_SUBMIT_MESSAGE,
    SUBMIT_FAILED_MESSAGE,
};
use crate::shell::ShellController;
use crate::storage::LocalStore;
use crate::transport::Transport;
use crate::upload::UploadController;

/// Environment handed to [`App::boot`].
#[derive(Default)]
pub struct AppOptions {
    store: Option<Box<dyn LocalStore>>,
    clipboard: Option<Box<dyn Clipboard>>,
    capabilities: Capabilities,
    exclusivity: InputExclusivity,
}

impl AppOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: impl LocalStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_exclusivity(mut self, exclusivity: InputExclusivity) -> Self {
        self.exclusivity = exclusivity;
        self
    }
}

/// How a submit ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Nothing to send; the user was alerted.
    Blocked,
    /// Transport failure or non-success status; the user was alerted.
    Failed,
    /// The results fragment was swapped in place.
    Swapped,
    /// The host was asked to reload the page.
    Reloaded,
}

pub struct App {
    ctx: AppContext,
    upload: UploadController,
    modal: ModalController,
    results: ResultsPipeline,
    shell: ShellController,
}

impl App {
    /// Wire up controllers for a freshly loaded page.
    pub fn boot(page: Page, options: AppOptions) -> Result<Self> {
        let Page {
            location,
            dom,
            form,
            source,
        } = page;

        let mut ctx = AppContext::new(dom, form, location);
        if let Some(store) = options.store {
            ctx.store = store;
        }
        ctx.clipboard = options.clipboard;
        ctx.capabilities = options.capabilities;
        ctx.exclusivity = options.exclusivity;

        let mut app = Self {
            ctx,
            upload: UploadController::new(),
            modal: ModalController::new(),
            results: ResultsPipeline::new()?,
            shell: ShellController::new(),
        };

        app.shell.load_theme(&mut app.ctx);
        app.ctx.refresh_submit_button(false);

        // Cards are read from the server markup, never from rendered output.
        let markup = app
            .ctx
            .dom
            .get(ElementId::ResultsContainer)
            .map(|container| container.content().to_string())
            .unwrap_or(source);
        if app.results.has_cards(&markup) {
            app.results.initialize(&mut app.ctx.dom, &markup);
        }
        info!(
            "Booted page at {}",
            app.ctx
                .location
                .as_ref()
                .map(|url| url.as_str())
                .unwrap_or("<no location>")
        );
        Ok(app)
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AppContext {
        &mut self.ctx
    }

    pub fn dom(&self) -> &DomRegistry {
        &self.ctx.dom
    }

    pub fn upload(&self) -> &UploadController {
        &self.upload
    }

    pub fn modal(&self) -> &ModalController {
        &self.modal
    }

    pub fn results(&self) -> &ResultsPipeline {
        &self.results
    }

    pub fn shell(&self) -> &ShellController {
        &self.shell
    }

    pub fn effects(&self) -> &[Effect] {
        self.ctx.effects()
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        self.ctx.take_effects()
    }

    pub fn dispatch(&mut self, event: UiEvent) {
        debug!("Dispatch {:?}", event);
        match event {
            UiEvent::Click(target) => self.click(target),
            UiEvent::KeyDown(key) => self.modal.key_down(&mut self.ctx, &key),
            UiEvent::TextInput(text) => self.text_input(text),
            UiEvent::FileChosen(file) => self.upload.choose(&mut self.ctx, file),
            UiEvent::FilesDropped(files) => self.upload.drop_files(&mut self.ctx, files),
            UiEvent::DragOver => self.upload.drag_over(&mut self.ctx),
            UiEvent::DragLeave => self.upload.drag_leave(&mut self.ctx),
            UiEvent::SortChanged(value) => self.results.apply_sort(&mut self.ctx.dom, &value),
            UiEvent::FilterChanged(value) => {
                self.results.apply_filter(&mut self.ctx.dom, &value)
            }
        }
    }

    fn click(&mut self, target: ClickTarget) {
        match target {
            ClickTarget::Element(id) => self.click_element(id),
            ClickTarget::Card { position, role } => {
                let Some(intent) = self.results.intent(position, role).cloned() else {
                    debug!("No {:?} control on card {}", role, position);
                    return;
                };
                match intent {
                    Intent::OpenDetails(payload) => self.modal.open(&mut self.ctx, payload),
                    Intent::CopyText(text) => {
                        if let Some(clipboard) = self.ctx.clipboard.as_mut() {
                            if let Err(e) = clipboard.write_text(&text) {
                                warn!("Clipboard error: {}", e);
                            }
                        } else {
                            debug!("No clipboard available for card copy");
                        }
                        self.results.show_copy_feedback(&mut self.ctx, position);
                    }
                }
            }
            ClickTarget::Control { role, data } => self.click_control(role, data),
            ClickTarget::ModalContent => {}
        }
    }

    fn click_element(&mut self, id: ElementId) {
        match id {
            ElementId::UploadZone => self.upload.browse(&mut self.ctx),
            ElementId::RemoveFile => self.upload.remove(&mut self.ctx),
            // A click that lands on the overlay itself, outside the dialog.
            ElementId::CaseModal | ElementId::ModalClose | ElementId::ModalCloseBottom => {
                self.modal.close(&mut self.ctx)
            }
            ElementId::ModalCopy => self.modal.copy(&mut self.ctx),
            ElementId::ThemeToggle => self.shell.toggle_theme(&mut self.ctx),
            ElementId::SidebarToggle => self.shell.toggle_sidebar(&mut self.ctx),
            ElementId::ChatbotToggle => self.shell.toggle_chat(&mut self.ctx),
            ElementId::ChatbotClose => self.shell.close_chat(&mut self.ctx),
            ElementId::ForceReset => self.reset(),
            other => debug!("Click on {:?} has no handler", other),
        }
    }

    /// Role-bearing controls outside the results list carry their own data.
    fn click_control(&mut self, role: ElementRole, data: ControlData) {
        match role {
            ElementRole::ViewDetails | ElementRole::CaseTitle => {
                let payload = data.delegated_payload(role);
                self.modal.open(&mut self.ctx, payload);
            }
            ElementRole::Copy => {
                let text = data.data("preview").unwrap_or(&data.text).to_string();
                match self.ctx.clipboard.as_mut() {
                    Some(clipboard) => {
                        if let Err(e) = clipboard.write_text(&text) {
                            warn!("Clipboard error: {}", e);
                        }
                    }
                    None => debug!("No clipboard available for copy"),
                }
            }
        }
    }

    fn text_input(&mut self, text: String) {
        let typed = !text.trim().is_empty();
        self.ctx
            .dom
            .update(ElementId::TextInput, |input| input.set_value(text));
        if typed && self.ctx.exclusivity == InputExclusivity::TwoWay && self.upload.has_file() {
            debug!("Text entered, dropping selected file");
            self.upload.remove(&mut self.ctx);
        }
        self.ctx.refresh_submit_button(self.upload.has_file());
    }

    /// Run every timer due at `now`.
    pub fn tick(&mut self, now: Instant) {
        for action in self.ctx.timers.due(now) {
            match action {
                TimerAction::RestoreCardCopyLabel {
                    generation,
                    position,
                    label,
                } => self.results.restore_copy_label(generation, position, label),
                TimerAction::RestoreModalCopyLabel { label } => {
                    self.modal.restore_copy_label(&mut self.ctx, label)
                }
            }
        }
    }

    /// Send the form, then swap in the results fragment or ask for a reload.
    pub async fn submit(&mut self, transport: &dyn Transport) -> SubmitOutcome {
        if !self.ctx.can_submit(self.upload.has_file()) {
            self.ctx.alert(EMPTY_SUBMIT_MESSAGE);
            return SubmitOutcome::Blocked;
        }

        self.shell.show_loading(&mut self.ctx);
        let request = match build_request(&self.ctx, self.upload.selected()) {
            Ok(request) => request,
            Err(e) => {
                warn!("Could not build submit request: {}", e);
                return self.fail_submit();
            }
        };

        let response = match transport.submit(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Submit failed: {}", e);
                return self.fail_submit();
            }
        };
        if !response.is_success() {
            warn!("Submit answered HTTP {}", response.status);
            return self.fail_submit();
        }

        if self.ctx.dom.contains(ElementId::ResultsContainer) {
            if let Some(fragment) = extract_results_fragment(&response.body) {
                info!("Swapping in results fragment ({} bytes)", fragment.len());
                self.ctx.dom.update(ElementId::ResultsContainer, |container| {
                    container.set_content(fragment.clone())
                });
                self.results.initialize(&mut self.ctx.dom, &fragment);
                self.shell.hide_loading(&mut self.ctx);
                self.ctx.refresh_submit_button(self.upload.has_file());
                return SubmitOutcome::Swapped;
            }
        }

        debug!("No results fragment in response, reloading");
        self.ctx.emit(Effect::Navigate(Navigation::Reload));
        SubmitOutcome::Reloaded
    }

    fn fail_submit(&mut self) -> SubmitOutcome {
        self.shell.hide_loading(&mut self.ctx);
        self.ctx.refresh_submit_button(self.upload.has_file());
        self.ctx.alert(SUBMIT_FAILED_MESSAGE);
        SubmitOutcome::Failed
    }

    /// Clear every piece of page state and navigate to a fresh copy.
    pub fn reset(&mut self) {
        for id in [ElementId::CategoryResult, ElementId::SearchResults] {
            self.ctx.dom.update(id, |el| {
                el.add_class("hidden");
                el.set_content("");
            });
        }
        self.ctx.dom.reset_values();
        self.ctx
            .dom
            .update(ElementId::FilePreview, |preview| preview.remove_class("show"));
        self.upload.clear(&mut self.ctx);
        self.shell.reset_chat(&mut self.ctx);
        self.shell.hide_loading(&mut self.ctx);
        self.ctx.refresh_submit_button(false);

        let navigation = match self.ctx.location.as_ref() {
            Some(location) => Navigation::To(reset_location(
                location,
                chrono::Utc::now().timestamp_millis(),
            )),
            None => {
                warn!("Reset without a page location, reloading");
                Navigation::Reload
            }
        };
        self.ctx.emit(Effect::Navigate(navigation));
    }
}
