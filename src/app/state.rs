//! App state - pure data structure with no I/O logic

use crate::app::dispatch::DispatchController;
use crate::messages::ui_events::{HeaderField, InputMode, Panel, RequestTab, ResponseTab};
use crate::messages::RenderState;
use crate::models::Request;

/// Main application state - the draft plus presentation state
pub struct AppState {
    // Draft being edited
    pub draft: Request,
    pub cursor_position: usize,

    // Dispatch, response and history
    pub controller: DispatchController,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub request_tab: RequestTab,
    pub response_tab: ResponseTab,
    pub response_scroll: u16,
    pub hint: Option<String>,

    // Headers editor
    pub selected_header: usize,
    pub header_field: HeaderField,

    // History sidebar
    pub selected_history: usize,

    pub sandboxed: bool,

    // Popups
    pub show_help: bool,
    pub show_examples: bool,
    pub selected_example: usize,
}

impl AppState {
    pub fn new(controller: DispatchController, sandboxed: bool) -> Self {
        AppState {
            draft: Request::default(),
            cursor_position: 0,
            controller,
            active_panel: Panel::Url,
            input_mode: InputMode::Normal,
            request_tab: RequestTab::Headers,
            response_tab: ResponseTab::Body,
            response_scroll: 0,
            hint: None,
            selected_header: 0,
            header_field: HeaderField::Key,
            selected_history: 0,
            sandboxed,
            show_help: false,
            show_examples: false,
            selected_example: 0,
        }
    }

    /// Get the current input field content
    pub fn current_input(&self) -> &str {
        match (self.active_panel, self.request_tab) {
            (Panel::Url, _) => &self.draft.url,
            (Panel::Request, RequestTab::Body) => &self.draft.body,
            (Panel::Request, RequestTab::Headers) => self
                .draft
                .headers()
                .get(self.selected_header)
                .map(|h| match self.header_field {
                    HeaderField::Key => h.key.as_str(),
                    HeaderField::Value => h.value.as_str(),
                })
                .unwrap_or(""),
            _ => "",
        }
    }

    /// Get mutable reference to current input field, if the focus is editable
    pub fn current_input_mut(&mut self) -> Option<&mut String> {
        match (self.active_panel, self.request_tab) {
            (Panel::Url, _) => Some(&mut self.draft.url),
            (Panel::Request, RequestTab::Body) => Some(&mut self.draft.body),
            (Panel::Request, RequestTab::Headers) => {
                let field = self.header_field;
                self.draft
                    .header_mut(self.selected_header)
                    .map(|h| match field {
                        HeaderField::Key => &mut h.key,
                        HeaderField::Value => &mut h.value,
                    })
            }
            _ => None,
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            method: self.draft.method,
            url: self.draft.url.clone(),
            headers: self.draft.headers().to_vec(),
            body: self.draft.body.clone(),
            active_panel: self.active_panel,
            input_mode: self.input_mode,
            cursor_position: self.cursor_position,
            request_tab: self.request_tab,
            response_tab: self.response_tab,
            selected_header: self.selected_header,
            header_field: self.header_field,
            response: self.controller.response().cloned(),
            response_scroll: self.response_scroll,
            is_loading: self.controller.is_loading(),
            error: self.controller.error().map(str::to_string),
            hint: self.hint.clone(),
            history: self.controller.history().to_vec(),
            selected_history: self.selected_history,
            transport_name: self.controller.transport_name(),
            sandboxed: self.sandboxed,
            show_help: self.show_help,
            show_examples: self.show_examples,
            selected_example: self.selected_example,
        }
    }
}
