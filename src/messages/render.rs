//! Render state - data structure sent from App layer to UI for rendering

use crate::messages::ui_events::{HeaderField, InputMode, Panel, RequestTab, ResponseTab};
use crate::models::{Header, HistoryItem, HttpMethod, Response};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Draft
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<Header>,
    pub body: String,

    // UI state
    pub active_panel: Panel,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    pub request_tab: RequestTab,
    pub response_tab: ResponseTab,
    pub selected_header: usize,
    pub header_field: HeaderField,

    // Response
    pub response: Option<Response>,
    pub response_scroll: u16,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Transient hint shown in the status bar
    pub hint: Option<String>,

    // History
    pub history: Vec<HistoryItem>,
    pub selected_history: usize,

    // Environment
    pub transport_name: &'static str,
    pub sandboxed: bool,

    // Popups
    pub show_help: bool,
    pub show_examples: bool,
    pub selected_example: usize,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            method: HttpMethod::GET,
            url: String::new(),
            headers: vec![Header::blank()],
            body: String::new(),
            active_panel: Panel::Url,
            input_mode: InputMode::Normal,
            cursor_position: 0,
            request_tab: RequestTab::Headers,
            response_tab: ResponseTab::Body,
            selected_header: 0,
            header_field: HeaderField::Key,
            response: None,
            response_scroll: 0,
            is_loading: false,
            error: None,
            hint: None,
            history: Vec::new(),
            selected_history: 0,
            transport_name: "privileged",
            sandboxed: false,
            show_help: false,
            show_examples: false,
            selected_example: 0,
        }
    }
}
