//! Command handlers - business logic for processing UI events

use crate::app::AppState;
use crate::constants::EXAMPLE_REQUESTS;
use crate::error::DispatchError;
use crate::messages::ui_events::{HeaderField, InputMode, Panel, RequestTab, ResponseTab};
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{HttpMethod, Request};

impl AppState {
    // ========================
    // Navigation
    // ========================

    pub fn next_panel(&mut self) {
        self.stop_editing();
        self.active_panel = self.active_panel.next();
    }

    pub fn prev_panel(&mut self) {
        self.stop_editing();
        self.active_panel = self.active_panel.prev();
    }

    pub fn show_request_tab(&mut self, tab: RequestTab) {
        self.request_tab = tab;
    }

    pub fn show_response_tab(&mut self, tab: ResponseTab) {
        self.response_tab = tab;
        self.response_scroll = 0;
    }

    // ========================
    // Input editing
    // ========================

    pub fn start_editing(&mut self) {
        if self.active_panel == Panel::Request
            && self.request_tab == RequestTab::Body
            && !self.draft.method.has_body()
        {
            self.hint = Some(format!("Body is not sent with {}", self.draft.method));
            return;
        }
        if self.current_input_mut().is_none() {
            return;
        }
        self.input_mode = InputMode::Editing;
        self.cursor_position = self.current_input().len();
    }

    pub fn stop_editing(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn move_cursor_left(&mut self) {
        let input = self.current_input();
        if self.cursor_position > 0 {
            let new_pos = input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.cursor_position = new_pos;
        }
    }

    pub fn move_cursor_right(&mut self) {
        let input = self.current_input();
        if self.cursor_position < input.len() {
            let new_pos = input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(input.len());
            self.cursor_position = new_pos;
        }
    }

    pub fn enter_char(&mut self, c: char) {
        let cursor_pos = self.cursor_position;
        if let Some(input) = self.current_input_mut() {
            if cursor_pos <= input.len() {
                input.insert(cursor_pos, c);
                self.cursor_position = cursor_pos + c.len_utf8();
            }
        }
    }

    pub fn delete_char(&mut self) {
        let cursor_pos = self.cursor_position;
        if cursor_pos == 0 {
            return;
        }
        if let Some(input) = self.current_input_mut() {
            let prev_pos = input[..cursor_pos]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    // ========================
    // HTTP Method
    // ========================

    pub fn cycle_method(&mut self) {
        self.draft.method = self.draft.method.next();
    }

    // ========================
    // Response scrolling
    // ========================

    pub fn scroll_up(&mut self) {
        self.response_scroll = self.response_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        self.response_scroll = self.response_scroll.saturating_add(1);
    }

    // ========================
    // Headers
    // ========================

    pub fn next_header(&mut self) {
        let len = self.draft.headers().len();
        self.selected_header = (self.selected_header + 1) % len;
        self.header_field = HeaderField::Key;
    }

    pub fn prev_header(&mut self) {
        let len = self.draft.headers().len();
        self.selected_header = self.selected_header.checked_sub(1).unwrap_or(len - 1);
        self.header_field = HeaderField::Key;
    }

    pub fn add_header(&mut self) {
        self.selected_header = self.draft.add_header();
        self.header_field = HeaderField::Key;
    }

    pub fn delete_header(&mut self) {
        self.draft.remove_header(self.selected_header);
        let last = self.draft.headers().len() - 1;
        self.selected_header = self.selected_header.min(last);
    }

    pub fn next_header_field(&mut self) {
        self.header_field = match self.header_field {
            HeaderField::Key => HeaderField::Value,
            HeaderField::Value => HeaderField::Key,
        };
        self.cursor_position = self.current_input().len();
    }

    // ========================
    // Dispatch
    // ========================

    /// Validate and hand the draft to the network layer
    pub fn send_request(&mut self) -> Option<NetworkCommand> {
        self.stop_editing();
        self.hint = None;
        match self.controller.begin(&self.draft) {
            Ok(pending) => {
                self.response_scroll = 0;
                Some(NetworkCommand::Dispatch(pending))
            }
            Err(DispatchError::Busy) => {
                self.hint = Some(String::from("A request is already in flight"));
                None
            }
            // the controller already raised the error banner
            Err(DispatchError::Validation(_)) => None,
        }
    }

    pub fn handle_response(&mut self, response: NetworkResponse) {
        match response {
            NetworkResponse::Completed { id, result } => {
                if self.controller.finish(id, result).is_some() {
                    self.response_scroll = 0;
                    self.selected_history = 0;
                }
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.controller.dismiss_error();
        self.hint = None;
    }

    /// Reset the draft to defaults and clear response and error
    pub fn reset_draft(&mut self) {
        self.load_draft(Request::default());
    }

    fn load_draft(&mut self, draft: Request) {
        self.draft = draft;
        self.controller.clear_display();
        self.input_mode = InputMode::Normal;
        self.cursor_position = self.draft.url.len();
        self.selected_header = 0;
        self.header_field = HeaderField::Key;
        self.response_scroll = 0;
        self.hint = None;
    }

    // ========================
    // History
    // ========================

    pub fn next_history(&mut self) {
        let len = self.controller.history().len();
        if len > 0 {
            self.selected_history = (self.selected_history + 1) % len;
        }
    }

    pub fn prev_history(&mut self) {
        let len = self.controller.history().len();
        if len > 0 {
            self.selected_history = self.selected_history.checked_sub(1).unwrap_or(len - 1);
        }
    }

    /// Load method and URL of the selected entry; headers and body start blank
    pub fn select_history(&mut self) {
        let Some(item) = self.controller.history().get(self.selected_history).cloned() else {
            return;
        };
        self.load_draft(Request::from_history(&item));
        self.active_panel = Panel::Url;
    }

    pub fn clear_history(&mut self) {
        self.controller.clear_history();
        self.selected_history = 0;
    }

    // ========================
    // Example shortcuts
    // ========================

    pub fn show_examples(&mut self) {
        self.show_examples = true;
        self.selected_example = 0;
    }

    pub fn close_examples(&mut self) {
        self.show_examples = false;
    }

    pub fn next_example(&mut self) {
        self.selected_example = (self.selected_example + 1) % EXAMPLE_REQUESTS.len();
    }

    pub fn prev_example(&mut self) {
        self.selected_example = self
            .selected_example
            .checked_sub(1)
            .unwrap_or(EXAMPLE_REQUESTS.len() - 1);
    }

    /// Fill the draft from a shortcut and log it as a pending history entry
    pub fn load_example(&mut self) {
        self.show_examples = false;
        let Some((_, method, url, body)) = EXAMPLE_REQUESTS.get(self.selected_example) else {
            return;
        };
        let method = method.parse().unwrap_or(HttpMethod::GET);
        let mut draft = Request::new(method, *url);
        draft.body = body.to_string();
        if !body.is_empty() {
            draft = draft.with_header("Content-Type", "application/json");
        }

        self.controller.record_pending(method, url);
        self.load_draft(draft);
        self.selected_history = 0;
        self.active_panel = Panel::Url;
    }

    // ========================
    // Help popup
    // ========================

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }
}
