//! UI events - messages from UI layer to App layer

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::messages::RenderState;

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    // Panel navigation
    NextPanel,
    PrevPanel,
    ScrollUp,
    ScrollDown,

    // Input editing
    StartEditing,
    StopEditing,
    CharInput(char),
    Newline,
    Backspace,
    CursorLeft,
    CursorRight,

    // Request actions
    SendRequest,
    CycleMethod,
    /// Host "new request" signal: reset the draft
    NewRequest,
    DismissError,

    // Editor / viewer tabs
    ShowRequestTab(RequestTab),
    ShowResponseTab(ResponseTab),

    // Headers
    NextHeader,
    PrevHeader,
    AddHeader,
    DeleteHeader,
    NextHeaderField,

    // History sidebar
    NextHistory,
    PrevHistory,
    SelectHistory,
    ClearHistory,

    // Example shortcuts
    ShowExamples,
    NextExample,
    PrevExample,
    LoadExample,
    CloseExamples,

    // Popups
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Active panel in the UI (needed for context-aware event mapping)
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Panel {
    #[default]
    Url,
    Request,
    Response,
    History,
}

impl Panel {
    pub fn next(&self) -> Panel {
        match self {
            Panel::Url => Panel::Request,
            Panel::Request => Panel::Response,
            Panel::Response => Panel::History,
            Panel::History => Panel::Url,
        }
    }

    pub fn prev(&self) -> Panel {
        match self {
            Panel::Url => Panel::History,
            Panel::Request => Panel::Url,
            Panel::Response => Panel::Request,
            Panel::History => Panel::Response,
        }
    }
}

/// Request editor tab
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RequestTab {
    #[default]
    Headers,
    Body,
}

/// Response viewer tab
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum ResponseTab {
    #[default]
    Body,
    Headers,
}

/// Which side of a header row is being edited
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum HeaderField {
    #[default]
    Key,
    Value,
}

/// Input mode
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Editing,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    if key.kind != KeyEventKind::Press {
        return None;
    }

    // Global Ctrl shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => return Some(UiEvent::Quit),
            KeyCode::Char('n') => return Some(UiEvent::NewRequest),
            KeyCode::Enter | KeyCode::Char('s') => return Some(UiEvent::SendRequest),
            _ => {}
        }
    }

    // Popups first
    if state.show_help {
        return Some(UiEvent::CloseHelp);
    }

    if state.show_examples {
        return match key.code {
            KeyCode::Esc => Some(UiEvent::CloseExamples),
            KeyCode::Enter => Some(UiEvent::LoadExample),
            KeyCode::Up => Some(UiEvent::PrevExample),
            KeyCode::Down => Some(UiEvent::NextExample),
            _ => None,
        };
    }

    match state.input_mode {
        InputMode::Normal => handle_normal_keys(key, state),
        InputMode::Editing => handle_editing_keys(key, state),
    }
}

fn handle_normal_keys(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    let panel = state.active_panel;
    match key.code {
        KeyCode::Char('q') => Some(UiEvent::Quit),
        KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
        KeyCode::Tab => Some(UiEvent::NextPanel),
        KeyCode::BackTab => Some(UiEvent::PrevPanel),
        KeyCode::Esc => Some(UiEvent::DismissError),
        KeyCode::Char('m') => Some(UiEvent::CycleMethod),
        KeyCode::Char('s') => Some(UiEvent::SendRequest),
        KeyCode::Char('x') => Some(UiEvent::ShowExamples),
        KeyCode::Char('n') => Some(UiEvent::NewRequest),

        KeyCode::Char('h') if matches!(panel, Panel::Request) => {
            Some(UiEvent::ShowRequestTab(RequestTab::Headers))
        }
        KeyCode::Char('b') if matches!(panel, Panel::Request) => {
            Some(UiEvent::ShowRequestTab(RequestTab::Body))
        }
        KeyCode::Char('h') if matches!(panel, Panel::Response) => {
            Some(UiEvent::ShowResponseTab(ResponseTab::Headers))
        }
        KeyCode::Char('b') if matches!(panel, Panel::Response) => {
            Some(UiEvent::ShowResponseTab(ResponseTab::Body))
        }

        KeyCode::Char('a') if is_header_editor(state) => Some(UiEvent::AddHeader),
        KeyCode::Char('d') if is_header_editor(state) => Some(UiEvent::DeleteHeader),
        KeyCode::Char('c') if panel == Panel::History => Some(UiEvent::ClearHistory),

        KeyCode::Char('e') | KeyCode::Enter => match panel {
            Panel::Url | Panel::Request => Some(UiEvent::StartEditing),
            Panel::History => Some(UiEvent::SelectHistory),
            Panel::Response => None,
        },
        KeyCode::Up => match panel {
            Panel::Request if is_header_editor(state) => Some(UiEvent::PrevHeader),
            Panel::Response => Some(UiEvent::ScrollUp),
            Panel::History => Some(UiEvent::PrevHistory),
            _ => None,
        },
        KeyCode::Down => match panel {
            Panel::Request if is_header_editor(state) => Some(UiEvent::NextHeader),
            Panel::Response => Some(UiEvent::ScrollDown),
            Panel::History => Some(UiEvent::NextHistory),
            _ => None,
        },
        _ => None,
    }
}

fn handle_editing_keys(key: KeyEvent, state: &RenderState) -> Option<UiEvent> {
    let panel = state.active_panel;
    match key.code {
        KeyCode::Esc => Some(UiEvent::StopEditing),
        KeyCode::Left => Some(UiEvent::CursorLeft),
        KeyCode::Right => Some(UiEvent::CursorRight),
        KeyCode::Backspace => Some(UiEvent::Backspace),
        KeyCode::Tab if is_header_editor(state) => Some(UiEvent::NextHeaderField),
        KeyCode::Enter => match panel {
            Panel::Url => Some(UiEvent::SendRequest),
            Panel::Request if state.request_tab == RequestTab::Body => Some(UiEvent::Newline),
            _ => Some(UiEvent::StopEditing),
        },
        KeyCode::Char(c) => Some(UiEvent::CharInput(c)),
        _ => None,
    }
}

fn is_header_editor(state: &RenderState) -> bool {
    state.active_panel == Panel::Request && state.request_tab == RequestTab::Headers
}
