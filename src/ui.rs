//! Drawing - request editor, response viewer, history sidebar and popups

use ratatui::{prelude::*, widgets::*};

use crate::constants::{APP_NAME, APP_VERSION, EXAMPLE_REQUESTS};
use crate::messages::ui_events::{HeaderField, InputMode, Panel, RequestTab, ResponseTab};
use crate::messages::RenderState;
use crate::network::transport::pretty_json;

pub fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(40)])
        .split(area);

    draw_sidebar(f, state, columns[0]);

    let banners = usize::from(state.sandboxed) + usize::from(state.error.is_some());
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banners as u16), // Notices
            Constraint::Length(3),               // Method + URL
            Constraint::Length(9),               // Request editor
            Constraint::Min(5),                  // Response
            Constraint::Length(1),               // Status bar
        ])
        .split(columns[1]);

    draw_banners(f, state, main_chunks[0]);
    draw_url_bar(f, state, main_chunks[1]);
    draw_request_editor(f, state, main_chunks[2]);
    draw_response(f, state, main_chunks[3]);
    draw_status_bar(f, state, main_chunks[4]);

    if state.show_examples {
        draw_examples_popup(f, state, area);
    }

    if state.show_help {
        draw_help_popup(f, area);
    }
}

fn draw_banners(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut lines = Vec::new();
    if state.sandboxed {
        lines.push(Line::from(Span::styled(
            " ! Sandboxed mode: cross-origin requests need CORS approval from the server",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )));
    }
    if let Some(error) = &state.error {
        lines.push(Line::from(Span::styled(
            format!(" ! {}  (Esc to dismiss)", error),
            Style::default().fg(Color::White).bg(Color::Red).bold(),
        )));
    }
    f.render_widget(Paragraph::new(lines), area);
}

fn focus_style(state: &RenderState, panel: Panel) -> Style {
    let is_focused = state.active_panel == panel;
    if is_focused && state.input_mode == InputMode::Editing {
        Style::default().fg(Color::Yellow)
    } else if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_url_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mcolor = method_color(state.method.as_str());
    let send_label = if state.is_loading {
        " Sending... "
    } else if state.url.trim().is_empty() {
        ""
    } else {
        " s:Send "
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::Url))
        .title(format!(" {} ", state.method.as_str()))
        .title_style(Style::default().fg(mcolor).bold())
        .title_bottom(Line::from(send_label).right_aligned());

    let content = if state.url.is_empty() && state.input_mode == InputMode::Normal {
        Paragraph::new(Span::styled(
            "Enter request URL...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(state.url.as_str())
    };
    f.render_widget(content.block(block), area);

    if state.active_panel == Panel::Url && state.input_mode == InputMode::Editing {
        set_cursor(f, area, &state.url, state.cursor_position);
    }
}

fn draw_request_editor(f: &mut Frame, state: &RenderState, area: Rect) {
    let tabs_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let selected = match state.request_tab {
        RequestTab::Headers => 0,
        RequestTab::Body => 1,
    };
    f.render_widget(render_tabs(&["Headers", "Body"], selected), tabs_area[0]);

    match state.request_tab {
        RequestTab::Headers => draw_headers_editor(f, state, tabs_area[1]),
        RequestTab::Body => draw_body_editor(f, state, tabs_area[1]),
    }
}

fn draw_headers_editor(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::Request;
    let editing = is_focused && state.input_mode == InputMode::Editing;

    let items: Vec<ListItem> = state
        .headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let selected = is_focused && i == state.selected_header;
            let field_style = |field: HeaderField| {
                if selected && editing && state.header_field == field {
                    Style::default().fg(Color::Yellow).underlined()
                } else if selected {
                    Style::default().fg(Color::Yellow).bold()
                } else if h.is_transmittable() {
                    Style::default()
                } else {
                    Style::default().fg(Color::DarkGray)
                }
            };
            let key = if h.key.is_empty() { "<name>" } else { h.key.as_str() };
            let value = if h.value.is_empty() { "<value>" } else { h.value.as_str() };
            ListItem::new(Line::from(vec![
                Span::styled(key.to_string(), field_style(HeaderField::Key)),
                Span::raw(": "),
                Span::styled(value.to_string(), field_style(HeaderField::Value)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(focus_style(state, Panel::Request))
            .title(" Headers (a:add d:del e:edit Tab:key/value) "),
    );
    f.render_widget(list, area);
}

fn draw_body_editor(f: &mut Frame, state: &RenderState, area: Rect) {
    let title = if state.method.has_body() {
        " Body ".to_string()
    } else {
        format!(" Body (not sent with {}) ", state.method)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::Request))
        .title(title);

    let body = if state.body.is_empty() && state.input_mode == InputMode::Normal {
        Paragraph::new(Span::styled(
            "Enter request body (JSON, XML, text, etc.)...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        Paragraph::new(state.body.as_str())
    };
    f.render_widget(body.block(block).wrap(Wrap { trim: false }), area);

    if state.active_panel == Panel::Request && state.input_mode == InputMode::Editing {
        set_cursor(f, area, &state.body, state.cursor_position);
    }
}

fn draw_response(f: &mut Frame, state: &RenderState, area: Rect) {
    let border_style = focus_style(state, Panel::Response);

    let placeholder = if state.is_loading {
        Some("Sending request...")
    } else if state.response.is_none() {
        Some("Send a request to see the response here")
    } else {
        None
    };

    let (Some(response), None) = (&state.response, placeholder) else {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Response ");
        let text = Paragraph::new(Span::styled(
            placeholder.unwrap_or_default(),
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        f.render_widget(text, area);
        return;
    };

    let status_line = Line::from(vec![
        Span::styled(
            format!(" Status: {} {} ", response.status, response.status_text),
            Style::default().fg(status_color(response.status)).bold(),
        ),
        Span::styled(
            format!(" Time: {}ms ", response.response_time_ms),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(1)])
        .split(area);

    let headers_title = format!("Headers ({})", response.headers.len());
    let selected = match state.response_tab {
        ResponseTab::Body => 0,
        ResponseTab::Headers => 1,
    };
    f.render_widget(render_tabs(&["Body", headers_title.as_str()], selected), chunks[0]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(status_line);

    let lines = match state.response_tab {
        ResponseTab::Body if response.body.is_empty() => vec![Line::from(Span::styled(
            "(Empty response)",
            Style::default().fg(Color::DarkGray),
        ))],
        ResponseTab::Body => highlight_json(&format_body(&response.body)),
        ResponseTab::Headers if response.headers.is_empty() => vec![Line::from(Span::styled(
            "No headers received",
            Style::default().fg(Color::DarkGray).italic(),
        ))],
        ResponseTab::Headers => response
            .headers
            .iter()
            .map(|(k, v)| {
                Line::from(vec![
                    Span::styled(format!("{}: ", k), Style::default().bold()),
                    Span::raw(v.clone()),
                ])
            })
            .collect(),
    };

    let content = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((state.response_scroll, 0));
    f.render_widget(content, chunks[1]);
}

fn draw_sidebar(f: &mut Frame, state: &RenderState, area: Rect) {
    let is_focused = state.active_panel == Panel::History;
    let title = if state.history.is_empty() {
        " Request History ".to_string()
    } else {
        format!(" Request History ({}) c:clear ", state.history.len())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(focus_style(state, Panel::History))
        .title(title);

    if state.history.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No requests yet",
            Style::default().fg(Color::DarkGray).italic(),
        ))
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .history
        .iter()
        .map(|item| {
            let status = if item.is_pending() {
                Span::styled("Pending", Style::default().fg(Color::DarkGray))
            } else if item.is_failed() {
                Span::styled("Failed", Style::default().fg(Color::Red))
            } else {
                Span::styled(item.status.to_string(), Style::default().fg(status_color(item.status)))
            };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        format!("{:7}", item.method.as_str()),
                        Style::default().fg(method_color(item.method.as_str())).bold(),
                    ),
                    status,
                ]),
                Line::from(display_url(&item.url)),
                Line::from(Span::styled(
                    format_time(&item.timestamp_iso),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();

    let highlight_style = if is_focused {
        Style::default().bg(Color::DarkGray)
    } else {
        Style::default()
    };

    let list = List::new(items).block(block).highlight_style(highlight_style);
    let mut list_state = ListState::default();
    list_state.select(Some(state.selected_history));
    f.render_stateful_widget(list, area, &mut list_state);
}

fn draw_status_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let status = if let Some(hint) = &state.hint {
        format!(" {} ", hint)
    } else if state.is_loading {
        String::from(" Loading... ")
    } else if state.input_mode == InputMode::Editing {
        String::from(" ESC:stop editing | arrows:move | Enter:send (URL) ")
    } else {
        format!(
            " Tab:panel | e:edit | m:method | s:send | x:examples | ^N:new | ?:help | q:quit  [{}] ",
            state.transport_name
        )
    };

    let bar = Paragraph::new(status).style(Style::default().fg(Color::DarkGray));
    f.render_widget(bar, area);
}

fn draw_examples_popup(f: &mut Frame, state: &RenderState, area: Rect) {
    let popup_area = centered_rect(60, 40, area);

    let items: Vec<ListItem> = EXAMPLE_REQUESTS
        .iter()
        .map(|(label, method, url, _)| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{:7}", method), Style::default().fg(method_color(method)).bold()),
                Span::raw(format!("{}  ", label)),
                Span::styled(url.to_string(), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Example APIs (Enter to load, Esc to cancel) ")
                .style(Style::default().bg(Color::Black)),
        )
        .highlight_style(Style::default().fg(Color::Yellow).bold());

    let mut list_state = ListState::default();
    list_state.select(Some(state.selected_example));

    f.render_widget(Clear, popup_area);
    f.render_stateful_widget(list, popup_area, &mut list_state);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    let help_text = format!(
        r#"
 {} {} - Keyboard Shortcuts

 NAVIGATION
   Tab / Shift+Tab    Switch panels
   ↑ / ↓              Scroll response / select header / select history

 REQUEST
   m                  Cycle HTTP method
   s / Ctrl+Enter     Send request
   e / Enter          Edit focused field
   h / b              Headers / Body tab
   x                  Example APIs
   Ctrl+N             New request

 HEADERS
   a                  Add header row
   d                  Remove header row
   Tab (editing)      Switch key / value

 HISTORY
   Enter              Load method + URL
   c                  Clear history

 GENERAL
   Esc                Dismiss error
   ?                  Toggle this help
   q / Ctrl+C         Quit

 Press any key to close...
"#,
        APP_NAME, APP_VERSION
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

/// Place the terminal cursor at a byte offset inside a bordered text area
fn set_cursor(f: &mut Frame, area: Rect, text: &str, cursor: usize) {
    let before = &text[..cursor.min(text.len())];
    let row = before.matches('\n').count() as u16;
    let col = before.rsplit('\n').next().unwrap_or("").chars().count() as u16;
    let max_x = area.x + area.width.saturating_sub(2);
    let max_y = area.y + area.height.saturating_sub(2);
    f.set_cursor_position(Position::new(
        (area.x + 1 + col).min(max_x),
        (area.y + 1 + row).min(max_y),
    ));
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Renders tabs
pub fn render_tabs<'a>(titles: &[&'a str], selected: usize) -> Tabs<'a> {
    let titles: Vec<Line> = titles.iter().map(|t| Line::from(*t)).collect();

    Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::Yellow).bold())
        .divider("|")
}

/// JSON bodies are pretty-printed for display; anything else is shown as-is
pub fn format_body(body: &str) -> String {
    pretty_json(body).unwrap_or_else(|| body.to_string())
}

/// Path and query of a URL, or the input unchanged when it does not parse
pub fn display_url(url: &str) -> String {
    match reqwest::Url::parse(url) {
        Ok(parsed) => match parsed.query() {
            Some(query) => format!("{}?{}", parsed.path(), query),
            None => parsed.path().to_string(),
        },
        Err(_) => url.to_string(),
    }
}

/// Local time-of-day for an RFC 3339 timestamp
pub fn format_time(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| t.with_timezone(&chrono::Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Simple JSON syntax highlighting
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for line in text.lines() {
        let mut spans = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut escaped = false;

        for (idx, c) in line.char_indices() {
            if in_string {
                current.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    // a string directly followed by ':' is an object key
                    let is_key = line[idx + 1..].trim_start().starts_with(':');
                    let color = if is_key { Color::Cyan } else { Color::Green };
                    spans.push(Span::styled(std::mem::take(&mut current), Style::default().fg(color)));
                    in_string = false;
                }
                continue;
            }

            match c {
                '"' => {
                    flush_token(&mut spans, &mut current);
                    in_string = true;
                    current.push(c);
                }
                '{' | '}' | '[' | ']' | ':' | ',' => {
                    flush_token(&mut spans, &mut current);
                    let color = if c == ':' || c == ',' { Color::White } else { Color::Yellow };
                    spans.push(Span::styled(c.to_string(), Style::default().fg(color)));
                }
                ' ' => {
                    flush_token(&mut spans, &mut current);
                    spans.push(Span::raw(" "));
                }
                _ => current.push(c),
            }
        }

        if in_string {
            spans.push(Span::styled(current, Style::default().fg(Color::Green)));
        } else {
            flush_token(&mut spans, &mut current);
        }

        lines.push(Line::from(spans));
    }

    lines
}

/// Color a bare token: numbers, literals or plain text
fn flush_token(spans: &mut Vec<Span<'static>>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    let token = std::mem::take(current);
    let style = match token.as_str() {
        "true" | "false" | "null" => Style::default().fg(Color::Magenta),
        t if t.parse::<f64>().is_ok() => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    };
    spans.push(Span::styled(token, style));
}

/// Status code color
pub fn status_color(code: u16) -> Color {
    match code {
        200..=299 => Color::Green,
        300..=399 => Color::Cyan,
        400..=599 => Color::Red,
        _ => Color::Yellow,
    }
}

/// Method color
pub fn method_color(method: &str) -> Color {
    match method {
        "GET" => Color::Green,
        "POST" => Color::Yellow,
        "PUT" => Color::Blue,
        "PATCH" => Color::Cyan,
        "DELETE" => Color::Red,
        "HEAD" | "OPTIONS" => Color::Magenta,
        _ => Color::White,
    }
}
