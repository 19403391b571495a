use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};
use crate::app::{App, Screen};
use crate::input::InputField;
use crate::state::ChatRole;

/// Parse one line of assistant output into styled spans.
///
/// Handles `# headings`, `- bullets`, `**bold**` and `*italic*`; anything
/// else is shown literally.
pub fn parse_markdown_line(text: &str) -> Line<'static> {
    let trimmed = text.trim_start();

    if trimmed.starts_with('#') {
        let heading = trimmed.trim_start_matches('#').trim_start();
        return Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
    }

    let mut spans: Vec<Span<'static>> = Vec::new();
    let item = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "));
    let body = match item {
        Some(item) => {
            spans.push(Span::raw("  • "));
            item
        }
        None => text,
    };

    parse_inline(body, &mut spans);

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn parse_inline(text: &str, spans: &mut Vec<Span<'static>>) {
    let mut current_text = String::new();
    let mut rest = text;

    while let Some(c) = rest.chars().next() {
        if let Some(after) = rest.strip_prefix("**") {
            if let Some(end) = after.find("**").filter(|end| *end > 0) {
                flush(&mut current_text, spans);
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after[end + 2..];
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                rest = after;
            }
        } else if let Some(after) = rest.strip_prefix('*') {
            let closing = after
                .find('*')
                .filter(|end| *end > 0 && !after.starts_with(' '));
            if let Some(end) = closing {
                flush(&mut current_text, spans);
                spans.push(Span::styled(
                    after[..end].to_string(),
                    Style::default().add_modifier(Modifier::ITALIC),
                ));
                rest = &after[end + 1..];
            } else {
                current_text.push('*');
                rest = after;
            }
        } else {
            current_text.push(c);
            rest = &rest[c.len_utf8()..];
        }
    }

    flush(&mut current_text, spans);
}

fn flush(current_text: &mut String, spans: &mut Vec<Span<'static>>) {
    if !current_text.is_empty() {
        spans.push(Span::raw(std::mem::take(current_text)));
    }
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen() {
        Screen::Upload => render_upload_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    if app.screen() == Screen::Chat && app.show_file_prompt {
        render_file_prompt(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let session_indicator = match &app.session_id {
        Some(id) => format!(" [session {}]", id),
        None => String::new(),
    };

    let title = Line::from(vec![
        Span::styled(" Legal Insight ", Style::default().fg(Color::White).bold()),
        Span::styled("Agent ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(session_indicator, Style::default().fg(Color::Gray)),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.screen() {
        Screen::Upload => (" UPLOAD ", Style::default().bg(Color::Blue).fg(Color::White)),
        Screen::Chat => (" CHAT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match (app.screen(), app.show_file_prompt) {
        (Screen::Upload, _) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" upload ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" quit ", label_style),
        ],
        (Screen::Chat, true) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" upload ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" cancel ", label_style),
        ],
        (Screen::Chat, false) => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" ↑/↓ ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Ctrl+O ", key_style),
            Span::styled(" change document ", label_style),
            Span::styled(" Ctrl+C ", key_style),
            Span::styled(" quit ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Bordered single-line input, scrolled horizontally to keep the cursor visible
fn render_input(field: &InputField, frame: &mut Frame, area: Rect, title: &str, active: bool) {
    let border_color = if active { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title.to_string());

    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_col) = field.visible(inner_width);

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);
    frame.render_widget(input, area);

    if active {
        frame.set_cursor_position((area.x + 1 + cursor_col as u16, area.y + 1));
    }
}

fn loading_dots(app: &App) -> String {
    ".".repeat((app.animation_frame as usize) + 1)
}

fn render_upload_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let panel_width = 72.min(area.width.saturating_sub(4));
    let panel_height = 14.min(area.height);
    let panel = Rect::new(
        area.x + area.width.saturating_sub(panel_width) / 2,
        area.y + area.height.saturating_sub(panel_height) / 2,
        panel_width,
        panel_height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Contract Analysis ");
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let [intro_area, input_area, caption_area, status_area] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Length(3),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(inner);

    let intro = Paragraph::new(Text::from(vec![
        Line::from(Span::styled(
            "Intelligent contract analysis",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Upload your PDF document to extract its information and ask about it.",
            Style::default().fg(Color::Gray),
        )),
    ]))
    .wrap(Wrap { trim: true });
    frame.render_widget(intro, intro_area);

    render_input(&app.file_path, frame, input_area, " Path to PDF ", !app.loading);

    let caption = if app.loading {
        Span::styled(
            format!("Processing file{}", loading_dots(app)),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::styled("Press Enter to start", Style::default().fg(Color::Gray))
    };
    frame.render_widget(Paragraph::new(Line::from(caption)), caption_area);

    if !app.status.is_empty() {
        let status = Paragraph::new(app.status.as_str())
            .style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .wrap(Wrap { trim: true });
        frame.render_widget(status, status_area);
    }
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let status_height = if app.status.is_empty() || app.show_file_prompt { 0 } else { 1 };
    let [chat_area, status_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(status_height),
        Constraint::Length(3),
    ])
    .areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_area = Some(chat_area);
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_title = match &app.session_id {
        Some(id) => format!(" Contract session {} ", id),
        None => " Contract ".to_string(),
    };
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(chat_title);

    let mut lines: Vec<Line> = Vec::new();
    for msg in &app.messages {
        match msg.role {
            ChatRole::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            ChatRole::Assistant => {
                lines.push(Line::from(Span::styled(
                    "Agent:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in msg.content.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.loading {
        lines.push(Line::from(Span::styled(
            "Agent:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("Analyzing the contract{}", loading_dots(app)),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    // Measure with the same wrapping that is drawn, borders excluded
    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    let total_lines = chat.line_count(app.chat_width);
    app.set_transcript_height(u16::try_from(total_lines).unwrap_or(u16::MAX));

    let chat = chat.block(chat_block).scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    if status_height > 0 {
        let status = Paragraph::new(app.status.as_str()).style(Style::default().fg(Color::Yellow));
        frame.render_widget(status, status_area);
    }

    let input_title = if app.loading {
        " Waiting for the agent... "
    } else {
        " Ask about the contract "
    };
    let active = !app.loading && !app.show_file_prompt;
    render_input(&app.question, frame, input_area, input_title, active);
}

fn render_file_prompt(app: &App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 64.min(area.width.saturating_sub(4));
    let popup_height = 8;

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height.min(area.height));

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Change document ");

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [instructions_area, input_area, status_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(inner);

    let instructions = Paragraph::new("Path to the new PDF. Enter to upload, Esc to cancel.")
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(instructions, instructions_area);

    render_input(&app.file_path, frame, input_area, " Path to PDF ", !app.loading);

    let status_line = if app.loading {
        Span::styled(
            format!("Processing file{}", loading_dots(app)),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )
    } else {
        Span::styled(app.status.clone(), Style::default().fg(Color::Yellow))
    };
    frame.render_widget(Paragraph::new(Line::from(status_line)), status_area);
}
