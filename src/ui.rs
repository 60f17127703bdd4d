use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};
use paper_search_core::{ChatRole, DisplayItem, RequestState, Variant};
use crate::app::{App, InputMode};

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    for (i, part) in text.split("**").enumerate() {
        if part.is_empty() {
            continue;
        }
        // Odd segments sit between a pair of markers
        if i % 2 == 1 {
            spans.push(Span::styled(
                part.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else {
            spans.push(Span::raw(part.to_string()));
        }
    }

    // An unmatched trailing marker leaves an even number of parts; show it literally
    if text.matches("**").count() % 2 == 1 {
        return Line::from(text.to_string());
    }

    Line::from(spans)
}

/// "Searching", "Searching.", ... driven by the tick animation
fn busy_label(word: &str, frame: u8) -> String {
    format!("{}{}", word, ".".repeat(frame as usize + 1))
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

    match app.mode {
        Variant::Search | Variant::Papers => render_search_screen(app, frame, body_area),
        Variant::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        " Research Paper Search ",
        Style::default().fg(Color::Cyan).bold(),
    )];

    for (i, variant) in Variant::all().into_iter().enumerate() {
        let style = if variant == app.mode {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        let busy = if app.submitter(variant).is_busy() { "*" } else { "" };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(
            format!(" {} {}{} ", i + 1, variant.display_name(), busy),
            style,
        ));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.mode {
        Variant::Search => " SEARCH ",
        Variant::Papers => " PAPERS ",
        Variant::Chat => " CHAT ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(if app.mode == Variant::Chat { " send " } else { " search " }, label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
            Span::styled(" C-l ", key_style),
            Span::styled(" clear ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" j/k ", key_style),
            Span::styled(if app.mode == Variant::Chat { " scroll " } else { " nav " }, label_style),
            Span::styled(" i ", key_style),
            Span::styled(" edit ", label_style),
            Span::styled(" Tab/1-3 ", key_style),
            Span::styled(" mode ", label_style),
            Span::styled(" C-l ", key_style),
            Span::styled(" clear ", label_style),
            Span::styled(" q ", key_style),
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

fn render_input(app: &App, frame: &mut Frame, area: Rect, title: String) {
    let editing = app.input_mode == InputMode::Editing;
    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if editing { Color::Yellow } else { Color::DarkGray }))
        .title(title);

    // Horizontal scrolling keeps the cursor inside the box (inner width excludes borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.query_cursor;
    let scroll_offset = if inner_width > 0 && cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    let visible_text: String = app
        .query_input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(input_block);

    frame.render_widget(input, area);

    if editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_search_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Layout: search input at top, results below split into list and preview
    let [input_area, results_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
    ])
    .areas(area);

    let submitter = app.current();
    let input_title = if submitter.is_busy() {
        format!(" {} ", busy_label("Searching", app.animation_frame))
    } else {
        match app.mode {
            Variant::Papers => " Find papers ".to_string(),
            _ => " Enter search query ".to_string(),
        }
    };
    render_input(app, frame, input_area, input_title);

    let [list_area, preview_area] = Layout::horizontal([
        Constraint::Percentage(40),
        Constraint::Percentage(60),
    ])
    .areas(results_area);
    app.results_area = Some(list_area);

    let submitter = app.current();
    let results = submitter.results();

    let results_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(format!(" Results ({}) ", results.len()));

    if results.is_empty() {
        let placeholder = match submitter.state() {
            RequestState::Idle => "Type a query and press Enter",
            RequestState::InFlight { .. } => "",
            RequestState::Succeeded | RequestState::Failed => "No results",
        };
        let empty = Paragraph::new(Span::styled(placeholder, Style::default().fg(Color::DarkGray)))
            .block(results_block);
        frame.render_widget(empty, list_area);
    } else {
        let items: Vec<ListItem> = results
            .iter()
            .map(|item| ListItem::new(format!(" {} ", item.headline())))
            .collect();

        let list = List::new(items)
            .block(results_block)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        frame.render_stateful_widget(list, list_area, &mut app.results_state);
    }

    let preview_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Preview ");

    let selected = app
        .results_state
        .selected()
        .and_then(|i| app.current().results().get(i));

    let preview_text = match selected {
        Some(DisplayItem::Text { content }) => Text::from(content.as_str()),
        Some(DisplayItem::Paper { title, authors, summary }) => Text::from(vec![
            Line::from(Span::styled(title.as_str(), Style::default().fg(Color::Yellow).bold())),
            Line::from(Span::styled(authors.join(", "), Style::default().fg(Color::DarkGray))),
            Line::default(),
            Line::from(summary.as_str()),
        ]),
        None => Text::from("Select a result to preview"),
    };

    let preview = Paragraph::new(preview_text)
        .block(preview_block)
        .wrap(Wrap { trim: true });

    frame.render_widget(preview, preview_area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    // Chat history on top, input at the bottom
    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(area);

    app.results_area = Some(chat_area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if app.input_mode == InputMode::Normal {
            Color::Cyan
        } else {
            Color::DarkGray
        }))
        .title(" Research assistant ");

    let chat = &app.chat;
    let chat_text = if chat.history().is_empty() && !chat.is_busy() {
        Text::from(Span::styled(
            "Ask something about research papers...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for msg in chat.history() {
            match msg.role {
                ChatRole::User => {
                    lines.push(Line::from(Span::styled(
                        msg.role.label(),
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(msg.content.as_str()));
                }
                ChatRole::Assistant => {
                    lines.push(Line::from(Span::styled(
                        msg.role.label(),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in msg.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
            }
            lines.push(Line::default());
        }

        if chat.is_busy() {
            lines.push(Line::from(Span::styled(
                ChatRole::Assistant.label(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                busy_label("Thinking", app.animation_frame),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat_widget = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat_widget, chat_area);

    render_input(app, frame, input_area, " Ask ".to_string());
}
