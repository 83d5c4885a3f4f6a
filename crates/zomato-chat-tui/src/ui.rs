use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
};
use unicode_width::UnicodeWidthChar;
use zomato_chat_core::{BubbleStyle, Conversation, Message, MessageBubble};
use crate::app::{App, BackendStatus, InputMode};

const ASSISTANT_COLOR: Color = Color::Yellow;
const USER_COLOR: Color = Color::Cyan;

/// Split into words, each paired with the run of whitespace before it.
fn words_with_gaps(text: &str) -> Vec<(&str, &str)> {
    let mut words = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find(|c: char| !c.is_whitespace()) {
        let after = &rest[start..];
        let end = after.find(char::is_whitespace).unwrap_or(after.len());
        words.push((&rest[..start], &after[..end]));
        rest = &after[end..];
    }

    words
}

/// Wrap text to fit within a given width, returning multiple lines.
/// Breaks on word boundaries; a single word longer than the width is split.
/// Leading indentation and runs of spaces between words on the same line
/// are kept.
fn wrap_text_to_width(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();
    let mut current_len = 0;

    for (i, (gap, word)) in words_with_gaps(text).into_iter().enumerate() {
        let gap_len = if i == 0 {
            // Indentation, capped so at least one column is left for text
            current_line = gap.chars().take(width - 1).collect();
            current_len = current_line.chars().count();
            0
        } else {
            gap.chars().count()
        };
        let mut word: String = word.to_string();
        let mut word_len = word.chars().count();

        // Hard-break words that can never fit
        while word_len > width {
            if current_line.trim().is_empty() {
                let room = width - current_len;
                current_line.extend(word.chars().take(room));
                word = word.chars().skip(room).collect();
                word_len -= room;
            }
            lines.push(std::mem::take(&mut current_line));
            current_len = 0;
        }

        if word_len == 0 {
            continue;
        }

        if current_line.trim().is_empty() {
            if current_len + word_len > width {
                current_line.clear();
                current_len = 0;
            }
            current_line.push_str(&word);
            current_len += word_len;
        } else if current_len + gap_len + word_len <= width {
            current_line.push_str(gap);
            current_line.push_str(&word);
            current_len += gap_len + word_len;
        } else {
            lines.push(std::mem::replace(&mut current_line, word));
            current_len = word_len;
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}

/// Convert **bold** markdown in one wrapped line to styled spans. `bold`
/// carries an open marker over to the next line of the same paragraph.
fn parse_markdown_line(text: &str, bold: &mut bool, base: Style) -> Vec<Span<'static>> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    let style_for = |bold: bool| {
        if bold {
            base.add_modifier(Modifier::BOLD)
        } else {
            base
        }
    };

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();
            if !current_text.is_empty() {
                spans.push(Span::styled(std::mem::take(&mut current_text), style_for(*bold)));
            }
            *bold = !*bold;
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::styled(current_text, style_for(*bold)));
    }

    spans
}

/// Lines for one message bubble, already wrapped to `width` columns.
pub fn bubble_lines(message: &Message, width: usize) -> Vec<Line<'static>> {
    let bubble = MessageBubble::new(message);
    // Bubbles take at most four fifths of the row
    let bubble_width = (width * 4 / 5).max(10).min(width.max(1));
    let text_width = bubble_width.saturating_sub(2).max(1);

    let (name, color) = match bubble.style {
        BubbleStyle::Assistant => ("Assistant", ASSISTANT_COLOR),
        BubbleStyle::User => ("You", USER_COLOR),
    };
    let text_style = match bubble.style {
        BubbleStyle::Assistant => Style::default(),
        BubbleStyle::User => Style::default().fg(USER_COLOR),
    };

    // A trailing avatar puts the bubble on the right, edge spans after the text
    let trails = bubble.style.avatar_trails();
    let place = |mut spans: Vec<Span<'static>>, edge: Span<'static>| {
        if trails {
            spans.push(edge);
            Line::from(spans).alignment(Alignment::Right)
        } else {
            spans.insert(0, edge);
            Line::from(spans)
        }
    };

    let mut lines: Vec<Line<'static>> = Vec::new();

    let avatar = if trails {
        format!(" {}", bubble.avatar())
    } else {
        format!("{} ", bubble.avatar())
    };
    lines.push(place(
        vec![Span::styled(name, Style::default().fg(color).add_modifier(Modifier::BOLD))],
        Span::raw(avatar),
    ));

    let gutter = Span::styled(if trails { " │" } else { "│ " }, Style::default().fg(color));
    for paragraph in &bubble.paragraphs {
        // Only assistant replies carry markdown; an unbalanced marker is shown literally
        let markdown = bubble.style == BubbleStyle::Assistant
            && paragraph.matches("**").count() % 2 == 0;
        let mut bold = false;
        for wrapped in wrap_text_to_width(paragraph, text_width) {
            let spans = if markdown {
                parse_markdown_line(&wrapped, &mut bold, text_style)
            } else {
                vec![Span::styled(wrapped, text_style)]
            };
            lines.push(place(spans, gutter.clone()));
        }
    }

    lines.push(Line::default());
    lines
}

/// Every line of the message list, including the typing indicator.
pub fn chat_lines(conversation: &Conversation, animation_frame: u8, width: usize) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = conversation
        .messages()
        .iter()
        .flat_map(|msg| bubble_lines(msg, width))
        .collect();

    if conversation.is_loading() {
        lines.push(Line::from(vec![
            Span::raw(format!("{} ", BubbleStyle::Assistant.avatar())),
            Span::styled(
                "Assistant",
                Style::default().fg(ASSISTANT_COLOR).add_modifier(Modifier::BOLD),
            ),
        ]));
        // Animated dots: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize % 3) + 1);
        lines.push(Line::from(vec![
            Span::styled("│ ", Style::default().fg(ASSISTANT_COLOR)),
            Span::styled(
                format!("typing{}", dots),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    lines
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, messages, input, footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);
    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);

    if app.show_tools {
        render_tools_popup(app, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let status = match &app.backend_status {
        BackendStatus::Unknown => Span::styled(" ○ connecting ", Style::default().fg(Color::Gray)),
        BackendStatus::Healthy(service) => {
            Span::styled(format!(" ● {} ", service), Style::default().fg(Color::Green))
        }
        BackendStatus::Unreachable => {
            Span::styled(" ● backend unreachable ", Style::default().fg(Color::Red))
        }
    };

    let title = Line::from(vec![
        Span::styled(" 🍕 Zomato AI Assistant ", Style::default().fg(Color::Cyan).bold()),
        Span::styled("Powered by Claude & MCP ", Style::default().fg(Color::Gray)),
        status,
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(" Conversation ");
    let inner = block.inner(area);

    // Store area and inner size for hit-testing and scroll calculations
    app.chat_area = Some(area);
    app.chat_height = inner.height;
    app.chat_width = inner.width;

    let lines = chat_lines(&app.conversation, app.animation_frame, inner.width as usize);
    let total_lines = u16::try_from(lines.len()).unwrap_or(u16::MAX);

    app.scroll.observe_revision(app.conversation.revision());
    app.scroll.set_bounds(total_lines, inner.height);

    let chat = Paragraph::new(Text::from(lines))
        .block(block)
        .scroll((app.scroll.offset(), 0));
    frame.render_widget(chat, area);

    if app.scroll.max_offset() > 0 {
        let mut scrollbar_state = ScrollbarState::new(app.scroll.max_offset() as usize)
            .position(app.scroll.offset() as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;
    let enabled = app.input_enabled();

    let (title, border_color) = if !enabled {
        (" Waiting for reply... ", Color::DarkGray)
    } else if editing {
        (" Message (Enter to send) ", Color::Yellow)
    } else {
        (" Message (i to type) ", Color::DarkGray)
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Calculate visible portion of input with horizontal scrolling
    let inner_width = area.width.saturating_sub(2) as usize;
    let (scroll_offset, cursor_x) = input_viewport(&app.input, app.input_cursor, inner_width);

    let input = if app.input.is_empty() && !editing {
        Paragraph::new(Span::styled(
            "Type your message...",
            Style::default().fg(Color::DarkGray),
        ))
    } else {
        let mut used = 0;
        let visible_text: String = app
            .input
            .chars()
            .skip(scroll_offset)
            .take_while(|&c| {
                used += char_width(c);
                used <= inner_width
            })
            .collect();
        let color = if enabled { USER_COLOR } else { Color::DarkGray };
        Paragraph::new(visible_text).style(Style::default().fg(color))
    };

    frame.render_widget(input.block(input_block), area);

    // Show cursor when editing
    if editing && enabled {
        let cursor_x = u16::try_from(cursor_x).unwrap_or(u16::MAX);
        frame.set_cursor_position((area.x.saturating_add(cursor_x) + 1, area.y + 1));
    }
}

fn char_width(c: char) -> usize {
    UnicodeWidthChar::width(c).unwrap_or(0)
}

/// First visible char and cursor column of a one-line input `width` columns
/// wide. Measured in display columns, so wide glyphs keep the cursor aligned.
fn input_viewport(input: &str, cursor: usize, width: usize) -> (usize, usize) {
    let widths: Vec<usize> = input.chars().take(cursor).map(char_width).collect();
    let mut skip = 0;
    let mut cursor_x: usize = widths.iter().sum();

    // The cursor needs a column of its own
    while width > 0 && cursor_x >= width && skip < widths.len() {
        cursor_x -= widths[skip];
        skip += 1;
    }

    (skip, cursor_x)
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" INSERT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if let Some(status) = &app.status_message {
        vec![Span::styled(format!(" {} ", status), Style::default().bg(Color::Black).fg(Color::Yellow))]
    } else if app.show_tools {
        vec![
            Span::styled(" j/k ", key_style),
            Span::styled(" nav ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ]
    } else {
        match app.input_mode {
            InputMode::Editing => vec![
                Span::styled(" Enter ", key_style),
                Span::styled(" send ", label_style),
                Span::styled(" Esc ", key_style),
                Span::styled(" stop typing ", label_style),
                Span::styled(" Ctrl-C ", key_style),
                Span::styled(" quit ", label_style),
            ],
            InputMode::Normal => vec![
                Span::styled(" i ", key_style),
                Span::styled(" type ", label_style),
                Span::styled(" j/k ", key_style),
                Span::styled(" scroll ", label_style),
                Span::styled(" g/G ", key_style),
                Span::styled(" top/bottom ", label_style),
                Span::styled(" r ", key_style),
                Span::styled(" reset chat ", label_style),
                Span::styled(" t ", key_style),
                Span::styled(" tools ", label_style),
                Span::styled(" q ", key_style),
                Span::styled(" quit ", label_style),
            ],
        }
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

fn render_tools_popup(app: &mut App, frame: &mut Frame, area: Rect) {
    // Calculate popup size and position (centered)
    let popup_width = 70.min(area.width.saturating_sub(4));
    let popup_height = (app.tools.len().max(1) as u16 + 2).min(area.height.saturating_sub(4));

    let popup_x = (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = (area.height.saturating_sub(popup_height)) / 2;

    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Backend Tools ({}) - Esc to close ", app.tools.len()));

    if app.tools.is_empty() {
        let empty = Paragraph::new("The backend exposes no tools.")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, popup_area);
        return;
    }

    let items: Vec<ListItem> = app
        .tools
        .iter()
        .map(|tool| {
            let mut spans = vec![Span::styled(
                format!(" {} ", tool.name),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )];
            if let Some(description) = &tool.description {
                spans.push(Span::styled(
                    description.clone(),
                    Style::default().fg(Color::Gray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, popup_area, &mut app.tools_state);
}
