use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState, Wrap,
    },
};
use crate::app::{App, FocusPane, InputMode, Sender, DEPARTMENTS, SUGGESTIONS};

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
    render_body(app, frame, body_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![
        Span::styled(" Daystar AI ", Style::default().fg(Color::Cyan).bold()),
        Span::styled(
            " Daystar Institutional Knowledge AI ",
            Style::default().fg(Color::Gray).italic(),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ];

    // Language label sits at the right edge, like the navbar dropdown
    let language = Span::styled(
        format!(" 🌐 {} ", app.language.label()),
        Style::default().fg(Color::White).bold(),
    );
    let used: usize = spans.iter().map(|s| s.width()).sum::<usize>() + language.width();
    let pad = (area.width as usize).saturating_sub(used);
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(language);

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_body(app: &mut App, frame: &mut Frame, area: Rect) {
    // Collapsed sidebar keeps a narrow icon strip, like the web UI
    let sidebar_width = if app.sidebar_open { 26 } else { 4 };
    let [sidebar_area, chat_area] = Layout::horizontal([
        Constraint::Length(sidebar_width),
        Constraint::Min(0),
    ])
    .areas(area);

    render_sidebar(app, frame, sidebar_area);
    render_chat_panel(app, frame, chat_area);
}

fn render_sidebar(app: &mut App, frame: &mut Frame, area: Rect) {
    app.sidebar_area = Some(area);

    let sidebar_focused = app.focus == FocusPane::Sidebar;
    let border_color = if sidebar_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(if app.sidebar_open { " Menu " } else { "" });
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let [button_area, label_area, list_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(inner);

    // New Chat button; the collapsed strip has no room for its border
    let button = if app.sidebar_open {
        Paragraph::new("+ New Chat (n)")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Blue).bold())
            .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Blue)))
    } else {
        Paragraph::new("+")
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Blue).bold())
    };
    frame.render_widget(button, button_area);

    if app.sidebar_open {
        let label = Paragraph::new(" DEPARTMENTS")
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::DIM));
        frame.render_widget(label, label_area);
    }

    let items: Vec<ListItem> = DEPARTMENTS
        .iter()
        .map(|dept| {
            if app.sidebar_open {
                ListItem::new(Text::from(vec![
                    Line::from(vec![
                        Span::styled(format!(" {} ", dept.icon), Style::default().fg(Color::Blue)),
                        Span::styled(dept.name, Style::default().fg(Color::White).bold()),
                    ]),
                    Line::from(Span::styled(
                        format!("    {}", dept.description),
                        Style::default().fg(Color::Gray),
                    )),
                ]))
            } else {
                ListItem::new(format!(" {}", dept.icon))
            }
        })
        .collect();

    let list = List::new(items)
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(if app.sidebar_open { "> " } else { "" });

    frame.render_stateful_widget(list, list_area, &mut app.sidebar_state);
}

fn render_chat_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let [messages_area, suggestions_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(area);

    render_messages(app, frame, messages_area);
    render_suggestions(app, frame, suggestions_area);
    render_input(app, frame, input_area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    // Store chat dimensions for scroll calculations (inner size minus borders)
    app.chat_height = area.height.saturating_sub(2);
    app.chat_width = area.width.saturating_sub(2);

    let chat_focused = app.focus == FocusPane::Chat;
    let border_color = if chat_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" DIKAI Assistant ");

    if app.messages.is_empty() && !app.is_loading() {
        render_hero(frame, block, area);
        return;
    }

    let mut lines: Vec<Line> = Vec::new();

    for msg in &app.messages {
        match msg.sender {
            Sender::User => {
                lines.push(Line::from(Span::styled(
                    "You:",
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
            }
            Sender::Bot => {
                lines.push(Line::from(Span::styled(
                    "DIKAI:",
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                for line in msg.text.lines() {
                    lines.push(Line::from(line.to_string()));
                }
                for source in &msg.sources {
                    lines.push(Line::from(vec![
                        Span::styled("  ↳ ", Style::default().fg(Color::Gray)),
                        Span::styled(
                            source.clone(),
                            Style::default()
                                .fg(Color::Blue)
                                .add_modifier(Modifier::UNDERLINED),
                        ),
                    ]));
                }
            }
        }
        lines.push(Line::default());
    }

    if app.is_loading() {
        lines.push(Line::from(Span::styled(
            "DIKAI:",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        )));
    }

    let total_lines = lines.len() as u16;

    let chat = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(chat, area);

    if total_lines > app.chat_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state =
            ScrollbarState::new(total_lines as usize).position(app.chat_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn render_hero(frame: &mut Frame, block: Block, area: Rect) {
    let inner = block.inner(area);

    let mut lines: Vec<Line> = Vec::new();
    for _ in 0..inner.height.saturating_sub(8) / 2 {
        lines.push(Line::default());
    }
    lines.push(Line::from(Span::styled(
        "How can I assist you today?",
        Style::default().fg(Color::Blue).bold(),
    )));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "I'm your Daystar University assistant. Ask me about admissions,",
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::from(Span::styled(
        "courses, fees, schedules, or any other university-related information.",
        Style::default().fg(Color::Gray),
    )));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(
        "Karibu DIKAI! Niulize chochote kwa Kiingereza au Kiswahili.",
        Style::default().fg(Color::Gray).italic(),
    )));

    let hero = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(hero, area);
}

fn render_suggestions(app: &App, frame: &mut Frame, area: Rect) {
    let suggestions_focused = app.focus == FocusPane::Suggestions;
    let border_color = if suggestions_focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Quick Questions ");

    let mut spans: Vec<Span> = Vec::new();
    for (i, text) in SUGGESTIONS.iter().enumerate() {
        let selected = suggestions_focused && i == app.suggestion_idx;
        let style = if selected {
            Style::default().bg(Color::Blue).fg(Color::White).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(format!(" {} ", text), style));
        if i + 1 < SUGGESTIONS.len() {
            spans.push(Span::raw(" "));
        }
    }

    let chips = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(chips, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let input_focused = app.focus == FocusPane::Input;
    let border_color = if input_focused || app.input_mode == InputMode::Editing {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Type your question here ");

    // Calculate visible portion of input with horizontal scrolling
    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let cursor_pos = app.input_cursor;

    // Calculate scroll offset to keep cursor visible
    let scroll_offset = if inner_width == 0 {
        0
    } else if cursor_pos >= inner_width {
        cursor_pos - inner_width + 1
    } else {
        0
    };

    // Get the visible slice of the input
    let visible_text: String = app
        .input
        .chars()
        .skip(scroll_offset)
        .take(inner_width)
        .collect();

    let input = Paragraph::new(visible_text)
        .style(Style::default().fg(Color::Cyan))
        .block(block);

    frame.render_widget(input, area);

    // Show cursor when editing
    if app.input_mode == InputMode::Editing {
        let cursor_x = (cursor_pos - scroll_offset) as u16;
        frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };

    let mode_text = match app.input_mode {
        InputMode::Normal => " VIEW ",
        InputMode::Editing => " TYPE ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.input_mode == InputMode::Editing {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" stop typing ", label_style),
        ]
    } else {
        let mut hints = vec![
            Span::styled(" Tab ", key_style),
            Span::styled(" focus ", label_style),
        ];

        match app.focus {
            FocusPane::Sidebar => {
                hints.extend(vec![
                    Span::styled(" j/k ", key_style),
                    Span::styled(" departments ", label_style),
                ]);
            }
            FocusPane::Chat => {
                hints.extend(vec![
                    Span::styled(" j/k ", key_style),
                    Span::styled(" scroll ", label_style),
                    Span::styled(" g/G ", key_style),
                    Span::styled(" top/bottom ", label_style),
                ]);
            }
            FocusPane::Suggestions => {
                hints.extend(vec![
                    Span::styled(" h/l ", key_style),
                    Span::styled(" choose ", label_style),
                    Span::styled(" Enter ", key_style),
                    Span::styled(" send ", label_style),
                ]);
            }
            FocusPane::Input => {
                hints.extend(vec![
                    Span::styled(" i ", key_style),
                    Span::styled(" type ", label_style),
                ]);
            }
        }

        hints.extend(vec![
            Span::styled(" n ", key_style),
            Span::styled(" new chat ", label_style),
            Span::styled(" s ", key_style),
            Span::styled(if app.sidebar_open { " collapse " } else { " expand " }, label_style),
            Span::styled(" L ", key_style),
            Span::styled(" language ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]);
        hints
    };

    let mut footer_spans = vec![
        Span::styled(mode_text, mode_style),
        Span::styled(" ", label_style),
    ];
    footer_spans.extend(hints);

    let footer = Paragraph::new(Line::from(footer_spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}
