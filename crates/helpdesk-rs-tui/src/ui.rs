//! Rendering routines for the help desk TUI.

use crate::app::{App, Focus, SidebarRow};
use helpdesk_rs_core::{Phase, ToolKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation,
    ScrollbarState, Wrap,
};

const PRIMARY: Color = Color::Rgb(236, 91, 43);
const SECONDARY: Color = Color::Rgb(238, 121, 72);
const TEXT: Color = Color::Rgb(238, 238, 238);
const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);
const BORDER: Color = Color::Rgb(60, 60, 60);
const BORDER_ACTIVE: Color = Color::Rgb(238, 121, 72);
const YELLOW: Color = Color::Rgb(229, 192, 123);
const GREEN: Color = Color::Rgb(120, 220, 140);

const SIDEBAR_WIDTH: u16 = 34;
/// Below this width the sidebar is only reachable through the overlay.
const NARROW_WIDTH: u16 = 90;
const HEADER_HEIGHT: u16 = 4;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame<'_>, app: &mut App) {
    let area = frame.area();
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // sidebar + chat
            Constraint::Length(3), // input
            Constraint::Length(1), // status bar
        ])
        .split(area);

    let show_sidebar = area.width >= NARROW_WIDTH;
    let main = if show_sidebar {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .split(root[0]);
        draw_sidebar(frame, app, cols[0]);
        cols[1]
    } else {
        root[0]
    };

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_HEIGHT), Constraint::Min(0)])
        .split(main);
    draw_header(frame, app, right[0]);
    draw_chat(frame, app, right[1]);
    draw_input(frame, app, root[1]);
    draw_status_bar(frame, app, root[2]);

    if app.desk.selector().overlay_open() {
        draw_overlay(frame, app, area);
    }
}

/// Active tool name, description and composer state.
fn draw_header(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let tool = app.desk.active_tool();
    let label_style = Style::default().fg(TEXT_MUTED);
    let value_style = Style::default().fg(TEXT);

    let mut info = vec![
        Span::styled(" category ", label_style),
        Span::styled(tool.category.label(), value_style),
        Span::styled("  mode ", label_style),
        Span::styled(model_label(app), value_style),
    ];
    if matches!(tool.kind, ToolKind::Image | ToolKind::Video) {
        info.push(Span::styled("  aspect ", label_style));
        info.push(Span::styled(
            app.desk.composer().aspect_ratio.to_string(),
            value_style,
        ));
    }
    if let Some(attachment) = app.desk.composer().attachment.as_ref() {
        info.push(Span::styled("  attached ", label_style));
        info.push(Span::styled(attachment.file_name.clone(), Style::default().fg(GREEN)));
    }

    let lines = vec![
        Line::from(vec![
            Span::styled(
                format!(" {}", tool.name),
                Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  v{VERSION}"), label_style),
        ]),
        Line::from(Span::styled(format!(" {}", tool.description), value_style)),
        Line::from(info),
    ];

    let block = Block::default()
        .borders(Borders::TOP | Borders::LEFT | Borders::RIGHT)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn model_label(app: &App) -> String {
    let tool = app.desk.active_tool();
    match tool.model_override.as_deref() {
        Some(model) => format!("{} ({model})", tool.kind.as_str()),
        None => tool.kind.as_str().to_string(),
    }
}

fn sidebar_lines(app: &App) -> Vec<Line<'static>> {
    let active = app.desk.active_tool().id.clone();
    let focused = matches!(app.focus, Focus::Sidebar | Focus::Search);
    let rows = app.sidebar_rows();
    if rows.is_empty() {
        return vec![Line::from(Span::styled(
            " No tools match.",
            Style::default().fg(TEXT_MUTED),
        ))];
    }

    rows.iter()
        .enumerate()
        .map(|(idx, row)| {
            let selected = focused && idx == app.cursor;
            let marker = if selected { ">" } else { " " };
            match row {
                SidebarRow::Category {
                    category,
                    expanded,
                    count,
                } => {
                    let arrow = if *expanded { "▾" } else { "▸" };
                    let style = if selected {
                        Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
                    } else {
                        Style::default().fg(TEXT_MUTED).add_modifier(Modifier::BOLD)
                    };
                    Line::from(vec![
                        Span::styled(format!("{marker}{arrow} {}", category.label()), style),
                        Span::styled(format!(" {count}"), Style::default().fg(BORDER)),
                    ])
                }
                SidebarRow::Tool(tool) => {
                    let style = if selected {
                        Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD)
                    } else if tool.id == active {
                        Style::default().fg(SECONDARY)
                    } else {
                        Style::default().fg(TEXT)
                    };
                    let mut spans = vec![Span::styled(format!("{marker}   {}", tool.name), style)];
                    if tool.flags.is_new {
                        spans.push(Span::styled(" new", Style::default().fg(GREEN)));
                    }
                    if tool.flags.is_popular {
                        spans.push(Span::styled(" popular", Style::default().fg(YELLOW)));
                    }
                    Line::from(spans)
                }
            }
        })
        .collect()
}

/// Draw the search box above the grouped tool list.
fn draw_sidebar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let query = app.desk.selector().query();
    let searching = app.focus == Focus::Search;
    let search = if query.is_empty() && !searching {
        Span::styled(" / to search", Style::default().fg(TEXT_MUTED))
    } else {
        Span::styled(format!(" {query}"), Style::default().fg(TEXT))
    };
    let search_block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if searching { BORDER_ACTIVE } else { BORDER }))
        .title(Span::styled(" Search ", Style::default().fg(TEXT_MUTED)));
    let search_inner = search_block.inner(parts[0]);
    frame.render_widget(Paragraph::new(Line::from(search)).block(search_block), parts[0]);
    if searching {
        frame.set_cursor_position((search_inner.x + 1 + query.len() as u16, search_inner.y));
    }

    draw_tool_list(frame, app, parts[1], " Tools ");
}

fn draw_tool_list(frame: &mut Frame<'_>, app: &App, area: Rect, title: &'static str) {
    let focused = matches!(app.focus, Focus::Sidebar | Focus::Search);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(if focused { BORDER_ACTIVE } else { BORDER }))
        .title(Span::styled(title, Style::default().fg(TEXT_MUTED)));
    let inner = block.inner(area);

    // Keep the cursor row visible.
    let height = inner.height as usize;
    let offset = if height > 0 && app.cursor >= height {
        app.cursor + 1 - height
    } else {
        0
    };
    let list = Paragraph::new(sidebar_lines(app))
        .block(block)
        .scroll((offset as u16, 0));
    frame.render_widget(list, area);
}

/// Centered tool picker toggled with Ctrl+T.
fn draw_overlay(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let width = area.width.saturating_sub(4).min(60);
    let height = area.height.saturating_sub(4).min(30);
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(popup);
    draw_tool_list(frame, app, parts[0], " Choose a tool ");
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            " Enter select  Left/Right fold  Esc close",
            Style::default().fg(TEXT_MUTED),
        )))
        .style(Style::default().bg(Color::Rgb(20, 20, 20))),
        parts[1],
    );
}

/// Draw the chat transcript with border and scrollbar.
fn draw_chat(frame: &mut Frame<'_>, app: &mut App, area: Rect) {
    let lines = app.render_lines();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER))
        .title(Span::styled(" Conversation ", Style::default().fg(TEXT_MUTED)));

    let inner = block.inner(area);
    let content_width = inner.width.saturating_sub(1); // -1 for scrollbar
    let content_height = inner.height as usize;

    let total_lines = Paragraph::new(lines.clone())
        .wrap(Wrap { trim: false })
        .line_count(content_width)
        .max(1);

    let max_scroll = total_lines.saturating_sub(content_height) as u16;
    app.update_scroll_bounds(max_scroll);
    let scroll = app.scroll;

    let chat_inner = Rect {
        width: inner.width.saturating_sub(1),
        ..inner
    };

    let chat = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));

    frame.render_widget(block, area);
    frame.render_widget(chat, chat_inner);

    if total_lines > content_height {
        let mut scrollbar_state = ScrollbarState::default()
            .content_length(total_lines)
            .position(scroll as usize)
            .viewport_content_length(content_height);
        let scrollbar_area = Rect {
            x: inner.x + inner.width.saturating_sub(1),
            y: inner.y,
            width: 1,
            height: inner.height,
        };
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .style(Style::default().fg(BORDER))
                .thumb_style(Style::default().fg(TEXT_MUTED)),
            scrollbar_area,
            &mut scrollbar_state,
        );
    }
}

/// Draw the input box with border and cursor.
fn draw_input(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let is_active = app.focus == Focus::Input && !app.desk.selector().overlay_open();
    let loading = app.desk.is_loading();
    let border_color = if is_active { BORDER_ACTIVE } else { BORDER };
    let title = if loading { " Waiting for reply " } else { " Message " };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .title(Span::styled(
            title,
            Style::default().fg(if is_active { SECONDARY } else { TEXT_MUTED }),
        ));

    let inner = block.inner(area);
    let input = app.desk.composer().input.as_str();
    let prompt_style = Style::default().fg(PRIMARY).add_modifier(Modifier::BOLD);
    let input_text = if input.is_empty() {
        Line::from(vec![
            Span::styled(" ", prompt_style),
            Span::styled(placeholder(app), Style::default().fg(TEXT_MUTED)),
        ])
    } else {
        Line::from(vec![
            Span::styled(" ", prompt_style),
            Span::styled(input, Style::default().fg(TEXT)),
        ])
    };

    frame.render_widget(block, area);
    frame.render_widget(Paragraph::new(input_text), inner);

    if is_active {
        frame.set_cursor_position((inner.x + 1 + input.chars().count() as u16, inner.y));
    }
}

fn placeholder(app: &App) -> &'static str {
    match app.desk.active_tool().kind {
        ToolKind::Transcribe => "Attach audio with /attach <path>, then press Enter...",
        ToolKind::Image => "Describe the image, or /attach a photo to edit...",
        ToolKind::Video => "Describe the video scene...",
        ToolKind::Research => "Ask a question to research on the web...",
        ToolKind::Text | ToolKind::Strategy => "Describe what you need...",
    }
}

/// Draw the status bar at the bottom.
fn draw_status_bar(frame: &mut Frame<'_>, app: &App, area: Rect) {
    let status_color = match app.desk.phase() {
        Phase::Sending => PRIMARY,
        Phase::Idle | Phase::Settled => TEXT_MUTED,
        Phase::Composing => YELLOW,
    };

    let shortcuts = vec![
        Span::styled(" Esc", Style::default().fg(TEXT_MUTED)),
        Span::styled(" quit", Style::default().fg(BORDER)),
        Span::styled("  Tab", Style::default().fg(TEXT_MUTED)),
        Span::styled(" focus", Style::default().fg(BORDER)),
        Span::styled("  Ctrl+T", Style::default().fg(TEXT_MUTED)),
        Span::styled(" tools", Style::default().fg(BORDER)),
        Span::styled("  /attach /aspect /save /tool /clear", Style::default().fg(TEXT_MUTED)),
        Span::styled("  PgUp/PgDn", Style::default().fg(TEXT_MUTED)),
        Span::styled(" scroll", Style::default().fg(BORDER)),
    ];

    let right_text = format!(" {} ", app.status);
    let right_len = right_text.chars().count() as u16;
    let left_area = Rect {
        width: area.width.saturating_sub(right_len),
        ..area
    };
    let right_area = Rect {
        x: area.x + area.width.saturating_sub(right_len),
        width: right_len.min(area.width),
        ..area
    };

    frame.render_widget(Paragraph::new(Line::from(shortcuts)), left_area);
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            right_text,
            Style::default().fg(status_color),
        ))),
        right_area,
    );
}
