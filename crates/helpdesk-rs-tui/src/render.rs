//! Transcript rendering: role badges, markdown text and media markers.

use helpdesk_rs_protocol::{ConversationMessage, InlineData, Role};
use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

const TEXT: Color = Color::Rgb(238, 238, 238);
const TEXT_MUTED: Color = Color::Rgb(128, 128, 128);
const HEADING: Color = Color::Rgb(236, 91, 43);
const LINK: Color = Color::Rgb(107, 161, 230);
const CODE: Color = Color::Rgb(229, 192, 123);
const MEDIA: Color = Color::Rgb(120, 220, 140);

/// Render the transcript. `tool_name` labels model turns and `tick` drives
/// the pending indicator.
pub fn render_messages(
    messages: &[ConversationMessage],
    tool_name: &str,
    tick: u64,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if messages.is_empty() {
        lines.push(Line::from(Span::styled(
            " No messages yet. Describe what you need below to start.",
            Style::default().fg(TEXT_MUTED),
        )));
        return lines;
    }

    for (idx, message) in messages.iter().enumerate() {
        lines.push(badge(message.role, tool_name));
        match message.role {
            Role::User => render_user(message, &mut lines),
            Role::Model if message.pending => render_pending(message, tick, &mut lines),
            Role::Model => render_model(message, &mut lines),
        }
        if idx + 1 < messages.len() {
            lines.push(Line::from(Span::raw("")));
        }
    }

    // Trailing padding so the last message scrolls fully into view.
    lines.push(Line::from(Span::raw("")));
    lines
}

fn badge(role: Role, tool_name: &str) -> Line<'static> {
    let (label, bg) = match role {
        Role::User => (" you ".to_string(), Color::Rgb(107, 161, 230)),
        Role::Model => (format!(" {tool_name} "), Color::Rgb(238, 121, 72)),
    };
    Line::from(Span::styled(
        label,
        Style::default()
            .fg(Color::Rgb(10, 10, 10))
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_user(message: &ConversationMessage, lines: &mut Vec<Line<'static>>) {
    let style = Style::default().fg(TEXT);
    for line in message.text.lines() {
        lines.push(Line::from(Span::styled(format!(" {line}"), style)));
    }
    if let Some(uri) = message.image.as_deref() {
        lines.push(media_line(match InlineData::from_data_uri(uri) {
            Some(inline) => format!(
                "[image attached: {}, {}]",
                inline.mime_type,
                format_size(decoded_len(&inline.data))
            ),
            None => "[image attached]".to_string(),
        }));
    }
    if let Some(name) = message.file_name.as_deref() {
        lines.push(media_line(format!("[file attached: {name}]")));
    }
}

fn render_pending(message: &ConversationMessage, tick: u64, lines: &mut Vec<Line<'static>>) {
    let muted = Style::default().fg(TEXT_MUTED);
    for line in message.text.lines() {
        lines.push(Line::from(Span::styled(format!(" {line}"), muted)));
    }
    lines.push(Line::from(vec![
        Span::raw(" "),
        Span::styled(
            thinking_dots(tick),
            Style::default().fg(HEADING).add_modifier(Modifier::BOLD),
        ),
    ]));
}

fn render_model(message: &ConversationMessage, lines: &mut Vec<Line<'static>>) {
    if !message.text.trim().is_empty() {
        for line in render_markdown(&message.text) {
            let mut spans = vec![Span::raw(" ")];
            spans.extend(line.spans);
            lines.push(Line::from(spans));
        }
    }
    if let Some(uri) = message.image.as_deref() {
        let label = match InlineData::from_data_uri(uri) {
            Some(inline) => format!(
                "[generated image: {}, {}] use /save <path> to keep it",
                inline.mime_type,
                format_size(decoded_len(&inline.data))
            ),
            None => "[generated image]".to_string(),
        };
        lines.push(media_line(label));
    }
    if let Some(uri) = message.video.as_deref() {
        lines.push(media_line(format!("[video] {uri}")));
    }
}

fn media_line(text: String) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {text}"),
        Style::default().fg(MEDIA).add_modifier(Modifier::ITALIC),
    ))
}

/// Three-step dot animation, one frame per tick.
pub fn thinking_dots(tick: u64) -> String {
    let filled = (tick % 3) as usize + 1;
    format!("{}{}", "●".repeat(filled), "○".repeat(3 - filled))
}

/// Decoded byte count of standard base64 without decoding it.
fn decoded_len(data: &str) -> usize {
    let padding = data.bytes().rev().take_while(|byte| *byte == b'=').count();
    (data.len() / 4 * 3).saturating_sub(padding)
}

pub fn format_size(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let value = bytes as f64;
    if value < KIB {
        format!("{bytes} B")
    } else if value < KIB * KIB {
        format!("{:.1} KB", value / KIB)
    } else {
        format!("{:.1} MB", value / (KIB * KIB))
    }
}

/// Render markdown into unpadded lines. Supports headings, emphasis,
/// ordered and unordered lists, links, inline code and code blocks.
pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    let mut writer = MarkdownWriter::new();
    for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
        writer.handle(event);
    }
    writer.finish()
}

struct MarkdownWriter {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    lists: Vec<Option<u64>>,
    link: Option<String>,
    in_code_block: bool,
}

impl MarkdownWriter {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![Style::default().fg(TEXT)],
            lists: Vec::new(),
            link: None,
            in_code_block: false,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, patch: Style) {
        let next = self.style().patch(patch);
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => {
                if self.in_code_block {
                    for line in text.lines() {
                        self.current
                            .push(Span::styled(format!("    {line}"), self.style()));
                        self.flush();
                    }
                } else {
                    self.current
                        .push(Span::styled(text.into_string(), self.style()));
                }
            }
            Event::Code(code) => {
                self.current.push(Span::styled(
                    code.into_string(),
                    Style::default().fg(CODE),
                ));
            }
            Event::SoftBreak | Event::HardBreak => self.flush(),
            Event::Rule => {
                self.flush();
                self.lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    Style::default().fg(TEXT_MUTED),
                )));
            }
            _ => {}
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { .. } => {
                self.flush();
                self.push_style(Style::default().fg(HEADING).add_modifier(Modifier::BOLD));
            }
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(number)) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                self.current.push(Span::styled(
                    format!("{}{marker}", "  ".repeat(depth)),
                    Style::default().fg(HEADING),
                ));
            }
            Tag::Link { dest_url, .. } => {
                self.link = Some(dest_url.into_string());
                self.push_style(Style::default().fg(LINK).add_modifier(Modifier::UNDERLINED));
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.in_code_block = true;
                self.push_style(Style::default().fg(CODE));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Heading(_) => {
                self.flush();
                self.pop_style();
                self.blank();
            }
            TagEnd::Strong | TagEnd::Emphasis | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.blank();
                }
            }
            TagEnd::Item => self.flush(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link.take() {
                    let label: String = self
                        .current
                        .iter()
                        .map(|span| span.content.as_ref())
                        .collect();
                    if !label.ends_with(url.as_str()) {
                        self.current.push(Span::styled(
                            format!(" ({url})"),
                            Style::default().fg(TEXT_MUTED),
                        ));
                    }
                }
            }
            TagEnd::CodeBlock => {
                self.flush();
                self.in_code_block = false;
                self.pop_style();
                self.blank();
            }
            _ => {}
        }
    }

    fn flush(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank(&mut self) {
        let last_blank = self.lines.last().is_none_or(|line| line.width() == 0);
        if !last_blank {
            self.lines.push(Line::default());
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|line| line.width() == 0) {
            self.lines.pop();
        }
        self.lines
    }
}
