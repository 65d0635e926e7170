//! Application state for the help desk TUI.

use crate::render;
use helpdesk_rs_core::{
    HelpDesk, HelpDeskError, PendingTurn, ToolCategory, ToolDefinition, TurnOutcome,
};
use helpdesk_rs_protocol::{AspectRatio, InlineData, Role, TurnId};
use log::{debug, info};
use ratatui::text::Line;
use std::cmp::min;
use std::path::{Path, PathBuf};

/// Which pane receives keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Search,
    Input,
}

/// One visible row of the tool sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarRow<'a> {
    Category {
        category: ToolCategory,
        expanded: bool,
        count: usize,
    },
    Tool(&'a ToolDefinition),
}

/// Slash commands accepted in the input box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Attach(PathBuf),
    Detach,
    Aspect(AspectRatio),
    Save(PathBuf),
    Tool(String),
    Clear,
}

/// Top-level application state for the TUI.
pub struct App {
    /// Console state: tools, composer, transcript and the in-flight turn.
    pub desk: HelpDesk,
    pub focus: Focus,
    /// Index into [`App::sidebar_rows`].
    pub cursor: usize,
    /// Status line text.
    pub status: String,
    /// Current scroll offset.
    pub scroll: u16,
    /// Whether to auto-scroll to the bottom.
    pub auto_scroll: bool,
    /// Maximum scroll offset for the chat view.
    pub chat_max_scroll: u16,
    /// Animation frame counter.
    pub tick: u64,
    max_attachment_bytes: u64,
}

impl App {
    pub fn new(desk: HelpDesk, max_attachment_bytes: u64) -> Self {
        let mut app = Self {
            desk,
            focus: Focus::Input,
            cursor: 0,
            status: "ready".to_string(),
            scroll: 0,
            auto_scroll: true,
            chat_max_scroll: 0,
            tick: 0,
            max_attachment_bytes,
        };
        app.cursor_to_active_tool();
        app
    }

    /// Rows shown in the sidebar for the current query and expansion state.
    pub fn sidebar_rows(&self) -> Vec<SidebarRow<'_>> {
        let selector = self.desk.selector();
        let mut rows = Vec::new();
        for (category, tools) in self.desk.catalog().filtered_categories(selector.query()) {
            let expanded = selector.is_expanded(category);
            rows.push(SidebarRow::Category {
                category,
                expanded,
                count: tools.len(),
            });
            if expanded {
                rows.extend(tools.into_iter().map(SidebarRow::Tool));
            }
        }
        rows
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.sidebar_rows().len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    /// Tab order: sidebar, input. Search returns to the input.
    pub fn focus_next(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Input,
            Focus::Search | Focus::Input => Focus::Sidebar,
        };
    }

    /// Enter on the sidebar: toggle a category or activate a tool.
    pub fn activate_row(&mut self) -> Result<(), HelpDeskError> {
        let row = self.sidebar_rows().get(self.cursor).copied();
        match row {
            Some(SidebarRow::Category { category, .. }) => {
                let expanded = self.desk.selector_mut().toggle_category(category);
                debug!("category toggled (category={}, expanded={})", category, expanded);
            }
            Some(SidebarRow::Tool(tool)) => {
                let id = tool.id.clone();
                self.select_tool(&id)?;
            }
            None => {}
        }
        Ok(())
    }

    /// Left arrow: collapse the category under the cursor, or the one that
    /// owns the tool under the cursor.
    pub fn collapse_row(&mut self) {
        let category = match self.sidebar_rows().get(self.cursor) {
            Some(SidebarRow::Category { category, .. }) => *category,
            Some(SidebarRow::Tool(tool)) => tool.category,
            None => return,
        };
        self.desk.selector_mut().collapse(category);
        let index = self.sidebar_rows().iter().position(|row| {
            matches!(row, SidebarRow::Category { category: c, .. } if *c == category)
        });
        if let Some(index) = index {
            self.cursor = index;
        }
    }

    pub fn expand_row(&mut self) {
        let row = self.sidebar_rows().get(self.cursor).copied();
        if let Some(SidebarRow::Category { category, .. }) = row {
            self.desk.selector_mut().expand(category);
        }
    }

    pub fn push_search_char(&mut self, ch: char) {
        let mut query = self.desk.selector().query().to_string();
        query.push(ch);
        self.desk.selector_mut().set_query(query);
        self.cursor = 0;
    }

    pub fn pop_search_char(&mut self) {
        let mut query = self.desk.selector().query().to_string();
        query.pop();
        self.desk.selector_mut().set_query(query);
        self.cursor = 0;
    }

    pub fn clear_search(&mut self) {
        self.desk.selector_mut().clear_query();
        self.cursor_to_active_tool();
    }

    /// Ctrl+T: the overlay takes focus while open.
    pub fn toggle_overlay(&mut self) {
        self.desk.selector_mut().toggle_overlay();
        if self.desk.selector().overlay_open() {
            self.focus = Focus::Sidebar;
            self.cursor_to_active_tool();
        } else {
            self.focus = Focus::Input;
        }
    }

    pub fn close_overlay(&mut self) {
        self.desk.selector_mut().close_overlay();
        self.focus = Focus::Input;
    }

    pub fn select_tool(&mut self, id: &str) -> Result<(), HelpDeskError> {
        self.desk.select_tool(id)?;
        self.desk.selector_mut().clear_query();
        self.focus = Focus::Input;
        self.scroll = 0;
        self.auto_scroll = true;
        self.chat_max_scroll = 0;
        self.cursor_to_active_tool();
        self.status = format!("tool: {}", self.desk.active_tool().name);
        Ok(())
    }

    pub fn push_input_char(&mut self, ch: char) {
        let mut input = self.desk.composer().input.clone();
        input.push(ch);
        self.desk.set_input(input);
    }

    pub fn pop_input_char(&mut self) {
        let mut input = self.desk.composer().input.clone();
        input.pop();
        self.desk.set_input(input);
    }

    /// Enter in the input box. Slash commands run immediately; anything else
    /// starts a turn, which the caller dispatches.
    pub fn submit(&mut self) -> Option<PendingTurn> {
        let input = self.desk.composer().input.clone();
        if input.trim_start().starts_with('/') {
            self.desk.set_input(String::new());
            let result = parse_command(&input).and_then(|command| match command {
                Some(command) => self.run_command(command),
                None => Ok(String::new()),
            });
            match result {
                Ok(status) if !status.is_empty() => self.status = status,
                Ok(_) => {}
                Err(err) => self.status = err,
            }
            return None;
        }

        if self.desk.is_loading() {
            self.status = "waiting for the current reply".to_string();
            return None;
        }
        let turn = self.desk.begin_turn()?;
        info!(
            "submitting turn (turn_id={}, tool={})",
            turn.id, turn.request.tool.id
        );
        self.status = "running".to_string();
        self.enable_auto_scroll();
        Some(turn)
    }

    /// Apply a dispatch outcome delivered through the event channel.
    pub fn settle(&mut self, id: TurnId, outcome: TurnOutcome) {
        if self.desk.settle(id, outcome) {
            self.status = "ready".to_string();
            self.maybe_enable_auto_scroll();
        }
    }

    pub fn run_command(&mut self, command: Command) -> Result<String, String> {
        debug!("handling slash command (command={:?})", command);
        match command {
            Command::Attach(path) => {
                self.desk
                    .attach_path(&path, self.max_attachment_bytes)
                    .map_err(|err| err.to_string())?;
                let attachment = self
                    .desk
                    .composer()
                    .attachment
                    .as_ref()
                    .ok_or_else(|| "attachment was not kept".to_string())?;
                Ok(format!(
                    "attached {} ({}, {})",
                    attachment.file_name,
                    attachment.mime_type(),
                    render::format_size(attachment.size_bytes as usize)
                ))
            }
            Command::Detach => {
                self.desk.clear_attachment();
                Ok("attachment removed".to_string())
            }
            Command::Aspect(ratio) => {
                self.desk.set_aspect_ratio(ratio);
                Ok(format!("aspect ratio {ratio}"))
            }
            Command::Save(path) => self.save_last_image(&path),
            Command::Tool(id) => {
                self.select_tool(&id).map_err(|err| err.to_string())?;
                Ok(self.status.clone())
            }
            Command::Clear => {
                self.desk.reset();
                self.scroll = 0;
                self.chat_max_scroll = 0;
                self.auto_scroll = true;
                Ok("conversation cleared".to_string())
            }
        }
    }

    /// Write the most recent generated image to `path`.
    pub fn save_last_image(&self, path: &Path) -> Result<String, String> {
        let uri = self
            .desk
            .conversation()
            .messages()
            .iter()
            .rev()
            .filter(|message| message.role == Role::Model)
            .find_map(|message| message.image.as_deref())
            .ok_or_else(|| "no generated image to save".to_string())?;
        let inline = InlineData::from_data_uri(uri)
            .ok_or_else(|| "generated image is not inline data".to_string())?;
        let bytes = inline
            .decode()
            .map_err(|err| format!("failed to decode image: {err}"))?;
        std::fs::write(path, &bytes)
            .map_err(|err| format!("failed to write {}: {err}", path.display()))?;
        info!("image saved (path={}, bytes={})", path.display(), bytes.len());
        Ok(format!("saved image to {}", path.display()))
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Render the transcript into styled lines for the UI.
    pub fn render_lines(&self) -> Vec<Line<'static>> {
        render::render_messages(
            self.desk.conversation().messages(),
            &self.desk.active_tool().name,
            self.tick,
        )
    }

    /// Scroll the chat view upward by a number of lines.
    pub fn scroll_up(&mut self, lines: u16) {
        self.auto_scroll = false;
        self.scroll = self.scroll.saturating_sub(lines);
    }

    /// Scroll the chat view downward by a number of lines.
    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = min(self.scroll.saturating_add(lines), self.chat_max_scroll);
        if self.scroll >= self.chat_max_scroll {
            self.auto_scroll = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.auto_scroll = false;
        self.scroll = 0;
    }

    pub fn enable_auto_scroll(&mut self) {
        self.auto_scroll = true;
        self.scroll = self.chat_max_scroll;
    }

    /// Update scroll bounds after layout changes.
    ///
    /// Snaps to the new bottom only when `auto_scroll` is on or the view was
    /// already pinned to the bottom.
    pub fn update_scroll_bounds(&mut self, max_scroll: u16) {
        let was_at_bottom = self.scroll >= self.chat_max_scroll;
        self.chat_max_scroll = max_scroll;
        if self.auto_scroll || was_at_bottom {
            self.scroll = max_scroll;
            self.auto_scroll = true;
        } else {
            self.scroll = self.scroll.min(max_scroll);
        }
    }

    fn maybe_enable_auto_scroll(&mut self) {
        if self.auto_scroll {
            self.scroll = self.chat_max_scroll;
        }
    }

    fn cursor_to_active_tool(&mut self) {
        let active = self.desk.active_tool().id.clone();
        self.cursor = self
            .sidebar_rows()
            .iter()
            .position(|row| matches!(row, SidebarRow::Tool(tool) if tool.id == active))
            .unwrap_or(0);
    }
}

/// Parse a slash command. Returns `Ok(None)` for a bare `/`.
pub fn parse_command(input: &str) -> Result<Option<Command>, String> {
    let trimmed = input.trim();
    let Some(body) = trimmed.strip_prefix('/') else {
        return Ok(None);
    };
    let (name, arg) = match body.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (body, ""),
    };
    if name.is_empty() {
        return Ok(None);
    }
    let require = |usage: &str| {
        if arg.is_empty() {
            Err(format!("usage: {usage}"))
        } else {
            Ok(arg)
        }
    };
    match name.to_lowercase().as_str() {
        "attach" => Ok(Some(Command::Attach(PathBuf::from(require(
            "/attach <path>",
        )?)))),
        "detach" => Ok(Some(Command::Detach)),
        "aspect" => {
            let ratio = require("/aspect <ratio>")?.parse::<AspectRatio>()?;
            Ok(Some(Command::Aspect(ratio)))
        }
        "save" => Ok(Some(Command::Save(PathBuf::from(require("/save <path>")?)))),
        "tool" => Ok(Some(Command::Tool(require("/tool <id>")?.to_string()))),
        "clear" => Ok(Some(Command::Clear)),
        _ => Err(format!("unknown command: /{name}")),
    }
}
