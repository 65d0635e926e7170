//! Tool catalog: the static set of tool presets and lookups over it.

use crate::builtin;
use crate::error::HelpDeskError;
use helpdesk_rs_config::ToolOverrideConfig;
use helpdesk_rs_protocol::AspectRatio;
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Fixed tool categories, declared in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ToolCategory {
    Documentation,
    GrantsFunding,
    ReportsCompliance,
    CertificatesReceipts,
    FormsData,
    ContentSocial,
    Translation,
    AdminHr,
    StrategyInsights,
    CreativeMedia,
}

impl ToolCategory {
    /// All categories in display order.
    pub const ALL: [ToolCategory; 10] = [
        ToolCategory::Documentation,
        ToolCategory::GrantsFunding,
        ToolCategory::ReportsCompliance,
        ToolCategory::CertificatesReceipts,
        ToolCategory::FormsData,
        ToolCategory::ContentSocial,
        ToolCategory::Translation,
        ToolCategory::AdminHr,
        ToolCategory::StrategyInsights,
        ToolCategory::CreativeMedia,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ToolCategory::Documentation => "Documentation",
            ToolCategory::GrantsFunding => "Grants & Funding",
            ToolCategory::ReportsCompliance => "Reports & Compliance",
            ToolCategory::CertificatesReceipts => "Certificates & Receipts",
            ToolCategory::FormsData => "Forms & Data",
            ToolCategory::ContentSocial => "Content & Social",
            ToolCategory::Translation => "Translation",
            ToolCategory::AdminHr => "Admin & HR",
            ToolCategory::StrategyInsights => "Strategy & Insights",
            ToolCategory::CreativeMedia => "Creative & Media",
        }
    }

    /// Stable snake_case key.
    pub fn key(&self) -> &'static str {
        match self {
            ToolCategory::Documentation => "documentation",
            ToolCategory::GrantsFunding => "grants_funding",
            ToolCategory::ReportsCompliance => "reports_compliance",
            ToolCategory::CertificatesReceipts => "certificates_receipts",
            ToolCategory::FormsData => "forms_data",
            ToolCategory::ContentSocial => "content_social",
            ToolCategory::Translation => "translation",
            ToolCategory::AdminHr => "admin_hr",
            ToolCategory::StrategyInsights => "strategy_insights",
            ToolCategory::CreativeMedia => "creative_media",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Request shape a tool dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// Instruction plus text, optionally with one inline file.
    Text,
    /// Text-to-image, or image edit when an image is attached.
    Image,
    /// Long-running video job.
    Video,
    /// Verbatim transcription of an attached audio file.
    Transcribe,
    /// Text answer grounded in web search, with sources.
    Research,
    /// Text answer with an elevated reasoning budget.
    Strategy,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Text => "text",
            ToolKind::Image => "image",
            ToolKind::Video => "video",
            ToolKind::Transcribe => "transcribe",
            ToolKind::Research => "research",
            ToolKind::Strategy => "strategy",
        }
    }

    /// Whether a per-tool model override applies to this shape.
    pub fn accepts_model_override(&self) -> bool {
        !matches!(self, ToolKind::Image | ToolKind::Video)
    }
}

/// Presentation-only badges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ToolFlags {
    pub is_new: bool,
    pub is_popular: bool,
}

/// A selectable tool preset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDefinition {
    pub id: String,
    pub category: ToolCategory,
    pub name: String,
    pub description: String,
    /// System instruction sent with every request from this tool.
    pub instruction: String,
    pub model_override: Option<String>,
    pub kind: ToolKind,
    pub flags: ToolFlags,
    /// Aspect ratio preselected when the tool becomes active.
    pub default_aspect_ratio: AspectRatio,
}

impl ToolDefinition {
    pub fn new(
        id: impl Into<String>,
        category: ToolCategory,
        kind: ToolKind,
        name: impl Into<String>,
        description: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            name: name.into(),
            description: description.into(),
            instruction: instruction.into(),
            model_override: None,
            kind,
            flags: ToolFlags::default(),
            default_aspect_ratio: AspectRatio::default(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_override = Some(model.into());
        self
    }

    pub fn with_aspect_ratio(mut self, ratio: AspectRatio) -> Self {
        self.default_aspect_ratio = ratio;
        self
    }

    pub fn new_badge(mut self) -> Self {
        self.flags.is_new = true;
        self
    }

    pub fn popular(mut self) -> Self {
        self.flags.is_popular = true;
        self
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.description.to_lowercase().contains(needle)
    }
}

/// Tools grouped under their category, in display order.
pub type CategoryGroup<'a> = (ToolCategory, Vec<&'a ToolDefinition>);

/// Tool opened when nothing else is configured.
pub const DEFAULT_TOOL_ID: &str = "proposal-writer";

/// Immutable catalog of tools, kept in declaration order.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    /// The built-in tool set.
    pub fn builtin() -> Self {
        Self {
            tools: builtin::tools(),
        }
    }

    /// Build a catalog from explicit definitions.
    pub fn from_tools(tools: Vec<ToolDefinition>) -> Result<Self, HelpDeskError> {
        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.id.as_str()) {
                return Err(HelpDeskError::DuplicateTool(tool.id.clone()));
            }
        }
        Ok(Self { tools })
    }

    /// Apply configured per-tool model overrides.
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<String, ToolOverrideConfig>,
    ) -> Result<Self, HelpDeskError> {
        for (tool_id, entry) in overrides {
            let tool = self
                .tools
                .iter_mut()
                .find(|tool| &tool.id == tool_id)
                .ok_or_else(|| HelpDeskError::UnknownTool(tool_id.clone()))?;
            let Some(model) = entry.model.as_ref() else {
                continue;
            };
            if !tool.kind.accepts_model_override() {
                return Err(HelpDeskError::UnsupportedOverride(tool_id.clone()));
            }
            debug!("tool model overridden (tool={}, model={})", tool_id, model);
            tool.model_override = Some(model.clone());
        }
        if !overrides.is_empty() {
            info!("applied tool overrides (count={})", overrides.len());
        }
        Ok(self)
    }

    pub fn tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Every non-empty category with its tools, in display order.
    pub fn list_categories(&self) -> Vec<CategoryGroup<'_>> {
        group(self.tools.iter())
    }

    pub fn find_tool(&self, id: &str) -> Result<&ToolDefinition, HelpDeskError> {
        self.tools
            .iter()
            .find(|tool| tool.id == id)
            .ok_or_else(|| HelpDeskError::UnknownTool(id.to_string()))
    }

    /// Tools whose name or description contains `query`, ignoring case.
    /// A blank query matches everything.
    pub fn filter_tools(&self, query: &str) -> Vec<&ToolDefinition> {
        let needle = query.trim().to_lowercase();
        self.tools
            .iter()
            .filter(|tool| needle.is_empty() || tool.matches(&needle))
            .collect()
    }

    /// Grouped form of [`ToolCatalog::filter_tools`].
    pub fn filtered_categories(&self, query: &str) -> Vec<CategoryGroup<'_>> {
        group(self.filter_tools(query).into_iter())
    }
}

fn group<'a>(tools: impl Iterator<Item = &'a ToolDefinition> + Clone) -> Vec<CategoryGroup<'a>> {
    ToolCategory::ALL
        .into_iter()
        .filter_map(|category| {
            let members: Vec<&ToolDefinition> = tools
                .clone()
                .filter(|tool| tool.category == category)
                .collect();
            (!members.is_empty()).then_some((category, members))
        })
        .collect()
}
