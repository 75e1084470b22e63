//! Modes - 모드와 도구 그룹(capability group)
//!
//! 모드가 어떤 도구 그룹을 쓸 수 있는지는 `ToolGroup` 집합 멤버십으로 판단한다.

use serde::{Deserialize, Serialize};

/// 모드가 지정되지 않았을 때 사용하는 모드
pub const DEFAULT_MODE_SLUG: &str = "code";

/// 도구 그룹
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolGroup {
    Read,
    Edit,
    Browser,
    Command,
    Mcp,
    Modes,
}

impl ToolGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Edit => "edit",
            Self::Browser => "browser",
            Self::Command => "command",
            Self::Mcp => "mcp",
            Self::Modes => "modes",
        }
    }
}

/// 그룹 옵션 (예: edit 그룹의 파일 제한)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// 모드 설정의 그룹 항목: `"read"` 또는 `["edit", { "fileRegex": "\\.md$" }]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupEntry {
    Plain(ToolGroup),
    WithOptions(ToolGroup, GroupOptions),
}

impl GroupEntry {
    pub fn group(&self) -> ToolGroup {
        match self {
            Self::Plain(group) | Self::WithOptions(group, _) => *group,
        }
    }

    pub fn options(&self) -> Option<&GroupOptions> {
        match self {
            Self::Plain(_) => None,
            Self::WithOptions(_, options) => Some(options),
        }
    }
}

impl From<ToolGroup> for GroupEntry {
    fn from(group: ToolGroup) -> Self {
        Self::Plain(group)
    }
}

/// 모드 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModeConfig {
    pub slug: String,
    pub name: String,
    pub role_definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
    #[serde(default)]
    pub groups: Vec<GroupEntry>,
}

impl ModeConfig {
    pub fn new(
        slug: impl Into<String>,
        name: impl Into<String>,
        role_definition: impl Into<String>,
        groups: Vec<GroupEntry>,
    ) -> Self {
        Self {
            slug: slug.into(),
            name: name.into(),
            role_definition: role_definition.into(),
            custom_instructions: None,
            groups,
        }
    }

    /// 모드가 해당 그룹을 포함하는지
    pub fn has_group(&self, group: ToolGroup) -> bool {
        self.groups.iter().any(|entry| entry.group() == group)
    }

    pub fn tool_groups(&self) -> impl Iterator<Item = ToolGroup> + '_ {
        self.groups.iter().map(GroupEntry::group)
    }
}

/// 기본 제공 모드
pub fn builtin_modes() -> Vec<ModeConfig> {
    use ToolGroup::*;

    vec![
        ModeConfig::new(
            "code",
            "Code",
            "You are Roo, a highly skilled software engineer with extensive knowledge in many programming languages, frameworks, design patterns, and best practices.",
            vec![Read.into(), Edit.into(), Browser.into(), Command.into(), Mcp.into()],
        ),
        ModeConfig::new(
            "architect",
            "Architect",
            "You are Roo, an experienced technical leader who is inquisitive and an excellent planner.",
            vec![
                Read.into(),
                GroupEntry::WithOptions(
                    Edit,
                    GroupOptions {
                        file_regex: Some(r"\.md$".to_string()),
                        description: Some("Markdown files only".to_string()),
                    },
                ),
                Browser.into(),
                Mcp.into(),
            ],
        ),
        ModeConfig::new(
            "ask",
            "Ask",
            "You are Roo, a knowledgeable technical assistant focused on answering questions and providing information about software development, technology, and related topics.",
            vec![Read.into(), Browser.into(), Mcp.into()],
        ),
        ModeConfig::new(
            "debug",
            "Debug",
            "You are Roo, an expert software debugger specializing in systematic problem diagnosis and resolution.",
            vec![Read.into(), Edit.into(), Browser.into(), Command.into(), Mcp.into()],
        ),
        ModeConfig::new(
            "orchestrator",
            "Orchestrator",
            "You are Roo, a strategic workflow orchestrator who coordinates complex tasks by delegating them to appropriate specialized modes.",
            vec![],
        ),
    ]
}

/// slug로 모드 검색 (커스텀 모드가 기본 모드보다 우선)
pub fn get_mode_by_slug(slug: &str, custom_modes: &[ModeConfig]) -> Option<ModeConfig> {
    custom_modes
        .iter()
        .find(|mode| mode.slug == slug)
        .cloned()
        .or_else(|| builtin_modes().into_iter().find(|mode| mode.slug == slug))
}
