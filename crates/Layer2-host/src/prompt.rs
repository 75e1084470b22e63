//! System Prompt - 시스템 프롬프트 렌더링
//!
//! 실제 프롬프트 조립은 호스트 서비스. 여기서는 요청 타입과 trait,
//! 로컬 호스트용 단순 템플릿 렌더러를 제공한다.

use crate::mode::{get_mode_by_slug, ModeConfig, ToolGroup, DEFAULT_MODE_SLUG};
use aos_foundation::{arch_id, OsType, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// 기본 브라우저 뷰포트
pub const DEFAULT_BROWSER_VIEWPORT: &str = "900x600";

/// 기본 fuzzy match 임계값 (정확히 일치)
pub const DEFAULT_FUZZY_MATCH_THRESHOLD: f64 = 1.0;

/// 시스템 프롬프트 렌더링 요청
#[derive(Debug, Clone, PartialEq)]
pub struct SystemPromptRequest {
    pub cwd: PathBuf,
    /// 모델/모드/설정 모두 브라우저 도구를 허용하는지
    pub supports_computer_use: bool,
    /// MCP 허브를 프롬프트에 포함할지
    pub mcp_enabled: bool,
    pub fuzzy_match_threshold: f64,
    pub browser_viewport_size: String,
    pub mode: Option<String>,
    pub custom_mode_prompts: BTreeMap<String, Value>,
    pub custom_modes: Vec<ModeConfig>,
    pub custom_instructions: Option<String>,
    pub diff_enabled: bool,
    pub experiments: BTreeMap<String, bool>,
    pub enable_mcp_server_creation: bool,
    pub language: Option<String>,
    pub ignore_instructions: Option<String>,
}

impl SystemPromptRequest {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            supports_computer_use: false,
            mcp_enabled: false,
            fuzzy_match_threshold: DEFAULT_FUZZY_MATCH_THRESHOLD,
            browser_viewport_size: DEFAULT_BROWSER_VIEWPORT.to_string(),
            mode: None,
            custom_mode_prompts: BTreeMap::new(),
            custom_modes: Vec::new(),
            custom_instructions: None,
            diff_enabled: false,
            experiments: BTreeMap::new(),
            enable_mcp_server_creation: false,
            language: None,
            ignore_instructions: None,
        }
    }
}

/// 시스템 프롬프트 렌더러 (호스트 서비스)
#[async_trait]
pub trait PromptRenderer: Send + Sync {
    async fn render(&self, request: &SystemPromptRequest) -> Result<String>;
}

// ============================================================================
// TemplatePromptRenderer
// ============================================================================

/// 로컬 호스트용 섹션 기반 렌더러
#[derive(Debug, Clone, Default)]
pub struct TemplatePromptRenderer;

impl TemplatePromptRenderer {
    fn mode_prompt_field(request: &SystemPromptRequest, slug: &str, field: &str) -> Option<String> {
        request
            .custom_mode_prompts
            .get(slug)
            .and_then(|prompt| prompt.get(field))
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    }
}

#[async_trait]
impl PromptRenderer for TemplatePromptRenderer {
    async fn render(&self, request: &SystemPromptRequest) -> Result<String> {
        let slug = request.mode.as_deref().unwrap_or(DEFAULT_MODE_SLUG);
        let mode = get_mode_by_slug(slug, &request.custom_modes)
            .or_else(|| get_mode_by_slug(DEFAULT_MODE_SLUG, &[]))
            .ok_or_else(|| aos_foundation::Error::NotFound(format!("mode '{}'", slug)))?;

        let role = Self::mode_prompt_field(request, &mode.slug, "roleDefinition")
            .unwrap_or_else(|| mode.role_definition.clone());

        let mut prompt = format!("{}\n\n====\n\nCAPABILITIES\n\n", role);

        let groups: Vec<&str> = mode.tool_groups().map(|g| g.as_str()).collect();
        if groups.is_empty() {
            prompt.push_str("- Tool groups: none\n");
        } else {
            prompt.push_str(&format!("- Tool groups: {}\n", groups.join(", ")));
        }
        if request.supports_computer_use && mode.has_group(ToolGroup::Browser) {
            prompt.push_str(&format!(
                "- You can use a Puppeteer-controlled browser with a {} viewport.\n",
                request.browser_viewport_size
            ));
        }
        if request.mcp_enabled {
            prompt.push_str("- You have access to connected MCP servers.\n");
            if request.enable_mcp_server_creation {
                prompt.push_str("- You may create new MCP servers when asked.\n");
            }
        }
        if request.diff_enabled {
            prompt.push_str(&format!(
                "- Edit files with search/replace diffs (match threshold {:.2}).\n",
                request.fuzzy_match_threshold
            ));
        }

        let os = OsType::detect();
        prompt.push_str(&format!(
            "\n====\n\nSYSTEM INFORMATION\n\n- Operating System: {} ({})\n- Current Working Directory: {}\n",
            os.platform_id(),
            arch_id(),
            request.cwd.display()
        ));

        let mut rules = Vec::new();
        if let Some(language) = request.language.as_deref() {
            rules.push(format!(
                "Language Preference:\nYou should always speak and think in the \"{}\" language.",
                language
            ));
        }
        if let Some(global) = request.custom_instructions.as_deref().filter(|s| !s.trim().is_empty()) {
            rules.push(format!("Global Instructions:\n{}", global));
        }
        let mode_instructions = Self::mode_prompt_field(request, &mode.slug, "customInstructions")
            .or_else(|| mode.custom_instructions.clone());
        if let Some(instructions) = mode_instructions {
            rules.push(format!("Mode-specific Instructions:\n{}", instructions));
        }
        if let Some(ignore) = request.ignore_instructions.as_deref() {
            rules.push(ignore.to_string());
        }
        if !rules.is_empty() {
            prompt.push_str("\n====\n\nUSER'S CUSTOM INSTRUCTIONS\n\n");
            prompt.push_str(&rules.join("\n\n"));
            prompt.push('\n');
        }

        Ok(prompt)
    }
}
