//! Markdown Export - 태스크 대화 기록을 Markdown으로 내보내기

use aos_foundation::{Error, Result};
use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tracing::info;

/// 대화 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// 메시지 본문: 문자열 또는 블록 목록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// 콘텐츠 블록
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    Image {
        #[serde(default)]
        source: Value,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    ToolResult {
        tool_use_id: String,
        #[serde(default)]
        content: Option<ToolResultContent>,
        #[serde(default)]
        is_error: Option<bool>,
    },
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolResultContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// 대화 기록 한 항목 (`api_conversation_history.json`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// 대화 기록 파일 읽기
pub async fn load_history(path: &Path) -> Result<Vec<HistoryMessage>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&content)?)
}

/// 대화 기록을 Markdown으로
pub fn task_to_markdown(history: &[HistoryMessage]) -> String {
    history
        .iter()
        .map(|message| {
            let role = match message.role {
                Role::User => "**User:**",
                Role::Assistant => "**Assistant:**",
            };
            let content = match &message.content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Blocks(blocks) => blocks
                    .iter()
                    .map(|block| format_block(block, history))
                    .collect::<Vec<_>>()
                    .join("\n"),
            };
            format!("{}\n\n{}\n\n", role, content)
        })
        .collect::<Vec<_>>()
        .join("---\n\n")
}

fn format_block(block: &ContentBlock, history: &[HistoryMessage]) -> String {
    match block {
        ContentBlock::Text { text } => text.clone(),
        ContentBlock::Image { .. } => "[Image]".to_string(),
        ContentBlock::ToolUse { name, input, .. } => {
            let input = match input {
                Value::Object(fields) => fields
                    .iter()
                    .map(|(key, value)| format!("{}: {}", capitalize(key), display_value(value)))
                    .collect::<Vec<_>>()
                    .join("\n"),
                other => display_value(other),
            };
            format!("[Tool Use: {}]\n{}", name, input)
        }
        ContentBlock::ToolResult {
            tool_use_id,
            content,
            is_error,
        } => {
            let header = format!(
                "[{}{}]",
                tool_name(tool_use_id, history),
                if is_error.unwrap_or(false) { " (Error)" } else { "" }
            );
            match content {
                Some(ToolResultContent::Text(text)) => format!("{}\n{}", header, text),
                Some(ToolResultContent::Blocks(blocks)) => format!(
                    "{}\n{}",
                    header,
                    blocks
                        .iter()
                        .map(|block| format_block(block, history))
                        .collect::<Vec<_>>()
                        .join("\n")
                ),
                None => header,
            }
        }
        ContentBlock::Unsupported => "[Unexpected content type]".to_string(),
    }
}

/// tool_use_id에 해당하는 tool_use 블록의 이름
fn tool_name(tool_use_id: &str, history: &[HistoryMessage]) -> String {
    history
        .iter()
        .filter_map(|message| match &message.content {
            MessageContent::Blocks(blocks) => Some(blocks),
            MessageContent::Text(_) => None,
        })
        .flatten()
        .find_map(|block| match block {
            ContentBlock::ToolUse { id, name, .. } if id == tool_use_id => Some(name.clone()),
            _ => None,
        })
        .unwrap_or_else(|| "Unknown Tool".to_string())
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 템플릿 문자열 보간 방식의 값 표시
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => display_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// `cline_task_<mon>-<d>-<yyyy>_<h>-<mm>-<ss>-<am|pm>.md`
pub fn task_file_name<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    format!(
        "cline_task_{}-{}.md",
        at.format("%b").to_string().to_lowercase(),
        at.format("%-d-%Y_%-I-%M-%S-%P")
    )
}

/// 기본 저장 위치 (다운로드 폴더)
pub fn default_export_dir() -> Result<PathBuf> {
    dirs::download_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Downloads")))
        .ok_or_else(|| Error::NotFound("downloads directory".to_string()))
}

/// Markdown 파일로 저장하고 경로를 돌려준다
pub async fn export_task(
    history: &[HistoryMessage],
    at: DateTime<Local>,
    dir: Option<&Path>,
) -> Result<PathBuf> {
    let dir = match dir {
        Some(dir) => dir.to_path_buf(),
        None => default_export_dir()?,
    };
    tokio::fs::create_dir_all(&dir).await?;

    let path = dir.join(task_file_name(&at));
    tokio::fs::write(&path, task_to_markdown(history)).await?;
    info!(path = %path.display(), messages = history.len(), "Task exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate};
    use serde_json::json;
    use tempfile::TempDir;

    fn history() -> Vec<HistoryMessage> {
        serde_json::from_value(json!([
            { "role": "user", "content": "Fix the build" },
            {
                "role": "assistant",
                "content": [
                    { "type": "text", "text": "Reading the manifest." },
                    { "type": "tool_use", "id": "tu_1", "name": "read_file", "input": { "path": "Cargo.toml", "lines": [1, 2] } }
                ]
            },
            {
                "role": "user",
                "content": [
                    { "type": "tool_result", "tool_use_id": "tu_1", "content": "[package]" },
                    { "type": "tool_result", "tool_use_id": "tu_9", "is_error": true, "content": [{ "type": "text", "text": "denied" }] },
                    { "type": "image", "source": { "type": "base64", "data": "..." } },
                    { "type": "document" }
                ]
            }
        ]))
        .unwrap()
    }

    #[test]
    fn test_markdown_layout() {
        let md = task_to_markdown(&history());
        let expected = "**User:**\n\nFix the build\n\n\
---\n\n**Assistant:**\n\nReading the manifest.\n[Tool Use: read_file]\nLines: 1,2\nPath: Cargo.toml\n\n\
---\n\n**User:**\n\n[read_file]\n[package]\n[Unknown Tool (Error)]\ndenied\n[Image]\n[Unexpected content type]\n\n";
        assert_eq!(md, expected);
    }

    #[test]
    fn test_file_name_pattern() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let afternoon = NaiveDate::from_ymd_opt(2025, 3, 7)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
            .and_local_timezone(offset)
            .unwrap();
        assert_eq!(task_file_name(&afternoon), "cline_task_mar-7-2025_2-05-09-pm.md");

        let midnight = NaiveDate::from_ymd_opt(2024, 12, 25)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap()
            .and_local_timezone(offset)
            .unwrap();
        assert_eq!(task_file_name(&midnight), "cline_task_dec-25-2024_12-30-00-am.md");
    }

    #[tokio::test]
    async fn test_export_task_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = export_task(&history(), Local::now(), Some(temp.path()))
            .await
            .unwrap();

        assert!(path.file_name().unwrap().to_string_lossy().starts_with("cline_task_"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("**User:**"));
    }
}
