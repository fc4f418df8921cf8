//! LLM 请求审计日志
//!
//! 每次分发向 JSONL 文件追加一条记录，便于排查后端故障。写入失败只记日志，不影响请求。

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::warn;

use crate::llm::{ChatMessage, ChatOptions, LlmError};

/// 请求日志条目
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// 请求 ID
    pub request_id: String,
    /// 时间戳
    pub timestamp: DateTime<Utc>,
    /// 后端：ollama / openrouter
    pub provider: String,
    /// 模型名称
    pub model: String,
    /// 消息数量
    pub messages_count: usize,
    /// 消息预览
    pub messages_preview: Vec<MessagePreview>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// 状态：success / error
    pub status: String,
    /// 持续时间（毫秒）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    /// 响应长度（字符数）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_length: Option<usize>,
    /// 响应预览
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_preview: Option<String>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// HTTP 状态码
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

/// 消息预览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagePreview {
    pub role: String,
    pub content_preview: String,
}

/// 已打开的日志文件及其条目数
#[derive(Default)]
struct LogFile {
    file: Option<File>,
    entries: usize,
}

/// 请求日志记录器
pub struct RequestLogger {
    log_path: PathBuf,
    max_entries: usize,
    state: Mutex<LogFile>,
}

impl RequestLogger {
    /// 创建新的日志记录器
    pub fn new(log_path: impl Into<PathBuf>) -> Self {
        let log_path = log_path.into();

        if let Some(dir) = log_path.parent() {
            if !dir.as_os_str().is_empty() {
                if let Err(e) = fs::create_dir_all(dir) {
                    warn!("Failed to create request log directory {}: {}", dir.display(), e);
                }
            }
        }

        Self {
            log_path,
            max_entries: 1000,
            state: Mutex::new(LogFile::default()),
        }
    }

    /// 截断字符串（按字符）
    fn truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_chars).collect();
            format!("{}...", head)
        }
    }

    /// 创建消息预览
    fn create_message_previews(
        messages: &[ChatMessage],
        max_messages: usize,
        max_content_len: usize,
    ) -> Vec<MessagePreview> {
        messages
            .iter()
            .take(max_messages)
            .map(|m| MessagePreview {
                role: m.role.as_str().to_string(),
                content_preview: Self::truncate(&m.content, max_content_len),
            })
            .collect()
    }

    /// 创建待完成的日志条目
    pub fn begin(
        &self,
        request_id: &str,
        provider: &str,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> LogEntry {
        LogEntry {
            request_id: request_id.to_string(),
            timestamp: Utc::now(),
            provider: provider.to_string(),
            model: model.to_string(),
            messages_count: messages.len(),
            messages_preview: Self::create_message_previews(messages, 3, 200),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            status: "pending".to_string(),
            duration_ms: None,
            response_length: None,
            response_preview: None,
            error_message: None,
            status_code: None,
        }
    }

    /// 记录成功
    pub fn log_success(&self, mut entry: LogEntry, start_time: Instant, response: &str) {
        entry.status = "success".to_string();
        entry.duration_ms = Some(start_time.elapsed().as_millis() as u64);
        entry.response_length = Some(response.chars().count());
        entry.response_preview = Some(Self::truncate(response, 300));
        self.write_entry(&entry);
    }

    /// 记录错误
    pub fn log_error(&self, mut entry: LogEntry, start_time: Instant, error: &LlmError) {
        entry.status = "error".to_string();
        entry.duration_ms = Some(start_time.elapsed().as_millis() as u64);
        entry.error_message = Some(Self::truncate(&error.to_string(), 500));
        entry.status_code = match error {
            LlmError::ApiError { status, .. } => Some(*status),
            LlmError::HttpError(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        };
        self.write_entry(&entry);
    }

    /// 写入日志条目
    fn write_entry(&self, entry: &LogEntry) {
        let json = match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(e) => {
                warn!("Failed to serialize request log entry: {}", e);
                return;
            }
        };

        let mut state = self.state.lock();

        if state.file.is_none() {
            match OpenOptions::new().create(true).append(true).open(&self.log_path) {
                Ok(f) => {
                    // 只在首次打开时统计已有条目，之后按写入计数
                    state.entries = self.count_lines();
                    state.file = Some(f);
                }
                Err(e) => {
                    warn!("Failed to open request log {}: {}", self.log_path.display(), e);
                    return;
                }
            }
        }

        if let Some(file) = state.file.as_mut() {
            if let Err(e) = writeln!(file, "{}", json).and_then(|_| file.flush()) {
                warn!("Failed to write request log entry: {}", e);
                return;
            }
        }
        state.entries += 1;

        // 超出上限一成后才压缩，避免每次写入都重写文件
        if state.entries > self.max_entries + self.max_entries / 10 {
            self.compact(&mut state);
        }
    }

    fn count_lines(&self) -> usize {
        File::open(&self.log_path)
            .map(|f| BufReader::new(f).lines().map_while(Result::ok).count())
            .unwrap_or(0)
    }

    /// 只保留最近 max_entries 条；调用方持有锁
    fn compact(&self, state: &mut LogFile) {
        let Ok(file) = File::open(&self.log_path) else {
            return;
        };
        let lines: Vec<String> = BufReader::new(file).lines().map_while(Result::ok).collect();
        let keep_lines = &lines[lines.len().saturating_sub(self.max_entries)..];

        // 重新打开追加句柄，下次写入落在压缩后的文件末尾
        state.file = None;
        match File::create(&self.log_path) {
            Ok(mut file) => {
                for line in keep_lines {
                    if let Err(e) = writeln!(file, "{}", line) {
                        warn!("Failed to compact request log: {}", e);
                        break;
                    }
                }
                state.entries = keep_lines.len();
            }
            Err(e) => warn!("Failed to compact request log {}: {}", self.log_path.display(), e),
        }
    }

    /// 读取全部条目
    #[cfg(test)]
    fn read_entries(&self) -> Vec<LogEntry> {
        let Ok(file) = File::open(&self.log_path) else {
            return Vec::new();
        };
        BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect()
    }
}
