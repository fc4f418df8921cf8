//! REST API 请求/响应模型

use serde::{Deserialize, Serialize};

use crate::llm::ChatMessage;

/// 调试辅导请求
#[derive(Debug, Clone, Deserialize)]
pub struct DebugRequest {
    /// 用户提交的代码
    pub code: String,
    /// 语言标签，如 "python"
    pub language: String,
    /// 初始问题描述，仅会话首轮携带
    #[serde(default)]
    pub issue_description: Option<String>,
    /// 后端选择："ollama" / "openrouter"（也接受 "local" / "hosted"）
    #[serde(alias = "provider")]
    pub llm_provider: String,
    /// 托管后端的模型覆盖
    #[serde(default)]
    pub model: Option<String>,
    /// 之前的对话，按时间顺序
    #[serde(default)]
    pub conversation_history: Vec<ChatMessage>,
}

/// 调试辅导响应
#[derive(Debug, Serialize)]
pub struct DebugResponse {
    pub response: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;

    #[test]
    fn test_deserialize_frontend_payload() {
        let body = r#"{
            "code": "x = 1",
            "language": "python",
            "issue_description": "it crashes",
            "llm_provider": "openrouter",
            "model": "openai/gpt-4o",
            "conversation_history": [
                {"role": "user", "content": "it crashes"},
                {"role": "assistant", "content": "What did you expect?"}
            ]
        }"#;
        let req: DebugRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.llm_provider, "openrouter");
        assert_eq!(req.model.as_deref(), Some("openai/gpt-4o"));
        assert_eq!(req.conversation_history.len(), 2);
        assert_eq!(req.conversation_history[1].role, Role::Assistant);
    }

    #[test]
    fn test_optional_fields_default() {
        let body = r#"{"code": "x = 1", "language": "python", "provider": "local"}"#;
        let req: DebugRequest = serde_json::from_str(body).unwrap();
        assert_eq!(req.llm_provider, "local");
        assert!(req.issue_description.is_none());
        assert!(req.model.is_none());
        assert!(req.conversation_history.is_empty());
    }

    #[test]
    fn test_unknown_history_role_rejected() {
        let body = r#"{
            "code": "x = 1",
            "language": "python",
            "llm_provider": "ollama",
            "conversation_history": [{"role": "tool", "content": "{}"}]
        }"#;
        assert!(serde_json::from_str::<DebugRequest>(body).is_err());
    }

    #[test]
    fn test_serialize_response() {
        let value = serde_json::to_value(DebugResponse {
            response: "What does line 3 return?".to_string(),
        })
        .unwrap();
        assert_eq!(value, serde_json::json!({"response": "What does line 3 return?"}));
    }
}
