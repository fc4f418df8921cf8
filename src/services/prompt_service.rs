//! Prompt 构建服务
//!
//! 负责把辅导指令、历史对话和带代码摘要的当前轮次组装成消息列表。

use crate::llm::ChatMessage;
use crate::models::DebugRequest;

use super::grounding::extract_grounding;

/// 系统提示词
const SYSTEM_PROMPT: &str = r#"You are a patient, Socratic debugging tutor.
Your goal is to HELP THE USER DISCOVER the bug themselves through questions, hints, and reasoning prompts.
NEVER give the corrected code or directly say what the bug is.
Use questions like:
- What do you think this line is supposed to do?
- Have you checked whether ... is defined before it's used?
- What happens if you print ... right before the error line?
- Can you describe the difference between what you expect and what actually happens?

Be encouraging. Ask one or two focused questions at a time.
If they are stuck, give a small hint, but still no direct solution."#;

/// Prompt 服务
pub struct PromptService;

impl PromptService {
    /// 创建新的 Prompt 服务
    pub fn new() -> Self {
        Self
    }

    /// 组装消息列表：系统指令、历史对话、当前轮次
    pub fn assemble(&self, request: &DebugRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(request.conversation_history.len() + 2);

        messages.push(ChatMessage::system(SYSTEM_PROMPT));
        messages.extend(request.conversation_history.iter().cloned());
        messages.push(ChatMessage::user(Self::build_current_turn(request)));

        messages
    }

    /// 构建当前轮次内容
    fn build_current_turn(request: &DebugRequest) -> String {
        let grounding = extract_grounding(&request.language, &request.code);

        let mut prompt = format!(
            "Grounding from code analysis (AST):\n{grounding}\n\n\
             Language: {language}\n\
             Code:\n```{language}\n{code}\n```\n",
            grounding = grounding,
            language = request.language,
            code = request.code,
        );

        if let Some(issue) = request
            .issue_description
            .as_deref()
            .filter(|s| !s.trim().is_empty())
        {
            prompt.push_str(&format!("\nInitial problem description: {}\n\n", issue));
            prompt.push_str("Continue the Socratic dialogue based on the latest user message.");
        }

        prompt
    }
}

impl Default for PromptService {
    fn default() -> Self {
        Self::new()
    }
}
