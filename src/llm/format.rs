//! URL 构建和请求头工具

/// 修复 base_url
///
/// - 移除末尾斜杠
/// - 修复双斜杠（保留协议部分）
pub fn fix_base_url(base_url: &str) -> String {
    let mut url = base_url.trim().trim_end_matches('/').to_string();

    if let Some(pos) = url.find("://") {
        let (protocol, rest) = url.split_at(pos + 3);
        let fixed_rest = rest.replace("//", "/");
        url = format!("{}{}", protocol, fixed_rest);
    }

    url
}

/// 构建 OpenAI 兼容的 Chat Completions 端点
///
/// OpenRouter 的 base_url 形如 `https://openrouter.ai/api/v1`，已带版本段。
pub fn build_openai_endpoint(base_url: &str) -> String {
    let url = fix_base_url(base_url);

    if url.ends_with("/chat/completions") {
        url
    } else if url.ends_with("/v1") {
        format!("{}/chat/completions", url)
    } else {
        format!("{}/v1/chat/completions", url)
    }
}

/// 构建 Ollama 聊天端点
pub fn build_ollama_endpoint(base_url: &str) -> String {
    let mut url = fix_base_url(base_url);

    // OLLAMA_HOST 允许只写 host:port
    if !url.contains("://") {
        url = format!("http://{}", url);
    }

    if url.ends_with("/api/chat") {
        url
    } else if url.ends_with("/api") {
        format!("{}/chat", url)
    } else {
        format!("{}/api/chat", url)
    }
}

/// OpenRouter 应用署名请求头
pub fn get_attribution_headers() -> Vec<(&'static str, &'static str)> {
    vec![
        ("HTTP-Referer", "http://localhost:5173"),
        ("X-Title", "Socratic AI Debugging Tutor"),
    ]
}
