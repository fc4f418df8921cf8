//! 代码结构摘要类型定义

use std::collections::BTreeSet;
use thiserror::Error;

/// 代码为空时的固定提示
pub const NO_CODE_PROVIDED: &str = "No code provided.";

/// 未发现任何定义时的固定提示
pub const NO_DEFINITIONS_DETECTED: &str = "No variable/function/class definitions detected.";

/// 可解析的源语言
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    Python,
    JavaScript,
    TypeScript,
    Tsx,
    Java,
    /// C 代码按 C++ 语法解析
    Cpp,
}

impl SourceLanguage {
    /// 根据请求中的语言标签选择语法
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "python" | "py" | "python3" => Some(SourceLanguage::Python),
            "javascript" | "js" | "jsx" | "node" => Some(SourceLanguage::JavaScript),
            "typescript" | "ts" => Some(SourceLanguage::TypeScript),
            "tsx" => Some(SourceLanguage::Tsx),
            "java" => Some(SourceLanguage::Java),
            "cpp" | "c++" | "cxx" | "cc" | "c" => Some(SourceLanguage::Cpp),
            _ => None,
        }
    }
}

/// 代码中定义的名称，BTreeSet 保证去重且按字典序输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Definitions {
    /// 赋值目标（被绑定而非仅被引用的标识符）
    pub variables: BTreeSet<String>,
    pub functions: BTreeSet<String>,
    pub classes: BTreeSet<String>,
}

impl Definitions {
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty() && self.functions.is_empty() && self.classes.is_empty()
    }

    /// 渲染为多行文本，空类别省略
    pub fn render(&self) -> String {
        if self.is_empty() {
            return NO_DEFINITIONS_DETECTED.to_string();
        }

        let categories = [
            ("Defined variables/constants", &self.variables),
            ("Defined functions", &self.functions),
            ("Defined classes", &self.classes),
        ];

        categories
            .iter()
            .filter(|(_, names)| !names.is_empty())
            .map(|(label, names)| {
                let joined: Vec<&str> = names.iter().map(String::as_str).collect();
                format!("{}: {}", label, joined.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// 分析失败
#[derive(Debug, Error)]
pub enum GroundingError {
    /// 语法错误，line 为 1 起始的行号
    #[error("{message}")]
    Syntax { message: String, line: Option<usize> },

    /// 其他无法完成分析的情况
    #[error("{0}")]
    Analysis(String),
}

impl GroundingError {
    /// 渲染为单行诊断文本
    pub fn render(&self) -> String {
        match self {
            GroundingError::Syntax { message, line } => {
                let line = line.map(|l| l.to_string()).unwrap_or_else(|| "?".to_string());
                format!("Syntax error in code: {} (line {})", message, line)
            }
            GroundingError::Analysis(description) => {
                format!("Could not analyze code structure: {}", description)
            }
        }
    }
}
