//! 代码结构摘要（grounding）
//!
//! 解析用户提交的代码，生成一段确定性的文本摘要，列出其中定义的变量、函数和类，
//! 让模型的提问锚定在真实存在的代码上。任何失败都降级为一行诊断文本，从不返回错误。

mod cpp;
mod java;
mod javascript;
mod python;
mod syntax;
pub mod types;

use tracing::debug;

use types::{GroundingError, SourceLanguage, NO_CODE_PROVIDED};

/// 生成代码结构摘要
///
/// `language` 为请求中的语言标签，用于选择语法。
pub fn extract_grounding(language: &str, code: &str) -> String {
    if code.trim().is_empty() {
        return NO_CODE_PROVIDED.to_string();
    }

    let result = match SourceLanguage::from_label(language) {
        Some(SourceLanguage::Python) => python::analyze_python_module(code),
        Some(SourceLanguage::JavaScript) => javascript::analyze_javascript_module(code),
        Some(SourceLanguage::TypeScript) => javascript::analyze_typescript_module(code),
        Some(SourceLanguage::Tsx) => javascript::analyze_tsx_module(code),
        Some(SourceLanguage::Java) => java::analyze_java_module(code),
        Some(SourceLanguage::Cpp) => cpp::analyze_cpp_module(code),
        None => Err(GroundingError::Analysis(format!(
            "no grammar available for language '{}'",
            language.trim()
        ))),
    };

    match result {
        Ok(defs) => defs.render(),
        Err(e) => {
            debug!("Grounding degraded to diagnostic: {}", e);
            e.render()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::types::NO_DEFINITIONS_DETECTED;
    use super::*;

    #[test]
    fn test_blank_code_returns_sentinel() {
        assert_eq!(extract_grounding("python", ""), "No code provided.");
        assert_eq!(extract_grounding("python", "   \n\t  \n"), "No code provided.");
        // 空代码不会走到语言选择
        assert_eq!(extract_grounding("cobol", "  "), "No code provided.");
    }

    #[test]
    fn test_variables_functions_classes() {
        let code = "a = 1\nb = 2\n\ndef foo():\n    pass\n\nclass Bar:\n    pass\n";
        assert_eq!(
            extract_grounding("python", code),
            "Defined variables/constants: a, b\nDefined functions: foo\nDefined classes: Bar"
        );
    }

    #[test]
    fn test_variables_and_function_only() {
        assert_eq!(
            extract_grounding("python", "x = 1\ndef foo(): pass"),
            "Defined variables/constants: x\nDefined functions: foo"
        );
    }

    #[test]
    fn test_no_definitions() {
        assert_eq!(extract_grounding("python", "print('hi')\n"), NO_DEFINITIONS_DETECTED);
    }

    #[test]
    fn test_syntax_error_is_single_line() {
        let report = extract_grounding("python", "def foo(:\n    return 1\n");
        assert!(report.starts_with("Syntax error in code:"), "{report}");
        assert!(report.to_lowercase().contains("error"));
        assert!(!report.contains('\n'));

        let line = report
            .rsplit_once("(line ")
            .map(|(_, rest)| rest.trim_end_matches(')'))
            .expect("line marker");
        assert!(line == "?" || line.parse::<usize>().is_ok(), "line was {line}");
    }

    #[test]
    fn test_unsupported_language() {
        let report = extract_grounding("cobol", "DISPLAY 'HELLO'.");
        assert_eq!(
            report,
            "Could not analyze code structure: no grammar available for language 'cobol'"
        );
    }

    #[test]
    fn test_grammar_selected_by_label() {
        assert_eq!(
            extract_grounding("javascript", "const x = 1;"),
            "Defined variables/constants: x"
        );
        assert_eq!(
            extract_grounding("typescript", "interface Props { id: number }
function render(p: Props) {}"),
            "Defined functions: render\nDefined classes: Props"
        );
        assert_eq!(
            extract_grounding("java", "class App { int port = 8080; void start() {} }"),
            "Defined variables/constants: port\nDefined functions: start\nDefined classes: App"
        );
        assert_eq!(
            extract_grounding("cpp", "int main() { return 0; }"),
            "Defined functions: main"
        );
    }

    #[test]
    fn test_syntax_error_in_other_languages() {
        for (language, code) in [
            ("javascript", "function f( {"),
            ("java", "class A { void f( }"),
            ("cpp", "int main( {"),
        ] {
            let report = extract_grounding(language, code);
            assert!(report.starts_with("Syntax error in code:"), "{language}: {report}");
            assert!(!report.contains('\n'));
        }
    }

    #[test]
    fn test_deterministic_output() {
        let code = "zeta = 1\nalpha = 2\nmid = 3\n";
        let first = extract_grounding("python", code);
        assert_eq!(first, extract_grounding("python", code));
        assert_eq!(first, "Defined variables/constants: alpha, mid, zeta");
    }
}
