//! Python 语言分析
//!
//! 先用 rustpython-parser 按 CPython 语法校验（缩进、块体、print 语句等 tree-sitter 容忍的错误），
//! 再基于 tree-sitter-python 语法树收集赋值目标、函数名和类名。

use rustpython_parser::{ast, Parse};
use std::collections::BTreeSet;
use tree_sitter::Node;

use super::syntax::{is_identifier, line_of_offset, node_text, parse_checked, walk_named};
use super::types::{Definitions, GroundingError};

/// 分析 Python 源码
pub fn analyze_python_module(code: &str) -> Result<Definitions, GroundingError> {
    validate_python_syntax(code)?;

    let tree = parse_checked(tree_sitter_python::language(), "Python", code)?;
    let source = code.as_bytes();
    let mut defs = Definitions::default();

    walk_named(tree.root_node(), |node| {
        match node.kind() {
            "function_definition" => insert_field_name(node, source, &mut defs.functions)?,
            "class_definition" => insert_field_name(node, source, &mut defs.classes)?,
            "assignment" | "augmented_assignment" | "for_statement" | "for_in_clause" => {
                if let Some(left) = node.child_by_field_name("left") {
                    collect_targets(left, source, &mut defs.variables)?;
                }
            }
            "named_expression" => {
                if let Some(name) = node.child_by_field_name("name") {
                    collect_targets(name, source, &mut defs.variables)?;
                }
            }
            // 旧版语法把 `as` 目标直接挂在 with_item 上
            "with_item" => {
                if let Some(alias) = node.child_by_field_name("alias") {
                    collect_targets(alias, source, &mut defs.variables)?;
                }
            }
            // except/case 中的 as 不是名称绑定
            "as_pattern" if node.parent().map(|p| p.kind()) == Some("with_item") => {
                if let Some(alias) = node.child_by_field_name("alias") {
                    collect_targets(alias, source, &mut defs.variables)?;
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok(defs)
}

/// 按 CPython 语法校验，错误信息与行号来自 rustpython 解析器
fn validate_python_syntax(code: &str) -> Result<(), GroundingError> {
    ast::Suite::parse(code, "<embedded>")
        .map(|_| ())
        .map_err(|e| GroundingError::Syntax {
            message: e.error.to_string(),
            line: line_of_offset(code, u32::from(e.offset) as usize),
        })
}

/// 收集 name 字段
fn insert_field_name(
    node: Node<'_>,
    source: &[u8],
    names: &mut BTreeSet<String>,
) -> Result<(), GroundingError> {
    if let Some(name) = node.child_by_field_name("name") {
        names.insert(node_text(name, source)?.to_string());
    }
    Ok(())
}

/// 从赋值左侧收集被绑定的标识符
///
/// 属性（`self.x`）和下标（`d[k]`）不是名称绑定，跳过。
fn collect_targets(
    node: Node<'_>,
    source: &[u8],
    names: &mut BTreeSet<String>,
) -> Result<(), GroundingError> {
    match node.kind() {
        "identifier" | "keyword_identifier" => {
            names.insert(node_text(node, source)?.to_string());
        }
        "as_pattern_target" if node.named_child_count() == 0 => {
            let text = node_text(node, source)?;
            if is_identifier(text) {
                names.insert(text.to_string());
            }
        }
        "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern" | "tuple"
        | "list" | "expression_list" | "parenthesized_expression" | "list_splat"
        | "as_pattern_target" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_targets(child, source, names)?;
            }
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_basic_definitions() {
        let code = "a = 1\nb = a + 1\n\ndef foo():\n    return b\n\nclass Bar:\n    pass\n";
        let defs = analyze_python_module(code).unwrap();
        assert_eq!(names(&defs.variables), vec!["a", "b"]);
        assert_eq!(names(&defs.functions), vec!["foo"]);
        assert_eq!(names(&defs.classes), vec!["Bar"]);
    }

    #[test]
    fn test_unpacking_and_loop_targets() {
        let code = "\
x, y = 1, 2
(p, q) = (3, 4)
[first, *rest] = [1, 2, 3]
for k, v in {}.items():
    pass
squares = [i * i for i in range(3)]
";
        let defs = analyze_python_module(code).unwrap();
        assert_eq!(
            names(&defs.variables),
            vec!["first", "i", "k", "p", "q", "rest", "squares", "v", "x", "y"]
        );
    }

    #[test]
    fn test_augmented_annotated_and_chained() {
        let code = "total: int = 0\ntotal += 1\nlimit: int\nm = n = 5\n";
        let defs = analyze_python_module(code).unwrap();
        assert_eq!(names(&defs.variables), vec!["limit", "m", "n", "total"]);
    }

    #[test]
    fn test_walrus_and_with_targets() {
        let code = "\
data = []
if (size := len(data)) > 10:
    pass
with open('f.txt') as fh:
    content = fh.read()
";
        let defs = analyze_python_module(code).unwrap();
        assert_eq!(names(&defs.variables), vec!["content", "data", "fh", "size"]);
    }

    #[test]
    fn test_attribute_subscript_and_references_excluded() {
        let code = "\
import os
class Config:
    def __init__(self, path):
        self.path = path
        cache['k'] = path
try:
    print(os.getcwd())
except ValueError as err:
    pass
";
        let defs = analyze_python_module(code).unwrap();
        assert!(defs.variables.is_empty(), "unexpected: {:?}", defs.variables);
        assert_eq!(names(&defs.functions), vec!["__init__"]);
        assert_eq!(names(&defs.classes), vec!["Config"]);
    }

    #[test]
    fn test_nested_async_and_decorated_definitions() {
        let code = "\
@dataclass
class Outer:
    class Inner:
        pass

    async def fetch(self):
        def helper():
            result = 1
            return result
        return helper()

@staticmethod
def decorated():
    pass
";
        let defs = analyze_python_module(code).unwrap();
        assert_eq!(names(&defs.functions), vec!["decorated", "fetch", "helper"]);
        assert_eq!(names(&defs.classes), vec!["Inner", "Outer"]);
        assert_eq!(names(&defs.variables), vec!["result"]);
    }

    #[test]
    fn test_duplicates_collapse() {
        let defs = analyze_python_module("x = 1\nx = 2\ndef f(): pass\ndef f(): pass\n").unwrap();
        assert_eq!(names(&defs.variables), vec!["x"]);
        assert_eq!(names(&defs.functions), vec!["f"]);
    }

    #[test]
    fn test_syntax_error_reports_line() {
        let err = analyze_python_module("x = 1\ny = 2\ndef broken(:\n    pass\n").unwrap_err();
        match err {
            GroundingError::Syntax { line, .. } => {
                let line = line.expect("line number");
                assert!((1..=5).contains(&line), "line was {line}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_block_and_indentation_errors() {
        let cases = [
            "def f():\nreturn 1\n",
            "x = 1\n    y = 2\n",
            "for i in range(3):\nprint(i)\n",
            "print \"hello\"\n",
            "class A:\n\ndef g(): pass\n",
        ];
        for code in cases {
            match analyze_python_module(code) {
                Err(GroundingError::Syntax { line, .. }) => {
                    let line = line.expect("line number");
                    assert!((1..=code.lines().count()).contains(&line), "{code:?}: line {line}");
                }
                other => panic!("{code:?} should be a syntax error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_python2_print_reported_not_listed() {
        let report = crate::services::grounding::extract_grounding("python", "print \"hello\"\n");
        assert!(report.starts_with("Syntax error in code:"), "{report}");
        assert!(!report.contains("Defined"));
    }
}
