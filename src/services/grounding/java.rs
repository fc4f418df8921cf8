//! Java 语言分析

use std::collections::BTreeSet;
use tree_sitter::Node;

use super::syntax::{node_text, parse_checked, walk_named};
use super::types::{Definitions, GroundingError};

/// 分析 Java 源码
///
/// 字段、局部变量和增强 for 循环变量记为变量；方法与构造器记为函数；
/// class/interface/enum/record 记为类。
pub fn analyze_java_module(code: &str) -> Result<Definitions, GroundingError> {
    let tree = parse_checked(tree_sitter_java::language(), "Java", code)?;
    let source = code.as_bytes();
    let mut defs = Definitions::default();

    walk_named(tree.root_node(), |node| {
        match node.kind() {
            "method_declaration" | "constructor_declaration" => {
                insert_name(node, source, &mut defs.functions)?;
            }
            "class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "record_declaration"
            | "annotation_type_declaration" => {
                insert_name(node, source, &mut defs.classes)?;
            }
            "variable_declarator" | "enhanced_for_statement" => {
                insert_name(node, source, &mut defs.variables)?;
            }
            // 字段访问（this.x）和数组元素不是名称绑定
            "assignment_expression" => {
                if let Some(left) = node.child_by_field_name("left") {
                    if left.kind() == "identifier" {
                        defs.variables.insert(node_text(left, source)?.to_string());
                    }
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok(defs)
}

fn insert_name(
    node: Node<'_>,
    source: &[u8],
    names: &mut BTreeSet<String>,
) -> Result<(), GroundingError> {
    if let Some(name) = node.child_by_field_name("name") {
        if name.kind() == "identifier" {
            names.insert(node_text(name, source)?.to_string());
        }
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
    fn test_class_members() {
        let code = "\
public class Counter {
    private int count = 0;
    private static final int LIMIT = 10, STEP = 1;

    public Counter(int start) {
        this.count = start;
    }

    public int next() {
        int previous = count;
        count += STEP;
        return previous;
    }
}
";
        let defs = analyze_java_module(code).unwrap();
        assert_eq!(names(&defs.classes), vec!["Counter"]);
        assert_eq!(names(&defs.functions), vec!["Counter", "next"]);
        assert_eq!(names(&defs.variables), vec!["LIMIT", "STEP", "count", "previous"]);
    }

    #[test]
    fn test_loops_and_type_declarations() {
        let code = "\
interface Shape { double area(); }
enum Color { RED, GREEN }
class Main {
    static void run(int[] values) {
        int total;
        for (int i = 0; i < values.length; i++) {}
        for (int v : values) { total = v; }
        values[0] = 1;
    }
}
";
        let defs = analyze_java_module(code).unwrap();
        assert_eq!(names(&defs.classes), vec!["Color", "Main", "Shape"]);
        assert_eq!(names(&defs.functions), vec!["area", "run"]);
        assert_eq!(names(&defs.variables), vec!["i", "total", "v"]);
    }

    #[test]
    fn test_java_syntax_error() {
        let err = analyze_java_module("class A {\n    void f( {\n}\n").unwrap_err();
        assert!(matches!(err, GroundingError::Syntax { line: Some(_), .. }));
    }
}
