//! C++ 语言分析（C 代码也走这里）
//!
//! 声明符层层嵌套（指针、引用、数组、初始化），名称需要逐层剥开。

use std::collections::BTreeSet;
use tree_sitter::Node;

use super::syntax::{node_text, parse_checked, walk_named};
use super::types::{Definitions, GroundingError};

/// 声明符最终落到的名称节点
const NAME_KINDS: &[&str] = &[
    "identifier",
    "field_identifier",
    "qualified_identifier",
    "destructor_name",
    "operator_name",
];

pub fn analyze_cpp_module(code: &str) -> Result<Definitions, GroundingError> {
    let tree = parse_checked(tree_sitter_cpp::language(), "C++", code)?;
    let source = code.as_bytes();
    let mut defs = Definitions::default();

    walk_named(tree.root_node(), |node| {
        match node.kind() {
            "function_definition" => {
                if let Some(name) = node
                    .child_by_field_name("declarator")
                    .and_then(declarator_name)
                {
                    defs.functions.insert(node_text(name, source)?.to_string());
                }
            }
            // 只有带定义体的才算定义，前置声明跳过
            "class_specifier" | "struct_specifier" | "union_specifier" | "enum_specifier" => {
                if node.child_by_field_name("body").is_some() {
                    if let Some(name) = node.child_by_field_name("name") {
                        defs.classes.insert(node_text(name, source)?.to_string());
                    }
                }
            }
            "declaration" | "field_declaration" | "for_range_loop" => {
                collect_declarators(node, source, &mut defs.variables)?;
            }
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

/// 收集一个声明中的所有变量名；函数原型不算变量
fn collect_declarators(
    node: Node<'_>,
    source: &[u8],
    names: &mut BTreeSet<String>,
) -> Result<(), GroundingError> {
    let mut cursor = node.walk();
    let declarators: Vec<Node<'_>> = node.children_by_field_name("declarator", &mut cursor).collect();
    for declarator in declarators {
        if declares_function(declarator) {
            continue;
        }
        if let Some(name) = declarator_name(declarator) {
            names.insert(node_text(name, source)?.to_string());
        }
    }
    Ok(())
}

/// 剥开指针/引用/数组/初始化声明符，取出被声明的名称
fn declarator_name(node: Node<'_>) -> Option<Node<'_>> {
    let mut current = node;
    loop {
        if NAME_KINDS.contains(&current.kind()) {
            return Some(current);
        }
        current = match current.child_by_field_name("declarator") {
            Some(inner) => inner,
            // reference_declarator 没有 declarator 字段
            None if current.kind() == "reference_declarator" => current.named_child(0)?,
            None => return None,
        };
    }
}

fn declares_function(node: Node<'_>) -> bool {
    let mut current = Some(node);
    while let Some(node) = current {
        if node.kind() == "function_declarator" {
            return true;
        }
        current = match node.child_by_field_name("declarator") {
            Some(inner) => Some(inner),
            None if node.kind() == "reference_declarator" => node.named_child(0),
            None => None,
        };
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(set: &BTreeSet<String>) -> Vec<&str> {
        set.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_functions_and_variables() {
        let code = "\
#include <vector>
int counter = 0, *cursor = nullptr;
int square(int x);
static int add(int a, int b) { return a + b; }
int main() {
    std::vector<int> values{1, 2, 3};
    int total = 0;
    for (const auto& v : values) { total += v; }
    counter = add(total, 1);
    values[0] = 5;
    return 0;
}
";
        let defs = analyze_cpp_module(code).unwrap();
        assert_eq!(names(&defs.functions), vec!["add", "main"]);
        assert_eq!(names(&defs.variables), vec!["counter", "cursor", "total", "v", "values"]);
        assert!(defs.classes.is_empty());
    }

    #[test]
    fn test_classes_members_and_methods() {
        let code = "\
struct Point { int x; int y; };
class Shape;
class Circle {
public:
    explicit Circle(double r) : radius(r) {}
    ~Circle() {}
    double area() const { return 3.14 * radius * radius; }
private:
    double radius;
};
enum class Color { Red, Green };
double Circle2_area(const Circle& c) { return c.area(); }
";
        let defs = analyze_cpp_module(code).unwrap();
        assert_eq!(names(&defs.classes), vec!["Circle", "Color", "Point"]);
        assert_eq!(
            names(&defs.functions),
            vec!["Circle", "Circle2_area", "area", "~Circle"]
        );
        assert_eq!(names(&defs.variables), vec!["radius", "x", "y"]);
    }

    #[test]
    fn test_cpp_syntax_error() {
        let err = analyze_cpp_module("int main() {\n    int x = ;\n").unwrap_err();
        assert!(matches!(err, GroundingError::Syntax { line: Some(_), .. }));
    }
}
