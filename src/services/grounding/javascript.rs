//! JavaScript / TypeScript 语言分析
//!
//! TypeScript 语法是 JavaScript 语法的超集，两者共用同一个遍历；
//! 接口、枚举和类型别名归入类一栏。

use std::collections::BTreeSet;
use tree_sitter::{Language, Node};

use super::syntax::{node_text, parse_checked, walk_named};
use super::types::{Definitions, GroundingError};

/// 函数值：`const f = () => ...` 记为函数而非变量
const FUNCTION_VALUES: &[&str] = &[
    "arrow_function",
    "function",
    "function_expression",
    "generator_function",
];

pub fn analyze_javascript_module(code: &str) -> Result<Definitions, GroundingError> {
    analyze(tree_sitter_javascript::language(), "JavaScript", code)
}

pub fn analyze_typescript_module(code: &str) -> Result<Definitions, GroundingError> {
    analyze(tree_sitter_typescript::language_typescript(), "TypeScript", code)
}

pub fn analyze_tsx_module(code: &str) -> Result<Definitions, GroundingError> {
    analyze(tree_sitter_typescript::language_tsx(), "TSX", code)
}

fn analyze(language: Language, name: &str, code: &str) -> Result<Definitions, GroundingError> {
    let tree = parse_checked(language, name, code)?;
    let source = code.as_bytes();
    let mut defs = Definitions::default();

    walk_named(tree.root_node(), |node| {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" | "method_definition" => {
                insert_identifier(node.child_by_field_name("name"), source, &mut defs.functions)?;
            }
            "class_declaration"
            | "abstract_class_declaration"
            | "interface_declaration"
            | "enum_declaration"
            | "type_alias_declaration" => {
                insert_identifier(node.child_by_field_name("name"), source, &mut defs.classes)?;
            }
            "variable_declarator" => {
                let is_function = node
                    .child_by_field_name("value")
                    .map(|v| FUNCTION_VALUES.contains(&v.kind()))
                    .unwrap_or(false);
                if let Some(target) = node.child_by_field_name("name") {
                    if is_function {
                        insert_identifier(Some(target), source, &mut defs.functions)?;
                    } else {
                        collect_pattern(target, source, &mut defs.variables)?;
                    }
                }
            }
            "assignment_expression" | "augmented_assignment_expression" | "for_in_statement" => {
                if let Some(left) = node.child_by_field_name("left") {
                    collect_pattern(left, source, &mut defs.variables)?;
                }
            }
            _ => {}
        }
        Ok(())
    })?;

    Ok(defs)
}

fn insert_identifier(
    node: Option<Node<'_>>,
    source: &[u8],
    names: &mut BTreeSet<String>,
) -> Result<(), GroundingError> {
    if let Some(node) = node {
        if is_name(node) {
            names.insert(node_text(node, source)?.to_string());
        }
    }
    Ok(())
}

fn is_name(node: Node<'_>) -> bool {
    matches!(
        node.kind(),
        "identifier" | "type_identifier" | "property_identifier" | "private_property_identifier"
    )
}

/// 从声明或赋值左侧收集被绑定的标识符，展开解构模式
///
/// 成员访问（`obj.x`）和下标（`a[i]`）跳过。
fn collect_pattern(
    node: Node<'_>,
    source: &[u8],
    names: &mut BTreeSet<String>,
) -> Result<(), GroundingError> {
    match node.kind() {
        "identifier" | "shorthand_property_identifier_pattern" => {
            names.insert(node_text(node, source)?.to_string());
        }
        "pair_pattern" => {
            if let Some(value) = node.child_by_field_name("value") {
                collect_pattern(value, source, names)?;
            }
        }
        "assignment_pattern" | "object_assignment_pattern" => {
            if let Some(left) = node.child_by_field_name("left") {
                collect_pattern(left, source, names)?;
            }
        }
        "object_pattern" | "array_pattern" | "rest_pattern" | "parenthesized_expression" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_pattern(child, source, names)?;
            }
        }
        _ => {}
    }
    Ok(())
}
