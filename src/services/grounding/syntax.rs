//! tree-sitter 公共工具：解析、语法错误定位、节点文本

use tree_sitter::{Language, Node, Parser, Tree};

use super::types::GroundingError;

/// 语法错误片段的最大长度
const MAX_SNIPPET_CHARS: usize = 40;

/// 用给定语法解析源码；语法树含 ERROR/MISSING 节点时返回语法错误
pub fn parse_checked(language: Language, name: &str, code: &str) -> Result<Tree, GroundingError> {
    let mut parser = Parser::new();
    parser
        .set_language(language)
        .map_err(|e| GroundingError::Analysis(format!("failed to load {} grammar: {}", name, e)))?;

    let tree = parser
        .parse(code, None)
        .ok_or_else(|| GroundingError::Analysis("parser produced no syntax tree".to_string()))?;

    if tree.root_node().has_error() {
        return Err(syntax_error(tree.root_node(), code));
    }

    Ok(tree)
}

/// 按文档顺序遍历所有具名节点，显式栈避免深层嵌套导致递归过深
pub fn walk_named<'t, F>(root: Node<'t>, mut visit: F) -> Result<(), GroundingError>
where
    F: FnMut(Node<'t>) -> Result<(), GroundingError>,
{
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        visit(node)?;
        let mut cursor = node.walk();
        let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    Ok(())
}

pub fn node_text<'s>(node: Node<'_>, source: &'s [u8]) -> Result<&'s str, GroundingError> {
    node.utf8_text(source)
        .map_err(|e| GroundingError::Analysis(format!("invalid UTF-8 in source: {}", e)))
}

pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c == '_' || c == '$' || c.is_alphabetic() => {
            chars.all(|c| c == '_' || c == '$' || c.is_alphanumeric())
        }
        _ => false,
    }
}

/// 字节偏移转 1 起始行号
pub fn line_of_offset(code: &str, offset: usize) -> Option<usize> {
    code.get(..offset)
        .map(|head| head.bytes().filter(|b| *b == b'\n').count() + 1)
}

/// 定位第一个错误节点并生成诊断
fn syntax_error(root: Node<'_>, code: &str) -> GroundingError {
    let Some(node) = first_error_node(root) else {
        return GroundingError::Syntax {
            message: "invalid syntax".to_string(),
            line: None,
        };
    };

    let line = Some(node.start_position().row + 1);

    if node.is_missing() {
        return GroundingError::Syntax {
            message: format!("missing '{}'", node.kind()),
            line,
        };
    }

    let snippet: String = code
        .get(node.start_byte()..node.end_byte())
        .and_then(|text| text.lines().map(str::trim).find(|l| !l.is_empty()))
        .map(|l| l.chars().take(MAX_SNIPPET_CHARS).collect())
        .unwrap_or_default();

    let message = if snippet.is_empty() {
        "invalid syntax".to_string()
    } else {
        format!("invalid syntax near '{}'", snippet)
    };

    GroundingError::Syntax { message, line }
}

/// 按文档顺序查找第一个 ERROR 或 MISSING 节点
fn first_error_node(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        stack.extend(children.into_iter().rev());
    }
    None
}
