//! Lowering Adapters for distiller-ir
//!
//! Each language requires an adapter that lowers source bytes into the
//! language-agnostic IR. Adapters implement the `LanguageAdapter` trait; the
//! ones built on Tree-sitter implement `TreeSitterAdapter` and delegate to
//! [`lower_with_tree_sitter`].
//!
//! # Reference adapters
//!
//! - **Python**: imports, classes, functions (def/async), decorators, docstrings, fields
//! - **Rust**: use/mod, structs, enums, traits, impl blocks merged into their types
//! - **Java**: package, imports, classes, interfaces, enums, records, annotations

pub mod java_adapter;
pub mod python_adapter;
pub mod rust_adapter;

use crate::error::{IrError, Result};
use crate::ir::{Comment, ErrorNode, File, LanguageId, Location, Node, Severity};

pub use java_adapter::JavaTreeSitterAdapter;
pub use python_adapter::PythonTreeSitterAdapter;
pub use rust_adapter::RustTreeSitterAdapter;

/// Longest excerpt of broken source quoted in an error message
const ERROR_EXCERPT_LIMIT: usize = 80;

/// Lowering contract: source bytes in, one `File` out
///
/// Visibility and modifiers on every returned node are fully resolved.
/// Recoverable problems are reported as `Error` nodes, not as `Err`.
pub trait LanguageAdapter: Send + Sync {
    /// The language this adapter handles
    fn language(&self) -> LanguageId;

    /// Lower one file
    fn lower(&self, source: &[u8], filename: &str) -> Result<File>;
}

/// Helper trait for adapters driven by a Tree-sitter grammar
pub trait TreeSitterAdapter: LanguageAdapter {
    /// Get the Tree-sitter language
    fn tree_sitter_language(&self) -> tree_sitter::Language;

    /// Lower the top level of a parse tree into IR nodes, in source order
    fn lower_tree(&self, tree: &tree_sitter::Tree, source: &str) -> Vec<Node>;

    /// Collect `Error` nodes for ERROR and MISSING nodes in the tree
    fn extract_errors(&self, tree: &tree_sitter::Tree, source: &str) -> Vec<Node> {
        let mut errors = Vec::new();
        let mut cursor = tree.walk();

        fn visit_errors(
            cursor: &mut tree_sitter::TreeCursor,
            source: &str,
            errors: &mut Vec<Node>,
        ) {
            loop {
                let node = cursor.node();

                if node.is_missing() {
                    errors.push(Node::Error(ErrorNode {
                        message: format!("Missing syntax element: {}", node.kind()),
                        severity: Severity::Warning,
                        code: Some("missing".to_string()),
                        location: node_to_location(&node),
                    }));
                } else if node.is_error() {
                    errors.push(Node::Error(ErrorNode {
                        message: format!("Syntax error near `{}`", excerpt(&node, source)),
                        severity: Severity::Error,
                        code: Some("syntax".to_string()),
                        location: node_to_location(&node),
                    }));
                    // An ERROR subtree is reported once
                    if !cursor.goto_next_sibling() {
                        break;
                    }
                    continue;
                }

                if cursor.goto_first_child() {
                    visit_errors(cursor, source, errors);
                    cursor.goto_parent();
                }

                if !cursor.goto_next_sibling() {
                    break;
                }
            }
        }

        visit_errors(&mut cursor, source, &mut errors);
        errors
    }
}

/// Shared `lower` implementation for Tree-sitter adapters
///
/// A fresh parser is created for every call, so adapters hold no parser
/// state and may be shared across threads.
pub fn lower_with_tree_sitter<A>(adapter: &A, source: &[u8], filename: &str) -> Result<File>
where
    A: TreeSitterAdapter + ?Sized,
{
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&adapter.tree_sitter_language())
        .map_err(|e| IrError::TreeSitterError(e.to_string()))?;

    let text = String::from_utf8_lossy(source);
    let tree = parser.parse(text.as_ref(), None).ok_or_else(|| {
        IrError::parse_error_with_partial(
            format!("parser returned no tree for '{}'", filename),
            File::new(filename, adapter.language()),
        )
    })?;

    let root = tree.root_node();
    let mut children = adapter.lower_tree(&tree, &text);

    if std::str::from_utf8(source).is_err() {
        children.push(Node::Error(ErrorNode {
            message: "Source is not valid UTF-8; invalid bytes were replaced".to_string(),
            severity: Severity::Warning,
            code: Some("encoding".to_string()),
            location: node_to_location(&root),
        }));
    }

    if root.has_error() {
        children.extend(adapter.extract_errors(&tree, &text));
    }

    Ok(File::new(filename, adapter.language())
        .with_location(node_to_location(&root))
        .with_children(children))
}

fn excerpt(node: &tree_sitter::Node, source: &str) -> String {
    let text = node_text(node, source).trim();
    let first_line = text.lines().next().unwrap_or("");
    if first_line.len() <= ERROR_EXCERPT_LIMIT {
        first_line.to_string()
    } else {
        let mut end = ERROR_EXCERPT_LIMIT;
        while !first_line.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &first_line[..end])
    }
}

/// Convert a Tree-sitter node to our Location type
pub fn node_to_location(node: &tree_sitter::Node) -> Location {
    Location {
        start_line: node.start_position().row + 1, // 1-indexed
        start_column: node.start_position().column,
        end_line: node.end_position().row + 1,
        end_column: node.end_position().column,
        start_byte: node.start_byte(),
        end_byte: node.end_byte(),
    }
}

/// Get the text content of a Tree-sitter node
pub fn node_text<'a>(node: &tree_sitter::Node, source: &'a str) -> &'a str {
    source.get(node.start_byte()..node.end_byte()).unwrap_or("")
}

/// Find a child node by its kind
pub fn find_child_by_kind<'a>(
    node: &tree_sitter::Node<'a>,
    kind: &str,
) -> Option<tree_sitter::Node<'a>> {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).find(|child| child.kind() == kind);
    found
}

/// Text of a named field, if present
pub fn field_text<'a>(node: &tree_sitter::Node, field: &str, source: &'a str) -> Option<&'a str> {
    node.child_by_field_name(field).map(|n| node_text(&n, source))
}

/// Leading doc comments waiting for the declaration they document
///
/// Adapters push doc comments as they walk a body and hand every lowered
/// element to [`PendingDoc::attach`]. The doc lands on the declarations the
/// element lowered to, so it is kept or dropped together with them.
#[derive(Debug, Default)]
pub(crate) struct PendingDoc {
    doc: Option<Comment>,
}

impl PendingDoc {
    /// Queue a doc comment; consecutive ones merge into one block
    pub(crate) fn push(&mut self, comment: Comment) {
        match &mut self.doc {
            Some(doc) => {
                doc.text.push('\n');
                doc.text.push_str(&comment.text);
                doc.location.end_byte = comment.location.end_byte;
                doc.location.end_line = comment.location.end_line;
                doc.location.end_column = comment.location.end_column;
            }
            None => self.doc = Some(comment),
        }
    }

    /// Give the queued doc to `lowered`
    ///
    /// Every declaration in `lowered` gets a copy (`int a, b;` documents
    /// both fields). When `lowered` holds no declaration the doc stays in
    /// place as a standalone comment, and when it is empty the doc is
    /// dropped with the construct it described.
    pub(crate) fn attach(&mut self, lowered: Vec<Node>) -> Vec<Node> {
        let Some(doc) = self.doc.take() else {
            return lowered;
        };
        if lowered.is_empty() {
            return lowered;
        }
        if !lowered.iter().any(|node| node.kind().accepts_doc()) {
            let mut nodes = Vec::with_capacity(lowered.len() + 1);
            nodes.push(Node::Comment(doc));
            nodes.extend(lowered);
            return nodes;
        }

        lowered
            .into_iter()
            .map(|node| node.with_doc(doc.clone()))
            .collect()
    }

    /// A doc left over at the end of a body, as a standalone comment
    pub(crate) fn flush(&mut self) -> Option<Node> {
        self.doc.take().map(Node::Comment)
    }
}
