//! Stripper: option-driven distillation of an IR tree
//!
//! A single pass that decides keep/drop top-down and rebuilds kept nodes with
//! filtered children. Dropping a node discards its whole subtree. The input
//! tree is only borrowed, so one parse can be stripped under several option
//! sets.
//!
//! Keep/drop order for a node: kind gate (imports, fields, methods), then the
//! visibility gate, then the comment-format gate. Containers that end up with
//! no children are still kept. Implementation text, field initializers and
//! (when annotations are off) decorators are cleared after child filtering.
//!
//! A declaration's attached doc travels with it: it is gone when the
//! declaration is dropped, and cleared when docstrings are off.

use crate::ir::{
    Comment, CommentFormat, Field, File, Function, Node, TypeAlias, TypeDecl, Visibility,
};
use crate::options::StripOptions;

/// Holds an option set and applies it to trees
#[derive(Debug, Clone, Copy, Default)]
pub struct Stripper {
    options: StripOptions,
}

impl Stripper {
    pub fn new(options: StripOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &StripOptions {
        &self.options
    }

    /// Produce a new, filtered tree
    pub fn strip(&self, file: &File) -> File {
        file.rebuilt_with(self.strip_children(file.children()))
    }

    /// Strip a single node; `None` when the node is dropped
    pub fn strip_node(&self, node: &Node) -> Option<Node> {
        if !self.keeps(node) {
            return None;
        }

        let stripped = match node {
            Node::File(f) => Node::File(f.rebuilt_with(self.strip_children(f.children()))),
            Node::Package(p) => Node::Package(p.rebuilt_with(self.strip_children(p.children()))),
            Node::Class(d) => Node::Class(self.strip_decl(d)),
            Node::Interface(d) => Node::Interface(self.strip_decl(d)),
            Node::Struct(d) => Node::Struct(self.strip_decl(d)),
            Node::Enum(d) => {
                debug_assert!(
                    d.children().iter().all(|child| match child {
                        Node::Field(f) => !f.enum_member || f.is_normalized_enum_member(),
                        _ => true,
                    }),
                    "enum '{}' has a member that is not public static const",
                    d.name
                );
                Node::Enum(self.strip_decl(d))
            }
            Node::Function(f) => Node::Function(self.strip_function(f)),
            Node::Field(f) => Node::Field(self.strip_field(f)),
            Node::TypeAlias(t) => Node::TypeAlias(self.strip_alias(t)),
            Node::Import(_) | Node::Comment(_) | Node::Error(_) => node.clone(),
        };

        Some(stripped)
    }

    fn strip_children(&self, children: &[Node]) -> Vec<Node> {
        children
            .iter()
            .filter_map(|child| self.strip_node(child))
            .collect()
    }

    fn strip_decl(&self, decl: &TypeDecl) -> TypeDecl {
        let mut rebuilt = decl.rebuilt_with(self.strip_children(decl.children()));
        if !self.options.include_annotations {
            rebuilt.decorators.clear();
        }
        self.strip_doc(&mut rebuilt.doc);
        rebuilt
    }

    fn strip_function(&self, function: &Function) -> Function {
        let mut rebuilt = function.clone();
        if !self.options.include_implementation {
            rebuilt.implementation = None;
        }
        if !self.options.include_annotations {
            rebuilt.decorators.clear();
        }
        self.strip_doc(&mut rebuilt.doc);
        rebuilt
    }

    fn strip_field(&self, field: &Field) -> Field {
        let mut rebuilt = field.clone();
        if !self.options.include_implementation {
            rebuilt.default_value = None;
        }
        if !self.options.include_annotations {
            rebuilt.decorators.clear();
        }
        self.strip_doc(&mut rebuilt.doc);
        rebuilt
    }

    fn strip_alias(&self, alias: &TypeAlias) -> TypeAlias {
        let mut rebuilt = alias.clone();
        self.strip_doc(&mut rebuilt.doc);
        rebuilt
    }

    fn strip_doc(&self, doc: &mut Option<Comment>) {
        if doc.as_ref().is_some_and(|d| !self.keeps_comment(d)) {
            *doc = None;
        }
    }

    /// Keep/drop decision for one node, ignoring its children
    fn keeps(&self, node: &Node) -> bool {
        let options = &self.options;
        match node {
            Node::File(_) | Node::Package(_) | Node::Error(_) => true,
            Node::Import(_) => options.include_imports,
            Node::Class(d) | Node::Interface(d) | Node::Struct(d) | Node::Enum(d) => {
                self.visible(d.visibility)
            }
            Node::TypeAlias(t) => self.visible(t.visibility),
            Node::Function(f) => options.include_methods && self.visible(f.visibility),
            Node::Field(f) => options.include_fields && self.visible(f.visibility),
            Node::Comment(c) => self.keeps_comment(c),
        }
    }

    fn visible(&self, visibility: Visibility) -> bool {
        match visibility {
            Visibility::Public => true,
            Visibility::Private => self.options.include_private,
            Visibility::Protected => self.options.include_protected,
            Visibility::Internal | Visibility::PackagePrivate => self.options.include_internal,
        }
    }

    fn keeps_comment(&self, comment: &Comment) -> bool {
        match comment.format {
            CommentFormat::Doc => self.options.include_docstrings,
            CommentFormat::Line | CommentFormat::Block => self.options.include_comments,
        }
    }
}

/// Strip `file` under `options`
pub fn strip(file: &File, options: &StripOptions) -> File {
    Stripper::new(*options).strip(file)
}
