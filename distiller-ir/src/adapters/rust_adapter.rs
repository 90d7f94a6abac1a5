//! Rust Language Adapter
//!
//! Lowers Rust source into the IR using Tree-sitter. Supports `use` trees,
//! `extern crate`, modules, structs, unions, enums, traits, type aliases,
//! consts and statics, and functions.
//!
//! Outer doc comments (`///`, `/** */`) are attached to the item, field or
//! variant that follows them; inner ones (`//!`, `/*! */`) stay in place as
//! comments of the enclosing module.
//!
//! `impl` blocks are collected per item level before lowering and merged
//! into the struct or enum they target. Trait impls add the trait to
//! `implements`. Impl blocks whose target type is not declared at the same
//! level become a `Class` named after the target.

use super::{
    field_text, lower_with_tree_sitter, node_text, node_to_location, LanguageAdapter, PendingDoc,
    TreeSitterAdapter,
};
use crate::error::Result;
use crate::ir::{
    Comment, CommentFormat, Field, File, Function, Import, ImportKind, ImportedSymbol, LanguageId,
    Location, Modifier, Node, Package, Parameter, TypeAlias, TypeDecl, TypeParam, TypeRef,
    Visibility,
};
use std::collections::HashSet;

/// Integer types accepted by `#[repr(..)]` as an enum's underlying type
const REPR_TYPES: &[&str] = &[
    "u8", "u16", "u32", "u64", "u128", "usize", "i8", "i16", "i32", "i64", "i128", "isize",
];

/// Rust language adapter using Tree-sitter
pub struct RustTreeSitterAdapter {
    language: tree_sitter::Language,
}

impl RustTreeSitterAdapter {
    /// Create a new Rust adapter
    pub fn new() -> Self {
        Self {
            language: tree_sitter_rust::LANGUAGE.into(),
        }
    }
}

impl Default for RustTreeSitterAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAdapter for RustTreeSitterAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Rust
    }

    fn lower(&self, source: &[u8], filename: &str) -> Result<File> {
        lower_with_tree_sitter(self, source, filename)
    }
}

impl TreeSitterAdapter for RustTreeSitterAdapter {
    fn tree_sitter_language(&self) -> tree_sitter::Language {
        self.language.clone()
    }

    fn lower_tree(&self, tree: &tree_sitter::Tree, source: &str) -> Vec<Node> {
        self.lower_items(&tree.root_node(), source)
    }
}

/// Members contributed to one type by all of its impl blocks
#[derive(Debug)]
struct ImplGroup {
    target: String,
    location: Location,
    type_params: Vec<TypeParam>,
    implements: Vec<TypeRef>,
    members: Vec<Node>,
}

// ============================================================================
// Free helpers
// ============================================================================

/// Resolve a `visibility_modifier` child; no modifier means private
fn visibility_of(node: &tree_sitter::Node, source: &str) -> Visibility {
    let mut cursor = node.walk();
    let modifier = node
        .children(&mut cursor)
        .find(|child| child.kind() == "visibility_modifier");

    match modifier.map(|m| node_text(&m, source).split_whitespace().collect::<String>()) {
        None => Visibility::Private,
        Some(text) if text == "pub" => Visibility::Public,
        Some(text) if text == "pub(self)" => Visibility::Private,
        // pub(crate), pub(super), pub(in path) and the bare `crate` keyword
        Some(_) => Visibility::Internal,
    }
}

/// Last path segment without generic arguments: `crate::a::Foo<T>` -> `Foo`
fn base_type_name(text: &str) -> &str {
    let without_args = text.split('<').next().unwrap_or(text).trim();
    without_args
        .rsplit("::")
        .next()
        .unwrap_or(without_args)
        .trim_start_matches('&')
        .trim()
}

fn lower_comment(node: &tree_sitter::Node, source: &str) -> Comment {
    let text = node_text(node, source);
    let is_doc = (text.starts_with("///") && !text.starts_with("////"))
        || text.starts_with("//!")
        || (text.starts_with("/**") && !text.starts_with("/**/"))
        || text.starts_with("/*!");
    let format = if is_doc {
        CommentFormat::Doc
    } else if node.kind() == "block_comment" {
        CommentFormat::Block
    } else {
        CommentFormat::Line
    };
    Comment::new(text.trim_end(), format, node_to_location(node))
}

fn is_outer_doc(comment: &Comment) -> bool {
    comment.format == CommentFormat::Doc
        && !comment.text.starts_with("//!")
        && !comment.text.starts_with("/*!")
}

/// Queue an outer doc comment; any other comment comes back as a node
fn collect_comment(node: &tree_sitter::Node, source: &str, pending: &mut PendingDoc) -> Option<Node> {
    let comment = lower_comment(node, source);
    if is_outer_doc(&comment) {
        pending.push(comment);
        None
    } else {
        Some(Node::Comment(comment))
    }
}

fn repr_type(attributes: &[String]) -> Option<TypeRef> {
    attributes.iter().find_map(|attr| {
        let compact: String = attr.split_whitespace().collect();
        let inner = compact.strip_prefix("#[repr(")?.strip_suffix(")]")?;
        inner
            .split(',')
            .find(|part| REPR_TYPES.contains(part))
            .map(TypeRef::new)
    })
}

/// Split a `use` argument into module path and imported symbols
fn lower_use_tree(text: &str) -> (String, Vec<ImportedSymbol>) {
    let text: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let text = text.replace(":: ", "::").replace(" ::", "::");

    if let Some(open) = top_level_group(&text) {
        let module = text[..open].trim_end_matches("::").to_string();
        let inner = &text[open + 1..text.len() - 1];
        let mut symbols = Vec::new();
        flatten_use_group(inner, "", &mut symbols);
        return (module, symbols);
    }

    match text.rsplit_once("::") {
        Some((module, "*")) => (module.to_string(), vec![ImportedSymbol::wildcard()]),
        Some((module, last)) => (module.to_string(), vec![use_symbol(last, "")]),
        None => match text.split_once(" as ") {
            Some((name, alias)) => (
                name.trim().to_string(),
                vec![ImportedSymbol::aliased(name.trim(), alias.trim())],
            ),
            None => (text.to_string(), Vec::new()),
        },
    }
}

/// Index of the `{` opening a trailing group at depth zero
fn top_level_group(text: &str) -> Option<usize> {
    if !text.ends_with('}') {
        return None;
    }
    let open = text.find('{')?;
    if open == 0 || text[..open].ends_with("::") {
        Some(open)
    } else {
        None
    }
}

fn flatten_use_group(inner: &str, prefix: &str, symbols: &mut Vec<ImportedSymbol>) {
    let mut depth = 0i32;
    let mut start = 0;
    let mut entries = Vec::new();
    for (i, c) in inner.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => depth -= 1,
            ',' if depth == 0 => {
                entries.push(inner[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(inner[start..].trim());

    for entry in entries.into_iter().filter(|e| !e.is_empty()) {
        match top_level_group(entry) {
            Some(open) => {
                let nested_prefix = format!("{}{}", prefix, &entry[..open]);
                flatten_use_group(&entry[open + 1..entry.len() - 1], &nested_prefix, symbols);
            }
            None => symbols.push(use_symbol(entry, prefix)),
        }
    }
}

fn use_symbol(entry: &str, prefix: &str) -> ImportedSymbol {
    match entry.split_once(" as ") {
        Some((name, alias)) => ImportedSymbol::aliased(format!("{}{}", prefix, name.trim()), alias.trim()),
        None => ImportedSymbol::new(format!("{}{}", prefix, entry.trim())),
    }
}

// ============================================================================
// Adapter
// ============================================================================

impl RustTreeSitterAdapter {
    /// Lower the items of a source file or inline module body
    fn lower_items(&self, container: &tree_sitter::Node, source: &str) -> Vec<Node> {
        let mut impls = self.collect_impls(container, source);
        let local_types = self.local_type_names(container, source);

        let mut nodes = Vec::new();
        let mut attributes: Vec<String> = Vec::new();
        let mut pending = PendingDoc::default();
        let mut cursor = container.walk();

        for child in container.named_children(&mut cursor) {
            match child.kind() {
                "attribute_item" => {
                    attributes.push(node_text(&child, source).to_string());
                    continue;
                }
                "line_comment" | "block_comment" => {
                    nodes.extend(collect_comment(&child, source, &mut pending));
                    continue;
                }
                _ => {}
            }

            let decorators = std::mem::take(&mut attributes);
            let lowered = match child.kind() {
                "use_declaration" => child.child_by_field_name("argument").map(|argument| {
                    let (module, symbols) = lower_use_tree(node_text(&argument, source));
                    Node::Import(
                        Import::new(module, ImportKind::Plain, node_to_location(&child))
                            .with_symbols(symbols),
                    )
                }),
                "extern_crate_declaration" => field_text(&child, "name", source).map(|name| {
                    let mut import = Import::new(name, ImportKind::Plain, node_to_location(&child));
                    if let Some(alias) = field_text(&child, "alias", source) {
                        import = import.with_symbols(vec![ImportedSymbol::aliased(name, alias)]);
                    }
                    Node::Import(import)
                }),
                "mod_item" => self.lower_mod(&child, source),
                "struct_item" | "union_item" => self
                    .lower_struct(&child, source, decorators)
                    .map(|decl| Node::Struct(merge_impls(decl, &mut impls))),
                "enum_item" => self
                    .lower_enum(&child, source, decorators)
                    .map(|decl| Node::Enum(merge_impls(decl, &mut impls))),
                "trait_item" => self.lower_trait(&child, source, decorators).map(Node::Interface),
                "impl_item" => child
                    .child_by_field_name("type")
                    .map(|t| base_type_name(node_text(&t, source)).to_string())
                    .filter(|target| !local_types.contains(target))
                    .and_then(|target| {
                        let pos = impls.iter().position(|g| g.target == target)?;
                        let group = impls.remove(pos);
                        Some(Node::Class(
                            TypeDecl::new(group.target, Visibility::Public, group.location)
                                .with_type_params(group.type_params)
                                .with_implements(group.implements)
                                .with_children(group.members),
                        ))
                    }),
                "function_item" | "function_signature_item" => self
                    .lower_function(&child, source, decorators, None)
                    .map(Node::Function),
                "type_item" => self.lower_type_alias(&child, source, None).map(Node::TypeAlias),
                "const_item" | "static_item" => self
                    .lower_const(&child, source, decorators, None)
                    .map(Node::Field),
                _ => None,
            };
            nodes.extend(pending.attach(lowered.into_iter().collect()));
        }

        nodes.extend(pending.flush());
        nodes
    }

    fn local_type_names(&self, container: &tree_sitter::Node, source: &str) -> HashSet<String> {
        let mut cursor = container.walk();
        let names = container
            .named_children(&mut cursor)
            .filter(|child| matches!(child.kind(), "struct_item" | "union_item" | "enum_item"))
            .filter_map(|child| field_text(&child, "name", source).map(str::to_string))
            .collect();
        names
    }

    /// First pass: group every impl block at this level by target type
    fn collect_impls(&self, container: &tree_sitter::Node, source: &str) -> Vec<ImplGroup> {
        let mut groups: Vec<ImplGroup> = Vec::new();
        let mut cursor = container.walk();

        for item in container.named_children(&mut cursor) {
            if item.kind() != "impl_item" {
                continue;
            }
            let Some(target_node) = item.child_by_field_name("type") else {
                continue;
            };
            let target = base_type_name(node_text(&target_node, source)).to_string();
            let implemented = item
                .child_by_field_name("trait")
                .map(|t| TypeRef::parse(node_text(&t, source)));

            let members = item
                .child_by_field_name("body")
                .map(|body| self.lower_impl_body(&body, source, implemented.is_some()))
                .unwrap_or_default();

            match groups.iter_mut().find(|g| g.target == target) {
                Some(group) => {
                    group.implements.extend(implemented);
                    group.members.extend(members);
                }
                None => groups.push(ImplGroup {
                    target,
                    location: node_to_location(&item),
                    type_params: self.type_params(&item, source),
                    implements: implemented.into_iter().collect(),
                    members,
                }),
            }
        }

        groups
    }

    fn lower_impl_body(&self, body: &tree_sitter::Node, source: &str, trait_impl: bool) -> Vec<Node> {
        // Trait impl members are as visible as the trait itself
        let forced = trait_impl.then_some(Visibility::Public);
        let mut members = Vec::new();
        let mut attributes = Vec::new();
        let mut pending = PendingDoc::default();
        let mut cursor = body.walk();

        for child in body.named_children(&mut cursor) {
            let lowered = match child.kind() {
                "attribute_item" => {
                    attributes.push(node_text(&child, source).to_string());
                    continue;
                }
                "line_comment" | "block_comment" => {
                    members.extend(collect_comment(&child, source, &mut pending));
                    continue;
                }
                "function_item" => {
                    let decorators = std::mem::take(&mut attributes);
                    self.lower_function(&child, source, decorators, forced)
                        .map(|mut function| {
                            if trait_impl {
                                function.modifiers.insert(Modifier::Override);
                            }
                            Node::Function(function)
                        })
                }
                "const_item" => {
                    let decorators = std::mem::take(&mut attributes);
                    self.lower_const(&child, source, decorators, forced)
                        .map(Node::Field)
                }
                "type_item" => {
                    attributes.clear();
                    self.lower_type_alias(&child, source, forced)
                        .map(Node::TypeAlias)
                }
                _ => {
                    attributes.clear();
                    None
                }
            };
            members.extend(pending.attach(lowered.into_iter().collect()));
        }

        members.extend(pending.flush());
        members
    }

    /// `mod x;` is a namespace import, `mod x { .. }` a package
    fn lower_mod(&self, node: &tree_sitter::Node, source: &str) -> Option<Node> {
        let name = field_text(node, "name", source)?;
        let location = node_to_location(node);
        Some(match node.child_by_field_name("body") {
            Some(body) => {
                Node::Package(Package::new(name, location).with_children(self.lower_items(&body, source)))
            }
            None => Node::Import(Import::new(name, ImportKind::Namespace, location)),
        })
    }

    // ========================================================================
    // Type declarations
    // ========================================================================

    fn lower_struct(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        decorators: Vec<String>,
    ) -> Option<TypeDecl> {
        let name = field_text(node, "name", source)?;
        let mut children = Vec::new();

        if let Some(body) = node.child_by_field_name("body") {
            match body.kind() {
                "field_declaration_list" => children = self.named_fields(&body, source),
                "ordered_field_declaration_list" => children = self.tuple_fields(&body, source),
                _ => {}
            }
        }

        Some(
            TypeDecl::new(name, visibility_of(node, source), node_to_location(node))
                .with_decorators(decorators)
                .with_type_params(self.type_params(node, source))
                .with_children(children),
        )
    }

    fn named_fields(&self, body: &tree_sitter::Node, source: &str) -> Vec<Node> {
        let mut fields = Vec::new();
        let mut attributes = Vec::new();
        let mut pending = PendingDoc::default();
        let mut cursor = body.walk();

        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "attribute_item" => attributes.push(node_text(&child, source).to_string()),
                "line_comment" | "block_comment" => {
                    fields.extend(collect_comment(&child, source, &mut pending))
                }
                "field_declaration" => {
                    let decorators = std::mem::take(&mut attributes);
                    let lowered = field_text(&child, "name", source).map(|name| {
                        let mut field =
                            Field::new(name, visibility_of(&child, source), node_to_location(&child))
                                .with_decorators(decorators);
                        if let Some(ty) = field_text(&child, "type", source) {
                            field = field.with_type(TypeRef::parse(ty));
                        }
                        Node::Field(field)
                    });
                    fields.extend(pending.attach(lowered.into_iter().collect()));
                }
                _ => {}
            }
        }

        fields.extend(pending.flush());
        fields
    }

    /// Tuple struct fields are named by position
    fn tuple_fields(&self, body: &tree_sitter::Node, source: &str) -> Vec<Node> {
        let mut fields = Vec::new();
        let mut visibility = Visibility::Private;
        let mut cursor = body.walk();

        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "visibility_modifier" => {
                    let text: String = node_text(&child, source).split_whitespace().collect();
                    visibility = match text.as_str() {
                        "pub" => Visibility::Public,
                        "pub(self)" => Visibility::Private,
                        _ => Visibility::Internal,
                    };
                }
                "attribute_item" | "line_comment" | "block_comment" => {}
                _ => {
                    let index = fields.len();
                    fields.push(Node::Field(
                        Field::new(index.to_string(), visibility, node_to_location(&child))
                            .with_type(TypeRef::parse(node_text(&child, source))),
                    ));
                    visibility = Visibility::Private;
                }
            }
        }

        fields
    }

    fn lower_enum(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        decorators: Vec<String>,
    ) -> Option<TypeDecl> {
        let name = field_text(node, "name", source)?;
        let mut children = Vec::new();

        if let Some(body) = node.child_by_field_name("body") {
            let mut pending = PendingDoc::default();
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                match child.kind() {
                    "enum_variant" => {
                        let member = field_text(&child, "name", source).map(|variant| {
                            Node::Field(Field::enum_member(variant, name, node_to_location(&child)))
                        });
                        children.extend(pending.attach(member.into_iter().collect()));
                    }
                    "line_comment" | "block_comment" => {
                        children.extend(collect_comment(&child, source, &mut pending))
                    }
                    _ => {}
                }
            }
            children.extend(pending.flush());
        }

        let mut decl = TypeDecl::new(name, visibility_of(node, source), node_to_location(node))
            .with_type_params(self.type_params(node, source))
            .with_children(children);
        decl.underlying = repr_type(&decorators);
        Some(decl.with_decorators(decorators))
    }

    fn lower_trait(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        decorators: Vec<String>,
    ) -> Option<TypeDecl> {
        let name = field_text(node, "name", source)?;

        let mut supertraits = Vec::new();
        if let Some(bounds) = node.child_by_field_name("bounds") {
            let mut cursor = bounds.walk();
            supertraits.extend(
                bounds
                    .named_children(&mut cursor)
                    .map(|b| TypeRef::parse(node_text(&b, source))),
            );
        }

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut attributes = Vec::new();
            let mut pending = PendingDoc::default();
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                let lowered = match child.kind() {
                    "attribute_item" => {
                        attributes.push(node_text(&child, source).to_string());
                        continue;
                    }
                    "line_comment" | "block_comment" => {
                        members.extend(collect_comment(&child, source, &mut pending));
                        continue;
                    }
                    "function_item" | "function_signature_item" => {
                        let decorators = std::mem::take(&mut attributes);
                        self.lower_function(&child, source, decorators, Some(Visibility::Public))
                            .map(|mut function| {
                                if function.implementation.is_none() {
                                    function.modifiers.insert(Modifier::Abstract);
                                }
                                Node::Function(function)
                            })
                    }
                    "const_item" => {
                        let decorators = std::mem::take(&mut attributes);
                        self.lower_const(&child, source, decorators, Some(Visibility::Public))
                            .map(Node::Field)
                    }
                    _ => {
                        attributes.clear();
                        None
                    }
                };
                members.extend(pending.attach(lowered.into_iter().collect()));
            }
            members.extend(pending.flush());
        }

        Some(
            TypeDecl::new(name, visibility_of(node, source), node_to_location(node))
                .with_decorators(decorators)
                .with_type_params(self.type_params(node, source))
                .with_extends(supertraits)
                .with_children(members),
        )
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn lower_function(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        decorators: Vec<String>,
        forced: Option<Visibility>,
    ) -> Option<Function> {
        let name = field_text(node, "name", source)?;
        let visibility = forced.unwrap_or_else(|| visibility_of(node, source));

        let mut modifiers = Vec::new();
        let mut cursor = node.walk();
        if let Some(fn_modifiers) = node
            .children(&mut cursor)
            .find(|c| c.kind() == "function_modifiers")
        {
            let mut inner = fn_modifiers.walk();
            for modifier in fn_modifiers.children(&mut inner) {
                match modifier.kind() {
                    "async" => modifiers.push(Modifier::Async),
                    "const" => modifiers.push(Modifier::Const),
                    "extern_modifier" => modifiers.push(Modifier::Extern),
                    _ => {}
                }
            }
        }

        let mut function = Function::new(name, visibility, node_to_location(node))
            .with_modifiers(modifiers)
            .with_decorators(decorators)
            .with_parameters(self.parameters(node, source));
        function.type_params = self.type_params(node, source);
        if let Some(ret) = field_text(node, "return_type", source) {
            function.return_type = Some(TypeRef::parse(ret));
        }
        if let Some(body) = node.child_by_field_name("body") {
            function.implementation = Some(node_text(&body, source).to_string());
        }

        Some(function)
    }

    fn parameters(&self, node: &tree_sitter::Node, source: &str) -> Vec<Parameter> {
        let Some(params) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "parameter" => {
                    let name = field_text(&param, "pattern", source).unwrap_or("_");
                    let name = name.strip_prefix("mut ").unwrap_or(name).trim();
                    let mut lowered = Parameter::new(name);
                    if let Some(ty) = field_text(&param, "type", source) {
                        lowered.param_type = Some(TypeRef::parse(ty));
                    }
                    result.push(lowered);
                }
                "self_parameter" => {
                    let text = node_text(&param, source);
                    let mut receiver = Parameter::new("self");
                    if text != "self" {
                        receiver.param_type = Some(TypeRef::new(text));
                    }
                    result.push(receiver);
                }
                "variadic_parameter" => {
                    let name = field_text(&param, "pattern", source).unwrap_or("...");
                    result.push(Parameter::new(name).with_variadic(true));
                }
                _ => {}
            }
        }

        result
    }

    fn type_params(&self, node: &tree_sitter::Node, source: &str) -> Vec<TypeParam> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            if matches!(param.kind(), "attribute_item" | "line_comment" | "block_comment") {
                continue;
            }

            let name = ["name", "left"]
                .iter()
                .find_map(|field| field_text(&param, field, source))
                .unwrap_or_else(|| {
                    let text = node_text(&param, source);
                    text.split(':').next().unwrap_or(text)
                })
                .trim();

            let mut type_param = TypeParam::new(name);
            if let Some(bounds) = param.child_by_field_name("bounds") {
                let mut inner = bounds.walk();
                type_param.bounds = bounds
                    .named_children(&mut inner)
                    .map(|b| TypeRef::parse(node_text(&b, source)))
                    .collect();
            }
            if let Some(default) = field_text(&param, "default_type", source) {
                type_param.default = Some(TypeRef::parse(default));
            }
            result.push(type_param);
        }

        result
    }

    fn lower_type_alias(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        forced: Option<Visibility>,
    ) -> Option<TypeAlias> {
        let name = field_text(node, "name", source)?;
        let aliased = TypeRef::parse(field_text(node, "type", source)?);
        let visibility = forced.unwrap_or_else(|| visibility_of(node, source));
        let mut alias = TypeAlias::new(name, visibility, aliased, node_to_location(node));
        alias.type_params = self.type_params(node, source);
        Some(alias)
    }

    /// `const` and `static` items become fields
    fn lower_const(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        decorators: Vec<String>,
        forced: Option<Visibility>,
    ) -> Option<Field> {
        let name = field_text(node, "name", source)?;
        let visibility = forced.unwrap_or_else(|| visibility_of(node, source));
        let modifier = if node.kind() == "static_item" {
            Modifier::Static
        } else {
            Modifier::Const
        };

        let mut field = Field::new(name, visibility, node_to_location(node))
            .with_modifiers([modifier])
            .with_decorators(decorators);
        if let Some(ty) = field_text(node, "type", source) {
            field.field_type = Some(TypeRef::parse(ty));
        }
        if let Some(value) = field_text(node, "value", source) {
            field.default_value = Some(value.to_string());
        }
        Some(field)
    }
}

/// Fold the impl group for `decl` (if any) into its children
fn merge_impls(decl: TypeDecl, impls: &mut Vec<ImplGroup>) -> TypeDecl {
    let Some(pos) = impls.iter().position(|g| g.target == decl.name) else {
        return decl;
    };
    let group = impls.remove(pos);

    let mut children = decl.children().to_vec();
    children.extend(group.members);
    let mut implements = decl.implements.clone();
    implements.extend(group.implements);
    decl.with_implements(implements).with_children(children)
}
