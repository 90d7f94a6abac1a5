//! Java Language Adapter
//!
//! Lowers Java source into the IR using Tree-sitter. Supports the package
//! declaration, imports, classes, interfaces, enums, records, annotation
//! types, methods, constructors and fields.
//!
//! Defaults applied here: members without an access modifier are
//! package-private, except inside interfaces and annotation types where they
//! are public. Interface constants are `static final`, bodyless interface
//! methods are `abstract`, and enum constructors are private.
//!
//! A Javadoc block is attached to the declaration that follows it.

use super::{
    field_text, find_child_by_kind, lower_with_tree_sitter, node_text, node_to_location,
    LanguageAdapter, PendingDoc, TreeSitterAdapter,
};
use crate::error::Result;
use crate::ir::{
    Comment, CommentFormat, Field, File, Function, Import, ImportKind, ImportedSymbol, LanguageId,
    Modifier, Node, Package, Parameter, TypeDecl, TypeParam, TypeRef, Visibility,
};

/// Java language adapter using Tree-sitter
pub struct JavaTreeSitterAdapter {
    language: tree_sitter::Language,
}

impl JavaTreeSitterAdapter {
    /// Create a new Java adapter
    pub fn new() -> Self {
        Self {
            language: tree_sitter_java::LANGUAGE.into(),
        }
    }
}

impl Default for JavaTreeSitterAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAdapter for JavaTreeSitterAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Java
    }

    fn lower(&self, source: &[u8], filename: &str) -> Result<File> {
        lower_with_tree_sitter(self, source, filename)
    }
}

impl TreeSitterAdapter for JavaTreeSitterAdapter {
    fn tree_sitter_language(&self) -> tree_sitter::Language {
        self.language.clone()
    }

    fn lower_tree(&self, tree: &tree_sitter::Tree, source: &str) -> Vec<Node> {
        let root = tree.root_node();
        let mut cursor = root.walk();
        let nodes = self.lower_members(root.named_children(&mut cursor), source, Owner::TopLevel);
        nodes
    }
}

/// The declaration a member belongs to; drives default visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Owner {
    TopLevel,
    Class,
    Interface,
    Enum,
}

impl Owner {
    fn default_visibility(self) -> Visibility {
        match self {
            Owner::Interface => Visibility::Public,
            Owner::TopLevel | Owner::Class | Owner::Enum => Visibility::PackagePrivate,
        }
    }
}

/// Access modifier, modifier keywords and annotations of a declaration
#[derive(Debug, Default)]
struct DeclModifiers {
    visibility: Option<Visibility>,
    keywords: Vec<Modifier>,
    annotations: Vec<String>,
    is_default: bool,
}

impl DeclModifiers {
    fn read(node: &tree_sitter::Node, source: &str) -> Self {
        let mut result = Self::default();
        let Some(modifiers) = find_child_by_kind(node, "modifiers") else {
            return result;
        };

        let mut cursor = modifiers.walk();
        for child in modifiers.children(&mut cursor) {
            match child.kind() {
                "public" => result.visibility = Some(Visibility::Public),
                "private" => result.visibility = Some(Visibility::Private),
                "protected" => result.visibility = Some(Visibility::Protected),
                "static" => result.keywords.push(Modifier::Static),
                "final" => result.keywords.push(Modifier::Final),
                "abstract" => result.keywords.push(Modifier::Abstract),
                "sealed" => result.keywords.push(Modifier::Sealed),
                "transient" => result.keywords.push(Modifier::Transient),
                "volatile" => result.keywords.push(Modifier::Volatile),
                "native" => result.keywords.push(Modifier::Extern),
                "default" => result.is_default = true,
                "marker_annotation" | "annotation" => {
                    result.annotations.push(node_text(&child, source).to_string())
                }
                _ => {}
            }
        }

        result
    }

    fn has(&self, modifier: Modifier) -> bool {
        self.keywords.contains(&modifier)
    }
}

fn lower_import(node: &tree_sitter::Node, source: &str) -> Node {
    let text = node_text(node, source)
        .trim_start_matches("import")
        .trim_end_matches(';')
        .trim();
    let (kind, path) = match text.strip_prefix("static") {
        Some(rest) if rest.starts_with(char::is_whitespace) => (ImportKind::Static, rest.trim()),
        _ => (ImportKind::Plain, text),
    };
    let path: String = path.split_whitespace().collect();

    let (module, symbol) = match path.rsplit_once('.') {
        Some((module, symbol)) => (module.to_string(), symbol.to_string()),
        None => (path.clone(), String::new()),
    };
    let symbols = match symbol.as_str() {
        "" => Vec::new(),
        "*" => vec![ImportedSymbol::wildcard()],
        name => vec![ImportedSymbol::new(name)],
    };

    Node::Import(Import::new(module, kind, node_to_location(node)).with_symbols(symbols))
}

fn lower_comment(node: &tree_sitter::Node, source: &str) -> Comment {
    let text = node_text(node, source);
    let format = if node.kind() == "line_comment" {
        CommentFormat::Line
    } else if text.starts_with("/**") && text != "/**/" {
        CommentFormat::Doc
    } else {
        CommentFormat::Block
    };
    Comment::new(text, format, node_to_location(node))
}

/// Queue a Javadoc block; any other comment comes back as a node
fn collect_comment(node: &tree_sitter::Node, source: &str, pending: &mut PendingDoc) -> Option<Node> {
    let comment = lower_comment(node, source);
    match comment.format {
        CommentFormat::Doc => {
            pending.push(comment);
            None
        }
        CommentFormat::Line | CommentFormat::Block => Some(Node::Comment(comment)),
    }
}

/// Java type spelling to `TypeRef`; `void` means no type
fn java_type(text: &str) -> Option<TypeRef> {
    let text = text.trim();
    (text != "void").then(|| TypeRef::parse(text))
}

/// Apply trailing `[]` dimensions written after a name (`int x[]`)
fn with_dimensions(ty: TypeRef, dimensions: Option<&str>) -> TypeRef {
    let depth = dimensions.map_or(0, |d| d.matches('[').count());
    (0..depth).fold(ty, |ty, _| TypeRef::array(ty))
}

fn type_list(node: &tree_sitter::Node, source: &str) -> Vec<TypeRef> {
    let Some(list) = find_child_by_kind(node, "type_list") else {
        return Vec::new();
    };
    let mut cursor = list.walk();
    let types = list
        .named_children(&mut cursor)
        .map(|t| TypeRef::parse(node_text(&t, source)))
        .collect();
    types
}

impl JavaTreeSitterAdapter {
    /// Lower a run of sibling members, giving each Javadoc to the next declaration
    fn lower_members<'t>(
        &self,
        members: impl Iterator<Item = tree_sitter::Node<'t>>,
        source: &str,
        owner: Owner,
    ) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut pending = PendingDoc::default();

        for member in members {
            if matches!(member.kind(), "line_comment" | "block_comment") {
                nodes.extend(collect_comment(&member, source, &mut pending));
                continue;
            }
            nodes.extend(pending.attach(self.lower_member(&member, source, owner)));
        }

        nodes.extend(pending.flush());
        nodes
    }

    /// Lower one member of a program or type body
    fn lower_member(&self, node: &tree_sitter::Node, source: &str, owner: Owner) -> Vec<Node> {
        match node.kind() {
            "package_declaration" => {
                let name = node_text(node, source)
                    .trim_start_matches("package")
                    .trim_end_matches(';')
                    .trim();
                vec![Node::Package(Package::new(name, node_to_location(node)))]
            }
            "import_declaration" => vec![lower_import(node, source)],
            "class_declaration" => self.lower_class(node, source, owner).into_iter().collect(),
            "interface_declaration" | "annotation_type_declaration" => {
                self.lower_interface(node, source, owner).into_iter().collect()
            }
            "enum_declaration" => self.lower_enum(node, source, owner).into_iter().collect(),
            "record_declaration" => self.lower_record(node, source, owner).into_iter().collect(),
            "method_declaration" | "annotation_type_element_declaration" => {
                self.lower_method(node, source, owner).into_iter().collect()
            }
            "constructor_declaration" | "compact_constructor_declaration" => {
                self.lower_constructor(node, source, owner).into_iter().collect()
            }
            "field_declaration" | "constant_declaration" => self.lower_fields(node, source, owner),
            _ => Vec::new(),
        }
    }

    fn lower_body(&self, body: Option<tree_sitter::Node>, source: &str, owner: Owner) -> Vec<Node> {
        let Some(body) = body else {
            return Vec::new();
        };
        let mut cursor = body.walk();
        let members = self.lower_members(body.named_children(&mut cursor), source, owner);
        members
    }

    /// Common header of every type declaration
    fn type_header(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        owner: Owner,
    ) -> Option<TypeDecl> {
        let name = field_text(node, "name", source)?;
        let modifiers = DeclModifiers::read(node, source);
        let visibility = modifiers.visibility.unwrap_or(owner.default_visibility());

        let mut keywords = modifiers.keywords;
        if owner == Owner::Interface {
            // Member types of interfaces are implicitly static
            keywords.push(Modifier::Static);
        }

        Some(
            TypeDecl::new(name, visibility, node_to_location(node))
                .with_modifiers(keywords)
                .with_decorators(modifiers.annotations)
                .with_type_params(self.type_params(node, source)),
        )
    }

    fn lower_class(&self, node: &tree_sitter::Node, source: &str, owner: Owner) -> Option<Node> {
        let decl = self.type_header(node, source, owner)?;

        let extends = node
            .child_by_field_name("superclass")
            .and_then(|s| s.named_child(0))
            .map(|t| vec![TypeRef::parse(node_text(&t, source))])
            .unwrap_or_default();
        let implements = node
            .child_by_field_name("interfaces")
            .map(|i| type_list(&i, source))
            .unwrap_or_default();
        let members = self.lower_body(node.child_by_field_name("body"), source, Owner::Class);

        Some(Node::Class(
            decl.with_extends(extends)
                .with_implements(implements)
                .with_children(members),
        ))
    }

    fn lower_interface(&self, node: &tree_sitter::Node, source: &str, owner: Owner) -> Option<Node> {
        let decl = self.type_header(node, source, owner)?;
        let extends = find_child_by_kind(node, "extends_interfaces")
            .map(|e| type_list(&e, source))
            .unwrap_or_default();
        let members = self.lower_body(node.child_by_field_name("body"), source, Owner::Interface);

        Some(Node::Interface(decl.with_extends(extends).with_children(members)))
    }

    fn lower_enum(&self, node: &tree_sitter::Node, source: &str, owner: Owner) -> Option<Node> {
        let decl = self.type_header(node, source, owner)?;
        let implements = node
            .child_by_field_name("interfaces")
            .map(|i| type_list(&i, source))
            .unwrap_or_default();

        let mut members = Vec::new();
        if let Some(body) = node.child_by_field_name("body") {
            let mut pending = PendingDoc::default();
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                match child.kind() {
                    "enum_constant" => {
                        let constant = field_text(&child, "name", source).map(|name| {
                            Node::Field(Field::enum_member(
                                name,
                                decl.name.as_str(),
                                node_to_location(&child),
                            ))
                        });
                        members.extend(pending.attach(constant.into_iter().collect()));
                    }
                    "line_comment" | "block_comment" => {
                        members.extend(collect_comment(&child, source, &mut pending))
                    }
                    "enum_body_declarations" => {
                        members.extend(pending.flush());
                        let mut inner = child.walk();
                        members.extend(self.lower_members(
                            child.named_children(&mut inner),
                            source,
                            Owner::Enum,
                        ));
                    }
                    _ => members.extend(pending.attach(self.lower_member(&child, source, Owner::Enum))),
                }
            }
            members.extend(pending.flush());
        }

        Some(Node::Enum(decl.with_implements(implements).with_children(members)))
    }

    /// Records are data classes whose components are public final fields
    fn lower_record(&self, node: &tree_sitter::Node, source: &str, owner: Owner) -> Option<Node> {
        let decl = self.type_header(node, source, owner)?;
        let implements = node
            .child_by_field_name("interfaces")
            .map(|i| type_list(&i, source))
            .unwrap_or_default();

        let mut members = Vec::new();
        if let Some(params) = node.child_by_field_name("parameters") {
            let mut cursor = params.walk();
            for component in params.named_children(&mut cursor) {
                if component.kind() != "formal_parameter" {
                    continue;
                }
                let Some(name) = field_text(&component, "name", source) else {
                    continue;
                };
                let mut field = Field::new(name, Visibility::Public, node_to_location(&component))
                    .with_modifiers([Modifier::Final])
                    .with_decorators(DeclModifiers::read(&component, source).annotations);
                field.field_type = field_text(&component, "type", source).and_then(java_type);
                members.push(Node::Field(field));
            }
        }
        members.extend(self.lower_body(node.child_by_field_name("body"), source, Owner::Class));

        Some(Node::Class(
            decl.with_modifiers([Modifier::Data, Modifier::Final])
                .with_implements(implements)
                .with_children(members),
        ))
    }

    // ========================================================================
    // Members
    // ========================================================================

    fn lower_method(&self, node: &tree_sitter::Node, source: &str, owner: Owner) -> Option<Node> {
        let name = field_text(node, "name", source)?;
        let modifiers = DeclModifiers::read(node, source);
        let visibility = modifiers.visibility.unwrap_or(owner.default_visibility());
        let body = node.child_by_field_name("body");

        let mut keywords = modifiers.keywords.clone();
        if owner == Owner::Interface
            && body.is_none()
            && !modifiers.has(Modifier::Static)
            && !modifiers.is_default
        {
            keywords.push(Modifier::Abstract);
        }

        let mut function = Function::new(name, visibility, node_to_location(node))
            .with_modifiers(keywords)
            .with_decorators(modifiers.annotations)
            .with_parameters(self.parameters(node, source));
        function.type_params = self.type_params(node, source);
        function.return_type = field_text(node, "type", source)
            .and_then(java_type)
            .map(|ty| with_dimensions(ty, field_text(node, "dimensions", source)));
        function.throws = self.throws(node, source);
        function.implementation = body.map(|b| node_text(&b, source).to_string());

        Some(Node::Function(function))
    }

    /// Constructors are functions named after their class, without a return type
    fn lower_constructor(&self, node: &tree_sitter::Node, source: &str, owner: Owner) -> Option<Node> {
        let name = field_text(node, "name", source)?;
        let modifiers = DeclModifiers::read(node, source);
        let visibility = modifiers.visibility.unwrap_or(match owner {
            Owner::Enum => Visibility::Private,
            _ => owner.default_visibility(),
        });

        let mut function = Function::new(name, visibility, node_to_location(node))
            .with_modifiers(modifiers.keywords)
            .with_decorators(modifiers.annotations)
            .with_parameters(self.parameters(node, source));
        function.type_params = self.type_params(node, source);
        function.throws = self.throws(node, source);
        function.implementation = node
            .child_by_field_name("body")
            .map(|b| node_text(&b, source).to_string());

        Some(Node::Function(function))
    }

    /// One field per declarator: `int a = 1, b;` yields `a` and `b`
    fn lower_fields(&self, node: &tree_sitter::Node, source: &str, owner: Owner) -> Vec<Node> {
        let modifiers = DeclModifiers::read(node, source);
        let visibility = modifiers.visibility.unwrap_or(owner.default_visibility());
        let mut keywords = modifiers.keywords.clone();
        if owner == Owner::Interface {
            keywords.extend([Modifier::Static, Modifier::Final]);
        }
        let base_type = field_text(node, "type", source).and_then(java_type);

        let mut fields = Vec::new();
        let mut cursor = node.walk();
        for declarator in node.children_by_field_name("declarator", &mut cursor) {
            let Some(name) = field_text(&declarator, "name", source) else {
                continue;
            };
            let mut field = Field::new(name, visibility, node_to_location(node))
                .with_modifiers(keywords.iter().copied())
                .with_decorators(modifiers.annotations.clone());
            field.field_type = base_type
                .clone()
                .map(|ty| with_dimensions(ty, field_text(&declarator, "dimensions", source)));
            field.default_value = field_text(&declarator, "value", source).map(str::to_string);
            fields.push(Node::Field(field));
        }

        fields
    }

    fn parameters(&self, node: &tree_sitter::Node, source: &str) -> Vec<Parameter> {
        let Some(params) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "formal_parameter" => {
                    let Some(name) = field_text(&param, "name", source) else {
                        continue;
                    };
                    let mut lowered = Parameter::new(name);
                    lowered.param_type = field_text(&param, "type", source)
                        .and_then(java_type)
                        .map(|ty| with_dimensions(ty, field_text(&param, "dimensions", source)));
                    result.push(lowered);
                }
                "spread_parameter" => {
                    let name = find_child_by_kind(&param, "variable_declarator")
                        .and_then(|d| field_text(&d, "name", source))
                        .unwrap_or("args");
                    let mut cursor = param.walk();
                    let element = param
                        .named_children(&mut cursor)
                        .find(|c| !matches!(c.kind(), "modifiers" | "variable_declarator"))
                        .and_then(|t| java_type(node_text(&t, source)));
                    let mut lowered = Parameter::new(name).with_variadic(true);
                    lowered.param_type = element.map(TypeRef::array);
                    result.push(lowered);
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
            if param.kind() != "type_parameter" {
                continue;
            }
            let Some(name) = find_child_by_kind(&param, "type_identifier") else {
                continue;
            };
            let mut type_param = TypeParam::new(node_text(&name, source));
            if let Some(bound) = find_child_by_kind(&param, "type_bound") {
                let mut inner = bound.walk();
                type_param.bounds = bound
                    .named_children(&mut inner)
                    .map(|b| TypeRef::parse(node_text(&b, source)))
                    .collect();
            }
            result.push(type_param);
        }

        result
    }

    fn throws(&self, node: &tree_sitter::Node, source: &str) -> Vec<TypeRef> {
        let Some(throws) = find_child_by_kind(node, "throws") else {
            return Vec::new();
        };
        let mut cursor = throws.walk();
        let types = throws
            .named_children(&mut cursor)
            .map(|t| TypeRef::parse(node_text(&t, source)))
            .collect();
        types
    }
}
