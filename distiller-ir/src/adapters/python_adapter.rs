//! Python Language Adapter
//!
//! Lowers Python source into the IR using Tree-sitter. Supports imports,
//! classes, functions (def/async def), decorators, docstrings, and
//! module-, class- and instance-level attributes.
//!
//! Visibility follows naming conventions: `__dunder__` is public, any other
//! name with a leading underscore (`_x`, `__x`) is private, everything else is
//! public.
//!
//! Function and class docstrings are attached to their declaration; the
//! function body text keeps its docstring. A module docstring stays a
//! standalone doc comment of the file.

use super::{
    field_text, find_child_by_kind, lower_with_tree_sitter, node_text, node_to_location,
    LanguageAdapter, TreeSitterAdapter,
};
use crate::error::Result;
use crate::ir::{
    Comment, CommentFormat, Field, File, Function, Import, ImportKind, ImportedSymbol, LanguageId,
    Modifier, Node, Parameter, TypeDecl, TypeParam, TypeRef, Visibility,
};

/// Python language adapter using Tree-sitter
pub struct PythonTreeSitterAdapter {
    language: tree_sitter::Language,
}

impl PythonTreeSitterAdapter {
    /// Create a new Python adapter
    pub fn new() -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
        }
    }
}

impl Default for PythonTreeSitterAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageAdapter for PythonTreeSitterAdapter {
    fn language(&self) -> LanguageId {
        LanguageId::Python
    }

    fn lower(&self, source: &[u8], filename: &str) -> Result<File> {
        lower_with_tree_sitter(self, source, filename)
    }
}

impl TreeSitterAdapter for PythonTreeSitterAdapter {
    fn tree_sitter_language(&self) -> tree_sitter::Language {
        self.language.clone()
    }

    fn lower_tree(&self, tree: &tree_sitter::Tree, source: &str) -> Vec<Node> {
        let (_, nodes) = self.lower_block(&tree.root_node(), source, Scope::Module);
        nodes
    }
}

/// Where a statement list lives; methods drop their receiver parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Class,
}

/// Visibility by naming convention
fn visibility_for(name: &str) -> Visibility {
    let dunder = name.len() > 4 && name.starts_with("__") && name.ends_with("__");
    if name.starts_with('_') && !dunder {
        Visibility::Private
    } else {
        Visibility::Public
    }
}

/// Index of the first statement that is not a comment
fn first_statement(block: &tree_sitter::Node) -> Option<usize> {
    let mut cursor = block.walk();
    let index = block
        .named_children(&mut cursor)
        .position(|child| child.kind() != "comment");
    index
}

impl PythonTreeSitterAdapter {
    /// Lower the statements of a module or class body
    ///
    /// A class docstring is returned apart from the statements; a module
    /// docstring stays in place as a doc comment.
    fn lower_block(
        &self,
        block: &tree_sitter::Node,
        source: &str,
        scope: Scope,
    ) -> (Option<Comment>, Vec<Node>) {
        let mut nodes = Vec::new();
        let mut docstring = None;
        let first = first_statement(block);
        let mut cursor = block.walk();

        for (index, child) in block.named_children(&mut cursor).enumerate() {
            match child.kind() {
                "import_statement" => nodes.extend(self.lower_import(&child, source)),
                "import_from_statement" | "future_import_statement" => {
                    nodes.push(self.lower_import_from(&child, source))
                }
                "class_definition" => {
                    if let Some(class) = self.lower_class(&child, source, Vec::new()) {
                        nodes.push(class);
                    }
                }
                "function_definition" => {
                    nodes.extend(self.lower_function(&child, source, Vec::new(), scope))
                }
                "decorated_definition" => nodes.extend(self.lower_decorated(&child, source, scope)),
                "expression_statement" => {
                    if Some(index) == first {
                        if let Some(doc) = self.docstring(&child, source) {
                            match scope {
                                Scope::Module => nodes.push(Node::Comment(doc)),
                                Scope::Class => docstring = Some(doc),
                            }
                            continue;
                        }
                    }
                    nodes.extend(self.lower_assignment(&child, source));
                }
                "comment" => nodes.push(Node::Comment(Comment::new(
                    node_text(&child, source),
                    CommentFormat::Line,
                    node_to_location(&child),
                ))),
                _ => {}
            }
        }

        (docstring, nodes)
    }

    // ========================================================================
    // Imports
    // ========================================================================

    /// `import a, b as c` yields one Import per module
    fn lower_import(&self, node: &tree_sitter::Node, source: &str) -> Vec<Node> {
        let location = node_to_location(node);
        let mut imports = Vec::new();
        let mut cursor = node.walk();

        for name in node.children_by_field_name("name", &mut cursor) {
            let import = match name.kind() {
                "aliased_import" => {
                    let module = field_text(&name, "name", source).unwrap_or_default();
                    let mut import = Import::new(module, ImportKind::Plain, location);
                    if let Some(alias) = field_text(&name, "alias", source) {
                        import = import.with_symbols(vec![ImportedSymbol::aliased(module, alias)]);
                    }
                    import
                }
                _ => Import::new(node_text(&name, source), ImportKind::Plain, location),
            };
            imports.push(Node::Import(import));
        }

        imports
    }

    /// `from x import a, b as c` / `from x import *` / `from __future__ import y`
    fn lower_import_from(&self, node: &tree_sitter::Node, source: &str) -> Node {
        let module = if node.kind() == "future_import_statement" {
            "__future__"
        } else {
            field_text(node, "module_name", source).unwrap_or(".")
        };

        let mut symbols = Vec::new();
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            match name.kind() {
                "aliased_import" => {
                    let symbol = field_text(&name, "name", source).unwrap_or_default();
                    match field_text(&name, "alias", source) {
                        Some(alias) => symbols.push(ImportedSymbol::aliased(symbol, alias)),
                        None => symbols.push(ImportedSymbol::new(symbol)),
                    }
                }
                _ => symbols.push(ImportedSymbol::new(node_text(&name, source))),
            }
        }
        if find_child_by_kind(node, "wildcard_import").is_some() {
            symbols.push(ImportedSymbol::wildcard());
        }

        Node::Import(
            Import::new(module, ImportKind::Plain, node_to_location(node)).with_symbols(symbols),
        )
    }

    // ========================================================================
    // Classes and Functions
    // ========================================================================

    fn lower_decorated(&self, node: &tree_sitter::Node, source: &str, scope: Scope) -> Option<Node> {
        let mut cursor = node.walk();
        let decorators: Vec<String> = node
            .children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .map(|child| node_text(&child, source).to_string())
            .collect();

        let definition = node.child_by_field_name("definition")?;
        match definition.kind() {
            "class_definition" => self.lower_class(&definition, source, decorators),
            "function_definition" => self.lower_function(&definition, source, decorators, scope),
            _ => None,
        }
    }

    fn lower_class(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        decorators: Vec<String>,
    ) -> Option<Node> {
        let name = field_text(node, "name", source)?;
        let mut modifiers = Vec::new();
        if decorators.iter().any(|d| decorator_name(d) == "dataclass") {
            modifiers.push(Modifier::Data);
        }

        // Every positional base goes to `extends`; Python does not separate
        // base classes from interfaces syntactically.
        let mut extends = Vec::new();
        let mut is_abstract = false;
        if let Some(bases) = node.child_by_field_name("superclasses") {
            let mut cursor = bases.walk();
            for base in bases.named_children(&mut cursor) {
                match base.kind() {
                    "keyword_argument" => {
                        if field_text(&base, "value", source)
                            .is_some_and(|v| v == "ABCMeta" || v.ends_with(".ABCMeta"))
                        {
                            is_abstract = true;
                        }
                    }
                    "comment" => {}
                    _ => {
                        let text = node_text(&base, source);
                        if text == "ABC" || text == "abc.ABC" {
                            is_abstract = true;
                        }
                        extends.push(TypeRef::parse(text));
                    }
                }
            }
        }
        if is_abstract {
            modifiers.push(Modifier::Abstract);
        }

        let mut children = Vec::new();
        let mut docstring = None;
        if let Some(body) = node.child_by_field_name("body") {
            (docstring, children) = self.lower_block(&body, source, Scope::Class);
            children.extend(self.instance_fields(&body, source, &children));
        }

        let mut class = TypeDecl::new(name, visibility_for(name), node_to_location(node))
            .with_modifiers(modifiers)
            .with_decorators(decorators)
            .with_type_params(self.type_params(node, source))
            .with_extends(extends)
            .with_children(children);
        class.doc = docstring;
        Some(Node::Class(class))
    }

    fn lower_function(
        &self,
        node: &tree_sitter::Node,
        source: &str,
        decorators: Vec<String>,
        scope: Scope,
    ) -> Option<Node> {
        let name = field_text(node, "name", source)?;

        let mut modifiers = Vec::new();
        if node.child(0).is_some_and(|first| first.kind() == "async") {
            modifiers.push(Modifier::Async);
        }
        for decorator in &decorators {
            match decorator_name(decorator) {
                "staticmethod" => modifiers.push(Modifier::Static),
                "abstractmethod" => modifiers.push(Modifier::Abstract),
                "override" => modifiers.push(Modifier::Override),
                "final" => modifiers.push(Modifier::Final),
                _ => {}
            }
        }

        let mut function = Function::new(name, visibility_for(name), node_to_location(node))
            .with_modifiers(modifiers)
            .with_decorators(decorators)
            .with_parameters(self.parameters(node, source, scope));
        function.type_params = self.type_params(node, source);
        if let Some(ret) = node.child_by_field_name("return_type") {
            function.return_type = Some(python_type(node_text(&ret, source)));
        }

        if let Some(body) = node.child_by_field_name("body") {
            function.doc = first_statement(&body)
                .and_then(|index| body.named_child(index))
                .filter(|first| first.kind() == "expression_statement")
                .and_then(|first| self.docstring(&first, source));
            function.implementation = Some(node_text(&body, source).to_string());
        }

        Some(Node::Function(function))
    }

    fn parameters(&self, node: &tree_sitter::Node, source: &str, scope: Scope) -> Vec<Parameter> {
        let Some(params) = node.child_by_field_name("parameters") else {
            return Vec::new();
        };

        let mut result = Vec::new();
        let mut cursor = params.walk();
        for (index, param) in params.named_children(&mut cursor).enumerate() {
            let lowered = match param.kind() {
                "identifier" => Some(Parameter::new(node_text(&param, source))),
                "typed_parameter" => {
                    let inner = param.named_child(0);
                    let mut lowered = inner.map(|n| self.splat_or_plain(&n, source));
                    if let (Some(p), Some(ty)) = (lowered.as_mut(), param.child_by_field_name("type")) {
                        p.param_type = Some(python_type(node_text(&ty, source)));
                    }
                    lowered
                }
                "default_parameter" | "typed_default_parameter" => {
                    field_text(&param, "name", source).map(|name| {
                        let mut p = Parameter::new(name);
                        if let Some(ty) = param.child_by_field_name("type") {
                            p.param_type = Some(python_type(node_text(&ty, source)));
                        }
                        match field_text(&param, "value", source) {
                            Some(value) => p.with_default(value),
                            None => p,
                        }
                    })
                }
                "list_splat_pattern" | "dictionary_splat_pattern" => {
                    Some(self.splat_or_plain(&param, source))
                }
                _ => None,
            };

            let Some(lowered) = lowered else { continue };
            // Receiver parameters are implied by the enclosing class
            if scope == Scope::Class
                && index == 0
                && (lowered.name == "self" || lowered.name == "cls")
            {
                continue;
            }
            result.push(lowered);
        }

        result
    }

    fn splat_or_plain(&self, node: &tree_sitter::Node, source: &str) -> Parameter {
        match node.kind() {
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                let name = node
                    .named_child(0)
                    .map(|n| node_text(&n, source))
                    .unwrap_or_else(|| node_text(node, source).trim_start_matches('*'));
                Parameter::new(name).with_variadic(true)
            }
            _ => Parameter::new(node_text(node, source)),
        }
    }

    /// PEP 695 type parameters (`def f[T](...)`, `class C[T]:`)
    fn type_params(&self, node: &tree_sitter::Node, source: &str) -> Vec<TypeParam> {
        let Some(params) = node.child_by_field_name("type_parameters") else {
            return Vec::new();
        };
        let mut cursor = params.walk();
        let found = params
            .named_children(&mut cursor)
            .map(|param| {
                let text = node_text(&param, source);
                match text.split_once(':') {
                    Some((name, bound)) => TypeParam {
                        name: name.trim().to_string(),
                        bounds: vec![TypeRef::parse(bound)],
                        default: None,
                    },
                    None => TypeParam::new(text.trim()),
                }
            })
            .collect();
        found
    }

    // ========================================================================
    // Attributes and Docstrings
    // ========================================================================

    /// `name = value` / `name: T = value` at module or class level
    fn lower_assignment(&self, statement: &tree_sitter::Node, source: &str) -> Option<Node> {
        let assignment = statement.named_child(0).filter(|n| n.kind() == "assignment")?;
        let left = assignment.child_by_field_name("left")?;
        if left.kind() != "identifier" {
            return None;
        }
        let name = node_text(&left, source);

        let mut field = Field::new(name, visibility_for(name), node_to_location(statement));
        if let Some(ty) = assignment.child_by_field_name("type") {
            field.field_type = Some(python_type(node_text(&ty, source)));
        }
        if let Some(value) = assignment.child_by_field_name("right") {
            field.default_value = Some(node_text(&value, source).to_string());
        }
        if name.len() > 1 && name.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_') {
            field.modifiers.insert(Modifier::Const);
        }
        Some(Node::Field(field))
    }

    /// `self.x = ...` statements at the top level of `__init__`
    fn instance_fields(&self, body: &tree_sitter::Node, source: &str, known: &[Node]) -> Vec<Node> {
        let mut seen: Vec<String> = known
            .iter()
            .filter(|n| matches!(n, Node::Field(_)))
            .filter_map(|n| n.name().map(str::to_string))
            .collect();

        let mut cursor = body.walk();
        let Some(init_body) = body
            .named_children(&mut cursor)
            .filter_map(|child| match child.kind() {
                "decorated_definition" => child.child_by_field_name("definition"),
                _ => Some(child),
            })
            .find(|def| {
                def.kind() == "function_definition"
                    && field_text(def, "name", source) == Some("__init__")
            })
            .and_then(|init| init.child_by_field_name("body"))
        else {
            return Vec::new();
        };

        let mut fields = Vec::new();
        let mut cursor = init_body.walk();
        for statement in init_body.named_children(&mut cursor) {
            let Some(assignment) = statement
                .named_child(0)
                .filter(|n| statement.kind() == "expression_statement" && n.kind() == "assignment")
            else {
                continue;
            };
            let Some(left) = assignment.child_by_field_name("left") else {
                continue;
            };
            let Some(name) = node_text(&left, source).strip_prefix("self.") else {
                continue;
            };
            if name.contains('.') || seen.iter().any(|s| s == name) {
                continue;
            }
            seen.push(name.to_string());

            let mut field = Field::new(name, visibility_for(name), node_to_location(&statement));
            if let Some(ty) = assignment.child_by_field_name("type") {
                field.field_type = Some(python_type(node_text(&ty, source)));
            }
            if let Some(value) = assignment.child_by_field_name("right") {
                field.default_value = Some(node_text(&value, source).to_string());
            }
            fields.push(Node::Field(field));
        }

        fields
    }

    /// A string expression statement lowered to a doc comment
    fn docstring(&self, statement: &tree_sitter::Node, source: &str) -> Option<Comment> {
        let string = statement.named_child(0).filter(|n| n.kind() == "string")?;
        if statement.named_child_count() != 1 {
            return None;
        }
        Some(Comment::new(
            clean_docstring(node_text(&string, source)),
            CommentFormat::Doc,
            node_to_location(statement),
        ))
    }
}

/// Name of a decorator without `@`, arguments or module path
fn decorator_name(decorator: &str) -> &str {
    let text = decorator.trim_start_matches('@').trim();
    let text = text.split('(').next().unwrap_or(text);
    text.rsplit('.').next().unwrap_or(text).trim()
}

/// Parse a Python annotation; `Optional[T]` and `T | None` become nullable `T`
fn python_type(text: &str) -> TypeRef {
    let text = text.trim();

    let parts: Vec<&str> = split_union(text);
    if parts.len() > 1 && parts.iter().any(|p| *p == "None") {
        let rest: Vec<&str> = parts.into_iter().filter(|p| *p != "None").collect();
        let inner = if rest.len() == 1 {
            python_type(rest[0])
        } else {
            TypeRef::parse(&rest.join(" | "))
        };
        return inner.with_nullable(true);
    }

    let parsed = TypeRef::parse(text);
    if (parsed.name == "Optional" || parsed.name == "typing.Optional") && parsed.args.len() == 1 {
        let mut inner = parsed.args.into_iter().next().unwrap_or_else(|| TypeRef::new("Any"));
        inner.nullable = true;
        return inner;
    }
    parsed
}

fn split_union(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            '|' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

/// Strip quotes and common indentation from a docstring literal
fn clean_docstring(text: &str) -> String {
    let text = text.trim_start_matches(|c: char| matches!(c, 'r' | 'R' | 'u' | 'U' | 'b' | 'B'));
    let text = ["\"\"\"", "'''", "\"", "'"]
        .iter()
        .find_map(|quote| {
            text.strip_prefix(quote)
                .and_then(|t| t.strip_suffix(quote))
        })
        .unwrap_or(text);

    let lines: Vec<&str> = text.lines().collect();
    let min_indent = lines
        .iter()
        .skip(1)
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let cleaned: Vec<&str> = lines
        .iter()
        .enumerate()
        .map(|(i, l)| {
            if i == 0 {
                l.trim()
            } else {
                l.get(min_indent..).unwrap_or_else(|| l.trim_start())
            }
        })
        .collect();

    cleaned.join("\n").trim().to_string()
}
