//! Core IR (Intermediate Representation) Types
//!
//! This module defines the language-agnostic tree that every lowering adapter
//! produces and the stripper consumes. All types are designed for:
//!
//! 1. **Closed kinds**: `Node` is a sum type; every traversal matches it exhaustively
//! 2. **Determinism**: modifiers live in a `BTreeSet`, children keep source order
//! 3. **Serialization**: full serde support, nodes tagged by `kind`
//! 4. **Frozen children**: children are set through consuming builders and read
//!    through `children()`; there is no mutable handle on a built node

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

// ============================================================================
// Language Identification
// ============================================================================

/// Language identifier for source files
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LanguageId {
    Rust,
    Python,
    Java,
    TypeScript,
    JavaScript,
    Go,
    C,
    Cpp,
    CSharp,
    Kotlin,
    Swift,
    Php,
    Ruby,
    Unknown,
}

impl LanguageId {
    /// Detect language from file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "rs" => Self::Rust,
            "py" | "pyw" | "pyi" => Self::Python,
            "java" => Self::Java,
            "ts" | "tsx" | "mts" | "cts" => Self::TypeScript,
            "js" | "jsx" | "mjs" | "cjs" => Self::JavaScript,
            "go" => Self::Go,
            "c" | "h" => Self::C,
            "cpp" | "cc" | "cxx" | "hpp" | "hxx" | "hh" => Self::Cpp,
            "cs" => Self::CSharp,
            "kt" | "kts" => Self::Kotlin,
            "swift" => Self::Swift,
            "php" | "phtml" => Self::Php,
            "rb" | "rake" | "gemspec" => Self::Ruby,
            _ => Self::Unknown,
        }
    }

    /// Detect language from a file name or path
    pub fn from_path(path: &str) -> Self {
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    /// Get canonical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Rust => "rs",
            Self::Python => "py",
            Self::Java => "java",
            Self::TypeScript => "ts",
            Self::JavaScript => "js",
            Self::Go => "go",
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::CSharp => "cs",
            Self::Kotlin => "kt",
            Self::Swift => "swift",
            Self::Php => "php",
            Self::Ruby => "rb",
            Self::Unknown => "",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::Python => "Python",
            Self::Java => "Java",
            Self::TypeScript => "TypeScript",
            Self::JavaScript => "JavaScript",
            Self::Go => "Go",
            Self::C => "C",
            Self::Cpp => "C++",
            Self::CSharp => "C#",
            Self::Kotlin => "Kotlin",
            Self::Swift => "Swift",
            Self::Php => "PHP",
            Self::Ruby => "Ruby",
            Self::Unknown => "Unknown",
        }
    }
}

// ============================================================================
// Location
// ============================================================================

/// A contiguous region in source code
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Location {
    /// Start line (1-indexed)
    pub start_line: usize,

    /// Start column (0-indexed, in bytes)
    pub start_column: usize,

    /// End line (1-indexed)
    pub end_line: usize,

    /// End column (0-indexed, in bytes)
    pub end_column: usize,

    /// Start byte offset (inclusive)
    pub start_byte: usize,

    /// End byte offset (exclusive)
    pub end_byte: usize,
}

impl Location {
    /// Create a new location from byte offsets and lines
    pub fn new(start_byte: usize, end_byte: usize, start_line: usize, end_line: usize) -> Self {
        Self {
            start_line,
            start_column: 0,
            end_line,
            end_column: 0,
            start_byte,
            end_byte,
        }
    }

    /// Set the start and end columns
    pub fn with_columns(mut self, start_column: usize, end_column: usize) -> Self {
        self.start_column = start_column;
        self.end_column = end_column;
        self
    }

    /// Check if this location contains a byte offset
    pub fn contains(&self, offset: usize) -> bool {
        offset >= self.start_byte && offset < self.end_byte
    }

    /// Check if this location contains a line number
    pub fn contains_line(&self, line: usize) -> bool {
        line >= self.start_line && line <= self.end_line
    }

    /// Get the length in bytes
    pub fn len(&self) -> usize {
        self.end_byte.saturating_sub(self.start_byte)
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.start_byte >= self.end_byte
    }
}

// ============================================================================
// Visibility and Modifiers
// ============================================================================

/// Resolved accessibility of a declaration
///
/// Adapters apply their language's defaults before a node is built, so there
/// is deliberately no "unknown" variant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Visibility {
    Public,
    Private,
    Protected,
    Internal,
    PackagePrivate,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Protected => "protected",
            Self::Internal => "internal",
            Self::PackagePrivate => "package-private",
        }
    }
}

/// Declaration modifier drawn from the shared vocabulary
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Static,
    Abstract,
    Final,
    Sealed,
    Virtual,
    Override,
    Async,
    Readonly,
    Const,
    Volatile,
    Transient,
    Extern,
    Partial,
    /// Record / data-class semantics
    Data,
}

impl Modifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Abstract => "abstract",
            Self::Final => "final",
            Self::Sealed => "sealed",
            Self::Virtual => "virtual",
            Self::Override => "override",
            Self::Async => "async",
            Self::Readonly => "readonly",
            Self::Const => "const",
            Self::Volatile => "volatile",
            Self::Transient => "transient",
            Self::Extern => "extern",
            Self::Partial => "partial",
            Self::Data => "data",
        }
    }
}

/// Modifier set (order carries no meaning)
pub type Modifiers = BTreeSet<Modifier>;

// ============================================================================
// Types
// ============================================================================

/// Reference to a type, possibly generic and/or nullable
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TypeRef {
    pub name: String,

    /// Generic type arguments, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<TypeRef>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

/// Name used for array types; the element type is the single argument
pub const ARRAY_TYPE_NAME: &str = "[]";

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            nullable: false,
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
            nullable: false,
        }
    }

    /// Array of `element`
    pub fn array(element: TypeRef) -> Self {
        Self::generic(ARRAY_TYPE_NAME, vec![element])
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn is_array(&self) -> bool {
        self.name == ARRAY_TYPE_NAME && self.args.len() == 1
    }

    /// Parse a type spelling into a `TypeRef`.
    ///
    /// Understands `Name<A, B>`, `Name[A, B]`, a trailing `?` and a trailing
    /// `[]`. Anything else (references, tuples, function types) is kept
    /// verbatim as the name.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();

        if let Some(inner) = text.strip_suffix('?') {
            if !inner.trim().is_empty() {
                return Self::parse(inner).with_nullable(true);
            }
        }

        if let Some(inner) = text.strip_suffix("[]") {
            if !inner.trim().is_empty() && brackets_balanced(inner) {
                return Self::array(Self::parse(inner));
            }
        }

        if let Some(open) = text.find(['<', '[']) {
            let head = text[..open].trim();
            if is_simple_path(head) && closing_index(text, open) == Some(text.len() - 1) {
                let inner = &text[open + 1..text.len() - 1];
                let args = split_top_level(inner)
                    .into_iter()
                    .filter(|arg| !arg.is_empty())
                    .map(Self::parse)
                    .collect();
                return Self::generic(head, args);
            }
        }

        Self::new(text)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array() {
            write!(f, "{}[]", self.args[0])?;
        } else {
            write!(f, "{}", self.name)?;
            if !self.args.is_empty() {
                let args: Vec<String> = self.args.iter().map(|a| a.to_string()).collect();
                write!(f, "<{}>", args.join(", "))?;
            }
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

fn is_simple_path(head: &str) -> bool {
    !head.is_empty()
        && head
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | ':' | '$'))
}

fn brackets_balanced(text: &str) -> bool {
    let mut depth: i32 = 0;
    for c in text.chars() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0
}

/// Byte index of the bracket closing the one at `open`
fn closing_index(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices().skip_while(|(i, _)| *i < open) {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match c {
            '<' | '[' | '(' => depth += 1,
            '>' | ']' | ')' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());
    parts
}

/// A generic type parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<TypeRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<TypeRef>,
}

impl TypeParam {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bounds: Vec::new(),
            default: None,
        }
    }
}

/// A function/method parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,

    /// Declared type (absent in dynamically typed sources)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<TypeRef>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub variadic: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            param_type: None,
            default_value: None,
            optional: false,
            variadic: false,
        }
    }

    pub fn typed(name: impl Into<String>, param_type: TypeRef) -> Self {
        Self {
            param_type: Some(param_type),
            ..Self::new(name)
        }
    }

    /// Attach a default value; a defaulted parameter is optional
    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self.optional = true;
        self
    }

    pub fn with_variadic(mut self, variadic: bool) -> Self {
        self.variadic = variadic;
        self
    }
}

// ============================================================================
// Imports, Comments, Errors (leaf payloads)
// ============================================================================

/// Kind of import statement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImportKind {
    /// import x / from x import y / use x::y
    #[default]
    Plain,
    /// import static x.Y.z
    Static,
    /// global using X
    Global,
    /// using namespace / mod x;
    Namespace,
}

/// A symbol brought in by an import (`*` for wildcards)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportedSymbol {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ImportedSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
        }
    }

    pub fn aliased(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: Some(alias.into()),
        }
    }

    pub fn wildcard() -> Self {
        Self::new("*")
    }

    pub fn is_wildcard(&self) -> bool {
        self.name == "*"
    }
}

/// Format of a comment
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CommentFormat {
    /// Single-line comment (// or #)
    Line,
    /// Multi-line block comment (/* */)
    Block,
    /// Documentation comment (/// or /** */ or a docstring)
    Doc,
}

/// Severity of a recoverable lowering problem
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

// ============================================================================
// Node Kinds
// ============================================================================

/// Fieldless mirror of the `Node` variants
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    File,
    Package,
    Import,
    Class,
    Interface,
    Struct,
    Enum,
    Function,
    Field,
    TypeAlias,
    Comment,
    Error,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Package => "package",
            Self::Import => "import",
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Struct => "struct",
            Self::Enum => "enum",
            Self::Function => "function",
            Self::Field => "field",
            Self::TypeAlias => "type_alias",
            Self::Comment => "comment",
            Self::Error => "error",
        }
    }

    /// Kinds that own other declarations
    pub fn is_container(&self) -> bool {
        match self {
            Self::File | Self::Package | Self::Class | Self::Interface | Self::Struct | Self::Enum => {
                true
            }
            Self::Import
            | Self::Function
            | Self::Field
            | Self::TypeAlias
            | Self::Comment
            | Self::Error => false,
        }
    }

    /// Kinds that carry a resolved `Visibility`
    pub fn has_visibility(&self) -> bool {
        match self {
            Self::Class
            | Self::Interface
            | Self::Struct
            | Self::Enum
            | Self::Function
            | Self::Field
            | Self::TypeAlias => true,
            Self::File | Self::Package | Self::Import | Self::Comment | Self::Error => false,
        }
    }

    /// Kinds that can own a leading doc comment
    pub fn accepts_doc(&self) -> bool {
        match self {
            Self::Class
            | Self::Interface
            | Self::Struct
            | Self::Enum
            | Self::Function
            | Self::Field
            | Self::TypeAlias => true,
            Self::File | Self::Package | Self::Import | Self::Comment | Self::Error => false,
        }
    }
}

// ============================================================================
// Node
// ============================================================================

/// A node of the IR tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    File(File),
    Package(Package),
    Import(Import),
    Class(TypeDecl),
    Interface(TypeDecl),
    Struct(TypeDecl),
    Enum(TypeDecl),
    Function(Function),
    Field(Field),
    TypeAlias(TypeAlias),
    Comment(Comment),
    Error(ErrorNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Package(_) => NodeKind::Package,
            Node::Import(_) => NodeKind::Import,
            Node::Class(_) => NodeKind::Class,
            Node::Interface(_) => NodeKind::Interface,
            Node::Struct(_) => NodeKind::Struct,
            Node::Enum(_) => NodeKind::Enum,
            Node::Function(_) => NodeKind::Function,
            Node::Field(_) => NodeKind::Field,
            Node::TypeAlias(_) => NodeKind::TypeAlias,
            Node::Comment(_) => NodeKind::Comment,
            Node::Error(_) => NodeKind::Error,
        }
    }

    /// Owned children in source order (empty for leaf kinds)
    pub fn children(&self) -> &[Node] {
        match self {
            Node::File(f) => &f.children,
            Node::Package(p) => &p.children,
            Node::Class(d) | Node::Interface(d) | Node::Struct(d) | Node::Enum(d) => &d.children,
            Node::Import(_)
            | Node::Function(_)
            | Node::Field(_)
            | Node::TypeAlias(_)
            | Node::Comment(_)
            | Node::Error(_) => &[],
        }
    }

    pub fn location(&self) -> Location {
        match self {
            Node::File(f) => f.location,
            Node::Package(p) => p.location,
            Node::Import(i) => i.location,
            Node::Class(d) | Node::Interface(d) | Node::Struct(d) | Node::Enum(d) => d.location,
            Node::Function(f) => f.location,
            Node::Field(f) => f.location,
            Node::TypeAlias(t) => t.location,
            Node::Comment(c) => c.location,
            Node::Error(e) => e.location,
        }
    }

    /// Declared name, for kinds that have one
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::File(f) => Some(&f.path),
            Node::Package(p) => Some(&p.name),
            Node::Import(i) => Some(&i.module),
            Node::Class(d) | Node::Interface(d) | Node::Struct(d) | Node::Enum(d) => Some(&d.name),
            Node::Function(f) => Some(&f.name),
            Node::Field(f) => Some(&f.name),
            Node::TypeAlias(t) => Some(&t.name),
            Node::Comment(_) | Node::Error(_) => None,
        }
    }

    /// Resolved visibility, for kinds that carry one
    pub fn visibility(&self) -> Option<Visibility> {
        match self {
            Node::Class(d) | Node::Interface(d) | Node::Struct(d) | Node::Enum(d) => {
                Some(d.visibility)
            }
            Node::Function(f) => Some(f.visibility),
            Node::Field(f) => Some(f.visibility),
            Node::TypeAlias(t) => Some(t.visibility),
            Node::File(_) | Node::Package(_) | Node::Import(_) | Node::Comment(_) | Node::Error(_) => {
                None
            }
        }
    }

    pub fn is_container(&self) -> bool {
        self.kind().is_container()
    }

    /// Shared payload of Class/Interface/Struct/Enum
    pub fn as_type_decl(&self) -> Option<&TypeDecl> {
        match self {
            Node::Class(d) | Node::Interface(d) | Node::Struct(d) | Node::Enum(d) => Some(d),
            _ => None,
        }
    }

    /// Documentation attached to a declaration
    pub fn doc(&self) -> Option<&Comment> {
        match self {
            Node::Class(d) | Node::Interface(d) | Node::Struct(d) | Node::Enum(d) => {
                d.doc.as_ref()
            }
            Node::Function(f) => f.doc.as_ref(),
            Node::Field(f) => f.doc.as_ref(),
            Node::TypeAlias(t) => t.doc.as_ref(),
            Node::File(_) | Node::Package(_) | Node::Import(_) | Node::Comment(_) | Node::Error(_) => {
                None
            }
        }
    }

    /// Attach `doc` to a declaration; other kinds come back unchanged
    pub fn with_doc(self, doc: Comment) -> Node {
        match self {
            Node::Class(d) => Node::Class(d.with_doc(doc)),
            Node::Interface(d) => Node::Interface(d.with_doc(doc)),
            Node::Struct(d) => Node::Struct(d.with_doc(doc)),
            Node::Enum(d) => Node::Enum(d.with_doc(doc)),
            Node::Function(f) => Node::Function(f.with_doc(doc)),
            Node::Field(f) => Node::Field(f.with_doc(doc)),
            Node::TypeAlias(t) => Node::TypeAlias(t.with_doc(doc)),
            other @ (Node::File(_)
            | Node::Package(_)
            | Node::Import(_)
            | Node::Comment(_)
            | Node::Error(_)) => other,
        }
    }
}

/// Pre-order traversal over a slice of nodes and everything below them
pub struct Walk<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Walk<'a> {
    fn new(roots: &'a [Node]) -> Self {
        Self {
            stack: roots.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

// ============================================================================
// File and Package
// ============================================================================

/// Root of a lowered source file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct File {
    /// Path the source was read from
    pub path: String,

    /// Detected language identifier
    pub language: LanguageId,

    /// Byte range of the entire file
    pub location: Location,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl File {
    /// Create a new empty file
    pub fn new(path: impl Into<String>, language: LanguageId) -> Self {
        Self {
            path: path.into(),
            language,
            location: Location::default(),
            children: Vec::new(),
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Pre-order iterator over every node in the file
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(&self.children)
    }

    /// Total number of nodes below the root
    pub fn count_nodes(&self) -> usize {
        self.walk().count()
    }

    /// All recoverable lowering problems, wherever they were attached
    pub fn errors(&self) -> impl Iterator<Item = &ErrorNode> {
        self.walk().filter_map(|node| match node {
            Node::Error(e) => Some(e),
            _ => None,
        })
    }

    /// Check if the adapter reported any problems
    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    pub(crate) fn rebuilt_with(&self, children: Vec<Node>) -> Self {
        Self {
            path: self.path.clone(),
            language: self.language,
            location: self.location,
            children,
        }
    }
}

/// Package / module / namespace declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub name: String,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl Package {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self {
            name: name.into(),
            location,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn rebuilt_with(&self, children: Vec<Node>) -> Self {
        Self {
            name: self.name.clone(),
            location: self.location,
            children,
        }
    }
}

// ============================================================================
// Import
// ============================================================================

/// Import, require, include, or using statement
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Import {
    /// Module or path being imported
    pub module: String,

    #[serde(rename = "import_kind", default)]
    pub kind: ImportKind,

    /// Specific symbols imported, in order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<ImportedSymbol>,

    pub location: Location,
}

impl Import {
    pub fn new(module: impl Into<String>, kind: ImportKind, location: Location) -> Self {
        Self {
            module: module.into(),
            kind,
            symbols: Vec::new(),
            location,
        }
    }

    pub fn with_symbols(mut self, symbols: Vec<ImportedSymbol>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.symbols.iter().any(ImportedSymbol::is_wildcard)
    }
}

// ============================================================================
// Type Declarations (Class / Interface / Struct / Enum)
// ============================================================================

/// Payload shared by the four type-declaration kinds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeDecl {
    pub name: String,
    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: Modifiers,

    /// Annotations / attributes as source text
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<TypeRef>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<TypeRef>,

    /// Underlying representation (enums only, e.g. `enum E : byte`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underlying: Option<TypeRef>,

    /// Leading documentation (doc comment or docstring)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Comment>,

    pub location: Location,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node>,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, visibility: Visibility, location: Location) -> Self {
        Self {
            name: name.into(),
            visibility,
            modifiers: Modifiers::new(),
            decorators: Vec::new(),
            type_params: Vec::new(),
            extends: Vec::new(),
            implements: Vec::new(),
            underlying: None,
            doc: None,
            location,
            children: Vec::new(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn with_decorators(mut self, decorators: Vec<String>) -> Self {
        self.decorators = decorators;
        self
    }

    pub fn with_type_params(mut self, type_params: Vec<TypeParam>) -> Self {
        self.type_params = type_params;
        self
    }

    pub fn with_extends(mut self, extends: Vec<TypeRef>) -> Self {
        self.extends = extends;
        self
    }

    pub fn with_implements(mut self, implements: Vec<TypeRef>) -> Self {
        self.implements = implements;
        self
    }

    pub fn with_doc(mut self, doc: Comment) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub(crate) fn rebuilt_with(&self, children: Vec<Node>) -> Self {
        Self {
            name: self.name.clone(),
            visibility: self.visibility,
            modifiers: self.modifiers.clone(),
            decorators: self.decorators.clone(),
            type_params: self.type_params.clone(),
            extends: self.extends.clone(),
            implements: self.implements.clone(),
            underlying: self.underlying.clone(),
            doc: self.doc.clone(),
            location: self.location,
            children,
        }
    }
}

// ============================================================================
// Members
// ============================================================================

/// Function or method declaration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Function {
    pub name: String,
    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: Modifiers,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,

    #[serde(default)]
    pub parameters: Vec<Parameter>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,

    /// Declared / thrown exception types
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub throws: Vec<TypeRef>,

    /// Raw source text of the body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub implementation: Option<String>,

    /// Leading documentation (doc comment or docstring)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Comment>,

    pub location: Location,
}

impl Function {
    pub fn new(name: impl Into<String>, visibility: Visibility, location: Location) -> Self {
        Self {
            name: name.into(),
            visibility,
            modifiers: Modifiers::new(),
            decorators: Vec::new(),
            type_params: Vec::new(),
            parameters: Vec::new(),
            return_type: None,
            throws: Vec::new(),
            implementation: None,
            doc: None,
            location,
        }
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn with_decorators(mut self, decorators: Vec<String>) -> Self {
        self.decorators = decorators;
        self
    }

    pub fn with_parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_return_type(mut self, return_type: TypeRef) -> Self {
        self.return_type = Some(return_type);
        self
    }

    pub fn with_implementation(mut self, body: impl Into<String>) -> Self {
        self.implementation = Some(body.into());
        self
    }

    pub fn with_doc(mut self, doc: Comment) -> Self {
        self.doc = Some(doc);
        self
    }
}

/// Field, property, constant, or enum member
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    pub name: String,
    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub modifiers: Modifiers,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<TypeRef>,

    /// Initializer as source text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,

    /// Enum constant, as opposed to an ordinary field declared in an enum body
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub enum_member: bool,

    /// Leading documentation (doc comment or docstring)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Comment>,

    pub location: Location,
}

impl Field {
    pub fn new(name: impl Into<String>, visibility: Visibility, location: Location) -> Self {
        Self {
            name: name.into(),
            visibility,
            modifiers: Modifiers::new(),
            decorators: Vec::new(),
            field_type: None,
            default_value: None,
            enum_member: false,
            doc: None,
            location,
        }
    }

    /// Enum constant: always public, static and const, typed as its enum
    pub fn enum_member(
        name: impl Into<String>,
        enum_name: impl Into<String>,
        location: Location,
    ) -> Self {
        let mut member = Self::new(name, Visibility::Public, location)
            .with_modifiers([Modifier::Static, Modifier::Const])
            .with_type(TypeRef::new(enum_name));
        member.enum_member = true;
        member
    }

    pub fn with_modifiers(mut self, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        self.modifiers.extend(modifiers);
        self
    }

    pub fn with_decorators(mut self, decorators: Vec<String>) -> Self {
        self.decorators = decorators;
        self
    }

    pub fn with_type(mut self, field_type: TypeRef) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_doc(mut self, doc: Comment) -> Self {
        self.doc = Some(doc);
        self
    }

    /// Whether this field satisfies the enum-member normalization
    pub fn is_normalized_enum_member(&self) -> bool {
        self.visibility == Visibility::Public
            && self.modifiers.contains(&Modifier::Static)
            && self.modifiers.contains(&Modifier::Const)
    }
}

/// Type alias (`type X = Y`, `typedef`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TypeAlias {
    pub name: String,
    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_params: Vec<TypeParam>,

    pub aliased: TypeRef,

    /// Leading documentation (doc comment or docstring)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<Comment>,

    pub location: Location,
}

impl TypeAlias {
    pub fn new(
        name: impl Into<String>,
        visibility: Visibility,
        aliased: TypeRef,
        location: Location,
    ) -> Self {
        Self {
            name: name.into(),
            visibility,
            type_params: Vec::new(),
            aliased,
            doc: None,
            location,
        }
    }

    pub fn with_doc(mut self, doc: Comment) -> Self {
        self.doc = Some(doc);
        self
    }
}

/// A comment in source code
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    /// The comment text (delimiters included, as written)
    pub text: String,
    pub format: CommentFormat,
    pub location: Location,
}

impl Comment {
    pub fn new(text: impl Into<String>, format: CommentFormat, location: Location) -> Self {
        Self {
            text: text.into(),
            format,
            location,
        }
    }
}

/// Placeholder for a region the adapter could not lower
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorNode {
    pub message: String,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub location: Location,
}

impl ErrorNode {
    pub fn new(message: impl Into<String>, severity: Severity, location: Location) -> Self {
        Self {
            message: message.into(),
            severity,
            code: None,
            location,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(line: usize) -> Location {
        Location::new(line * 10, line * 10 + 5, line, line)
    }

    // =========================================================================
    // LanguageId Tests
    // =========================================================================

    #[test]
    fn test_language_from_extension() {
        assert_eq!(LanguageId::from_extension("rs"), LanguageId::Rust);
        assert_eq!(LanguageId::from_extension("py"), LanguageId::Python);
        assert_eq!(LanguageId::from_extension("pyi"), LanguageId::Python);
        assert_eq!(LanguageId::from_extension("java"), LanguageId::Java);
        assert_eq!(LanguageId::from_extension("cs"), LanguageId::CSharp);
        assert_eq!(LanguageId::from_extension("xyz"), LanguageId::Unknown);
        assert_eq!(LanguageId::from_extension(""), LanguageId::Unknown);
    }

    #[test]
    fn test_language_from_extension_case_insensitive() {
        assert_eq!(LanguageId::from_extension("RS"), LanguageId::Rust);
        assert_eq!(LanguageId::from_extension("Py"), LanguageId::Python);
        assert_eq!(LanguageId::from_extension("JAVA"), LanguageId::Java);
    }

    #[test]
    fn test_language_from_path() {
        assert_eq!(LanguageId::from_path("src/lib.rs"), LanguageId::Rust);
        assert_eq!(LanguageId::from_path("pkg/Main.java"), LanguageId::Java);
        assert_eq!(LanguageId::from_path("Makefile"), LanguageId::Unknown);
        assert_eq!(LanguageId::from_path(""), LanguageId::Unknown);
    }

    #[test]
    fn test_language_name_and_extension() {
        assert_eq!(LanguageId::Cpp.name(), "C++");
        assert_eq!(LanguageId::CSharp.name(), "C#");
        assert_eq!(LanguageId::Python.extension(), "py");
        assert_eq!(LanguageId::Unknown.extension(), "");
    }

    #[test]
    fn test_language_id_serialization() {
        let json = serde_json::to_string(&LanguageId::Java).unwrap();
        assert_eq!(json, "\"java\"");
        let back: LanguageId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, LanguageId::Java);
    }

    // =========================================================================
    // Location Tests
    // =========================================================================

    #[test]
    fn test_location_contains() {
        let location = Location::new(10, 20, 1, 2);
        assert!(location.contains(10));
        assert!(location.contains(15));
        assert!(!location.contains(20)); // exclusive end
        assert!(!location.contains(5));
    }

    #[test]
    fn test_location_contains_line() {
        let location = Location::new(0, 100, 5, 15);
        assert!(!location.contains_line(4));
        assert!(location.contains_line(5));
        assert!(location.contains_line(15));
        assert!(!location.contains_line(16));
    }

    #[test]
    fn test_location_len_and_empty() {
        assert_eq!(Location::new(10, 50, 1, 5).len(), 40);
        assert!(Location::new(10, 10, 1, 1).is_empty());

        let inverted = Location {
            start_byte: 50,
            end_byte: 10,
            ..Default::default()
        };
        assert_eq!(inverted.len(), 0);
        assert!(inverted.is_empty());
    }

    #[test]
    fn test_location_with_columns() {
        let location = Location::new(0, 8, 1, 1).with_columns(4, 12);
        assert_eq!(location.start_column, 4);
        assert_eq!(location.end_column, 12);
    }

    // =========================================================================
    // Visibility / Modifier Tests
    // =========================================================================

    #[test]
    fn test_visibility_serialization() {
        let json = serde_json::to_string(&Visibility::PackagePrivate).unwrap();
        assert_eq!(json, "\"package-private\"");
        assert_eq!(Visibility::PackagePrivate.as_str(), "package-private");
        assert_eq!(serde_json::to_string(&Visibility::Public).unwrap(), "\"public\"");
    }

    #[test]
    fn test_modifiers_are_a_set() {
        let field = Field::new("x", Visibility::Public, loc(1))
            .with_modifiers([Modifier::Static, Modifier::Const, Modifier::Static]);
        assert_eq!(field.modifiers.len(), 2);

        let names: Vec<&str> = field.modifiers.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, vec!["static", "const"]);
    }

    // =========================================================================
    // TypeRef Tests
    // =========================================================================

    #[test]
    fn test_type_ref_parse_plain() {
        let ty = TypeRef::parse("String");
        assert_eq!(ty, TypeRef::new("String"));
    }

    #[test]
    fn test_type_ref_parse_generic_nested() {
        let ty = TypeRef::parse("Map<String, List<Integer>>");
        assert_eq!(ty.name, "Map");
        assert_eq!(ty.args.len(), 2);
        assert_eq!(ty.args[0].name, "String");
        assert_eq!(ty.args[1].name, "List");
        assert_eq!(ty.args[1].args[0].name, "Integer");
        assert_eq!(ty.to_string(), "Map<String, List<Integer>>");
    }

    #[test]
    fn test_type_ref_parse_square_brackets() {
        let ty = TypeRef::parse("dict[str, Any]");
        assert_eq!(ty.name, "dict");
        assert_eq!(ty.args, vec![TypeRef::new("str"), TypeRef::new("Any")]);
    }

    #[test]
    fn test_type_ref_parse_nullable_and_array() {
        let ty = TypeRef::parse("String?");
        assert!(ty.nullable);
        assert_eq!(ty.name, "String");

        let ty = TypeRef::parse("int[]");
        assert!(ty.is_array());
        assert_eq!(ty.args[0].name, "int");
        assert_eq!(ty.to_string(), "int[]");

        let ty = TypeRef::parse("List<String>[]");
        assert!(ty.is_array());
        assert_eq!(ty.args[0].args[0].name, "String");
    }

    #[test]
    fn test_type_ref_parse_keeps_unusual_spellings() {
        assert_eq!(TypeRef::parse("&str").name, "&str");
        assert_eq!(TypeRef::parse("[u8; 4]").name, "[u8; 4]");
        assert_eq!(TypeRef::parse("(i32, i32)").name, "(i32, i32)");
        assert_eq!(TypeRef::parse("impl Iterator<Item = u8>").name, "impl Iterator<Item = u8>");
    }

    #[test]
    fn test_type_ref_parse_qualified() {
        let ty = TypeRef::parse("std::collections::HashMap<K, V>");
        assert_eq!(ty.name, "std::collections::HashMap");
        assert_eq!(ty.args.len(), 2);
    }

    // =========================================================================
    // Node Tests
    // =========================================================================

    fn sample_file() -> File {
        let class = TypeDecl::new("Service", Visibility::Public, loc(2))
            .with_child(Node::Function(
                Function::new("run", Visibility::Public, loc(3)).with_implementation("{ }"),
            ))
            .with_child(Node::Field(Field::new("count", Visibility::Private, loc(4))));

        File::new("service.java", LanguageId::Java)
            .with_child(Node::Import(Import::new("java.util", ImportKind::Plain, loc(1))))
            .with_child(Node::Class(class))
    }

    #[test]
    fn test_node_kind_and_children() {
        let file = sample_file();
        let class = &file.children()[1];
        assert_eq!(class.kind(), NodeKind::Class);
        assert!(class.is_container());
        assert_eq!(class.children().len(), 2);
        assert_eq!(class.children()[0].kind(), NodeKind::Function);
        assert!(class.children()[0].children().is_empty());
    }

    #[test]
    fn test_node_name_and_visibility() {
        let file = sample_file();
        let import = &file.children()[0];
        assert_eq!(import.name(), Some("java.util"));
        assert_eq!(import.visibility(), None);

        let field = &file.children()[1].children()[1];
        assert_eq!(field.visibility(), Some(Visibility::Private));
    }

    #[test]
    fn test_file_walk_is_preorder() {
        let file = sample_file();
        let kinds: Vec<NodeKind> = file.walk().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![NodeKind::Import, NodeKind::Class, NodeKind::Function, NodeKind::Field]
        );
        assert_eq!(file.count_nodes(), 4);
    }

    #[test]
    fn test_file_errors() {
        let file = sample_file();
        assert!(!file.has_errors());

        let file = file.with_child(Node::Error(ErrorNode::new(
            "Syntax error",
            Severity::Error,
            loc(9),
        )));
        assert!(file.has_errors());
        assert_eq!(file.errors().count(), 1);
    }

    #[test]
    fn test_node_kind_container_table() {
        assert!(NodeKind::Package.is_container());
        assert!(NodeKind::Enum.is_container());
        assert!(!NodeKind::Function.is_container());
        assert!(!NodeKind::Import.has_visibility());
        assert!(NodeKind::TypeAlias.has_visibility());
    }

    #[test]
    fn test_enum_member_constructor() {
        let member = Field::enum_member("RED", "Color", loc(1));
        assert!(member.enum_member);
        assert!(member.is_normalized_enum_member());
        assert_eq!(member.field_type, Some(TypeRef::new("Color")));

        let plain = Field::new("red", Visibility::Public, loc(1));
        assert!(!plain.enum_member);
        assert!(!plain.is_normalized_enum_member());
    }

    #[test]
    fn test_doc_attaches_to_declarations_only() {
        let doc = Comment::new("/// Adds.", CommentFormat::Doc, loc(1));

        let function = Node::Function(Function::new("add", Visibility::Public, loc(2)))
            .with_doc(doc.clone());
        assert_eq!(function.doc(), Some(&doc));
        assert!(function.children().is_empty());
        assert_eq!(serde_json::to_value(&function).unwrap()["doc"]["text"], "/// Adds.");

        let import = Node::Import(Import::new("os", ImportKind::Plain, loc(2))).with_doc(doc);
        assert_eq!(import.doc(), None);
        assert!(NodeKind::Enum.accepts_doc());
        assert!(!NodeKind::Package.accepts_doc());
    }

    #[test]
    fn test_parameter_builders() {
        let param = Parameter::typed("limit", TypeRef::new("int")).with_default("10");
        assert!(param.optional);
        assert_eq!(param.default_value.as_deref(), Some("10"));

        let rest = Parameter::new("args").with_variadic(true);
        assert!(rest.variadic);
        assert!(!rest.optional);
    }

    #[test]
    fn test_import_wildcard() {
        let import = Import::new("java.util", ImportKind::Plain, loc(1))
            .with_symbols(vec![ImportedSymbol::wildcard()]);
        assert!(import.is_wildcard());
    }

    #[test]
    fn test_node_serialization_tagged() {
        let node = Node::TypeAlias(TypeAlias::new(
            "Id",
            Visibility::Public,
            TypeRef::new("u64"),
            loc(1),
        ));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "type_alias");
        assert_eq!(json["visibility"], "public");
        assert_eq!(json["aliased"]["name"], "u64");
    }

    #[test]
    fn test_import_kind_does_not_clash_with_tag() {
        let node = Node::Import(Import::new("os", ImportKind::Static, loc(1)));
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["kind"], "import");
        assert_eq!(json["import_kind"], "static");
    }

    #[test]
    fn test_file_serialization_round_trip() {
        let file = sample_file();
        let json = serde_json::to_string(&file).unwrap();
        let back: File = serde_json::from_str(&json).unwrap();
        assert_eq!(back, file);

        let again = serde_json::to_string(&back).unwrap();
        assert_eq!(json, again, "Serialization must be deterministic");
    }
}
