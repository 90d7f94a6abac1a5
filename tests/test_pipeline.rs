//! End-to-end distillation tests: real sources through lowering and stripping

use code_distiller::ir::invariants;
use code_distiller::ir::{File, Modifier, Node, StripOptions, Visibility};
use code_distiller::{DistillConfig, Distiller};

fn distiller(options: StripOptions) -> Distiller {
    Distiller::new(DistillConfig::default().with_strip(options))
}

fn child_names(node: &Node) -> Vec<&str> {
    node.children().iter().filter_map(|c| c.name()).collect()
}

// ============================================================
// Lowered trees are well formed
// ============================================================

#[test]
fn test_lowered_trees_pass_invariants() {
    let sources: [(&str, &str); 3] = [
        (
            "shapes.py",
            "import math\n\nclass Circle:\n    def __init__(self, r):\n        self._r = r\n\n    def area(self) -> float:\n        return math.pi * self._r ** 2\n",
        ),
        (
            "color.rs",
            "pub enum Color { Red, Green }\n\nimpl Color {\n    pub fn is_red(&self) -> bool { matches!(self, Color::Red) }\n}\n",
        ),
        (
            "Planet.java",
            "package space;\n\npublic enum Planet {\n    MERCURY(3.3e23), VENUS(4.8e24);\n    private final double mass;\n    Planet(double mass) { this.mass = mass; }\n}\n",
        ),
    ];

    let distiller = Distiller::default();
    for (name, source) in sources {
        let file = distiller.lower(source.as_bytes(), name).unwrap();
        assert!(!file.has_errors(), "{} lowered with errors", name);
        assert!(
            invariants::check(&file).is_empty(),
            "{}: {:?}",
            name,
            invariants::check(&file)
        );
    }
}

// ============================================================
// Concrete scenarios
// ============================================================

#[test]
fn test_public_class_keeps_function_drops_private_field() {
    let source = r#"
public class Account {
    private long balance;

    public void deposit(long amount) {
        balance += amount;
    }
}
"#;
    let file = distiller(StripOptions::default())
        .distill_source(source.as_bytes(), "Account.java")
        .unwrap();

    let class = &file.children()[0];
    assert_eq!(class.name(), Some("Account"));
    assert_eq!(class.children().len(), 1);
    match &class.children()[0] {
        Node::Function(f) => {
            assert_eq!(f.name, "deposit");
            assert!(f.implementation.is_none());
        }
        other => panic!("expected function, got {:?}", other.kind()),
    }
}

#[test]
fn test_imports_only_file_becomes_empty() {
    let file = distiller(StripOptions::default().with_imports(false))
        .distill_source(b"import os\n", "only.py")
        .unwrap();
    assert!(file.children().is_empty());
}

#[test]
fn test_enum_members_survive_without_private() {
    let source = "enum Color { Red, Green, Blue }\n";
    // private enum: widen visibility for the enum itself, then check members
    let file = distiller(StripOptions::default().with_private(true))
        .distill_source(source.as_bytes(), "color.rs")
        .unwrap();
    let lowered_members = file.children()[0].children().len();
    assert_eq!(lowered_members, 3);

    let file = distiller(StripOptions::default())
        .distill_source(b"pub enum Color { Red, Green, Blue }\n", "color.rs")
        .unwrap();
    let color = &file.children()[0];
    assert_eq!(child_names(color), vec!["Red", "Green", "Blue"]);
    for member in color.children() {
        match member {
            Node::Field(f) => {
                assert_eq!(f.visibility, Visibility::Public);
                assert!(f.modifiers.contains(&Modifier::Static));
                assert!(f.modifiers.contains(&Modifier::Const));
            }
            other => panic!("expected enum member, got {:?}", other.kind()),
        }
    }
}

#[test]
fn test_interface_members_resolved_public_are_kept() {
    let source = r#"
public interface Shape {
    double area();
    String describe();
}
"#;
    let file = distiller(StripOptions::default())
        .distill_source(source.as_bytes(), "Shape.java")
        .unwrap();

    let shape = &file.children()[0];
    assert!(matches!(shape, Node::Interface(_)));
    assert_eq!(child_names(shape), vec!["area", "describe"]);
    assert!(shape
        .children()
        .iter()
        .all(|m| m.visibility() == Some(Visibility::Public)));
}

// ============================================================
// Documentation follows its declaration
// ============================================================

/// All comment text left in a tree, standalone or attached
fn documentation(file: &File) -> Vec<String> {
    file.walk()
        .filter_map(|node| match node {
            Node::Comment(comment) => Some(comment.text.clone()),
            other => other.doc().map(|doc| doc.text.clone()),
        })
        .collect()
}

#[test]
fn test_docs_of_private_declarations_are_dropped() {
    let sources: [(&str, &str); 3] = [
        (
            "vault.py",
            "def _rotate():\n    \"\"\"SECRET: rotation schedule.\"\"\"\n\nclass _Store:\n    \"\"\"SECRET: storage layout.\"\"\"\n\ndef open_vault():\n    \"\"\"Open the vault.\"\"\"\n",
        ),
        (
            "vault.rs",
            "/// SECRET: rotation schedule\nfn rotate() {}\n\npub struct Vault {\n    /// SECRET: raw key bytes\n    key: Vec<u8>,\n}\n\n/// Open the vault\npub fn open_vault() {}\n",
        ),
        (
            "Vault.java",
            "/** Holds secrets. */\npublic class Vault {\n    /** SECRET: raw key bytes. */\n    private byte[] key;\n\n    /** SECRET: rotation schedule. */\n    void rotate() {}\n\n    /** Open the vault. */\n    public void open() {}\n}\n",
        ),
    ];

    let distiller = distiller(StripOptions::default());
    for (name, source) in sources {
        let file = distiller.distill_source(source.as_bytes(), name).unwrap();
        let docs = documentation(&file);
        assert!(
            !docs.iter().any(|text| text.contains("SECRET")),
            "{} kept docs of dropped declarations: {:?}",
            name,
            docs
        );
        assert!(
            docs.iter().any(|text| text.contains("pen the vault")),
            "{} lost public docs: {:?}",
            name,
            docs
        );
    }
}

#[test]
fn test_docs_of_private_declarations_return_with_private() {
    let source = "/// Rotates keys\nfn rotate() {}\n";
    let file = distiller(StripOptions::default().with_private(true))
        .distill_source(source.as_bytes(), "vault.rs")
        .unwrap();
    assert_eq!(documentation(&file), vec!["/// Rotates keys".to_string()]);

    let file = distiller(StripOptions::default().with_private(true).with_docstrings(false))
        .distill_source(source.as_bytes(), "vault.rs")
        .unwrap();
    assert!(documentation(&file).is_empty());
    assert_eq!(file.children()[0].name(), Some("rotate"));
}

// ============================================================
// One parse, several distillations
// ============================================================

#[test]
fn test_variants_from_one_parse() {
    let source = r#"
pub struct Stack {
    items: Vec<u32>,
}

impl Stack {
    pub fn push(&mut self, item: u32) {
        self.items.push(item);
    }

    fn grow(&mut self) {}
}
"#;
    let distiller = Distiller::default();
    let lowered = distiller.lower(source.as_bytes(), "stack.rs").unwrap();
    let snapshot = lowered.clone();

    let variants = distiller.distill_variants(
        &lowered,
        &[
            StripOptions::signatures(),
            StripOptions::signatures().with_private(true),
            StripOptions::full(),
        ],
    );
    assert_eq!(lowered, snapshot);

    let stack = |i: usize| child_names(&variants[i].children()[0]).len();
    assert!(stack(0) < stack(1));
    assert_eq!(variants[2], lowered);
}
