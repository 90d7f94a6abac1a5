//! Property tests for the stripper over generated IR trees

use distiller_ir::{
    Comment, CommentFormat, ErrorNode, Field, File, Function, Import, ImportKind, LanguageId,
    Location, Node, Package, Severity, StripOptions, Stripper, TypeAlias, TypeDecl, TypeRef,
    Visibility,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

// ============================================================================
// Strategies
// ============================================================================

fn arb_name() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9]{0,5}"
}

fn arb_location() -> impl Strategy<Value = Location> {
    (0usize..400, 0usize..60, 1usize..40, 0usize..5).prop_map(|(start, len, line, lines)| {
        Location::new(start, start + len, line, line + lines)
    })
}

fn arb_visibility() -> impl Strategy<Value = Visibility> {
    prop_oneof![
        Just(Visibility::Public),
        Just(Visibility::Private),
        Just(Visibility::Protected),
        Just(Visibility::Internal),
        Just(Visibility::PackagePrivate),
    ]
}

fn arb_decorators() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("@[a-z]{1,6}", 0..2)
}

fn arb_doc() -> impl Strategy<Value = Option<Comment>> {
    proptest::option::of(("[a-z ]{1,8}", arb_location()).prop_map(|(text, location)| {
        Comment::new(format!("/// {}", text), CommentFormat::Doc, location)
    }))
}

fn arb_options() -> impl Strategy<Value = StripOptions> {
    any::<[bool; 10]>().prop_map(|b| StripOptions {
        include_implementation: b[0],
        include_private: b[1],
        include_protected: b[2],
        include_internal: b[3],
        include_comments: b[4],
        include_docstrings: b[5],
        include_imports: b[6],
        include_fields: b[7],
        include_methods: b[8],
        include_annotations: b[9],
    })
}

fn arb_function() -> impl Strategy<Value = Function> {
    (
        arb_name(),
        arb_visibility(),
        arb_location(),
        arb_decorators(),
        proptest::option::of("[a-z ;]{0,12}"),
        arb_doc(),
    )
        .prop_map(|(name, visibility, location, decorators, body, doc)| {
            let mut function = Function::new(name, visibility, location).with_decorators(decorators);
            function.doc = doc;
            match body {
                Some(body) => function.with_implementation(format!("{{{}}}", body)),
                None => function,
            }
        })
}

fn arb_field() -> impl Strategy<Value = Field> {
    (
        arb_name(),
        arb_visibility(),
        arb_location(),
        arb_decorators(),
        proptest::option::of("[0-9]{1,3}"),
        arb_doc(),
    )
        .prop_map(|(name, visibility, location, decorators, value, doc)| {
            let mut field = Field::new(name, visibility, location)
                .with_decorators(decorators)
                .with_type(TypeRef::new("int"));
            field.doc = doc;
            match value {
                Some(value) => field.with_default_value(value),
                None => field,
            }
        })
}

fn arb_comment() -> impl Strategy<Value = Comment> {
    (
        prop_oneof![
            Just(CommentFormat::Line),
            Just(CommentFormat::Block),
            Just(CommentFormat::Doc),
        ],
        "[a-z ]{0,10}",
        arb_location(),
    )
        .prop_map(|(format, text, location)| Comment::new(format!("// {}", text), format, location))
}

/// Enum with normalized members and the odd method
fn arb_enum() -> impl Strategy<Value = Node> {
    (
        arb_name(),
        arb_visibility(),
        arb_location(),
        prop::collection::vec((arb_name(), arb_location(), arb_doc()), 0..5),
        prop::collection::vec(arb_function(), 0..2),
        arb_doc(),
    )
        .prop_map(|(name, visibility, location, members, methods, doc)| {
            let mut children: Vec<Node> = members
                .into_iter()
                .map(|(member, loc, member_doc)| {
                    let mut field = Field::enum_member(member, name.as_str(), loc);
                    field.doc = member_doc;
                    Node::Field(field)
                })
                .collect();
            children.extend(methods.into_iter().map(Node::Function));
            let mut decl = TypeDecl::new(name, visibility, location).with_children(children);
            decl.doc = doc;
            Node::Enum(decl)
        })
}

fn arb_leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        arb_function().prop_map(Node::Function),
        arb_field().prop_map(Node::Field),
        arb_comment().prop_map(Node::Comment),
        (arb_name(), arb_location())
            .prop_map(|(module, loc)| Node::Import(Import::new(module, ImportKind::Plain, loc))),
        ("[a-z ]{1,10}", arb_location()).prop_map(|(message, loc)| {
            Node::Error(ErrorNode::new(message, Severity::Error, loc))
        }),
        (arb_name(), arb_visibility(), arb_location(), arb_doc()).prop_map(
            |(name, vis, loc, doc)| {
                let mut alias = TypeAlias::new(name, vis, TypeRef::new("u32"), loc);
                alias.doc = doc;
                Node::TypeAlias(alias)
            }
        ),
        arb_enum(),
    ]
}

fn arb_node() -> impl Strategy<Value = Node> {
    arb_leaf().prop_recursive(4, 64, 5, |inner| {
        prop_oneof![
            (
                0u8..3,
                arb_name(),
                arb_visibility(),
                arb_location(),
                arb_decorators(),
                prop::collection::vec(inner.clone(), 0..5),
                arb_doc(),
            )
                .prop_map(|(which, name, vis, loc, decorators, children, doc)| {
                    let mut decl = TypeDecl::new(name, vis, loc)
                        .with_decorators(decorators)
                        .with_children(children);
                    decl.doc = doc;
                    match which {
                        0 => Node::Class(decl),
                        1 => Node::Interface(decl),
                        _ => Node::Struct(decl),
                    }
                }),
            (arb_name(), arb_location(), prop::collection::vec(inner, 0..5))
                .prop_map(|(name, loc, children)| {
                    Node::Package(Package::new(name, loc).with_children(children))
                }),
        ]
    })
}

fn arb_file() -> impl Strategy<Value = File> {
    prop::collection::vec(arb_node(), 0..6)
        .prop_map(|children| File::new("gen.rs", LanguageId::Rust).with_children(children))
}

// ============================================================================
// Helpers
// ============================================================================

type NodeKey = (&'static str, String, usize, usize);

fn key(node: &Node) -> NodeKey {
    let label = match node {
        Node::Import(import) => import.module.clone(),
        Node::Comment(comment) => comment.text.clone(),
        Node::Error(error) => error.message.clone(),
        other => other.name().unwrap_or_default().to_string(),
    };
    let location = node.location();
    (node.kind().as_str(), label, location.start_byte, location.end_byte)
}

/// Multiset of node identities in a tree
fn node_set(file: &File) -> BTreeMap<NodeKey, usize> {
    let mut set = BTreeMap::new();
    for node in file.walk() {
        *set.entry(key(node)).or_insert(0) += 1;
    }
    set
}

/// Multiset of (node identity, attached doc text) pairs
fn documented_set(file: &File) -> BTreeMap<(NodeKey, Option<String>), usize> {
    let mut set = BTreeMap::new();
    for node in file.walk() {
        let doc = node.doc().map(|d| d.text.clone());
        *set.entry((key(node), doc)).or_insert(0) += 1;
    }
    set
}

fn is_sub_multiset<K: Ord>(small: &BTreeMap<K, usize>, large: &BTreeMap<K, usize>) -> bool {
    small
        .iter()
        .all(|(k, count)| large.get(k).is_some_and(|n| n >= count))
}

fn union(a: StripOptions, b: StripOptions) -> StripOptions {
    StripOptions {
        include_implementation: a.include_implementation || b.include_implementation,
        include_private: a.include_private || b.include_private,
        include_protected: a.include_protected || b.include_protected,
        include_internal: a.include_internal || b.include_internal,
        include_comments: a.include_comments || b.include_comments,
        include_docstrings: a.include_docstrings || b.include_docstrings,
        include_imports: a.include_imports || b.include_imports,
        include_fields: a.include_fields || b.include_fields,
        include_methods: a.include_methods || b.include_methods,
        include_annotations: a.include_annotations || b.include_annotations,
    }
}

fn visible(options: &StripOptions, visibility: Visibility) -> bool {
    match visibility {
        Visibility::Public => true,
        Visibility::Private => options.include_private,
        Visibility::Protected => options.include_protected,
        Visibility::Internal | Visibility::PackagePrivate => options.include_internal,
    }
}

/// Type declarations whose own visibility and every enclosing container's pass
fn reachable_type_decls(nodes: &[Node], options: &StripOptions, out: &mut Vec<NodeKey>) {
    for node in nodes {
        match node {
            Node::Package(package) => reachable_type_decls(package.children(), options, out),
            Node::Class(d) | Node::Interface(d) | Node::Struct(d) | Node::Enum(d) => {
                if visible(options, d.visibility) {
                    out.push(key(node));
                    reachable_type_decls(d.children(), options, out);
                }
            }
            _ => {}
        }
    }
}

fn strip(file: &File, options: StripOptions) -> File {
    Stripper::new(options).strip(file)
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn strip_is_idempotent(file in arb_file(), options in arb_options()) {
        let once = strip(&file, options);
        let twice = strip(&once, options);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn strip_is_monotonic(file in arb_file(), a in arb_options(), b in arb_options()) {
        let wider = union(a, b);
        prop_assert!(wider.includes(&a));

        let narrow_set = node_set(&strip(&file, a));
        let wide_set = node_set(&strip(&file, wider));
        prop_assert!(is_sub_multiset(&narrow_set, &wide_set));
    }

    #[test]
    fn kept_containers_survive_empty(file in arb_file(), options in arb_options()) {
        let mut expected = Vec::new();
        reachable_type_decls(file.children(), &options, &mut expected);

        let mut actual = Vec::new();
        let stripped = strip(&file, options);
        reachable_type_decls(stripped.children(), &StripOptions::full(), &mut actual);

        expected.sort();
        actual.sort();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn enum_members_ignore_privacy(
        node in arb_enum(),
        private in any::<bool>(),
        protected in any::<bool>(),
        internal in any::<bool>(),
    ) {
        let decl = node.as_type_decl().cloned().unwrap();
        let public_enum = Node::Enum(
            TypeDecl::new(decl.name.clone(), Visibility::Public, decl.location)
                .with_children(decl.children().to_vec()),
        );
        let file = File::new("gen.rs", LanguageId::Rust).with_child(public_enum);
        let options = StripOptions::default()
            .with_private(private)
            .with_protected(protected)
            .with_internal(internal);

        let stripped = strip(&file, options);
        let members: Vec<&Field> = stripped.children()[0]
            .children()
            .iter()
            .filter_map(|child| match child {
                Node::Field(field) if field.enum_member => Some(field),
                _ => None,
            })
            .collect();

        let expected = decl
            .children()
            .iter()
            .filter(|child| matches!(child, Node::Field(f) if f.enum_member))
            .count();
        prop_assert_eq!(members.len(), expected);
        prop_assert!(members.iter().all(|m| m.is_normalized_enum_member()));
    }

    #[test]
    fn implementation_toggle_keeps_node_set(file in arb_file(), options in arb_options()) {
        let with_bodies = strip(&file, options.with_implementation(true));
        let without_bodies = strip(&file, options.with_implementation(false));
        prop_assert_eq!(node_set(&with_bodies), node_set(&without_bodies));

        let all_bodies_stripped = without_bodies.walk().all(|node| match node {
            Node::Function(f) => f.implementation.is_none(),
            Node::Field(f) => f.default_value.is_none(),
            _ => true,
        });
        prop_assert!(all_bodies_stripped);
    }

    #[test]
    fn annotation_toggle_keeps_node_set(file in arb_file(), options in arb_options()) {
        let with = strip(&file, options.with_annotations(true));
        let without = strip(&file, options.with_annotations(false));
        prop_assert_eq!(node_set(&with), node_set(&without));
    }

    #[test]
    fn docs_stay_with_their_declarations(file in arb_file(), options in arb_options()) {
        let stripped = strip(&file, options.with_docstrings(true));
        let kept = documented_set(&stripped);
        prop_assert!(is_sub_multiset(&kept, &documented_set(&file)));

        // Declarations survive either way; only their attached docs differ
        let bare = strip(&file, options.with_docstrings(false));
        prop_assert!(bare.walk().all(|node| node.doc().is_none()));
        let declarations = |set: BTreeMap<NodeKey, usize>| -> BTreeMap<NodeKey, usize> {
            set.into_iter().filter(|((kind, ..), _)| *kind != "comment").collect()
        };
        prop_assert_eq!(declarations(node_set(&bare)), declarations(node_set(&stripped)));
    }

    #[test]
    fn input_is_never_mutated(file in arb_file(), options in arb_options()) {
        let before = file.clone();
        let _ = strip(&file, options);
        prop_assert_eq!(file, before);
    }

    #[test]
    fn full_options_are_identity(file in arb_file()) {
        prop_assert_eq!(strip(&file, StripOptions::full()), file);
    }
}
