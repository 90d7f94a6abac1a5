//! Structural checks for lowered trees
//!
//! Adapters are expected to hand over trees that already satisfy these rules.
//! `check` reports every violation it finds instead of stopping at the first,
//! which keeps adapter test failures readable.

use crate::ir::{File, Location, Modifier, Node, NodeKind, Visibility};
use std::fmt;

/// A broken structural rule, with enough context to find the node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Enum member field that is not public
    EnumMemberNotPublic { enum_name: String, member: String },

    /// Enum member field missing `static` or `const`
    EnumMemberMissingModifiers { enum_name: String, member: String },

    /// A `File` node below the root
    NestedFile { path: String, location: Location },

    /// Declaration with an empty name
    EmptyName { kind: NodeKind, location: Location },

    /// Start after end
    InvertedLocation { kind: NodeKind, location: Location },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::EnumMemberNotPublic { enum_name, member } => {
                write!(f, "enum member {}::{} is not public", enum_name, member)
            }
            Violation::EnumMemberMissingModifiers { enum_name, member } => {
                write!(f, "enum member {}::{} lacks static const", enum_name, member)
            }
            Violation::NestedFile { path, location } => {
                write!(f, "file '{}' nested at line {}", path, location.start_line)
            }
            Violation::EmptyName { kind, location } => {
                write!(f, "unnamed {} at line {}", kind.as_str(), location.start_line)
            }
            Violation::InvertedLocation { kind, location } => write!(
                f,
                "{} has inverted location {}..{}",
                kind.as_str(),
                location.start_byte,
                location.end_byte
            ),
        }
    }
}

/// Collect every violation in `file`
pub fn check(file: &File) -> Vec<Violation> {
    let mut violations = Vec::new();

    for node in file.walk() {
        let kind = node.kind();
        let location = node.location();

        if location.start_byte > location.end_byte || location.start_line > location.end_line {
            violations.push(Violation::InvertedLocation { kind, location });
        }

        match node {
            Node::File(nested) => violations.push(Violation::NestedFile {
                path: nested.path.clone(),
                location,
            }),
            Node::Enum(decl) => {
                for child in decl.children() {
                    if let Node::Field(member) = child {
                        if !member.enum_member {
                            continue;
                        }
                        if member.visibility != Visibility::Public {
                            violations.push(Violation::EnumMemberNotPublic {
                                enum_name: decl.name.clone(),
                                member: member.name.clone(),
                            });
                        }
                        if !member.modifiers.contains(&Modifier::Static)
                            || !member.modifiers.contains(&Modifier::Const)
                        {
                            violations.push(Violation::EnumMemberMissingModifiers {
                                enum_name: decl.name.clone(),
                                member: member.name.clone(),
                            });
                        }
                    }
                }
            }
            _ => {}
        }

        if kind.has_visibility() && node.name().is_some_and(str::is_empty) {
            violations.push(Violation::EmptyName { kind, location });
        }
    }

    violations
}
