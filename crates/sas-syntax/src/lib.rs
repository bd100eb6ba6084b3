//! Source trees for structural C and C++ search.
//!
//! This crate turns C and C++ files into [`SourceTree`]s: compact arenas of
//! declarations and expressions annotated with the facts a structural
//! pattern can ask about (kind, name, type spelling, definition status,
//! member flags, access, parameters, and template parameters).
//!
//! - [`Parser`] wraps Tree-sitter and reports syntax errors.
//! - [`TreeSitterProvider`] implements [`SourceProvider`], detecting the
//!   language from the file extension and lowering the Tree-sitter tree.
//! - [`Node`] is the borrowed handle the search engine walks.
//!
//! # Supported Languages
//!
//! - C (`.c`)
//! - C++ (`.cc`, `.cpp`, `.cxx`, `.c++`, `.h`, `.hh`, `.hpp`, `.hxx`, `.inl`)
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use sas_syntax::{NodeKind, SourceProvider, TreeSitterProvider};
//!
//! let provider = TreeSitterProvider::new();
//! let tree = provider.parse(Path::new("demo.cpp"), "namespace ns { int f(int a); }")?;
//!
//! let function = tree
//!     .root()
//!     .descendants()
//!     .find(|node| node.kind() == NodeKind::FunctionDecl);
//! assert_eq!(function.map(|node| node.type_spelling()), Some("int (int)"));
//! # Ok::<(), sas_syntax::SyntaxError>(())
//! ```

mod error;
mod language;
mod lower;
mod parser;
mod position;
mod provider;
mod tree;

pub use error::SyntaxError;
pub use language::{LanguageParseError, SupportedLanguage};
pub use parser::{ParseResult, Parser, SyntaxErrorInfo};
pub use position::{Extent, Position};
pub use provider::{PROVIDER_TARGET, SourceProvider, TreeSitterProvider};
pub use tree::{
    AccessSpecifier, Ancestors, ChildRole, Descendants, Node, NodeData, NodeId, NodeKind,
    SourceTree,
};

#[cfg(test)]
mod tests;
