//! Pattern language for syntax-aware search.
//!
//! A query describes the shape of the declarations or expressions to find
//! and compiles into a [`PatternNode`] tree:
//!
//! - `\F`, `\V`, `\P` and `\T` match functions, variables, parameters, and
//!   classes; `#Name` is shorthand for a named class
//! - `name:type` is a variable and `name:ret(params)` a function, where any
//!   part may be omitted and `...` in a parameter list stands for zero or
//!   more parameters
//! - `= name` and `~ type` bind name and type regexes after the fact
//! - `NS::Class::` restricts matches to a scope chain, and a leading `::` to
//!   top-level declarations
//! - `[virtual, const]` lists attributes; `[expr]` selects calls and
//!   references instead of declarations
//! - `{ inner }` and `outer ~ inner` require content inside a match
//! - `&`, `|`, `>`, `<`, `!>` and `!<` combine patterns
//!
//! Name, type, and text fields are regular expressions anchored at the start
//! of the subject. Wrap a regex in `/…/` when it uses operator characters.
//!
//! # Example
//!
//! ```
//! use sas_pattern::{PatternNode, compile_pattern};
//!
//! let pattern = compile_pattern(r"NS::\F[virtual] = draw")?;
//! assert!(matches!(pattern, PatternNode::Function(_)));
//! # Ok::<(), sas_pattern::PatternError>(())
//! ```

mod ast;
mod display;
mod error;
mod lexer;
mod name;
mod parser;
mod token;

pub use ast::{
    ClassPattern, Combinator, FunctionPattern, Operator, ParameterPattern, PatternNode,
    Qualifiers, SearchPattern, VariablePattern,
};
pub use error::PatternError;
pub use lexer::{Lexer, tokenize};
pub use name::{ANY, NameRegex};
pub use parser::{Parser, compile_pattern};
pub use token::{EntitySigil, Token, TokenKind};

#[cfg(test)]
mod tests;
