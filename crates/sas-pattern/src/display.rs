//! Canonical query text for compiled patterns.
//!
//! Every regex field prints as a `/…/` literal and every combinator is
//! parenthesised, so compiling the printed text yields an equal tree. Fields
//! whose regex contains `/` cannot be printed this way.

use std::collections::BTreeSet;
use std::fmt::{self, Formatter};

use crate::ast::{
    ClassPattern, FunctionPattern, ParameterPattern, PatternNode, Qualifiers, SearchPattern,
    VariablePattern,
};
use crate::name::NameRegex;

fn write_field(f: &mut Formatter<'_>, field: &NameRegex) -> fmt::Result {
    write!(f, "/{}/", field.as_str())
}

fn write_qualifiers(f: &mut Formatter<'_>, qualifiers: &Qualifiers) -> fmt::Result {
    match qualifiers {
        Qualifiers::Anywhere => Ok(()),
        Qualifiers::FileScope => f.write_str("::"),
        Qualifiers::Chain(chain) => chain.iter().try_for_each(|scope| {
            write_field(f, scope)?;
            f.write_str("::")
        }),
    }
}

fn write_parameters(
    f: &mut Formatter<'_>,
    open: char,
    close: char,
    parameters: &[ParameterPattern],
) -> fmt::Result {
    write!(f, "{open}")?;
    for (index, parameter) in parameters.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        match parameter {
            ParameterPattern::Ellipsis => f.write_str("...")?,
            ParameterPattern::Variable(variable) => {
                if !variable.name.is_any() {
                    write_field(f, &variable.name)?;
                }
                f.write_str(":")?;
                if !variable.type_name.is_any() {
                    write_field(f, &variable.type_name)?;
                }
            }
        }
    }
    write!(f, "{close}")
}

fn write_attributes(
    f: &mut Formatter<'_>,
    attributes: &BTreeSet<String>,
    is_expression: bool,
) -> fmt::Result {
    if attributes.is_empty() && !is_expression {
        return Ok(());
    }
    let names: Vec<&str> = is_expression
        .then_some("expr")
        .into_iter()
        .chain(attributes.iter().map(String::as_str))
        .collect();
    write!(f, "[{}]", names.join(", "))
}

fn write_name(f: &mut Formatter<'_>, name: &NameRegex) -> fmt::Result {
    if name.is_any() {
        return Ok(());
    }
    f.write_str(" = ")?;
    write_field(f, name)
}

fn write_contents(f: &mut Formatter<'_>, contents: &[PatternNode]) -> fmt::Result {
    contents
        .iter()
        .try_for_each(|inner| write!(f, " {{ {inner} }}"))
}

impl fmt::Display for FunctionPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_qualifiers(f, &self.qualifiers)?;
        f.write_str("\\F")?;
        if !self.return_type.is_any() {
            f.write_str(":")?;
            write_field(f, &self.return_type)?;
        }
        if let Some(template) = &self.template_parameters {
            write_parameters(f, '<', '>', template)?;
        }
        write_parameters(f, '(', ')', &self.parameters)?;
        write_attributes(f, &self.attributes, self.is_expression)?;
        write_name(f, &self.name)?;
        write_contents(f, &self.contents)
    }
}

impl fmt::Display for VariablePattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_qualifiers(f, &self.qualifiers)?;
        f.write_str(if self.is_parameter { "\\P" } else { "\\V" })?;
        if !self.type_name.is_any() {
            f.write_str(":")?;
            write_field(f, &self.type_name)?;
        }
        write_attributes(f, &self.attributes, self.is_expression)?;
        write_name(f, &self.name)?;
        write_contents(f, &self.contents)
    }
}

impl fmt::Display for ClassPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_qualifiers(f, &self.qualifiers)?;
        if self.name.is_any() {
            f.write_str("\\T")?;
        } else {
            f.write_str("#")?;
            write_field(f, &self.name)?;
        }
        if let Some(template) = &self.template_parameters {
            write_parameters(f, '<', '>', template)?;
        }
        write_contents(f, &self.contents)
    }
}

impl fmt::Display for SearchPattern {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_qualifiers(f, &self.qualifiers)?;
        write_field(f, &self.text)?;
        write_contents(f, &self.contents)
    }
}

impl fmt::Display for PatternNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Function(pattern) => pattern.fmt(f),
            Self::Variable(pattern) => pattern.fmt(f),
            Self::Class(pattern) => pattern.fmt(f),
            Self::Search(pattern) => pattern.fmt(f),
            Self::Combinator(combinator) => write!(
                f,
                "({} {} {})",
                combinator.left, combinator.operator, combinator.right
            ),
        }
    }
}
