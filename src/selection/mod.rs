//! # Selections
//!
//! Filter clauses with `?` placeholders and their bound arguments.
//!
//! Values only ever travel as bound arguments. The only text spliced into a
//! clause is an identifier that has passed [`is_valid_identifier`].

pub mod builder;
pub mod projection;

pub use builder::{QueryBuilder, QueryStatement};
pub use projection::ProjectionMap;

use std::sync::OnceLock;

use regex::Regex;

use crate::store::SqlValue;

/// Primary key column every table exposes
pub const ID_COLUMN: &str = "_id";

/// A filter clause plus its ordered bound arguments
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    clause: Option<String>,
    args: Vec<SqlValue>,
}

impl Selection {
    pub fn new(clause: impl Into<String>, args: Vec<SqlValue>) -> Self {
        let clause = clause.into();
        Self {
            clause: if clause.trim().is_empty() {
                None
            } else {
                Some(clause)
            },
            args,
        }
    }

    /// No filter at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Selection as supplied by a caller; blank clauses count as absent
    pub fn from_parts(clause: Option<&str>, args: Vec<SqlValue>) -> Self {
        match clause {
            Some(c) => Self::new(c, args),
            None => Self { clause: None, args },
        }
    }

    /// `<column> = ?` bound to `value`
    pub fn equals(column: &str, value: impl Into<SqlValue>) -> Self {
        Self::new(format!("{} = ?", column), vec![value.into()])
    }

    pub fn clause(&self) -> Option<&str> {
        self.clause.as_deref()
    }

    pub fn args(&self) -> &[SqlValue] {
        &self.args
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_none() && self.args.is_empty()
    }

    /// Conjoin with `other`: `(self) AND (other)`, arguments of `self` first
    pub fn and(self, other: Selection) -> Selection {
        let clause = concatenate_where(self.clause.as_deref(), other.clause.as_deref());
        let mut args = self.args;
        args.extend(other.args);
        Selection { clause, args }
    }
}

/// Join two clauses with AND, dropping whichever side is blank
pub fn concatenate_where(a: Option<&str>, b: Option<&str>) -> Option<String> {
    let a = a.filter(|s| !s.trim().is_empty());
    let b = b.filter(|s| !s.trim().is_empty());
    match (a, b) {
        (None, None) => None,
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (Some(a), Some(b)) => Some(format!("({}) AND ({})", a, b)),
    }
}

/// Check that `name` is a bare SQL identifier
pub fn is_valid_identifier(name: &str) -> bool {
    static IDENT: OnceLock<Regex> = OnceLock::new();
    IDENT
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"))
        .is_match(name)
}
