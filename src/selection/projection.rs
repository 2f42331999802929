//! # Projection Maps
//!
//! Per-table mapping from the column aliases callers may request to the
//! physical column expressions the store evaluates.

use super::is_valid_identifier;
use crate::errors::{ProviderError, ProviderResult};

/// Ordered alias → expression mapping.
///
/// An empty map only requires requested columns to be bare identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionMap {
    entries: Vec<(String, String)>,
}

impl ProjectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map each column to itself
    pub fn identity<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut map = Self::new();
        for column in columns {
            let column = column.into();
            map.insert(column.clone(), column);
        }
        map
    }

    /// Add or replace the expression for `alias`
    pub fn insert(&mut self, alias: impl Into<String>, expr: impl Into<String>) {
        let alias = alias.into();
        let expr = expr.into();
        match self.entries.iter_mut().find(|(a, _)| *a == alias) {
            Some(entry) => entry.1 = expr,
            None => self.entries.push((alias, expr)),
        }
    }

    /// Builder form of [`ProjectionMap::insert`]
    pub fn with(mut self, alias: impl Into<String>, expr: impl Into<String>) -> Self {
        self.insert(alias, expr);
        self
    }

    pub fn get(&self, alias: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(a, _)| a == alias)
            .map(|(_, e)| e.as_str())
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.get(alias).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(a, _)| a.as_str())
    }

    /// Resolve the caller's requested columns into select-list entries.
    ///
    /// With no request every mapped column is returned, in map order. A
    /// requested alias missing from a non-empty map is rejected.
    pub fn resolve(&self, requested: Option<&[String]>) -> ProviderResult<Vec<String>> {
        let requested = requested.filter(|r| !r.is_empty());

        if self.is_empty() {
            return match requested {
                Some(columns) => columns
                    .iter()
                    .map(|c| {
                        if is_valid_identifier(c) {
                            Ok(c.clone())
                        } else {
                            Err(ProviderError::invalid_argument(format!("Invalid column {}", c)))
                        }
                    })
                    .collect(),
                None => Ok(vec!["*".to_string()]),
            };
        }

        match requested {
            None => Ok(self
                .entries
                .iter()
                .map(|(alias, expr)| select_item(alias, expr))
                .collect()),
            Some(columns) => columns
                .iter()
                .map(|alias| {
                    self.get(alias)
                        .map(|expr| select_item(alias, expr))
                        .ok_or_else(|| {
                            ProviderError::invalid_argument(format!("Invalid column {}", alias))
                        })
                })
                .collect(),
        }
    }

    /// Translate a caller-supplied `<alias> [ASC|DESC], ...` ordering into
    /// clause text.
    ///
    /// Each alias must be mapped, or be a bare identifier when the map is
    /// empty. Anything else is rejected rather than spliced.
    pub fn resolve_sort(&self, sort: &str) -> ProviderResult<String> {
        let terms = sort
            .split(',')
            .map(|term| self.sort_term(term))
            .collect::<ProviderResult<Vec<_>>>()?;
        Ok(terms.join(", "))
    }

    fn sort_term(&self, term: &str) -> ProviderResult<String> {
        let mut words = term.split_whitespace();
        let (alias, direction) = match (words.next(), words.next(), words.next()) {
            (Some(alias), direction, None) => (alias, direction),
            _ => {
                return Err(ProviderError::invalid_argument(format!(
                    "Invalid sort term: {}",
                    term.trim()
                )))
            }
        };

        let expr = if self.is_empty() {
            if !is_valid_identifier(alias) {
                return Err(ProviderError::invalid_argument(format!(
                    "Invalid sort column {}",
                    alias
                )));
            }
            alias.to_string()
        } else {
            self.get(alias).map(str::to_string).ok_or_else(|| {
                ProviderError::invalid_argument(format!(
                    "Invalid sort column {}; expected one of {}",
                    alias,
                    self.aliases().collect::<Vec<_>>().join(", ")
                ))
            })?
        };

        match direction.map(str::to_ascii_uppercase).as_deref() {
            None => Ok(expr),
            Some(dir @ ("ASC" | "DESC")) => Ok(format!("{} {}", expr, dir)),
            Some(other) => Err(ProviderError::invalid_argument(format!(
                "Invalid sort direction {}",
                other
            ))),
        }
    }
}

fn select_item(alias: &str, expr: &str) -> String {
    if alias == expr {
        alias.to_string()
    } else {
        format!("{} AS {}", expr, alias)
    }
}
