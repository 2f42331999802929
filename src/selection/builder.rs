//! # Query Builder
//!
//! Assembles a select statement for one table from the handler's derived
//! filter, the caller's selection, the projection map and a sort order.

use super::projection::ProjectionMap;
use super::Selection;
use crate::errors::ProviderResult;

/// A fully built select statement
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStatement {
    pub table: String,
    pub columns: Vec<String>,
    pub selection: Selection,
    pub order_by: Option<String>,
}

impl QueryStatement {
    /// SQL text with `?` placeholders, in the same order as
    /// `selection.args()`
    pub fn to_sql(&self) -> String {
        let mut sql = format!("SELECT {} FROM {}", self.columns.join(", "), self.table);
        if let Some(clause) = self.selection.clause() {
            sql.push_str(" WHERE ");
            sql.push_str(clause);
        }
        if let Some(order) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order);
        }
        sql
    }
}

/// Builder for a single-table select
#[derive(Debug)]
pub struct QueryBuilder<'a> {
    table: &'a str,
    projection_map: &'a ProjectionMap,
    where_selection: Selection,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(table: &'a str, projection_map: &'a ProjectionMap) -> Self {
        Self {
            table,
            projection_map,
            where_selection: Selection::empty(),
        }
    }

    /// AND a fragment into the builder's own WHERE clause
    pub fn append_where(&mut self, fragment: Selection) {
        let current = std::mem::take(&mut self.where_selection);
        self.where_selection = current.and(fragment);
    }

    /// Build the statement.
    ///
    /// The caller's selection is conjoined after the builder's own filter,
    /// so its arguments bind after the builder's.
    pub fn build(
        self,
        projection: Option<&[String]>,
        selection: &Selection,
        sort_order: Option<&str>,
    ) -> ProviderResult<QueryStatement> {
        let columns = self.projection_map.resolve(projection)?;
        let order_by = sort_order
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(QueryStatement {
            table: self.table.to_string(),
            columns,
            selection: self.where_selection.and(selection.clone()),
            order_by,
        })
    }
}
