//! SQL statement builders for the `PostgreSQL` record store.
//!
//! Identifiers come only from [`Collection`] column sets, so they are safe to
//! splice into statement text. Values are always bound as parameters except
//! `NULL`, which is written inline.

use std::fmt::Write;

use crate::store::{
    domain::{Collection, FieldMap, FieldValue, Page},
    ports::{StoreError, StoreResult, record_store::ensure_known_columns},
};

/// A statement with positional parameters `$1..$n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// Statement text.
    pub sql: String,
    /// Parameters in placeholder order. Never contains [`FieldValue::Null`].
    pub binds: Vec<FieldValue>,
}

impl Statement {
    const fn new(sql: String) -> Self {
        Self {
            sql,
            binds: Vec::new(),
        }
    }

    /// Records a bound value and returns its placeholder.
    fn placeholder(&mut self, value: &FieldValue) -> String {
        self.binds.push(value.clone());
        format!("${}", self.binds.len())
    }

    fn push_where(&mut self, filter: &FieldMap) {
        let mut predicates = Vec::with_capacity(filter.len());
        for (column, value) in filter {
            let predicate = if value.is_null() {
                format!("\"{column}\" IS NULL")
            } else {
                let placeholder = self.placeholder(value);
                format!("\"{column}\" = {placeholder}")
            };
            predicates.push(predicate);
        }
        if !predicates.is_empty() {
            self.sql.push_str(" WHERE ");
            self.sql.push_str(&predicates.join(" AND "));
        }
    }
}

fn quoted_columns<'a>(columns: impl Iterator<Item = &'a str>) -> String {
    columns
        .map(|column| format!("\"{column}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Builds `SELECT <columns> FROM <collection> [WHERE ...] ORDER BY id
/// [LIMIT n] [OFFSET m]`.
///
/// # Errors
///
/// Returns [`crate::store::ports::StoreError::UnknownColumn`] for foreign
/// filter columns.
pub fn select(collection: Collection, filter: &FieldMap, page: Page) -> StoreResult<Statement> {
    ensure_known_columns(collection, filter)?;
    let columns = quoted_columns(collection.columns().iter().copied());
    let mut statement = Statement::new(format!(
        "SELECT {columns} FROM \"{}\"",
        collection.name()
    ));
    statement.push_where(filter);
    statement.sql.push_str(" ORDER BY \"id\"");
    if let Some(limit) = page.limit() {
        write!(statement.sql, " LIMIT {limit}").map_err(StoreError::persistence)?;
    }
    if page.offset() > 0 {
        write!(statement.sql, " OFFSET {}", page.offset()).map_err(StoreError::persistence)?;
    }
    Ok(statement)
}

/// Builds `INSERT INTO <collection> (...) VALUES (...) RETURNING id`.
///
/// # Errors
///
/// Returns [`crate::store::ports::StoreError::UnknownColumn`] for foreign
/// columns.
pub fn insert(collection: Collection, fields: &FieldMap) -> StoreResult<Statement> {
    ensure_known_columns(collection, fields)?;
    let mut statement = Statement::new(format!("INSERT INTO \"{}\"", collection.name()));
    if fields.is_empty() {
        statement.sql.push_str(" DEFAULT VALUES");
    } else {
        let mut values = Vec::with_capacity(fields.len());
        for (_, value) in fields {
            let rendered = if value.is_null() {
                "NULL".to_owned()
            } else {
                statement.placeholder(value)
            };
            values.push(rendered);
        }
        let columns = quoted_columns(fields.columns());
        write!(statement.sql, " ({columns}) VALUES ({})", values.join(", "))
            .map_err(StoreError::persistence)?;
    }
    statement.sql.push_str(" RETURNING \"id\"");
    Ok(statement)
}

/// Builds `UPDATE <collection> SET ... [WHERE ...]`.
///
/// Returns `None` when there is nothing to assign.
///
/// # Errors
///
/// Returns [`crate::store::ports::StoreError::UnknownColumn`] for foreign
/// filter or assignment columns.
pub fn update(
    collection: Collection,
    filter: &FieldMap,
    fields: &FieldMap,
) -> StoreResult<Option<Statement>> {
    ensure_known_columns(collection, filter)?;
    ensure_known_columns(collection, fields)?;
    if fields.is_empty() {
        return Ok(None);
    }

    let mut statement = Statement::new(format!("UPDATE \"{}\" SET ", collection.name()));
    let mut assignments = Vec::with_capacity(fields.len());
    for (column, value) in fields {
        let rendered = if value.is_null() {
            "NULL".to_owned()
        } else {
            statement.placeholder(value)
        };
        assignments.push(format!("\"{column}\" = {rendered}"));
    }
    statement.sql.push_str(&assignments.join(", "));
    statement.push_where(filter);
    Ok(Some(statement))
}

/// Builds `DELETE FROM <collection> WHERE id = $1`.
#[must_use]
pub fn delete(collection: Collection, id: i32) -> Statement {
    let mut statement = Statement::new(format!("DELETE FROM \"{}\"", collection.name()));
    statement.push_where(&FieldMap::new().with("id", id));
    statement
}
