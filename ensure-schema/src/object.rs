//! Schema objects - the payload of a schema catalog entry.
//!
//! The resource id of an entry names the object itself (column name or
//! index name); the payload says where it lives and how to build it.

use crate::error::{Result, SchemaError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaObject {
    /// A column added with `ALTER TABLE ... ADD COLUMN`.
    Column {
        table: String,
        /// Type and nullability, e.g. `VARCHAR(200) NULL`.
        definition: String,
        comment: Option<String>,
        /// Place the column after this one (MySQL only).
        after: Option<String>,
    },
    /// An index created with `CREATE [UNIQUE] INDEX`.
    Index {
        table: String,
        columns: Vec<String>,
        unique: bool,
    },
}

impl SchemaObject {
    pub fn column(table: impl Into<String>, definition: impl Into<String>) -> Self {
        SchemaObject::Column {
            table: table.into(),
            definition: definition.into(),
            comment: None,
            after: None,
        }
    }

    pub fn index<I, S>(table: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SchemaObject::Index {
            table: table.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
        }
    }

    pub fn with_comment(mut self, text: impl Into<String>) -> Self {
        if let SchemaObject::Column { comment, .. } = &mut self {
            *comment = Some(text.into());
        }
        self
    }

    pub fn after(mut self, column: impl Into<String>) -> Self {
        if let SchemaObject::Column { after, .. } = &mut self {
            *after = Some(column.into());
        }
        self
    }

    pub fn unique(mut self) -> Self {
        if let SchemaObject::Index { unique, .. } = &mut self {
            *unique = true;
        }
        self
    }

    pub fn table(&self) -> &str {
        match self {
            SchemaObject::Column { table, .. } | SchemaObject::Index { table, .. } => table,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SchemaObject::Column { .. } => "column",
            SchemaObject::Index { .. } => "index",
        }
    }
}

/// Accept plain SQL identifiers only: ASCII letters, digits and `_`.
pub(crate) fn check_identifier(ident: &str) -> Result<&str> {
    let valid = !ident.is_empty()
        && ident.len() <= 64
        && ident.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !ident.starts_with(|c: char| c.is_ascii_digit());
    if valid {
        Ok(ident)
    } else {
        Err(SchemaError::InvalidIdentifier(ident.to_string()))
    }
}

/// A column definition is a single SQL fragment; no statement separators or comments.
pub(crate) fn check_definition(definition: &str) -> Result<&str> {
    let trimmed = definition.trim();
    if trimmed.is_empty() || trimmed.contains(';') || trimmed.contains("--") {
        return Err(SchemaError::InvalidDefinition(definition.to_string()));
    }
    Ok(trimmed)
}
