//! SQL dialects - catalog queries and DDL rendering per database.

use crate::error::{Result, SchemaError};
use crate::object::{SchemaObject, check_definition, check_identifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    MySql,
    Sqlite,
}

/// A catalog lookup: SQL returning a single `COUNT(*)` plus its bind values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountQuery {
    pub sql: &'static str,
    pub binds: Vec<String>,
}

impl Dialect {
    /// Pick the dialect from a sqlx connection url.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url.split(':').next().unwrap_or_default();
        match scheme {
            "mysql" | "mariadb" => Ok(Dialect::MySql),
            "sqlite" => Ok(Dialect::Sqlite),
            _ => Err(SchemaError::UnsupportedUrl(scheme.to_string())),
        }
    }

    /// Backticks in both dialects: SQLite reads an unmatched `"name"` as a
    /// string literal, a backquoted name never.
    fn quote(self, ident: &str) -> Result<String> {
        let ident = check_identifier(ident)?;
        Ok(format!("`{}`", ident))
    }

    pub fn table_exists(self, table: &str) -> CountQuery {
        let sql = match self {
            Dialect::MySql => {
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = DATABASE() AND table_name = ?"
            }
            Dialect::Sqlite => "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?",
        };
        CountQuery {
            sql,
            binds: vec![table.to_string()],
        }
    }

    pub fn column_exists(self, table: &str, column: &str) -> CountQuery {
        self.object_exists(column, &SchemaObject::column(table, ""))
    }

    /// Lookup for the object named `id`.
    pub fn object_exists(self, id: &str, object: &SchemaObject) -> CountQuery {
        let sql = match (self, object) {
            (Dialect::MySql, SchemaObject::Column { .. }) => {
                "SELECT COUNT(*) FROM information_schema.columns \
                 WHERE table_schema = DATABASE() AND table_name = ? AND column_name = ?"
            }
            (Dialect::MySql, SchemaObject::Index { .. }) => {
                "SELECT COUNT(*) FROM information_schema.statistics \
                 WHERE table_schema = DATABASE() AND table_name = ? AND index_name = ?"
            }
            (Dialect::Sqlite, SchemaObject::Column { .. }) => {
                "SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?"
            }
            (Dialect::Sqlite, SchemaObject::Index { .. }) => {
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'index' AND tbl_name = ? AND name = ?"
            }
        };
        CountQuery {
            sql,
            binds: vec![object.table().to_string(), id.to_string()],
        }
    }

    /// Render the DDL statement that creates `id`.
    pub fn create_statement(self, id: &str, object: &SchemaObject) -> Result<String> {
        match object {
            SchemaObject::Column {
                table,
                definition,
                comment,
                after,
            } => {
                let mut sql = format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    self.quote(table)?,
                    self.quote(id)?,
                    check_definition(definition)?
                );
                if self == Dialect::MySql {
                    if let Some(comment) = comment {
                        sql.push_str(&format!(" COMMENT '{}'", escape_literal(comment)));
                    }
                    if let Some(after) = after {
                        sql.push_str(&format!(" AFTER {}", self.quote(after)?));
                    }
                }
                Ok(sql)
            }
            SchemaObject::Index {
                table,
                columns,
                unique,
            } => {
                if columns.is_empty() {
                    return Err(SchemaError::InvalidDefinition(format!(
                        "index {} has no columns",
                        id
                    )));
                }
                let cols = columns
                    .iter()
                    .map(|c| self.quote(c))
                    .collect::<Result<Vec<_>>>()?
                    .join(", ");
                Ok(format!(
                    "CREATE {}INDEX {} ON {} ({})",
                    if *unique { "UNIQUE " } else { "" },
                    self.quote(id)?,
                    self.quote(table)?,
                    cols
                ))
            }
        }
    }
}

fn escape_literal(text: &str) -> String {
    text.replace('\\', "\\\\").replace('\'', "''")
}
