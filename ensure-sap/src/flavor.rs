//! Route and body layouts of the remote query service.

use serde_json::{Value, json};

use ensure_core::ResourceDefinition;

use crate::catalog::QueryPayload;

/// Marker some servers put in the body of a failed lookup instead of a 404.
pub const NOT_FOUND_MARKER: &str = "No matching records found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ApiFlavor {
    /// SAP Business One Service Layer (`/b1s/v1/SQLQueries`).
    #[default]
    ServiceLayer,
    /// Plain `/login` and `/resources` routes.
    Generic,
}

impl ApiFlavor {
    fn prefix(self) -> &'static [&'static str] {
        match self {
            ApiFlavor::ServiceLayer => &["b1s", "v1"],
            ApiFlavor::Generic => &[],
        }
    }

    fn with_prefix(self, tail: &[&str]) -> Vec<String> {
        self.prefix()
            .iter()
            .chain(tail)
            .map(|s| s.to_string())
            .collect()
    }

    pub fn login_segments(self) -> Vec<String> {
        match self {
            ApiFlavor::ServiceLayer => self.with_prefix(&["Login"]),
            ApiFlavor::Generic => self.with_prefix(&["login"]),
        }
    }

    pub fn logout_segments(self) -> Option<Vec<String>> {
        match self {
            ApiFlavor::ServiceLayer => Some(self.with_prefix(&["Logout"])),
            ApiFlavor::Generic => None,
        }
    }

    pub fn collection_segments(self) -> Vec<String> {
        match self {
            ApiFlavor::ServiceLayer => self.with_prefix(&["SQLQueries"]),
            ApiFlavor::Generic => self.with_prefix(&["resources"]),
        }
    }

    pub fn resource_segments(self, id: &str) -> Vec<String> {
        match self {
            ApiFlavor::ServiceLayer => {
                let key = format!("SQLQueries('{}')", id.replace('\'', "''"));
                self.with_prefix(&[key.as_str()])
            }
            ApiFlavor::Generic => self.with_prefix(&["resources", id]),
        }
    }

    /// Cookie that carries the session token.
    pub fn cookie_name(self) -> &'static str {
        match self {
            ApiFlavor::ServiceLayer => "B1SESSION",
            ApiFlavor::Generic => "session",
        }
    }

    pub fn login_body(self, username: &str, password: &str, company: &str) -> Value {
        match self {
            ApiFlavor::ServiceLayer => json!({
                "UserName": username,
                "Password": password,
                "CompanyDB": company,
            }),
            ApiFlavor::Generic => json!({
                "username": username,
                "password": password,
                "company": company,
            }),
        }
    }

    pub fn create_body(self, def: &ResourceDefinition<QueryPayload>) -> Value {
        let (id, label, text, params) = match self {
            ApiFlavor::ServiceLayer => ("SqlCode", "SqlName", "SqlText", "ParamList"),
            ApiFlavor::Generic => ("id", "label", "text", "paramList"),
        };
        let mut body = json!({
            id: def.id,
            label: def.label,
            text: def.payload.text,
        });
        if let Some(list) = &def.payload.param_list {
            body[params] = Value::String(list.clone());
        }
        body
    }
}
