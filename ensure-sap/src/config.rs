//! SAP connection settings from flags, environment and a credentials file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Args;
use serde_json::Value;

use crate::error::ConfigError;
use crate::flavor::ApiFlavor;

pub const SERVER_KEY: &str = "SAP_B1_SERVER";
pub const USERNAME_KEY: &str = "SAP_B1_USERNAME";
pub const PASSWORD_KEY: &str = "SAP_B1_PASSWORD";
pub const COMPANY_DB_KEY: &str = "SAP_B1_COMPANY_DB";

/// SAP flags, each backed by an environment variable.
#[derive(Args, Debug, Clone, Default)]
pub struct SapArgs {
    /// Service Layer base url, e.g. https://sap.example:50000
    #[arg(long, env = SERVER_KEY)]
    pub server: Option<String>,

    /// Service Layer user
    #[arg(long, env = USERNAME_KEY)]
    pub username: Option<String>,

    /// Service Layer password
    #[arg(long, env = PASSWORD_KEY, hide_env_values = true)]
    pub password: Option<String>,

    /// Company database
    #[arg(long, env = COMPANY_DB_KEY)]
    pub company_db: Option<String>,

    /// JSON file with SAP_B1_* keys, used for values not given otherwise
    #[arg(long, env = "SAP_CREDENTIALS_FILE")]
    pub credentials: Option<PathBuf>,

    /// Accept invalid TLS certificates (self-signed Service Layer installs)
    #[arg(long, env = "SAP_B1_INSECURE")]
    pub insecure: bool,

    /// Route layout of the query service
    #[arg(long, value_enum, default_value = "service-layer")]
    pub flavor: ApiFlavor,

    /// Login timeout in seconds
    #[arg(long, default_value = "30")]
    pub login_timeout_secs: u64,

    /// Timeout for query checks and creation, in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout_secs: u64,
}

impl SapArgs {
    /// Resolve settings; explicit values win over the credentials file.
    pub fn settings(&self) -> Result<SapSettings, ConfigError> {
        let file = match &self.credentials {
            Some(path) => load_credentials(path)?,
            None => HashMap::new(),
        };
        let pick = |explicit: &Option<String>, key: &str| {
            explicit
                .clone()
                .filter(|v| !v.is_empty())
                .or_else(|| file.get(key).cloned())
                .unwrap_or_default()
        };

        Ok(SapSettings {
            base_url: pick(&self.server, SERVER_KEY),
            username: pick(&self.username, USERNAME_KEY),
            password: pick(&self.password, PASSWORD_KEY),
            company_db: pick(&self.company_db, COMPANY_DB_KEY),
            insecure: self.insecure,
            flavor: self.flavor,
            login_timeout: Duration::from_secs(self.login_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        })
    }
}

/// Read a flat JSON object; non-string scalars are kept in their JSON form.
pub fn load_credentials(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::CredentialsIo {
        path: path.to_path_buf(),
        source,
    })?;
    let map: HashMap<String, Value> =
        serde_json::from_str(&raw).map_err(|source| ConfigError::CredentialsFormat {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(map
        .into_iter()
        .filter_map(|(k, v)| match v {
            Value::String(s) => Some((k, s)),
            Value::Null => None,
            other => Some((k, other.to_string())),
        })
        .collect())
}

#[derive(Debug, Clone)]
pub struct SapSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub company_db: String,
    pub insecure: bool,
    pub flavor: ApiFlavor,
    pub login_timeout: Duration,
    pub request_timeout: Duration,
}

impl SapSettings {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        company_db: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            company_db: company_db.into(),
            insecure: false,
            flavor: ApiFlavor::ServiceLayer,
            login_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
        }
    }

    /// Names of the required keys that are empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            (SERVER_KEY, &self.base_url),
            (USERNAME_KEY, &self.username),
            (PASSWORD_KEY, &self.password),
            (COMPANY_DB_KEY, &self.company_db),
        ]
        .into_iter()
        .filter(|(_, v)| v.is_empty())
        .map(|(k, _)| k)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_keys() {
        let settings = SapSettings::new("https://sap:50000", "manager", "", "");
        assert_eq!(settings.missing(), vec![PASSWORD_KEY, COMPANY_DB_KEY]);
        assert!(!settings.is_complete());
        assert!(SapSettings::new("u", "a", "b", "c").is_complete());
    }

    #[test]
    fn test_credentials_file_fills_gaps() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"SAP_B1_SERVER": "https://file:50000", "SAP_B1_USERNAME": "file-user",
                "SAP_B1_PASSWORD": "file-pw", "SAP_B1_COMPANY_DB": 42, "UNRELATED": null}}"#
        )
        .unwrap();

        let args = SapArgs {
            server: Some("https://flag:50000".into()),
            username: Some(String::new()),
            credentials: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let settings = args.settings().unwrap();
        assert_eq!(settings.base_url, "https://flag:50000");
        assert_eq!(settings.username, "file-user");
        assert_eq!(settings.password, "file-pw");
        assert_eq!(settings.company_db, "42");
    }

    #[test]
    fn test_bad_credentials_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2]").unwrap();
        let err = load_credentials(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::CredentialsFormat { .. }));

        let err = load_credentials(Path::new("/nonexistent/credentials.json")).unwrap_err();
        assert!(matches!(err, ConfigError::CredentialsIo { .. }));
    }
}
