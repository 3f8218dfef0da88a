//! Login session held by the connector for one run.

use reqwest::header::{HeaderMap, SET_COOKIE};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    cookie_name: &'static str,
    token: String,
}

impl Session {
    /// Token from the login body (`SessionId`), else from the session cookie.
    pub(crate) fn from_login(cookie_name: &'static str, headers: &HeaderMap, body: &str) -> Option<Self> {
        let from_body = serde_json::from_str::<Value>(body).ok().and_then(|v| {
            ["SessionId", "sessionId"]
                .iter()
                .find_map(|k| v.get(*k).and_then(Value::as_str).map(str::to_string))
        });

        let token = from_body.or_else(|| {
            headers
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|h| h.to_str().ok())
                .filter_map(|c| c.split(';').next()?.trim().split_once('='))
                .find(|(name, _)| *name == cookie_name)
                .map(|(_, value)| value.to_string())
        })?;

        if token.is_empty() {
            return None;
        }
        Some(Self { cookie_name, token })
    }

    pub(crate) fn cookie_header(&self) -> String {
        format!("{}={}", self.cookie_name, self.token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_token_from_body() {
        let s = Session::from_login(
            "B1SESSION",
            &HeaderMap::new(),
            r#"{"SessionId":"abc-123","Version":"1000190","SessionTimeout":30}"#,
        )
        .unwrap();
        assert_eq!(s.cookie_header(), "B1SESSION=abc-123");
    }

    #[test]
    fn test_token_from_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_static("ROUTEID=.node1; path=/b1s"));
        headers.append(SET_COOKIE, HeaderValue::from_static("session=xyz; HttpOnly"));
        let s = Session::from_login("session", &headers, "").unwrap();
        assert_eq!(s.cookie_header(), "session=xyz");
    }

    #[test]
    fn test_no_token() {
        assert!(Session::from_login("B1SESSION", &HeaderMap::new(), "{}").is_none());
        assert!(Session::from_login("B1SESSION", &HeaderMap::new(), r#"{"SessionId":""}"#).is_none());
    }
}
