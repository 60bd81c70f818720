use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered remote execution endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub url: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_status_check: Option<DateTime<Utc>>,
    pub last_status_check_success: bool,
}

impl Server {
    pub fn new(id: &str, name: Option<&str>, url: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.map(str::to_string),
            url: url.trim_end_matches('/').to_string(),
            is_active: true,
            last_status_check: Some(Utc::now()),
            last_status_check_success: true,
        }
    }

    /// Record the outcome of a health probe.
    pub fn record_check(&mut self, success: bool) {
        self.is_active = success;
        self.last_status_check = Some(Utc::now());
        self.last_status_check_success = success;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strips_trailing_slash() {
        let server = Server::new("s1", Some("local"), "http://localhost:3001/");
        assert_eq!(server.url, "http://localhost:3001");
        assert!(server.is_active);
    }

    #[test]
    fn test_record_check_failure_marks_inactive() {
        let mut server = Server::new("s1", None, "http://localhost:3001");
        server.record_check(false);
        assert!(!server.is_active);
        assert!(!server.last_status_check_success);
        assert!(server.last_status_check.is_some());
    }
}
