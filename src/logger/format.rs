//! Access log format module
//!
//! Supports multiple log formats:
//! - `combined` (Apache/Nginx combined format)
//! - `common` (Common Log Format - CLF)
//! - `json` (one JSON object per line)
//! - Custom patterns with `$variable` substitution

use chrono::{DateTime, Local};
use serde::Serialize;

const CLF_TIME: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One served request, as written to the access log
#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    /// Client socket address
    pub remote_addr: String,
    /// When the request arrived
    pub time: DateTime<Local>,
    pub method: String,
    /// Request path as sent by the client (still percent-encoded)
    pub path: String,
    /// Query string (without leading ?)
    pub query: Option<String>,
    /// HTTP version (1.0, 1.1, 2)
    pub http_version: String,
    pub status: u16,
    /// Bytes announced in `Content-Length`; `None` for chunked bodies
    pub body_bytes: Option<u64>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Time to build the response head, in microseconds
    pub request_time_us: u64,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    remote_addr: &'a str,
    time: String,
    method: &'a str,
    path: &'a str,
    query: Option<&'a str>,
    http_version: &'a str,
    status: u16,
    body_bytes: Option<u64>,
    referer: Option<&'a str>,
    user_agent: Option<&'a str>,
    request_time_us: u64,
}

impl AccessLogEntry {
    /// Create a new access log entry stamped with the current time
    pub fn new(remote_addr: String, method: String, path: String) -> Self {
        Self {
            remote_addr,
            time: Local::now(),
            method,
            path,
            query: None,
            http_version: "1.1".to_string(),
            status: 200,
            body_bytes: None,
            referer: None,
            user_agent: None,
            request_time_us: 0,
        }
    }

    /// Format the log entry according to the specified format
    pub fn format(&self, format: &str) -> String {
        match format {
            "combined" => format!(
                "{} \"{}\" \"{}\"",
                self.format_common(),
                self.referer.as_deref().unwrap_or("-"),
                self.user_agent.as_deref().unwrap_or("-"),
            ),
            "common" => self.format_common(),
            "json" => self.format_json(),
            custom => self.format_custom(custom),
        }
    }

    fn request_uri(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{q}", self.path),
            None => self.path.clone(),
        }
    }

    fn request_line(&self) -> String {
        format!(
            "{} {} HTTP/{}",
            self.method,
            self.request_uri(),
            self.http_version
        )
    }

    fn body_bytes_sent(&self) -> String {
        self.body_bytes
            .map_or_else(|| "-".to_string(), |n| n.to_string())
    }

    /// `$remote_addr - - [$time_local] "$request" $status $body_bytes_sent`
    fn format_common(&self) -> String {
        format!(
            "{} - - [{}] \"{}\" {} {}",
            self.remote_addr,
            self.time.format(CLF_TIME),
            self.request_line(),
            self.status,
            self.body_bytes_sent(),
        )
    }

    fn format_json(&self) -> String {
        let line = JsonLine {
            remote_addr: &self.remote_addr,
            time: self.time.to_rfc3339(),
            method: &self.method,
            path: &self.path,
            query: self.query.as_deref(),
            http_version: &self.http_version,
            status: self.status,
            body_bytes: self.body_bytes,
            referer: self.referer.as_deref(),
            user_agent: self.user_agent.as_deref(),
            request_time_us: self.request_time_us,
        };
        serde_json::to_string(&line).unwrap_or_default()
    }

    /// Custom format with variable substitution
    ///
    /// Supported variables: `$remote_addr`, `$time_local`, `$time_iso8601`,
    /// `$request`, `$request_method`, `$request_uri`, `$request_time`
    /// (seconds, 3 decimals), `$status`, `$body_bytes_sent`,
    /// `$http_referer`, `$http_user_agent`.
    fn format_custom(&self, pattern: &str) -> String {
        #[allow(clippy::cast_precision_loss)]
        let request_time = self.request_time_us as f64 / 1_000_000.0;

        // Longer names first so `$request` does not eat `$request_time`
        let vars = [
            ("$remote_addr", self.remote_addr.clone()),
            ("$time_local", self.time.format(CLF_TIME).to_string()),
            ("$time_iso8601", self.time.to_rfc3339()),
            ("$request_time", format!("{request_time:.3}")),
            ("$request_method", self.method.clone()),
            ("$request_uri", self.request_uri()),
            ("$request", self.request_line()),
            ("$status", self.status.to_string()),
            ("$body_bytes_sent", self.body_bytes_sent()),
            (
                "$http_referer",
                self.referer.clone().unwrap_or_else(|| "-".to_string()),
            ),
            (
                "$http_user_agent",
                self.user_agent.clone().unwrap_or_else(|| "-".to_string()),
            ),
        ];

        vars.iter()
            .fold(pattern.to_string(), |line, (name, value)| {
                line.replace(name, value)
            })
    }
}
