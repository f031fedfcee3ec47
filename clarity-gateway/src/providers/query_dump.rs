//! Debug query logging for LLM provider requests and responses.
//!
//! When enabled via `dump_queries = true` in `[logging]` config, writes raw
//! JSON to `./logs/queries/{timestamp}-{provider}-{model}.{phase}.json`.
//! Request and response share the same base name so they sort together.
//! Failures are logged as warnings but never block the request.

use std::path::{Path, PathBuf};

use chrono::Utc;
use serde_json::Value;
use tracing::warn;

/// Default dump directory, relative to the working directory.
pub const QUERY_DIR: &str = "./logs/queries";

/// Handle for a query dump session, pairing request and response files.
#[derive(Debug)]
pub struct QueryDump {
    dir: PathBuf,
    stem: String,
}

impl QueryDump {
    /// Dump the request JSON and return a handle for the paired response.
    ///
    /// Writes `{dir}/{timestamp}-{provider}-{model}.request.json`.
    pub async fn request(dir: &Path, provider: &str, model: &str, value: &Value) -> Option<Self> {
        let timestamp = Utc::now().format("%Y%m%d-%H%M%S-%3f");
        let dump = Self {
            dir: dir.to_path_buf(),
            stem: format!("{}-{}-{}", timestamp, provider, sanitize_model(model)),
        };

        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            warn!("dump_queries: failed to create dir: {}", e);
            return None;
        }

        write_json(&dump.path("request.json"), value).await;

        Some(dump)
    }

    /// Dump the response JSON paired with the earlier request.
    pub async fn response(&self, value: &Value) {
        write_json(&self.path("response.json"), value).await;
    }

    /// Dump a response body that did not parse as JSON.
    pub async fn response_text(&self, body: &str) {
        let path = self.path("response.txt");
        if let Err(e) = tokio::fs::write(&path, body).await {
            warn!("dump_queries: failed to write {}: {}", path.display(), e);
        }
    }

    fn path(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", self.stem, suffix))
    }
}

/// Sanitize a model name for safe use in filenames.
fn sanitize_model(model: &str) -> String {
    model
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write a pretty-printed JSON value to a file, warning on failure.
async fn write_json(path: &Path, value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json_str) => {
            if let Err(e) = tokio::fs::write(path, json_str).await {
                warn!("dump_queries: failed to write {}: {}", path.display(), e);
            }
        }
        Err(e) => {
            warn!("dump_queries: failed to serialize: {}", e);
        }
    }
}
