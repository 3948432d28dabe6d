use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::app::{PostwatchError, Result};

pub const DEFAULT_TOKEN_VAR: &str = "DATA_ENDPOINT_TOKEN";

/// Source of the bearer token attached to each delivery.
///
/// The token is obtained again for every request so that short-lived
/// service-account tokens stay fresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TokenSource {
    /// Send requests without an `Authorization` header
    None,
    /// Read an environment variable
    Env { var: String },
    /// Read a file, trimming surrounding whitespace
    File { path: PathBuf },
    /// Run a program and use its trimmed stdout,
    /// e.g. `gcloud auth print-identity-token`
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl Default for TokenSource {
    fn default() -> Self {
        Self::Env {
            var: DEFAULT_TOKEN_VAR.to_string(),
        }
    }
}

impl TokenSource {
    /// Obtain a fresh token, `None` when no authorization is configured
    pub async fn fetch(&self) -> Result<Option<String>> {
        let token = match self {
            Self::None => return Ok(None),
            Self::Env { var } => std::env::var(var).map_err(|_| {
                PostwatchError::Config(format!("Token variable {} is not set", var))
            })?,
            Self::File { path } => tokio::fs::read_to_string(path).await?,
            Self::Command { program, args } => {
                let output = Command::new(program).args(args).output().await?;
                if !output.status.success() {
                    return Err(PostwatchError::Other(format!(
                        "Token command {} exited with {}: {}",
                        program,
                        output.status,
                        String::from_utf8_lossy(&output.stderr).trim()
                    )));
                }
                String::from_utf8_lossy(&output.stdout).into_owned()
            }
        };

        let token = token.trim();
        if token.is_empty() {
            return Err(PostwatchError::Config("Token source produced an empty token".into()));
        }
        Ok(Some(token.to_string()))
    }
}
