//! Language detection through `github-linguist --json`

use super::LanguageDetector;
use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

/// Languages at or below this percentage are dropped
pub const LANGUAGE_THRESHOLD: f64 = 10.0;

const LINGUIST: &str = "github-linguist";

/// Runs `github-linguist` inside the working copy
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubLinguist;

#[async_trait]
impl LanguageDetector for GithubLinguist {
    async fn detect(&self, workdir: &Path) -> Result<Vec<String>, FetchError> {
        let output = Command::new(LINGUIST)
            .arg("--json")
            .current_dir(workdir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| FetchError::tool(LINGUIST, e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_linguist_output(&stdout, LANGUAGE_THRESHOLD)
            .map_err(|e| FetchError::tool(LINGUIST, e))
    }
}

/// Extract lowercased language names above `threshold` percent
///
/// Linguist reports percentages as strings (`"85.00"`); numbers are
/// accepted too.
pub fn parse_linguist_output(output: &str, threshold: f64) -> Result<Vec<String>, String> {
    let value: Value =
        serde_json::from_str(output).map_err(|e| format!("invalid linguist output: {}", e))?;
    let Value::Object(languages) = value else {
        return Err("linguist output is not an object".to_string());
    };

    let mut detected = Vec::new();
    for (name, stats) in &languages {
        let percentage = match stats.get("percentage") {
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            Some(Value::Number(n)) => n.as_f64(),
            _ => None,
        };
        if percentage.is_some_and(|p| p > threshold) {
            detected.push(name.to_lowercase());
        }
    }
    detected.sort();
    Ok(detected)
}
