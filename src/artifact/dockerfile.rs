//! Container-file (Dockerfile) analysis
//!
//! Parsing is behind the [`DockerfileParser`] trait; [`InstructionParser`]
//! is the built-in line-oriented implementation. Analysis extracts the base
//! image, the final `CMD`, keyword summaries and one tag per category.

use crate::domain::Tags;
use crate::taxonomy::{keywords, match_one, match_ones, words, CategoryKind, Taxonomy};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use thiserror::Error;

/// Number of keywords kept for `RUN` and `CMD` summaries
const KEYWORD_COUNT: usize = 5;

static INSTRUCTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)(?:\s+(.*))?$").unwrap());

/// One parsed container-file instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DockerCommand {
    /// Instruction keyword, lowercased
    pub instruction: String,
    /// Instruction arguments
    pub values: Vec<String>,
}

impl DockerCommand {
    /// Create a command
    pub fn new(instruction: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            instruction: instruction.into().to_lowercase(),
            values,
        }
    }
}

/// Container-file parse failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DockerfileError {
    /// A line does not start with an instruction keyword
    #[error("line {line}: expected an instruction")]
    InvalidLine { line: usize },

    /// An instruction that needs arguments has none
    #[error("line {line}: {instruction} requires at least one argument")]
    MissingArguments { line: usize, instruction: String },
}

/// Turns container-file text into instructions
pub trait DockerfileParser: Send + Sync {
    /// Parse the full file text
    fn parse(&self, content: &str) -> Result<Vec<DockerCommand>, DockerfileError>;
}

/// Line-oriented parser handling comments, `\` continuations and the JSON
/// exec form
#[derive(Debug, Clone, Copy, Default)]
pub struct InstructionParser;

impl DockerfileParser for InstructionParser {
    fn parse(&self, content: &str) -> Result<Vec<DockerCommand>, DockerfileError> {
        let mut commands = Vec::new();
        let mut pending = String::new();
        let mut start_line = 0;

        for (idx, raw) in content.lines().enumerate() {
            let line = raw.trim();
            // Blank lines never end a continuation
            if line.starts_with('#') || line.is_empty() {
                continue;
            }
            if pending.is_empty() {
                start_line = idx + 1;
            }

            match line.strip_suffix('\\') {
                Some(head) => {
                    pending.push_str(head.trim_end());
                    pending.push(' ');
                }
                None => {
                    pending.push_str(line);
                    commands.push(parse_instruction(pending.trim(), start_line)?);
                    pending.clear();
                }
            }
        }

        if !pending.trim().is_empty() {
            commands.push(parse_instruction(pending.trim(), start_line)?);
        }
        Ok(commands)
    }
}

fn parse_instruction(text: &str, line: usize) -> Result<DockerCommand, DockerfileError> {
    let caps = INSTRUCTION_RE
        .captures(text)
        .ok_or(DockerfileError::InvalidLine { line })?;
    let instruction = caps[1].to_lowercase();
    let args = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();

    if args.is_empty() {
        return Err(DockerfileError::MissingArguments { line, instruction });
    }

    let values = if args.starts_with('[') {
        serde_json::from_str::<Vec<String>>(args).unwrap_or_else(|_| vec![args.to_string()])
    } else if instruction == "from" {
        let image: Vec<String> = args
            .split_whitespace()
            .skip_while(|token| token.starts_with("--"))
            .map(str::to_string)
            .collect();
        if image.is_empty() {
            return Err(DockerfileError::MissingArguments { line, instruction });
        }
        image
    } else {
        vec![args.to_string()]
    };

    Ok(DockerCommand::new(instruction, values))
}

/// Analysis of one container file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerFileAnalysis {
    /// Path relative to the repository root
    pub path: String,
    /// Final `CMD`, joined
    pub cmd: String,
    /// Most frequent words of the `CMD`
    pub cmd_keywords: Vec<String>,
    /// Base image of the last stage without its tag
    pub from: String,
    /// Base image as declared
    pub from_full: String,
    /// Most frequent words across all `RUN` instructions
    pub keywords: Vec<String>,
    /// One tag per category at most
    #[serde(flatten)]
    pub tags: Tags,
}

/// Analyzes container files against a taxonomy
#[derive(Clone)]
pub struct ContainerFileAnalyzer {
    taxonomy: Arc<Taxonomy>,
    parser: Arc<dyn DockerfileParser>,
}

impl ContainerFileAnalyzer {
    /// Create an analyzer using the given parser
    pub fn new(taxonomy: Arc<Taxonomy>, parser: Arc<dyn DockerfileParser>) -> Self {
        Self { taxonomy, parser }
    }

    /// Analyze a container file; unreadable content yields an analysis
    /// holding only the path
    pub fn analyze(&self, path: &str, content: &[u8]) -> ContainerFileAnalysis {
        let mut analysis = ContainerFileAnalysis {
            path: path.to_string(),
            ..Default::default()
        };

        let text = String::from_utf8_lossy(content);
        let commands = match self.parser.parse(&text) {
            Ok(commands) => commands,
            Err(e) => {
                tracing::debug!(path, error = %e, "Container file unavailable");
                return analysis;
            }
        };

        self.analyze_commands(&mut analysis, &commands);
        analysis
    }

    /// Fill an analysis from already-parsed instructions
    pub fn analyze_commands(&self, analysis: &mut ContainerFileAnalysis, commands: &[DockerCommand]) {
        let mut runs = String::new();
        for command in commands {
            match command.instruction.as_str() {
                "from" => {
                    if let Some(image) = command.values.first() {
                        analysis.from = image.split(':').next().unwrap_or_default().to_string();
                        analysis.from_full = image.clone();
                    }
                }
                "run" => {
                    runs.push_str(&command.values.join(" "));
                    runs.push(' ');
                }
                "cmd" => {
                    analysis.cmd = command.values.join(" ");
                    analysis.cmd_keywords = keywords(&analysis.cmd, KEYWORD_COUNT);
                }
                _ => {}
            }
        }
        analysis.keywords = keywords(&runs, KEYWORD_COUNT);

        let from_words = words(&analysis.from);
        let cmd_words = words(&analysis.cmd);
        let run_words = words(&runs);
        for kind in CategoryKind::all() {
            let category = self.taxonomy.category(*kind);
            let tag = match_one(&analysis.from, category)
                .or_else(|| match_ones(&from_words, category))
                .or_else(|| match_ones(&cmd_words, category))
                .or_else(|| match_ones(&run_words, category));
            if let Some(tag) = tag {
                analysis.tags.insert(*kind, tag);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> ContainerFileAnalyzer {
        let taxonomy = Taxonomy::from_words([
            (CategoryKind::Langs, &["java", "node", "python"][..]),
            (CategoryKind::Servers, &["tomcat", "express", "gunicorn"][..]),
            (CategoryKind::Dbs, &["postgres", "redis"][..]),
        ]);
        ContainerFileAnalyzer::new(Arc::new(taxonomy), Arc::new(InstructionParser))
    }

    #[test]
    fn test_parser_handles_continuations_and_comments() {
        let content = "# syntax\nFROM node:14 AS build\nRUN apt-get update && \\\n    apt-get install -y curl\nCMD [\"node\", \"server.js\"]\n";
        let commands = InstructionParser.parse(content).unwrap();
        assert_eq!(commands.len(), 3);
        assert_eq!(commands[0].instruction, "from");
        assert_eq!(commands[0].values, vec!["node:14", "AS", "build"]);
        assert_eq!(
            commands[1].values,
            vec!["apt-get update && apt-get install -y curl"]
        );
        assert_eq!(commands[2].values, vec!["node", "server.js"]);
    }

    #[test]
    fn test_parser_continuation_spans_blank_line() {
        let content = "FROM node:18\nRUN apt-get update && \\\n\n    apt-get install -y curl\n";
        let commands = InstructionParser.parse(content).unwrap();
        assert_eq!(commands.len(), 2);
        assert_eq!(
            commands[1].values,
            vec!["apt-get update && apt-get install -y curl"]
        );

        let analysis = analyzer().analyze("/Dockerfile", content.as_bytes());
        assert_eq!(analysis.from, "node");
        assert_eq!(analysis.keywords[0], "apt");
    }

    #[test]
    fn test_from_flags_are_skipped() {
        let commands = InstructionParser
            .parse("FROM --platform=linux/amd64 node:18 AS build\n")
            .unwrap();
        assert_eq!(commands[0].values, vec!["node:18", "AS", "build"]);

        let analysis = analyzer().analyze("/Dockerfile", b"FROM --platform=$BUILDPLATFORM node:18\n");
        assert_eq!(analysis.from, "node");
        assert_eq!(analysis.from_full, "node:18");
        assert!(analysis.tags.langs.contains("node"));

        let err = InstructionParser.parse("FROM --platform=linux/amd64\n").unwrap_err();
        assert!(matches!(err, DockerfileError::MissingArguments { line: 1, .. }));
    }

    #[test]
    fn test_parser_rejects_missing_arguments() {
        let err = InstructionParser.parse("FROM\n").unwrap_err();
        assert!(matches!(err, DockerfileError::MissingArguments { line: 1, .. }));
    }

    #[test]
    fn test_parser_rejects_garbage() {
        assert!(InstructionParser.parse("--- nope\n").is_err());
    }

    #[test]
    fn test_analysis_base_image_and_cmd() {
        let content = b"FROM node:14-alpine\nRUN npm install\nRUN npm run build\nCMD npm start\n";
        let analysis = analyzer().analyze("/Dockerfile", content);
        assert_eq!(analysis.from, "node");
        assert_eq!(analysis.from_full, "node:14-alpine");
        assert_eq!(analysis.cmd, "npm start");
        assert_eq!(analysis.cmd_keywords, vec!["npm", "start"]);
        assert_eq!(analysis.keywords[0], "npm");
        assert!(analysis.tags.langs.contains("node"));
    }

    #[test]
    fn test_multi_stage_uses_last_base() {
        let content = b"FROM maven:3 AS build\nRUN mvn package\nFROM tomcat:9\nCMD catalina.sh run\n";
        let analysis = analyzer().analyze("/Dockerfile", content);
        assert_eq!(analysis.from, "tomcat");
        assert!(analysis.tags.servers.contains("tomcat"));
    }

    #[test]
    fn test_tag_falls_back_to_cmd_then_runs() {
        let content = b"FROM ubuntu:20.04\nRUN apt-get install -y python3 redis-server\nCMD gunicorn app:app\n";
        let analysis = analyzer().analyze("/svc/Dockerfile", content);
        assert!(analysis.tags.servers.contains("gunicorn"));
        assert!(analysis.tags.dbs.contains("redis"));
        // "python3" tokenizes to "python"
        assert!(analysis.tags.langs.contains("python"));
    }

    #[test]
    fn test_parse_failure_keeps_only_path() {
        let analysis = analyzer().analyze("/Dockerfile", b"RUN\n");
        assert_eq!(analysis.path, "/Dockerfile");
        assert!(analysis.from.is_empty());
        assert_eq!(analysis.tags, Tags::new());
    }
}
