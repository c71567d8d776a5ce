//! Repository list input
//!
//! Every `*.csv` file in the input directory is a repository list. The
//! header row names the columns: rows are identified by `ProjectID`
//! (composite identifier) when that column exists, otherwise by `URL`.

use crate::domain::{identifier_from_output, RepoRef};
use crate::error::InputError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

const URL_COLUMN: &str = "URL";
const PROJECT_ID_COLUMN: &str = "ProjectID";

/// Rows kept per file in debug mode
pub const DEBUG_ROW_LIMIT: usize = 10;

/// How rows are filtered before scheduling
#[derive(Debug, Clone, Default)]
pub struct InputOptions {
    /// Keep only the first [`DEBUG_ROW_LIMIT`] schedulable rows per file
    pub debug: bool,
    /// Identifiers with a persisted result; matching rows are not scheduled
    pub completed: HashSet<String>,
}

/// Repositories read from one list file
#[derive(Debug, Clone, Default)]
pub struct RepoList {
    pub path: PathBuf,
    /// Repositories to schedule
    pub repos: Vec<RepoRef>,
    /// GitHub rows considered, including rows excluded as completed
    pub total: usize,
    /// Rows not hosted on GitHub
    pub skipped_hosts: usize,
    /// Identifiers that resolved without a namespace, with their URL
    pub invalid_urls: Vec<(String, String)>,
}

/// All `*.csv` files of `dir`, sorted by path
pub fn list_sources(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let entries = fs::read_dir(dir).map_err(|e| InputError::read_error(dir, e))?;

    let mut sources = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| InputError::read_error(dir, e))?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("csv") {
            sources.push(path);
        }
    }
    sources.sort();
    Ok(sources)
}

/// Read one repository list
pub fn read_repo_list(path: &Path, options: &InputOptions) -> Result<RepoList, InputError> {
    let text = fs::read_to_string(path).map_err(|e| InputError::read_error(path, e))?;
    let mut records = parse_csv(&text).into_iter();

    let header = records.next().unwrap_or_default();
    let column = |name: &str| header.iter().position(|h| h.trim() == name);
    let (index, by_identifier) = match (column(PROJECT_ID_COLUMN), column(URL_COLUMN)) {
        (Some(index), _) => (index, true),
        (None, Some(index)) => (index, false),
        (None, None) => {
            return Err(InputError::MissingColumn {
                path: path.to_path_buf(),
            })
        }
    };

    let mut list = RepoList {
        path: path.to_path_buf(),
        ..Default::default()
    };

    for record in records {
        let Some(value) = record.get(index).map(|v| v.trim()).filter(|v| !v.is_empty()) else {
            continue;
        };

        let repo = if by_identifier {
            let (repo, resolved) = RepoRef::from_identifier(value);
            if resolved.probably_invalid {
                list.invalid_urls.push((value.to_string(), resolved.url));
            }
            repo
        } else {
            RepoRef::from_url(value)
        };

        if !repo.is_github() {
            list.skipped_hosts += 1;
            continue;
        }
        let completed = options.completed.contains(&completion_key(&repo));
        // The debug limit applies to scheduled rows, after completed ones are excluded
        if options.debug && !completed && list.repos.len() >= DEBUG_ROW_LIMIT {
            break;
        }
        list.total += 1;

        if completed {
            continue;
        }
        list.repos.push(repo);
    }

    tracing::debug!(
        path = %path.display(),
        scheduled = list.repos.len(),
        total = list.total,
        skipped_hosts = list.skipped_hosts,
        "Repository list read"
    );
    Ok(list)
}

/// Identifier under which a repository's result file is recognized
pub fn completion_key(repo: &RepoRef) -> String {
    identifier_from_output(&repo.output_stem())
}

/// Split CSV text into records
///
/// Fields may be quoted; quoted fields can contain separators, newlines
/// and doubled quotes. Blank lines are skipped.
pub fn parse_csv(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                push_record(&mut records, std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        push_record(&mut records, record);
    }
    records
}

fn push_record(records: &mut Vec<Vec<String>>, record: Vec<String>) {
    let blank = record.len() == 1 && record[0].trim().is_empty();
    if !blank {
        records.push(record);
    }
}
