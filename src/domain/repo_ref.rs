//! Repository references and identifier resolution
//!
//! Input rows name repositories either by URL or by a composite identifier
//! `platform_namespace[_rest...]`. Known platform prefixes map to fixed
//! hosts; anything else is treated as a GitHub owner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Known non-GitHub platform prefixes and the host they resolve to
const PLATFORM_HOSTS: &[(&str, &str)] = &[
    ("bitbucket.org", "bitbucket.org"),
    ("gitlab.com", "gitlab.com"),
    ("android.googlesource.com", "android.googlesource.com"),
    ("bioconductor.org", "bioconductor.org"),
    ("drupal.com", "git.drupal.org"),
    ("git.eclipse.org", "git.eclipse.org"),
    ("git.kernel.org", "git.kernel.org"),
    ("git.postgresql.org", "git.postgresql.org"),
    ("git.savannah.gnu.org", "git.savannah.gnu.org"),
    ("git.zx2c4.com", "git.zx2c4.com"),
    ("gitlab.gnome.org", "gitlab.gnome.org"),
    ("kde.org", "anongit.kde.org"),
    ("repo.or.cz", "repo.or.cz"),
    ("salsa.debian.org", "salsa.debian.org"),
    ("sourceforge.net", "git.code.sf.net/p"),
];

const GITHUB_HOST: &str = "github.com";

/// URL prefixes stripped when deriving a repository name from a GitHub URL
const GITHUB_URL_PREFIXES: &[&str] = &[
    "https://github.com/",
    "http://github.com/",
    "git://github.com/",
    "git@github.com:",
];

/// Result of resolving a composite identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    /// Best-effort repository URL
    pub url: String,
    /// True if the identifier lacked a namespace segment
    pub probably_invalid: bool,
}

/// Resolve a composite identifier into a repository URL
pub fn resolve_identifier(identifier: &str) -> ResolvedUrl {
    let mut chunks = identifier.split('_');
    let prefix = chunks.next().unwrap_or_default();
    let rest: Vec<&str> = chunks.collect();

    let (base, path) = match platform_host(prefix) {
        Some(host) => {
            let base = format!("https://{}", host);
            let path = match rest.split_first() {
                Some((namespace, [])) => Some(namespace.to_string()),
                Some((namespace, tail)) => Some(format!("{}/{}", namespace, tail.join("_"))),
                None => None,
            };
            (base, path)
        }
        None => {
            let base = format!("https://{}/{}", GITHUB_HOST, prefix);
            let path = if rest.is_empty() {
                None
            } else {
                Some(rest.join("_"))
            };
            (base, path)
        }
    };

    match path {
        Some(path) => ResolvedUrl {
            url: format!("{}/{}", base, path),
            probably_invalid: false,
        },
        None => ResolvedUrl {
            url: base,
            probably_invalid: true,
        },
    }
}

fn platform_host(prefix: &str) -> Option<&'static str> {
    PLATFORM_HOSTS
        .iter()
        .find(|(known, _)| *known == prefix)
        .map(|(_, host)| *host)
}

/// Sanitize a repository identity into a result file stem
///
/// Path separators become `#`, and so does the first underscore, so that
/// `owner/repo` and the identifier `owner_repo` share one stem.
pub fn sanitize(name: &str) -> String {
    name.replace('/', "#").replacen('_', "#", 1)
}

/// Recover the composite identifier from a result file name
pub fn identifier_from_output(file_name: &str) -> String {
    let stem = file_name.strip_suffix(".json").unwrap_or(file_name);
    let stem = stem.strip_prefix("https://github.com/").unwrap_or(stem);
    stem.replacen('#', "_", 1)
}

/// A repository scheduled for analysis
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoRef {
    /// Repository URL
    pub url: String,
    /// Canonical identity used for result naming and locking
    pub name: String,
}

impl RepoRef {
    /// Create a reference from a URL; the name is the GitHub path
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let name = github_path(&url).unwrap_or_else(|| url.clone());
        Self { url, name }
    }

    /// Create a reference from a composite identifier
    ///
    /// Returns the resolution so callers can log identifiers that were
    /// probably invalid.
    pub fn from_identifier(identifier: &str) -> (Self, ResolvedUrl) {
        let resolved = resolve_identifier(identifier);
        let repo = Self {
            url: resolved.url.clone(),
            name: identifier.to_string(),
        };
        (repo, resolved)
    }

    /// Returns true if the repository is hosted on GitHub
    pub fn is_github(&self) -> bool {
        self.url.contains("github")
    }

    /// Returns the GitHub owner and repository name, if the URL has them
    pub fn github_slug(&self) -> Option<(String, String)> {
        let path = github_path(&self.url)?;
        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                Some((owner.to_string(), repo.to_string()))
            }
            _ => None,
        }
    }

    /// Result file stem for this repository
    pub fn output_stem(&self) -> String {
        sanitize(&self.name)
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn github_path(url: &str) -> Option<String> {
    let rest = GITHUB_URL_PREFIXES
        .iter()
        .find_map(|prefix| url.strip_prefix(prefix))?;
    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);
    Some(rest.to_string())
}
