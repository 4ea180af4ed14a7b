use std::{
    fmt::{Display, Formatter},
    sync::OnceLock,
};

use regex_lite::Regex;
use thiserror::Error;

pub mod github;

/// Owner and repository name on the code hosting service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySlug {
    pub owner: String,
    pub repo: String,
}

impl RepositorySlug {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepositorySlug {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl Display for RepositorySlug {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
#[error("cannot derive a GitHub owner/repository from `{path}`")]
pub struct UnresolvableRepository {
    pub path: String,
}

/// A commit as reported by the hosting API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCommit {
    pub sha: String,
    pub message: String,
}

impl RemoteCommit {
    pub fn new(sha: impl Into<String>, message: impl Into<String>) -> Self {
        RemoteCommit {
            sha: sha.into(),
            message: message.into(),
        }
    }
}

/// 1-based page of a history listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: u32,
    pub per_page: u32,
}

#[derive(Error, Debug)]
pub enum CommitFetchError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("the GitHub token was rejected")]
    Unauthorized,
    #[error(
        "API rate limit exceeded, resets at {}",
        .reset.map_or_else(|| "an unknown time".to_owned(), |reset| format!("unix time {reset}"))
    )]
    RateLimited { reset: Option<u64> },
    #[error("repository {repository} or revision {revision} not found")]
    NotFound {
        repository: String,
        revision: String,
    },
    #[error("unexpected response status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Lists history starting at a revision, newest first, following parents.
#[allow(async_fn_in_trait)]
pub trait CommitSource {
    async fn list_commits(
        &self,
        repository: &RepositorySlug,
        from_revision: &str,
        page: Page,
    ) -> Result<Vec<RemoteCommit>, CommitFetchError>;
}

enum VanityRule {
    /// `<prefix><repo>` maps to `<owner>/<repo>`.
    Owner(&'static str),
    /// The path maps to a fixed repository.
    Fixed(&'static str, &'static str),
}

const VANITY_HOSTS: &[(&str, VanityRule)] = &[
    ("golang.org/x/", VanityRule::Owner("golang")),
    ("sigs.k8s.io/", VanityRule::Owner("kubernetes-sigs")),
    ("k8s.io/", VanityRule::Owner("kubernetes")),
    ("go.uber.org/", VanityRule::Owner("uber-go")),
    ("go.etcd.io/", VanityRule::Owner("etcd-io")),
    ("mvdan.cc/", VanityRule::Owner("mvdan")),
    ("google.golang.org/grpc", VanityRule::Fixed("grpc", "grpc-go")),
    (
        "google.golang.org/protobuf",
        VanityRule::Fixed("protocolbuffers", "protobuf-go"),
    ),
    (
        "google.golang.org/genproto",
        VanityRule::Fixed("googleapis", "go-genproto"),
    ),
    (
        "google.golang.org/api",
        VanityRule::Fixed("googleapis", "google-api-go-client"),
    ),
    (
        "cloud.google.com/go",
        VanityRule::Fixed("googleapis", "google-cloud-go"),
    ),
    (
        "go.opencensus.io",
        VanityRule::Fixed("census-instrumentation", "opencensus-go"),
    ),
    (
        "go.mongodb.org/mongo-driver",
        VanityRule::Fixed("mongodb", "mongo-go-driver"),
    ),
    ("honnef.co/go/tools", VanityRule::Fixed("dominikh", "go-tools")),
    ("gotest.tools", VanityRule::Fixed("gotestyourself", "gotest.tools")),
];

fn major_version_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/v[0-9]+$").expect("valid major version regex"))
}

fn gopkg_path() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^gopkg\.in/(?:(?P<owner>[^/.]+)/)?(?P<repo>[^/.]+)\.v[0-9]+(?:/|$)")
            .expect("valid gopkg.in regex")
    })
}

/// Maps a module path to the GitHub repository hosting it.
///
/// Paths under `github.com` map directly, well-known vanity import hosts are
/// translated to the repository behind them, and `gopkg.in` paths follow the
/// gopkg.in naming convention. Local replacement paths never resolve.
pub fn resolve_repository(path: &str) -> Result<RepositorySlug, UnresolvableRepository> {
    let unresolvable = || UnresolvableRepository {
        path: path.to_owned(),
    };

    let normalized = path.trim();
    let normalized = normalized
        .strip_prefix("https://")
        .or_else(|| normalized.strip_prefix("http://"))
        .unwrap_or(normalized);
    let normalized = normalized.strip_suffix(".git").unwrap_or(normalized);
    let normalized = major_version_suffix().replace(normalized, "");
    let normalized: &str = &normalized;

    if let Some(captures) = gopkg_path().captures(normalized) {
        let repo = &captures["repo"];
        let owner = captures
            .name("owner")
            .map(|owner| owner.as_str().to_owned())
            .unwrap_or_else(|| format!("go-{repo}"));
        return Ok(RepositorySlug::new(owner, repo));
    }

    if let Some(rest) = normalized.strip_prefix("github.com/") {
        let mut segments = rest.split('/');
        return match (segments.next(), segments.next()) {
            (Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
                Ok(RepositorySlug::new(owner, repo))
            }
            _ => Err(unresolvable()),
        };
    }

    for (prefix, rule) in VANITY_HOSTS {
        let Some(rest) = normalized.strip_prefix(prefix) else {
            continue;
        };
        match rule {
            VanityRule::Owner(owner) => {
                if let Some(repo) = rest.split('/').next().filter(|repo| !repo.is_empty()) {
                    return Ok(RepositorySlug::new(*owner, repo));
                }
            }
            VanityRule::Fixed(owner, repo) if rest.is_empty() || rest.starts_with('/') => {
                return Ok(RepositorySlug::new(*owner, *repo));
            }
            VanityRule::Fixed(..) => {}
        }
    }

    Err(unresolvable())
}
