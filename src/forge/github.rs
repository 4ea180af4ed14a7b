use log::trace;
use reqwest::{
    header::{HeaderMap, HeaderValue, InvalidHeaderValue, ACCEPT, AUTHORIZATION},
    Client, StatusCode,
};
use serde::Deserialize;
use thiserror::Error;

use super::{CommitFetchError, CommitSource, Page, RemoteCommit, RepositorySlug};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Authenticated client for the GitHub REST API.
pub struct GitHubClient {
    http: Client,
    api_url: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
    commit: CommitDetails,
}

#[derive(Deserialize)]
struct CommitDetails {
    message: String,
}

impl From<CommitResponse> for RemoteCommit {
    fn from(response: CommitResponse) -> Self {
        RemoteCommit {
            sha: response.sha,
            message: response.commit.message,
        }
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("the GitHub token is not a valid header value")]
    InvalidToken(#[from] InvalidHeaderValue),
    #[error("failed to build the HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

impl GitHubClient {
    pub fn new(api_url: &str, token: &str) -> Result<GitHubClient, ClientError> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {token}"))?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(GitHubClient {
            http,
            api_url: api_url.trim_end_matches('/').to_owned(),
        })
    }

    fn commits_url(&self, repository: &RepositorySlug) -> String {
        format!(
            "{}/repos/{}/{}/commits",
            self.api_url, repository.owner, repository.repo
        )
    }
}

impl CommitSource for GitHubClient {
    async fn list_commits(
        &self,
        repository: &RepositorySlug,
        from_revision: &str,
        page: Page,
    ) -> Result<Vec<RemoteCommit>, CommitFetchError> {
        let url = self.commits_url(repository);
        trace!(
            "GET {} sha={} page={} per_page={}",
            url,
            from_revision,
            page.number,
            page.per_page
        );

        let response = self
            .http
            .get(&url)
            .query(&[
                ("sha", from_revision.to_owned()),
                ("page", page.number.to_string()),
                ("per_page", page.per_page.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let remaining = header_str(response.headers(), "x-ratelimit-remaining");
            let reset = header_str(response.headers(), "x-ratelimit-reset")
                .and_then(|reset| reset.parse().ok());
            let rate_limited = remaining.as_deref() == Some("0");
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(
                status,
                rate_limited,
                reset,
                repository,
                from_revision,
                body,
            ));
        }

        let commits: Vec<CommitResponse> = response.json().await?;
        Ok(commits.into_iter().map(RemoteCommit::from).collect())
    }
}

fn header_str(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
}

fn status_error(
    status: StatusCode,
    rate_limited: bool,
    reset: Option<u64>,
    repository: &RepositorySlug,
    revision: &str,
    body: String,
) -> CommitFetchError {
    match status {
        StatusCode::UNAUTHORIZED => CommitFetchError::Unauthorized,
        StatusCode::FORBIDDEN if rate_limited => CommitFetchError::RateLimited { reset },
        StatusCode::TOO_MANY_REQUESTS => CommitFetchError::RateLimited { reset },
        StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY => CommitFetchError::NotFound {
            repository: repository.to_string(),
            revision: revision.to_owned(),
        },
        status => CommitFetchError::Status { status, body },
    }
}
