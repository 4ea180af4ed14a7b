use log::debug;

use crate::forge::{CommitFetchError, CommitSource, Page, RemoteCommit, RepositorySlug};

const MERGE_PREFIX: &str = "Merge pull request";
const MAX_MESSAGE_CHARS: usize = 120;
const SHORT_SHA_LEN: usize = 8;

/// Upper bound the GitHub API accepts for `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    pub per_page: u32,
    /// Pages inspected before giving up on finding the stop revision.
    pub max_pages: u32,
}

impl Default for ListOptions {
    fn default() -> Self {
        ListOptions {
            per_page: MAX_PER_PAGE,
            max_pages: 1,
        }
    }
}

/// Formatted commit lines of one repository, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRange {
    pub lines: Vec<String>,
    /// `false` when the walk ran out of pages before reaching the stop revision.
    pub stop_found: bool,
}

/// Lists commits reachable from `from_revision` until one whose sha starts
/// with `to_revision`, which is excluded together with everything older.
///
/// Merge commits created by pull requests are skipped.
pub async fn list_commits<S: CommitSource>(
    source: &S,
    repository: &RepositorySlug,
    from_revision: &str,
    to_revision: &str,
    options: ListOptions,
) -> Result<CommitRange, CommitFetchError> {
    let per_page = options.per_page.clamp(1, MAX_PER_PAGE);
    let mut range = CommitRange::default();

    for number in 1..=options.max_pages.max(1) {
        let commits = source
            .list_commits(repository, from_revision, Page { number, per_page })
            .await?;
        debug!(
            "Fetched {} commits of {} (page {})",
            commits.len(),
            repository,
            number
        );
        let exhausted = commits.len() < per_page as usize;

        for commit in &commits {
            // An empty stop revision (local replacement) never matches.
            if !to_revision.is_empty() && commit.sha.starts_with(to_revision) {
                range.stop_found = true;
                return Ok(range);
            }
            if commit.message.starts_with(MERGE_PREFIX) {
                continue;
            }
            range.lines.push(format_commit(repository, commit));
        }

        if exhausted {
            break;
        }
    }

    Ok(range)
}

fn format_commit(repository: &RepositorySlug, commit: &RemoteCommit) -> String {
    let short_sha = commit.sha.get(..SHORT_SHA_LEN).unwrap_or(commit.sha.as_str());
    format!(
        "{}@{}: {}",
        repository,
        short_sha,
        sanitize_message(&commit.message)
    )
}

/// First line of a commit message, trimmed and cut to 120 characters.
pub fn sanitize_message(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or_default().trim();
    match first_line.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((end, _)) => first_line[..end].to_owned(),
        None => first_line.to_owned(),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use super::*;

    use pretty_assertions::assert_eq;

    /// In-memory history keyed by repository, serving pages like the API does.
    #[derive(Default)]
    pub(crate) struct FakeSource {
        pub histories: HashMap<String, Vec<RemoteCommit>>,
        pub requests: RefCell<Vec<(String, String, Page)>>,
    }

    impl FakeSource {
        pub fn with_history(mut self, repository: &str, commits: Vec<RemoteCommit>) -> Self {
            self.histories.insert(repository.to_owned(), commits);
            self
        }
    }

    impl CommitSource for FakeSource {
        async fn list_commits(
            &self,
            repository: &RepositorySlug,
            from_revision: &str,
            page: Page,
        ) -> Result<Vec<RemoteCommit>, CommitFetchError> {
            self.requests
                .borrow_mut()
                .push((repository.to_string(), from_revision.to_owned(), page));
            let history = self
                .histories
                .get(&repository.to_string())
                .ok_or_else(|| CommitFetchError::NotFound {
                    repository: repository.to_string(),
                    revision: from_revision.to_owned(),
                })?;
            let start = history
                .iter()
                .position(|commit| commit.sha.starts_with(from_revision))
                .ok_or_else(|| CommitFetchError::NotFound {
                    repository: repository.to_string(),
                    revision: from_revision.to_owned(),
                })?;
            Ok(history[start..]
                .iter()
                .skip(((page.number - 1) * page.per_page) as usize)
                .take(page.per_page as usize)
                .cloned()
                .collect())
        }
    }

    fn sha(n: u32) -> String {
        format!("{n:x}{}", "a".repeat(39))
    }

    fn history(count: u32) -> Vec<RemoteCommit> {
        (0..count)
            .rev()
            .map(|n| RemoteCommit::new(sha(n), format!("Commit {n}\n\nbody")))
            .collect()
    }

    fn repo() -> RepositorySlug {
        RepositorySlug::new("owner", "repo")
    }

    #[tokio::test]
    async fn stops_before_the_previous_revision() {
        let source = FakeSource::default().with_history(
            "owner/repo",
            vec![
                RemoteCommit::new("cccccccc11111111", "Fix the thing\n\nDetails"),
                RemoteCommit::new("bbbbbbbb22222222", "Merge pull request #12 from a/b"),
                RemoteCommit::new("aaaaaaaa33333333", "  Add the thing  "),
                RemoteCommit::new("99999999444444444", "Older"),
                RemoteCommit::new("88888888555555555", "Even older"),
            ],
        );

        let range = list_commits(
            &source,
            &repo(),
            "cccccccc1111",
            "999999994444",
            ListOptions::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            range,
            CommitRange {
                lines: vec![
                    "owner/repo@cccccccc: Fix the thing".to_owned(),
                    "owner/repo@aaaaaaaa: Add the thing".to_owned(),
                ],
                stop_found: true,
            }
        );
    }

    #[tokio::test]
    async fn single_page_without_stop_revision_is_reported() {
        let source = FakeSource::default().with_history("owner/repo", history(10));
        let options = ListOptions {
            per_page: 3,
            max_pages: 1,
        };

        let range = list_commits(&source, &repo(), &sha(9), &sha(2)[..12], options)
            .await
            .unwrap();

        assert!(!range.stop_found);
        assert_eq!(range.lines.len(), 3);
        assert_eq!(source.requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn follows_pages_until_stop_revision() {
        let source = FakeSource::default().with_history("owner/repo", history(10));
        let options = ListOptions {
            per_page: 3,
            max_pages: 5,
        };

        let range = list_commits(&source, &repo(), &sha(9), &sha(2)[..12], options)
            .await
            .unwrap();

        assert!(range.stop_found);
        assert_eq!(range.lines.len(), 7);
        assert_eq!(range.lines[6], format!("owner/repo@{}: Commit 3", &sha(3)[..8]));
        let pages: Vec<u32> = source
            .requests
            .borrow()
            .iter()
            .map(|(_, _, page)| page.number)
            .collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn short_page_ends_history() {
        let source = FakeSource::default().with_history("owner/repo", history(4));
        let options = ListOptions {
            per_page: 3,
            max_pages: 10,
        };

        let range = list_commits(&source, &repo(), &sha(3), "ffffffff", options)
            .await
            .unwrap();

        assert!(!range.stop_found);
        assert_eq!(range.lines.len(), 4);
        assert_eq!(source.requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn empty_stop_revision_is_never_found() {
        let source = FakeSource::default().with_history("owner/repo", history(4));
        let options = ListOptions {
            per_page: 10,
            max_pages: 1,
        };

        let range = list_commits(&source, &repo(), &sha(3), "", options)
            .await
            .unwrap();

        assert!(!range.stop_found);
        assert_eq!(range.lines.len(), 4);
        assert_eq!(range.lines[0], format!("owner/repo@{}: Commit 3", &sha(3)[..8]));
    }

    #[tokio::test]
    async fn propagates_fetch_errors() {
        let source = FakeSource::default();
        let error = list_commits(&source, &repo(), "abc", "def", ListOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(error, CommitFetchError::NotFound { .. }));
    }

    #[test]
    fn sanitizes_messages() {
        assert_eq!(sanitize_message("  subject  \n\nbody\n"), "subject");
        assert_eq!(sanitize_message("subject\r\nbody"), "subject");
        assert_eq!(sanitize_message(""), "");
        assert_eq!(sanitize_message("\nsecond line"), "");

        let long = "x".repeat(300);
        assert_eq!(sanitize_message(&long), "x".repeat(120));

        let wide = "é".repeat(130);
        let sanitized = sanitize_message(&wide);
        assert_eq!(sanitized.chars().count(), 120);
        assert!(!sanitized.contains('\n'));
    }

    #[test]
    fn short_sha_tolerates_abbreviated_ids() {
        assert_eq!(
            format_commit(&repo(), &RemoteCommit::new("abc", "msg")),
            "owner/repo@abc: msg"
        );
    }
}
