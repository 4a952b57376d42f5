//! engine::find
//!
//! Locate a branch across repositories without touching the network.

use super::cases::BranchInventory;
use super::outcome::SearchResult;
use crate::core::types::BranchName;
use crate::git::{GitError, RepoHandle};

/// List the branches in one repository whose short name is `target`.
pub async fn find(handle: RepoHandle, target: &BranchName) -> Result<SearchResult, GitError> {
    let names = handle.list_branches().await?;
    let inventory = BranchInventory::from_names(names);
    Ok(SearchResult {
        repo_name: handle.name().to_string(),
        branches: inventory.matching(target.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::repolist::RepoInfo;
    use crate::git::mock::MockRunner;
    use crate::git::CommandResult;
    use std::sync::Arc;

    async fn open(mock: &MockRunner) -> RepoHandle {
        RepoHandle::open(
            Arc::new(RepoInfo::new("/code/gamma", "gamma")),
            Arc::new(mock.clone()),
        )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn reports_local_and_remote_matches() {
        let mock = MockRunner::new().with_repo_state("main", &["origin"]);
        mock.respond(
            "branch -a -l",
            CommandResult::success([
                "* main",
                "release-9",
                "remotes/origin/HEAD -> origin/main",
                "remotes/origin/release-9",
                "remotes/origin/release-10",
            ]),
        );

        let result = find(open(&mock).await, &BranchName::new("release-9").unwrap())
            .await
            .unwrap();
        assert_eq!(result.repo_name, "gamma");
        assert_eq!(
            result.branches,
            vec!["release-9", "remotes/origin/release-9"],
        );
        let calls = mock.calls_in("/code/gamma");
        assert!(!calls.iter().any(|c| c.starts_with("remote update")));
    }

    #[tokio::test]
    async fn nothing_matching() {
        let mock = MockRunner::new().with_repo_state("main", &["origin"]);
        mock.respond("branch -a -l", CommandResult::success(["* main"]));
        let result = find(open(&mock).await, &BranchName::new("nope").unwrap())
            .await
            .unwrap();
        assert!(!result.found());
    }

    #[tokio::test]
    async fn listing_failure_propagates() {
        let mock = MockRunner::new().with_repo_state("main", &["origin"]);
        let err = find(open(&mock).await, &BranchName::new("x").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, GitError::CommandFailed { code: 128, .. }));
    }
}
