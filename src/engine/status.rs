//! engine::status
//!
//! Read-only comparison of each repository's HEAD with its upstream.
//!
//! Never stashes, checks out or rebases. The only write is the remote
//! update that refreshes remote-tracking refs.

use super::cases::select_remote;
use super::outcome::{Status, WorkflowResult};
use crate::core::config::Config;
use crate::git::{GitError, RepoHandle};

/// Run the status workflow on one repository.
pub async fn status(handle: RepoHandle, config: &Config) -> WorkflowResult {
    let name = handle.name().to_string();
    let branch = handle.display_branch().to_string();
    let failed = |detail: String| WorkflowResult::failed(&name, format!("[{}] {}", branch, detail));

    let Some(remote) = select_remote(handle.remotes(), config.remote.as_str()) else {
        return failed(format!("no suitable remote (wanted {})", config.remote));
    };
    if let Err(err) = handle.update_remote(&[remote]).await {
        return failed(err.to_string());
    }

    let local = match handle.resolve_object("HEAD").await {
        Ok(hash) => hash,
        Err(err) => return failed(err.to_string()),
    };

    if handle.is_detached() {
        return WorkflowResult::new(
            &name,
            Status::Current,
            format!("[{}]: [{}] no upstream", branch, local),
        );
    }

    match handle.resolve_upstream(handle.branch()).await {
        Ok(upstream) if upstream == local => {
            WorkflowResult::new(&name, Status::Current, format!("[{}]: [{}]", branch, local))
        }
        Ok(upstream) => WorkflowResult::new(
            &name,
            Status::Behind,
            format!("[{}]: [{}]<->[{}]", branch, local, upstream),
        ),
        Err(GitError::NoUpstream { .. }) => WorkflowResult::new(
            &name,
            Status::Current,
            format!("[{}]: [{}] no upstream", branch, local),
        ),
        Err(err) => failed(err.to_string()),
    }
}
