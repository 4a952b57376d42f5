//! engine::take
//!
//! Move one repository onto a target branch, falling back to master.
//!
//! # Flow
//!
//! 1. Select a remote; without one nothing else runs
//! 2. Stash local changes (best-effort)
//! 3. Update the selected remote
//! 4. List branches and pick a [`Case`]
//! 5. Run that case's evaluator
//!
//! Each evaluator owns the handle for its duration and returns a complete
//! [`WorkflowResult`]. Steps return [`Step`], whose error side is already a
//! finished result, so `?` short-circuits on the first terminal outcome.

use tracing::{debug, warn};

use super::cases::{select_case, select_remote, BranchInventory, Case};
use super::outcome::{Report, Status, WorkflowResult};
use crate::core::config::Config;
use crate::core::types::BranchName;
use crate::git::{GitError, RebaseOutcome, RepoHandle};

/// A workflow step; `Err` carries the terminal result.
type Step<T> = Result<T, WorkflowResult>;

/// Names a case evaluator needs, resolved once per run.
#[derive(Debug, Clone, Copy)]
struct Targets<'a> {
    target: &'a str,
    master: &'a str,
    remote: &'a str,
}

impl Targets<'_> {
    fn tracking(&self, branch: &str) -> String {
        format!("{}/{}", self.remote, branch)
    }
}

/// Run the take workflow on one repository.
pub async fn take(mut handle: RepoHandle, target: &BranchName, config: &Config) -> WorkflowResult {
    let report = Report::new(handle.name(), handle.display_branch());

    let remote = match select_remote(handle.remotes(), config.remote.as_str()) {
        Some(remote) => remote.to_string(),
        None => {
            return report.fail(format!(
                "no suitable remote (has {}, wanted {})",
                describe_remotes(handle.remotes()),
                config.remote
            ))
        }
    };

    if let Err(err) = handle.stash().await {
        warn!(
            repo = %handle.name(),
            error = %err,
            "stash failed, continuing",
        );
    }

    if let Err(err) = handle.update_remote(&[remote.as_str()]).await {
        return report.fail(err);
    }

    let inventory = match handle.list_branches().await {
        Ok(names) => BranchInventory::from_names(names),
        Err(err) => return report.fail(err),
    };

    let targets = Targets {
        target: target.as_str(),
        master: config.master_branch.as_str(),
        remote: &remote,
    };
    let case = select_case(handle.branch(), targets.target, &inventory, targets.remote);
    debug!(
        repo = %handle.name(),
        ?case,
        remote = %remote,
        "selected case",
    );

    let outcome = match case {
        Case::OnTarget => on_target(&handle, targets, report).await,
        Case::LocalTarget => local_target(&mut handle, targets, report).await,
        Case::RemoteTarget => remote_target(&mut handle, targets, report).await,
        Case::NoAccess => no_access(&mut handle, targets, &inventory, report).await,
    };
    match outcome {
        Ok(result) | Err(result) => result,
    }
}

fn describe_remotes(remotes: &[String]) -> String {
    if remotes.is_empty() {
        "none".to_string()
    } else {
        remotes.join(", ")
    }
}

// =============================================================================
// Case evaluators
// =============================================================================

/// Case A: sync the target with its upstream, then with master.
async fn on_target(
    handle: &RepoHandle,
    targets: Targets<'_>,
    mut report: Report,
) -> Step<WorkflowResult> {
    let old = record_head(handle, &mut report).await?;

    let upstream = match handle.resolve_upstream(targets.target).await {
        Ok(hash) => hash,
        Err(GitError::NoUpstream { .. }) => {
            report.note("no remote tracking");
            return Ok(report.conclude(Status::Conflict));
        }
        Err(err) => return Err(report.fail(err)),
    };

    if upstream != old {
        rebase_onto(handle, &targets.tracking(targets.target), &report).await?;
    }
    if targets.target != targets.master {
        rebase_onto(handle, &targets.tracking(targets.master), &report).await?;
    }
    finish(handle, report).await
}

/// Case B: switch to the local target, then proceed as case A.
async fn local_target(
    handle: &mut RepoHandle,
    targets: Targets<'_>,
    mut report: Report,
) -> Step<WorkflowResult> {
    handle
        .checkout_local(targets.target)
        .await
        .map_err(|err| report.fail(err))?;
    report.switched_to(targets.target);
    on_target(handle, targets, report).await
}

/// Case C: create a tracking branch for the target and rebase onto master.
async fn remote_target(
    handle: &mut RepoHandle,
    targets: Targets<'_>,
    mut report: Report,
) -> Step<WorkflowResult> {
    handle
        .checkout_remote_tracking(targets.target, targets.remote)
        .await
        .map_err(|err| report.fail(err))?;
    report.switched_to(targets.target);

    record_head(handle, &mut report).await?;
    rebase_onto(handle, &targets.tracking(targets.master), &report).await?;
    finish(handle, report).await
}

/// Case D: the target is unreachable, so sync master instead.
async fn no_access(
    handle: &mut RepoHandle,
    targets: Targets<'_>,
    inventory: &BranchInventory,
    mut report: Report,
) -> Step<WorkflowResult> {
    let master = targets.master;
    if handle.branch() != master {
        let checkout = if !inventory.has_local(master)
            && inventory.has_remote_tracking(targets.remote, master)
        {
            handle.checkout_remote_tracking(master, targets.remote).await
        } else {
            handle.checkout_local(master).await
        };
        checkout.map_err(|err| report.fail(err))?;
        report.switched_to(master);
    }

    let old = record_head(handle, &mut report).await?;
    let upstream = handle
        .resolve_upstream(master)
        .await
        .map_err(|err| report.fail(err))?;

    if upstream != old {
        rebase_onto(handle, &targets.tracking(master), &report).await?;
    }
    finish(handle, report).await
}

// =============================================================================
// Shared steps
// =============================================================================

async fn record_head(handle: &RepoHandle, report: &mut Report) -> Step<String> {
    let hash = handle
        .resolve_object("HEAD")
        .await
        .map_err(|err| report.fail(err))?;
    report.old_hash(hash.clone());
    Ok(hash)
}

async fn rebase_onto(handle: &RepoHandle, onto: &str, report: &Report) -> Step<()> {
    match handle.rebase(onto).await {
        Ok(RebaseOutcome::Applied) => Ok(()),
        Ok(RebaseOutcome::Conflict) => {
            debug!(repo = %handle.name(), onto, "rebase conflicted");
            Err(report.conclude(Status::Conflict))
        }
        Err(err) => Err(report.fail(err)),
    }
}

async fn finish(handle: &RepoHandle, mut report: Report) -> Step<WorkflowResult> {
    let hash = handle
        .resolve_object("HEAD")
        .await
        .map_err(|err| report.fail(err))?;
    report.new_hash(hash);
    Ok(report.conclude(Status::Passed))
}
