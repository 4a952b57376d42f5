//! engine::dispatch
//!
//! Fan a workflow out over every repository and collect one result each.
//!
//! # Design
//!
//! One tokio task per repository. Each task opens its own [`RepoHandle`],
//! runs the workflow, and sends `(index, result)` into an mpsc channel sized
//! to the repository count. The dispatcher drains the channel until every
//! sender is gone, then fills any index that never reported (a task that
//! panicked) with a failure. The output therefore always holds exactly one
//! entry per repository, in completion order.
//!
//! # Limits
//!
//! - `jobs` bounds how many workflows run at once (semaphore)
//! - `timeout` bounds each workflow; expiry drops the future, which kills
//!   the in-flight git child
//!
//! Neither is set by default.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Semaphore};
use tracing::{info, warn};

use super::find;
use super::outcome::{SearchResult, WorkflowResult};
use super::status;
use super::take;
use crate::core::config::{Config, DispatchConfig};
use crate::core::repolist::RepoInfo;
use crate::core::types::BranchName;
use crate::git::{CommandRunner, RepoHandle};

/// Builds the result for a repository whose workflow could not report.
type LostFn<T> = fn(&RepoInfo, String) -> T;

/// Concurrency and deadline settings for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchLimits {
    /// Per-repository deadline
    pub timeout: Option<Duration>,
    /// Maximum concurrent workflows
    pub jobs: Option<usize>,
}

impl DispatchLimits {
    /// Limits from the config file.
    pub fn from_config(dispatch: &DispatchConfig) -> Self {
        Self {
            timeout: dispatch.timeout(),
            jobs: dispatch.jobs,
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(self, timeout: Option<Duration>, jobs: Option<usize>) -> Self {
        Self {
            timeout: timeout.or(self.timeout),
            jobs: jobs.or(self.jobs),
        }
    }
}

/// Runs workflows across a set of repositories.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    runner: Arc<dyn CommandRunner>,
    config: Arc<Config>,
    limits: DispatchLimits,
}

impl Dispatcher {
    /// Create a dispatcher with the limits from `config`.
    pub fn new(runner: Arc<dyn CommandRunner>, config: Config) -> Self {
        let limits = DispatchLimits::from_config(&config.dispatch);
        Self {
            runner,
            config: Arc::new(config),
            limits,
        }
    }

    /// Replace the limits.
    pub fn with_limits(mut self, limits: DispatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// The limits in effect.
    pub fn limits(&self) -> DispatchLimits {
        self.limits
    }

    /// Move every repository onto `target`.
    ///
    /// `on_result` sees each result as it arrives.
    pub async fn take(
        &self,
        target: &BranchName,
        repos: &[Arc<RepoInfo>],
        on_result: impl FnMut(&WorkflowResult),
    ) -> Vec<WorkflowResult> {
        info!(target = %target, repos = repos.len(), "dispatching take");
        let target = target.clone();
        let config = Arc::clone(&self.config);
        self.fan_out(
            repos,
            move |handle| {
                let target = target.clone();
                let config = Arc::clone(&config);
                async move { take::take(handle, &target, &config).await }
            },
            lost_workflow,
            on_result,
        )
        .await
    }

    /// Compare every repository with its upstream.
    pub async fn status(
        &self,
        repos: &[Arc<RepoInfo>],
        on_result: impl FnMut(&WorkflowResult),
    ) -> Vec<WorkflowResult> {
        info!(repos = repos.len(), "dispatching status");
        let config = Arc::clone(&self.config);
        self.fan_out(
            repos,
            move |handle| {
                let config = Arc::clone(&config);
                async move { status::status(handle, &config).await }
            },
            lost_workflow,
            on_result,
        )
        .await
    }

    /// Search every repository for `target`.
    ///
    /// Repositories that could not be searched come back as FAILED results.
    pub async fn find(
        &self,
        target: &BranchName,
        repos: &[Arc<RepoInfo>],
    ) -> Vec<Result<SearchResult, WorkflowResult>> {
        info!(target = %target, repos = repos.len(), "dispatching find");
        let target = target.clone();
        self.fan_out(
            repos,
            move |handle| {
                let target = target.clone();
                async move {
                    let name = handle.name().to_string();
                    find::find(handle, &target)
                        .await
                        .map_err(|err| WorkflowResult::failed(name, err.to_string()))
                }
            },
            lost_search,
            |_| {},
        )
        .await
    }

    async fn fan_out<T, F, Fut>(
        &self,
        repos: &[Arc<RepoInfo>],
        work: F,
        lost: LostFn<T>,
        mut on_result: impl FnMut(&T),
    ) -> Vec<T>
    where
        T: Send + 'static,
        F: Fn(RepoHandle) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
    {
        if repos.is_empty() {
            return Vec::new();
        }

        let work = Arc::new(work);
        // Capped at the fleet size and at what tokio accepts.
        let semaphore = self
            .limits
            .jobs
            .map(|n| n.min(repos.len()).min(Semaphore::MAX_PERMITS))
            .map(|n| Arc::new(Semaphore::new(n)));
        let (tx, mut rx) = mpsc::channel::<(usize, T)>(repos.len());

        for (index, info) in repos.iter().enumerate() {
            let tx = tx.clone();
            let info = Arc::clone(info);
            let runner = Arc::clone(&self.runner);
            let work = Arc::clone(&work);
            let semaphore = semaphore.clone();
            let timeout = self.limits.timeout;

            tokio::spawn(async move {
                let _permit = match semaphore {
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };

                let run = async {
                    match RepoHandle::open(Arc::clone(&info), runner).await {
                        Ok(handle) => (*work)(handle).await,
                        Err(err) => lost(&info, format!("could not open repository: {}", err)),
                    }
                };

                let result = match timeout {
                    Some(limit) => match tokio::time::timeout(limit, run).await {
                        Ok(result) => result,
                        Err(_) => {
                            warn!(repo = %info.name, ?limit, "workflow timed out");
                            lost(&info, format!("timed out after {:?}", limit))
                        }
                    },
                    None => run.await,
                };

                let _ = tx.send((index, result)).await;
            });
        }
        drop(tx);

        let mut reported = vec![false; repos.len()];
        let mut results = Vec::with_capacity(repos.len());
        while let Some((index, result)) = rx.recv().await {
            reported[index] = true;
            on_result(&result);
            results.push(result);
        }

        for (info, _) in repos.iter().zip(&reported).filter(|(_, done)| !**done) {
            warn!(repo = %info.name, "workflow task ended without reporting");
            let result = lost(info, "workflow task ended without reporting".to_string());
            on_result(&result);
            results.push(result);
        }
        results
    }
}

fn lost_workflow(info: &RepoInfo, reason: String) -> WorkflowResult {
    WorkflowResult::failed(info.name.clone(), reason)
}

fn lost_search(info: &RepoInfo, reason: String) -> Result<SearchResult, WorkflowResult> {
    Err(lost_workflow(info, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RemoteName;
    use crate::engine::outcome::Status;
    use crate::git::mock::MockRunner;
    use crate::git::CommandResult;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn config() -> Config {
        Config::new(
            BranchName::new("main").unwrap(),
            RemoteName::new("origin").unwrap(),
            "/code",
        )
    }

    fn repos(names: &[&str]) -> Vec<Arc<RepoInfo>> {
        names
            .iter()
            .map(|n| Arc::new(RepoInfo::new(PathBuf::from("/code").join(n), *n)))
            .collect()
    }

    /// Every repository is on a synced `main` unless scripted otherwise.
    fn synced_fleet() -> MockRunner {
        let mock = MockRunner::new().with_repo_state("main", &["origin"]);
        let ok = CommandResult::success(Vec::<String>::new());
        mock.respond("stash --include-untracked", ok.clone());
        mock.respond("remote update origin", ok);
        mock.respond(
            "branch -a -l",
            CommandResult::success(["* main", "remotes/origin/main"]),
        );
        mock.respond("rev-parse --short=4 HEAD", CommandResult::success(["ab12"]));
        mock.respond(
            "rev-parse --short=4 main@{upstream}",
            CommandResult::success(["ab12"]),
        );
        mock
    }

    fn by_name(results: &[WorkflowResult]) -> BTreeMap<String, Status> {
        results
            .iter()
            .map(|r| (r.repo_name.clone(), r.status))
            .collect()
    }

    #[tokio::test]
    async fn one_result_per_repository() {
        let mock = synced_fleet();
        let dispatcher = Dispatcher::new(Arc::new(mock), config());
        let fleet = repos(&["alpha", "beta", "gamma", "delta"]);

        let mut seen = 0;
        let results = dispatcher
            .take(&BranchName::new("main").unwrap(), &fleet, |_| seen += 1)
            .await;

        assert_eq!(results.len(), 4);
        assert_eq!(seen, 4);
        let statuses = by_name(&results);
        assert_eq!(statuses.len(), 4);
        assert!(statuses.values().all(|s| *s == Status::Passed));
    }

    #[tokio::test]
    async fn failures_stay_isolated() {
        let mock = synced_fleet();
        mock.respond_in(
            "/code/beta",
            "remote update origin",
            CommandResult::failure(1, ["fatal: unable to access"]),
        );
        mock.respond_in(
            "/code/gamma",
            "branch --show-current",
            CommandResult::launch_failure("no such directory"),
        );
        let dispatcher = Dispatcher::new(Arc::new(mock), config());

        let results = dispatcher
            .take(
                &BranchName::new("main").unwrap(),
                &repos(&["alpha", "beta", "gamma"]),
                |_| {},
            )
            .await;

        let statuses = by_name(&results);
        assert_eq!(statuses["alpha"], Status::Passed);
        assert_eq!(statuses["beta"], Status::Failed);
        assert_eq!(statuses["gamma"], Status::Failed);
        let gamma = results.iter().find(|r| r.repo_name == "gamma").unwrap();
        assert!(gamma.message.contains("could not open repository"));
    }

    #[tokio::test]
    async fn timeout_reports_failed_without_blocking_others() {
        let mock = synced_fleet();
        mock.delay_in(
            "/code/slow",
            "remote update origin",
            Duration::from_secs(30),
        );
        let dispatcher = Dispatcher::new(Arc::new(mock), config()).with_limits(DispatchLimits {
            timeout: Some(Duration::from_millis(200)),
            jobs: None,
        });

        let results = dispatcher.status(&repos(&["fast", "slow"]), |_| {}).await;

        let statuses = by_name(&results);
        assert_eq!(statuses["fast"], Status::Current);
        assert_eq!(statuses["slow"], Status::Failed);
        let slow = results.iter().find(|r| r.repo_name == "slow").unwrap();
        assert_eq!(slow.message, "timed out after 200ms");
    }

    #[tokio::test]
    async fn job_limit_still_completes_everything() {
        let mock = synced_fleet();
        let dispatcher = Dispatcher::new(Arc::new(mock), config()).with_limits(DispatchLimits {
            timeout: None,
            jobs: Some(1),
        });
        let results = dispatcher
            .status(&repos(&["a", "b", "c", "d", "e"]), |_| {})
            .await;
        assert_eq!(by_name(&results).len(), 5);
    }

    #[tokio::test]
    async fn huge_job_limit_is_clamped() {
        let mock = synced_fleet();
        let dispatcher = Dispatcher::new(Arc::new(mock), config()).with_limits(DispatchLimits {
            timeout: None,
            jobs: Some(usize::MAX),
        });
        let results = dispatcher.status(&repos(&["a", "b"]), |_| {}).await;
        let statuses = by_name(&results);
        assert_eq!(statuses.len(), 2);
        assert!(statuses.values().all(|s| *s == Status::Current));
    }

    #[tokio::test]
    async fn panicked_task_becomes_failed() {
        let mock = synced_fleet();
        let dispatcher = Dispatcher::new(Arc::new(mock), config());

        let results = dispatcher
            .fan_out(
                &repos(&["calm", "boom"]),
                |handle: RepoHandle| async move {
                    if handle.name() == "boom" {
                        panic!("workflow bug");
                    }
                    WorkflowResult::new(handle.name(), Status::Passed, "[main]")
                },
                lost_workflow,
                |_| {},
            )
            .await;

        let statuses = by_name(&results);
        assert_eq!(statuses["calm"], Status::Passed);
        assert_eq!(statuses["boom"], Status::Failed);
        let boom = results.iter().find(|r| r.repo_name == "boom").unwrap();
        assert_eq!(boom.message, "workflow task ended without reporting");
    }

    #[tokio::test]
    async fn find_collects_matches_and_failures() {
        let mock = synced_fleet();
        mock.respond_in(
            "/code/beta",
            "branch -a -l",
            CommandResult::success(["* main", "remotes/origin/release-9"]),
        );
        mock.respond_in(
            "/code/gamma",
            "branch -a -l",
            CommandResult::failure(128, ["fatal: not a git repository"]),
        );
        let dispatcher = Dispatcher::new(Arc::new(mock.clone()), config());

        let results = dispatcher
            .find(
                &BranchName::new("release-9").unwrap(),
                &repos(&["alpha", "beta", "gamma"]),
            )
            .await;

        assert_eq!(results.len(), 3);
        let found: Vec<&SearchResult> = results
            .iter()
            .filter_map(|r| r.as_ref().ok())
            .filter(|r| r.found())
            .collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].repo_name, "beta");
        assert_eq!(found[0].branches, vec!["remotes/origin/release-9"]);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
        assert!(!mock.ran("remote update origin"));
    }

    #[tokio::test]
    async fn empty_fleet() {
        let dispatcher = Dispatcher::new(Arc::new(MockRunner::new()), config());
        assert!(dispatcher.status(&[], |_| {}).await.is_empty());
    }

    #[test]
    fn overrides_win() {
        let base = DispatchLimits::from_config(&DispatchConfig {
            timeout_secs: Some(60),
            jobs: Some(4),
        });
        assert_eq!(base.timeout, Some(Duration::from_secs(60)));
        let merged = base.with_overrides(None, Some(2));
        assert_eq!(merged.timeout, Some(Duration::from_secs(60)));
        assert_eq!(merged.jobs, Some(2));
    }
}
