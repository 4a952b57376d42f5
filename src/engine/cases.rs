//! engine::cases
//!
//! Remote selection and take-case selection.
//!
//! Both are pure functions over data the handle already gathered, so the
//! decision a workflow makes can be tested without any git at all.
//!
//! # Case table
//!
//! | Case | Condition (first match wins)                      |
//! |------|---------------------------------------------------|
//! | A    | already on the target branch                      |
//! | B    | target exists as a local branch                   |
//! | C    | `remotes/<remote>/<target>` exists                |
//! | D    | none of the above                                 |

use std::collections::BTreeSet;

/// Which take evaluator applies to a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Case {
    /// A: HEAD is on the target branch.
    OnTarget,
    /// B: the target exists locally but is not checked out.
    LocalTarget,
    /// C: the target exists only as a remote-tracking branch.
    RemoteTarget,
    /// D: the target is not reachable; fall back to master.
    NoAccess,
}

/// Local and remote-tracking branches of one repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BranchInventory {
    local: BTreeSet<String>,
    /// Remote-tracking branches as `<remote>/<branch>`.
    remote: BTreeSet<String>,
}

impl BranchInventory {
    /// Build an inventory from `git branch -a -l` names.
    ///
    /// Names beginning with `remotes/` are remote-tracking; everything else
    /// is local. Symbolic `HEAD` entries are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inventory = Self::default();
        for name in names {
            let name = name.as_ref();
            match name.strip_prefix("remotes/") {
                Some(tracking) => {
                    if !tracking.ends_with("/HEAD") {
                        inventory.remote.insert(tracking.to_string());
                    }
                }
                None => {
                    inventory.local.insert(name.to_string());
                }
            }
        }
        inventory
    }

    /// True when `branch` exists locally.
    pub fn has_local(&self, branch: &str) -> bool {
        self.local.contains(branch)
    }

    /// True when `remotes/<remote>/<branch>` exists.
    pub fn has_remote_tracking(&self, remote: &str, branch: &str) -> bool {
        self.remote.contains(&format!("{}/{}", remote, branch))
    }

    /// Every branch whose short name is `target`.
    ///
    /// Local matches come first as plain names; remote-tracking matches keep
    /// their `remotes/<remote>/` prefix.
    pub fn matching(&self, target: &str) -> Vec<String> {
        let local = self.local.iter().filter(|b| *b == target).cloned();
        let remote = self
            .remote
            .iter()
            .filter(|b| matches!(b.split_once('/'), Some((_, short)) if short == target))
            .map(|b| format!("remotes/{}", b));
        local.chain(remote).collect()
    }
}

/// Decide which take evaluator applies.
///
/// Total and mutually exclusive: every input maps to exactly one case.
pub fn select_case(current: &str, target: &str, inventory: &BranchInventory, remote: &str) -> Case {
    if current == target {
        Case::OnTarget
    } else if inventory.has_local(target) {
        Case::LocalTarget
    } else if inventory.has_remote_tracking(remote, target) {
        Case::RemoteTarget
    } else {
        Case::NoAccess
    }
}

/// Pick the remote a workflow talks to.
///
/// A repository with exactly one remote uses it. Otherwise the designated
/// remote is used if the repository has it. `None` means no suitable remote.
pub fn select_remote<'a>(remotes: &'a [String], designated: &str) -> Option<&'a str> {
    match remotes {
        [only] => Some(only.as_str()),
        _ => remotes
            .iter()
            .find(|r| r.as_str() == designated)
            .map(String::as_str),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> BranchInventory {
        BranchInventory::from_names([
            "main",
            "feature-x",
            "remotes/origin/HEAD",
            "remotes/origin/main",
            "remotes/origin/release-9",
            "remotes/upstream/feature-x",
        ])
    }

    mod inventory {
        use super::*;

        #[test]
        fn splits_local_and_remote() {
            let inv = inventory();
            assert!(inv.has_local("main"));
            assert!(!inv.has_local("release-9"));
            assert!(inv.has_remote_tracking("origin", "release-9"));
            assert!(!inv.has_remote_tracking("upstream", "release-9"));
            assert!(!inv.has_remote_tracking("origin", "HEAD"));
        }

        #[test]
        fn matching_short_names() {
            let inv = inventory();
            assert_eq!(
                inv.matching("feature-x"),
                vec!["feature-x", "remotes/upstream/feature-x"]
            );
            assert_eq!(inv.matching("release-9"), vec!["remotes/origin/release-9"]);
            assert!(inv.matching("nope").is_empty());
        }

        #[test]
        fn nested_branch_names() {
            let inv = BranchInventory::from_names(["remotes/origin/team/feature"]);
            assert!(inv.has_remote_tracking("origin", "team/feature"));
            assert_eq!(
                inv.matching("team/feature"),
                vec!["remotes/origin/team/feature"],
            );
        }
    }

    mod case {
        use super::*;

        #[test]
        fn first_match_wins() {
            let inv = inventory();
            assert_eq!(
                select_case("feature-x", "feature-x", &inv, "origin"),
                Case::OnTarget,
            );
            assert_eq!(
                select_case("main", "feature-x", &inv, "origin"),
                Case::LocalTarget,
            );
            assert_eq!(
                select_case("main", "release-9", &inv, "origin"),
                Case::RemoteTarget,
            );
            assert_eq!(
                select_case("main", "release-9", &inv, "upstream"),
                Case::NoAccess,
            );
            assert_eq!(
                select_case("main", "missing", &inv, "origin"),
                Case::NoAccess,
            );
        }

        #[test]
        fn detached_head_never_on_target() {
            let inv = inventory();
            assert_eq!(
                select_case("", "feature-x", &inv, "origin"),
                Case::LocalTarget,
            );
        }
    }

    mod remote {
        use super::*;

        fn names(raw: &[&str]) -> Vec<String> {
            raw.iter().map(|s| s.to_string()).collect()
        }

        #[test]
        fn single_remote_always_used() {
            assert_eq!(
                select_remote(&names(&["origin"]), "upstream"),
                Some("origin"),
            );
        }

        #[test]
        fn designated_among_many() {
            assert_eq!(
                select_remote(&names(&["origin", "upstream"]), "upstream"),
                Some("upstream")
            );
        }

        #[test]
        fn no_suitable_remote() {
            assert_eq!(select_remote(&names(&["origin", "fork"]), "upstream"), None);
            assert_eq!(select_remote(&[], "upstream"), None);
        }
    }
}
