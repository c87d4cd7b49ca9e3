//! The authorization gate.
//!
//! Every mutating or disclosing command asks [`AccessPolicy::authorize`] before it
//! touches any store. The decision is pure: no I/O, and it never consults whether
//! the target account exists, so a denial cannot leak existence.

use std::collections::BTreeSet;

/// Targets every actor may act on unless configured otherwise.
pub const DEFAULT_PRIVILEGED_TARGETS: &[&str] = &["sql"];

/// Decides whether an actor may act on a target account.
///
/// Rules, first match wins:
/// 1. the actor is the target (self-service);
/// 2. the target is in the fixed privileged set;
/// 3. otherwise denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    privileged_targets: BTreeSet<String>,
}

impl AccessPolicy {
    /// Build a policy with the given privileged target set.
    pub fn new<I, S>(privileged_targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privileged_targets: privileged_targets.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns `true` if `actor` may act on `target`.
    #[must_use]
    pub fn authorize(&self, actor: &str, target: &str) -> bool {
        actor == target || self.privileged_targets.contains(target)
    }

    /// The privileged target set, in sorted order.
    pub fn privileged_targets(&self) -> impl Iterator<Item = &str> {
        self.privileged_targets.iter().map(String::as_str)
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PRIVILEGED_TARGETS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_service_is_allowed() {
        let policy = AccessPolicy::default();
        assert!(policy.authorize("alice", "alice"));
    }

    #[test]
    fn other_targets_are_denied() {
        let policy = AccessPolicy::default();
        assert!(!policy.authorize("alice", "bob"));
        assert!(!policy.authorize("bob", "alice"));
    }

    #[test]
    fn privileged_targets_are_allowed_for_anyone() {
        let policy = AccessPolicy::new(["sql", "maint"]);
        assert!(policy.authorize("alice", "sql"));
        assert!(policy.authorize("bob", "maint"));
        assert!(!policy.authorize("sql", "alice"));
    }

    #[test]
    fn decision_matches_rule_for_all_pairs() {
        let policy = AccessPolicy::new(["sql"]);
        let names = ["alice", "bob", "sql", ""];
        for actor in names {
            for target in names {
                let expected = actor == target || target == "sql";
                assert_eq!(policy.authorize(actor, target), expected, "{actor} -> {target}");
            }
        }
    }
}
