//! Many-to-many edge reconciliation.
//!
//! Edges have no identity of their own on the server, only membership, so
//! converging a set means one remove call per stale member followed by one
//! add call per new member. Removals always run before additions. The first
//! failing call aborts the whole operation and calls already made are not
//! undone; the next read picks up whatever the server ended up with.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::future::Future;

use tracing::debug;

use crate::client::ClientError;

/// The members to drop and to add when moving from one set to another.
///
/// Both sides are sorted so calls happen in a stable order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetDiff<T> {
    pub removed: Vec<T>,
    pub added: Vec<T>,
}

impl<T: Ord + Clone> SetDiff<T> {
    /// Diff `old` against `new`. Duplicates on either side are ignored.
    pub fn new(old: impl IntoIterator<Item = T>, new: impl IntoIterator<Item = T>) -> Self {
        let old: BTreeSet<T> = old.into_iter().collect();
        let new: BTreeSet<T> = new.into_iter().collect();

        Self {
            removed: old.difference(&new).cloned().collect(),
            added: new.difference(&old).cloned().collect(),
        }
    }

    /// Everything in `new` is an addition.
    pub fn additions(new: impl IntoIterator<Item = T>) -> Self {
        Self::new(std::iter::empty(), new)
    }
}

impl<T> SetDiff<T> {
    pub fn is_empty(&self) -> bool {
        self.removed.is_empty() && self.added.is_empty()
    }
}

/// Issue one `remove` per removed member, then one `add` per added member.
///
/// `edge` only labels the debug log lines.
pub async fn apply_set_diff<'a, T, R, RF, A, AF>(
    edge: &str,
    diff: &'a SetDiff<T>,
    mut remove: R,
    mut add: A,
) -> Result<(), ClientError>
where
    T: Debug,
    R: FnMut(&'a T) -> RF,
    RF: Future<Output = Result<(), ClientError>>,
    A: FnMut(&'a T) -> AF,
    AF: Future<Output = Result<(), ClientError>>,
{
    for member in &diff.removed {
        debug!(edge, member = ?member, "Removing edge");
        remove(member).await?;
    }
    for member in &diff.added {
        debug!(edge, member = ?member, "Adding edge");
        add(member).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_diff_touches_only_changed_members() {
        let diff = SetDiff::new([1, 2, 3], [2, 3, 4]);
        assert_eq!(diff.removed, vec![1]);
        assert_eq!(diff.added, vec![4]);
    }

    #[test]
    fn test_diff_identical_sets_is_empty() {
        let diff = SetDiff::new([5, 1, 3], [3, 5, 1, 1]);
        assert!(diff.is_empty());
    }

    #[test]
    fn test_diff_strings_sorted() {
        let diff = SetDiff::new(
            vec!["documents.view".to_string()],
            vec!["tags.create".to_string(), "cabinets.view".to_string()],
        );
        assert_eq!(diff.removed, vec!["documents.view"]);
        assert_eq!(diff.added, vec!["cabinets.view", "tags.create"]);
    }

    #[tokio::test]
    async fn test_removals_run_before_additions() {
        let calls = Mutex::new(Vec::new());
        let diff = SetDiff::new([1, 2, 3, 9], [2, 3, 4, 0]);

        apply_set_diff(
            "group.users",
            &diff,
            |member| {
                calls.lock().unwrap().push(format!("remove({})", member));
                async { Ok(()) }
            },
            |member| {
                calls.lock().unwrap().push(format!("add({})", member));
                async { Ok(()) }
            },
        )
        .await
        .unwrap();

        assert_eq!(
            calls.into_inner().unwrap(),
            vec!["remove(1)", "remove(9)", "add(0)", "add(4)"]
        );
    }

    #[tokio::test]
    async fn test_first_failure_aborts() {
        let calls = Mutex::new(Vec::new());
        let diff = SetDiff::new([1, 2], [3]);

        let result = apply_set_diff(
            "role.groups",
            &diff,
            |member| {
                calls.lock().unwrap().push(format!("remove({})", member));
                let failed = *member == 1;
                async move {
                    if failed {
                        Err(ClientError::api(404, "Not found."))
                    } else {
                        Ok(())
                    }
                }
            },
            |member| {
                calls.lock().unwrap().push(format!("add({})", member));
                async { Ok(()) }
            },
        )
        .await;

        assert!(matches!(result, Err(ClientError::Api { status: 404, .. })));
        assert_eq!(calls.into_inner().unwrap(), vec!["remove(1)"]);
    }
}
