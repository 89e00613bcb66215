//! Group-by over row positions.
//!
//! Both the subject index (rows per `USUBJID`) and the sequence numberer
//! (rows per `STUDYID`/`USUBJID`) partition a table by key. This is the one
//! implementation they share.

use std::collections::HashMap;
use std::hash::Hash;

/// Partition positions `0..n` by key, preserving original order inside each group.
///
/// Items whose key is `None` are left out of every group.
pub fn group_positions<K, I>(keys: I) -> HashMap<K, Vec<usize>>
where
    K: Eq + Hash,
    I: IntoIterator<Item = Option<K>>,
{
    let mut groups: HashMap<K, Vec<usize>> = HashMap::new();
    for (position, key) in keys.into_iter().enumerate() {
        if let Some(key) = key {
            groups.entry(key).or_default().push(position);
        }
    }
    groups
}

/// Groups from [`group_positions`] as runs in ascending key order.
pub fn sorted_runs<K, I>(keys: I) -> Vec<(K, Vec<usize>)>
where
    K: Eq + Hash + Ord,
    I: IntoIterator<Item = Option<K>>,
{
    let mut runs: Vec<(K, Vec<usize>)> = group_positions(keys).into_iter().collect();
    runs.sort_by(|left, right| left.0.cmp(&right.0));
    runs
}
