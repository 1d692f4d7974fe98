//! Turns published revisions into grid operations.
//!
//! Two strategies are provided. [`ReloadAdapter`] reloads the whole grid for
//! every revision. [`DiffingAdapter`] first asks the revision whether it is
//! equal to the one before it (under a [`RevisionEquality`] policy) and only
//! then computes per-item deletes, inserts, moves and updates keyed on
//! [`PhotoId`].

use std::{collections::HashMap, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use shared::{
    domain::{PhotoId, PhotoRecord},
    revision::{ListRevision, RevisionEquality},
};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum GridUpdate {
    ReloadAll { count: usize },
    Delete { index: usize },
    Insert { index: usize },
    Move { from: usize, to: usize },
    Update { index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PresentationVariant {
    Native,
    #[default]
    Diffing,
}

impl FromStr for PresentationVariant {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "native" | "reload" => Ok(Self::Native),
            "diffing" | "diff" => Ok(Self::Diffing),
            other => Err(format!("unknown presentation variant '{other}'")),
        }
    }
}

impl fmt::Display for PresentationVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Diffing => f.write_str("diffing"),
        }
    }
}

pub trait PresentationAdapter: Send {
    fn variant(&self) -> PresentationVariant;
    fn apply(&mut self, revision: &ListRevision) -> Vec<GridUpdate>;
}

pub fn adapter_for(
    variant: PresentationVariant,
    equality: RevisionEquality,
) -> Box<dyn PresentationAdapter> {
    match variant {
        PresentationVariant::Native => Box::new(ReloadAdapter::default()),
        PresentationVariant::Diffing => Box::new(DiffingAdapter::new(equality)),
    }
}

#[derive(Debug, Default)]
pub struct ReloadAdapter {
    rendered: usize,
}

impl ReloadAdapter {
    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

impl PresentationAdapter for ReloadAdapter {
    fn variant(&self) -> PresentationVariant {
        PresentationVariant::Native
    }

    fn apply(&mut self, revision: &ListRevision) -> Vec<GridUpdate> {
        self.rendered = revision.len();
        vec![GridUpdate::ReloadAll {
            count: revision.len(),
        }]
    }
}

#[derive(Debug)]
pub struct DiffingAdapter {
    policy: RevisionEquality,
    previous: Option<ListRevision>,
}

impl DiffingAdapter {
    pub fn new(policy: RevisionEquality) -> Self {
        Self {
            policy,
            previous: None,
        }
    }
}

impl PresentationAdapter for DiffingAdapter {
    fn variant(&self) -> PresentationVariant {
        PresentationVariant::Diffing
    }

    fn apply(&mut self, revision: &ListRevision) -> Vec<GridUpdate> {
        let updates = match &self.previous {
            None => vec![GridUpdate::ReloadAll {
                count: revision.len(),
            }],
            Some(previous) if previous.diff_identifier() != revision.diff_identifier() => {
                vec![GridUpdate::ReloadAll {
                    count: revision.len(),
                }]
            }
            Some(previous) if revision.is_equal_to(previous, self.policy) => {
                debug!(
                    sequence = revision.sequence(),
                    policy = %self.policy,
                    "revision equal to previous, skipping diff"
                );
                Vec::new()
            }
            Some(previous) => diff_by_id(previous.photos(), revision.photos()),
        };
        self.previous = Some(revision.clone());
        updates
    }
}

/// Per-item updates turning `old` into `new`: deletes (old indices), inserts
/// (new indices), moves (old index to new index) and updates (new indices) for
/// surviving items whose contents changed.
///
/// Survivors that keep their relative order are left in place; only those off
/// the longest increasing run of old indices are moved, so a single relocation
/// yields a single `Move`.
pub fn diff_by_id(old: &[PhotoRecord], new: &[PhotoRecord]) -> Vec<GridUpdate> {
    let old_index = index_by_id(old);
    let new_index = index_by_id(new);

    let deletes = old
        .iter()
        .enumerate()
        .filter(|(_, photo)| !new_index.contains_key(&photo.id))
        .map(|(index, _)| GridUpdate::Delete { index });
    let inserts = new
        .iter()
        .enumerate()
        .filter(|(_, photo)| !old_index.contains_key(&photo.id))
        .map(|(index, _)| GridUpdate::Insert { index });

    // (new index, old index) for every photo present on both sides.
    let survivors: Vec<(usize, usize)> = new
        .iter()
        .enumerate()
        .filter_map(|(to, photo)| old_index.get(&photo.id).map(|&from| (to, from)))
        .collect();
    let old_positions: Vec<usize> = survivors.iter().map(|&(_, from)| from).collect();
    let in_place = longest_increasing_run(&old_positions);

    let mut moves = Vec::new();
    let mut changed = Vec::new();
    for (&(to, from), stays) in survivors.iter().zip(in_place) {
        if !stays {
            moves.push(GridUpdate::Move { from, to });
        }
        if old[from] != new[to] {
            changed.push(GridUpdate::Update { index: to });
        }
    }

    deletes.chain(inserts).chain(moves).chain(changed).collect()
}

/// Marks the members of one longest strictly increasing subsequence of
/// `values`.
fn longest_increasing_run(values: &[usize]) -> Vec<bool> {
    // tails[k] is the position of the smallest tail of a run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();
    let mut previous: Vec<Option<usize>> = vec![None; values.len()];
    for (position, &value) in values.iter().enumerate() {
        let slot = tails.partition_point(|&tail| values[tail] < value);
        if slot > 0 {
            previous[position] = Some(tails[slot - 1]);
        }
        if slot == tails.len() {
            tails.push(position);
        } else {
            tails[slot] = position;
        }
    }

    let mut members = vec![false; values.len()];
    let mut cursor = tails.last().copied();
    while let Some(position) = cursor {
        members[position] = true;
        cursor = previous[position];
    }
    members
}

fn index_by_id(photos: &[PhotoRecord]) -> HashMap<PhotoId, usize> {
    photos
        .iter()
        .enumerate()
        .map(|(index, photo)| (photo.id, index))
        .collect()
}

#[cfg(test)]
#[path = "tests/presentation_tests.rs"]
mod tests;
