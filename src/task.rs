//! Task completion flags for a given day

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The name of a task, as written in the header row
pub type TaskName = String;

/// The only cell content that reads as a completed task
pub const COMPLETED_CELL: &str = "TRUE";

/// An ordered mapping from task names to their completion state.
///
/// Lookups for an unknown task return `None`. Serialised as a flat JSON object, in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskStates {
    states: IndexMap<TaskName, bool>,
}

impl TaskStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the state of a task. A task that is already known keeps its position.
    pub fn insert<S: Into<TaskName>>(&mut self, name: S, completed: bool) {
        self.states.insert(name.into(), completed);
    }

    pub fn get(&self, name: &str) -> Option<bool> {
        self.states.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, bool)> {
        self.states.iter().map(|(name, completed)| (name.as_str(), *completed))
    }
}

impl<S: Into<TaskName>> std::iter::FromIterator<(S, bool)> for TaskStates {
    fn from_iter<I: IntoIterator<Item = (S, bool)>>(iter: I) -> Self {
        let mut states = Self::new();
        for (name, completed) in iter {
            states.insert(name, completed);
        }
        states
    }
}


/// Pair the task names of a header row with the cells of a data row.
///
/// Column 0 (the date) is ignored on both sides. A task is completed iff its cell is exactly `"TRUE"`;
/// any other content, or a missing cell, reads as not completed.
pub fn decode_row(header: &[String], row: &[String]) -> TaskStates {
    header.iter()
        .enumerate()
        .skip(1)
        .map(|(col, name)| {
            let completed = row.get(col).map(|cell| cell == COMPLETED_CELL).unwrap_or(false);
            (name.clone(), completed)
        })
        .collect()
}
