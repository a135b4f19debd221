use crate::clues::{ClueIndex, ClueNode};
use crate::suspects::SuspectDirectory;

/// Clues needed to convict.
pub const GUILTY_THRESHOLD: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Guilty,
    NotGuilty,
}

impl Verdict {
    pub fn from_matches(matches: usize) -> Self {
        if matches >= GUILTY_THRESHOLD {
            Verdict::Guilty
        } else {
            Verdict::NotGuilty
        }
    }
}

/// Number of collected clues the directory attributes to `accused`.
pub fn count_matches(clues: &ClueIndex, directory: &SuspectDirectory, accused: &str) -> usize {
    if accused.is_empty() {
        return 0;
    }
    count_node(clues.root(), directory, accused)
}

fn count_node(node: Option<&ClueNode>, directory: &SuspectDirectory, accused: &str) -> usize {
    let Some(n) = node else {
        return 0;
    };
    let here = usize::from(directory.lookup(&n.text) == Some(accused));
    here + count_node(n.left.as_deref(), directory, accused)
        + count_node(n.right.as_deref(), directory, accused)
}

/// Tally and verdict for one accusation.
pub fn evaluate(
    clues: &ClueIndex,
    directory: &SuspectDirectory,
    accused: &str,
) -> (usize, Verdict) {
    let matches = count_matches(clues, directory, accused);
    (matches, Verdict::from_matches(matches))
}
