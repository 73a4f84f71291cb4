//! Indented outline parsing and structure diffing.
//!
//! An outline is a plain-text tree, one folder per line, two spaces per
//! level, names optionally ending in `/`:
//!
//! ```text
//! Здание/
//!   Архитектура/
//!     Фасады/
//!   Конструктив/
//! ```
//!
//! Parsing materializes every node as a slash-joined path, so ancestors are
//! paths in their own right: `Здание`, `Здание/Архитектура`, ...

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

/// Spaces per indentation level.
pub const INDENT_UNIT: usize = 2;

/// Deduplicated, order-preserving list of materialized paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StructureSnapshot {
    paths: Vec<String>,
}

impl StructureSnapshot {
    /// Build a snapshot, dropping duplicates and keeping first-seen order.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let paths = paths
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| seen.insert(p.clone()))
            .collect();
        Self { paths }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn into_paths(self) -> Vec<String> {
        self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Parse an indented outline into a snapshot.
///
/// Depth is leading whitespace divided by [`INDENT_UNIT`] (a tab counts as
/// one unit). Going deeper pushes onto the ancestry stack, staying level
/// replaces the top, and going shallower pops the difference then replaces.
/// A leading byte-order mark is ignored.
pub fn parse_outline(text: &str) -> StructureSnapshot {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut stack: Vec<String> = Vec::new();
    let mut prev_depth = 0usize;
    let mut paths = Vec::new();

    for line in text.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let name = line.trim().trim_end_matches('/').trim();
        if name.is_empty() {
            continue;
        }
        let depth = indent_width(line) / INDENT_UNIT;

        if depth > prev_depth {
            stack.push(name.to_string());
        } else {
            if depth < prev_depth {
                let pops = (prev_depth - depth).min(stack.len());
                stack.truncate(stack.len() - pops);
            }
            match stack.last_mut() {
                Some(top) => *top = name.to_string(),
                None => stack.push(name.to_string()),
            }
        }

        prev_depth = depth;
        paths.push(stack.join("/"));
    }

    StructureSnapshot::from_paths(paths)
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { INDENT_UNIT } else { 1 })
        .sum()
}

/// Three-way comparison of two snapshots.
///
/// `added` keeps the new snapshot's order, so parents come before their
/// children; `removed` keeps the old snapshot's order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureDiff {
    pub added: Vec<String>,
    pub removed: Vec<String>,
    pub unchanged: Vec<String>,
}

impl StructureDiff {
    pub fn compute(old: &StructureSnapshot, new: &StructureSnapshot) -> Self {
        let old_set: HashSet<&str> = old.paths().iter().map(String::as_str).collect();
        let new_set: HashSet<&str> = new.paths().iter().map(String::as_str).collect();

        let (unchanged, added): (Vec<String>, Vec<String>) = new
            .paths()
            .iter()
            .cloned()
            .partition(|p| old_set.contains(p.as_str()));
        let removed = old
            .paths()
            .iter()
            .filter(|p| !new_set.contains(p.as_str()))
            .cloned()
            .collect();

        Self {
            added,
            removed,
            unchanged,
        }
    }

    /// A diff is empty when nothing was added or removed.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Parent → children lookup over a snapshot, used for folder navigation.
#[derive(Debug, Clone, Default)]
pub struct OutlineIndex {
    children: BTreeMap<String, BTreeSet<String>>,
}

impl OutlineIndex {
    pub fn new(snapshot: &StructureSnapshot) -> Self {
        let mut children: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for path in snapshot.paths() {
            let parent = parent_of(path).unwrap_or_default().to_string();
            children.entry(parent).or_default().insert(path.clone());
        }
        Self { children }
    }

    /// Sorted child paths of `parent`; `""` is the root.
    pub fn children(&self, parent: &str) -> Vec<&str> {
        self.children
            .get(parent)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Top-level sections.
    pub fn roots(&self) -> Vec<&str> {
        self.children("")
    }

    pub fn has_children(&self, path: &str) -> bool {
        self.children.get(path).is_some_and(|c| !c.is_empty())
    }
}

/// Parent path of `path`, `None` for top-level entries.
pub fn parent_of(path: &str) -> Option<&str> {
    path.rsplit_once('/').map(|(parent, _)| parent)
}

/// Last segment of `path`.
pub fn leaf_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, leaf)| leaf)
}
