//! Partitioning a file snapshot into named groups.
//!
//! The engine runs two passes over the snapshot: files sharing an informative
//! pattern key are bucketed directly, and the remainder is clustered by
//! pairwise similarity. Pair scoring fans out over the rayon worker pool and
//! is collected into an edge list before any component is extracted, so the
//! adjacency is complete when union-find starts. Everything downstream of the
//! collect runs single-threaded.
//!
//! For a fixed snapshot and configuration the resulting partition (membership,
//! names, ordering) is identical on every run: candidate groups are ranked by
//! size with the smallest snapshot index as tie-break, and group names are
//! deduplicated in rank order.

use crate::config::GroupingLimits;
use crate::pattern;
use crate::progress::{Phase, ProgressSink};
use crate::scan::FileEntry;
use crate::similarity;
use rayon::prelude::*;
use std::collections::HashMap;

/// How a group was formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOrigin {
    /// Members share an identical pattern key.
    Pattern,
    /// Members form a connected component in the similarity graph.
    Similarity,
}

/// A finalized cluster of files to be relocated together.
#[derive(Debug, Clone)]
pub struct Group {
    /// Filesystem-safe directory name chosen for the group.
    pub name: String,
    /// Members in snapshot order.
    pub files: Vec<FileEntry>,
    /// How the group was formed.
    pub origin: GroupOrigin,
}

/// The result of partitioning a snapshot: groups plus the ungrouped residue.
///
/// Every input file appears in exactly one place.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Surviving groups in rank order (largest first).
    pub groups: Vec<Group>,
    /// Files that belong to no group, in snapshot order.
    pub ungrouped: Vec<FileEntry>,
}

impl Partition {
    /// Total number of files covered by the partition.
    pub fn total_files(&self) -> usize {
        self.groups.iter().map(|g| g.files.len()).sum::<usize>() + self.ungrouped.len()
    }
}

/// A candidate group before ranking, holding snapshot indices.
struct Candidate {
    members: Vec<usize>,
    origin: GroupOrigin,
    key: String,
}

/// Partitions the snapshot into groups according to the configured limits.
///
/// `limits` must have been validated; see
/// [`OrganizeConfig::validate`](crate::config::OrganizeConfig::validate).
pub fn partition(files: &[FileEntry], limits: &GroupingLimits, sink: &ProgressSink) -> Partition {
    let mut assigned = vec![false; files.len()];

    sink.report(
        Phase::Pattern,
        "bucketing files by pattern key",
        0,
        files.len() as u64,
    );
    let mut candidates = pattern_candidates(files, limits, &mut assigned);

    let remaining: Vec<usize> = (0..files.len()).filter(|&i| !assigned[i]).collect();
    candidates.extend(similarity_candidates(files, &remaining, limits, sink));

    // Rank by size descending; tie-break by the earliest member in the
    // snapshot. Each file belongs to at most one candidate, so the earliest
    // member is unique per candidate and the order is total.
    candidates.sort_by_key(|c| (std::cmp::Reverse(c.members.len()), c.members[0]));

    let kept = candidates.len().min(limits.max_groups);
    let mut in_group = vec![false; files.len()];
    let mut used_names: Vec<String> = Vec::new();
    let mut groups = Vec::with_capacity(kept);

    for (ordinal, candidate) in candidates.into_iter().take(kept).enumerate() {
        for &index in &candidate.members {
            in_group[index] = true;
        }

        let name = assign_name(&candidate, files, ordinal, &mut used_names);
        groups.push(Group {
            name,
            files: candidate.members.iter().map(|&i| files[i].clone()).collect(),
            origin: candidate.origin,
        });
    }

    let ungrouped = (0..files.len())
        .filter(|&i| !in_group[i])
        .map(|i| files[i].clone())
        .collect();

    Partition { groups, ungrouped }
}

/// First pass: bucket files by identical, sufficiently informative pattern
/// key. Qualifying buckets claim their members.
fn pattern_candidates(
    files: &[FileEntry],
    limits: &GroupingLimits,
    assigned: &mut [bool],
) -> Vec<Candidate> {
    let mut buckets: HashMap<String, Vec<usize>> = HashMap::new();

    for (index, file) in files.iter().enumerate() {
        let key = pattern::extract_key(&file.name);
        if pattern::informative_length(&key) >= limits.min_pattern_length {
            buckets.entry(key).or_default().push(index);
        }
    }

    let mut candidates = Vec::new();
    for (key, members) in buckets {
        if members.len() >= limits.min_files_per_group {
            for &index in &members {
                assigned[index] = true;
            }
            candidates.push(Candidate {
                members,
                origin: GroupOrigin::Pattern,
                key,
            });
        }
    }
    candidates
}

/// Second pass: score all unordered pairs of the remaining files in parallel,
/// then extract connected components from the thresholded similarity graph.
fn similarity_candidates(
    files: &[FileEntry],
    remaining: &[usize],
    limits: &GroupingLimits,
    sink: &ProgressSink,
) -> Vec<Candidate> {
    let pairs: Vec<(usize, usize)> = (0..remaining.len())
        .flat_map(|a| ((a + 1)..remaining.len()).map(move |b| (a, b)))
        .collect();

    sink.report(
        Phase::Score,
        "scoring filename pairs",
        0,
        pairs.len() as u64,
    );

    // The collect is the join barrier: no component is extracted until every
    // pair has been scored.
    let edges: Vec<(usize, usize)> = pairs
        .par_iter()
        .filter_map(|&(a, b)| {
            let score =
                similarity::score(&files[remaining[a]].name, &files[remaining[b]].name);
            (score >= limits.similarity_threshold).then_some((a, b))
        })
        .collect();

    sink.report(
        Phase::Score,
        "scoring complete",
        pairs.len() as u64,
        pairs.len() as u64,
    );

    let mut components = UnionFind::new(remaining.len());
    for (a, b) in edges {
        components.union(a, b);
    }

    let mut clusters: HashMap<usize, Vec<usize>> = HashMap::new();
    for (position, &index) in remaining.iter().enumerate() {
        clusters
            .entry(components.find(position))
            .or_default()
            .push(index);
    }

    clusters
        .into_values()
        .filter(|members| members.len() >= limits.min_files_per_group)
        .map(|members| Candidate {
            members,
            origin: GroupOrigin::Similarity,
            key: String::new(),
        })
        .collect()
}

/// Chooses and reserves a unique name for a kept candidate.
///
/// Pattern groups take their sanitized key; similarity groups take the
/// sanitized common stem of their members. Degenerate names fall back to
/// `group_<ordinal>`, and duplicates get a numeric suffix.
fn assign_name(
    candidate: &Candidate,
    files: &[FileEntry],
    ordinal: usize,
    used_names: &mut Vec<String>,
) -> String {
    let base = match candidate.origin {
        GroupOrigin::Pattern => sanitize_group_name(&candidate.key),
        GroupOrigin::Similarity => {
            let names: Vec<&str> = candidate
                .members
                .iter()
                .map(|&i| files[i].name.as_str())
                .collect();
            sanitize_group_name(&similarity::common_stem(&names))
        }
    };

    let base = if base.is_empty() {
        format!("group_{}", ordinal + 1)
    } else {
        base
    };

    let name = if used_names.contains(&base) {
        let mut n = 2;
        loop {
            let suffixed = format!("{}_{}", base, n);
            if !used_names.contains(&suffixed) {
                break suffixed;
            }
            n += 1;
        }
    } else {
        base
    };

    used_names.push(name.clone());
    name
}

/// Sanitizes a raw group name into a filesystem-safe directory name.
///
/// Non-alphanumeric runs collapse into single underscores; the result is
/// trimmed and capped at 64 characters. May be empty for degenerate input.
fn sanitize_group_name(raw: &str) -> String {
    let mut sanitized = String::with_capacity(raw.len());
    let mut last_was_separator = true;

    for c in raw.chars() {
        if c.is_alphanumeric() {
            sanitized.push(c);
            last_was_separator = false;
        } else if !last_was_separator {
            sanitized.push('_');
            last_was_separator = true;
        }
    }

    let sanitized = sanitized.trim_end_matches('_');
    sanitized.chars().take(64).collect()
}

/// Union-find over component positions, path-compressing on find.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Attach the larger root under the smaller so component roots are
            // stable regardless of edge order.
            let (keep, merge) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[merge] = keep;
        }
    }
}
