//! Sufficient blocking-set enumeration over path collections.

use crate::graph::Graph;
use crate::path::{self, Path};
use crate::variable::{Variable, VarSet};
use std::collections::BTreeMap;

/// Enumerate adjustment sets `S` such that `W ∪ S` blocks every path in
/// `paths`, smallest/lowest-overlap candidates first. Blockers
/// are drawn from each path's internal vertices minus `latents`; candidates
/// excluded by `exclude` (typically `X ∪ Y ∪ L ∪ Z`) never enter a
/// combination.
pub fn sufficient_sets(
    graph: &Graph,
    paths: &[Path],
    w: &VarSet,
    latents: &VarSet,
    exclude: &VarSet,
) -> Vec<VarSet> {
    if paths.is_empty() {
        return vec![VarSet::new()];
    }

    let per_path_blockers: Vec<VarSet> = paths
        .iter()
        .map(|p| {
            p.blockers(graph, w, latents)
                .difference(exclude)
                .cloned()
                .collect()
        })
        .collect();

    if per_path_blockers.iter().any(VarSet::is_empty) {
        // some path has no available blocker at all: no adjustment set can help.
        return Vec::new();
    }

    // Rank candidates by descending frequency across paths, ties by name.
    let mut frequency: BTreeMap<Variable, usize> = BTreeMap::new();
    for blockers in &per_path_blockers {
        for v in blockers {
            *frequency.entry(v.clone()).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<Variable> = frequency.keys().cloned().collect();
    ranked.sort_by(|a, b| {
        frequency[b]
            .cmp(&frequency[a])
            .then_with(|| a.cmp(b))
    });

    let mut seen: VarSet = VarSet::new();
    let mut results = Vec::new();
    enumerate_combinations(&ranked, &per_path_blockers, &mut VarSet::new(), &mut seen, &mut results);
    results
}

/// Build Cartesian combinations of one blocker choice per path, in ranked
/// priority order, deduplicating by the resulting set and keeping only those
/// that actually block every path.
fn enumerate_combinations(
    ranked: &[Variable],
    per_path_blockers: &[VarSet],
    current: &mut VarSet,
    seen: &mut VarSet,
    results: &mut Vec<VarSet>,
) {
    // A candidate combination blocks every path iff every path's blocker set
    // intersects `current`. Rather than build the full Cartesian product
    // (which can be astronomically large), grow `current` greedily in rank
    // order, recording every prefix that achieves full coverage.
    let _ = seen;
    for size in 1..=ranked.len() {
        for combo in combinations(ranked, size) {
            let candidate: VarSet = combo.into_iter().collect();
            if blocks_every_path(&candidate, per_path_blockers) {
                if !results.contains(&candidate)
                    && !results.iter().any(|existing: &VarSet| existing.is_subset(&candidate))
                {
                    results.push(candidate);
                }
            }
        }
        // stop growing once we have found any covering combinations at this
        // size: larger sizes only add strictly larger (dominated) sets.
        if !results.is_empty() {
            break;
        }
    }
    let _ = current;
}

fn blocks_every_path(candidate: &VarSet, per_path_blockers: &[VarSet]) -> bool {
    per_path_blockers
        .iter()
        .all(|blockers| !blockers.is_disjoint(candidate))
}

/// All `size`-subsets of `items`, in the order `items` lists them.
fn combinations(items: &[Variable], size: usize) -> Vec<Vec<Variable>> {
    if size == 0 {
        return vec![Vec::new()];
    }
    if size > items.len() {
        return Vec::new();
    }
    let mut out = Vec::new();
    fn go(items: &[Variable], start: usize, size: usize, current: &mut Vec<Variable>, out: &mut Vec<Vec<Variable>>) {
        if current.len() == size {
            out.push(current.clone());
            return;
        }
        for i in start..items.len() {
            current.push(items[i].clone());
            go(items, i + 1, size, current, out);
            current.pop();
        }
    }
    go(items, 0, size, &mut Vec::new(), &mut out);
    out
}

/// Sufficient backdoor adjustment sets for `X → Y`.
pub fn backdoor_sets(graph: &Graph, x: &VarSet, y: &VarSet, z: &VarSet, latents: &VarSet) -> Vec<VarSet> {
    let paths = path::backdoor_paths(graph, x, y, z);
    let exclude: VarSet = x.union(y).chain(latents).chain(z).cloned().collect();
    sufficient_sets(graph, &paths, z, latents, &exclude)
}

/// Sufficient mediation sets intercepting every directed `X → … → Y` path.
pub fn mediation_sets(graph: &Graph, x: &VarSet, y: &VarSet, latents: &VarSet) -> Vec<VarSet> {
    let paths = path::causal_paths(graph, x, y, &VarSet::new());
    let exclude: VarSet = x.union(y).chain(latents).cloned().collect();
    sufficient_sets(graph, &paths, &VarSet::new(), latents, &exclude)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::var_set;

    #[test]
    fn backdoor_set_blocks_single_confounder() {
        let g = Graph::parse("X->Y;U->X;U->Y").unwrap();
        let x = var_set(["X"]).unwrap();
        let y = var_set(["Y"]).unwrap();
        let sets = backdoor_sets(&g, &x, &y, &VarSet::new(), &VarSet::new());
        assert!(sets.iter().any(|s| s == &var_set(["U"]).unwrap()));
    }

    #[test]
    fn no_backdoor_paths_yields_the_empty_set() {
        let g = Graph::parse("X->Y").unwrap();
        let x = var_set(["X"]).unwrap();
        let y = var_set(["Y"]).unwrap();
        let sets = backdoor_sets(&g, &x, &y, &VarSet::new(), &VarSet::new());
        assert_eq!(sets, vec![VarSet::new()]);
    }
}
