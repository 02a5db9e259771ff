//! Path enumeration and d-separation bookkeeping.

use crate::graph::Graph;
use crate::variable::{singleton, Variable, VarSet};
use std::fmt;

/// Direction of the edge between two consecutive path vertices.
///
/// `None` is the sentinel used for the head of a fresh one-node path.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Arrow {
    None,
    Forward,
    Backward,
}

impl fmt::Display for Arrow {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arrow::None => write!(f, ""),
            Arrow::Forward => write!(f, "->"),
            Arrow::Backward => write!(f, "<-"),
        }
    }
}

/// An ordered sequence of distinct variables with a parallel sequence of
/// arrows. `arrows[0]` is always [`Arrow::None`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Path {
    variables: Vec<Variable>,
    arrows: Vec<Arrow>,
}

impl Path {
    pub fn singleton(v: Variable) -> Path {
        Path {
            variables: vec![v],
            arrows: vec![Arrow::None],
        }
    }

    /// Extend the path by one edge to `v`, with the edge direction `arrow`.
    fn grow(&self, v: Variable, arrow: Arrow) -> Path {
        let mut variables = self.variables.clone();
        variables.push(v);
        let mut arrows = self.arrows.clone();
        arrows.push(arrow);
        Path { variables, arrows }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn contains(&self, v: &Variable) -> bool {
        self.variables.contains(v)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn arrows(&self) -> &[Arrow] {
        &self.arrows
    }

    pub fn tip(&self) -> &Variable {
        self.variables.last().expect("path is never empty")
    }

    fn tip_arrow(&self) -> Arrow {
        *self.arrows.last().expect("path is never empty")
    }

    pub fn head(&self) -> &Variable {
        &self.variables[0]
    }

    /// Every internal vertex `v` (excluding the two endpoints) such that
    /// conditioning on `current_w ∪ {v}` d-separates this path, excluding
    /// latents.
    pub fn blockers(&self, graph: &Graph, current_w: &VarSet, latents: &VarSet) -> VarSet {
        let mut blockers = VarSet::new();
        if self.len() < 3 {
            return blockers;
        }
        for v in &self.variables[1..self.len() - 1] {
            if current_w.contains(v) || latents.contains(v) {
                continue;
            }
            let mut extended = current_w.clone();
            extended.insert(v.clone());
            if !self.is_open(graph, &extended) {
                blockers.insert(v.clone());
            }
        }
        blockers
    }

    /// `true` iff every internal triple along this path is open under `w`
    ///. A path with fewer than 3 vertices has no internal
    /// triples and is trivially open.
    pub fn is_open(&self, graph: &Graph, w: &VarSet) -> bool {
        if self.len() < 3 {
            return true;
        }
        for i in 1..self.len() - 1 {
            let v = &self.variables[i];
            let a1 = self.arrows[i];
            let a2 = self.arrows[i + 1];
            let in_w = w.contains(v);
            let has_descendant_in_w = !graph.descendants(&singleton(v.clone())).is_disjoint(w);
            if !is_open_triple(a1, a2, in_w, has_descendant_in_w) {
                return false;
            }
        }
        true
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, v) in self.variables.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", self.arrows[i])?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Classify a `(a1, v, a2)` triple as open or d-separated.
/// `in_w` is whether `v` is in the current conditioning set;
/// `has_descendant_in_w` is whether any descendant of `v` is in it (only
/// relevant when `v` is a collider).
pub fn is_open_triple(a1: Arrow, a2: Arrow, in_w: bool, has_descendant_in_w: bool) -> bool {
    if matches!(a1, Arrow::None) {
        return true;
    }
    let is_collider = matches!(a1, Arrow::Forward) && matches!(a2, Arrow::Backward);
    if is_collider {
        in_w || has_descendant_in_w
    } else {
        !in_w
    }
}

/// Enumerate every simple path from a vertex in `starts` to a vertex in
/// `targets` that is open under `w`, subject to `step_allowed(step, arrow)`
/// gating which edge directions may extend the path at 1-based edge index
/// `step`. Already-blocked paths are never produced: the adjustment-set
/// generator only needs paths that still require help.
fn enumerate_open_paths(
    graph: &Graph,
    starts: &VarSet,
    targets: &VarSet,
    w: &VarSet,
    step_allowed: impl Fn(usize, Arrow) -> bool,
) -> Vec<Path> {
    let mut completed = Vec::new();
    let mut frontier: Vec<Path> = starts.iter().cloned().map(Path::singleton).collect();

    while let Some(path) = frontier.pop() {
        let tip = path.tip().clone();
        let step = path.len();
        let mut candidates: Vec<(Variable, Arrow)> = Vec::new();
        if step_allowed(step, Arrow::Forward) {
            candidates.extend(
                graph
                    .children(&singleton(tip.clone()))
                    .into_iter()
                    .map(|c| (c, Arrow::Forward)),
            );
        }
        if step_allowed(step, Arrow::Backward) {
            candidates.extend(
                graph
                    .parents(&singleton(tip.clone()))
                    .into_iter()
                    .map(|p| (p, Arrow::Backward)),
            );
        }

        for (candidate, arrow) in candidates {
            if path.contains(&candidate) {
                continue;
            }
            let in_w = w.contains(&tip);
            let has_descendant_in_w =
                !graph.descendants(&singleton(tip.clone())).is_disjoint(w);
            if !is_open_triple(path.tip_arrow(), arrow, in_w, has_descendant_in_w) {
                continue;
            }
            let grown = path.grow(candidate.clone(), arrow);
            if targets.contains(&candidate) && grown.len() > 1 {
                completed.push(grown);
            } else {
                frontier.push(grown);
            }
        }
    }
    completed
}

/// All open (under `w`) simple paths between any vertex of `x` and any
/// vertex of `y`, in either direction.
pub fn paths(graph: &Graph, x: &VarSet, y: &VarSet, w: &VarSet) -> Vec<Path> {
    enumerate_open_paths(graph, x, y, w, |_, _| true)
}

/// Open directed (`->` only) paths from `x` to `y`.
pub fn causal_paths(graph: &Graph, x: &VarSet, y: &VarSet, w: &VarSet) -> Vec<Path> {
    enumerate_open_paths(graph, x, y, w, |_, arrow| matches!(arrow, Arrow::Forward))
}

/// Open paths from `x` to `y` whose first edge out of `x` points into `x`.
pub fn backdoor_paths(graph: &Graph, x: &VarSet, y: &VarSet, w: &VarSet) -> Vec<Path> {
    enumerate_open_paths(graph, x, y, w, |step, arrow| {
        if step == 1 {
            matches!(arrow, Arrow::Backward)
        } else {
            true
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::var_set;

    fn g(text: &str) -> Graph {
        Graph::parse(text).unwrap()
    }

    #[test]
    fn collider_blocks_unless_conditioned() {
        // X -> Y <- Z, a collider at Y.
        let graph = g("X->Y;Z->Y");
        let x = var_set(["X"]).unwrap();
        let z = var_set(["Z"]).unwrap();
        assert!(paths(&graph, &x, &z, &VarSet::new()).is_empty());
        assert!(!paths(&graph, &x, &z, &var_set(["Y"]).unwrap()).is_empty());
    }

    #[test]
    fn chain_is_open_until_conditioned() {
        let graph = g("X->Y;Y->Z");
        let x = var_set(["X"]).unwrap();
        let z = var_set(["Z"]).unwrap();
        assert_eq!(paths(&graph, &x, &z, &VarSet::new()).len(), 1);
        assert!(paths(&graph, &x, &z, &var_set(["Y"]).unwrap()).is_empty());
    }

    #[test]
    fn backdoor_paths_require_incoming_first_edge() {
        let graph = g("X->Y;U->X;U->Y");
        let x = var_set(["X"]).unwrap();
        let y = var_set(["Y"]).unwrap();
        let backdoor = backdoor_paths(&graph, &x, &y, &VarSet::new());
        assert_eq!(backdoor.len(), 1);
        assert_eq!(backdoor[0].to_string(), "X<-U->Y");
        // the direct causal edge is not a backdoor path
        let causal = causal_paths(&graph, &x, &y, &VarSet::new());
        assert_eq!(causal.len(), 1);
        assert_eq!(causal[0].to_string(), "X->Y");
    }
}
