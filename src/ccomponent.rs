//! C-forests and hedge witnesses.
//!
//! A **c-forest** is a set of vertices `F` whose induced sub-graph forms a
//! single c-component and whose every member is an ancestor of one of a
//! small set of "roots" (Tian & Pearl's R-rooted c-forests). A **hedge** is
//! a pair of c-forests `(F, F′)` with `F′ ⊂ F` sharing the same root set —
//! this richer `(F, F′)` form is authoritative rather than a bare pair of
//! c-component sets.

use crate::graph::Graph;
use crate::variable::{Variable, VarSet};

/// A candidate c-forest: a vertex set together with the graph it is judged
/// against.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CForest {
    f: VarSet,
}

impl CForest {
    pub fn new(f: VarSet) -> CForest {
        CForest { f }
    }

    pub fn vertices(&self) -> &VarSet {
        &self.f
    }

    /// The roots of this forest in `graph`: members of `F` with no other
    /// member of `F` as a descendant.
    pub fn root(&self, graph: &Graph) -> VarSet {
        self.f
            .iter()
            .filter(|v| {
                let descendants = graph.descendants(&crate::variable::singleton((*v).clone()));
                descendants.intersection(&self.f).next().is_none()
            })
            .cloned()
            .collect()
    }

    /// `true` iff `F` is a single maximal c-component of `graph` restricted
    /// to `F`, and every member of `F` is itself a root or an ancestor of one.
    pub fn compatible_with(&self, graph: &Graph, latents: &VarSet) -> bool {
        let restricted = graph.sub_graph(&self.f);
        let observed: VarSet = self.f.difference(latents).cloned().collect();
        if restricted.maximal_c_components(&observed).len() > 1 {
            return false;
        }
        let roots = self.root(graph);
        self.f.iter().all(|v| {
            roots.contains(v)
                || !graph
                    .descendants(&crate::variable::singleton(v.clone()))
                    .is_disjoint(&roots)
        })
    }
}

/// A hedge witness `(F, F′)`: the complete graphical obstruction to
/// identifiability for a query `(Y, X)` (Shpitser & Pearl 2006).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hedge {
    f: CForest,
    f_prime: CForest,
}

impl Hedge {
    /// Build a hedge witness, validating `F′ ⊂ F` and that both forests
    /// share a root set.
    pub fn new(graph: &Graph, f: VarSet, f_prime: VarSet) -> Option<Hedge> {
        if !f_prime.is_subset(&f) || f_prime == f {
            return None;
        }
        let f = CForest::new(f);
        let f_prime = CForest::new(f_prime);
        if f.root(graph) != f_prime.root(graph) {
            return None;
        }
        Some(Hedge { f, f_prime })
    }

    pub fn f(&self) -> &VarSet {
        self.f.vertices()
    }

    pub fn f_prime(&self) -> &VarSet {
        self.f_prime.vertices()
    }
}

/// Vertices reachable from `v` by one or more bidirected edges within
/// `within`, used to build [`Graph::maximal_c_components`] — re-exported
/// here because the rule library and ID recursion both reason about
/// c-components directly.
pub fn c_component_of(graph: &Graph, v: &Variable, within: &VarSet) -> VarSet {
    graph
        .maximal_c_components(within)
        .into_iter()
        .find(|c| c.contains(v))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::var_set;

    #[test]
    fn bow_arc_is_a_single_c_forest_rooted_at_both_ends() {
        let g = Graph::parse("X->Y;U->X;U->Y")
            .unwrap()
            .with_latents(var_set(["U"]).unwrap())
            .unwrap();
        let f = CForest::new(var_set(["X", "Y"]).unwrap());
        assert!(f.compatible_with(&g, &var_set(["U"]).unwrap()));
        assert_eq!(f.root(&g), var_set(["Y"]).unwrap());
    }

    #[test]
    fn hedge_requires_strict_subset_and_shared_root() {
        let g = Graph::parse("X->Y;U->X;U->Y")
            .unwrap()
            .with_latents(var_set(["U"]).unwrap())
            .unwrap();
        let f = var_set(["X", "Y"]).unwrap();
        let f_prime = var_set(["X", "Y"]).unwrap();
        assert!(Hedge::new(&g, f.clone(), f_prime).is_none());
        let f_prime_proper = var_set(["Y"]).unwrap();
        assert!(Hedge::new(&g, f, f_prime_proper).is_some());
    }
}
