//! The causal diagram: observed and latent variables tied together by
//! structural equations.

mod equation;

pub use equation::StructuralEquation;

use crate::error::IdentifyError;
use crate::expression::Expression;
use crate::variable::{Variable, VarSet};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A DAG `(V, E, L)`: a variable set, a set of structural equations whose
/// outcomes are pairwise distinct and contained in `V`, and a latent subset
/// `L ⊆ V`.
///
/// `Graph` is immutable once built. `parents`/`children`/`ancestors`/
/// `descendants` are computed once at construction time and never
/// recomputed; derived views (`orphan`, `bereave`, `sub_graph`) build fresh
/// graphs with their own caches rather than mutating in place.
#[derive(Clone, Debug)]
pub struct Graph {
    variables: VarSet,
    equations: BTreeSet<StructuralEquation>,
    latents: VarSet,
    parents_cache: BTreeMap<Variable, VarSet>,
    children_cache: BTreeMap<Variable, VarSet>,
    ancestors_cache: BTreeMap<Variable, VarSet>,
    descendants_cache: BTreeMap<Variable, VarSet>,
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.variables == other.variables
            && self.equations == other.equations
            && self.latents == other.latents
    }
}
impl Eq for Graph {}

impl Graph {
    /// Build and validate a graph from its variables, equations, and latent
    /// subset: every equation's outcome and parents are declared variables,
    /// no variable is the outcome of two equations, `latents ⊆ variables`,
    /// and the induced digraph is acyclic.
    pub fn new(
        variables: VarSet,
        equations: BTreeSet<StructuralEquation>,
        latents: VarSet,
    ) -> Result<Graph, IdentifyError> {
        let mut seen_outcomes = VarSet::new();
        for eq in &equations {
            if !seen_outcomes.insert(eq.outcome().clone()) {
                return Err(IdentifyError::DuplicateOutcome(
                    eq.outcome().name().to_string(),
                ));
            }
            if !variables.contains(eq.outcome()) {
                return Err(IdentifyError::UndeclaredVariable(
                    eq.outcome().name().to_string(),
                ));
            }
            for p in eq.parents() {
                if !variables.contains(p) {
                    return Err(IdentifyError::UndeclaredVariable(p.name().to_string()));
                }
            }
        }
        if let Some(extra) = latents.difference(&variables).next() {
            return Err(IdentifyError::UndeclaredVariable(extra.name().to_string()));
        }

        let mut parents_cache: BTreeMap<Variable, VarSet> = BTreeMap::new();
        let mut children_cache: BTreeMap<Variable, VarSet> = BTreeMap::new();
        for v in &variables {
            parents_cache.insert(v.clone(), VarSet::new());
            children_cache.insert(v.clone(), VarSet::new());
        }
        for eq in &equations {
            parents_cache.insert(eq.outcome().clone(), eq.parents().clone());
            for p in eq.parents() {
                children_cache
                    .get_mut(p)
                    .expect("parent was just validated as declared")
                    .insert(eq.outcome().clone());
            }
        }

        for v in &variables {
            if Self::reaches(v, v, &children_cache) {
                return Err(IdentifyError::Cyclic(v.name().to_string()));
            }
        }

        let mut ancestors_cache: BTreeMap<Variable, VarSet> = BTreeMap::new();
        let mut descendants_cache: BTreeMap<Variable, VarSet> = BTreeMap::new();
        for v in &variables {
            ancestors_cache.insert(v.clone(), Self::transitive_closure(v, &parents_cache));
            descendants_cache.insert(v.clone(), Self::transitive_closure(v, &children_cache));
        }

        Ok(Graph {
            variables,
            equations,
            latents,
            parents_cache,
            children_cache,
            ancestors_cache,
            descendants_cache,
        })
    }

    /// `true` iff `target` is reachable from `start` by one or more edges of
    /// `adjacency`, used only to detect a cycle at `start == target`.
    fn reaches(start: &Variable, target: &Variable, adjacency: &BTreeMap<Variable, VarSet>) -> bool {
        let mut visited = VarSet::new();
        let mut frontier: Vec<Variable> = adjacency
            .get(start)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        while let Some(v) = frontier.pop() {
            if &v == target {
                return true;
            }
            if !visited.insert(v.clone()) {
                continue;
            }
            if let Some(next) = adjacency.get(&v) {
                frontier.extend(next.iter().cloned());
            }
        }
        false
    }

    fn transitive_closure(v: &Variable, adjacency: &BTreeMap<Variable, VarSet>) -> VarSet {
        let mut closure = VarSet::new();
        let mut frontier: Vec<Variable> = adjacency
            .get(v)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default();
        while let Some(next) = frontier.pop() {
            if closure.insert(next.clone()) {
                if let Some(further) = adjacency.get(&next) {
                    frontier.extend(further.iter().cloned());
                }
            }
        }
        closure
    }

    pub fn variables(&self) -> &VarSet {
        &self.variables
    }

    pub fn equations(&self) -> &BTreeSet<StructuralEquation> {
        &self.equations
    }

    pub fn latents(&self) -> &VarSet {
        &self.latents
    }

    pub fn is_latent(&self, v: &Variable) -> bool {
        self.latents.contains(v)
    }

    fn union_cached(cache: &BTreeMap<Variable, VarSet>, x: &VarSet) -> VarSet {
        x.iter()
            .flat_map(|v| cache.get(v).into_iter().flatten().cloned())
            .collect()
    }

    pub fn parents(&self, x: &VarSet) -> VarSet {
        Self::union_cached(&self.parents_cache, x)
    }

    pub fn children(&self, x: &VarSet) -> VarSet {
        Self::union_cached(&self.children_cache, x)
    }

    pub fn ancestors(&self, x: &VarSet) -> VarSet {
        Self::union_cached(&self.ancestors_cache, x)
    }

    pub fn descendants(&self, x: &VarSet) -> VarSet {
        Self::union_cached(&self.descendants_cache, x)
    }

    /// Parents and children of every vertex in `x`, combined.
    pub fn neighbors(&self, x: &VarSet) -> VarSet {
        self.parents(x).union(&self.children(x)).cloned().collect()
    }

    /// A latent `ℓ` confounds `v` and `w` if it parents both. A bidirected
    /// edge exists between `v` and `w` iff some latent does this, or a chain
    /// of such forks through latents-only intermediaries connects them; this
    /// returns the direct latent-parent neighbors of `v` used to build that
    /// closure.
    pub fn bidirected_neighbors(&self, v: &Variable) -> VarSet {
        let mut result = VarSet::new();
        for latent in &self.latents {
            let children = self.children(&crate::variable::singleton(latent.clone()));
            if children.contains(v) {
                for other in &children {
                    if other != v {
                        result.insert(other.clone());
                    }
                }
            }
        }
        result
    }

    /// Maximal sets of observed vertices mutually connected by bidirected
    /// (latent-confounded) edges — the c-components of the graph restricted
    /// to `within`.
    pub fn maximal_c_components(&self, within: &VarSet) -> Vec<VarSet> {
        let mut remaining: VarSet = within.clone();
        let mut components = Vec::new();
        while let Some(seed) = remaining.iter().next().cloned() {
            let mut component = VarSet::new();
            let mut frontier = vec![seed];
            while let Some(v) = frontier.pop() {
                if !component.insert(v.clone()) {
                    continue;
                }
                for neighbor in self.bidirected_neighbors(&v) {
                    if within.contains(&neighbor) && !component.contains(&neighbor) {
                        frontier.push(neighbor);
                    }
                }
            }
            for v in &component {
                remaining.remove(v);
            }
            components.push(component);
        }
        components
    }

    /// A new graph with every incoming edge to `x` removed: `x`'s equations
    /// become parentless, everything else is untouched.
    pub fn orphan(&self, x: &VarSet) -> Graph {
        let equations = self
            .equations
            .iter()
            .map(|eq| {
                if x.contains(eq.outcome()) {
                    StructuralEquation::new(VarSet::new(), eq.outcome().clone())
                        .expect("removing parents cannot introduce a self-loop")
                } else {
                    eq.clone()
                }
            })
            .collect();
        Graph::new(self.variables.clone(), equations, self.latents.clone())
            .expect("orphaning only removes edges, which cannot violate an invariant")
    }

    /// A new graph with every outgoing edge from `x` removed: nothing in `x`
    /// appears as a parent in any remaining equation.
    pub fn bereave(&self, x: &VarSet) -> Graph {
        let equations = self
            .equations
            .iter()
            .map(|eq| eq.without_parents(x))
            .collect();
        Graph::new(self.variables.clone(), equations, self.latents.clone())
            .expect("bereaving only removes edges, which cannot violate an invariant")
    }

    /// Restrict the graph to `s`, keeping only equations whose outcome and
    /// all parents lie in `s`. A latent `ℓ ∉ s` with two or more children
    /// inside `s` is retained (along with its equations into `s`) so the
    /// bidirected confounding it induces among `s`-members survives the
    /// restriction.
    pub fn sub_graph(&self, s: &VarSet) -> Graph {
        let mut kept_latents: VarSet = self.latents.intersection(s).cloned().collect();
        let mut kept_variables: VarSet = self.variables.intersection(s).cloned().collect();
        let mut bridging_equations: BTreeSet<StructuralEquation> = BTreeSet::new();

        for latent in &self.latents {
            if s.contains(latent) {
                continue;
            }
            let children_in_s: VarSet = self
                .children(&crate::variable::singleton(latent.clone()))
                .intersection(s)
                .cloned()
                .collect();
            if children_in_s.len() >= 2 {
                kept_latents.insert(latent.clone());
                kept_variables.insert(latent.clone());
                for child in &children_in_s {
                    bridging_equations.insert(
                        StructuralEquation::new(
                            crate::variable::singleton(latent.clone()),
                            child.clone(),
                        )
                        .expect("a latent is never its own child"),
                    );
                }
            }
        }

        let mut equations: BTreeSet<StructuralEquation> = self
            .equations
            .iter()
            .filter(|eq| {
                kept_variables.contains(eq.outcome()) && eq.parents().is_subset(&kept_variables)
            })
            .cloned()
            .collect();
        equations.extend(bridging_equations);

        Graph::new(kept_variables, equations, kept_latents)
            .expect("sub_graph only drops vertices and edges between them")
    }

    /// `P(v_1 | parents(v_1)) * P(v_2 | parents(v_2)) * …` over every
    /// variable in the graph (observed and latent alike), per the truncated
    /// factorization.
    pub fn joint_distribution(&self) -> Expression {
        let terms = self.variables.iter().map(|v| {
            let y = crate::variable::singleton(v.clone());
            let z = self.parents(&y);
            Expression::p(y, VarSet::new(), z).expect("Y is a singleton, disjoint from its parents")
        });
        Expression::product(terms)
    }

    /// `true` iff `y` and `z` are d-separated by `w` — every path between
    /// them is closed.
    pub fn conditionally_independent(&self, y: &VarSet, z: &VarSet, w: &VarSet) -> bool {
        crate::path::paths(self, y, z, w).is_empty()
    }

    /// Every topological ordering of `s` consistent with this graph's edges:
    /// no element of `s` precedes one of its own ancestors that is also in
    /// `s` (ancestors-before-descendants).
    pub fn admissible_orderings(&self, s: &VarSet) -> Vec<Vec<Variable>> {
        fn backtrack(
            graph: &Graph,
            remaining: &mut Vec<Variable>,
            placed: &mut VarSet,
            current: &mut Vec<Variable>,
            out: &mut Vec<Vec<Variable>>,
        ) {
            if remaining.is_empty() {
                out.push(current.clone());
                return;
            }
            let candidates: Vec<Variable> = remaining
                .iter()
                .filter(|v| {
                    let ancestors = graph.ancestors(&crate::variable::singleton((*v).clone()));
                    ancestors.iter().all(|a| placed.contains(a) || !remaining.contains(a))
                })
                .cloned()
                .collect();
            for v in candidates {
                let pos = remaining.iter().position(|x| x == &v).unwrap();
                remaining.remove(pos);
                placed.insert(v.clone());
                current.push(v.clone());

                backtrack(graph, remaining, placed, current, out);

                current.pop();
                placed.remove(&v);
                remaining.insert(pos, v);
            }
        }

        let mut remaining: Vec<Variable> = s.iter().cloned().collect();
        let mut out = Vec::new();
        backtrack(self, &mut remaining, &mut VarSet::new(), &mut Vec::new(), &mut out);
        out
    }

    /// Parse the graph text syntax: tokens separated by `;` or a
    /// newline, each either a comma-separated list of bare variable
    /// declarations or an edge `A,B,C->Y` (equivalently `Y<-A,B,C`).
    /// Latents are not part of this syntax; attach them afterwards with
    /// [`Graph::with_latents`].
    pub fn parse(text: &str) -> Result<Graph, IdentifyError> {
        let mut variables = VarSet::new();
        let mut parents: BTreeMap<Variable, VarSet> = BTreeMap::new();

        for raw_token in text.split(|c| c == ';' || c == '\n') {
            let token = raw_token.trim();
            if token.is_empty() {
                continue;
            }
            if let Some((params, rhs)) = token.split_once("->") {
                Self::parse_edge(params, rhs, &mut variables, &mut parents)?;
            } else if let Some((rhs, params)) = token.split_once("<-") {
                Self::parse_edge(params, rhs, &mut variables, &mut parents)?;
            } else {
                for name in token.split(',') {
                    variables.insert(Variable::new(name.trim())?);
                }
            }
        }

        let mut equations = BTreeSet::new();
        for (outcome, p) in parents {
            equations.insert(StructuralEquation::new(p, outcome)?);
        }

        Graph::new(variables, equations, VarSet::new())
    }

    fn parse_edge(
        params: &str,
        rhs: &str,
        variables: &mut VarSet,
        parents: &mut BTreeMap<Variable, VarSet>,
    ) -> Result<(), IdentifyError> {
        let outcome = Variable::new(rhs.trim())?;
        variables.insert(outcome.clone());
        let entry = parents.entry(outcome).or_default();
        for p in params.split(',') {
            let p = Variable::new(p.trim())?;
            variables.insert(p.clone());
            entry.insert(p);
        }
        Ok(())
    }

    /// Return a new graph identical to this one but with `latents` as its
    /// latent subset. The text grammar only produces `(V, E)`, so callers
    /// attach `L` separately after parsing.
    pub fn with_latents(&self, latents: VarSet) -> Result<Graph, IdentifyError> {
        Graph::new(self.variables.clone(), self.equations.clone(), latents)
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut parts: Vec<String> = self.equations.iter().map(StructuralEquation::to_string).collect();
        let in_equation: VarSet = self
            .equations
            .iter()
            .flat_map(|eq| eq.parents().iter().cloned().chain(std::iter::once(eq.outcome().clone())))
            .collect();
        let mut loners: Vec<String> = self
            .variables
            .difference(&in_equation)
            .map(Variable::to_string)
            .collect();
        loners.sort();
        parts.extend(loners);
        write!(f, "{}", parts.join(";"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::var_set;

    #[test]
    fn parse_round_trips_a_simple_chain() {
        let g = Graph::parse("X->Y;Y->Z").unwrap();
        assert_eq!(g.variables(), &var_set(["X", "Y", "Z"]).unwrap());
        assert_eq!(g.parents(&var_set(["Z"]).unwrap()), var_set(["Y"]).unwrap());
    }

    #[test]
    fn rejects_cycles() {
        assert!(Graph::parse("X->Y;Y->X").is_err());
    }

    #[test]
    fn rejects_duplicate_outcomes() {
        // Two separate equations for Y are impossible to express in one token,
        // but parse merges same-outcome tokens; exercise Graph::new directly.
        let vars = var_set(["X", "Y", "Z"]).unwrap();
        let eq1 = StructuralEquation::new(var_set(["X"]).unwrap(), Variable::new("Y").unwrap()).unwrap();
        let eq2 = StructuralEquation::new(var_set(["Z"]).unwrap(), Variable::new("Y").unwrap()).unwrap();
        let mut eqs = BTreeSet::new();
        eqs.insert(eq1);
        eqs.insert(eq2);
        assert!(Graph::new(vars, eqs, VarSet::new()).is_err());
    }

    #[test]
    fn ancestors_and_descendants_are_disjoint() {
        let g = Graph::parse("X->Y;Y->Z").unwrap();
        let x = var_set(["X"]).unwrap();
        assert!(g.ancestors(&x).is_disjoint(&g.descendants(&x)));
    }

    #[test]
    fn orphan_removes_only_incoming_edges() {
        let g = Graph::parse("X->Y;Y->Z").unwrap();
        let y = var_set(["Y"]).unwrap();
        let orphaned = g.orphan(&y);
        assert!(orphaned.parents(&y).is_empty());
        assert_eq!(orphaned.children(&y), g.children(&y));
    }

    #[test]
    fn bereave_removes_only_outgoing_edges() {
        let g = Graph::parse("X->Y;Y->Z").unwrap();
        let y = var_set(["Y"]).unwrap();
        let bereaved = g.bereave(&y);
        assert!(bereaved.children(&y).is_empty());
        assert_eq!(bereaved.parents(&y), g.parents(&y));
    }

    #[test]
    fn sub_graph_preserves_bidirected_confounding_through_a_dropped_latent() {
        let g = Graph::parse("X->Y;U->X;U->Y")
            .unwrap()
            .with_latents(var_set(["U"]).unwrap())
            .unwrap();
        let restricted = g.sub_graph(&var_set(["X", "Y"]).unwrap());
        assert!(restricted.latents().contains(&Variable::new("U").unwrap()));
        assert_eq!(
            restricted.maximal_c_components(&var_set(["X", "Y"]).unwrap()),
            vec![var_set(["X", "Y"]).unwrap()]
        );
    }

    #[test]
    fn joint_distribution_factors_over_every_variable() {
        let g = Graph::parse("X->Y;Y->Z").unwrap();
        match g.joint_distribution() {
            Expression::Product(terms) => assert_eq!(terms.len(), 3),
            other => panic!("expected a product of 3 terms, got {other}"),
        }
    }

    #[test]
    fn admissible_orderings_respect_ancestry() {
        let g = Graph::parse("Q->X;X->Y;Q->R;Q->S;R->Y;S->Y").unwrap();
        let orderings = g.admissible_orderings(&var_set(["X", "Y", "Q"]).unwrap());
        assert!(!orderings.is_empty());
        for ordering in &orderings {
            let q_pos = ordering.iter().position(|v| v.name() == "Q").unwrap();
            let x_pos = ordering.iter().position(|v| v.name() == "X").unwrap();
            let y_pos = ordering.iter().position(|v| v.name() == "Y").unwrap();
            assert!(q_pos < x_pos);
            assert!(x_pos < y_pos);
        }
    }

    #[test]
    fn conditionally_independent_is_symmetric() {
        let g = Graph::parse("X->Y;Y->Z").unwrap();
        let x = var_set(["X"]).unwrap();
        let z = var_set(["Z"]).unwrap();
        let w = var_set(["Y"]).unwrap();
        assert_eq!(
            g.conditionally_independent(&x, &z, &w),
            g.conditionally_independent(&z, &x, &w)
        );
    }
}
