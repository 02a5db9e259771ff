//! The ID recursion (Shpitser & Pearl 2006).
//!
//! The Python prototype's `shpister.py` sketches this recursion with
//! mis-arity recursive calls and `???`/`return None` placeholders; this is a
//! complete, from-scratch implementation of the algorithm it was sketching.

use crate::ccomponent::Hedge;
use crate::expression::Expression;
use crate::graph::Graph;
use crate::variable::{Variable, VarSet};

/// `ID(Y, X, G)`: is `P(Y|do(X))` identifiable in `G` with latents
/// `latents`? Returns the hat-free expression if so, or the hedge witness
/// that precludes it.
pub fn id(graph: &Graph, y: &VarSet, x: &VarSet, latents: &VarSet) -> Result<Expression, Hedge> {
    let order = canonical_order(graph);
    id_rec(graph, y, x, latents, &order)
}

fn canonical_order(graph: &Graph) -> Vec<Variable> {
    graph
        .admissible_orderings(graph.variables())
        .into_iter()
        .next()
        .unwrap_or_default()
}

fn observed(graph: &Graph, latents: &VarSet) -> VarSet {
    graph.variables().difference(latents).cloned().collect()
}

fn id_rec(
    graph: &Graph,
    y: &VarSet,
    x: &VarSet,
    latents: &VarSet,
    order: &[Variable],
) -> Result<Expression, Hedge> {
    let v = observed(graph, latents);

    // Step 1: no intervention left — the answer is the marginal over V∖Y.
    if x.is_empty() {
        let margins: VarSet = v.difference(y).cloned().collect();
        return Ok(Expression::marginalize(graph.joint_distribution(), margins)
            .expect("margins are a subset of V, which is free in the joint"));
    }

    // Step 2: restrict attention to the ancestors of Y.
    let ancestors_y: VarSet = y.union(&graph.ancestors(y)).cloned().collect();
    if v.difference(&ancestors_y).next().is_some() {
        let restricted = graph.sub_graph(&ancestors_y);
        let x_restricted: VarSet = x.intersection(&ancestors_y).cloned().collect();
        let restricted_latents: VarSet = latents.intersection(&ancestors_y).cloned().collect();
        return id_rec(&restricted, y, &x_restricted, &restricted_latents, order);
    }

    // Step 3: variables forced into X by the mutilated-graph's remaining
    // non-ancestors of Y.
    let orphaned_x = graph.orphan(x);
    let ancestors_y_in_orphaned_x: VarSet = y.union(&orphaned_x.ancestors(y)).cloned().collect();
    let w: VarSet = v
        .difference(x)
        .filter(|candidate| !ancestors_y_in_orphaned_x.contains(*candidate))
        .cloned()
        .collect();
    if !w.is_empty() {
        let x_union_w: VarSet = x.union(&w).cloned().collect();
        return id_rec(graph, y, &x_union_w, latents, order);
    }

    // Step 4/5: c-components of G[V∖X].
    let v_minus_x: VarSet = v.difference(x).cloned().collect();
    let sub = graph.sub_graph(&v_minus_x);
    let components = sub.maximal_c_components(&v_minus_x);

    if components.len() > 1 {
        let mut factors = Vec::new();
        for s in &components {
            let s_complement: VarSet = v.difference(s).cloned().collect();
            factors.push(id_rec(graph, s, &s_complement, latents, order)?);
        }
        let margins: VarSet = v
            .difference(y)
            .filter(|v| !x.contains(*v))
            .cloned()
            .collect();
        return Expression::marginalize(Expression::product(factors), margins)
            .map_err(|_| unreachable_hedge(graph, &v));
    }

    let s = components.into_iter().next().unwrap_or_default();
    let whole_graph_components = graph.maximal_c_components(&v);

    // Step 5: the whole graph is a single c-component — a hedge.
    if whole_graph_components.len() == 1 && whole_graph_components[0] == v {
        return Err(Hedge::new(graph, v.clone(), s).unwrap_or_else(|| unreachable_hedge(graph, &v)));
    }

    // Step 6: S is itself a c-component of the original graph — the
    // topological factorization applies directly.
    if whole_graph_components.iter().any(|c| c == &s) {
        let margins: VarSet = s.difference(y).cloned().collect();
        let factors = topological_factorization(graph, &s, order);
        return Expression::marginalize(Expression::product(factors), margins)
            .map_err(|_| unreachable_hedge(graph, &v));
    }

    // Step 7: S is strictly inside some c-component S' of the original graph.
    if let Some(s_prime) = whole_graph_components.into_iter().find(|c| s.is_subset(c) && &s != c) {
        let restricted = graph.sub_graph(&s_prime);
        let restricted_latents: VarSet = latents.intersection(&s_prime).cloned().collect();
        let x_in_s_prime: VarSet = x.intersection(&s_prime).cloned().collect();
        return id_rec(&restricted, y, &x_in_s_prime, &restricted_latents, order);
    }

    Err(unreachable_hedge(graph, &v))
}

/// `∏_{Vᵢ∈S} P(Vᵢ | predecessors of Vᵢ in the fixed order)`, where "predecessors" ranges over the whole vertex universe that
/// `order` was built from, not just `S`.
fn topological_factorization(graph: &Graph, s: &VarSet, order: &[Variable]) -> Vec<Expression> {
    let mut seen_before: VarSet = VarSet::new();
    let mut factors = Vec::new();
    for v in order {
        if s.contains(v) {
            let y = crate::variable::singleton(v.clone());
            let z = seen_before.clone();
            factors.push(
                Expression::p(y, VarSet::new(), z).expect("Y is a singleton disjoint from its predecessors"),
            );
        }
        seen_before.insert(v.clone());
    }
    factors
}

/// A defensive fallback hedge for algorithm branches that a well-formed
/// graph's own invariants guarantee are unreachable.
fn unreachable_hedge(graph: &Graph, v: &VarSet) -> Hedge {
    Hedge::new(graph, v.clone(), VarSet::new()).expect("V always strictly contains the empty forest")
}

/// `IDC(Y, X, Z, G)`: is `P(Y|do(X),Z)` identifiable? Per Shpitser & Pearl
/// 2006, repeatedly move any `z ∈ Z` with `Y ⟂ z | X, Z∖{z}` in
/// `orphan(X).bereave({z})` into `X`; once no such `z` remains, run plain
/// `ID` on `Y ∪ Z` and divide out the marginal over `Y`.
pub fn idc(
    graph: &Graph,
    y: &VarSet,
    x: &VarSet,
    z: &VarSet,
    latents: &VarSet,
) -> Result<Expression, Hedge> {
    let mut x = x.clone();
    let mut z = z.clone();
    loop {
        let rest: VarSet = z.difference(&x).cloned().collect();
        let candidate = rest.iter().find(|zi| {
            let w: VarSet = z.iter().filter(|v| *v != *zi).cloned().collect();
            let mutilated = graph.orphan(&x).bereave(&crate::variable::singleton((*zi).clone()));
            mutilated.conditionally_independent(y, &crate::variable::singleton((*zi).clone()), &x.union(&w).cloned().collect())
        }).cloned();
        match candidate {
            Some(zi) => {
                z.remove(&zi);
                x.insert(zi);
            }
            None => break,
        }
    }

    let y_union_z: VarSet = y.union(&z).cloned().collect();
    let numerator = id_rec(graph, &y_union_z, &x, latents, &canonical_order(graph))?;
    if z.is_empty() {
        return Ok(numerator);
    }
    let margins: VarSet = z.clone();
    let denominator = Expression::marginalize(numerator.clone(), margins)
        .map_err(|_| unreachable_hedge(graph, &y_union_z))?;
    Ok(Expression::quotient(numerator, denominator))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::var_set;

    #[test]
    fn chain_is_identified_by_the_joint() {
        let g = Graph::parse("X->Y").unwrap();
        let result = id(&g, &var_set(["Y"]).unwrap(), &var_set(["X"]).unwrap(), &VarSet::new());
        assert!(result.is_ok());
    }

    #[test]
    fn bow_arc_is_a_hedge() {
        let g = Graph::parse("X->Y;U->X;U->Y")
            .unwrap()
            .with_latents(var_set(["U"]).unwrap())
            .unwrap();
        let result = id(&g, &var_set(["Y"]).unwrap(), &var_set(["X"]).unwrap(), &var_set(["U"]).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn backdoor_confounded_pair_is_identified() {
        let g = Graph::parse("X->Y;U->X;U->Y").unwrap();
        let result = id(&g, &var_set(["Y"]).unwrap(), &var_set(["X"]).unwrap(), &VarSet::new());
        assert!(result.is_ok());
    }

    #[test]
    fn idc_on_an_unconfounded_chain_is_identified() {
        let g = Graph::parse("X->Y;Y->Z").unwrap();
        let result = idc(
            &g,
            &var_set(["Z"]).unwrap(),
            &var_set(["X"]).unwrap(),
            &var_set(["Y"]).unwrap(),
            &VarSet::new(),
        );
        assert!(result.is_ok());
        assert!(result.unwrap().hat_free());
    }

    #[test]
    fn idc_with_no_conditioning_set_matches_plain_id() {
        let g = Graph::parse("X->Y").unwrap();
        let via_idc = idc(&g, &var_set(["Y"]).unwrap(), &var_set(["X"]).unwrap(), &VarSet::new(), &VarSet::new());
        let via_id = id(&g, &var_set(["Y"]).unwrap(), &var_set(["X"]).unwrap(), &VarSet::new());
        assert_eq!(via_idc.unwrap(), via_id.unwrap());
    }
}
