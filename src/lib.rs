//! A symbolic causal-identification engine.
//!
//! Given a causal diagram (observed and latent variables tied together by
//! structural equations) and an interventional query, this crate decides
//! whether the query is identifiable from observational data and, if so,
//! returns a symbolic expression over plain conditional distributions
//! together with a derivation justifying the rewrite.
//!
//! The crate is organized bottom-up: [`variable`] and [`expression`] are the
//! symbolic algebra; [`graph`] and [`path`] are the causal-graph reasoning
//! layer; [`adjustment`] and [`ccomponent`] derive blocking sets and hedge
//! witnesses from the graph; [`rule`] is the do-calculus rule library;
//! [`search`] and [`id`] are the two derivation drivers (forward BFS and the
//! ID/IDC recursion); [`parser`] turns text into [`expression::Expression`]
//! and [`graph::Graph`] values.

pub mod adjustment;
pub mod ccomponent;
pub mod derivation;
pub mod error;
pub mod expression;
pub mod graph;
pub mod id;
pub mod parser;
pub mod path;
pub mod rule;
pub mod search;
pub mod variable;

#[cfg(test)]
mod _scenario_tests;

pub use derivation::{Derivation, Outcome};
pub use error::{IdentifyError, Result};
pub use expression::Expression;
pub use graph::Graph;
pub use variable::{Variable, VarSet};

/// `identify(query, graph, latents)` — the top-level entry point, composing
/// both of spec.md §4.G's "two cooperating drivers". Runs the forward BFS
/// derivation search first; at every statement it visits, [`rule::Rule`]'s
/// bindings already include the backdoor-adjustment, frontdoor-adjustment,
/// and forward-identifiability shortcuts (each of which, when compatible,
/// reaches a hat-free expression in a single step), so most queries resolve
/// without ever falling back. If the search instead exhausts its frontier
/// (or `visited_limit`) without finding a derivation, and the query is a
/// single `P(Y|do(X),Z)` atom, the ID/IDC recursion is consulted directly:
/// it is sound and complete, so an `Err` from it is an authoritative hedge
/// witness (returned as [`Outcome::NotIdentifiable`]) rather than merely
/// "undetermined".
pub fn identify(
    query: Expression,
    graph: &Graph,
    latents: &VarSet,
    visited_limit: Option<usize>,
) -> Outcome {
    let outcome = search::identify(query.clone(), graph, latents, visited_limit);
    if let Outcome::Undetermined { .. } = &outcome {
        if let Expression::P { y, do_, z } = &query {
            if !do_.is_empty() {
                if let Err(hedge) = id::idc(graph, y, do_, z, latents) {
                    return Outcome::NotIdentifiable(hedge);
                }
            }
        }
    }
    outcome
}

/// `backdoor_sets(X, Y, graph, latents)` — sufficient backdoor adjustment
/// sets for `X → Y`.
pub fn backdoor_sets(graph: &Graph, x: &VarSet, y: &VarSet, latents: &VarSet) -> Vec<VarSet> {
    adjustment::backdoor_sets(graph, x, y, &VarSet::new(), latents)
}

/// `backdoor_expression(X, Y, graph, latents)` — rewrite `P(Y|do(X))` via a
/// sufficient backdoor adjustment set, the same shape [`frontdoor_expression`]
/// builds for the mediator case.
pub fn backdoor_expression(
    graph: &Graph,
    x: &VarSet,
    y: &VarSet,
    latents: &VarSet,
) -> Option<Expression> {
    rule::backdoor_expression(graph, x, y, &VarSet::new(), latents)
}

/// `is_conditionally_independent(Y, Z, W, graph)`.
pub fn is_conditionally_independent(graph: &Graph, y: &VarSet, z: &VarSet, w: &VarSet) -> bool {
    graph.conditionally_independent(y, z, w)
}

/// `idc(Y, X, Z, graph, latents)` — the ID/IDC recursion (Shpitser & Pearl
/// 2006) for the conditional query `P(Y|do(X),Z)`. Unlike [`identify`] (the
/// forward BFS rule-application search), this is the direct recursive
/// algorithm of spec §4.G steps 1-7, extended to conditional queries by
/// moving observed variables from `Z` into `X` whenever a d-separation
/// condition licenses it.
pub fn idc(
    graph: &Graph,
    y: &VarSet,
    x: &VarSet,
    z: &VarSet,
    latents: &VarSet,
) -> std::result::Result<Expression, ccomponent::Hedge> {
    id::idc(graph, y, x, z, latents)
}

/// `frontdoor_expression(X, Y, graph, latents)`.
pub fn frontdoor_expression(
    graph: &Graph,
    x: &VarSet,
    y: &VarSet,
    latents: &VarSet,
) -> Option<Expression> {
    rule::frontdoor_expression(graph, x, y, latents)
}
