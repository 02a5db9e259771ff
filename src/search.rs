//! Statement-level breadth-first derivation search.
//!
//! Inverse rules are deliberately excluded from this search: mixing them in
//! would let the frontier grow without a finite-reachable-expression
//! termination argument. They're applied only inside the
//! backdoor/frontdoor/ID shortcuts, which reason about specific target
//! forms instead of searching blindly.

use crate::derivation::{Derivation, Outcome};
use crate::expression::Expression;
use crate::graph::Graph;
use crate::rule::Rule;
use crate::variable::VarSet;
use std::collections::{HashSet, VecDeque};

/// Breadth-first search for a hat-free rewriting of `query`.
/// `visited_limit`, if set, caps the number of distinct expressions dequeued
/// before giving up with [`Outcome::Undetermined`]; `None`
/// runs to exhaustion.
pub fn identify(
    query: Expression,
    graph: &Graph,
    latents: &VarSet,
    visited_limit: Option<usize>,
) -> Outcome {
    let mut visited: HashSet<Expression> = HashSet::new();
    let mut frontier: VecDeque<Derivation> = VecDeque::new();
    frontier.push_back(Derivation::start(query.clone()));
    visited.insert(query);

    let mut popped = 0usize;
    while let Some(derivation) = frontier.pop_front() {
        popped += 1;
        if derivation.expression().hat_free() {
            return Outcome::Identified(derivation);
        }
        if let Some(limit) = visited_limit {
            if popped > limit {
                return Outcome::Undetermined { visited: popped };
            }
        }

        for rule in Rule::bindings(derivation.expression(), graph, latents) {
            let rewritten = rule.apply(derivation.expression());
            if visited.insert(rewritten.clone()) {
                frontier.push_back(derivation.step(rule, rewritten));
            }
        }
    }

    Outcome::Undetermined { visited: popped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::var_set;

    #[test]
    fn simple_chain_is_identified_via_rule_ii() {
        let g = Graph::parse("X->Y").unwrap();
        let query = Expression::p(var_set(["Y"]).unwrap(), var_set(["X"]).unwrap(), VarSet::new()).unwrap();
        match identify(query, &g, &VarSet::new(), Some(1000)) {
            Outcome::Identified(d) => assert_eq!(d.expression().to_string(), "P(Y|X)"),
            other => panic!("expected identification, got {other}"),
        }
    }

    #[test]
    fn already_hat_free_query_is_returned_immediately() {
        let g = Graph::parse("X->Y").unwrap();
        let query = Expression::observe(var_set(["Y"]).unwrap()).unwrap();
        match identify(query.clone(), &g, &VarSet::new(), Some(10)) {
            Outcome::Identified(d) => assert_eq!(d.expression(), &query),
            other => panic!("expected identification, got {other}"),
        }
    }

    #[test]
    fn search_idempotence() {
        let g = Graph::parse("X->Y").unwrap();
        let query = Expression::p(var_set(["Y"]).unwrap(), var_set(["X"]).unwrap(), VarSet::new()).unwrap();
        let first = match identify(query, &g, &VarSet::new(), Some(1000)) {
            Outcome::Identified(d) => d.expression().clone(),
            other => panic!("expected identification, got {other}"),
        };
        let second = match identify(first.clone(), &g, &VarSet::new(), Some(1000)) {
            Outcome::Identified(d) => d.expression().clone(),
            other => panic!("expected identification, got {other}"),
        };
        assert_eq!(first, second);
    }
}
