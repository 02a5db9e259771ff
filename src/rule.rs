//! The three rules of do-calculus and their inverses, plus backdoor
//! adjustment, frontdoor adjustment, and the forward-identifiability macro
//! rule that wraps a complete ID/IDC search into a single applied transform.

use crate::adjustment;
use crate::expression::Expression;
use crate::graph::Graph;
use crate::path;
use crate::variable::{Variable, VarSet};

/// A single rule application, bound to the variable sets it touches. Each
/// variant corresponds to one of Pearl's three rules, its inverse, one of
/// the two named adjustment shortcuts, or the forward-identifiability macro
/// rule. The three shortcut variants carry their rewritten expression as a
/// "derived parameter" (spec.md §4.F's design note) since, unlike I/II/III,
/// their rewrite isn't a pure function of the statement's own `Y`/`do`/`Z`
/// sets — it also depends on the graph.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Rule {
    /// Rule I — drop `drop ⊆ Z` from the conditioning set.
    DeleteObservation { drop: VarSet },
    /// Rule II — move `moved ⊆ do` from intervention to conditioning.
    ActionObservationExchange { moved: VarSet },
    /// Rule III — drop `dropped ⊆ do` entirely.
    DeleteAction { dropped: VarSet },
    /// Rule I⁻¹ — introduce `added` into the conditioning set.
    InverseDeleteObservation { added: VarSet },
    /// Rule II⁻¹ — move `moved ⊆ Z` from conditioning to intervention.
    InverseActionObservationExchange { moved: VarSet },
    /// Rule III⁻¹ — introduce `added` as a fresh intervention.
    InverseDeleteAction { added: VarSet },
    /// Backdoor adjustment (spec.md §4.F): rewrite via a sufficient backdoor
    /// adjustment set, `Σ_S P(Y|X,Z,S)·P(S)`.
    BackdoorAdjustment { result: Box<Expression> },
    /// Frontdoor adjustment (spec.md §4.F): rewrite via a mediation set,
    /// `(Σ_M P(M|X))·(Σ_X′ P(Y|X′,M)·P(X′))`.
    FrontdoorAdjustment { result: Box<Expression> },
    /// The forward-identifiability macro rule (spec.md §4.F): wraps a
    /// complete ID/IDC search (§4.G) into one applied transform.
    ForwardIdentifiability { result: Box<Expression> },
}

impl Rule {
    /// The mutilated graph this rule's compatibility check is evaluated
    /// against. The three shortcut variants verify their compatibility by
    /// re-deriving their result from scratch instead (see
    /// [`Rule::is_compatible_with`]), so this is never invoked for them.
    fn mutilate(&self, graph: &Graph, x: &VarSet, z: &VarSet, w: &VarSet) -> Graph {
        match self {
            Rule::DeleteObservation { .. } | Rule::InverseDeleteObservation { .. } => {
                graph.orphan(x)
            }
            Rule::ActionObservationExchange { .. }
            | Rule::InverseActionObservationExchange { .. } => graph.orphan(x).bereave(z),
            Rule::DeleteAction { .. } | Rule::InverseDeleteAction { .. } => {
                let ancestors_in_w = graph.orphan(x).ancestors(w);
                let z_minus_ancestors: VarSet = z.difference(&ancestors_in_w).cloned().collect();
                graph.orphan(x).orphan(&z_minus_ancestors)
            }
            Rule::BackdoorAdjustment { .. }
            | Rule::FrontdoorAdjustment { .. }
            | Rule::ForwardIdentifiability { .. } => graph.clone(),
        }
    }

    /// `true` iff this rule's binding is valid for `statement` in `graph`
    /// with latents `latents`.
    pub fn is_compatible_with(&self, statement: &Expression, graph: &Graph, latents: &VarSet) -> bool {
        let Expression::P { y, do_, z } = statement else {
            return false;
        };
        match self {
            Rule::DeleteObservation { drop } | Rule::InverseDeleteObservation { added: drop } => {
                let (check_subset, w) = match self {
                    Rule::DeleteObservation { .. } => (drop.is_subset(z), z.difference(drop).cloned().collect()),
                    _ => (drop.is_disjoint(z), z.clone()),
                };
                if !check_subset || drop.is_empty() {
                    return false;
                }
                let mutilated = self.mutilate(graph, do_, drop, &w);
                mutilated.conditionally_independent(y, drop, &w) && drop.is_disjoint(latents)
            }
            Rule::ActionObservationExchange { moved }
            | Rule::InverseActionObservationExchange { moved } => {
                let (valid, w) = match self {
                    Rule::ActionObservationExchange { .. } => {
                        (moved.is_subset(do_), z.clone())
                    }
                    _ => (moved.is_subset(z), z.difference(moved).cloned().collect()),
                };
                if !valid || moved.is_empty() || !moved.is_disjoint(latents) {
                    return false;
                }
                let x_union_w: VarSet = do_.union(&w).cloned().collect();
                let mutilated = self.mutilate(graph, do_, moved, &x_union_w);
                mutilated.conditionally_independent(y, moved, &x_union_w)
            }
            Rule::DeleteAction { dropped } | Rule::InverseDeleteAction { added: dropped } => {
                let valid = match self {
                    Rule::DeleteAction { .. } => dropped.is_subset(do_),
                    _ => dropped.is_disjoint(do_) && dropped.is_disjoint(z) && dropped.is_disjoint(y),
                };
                if !valid || dropped.is_empty() || !dropped.is_disjoint(latents) {
                    return false;
                }
                let x_union_w: VarSet = do_.union(z).cloned().collect();
                let mutilated = self.mutilate(graph, do_, dropped, &x_union_w);
                mutilated.conditionally_independent(y, dropped, &x_union_w)
            }
            Rule::BackdoorAdjustment { result } => {
                backdoor_expression(graph, do_, y, z, latents).as_ref() == Some(result.as_ref())
            }
            Rule::FrontdoorAdjustment { result } => {
                z.is_empty()
                    && frontdoor_expression(graph, do_, y, latents).as_ref() == Some(result.as_ref())
            }
            Rule::ForwardIdentifiability { result } => {
                crate::id::idc(graph, y, do_, z, latents).ok().as_ref() == Some(result.as_ref())
            }
        }
    }

    /// Rewrite `statement` per this rule. Panics if `statement`
    /// is not a `P` atom or the binding's sets don't fit — callers should
    /// only apply bindings that passed [`Rule::is_compatible_with`].
    pub fn apply(&self, statement: &Expression) -> Expression {
        let Expression::P { y, do_, z } = statement else {
            panic!("a rule only rewrites a P atom");
        };
        let (new_do, new_z) = match self {
            Rule::DeleteObservation { drop } => (do_.clone(), z.difference(drop).cloned().collect()),
            Rule::InverseDeleteObservation { added } => {
                (do_.clone(), z.union(added).cloned().collect())
            }
            Rule::ActionObservationExchange { moved } => (
                do_.difference(moved).cloned().collect(),
                z.union(moved).cloned().collect(),
            ),
            Rule::InverseActionObservationExchange { moved } => (
                do_.union(moved).cloned().collect(),
                z.difference(moved).cloned().collect(),
            ),
            Rule::DeleteAction { dropped } => (do_.difference(dropped).cloned().collect(), z.clone()),
            Rule::InverseDeleteAction { added } => {
                (do_.union(added).cloned().collect(), z.clone())
            }
            Rule::BackdoorAdjustment { result }
            | Rule::FrontdoorAdjustment { result }
            | Rule::ForwardIdentifiability { result } => return (**result).clone(),
        };
        Expression::p(y.clone(), new_do, new_z).expect("a rule preserves Y and disjointness")
    }

    /// Every binding of this rule variant that is compatible with
    /// `statement` in `graph`. Forward rules draw candidates
    /// from subsets of the statement's current `Z`/`do`; inverse rules draw
    /// candidates from the graph's full variable set minus what's already
    /// present, since there is nothing in the statement to enumerate from.
    pub fn bindings(statement: &Expression, graph: &Graph, latents: &VarSet) -> Vec<Rule> {
        let Expression::P { y, do_, z } = statement else {
            return Vec::new();
        };
        let mut out = Vec::new();
        for drop in non_empty_subsets(z) {
            let rule = Rule::DeleteObservation { drop };
            if rule.is_compatible_with(statement, graph, latents) {
                out.push(rule);
            }
        }
        for moved in non_empty_subsets(do_) {
            let rule = Rule::ActionObservationExchange { moved };
            if rule.is_compatible_with(statement, graph, latents) {
                out.push(rule);
            }
        }
        for dropped in non_empty_subsets(do_) {
            let rule = Rule::DeleteAction { dropped };
            if rule.is_compatible_with(statement, graph, latents) {
                out.push(rule);
            }
        }
        if let Some(result) = backdoor_expression(graph, do_, y, z, latents) {
            let rule = Rule::BackdoorAdjustment { result: Box::new(result) };
            if rule.is_compatible_with(statement, graph, latents) {
                out.push(rule);
            }
        }
        if z.is_empty() {
            if let Some(result) = frontdoor_expression(graph, do_, y, latents) {
                let rule = Rule::FrontdoorAdjustment { result: Box::new(result) };
                if rule.is_compatible_with(statement, graph, latents) {
                    out.push(rule);
                }
            }
        }
        if let Some(rule) = forward_identifiability(statement, graph, latents) {
            out.push(rule);
        }
        out
    }
}

/// All non-empty subsets of a small variable set, used to enumerate rule
/// bindings.
fn non_empty_subsets(set: &VarSet) -> Vec<VarSet> {
    let items: Vec<_> = set.iter().cloned().collect();
    let mut out = Vec::new();
    for mask in 1u32..(1u32 << items.len()) {
        let subset: VarSet = items
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, v)| v.clone())
            .collect();
        out.push(subset);
    }
    out
}

/// `backdoor_expression(X, Y, Z, graph, latents)`: find a sufficient
/// backdoor adjustment set `S` for `X → Y` (given the current conditioning
/// set `Z`) and rewrite `P(Y|do(X),Z)` as `Σ_S P(Y|X,Z,S)·P(S)`, the same
/// shape [`frontdoor_expression`] builds for the mediator case. When no
/// confounder needs blocking, `S = ∅` and the rewrite collapses to the bare
/// `P(Y|X,Z)`.
pub fn backdoor_expression(
    graph: &Graph,
    x: &VarSet,
    y: &VarSet,
    z: &VarSet,
    latents: &VarSet,
) -> Option<Expression> {
    let s = adjustment::backdoor_sets(graph, x, y, z, latents).into_iter().next()?;
    let conditioning: VarSet = x.union(z).chain(s.iter()).cloned().collect();
    let p_y = Expression::p(y.clone(), VarSet::new(), conditioning).ok()?;
    if s.is_empty() {
        return Some(p_y);
    }
    let p_s = Expression::p(s.clone(), VarSet::new(), VarSet::new()).ok()?;
    Expression::marginalize(Expression::product([p_y, p_s]), s).ok()
}

/// `forward_identifiability(statement, graph, latents)` — spec.md §4.F's
/// macro rule: wrap a complete ID/IDC search (§4.G) into a single applied
/// transform. `None` if `statement` isn't a `P` atom or the search fails.
fn forward_identifiability(statement: &Expression, graph: &Graph, latents: &VarSet) -> Option<Rule> {
    let Expression::P { y, do_, z } = statement else {
        return None;
    };
    let result = crate::id::idc(graph, y, do_, z, latents).ok()?;
    let rule = Rule::ForwardIdentifiability { result: Box::new(result) };
    rule.is_compatible_with(statement, graph, latents).then_some(rule)
}

/// `frontdoor_expression(X, Y, graph, latents)`: find a
/// mediation set `M` such that (i) `M` intercepts every directed
/// `X→…→Y` path, (ii) no unblocked backdoor path runs from `X` to `M`, and
/// (iii) every backdoor path from `M` to `Y` is blocked by `X`; rewrite as
/// `(Σ_M P(M|X)) · (Σ_X′ P(Y|X′,M)·P(X′))`.
pub fn frontdoor_expression(
    graph: &Graph,
    x: &VarSet,
    y: &VarSet,
    latents: &VarSet,
) -> Option<Expression> {
    let candidates = adjustment::mediation_sets(graph, x, y, latents);
    let m = candidates.into_iter().find(|m| {
        path::backdoor_paths(graph, x, m, &VarSet::new()).is_empty()
            && path::backdoor_paths(graph, m, y, x).is_empty()
    })?;

    let x_prime: VarSet = x
        .iter()
        .map(|v| Variable::new(format!("{}_fd", v.name())))
        .collect::<Result<_, _>>()
        .ok()?;

    let term1 = Expression::marginalize(Expression::p(m.clone(), VarSet::new(), x.clone()).ok()?, m.clone())
        .ok()?;

    let y_given_x_prime_and_m: VarSet = x_prime.union(&m).cloned().collect();
    let inner = Expression::product([
        Expression::p(y.clone(), VarSet::new(), y_given_x_prime_and_m).ok()?,
        Expression::p(x_prime.clone(), VarSet::new(), VarSet::new()).ok()?,
    ]);
    let term2 = Expression::marginalize(inner, x_prime).ok()?;

    Some(Expression::product([term1, term2]))
}
