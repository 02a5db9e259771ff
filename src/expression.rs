//! The symbolic expression algebra over interventional probability statements.
//!
//! `Expression` is a closed recursive sum type. Every variant derives
//! `Ord`/`Hash` structurally: [`VarSet`] is a [`std::collections::BTreeSet`]
//! and `Product`'s terms are a `BTreeSet<Expression>`, so two expressions
//! that differ only in the order their sub-terms were built compare and hash
//! identically — structural equality "modulo set/product commutativity" falls
//! out of the representation rather than needing a bespoke `Eq` impl.

use crate::error::IdentifyError;
use crate::variable::{Variable, VarSet};
use std::collections::BTreeSet;
use std::fmt;

/// A closed recursive probability expression.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Expression {
    /// `P(Y, do, Z)` — semantically `P(Y | do(do), Z)`. `Y`, `do`, and `Z`
    /// are pairwise disjoint and `Y` is non-empty; this is enforced at
    /// construction by [`Expression::p`].
    P { y: VarSet, do_: VarSet, z: VarSet },
    /// A commutative, associative product of sub-expressions.
    Product(BTreeSet<Expression>),
    /// A quotient of two sub-expressions.
    Quotient(Box<Expression>, Box<Expression>),
    /// `Σ_margins expression`.
    Marginalization {
        expression: Box<Expression>,
        margins: VarSet,
    },
}

impl Expression {
    /// Construct `P(Y, do, Z)`, validating disjointness and non-empty `Y`.
    pub fn p(y: VarSet, do_: VarSet, z: VarSet) -> Result<Expression, IdentifyError> {
        if y.is_empty() {
            return Err(IdentifyError::MalformedAtom(
                "outcome set Y must be non-empty".to_string(),
            ));
        }
        if !y.is_disjoint(&do_) || !y.is_disjoint(&z) || !do_.is_disjoint(&z) {
            return Err(IdentifyError::MalformedAtom(
                "Y, do, and Z must be pairwise disjoint".to_string(),
            ));
        }
        Ok(Expression::P { y, do_, z })
    }

    /// `P(Y)` with no interventions or conditioning — a plain joint/marginal.
    pub fn observe(y: VarSet) -> Result<Expression, IdentifyError> {
        Expression::p(y, VarSet::new(), VarSet::new())
    }

    /// Build a product, flattening nested products and collapsing a
    /// single-term product down to that term.
    pub fn product(terms: impl IntoIterator<Item = Expression>) -> Expression {
        let mut flat = BTreeSet::new();
        for term in terms {
            match term {
                Expression::Product(inner) => flat.extend(inner),
                other => {
                    flat.insert(other);
                }
            }
        }
        if flat.len() == 1 {
            flat.into_iter().next().unwrap()
        } else {
            Expression::Product(flat)
        }
    }

    pub fn quotient(numerator: Expression, denominator: Expression) -> Expression {
        Expression::Quotient(Box::new(numerator), Box::new(denominator))
    }

    /// `Σ_margins expression`. Margins over the empty set return the inner
    /// expression unchanged. Margins must be a subset of the expression's
    /// free variables.
    pub fn marginalize(
        expression: Expression,
        margins: VarSet,
    ) -> Result<Expression, IdentifyError> {
        if margins.is_empty() {
            return Ok(expression);
        }
        let free = expression.free_variables();
        if !margins.is_subset(&free) {
            let bad: Vec<String> = margins
                .difference(&free)
                .map(|v| v.name().to_string())
                .collect();
            return Err(IdentifyError::MarginsNotFree(bad));
        }
        Ok(Expression::Marginalization {
            expression: Box::new(expression),
            margins,
        })
    }

    /// `true` iff no `P` atom anywhere inside has a non-empty `do` field.
    pub fn hat_free(&self) -> bool {
        match self {
            Expression::P { do_, .. } => do_.is_empty(),
            Expression::Product(terms) => terms.iter().all(Expression::hat_free),
            Expression::Quotient(n, d) => n.hat_free() && d.hat_free(),
            Expression::Marginalization { expression, .. } => expression.hat_free(),
        }
    }

    /// The free (observable, non-intervention) variables of this expression:
    /// the union of `Y ∪ Z` across every `P` atom reachable inside, minus any
    /// variables bound by an enclosing [`Expression::Marginalization`].
    pub fn free_variables(&self) -> VarSet {
        match self {
            Expression::P { y, z, .. } => y.union(z).cloned().collect(),
            Expression::Product(terms) => terms
                .iter()
                .flat_map(Expression::free_variables)
                .collect(),
            Expression::Quotient(n, d) => {
                n.free_variables().union(&d.free_variables()).cloned().collect()
            }
            Expression::Marginalization {
                expression,
                margins,
            } => expression
                .free_variables()
                .difference(margins)
                .cloned()
                .collect(),
        }
    }

    /// Every `Variable` appearing anywhere in the expression, including
    /// `do`-variables and margins — used by the search's visited-state
    /// bookkeeping and by rule binding enumeration.
    pub fn all_variables(&self) -> VarSet {
        match self {
            Expression::P { y, do_, z } => y.union(do_).chain(z).cloned().collect(),
            Expression::Product(terms) => {
                terms.iter().flat_map(Expression::all_variables).collect()
            }
            Expression::Quotient(n, d) => {
                n.all_variables().union(&d.all_variables()).cloned().collect()
            }
            Expression::Marginalization {
                expression,
                margins,
            } => expression
                .all_variables()
                .union(margins)
                .cloned()
                .collect(),
        }
    }
}

fn format_var_set(vs: &VarSet) -> String {
    vs.iter().map(Variable::to_string).collect::<Vec<_>>().join(",")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expression::P { y, do_, z } => {
                let ys = format_var_set(y);
                let dos: Vec<String> = do_.iter().map(|v| format!("do({v})")).collect();
                let zs = format_var_set(z);
                let mut rhs: Vec<String> = dos;
                if !zs.is_empty() {
                    rhs.push(zs);
                }
                if rhs.is_empty() {
                    write!(f, "P({ys})")
                } else {
                    write!(f, "P({}|{})", ys, rhs.join(","))
                }
            }
            Expression::Product(terms) => {
                let s: Vec<String> = terms.iter().map(Expression::to_string).collect();
                write!(f, "{}", s.join(" * "))
            }
            Expression::Quotient(n, d) => write!(f, "{n} / {d}"),
            Expression::Marginalization {
                expression,
                margins,
            } => write!(f, "E[{};{}]", expression, format_var_set(margins)),
        }
    }
}

/// Build a random expression tree over `pool` for fuzzing structural
/// invariants such as hat-freedom of observational terms.
#[cfg(test)]
fn random_expression(depth: u32, pool: &[Variable], rng: &mut impl rand::RngCore) -> Expression {
    use rand::{Rng, RngCore};

    let pick_nonempty = |rng: &mut dyn rand::RngCore, pool: &[Variable]| -> VarSet {
        let count = 1 + (rng.next_u32() as usize % pool.len());
        pool.iter().take(count).cloned().collect()
    };

    if depth == 0 || rng.gen_bool(0.5) {
        return Expression::observe(pick_nonempty(rng, pool)).expect("pool is non-empty");
    }
    match rng.next_u32() % 3 {
        0 => {
            let a = random_expression(depth - 1, pool, rng);
            let b = random_expression(depth - 1, pool, rng);
            Expression::product([a, b])
        }
        1 => {
            let a = random_expression(depth - 1, pool, rng);
            let b = random_expression(depth - 1, pool, rng);
            Expression::quotient(a, b)
        }
        _ => {
            let inner = random_expression(depth - 1, pool, rng);
            let margins: VarSet = inner
                .free_variables()
                .into_iter()
                .take(1)
                .collect();
            Expression::marginalize(inner, margins).expect("margins drawn from free variables")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variable::var_set;
    use rand::SeedableRng;

    fn v(name: &str) -> Variable {
        Variable::new(name).unwrap()
    }

    #[test]
    fn random_expressions_are_always_hat_free() {
        let pool: Vec<Variable> = ["A", "B", "C"].iter().map(|n| v(n)).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(42);
        for _ in 0..50 {
            let expr = random_expression(3, &pool, &mut rng);
            assert!(expr.hat_free(), "observational terms never introduce a do-atom");
        }
    }

    #[test]
    fn p_rejects_overlapping_sets() {
        let y = var_set(["X"]).unwrap();
        let do_ = var_set(["X"]).unwrap();
        assert!(Expression::p(y, do_, VarSet::new()).is_err());
    }

    #[test]
    fn p_rejects_empty_y() {
        assert!(Expression::p(VarSet::new(), VarSet::new(), VarSet::new()).is_err());
    }

    #[test]
    fn product_of_one_returns_the_term() {
        let atom = Expression::observe(var_set(["Y"]).unwrap()).unwrap();
        let product = Expression::product([atom.clone()]);
        assert_eq!(product, atom);
    }

    #[test]
    fn product_flattens_nested_products() {
        let a = Expression::observe(var_set(["A"]).unwrap()).unwrap();
        let b = Expression::observe(var_set(["B"]).unwrap()).unwrap();
        let c = Expression::observe(var_set(["C"]).unwrap()).unwrap();
        let nested = Expression::product([Expression::product([a.clone(), b.clone()]), c.clone()]);
        let flat = Expression::product([a, b, c]);
        assert_eq!(nested, flat);
    }

    #[test]
    fn product_is_commutative_structurally() {
        let a = Expression::observe(var_set(["A"]).unwrap()).unwrap();
        let b = Expression::observe(var_set(["B"]).unwrap()).unwrap();
        assert_eq!(
            Expression::product([a.clone(), b.clone()]),
            Expression::product([b, a])
        );
    }

    #[test]
    fn marginalize_over_empty_is_identity() {
        let atom = Expression::observe(var_set(["Y"]).unwrap()).unwrap();
        let marginalized = Expression::marginalize(atom.clone(), VarSet::new()).unwrap();
        assert_eq!(marginalized, atom);
    }

    #[test]
    fn marginalize_rejects_non_free_variables() {
        let atom = Expression::observe(var_set(["Y"]).unwrap()).unwrap();
        assert!(Expression::marginalize(atom, var_set(["Z"]).unwrap()).is_err());
    }

    #[test]
    fn hat_freeness_propagates_through_every_combinator() {
        let hat = Expression::p(var_set(["Y"]).unwrap(), var_set(["X"]).unwrap(), VarSet::new())
            .unwrap();
        let free = Expression::observe(var_set(["Y"]).unwrap()).unwrap();
        assert!(!hat.hat_free());
        assert!(free.hat_free());
        assert!(!Expression::product([hat.clone(), free.clone()]).hat_free());
        assert!(Expression::product([free.clone(), free.clone()]).hat_free());
        assert!(!Expression::quotient(hat.clone(), free.clone()).hat_free());
        assert!(!Expression::marginalize(hat, var_set(["Y"]).unwrap())
            .unwrap()
            .hat_free());
    }

    #[test]
    fn display_matches_canonical_surface_syntax() {
        let e = Expression::p(var_set(["Y"]).unwrap(), var_set(["X"]).unwrap(), var_set(["Z"]).unwrap())
            .unwrap();
        assert_eq!(e.to_string(), "P(Y|do(X),Z)");
        let plain = Expression::observe(var_set(["Y"]).unwrap()).unwrap();
        assert_eq!(plain.to_string(), "P(Y)");
    }

    #[test]
    fn free_variables_exclude_do_and_bound_margins() {
        let e = Expression::p(var_set(["Y"]).unwrap(), var_set(["X"]).unwrap(), var_set(["Z"]).unwrap())
            .unwrap();
        let free = e.free_variables();
        assert_eq!(free, var_set(["Y", "Z"]).unwrap());
        let marginalized = Expression::marginalize(e, var_set(["Z"]).unwrap()).unwrap();
        assert_eq!(marginalized.free_variables(), var_set(["Y"]).unwrap());
    }

    #[test]
    fn v_helper_smoke() {
        assert_eq!(v("A").name(), "A");
    }
}
