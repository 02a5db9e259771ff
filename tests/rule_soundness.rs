//! Property-based check of Rule II soundness.
//!
//! For the unconfounded chain `X -> Y`, Rule II licenses rewriting
//! `P(Y|do(X))` as `P(Y|X)`. This simulates random finite-domain structural
//! equations for `X` and `Y` (`X` an independent Bernoulli draw, `Y` an
//! arbitrary boolean function of `X` and a private noise bit) and checks
//! that the interventional distribution the left-hand side denotes and the
//! observational distribution the rewritten right-hand side denotes are
//! numerically identical — the truncated factorization at work, not just a
//! symbolic identity. The two sides are computed via genuinely different
//! routes (the intervention fixes `X` and never touches its prior; the
//! observational side is read off the full joint by Bayes' rule, `X`'s prior
//! included and then cancelled), and the rewrite itself is produced by
//! `Rule::apply`, not merely asserted compatible.

use causal_identify::graph::Graph;
use causal_identify::rule::Rule;
use causal_identify::variable::var_set;
use causal_identify::Expression;
use proptest::prelude::*;

/// `P(Y = y | do(X) = x)` under `y_of(x, noise)`: the intervention fixes
/// `X`, so only the noise bit's own marginal matters.
fn interventional(y_of: impl Fn(bool, bool) -> bool, x: bool, y: bool, p_noise: f64) -> f64 {
    [true, false]
        .into_iter()
        .filter(|&noise| y_of(x, noise) == y)
        .map(|noise| if noise { p_noise } else { 1.0 - p_noise })
        .sum()
}

/// `P(X = x, Y = y)` from the full structural-equation joint: `X` drawn from
/// its own Bernoulli prior, independently of the noise bit that feeds `Y`.
fn joint(y_of: impl Fn(bool, bool) -> bool, p_x: f64, p_noise: f64, x: bool, y: bool) -> f64 {
    let p_x_marginal = if x { p_x } else { 1.0 - p_x };
    let p_y_given_x: f64 = [true, false]
        .into_iter()
        .filter(|&noise| y_of(x, noise) == y)
        .map(|noise| if noise { p_noise } else { 1.0 - p_noise })
        .sum();
    p_x_marginal * p_y_given_x
}

/// `P(X = x)` from the same joint, summed over both values of `Y`.
fn marginal_x(y_of: impl Fn(bool, bool) -> bool, p_x: f64, p_noise: f64, x: bool) -> f64 {
    [true, false]
        .into_iter()
        .map(|y| joint(&y_of, p_x, p_noise, x, y))
        .sum()
}

/// `P(Y = y | X = x)` by Bayes' rule from the joint above — an independent
/// derivation from `interventional`, not a restatement of it, even though
/// soundness means the two must agree once `X`'s prior cancels.
fn observational(y_of: impl Fn(bool, bool) -> bool, p_x: f64, p_noise: f64, x: bool, y: bool) -> f64 {
    joint(&y_of, p_x, p_noise, x, y) / marginal_x(&y_of, p_x, p_noise, x)
}

proptest! {
    #[test]
    fn rule_ii_preserves_the_simulated_distribution(
        p_x in 0.01f64..0.99,
        p_noise in 0.0f64..1.0,
        function_table in 0u8..16,
        x in any::<bool>(),
        y in any::<bool>(),
    ) {
        let y_of = move |x: bool, noise: bool| {
            let index = (x as u8) << 1 | (noise as u8);
            (function_table >> index) & 1 == 1
        };

        let graph = Graph::parse("X->Y").unwrap();
        let statement = Expression::p(var_set(["Y"]).unwrap(), var_set(["X"]).unwrap(), Default::default()).unwrap();
        let rule = Rule::ActionObservationExchange { moved: var_set(["X"]).unwrap() };
        prop_assert!(rule.is_compatible_with(&statement, &graph, &Default::default()));

        let rewritten = rule.apply(&statement);
        let expected_shape = Expression::p(var_set(["Y"]).unwrap(), Default::default(), var_set(["X"]).unwrap()).unwrap();
        prop_assert_eq!(&rewritten, &expected_shape);

        let lhs = interventional(y_of, x, y, p_noise);
        let rhs = observational(y_of, p_x, p_noise, x, y);
        prop_assert!((lhs - rhs).abs() < 1e-9);
    }
}
