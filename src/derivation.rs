//! A derivation: a hat-free expression plus the rule applications that
//! reached it, or the hedge witness that precludes one.

use crate::ccomponent::Hedge;
use crate::expression::Expression;
use crate::rule::Rule;
use std::fmt;

/// One step of a derivation: the rule applied and the expression it
/// produced.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Step {
    pub rule: Rule,
    pub result: Expression,
}

/// A pair (final expression, history). Equality is by final expression
/// alone; history is carried only for reporting.
#[derive(Clone, Debug)]
pub struct Derivation {
    expression: Expression,
    history: Vec<Step>,
}

impl Derivation {
    pub fn start(expression: Expression) -> Derivation {
        Derivation {
            expression,
            history: Vec::new(),
        }
    }

    pub fn step(&self, rule: Rule, result: Expression) -> Derivation {
        let mut history = self.history.clone();
        history.push(Step {
            rule,
            result: result.clone(),
        });
        Derivation {
            expression: result,
            history,
        }
    }

    pub fn expression(&self) -> &Expression {
        &self.expression
    }

    pub fn history(&self) -> &[Step] {
        &self.history
    }
}

impl PartialEq for Derivation {
    fn eq(&self, other: &Self) -> bool {
        self.expression == other.expression
    }
}
impl Eq for Derivation {}

/// The distinguished result of an identification attempt:
/// success with a derivation, a hedge witness proving non-identifiability,
/// or "undetermined" if an optional search bound was exceeded.
#[derive(Clone, Debug)]
pub enum Outcome {
    Identified(Derivation),
    NotIdentifiable(Hedge),
    Undetermined { visited: usize },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Outcome::Identified(d) => write!(f, "{}", d.expression()),
            Outcome::NotIdentifiable(h) => {
                write!(f, "NOT IDENTIFIABLE (hedge F={:?}, F'={:?})", h.f(), h.f_prime())
            }
            Outcome::Undetermined { visited } => {
                write!(f, "UNDETERMINED (search exhausted after {visited} states)")
            }
        }
    }
}
