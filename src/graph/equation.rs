//! A single structural equation `Y = f(X)`.

use crate::error::IdentifyError;
use crate::variable::{Variable, VarSet};
use std::fmt;

/// An ordered pair `(X, Y)` meaning "`Y` is a function of the parents `X`".
/// `Y` is never a member of `X`.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct StructuralEquation {
    parents: VarSet,
    outcome: Variable,
}

impl StructuralEquation {
    pub fn new(parents: VarSet, outcome: Variable) -> Result<StructuralEquation, IdentifyError> {
        if parents.contains(&outcome) {
            return Err(IdentifyError::SelfReferentialEquation(
                outcome.name().to_string(),
            ));
        }
        Ok(StructuralEquation { parents, outcome })
    }

    pub fn parents(&self) -> &VarSet {
        &self.parents
    }

    pub fn outcome(&self) -> &Variable {
        &self.outcome
    }

    /// Returns a copy of this equation with `removed` parents dropped.
    pub fn without_parents(&self, removed: &VarSet) -> StructuralEquation {
        StructuralEquation {
            parents: self.parents.difference(removed).cloned().collect(),
            outcome: self.outcome.clone(),
        }
    }
}

impl fmt::Display for StructuralEquation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let parents: Vec<String> = self.parents.iter().map(Variable::to_string).collect();
        write!(f, "{}->{}", parents.join(","), self.outcome)
    }
}
