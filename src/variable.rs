//! A named atom appearing in causal graphs and probability expressions.

use crate::error::IdentifyError;
use std::collections::BTreeSet;
use std::fmt;

/// Characters a variable name may never contain — they collide with the
/// delimiters used by the graph and expression text syntaxes.
const FORBIDDEN_CHARS: &[char] = &['[', ']', '*', ';', ',', '(', ')', '/'];

/// A random variable. Equality, ordering, and hashing are by name alone.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Variable {
    name: String,
}

impl Variable {
    /// Construct a `Variable`: a non-empty string containing no whitespace
    /// and none of `[]*;,()/`.
    pub fn new(name: impl Into<String>) -> Result<Variable, IdentifyError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(IdentifyError::InvalidVariableName {
                name,
                reason: "name must be non-empty".to_string(),
            });
        }
        if name.chars().any(|c| c.is_whitespace()) {
            return Err(IdentifyError::InvalidVariableName {
                name,
                reason: "name must not contain whitespace".to_string(),
            });
        }
        if let Some(bad) = name.chars().find(|c| FORBIDDEN_CHARS.contains(c)) {
            return Err(IdentifyError::InvalidVariableName {
                name,
                reason: format!("name must not contain '{bad}'"),
            });
        }
        Ok(Variable { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A set of variables. Ordered by name (a [`BTreeSet`]) so every collection
/// of variables has a single canonical iteration order, which is what gives
/// [`crate::expression::Expression`] its structural (set/product-commutative)
/// equality and hashing for free.
pub type VarSet = BTreeSet<Variable>;

/// Build a [`VarSet`] from variable names, failing on the first invalid name.
pub fn var_set<I, S>(names: I) -> Result<VarSet, IdentifyError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Variable::new).collect()
}

/// A `VarSet` containing just `v`.
pub fn singleton(v: Variable) -> VarSet {
    let mut set = VarSet::new();
    set.insert(v);
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_whitespace_and_forbidden_chars() {
        assert!(Variable::new("X Y").is_err());
        assert!(Variable::new("X[0]").is_err());
        assert!(Variable::new("X,Y").is_err());
        assert!(Variable::new("").is_err());
        assert!(Variable::new("   ").is_err());
    }

    #[test]
    fn accepts_plain_names() {
        assert!(Variable::new("X").is_ok());
        assert!(Variable::new("X1").is_ok());
        assert!(Variable::new("LONG_NAME").is_ok());
    }

    #[test]
    fn ordering_and_equality_are_by_name() {
        let a = Variable::new("A").unwrap();
        let b = Variable::new("B").unwrap();
        let a2 = Variable::new("A").unwrap();
        assert_eq!(a, a2);
        assert!(a < b);
    }
}
