//! Composable validation rules
//!
//! A rule is a tree of named predicates combined with `all`, `any` and
//! `not`. Evaluating a rule returns every violation it finds, so one pass
//! over a record reports all problems at once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One failed check
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Violation {
    /// Field the check is about
    pub field: String,
    /// What the field failed
    pub rule: String,
}

impl Violation {
    /// Create a violation
    pub fn new(field: impl Into<String>, rule: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.rule)
    }
}

type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Validation rule over `T`
pub enum Rule<T> {
    /// Single named predicate
    Check {
        /// Field name reported on failure
        field: String,
        /// Rule description reported on failure
        rule: String,
        /// Passes when true
        predicate: Predicate<T>,
    },
    /// Every child must pass; reports every child's violations
    All(Vec<Rule<T>>),
    /// At least one child must pass; reports its own violation otherwise
    Any {
        /// Field name reported on failure
        field: String,
        /// Rule description reported on failure
        rule: String,
        /// Alternatives
        children: Vec<Rule<T>>,
    },
    /// The child must fail; reports its own violation otherwise
    Not {
        /// Field name reported on failure
        field: String,
        /// Rule description reported on failure
        rule: String,
        /// Negated rule
        inner: Box<Rule<T>>,
    },
}

impl<T> Rule<T> {
    /// Named predicate
    pub fn check<F>(field: impl Into<String>, rule: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Rule::Check {
            field: field.into(),
            rule: rule.into(),
            predicate: Box::new(predicate),
        }
    }

    /// Conjunction
    pub fn all(children: Vec<Rule<T>>) -> Self {
        Rule::All(children)
    }

    /// Disjunction
    pub fn any(field: impl Into<String>, rule: impl Into<String>, children: Vec<Rule<T>>) -> Self {
        Rule::Any {
            field: field.into(),
            rule: rule.into(),
            children,
        }
    }

    /// Negation
    pub fn not(field: impl Into<String>, rule: impl Into<String>, inner: Rule<T>) -> Self {
        Rule::Not {
            field: field.into(),
            rule: rule.into(),
            inner: Box::new(inner),
        }
    }

    /// Every violation of this rule, in rule order
    pub fn evaluate(&self, target: &T) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.collect(target, &mut violations);
        violations
    }

    /// Whether the target satisfies the rule
    pub fn is_satisfied(&self, target: &T) -> bool {
        match self {
            Rule::Check { predicate, .. } => predicate(target),
            Rule::All(children) => children.iter().all(|c| c.is_satisfied(target)),
            Rule::Any { children, .. } => children.iter().any(|c| c.is_satisfied(target)),
            Rule::Not { inner, .. } => !inner.is_satisfied(target),
        }
    }

    fn collect(&self, target: &T, out: &mut Vec<Violation>) {
        match self {
            Rule::Check {
                field,
                rule,
                predicate,
            } => {
                if !predicate(target) {
                    out.push(Violation::new(field.as_str(), rule.as_str()));
                }
            }
            Rule::All(children) => {
                for child in children {
                    child.collect(target, out);
                }
            }
            Rule::Any { field, rule, .. } | Rule::Not { field, rule, .. } => {
                if !self.is_satisfied(target) {
                    out.push(Violation::new(field.as_str(), rule.as_str()));
                }
            }
        }
    }

    /// Number of leaf checks in the tree
    pub fn len(&self) -> usize {
        match self {
            Rule::Check { .. } => 1,
            Rule::All(children) | Rule::Any { children, .. } => children.iter().map(Rule::len).sum(),
            Rule::Not { inner, .. } => inner.len(),
        }
    }

    /// Whether the tree has no checks
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T> fmt::Debug for Rule<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Check { field, rule, .. } => write!(f, "Check({}: {})", field, rule),
            Rule::All(children) => f.debug_tuple("All").field(children).finish(),
            Rule::Any { field, rule, children } => {
                write!(f, "Any({}: {}, ", field, rule)?;
                f.debug_list().entries(children).finish()?;
                write!(f, ")")
            }
            Rule::Not { field, rule, inner } => write!(f, "Not({}: {}, {:?})", field, rule, inner),
        }
    }
}
