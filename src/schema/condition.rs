/// Conditions — one typed comparison between two resolved operands.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::core::store::VariableStore;
use crate::schema::resolved::Resolved;
use crate::schema::value::{StoreValue, VariableKind};

/// Ordering comparisons available to numeric conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ComparisonOp {
    #[default]
    Equal,
    NotEqual,
    Greater,
    Less,
    GreaterOrEqual,
    LessOrEqual,
}

impl ComparisonOp {
    pub const ALL: [ComparisonOp; 6] = [
        Self::Equal,
        Self::NotEqual,
        Self::Greater,
        Self::Less,
        Self::GreaterOrEqual,
        Self::LessOrEqual,
    ];

    /// Whether `a ? b` holds given the ordering of `a` relative to `b`.
    pub fn holds(&self, ordering: Ordering) -> bool {
        match self {
            Self::Equal => ordering == Ordering::Equal,
            Self::NotEqual => ordering != Ordering::Equal,
            Self::Greater => ordering == Ordering::Greater,
            Self::Less => ordering == Ordering::Less,
            Self::GreaterOrEqual => ordering != Ordering::Less,
            Self::LessOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl StoreValue for ComparisonOp {}

/// The operand pair of a condition. The variant fixes the condition's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operands {
    Bool(Resolved<bool>, Resolved<bool>),
    Int(Resolved<i64>, Resolved<i64>),
    Float(Resolved<f64>, Resolved<f64>),
    String(Resolved<String>, Resolved<String>),
}

/// One comparator instance.
///
/// Bool and String operands only support (in)equality, chosen by `equals`;
/// Int and Float operands use `comparison`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(default)]
    pub comparison: Resolved<ComparisonOp>,
    /// `true` tests equality, `false` inequality. Omitted in RON, it is an
    /// active literal `true`.
    #[serde(default = "equals_by_default")]
    pub equals: Resolved<bool>,
    pub operands: Operands,
}

fn equals_by_default() -> Resolved<bool> {
    Resolved::literal(true)
}

impl Condition {
    /// Compare two integers.
    pub fn int(a: Resolved<i64>, op: ComparisonOp, b: Resolved<i64>) -> Self {
        Self {
            comparison: Resolved::literal(op),
            equals: equals_by_default(),
            operands: Operands::Int(a, b),
        }
    }

    /// Compare two floats.
    pub fn float(a: Resolved<f64>, op: ComparisonOp, b: Resolved<f64>) -> Self {
        Self {
            comparison: Resolved::literal(op),
            equals: equals_by_default(),
            operands: Operands::Float(a, b),
        }
    }

    /// Test two booleans for equality (`equals == true`) or inequality.
    pub fn bool(a: Resolved<bool>, equals: bool, b: Resolved<bool>) -> Self {
        Self {
            comparison: Resolved::default(),
            equals: Resolved::literal(equals),
            operands: Operands::Bool(a, b),
        }
    }

    /// Test two strings for equality (`equals == true`) or inequality.
    pub fn string(a: Resolved<String>, equals: bool, b: Resolved<String>) -> Self {
        Self {
            comparison: Resolved::default(),
            equals: Resolved::literal(equals),
            operands: Operands::String(a, b),
        }
    }

    pub fn kind(&self) -> VariableKind {
        match self.operands {
            Operands::Bool(..) => VariableKind::Bool,
            Operands::Int(..) => VariableKind::Int,
            Operands::Float(..) => VariableKind::Float,
            Operands::String(..) => VariableKind::String,
        }
    }

    /// Evaluate against the store. Pure and total: unresolved operands fall
    /// back to their literals.
    pub fn evaluate(&self, store: &VariableStore) -> bool {
        match &self.operands {
            Operands::Bool(a, b) => self.equality(a.resolve(store) == b.resolve(store), store),
            Operands::String(a, b) => self.equality(a.resolve(store) == b.resolve(store), store),
            Operands::Int(a, b) => self.ordering(a.resolve(store).cmp(&b.resolve(store)), store),
            Operands::Float(a, b) => {
                self.ordering(compare_floats(a.resolve(store), b.resolve(store)), store)
            }
        }
    }

    fn equality(&self, same: bool, store: &VariableStore) -> bool {
        if self.equals.resolve(store) {
            same
        } else {
            !same
        }
    }

    fn ordering(&self, ordering: Ordering, store: &VariableStore) -> bool {
        self.comparison.resolve(store).holds(ordering)
    }
}

/// Total float ordering: NaN equals NaN and sorts below every number.
fn compare_floats(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b)
        .unwrap_or_else(|| match (a.is_nan(), b.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            _ => Ordering::Greater,
        })
}

/// True when every condition holds. An empty list is vacuously true.
pub fn all_hold(conditions: &[Condition], store: &VariableStore) -> bool {
    conditions.iter().all(|c| c.evaluate(store))
}
