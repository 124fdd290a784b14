//! # Declarative Filter / Sort Criteria
//!
//! A [`Criteria`] selects, orders and slices the elements of an
//! [`OrderedMap`](crate::OrderedMap) without the caller writing loops:
//!
//! ```
//! use coffer_core::{Criteria, Expr, Order, OrderedMap};
//! use serde_json::json;
//!
//! let users = OrderedMap::from_value(json!({
//!     "ann": {"age": 31, "role": "admin"},
//!     "bob": {"age": 25, "role": "user"},
//!     "cid": {"age": 40, "role": "user"},
//! })).unwrap();
//!
//! let criteria = Criteria::new()
//!     .filter(Expr::eq("role", "user"))
//!     .order_by("age", Order::Desc);
//! let matched = users.matching(&criteria);
//! let keys: Vec<&String> = matched.keys().collect();
//! assert_eq!(keys, ["cid", "bob"]);
//! ```
//!
//! Fields are dotted paths evaluated inside each element. The empty field
//! `""` addresses the element itself, which is how scalar elements (journal
//! entries, for instance) are filtered. Matching keeps the original keys.

use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::path;
use crate::value::{partial_compare, total_compare};

/// Comparison operators available in a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    /// Field equals the operand (numbers compare numerically).
    Eq,
    /// Field differs from the operand.
    Neq,
    /// Field is strictly less than the operand.
    Lt,
    /// Field is less than or equal to the operand.
    Lte,
    /// Field is strictly greater than the operand.
    Gt,
    /// Field is greater than or equal to the operand.
    Gte,
    /// Field equals one of the elements of the operand list.
    In,
    /// Field equals none of the elements of the operand list.
    NotIn,
    /// String field contains the operand string.
    Contains,
    /// List field has the operand as one of its elements.
    MemberOf,
    /// String field starts with the operand string.
    StartsWith,
    /// String field ends with the operand string.
    EndsWith,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// A filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Compare the value at `field` with `value`.
    Compare {
        /// Dotted path inside the element; `""` is the element itself.
        field: String,
        /// Operator.
        op: Comparison,
        /// Right-hand operand.
        value: Value,
    },
    /// All sub-expressions hold.
    And(Vec<Expr>),
    /// At least one sub-expression holds.
    Or(Vec<Expr>),
    /// The sub-expression does not hold.
    Not(Box<Expr>),
}

macro_rules! comparison_ctor {
    ($($(#[$doc:meta])* $name:ident => $op:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(field: impl Into<String>, value: impl Into<Value>) -> Self {
                Self::compare(field, Comparison::$op, value)
            }
        )*
    };
}

impl Expr {
    /// Build a comparison expression.
    pub fn compare(field: impl Into<String>, op: Comparison, value: impl Into<Value>) -> Self {
        Self::Compare {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    comparison_ctor! {
        /// `field == value`
        eq => Eq,
        /// `field != value`
        neq => Neq,
        /// `field < value`
        lt => Lt,
        /// `field <= value`
        lte => Lte,
        /// `field > value`
        gt => Gt,
        /// `field >= value`
        gte => Gte,
        /// `field` is one of the listed values.
        is_in => In,
        /// `field` is none of the listed values.
        not_in => NotIn,
        /// String `field` contains `value`.
        contains => Contains,
        /// List `field` contains `value`.
        member_of => MemberOf,
        /// String `field` starts with `value`.
        starts_with => StartsWith,
        /// String `field` ends with `value`.
        ends_with => EndsWith,
    }

    /// `field` is absent or `null`.
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::eq(field, Value::Null)
    }

    /// Conjunction, flattening nested `And`s.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Disjunction, flattening nested `Or`s.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Logical negation.
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Evaluate the expression against one element.
    pub fn matches(&self, element: &Value) -> bool {
        match self {
            Self::Compare { field, op, value } => {
                let actual = field_value(element, field).unwrap_or(&Value::Null);
                compare(actual, *op, value)
            }
            Self::And(parts) => parts.iter().all(|p| p.matches(element)),
            Self::Or(parts) => parts.iter().any(|p| p.matches(element)),
            Self::Not(inner) => !inner.matches(element),
        }
    }
}

fn field_value<'a>(element: &'a Value, field: &str) -> Option<&'a Value> {
    if field.is_empty() {
        Some(element)
    } else {
        path::lookup(element, field)
    }
}

fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) => partial_compare(a, b) == Some(Ordering::Equal),
        _ => a == b,
    }
}

fn compare(actual: &Value, op: Comparison, operand: &Value) -> bool {
    let ordering = || partial_compare(actual, operand);
    match op {
        Comparison::Eq => loosely_equal(actual, operand),
        Comparison::Neq => !loosely_equal(actual, operand),
        Comparison::Lt => ordering() == Some(Ordering::Less),
        Comparison::Lte => matches!(ordering(), Some(Ordering::Less | Ordering::Equal)),
        Comparison::Gt => ordering() == Some(Ordering::Greater),
        Comparison::Gte => matches!(ordering(), Some(Ordering::Greater | Ordering::Equal)),
        Comparison::In => operand
            .as_array()
            .is_some_and(|items| items.iter().any(|v| loosely_equal(actual, v))),
        Comparison::NotIn => !compare(actual, Comparison::In, operand),
        Comparison::MemberOf => actual
            .as_array()
            .is_some_and(|items| items.iter().any(|v| loosely_equal(v, operand))),
        Comparison::Contains | Comparison::StartsWith | Comparison::EndsWith => {
            let (Some(haystack), Some(needle)) = (actual.as_str(), operand.as_str()) else {
                return false;
            };
            match op {
                Comparison::Contains => haystack.contains(needle),
                Comparison::StartsWith => haystack.starts_with(needle),
                _ => haystack.ends_with(needle),
            }
        }
    }
}

/// Filter, ordering and slicing applied by `matching`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    filter: Option<Expr>,
    orderings: Vec<(String, Order)>,
    offset: usize,
    limit: Option<usize>,
}

impl Criteria {
    /// An empty criteria: keeps every element in its original order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the filter expression.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.filter = Some(expr);
        self
    }

    /// Add a condition that must also hold.
    pub fn and_filter(mut self, expr: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(expr),
            None => expr,
        });
        self
    }

    /// Add an alternative condition.
    pub fn or_filter(mut self, expr: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.or(expr),
            None => expr,
        });
        self
    }

    /// Append a sort key. Earlier keys take precedence; ties keep input order.
    pub fn order_by(mut self, field: impl Into<String>, order: Order) -> Self {
        self.orderings.push((field.into(), order));
        self
    }

    /// Skip the first `offset` matching elements.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Keep at most `limit` matching elements.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// The current filter expression, if any.
    pub fn expression(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }

    /// Apply the criteria to a mapping, returning the selected entries.
    pub fn apply(&self, entries: &Map<String, Value>) -> Map<String, Value> {
        let mut selected: Vec<(&String, &Value)> = entries
            .iter()
            .filter(|(_, v)| self.filter.as_ref().map_or(true, |f| f.matches(v)))
            .collect();

        if !self.orderings.is_empty() {
            selected.sort_by(|(_, a), (_, b)| self.compare_elements(a, b));
        }

        selected
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    fn compare_elements(&self, a: &Value, b: &Value) -> Ordering {
        for (field, order) in &self.orderings {
            let left = field_value(a, field).unwrap_or(&Value::Null);
            let right = field_value(b, field).unwrap_or(&Value::Null);
            let ordering = match order {
                Order::Asc => total_compare(left, right),
                Order::Desc => total_compare(right, left),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}
