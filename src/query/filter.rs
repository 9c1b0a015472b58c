//! Predicate filtering for query execution
//!
//! Conditions are AND-ed. Literals are checked against the declared column
//! type when the query runs, not when the condition is added.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{FlintError, Result};
use crate::record::{Record, Value};
use crate::schema::{ColumnType, TableSchema};

/// Comparison operator of a filter condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl Operator {
    /// Textual form, as accepted by `FromStr`
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
        }
    }

    /// `=` and `!=`; the only operators valid on boolean columns
    pub fn is_equality(&self) -> bool {
        matches!(self, Operator::Eq | Operator::Ne)
    }

    /// Interpret an ordering of (actual, literal)
    ///
    /// `None` means the two are unordered (NaN): only `!=` holds.
    fn holds(&self, ordering: Option<Ordering>) -> bool {
        match self {
            Operator::Eq => ordering == Some(Ordering::Equal),
            Operator::Ne => ordering != Some(Ordering::Equal),
            Operator::Gt => ordering == Some(Ordering::Greater),
            Operator::Lt => ordering == Some(Ordering::Less),
            Operator::Ge => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
            Operator::Le => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Operator {
    type Err = FlintError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "=" | "==" => Ok(Operator::Eq),
            "!=" | "<>" => Ok(Operator::Ne),
            ">" => Ok(Operator::Gt),
            "<" => Ok(Operator::Lt),
            ">=" => Ok(Operator::Ge),
            "<=" => Ok(Operator::Le),
            other => Err(FlintError::Parse(format!("unknown operator \"{}\"", other))),
        }
    }
}

/// `column <operator> value`
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCondition {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl FilterCondition {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Check the literal against the column's declared type
    ///
    /// A column the schema doesn't know passes: such a condition simply
    /// matches nothing.
    pub fn check(&self, schema: &TableSchema) -> Result<()> {
        let Some(declared) = schema.column_type(&self.column) else {
            return Ok(());
        };
        let literal = self.value.value_type();

        let compatible = match declared {
            ColumnType::Integer | ColumnType::Float => literal.is_numeric(),
            ColumnType::String => literal == ColumnType::String,
            ColumnType::Boolean => literal == ColumnType::Boolean,
        };
        if !compatible {
            return Err(FlintError::TypeMismatch {
                column: self.column.clone(),
                detail: format!(
                    "cannot compare {} column with {} literal {}",
                    declared, literal, self.value
                ),
            });
        }

        if declared == ColumnType::Boolean && !self.operator.is_equality() {
            return Err(FlintError::TypeMismatch {
                column: self.column.clone(),
                detail: format!("operator {} is not defined for boolean columns", self.operator),
            });
        }

        Ok(())
    }

    /// Whether `record` satisfies this condition
    pub fn matches(&self, record: &Record) -> bool {
        match record.get(&self.column) {
            Some(actual) => self.operator.holds(Self::compare(actual, &self.value)),
            None => false,
        }
    }

    fn compare(actual: &Value, literal: &Value) -> Option<Ordering> {
        match (actual, literal) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.partial_cmp(&y),
                _ => None,
            },
        }
    }
}

/// Evaluates condition lists against records
pub struct PredicateFilter;

impl PredicateFilter {
    /// Checks if a record matches all conditions (AND semantics)
    pub fn matches(record: &Record, conditions: &[FilterCondition]) -> bool {
        conditions.iter().all(|condition| condition.matches(record))
    }

    /// Validate every condition against `schema`
    pub fn check_all(schema: &TableSchema, conditions: &[FilterCondition]) -> Result<()> {
        conditions.iter().try_for_each(|condition| condition.check(schema))
    }
}
