//! Predicates and filter sets.

use serde::{Deserialize, Serialize};

use super::operator::Operator;
use crate::error::DashError;
use crate::types::Value;

/// Operator tokens recognized inside expressions, longest first.
const EXPRESSION_TOKENS: [&str; 6] = [">=", "<=", "==", ">", "<", "="];

/// A single column/operator/value condition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Predicate {
    pub column: String,
    pub operator: Operator,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Builds a predicate from an operator token.
    ///
    /// # Errors
    /// `InvalidOperator` if the token is not one of `=`, `==`, `>`, `>=`, `<`, `<=`.
    pub fn parse(
        column: impl Into<String>,
        token: &str,
        value: impl Into<Value>,
    ) -> Result<Self, DashError> {
        Ok(Self::new(column, token.parse()?, value))
    }

    /// Parses an expression such as `QTY>=10` or `RETURNED_FL == true`.
    ///
    /// The right-hand side is read as a JSON scalar when it parses as one,
    /// otherwise as text, so `STATUS=shipped` and `STATUS="shipped"` agree.
    pub fn parse_expression(expression: &str) -> Result<Self, DashError> {
        let start = expression
            .find(['<', '>', '=', '!'])
            .ok_or_else(|| DashError::InvalidOperator(expression.trim().to_string()))?;
        let rest = &expression[start..];

        let token = EXPRESSION_TOKENS
            .iter()
            .find(|token| rest.starts_with(*token))
            .ok_or_else(|| {
                let bad: String = rest.chars().take_while(|c| "<>=!".contains(*c)).collect();
                DashError::InvalidOperator(bad)
            })?;

        let column = expression[..start].trim();
        let raw_value = rest[token.len()..].trim();

        let value = match serde_json::from_str::<serde_json::Value>(raw_value) {
            Ok(json) if !json.is_array() && !json.is_object() => Value::from_json(&json)?,
            _ => Value::Text(raw_value.to_string()),
        };

        Self::parse(column, token, value)
    }
}

/// Wire form of a predicate as sent by a client.
///
/// The operator stays a raw token so an unknown token surfaces as
/// `InvalidOperator` instead of a body parse failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredicateSpec {
    pub column: String,
    pub operator: String,
    pub value: serde_json::Value,
}

impl PredicateSpec {
    pub fn to_predicate(&self) -> Result<Predicate, DashError> {
        Predicate::parse(
            self.column.clone(),
            &self.operator,
            Value::from_json(&self.value)?,
        )
    }

    /// Expression form, as accepted on query strings and the command line.
    pub fn parse_expression(expression: &str) -> Result<Self, DashError> {
        Predicate::parse_expression(expression).map(Self::from)
    }
}

impl From<Predicate> for PredicateSpec {
    fn from(predicate: Predicate) -> Self {
        Self {
            operator: predicate.operator.token().to_string(),
            value: predicate.value.to_json(),
            column: predicate.column,
        }
    }
}

/// Ordered conjunction of predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses wire predicates in order; the first invalid one is reported.
    pub fn from_specs(specs: &[PredicateSpec]) -> Result<Self, DashError> {
        specs
            .iter()
            .map(PredicateSpec::to_predicate)
            .collect::<Result<Vec<_>, _>>()
            .map(|predicates| Self { predicates })
    }

    /// Parses expressions in order; the first invalid one is reported.
    pub fn from_expressions<S: AsRef<str>>(expressions: &[S]) -> Result<Self, DashError> {
        expressions
            .iter()
            .map(|e| Predicate::parse_expression(e.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(|predicates| Self { predicates })
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    /// Builder-style [`FilterSet::push`].
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.push(predicate);
        self
    }

    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Predicate> {
        self.predicates.iter()
    }

    /// Column names referenced by the predicates, in order (with repeats).
    pub fn columns(&self) -> Vec<&str> {
        self.predicates.iter().map(|p| p.column.as_str()).collect()
    }
}

impl FromIterator<Predicate> for FilterSet {
    fn from_iter<I: IntoIterator<Item = Predicate>>(iter: I) -> Self {
        Self {
            predicates: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Predicate;
    type IntoIter = std::slice::Iter<'a, Predicate>;

    fn into_iter(self) -> Self::IntoIter {
        self.predicates.iter()
    }
}
