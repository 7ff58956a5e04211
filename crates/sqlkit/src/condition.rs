//! Condition expression trees for WHERE/HAVING clauses.
//!
//! This module provides the closed [`Operator`] catalog and the [`Condition`]
//! tree built from comparison leaves composed with [`Condition::and`],
//! [`Condition::or`], and [`Condition::not`]. Rendering is self-validating:
//! [`Condition::render`] performs every arity and type check and either
//! returns SQL text or a typed error.

use std::sync::Arc;

use strum::EnumIter;

use crate::error::{SqlError, SqlResult};
use crate::schema::Field;

/// Upper bound on IN/NOT IN list length.
pub const MAX_IN_LIST: usize = 100;

/// Comparison operator catalog.
///
/// Each operator carries its SQL token, its permitted argument count, whether
/// its argument list is parenthesized (IN/NOT IN), and whether it accepts
/// string-typed operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Operator {
    Between,
    Eq,
    Ge,
    Gt,
    In,
    IsNotNull,
    IsNotTrue,
    IsNull,
    IsTrue,
    Le,
    Lt,
    Like,
    Ne,
    NotBetween,
    NotIn,
}

impl Operator {
    /// SQL token, with surrounding spaces where values follow.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Between => " BETWEEN ",
            Self::Eq => " = ",
            Self::Ge => " >= ",
            Self::Gt => " > ",
            Self::In => " IN ",
            Self::IsNotNull => " IS NOT NULL",
            Self::IsNotTrue => " IS NOT TRUE",
            Self::IsNull => " IS NULL",
            Self::IsTrue => " IS TRUE",
            Self::Le => " <= ",
            Self::Lt => " < ",
            Self::Like => " LIKE ",
            Self::Ne => " <> ",
            Self::NotBetween => " NOT BETWEEN ",
            Self::NotIn => " NOT IN ",
        }
    }

    /// Bare token used in error messages.
    pub fn sql_name(&self) -> &'static str {
        self.token().trim_ascii()
    }

    /// Permitted `(min, max)` argument count.
    pub fn arg_bounds(&self) -> (usize, usize) {
        match self {
            Self::Between | Self::NotBetween => (2, 2),
            Self::In | Self::NotIn => (1, MAX_IN_LIST),
            Self::IsNotNull | Self::IsNotTrue | Self::IsNull | Self::IsTrue => (0, 0),
            _ => (1, 1),
        }
    }

    /// Argument-list delimiters: parentheses for IN/NOT IN, empty otherwise.
    pub fn list_delimiters(&self) -> (&'static str, &'static str) {
        match self {
            Self::In | Self::NotIn => ("(", ")"),
            _ => ("", ""),
        }
    }

    /// Whether string-typed operands are allowed.
    pub fn accepts_strings(&self) -> bool {
        !matches!(
            self,
            Self::Between
                | Self::NotBetween
                | Self::IsNotNull
                | Self::IsNotTrue
                | Self::IsNull
                | Self::IsTrue
        )
    }
}

/// Left-hand operand of a comparison: a raw column name or a resolved field.
#[derive(Debug, Clone)]
pub enum LeftOperand {
    Column(String),
    Field(Arc<Field>),
}

impl LeftOperand {
    fn render(&self) -> String {
        match self {
            Self::Column(name) => name.clone(),
            Self::Field(field) => field.qualified_name(),
        }
    }
}

impl From<&str> for LeftOperand {
    fn from(v: &str) -> Self {
        Self::Column(v.to_string())
    }
}

impl From<String> for LeftOperand {
    fn from(v: String) -> Self {
        Self::Column(v)
    }
}

impl From<Arc<Field>> for LeftOperand {
    fn from(v: Arc<Field>) -> Self {
        Self::Field(v)
    }
}

impl From<&Arc<Field>> for LeftOperand {
    fn from(v: &Arc<Field>) -> Self {
        Self::Field(Arc::clone(v))
    }
}

/// Right-hand operand of a comparison.
#[derive(Debug, Clone)]
pub enum Term {
    Int(i64),
    Float(f64),
    Text(String),
    Field(Arc<Field>),
}

impl Term {
    pub(crate) fn render(&self) -> String {
        match self {
            Self::Int(v) => v.to_string(),
            Self::Float(v) => format!("{v:.6}"),
            Self::Text(v) => quote_text(v),
            Self::Field(field) => field.qualified_name(),
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

/// Single-quote a string literal, doubling embedded quotes.
pub(crate) fn quote_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

impl From<i64> for Term {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Term {
    fn from(v: i32) -> Self {
        Self::Int(v.into())
    }
}

impl From<f64> for Term {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Term {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for Term {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Arc<Field>> for Term {
    fn from(v: Arc<Field>) -> Self {
        Self::Field(v)
    }
}

impl From<&Arc<Field>> for Term {
    fn from(v: &Arc<Field>) -> Self {
        Self::Field(Arc::clone(v))
    }
}

/// A predicate expression tree.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Leaf comparison: `<left> <op> <values>`
    Compare {
        left: LeftOperand,
        op: Operator,
        values: Vec<Term>,
    },
    /// Conjunction of two or more children
    And(Vec<Condition>),
    /// Disjunction of two or more children
    Or(Vec<Condition>),
    /// Negation
    Not(Box<Condition>),
}

impl Condition {
    /// Leaf comparison with values.
    pub fn cmp(left: impl Into<LeftOperand>, op: Operator, values: Vec<Term>) -> Self {
        Self::Compare {
            left: left.into(),
            op,
            values,
        }
    }

    /// Leaf comparison with no values (IS NULL family).
    pub fn cmp_none(left: impl Into<LeftOperand>, op: Operator) -> Self {
        Self::cmp(left, op, Vec::new())
    }

    /// Conjunction: two required children plus a variadic tail.
    pub fn and(a: Condition, b: Condition, rest: Vec<Condition>) -> Self {
        let mut children = vec![a, b];
        children.extend(rest);
        Self::And(children)
    }

    /// Disjunction: two required children plus a variadic tail.
    pub fn or(a: Condition, b: Condition, rest: Vec<Condition>) -> Self {
        let mut children = vec![a, b];
        children.extend(rest);
        Self::Or(children)
    }

    /// Negation.
    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Condition) -> Self {
        Self::Not(Box::new(inner))
    }

    /// Render the whole expression (top level, unparenthesized).
    pub fn to_sql(&self) -> SqlResult<String> {
        self.render(0)
    }

    /// Render at a nesting depth, validating as it goes.
    ///
    /// Logical nodes parenthesize their rendering only when `depth > 0`;
    /// the top-level expression is not wrapped. Rendering is deterministic:
    /// the same tree always produces the same text.
    pub fn render(&self, depth: usize) -> SqlResult<String> {
        match self {
            Self::Compare { left, op, values } => render_compare(left, *op, values),
            Self::And(children) => render_logical(children, " AND ", depth),
            Self::Or(children) => render_logical(children, " OR ", depth),
            Self::Not(inner) => Ok(format!("NOT {}", inner.render(depth + 1)?)),
        }
    }
}

fn render_compare(left: &LeftOperand, op: Operator, values: &[Term]) -> SqlResult<String> {
    let (min, max) = op.arg_bounds();
    if values.len() < min || values.len() > max {
        return Err(SqlError::Arity {
            op: op.sql_name(),
            given: values.len(),
            min,
            max,
        });
    }

    let has_text = values.iter().any(Term::is_text);
    if op == Operator::Like && !values.iter().all(Term::is_text) {
        return Err(SqlError::type_mismatch(
            "LIKE requires string-typed values",
        ));
    }
    if has_text && !op.accepts_strings() {
        return Err(SqlError::type_mismatch(format!(
            "String values need a string operator; have {}",
            op.sql_name()
        )));
    }

    let rendered: Vec<String> = values.iter().map(Term::render).collect();
    let (open, close) = op.list_delimiters();
    Ok(format!(
        "{}{}{}{}{}",
        left.render(),
        op.token(),
        open,
        rendered.join(", "),
        close
    ))
}

fn render_logical(children: &[Condition], token: &str, depth: usize) -> SqlResult<String> {
    if children.len() < 2 {
        return Err(SqlError::structural(
            "Logical condition needs at least two children",
        ));
    }
    let mut parts = Vec::with_capacity(children.len());
    for child in children {
        parts.push(child.render(depth + 1)?);
    }
    let joined = parts.join(token);
    if depth > 0 {
        Ok(format!("({joined})"))
    } else {
        Ok(joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    fn eq_one() -> Condition {
        Condition::cmp("a", Operator::Eq, vec![1i64.into()])
    }

    #[test]
    fn simple_comparison() {
        assert_eq!(eq_one().to_sql().unwrap(), "a = 1");
    }

    #[test]
    fn rendering_is_deterministic() {
        let c = Condition::cmp("score", Operator::Ge, vec![2.5f64.into()]);
        let first = c.to_sql().unwrap();
        assert_eq!(first, "score >= 2.500000");
        assert_eq!(c.to_sql().unwrap(), first);
    }

    #[test]
    fn text_values_quoted_and_escaped() {
        let c = Condition::cmp("name", Operator::Like, vec!["O'Brien%".into()]);
        assert_eq!(c.to_sql().unwrap(), "name LIKE 'O''Brien%'");
    }

    #[test]
    fn in_list_parenthesized() {
        let c = Condition::cmp(
            "id",
            Operator::In,
            vec![1i64.into(), 2i64.into(), 3i64.into()],
        );
        assert_eq!(c.to_sql().unwrap(), "id IN (1, 2, 3)");
    }

    #[test]
    fn in_list_over_limit_is_arity_error() {
        let values: Vec<Term> = (0..(MAX_IN_LIST as i64 + 1)).map(Term::from).collect();
        let err = Condition::cmp("id", Operator::In, values)
            .to_sql()
            .unwrap_err();
        assert!(err.is_arity());
    }

    #[test]
    fn between_requires_exactly_two() {
        let one = Condition::cmp("age", Operator::Between, vec![1i64.into()]);
        assert!(one.to_sql().unwrap_err().is_arity());

        let three = Condition::cmp(
            "age",
            Operator::NotBetween,
            vec![1i64.into(), 2i64.into(), 3i64.into()],
        );
        assert!(three.to_sql().unwrap_err().is_arity());

        let two = Condition::cmp("age", Operator::Between, vec![18i64.into(), 65i64.into()]);
        assert_eq!(two.to_sql().unwrap(), "age BETWEEN 18, 65");
    }

    #[test]
    fn like_rejects_non_string_values() {
        let c = Condition::cmp("name", Operator::Like, vec![5i64.into()]);
        assert!(c.to_sql().unwrap_err().is_type_mismatch());
    }

    #[test]
    fn string_values_need_string_operator() {
        let c = Condition::cmp("age", Operator::Between, vec!["a".into(), "b".into()]);
        assert!(c.to_sql().unwrap_err().is_type_mismatch());
    }

    #[test]
    fn zero_arg_operator_rejects_values() {
        let none = Condition::cmp_none("deleted_at", Operator::IsNull);
        assert_eq!(none.to_sql().unwrap(), "deleted_at IS NULL");

        let with_value = Condition::cmp("deleted_at", Operator::IsTrue, vec![1i64.into()]);
        assert!(with_value.to_sql().unwrap_err().is_arity());
    }

    #[test]
    fn top_level_and_is_unwrapped() {
        let c = Condition::and(eq_one(), eq_one(), vec![]);
        assert_eq!(c.to_sql().unwrap(), "a = 1 AND a = 1");
    }

    #[test]
    fn nested_logical_is_parenthesized() {
        let inner = Condition::or(eq_one(), eq_one(), vec![]);
        let outer = Condition::and(inner, eq_one(), vec![]);
        assert_eq!(outer.to_sql().unwrap(), "(a = 1 OR a = 1) AND a = 1");
    }

    #[test]
    fn variadic_tail_joined() {
        let c = Condition::and(eq_one(), eq_one(), vec![eq_one()]);
        assert_eq!(c.to_sql().unwrap(), "a = 1 AND a = 1 AND a = 1");
    }

    #[test]
    fn not_prefixes_child() {
        let c = Condition::not(Condition::and(eq_one(), eq_one(), vec![]));
        assert_eq!(c.to_sql().unwrap(), "NOT (a = 1 AND a = 1)");
    }

    #[test]
    fn operator_bounds_are_consistent() {
        for op in Operator::iter() {
            let (min, max) = op.arg_bounds();
            assert!(min <= max, "{} bounds inverted", op.sql_name());
            assert!(max <= MAX_IN_LIST);
            if max == 0 {
                // Zero-arg operators never accept strings.
                assert!(!op.accepts_strings());
            }
        }
    }

    #[test]
    fn child_error_propagates_through_logical() {
        let bad = Condition::cmp("age", Operator::Between, vec![1i64.into()]);
        let c = Condition::and(eq_one(), bad, vec![]);
        assert!(c.to_sql().unwrap_err().is_arity());
    }
}
