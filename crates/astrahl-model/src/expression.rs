use std::fmt;
use std::ops;

use serde_json::{json, Map, Value};

use crate::errors::ModelError;

/// Euler's number, available as a constant expression via [`Expression::euler`].
pub const EULER: f64 = std::f64::consts::E;

/// Confidence-function expression over a single unbound variable.
///
/// `Var` stands for the point value of whichever wire the expression is
/// attached to; [`Expression::eval`] supplies it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Const(f64),
    Var,
    Neg(Box<Expression>),
    Log(Box<Expression>),
    Add(Box<Expression>, Box<Expression>),
    Sub(Box<Expression>, Box<Expression>),
    Mul(Box<Expression>, Box<Expression>),
    Div(Box<Expression>, Box<Expression>),
    Pow(Box<Expression>, Box<Expression>),
}

type ExprDecoder = fn(&Map<String, Value>) -> Result<Expression, ModelError>;

/// Decoders keyed by the `type` tag of an expression node.
const EXPRESSION_DECODERS: [(&str, ExprDecoder); 9] = [
    ("const", decode_const),
    ("var", decode_var),
    ("opp", decode_neg),
    ("log", decode_log),
    ("add", decode_add),
    ("sub", decode_sub),
    ("mul", decode_mul),
    ("div", decode_div),
    ("pow", decode_pow),
];

#[allow(clippy::should_implement_trait)]
impl Expression {
    /// A literal. Non-finite values evaluate fine but have no JSON
    /// encoding: they are written as `null` and do not decode.
    pub fn constant(value: f64) -> Self {
        Expression::Const(value)
    }

    pub fn var() -> Self {
        Expression::Var
    }

    pub fn euler() -> Self {
        Expression::Const(EULER)
    }

    pub fn neg(self) -> Self {
        Expression::Neg(Box::new(self))
    }

    /// Natural logarithm.
    pub fn log(self) -> Self {
        Expression::Log(Box::new(self))
    }

    pub fn add(self, other: Expression) -> Self {
        Expression::Add(Box::new(self), Box::new(other))
    }

    pub fn sub(self, other: Expression) -> Self {
        Expression::Sub(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: Expression) -> Self {
        Expression::Mul(Box::new(self), Box::new(other))
    }

    pub fn div(self, other: Expression) -> Self {
        Expression::Div(Box::new(self), Box::new(other))
    }

    pub fn pow(self, other: Expression) -> Self {
        Expression::Pow(Box::new(self), Box::new(other))
    }

    /// `1 - base^(x + 1)`: confidence that grows geometrically with the point.
    pub fn geometric_confidence(base: f64) -> Self {
        Expression::constant(1.0).sub(
            Expression::constant(base).pow(Expression::var().add(Expression::constant(1.0))),
        )
    }

    pub fn eval(&self, x: f64) -> f64 {
        match self {
            Expression::Const(value) => *value,
            Expression::Var => x,
            Expression::Neg(inner) => -inner.eval(x),
            Expression::Log(inner) => inner.eval(x).ln(),
            Expression::Add(lhs, rhs) => lhs.eval(x) + rhs.eval(x),
            Expression::Sub(lhs, rhs) => lhs.eval(x) - rhs.eval(x),
            Expression::Mul(lhs, rhs) => lhs.eval(x) * rhs.eval(x),
            Expression::Div(lhs, rhs) => lhs.eval(x) / rhs.eval(x),
            Expression::Pow(lhs, rhs) => lhs.eval(x).powf(rhs.eval(x)),
        }
    }

    /// False when any literal is NaN or infinite.
    pub fn is_encodable(&self) -> bool {
        match self {
            Expression::Const(value) => value.is_finite(),
            Expression::Var => true,
            Expression::Neg(inner) | Expression::Log(inner) => inner.is_encodable(),
            Expression::Add(lhs, rhs)
            | Expression::Sub(lhs, rhs)
            | Expression::Mul(lhs, rhs)
            | Expression::Div(lhs, rhs)
            | Expression::Pow(lhs, rhs) => lhs.is_encodable() && rhs.is_encodable(),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            Expression::Const(_) => "const",
            Expression::Var => "var",
            Expression::Neg(_) => "opp",
            Expression::Log(_) => "log",
            Expression::Add(..) => "add",
            Expression::Sub(..) => "sub",
            Expression::Mul(..) => "mul",
            Expression::Div(..) => "div",
            Expression::Pow(..) => "pow",
        }
    }

    /// Encode for the solver.
    ///
    /// `index` is the confidence-function slot and `wire_index` the wire it
    /// reads; both are stamped onto every `Var` in the expression.
    pub fn to_json(&self, index: i64, wire_index: i64) -> Value {
        match self {
            Expression::Const(value) => json!({"type": "const", "constant": value}),
            Expression::Var => json!({
                "type": "var",
                "index": index,
                "wire_index": wire_index,
            }),
            Expression::Neg(inner) | Expression::Log(inner) => json!({
                "type": self.tag(),
                "expression1": inner.to_json(index, wire_index),
            }),
            Expression::Add(lhs, rhs)
            | Expression::Sub(lhs, rhs)
            | Expression::Mul(lhs, rhs)
            | Expression::Div(lhs, rhs)
            | Expression::Pow(lhs, rhs) => json!({
                "type": self.tag(),
                "expression1": lhs.to_json(index, wire_index),
                "expression2": rhs.to_json(index, wire_index),
            }),
        }
    }

    /// Decode an expression. `Var` addressing fields are ignored.
    pub fn from_json(encoded: &Value) -> Result<Self, ModelError> {
        let node = encoded
            .as_object()
            .ok_or(ModelError::NotAnObject("expression"))?;
        let tag = node
            .get("type")
            .and_then(Value::as_str)
            .ok_or(ModelError::MissingField {
                node: "expression",
                field: "type",
            })?;
        let decoder = EXPRESSION_DECODERS
            .iter()
            .find(|(name, _)| *name == tag)
            .map(|(_, decoder)| *decoder)
            .ok_or_else(|| ModelError::UnknownExpressionType(tag.to_string()))?;
        decoder(node)
    }
}

fn operand(node: &Map<String, Value>, field: &'static str) -> Result<Expression, ModelError> {
    let child = node.get(field).ok_or(ModelError::MissingField {
        node: "expression",
        field,
    })?;
    Expression::from_json(child)
}

fn decode_const(node: &Map<String, Value>) -> Result<Expression, ModelError> {
    let value = node.get("constant").ok_or(ModelError::MissingField {
        node: "const",
        field: "constant",
    })?;
    let value = value.as_f64().ok_or_else(|| ModelError::InvalidField {
        node: "const",
        field: "constant".into(),
        reason: format!("expected a number, found {value}"),
    })?;
    Ok(Expression::Const(value))
}

fn decode_var(_node: &Map<String, Value>) -> Result<Expression, ModelError> {
    Ok(Expression::Var)
}

fn decode_neg(node: &Map<String, Value>) -> Result<Expression, ModelError> {
    Ok(operand(node, "expression1")?.neg())
}

fn decode_log(node: &Map<String, Value>) -> Result<Expression, ModelError> {
    Ok(operand(node, "expression1")?.log())
}

fn binary(node: &Map<String, Value>) -> Result<(Expression, Expression), ModelError> {
    Ok((operand(node, "expression1")?, operand(node, "expression2")?))
}

fn decode_add(node: &Map<String, Value>) -> Result<Expression, ModelError> {
    let (lhs, rhs) = binary(node)?;
    Ok(lhs.add(rhs))
}

fn decode_sub(node: &Map<String, Value>) -> Result<Expression, ModelError> {
    let (lhs, rhs) = binary(node)?;
    Ok(lhs.sub(rhs))
}

fn decode_mul(node: &Map<String, Value>) -> Result<Expression, ModelError> {
    let (lhs, rhs) = binary(node)?;
    Ok(lhs.mul(rhs))
}

fn decode_div(node: &Map<String, Value>) -> Result<Expression, ModelError> {
    let (lhs, rhs) = binary(node)?;
    Ok(lhs.div(rhs))
}

fn decode_pow(node: &Map<String, Value>) -> Result<Expression, ModelError> {
    let (lhs, rhs) = binary(node)?;
    Ok(lhs.pow(rhs))
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Const(value) => write!(f, "{value:.4}"),
            Expression::Var => f.write_str("Var()"),
            Expression::Neg(inner) => write!(f, "-({inner})"),
            Expression::Log(inner) => write!(f, "log({inner})"),
            Expression::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
            Expression::Sub(lhs, rhs) => write!(f, "({lhs} - {rhs})"),
            Expression::Mul(lhs, rhs) => write!(f, "{lhs} * {rhs}"),
            Expression::Div(lhs, rhs) => write!(f, "{lhs} / ({rhs})"),
            Expression::Pow(lhs, rhs) => write!(f, "{lhs}^({rhs})"),
        }
    }
}

impl From<f64> for Expression {
    fn from(value: f64) -> Self {
        Expression::Const(value)
    }
}

macro_rules! arithmetic_operator {
    ($trait:ident, $method:ident, $variant:ident) => {
        impl ops::$trait<Expression> for Expression {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::$variant(Box::new(self), Box::new(rhs))
            }
        }

        impl ops::$trait<f64> for Expression {
            type Output = Expression;

            fn $method(self, rhs: f64) -> Expression {
                Expression::$variant(Box::new(self), Box::new(Expression::Const(rhs)))
            }
        }

        impl ops::$trait<Expression> for f64 {
            type Output = Expression;

            fn $method(self, rhs: Expression) -> Expression {
                Expression::$variant(Box::new(Expression::Const(self)), Box::new(rhs))
            }
        }
    };
}

arithmetic_operator!(Add, add, Add);
arithmetic_operator!(Sub, sub, Sub);
arithmetic_operator!(Mul, mul, Mul);
arithmetic_operator!(Div, div, Div);

impl ops::Neg for Expression {
    type Output = Expression;

    fn neg(self) -> Expression {
        Expression::Neg(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluates_geometric_confidence() {
        let f = Expression::geometric_confidence(0.99);
        assert!((f.eval(0.0) - 0.01).abs() < 1e-12);
        assert!((f.eval(99.0) - (1.0 - 0.99f64.powi(100))).abs() < 1e-12);
    }

    #[test]
    fn operators_match_named_constructors() {
        let by_ops = 1.0 - Expression::constant(0.99).pow(Expression::var() + 1.0);
        assert_eq!(by_ops, Expression::geometric_confidence(0.99));
        let scaled = -(Expression::var() * 2.0) / 4.0;
        assert_eq!(scaled.eval(3.0), -1.5);
    }

    #[test]
    fn non_finite_constants_are_not_encodable() {
        assert!(Expression::geometric_confidence(0.99).is_encodable());
        let unbounded = Expression::var().add(Expression::constant(f64::INFINITY)).log();
        assert!(!unbounded.is_encodable());
        assert!(!Expression::constant(f64::NAN).is_encodable());
        let encoded = unbounded.to_json(0, 0);
        assert!(Expression::from_json(&encoded).is_err());
    }

    #[test]
    fn log_of_euler_is_one() {
        assert!((Expression::euler().log().eval(0.0) - 1.0).abs() < 1e-15);
    }

    #[test]
    fn var_encoding_carries_solver_indices() {
        let encoded = Expression::var().to_json(6, 3);
        assert_eq!(encoded, json!({"type": "var", "index": 6, "wire_index": 3}));
    }

    #[test]
    fn nested_encoding_uses_expression_fields() {
        let encoded = Expression::geometric_confidence(0.5).to_json(0, 0);
        assert_eq!(encoded["type"], "sub");
        assert_eq!(encoded["expression1"]["constant"], 1.0);
        assert_eq!(encoded["expression2"]["type"], "pow");
        assert_eq!(encoded["expression2"]["expression2"]["expression1"]["type"], "var");
    }

    #[test]
    fn decode_ignores_var_indices() {
        let decoded = Expression::from_json(&json!({"type": "var", "index": 4, "wire_index": 2}));
        assert_eq!(decoded, Ok(Expression::Var));
    }

    #[test]
    fn neg_uses_opp_tag() {
        let encoded = Expression::var().neg().to_json(0, 0);
        assert_eq!(encoded["type"], "opp");
        assert_eq!(Expression::from_json(&encoded).unwrap().eval(2.0), -2.0);
    }

    #[test]
    fn integer_constants_decode() {
        let decoded = Expression::from_json(&json!({"type": "const", "constant": 3})).unwrap();
        assert_eq!(decoded, Expression::Const(3.0));
    }

    #[test]
    fn unknown_expression_type_is_rejected() {
        let err = Expression::from_json(&json!({"type": "mod"})).unwrap_err();
        assert_eq!(err, ModelError::UnknownExpressionType("mod".into()));
    }

    #[test]
    fn missing_operand_is_rejected() {
        let err = Expression::from_json(&json!({
            "type": "add",
            "expression1": {"type": "var"}
        }))
        .unwrap_err();
        assert_eq!(
            err,
            ModelError::MissingField {
                node: "expression",
                field: "expression2"
            }
        );
    }

    #[test]
    fn display_follows_operator_shapes() {
        let f = Expression::geometric_confidence(0.99);
        assert_eq!(f.to_string(), "(1.0000 - 0.9900^((Var() + 1.0000)))");
    }

    mod round_trip {
        use super::*;
        use crate::proptest_generators::arb_expression;
        use proptest::prelude::*;

        fn same_value(a: f64, b: f64) -> bool {
            a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
        }

        proptest! {
            #[test]
            fn decoded_expression_evaluates_identically(
                expr in arb_expression(),
                inputs in proptest::collection::vec(-50.0f64..50.0, 1..8),
            ) {
                let decoded = Expression::from_json(&expr.to_json(0, 0)).unwrap();
                for x in inputs {
                    let (want, got) = (expr.eval(x), decoded.eval(x));
                    prop_assert!(same_value(want, got), "f({}) = {} but decoded gives {}", x, want, got);
                }
            }
        }
    }
}
