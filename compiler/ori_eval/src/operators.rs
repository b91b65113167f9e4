//! Binary and unary operator evaluation.
//!
//! `&&` and `||` short-circuit in the interpreter; here they only see
//! already-evaluated booleans.

use ori_ir::{BinaryOp, UnaryOp};

use crate::errors::{
    division_by_zero, integer_overflow, invalid_binary_op, modulo_by_zero, type_mismatch,
    EvalResult,
};
use crate::Value;

pub fn evaluate_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(left == right)),
        BinaryOp::NotEq => return Ok(Value::Bool(left != right)),
        _ => {}
    }
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => int_op(op, *a, *b),
        (Value::Bool(a), Value::Bool(b)) => match op {
            BinaryOp::And => Ok(Value::Bool(*a && *b)),
            BinaryOp::Or => Ok(Value::Bool(*a || *b)),
            _ => Err(invalid_binary_op("bool", op)),
        },
        (Value::Str(a), Value::Str(b)) => match op {
            BinaryOp::Add => Ok(Value::string(&format!("{a}{b}"))),
            _ => compare(op, a, b, "str"),
        },
        (Value::Duration(a), Value::Duration(b)) => match op {
            BinaryOp::Add => a
                .checked_add(*b)
                .map(Value::Duration)
                .ok_or_else(|| integer_overflow("duration addition")),
            BinaryOp::Sub => a
                .checked_sub(*b)
                .map(Value::Duration)
                .ok_or_else(|| integer_overflow("duration subtraction")),
            _ => compare(op, a, b, "Duration"),
        },
        _ => Err(type_mismatch(left.type_name(), right.type_name())),
    }
}

fn int_op(op: BinaryOp, a: i64, b: i64) -> EvalResult {
    let checked = |result: Option<i64>, what: &'static str| {
        result.map(Value::Int).ok_or_else(|| integer_overflow(what))
    };
    match op {
        BinaryOp::Add => checked(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked(a.checked_mul(b), "multiplication"),
        BinaryOp::Div if b == 0 => Err(division_by_zero()),
        BinaryOp::Div => checked(a.checked_div(b), "division"),
        BinaryOp::Mod if b == 0 => Err(modulo_by_zero()),
        BinaryOp::Mod => checked(a.checked_rem(b), "remainder"),
        BinaryOp::And | BinaryOp::Or => Err(invalid_binary_op("int", op)),
        _ => compare(op, &a, &b, "int"),
    }
}

fn compare<T: PartialOrd + ?Sized>(op: BinaryOp, a: &T, b: &T, type_name: &'static str) -> EvalResult {
    let result = match op {
        BinaryOp::Lt => a < b,
        BinaryOp::LtEq => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::GtEq => a >= b,
        _ => return Err(invalid_binary_op(type_name, op)),
    };
    Ok(Value::Bool(result))
}

pub fn evaluate_unary(op: UnaryOp, operand: &Value) -> EvalResult {
    match (op, operand) {
        (UnaryOp::Neg, Value::Int(n)) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("negation")),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Neg, other) => Err(type_mismatch("int", other.type_name())),
        (UnaryOp::Not, other) => Err(type_mismatch("bool", other.type_name())),
    }
}
