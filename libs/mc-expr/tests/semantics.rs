use mc_expr::{
    decode_expression, evaluate, Environment, EvalError, Expression, InfixOp, UnsupportedPolicy,
};
use serde_json::{json, Value};

fn number(value: f64) -> Value {
    json!({"ctype": "number", "value": {"real": value, "imag": 0.0}})
}

fn variable(name: &str) -> Value {
    json!({"ctype": "variable", "name": name})
}

fn infix(oper: &str, lhs: Value, rhs: Value) -> Value {
    json!({"ctype": "infix", "oper": oper, "args": [lhs, rhs]})
}

fn eval_tree(tree: &Value, globals: &Environment) -> Result<f32, EvalError> {
    let expr = decode_expression(tree, UnsupportedPolicy::Reject)?;
    let mut local = globals.local();
    evaluate(&expr, &mut local)
}

#[test]
fn arithmetic_matches_direct_computation() {
    let tree = infix("*", infix("+", number(2.0), number(3.0)), number(4.0));
    assert_eq!(eval_tree(&tree, &Environment::new()).unwrap(), 20.0);
}

#[test]
fn power_of_bound_variable() {
    let globals: Environment = [("x", 3.0)].into_iter().collect();
    let tree = infix("^", variable("x"), number(2.0));
    assert_eq!(eval_tree(&tree, &globals).unwrap(), 9.0);
}

#[test]
fn unbound_variable_reads_as_zero() {
    let tree = infix("+", variable("y"), number(3.0));
    assert_eq!(eval_tree(&tree, &Environment::new()).unwrap(), 3.0);
}

#[test]
fn assignment_stays_in_the_evaluating_scope() {
    // x = 5; x + 1
    let tree = infix(
        ";",
        infix("=", variable("x"), number(5.0)),
        infix("+", variable("x"), number(1.0)),
    );
    let expr = decode_expression(&tree, UnsupportedPolicy::Reject).unwrap();
    let globals = Environment::new();

    let mut first = globals.local();
    assert_eq!(evaluate(&expr, &mut first).unwrap(), 6.0);

    // A sibling sample reading x sees nothing of the first sample's write.
    let sibling = globals.local();
    assert_eq!(sibling.get("x"), None);
    assert!(globals.is_empty());
}

#[test]
fn sphere_field_from_cindyscript_tree() {
    // sqrt(x^2 + y^2 + z^2) - r
    let square = |name: &str| infix("^", variable(name), number(2.0));
    let tree = json!({
        "ctype": "function",
        "body": infix(
            "-",
            json!({
                "ctype": "function",
                "oper": "sqrt$1",
                "args": [infix("+", infix("+", square("x"), square("y")), square("z"))]
            }),
            variable("r"),
        )
    });
    let expr = mc_expr::decode_function(&tree, UnsupportedPolicy::Reject).unwrap();
    let globals: Environment = [("r", 1.0)].into_iter().collect();

    let mut local = globals.local_at([3.0, 4.0, 0.0]);
    assert_eq!(evaluate(&expr, &mut local).unwrap(), 4.0);
}

#[test]
fn unsupported_function_policy_is_consistent() {
    let tree = infix(
        "+",
        json!({"ctype": "function", "oper": "exp$1", "args": [number(1.0)]}),
        number(2.0),
    );
    assert!(matches!(
        decode_expression(&tree, UnsupportedPolicy::Reject),
        Err(EvalError::UnsupportedExpression(_))
    ));

    let lenient = decode_expression(&tree, UnsupportedPolicy::Lenient).unwrap();
    let globals = Environment::new();
    assert_eq!(evaluate(&lenient, &mut globals.local()).unwrap(), 2.0);
}

#[test]
fn unsupported_operator_still_runs_assignments_when_lenient() {
    // (a = 5) % 2 ; a
    let tree = infix(
        ";",
        infix("%", infix("=", variable("a"), number(5.0)), number(2.0)),
        variable("a"),
    );
    assert!(matches!(
        decode_expression(&tree, UnsupportedPolicy::Reject),
        Err(EvalError::UnsupportedExpression(_))
    ));

    let lenient = decode_expression(&tree, UnsupportedPolicy::Lenient).unwrap();
    let globals = Environment::new();
    assert_eq!(evaluate(&lenient, &mut globals.local()).unwrap(), 5.0);

    // the unsupported node itself reads as 0
    let bare = decode_expression(&infix("%", number(7.0), number(2.0)), UnsupportedPolicy::Lenient).unwrap();
    assert_eq!(evaluate(&bare, &mut globals.local()).unwrap(), 0.0);
}

#[test]
fn deeply_nested_expression_evaluates_without_overflow() {
    // x + 1 + 1 + ... built directly, far past what decoding accepts
    let mut expr = Expression::variable("x");
    for _ in 0..100_000 {
        expr = Expression::infix(InfixOp::Add, expr, Expression::number(1.0));
    }
    let globals = Environment::new();
    let value = evaluate(&expr, &mut globals.local_at([0.5, 0.0, 0.0])).unwrap();
    assert_eq!(value, 100_000.5);
    // dropping a tree this deep recurses once per level
    std::mem::forget(expr);
}
