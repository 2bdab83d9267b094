// Evaluator integration tests: arithmetic, truthiness, control flow, return
// propagation, closures, collections, and runtime error values.

use std::cell::RefCell;
use std::rc::Rc;
use tinylang::environment::Environment;
use tinylang::evaluator::Evaluator;
use tinylang::lexer::Lexer;
use tinylang::parser::Parser;
use tinylang::value::{HashKey, Value};

fn eval_source(input: &str) -> Value {
    let mut parser = Parser::new(Lexer::new(input));
    let program = parser.parse_program();
    assert!(
        parser.errors().is_empty(),
        "unexpected parse errors for {:?}: {:?}",
        input,
        parser.errors()
    );

    let evaluator = Evaluator::new();
    let env = Rc::new(RefCell::new(Environment::new()));
    evaluator.eval_program(&program, &env)
}

fn assert_error_contains(input: &str, expected: &str) {
    match eval_source(input) {
        Value::Error(message) => assert!(
            message.contains(expected),
            "input {:?}: error {:?} does not contain {:?}",
            input,
            message,
            expected
        ),
        other => panic!("input {:?}: expected error, got {:?}", input, other),
    }
}

#[test]
fn integer_expressions() {
    let tests = [
        ("5", 5),
        ("9999", 9999),
        ("0", 0),
        ("-1", -1),
        ("-0", 0),
        ("5 + 5 + 5 + 5 - 10", 10),
        ("2 * 2 * 2 * 2 * 2", 32),
        ("-50 + 100 + -50", 0),
        ("5 * 2 + 10", 20),
        ("5 + 2 * 10", 25),
        ("20 + 2 * -10", 0),
        ("50 / 2 * 2 + 10", 60),
        ("2 * (5 + 10)", 30),
        ("3 * 3 * 3 + 10", 37),
        ("3 * (3 * 3) + 10", 37),
        ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), Value::Integer(expected), "input: {:?}", input);
    }
}

#[test]
fn division_is_real_valued() {
    // A non-integral quotient must not be silently floored
    assert_eq!(eval_source("7 / 2"), Value::Float(3.5));
    assert_eq!(eval_source("1 / 4"), Value::Float(0.25));
    // An integral quotient stays an integer
    assert_eq!(eval_source("50 / 2"), Value::Integer(25));
}

#[test]
fn floats_interoperate_with_integers() {
    // A float quotient keeps flowing through integer arithmetic; integers
    // paired with a float promote instead of tripping the mismatch check.
    let tests = [
        ("7 / 2 * 2", Value::Integer(7)),
        ("7 / 2 + 1", Value::Float(4.5)),
        ("7 / 2 - 1", Value::Float(2.5)),
        ("1 + 7 / 2", Value::Float(4.5)),
        ("2 * (7 / 2)", Value::Integer(7)),
        ("1 / 2 * 3", Value::Float(1.5)),
        ("1 / 4 < 1", Value::Boolean(true)),
        ("4 > 7 / 2", Value::Boolean(true)),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), expected, "input: {:?}", input);
    }
}

#[test]
fn float_operators() {
    let tests = [
        ("7 / 2 + 7 / 2", Value::Integer(7)),
        ("7 / 2 - 1 / 2", Value::Integer(3)),
        ("7 / 2 * 1 / 2", Value::Float(1.75)),
        ("7 / 2 / 7 / 2", Value::Float(0.25)),
        ("-(7 / 2)", Value::Float(-3.5)),
        ("1 / 4 < 1 / 2", Value::Boolean(true)),
        ("1 / 4 > 1 / 2", Value::Boolean(false)),
        ("7 / 2 == 7 / 2", Value::Boolean(true)),
        ("7 / 2 != 7 / 2", Value::Boolean(false)),
        ("7 / 2 != 5 / 2", Value::Boolean(true)),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), expected, "input: {:?}", input);
    }
}

#[test]
fn dividing_by_a_zero_quotient_is_an_error() {
    assert_error_contains("7 / 2 / 0", "division by zero");
}

#[test]
fn boolean_expressions() {
    let tests = [
        ("true", true),
        ("false", false),
        ("1 < 2", true),
        ("1 > 2", false),
        ("1 < 1", false),
        ("1 > 1", false),
        ("1 == 1", true),
        ("1 != 1", false),
        ("1 == 2", false),
        ("1 != 2", true),
        ("true == true", true),
        ("true != true", false),
        ("true != false", true),
        ("true == false", false),
        ("(1 < 2) == true", true),
        ("(1 < 2) == false", false),
        ("(1 > 2) == true", false),
        ("(1 > 2) == false", true),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), Value::Boolean(expected), "input: {:?}", input);
    }
}

#[test]
fn bang_operator_is_a_zero_test_on_integers() {
    let tests = [
        ("!true", false),
        ("!false", true),
        ("!5", false),
        ("!0", true),
        ("!!true", true),
        ("!!false", false),
        ("!!5", true),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), Value::Boolean(expected), "input: {:?}", input);
    }
}

#[test]
fn if_else_expressions() {
    let tests = [
        ("if (true) { 10 }", Value::Integer(10)),
        ("if (false) { 10 }", Value::Null),
        ("if (1) { 10 }", Value::Integer(10)),
        ("if (0) { 10 }", Value::Null),
        ("if (1 < 2) { 10 }", Value::Integer(10)),
        ("if (1 > 2) { 10 }", Value::Null),
        ("if (1 > 2) { 10 } else { 20 }", Value::Integer(20)),
        ("if (1 < 2) { 10 } else { 20 }", Value::Integer(10)),
        ("if (false) { 10 } else { 20 }", Value::Integer(20)),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), expected, "input: {:?}", input);
    }
}

#[test]
fn strings_are_falsy_in_conditions() {
    assert_eq!(eval_source("if (\"yes\") { 10 } else { 20 }"), Value::Integer(20));
}

#[test]
fn return_statements() {
    let tests = [
        ("return 10;", 10),
        ("return 10; 9;", 10),
        ("return 2 * 5; 9;", 10),
        ("9; return 2 * 5; 9;", 10),
        (
            "if (10 > 1) {
                if (10 > 1) {
                    return 10;
                }
                129
                return 1;
            }",
            10,
        ),
        (
            "if (10 > 1) {
                if (10 > 1) {
                    if (10 > 1) {
                        return 10;
                    }
                }
                129
                return 1;
            }",
            10,
        ),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), Value::Integer(expected), "input: {:?}", input);
    }
}

#[test]
fn let_statements() {
    let tests = [
        ("let a = 5; a;", 5),
        ("let a = 5 * 5; a;", 25),
        ("let a = 5; let b = a; b;", 5),
        ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), Value::Integer(expected), "input: {:?}", input);
    }
}

#[test]
fn inner_let_shadows_without_mutating_outer() {
    let input = "
        let x = 1;
        let f = fn() { let x = 2; x };
        f();
        x
    ";
    assert_eq!(eval_source(input), Value::Integer(1));
}

#[test]
fn string_literal() {
    assert_eq!(
        eval_source("\"Hello World\""),
        Value::Str("Hello World".to_string())
    );
}

#[test]
fn string_concatenation() {
    assert_eq!(
        eval_source("\"Hello\" + \" \" + \"World\""),
        Value::Str("Hello World".to_string())
    );
}

#[test]
fn function_value_captures_parameters_and_body() {
    match eval_source("fn(x) { x + 2 }") {
        Value::Function(function) => {
            assert_eq!(function.parameters, vec!["x"]);
            assert_eq!(function.body.statements.len(), 1);
            assert_eq!(function.body.statements[0].to_string(), "(x + 2)");
        }
        other => panic!("expected function value, got {:?}", other),
    }
}

#[test]
fn function_application() {
    let tests = [
        ("let identity = fn(x) { x; }; identity(5);", 5),
        ("let identity = fn(x) { return x; }; identity(5);", 5),
        ("let double = fn(x) { x * 2; }; double(5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
        ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
        ("fn(x) { x; }(5)", 5),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), Value::Integer(expected), "input: {:?}", input);
    }
}

#[test]
fn closures_capture_their_definition_environment() {
    let input = "
        let newAdder = fn(x) { fn(y) { x + y } };
        let addTwo = newAdder(2);
        addTwo(3);
    ";
    assert_eq!(eval_source(input), Value::Integer(5));
}

#[test]
fn recursive_function() {
    let input = "
        let countdown = fn(n) {
            if (n == 0) { 0 } else { countdown(n - 1) }
        };
        countdown(5);
    ";
    assert_eq!(eval_source(input), Value::Integer(0));
}

#[test]
fn runtime_errors() {
    let tests = [
        ("5 + true;", "type mismatch: integer + boolean"),
        ("5 + true; 5;", "type mismatch: integer + boolean"),
        ("-true", "unknown operator: -boolean"),
        ("!\"hi\"", "unknown operator: !string"),
        ("true + false;", "unknown operator: boolean + boolean"),
        ("5; true + false; 5", "unknown operator: boolean + boolean"),
        (
            "if (10 > 1) { true + false; }",
            "unknown operator: boolean + boolean",
        ),
        (
            "if (10 > 1) {
                if (10 > 1) {
                    return true + false;
                }
                return 1;
            }",
            "unknown operator: boolean + boolean",
        ),
        ("\"Hello\" - \"World\"", "unknown operator: string - string"),
        ("5 / 0", "division by zero"),
        ("let a = 5 + true; 10;", "type mismatch: integer + boolean"),
    ];

    for (input, expected) in tests {
        assert_error_contains(input, expected);
    }
}

#[test]
fn undefined_identifier_is_null_by_design() {
    // Deliberately-preserved behavior: an unbound name reads as null
    // instead of raising a runtime error.
    assert_eq!(eval_source("foobar"), Value::Null);
    assert_eq!(eval_source("let a = 5; b"), Value::Null);
}

#[test]
fn array_literal_evaluation() {
    assert_eq!(
        eval_source("[1, 2 * 2, 3 + 3]"),
        Value::Array(vec![
            Value::Integer(1),
            Value::Integer(4),
            Value::Integer(6)
        ])
    );
}

#[test]
fn array_index_expressions() {
    let tests = [
        ("[1, 2, 3][0]", 1),
        ("[1, 2, 3][1]", 2),
        ("[1, 2, 3][2]", 3),
        ("let i = 0; [1][i];", 1),
        ("[1, 2, 3][1 + 1];", 3),
        ("let myArray = [1, 2, 3]; myArray[2];", 3),
        (
            "let myArray = [1, 2, 3]; myArray[0] + myArray[1] + myArray[2];",
            6,
        ),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), Value::Integer(expected), "input: {:?}", input);
    }
}

#[test]
fn array_index_out_of_bounds_is_an_error() {
    assert_error_contains("[1, 2, 3][3]", "array index out of bounds: 3");
    assert_error_contains("[1, 2, 3][-1]", "array index out of bounds: -1");
}

#[test]
fn hash_literal_evaluation() {
    let input = "
        let two = \"two\";
        {
            \"one\": 10 - 9,
            two: 1 + 1,
            \"thr\" + \"ee\": 6 / 2,
            4: 4,
            true: 5,
            false: 6
        }
    ";

    let expected = [
        (HashKey::Str("one".to_string()), 1),
        (HashKey::Str("two".to_string()), 2),
        (HashKey::Str("three".to_string()), 3),
        (HashKey::Integer(4), 4),
        (HashKey::Boolean(true), 5),
        (HashKey::Boolean(false), 6),
    ];

    match eval_source(input) {
        Value::Hash(pairs) => {
            assert_eq!(pairs.len(), expected.len());
            for (key, value) in expected {
                assert_eq!(pairs.get(&key), Some(&Value::Integer(value)), "key: {}", key);
            }
        }
        other => panic!("expected hash value, got {:?}", other),
    }
}

#[test]
fn hash_index_expressions() {
    let tests = [
        ("{\"foo\": 5}[\"foo\"]", Value::Integer(5)),
        ("{\"foo\": 5}[\"bar\"]", Value::Null),
        ("let key = \"foo\"; {\"foo\": 5}[key]", Value::Integer(5)),
        ("{}[\"foo\"]", Value::Null),
        ("{5: 5}[5]", Value::Integer(5)),
        ("{true: 5}[true]", Value::Integer(5)),
        ("{false: 5}[false]", Value::Integer(5)),
    ];

    for (input, expected) in tests {
        assert_eq!(eval_source(input), expected, "input: {:?}", input);
    }
}

#[test]
fn unhashable_hash_keys_are_errors() {
    assert_error_contains(
        "{\"name\": \"tinylang\"}[fn(x) { x }];",
        "unusable as hash key: function",
    );
    assert_error_contains("{fn(x) { x }: 1}", "unusable as hash key: function");
}

#[test]
fn calling_a_non_function_is_an_error() {
    assert_error_contains("let x = 5; x(1);", "not a function: integer");
}

#[test]
fn wrong_argument_count_is_an_error() {
    assert_error_contains(
        "let f = fn(x) { x }; f(1, 2);",
        "wrong number of arguments: expected 1, got 2",
    );
}

#[test]
fn indexing_a_non_indexable_value_is_an_error() {
    assert_error_contains("5[0]", "index operator not supported for integer");
}

#[test]
fn error_display_format() {
    match eval_source("5 + true") {
        error @ Value::Error(_) => {
            assert!(error.to_string().starts_with("ERROR: "));
        }
        other => panic!("expected error, got {:?}", other),
    }
}
