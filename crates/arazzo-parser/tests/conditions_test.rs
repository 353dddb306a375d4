//! Integration tests for condition parsing over realistic success criteria

use arazzo_ast::AssertionKind;
use arazzo_parser::{
    has_top_level_comparison, parse_condition, split_comparison, Condition, ConditionError,
    ConditionKind, ConditionLiteral, LogicalOp, Operand, MAX_NESTING,
};

/// Helper to parse a condition that must succeed
fn parse_ok(source: &str) -> Condition {
    parse_condition(source).unwrap_or_else(|e| panic!("parse of {:?} failed: {}", source, e))
}

fn assertion_kinds(condition: &Condition) -> Vec<AssertionKind> {
    condition
        .conjuncts()
        .into_iter()
        .filter_map(|c| match &c.kind {
            ConditionKind::Assertion { kind, .. } => Some(*kind),
            _ => None,
        })
        .collect()
}

// === Simple criteria ===

#[test]
fn test_status_code_criteria() {
    for (source, kind) in [
        ("$statusCode == 200", AssertionKind::Equals),
        ("$statusCode != 404", AssertionKind::NotEquals),
        ("$statusCode < 300", AssertionKind::Less),
        ("$statusCode <= 299", AssertionKind::LessOrEqual),
        ("$statusCode > 199", AssertionKind::Greater),
        ("$statusCode >= 200", AssertionKind::GreaterOrEqual),
    ] {
        assert_eq!(assertion_kinds(&parse_ok(source)), vec![kind], "{}", source);
    }
}

#[test]
fn test_body_field_against_quoted_strings() {
    let condition = parse_ok("$response.body#/status == \"active\"");
    match &condition.kind {
        ConditionKind::Assertion { right, .. } => assert_eq!(
            right.kind,
            ConditionKind::Literal(ConditionLiteral::String("active".to_string()))
        ),
        other => panic!("Expected assertion, got {:?}", other),
    }
}

#[test]
fn test_range_check_is_a_conjunction_of_two_assertions() {
    let condition = parse_ok("$statusCode >= 200 && $statusCode < 300");
    assert!(matches!(
        condition.kind,
        ConditionKind::Logical {
            op: LogicalOp::And,
            ..
        }
    ));
    assert_eq!(
        assertion_kinds(&condition),
        vec![AssertionKind::GreaterOrEqual, AssertionKind::Less]
    );
}

#[test]
fn test_step_output_comparison() {
    let condition = parse_ok("$response.body#/robotId == $steps.createRobot.outputs.robotId");
    let ConditionKind::Assertion { left, right, .. } = &condition.kind else {
        panic!("Expected an assertion, got {:?}", condition.kind);
    };
    assert_eq!(left.kind, ConditionKind::Runtime("$response.body#/robotId".to_string()));
    assert_eq!(
        right.kind,
        ConditionKind::Runtime("$steps.createRobot.outputs.robotId".to_string())
    );
}

#[test]
fn test_parse_is_deterministic() {
    let source = "!($statusCode == 500) || $response.body#/retry == false";
    assert_eq!(parse_ok(source), parse_ok(source));
}

#[test]
fn test_tree_serializes_to_json() {
    let condition = parse_ok("$statusCode == 201");
    let json = serde_json::to_value(&condition).expect("serialize");
    assert_eq!(json["kind"]["Assertion"]["kind"], "equals");
    assert_eq!(json["kind"]["Assertion"]["message"], "$statusCode == 201");
}

// === Failures ===

#[test]
fn test_malformed_conditions_fail() {
    let cases = [
        "($statusCode == 200",
        "$statusCode == 200)",
        "$statusCode ===",
        "&& true",
        "$statusCode == 99999999999999999999",
        "#",
    ];
    for source in cases {
        assert!(parse_condition(source).is_err(), "Expected {:?} to fail", source);
    }
}

#[test]
fn test_oversized_integer_is_invalid_number() {
    let err = parse_condition("$statusCode == 99999999999999999999").unwrap_err();
    assert!(matches!(err, ConditionError::InvalidNumber { .. }));
}

#[test]
fn test_overflowing_float_is_invalid_number() {
    let source = format!("$response.body#/x == {}.0", "1".repeat(400));
    let err = parse_condition(&source).unwrap_err();
    assert!(matches!(err, ConditionError::InvalidNumber { .. }));
    assert_eq!(err.code(), "E-COND-009");
}

#[test]
fn test_nesting_is_capped() {
    let nested = |depth: usize| {
        format!("{}$statusCode == 200{}", "(".repeat(depth), ")".repeat(depth))
    };
    let condition = parse_ok(&nested(MAX_NESTING));
    assert_eq!(assertion_kinds(&condition), vec![AssertionKind::Equals]);

    let err = parse_condition(&nested(1000)).unwrap_err();
    assert!(matches!(err, ConditionError::TooDeep { limit: MAX_NESTING, .. }));
    assert_eq!(err.code(), "E-COND-010");

    let negated = format!("{}$response.body#/ok", "!".repeat(1000));
    let err = parse_condition(&negated).unwrap_err();
    assert!(matches!(err, ConditionError::TooDeep { .. }));
}

// === JSONPath split ===

#[test]
fn test_jsonpath_predicate_has_no_top_level_comparison() {
    assert!(!has_top_level_comparison("$[?(@.name == 'bolt')]"));
    assert!(has_top_level_comparison("$[?(@.name == 'bolt')].length == 1"));
}

#[test]
fn test_jsonpath_value_comparison() {
    let cmp = split_comparison("$.items[0].count >= 3").expect("split");
    assert_eq!(cmp.left, Operand::Runtime("$.items[0].count".to_string()));
    assert_eq!(cmp.operator.symbol(), ">=");
    assert_eq!(cmp.right, Operand::Literal(ConditionLiteral::Int(3)));
}
