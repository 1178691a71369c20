use quarry::{FilterNode, FilterOp, QueryRequest, Value};
use tests::setup;

#[tokio::test]
async fn unknown_paths_are_client_errors() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf("warehouse.name", FilterOp::Eq, "A"));
    let err = engine.find_all("Order", &req).await.unwrap_err();

    assert!(err.is_property_not_found());
    assert!(err.to_string().contains("warehouse.name"));
}

#[tokio::test]
async fn traversing_a_plain_property_is_invalid_criteria() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf("status.name", FilterOp::Eq, "A"));
    let err = engine.find_all("Order", &req).await.unwrap_err();

    assert!(err.is_invalid_filter_criteria());
}

#[tokio::test]
async fn between_with_three_values_is_rejected() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf(
        "amount",
        FilterOp::Between,
        Value::List(vec![Value::I64(1), Value::I64(2), Value::I64(3)]),
    ));
    let err = engine.find_all("Order", &req).await.unwrap_err();

    assert!(err.is_invalid_filter_criteria());
}

#[tokio::test]
async fn unparseable_values_name_the_value_and_type() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf(
        "createdAt",
        FilterOp::Eq,
        "first of January",
    ));
    let err = engine.find_all("Order", &req).await.unwrap_err();

    assert!(err.is_type_conversion());
    let message = err.to_string();
    assert!(message.contains("first of January"));
    assert!(message.contains("DateTime"));
}

#[tokio::test]
async fn array_overlap_is_rejected_on_sqlite() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf(
        "status",
        FilterOp::Overlaps,
        Value::from(vec!["A", "B"]),
    ));
    let err = engine.find_all("Order", &req).await.unwrap_err();

    assert!(err.is_invalid_filter_criteria());
}

#[tokio::test]
async fn unknown_sort_fields_fail_before_execution() {
    let engine = setup();

    let req = QueryRequest::new().sort("ghost", quarry::Direction::Asc);
    let err = engine.find_all("Order", &req).await.unwrap_err();

    assert!(err.is_property_not_found());
}

#[tokio::test]
async fn unknown_entities_fail_fast() {
    let engine = setup();

    let err = engine
        .find_all("Invoice", &QueryRequest::new())
        .await
        .unwrap_err();

    assert!(err.is_invalid_schema());
}

#[test]
fn unknown_operator_strings_fail_at_the_wire() {
    let result: Result<FilterNode, _> =
        serde_json::from_str(r#"{"field": "status", "operator": "matches", "value": "x"}"#);

    let err = result.unwrap_err();
    assert!(err.to_string().contains("matches"));
}

#[tokio::test]
async fn bad_projection_expressions_fail_at_spec_construction() {
    let err = quarry::ProjectionSpec::new()
        .derived("broken", "amount >")
        .unwrap_err();

    assert!(err.to_string().contains("invalid expression"));
}
