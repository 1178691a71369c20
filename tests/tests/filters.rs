use pretty_assertions::assert_eq;
use quarry::{FilterNode, FilterOp, QueryRequest, Value};
use tests::{order_ids, setup};

#[tokio::test]
async fn empty_filter_list_returns_everything() {
    let engine = setup();

    let page = engine.find_all("Order", &QueryRequest::new()).await.unwrap();

    assert_eq!(order_ids(&page), vec![1, 2, 3, 4, 5]);
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn eq_and_neq() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf("status", FilterOp::Eq, "PENDING"));
    let page = engine.find_all("Order", &req).await.unwrap();
    assert_eq!(order_ids(&page), vec![1, 3]);

    let req = QueryRequest::new().filter(FilterNode::leaf("status", FilterOp::Ne, "PENDING"));
    let page = engine.find_all("Order", &req).await.unwrap();
    assert_eq!(order_ids(&page), vec![2, 4, 5]);
}

#[tokio::test]
async fn between_is_inclusive_on_both_bounds() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf(
        "amount",
        FilterOp::Between,
        Value::List(vec![Value::I64(200), Value::I64(400)]),
    ));
    let page = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(order_ids(&page), vec![2, 3, 4]);
}

#[tokio::test]
async fn in_matches_the_union_and_ignores_list_order() {
    let engine = setup();

    let forward = QueryRequest::new().filter(FilterNode::leaf(
        "status",
        FilterOp::In,
        Value::from(vec!["COMPLETED", "PENDING"]),
    ));
    let reversed = QueryRequest::new().filter(FilterNode::leaf(
        "status",
        FilterOp::In,
        Value::from(vec!["PENDING", "COMPLETED"]),
    ));

    let forward = engine.find_all("Order", &forward).await.unwrap();
    let reversed = engine.find_all("Order", &reversed).await.unwrap();

    assert_eq!(order_ids(&forward), vec![1, 2, 3, 5]);
    assert_eq!(order_ids(&forward), order_ids(&reversed));
}

#[tokio::test]
async fn like_matches_prefixes_case_insensitively() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf("status", FilterOp::Like, "pend"));
    let page = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(order_ids(&page), vec![1, 3]);
}

#[tokio::test]
async fn eqic_ignores_case() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf(
        "status",
        FilterOp::EqIgnoreCase,
        "completed",
    ));
    let page = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(order_ids(&page), vec![2, 5]);
}

#[tokio::test]
async fn null_tests_bind_nothing_and_match_nullability() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf("closedAt", FilterOp::IsNull, Value::Null));
    let page = engine.find_all("Order", &req).await.unwrap();
    assert_eq!(order_ids(&page), vec![1, 3]);

    let req =
        QueryRequest::new().filter(FilterNode::leaf("closedAt", FilterOp::IsNotNull, Value::Null));
    let page = engine.find_all("Order", &req).await.unwrap();
    assert_eq!(order_ids(&page), vec![2, 4, 5]);
}

#[tokio::test]
async fn compound_or_with_nested_and() {
    let engine = setup();

    // status = 'CANCELLED' OR (status = 'COMPLETED' AND amount >= 300)
    let req = QueryRequest::new().filter(FilterNode::or(vec![
        FilterNode::leaf("status", FilterOp::Eq, "CANCELLED"),
        FilterNode::and(vec![
            FilterNode::leaf("status", FilterOp::Eq, "COMPLETED"),
            FilterNode::leaf("amount", FilterOp::Gte, 300i64),
        ]),
    ]));
    let page = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(order_ids(&page), vec![4, 5]);
}

#[tokio::test]
async fn empty_compound_is_always_true() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::and(Vec::new()));
    let page = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn top_level_filters_are_anded() {
    let engine = setup();

    let req = QueryRequest::new()
        .filter(FilterNode::leaf("status", FilterOp::Eq, "PENDING"))
        .filter(FilterNode::leaf("amount", FilterOp::Gt, 100i64));
    let page = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(order_ids(&page), vec![3]);
}

#[tokio::test]
async fn wire_shape_requests_run_end_to_end() {
    let engine = setup();

    let req: QueryRequest = serde_json::from_str(
        r#"{
            "filters": [
                {
                    "logicalOperator": "OR",
                    "children": [
                        {"field": "amount", "operator": "lt", "value": "150"},
                        {"field": "category.name", "operator": "eq", "value": "Toys"}
                    ]
                }
            ],
            "sortField": "amount",
            "sortDirection": "DESC"
        }"#,
    )
    .unwrap();

    let page = engine.find_all("Order", &req).await.unwrap();
    assert_eq!(order_ids(&page), vec![4, 3, 1]);
}
