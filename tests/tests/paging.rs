use pretty_assertions::assert_eq;
use quarry::{Direction, FilterNode, FilterOp, QueryRequest};
use tests::{order_ids, setup};

#[tokio::test]
async fn pages_slice_the_sorted_result() {
    let engine = setup();

    let req = QueryRequest::new().sort("amount", Direction::Desc).size(2);
    let first = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(order_ids(&first), vec![5, 4]);
    assert_eq!(first.total, 5);
    assert_eq!(first.total_pages(), 3);
    assert!(first.has_next());

    let last = engine.find_all("Order", &req.clone().page(2)).await.unwrap();
    assert_eq!(order_ids(&last), vec![1]);
    assert!(!last.has_next());
}

#[tokio::test]
async fn totals_count_all_matches_not_just_the_page() {
    let engine = setup();

    let req = QueryRequest::new()
        .filter(FilterNode::leaf("amount", FilterOp::Gte, 200i64))
        .size(2);
    let page = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(page.len(), 2);
    assert_eq!(page.total, 4);
}

#[tokio::test]
async fn unpaged_returns_everything_sorted() {
    let engine = setup();

    let req = QueryRequest::new()
        .sort("amount", Direction::Desc)
        .size(2)
        .unpaged();
    let page = engine.find_all("Order", &req).await.unwrap();

    assert_eq!(order_ids(&page), vec![5, 4, 3, 2, 1]);
    assert_eq!(page.total, 5);
}

#[tokio::test]
async fn find_one_takes_the_first_match() {
    let engine = setup();

    let req = QueryRequest::new()
        .filter(FilterNode::leaf("status", FilterOp::Eq, "PENDING"))
        .sort("amount", Direction::Desc);
    let found = engine.find_one("Order", &req).await.unwrap().unwrap();

    assert_eq!(found.get("id").and_then(|v| v.as_i64()), Some(3));
}

#[tokio::test]
async fn find_one_is_none_when_nothing_matches() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf("status", FilterOp::Eq, "SHIPPED"));
    assert!(engine.find_one("Order", &req).await.unwrap().is_none());
}

#[tokio::test]
async fn count_honors_filters_and_ignores_paging() {
    let engine = setup();

    let req = QueryRequest::new()
        .filter(FilterNode::leaf("status", FilterOp::Eq, "PENDING"))
        .size(1);
    assert_eq!(engine.count("Order", &req).await.unwrap(), 2);

    assert_eq!(engine.count("Order", &QueryRequest::new()).await.unwrap(), 5);
}

#[tokio::test]
async fn count_deduplicates_under_collection_joins() {
    let engine = setup();

    // Order 1 has two items; it still counts once
    let req = QueryRequest::new().filter(FilterNode::leaf("items.quantity", FilterOp::Gte, 1i64));
    assert_eq!(engine.count("Order", &req).await.unwrap(), 4);
}

#[tokio::test]
async fn entities_carry_every_declared_property() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf("id", FilterOp::Eq, 2i64));
    let entity = engine.find_one("Order", &req).await.unwrap().unwrap();

    assert_eq!(entity.get("status").and_then(|v| v.as_str()), Some("COMPLETED"));
    assert_eq!(entity.get("amount").and_then(|v| v.as_f64()), Some(200.0));
    assert!(matches!(
        entity.get("createdAt"),
        Some(quarry::Value::DateTime(_))
    ));
}
