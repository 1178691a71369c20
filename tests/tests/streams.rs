use pretty_assertions::assert_eq;
use quarry::{Direction, FilterNode, FilterOp, ProjectionSpec, QueryRequest};
use tests::setup;
use tokio_stream::StreamExt;

#[tokio::test]
async fn streaming_yields_every_match_in_sort_order() {
    let engine = setup();

    let req = QueryRequest::new().sort("amount", Direction::Desc);
    let stream = engine.find_all_as_stream("Order", req);
    tokio::pin!(stream);

    let mut ids = Vec::new();
    while let Some(entity) = stream.next().await {
        let entity = entity.unwrap();
        ids.push(entity.get("id").and_then(|v| v.as_i64()).unwrap());
    }

    assert_eq!(ids, vec![5, 4, 3, 2, 1]);
}

#[tokio::test]
async fn streaming_ignores_page_bounds() {
    let engine = setup();

    // The export path is unpaged even when the request carries page bounds
    let req = QueryRequest::new().size(2).page(1);
    let stream = engine.find_all_as_stream("Order", req);
    tokio::pin!(stream);

    let mut count = 0;
    while let Some(entity) = stream.next().await {
        entity.unwrap();
        count += 1;
    }

    assert_eq!(count, 5);
}

#[tokio::test]
async fn streaming_surfaces_compile_errors() {
    let engine = setup();

    let req = QueryRequest::new().filter(FilterNode::leaf("ghost", FilterOp::Eq, 1i64));
    let stream = engine.find_all_as_stream("Order", req);
    tokio::pin!(stream);

    let first = stream.next().await.unwrap();
    assert!(first.unwrap_err().is_property_not_found());
}

#[tokio::test]
async fn projected_streaming_materializes_each_row() {
    let engine = setup();

    let spec = ProjectionSpec::new()
        .direct("id")
        .derived("categoryName", "category.name")
        .unwrap();

    let stream = engine.find_all_projected_as_stream("Order", QueryRequest::new(), spec);
    tokio::pin!(stream);

    let mut names = Vec::new();
    while let Some(row) = stream.next().await {
        let row = row.unwrap();
        names.push(
            row.get("categoryName")
                .and_then(|p| p.as_scalar())
                .and_then(|v| v.as_str().map(String::from)),
        );
    }

    assert_eq!(
        names,
        vec![
            Some("Books".to_string()),
            Some("Books".to_string()),
            Some("Toys".to_string()),
            Some("Toys".to_string()),
            None,
        ]
    );
}
