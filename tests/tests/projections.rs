use pretty_assertions::assert_eq;
use quarry::{
    projection::Projected, FilterNode, FilterOp, ProjectionSpec, QueryRequest, Value,
};
use tests::{setup, setup_counting};

fn scalar(row: &quarry::projection::ProjectedRow, field: &str) -> Option<Value> {
    row.get(field).and_then(|p| p.as_scalar()).cloned()
}

fn one(filter_id: i64) -> QueryRequest {
    QueryRequest::new().filter(FilterNode::leaf("id", FilterOp::Eq, filter_id))
}

#[tokio::test]
async fn direct_and_derived_fields_materialize() {
    let engine = setup();

    let spec = ProjectionSpec::new()
        .direct("status")
        .direct("amount")
        .derived("categoryName", "category.name")
        .unwrap()
        .derived("tier", "amount >= 300 ? 'HIGH' : 'LOW'")
        .unwrap();

    let row = engine
        .find_one_projected("Order", &one(1), &spec)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(scalar(&row, "status"), Some(Value::from("PENDING")));
    assert_eq!(scalar(&row, "amount"), Some(Value::F64(100.0)));
    assert_eq!(scalar(&row, "categoryName"), Some(Value::from("Books")));
    assert_eq!(scalar(&row, "tier"), Some(Value::from("LOW")));
}

#[tokio::test]
async fn direct_fields_transliterate_to_snake_case_columns() {
    let engine = setup();

    // `categoryId` is not a declared property; it maps to the category_id
    // column by the naming convention alone
    let spec = ProjectionSpec::new().direct("id").direct("categoryId");

    let row = engine
        .find_one_projected("Order", &one(1), &spec)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(scalar(&row, "categoryId"), Some(Value::I64(1)));

    // Order 5 has no category; the null column is omitted
    let row = engine
        .find_one_projected("Order", &one(5), &spec)
        .await
        .unwrap()
        .unwrap();
    assert!(row.get("categoryId").is_none());
}

#[tokio::test]
async fn absent_reference_fields_are_omitted_not_errors() {
    let engine = setup();

    let spec = ProjectionSpec::new()
        .direct("id")
        .derived("categoryName", "category.name")
        .unwrap()
        .derived("tier", "amount >= 300 ? 'HIGH' : 'LOW'")
        .unwrap();

    // Order 5 has no category
    let row = engine
        .find_one_projected("Order", &one(5), &spec)
        .await
        .unwrap()
        .unwrap();

    assert!(row.get("categoryName").is_none());
    assert_eq!(scalar(&row, "tier"), Some(Value::from("HIGH")));
}

#[tokio::test]
async fn computed_expressions_read_materialized_fields() {
    let engine = setup();

    let spec = ProjectionSpec::new()
        .direct("amount")
        .derived("withTax", "amount * 1.2")
        .unwrap();

    let row = engine
        .find_one_projected("Order", &one(2), &spec)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(scalar(&row, "withTax"), Some(Value::F64(240.0)));
}

#[tokio::test]
async fn whole_reference_records_nest_under_their_alias() {
    let engine = setup();

    let spec = ProjectionSpec::new()
        .direct("id")
        .derived("category", "category")
        .unwrap();

    let row = engine
        .find_one_projected("Order", &one(3), &spec)
        .await
        .unwrap()
        .unwrap();

    let category = row.get("category").and_then(Projected::as_record).unwrap();
    assert_eq!(
        category.get("name").and_then(|p| p.as_scalar()),
        Some(&Value::from("Toys"))
    );
}

#[tokio::test]
async fn collection_fields_load_through_a_secondary_query() {
    let engine = setup();

    let element = ProjectionSpec::new()
        .direct("quantity")
        .derived("unitCode", "unit.code")
        .unwrap();
    let spec = ProjectionSpec::new()
        .direct("id")
        .collection_of("items", "items", element);

    let row = engine
        .find_one_projected("Order", &one(1), &spec)
        .await
        .unwrap()
        .unwrap();

    let items = row.get("items").and_then(Projected::as_many).unwrap();
    assert_eq!(items.len(), 2);

    let mut pairs: Vec<(i64, String)> = items
        .iter()
        .map(|item| {
            let record = item.as_record().unwrap();
            (
                record
                    .get("quantity")
                    .and_then(|p| p.as_scalar())
                    .and_then(|v| v.as_i64())
                    .unwrap(),
                record
                    .get("unitCode")
                    .and_then(|p| p.as_scalar())
                    .and_then(|v| v.as_str().map(String::from))
                    .unwrap(),
            )
        })
        .collect();
    pairs.sort();

    assert_eq!(pairs, vec![(1, "pc".to_string()), (2, "kg".to_string())]);
}

#[tokio::test]
async fn bare_collection_paths_nest_element_references() {
    let engine = setup();

    let spec = ProjectionSpec::new()
        .direct("id")
        .derived("items", "items")
        .unwrap();

    let row = engine
        .find_one_projected("Order", &one(2), &spec)
        .await
        .unwrap()
        .unwrap();

    let items = row.get("items").and_then(Projected::as_many).unwrap();
    assert_eq!(items.len(), 1);

    let item = items[0].as_record().unwrap();
    assert_eq!(
        item.get("quantity").and_then(|p| p.as_scalar()),
        Some(&Value::I32(5))
    );

    let unit = item.get("unit").and_then(Projected::as_record).unwrap();
    assert_eq!(
        unit.get("code").and_then(|p| p.as_scalar()),
        Some(&Value::from("kg"))
    );
}

#[tokio::test]
async fn collection_scalar_paths_project_each_element() {
    let engine = setup();

    let spec = ProjectionSpec::new()
        .direct("id")
        .derived("quantities", "items.quantity")
        .unwrap();

    let row = engine
        .find_one_projected("Order", &one(1), &spec)
        .await
        .unwrap()
        .unwrap();

    let mut quantities: Vec<i64> = row
        .get("quantities")
        .and_then(Projected::as_many)
        .unwrap()
        .iter()
        .map(|p| p.as_scalar().and_then(|v| v.as_i64()).unwrap())
        .collect();
    quantities.sort();

    assert_eq!(quantities, vec![1, 2]);
}

#[tokio::test]
async fn one_secondary_query_per_parent_even_with_two_collection_fields() {
    let (engine, executor) = setup_counting();

    let spec = ProjectionSpec::new()
        .direct("id")
        .derived("allItems", "items")
        .unwrap()
        .collection("itemsAgain", "items");

    executor.reset();
    let page = engine
        .find_all_projected("Order", &QueryRequest::new(), &spec)
        .await
        .unwrap();

    assert_eq!(page.len(), 5);
    // One primary select plus one secondary query per distinct parent; the
    // second collection field hits the per-pass cache
    assert_eq!(executor.queries(), 6);
}

#[tokio::test]
async fn empty_collections_materialize_as_empty_lists() {
    let engine = setup();

    let spec = ProjectionSpec::new()
        .direct("id")
        .collection("items", "items");

    // Order 4 has no items
    let row = engine
        .find_one_projected("Order", &one(4), &spec)
        .await
        .unwrap()
        .unwrap();

    let items = row.get("items").and_then(Projected::as_many).unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn projected_pages_carry_totals_like_entity_pages() {
    let engine = setup();

    let spec = ProjectionSpec::new().direct("id");
    let req = QueryRequest::new()
        .filter(FilterNode::leaf("amount", FilterOp::Gte, 200i64))
        .size(2);

    let page = engine.find_all_projected("Order", &req, &spec).await.unwrap();
    assert_eq!(page.len(), 2);
    assert_eq!(page.total, 4);
}
