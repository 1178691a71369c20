use pretty_assertions::assert_eq;
use quarry::{FilterNode, FilterOp, QueryRequest, Value};
use quarry_sql::{Flavor, PathResolver, QueryCompiler};
use tests::{order_ids, schema, setup};

fn request() -> QueryRequest {
    QueryRequest::new().filter(FilterNode::leaf(
        "amount",
        FilterOp::Between,
        Value::List(vec![Value::I64(200), Value::I64(400)]),
    ))
}

#[tokio::test]
async fn identical_requests_return_identical_results() {
    let engine = setup();

    let first = engine.find_all("Order", &request()).await.unwrap();
    let second = engine.find_all("Order", &request()).await.unwrap();

    assert_eq!(order_ids(&first), order_ids(&second));
}

#[test]
fn recompiling_renames_parameters_but_keeps_the_shape() {
    let schema = schema();
    let resolver = PathResolver::new();
    let compiler = QueryCompiler::new(&schema, &resolver, Flavor::Sqlite);
    let order = schema.entity("Order").unwrap();

    let first = compiler.select(order, &request()).unwrap();
    let second = compiler.select(order, &request()).unwrap();

    // Fresh names from the monotonic counter
    let first_names: Vec<_> = first.params.iter().map(|p| p.name.clone()).collect();
    let second_names: Vec<_> = second.params.iter().map(|p| p.name.clone()).collect();
    assert_ne!(first_names, second_names);

    // Same bound values, and the same SQL once names are normalized away
    let first_values: Vec<_> = first.params.iter().map(|p| p.value.clone()).collect();
    let second_values: Vec<_> = second.params.iter().map(|p| p.value.clone()).collect();
    assert_eq!(first_values, second_values);

    let normalize = |sql: &str, names: &[String]| {
        let mut out = sql.to_string();
        for (index, name) in names.iter().enumerate() {
            out = out.replace(name.as_str(), &format!("p{index}"));
        }
        out
    };
    assert_eq!(
        normalize(&first.sql, &first_names),
        normalize(&second.sql, &second_names),
    );
}
