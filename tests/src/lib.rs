//! Shared harness for the integration suite: the demo schema registry, a
//! seeded SQLite database, and an executor wrapper that counts queries.

use quarry::{Engine, EntitySchema, Executor, Flavor, Schema, Type};
use quarry_core::{
    async_trait,
    driver::{Capability, Row, SqlStatement},
    Result,
};
use quarry_driver_sqlite::Sqlite;

use std::sync::{
    atomic::{AtomicU64, Ordering::Relaxed},
    Arc,
};

/// The demo domain: orders with line items, categories, and units.
pub fn schema() -> Arc<Schema> {
    let schema = Schema::builder()
        .entity(
            EntitySchema::builder("Order", "orders")
                .property("id", "id", Type::I64)
                .property("status", "status", Type::Text)
                .property("amount", "amount", Type::Decimal)
                .property("createdAt", "created_at", Type::DateTime)
                .property("closedAt", "closed_at", Type::DateTime)
                .collection("items", "OrderItem", "order_id")
                .reference("category", "Category", "category_id", "id"),
        )
        .entity(
            EntitySchema::builder("OrderItem", "order_items")
                .property("id", "id", Type::I64)
                .property("quantity", "quantity", Type::I32)
                .property("unitPrice", "unit_price", Type::F64)
                .reference("unit", "Unit", "unit_id", "id"),
        )
        .entity(
            EntitySchema::builder("Category", "categories")
                .property("id", "id", Type::I64)
                .property("name", "name", Type::Text),
        )
        .entity(
            EntitySchema::builder("Unit", "units")
                .property("id", "id", Type::I64)
                .property("code", "code", Type::Text)
                .property("name", "name", Type::Text),
        )
        .build()
        .expect("demo schema is valid");

    Arc::new(schema)
}

const SEED: &str = "
    CREATE TABLE categories (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL
    );
    CREATE TABLE units (
        id INTEGER PRIMARY KEY,
        code TEXT NOT NULL,
        name TEXT NOT NULL
    );
    CREATE TABLE orders (
        id INTEGER PRIMARY KEY,
        status TEXT NOT NULL,
        amount REAL NOT NULL,
        created_at TEXT NOT NULL,
        closed_at TEXT,
        category_id INTEGER
    );
    CREATE TABLE order_items (
        id INTEGER PRIMARY KEY,
        order_id INTEGER NOT NULL,
        quantity INTEGER NOT NULL,
        unit_price REAL NOT NULL,
        unit_id INTEGER
    );

    INSERT INTO categories (id, name) VALUES
        (1, 'Books'),
        (2, 'Toys');

    INSERT INTO units (id, code, name) VALUES
        (1, 'kg', 'Kilogram'),
        (2, 'pc', 'Piece');

    INSERT INTO orders (id, status, amount, created_at, closed_at, category_id) VALUES
        (1, 'PENDING',   100.0, '2024-01-01T10:00:00', NULL,                  1),
        (2, 'COMPLETED', 200.0, '2024-02-01T10:00:00', '2024-02-02T00:00:00', 1),
        (3, 'PENDING',   300.0, '2024-03-01T10:00:00', NULL,                  2),
        (4, 'CANCELLED', 400.0, '2024-04-01T10:00:00', '2024-04-05T00:00:00', 2),
        (5, 'COMPLETED', 500.0, '2024-05-01T10:00:00', '2024-05-03T00:00:00', NULL);

    INSERT INTO order_items (id, order_id, quantity, unit_price, unit_id) VALUES
        (1, 1,  2,  50.0, 1),
        (2, 1,  1,  25.0, 2),
        (3, 2,  5,  40.0, 1),
        (4, 3, 10,  30.0, 2),
        (5, 5,  3, 100.0, 2);
";

/// A fresh engine over a seeded in-memory database.
pub fn setup() -> Engine {
    let sqlite = Sqlite::in_memory().expect("open in-memory database");
    sqlite.execute_batch(SEED).expect("seed database");
    Engine::new(schema(), Arc::new(sqlite), Flavor::Sqlite)
}

/// Like [`setup`], but the executor counts SELECT round trips so tests can
/// pin down secondary-query behavior.
pub fn setup_counting() -> (Engine, Arc<CountingExecutor>) {
    let sqlite = Sqlite::in_memory().expect("open in-memory database");
    sqlite.execute_batch(SEED).expect("seed database");

    let executor = Arc::new(CountingExecutor {
        inner: sqlite,
        queries: AtomicU64::new(0),
    });
    let engine = Engine::new(schema(), executor.clone(), Flavor::Sqlite);
    (engine, executor)
}

/// Delegating executor that counts `query` round trips.
#[derive(Debug)]
pub struct CountingExecutor {
    inner: Sqlite,
    queries: AtomicU64,
}

impl CountingExecutor {
    pub fn queries(&self) -> u64 {
        self.queries.load(Relaxed)
    }

    pub fn reset(&self) {
        self.queries.store(0, Relaxed);
    }
}

#[async_trait]
impl Executor for CountingExecutor {
    fn capability(&self) -> &Capability {
        self.inner.capability()
    }

    async fn query(&self, stmt: &SqlStatement) -> Result<Vec<Row>> {
        self.queries.fetch_add(1, Relaxed);
        self.inner.query(stmt).await
    }

    async fn query_count(&self, stmt: &SqlStatement) -> Result<u64> {
        self.inner.query_count(stmt).await
    }
}

/// The ids of a page of Order entities, in result order.
pub fn order_ids(page: &quarry::Page<quarry::Entity>) -> Vec<i64> {
    page.items
        .iter()
        .map(|entity| entity.get("id").and_then(|v| v.as_i64()).expect("order id"))
        .collect()
}
