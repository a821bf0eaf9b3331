//! Integration tests for the schema/relationship model.

use mysql_gateway_mcp::models::{
    ColumnDescriptor, QueryOutcome, RelationEdge, SchemaModel, TableDescriptor,
};

fn sample_model() -> SchemaModel {
    let mut model = SchemaModel::new("shop");
    model.refresh_tables(vec![
        TableDescriptor::new("users")
            .with_column(
                ColumnDescriptor::new("id", "int unsigned", false)
                    .with_key("PRI")
                    .with_extra("auto_increment"),
            )
            .with_column(ColumnDescriptor::new("email", "varchar(255)", false).with_key("UNI")),
        TableDescriptor::new("orders")
            .with_column(ColumnDescriptor::new("id", "int unsigned", false).with_key("PRI"))
            .with_column(ColumnDescriptor::new("user_id", "int unsigned", false).with_key("MUL"))
            .with_column(
                ColumnDescriptor::new("status", "varchar(20)", true).with_default("open"),
            ),
    ]);
    model
}

#[test]
fn test_describe_renders_all_column_attributes() {
    let model = sample_model();
    let text = model.describe_table("orders");

    assert!(text.contains("Table orders:"));
    assert!(text.contains("id: int unsigned NOT NULL (PRI)"));
    assert!(text.contains("user_id: int unsigned NOT NULL (MUL)"));
    assert!(text.contains("status: varchar(20) NULL default open"));
}

#[test]
fn test_describe_unknown_table() {
    let model = sample_model();
    assert_eq!(
        model.describe_table("missing"),
        "table missing does not exist"
    );
}

/// A table with no foreign keys renders no
/// "references" line; adding an edge makes it appear on the next call
/// without re-running refresh_tables.
#[test]
fn test_relations_appear_without_table_refresh() {
    let mut model = sample_model();

    let before = model.describe_table("users");
    assert!(!before.contains("references"));
    assert!(!before.contains("referenced by"));

    model.refresh_relations(vec![RelationEdge::new("orders", "user_id", "users", "id")]);

    let users = model.describe_table("users");
    assert!(users.contains("referenced by orders.user_id"));

    let orders = model.describe_table("orders");
    assert!(orders.contains("user_id references users.id"));
}

#[test]
fn test_relation_refresh_is_wholesale_replace() {
    let mut model = sample_model();
    model.refresh_relations(vec![RelationEdge::new("orders", "user_id", "users", "id")]);
    model.refresh_relations(vec![RelationEdge::new(
        "orders",
        "warehouse_id",
        "warehouses",
        "id",
    )]);

    let edges = model.relations_for(None);
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].referenced_table, "warehouses");
}

#[test]
fn test_relations_for_participation_both_directions() {
    let mut model = sample_model();
    model.refresh_relations(vec![
        RelationEdge::new("orders", "user_id", "users", "id"),
        RelationEdge::new("order_items", "order_id", "orders", "id"),
    ]);

    // orders participates once as source and once as target
    assert_eq!(model.relations_for(Some("orders")).len(), 2);
    assert_eq!(model.relations_for(Some("users")).len(), 1);
    assert_eq!(model.relations_for(Some("order_items")).len(), 1);
}

#[test]
fn test_duplicate_edges_tolerated() {
    let mut model = sample_model();
    let edge = RelationEdge::new("orders", "user_id", "users", "id");
    model.refresh_relations(vec![edge.clone(), edge]);
    assert_eq!(model.relations_for(Some("users")).len(), 2);
}

#[test]
fn test_summary_deterministic_order() {
    let model = sample_model();
    let first = model.summarize();
    let second = model.summarize();
    assert_eq!(first, second);

    // sorted by table name: orders before users
    let orders_pos = first.find("- orders:").expect("orders line");
    let users_pos = first.find("- users:").expect("users line");
    assert!(orders_pos < users_pos);
}

#[test]
fn test_snapshot_matches_model() {
    let mut model = sample_model();
    model.refresh_relations(vec![RelationEdge::new("orders", "user_id", "users", "id")]);

    let snapshot = model.snapshot();
    assert_eq!(snapshot.database, "shop");
    assert_eq!(snapshot.tables.len(), 2);
    assert_eq!(snapshot.relations.len(), 1);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["database"], "shop");
    assert_eq!(json["tables"].as_array().unwrap().len(), 2);
}

/// Result-shape invariant: a query outcome is exactly one of read, write,
/// or failure - the inactive variant's fields are absent, not defaulted.
#[test]
fn test_outcome_variants_are_exclusive() {
    let read = serde_json::to_value(QueryOutcome::read(
        Vec::new(),
        vec!["id".to_string()],
        false,
        1,
    ))
    .unwrap();
    assert_eq!(read["success"], true);
    assert!(read.get("affected_rows").is_none());

    let write = serde_json::to_value(QueryOutcome::write(5, 2)).unwrap();
    assert_eq!(write["affected_rows"], 5);
    assert!(write.get("rows").is_none());
    assert!(write.get("has_more").is_none());

    let failure = serde_json::to_value(QueryOutcome::failure("syntax error")).unwrap();
    assert_eq!(failure["success"], false);
    assert_eq!(failure["error"], "syntax error");
    assert!(failure.get("rows").is_none());
    assert!(failure.get("affected_rows").is_none());
}
