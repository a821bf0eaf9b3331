//! Schema and relationship models.
//!
//! Descriptors mirror what MySQL's `DESCRIBE` and
//! `INFORMATION_SCHEMA.KEY_COLUMN_USAGE` report; the [`SchemaModel`] is the
//! in-memory, queryable representation the schema tools read from.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One column as reported by `DESCRIBE`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ColumnDescriptor {
    pub name: String,
    /// Declared type string, e.g. `varchar(100)` or `int unsigned`
    pub data_type: String,
    pub nullable: bool,
    /// Key role string: "PRI", "UNI", "MUL", or empty
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Extra attributes, e.g. `auto_increment`
    pub extra: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            key: String::new(),
            default: None,
            extra: String::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = extra.into();
        self
    }
}

/// One table with its columns in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TableDescriptor {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, column: ColumnDescriptor) -> Self {
        self.columns.push(column);
        self
    }
}

/// A directed foreign-key edge: (table, column) -> (referenced table, column).
///
/// Edges are stored exactly as the database reports them - duplicates
/// included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RelationEdge {
    pub table_name: String,
    pub column_name: String,
    pub referenced_table: String,
    pub referenced_column: String,
}

impl RelationEdge {
    pub fn new(
        table_name: impl Into<String>,
        column_name: impl Into<String>,
        referenced_table: impl Into<String>,
        referenced_column: impl Into<String>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            column_name: column_name.into(),
            referenced_table: referenced_table.into(),
            referenced_column: referenced_column.into(),
        }
    }

    /// True when the table participates in this edge as source or target.
    pub fn involves(&self, table: &str) -> bool {
        self.table_name == table || self.referenced_table == table
    }
}

/// Point-in-time view of the introspected schema.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct SchemaSnapshot {
    pub database: String,
    pub tables: Vec<TableDescriptor>,
    pub relations: Vec<RelationEdge>,
}

/// In-memory schema representation, replaced wholesale on each refresh.
#[derive(Debug, Clone)]
pub struct SchemaModel {
    database: String,
    tables: BTreeMap<String, TableDescriptor>,
    relations: Vec<RelationEdge>,
}

impl SchemaModel {
    pub fn new(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            tables: BTreeMap::new(),
            relations: Vec::new(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    /// Replace the table set with a fresh introspection result. Tables
    /// absent from the input are dropped (full replace; the relation list
    /// already worked this way).
    pub fn refresh_tables(&mut self, tables: Vec<TableDescriptor>) {
        self.tables = tables
            .into_iter()
            .map(|table| (table.name.clone(), table))
            .collect();
    }

    /// Replace the relation list wholesale.
    pub fn refresh_relations(&mut self, relations: Vec<RelationEdge>) {
        self.relations = relations;
    }

    /// Edges where the table participates as source or target, or all edges
    /// when no table is given.
    pub fn relations_for(&self, table: Option<&str>) -> Vec<&RelationEdge> {
        match table {
            Some(name) => self
                .relations
                .iter()
                .filter(|edge| edge.involves(name))
                .collect(),
            None => self.relations.iter().collect(),
        }
    }

    /// Render a human-readable description of one table: its columns, then
    /// outgoing and incoming foreign keys.
    pub fn describe_table(&self, name: &str) -> String {
        let Some(table) = self.tables.get(name) else {
            return format!("table {name} does not exist");
        };

        let mut out = format!("Table {}:\n  columns:\n", table.name);
        for col in &table.columns {
            let nullable = if col.nullable { "NULL" } else { "NOT NULL" };
            out.push_str(&format!("    - {}: {} {}", col.name, col.data_type, nullable));
            if !col.key.is_empty() {
                out.push_str(&format!(" ({})", col.key));
            }
            if let Some(default) = &col.default {
                out.push_str(&format!(" default {default}"));
            }
            if !col.extra.is_empty() {
                out.push_str(&format!(" {}", col.extra));
            }
            out.push('\n');
        }

        let relations = self.relations_for(Some(name));
        if !relations.is_empty() {
            out.push_str("  relations:\n");
            for edge in relations {
                if edge.table_name == name {
                    out.push_str(&format!(
                        "    - {} references {}.{}\n",
                        edge.column_name, edge.referenced_table, edge.referenced_column
                    ));
                } else {
                    out.push_str(&format!(
                        "    - referenced by {}.{}\n",
                        edge.table_name, edge.column_name
                    ));
                }
            }
        }

        out
    }

    /// Render a database overview: per-table column counts (sorted by table
    /// name) and the total relation count.
    pub fn summarize(&self) -> String {
        let mut out = format!(
            "Database {}: {} tables, {} relations\n",
            self.database,
            self.tables.len(),
            self.relations.len()
        );
        for (name, table) in &self.tables {
            out.push_str(&format!("  - {}: {} columns\n", name, table.columns.len()));
        }
        out
    }

    pub fn snapshot(&self) -> SchemaSnapshot {
        SchemaSnapshot {
            database: self.database.clone(),
            tables: self.tables.values().cloned().collect(),
            relations: self.relations.clone(),
        }
    }
}
