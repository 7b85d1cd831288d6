//! Data type lookup for operands, used to pick operator variants.

use std::collections::HashMap;

use scenario_ast::builders::names::{DATABASE_ACCESS, FIELD_NAME, LIST, PAYLOAD, TABLE_NAME};
use scenario_ast::{AstNode, DataType};

/// Resolves the data type an operand evaluates to.
pub trait TypeResolver: Send + Sync {
    fn data_type(&self, node: &AstNode) -> DataType;
}

/// Knows literals and `List` nodes only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralTypes;

impl TypeResolver for LiteralTypes {
    fn data_type(&self, node: &AstNode) -> DataType {
        literal_type(self, node)
    }
}

fn literal_type(resolver: &dyn TypeResolver, node: &AstNode) -> DataType {
    if let Some(value) = &node.constant {
        return DataType::of_literal(value);
    }
    if !node.is_operator(LIST) {
        return DataType::Unknown;
    }
    let mut items = node.children.iter().map(|item| resolver.data_type(item));
    match items.next() {
        None => DataType::StringList,
        Some(first) if !first.is_list() && items.all(|t| t == first) => first.list_of(),
        Some(_) => DataType::Unknown,
    }
}

/// Field catalog for payload and database-access operands, falling back to
/// literal inference.
#[derive(Debug, Clone, Default)]
pub struct FieldTypes {
    payload: HashMap<String, DataType>,
    database: HashMap<(String, String), DataType>,
}

impl FieldTypes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_payload_field(mut self, field: impl Into<String>, data_type: DataType) -> Self {
        self.payload.insert(field.into(), data_type);
        self
    }

    pub fn with_database_field(
        mut self,
        table: impl Into<String>,
        field: impl Into<String>,
        data_type: DataType,
    ) -> Self {
        self.database.insert((table.into(), field.into()), data_type);
        self
    }
}

impl TypeResolver for FieldTypes {
    fn data_type(&self, node: &AstNode) -> DataType {
        if node.is_operator(PAYLOAD) {
            return node
                .children
                .first()
                .and_then(AstNode::constant_str)
                .and_then(|field| self.payload.get(field).copied())
                .unwrap_or(DataType::Unknown);
        }
        if node.is_operator(DATABASE_ACCESS) {
            let table = node.named(TABLE_NAME).and_then(AstNode::constant_str);
            let field = node.named(FIELD_NAME).and_then(AstNode::constant_str);
            return match (table, field) {
                (Some(table), Some(field)) => self
                    .database
                    .get(&(table.to_string(), field.to_string()))
                    .copied()
                    .unwrap_or(DataType::Unknown),
                _ => DataType::Unknown,
            };
        }
        literal_type(self, node)
    }
}
