//! Table definition types
//!
//! A `TableDef` is an ordered list of typed columns plus a table name, and
//! knows how to render itself as idempotent DDL.

/// Semantic column types supported by the warehouse schemas.
///
/// Strings are unbounded text; floating values are double precision. `Int`
/// and `BigInt` are distinguished only where the source id-space needs
/// 64-bit range (session ids, registration timestamps, songplay ids, and
/// the raw epoch-seconds column).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    Int,
    BigInt,
    Double,
    Timestamp,
}

impl ColumnType {
    /// The SQL type name rendered into DDL.
    pub fn sql(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Int => "int",
            Self::BigInt => "bigint",
            Self::Double => "double precision",
            Self::Timestamp => "timestamp",
        }
    }
}

/// A single column: name, semantic type, and nullability as declared.
#[derive(Clone, Copy, Debug)]
pub struct Column {
    pub name: &'static str,
    pub ty: ColumnType,
    pub nullable: bool,
}

impl Column {
    /// Declare a nullable column (the default for every warehouse table —
    /// uniqueness and null-filtering live in the transforms, not in stored
    /// constraints).
    pub const fn new(name: &'static str, ty: ColumnType) -> Self {
        Self {
            name,
            ty,
            nullable: true,
        }
    }
}

/// An ordered table definition.
///
/// # Example
/// ```
/// use starhouse::schema::{Column, ColumnType, TableDef};
///
/// let table = TableDef::new("users", vec![
///     Column::new("user_id", ColumnType::Int),
///     Column::new("level", ColumnType::Text),
/// ]);
///
/// assert!(table.create_sql().starts_with("CREATE TABLE IF NOT EXISTS users"));
/// assert_eq!(table.drop_sql(), "DROP TABLE IF EXISTS users;");
/// ```
#[derive(Clone, Debug)]
pub struct TableDef {
    name: &'static str,
    columns: Vec<Column>,
}

impl TableDef {
    pub fn new(name: &'static str, columns: Vec<Column>) -> Self {
        Self { name, columns }
    }

    /// The table name as it appears in the warehouse.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The columns in declaration order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Render the idempotent create statement.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so re-running schema creation
    /// without an intervening drop neither fails nor duplicates columns.
    pub fn create_sql(&self) -> String {
        let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (", self.name);
        for (i, column) in self.columns.iter().enumerate() {
            let separator = if i == 0 { "" } else { "," };
            let constraint = if column.nullable { "" } else { " NOT NULL" };
            sql.push_str(&format!(
                "{}\n    {} {}{}",
                separator,
                column.name,
                column.ty.sql(),
                constraint
            ));
        }
        sql.push_str("\n);");
        sql
    }

    /// Render the idempotent drop statement.
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TableDef {
        TableDef::new(
            "sample",
            vec![
                Column::new("id", ColumnType::BigInt),
                Column::new("name", ColumnType::Text),
                Column::new("score", ColumnType::Double),
            ],
        )
    }

    #[test]
    fn test_create_sql_is_idempotent_ddl() {
        let sql = sample().create_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS sample ("));
        assert!(sql.ends_with(");"));
    }

    #[test]
    fn test_create_sql_preserves_column_order() {
        let sql = sample().create_sql();
        let id = sql.find("id bigint").unwrap();
        let name = sql.find("name text").unwrap();
        let score = sql.find("score double precision").unwrap();
        assert!(id < name && name < score);
    }

    #[test]
    fn test_drop_sql_is_idempotent_ddl() {
        assert_eq!(sample().drop_sql(), "DROP TABLE IF EXISTS sample;");
    }

    #[test]
    fn test_column_types_render() {
        assert_eq!(ColumnType::Text.sql(), "text");
        assert_eq!(ColumnType::Int.sql(), "int");
        assert_eq!(ColumnType::BigInt.sql(), "bigint");
        assert_eq!(ColumnType::Double.sql(), "double precision");
        assert_eq!(ColumnType::Timestamp.sql(), "timestamp");
    }
}
