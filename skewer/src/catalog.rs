//! Catalog browsing: databases, tables and warehouse information

use crate::database::{DatabaseError, Scope};
use crate::schema::{ResultSet, Row, TableInfo, Value};

/// List database names, ascending
///
/// Runs the dialect's fixed catalog query and flattens its single column.
pub async fn list_databases(scope: &mut Scope) -> Result<Vec<String>, DatabaseError> {
    let statement = scope.dialect().list_databases();
    let result = scope.fetch_all(&statement).await?;

    let mut names: Vec<String> = result
        .rows
        .into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter(|value| !value.is_null())
        .map(|value| value.to_string())
        .collect();
    names.sort();
    Ok(names)
}

/// List the tables of `database`, ascending by name
pub async fn list_tables(scope: &mut Scope, database: &str) -> Result<Vec<TableInfo>, DatabaseError> {
    let statement = scope.dialect().list_tables(database);
    let result = scope.fetch_all(&statement).await?;

    result.rows.into_iter().map(table_info).collect()
}

/// Warehouse version and configuration rows
pub async fn system_info(scope: &mut Scope) -> Result<ResultSet, DatabaseError> {
    let statement = scope.dialect().system_info();
    scope.fetch_all(&statement).await
}

fn table_info(row: Row) -> Result<TableInfo, DatabaseError> {
    let mut values = row.into_iter();
    let name = match values.next() {
        Some(value) if !value.is_null() => value.to_string(),
        _ => {
            return Err(DatabaseError::Query(
                "table listing returned a row without a table name".to_string(),
            ))
        }
    };
    let kind = values.next().map(|value| value.to_string()).unwrap_or_default();
    let comment = values.next().and_then(|value| match value {
        Value::Null => None,
        value => Some(value.to_string()),
    });

    Ok(TableInfo { name, kind, comment })
}
