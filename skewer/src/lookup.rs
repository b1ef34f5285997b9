//! Point lookup of a record by one key column

use crate::database::{DatabaseError, Scope};
use crate::schema::RecordMatch;

/// Find the rows of `database`.`table` whose `key_column` equals `key_value`
///
/// Every match is fetched so the caller can tell a unique key from a
/// duplicated one. No match is a normal outcome: `row` is `None` and
/// `match_count` is zero.
///
/// # Arguments
///
/// * `database` - Database name, quoted as an identifier
/// * `table` - Table name, quoted as an identifier
/// * `key_column` - Column to match on, quoted as an identifier
/// * `key_value` - Value to match, always bound as a parameter
pub async fn find(
    scope: &mut Scope,
    database: &str,
    table: &str,
    key_column: &str,
    key_value: &str,
) -> Result<RecordMatch, DatabaseError> {
    let statement = scope.dialect().find(database, table, key_column, key_value);
    let result = scope.fetch_all(&statement).await?;

    let match_count = result.rows.len();
    let row = result.rows.into_iter().next();

    Ok(RecordMatch {
        columns: result.columns,
        row,
        match_count,
    })
}
