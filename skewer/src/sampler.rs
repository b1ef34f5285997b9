//! Random table samples
//!
//! A sample is drawn by the warehouse's own sampling operator. Every call is
//! an independent draw: there is no seed, no stable order and no offset, so
//! samples cannot be paged through.

use crate::database::{DatabaseError, Scope};
use crate::schema::ResultSet;

/// Rows drawn when the caller does not ask for a specific sample size
pub const DEFAULT_SAMPLE_SIZE: u32 = 100;

/// Draw up to `limit` random rows from `database`.`table`
///
/// # Arguments
///
/// * `database` - Database name, quoted as an identifier
/// * `table` - Table name, quoted as an identifier
/// * `limit` - Maximum number of rows to return
///
/// # Returns
///
/// The driver-reported columns in positional order and at most `limit` rows
pub async fn sample(
    scope: &mut Scope,
    database: &str,
    table: &str,
    limit: u32,
) -> Result<ResultSet, DatabaseError> {
    let statement = scope.dialect().sample(database, table, limit);
    let mut result = scope.fetch_all(&statement).await?;
    result.rows.truncate(limit as usize);
    Ok(result)
}
