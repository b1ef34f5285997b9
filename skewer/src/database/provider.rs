//! Request-scoped connections
//!
//! A [`Scope`] is one request or one CLI run. It opens a connection lazily on
//! first use, reuses it for every statement issued inside the scope, and
//! closes it exactly once. Scopes never share connections.

use crate::credentials::Credentials;
use crate::database::traits::{Connection, DatabaseError, Driver};
use crate::schema::ResultSet;
use crate::sql::{Dialect, Statement};
use futures::future::BoxFuture;
use std::sync::Arc;

/// Hands out request scopes for one warehouse
///
/// Cloning is cheap; clones share the driver and credentials, never connections.
#[derive(Clone)]
pub struct ConnectionProvider {
    driver: Arc<dyn Driver>,
    credentials: Arc<Credentials>,
}

impl ConnectionProvider {
    /// Create a provider
    ///
    /// # Arguments
    ///
    /// * `driver` - Driver used to open connections
    /// * `credentials` - Credentials loaded at process start, possibly empty
    pub fn new<D: Driver>(driver: D, credentials: Credentials) -> Self {
        Self {
            driver: Arc::new(driver),
            credentials: Arc::new(credentials),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.driver.dialect()
    }

    /// Whether any credentials were supplied
    pub fn has_credentials(&self) -> bool {
        !self.credentials.is_empty()
    }

    /// Start a new scope; no connection is opened yet
    pub fn scope(&self) -> Scope {
        Scope {
            driver: Arc::clone(&self.driver),
            credentials: Arc::clone(&self.credentials),
            connection: None,
        }
    }

    /// Run `work` inside a fresh scope and release the scope afterwards
    ///
    /// The scope is released whether `work` succeeds or fails. If `work`
    /// succeeded but closing failed, the close error is returned; a failed
    /// `work` keeps its own error.
    ///
    /// ```rust,ignore
    /// use futures::FutureExt;
    ///
    /// let databases = provider
    ///     .within(|scope| skewer::catalog::list_databases(scope).boxed())
    ///     .await?;
    /// ```
    pub async fn within<T, F>(&self, work: F) -> Result<T, DatabaseError>
    where
        F: for<'s> FnOnce(&'s mut Scope) -> BoxFuture<'s, Result<T, DatabaseError>>,
    {
        let mut scope = self.scope();
        let result = work(&mut scope).await;
        let released = scope.release().await;
        match result {
            Ok(value) => released.map(|()| value),
            Err(error) => Err(error),
        }
    }
}

/// One request's connection, opened on first use
pub struct Scope {
    driver: Arc<dyn Driver>,
    credentials: Arc<Credentials>,
    connection: Option<Box<dyn Connection>>,
}

impl Scope {
    pub fn dialect(&self) -> Dialect {
        self.driver.dialect()
    }

    /// Whether a connection is currently open
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// The scope's connection, opening it on first call
    ///
    /// # Returns
    ///
    /// [`DatabaseError::Configuration`] when the credentials are empty, or the
    /// driver's [`DatabaseError::Connection`] when opening fails
    pub async fn acquire(&mut self) -> Result<&mut (dyn Connection + 'static), DatabaseError> {
        if self.connection.is_none() {
            if self.credentials.is_empty() {
                return Err(DatabaseError::Configuration(
                    "warehouse configuration not found".to_string(),
                ));
            }
            let connection = self.driver.connect(&self.credentials).await?;
            self.connection = Some(connection);
        }

        self.connection
            .as_deref_mut()
            .ok_or_else(|| DatabaseError::Connection("connection unavailable".to_string()))
    }

    /// Run one statement on the scope's connection
    pub async fn fetch_all(&mut self, statement: &Statement) -> Result<ResultSet, DatabaseError> {
        let connection = self.acquire().await?;
        connection.fetch_all(statement).await
    }

    /// Close the connection if one was opened
    ///
    /// Safe to call any number of times; only the first call after an open
    /// closes anything.
    pub async fn release(&mut self) -> Result<(), DatabaseError> {
        match self.connection.take() {
            Some(connection) => connection.close().await,
            None => Ok(()),
        }
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        // Reached only when release() was skipped (panic or cancelled request).
        if let Some(connection) = self.connection.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = connection.close().await;
                });
            }
        }
    }
}
