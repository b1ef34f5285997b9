//! Recording driver for unit tests
//!
//! Counts opens and closes, records every statement with its bound
//! parameters, and replays scripted results in order.

use crate::credentials::Credentials;
use crate::database::traits::{Connection, DatabaseError, Driver};
use crate::schema::{ResultSet, Row, Value};
use crate::sql::{Dialect, Statement};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct MockState {
    opened: usize,
    closed: usize,
    statements: Vec<Statement>,
    credential_keys: Vec<String>,
    responses: VecDeque<Result<ResultSet, DatabaseError>>,
    refuse: Option<String>,
    close_failure: Option<String>,
}

#[derive(Clone)]
pub(crate) struct MockDriver {
    dialect: Dialect,
    state: Arc<Mutex<MockState>>,
}

impl MockDriver {
    pub(crate) fn new() -> Self {
        Self::with_dialect(Dialect::Teradata)
    }

    pub(crate) fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Queue a result for the next statement
    pub(crate) fn respond(&self, columns: &[&str], rows: Vec<Row>) {
        let result = ResultSet::new(columns.iter().map(|c| c.to_string()).collect(), rows);
        self.state.lock().unwrap().responses.push_back(Ok(result));
    }

    /// Make the next statement fail with a query error
    pub(crate) fn fail_next(&self, message: &str) {
        self.state
            .lock()
            .unwrap()
            .responses
            .push_back(Err(DatabaseError::Query(message.to_string())));
    }

    /// Make every connection attempt fail
    pub(crate) fn refuse_connections(&self, message: &str) {
        self.state.lock().unwrap().refuse = Some(message.to_string());
    }

    /// Make every close report a connection error
    pub(crate) fn fail_close(&self, message: &str) {
        self.state.lock().unwrap().close_failure = Some(message.to_string());
    }

    pub(crate) fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub(crate) fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    pub(crate) fn statements(&self) -> Vec<Statement> {
        self.state.lock().unwrap().statements.clone()
    }

    pub(crate) fn credential_keys(&self) -> Vec<String> {
        self.state.lock().unwrap().credential_keys.clone()
    }
}

#[async_trait]
impl Driver for MockDriver {
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn connect(&self, credentials: &Credentials) -> Result<Box<dyn Connection>, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        if let Some(message) = &state.refuse {
            return Err(DatabaseError::Connection(message.clone()));
        }
        state.opened += 1;
        state.credential_keys = credentials.keys().map(str::to_string).collect();
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    state: Arc<Mutex<MockState>>,
}

#[async_trait]
impl Connection for MockConnection {
    async fn fetch_all(&mut self, statement: &Statement) -> Result<ResultSet, DatabaseError> {
        let mut state = self.state.lock().unwrap();
        state.statements.push(statement.clone());
        state.responses.pop_front().unwrap_or_else(|| Ok(ResultSet::default()))
    }

    async fn close(self: Box<Self>) -> Result<(), DatabaseError> {
        let mut state = self.state.lock().unwrap();
        state.closed += 1;
        match &state.close_failure {
            Some(message) => Err(DatabaseError::Connection(message.clone())),
            None => Ok(()),
        }
    }
}

pub(crate) fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}
