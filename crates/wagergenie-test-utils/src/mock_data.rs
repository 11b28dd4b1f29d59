// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory table store implementing `DataProvider`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use wagergenie_core::GenieError;
use wagergenie_core::traits::{DataProvider, PluginAdapter};
use wagergenie_core::types::{AdapterType, HealthStatus, SelectQuery};

#[derive(Debug, Default)]
struct State {
    tables: HashMap<String, Vec<Value>>,
    failing: bool,
    queries: Vec<(SelectQuery, Option<String>)>,
}

/// A data provider holding JSON rows per table.
///
/// Supports equality filters, ordering on one column, and limits, which is
/// all the views need.
#[derive(Clone, Default)]
pub struct MockDataProvider {
    state: Arc<Mutex<State>>,
}

impl MockDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a table with rows.
    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.lock()
            .tables
            .entry(table.to_string())
            .or_default()
            .extend(rows);
        self
    }

    /// Make every call fail as if the table did not exist.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Rows currently stored in `table`.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Every select seen so far with the bearer token it carried.
    pub fn queries(&self) -> Vec<(SelectQuery, Option<String>)> {
        self.lock().queries.clone()
    }

    fn missing(table: &str) -> GenieError {
        GenieError::Data {
            message: format!("relation \"public.{table}\" does not exist"),
            source: None,
        }
    }
}

fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Greater,
        (_, Value::Null) => Ordering::Less,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn matches_filter(row: &Value, column: &str, value: &str) -> bool {
    match row.get(column) {
        Some(Value::String(s)) => s == value,
        Some(other) => other.to_string() == value,
        None => false,
    }
}

#[async_trait]
impl PluginAdapter for MockDataProvider {
    fn name(&self) -> &str {
        "mock-data"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Data
    }

    async fn health_check(&self) -> Result<HealthStatus, GenieError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), GenieError> {
        Ok(())
    }
}

#[async_trait]
impl DataProvider for MockDataProvider {
    async fn select(
        &self,
        query: &SelectQuery,
        access_token: Option<&SecretString>,
    ) -> Result<Vec<Value>, GenieError> {
        let mut state = self.lock();
        state.queries.push((
            query.clone(),
            access_token.map(|t| t.expose_secret().to_string()),
        ));
        if state.failing {
            return Err(Self::missing(&query.table));
        }
        let Some(table) = state.tables.get(&query.table) else {
            return Err(Self::missing(&query.table));
        };

        let mut rows: Vec<Value> = table
            .iter()
            .filter(|row| {
                query
                    .filters
                    .iter()
                    .all(|(column, value)| matches_filter(row, column, value))
            })
            .cloned()
            .collect();

        if let Some((column, ascending)) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(
                    a.get(column).unwrap_or(&Value::Null),
                    b.get(column).unwrap_or(&Value::Null),
                );
                if *ascending { ord } else { ord.reverse() }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn insert(
        &self,
        table: &str,
        row: Value,
        _access_token: Option<&SecretString>,
    ) -> Result<(), GenieError> {
        let mut state = self.lock();
        if state.failing {
            return Err(Self::missing(table));
        }
        state.tables.entry(table.to_string()).or_default().push(row);
        Ok(())
    }
}
