// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data provider trait for the external table store.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::GenieError;
use crate::traits::adapter::PluginAdapter;
use crate::types::SelectQuery;

/// Reads and writes rows in the external managed database.
///
/// Rows are returned untyped; callers decode the shape they expect and
/// decide how to treat rows that do not fit. `access_token` scopes the
/// request to the signed-in user when the store enforces row-level
/// security; `None` runs it with the public key only.
#[async_trait]
pub trait DataProvider: PluginAdapter {
    /// Run a bounded, ordered, filtered read.
    async fn select(
        &self,
        query: &SelectQuery,
        access_token: Option<&SecretString>,
    ) -> Result<Vec<serde_json::Value>, GenieError>;

    /// Insert one row. No conflict handling.
    async fn insert(
        &self,
        table: &str,
        row: serde_json::Value,
        access_token: Option<&SecretString>,
    ) -> Result<(), GenieError>;
}
