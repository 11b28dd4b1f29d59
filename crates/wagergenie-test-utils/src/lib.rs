// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test doubles for WagerGenie.
//!
//! Provides in-memory session and data providers so gateway and chat tests
//! run without the hosted auth service.

pub mod mock_data;
pub mod mock_session;

pub use mock_data::MockDataProvider;
pub use mock_session::MockSessionProvider;
