// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider trait definitions.
//!
//! All providers extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod data;
pub mod responder;
pub mod session;

pub use adapter::PluginAdapter;
pub use data::DataProvider;
pub use responder::ChatResponder;
pub use session::SessionProvider;
