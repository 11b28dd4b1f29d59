// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for WagerGenie.
//!
//! One axum router serves the server-rendered pages, the form posts of the
//! auth flow, a small JSON API, and the per-page session event stream. Every
//! request passes the route guard; pages and API handlers resolve the
//! session through the [`SessionGate`] extractors.

pub mod auth;
pub mod gate;
pub mod guard;
pub mod handlers;
pub mod pages;
pub mod server;
pub mod session;
pub mod sse;
pub mod views;

pub use gate::{GateRejection, Invalidation, SessionGate};
pub use guard::{GuardDecision, SessionLookup, decide};
pub use server::{GatewaySettings, GatewayState, build_router, start_server};
pub use session::{ACCESS_COOKIE, ApiSession, PageSession, REFRESH_COOKIE};
