// SPDX-FileCopyrightText: 2026 WagerGenie Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat for WagerGenie: transcripts, the placeholder responder, and the
//! view registry that ties in-flight replies to the page that asked.

pub mod registry;
pub mod responder;
pub mod transcript;

use strum::{Display, EnumString};

pub use registry::{View, ViewGuard, ViewRegistry};
pub use responder::CannedResponder;
pub use transcript::{ChatTranscript, SubmitOutcome};

/// Which page a chat view belongs to. Each surface has its own canned reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ChatSurface {
    /// `/app/chat`.
    App,
    /// The chat tab of `/genie`.
    Genie,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_round_trips_through_strings() {
        assert_eq!(ChatSurface::App.to_string(), "app");
        assert_eq!("genie".parse::<ChatSurface>().unwrap(), ChatSurface::Genie);
    }
}
