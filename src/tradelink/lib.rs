//! # Trade-Link Core - Generation-I Link-Cable Trade Engine
//!
//! A `no_std` compatible protocol engine that impersonates the follower side
//! of a Generation-I Pokémon link-cable trade. The peer drives the clock;
//! this side latches one input bit and presents one output bit per edge,
//! exchanging a byte-exact 415-byte trade block, a sparse patch list, and
//! the selection/confirmation handshake.
//!
//! All platform-specific functionality is abstracted through traits or plain
//! values supplied by the host:
//!
//! - [`LinkFollower`] - byte-level protocol sink driven by the bit shifter
//! - [`SpeciesTable`] - species id to display-row mapping
//! - Clock edges and timestamps come from the host's GPIO interrupt
//!
//! ## Usage
//!
//! ```ignore
//! use tradelink::{ClockEdge, LinkPort, TradeBlock, TradeSession};
//!
//! let mut session = TradeSession::new(block, Box::new(&SPECIES[..]))?;
//! let mut port = LinkPort::new();
//!
//! // In the clock-edge interrupt handler:
//! if let Some(level) = port.on_clock_edge(edge, si_level, now_us, &mut session) {
//!     // Drive the SO pin to `level` before the next edge.
//! }
//!
//! // In a non-time-critical task:
//! session.service();
//! let snapshot = session.status();
//! ```

#![cfg_attr(not(test), no_std)]
#![allow(clippy::new_without_default)]

extern crate alloc;

pub mod block;
pub mod link;
pub mod patch;
pub mod protocol;
pub mod session;
pub mod status;

// Re-exports for convenience
pub use block::{BLOCK_SIZE, Name, PokemonRecord, TradeBlock};
pub use link::{ClockEdge, DESYNC_TIMEOUT_US, LinkFollower, LinkPort};
pub use patch::PatchList;
pub use protocol::{LinkState, TradeState};
pub use session::{SpeciesTable, TradeSession};
pub use status::{LinkStatus, StatusCell, StatusSnapshot};

use thiserror::Error;

/// Error type for session setup
///
/// All of these abort session entry; once a session is running, recovery is
/// internal to the state machine and never surfaces as an error value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Offered party is empty or claims more than six members
    #[error("party count {0} outside 1..=6")]
    InvalidPartyCount(u8),
    /// Lead species id has no row in the display table
    #[error("species {0:#04x} not present in display table")]
    UnknownSpecies(u8),
}
