//! Status projection for the presentation layer
//!
//! A small derived view of the session: connection/trade status, the
//! currently-displayed creature row, and a blink phase for the trading
//! animation. The protocol handler is the only writer of status and
//! display; the presentation timer only toggles the blink bit. Readers get
//! a consistent snapshot without ever blocking the clock-edge handler, and
//! nothing here feeds back into protocol decisions.

use core::sync::atomic::{AtomicBool, AtomicU16, Ordering};

/// Connection/trade status as shown to the user
///
/// Ordered by session progress; re-entering a session clamps anything past
/// `Ready` back down to `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LinkStatus {
    /// No link partner detected
    NotConnected = 0,
    /// Roles negotiated, partner in the link menu
    Connected = 1,
    /// Partner entered the trade centre
    Ready = 2,
    /// Partner is at the trade table
    Waiting = 3,
    /// A trade has been proposed, awaiting confirmation
    TradePending = 4,
    /// Trade accepted and committed
    Trading = 5,
}

impl LinkStatus {
    fn from_bits(bits: u8) -> Self {
        match bits {
            1 => Self::Connected,
            2 => Self::Ready,
            3 => Self::Waiting,
            4 => Self::TradePending,
            5 => Self::Trading,
            _ => Self::NotConnected,
        }
    }
}

/// One coherent status reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub status: LinkStatus,
    /// Display-table row of the creature currently offered
    pub displayed: u8,
    /// Animation phase, flipped by the presentation timer
    pub blink: bool,
}

/// Lock-free single-writer status cell
///
/// The clock-edge handler publishes, the presentation layer loads. Status
/// and display row share one atomic so a reader never sees a torn pair;
/// the blink bit is separate because it has a different (non-protocol)
/// writer.
pub struct StatusCell {
    state: AtomicU16,
    blink: AtomicBool,
}

impl StatusCell {
    pub const fn new() -> Self {
        Self {
            state: AtomicU16::new(0),
            blink: AtomicBool::new(false),
        }
    }

    /// Publish a new status/display pair (protocol side only)
    #[inline]
    pub fn publish(&self, status: LinkStatus, displayed: u8) {
        let bits = (status as u16) | ((displayed as u16) << 8);
        self.state.store(bits, Ordering::Release);
    }

    /// Flip the blink phase (presentation timer only)
    #[inline]
    pub fn toggle_blink(&self) {
        self.blink.fetch_xor(true, Ordering::Relaxed);
    }

    /// Read the latest published snapshot
    #[inline]
    pub fn load(&self) -> StatusSnapshot {
        let bits = self.state.load(Ordering::Acquire);
        StatusSnapshot {
            status: LinkStatus::from_bits(bits as u8),
            displayed: (bits >> 8) as u8,
            blink: self.blink.load(Ordering::Relaxed),
        }
    }
}
