//! Link-cable bit shifter
//!
//! The peer always drives the clock; this side is the follower. On every
//! rising edge one input bit is latched, on every falling edge the next
//! output bit must already be presented. Bytes travel MSB-first. This
//! module owns no protocol knowledge: completed bytes are handed to a
//! [`LinkFollower`] which returns the next response byte.
//!
//! Clock gaps between bytes run from ~430µs for burst data up to 15ms while
//! the peer sits in a menu; the clock period itself is ~122µs. A gap longer
//! than [`DESYNC_TIMEOUT_US`] therefore only ever happens at a byte
//! boundary, and is used to force one: both accumulators and the bit
//! counter reset before the edge is processed.

/// Gap between clock-high edges that forces a byte-boundary reset
pub const DESYNC_TIMEOUT_US: u64 = 500;

/// One electrical transition of the peer's clock line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEdge {
    Rising,
    Falling,
}

/// Byte-level protocol sink driven by the bit shifter
///
/// Implemented by the session state machine; tests substitute fakes.
pub trait LinkFollower {
    /// Consume one completed peer byte, return the next response byte
    fn transfer_byte(&mut self, input: u8) -> u8;
}

/// In-flight shift registers for one link port
pub struct LinkPort {
    /// Input accumulator, newest bit in the low position
    in_shift: u8,
    /// Output accumulator, next wire bit in the high position
    out_shift: u8,
    /// Bits accumulated toward the current byte (0-7)
    bit_count: u8,
    /// Timestamp of the previous clock-high edge
    last_edge_us: u64,
    desync_timeout_us: u64,
}

impl LinkPort {
    /// Create a port with the canonical desync timeout
    pub const fn new() -> Self {
        Self::with_timeout(DESYNC_TIMEOUT_US)
    }

    /// Create a port with a custom desync timeout
    pub const fn with_timeout(desync_timeout_us: u64) -> Self {
        Self {
            in_shift: 0,
            out_shift: 0,
            bit_count: 0,
            last_edge_us: 0,
            desync_timeout_us,
        }
    }

    /// Clear both accumulators and the bit counter
    pub fn reset(&mut self) {
        self.in_shift = 0;
        self.out_shift = 0;
        self.bit_count = 0;
    }

    /// Process one clock edge.
    ///
    /// `input_bit` is the sampled SI level, `now_us` a monotonic timestamp.
    /// Returns `Some(level)` on falling edges: the SO level the host must
    /// drive before the next rising edge. Rising edges return `None`.
    ///
    /// This runs in the host's edge interrupt and performs no allocation or
    /// unbounded work beyond the follower's byte handler.
    pub fn on_clock_edge(
        &mut self,
        edge: ClockEdge,
        input_bit: bool,
        now_us: u64,
        follower: &mut impl LinkFollower,
    ) -> Option<bool> {
        match edge {
            ClockEdge::Rising => {
                if now_us.wrapping_sub(self.last_edge_us) > self.desync_timeout_us {
                    self.reset();
                }
                self.last_edge_us = now_us;

                self.in_shift = (self.in_shift << 1) | u8::from(input_bit);
                self.bit_count += 1;

                if self.bit_count > 7 {
                    self.bit_count = 0;
                    self.out_shift = follower.transfer_byte(self.in_shift);
                    self.in_shift = 0;
                }
                None
            }
            ClockEdge::Falling => {
                let level = self.out_shift & 0x80 != 0;
                self.out_shift <<= 1;
                Some(level)
            }
        }
    }
}
