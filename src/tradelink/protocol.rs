//! Wire constants and phase enumerations for the Generation-I trade protocol
//!
//! Byte values here must stay bit-exact with the games: role markers, the
//! link menu item markers, trade-table control bytes, and the serial framing
//! bytes (preamble, no-data filler, patch-list part terminator).

/// Idle/blank byte, also the "roles agreed" acknowledgement
pub const BLANK: u8 = 0x00;
/// Peer claims the leader (clock-generating) role
pub const MASTER: u8 = 0x01;
/// Follower-role response to a leader claim
pub const SLAVE: u8 = 0x02;
/// Peer announces the link is established
pub const CONNECTED: u8 = 0x60;

/// Peer rejected the proposed trade at the confirmation screen
pub const TRADE_REJECT: u8 = 0x61;
/// Peer accepted the proposed trade
pub const TRADE_ACCEPT: u8 = 0x62;
/// Peer stood up from the trade table
pub const TABLE_LEAVE: u8 = 0x6F;
/// Top-bits mask shared by the slot-selection bytes (0x60..=0x65)
pub const SEL_NUM_MASK: u8 = 0x60;
/// Selection byte for our first party slot, the only one we ever offer
pub const SEL_FIRST: u8 = 0x60;

pub const ITEM_1_HIGHLIGHTED: u8 = 0xD0;
pub const ITEM_2_HIGHLIGHTED: u8 = 0xD1;
pub const ITEM_3_HIGHLIGHTED: u8 = 0xD2;
pub const ITEM_1_SELECTED: u8 = 0xD4;
pub const ITEM_2_SELECTED: u8 = 0xD5;
pub const ITEM_3_SELECTED: u8 = 0xD6;

/// Link-menu selection of the trade centre
pub const TRADE_CENTRE: u8 = ITEM_1_SELECTED;
/// Link-menu selection of the battle colosseum (unsupported, answered with break)
pub const COLOSSEUM: u8 = ITEM_2_SELECTED;
/// "Cancel / break the link" menu item, also our disconnect response
pub const BREAK_LINK: u8 = ITEM_3_SELECTED;

/// Serial framing preamble byte
pub const PREAMBLE: u8 = 0xFD;
/// Serial "no data" filler byte; unsendable as payload, restored via patches
pub const NO_DATA: u8 = 0xFE;
/// Terminator between the two halves of a patch list
pub const PATCH_PART_TERMINATOR: u8 = 0xFF;

/// Preamble bytes that advance the role/idle phase to the seed phase
pub const INIT_PREAMBLE_LEN: u16 = 10;
/// Random seed bytes passed through uninterpreted
pub const SEED_LEN: u16 = 10;
/// Trade-data preamble bytes following the seeds, also uninterpreted
pub const TRADE_PREAMBLE_LEN: u16 = 9;
/// Preamble bytes spanning end-of-data and start-of-patch markers
pub const PATCH_HEADER_PREAMBLE_LEN: u16 = 6;
/// Patch-data bytes before the encoded marker stream starts
pub const PATCH_HEADER_SKIP: u16 = 7;
/// Total bytes exchanged in the patch-data phase
pub const PATCH_DATA_LEN: u16 = 196;

/// Link-role dispatch state, one level above the trade-centre machine
///
/// Role negotiation and menu mirroring each consume whole bytes until the
/// peer commits to the trade centre; from then on every byte belongs to
/// [`TradeState`]. Leaving the trade table returns to the start of the
/// trade-centre machine, not to the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No link established, negotiating roles
    NotConnected,
    /// Roles agreed, mirroring the peer's link-menu choice
    Connected,
    /// Peer selected the trade centre, trade-centre machine active
    TradeCentre,
}

/// Trade-centre phase
///
/// Phases only ever advance in this order or reset to [`TradeState::Reset`];
/// the progress counter is zeroed on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeState {
    /// One-byte scrub of counters and flags before a (re)run
    Reset,
    /// Counting the initial preamble run at the trade table
    Init,
    /// Passing through RNG seed bytes and the trade-data preamble
    Random,
    /// Bulk trade-block exchange, byte for byte
    Data,
    /// Counting the end-of-data / start-of-patch preamble
    PatchHeader,
    /// Exchanging patch-list marker streams
    PatchData,
    /// Waiting for the peer to reach the selection screen
    Select,
    /// Peer is choosing a slot (or leaving the table)
    Pending,
    /// Waiting for the peer's accept/reject
    Confirm,
    /// Trade agreed, waiting for the closing blank to commit it
    Done,
}
