//! Trade session context and state machine
//!
//! [`TradeSession`] owns the outgoing trade block, the incoming scratch
//! block, the patch list, and every phase-local counter. One completed
//! input byte produces exactly one output byte through
//! [`LinkFollower::transfer_byte`], mutating the session as a side effect.
//!
//! The byte handler runs in the clock-edge interrupt and must finish well
//! inside a clock half-period, so nothing here allocates or walks the trade
//! block: the one expensive operation (rebuilding the patch list after a
//! completed trade) is flagged and deferred to [`TradeSession::service`],
//! which the host calls from a non-time-critical task.

use alloc::boxed::Box;

use log::{debug, trace};

use crate::SessionError;
use crate::block::{BLOCK_SIZE, PARTY_SIZE, TradeBlock};
use crate::link::LinkFollower;
use crate::patch::PatchList;
use crate::protocol::*;
use crate::status::{LinkStatus, StatusCell, StatusSnapshot};

/// Maps a species id to its row in the host's display table
///
/// The presentation layer keeps a table of known species; the session only
/// needs the row number of whatever creature sits in its first party slot.
pub trait SpeciesTable: Send {
    fn display_index(&self, species: u8) -> Option<u8>;
}

impl SpeciesTable for &'static [u8] {
    fn display_index(&self, species: u8) -> Option<u8> {
        self.iter().position(|&s| s == species).map(|i| i as u8)
    }
}

/// One link-cable trade session (follower side)
pub struct TradeSession {
    link_state: LinkState,
    trade_state: TradeState,
    /// Phase-local progress counter, zeroed on every phase transition
    counter: u16,
    /// Patch-list addressing half for the incoming marker stream
    patch_part_two: bool,
    /// Peer's raw slot-selection byte; 0 while nothing is selected
    selected: u8,
    /// The party we offer; slot 0 is overwritten when a trade completes
    local: TradeBlock,
    /// Scratch block receiving the peer's bulk data
    incoming: Box<TradeBlock>,
    patch_list: PatchList,
    /// Set when `local` changed; drained by [`TradeSession::service`]
    patch_list_stale: bool,
    table: Box<dyn SpeciesTable>,
    /// Writer-side copy of the published status (never read back from the cell)
    shown_status: LinkStatus,
    displayed: u8,
    status: StatusCell,
}

impl TradeSession {
    /// Set up a session around an offered party.
    ///
    /// Validates the party and builds the initial patch list; failure here
    /// aborts session entry rather than starting with partial state.
    pub fn new(local: TradeBlock, table: Box<dyn SpeciesTable>) -> Result<Self, SessionError> {
        if local.party_count == 0 || local.party_count as usize > PARTY_SIZE {
            return Err(SessionError::InvalidPartyCount(local.party_count));
        }
        let lead = local.party_species[0];
        let displayed = table
            .display_index(lead)
            .ok_or(SessionError::UnknownSpecies(lead))?;

        let patch_list = PatchList::build(&local);
        let session = Self {
            link_state: LinkState::NotConnected,
            trade_state: TradeState::Reset,
            counter: 0,
            patch_part_two: false,
            selected: 0,
            local,
            incoming: Box::new(TradeBlock::zeroed()),
            patch_list,
            patch_list_stale: false,
            table,
            shown_status: LinkStatus::NotConnected,
            displayed,
            status: StatusCell::new(),
        };
        session.status.publish(LinkStatus::NotConnected, displayed);
        Ok(session)
    }

    /// (Re-)enter the trade screen.
    ///
    /// The link itself survives leaving the screen: a connected peer stays
    /// connected, but any in-flight trade is abandoned, so status past
    /// `Ready` clamps back to `Ready`. The patch list is rebuilt here in
    /// case the offered party changed while the session was parked.
    pub fn begin(&mut self) {
        if self.shown_status > LinkStatus::Ready {
            self.shown_status = LinkStatus::Ready;
        }
        self.trade_state = TradeState::Reset;
        self.counter = 0;
        self.patch_part_two = false;
        self.selected = 0;
        self.displayed = self
            .table
            .display_index(self.local.party_species[0])
            .unwrap_or(0);
        self.patch_list = PatchList::build(&self.local);
        self.patch_list_stale = false;
        self.status.publish(self.shown_status, self.displayed);
    }

    /// Tear the session down.
    ///
    /// The host must detach the clock-edge interrupt before calling this;
    /// no byte may be processed against the released patch list.
    pub fn end(&mut self) {
        self.patch_list = PatchList::empty();
        self.patch_list_stale = false;
    }

    /// Drain deferred work. Call from a non-time-critical task, never from
    /// the clock-edge path.
    pub fn service(&mut self) {
        if self.patch_list_stale {
            self.patch_list = PatchList::build(&self.local);
            self.patch_list_stale = false;
            debug!("patch list rebuilt ({} markers)", self.patch_list.len());
        }
    }

    /// Latest published status snapshot
    pub fn status(&self) -> StatusSnapshot {
        self.status.load()
    }

    /// The status cell the presentation layer polls (and blinks)
    pub fn status_cell(&self) -> &StatusCell {
        &self.status
    }

    /// The party currently offered
    pub fn trade_block(&self) -> &TradeBlock {
        &self.local
    }

    /// Mutate the offered party; marks the patch list for rebuild
    pub fn trade_block_mut(&mut self) -> &mut TradeBlock {
        self.patch_list_stale = true;
        &mut self.local
    }

    pub fn link_state(&self) -> LinkState {
        self.link_state
    }

    pub fn trade_state(&self) -> TradeState {
        self.trade_state
    }

    fn set_status(&mut self, status: LinkStatus) {
        self.shown_status = status;
        self.status.publish(status, self.displayed);
    }

    fn set_trade_state(&mut self, next: TradeState) {
        trace!("trade phase {:?} -> {:?}", self.trade_state, next);
        self.trade_state = next;
        self.counter = 0;
    }

    /// Role negotiation: answer leader claims with the follower marker and
    /// anything unexpected with a link break.
    fn connect_response(&mut self, input: u8) -> u8 {
        match input {
            CONNECTED => {
                debug!("link partner connected");
                self.link_state = LinkState::Connected;
                self.set_status(LinkStatus::Connected);
                CONNECTED
            }
            MASTER => SLAVE,
            BLANK => BLANK,
            _ => {
                self.set_status(LinkStatus::NotConnected);
                BREAK_LINK
            }
        }
    }

    /// Menu mirroring: echo the peer's highlight/select traffic, drop the
    /// link for anything but the trade centre.
    fn menu_response(&mut self, input: u8) -> u8 {
        match input {
            CONNECTED => CONNECTED,
            TRADE_CENTRE => {
                debug!("peer selected the trade centre");
                self.link_state = LinkState::TradeCentre;
                self.set_trade_state(TradeState::Reset);
                self.set_status(LinkStatus::Ready);
                input
            }
            COLOSSEUM | BREAK_LINK | MASTER => {
                debug!("link dropped from menu");
                self.link_state = LinkState::NotConnected;
                self.set_status(LinkStatus::NotConnected);
                BREAK_LINK
            }
            _ => input,
        }
    }

    /// The trade-centre machine proper. Mirrors the input byte unless a
    /// phase says otherwise.
    fn trade_centre_response(&mut self, input: u8) -> u8 {
        let mut send = input;

        match self.trade_state {
            TradeState::Reset => {
                self.patch_part_two = false;
                self.selected = 0;
                self.set_trade_state(TradeState::Init);
            }

            TradeState::Init => {
                if input == PREAMBLE {
                    self.counter += 1;
                    self.set_status(LinkStatus::Waiting);
                } else if input & SEL_NUM_MASK == SEL_NUM_MASK {
                    // A waiting peer re-sending a trade request from an
                    // earlier run; ask it to leave the table so both sides
                    // re-sync from scratch.
                    send = TABLE_LEAVE;
                }
                if self.counter == INIT_PREAMBLE_LEN {
                    self.set_trade_state(TradeState::Random);
                }
            }

            // Seed bytes synchronize the peers' RNGs; a trade never consumes
            // them, so they are counted through uninterpreted.
            TradeState::Random => {
                if input == TABLE_LEAVE {
                    send = TABLE_LEAVE;
                    self.set_trade_state(TradeState::Reset);
                    self.set_status(LinkStatus::Ready);
                } else {
                    self.counter += 1;
                    if self.counter == SEED_LEN + TRADE_PREAMBLE_LEN {
                        self.set_trade_state(TradeState::Data);
                    }
                }
            }

            TradeState::Data => {
                let index = self.counter as usize;
                self.incoming.as_bytes_mut()[index] = input;
                send = self.local.as_bytes()[index];
                self.counter += 1;
                if self.counter as usize == BLOCK_SIZE {
                    self.set_trade_state(TradeState::PatchHeader);
                }
            }

            TradeState::PatchHeader => {
                if input == PREAMBLE {
                    self.counter += 1;
                }
                if self.counter == PATCH_HEADER_PREAMBLE_LEN {
                    // The byte completing the header is also the first
                    // patch-data byte: re-dispatch it, no new clock byte.
                    self.set_trade_state(TradeState::PatchData);
                    return self.trade_centre_response(input);
                }
            }

            TradeState::PatchData => {
                self.counter += 1;
                if self.counter > PATCH_HEADER_SKIP {
                    send = self
                        .patch_list
                        .get((self.counter - PATCH_HEADER_SKIP - 1) as usize);
                }
                PatchList::apply_marker(&mut self.incoming, &mut self.patch_part_two, input);
                if self.counter == PATCH_DATA_LEN {
                    self.set_trade_state(TradeState::Select);
                }
            }

            TradeState::Select => {
                self.selected = 0;
                if input == BLANK {
                    self.set_trade_state(TradeState::Pending);
                    return self.trade_centre_response(input);
                }
            }

            TradeState::Pending => {
                if input == TABLE_LEAVE {
                    send = TABLE_LEAVE;
                    self.set_trade_state(TradeState::Reset);
                    self.set_status(LinkStatus::Ready);
                } else if input & SEL_NUM_MASK == SEL_NUM_MASK {
                    self.selected = input;
                    // We always offer our first slot.
                    send = SEL_FIRST;
                    self.set_status(LinkStatus::TradePending);
                } else if input == BLANK && self.selected != 0 {
                    send = BLANK;
                    self.selected &= 0x0F;
                    self.set_trade_state(TradeState::Confirm);
                }
            }

            TradeState::Confirm => {
                if input == TRADE_REJECT {
                    self.set_trade_state(TradeState::Select);
                    self.set_status(LinkStatus::Waiting);
                } else if input == TRADE_ACCEPT {
                    self.set_trade_state(TradeState::Done);
                }
            }

            TradeState::Done => {
                if input == BLANK {
                    self.commit_trade();
                    self.set_trade_state(TradeState::Reset);
                    self.set_status(LinkStatus::Trading);
                }
            }
        }

        send
    }

    /// Move the peer's selected creature into our first slot and queue the
    /// patch-list rebuild for the next `service` call.
    fn commit_trade(&mut self) {
        let slot = usize::from(self.selected & 0x0F);
        if slot >= PARTY_SIZE {
            return;
        }

        self.local.party_species[0] = self.incoming.party_species[slot];
        self.local.party[0] = self.incoming.party[slot];
        self.local.nicknames[0] = self.incoming.nicknames[slot];
        self.local.ot_names[0] = self.incoming.ot_names[slot];

        self.displayed = self
            .table
            .display_index(self.local.party_species[0])
            .unwrap_or(0);
        self.patch_list_stale = true;

        debug!("trade committed: took peer slot {slot}");
    }
}

impl LinkFollower for TradeSession {
    fn transfer_byte(&mut self, input: u8) -> u8 {
        match self.link_state {
            LinkState::NotConnected => self.connect_response(input),
            LinkState::Connected => self.menu_response(input),
            LinkState::TradeCentre => self.trade_centre_response(input),
        }
    }
}
