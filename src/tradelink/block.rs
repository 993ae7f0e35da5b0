//! Generation-I trade block binary layout
//!
//! The trade block is the serialized six-creature party exchanged in full
//! during a trade session. The layout is a protocol constant; any size or
//! offset drift desynchronizes the whole exchange.
//!
//! Reference implementations disagree on the wire size (405, 415, and 418
//! bytes all appear). This crate commits to 415: trainer name (11) +
//! party count (1) + species list with terminator (7) + six 44-byte
//! creature records (264) + six 11-byte original-trainer names (66) +
//! six 11-byte nicknames (66).

use crate::protocol::NO_DATA;

/// Length of every name field (10 characters + terminator)
pub const NAME_LEN: usize = 11;
/// Party capacity
pub const PARTY_SIZE: usize = 6;
/// Size of one creature record
pub const RECORD_SIZE: usize = 44;
/// Total trade block wire size
pub const BLOCK_SIZE: usize = 415;

/// Species-list terminator
pub const SPECIES_TERMINATOR: u8 = 0xFF;

/// Offset of the patchable region (the six creature records)
pub const PATCH_REGION_OFFSET: usize = NAME_LEN + 1 + (PARTY_SIZE + 1);
/// Length of the patchable region
pub const PATCH_REGION_LEN: usize = PARTY_SIZE * RECORD_SIZE;

/// Fixed-size text field (trainer names, nicknames)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct Name(pub [u8; NAME_LEN]);

impl Name {
    /// All-terminator blank name
    pub const fn blank() -> Self {
        Self([0x50; NAME_LEN])
    }
}

/// One party creature record (44 bytes, big-endian multi-byte fields)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct PokemonRecord {
    pub species: u8,
    pub hp: [u8; 2],
    pub box_level: u8,
    pub status: u8,
    pub type1: u8,
    pub type2: u8,
    pub catch_rate: u8,
    pub moves: [u8; 4],
    pub ot_id: [u8; 2],
    pub exp: [u8; 3],
    pub hp_ev: [u8; 2],
    pub attack_ev: [u8; 2],
    pub defense_ev: [u8; 2],
    pub speed_ev: [u8; 2],
    pub special_ev: [u8; 2],
    pub ivs: [u8; 2],
    pub pp: [u8; 4],
    pub level: u8,
    pub max_hp: [u8; 2],
    pub attack: [u8; 2],
    pub defense: [u8; 2],
    pub speed: [u8; 2],
    pub special: [u8; 2],
}

impl PokemonRecord {
    /// All-zero record
    pub const fn zeroed() -> Self {
        Self {
            species: 0,
            hp: [0; 2],
            box_level: 0,
            status: 0,
            type1: 0,
            type2: 0,
            catch_rate: 0,
            moves: [0; 4],
            ot_id: [0; 2],
            exp: [0; 3],
            hp_ev: [0; 2],
            attack_ev: [0; 2],
            defense_ev: [0; 2],
            speed_ev: [0; 2],
            special_ev: [0; 2],
            ivs: [0; 2],
            pp: [0; 4],
            level: 0,
            max_hp: [0; 2],
            attack: [0; 2],
            defense: [0; 2],
            speed: [0; 2],
            special: [0; 2],
        }
    }
}

/// Full trade block in wire order
#[derive(Debug, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct TradeBlock {
    pub trainer_name: Name,
    pub party_count: u8,
    /// Six species ids plus a 0xFF terminator slot
    pub party_species: [u8; PARTY_SIZE + 1],
    pub party: [PokemonRecord; PARTY_SIZE],
    pub ot_names: [Name; PARTY_SIZE],
    pub nicknames: [Name; PARTY_SIZE],
}

// The layout above is all-u8 repr(C): no padding anywhere.
const _: () = assert!(core::mem::size_of::<TradeBlock>() == BLOCK_SIZE);
const _: () = assert!(core::mem::size_of::<PokemonRecord>() == RECORD_SIZE);
const _: () = assert!(core::mem::size_of::<Name>() == NAME_LEN);

impl TradeBlock {
    /// Empty block: no party members, terminated species list
    pub const fn zeroed() -> Self {
        Self {
            trainer_name: Name::blank(),
            party_count: 0,
            party_species: [SPECIES_TERMINATOR; PARTY_SIZE + 1],
            party: [PokemonRecord::zeroed(); PARTY_SIZE],
            ot_names: [Name::blank(); PARTY_SIZE],
            nicknames: [Name::blank(); PARTY_SIZE],
        }
    }

    /// View the block as its wire bytes
    #[inline]
    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        // SAFETY: repr(C) struct built exclusively from u8 arrays, so it is
        // exactly BLOCK_SIZE bytes with no padding (checked above) and every
        // bit pattern is valid.
        unsafe { &*(self as *const TradeBlock as *const [u8; BLOCK_SIZE]) }
    }

    /// Mutable view of the wire bytes
    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; BLOCK_SIZE] {
        // SAFETY: as `as_bytes`, and all byte values are valid for all fields.
        unsafe { &mut *(self as *mut TradeBlock as *mut [u8; BLOCK_SIZE]) }
    }

    /// The patchable region: the six creature records
    #[inline]
    pub fn patch_region(&self) -> &[u8] {
        &self.as_bytes()[PATCH_REGION_OFFSET..PATCH_REGION_OFFSET + PATCH_REGION_LEN]
    }

    /// Mutable patchable region
    #[inline]
    pub fn patch_region_mut(&mut self) -> &mut [u8] {
        &mut self.as_bytes_mut()[PATCH_REGION_OFFSET..PATCH_REGION_OFFSET + PATCH_REGION_LEN]
    }

    /// Count of patchable-region bytes that equal the no-data filler
    pub fn filler_count(&self) -> usize {
        self.patch_region().iter().filter(|&&b| b == NO_DATA).count()
    }
}
