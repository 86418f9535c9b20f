//! Flash device layout schema
//!
//! The flash controller mediates access to one on-chip flash macro: a bulk
//! data array split into banks of pages, and a small set of fixed-purpose
//! info pages outside the bulk array. This crate contains the layout of that
//! device and the plain data types the controller's permission model is
//! built from: geometry constants, capability and configuration sets, the
//! erase granularities and the info-page catalog.
//!
//! No driver logic lives here; the types are consumed by the `flash-ctrl`
//! crate and by tooling that wants to reason about the device layout.
#![warn(missing_docs)]

mod access;
mod geometry;
mod info;

pub use access::{Access, Cfg, Perms};
pub use geometry::{
    bank_of_page, page_of_word, word_index, EraseType, Partition, BANK_COUNT, BANK_SIZE_BYTES,
    DATA_PAGE_COUNT, DATA_REGION_COUNT, DATA_SIZE_BYTES, DATA_WORD_COUNT, ERASED_WORD,
    EXEC_ENABLE, INFO_PAGES_PER_BANK, PAGES_PER_BANK, PAGE_SIZE_BYTES, WORDS_PER_PAGE,
    WORD_SIZE_BYTES,
};
pub use info::InfoPage;
