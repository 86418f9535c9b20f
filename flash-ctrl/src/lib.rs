//! # Permission-gated flash controller
//!
//! This crate mediates every read, write and erase of an on-chip flash
//! macro — a bulk data array plus a fixed set of info pages — behind a
//! region/page permission-and-configuration model, for firmware that runs
//! before full system bring-up. Once a region or the creator info pages are
//! locked, that state is immutable for the remainder of the boot session;
//! access outside declared rights is denied before hardware is touched,
//! never silently degraded.
//!
//! # Examples
//!
//! ## Gating a boot-time write
//! ```
//! use flash_ctrl::{Controller, FlashCtrl, SimArray};
//! use flash_ctrl::layout::{Cfg, Perms};
//!
//! let mut ctrl = Controller::new(SimArray::new());
//! ctrl.init()?;
//!
//! // Region 0: pages [0, 4), read/write/erase, not locked yet.
//! ctrl.data_region_protect(0, 0, 4, Perms::READ_WRITE_ERASE, Cfg::default(), false)?;
//!
//! ctrl.data_write(0x0, &[0xcafe_f00d])?;
//! let mut word = [0u32; 1];
//! ctrl.data_read(0x0, &mut word)?;
//! assert_eq!(word[0], 0xcafe_f00d);
//! # Ok::<(), flash_ctrl::FlashCtrlError>(())
//! ```
//!
//! ## Freezing creator state at the end of a boot stage
//! ```
//! use flash_ctrl::{Controller, FlashCtrl, FlashCtrlError, SimArray};
//! use flash_ctrl::layout::{InfoPage, Perms};
//!
//! let mut ctrl = Controller::new(SimArray::new());
//! ctrl.init()?;
//!
//! ctrl.info_perms_set(InfoPage::CreatorSecret, Perms::READ_WRITE)?;
//! ctrl.info_write(InfoPage::CreatorSecret, 0, &[0x5eed_5eed])?;
//! ctrl.creator_info_pages_lockdown();
//!
//! // The page is now immutable for the rest of the session.
//! assert_eq!(
//!     ctrl.info_perms_set(InfoPage::CreatorSecret, Perms::NONE),
//!     Err(FlashCtrlError::AlreadyLocked),
//! );
//! # Ok::<(), flash_ctrl::FlashCtrlError>(())
//! ```
//!
//! The crate is built around the [`FlashCtrl`] operation surface, the
//! [`Controller`] context object and the [`FlashArray`] seam to the
//! register-level driver; [`SimArray`] implements the seam in memory so
//! layered boot software can be tested without hardware.

#[warn(missing_docs)]
mod array;
#[warn(missing_docs)]
mod controller;
#[warn(missing_docs)]
mod error;
mod gate;
#[warn(missing_docs)]
mod sim;
#[warn(missing_docs)]
mod status;
#[warn(missing_docs)]
mod store;
mod verify;

pub use flash_ctrl_layout as layout;

pub use crate::array::FlashArray;
pub use crate::controller::{Controller, FlashCtrl};
pub use crate::error::{ArrayFault, FlashCtrlError};
pub use crate::sim::{FaultHook, SimArray};
pub use crate::status::{ErrorCode, StatusWord};
pub use crate::store::{DataRegion, RegionConfigStore};
