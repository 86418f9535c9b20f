use thiserror::Error;

use flash_ctrl_layout::{Access, Partition};

/// A fault reported by the flash array while executing an operation.
///
/// These originate below the controller, in the macro itself or its
/// register-level driver, and surface as [`FlashCtrlError::Hardware`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayFault {
    /// An uncorrectable ECC error was detected on readout.
    #[error("uncorrectable ECC error at word index {word_index}")]
    Ecc {
        /// Word index within the faulting partition.
        word_index: usize,
    },
    /// The array failed to program a word.
    #[error("program failed at word index {word_index}")]
    Program {
        /// Word index within the faulting partition.
        word_index: usize,
    },
    /// The array failed to complete an erase pulse.
    #[error("erase failed in page {page}")]
    Erase {
        /// First page of the failed erase.
        page: usize,
    },
    /// The power-up self check of the macro failed.
    #[error("flash macro power-up self check failed")]
    PowerUp,
}

/// Outcome of a flash controller operation.
///
/// The set is closed: every operation of the surface returns one of these,
/// and each variant ORs its category bit into the latched
/// [`ErrorCode`](crate::ErrorCode) accumulator before being returned. The
/// controller never retries on its own.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashCtrlError {
    /// The owning region or page does not grant the capability the
    /// operation needs. The array was not touched.
    #[error("{access:?} access to {partition:?} page {page} denied")]
    AccessDenied {
        /// Partition the request resolved to.
        partition: Partition,
        /// Offending page: absolute page index for the data partition,
        /// dense catalog index for info pages.
        page: usize,
        /// The capability that was missing.
        access: Access,
    },

    /// The request does not resolve to a span inside the device. The array
    /// was not touched.
    #[error("invalid flash request: {reason} ({value:#x})")]
    InvalidArgument {
        /// What was wrong with the request.
        reason: &'static str,
        /// The offending address, offset or count.
        value: u64,
    },

    /// The array reported a fault while the operation was in flight.
    #[error("flash array fault")]
    Hardware(#[source] ArrayFault),

    /// Post-erase readback found a word that does not read as erased.
    /// Flash erasure is irreversible, so nothing is rolled back; the span
    /// stays erased and the fault is reported.
    #[error("erase verification failed at word index {word_index}")]
    EraseVerifyFailed {
        /// First word that did not read back as erased.
        word_index: usize,
    },

    /// A mutation was attempted on permission or configuration state that
    /// is locked for the remainder of the boot session.
    #[error("configuration is locked for the remainder of this boot session")]
    AlreadyLocked,
}
