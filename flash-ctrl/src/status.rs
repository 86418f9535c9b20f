use bitfield::bitfield;

use crate::error::FlashCtrlError;

bitfield! {
    /// Live controller status word.
    ///
    /// `busy` is always clear between calls: every operation of the surface
    /// runs to completion synchronously. The FIFO level bits are kept for
    /// register-map fidelity and read as idle.
    #[derive(Copy, Clone)]
    pub struct StatusWord(u32);
    impl Debug;
    /// Read FIFO full.
    pub rd_full, set_rd_full: 0;
    /// Read FIFO empty.
    pub rd_empty, set_rd_empty: 1;
    /// Program FIFO full.
    pub prog_full, set_prog_full: 2;
    /// Program FIFO empty.
    pub prog_empty, set_prog_empty: 3;
    /// Controller initialization has completed.
    pub init_done, set_init_done: 4;
    /// An operation is in flight.
    pub busy, set_busy: 5;
    /// The latched fault accumulator is non-zero.
    pub error, set_error: 6;
}

impl From<u32> for StatusWord {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<StatusWord> for u32 {
    fn from(value: StatusWord) -> Self {
        value.0
    }
}

bitfield! {
    /// Latched fault bitfield, one bit per fault category.
    ///
    /// Categories accumulate across operations and clear only when the
    /// accumulator is read through `error_code_get`. This decouples "did
    /// this call fail" (the per-call `Result`) from "what has failed since
    /// I last checked".
    #[derive(Copy, Clone)]
    pub struct ErrorCode(u32);
    impl Debug;
    /// A capability bit was missing for a request.
    pub access_denied, set_access_denied: 0;
    /// A request did not resolve to a span inside the device.
    pub invalid_argument, set_invalid_argument: 1;
    /// The array reported a fault.
    pub hardware_fault, set_hardware_fault: 2;
    /// A post-erase readback found a non-erased word.
    pub erase_verify_failed, set_erase_verify_failed: 3;
    /// A mutation was attempted on locked state.
    pub locked_mutation, set_locked_mutation: 4;
}

impl ErrorCode {
    /// Returns whether no fault category is latched.
    pub fn is_clear(&self) -> bool {
        self.0 == 0
    }

    /// ORs the category bit of `err` into the accumulator.
    pub(crate) fn latch(&mut self, err: &FlashCtrlError) {
        match err {
            FlashCtrlError::AccessDenied { .. } => self.set_access_denied(true),
            FlashCtrlError::InvalidArgument { .. } => self.set_invalid_argument(true),
            FlashCtrlError::Hardware(_) => self.set_hardware_fault(true),
            FlashCtrlError::EraseVerifyFailed { .. } => self.set_erase_verify_failed(true),
            FlashCtrlError::AlreadyLocked => self.set_locked_mutation(true),
        }
    }
}

impl From<u32> for ErrorCode {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl From<ErrorCode> for u32 {
    fn from(value: ErrorCode) -> Self {
        value.0
    }
}
