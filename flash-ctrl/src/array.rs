use flash_ctrl_layout::InfoPage;

use crate::error::ArrayFault;

/// Raw access to the flash macro.
///
/// This is the seam between the controller and the physical device: the
/// register-level driver implements it on hardware,
/// [`SimArray`](crate::SimArray) implements it deterministically in memory
/// for tests.
/// The controller validates every span before it reaches this trait, so
/// implementations may assume in-range, word-aligned requests; they report
/// only faults the macro itself raises.
///
/// Word indices are partition relative: data indices count from the start
/// of the bulk array, info indices from the start of the addressed page.
pub trait FlashArray {
    /// Runs the macro's power-up self check.
    fn power_up(&mut self) -> Result<(), ArrayFault>;

    /// Reads words from the data partition.
    fn data_read(&mut self, word_index: usize, out: &mut [u32]) -> Result<(), ArrayFault>;

    /// Programs words into the data partition. Flash programming can only
    /// clear bits; the result of programming a non-erased cell is the AND
    /// of old and new.
    fn data_program(&mut self, word_index: usize, data: &[u32]) -> Result<(), ArrayFault>;

    /// Erases one data page.
    fn data_erase_page(&mut self, page: usize) -> Result<(), ArrayFault>;

    /// Erases the data partition of one bank.
    fn data_erase_bank(&mut self, bank: usize) -> Result<(), ArrayFault>;

    /// Reads words from an info page.
    fn info_read(
        &mut self,
        page: InfoPage,
        word_offset: usize,
        out: &mut [u32],
    ) -> Result<(), ArrayFault>;

    /// Programs words into an info page.
    fn info_program(
        &mut self,
        page: InfoPage,
        word_offset: usize,
        data: &[u32],
    ) -> Result<(), ArrayFault>;

    /// Erases one info page.
    fn info_erase_page(&mut self, page: InfoPage) -> Result<(), ArrayFault>;

    /// Erases the info partition of one bank.
    fn info_erase_bank(&mut self, bank: usize) -> Result<(), ArrayFault>;
}
