use std::fmt;

use flash_ctrl_layout::{
    InfoPage, Partition, DATA_WORD_COUNT, ERASED_WORD, PAGES_PER_BANK, WORDS_PER_PAGE,
};

use crate::array::FlashArray;
use crate::error::ArrayFault;

/// Fault-injection hook. Receives the partition and the absolute word index
/// (for reads and programs) or the first page of the erase (for erases);
/// returning `Some` makes the array report that fault instead of operating.
pub type FaultHook = Box<dyn Fn(Partition, usize) -> Option<ArrayFault>>;

/// Deterministic in-memory flash array.
///
/// This is the test double behind the controller: fully erased at
/// construction, NOR-faithful (programming ANDs into the cells, erasing
/// fills with the erased word) and inspectable word by word, so software
/// layered above the controller can be unit-tested without hardware.
///
/// Faulty hardware is modeled two ways: per-operation closures that make a
/// specific access report a fault, and an erase-noop switch under which
/// erases report success without touching the cells, which is what a
/// marginal macro looks like to erase verification.
pub struct SimArray {
    data: Vec<u32>,
    info: Vec<u32>,
    read_hook: Option<FaultHook>,
    program_hook: Option<FaultHook>,
    erase_hook: Option<FaultHook>,
    erase_noop: bool,
}

impl SimArray {
    /// Creates a fully erased array.
    pub fn new() -> Self {
        SimArray {
            data: vec![ERASED_WORD; DATA_WORD_COUNT],
            info: vec![ERASED_WORD; InfoPage::COUNT * WORDS_PER_PAGE],
            read_hook: None,
            program_hook: None,
            erase_hook: None,
            erase_noop: false,
        }
    }

    /// Makes reads consult `hook` before touching the cells.
    pub fn set_read_fault(&mut self, hook: FaultHook) {
        self.read_hook = Some(hook);
    }

    /// Makes programs consult `hook` before touching the cells.
    pub fn set_program_fault(&mut self, hook: FaultHook) {
        self.program_hook = Some(hook);
    }

    /// Makes erases consult `hook` before touching the cells.
    pub fn set_erase_fault(&mut self, hook: FaultHook) {
        self.erase_hook = Some(hook);
    }

    /// When enabled, erases report success without changing any cell.
    pub fn set_erase_noop(&mut self, enabled: bool) {
        self.erase_noop = enabled;
    }

    /// Direct readout of one data word, bypassing the controller.
    pub fn data_word(&self, word_index: usize) -> u32 {
        self.data[word_index]
    }

    /// Direct overwrite of one data word, bypassing NOR semantics. Test
    /// scaffolding for seeding content or corrupting an erased span.
    pub fn set_data_word(&mut self, word_index: usize, value: u32) {
        self.data[word_index] = value;
    }

    /// Direct readout of one info-page word, bypassing the controller.
    pub fn info_word(&self, page: InfoPage, word_offset: usize) -> u32 {
        self.info[Self::info_base(page) + word_offset]
    }

    /// Direct overwrite of one info-page word, bypassing NOR semantics.
    pub fn set_info_word(&mut self, page: InfoPage, word_offset: usize, value: u32) {
        self.info[Self::info_base(page) + word_offset] = value;
    }

    fn info_base(page: InfoPage) -> usize {
        page.index() * WORDS_PER_PAGE
    }

    fn check(hook: &Option<FaultHook>, partition: Partition, index: usize) -> Result<(), ArrayFault> {
        if let Some(hook) = hook {
            if let Some(fault) = hook(partition, index) {
                return Err(fault);
            }
        }
        Ok(())
    }
}

impl Default for SimArray {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SimArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimArray")
            .field("data_words", &self.data.len())
            .field("info_words", &self.info.len())
            .field("erase_noop", &self.erase_noop)
            .finish()
    }
}

impl FlashArray for SimArray {
    fn power_up(&mut self) -> Result<(), ArrayFault> {
        Ok(())
    }

    fn data_read(&mut self, word_index: usize, out: &mut [u32]) -> Result<(), ArrayFault> {
        Self::check(&self.read_hook, Partition::Data, word_index)?;
        out.copy_from_slice(&self.data[word_index..word_index + out.len()]);
        Ok(())
    }

    fn data_program(&mut self, word_index: usize, data: &[u32]) -> Result<(), ArrayFault> {
        Self::check(&self.program_hook, Partition::Data, word_index)?;
        for (cell, value) in self.data[word_index..word_index + data.len()]
            .iter_mut()
            .zip(data)
        {
            *cell &= *value;
        }
        Ok(())
    }

    fn data_erase_page(&mut self, page: usize) -> Result<(), ArrayFault> {
        Self::check(&self.erase_hook, Partition::Data, page)?;
        if self.erase_noop {
            return Ok(());
        }
        let start = page * WORDS_PER_PAGE;
        self.data[start..start + WORDS_PER_PAGE].fill(ERASED_WORD);
        Ok(())
    }

    fn data_erase_bank(&mut self, bank: usize) -> Result<(), ArrayFault> {
        Self::check(&self.erase_hook, Partition::Data, bank * PAGES_PER_BANK)?;
        if self.erase_noop {
            return Ok(());
        }
        let start = bank * PAGES_PER_BANK * WORDS_PER_PAGE;
        let len = PAGES_PER_BANK * WORDS_PER_PAGE;
        self.data[start..start + len].fill(ERASED_WORD);
        Ok(())
    }

    fn info_read(
        &mut self,
        page: InfoPage,
        word_offset: usize,
        out: &mut [u32],
    ) -> Result<(), ArrayFault> {
        let base = Self::info_base(page);
        Self::check(&self.read_hook, Partition::Info, base + word_offset)?;
        out.copy_from_slice(&self.info[base + word_offset..base + word_offset + out.len()]);
        Ok(())
    }

    fn info_program(
        &mut self,
        page: InfoPage,
        word_offset: usize,
        data: &[u32],
    ) -> Result<(), ArrayFault> {
        let base = Self::info_base(page);
        Self::check(&self.program_hook, Partition::Info, base + word_offset)?;
        for (cell, value) in self.info[base + word_offset..base + word_offset + data.len()]
            .iter_mut()
            .zip(data)
        {
            *cell &= *value;
        }
        Ok(())
    }

    fn info_erase_page(&mut self, page: InfoPage) -> Result<(), ArrayFault> {
        Self::check(&self.erase_hook, Partition::Info, page.index())?;
        if self.erase_noop {
            return Ok(());
        }
        let base = Self::info_base(page);
        self.info[base..base + WORDS_PER_PAGE].fill(ERASED_WORD);
        Ok(())
    }

    fn info_erase_bank(&mut self, bank: usize) -> Result<(), ArrayFault> {
        let first = InfoPage::ALL
            .iter()
            .position(|page| page.bank() == bank)
            .unwrap_or(0);
        Self::check(&self.erase_hook, Partition::Info, first)?;
        if self.erase_noop {
            return Ok(());
        }
        for page in InfoPage::ALL {
            if page.bank() == bank {
                let base = Self::info_base(page);
                self.info[base..base + WORDS_PER_PAGE].fill(ERASED_WORD);
            }
        }
        Ok(())
    }
}
