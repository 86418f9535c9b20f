use serde::{Deserialize, Serialize};
use static_assertions::{const_assert, const_assert_eq};

/// Number of flash banks.
pub const BANK_COUNT: usize = 2;

/// Number of data-partition pages per bank.
pub const PAGES_PER_BANK: usize = 256;

/// Size of one flash page in bytes.
pub const PAGE_SIZE_BYTES: usize = 2048;

/// Size of one bus word in bytes. All controller traffic is word granular.
pub const WORD_SIZE_BYTES: usize = 4;

/// Number of bus words in one flash page.
pub const WORDS_PER_PAGE: usize = PAGE_SIZE_BYTES / WORD_SIZE_BYTES;

/// Total number of data-partition pages across all banks.
pub const DATA_PAGE_COUNT: usize = BANK_COUNT * PAGES_PER_BANK;

/// Total size of the data partition in bytes.
pub const DATA_SIZE_BYTES: usize = DATA_PAGE_COUNT * PAGE_SIZE_BYTES;

/// Total number of bus words in the data partition.
pub const DATA_WORD_COUNT: usize = DATA_SIZE_BYTES / WORD_SIZE_BYTES;

/// Size of one bank's data partition in bytes.
pub const BANK_SIZE_BYTES: usize = PAGES_PER_BANK * PAGE_SIZE_BYTES;

/// Number of info pages in each bank.
pub const INFO_PAGES_PER_BANK: usize = 10;

/// Number of memory-protection regions available for the data partition.
pub const DATA_REGION_COUNT: usize = 8;

/// The value every word of a span reads back as after a successful erase.
pub const ERASED_WORD: u32 = 0xFFFF_FFFF;

/// Magic value that enables instruction fetch from flash when written to the
/// execute-enable register. Any other value disables execution.
pub const EXEC_ENABLE: u32 = 0xa26a_38f7;

const_assert_eq!(PAGE_SIZE_BYTES % WORD_SIZE_BYTES, 0);
const_assert!(DATA_SIZE_BYTES <= u32::MAX as usize);

/// Granularity of an erase operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EraseType {
    /// Erase a single page.
    Page,
    /// Erase an entire bank.
    Bank,
}

/// The two partitions of the flash macro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    /// The bulk data array.
    Data,
    /// The fixed-purpose info pages.
    Info,
}

/// Converts a word-aligned byte address into a data-partition word index.
///
/// Alignment and range are the controller's job to validate; this is pure
/// arithmetic.
pub fn word_index(addr: u32) -> usize {
    addr as usize / WORD_SIZE_BYTES
}

/// Returns the data-partition page that contains the given word index.
pub fn page_of_word(word: usize) -> usize {
    word / WORDS_PER_PAGE
}

/// Returns the bank that contains the given data-partition page.
pub fn bank_of_page(page: usize) -> usize {
    page / PAGES_PER_BANK
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_and_page_math() {
        assert_eq!(word_index(0), 0);
        assert_eq!(word_index(4), 1);
        assert_eq!(word_index(PAGE_SIZE_BYTES as u32), WORDS_PER_PAGE);
        assert_eq!(page_of_word(0), 0);
        assert_eq!(page_of_word(WORDS_PER_PAGE - 1), 0);
        assert_eq!(page_of_word(WORDS_PER_PAGE), 1);
    }

    #[test]
    fn bank_boundaries() {
        assert_eq!(bank_of_page(0), 0);
        assert_eq!(bank_of_page(PAGES_PER_BANK - 1), 0);
        assert_eq!(bank_of_page(PAGES_PER_BANK), 1);
        assert_eq!(bank_of_page(DATA_PAGE_COUNT - 1), BANK_COUNT - 1);
    }
}
