//! Post-erase verification.
//!
//! Reads back an erased span and compares every word to the erased-state
//! value. There is nothing to roll back on mismatch; flash erasure is
//! physically irreversible, so a failure only reports the fault while the
//! span stays erased.

use flash_ctrl_layout::{InfoPage, ERASED_WORD, WORDS_PER_PAGE};

use crate::array::FlashArray;
use crate::error::FlashCtrlError;

/// Verifies `page_count` data pages starting at `first_page`.
pub(crate) fn data_pages<A: FlashArray>(
    array: &mut A,
    first_page: usize,
    page_count: usize,
) -> Result<(), FlashCtrlError> {
    let mut buf = vec![0u32; WORDS_PER_PAGE];
    for page in first_page..first_page + page_count {
        let base = page * WORDS_PER_PAGE;
        array
            .data_read(base, &mut buf)
            .map_err(FlashCtrlError::Hardware)?;
        check_erased(&buf, base)?;
    }
    Ok(())
}

/// Verifies a single info page.
pub(crate) fn info_page<A: FlashArray>(
    array: &mut A,
    page: InfoPage,
) -> Result<(), FlashCtrlError> {
    let mut buf = vec![0u32; WORDS_PER_PAGE];
    array
        .info_read(page, 0, &mut buf)
        .map_err(FlashCtrlError::Hardware)?;
    check_erased(&buf, page.index() * WORDS_PER_PAGE)
}

/// Verifies every info page of `bank`.
pub(crate) fn info_bank<A: FlashArray>(array: &mut A, bank: usize) -> Result<(), FlashCtrlError> {
    for page in InfoPage::ALL {
        if page.bank() == bank {
            info_page(array, page)?;
        }
    }
    Ok(())
}

fn check_erased(words: &[u32], base: usize) -> Result<(), FlashCtrlError> {
    match words.iter().position(|word| *word != ERASED_WORD) {
        Some(offset) => Err(FlashCtrlError::EraseVerifyFailed {
            word_index: base + offset,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimArray;

    #[test]
    fn erased_pages_verify() {
        let mut array = SimArray::new();
        assert!(data_pages(&mut array, 0, 4).is_ok());
        assert!(info_page(&mut array, InfoPage::BootData0).is_ok());
        assert!(info_bank(&mut array, 0).is_ok());
    }

    #[test]
    fn mismatch_names_the_first_offending_word() {
        let mut array = SimArray::new();
        array.set_data_word(WORDS_PER_PAGE + 3, 0);
        array.set_data_word(WORDS_PER_PAGE + 7, 0);

        assert_eq!(
            data_pages(&mut array, 0, 2),
            Err(FlashCtrlError::EraseVerifyFailed {
                word_index: WORDS_PER_PAGE + 3
            })
        );
    }
}
