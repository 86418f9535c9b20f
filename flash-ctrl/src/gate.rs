//! Access gating applied to every operation before it touches the array.
//!
//! The gate does two things, strictly in this order: resolve a request to
//! the span of pages it touches (rejecting anything that does not lie inside
//! the device with `InvalidArgument`), then check that every touched page
//! grants the capability the operation needs (rejecting with `AccessDenied`
//! otherwise). Only a request that passes both is allowed near hardware.

use std::ops::Range;

use flash_ctrl_layout::{
    bank_of_page, page_of_word, word_index, Access, InfoPage, Partition, BANK_COUNT,
    DATA_WORD_COUNT, PAGES_PER_BANK, WORDS_PER_PAGE, WORD_SIZE_BYTES,
};

use crate::error::FlashCtrlError;
use crate::store::RegionConfigStore;

/// A validated span of data-partition words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct WordSpan {
    /// Word indices into the data partition.
    pub words: Range<usize>,
}

impl WordSpan {
    pub(crate) fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// The pages this span touches.
    pub(crate) fn pages(&self) -> Range<usize> {
        if self.is_empty() {
            return 0..0;
        }
        page_of_word(self.words.start)..page_of_word(self.words.end - 1) + 1
    }
}

/// Resolves a byte address plus word count to a data-partition word span.
///
/// A zero word count resolves to the empty span without any further
/// validation: the operation is a trivial success and must not reach the
/// array at all.
pub(crate) fn resolve_data_span(addr: u32, word_count: usize) -> Result<WordSpan, FlashCtrlError> {
    if word_count == 0 {
        return Ok(WordSpan { words: 0..0 });
    }
    let first = aligned_word(addr)?;
    if first + word_count > DATA_WORD_COUNT {
        return Err(FlashCtrlError::InvalidArgument {
            reason: "span exceeds the data partition",
            value: u64::from(addr) + (word_count * WORD_SIZE_BYTES) as u64,
        });
    }
    Ok(WordSpan {
        words: first..first + word_count,
    })
}

/// Resolves a byte address to the data page it falls in.
pub(crate) fn resolve_data_page(addr: u32) -> Result<usize, FlashCtrlError> {
    let word = aligned_word(addr)?;
    if word >= DATA_WORD_COUNT {
        return Err(FlashCtrlError::InvalidArgument {
            reason: "address beyond the data partition",
            value: u64::from(addr),
        });
    }
    Ok(page_of_word(word))
}

/// Resolves a byte address to the bank it falls in.
pub(crate) fn resolve_data_bank(addr: u32) -> Result<usize, FlashCtrlError> {
    let page = resolve_data_page(addr)?;
    Ok(bank_of_page(page))
}

/// Resolves an offset plus word count to a word range within one info page.
/// All info pages share the same geometry, so no page identity is needed.
pub(crate) fn resolve_info_span(
    offset: u32,
    word_count: usize,
) -> Result<Range<usize>, FlashCtrlError> {
    if word_count == 0 {
        return Ok(0..0);
    }
    let first = aligned_word(offset)?;
    if first + word_count > WORDS_PER_PAGE {
        return Err(FlashCtrlError::InvalidArgument {
            reason: "span exceeds the info page",
            value: u64::from(offset) + (word_count * WORD_SIZE_BYTES) as u64,
        });
    }
    Ok(first..first + word_count)
}

/// Checks that every page of a data span grants `access`.
pub(crate) fn check_data_access(
    store: &RegionConfigStore,
    span: &WordSpan,
    access: Access,
) -> Result<(), FlashCtrlError> {
    for page in span.pages() {
        if !store.data_page_perms(page).grants(access) {
            return Err(FlashCtrlError::AccessDenied {
                partition: Partition::Data,
                page,
                access,
            });
        }
    }
    Ok(())
}

/// Checks that a single data page grants `access`.
pub(crate) fn check_data_page_access(
    store: &RegionConfigStore,
    page: usize,
    access: Access,
) -> Result<(), FlashCtrlError> {
    if !store.data_page_perms(page).grants(access) {
        return Err(FlashCtrlError::AccessDenied {
            partition: Partition::Data,
            page,
            access,
        });
    }
    Ok(())
}

/// Checks that an info page grants `access`.
pub(crate) fn check_info_access(
    store: &RegionConfigStore,
    page: InfoPage,
    access: Access,
) -> Result<(), FlashCtrlError> {
    if !store.info_effective_perms(page).grants(access) {
        return Err(FlashCtrlError::AccessDenied {
            partition: Partition::Info,
            page: page.index(),
            access,
        });
    }
    Ok(())
}

/// Checks the global bank-erase enable bit. Bank-granular erases are gated
/// by this bit alone; per-page erase capabilities are not consulted.
pub(crate) fn check_bank_erase(
    store: &RegionConfigStore,
    bank: usize,
    partition: Partition,
) -> Result<(), FlashCtrlError> {
    debug_assert!(bank < BANK_COUNT);
    if !store.bank_erase_enabled() {
        return Err(FlashCtrlError::AccessDenied {
            partition,
            page: bank * PAGES_PER_BANK,
            access: Access::Erase,
        });
    }
    Ok(())
}

fn aligned_word(addr: u32) -> Result<usize, FlashCtrlError> {
    if addr as usize % WORD_SIZE_BYTES != 0 {
        return Err(FlashCtrlError::InvalidArgument {
            reason: "address is not word aligned",
            value: u64::from(addr),
        });
    }
    Ok(word_index(addr))
}

#[cfg(test)]
mod tests {
    use flash_ctrl_layout::{Cfg, Perms, DATA_SIZE_BYTES, PAGE_SIZE_BYTES};
    use test_case::test_case;

    use super::*;

    fn store_with_region0() -> RegionConfigStore {
        let mut store = RegionConfigStore::new();
        store
            .protect_region(0, 0, 4, Perms::READ_ONLY, Cfg::default(), false)
            .unwrap();
        store
    }

    #[test]
    fn zero_word_count_is_the_empty_span() {
        // Even a bogus address resolves: zero words is a trivial success.
        let span = resolve_data_span(0xFFFF_FFF1, 0).unwrap();
        assert!(span.is_empty());
        assert_eq!(span.pages(), 0..0);
    }

    #[test]
    fn unaligned_address_is_rejected() {
        assert!(matches!(
            resolve_data_span(2, 1),
            Err(FlashCtrlError::InvalidArgument { .. })
        ));
        assert!(matches!(
            resolve_info_span(6, 1),
            Err(FlashCtrlError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn span_past_the_device_is_rejected() {
        let last_word_addr = (DATA_SIZE_BYTES - WORD_SIZE_BYTES) as u32;
        assert!(resolve_data_span(last_word_addr, 1).is_ok());
        assert!(matches!(
            resolve_data_span(last_word_addr, 2),
            Err(FlashCtrlError::InvalidArgument { .. })
        ));
        assert!(matches!(
            resolve_info_span(0, WORDS_PER_PAGE + 1),
            Err(FlashCtrlError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn span_pages_cover_straddled_boundaries() {
        // Two words straddling the page 0 / page 1 boundary.
        let addr = (PAGE_SIZE_BYTES - WORD_SIZE_BYTES) as u32;
        let span = resolve_data_span(addr, 2).unwrap();
        assert_eq!(span.pages(), 0..2);
    }

    #[test_case(Access::Write; "write is not granted")]
    #[test_case(Access::Erase; "erase is not granted")]
    fn read_only_region_denies(access: Access) {
        let store = store_with_region0();
        let span = resolve_data_span(0, 4).unwrap();
        assert!(check_data_access(&store, &span, Access::Read).is_ok());
        assert!(matches!(
            check_data_access(&store, &span, access),
            Err(FlashCtrlError::AccessDenied { .. })
        ));
    }

    #[test]
    fn denial_names_the_offending_page() {
        let store = store_with_region0();
        // Pages [0, 4) readable, page 4 falls back to the all-denied default.
        let span = resolve_data_span(0, 5 * WORDS_PER_PAGE).unwrap();
        match check_data_access(&store, &span, Access::Read) {
            Err(FlashCtrlError::AccessDenied {
                partition: Partition::Data,
                page: 4,
                access: Access::Read,
            }) => {}
            other => panic!("expected denial on page 4, got {other:?}"),
        }
    }

    #[test]
    fn bank_erase_needs_the_global_bit() {
        let mut store = RegionConfigStore::new();
        assert!(matches!(
            check_bank_erase(&store, 0, Partition::Data),
            Err(FlashCtrlError::AccessDenied { .. })
        ));
        store.set_bank_erase_enabled(true).unwrap();
        assert!(check_bank_erase(&store, 0, Partition::Data).is_ok());
    }

    #[test]
    fn info_access_follows_effective_perms() {
        let mut store = RegionConfigStore::new();
        assert!(matches!(
            check_info_access(&store, InfoPage::OwnerSecret, Access::Read),
            Err(FlashCtrlError::AccessDenied { .. })
        ));
        store
            .set_info_perms(InfoPage::OwnerSecret, Perms::READ_WRITE)
            .unwrap();
        assert!(check_info_access(&store, InfoPage::OwnerSecret, Access::Read).is_ok());
        assert!(matches!(
            check_info_access(&store, InfoPage::OwnerSecret, Access::Erase),
            Err(FlashCtrlError::AccessDenied { .. })
        ));
    }
}
