use flash_ctrl_layout::{Cfg, InfoPage, Perms, DATA_PAGE_COUNT, DATA_REGION_COUNT, EXEC_ENABLE};

use crate::error::FlashCtrlError;

/// A protected slice of the data partition.
///
/// Declared through `data_region_protect`. Once `locked` is set the stored
/// permissions and configuration are immutable for the rest of the boot
/// session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataRegion {
    /// First page covered by the region.
    pub page_offset: usize,
    /// Number of pages covered. Zero matches nothing.
    pub num_pages: usize,
    /// Capabilities granted for pages the region owns.
    pub perms: Perms,
    /// Configuration applied to pages the region owns.
    pub cfg: Cfg,
    /// Whether the region is frozen for the rest of the session.
    pub locked: bool,
}

impl DataRegion {
    fn contains(&self, page: usize) -> bool {
        page >= self.page_offset && page < self.page_offset + self.num_pages
    }
}

#[derive(Debug, Clone, Copy)]
struct InfoPageState {
    perms: Perms,
    cfg: Cfg,
    locked: bool,
}

impl InfoPageState {
    const RESET: InfoPageState = InfoPageState {
        perms: Perms::NONE,
        cfg: Cfg {
            scrambling: false,
            ecc: false,
            high_endurance: false,
        },
        locked: false,
    };
}

/// Permission, configuration and lock state for every data region and info
/// page, plus the global bits the gate consults.
///
/// Locking never rewrites the stored permissions; a locked slot resolves to
/// effective permissions with write and erase masked off, so content stays
/// readable (per its stored read bit) but immutable.
#[derive(Debug)]
pub struct RegionConfigStore {
    default_perms: Perms,
    default_cfg: Cfg,
    regions: [Option<DataRegion>; DATA_REGION_COUNT],
    info: [InfoPageState; InfoPage::COUNT],
    bank_erase_enabled: bool,
    bank_erase_locked: bool,
    creator_locked: bool,
    exec: u32,
}

impl Default for RegionConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionConfigStore {
    /// Creates a store in its reset state: everything denied, nothing
    /// locked, bank erase disabled, execution disabled.
    pub fn new() -> Self {
        RegionConfigStore {
            default_perms: Perms::NONE,
            default_cfg: Cfg::default(),
            regions: [None; DATA_REGION_COUNT],
            info: [InfoPageState::RESET; InfoPage::COUNT],
            bank_erase_enabled: false,
            bank_erase_locked: false,
            creator_locked: false,
            exec: 0,
        }
    }

    /// Default capabilities for data pages outside every region.
    pub fn default_perms(&self) -> Perms {
        self.default_perms
    }

    /// Replaces the data-partition default capabilities.
    pub fn set_default_perms(&mut self, perms: Perms) {
        self.default_perms = perms;
    }

    /// Default configuration for data pages outside every region.
    pub fn default_cfg(&self) -> Cfg {
        self.default_cfg
    }

    /// Replaces the data-partition default configuration.
    pub fn set_default_cfg(&mut self, cfg: Cfg) {
        self.default_cfg = cfg;
    }

    /// Stored capabilities of an info page, ignoring lock masking.
    pub fn info_perms(&self, page: InfoPage) -> Perms {
        self.info[page.index()].perms
    }

    /// Stored configuration of an info page.
    pub fn info_cfg(&self, page: InfoPage) -> Cfg {
        self.info[page.index()].cfg
    }

    /// Replaces an info page's capabilities. Fails once the page is locked.
    pub fn set_info_perms(&mut self, page: InfoPage, perms: Perms) -> Result<(), FlashCtrlError> {
        let state = &mut self.info[page.index()];
        if state.locked {
            return Err(FlashCtrlError::AlreadyLocked);
        }
        state.perms = perms;
        Ok(())
    }

    /// Replaces an info page's configuration. Fails once the page is locked.
    pub fn set_info_cfg(&mut self, page: InfoPage, cfg: Cfg) -> Result<(), FlashCtrlError> {
        let state = &mut self.info[page.index()];
        if state.locked {
            return Err(FlashCtrlError::AlreadyLocked);
        }
        state.cfg = cfg;
        Ok(())
    }

    /// Declares (or redeclares) a data region.
    ///
    /// Redeclaring an unlocked region replaces its configuration wholesale.
    /// Redeclaring a locked region is rejected with
    /// [`FlashCtrlError::AlreadyLocked`], never silently ignored.
    pub fn protect_region(
        &mut self,
        region: u32,
        page_offset: u32,
        num_pages: u32,
        perms: Perms,
        cfg: Cfg,
        lock: bool,
    ) -> Result<(), FlashCtrlError> {
        let index = region as usize;
        if index >= DATA_REGION_COUNT {
            return Err(FlashCtrlError::InvalidArgument {
                reason: "region index out of range",
                value: u64::from(region),
            });
        }
        let page_offset = page_offset as usize;
        let num_pages = num_pages as usize;
        if page_offset + num_pages > DATA_PAGE_COUNT {
            return Err(FlashCtrlError::InvalidArgument {
                reason: "page span exceeds the data partition",
                value: (page_offset + num_pages) as u64,
            });
        }
        if let Some(existing) = &self.regions[index] {
            if existing.locked {
                return Err(FlashCtrlError::AlreadyLocked);
            }
        }
        tracing::debug!(
            "protecting region {index}: pages [{page_offset}, {}), lock: {lock}",
            page_offset + num_pages
        );
        self.regions[index] = Some(DataRegion {
            page_offset,
            num_pages,
            perms,
            cfg,
            locked: lock,
        });
        Ok(())
    }

    /// Returns a declared region, if any.
    pub fn region(&self, index: usize) -> Option<DataRegion> {
        self.regions.get(index).copied().flatten()
    }

    /// Whether bank-granular erases are currently enabled.
    pub fn bank_erase_enabled(&self) -> bool {
        self.bank_erase_enabled
    }

    /// Sets the global bank-erase enable bit. The bit is frozen by creator
    /// lockdown.
    pub fn set_bank_erase_enabled(&mut self, enable: bool) -> Result<(), FlashCtrlError> {
        if self.bank_erase_locked {
            return Err(FlashCtrlError::AlreadyLocked);
        }
        self.bank_erase_enabled = enable;
        Ok(())
    }

    /// The raw execute-enable word. Fetch is allowed only while it holds
    /// [`EXEC_ENABLE`].
    pub fn exec(&self) -> u32 {
        self.exec
    }

    /// Stores the execute-enable word.
    pub fn set_exec(&mut self, exec_val: u32) {
        tracing::debug!(
            "flash execution {}",
            if exec_val == EXEC_ENABLE {
                "enabled"
            } else {
                "disabled"
            }
        );
        self.exec = exec_val;
    }

    /// Locks every creator info page and freezes the bank-erase enable bit.
    ///
    /// One-shot and idempotent: the second call changes nothing and is not
    /// an error. There is no way back for the rest of the boot session.
    pub fn lockdown_creator_pages(&mut self) {
        if self.creator_locked {
            tracing::debug!("creator info pages already locked down");
            return;
        }
        for page in InfoPage::ALL {
            if page.is_creator() {
                self.info[page.index()].locked = true;
            }
        }
        self.bank_erase_locked = true;
        self.creator_locked = true;
        tracing::debug!("creator info pages locked down for this boot session");
    }

    /// Effective capabilities of a data page: lowest declared region that
    /// contains the page wins, pages outside every region fall back to the
    /// defaults, and locked regions resolve with write/erase masked off.
    pub fn data_page_perms(&self, page: usize) -> Perms {
        match self.regions.iter().flatten().find(|r| r.contains(page)) {
            Some(region) => Self::masked(region.perms, region.locked),
            None => self.default_perms,
        }
    }

    /// Effective configuration of a data page, resolved like
    /// [`data_page_perms`](Self::data_page_perms).
    pub fn data_page_cfg(&self, page: usize) -> Cfg {
        match self.regions.iter().flatten().find(|r| r.contains(page)) {
            Some(region) => region.cfg,
            None => self.default_cfg,
        }
    }

    /// Effective capabilities of an info page, with lock masking applied.
    pub fn info_effective_perms(&self, page: InfoPage) -> Perms {
        let state = &self.info[page.index()];
        Self::masked(state.perms, state.locked)
    }

    fn masked(perms: Perms, locked: bool) -> Perms {
        if locked {
            Perms {
                read: perms.read,
                write: false,
                erase: false,
            }
        } else {
            perms
        }
    }
}

#[cfg(test)]
mod tests {
    use flash_ctrl_layout::Access;

    use super::*;

    #[test]
    fn reset_denies_everything() {
        let store = RegionConfigStore::new();
        assert_eq!(store.default_perms(), Perms::NONE);
        assert_eq!(store.data_page_perms(0), Perms::NONE);
        assert_eq!(store.info_perms(InfoPage::CreatorSecret), Perms::NONE);
        assert!(!store.bank_erase_enabled());
        assert_eq!(store.exec(), 0);
    }

    #[test]
    fn region_resolution_prefers_lowest_index() {
        let mut store = RegionConfigStore::new();
        store
            .protect_region(1, 0, 8, Perms::READ_ONLY, Cfg::default(), false)
            .unwrap();
        store
            .protect_region(0, 4, 8, Perms::READ_WRITE, Cfg::default(), false)
            .unwrap();

        // Pages [4, 8) are covered by both; region 0 wins.
        assert_eq!(store.data_page_perms(5), Perms::READ_WRITE);
        assert_eq!(store.data_page_perms(2), Perms::READ_ONLY);
        // Outside both, back to the default.
        assert_eq!(store.data_page_perms(100), Perms::NONE);
    }

    #[test]
    fn unlocked_region_can_be_redeclared() {
        let mut store = RegionConfigStore::new();
        store
            .protect_region(2, 0, 4, Perms::READ_ONLY, Cfg::default(), false)
            .unwrap();
        store
            .protect_region(2, 8, 2, Perms::READ_WRITE, Cfg::default(), false)
            .unwrap();

        let region = store.region(2).unwrap();
        assert_eq!(region.page_offset, 8);
        assert_eq!(region.num_pages, 2);
    }

    #[test]
    fn locked_region_rejects_redeclaration_and_keeps_state() {
        let mut store = RegionConfigStore::new();
        store
            .protect_region(0, 0, 4, Perms::READ_WRITE_ERASE, Cfg::default(), true)
            .unwrap();

        let before = store.region(0).unwrap();
        let result = store.protect_region(0, 0, 4, Perms::NONE, Cfg::default(), false);
        assert_eq!(result, Err(FlashCtrlError::AlreadyLocked));
        assert_eq!(store.region(0).unwrap(), before);
    }

    #[test]
    fn locked_region_masks_write_and_erase() {
        let mut store = RegionConfigStore::new();
        store
            .protect_region(0, 0, 4, Perms::READ_WRITE_ERASE, Cfg::default(), true)
            .unwrap();

        let effective = store.data_page_perms(0);
        assert!(effective.grants(Access::Read));
        assert!(!effective.grants(Access::Write));
        assert!(!effective.grants(Access::Erase));
        // The stored permissions are untouched.
        assert_eq!(store.region(0).unwrap().perms, Perms::READ_WRITE_ERASE);
    }

    #[test]
    fn protect_validates_region_and_span() {
        let mut store = RegionConfigStore::new();
        assert!(matches!(
            store.protect_region(8, 0, 1, Perms::NONE, Cfg::default(), false),
            Err(FlashCtrlError::InvalidArgument { .. })
        ));
        assert!(matches!(
            store.protect_region(0, 510, 4, Perms::NONE, Cfg::default(), false),
            Err(FlashCtrlError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn lockdown_is_idempotent() {
        let mut store = RegionConfigStore::new();
        store
            .set_info_perms(InfoPage::CreatorSecret, Perms::READ_WRITE)
            .unwrap();

        store.lockdown_creator_pages();
        let perms_after_first = store.info_perms(InfoPage::CreatorSecret);
        store.lockdown_creator_pages();
        assert_eq!(store.info_perms(InfoPage::CreatorSecret), perms_after_first);

        // Creator pages are frozen...
        assert_eq!(
            store.set_info_perms(InfoPage::CreatorSecret, Perms::NONE),
            Err(FlashCtrlError::AlreadyLocked)
        );
        assert_eq!(
            store.set_info_cfg(InfoPage::WaferAuthSecret, Cfg::default()),
            Err(FlashCtrlError::AlreadyLocked)
        );
        // ...owner pages are not.
        assert!(store
            .set_info_perms(InfoPage::BootData0, Perms::READ_WRITE)
            .is_ok());
    }

    #[test]
    fn lockdown_freezes_bank_erase_enable() {
        let mut store = RegionConfigStore::new();
        store.set_bank_erase_enabled(true).unwrap();
        store.lockdown_creator_pages();
        assert_eq!(
            store.set_bank_erase_enabled(false),
            Err(FlashCtrlError::AlreadyLocked)
        );
        assert!(store.bank_erase_enabled());
    }

    #[test]
    fn locked_info_page_still_reads_per_stored_bit() {
        let mut store = RegionConfigStore::new();
        store
            .set_info_perms(InfoPage::AttestationKeySeeds, Perms::READ_WRITE_ERASE)
            .unwrap();
        store.lockdown_creator_pages();

        let effective = store.info_effective_perms(InfoPage::AttestationKeySeeds);
        assert!(effective.read);
        assert!(!effective.write);
        assert!(!effective.erase);
    }
}
