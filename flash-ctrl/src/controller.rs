use flash_ctrl_layout::{
    Access, Cfg, EraseType, InfoPage, Partition, Perms, PAGES_PER_BANK,
};

use crate::array::FlashArray;
use crate::error::FlashCtrlError;
use crate::gate;
use crate::status::{ErrorCode, StatusWord};
use crate::store::RegionConfigStore;
use crate::verify;

/// The stable flash-controller operation surface.
///
/// Boot firmware is written against this trait, never against a concrete
/// controller, so a deterministic [`Controller`] over
/// [`SimArray`](crate::SimArray) can stand in for the hardware-backed
/// variant in unit tests. Every call is synchronous and runs to completion;
/// there is no completion callback and no partial result.
///
/// Buffers are word slices; their length is the word count of the request.
pub trait FlashCtrl {
    /// Brings the controller up. Must be called once per boot session
    /// before any other operation.
    fn init(&mut self) -> Result<(), FlashCtrlError>;

    /// Non-destructive read of the live status word.
    fn status_get(&self) -> StatusWord;

    /// Returns the accumulated fault bitfield and clears it. The next call
    /// returns zero unless a new fault occurred in between.
    fn error_code_get(&mut self) -> ErrorCode;

    /// Reads `data.len()` words from the data partition at byte address
    /// `addr`.
    fn data_read(&mut self, addr: u32, data: &mut [u32]) -> Result<(), FlashCtrlError>;

    /// Reads `data.len()` words from an info page starting at byte offset
    /// `offset`.
    fn info_read(
        &mut self,
        page: InfoPage,
        offset: u32,
        data: &mut [u32],
    ) -> Result<(), FlashCtrlError>;

    /// Programs `data.len()` words into the data partition at byte address
    /// `addr`.
    fn data_write(&mut self, addr: u32, data: &[u32]) -> Result<(), FlashCtrlError>;

    /// Programs `data.len()` words into an info page starting at byte
    /// offset `offset`.
    fn info_write(
        &mut self,
        page: InfoPage,
        offset: u32,
        data: &[u32],
    ) -> Result<(), FlashCtrlError>;

    /// Erases the page or bank containing byte address `addr`, then
    /// verifies the span reads back erased.
    fn data_erase(&mut self, addr: u32, erase_type: EraseType) -> Result<(), FlashCtrlError>;

    /// Verifies that the page or bank containing `addr` reads back fully
    /// erased, without erasing anything. Gated by the read capability.
    fn data_erase_verify(
        &mut self,
        addr: u32,
        erase_type: EraseType,
    ) -> Result<(), FlashCtrlError>;

    /// Erases an info page, or the whole info partition of its bank, then
    /// verifies the span reads back erased.
    fn info_erase(&mut self, page: InfoPage, erase_type: EraseType)
        -> Result<(), FlashCtrlError>;

    /// Replaces the default capabilities for data pages outside every
    /// region.
    fn data_default_perms_set(&mut self, perms: Perms);

    /// The default capabilities for data pages outside every region.
    fn data_default_perms_get(&self) -> Perms;

    /// Replaces the default configuration for data pages outside every
    /// region.
    fn data_default_cfg_set(&mut self, cfg: Cfg);

    /// The default configuration for data pages outside every region.
    fn data_default_cfg_get(&self) -> Cfg;

    /// Replaces an info page's capabilities. Fails with
    /// [`FlashCtrlError::AlreadyLocked`] once the page is locked down.
    fn info_perms_set(&mut self, page: InfoPage, perms: Perms) -> Result<(), FlashCtrlError>;

    /// An info page's stored capabilities.
    fn info_perms_get(&self, page: InfoPage) -> Perms;

    /// Replaces an info page's configuration. Fails with
    /// [`FlashCtrlError::AlreadyLocked`] once the page is locked down.
    fn info_cfg_set(&mut self, page: InfoPage, cfg: Cfg) -> Result<(), FlashCtrlError>;

    /// An info page's stored configuration.
    fn info_cfg_get(&self, page: InfoPage) -> Cfg;

    /// Declares data region `region` as pages `[page_offset, page_offset +
    /// num_pages)` with the given capabilities and configuration,
    /// optionally locking it in the same call. Redeclaring a locked region
    /// fails with [`FlashCtrlError::AlreadyLocked`].
    fn data_region_protect(
        &mut self,
        region: u32,
        page_offset: u32,
        num_pages: u32,
        perms: Perms,
        cfg: Cfg,
        lock: bool,
    ) -> Result<(), FlashCtrlError>;

    /// Sets the global bank-erase enable bit. Fails with
    /// [`FlashCtrlError::AlreadyLocked`] after creator lockdown.
    fn bank_erase_perms_set(&mut self, enable: bool) -> Result<(), FlashCtrlError>;

    /// Writes the execute-enable word. Execution from flash is allowed
    /// only while it holds [`EXEC_ENABLE`](flash_ctrl_layout::EXEC_ENABLE);
    /// the bit is independent of read/write/erase capabilities.
    fn exec_set(&mut self, exec_val: u32);

    /// Irreversibly locks every creator info page and freezes the
    /// bank-erase enable bit for the rest of the boot session. Idempotent;
    /// a second call is a no-op success.
    fn creator_info_pages_lockdown(&mut self);
}

/// Flash controller bound to a concrete array.
///
/// The context object of a boot session: all permission, configuration,
/// lock and fault state lives here and is passed to every operation, so a
/// test constructs an isolated controller instead of sharing a global.
#[derive(Debug)]
pub struct Controller<A: FlashArray> {
    array: A,
    store: RegionConfigStore,
    latched: ErrorCode,
    init_done: bool,
}

impl<A: FlashArray> Controller<A> {
    /// Creates a controller in its reset state, owning `array`.
    pub fn new(array: A) -> Self {
        Controller {
            array,
            store: RegionConfigStore::new(),
            latched: ErrorCode::from(0),
            init_done: false,
        }
    }

    /// The underlying array.
    pub fn array(&self) -> &A {
        &self.array
    }

    /// The underlying array, mutably. Test scaffolding for fault injection
    /// and direct cell inspection.
    pub fn array_mut(&mut self) -> &mut A {
        &mut self.array
    }

    /// The permission/configuration store, for inspection.
    pub fn store(&self) -> &RegionConfigStore {
        &self.store
    }

    /// Consumes the controller and returns the array.
    pub fn into_array(self) -> A {
        self.array
    }

    fn latch<T>(&mut self, result: Result<T, FlashCtrlError>) -> Result<T, FlashCtrlError> {
        if let Err(err) = &result {
            tracing::warn!("flash operation failed: {err}");
            self.latched.latch(err);
        }
        result
    }

    fn data_read_inner(&mut self, addr: u32, data: &mut [u32]) -> Result<(), FlashCtrlError> {
        let span = gate::resolve_data_span(addr, data.len())?;
        if span.is_empty() {
            return Ok(());
        }
        gate::check_data_access(&self.store, &span, Access::Read)?;
        tracing::trace!("reading {} words at {addr:#010x}", data.len());
        self.array
            .data_read(span.words.start, data)
            .map_err(FlashCtrlError::Hardware)
    }

    fn data_write_inner(&mut self, addr: u32, data: &[u32]) -> Result<(), FlashCtrlError> {
        let span = gate::resolve_data_span(addr, data.len())?;
        if span.is_empty() {
            return Ok(());
        }
        gate::check_data_access(&self.store, &span, Access::Write)?;
        tracing::trace!("programming {} words at {addr:#010x}", data.len());
        self.array
            .data_program(span.words.start, data)
            .map_err(FlashCtrlError::Hardware)
    }

    fn data_erase_inner(
        &mut self,
        addr: u32,
        erase_type: EraseType,
    ) -> Result<(), FlashCtrlError> {
        match erase_type {
            EraseType::Page => {
                let page = gate::resolve_data_page(addr)?;
                gate::check_data_page_access(&self.store, page, Access::Erase)?;
                tracing::debug!("erasing data page {page}");
                self.array
                    .data_erase_page(page)
                    .map_err(FlashCtrlError::Hardware)?;
                verify::data_pages(&mut self.array, page, 1)
            }
            EraseType::Bank => {
                let bank = gate::resolve_data_bank(addr)?;
                gate::check_bank_erase(&self.store, bank, Partition::Data)?;
                tracing::debug!("erasing data bank {bank}");
                self.array
                    .data_erase_bank(bank)
                    .map_err(FlashCtrlError::Hardware)?;
                verify::data_pages(&mut self.array, bank * PAGES_PER_BANK, PAGES_PER_BANK)
            }
        }
    }

    fn data_erase_verify_inner(
        &mut self,
        addr: u32,
        erase_type: EraseType,
    ) -> Result<(), FlashCtrlError> {
        let (first_page, page_count) = match erase_type {
            EraseType::Page => (gate::resolve_data_page(addr)?, 1),
            EraseType::Bank => {
                let bank = gate::resolve_data_bank(addr)?;
                (bank * PAGES_PER_BANK, PAGES_PER_BANK)
            }
        };
        for page in first_page..first_page + page_count {
            gate::check_data_page_access(&self.store, page, Access::Read)?;
        }
        verify::data_pages(&mut self.array, first_page, page_count)
    }

    fn info_read_inner(
        &mut self,
        page: InfoPage,
        offset: u32,
        data: &mut [u32],
    ) -> Result<(), FlashCtrlError> {
        let words = gate::resolve_info_span(offset, data.len())?;
        if words.is_empty() {
            return Ok(());
        }
        gate::check_info_access(&self.store, page, Access::Read)?;
        self.array
            .info_read(page, words.start, data)
            .map_err(FlashCtrlError::Hardware)
    }

    fn info_write_inner(
        &mut self,
        page: InfoPage,
        offset: u32,
        data: &[u32],
    ) -> Result<(), FlashCtrlError> {
        let words = gate::resolve_info_span(offset, data.len())?;
        if words.is_empty() {
            return Ok(());
        }
        gate::check_info_access(&self.store, page, Access::Write)?;
        self.array
            .info_program(page, words.start, data)
            .map_err(FlashCtrlError::Hardware)
    }

    fn info_erase_inner(
        &mut self,
        page: InfoPage,
        erase_type: EraseType,
    ) -> Result<(), FlashCtrlError> {
        match erase_type {
            EraseType::Page => {
                gate::check_info_access(&self.store, page, Access::Erase)?;
                tracing::debug!("erasing info page {page:?}");
                self.array
                    .info_erase_page(page)
                    .map_err(FlashCtrlError::Hardware)?;
                verify::info_page(&mut self.array, page)
            }
            EraseType::Bank => {
                let bank = page.bank();
                gate::check_bank_erase(&self.store, bank, Partition::Info)?;
                tracing::debug!("erasing info partition of bank {bank}");
                self.array
                    .info_erase_bank(bank)
                    .map_err(FlashCtrlError::Hardware)?;
                verify::info_bank(&mut self.array, bank)
            }
        }
    }
}

impl<A: FlashArray> FlashCtrl for Controller<A> {
    fn init(&mut self) -> Result<(), FlashCtrlError> {
        tracing::debug!("initializing flash controller");
        let result = self
            .array
            .power_up()
            .map_err(FlashCtrlError::Hardware);
        let result = self.latch(result);
        if result.is_ok() {
            self.init_done = true;
        }
        result
    }

    fn status_get(&self) -> StatusWord {
        let mut status = StatusWord::from(0);
        status.set_rd_empty(true);
        status.set_prog_empty(true);
        status.set_init_done(self.init_done);
        status.set_error(!self.latched.is_clear());
        status
    }

    fn error_code_get(&mut self) -> ErrorCode {
        let code = self.latched;
        self.latched = ErrorCode::from(0);
        code
    }

    fn data_read(&mut self, addr: u32, data: &mut [u32]) -> Result<(), FlashCtrlError> {
        let result = self.data_read_inner(addr, data);
        self.latch(result)
    }

    fn info_read(
        &mut self,
        page: InfoPage,
        offset: u32,
        data: &mut [u32],
    ) -> Result<(), FlashCtrlError> {
        let result = self.info_read_inner(page, offset, data);
        self.latch(result)
    }

    fn data_write(&mut self, addr: u32, data: &[u32]) -> Result<(), FlashCtrlError> {
        let result = self.data_write_inner(addr, data);
        self.latch(result)
    }

    fn info_write(
        &mut self,
        page: InfoPage,
        offset: u32,
        data: &[u32],
    ) -> Result<(), FlashCtrlError> {
        let result = self.info_write_inner(page, offset, data);
        self.latch(result)
    }

    fn data_erase(&mut self, addr: u32, erase_type: EraseType) -> Result<(), FlashCtrlError> {
        let result = self.data_erase_inner(addr, erase_type);
        self.latch(result)
    }

    fn data_erase_verify(
        &mut self,
        addr: u32,
        erase_type: EraseType,
    ) -> Result<(), FlashCtrlError> {
        let result = self.data_erase_verify_inner(addr, erase_type);
        self.latch(result)
    }

    fn info_erase(
        &mut self,
        page: InfoPage,
        erase_type: EraseType,
    ) -> Result<(), FlashCtrlError> {
        let result = self.info_erase_inner(page, erase_type);
        self.latch(result)
    }

    fn data_default_perms_set(&mut self, perms: Perms) {
        self.store.set_default_perms(perms);
    }

    fn data_default_perms_get(&self) -> Perms {
        self.store.default_perms()
    }

    fn data_default_cfg_set(&mut self, cfg: Cfg) {
        self.store.set_default_cfg(cfg);
    }

    fn data_default_cfg_get(&self) -> Cfg {
        self.store.default_cfg()
    }

    fn info_perms_set(&mut self, page: InfoPage, perms: Perms) -> Result<(), FlashCtrlError> {
        let result = self.store.set_info_perms(page, perms);
        self.latch(result)
    }

    fn info_perms_get(&self, page: InfoPage) -> Perms {
        self.store.info_perms(page)
    }

    fn info_cfg_set(&mut self, page: InfoPage, cfg: Cfg) -> Result<(), FlashCtrlError> {
        let result = self.store.set_info_cfg(page, cfg);
        self.latch(result)
    }

    fn info_cfg_get(&self, page: InfoPage) -> Cfg {
        self.store.info_cfg(page)
    }

    fn data_region_protect(
        &mut self,
        region: u32,
        page_offset: u32,
        num_pages: u32,
        perms: Perms,
        cfg: Cfg,
        lock: bool,
    ) -> Result<(), FlashCtrlError> {
        let result = self
            .store
            .protect_region(region, page_offset, num_pages, perms, cfg, lock);
        self.latch(result)
    }

    fn bank_erase_perms_set(&mut self, enable: bool) -> Result<(), FlashCtrlError> {
        let result = self.store.set_bank_erase_enabled(enable);
        self.latch(result)
    }

    fn exec_set(&mut self, exec_val: u32) {
        self.store.set_exec(exec_val);
    }

    fn creator_info_pages_lockdown(&mut self) {
        self.store.lockdown_creator_pages();
    }
}
