//! Boot-session flows driven through the `FlashCtrl` surface only, the way
//! firmware layered above the controller uses it.

use flash_ctrl::layout::{Cfg, EraseType, InfoPage, Perms, ERASED_WORD};
use flash_ctrl::{Controller, FlashCtrl, FlashCtrlError, SimArray};
use pretty_assertions::assert_eq;

fn booted_controller() -> Controller<SimArray> {
    let mut ctrl = Controller::new(SimArray::new());
    ctrl.init().expect("power-up self check failed");
    ctrl
}

#[test]
fn locking_a_region_freezes_its_content() {
    let mut ctrl = booted_controller();

    // Region 0 spans pages [0, 4), full capabilities, unlocked.
    ctrl.data_region_protect(0, 0, 4, Perms::READ_WRITE_ERASE, Cfg::default(), false)
        .unwrap();

    let data: Vec<u32> = (0..16).map(|i| 0xa000_0000 | i).collect();
    ctrl.data_write(0, &data).unwrap();

    let mut readback = vec![0u32; 16];
    ctrl.data_read(0, &mut readback).unwrap();
    assert_eq!(readback, data);

    // Same permissions, same configuration, but locked this time.
    ctrl.data_region_protect(0, 0, 4, Perms::READ_WRITE_ERASE, Cfg::default(), true)
        .unwrap();

    // Writes bounce off the locked region...
    let data2: Vec<u32> = vec![0; 16];
    assert!(matches!(
        ctrl.data_write(0, &data2),
        Err(FlashCtrlError::AccessDenied { .. })
    ));
    // ...and the original content is still there.
    ctrl.data_read(0, &mut readback).unwrap();
    assert_eq!(readback, data);

    // The region's stored configuration cannot be replaced either.
    assert_eq!(
        ctrl.data_region_protect(0, 0, 4, Perms::NONE, Cfg::default(), false),
        Err(FlashCtrlError::AlreadyLocked)
    );
}

#[test]
fn creator_stage_provisions_then_locks_down() {
    let mut ctrl = booted_controller();

    // The creator stage provisions its secrets...
    for page in [InfoPage::CreatorSecret, InfoPage::AttestationKeySeeds] {
        ctrl.info_perms_set(page, Perms::READ_WRITE_ERASE).unwrap();
        ctrl.info_erase(page, EraseType::Page).unwrap();
    }
    ctrl.info_write(InfoPage::CreatorSecret, 0, &[0x1d5e_c4e7])
        .unwrap();

    // ...and hands off to the next stage.
    ctrl.creator_info_pages_lockdown();
    // Handing off twice happens on warm-boot paths and must be harmless.
    ctrl.creator_info_pages_lockdown();

    // Creator pages are frozen: no reconfiguration, no mutation.
    assert_eq!(
        ctrl.info_perms_set(InfoPage::CreatorSecret, Perms::READ_WRITE_ERASE),
        Err(FlashCtrlError::AlreadyLocked)
    );
    assert!(matches!(
        ctrl.info_write(InfoPage::CreatorSecret, 0, &[0]),
        Err(FlashCtrlError::AccessDenied { .. })
    ));
    assert!(matches!(
        ctrl.info_erase(InfoPage::CreatorSecret, EraseType::Page),
        Err(FlashCtrlError::AccessDenied { .. })
    ));

    // Reads still follow the stored read bit.
    let mut secret = [0u32; 1];
    ctrl.info_read(InfoPage::CreatorSecret, 0, &mut secret).unwrap();
    assert_eq!(secret, [0x1d5e_c4e7]);

    // The owner stage keeps full control of its own pages.
    ctrl.info_perms_set(InfoPage::BootData0, Perms::READ_WRITE_ERASE)
        .unwrap();
    ctrl.info_write(InfoPage::BootData0, 0, &[1]).unwrap();

    // Nothing in this flow should have latched a fault beyond the denials
    // provoked above.
    let code = ctrl.error_code_get();
    assert!(code.access_denied());
    assert!(code.locked_mutation());
    assert!(!code.hardware_fault());
    assert!(ctrl.error_code_get().is_clear());
}

#[test]
fn bank_erase_is_a_deliberate_two_step() {
    let mut ctrl = booted_controller();
    ctrl.data_region_protect(0, 0, 16, Perms::READ_WRITE_ERASE, Cfg::default(), false)
        .unwrap();
    ctrl.data_write(0, &[0x0bad_cafe]).unwrap();

    // Bank erase is denied until the global enable bit is set.
    assert!(matches!(
        ctrl.data_erase(0, EraseType::Bank),
        Err(FlashCtrlError::AccessDenied { .. })
    ));

    ctrl.bank_erase_perms_set(true).unwrap();
    ctrl.data_erase(0, EraseType::Bank).unwrap();

    let mut word = [0u32; 1];
    ctrl.data_read(0, &mut word).unwrap();
    assert_eq!(word, [ERASED_WORD]);

    // Creator lockdown freezes the enable bit where it stands.
    ctrl.creator_info_pages_lockdown();
    assert_eq!(
        ctrl.bank_erase_perms_set(false),
        Err(FlashCtrlError::AlreadyLocked)
    );
}
