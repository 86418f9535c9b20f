use serde::{Deserialize, Serialize};

/// The fixed catalog of info pages.
///
/// Info pages are purpose-built pages outside the bulk data array. They are
/// not dynamically created; each variant names one physical (bank, page)
/// slot. Pages owned by the silicon-creator boot stage are collectively
/// locked down by `creator_info_pages_lockdown` once that stage is done with
/// them; the remaining pages belong to the owner stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InfoPage {
    /// Device root secret provisioned at manufacture. Creator owned.
    CreatorSecret,
    /// Reserved for future creator use. Creator owned.
    CreatorReserved,
    /// Wafer authentication secret. Creator owned.
    WaferAuthSecret,
    /// Seed material for attestation key derivation. Creator owned.
    AttestationKeySeeds,
    /// Factory identity record. Creator owned.
    FactoryId,
    /// Owner root secret.
    OwnerSecret,
    /// Reserved for future owner use.
    OwnerReserved,
    /// Boot data copy 0.
    BootData0,
    /// Boot data copy 1.
    BootData1,
    /// Owner key slot 0.
    OwnerSlot0,
    /// Owner key slot 1.
    OwnerSlot1,
}

impl InfoPage {
    /// Number of catalogued info pages.
    pub const COUNT: usize = Self::ALL.len();

    /// Every catalogued info page, in dense-index order.
    pub const ALL: [InfoPage; 11] = [
        InfoPage::CreatorSecret,
        InfoPage::CreatorReserved,
        InfoPage::WaferAuthSecret,
        InfoPage::AttestationKeySeeds,
        InfoPage::FactoryId,
        InfoPage::OwnerSecret,
        InfoPage::OwnerReserved,
        InfoPage::BootData0,
        InfoPage::BootData1,
        InfoPage::OwnerSlot0,
        InfoPage::OwnerSlot1,
    ];

    /// The bank holding this page.
    pub fn bank(self) -> usize {
        match self {
            InfoPage::CreatorSecret
            | InfoPage::CreatorReserved
            | InfoPage::WaferAuthSecret
            | InfoPage::AttestationKeySeeds
            | InfoPage::FactoryId => 0,
            InfoPage::OwnerSecret
            | InfoPage::OwnerReserved
            | InfoPage::BootData0
            | InfoPage::BootData1
            | InfoPage::OwnerSlot0
            | InfoPage::OwnerSlot1 => 1,
        }
    }

    /// The page number within its bank's info partition.
    pub fn page(self) -> usize {
        match self {
            InfoPage::CreatorSecret => 0,
            InfoPage::CreatorReserved => 1,
            InfoPage::WaferAuthSecret => 2,
            InfoPage::AttestationKeySeeds => 3,
            InfoPage::FactoryId => 4,
            InfoPage::OwnerSecret => 0,
            InfoPage::OwnerReserved => 1,
            InfoPage::BootData0 => 2,
            InfoPage::BootData1 => 3,
            InfoPage::OwnerSlot0 => 4,
            InfoPage::OwnerSlot1 => 5,
        }
    }

    /// Whether this page belongs to the creator lockdown set.
    pub fn is_creator(self) -> bool {
        self.bank() == 0
    }

    /// Dense index into per-page state tables; equals the page's position
    /// in [`InfoPage::ALL`].
    pub fn index(self) -> usize {
        match self {
            InfoPage::CreatorSecret => 0,
            InfoPage::CreatorReserved => 1,
            InfoPage::WaferAuthSecret => 2,
            InfoPage::AttestationKeySeeds => 3,
            InfoPage::FactoryId => 4,
            InfoPage::OwnerSecret => 5,
            InfoPage::OwnerReserved => 6,
            InfoPage::BootData0 => 7,
            InfoPage::BootData1 => 8,
            InfoPage::OwnerSlot0 => 9,
            InfoPage::OwnerSlot1 => 10,
        }
    }
}
