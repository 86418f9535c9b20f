use serde::{Deserialize, Serialize};

/// The capability a flash operation needs from its target region or page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Read words out of the array.
    Read,
    /// Program words into the array.
    Write,
    /// Erase a page or bank.
    Erase,
}

/// Capability set attached to a data region or info page.
///
/// A process-wide default exists for the data partition; regions and info
/// pages override it. Everything starts denied at reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Perms {
    /// Read capability.
    pub read: bool,
    /// Program capability.
    pub write: bool,
    /// Erase capability.
    pub erase: bool,
}

impl Perms {
    /// No capabilities. The reset value of every permission slot.
    pub const NONE: Perms = Perms {
        read: false,
        write: false,
        erase: false,
    };

    /// Read capability only.
    pub const READ_ONLY: Perms = Perms {
        read: true,
        write: false,
        erase: false,
    };

    /// Read and program capabilities.
    pub const READ_WRITE: Perms = Perms {
        read: true,
        write: true,
        erase: false,
    };

    /// All capabilities.
    pub const READ_WRITE_ERASE: Perms = Perms {
        read: true,
        write: true,
        erase: true,
    };

    /// Returns whether this set grants the given capability.
    pub fn grants(&self, access: Access) -> bool {
        match access {
            Access::Read => self.read,
            Access::Write => self.write,
            Access::Erase => self.erase,
        }
    }
}

/// Configuration flags attached to a data region or info page.
///
/// These select how the macro treats the cells; the controller only stores
/// and resolves them, the array applies them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cfg {
    /// Address and data scrambling.
    pub scrambling: bool,
    /// ECC on reads.
    pub ecc: bool,
    /// High-endurance cell mode.
    pub high_endurance: bool,
}
