// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register map tables.
//!
//! One table per IP variant, each entry naming a config-space register,
//! how many consecutive copies it has, which engine modes make it
//! meaningful, and its bit-field breakdown for the dump path. Registers
//! whose `mode` the device does not advertise are skipped on dump, as are
//! debug registers on devices without debug mode and PF-only registers
//! when dumping on a VF.

pub mod eqdma;
pub mod s80;
pub mod soft;

use bitflags::bitflags;
use drv_qdma_api::{DeviceAttributes, IpVariant};

bitflags! {
    /// Engine modes gating a register's presence.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Mode: u8 {
        const MM = 1 << 0;
        const ST = 1 << 1;
        const MM_CMPT = 1 << 2;
        const MAILBOX = 1 << 3;
    }
}

impl Mode {
    pub const ANY: Mode = Mode::all();

    /// Whether a register gated on `self` exists on a device with the
    /// given capabilities: any one advertised mode is enough.
    pub fn present_on(&self, cap: &DeviceAttributes) -> bool {
        (self.contains(Mode::MM) && cap.mm_en)
            || (self.contains(Mode::ST) && cap.st_en)
            || (self.contains(Mode::MM_CMPT) && cap.mm_cmpt_en)
            || (self.contains(Mode::MAILBOX) && cap.mailbox_en)
    }
}

/// Who may read a register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadType {
    PfAndVf,
    PfOnly,
}

/// One named bit-field of a register. `mask` is a contiguous bit range.
#[derive(Copy, Clone, Debug)]
pub struct BitfieldInfo {
    pub name: &'static str,
    pub mask: u32,
}

/// One config-space register.
#[derive(Copy, Clone, Debug)]
pub struct RegInfo {
    pub name: &'static str,
    pub addr: u32,
    /// Consecutive 32-bit copies (arrays like the CSR tables).
    pub repeat: u16,
    pub mode: Mode,
    pub is_debug: bool,
    pub read_type: ReadType,
    pub bitfields: &'static [BitfieldInfo],
}

/// The config register table for an IP variant.
pub fn config_regs(variant: IpVariant) -> &'static [RegInfo] {
    match variant {
        IpVariant::SoftQdma => soft::CONFIG_REGS,
        IpVariant::HardS80Qdma => s80::CONFIG_REGS,
        IpVariant::EqdmaSoft => eqdma::CONFIG_REGS,
    }
}

/// PF-side mailbox block base for a variant.
pub fn mbox_base_pf(variant: IpVariant) -> u32 {
    match variant {
        IpVariant::EqdmaSoft => eqdma::MBOX_BASE_PF,
        _ => soft::MBOX_BASE_PF,
    }
}

/// VF-side mailbox block base for a variant.
pub fn mbox_base_vf(variant: IpVariant) -> u32 {
    match variant {
        IpVariant::EqdmaSoft => eqdma::MBOX_BASE_VF,
        _ => soft::MBOX_BASE_VF,
    }
}

/// VF version register for a variant.
pub fn vf_version_reg(variant: IpVariant) -> u32 {
    match variant {
        IpVariant::EqdmaSoft => eqdma::VF_VERSION,
        _ => soft::VF_VERSION,
    }
}

/// VF user-BAR identity register for a variant.
pub fn vf_user_bar_reg(variant: IpVariant) -> u32 {
    match variant {
        IpVariant::EqdmaSoft => eqdma::VF_USER_BAR_ID,
        _ => soft::VF_USER_BAR_ID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_gating() {
        let mut cap = DeviceAttributes::default();
        cap.mm_en = true;

        assert!(Mode::MM.present_on(&cap));
        assert!(!Mode::ST.present_on(&cap));
        // A register valid in several modes is present if any one is.
        assert!((Mode::MM | Mode::ST).present_on(&cap));
        assert!(!(Mode::ST | Mode::MAILBOX).present_on(&cap));
    }

    #[test]
    fn tables_have_unique_addresses() {
        for variant in [
            IpVariant::SoftQdma,
            IpVariant::HardS80Qdma,
            IpVariant::EqdmaSoft,
        ] {
            let regs = config_regs(variant);
            for (i, a) in regs.iter().enumerate() {
                assert!(a.repeat >= 1, "{} repeat", a.name);
                for b in &regs[i + 1..] {
                    assert_ne!(
                        a.addr, b.addr,
                        "{:?}: {} and {} share an address",
                        variant, a.name, b.name
                    );
                }
            }
        }
    }

    #[test]
    fn bitfield_masks_are_contiguous() {
        for variant in [
            IpVariant::SoftQdma,
            IpVariant::HardS80Qdma,
            IpVariant::EqdmaSoft,
        ] {
            for reg in config_regs(variant) {
                for bf in reg.bitfields {
                    let m = bf.mask;
                    assert!(m != 0, "{}.{}", reg.name, bf.name);
                    let shifted = m >> m.trailing_zeros();
                    assert!(
                        shifted & (shifted + 1) == 0,
                        "{}.{} mask not contiguous",
                        reg.name,
                        bf.name
                    );
                }
            }
        }
    }
}
