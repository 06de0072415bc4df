// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register map of the Everest QDMA soft IP.
//!
//! Same global map as the soft IP for the blocks that did not move; the
//! additions are the second RAM ECC aggregator pair, the relocated VF
//! identity registers, and the relocated mailbox bases.

use super::soft::{self, reg};
use super::{BitfieldInfo, Mode, ReadType, RegInfo};

// Second RAM ECC aggregator pair, EQDMA only.
pub const RAM_SBE_1_MSK: u32 = 0xE0;
pub const RAM_SBE_1_STS: u32 = 0xE4;
pub const RAM_DBE_1_MSK: u32 = 0xE8;
pub const RAM_DBE_1_STS: u32 = 0xEC;

// VF identity registers moved out of the soft map.
pub const VF_VERSION: u32 = 0x5014;
pub const VF_USER_BAR_ID: u32 = 0x5018;

// Mailbox block bases.
pub const MBOX_BASE_VF: u32 = 0x5000;
pub const MBOX_BASE_PF: u32 = 0x22400;

const BF_NONE: &[BitfieldInfo] = &[];

use ReadType::PfOnly;

/// EQDMA additions on top of the shared soft map.
const EQDMA_ONLY_REGS: &[RegInfo] = &[
    reg!("RAM_SBE_MSK_1_A", RAM_SBE_1_MSK, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("RAM_SBE_STS_1_A", RAM_SBE_1_STS, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("RAM_DBE_MSK_1_A", RAM_DBE_1_MSK, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("RAM_DBE_STS_1_A", RAM_DBE_1_STS, 1, Mode::ANY, false, PfOnly, BF_NONE),
];

// Rather than maintaining a second copy of the whole table, the EQDMA
// table is the shared map with the additions appended. `concat` of
// statics is not expressible, so the combined table is built here once.
const fn combined<const N: usize>() -> [RegInfo; N] {
    let mut out = [soft::CONFIG_REGS[0]; N];
    let mut i = 0;
    while i < soft::CONFIG_REGS.len() {
        out[i] = soft::CONFIG_REGS[i];
        i += 1;
    }
    let mut j = 0;
    while j < EQDMA_ONLY_REGS.len() {
        out[i + j] = EQDMA_ONLY_REGS[j];
        j += 1;
    }
    out
}

static COMBINED: [RegInfo; soft::CONFIG_REGS.len() + EQDMA_ONLY_REGS.len()] =
    combined();

pub static CONFIG_REGS: &[RegInfo] = &COMBINED;
