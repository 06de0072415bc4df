// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register map of the Everest S80 hardened QDMA block.
//!
//! The hardened block predates the soft IP's window growth: the indirect
//! context window is only 4 data words and sits at different offsets.
//! The global/error/CSR blocks match the soft map.

use super::soft::{self, reg};
use super::{Mode, ReadType, RegInfo};
use drv_qdma_api::genmask;

/// Indirect window: data matches the soft map, mask and command moved.
pub const IND_CTXT_DATA: u32 = 0x804;
pub const IND_CTXT_MASK: u32 = 0x814;
pub const IND_CTXT_CMD: u32 = 0x824;

/// The hardened window carries 4 data words.
pub const IND_CTXT_DATA_NUM_REGS: usize = 4;

// Context field placements that differ from the soft IP.
pub const SW_CTXT_W1_FUNC_ID_MASK: u32 = genmask(11, 4);
pub const FMAP_CTXT_W0_QID_MAX_MASK: u32 = genmask(22, 11);

const BF_NONE: &[super::BitfieldInfo] = &[];

use ReadType::PfAndVf;

// The hardened block's dumpable set is the shared map; only the window
// registers differ and those are write-mostly, listed for completeness.
const S80_ONLY_REGS: &[RegInfo] = &[
    reg!("IND_CTXT_MASK", IND_CTXT_MASK, 4, Mode::ANY, true, PfAndVf, BF_NONE),
    reg!("IND_CTXT_CMD", IND_CTXT_CMD, 1, Mode::ANY, true, PfAndVf, BF_NONE),
];

const fn combined<const N: usize>() -> [RegInfo; N] {
    let mut out = [soft::CONFIG_REGS[0]; N];
    let mut i = 0;
    while i < soft::CONFIG_REGS.len() {
        out[i] = soft::CONFIG_REGS[i];
        i += 1;
    }
    let mut j = 0;
    while j < S80_ONLY_REGS.len() {
        out[i + j] = S80_ONLY_REGS[j];
        j += 1;
    }
    out
}

static COMBINED: [RegInfo; soft::CONFIG_REGS.len() + S80_ONLY_REGS.len()] =
    combined();

pub static CONFIG_REGS: &[RegInfo] = &COMBINED;
