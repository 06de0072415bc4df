// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register map of the programmable-logic (soft) QDMA IP.
//!
//! The other variants share most of this map; `eqdma` and `s80` re-export
//! what is identical and override what moved.

use super::{BitfieldInfo, Mode, ReadType, RegInfo};
use drv_qdma_api::{bit, genmask};

/// Value of `CONFIG_BLOCK_ID[31:16]` on every QDMA config BAR.
pub const CONFIG_BLOCK_MAGIC: u32 = 0x1FD3;

pub const CONFIG_BLOCK_ID: u32 = 0x0;
pub const CONFIG_BLOCK_ID_MASK: u32 = genmask(31, 16);

// QDMA_TRQ_SEL_GLBL2 (0x100)
pub const GLBL2_ID: u32 = 0x100;
pub const GLBL2_PF_BARLITE_INT: u32 = 0x104;
pub const GLBL2_PF3_BAR_MAP_MASK: u32 = genmask(23, 18);
pub const GLBL2_PF2_BAR_MAP_MASK: u32 = genmask(17, 12);
pub const GLBL2_PF1_BAR_MAP_MASK: u32 = genmask(11, 6);
pub const GLBL2_PF0_BAR_MAP_MASK: u32 = genmask(5, 0);
pub const GLBL2_PF_VF_BARLITE_INT: u32 = 0x108;
pub const GLBL2_PF_BARLITE_EXT: u32 = 0x10C;
pub const GLBL2_PF_VF_BARLITE_EXT: u32 = 0x110;
pub const GLBL2_CHANNEL_INST: u32 = 0x114;
pub const GLBL2_CHANNEL_MDMA: u32 = 0x118;
pub const GLBL2_ST_C2H_MASK: u32 = bit(17);
pub const GLBL2_ST_H2C_MASK: u32 = bit(16);
pub const GLBL2_MM_C2H_MASK: u32 = bit(8);
pub const GLBL2_MM_H2C_MASK: u32 = bit(0);
pub const GLBL2_CHANNEL_STRM: u32 = 0x11C;
pub const GLBL2_CHANNEL_QDMA_CAP: u32 = 0x120;
pub const GLBL2_MULTQ_MAX_MASK: u32 = genmask(11, 0);
pub const GLBL2_CHANNEL_FUNC_RET: u32 = 0x12C;
pub const GLBL2_SYSTEM_ID: u32 = 0x130;
pub const GLBL2_MISC_CAP: u32 = 0x134;

// GLBL2_MISC_CAP capability fields.
pub const GLBL2_MAILBOX_EN_MASK: u32 = bit(0);
pub const GLBL2_FLR_PRESENT_MASK: u32 = bit(1);
pub const GLBL2_DESC_ENG_MODE_MASK: u32 = genmask(3, 2);
pub const GLBL2_DBG_MODE_MASK: u32 = bit(4);

// GLBL2_MISC_CAP version fields (PF view).
pub const GLBL2_DEVICE_ID_MASK: u32 = genmask(31, 28);
pub const GLBL2_VIVADO_RELEASE_MASK: u32 = genmask(27, 24);
pub const GLBL2_IP_TYPE_MASK: u32 = genmask(23, 20);
pub const GLBL2_RTL_VERSION_MASK: u32 = genmask(19, 16);

// QDMA_TRQ_SEL_GLBL (0x200)
pub const GLBL_RNG_SZ: u32 = 0x204;
pub const GLBL_SCRATCH: u32 = 0x244;
pub const GLBL_ERR_STAT: u32 = 0x248;
pub const GLBL_ERR_MASK: u32 = 0x24C;
pub const GLBL_DSC_CFG: u32 = 0x250;
pub const GLBL_DSC_CFG_WB_ACC_INT_MASK: u32 = genmask(2, 0);
pub const GLBL_DSC_CFG_MAX_DSC_FETCH_MASK: u32 = genmask(5, 3);
pub const GLBL_DSC_ERR_STS: u32 = 0x254;
pub const GLBL_DSC_ERR_MSK: u32 = 0x258;
pub const GLBL_DSC_ERR_LOG0: u32 = 0x25C;
pub const GLBL_DSC_ERR_LOG1: u32 = 0x260;
pub const GLBL_TRQ_ERR_STS: u32 = 0x264;
pub const GLBL_TRQ_ERR_MSK: u32 = 0x268;
pub const GLBL_TRQ_ERR_LOG: u32 = 0x26C;
pub const GLBL_DSC_DBG_DAT0: u32 = 0x270;
pub const GLBL_DSC_DBG_DAT1: u32 = 0x274;
pub const GLBL_DSC_ERR_LOG2: u32 = 0x27C;
pub const GLBL_INTERRUPT_CFG: u32 = 0x2C4;

// RAM ECC aggregators.
pub const RAM_SBE_MSK: u32 = 0xF0;
pub const RAM_SBE_STS: u32 = 0xF4;
pub const RAM_DBE_MSK: u32 = 0xF8;
pub const RAM_DBE_STS: u32 = 0xFC;

// Indirect context window (QDMA_TRQ_SEL_IND, 0x800).
pub const IND_CTXT_DATA: u32 = 0x804;
pub const IND_CTXT_MASK: u32 = 0x824;
pub const IND_CTXT_CMD: u32 = 0x844;

// QDMA_TRQ_SEL_C2H (0xA00)
pub const C2H_TIMER_CNT: u32 = 0xA00;
pub const C2H_CNT_TH: u32 = 0xA40;
pub const C2H_STAT_S_AXIS_C2H_ACCEPTED: u32 = 0xA88;
pub const C2H_STAT_S_AXIS_CMPT_ACCEPTED: u32 = 0xA8C;
pub const C2H_STAT_DESC_RSP_PKT_ACCEPTED: u32 = 0xA90;
pub const C2H_STAT_AXIS_PKG_CMP: u32 = 0xA94;
pub const C2H_BUF_SZ: u32 = 0xAB0;
pub const C2H_ERR_STAT: u32 = 0xAF0;
pub const C2H_ERR_MASK: u32 = 0xAF4;
pub const C2H_FATAL_ERR_STAT: u32 = 0xAF8;
pub const C2H_FATAL_ERR_MASK: u32 = 0xAFC;
pub const C2H_FATAL_ERR_ENABLE: u32 = 0xB00;
pub const C2H_ERR_INT: u32 = 0xB04;
pub const C2H_PFETCH_CFG: u32 = 0xB08;
pub const C2H_INT_TIMER_TICK: u32 = 0xB0C;
pub const C2H_STAT_DESC_RSP_DROP_ACCEPTED: u32 = 0xB10;
pub const C2H_STAT_DESC_RSP_ERR_ACCEPTED: u32 = 0xB14;
pub const C2H_STAT_DESC_REQ: u32 = 0xB18;
pub const C2H_STAT_DBG_DMA_ENG_0: u32 = 0xB1C;
pub const C2H_STAT_DBG_DMA_ENG_1: u32 = 0xB20;
pub const C2H_STAT_DBG_DMA_ENG_2: u32 = 0xB24;
pub const C2H_STAT_DBG_DMA_ENG_3: u32 = 0xB28;
pub const C2H_DBG_PFCH_ERR_CTXT: u32 = 0xB2C;
pub const C2H_FIRST_ERR_QID: u32 = 0xB30;
pub const C2H_WRB_COAL_CFG: u32 = 0xB50;
pub const C2H_PFETCH_CACHE_DEPTH: u32 = 0xBE0;
pub const C2H_CMPT_COAL_BUF_DEPTH: u32 = 0xBE4;

// C2H_PFETCH_CFG fields.
pub const C2H_EVT_QCNT_TH_MASK: u32 = genmask(31, 25);
pub const C2H_PFCH_QCNT_MASK: u32 = genmask(24, 18);
pub const C2H_NUM_PFCH_MASK: u32 = genmask(17, 9);
pub const C2H_PFCH_FL_TH_MASK: u32 = genmask(8, 0);

// C2H_WRB_COAL_CFG fields.
pub const C2H_MAX_BUF_SZ_MASK: u32 = genmask(31, 26);
pub const C2H_TICK_VAL_MASK: u32 = genmask(25, 14);
pub const C2H_TICK_CNT_MASK: u32 = genmask(13, 2);

// QDMA_TRQ_SEL_H2C (0xE00)
pub const H2C_ERR_STAT: u32 = 0xE00;
pub const H2C_ERR_MASK: u32 = 0xE04;
pub const H2C_FIRST_ERR_QID: u32 = 0xE08;
pub const H2C_DBG_REG0: u32 = 0xE0C;
pub const H2C_DBG_REG1: u32 = 0xE10;
pub const H2C_DBG_REG2: u32 = 0xE14;
pub const H2C_DBG_REG3: u32 = 0xE18;
pub const H2C_DBG_REG4: u32 = 0xE1C;
pub const H2C_FATAL_ERR_EN: u32 = 0xE20;
pub const H2C_REQ_THROT: u32 = 0xE24;

// H2C_REQ_THROT fields.
pub const H2C_REQ_THROT_EN_REQ_MASK: u32 = bit(31);
pub const H2C_REQ_THRESH_MASK: u32 = genmask(25, 17);
pub const H2C_REQ_THROT_EN_DATA_MASK: u32 = bit(16);
pub const H2C_DATA_THRESH_MASK: u32 = genmask(15, 0);

// MM engine control (one copy per channel).
pub const C2H_MM_CONTROL: u32 = 0x1004;
pub const C2H_MM_STATUS: u32 = 0x1040;
pub const C2H_MM_COMPLETED_DESC_COUNT: u32 = 0x1048;
pub const C2H_MM_ERR_CODE_EN_MASK: u32 = 0x1054;
pub const C2H_MM_ERR_CODE: u32 = 0x1058;
pub const C2H_MM_ERR_INFO: u32 = 0x105C;
pub const H2C_MM_CONTROL: u32 = 0x1204;
pub const H2C_MM_STATUS: u32 = 0x1240;
pub const H2C_MM_COMPLETED_DESC_COUNT: u32 = 0x1248;
pub const H2C_MM_ERR_CODE_EN_MASK: u32 = 0x1254;
pub const H2C_MM_ERR_CODE: u32 = 0x1258;
pub const H2C_MM_ERR_INFO: u32 = 0x125C;
pub const MM_CONTROL_RUN_MASK: u32 = bit(0);

// Queue pointer update space.
pub const DMAP_SEL_INT_CIDX: u32 = 0x18000;
pub const DMAP_SEL_H2C_DSC_PIDX: u32 = 0x18004;
pub const DMAP_SEL_C2H_DSC_PIDX: u32 = 0x18008;
pub const DMAP_SEL_CMPT_CIDX: u32 = 0x1800C;
pub const VF_DMAP_SEL_INT_CIDX: u32 = 0x3000;
pub const VF_DMAP_SEL_H2C_DSC_PIDX: u32 = 0x3004;
pub const VF_DMAP_SEL_C2H_DSC_PIDX: u32 = 0x3008;
pub const VF_DMAP_SEL_CMPT_CIDX: u32 = 0x300C;

// VF identity registers.
pub const VF_VERSION: u32 = 0x1014;
pub const VF_USER_BAR_ID: u32 = 0x1018;
pub const PF_VERSION: u32 = 0x2414;

// VF version register fields.
pub const VF_DEVICE_ID_MASK: u32 = genmask(15, 12);
pub const VF_VIVADO_RELEASE_MASK: u32 = genmask(11, 8);
pub const VF_IP_TYPE_MASK: u32 = genmask(7, 4);
pub const VF_RTL_VERSION_MASK: u32 = genmask(3, 0);

// Mailbox block bases.
pub const MBOX_BASE_VF: u32 = 0x1000;
pub const MBOX_BASE_PF: u32 = 0x2400;

const BF_GLBL2_MISC_CAP: &[BitfieldInfo] = &[
    BitfieldInfo { name: "device_id", mask: GLBL2_DEVICE_ID_MASK },
    BitfieldInfo { name: "vivado_release", mask: GLBL2_VIVADO_RELEASE_MASK },
    BitfieldInfo { name: "ip_type", mask: GLBL2_IP_TYPE_MASK },
    BitfieldInfo { name: "rtl_version", mask: GLBL2_RTL_VERSION_MASK },
    BitfieldInfo { name: "debug_mode", mask: GLBL2_DBG_MODE_MASK },
    BitfieldInfo { name: "desc_eng_mode", mask: GLBL2_DESC_ENG_MODE_MASK },
    BitfieldInfo { name: "flr_present", mask: GLBL2_FLR_PRESENT_MASK },
    BitfieldInfo { name: "mailbox_en", mask: GLBL2_MAILBOX_EN_MASK },
];

const BF_CHANNEL_MDMA: &[BitfieldInfo] = &[
    BitfieldInfo { name: "c2h_st", mask: GLBL2_ST_C2H_MASK },
    BitfieldInfo { name: "h2c_st", mask: GLBL2_ST_H2C_MASK },
    BitfieldInfo { name: "c2h_eng", mask: GLBL2_MM_C2H_MASK },
    BitfieldInfo { name: "h2c_eng", mask: GLBL2_MM_H2C_MASK },
];

const BF_QDMA_CAP: &[BitfieldInfo] =
    &[BitfieldInfo { name: "multq_max", mask: GLBL2_MULTQ_MAX_MASK }];

const BF_DSC_CFG: &[BitfieldInfo] = &[
    BitfieldInfo { name: "max_dsc_fetch", mask: GLBL_DSC_CFG_MAX_DSC_FETCH_MASK },
    BitfieldInfo { name: "wb_acc_int", mask: GLBL_DSC_CFG_WB_ACC_INT_MASK },
];

const BF_PFETCH_CFG: &[BitfieldInfo] = &[
    BitfieldInfo { name: "evt_qcnt_th", mask: C2H_EVT_QCNT_TH_MASK },
    BitfieldInfo { name: "pfch_qcnt", mask: C2H_PFCH_QCNT_MASK },
    BitfieldInfo { name: "num_pfch", mask: C2H_NUM_PFCH_MASK },
    BitfieldInfo { name: "pfch_fl_th", mask: C2H_PFCH_FL_TH_MASK },
];

const BF_WRB_COAL_CFG: &[BitfieldInfo] = &[
    BitfieldInfo { name: "max_buf_sz", mask: C2H_MAX_BUF_SZ_MASK },
    BitfieldInfo { name: "tick_val", mask: C2H_TICK_VAL_MASK },
    BitfieldInfo { name: "tick_cnt", mask: C2H_TICK_CNT_MASK },
];

const BF_REQ_THROT: &[BitfieldInfo] = &[
    BitfieldInfo { name: "req_en", mask: H2C_REQ_THROT_EN_REQ_MASK },
    BitfieldInfo { name: "req_thresh", mask: H2C_REQ_THRESH_MASK },
    BitfieldInfo { name: "data_en", mask: H2C_REQ_THROT_EN_DATA_MASK },
    BitfieldInfo { name: "data_thresh", mask: H2C_DATA_THRESH_MASK },
];

const BF_NONE: &[BitfieldInfo] = &[];

macro_rules! reg {
    ($name:expr, $addr:expr, $repeat:expr, $mode:expr, $dbg:expr,
     $rt:expr, $bf:expr) => {
        RegInfo {
            name: $name,
            addr: $addr,
            repeat: $repeat,
            mode: $mode,
            is_debug: $dbg,
            read_type: $rt,
            bitfields: $bf,
        }
    };
}
pub(crate) use reg;

use ReadType::{PfAndVf, PfOnly};

pub const CONFIG_REGS: &[RegInfo] = &[
    reg!("CFG_BLK_IDENTIFIER", CONFIG_BLOCK_ID, 1, Mode::ANY, false, PfAndVf, BF_NONE),
    reg!("RAM_SBE_MSK_A", RAM_SBE_MSK, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("RAM_SBE_STS_A", RAM_SBE_STS, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("RAM_DBE_MSK_A", RAM_DBE_MSK, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("RAM_DBE_STS_A", RAM_DBE_STS, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_IDENTIFIER", GLBL2_ID, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_PF_BARLITE_INT", GLBL2_PF_BARLITE_INT, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_PF_VF_BARLITE_INT", GLBL2_PF_VF_BARLITE_INT, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_PF_BARLITE_EXT", GLBL2_PF_BARLITE_EXT, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_PF_VF_BARLITE_EXT", GLBL2_PF_VF_BARLITE_EXT, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_CHANNEL_INST", GLBL2_CHANNEL_INST, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_CHANNEL_MDMA", GLBL2_CHANNEL_MDMA, 1, Mode::ANY, false, PfOnly, BF_CHANNEL_MDMA),
    reg!("GLBL2_CHANNEL_STRM", GLBL2_CHANNEL_STRM, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_CHANNEL_QDMA_CAP", GLBL2_CHANNEL_QDMA_CAP, 1, Mode::ANY, false, PfOnly, BF_QDMA_CAP),
    reg!("GLBL2_CHANNEL_FUNC_RET", GLBL2_CHANNEL_FUNC_RET, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_SYSTEM_ID", GLBL2_SYSTEM_ID, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL2_MISC_CAP", GLBL2_MISC_CAP, 1, Mode::ANY, false, PfOnly, BF_GLBL2_MISC_CAP),
    reg!("GLBL_RNG_SZ", GLBL_RNG_SZ, 16, Mode::ANY, false, PfAndVf, BF_NONE),
    reg!("GLBL_SCRATCH", GLBL_SCRATCH, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_ERR_STAT", GLBL_ERR_STAT, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_ERR_MASK", GLBL_ERR_MASK, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_DSC_CFG", GLBL_DSC_CFG, 1, Mode::ANY, false, PfOnly, BF_DSC_CFG),
    reg!("GLBL_DSC_ERR_STS", GLBL_DSC_ERR_STS, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_DSC_ERR_MSK", GLBL_DSC_ERR_MSK, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_DSC_ERR_LOG0", GLBL_DSC_ERR_LOG0, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_DSC_ERR_LOG1", GLBL_DSC_ERR_LOG1, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_TRQ_ERR_STS", GLBL_TRQ_ERR_STS, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_TRQ_ERR_MSK", GLBL_TRQ_ERR_MSK, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_TRQ_ERR_LOG", GLBL_TRQ_ERR_LOG, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_DSC_DBG_DAT0", GLBL_DSC_DBG_DAT0, 1, Mode::ANY, true, PfOnly, BF_NONE),
    reg!("GLBL_DSC_DBG_DAT1", GLBL_DSC_DBG_DAT1, 1, Mode::ANY, true, PfOnly, BF_NONE),
    reg!("GLBL_DSC_ERR_LOG2", GLBL_DSC_ERR_LOG2, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("GLBL_INTERRUPT_CFG", GLBL_INTERRUPT_CFG, 1, Mode::ANY, false, PfOnly, BF_NONE),
    reg!("C2H_TIMER_CNT", C2H_TIMER_CNT, 16, Mode::ST.union(Mode::MM_CMPT), false, PfAndVf, BF_NONE),
    reg!("C2H_CNT_TH", C2H_CNT_TH, 16, Mode::ST.union(Mode::MM_CMPT), false, PfAndVf, BF_NONE),
    reg!("C2H_STAT_S_AXIS_C2H_ACCEPTED", C2H_STAT_S_AXIS_C2H_ACCEPTED, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_STAT_S_AXIS_WRB_ACCEPTED", C2H_STAT_S_AXIS_CMPT_ACCEPTED, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_STAT_DESC_RSP_PKT_ACCEPTED", C2H_STAT_DESC_RSP_PKT_ACCEPTED, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_STAT_AXIS_PKG_CMP", C2H_STAT_AXIS_PKG_CMP, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_BUF_SZ", C2H_BUF_SZ, 16, Mode::ST, false, PfAndVf, BF_NONE),
    reg!("C2H_ERR_STAT", C2H_ERR_STAT, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_ERR_MASK", C2H_ERR_MASK, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_FATAL_ERR_STAT", C2H_FATAL_ERR_STAT, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_FATAL_ERR_MASK", C2H_FATAL_ERR_MASK, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_FATAL_ERR_ENABLE", C2H_FATAL_ERR_ENABLE, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("GLBL_ERR_INT", C2H_ERR_INT, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_PFCH_CFG", C2H_PFETCH_CFG, 1, Mode::ST, false, PfOnly, BF_PFETCH_CFG),
    reg!("C2H_INT_TIMER_TICK", C2H_INT_TIMER_TICK, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_STAT_DESC_RSP_DROP_ACCEPTED", C2H_STAT_DESC_RSP_DROP_ACCEPTED, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_STAT_DESC_RSP_ERR_ACCEPTED", C2H_STAT_DESC_RSP_ERR_ACCEPTED, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_STAT_DESC_REQ", C2H_STAT_DESC_REQ, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_STAT_DBG_DMA_ENG_0", C2H_STAT_DBG_DMA_ENG_0, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("C2H_STAT_DBG_DMA_ENG_1", C2H_STAT_DBG_DMA_ENG_1, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("C2H_STAT_DBG_DMA_ENG_2", C2H_STAT_DBG_DMA_ENG_2, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("C2H_STAT_DBG_DMA_ENG_3", C2H_STAT_DBG_DMA_ENG_3, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("C2H_DBG_PFCH_ERR_CTXT", C2H_DBG_PFCH_ERR_CTXT, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("C2H_FIRST_ERR_QID", C2H_FIRST_ERR_QID, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_WRB_COAL_CFG", C2H_WRB_COAL_CFG, 1, Mode::ST, false, PfOnly, BF_WRB_COAL_CFG),
    reg!("C2H_PFCH_CACHE_DEPTH", C2H_PFETCH_CACHE_DEPTH, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("C2H_CMPT_COAL_BUF_DEPTH", C2H_CMPT_COAL_BUF_DEPTH, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("H2C_ERR_STAT", H2C_ERR_STAT, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("H2C_ERR_MASK", H2C_ERR_MASK, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("H2C_FIRST_ERR_QID", H2C_FIRST_ERR_QID, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("H2C_DBG_REG0", H2C_DBG_REG0, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("H2C_DBG_REG1", H2C_DBG_REG1, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("H2C_DBG_REG2", H2C_DBG_REG2, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("H2C_DBG_REG3", H2C_DBG_REG3, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("H2C_DBG_REG4", H2C_DBG_REG4, 1, Mode::ST, true, PfOnly, BF_NONE),
    reg!("H2C_FATAL_ERR_EN", H2C_FATAL_ERR_EN, 1, Mode::ST, false, PfOnly, BF_NONE),
    reg!("H2C_REQ_THROT", H2C_REQ_THROT, 1, Mode::ST, false, PfOnly, BF_REQ_THROT),
    reg!("C2H_MM_CONTROL", C2H_MM_CONTROL, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("C2H_MM_STATUS", C2H_MM_STATUS, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("C2H_MM_CMPL_DSC_CNT", C2H_MM_COMPLETED_DESC_COUNT, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("C2H_MM_ERR_CODE_EN_MASK", C2H_MM_ERR_CODE_EN_MASK, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("C2H_MM_ERR_CODE", C2H_MM_ERR_CODE, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("C2H_MM_ERR_INFO", C2H_MM_ERR_INFO, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("H2C_MM_CONTROL", H2C_MM_CONTROL, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("H2C_MM_STATUS", H2C_MM_STATUS, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("H2C_MM_CMPL_DSC_CNT", H2C_MM_COMPLETED_DESC_COUNT, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("H2C_MM_ERR_CODE_EN_MASK", H2C_MM_ERR_CODE_EN_MASK, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("H2C_MM_ERR_CODE", H2C_MM_ERR_CODE, 1, Mode::MM, false, PfOnly, BF_NONE),
    reg!("H2C_MM_ERR_INFO", H2C_MM_ERR_INFO, 1, Mode::MM, false, PfOnly, BF_NONE),
];
