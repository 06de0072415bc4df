// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Context word layouts of the Everest S80 hardened block.
//!
//! The hardened window is only 4 data words, so the software context
//! drops the interrupt-vector word (interrupt steering goes through the
//! qid-to-vector map register instead) and packs the function id into
//! word 1. The completion context squeezes into 4 words with the low
//! bits of the base address spilling into word 0.
//!
//! Hardware, credit, prefetch and interrupt contexts match the soft IP
//! layouts and are dispatched there.

use drv_qdma_api::*;

pub const SW_CTXT_NUM_WORDS: usize = 4;
pub const CMPT_CTXT_NUM_WORDS: usize = 4;
pub const FMAP_CTXT_NUM_WORDS: usize = 1;

// Software context.
const SW_W0_PIDX: u32 = genmask(15, 0);
const SW_W0_IRQ_ARM: u32 = bit(16);

const SW_W1_QEN: u32 = bit(0);
const SW_W1_FCRD_EN: u32 = bit(1);
const SW_W1_WBI_CHK: u32 = bit(2);
const SW_W1_WB_INT_EN: u32 = bit(3);
const SW_W1_FUNC_ID: u32 = genmask(11, 4);
const SW_W1_RNG_SZ: u32 = genmask(15, 12);
const SW_W1_DSC_SZ: u32 = genmask(17, 16);
const SW_W1_BYP: u32 = bit(18);
const SW_W1_MM_CHN: u32 = bit(19);
const SW_W1_WBK_EN: u32 = bit(20);
const SW_W1_IRQ_EN: u32 = bit(21);
const SW_W1_PORT_ID: u32 = genmask(24, 22);
const SW_W1_IRQ_NO_LAST: u32 = bit(25);
const SW_W1_ERR: u32 = genmask(27, 26);
const SW_W1_ERR_WB_SENT: u32 = bit(28);
const SW_W1_IRQ_REQ: u32 = bit(29);
const SW_W1_MRKR_DIS: u32 = bit(30);
const SW_W1_IS_MM: u32 = bit(31);

pub fn pack_sw(ctxt: &SwContext, words: &mut [u32; 8]) -> usize {
    words[0] = field_set(SW_W0_PIDX, ctxt.pidx.into())
        | field_set(SW_W0_IRQ_ARM, ctxt.irq_arm.into());

    words[1] = field_set(SW_W1_QEN, ctxt.qen.into())
        | field_set(SW_W1_FCRD_EN, ctxt.frcd_en.into())
        | field_set(SW_W1_WBI_CHK, ctxt.wbi_chk.into())
        | field_set(SW_W1_WB_INT_EN, ctxt.wbi_intvl_en.into())
        | field_set(SW_W1_FUNC_ID, ctxt.fnc_id.into())
        | field_set(SW_W1_RNG_SZ, ctxt.rngsz_idx.into())
        | field_set(SW_W1_DSC_SZ, ctxt.desc_sz.into())
        | field_set(SW_W1_BYP, ctxt.bypass.into())
        | field_set(SW_W1_MM_CHN, ctxt.mm_chn.into())
        | field_set(SW_W1_WBK_EN, ctxt.wbk_en.into())
        | field_set(SW_W1_IRQ_EN, ctxt.irq_en.into())
        | field_set(SW_W1_PORT_ID, ctxt.port_id.into())
        | field_set(SW_W1_IRQ_NO_LAST, ctxt.irq_no_last.into())
        | field_set(SW_W1_ERR, ctxt.err.into())
        | field_set(SW_W1_ERR_WB_SENT, ctxt.err_wb_sent.into())
        | field_set(SW_W1_IRQ_REQ, ctxt.irq_req.into())
        | field_set(SW_W1_MRKR_DIS, ctxt.mrkr_dis.into())
        | field_set(SW_W1_IS_MM, ctxt.is_mm.into());

    words[2] = ctxt.ring_bs_addr as u32;
    words[3] = (ctxt.ring_bs_addr >> 32) as u32;

    SW_CTXT_NUM_WORDS
}

pub fn unpack_sw(words: &[u32; 8]) -> SwContext {
    SwContext {
        pidx: field_get(SW_W0_PIDX, words[0]) as u16,
        irq_arm: field_get(SW_W0_IRQ_ARM, words[0]) != 0,
        fnc_id: field_get(SW_W1_FUNC_ID, words[1]) as u16,

        qen: field_get(SW_W1_QEN, words[1]) != 0,
        frcd_en: field_get(SW_W1_FCRD_EN, words[1]) != 0,
        wbi_chk: field_get(SW_W1_WBI_CHK, words[1]) != 0,
        wbi_intvl_en: field_get(SW_W1_WB_INT_EN, words[1]) != 0,
        rngsz_idx: field_get(SW_W1_RNG_SZ, words[1]) as u8,
        desc_sz: field_get(SW_W1_DSC_SZ, words[1]) as u8,
        bypass: field_get(SW_W1_BYP, words[1]) != 0,
        mm_chn: field_get(SW_W1_MM_CHN, words[1]) != 0,
        wbk_en: field_get(SW_W1_WBK_EN, words[1]) != 0,
        irq_en: field_get(SW_W1_IRQ_EN, words[1]) != 0,
        port_id: field_get(SW_W1_PORT_ID, words[1]) as u8,
        irq_no_last: field_get(SW_W1_IRQ_NO_LAST, words[1]) != 0,
        err: field_get(SW_W1_ERR, words[1]) as u8,
        err_wb_sent: field_get(SW_W1_ERR_WB_SENT, words[1]) != 0,
        irq_req: field_get(SW_W1_IRQ_REQ, words[1]) != 0,
        mrkr_dis: field_get(SW_W1_MRKR_DIS, words[1]) != 0,
        is_mm: field_get(SW_W1_IS_MM, words[1]) != 0,

        ring_bs_addr: (u64::from(words[3]) << 32) | u64::from(words[2]),

        ..Default::default()
    }
}

// Completion context.
const CMPT_W0_EN_STAT_DESC: u32 = bit(0);
const CMPT_W0_EN_INT: u32 = bit(1);
const CMPT_W0_TRIG_MODE: u32 = genmask(4, 2);
const CMPT_W0_FNC_ID: u32 = genmask(12, 5);
const CMPT_W0_COUNTER_IDX: u32 = genmask(16, 13);
const CMPT_W0_TIMER_IDX: u32 = genmask(20, 17);
const CMPT_W0_INT_ST: u32 = genmask(22, 21);
const CMPT_W0_COLOR: u32 = bit(23);
const CMPT_W0_RING_SZ: u32 = genmask(27, 24);
const CMPT_W0_BADDR_L: u32 = genmask(31, 28);
const CMPT_W2_BADDR_H: u32 = genmask(21, 0);
const CMPT_W2_DESC_SIZE: u32 = genmask(23, 22);
const CMPT_W2_PIDX_L: u32 = genmask(31, 24);
const CMPT_W3_PIDX_H: u32 = genmask(7, 0);
const CMPT_W3_CIDX: u32 = genmask(23, 8);
const CMPT_W3_VALID: u32 = bit(24);
const CMPT_W3_ERR: u32 = genmask(26, 25);
const CMPT_W3_USR_TRG_PND: u32 = bit(27);
const CMPT_W3_TMR_RUN: u32 = bit(28);
const CMPT_W3_FULL_UPDT: u32 = bit(29);

// Base address splits 22 high / 32 mid / 4 low.
const CMPT_BADDR_H: u64 = genmask64(63, 42);
const CMPT_BADDR_M: u64 = genmask64(41, 10);
const CMPT_BADDR_L: u64 = genmask64(9, 6);
const CMPT_PIDX_L: u32 = genmask(7, 0);
const CMPT_PIDX_H: u32 = genmask(15, 8);

pub fn pack_cmpt(ctxt: &CmptContext, words: &mut [u32; 6]) -> usize {
    let baddr_l = field_get64(CMPT_BADDR_L, ctxt.bs_addr) as u32;
    let baddr_m = field_get64(CMPT_BADDR_M, ctxt.bs_addr) as u32;
    let baddr_h = field_get64(CMPT_BADDR_H, ctxt.bs_addr) as u32;
    let pidx_l = field_get(CMPT_PIDX_L, ctxt.pidx.into());
    let pidx_h = field_get(CMPT_PIDX_H, ctxt.pidx.into());

    words[0] = field_set(CMPT_W0_EN_STAT_DESC, ctxt.en_stat_desc.into())
        | field_set(CMPT_W0_EN_INT, ctxt.en_int.into())
        | field_set(CMPT_W0_TRIG_MODE, ctxt.trig_mode.into())
        | field_set(CMPT_W0_FNC_ID, ctxt.fnc_id.into())
        | field_set(CMPT_W0_COUNTER_IDX, ctxt.counter_idx.into())
        | field_set(CMPT_W0_TIMER_IDX, ctxt.timer_idx.into())
        | field_set(CMPT_W0_INT_ST, ctxt.in_st.into())
        | field_set(CMPT_W0_COLOR, ctxt.color.into())
        | field_set(CMPT_W0_RING_SZ, ctxt.ringsz_idx.into())
        | field_set(CMPT_W0_BADDR_L, baddr_l);

    words[1] = baddr_m;

    words[2] = field_set(CMPT_W2_BADDR_H, baddr_h)
        | field_set(CMPT_W2_DESC_SIZE, ctxt.desc_sz.into())
        | field_set(CMPT_W2_PIDX_L, pidx_l);

    words[3] = field_set(CMPT_W3_PIDX_H, pidx_h)
        | field_set(CMPT_W3_CIDX, ctxt.cidx.into())
        | field_set(CMPT_W3_ERR, ctxt.err.into())
        | field_set(CMPT_W3_USR_TRG_PND, ctxt.user_trig_pend.into())
        | field_set(CMPT_W3_TMR_RUN, ctxt.timer_running.into())
        | field_set(CMPT_W3_FULL_UPDT, ctxt.full_upd.into())
        | field_set(CMPT_W3_VALID, ctxt.valid.into());

    CMPT_CTXT_NUM_WORDS
}

pub fn unpack_cmpt(words: &[u32; 6]) -> CmptContext {
    let baddr_l = field_get(CMPT_W0_BADDR_L, words[0]);
    let baddr_m = words[1];
    let baddr_h = field_get(CMPT_W2_BADDR_H, words[2]);
    let pidx_l = field_get(CMPT_W2_PIDX_L, words[2]);
    let pidx_h = field_get(CMPT_W3_PIDX_H, words[3]);

    CmptContext {
        en_stat_desc: field_get(CMPT_W0_EN_STAT_DESC, words[0]) != 0,
        en_int: field_get(CMPT_W0_EN_INT, words[0]) != 0,
        trig_mode: field_get(CMPT_W0_TRIG_MODE, words[0]) as u8,
        fnc_id: field_get(CMPT_W0_FNC_ID, words[0]) as u16,
        counter_idx: field_get(CMPT_W0_COUNTER_IDX, words[0]) as u8,
        timer_idx: field_get(CMPT_W0_TIMER_IDX, words[0]) as u8,
        in_st: field_get(CMPT_W0_INT_ST, words[0]) as u8,
        color: field_get(CMPT_W0_COLOR, words[0]) != 0,
        ringsz_idx: field_get(CMPT_W0_RING_SZ, words[0]) as u8,

        bs_addr: field_set64(CMPT_BADDR_L, baddr_l.into())
            | field_set64(CMPT_BADDR_M, baddr_m.into())
            | field_set64(CMPT_BADDR_H, baddr_h.into()),
        desc_sz: field_get(CMPT_W2_DESC_SIZE, words[2]) as u8,
        pidx: (field_set(CMPT_PIDX_L, pidx_l)
            | field_set(CMPT_PIDX_H, pidx_h)) as u16,
        cidx: field_get(CMPT_W3_CIDX, words[3]) as u16,
        valid: field_get(CMPT_W3_VALID, words[3]) != 0,
        err: field_get(CMPT_W3_ERR, words[3]) as u8,
        user_trig_pend: field_get(CMPT_W3_USR_TRG_PND, words[3]) != 0,
        timer_running: field_get(CMPT_W3_TMR_RUN, words[3]) != 0,
        full_upd: field_get(CMPT_W3_FULL_UPDT, words[3]) != 0,

        ..Default::default()
    }
}

// Function map: one word, range base and size packed together.
const FMAP_W0_QID_BASE: u32 = genmask(10, 0);
const FMAP_W0_QID_MAX: u32 = genmask(22, 11);

pub fn pack_fmap(cfg: &FmapCfg, words: &mut [u32; 2]) -> usize {
    words[0] = field_set(FMAP_W0_QID_BASE, cfg.qbase.into())
        | field_set(FMAP_W0_QID_MAX, cfg.qmax.into());
    FMAP_CTXT_NUM_WORDS
}

pub fn unpack_fmap(words: &[u32; 2]) -> FmapCfg {
    FmapCfg {
        qbase: field_get(FMAP_W0_QID_BASE, words[0]) as u16,
        qmax: field_get(FMAP_W0_QID_MAX, words[0]) as u16,
    }
}
