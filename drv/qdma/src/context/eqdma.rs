// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Context word layouts of the Everest QDMA soft IP.
//!
//! Widest of the three variants: 8-word software contexts carrying
//! PASID and virtio descriptor bases, 6-word completion contexts, and
//! per-ring interrupt contexts with a function id.
//!
//! Multi-word values are assembled in a fixed split order:
//!   - ring base: low 32 / high 32
//!   - PASID: 12 high / 10 low (sw), 13 high / 9 low (cmpt, intr)
//!   - virtio descriptor base: 11 high / 32 mid / 21 low
//!   - completion base: 26 high-high / 32 high-low / 4 low

use drv_qdma_api::*;

pub const SW_CTXT_NUM_WORDS: usize = 8;
pub const CMPT_CTXT_NUM_WORDS: usize = 6;
pub const INTR_CTXT_NUM_WORDS: usize = 4;
pub const FMAP_CTXT_NUM_WORDS: usize = 2;

// Software context, word 0.
const SW_W0_PIDX: u32 = genmask(15, 0);
const SW_W0_IRQ_ARM: u32 = bit(16);
const SW_W0_FNC: u32 = genmask(28, 17);

// Software context, word 1.
const SW_W1_QEN: u32 = bit(0);
const SW_W1_FCRD_EN: u32 = bit(1);
const SW_W1_WBI_CHK: u32 = bit(2);
const SW_W1_WBI_INTVL_EN: u32 = bit(3);
const SW_W1_AT: u32 = bit(4);
const SW_W1_FETCH_MAX: u32 = genmask(7, 5);
const SW_W1_RNG_SZ: u32 = genmask(15, 12);
const SW_W1_DSC_SZ: u32 = genmask(17, 16);
const SW_W1_BYPASS: u32 = bit(18);
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

// Software context, word 4.
const SW_W4_VEC: u32 = genmask(10, 0);
const SW_W4_INT_AGGR: u32 = bit(11);
const SW_W4_DIS_INTR_ON_VF: u32 = bit(12);
const SW_W4_VIRTIO_EN: u32 = bit(13);
const SW_W4_PACK_BYP_OUT: u32 = bit(14);
const SW_W4_IRQ_BYP: u32 = bit(15);
const SW_W4_HOST_ID: u32 = genmask(19, 16);
const SW_W4_PASID_L: u32 = genmask(31, 20);

// Software context, word 5.
const SW_W5_PASID_H: u32 = genmask(9, 0);
const SW_W5_PASID_EN: u32 = bit(10);
const SW_W5_VIRTIO_DSC_BASE_L: u32 = genmask(31, 11);

// Software context, word 7. Word 6 is the full middle of the virtio base.
const SW_W7_VIRTIO_DSC_BASE_H: u32 = genmask(10, 0);

// Sub-field splits of wide software-context values.
const SW_PASID_L: u32 = genmask(11, 0);
const SW_PASID_H: u32 = genmask(21, 12);
const SW_VIRTIO_BASE_L: u64 = genmask64(20, 0);
const SW_VIRTIO_BASE_M: u64 = genmask64(52, 21);
const SW_VIRTIO_BASE_H: u64 = genmask64(63, 53);

pub fn pack_sw(ctxt: &SwContext, words: &mut [u32; 8]) -> usize {
    let pasid_l = field_get(SW_PASID_L, ctxt.pasid);
    let pasid_h = field_get(SW_PASID_H, ctxt.pasid);
    let virtio_l = field_get64(SW_VIRTIO_BASE_L, ctxt.virtio_dsc_base) as u32;
    let virtio_m = field_get64(SW_VIRTIO_BASE_M, ctxt.virtio_dsc_base) as u32;
    let virtio_h = field_get64(SW_VIRTIO_BASE_H, ctxt.virtio_dsc_base) as u32;

    words[0] = field_set(SW_W0_PIDX, ctxt.pidx.into())
        | field_set(SW_W0_IRQ_ARM, ctxt.irq_arm.into())
        | field_set(SW_W0_FNC, ctxt.fnc_id.into());

    words[1] = field_set(SW_W1_QEN, ctxt.qen.into())
        | field_set(SW_W1_FCRD_EN, ctxt.frcd_en.into())
        | field_set(SW_W1_WBI_CHK, ctxt.wbi_chk.into())
        | field_set(SW_W1_WBI_INTVL_EN, ctxt.wbi_intvl_en.into())
        | field_set(SW_W1_AT, ctxt.at.into())
        | field_set(SW_W1_FETCH_MAX, ctxt.fetch_max.into())
        | field_set(SW_W1_RNG_SZ, ctxt.rngsz_idx.into())
        | field_set(SW_W1_DSC_SZ, ctxt.desc_sz.into())
        | field_set(SW_W1_BYPASS, ctxt.bypass.into())
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

    words[4] = field_set(SW_W4_VEC, ctxt.vec.into())
        | field_set(SW_W4_INT_AGGR, ctxt.intr_aggr.into())
        | field_set(SW_W4_DIS_INTR_ON_VF, ctxt.dis_intr_on_vf.into())
        | field_set(SW_W4_VIRTIO_EN, ctxt.virtio_en.into())
        | field_set(SW_W4_PACK_BYP_OUT, ctxt.pack_byp_out.into())
        | field_set(SW_W4_IRQ_BYP, ctxt.irq_byp.into())
        | field_set(SW_W4_HOST_ID, ctxt.host_id.into())
        | field_set(SW_W4_PASID_L, pasid_l);

    words[5] = field_set(SW_W5_PASID_H, pasid_h)
        | field_set(SW_W5_PASID_EN, ctxt.pasid_en.into())
        | field_set(SW_W5_VIRTIO_DSC_BASE_L, virtio_l);

    words[6] = virtio_m;
    words[7] = field_set(SW_W7_VIRTIO_DSC_BASE_H, virtio_h);

    SW_CTXT_NUM_WORDS
}

pub fn unpack_sw(words: &[u32; 8]) -> SwContext {
    let pasid_l = field_get(SW_W4_PASID_L, words[4]);
    let pasid_h = field_get(SW_W5_PASID_H, words[5]);
    let virtio_l = field_get(SW_W5_VIRTIO_DSC_BASE_L, words[5]);
    let virtio_m = words[6];
    let virtio_h = field_get(SW_W7_VIRTIO_DSC_BASE_H, words[7]);

    SwContext {
        pidx: field_get(SW_W0_PIDX, words[0]) as u16,
        irq_arm: field_get(SW_W0_IRQ_ARM, words[0]) != 0,
        fnc_id: field_get(SW_W0_FNC, words[0]) as u16,

        qen: field_get(SW_W1_QEN, words[1]) != 0,
        frcd_en: field_get(SW_W1_FCRD_EN, words[1]) != 0,
        wbi_chk: field_get(SW_W1_WBI_CHK, words[1]) != 0,
        wbi_intvl_en: field_get(SW_W1_WBI_INTVL_EN, words[1]) != 0,
        at: field_get(SW_W1_AT, words[1]) != 0,
        fetch_max: field_get(SW_W1_FETCH_MAX, words[1]) as u8,
        rngsz_idx: field_get(SW_W1_RNG_SZ, words[1]) as u8,
        desc_sz: field_get(SW_W1_DSC_SZ, words[1]) as u8,
        bypass: field_get(SW_W1_BYPASS, words[1]) != 0,
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

        vec: field_get(SW_W4_VEC, words[4]) as u16,
        intr_aggr: field_get(SW_W4_INT_AGGR, words[4]) != 0,
        dis_intr_on_vf: field_get(SW_W4_DIS_INTR_ON_VF, words[4]) != 0,
        virtio_en: field_get(SW_W4_VIRTIO_EN, words[4]) != 0,
        pack_byp_out: field_get(SW_W4_PACK_BYP_OUT, words[4]) != 0,
        irq_byp: field_get(SW_W4_IRQ_BYP, words[4]) != 0,
        host_id: field_get(SW_W4_HOST_ID, words[4]) as u8,
        pasid: field_set(SW_PASID_L, pasid_l)
            | field_set(SW_PASID_H, pasid_h),
        pasid_en: field_get(SW_W5_PASID_EN, words[5]) != 0,
        virtio_dsc_base: field_set64(SW_VIRTIO_BASE_L, virtio_l.into())
            | field_set64(SW_VIRTIO_BASE_M, virtio_m.into())
            | field_set64(SW_VIRTIO_BASE_H, virtio_h.into()),
    }
}

// Completion context, word 0.
const CMPT_W0_EN_STAT_DESC: u32 = bit(0);
const CMPT_W0_EN_INT: u32 = bit(1);
const CMPT_W0_TRIG_MODE: u32 = genmask(4, 2);
const CMPT_W0_FNC_ID: u32 = genmask(16, 5);
const CMPT_W0_CNTER_IX: u32 = genmask(20, 17);
const CMPT_W0_TIMER_IX: u32 = genmask(24, 21);
const CMPT_W0_INT_ST: u32 = genmask(26, 25);
const CMPT_W0_COLOR: u32 = bit(27);
const CMPT_W0_QSIZE_IX: u32 = genmask(31, 28);

// Completion context, words 2 and 3. Word 1 is the low half of the high
// base address.
const CMPT_W2_BADDR4_HIGH_H: u32 = genmask(25, 0);
const CMPT_W2_DESC_SIZE: u32 = genmask(27, 26);
const CMPT_W2_PIDX_L: u32 = genmask(31, 28);
const CMPT_W3_PIDX_H: u32 = genmask(11, 0);
const CMPT_W3_CIDX: u32 = genmask(27, 12);
const CMPT_W3_VALID: u32 = bit(28);
const CMPT_W3_ERR: u32 = genmask(30, 29);
const CMPT_W3_USER_TRIG_PEND: u32 = bit(31);

// Completion context, word 4.
const CMPT_W4_TIMER_RUNNING: u32 = bit(0);
const CMPT_W4_FULL_UPD: u32 = bit(1);
const CMPT_W4_OVF_CHK_DIS: u32 = bit(2);
const CMPT_W4_AT: u32 = bit(3);
const CMPT_W4_VEC: u32 = genmask(14, 4);
const CMPT_W4_INT_AGGR: u32 = bit(15);
const CMPT_W4_DIS_INTR_ON_VF: u32 = bit(16);
const CMPT_W4_VIO: u32 = bit(17);
const CMPT_W4_DIR_C2H: u32 = bit(18);
const CMPT_W4_HOST_ID: u32 = genmask(22, 19);
const CMPT_W4_PASID_L: u32 = genmask(31, 23);

// Completion context, word 5.
const CMPT_W5_PASID_H: u32 = genmask(12, 0);
const CMPT_W5_PASID_EN: u32 = bit(13);
const CMPT_W5_BADDR4_LOW: u32 = genmask(17, 14);
const CMPT_W5_VIO_EOP: u32 = bit(18);
const CMPT_W5_SH_CMPT: u32 = bit(19);

// Sub-field splits of wide completion-context values.
const CMPT_BADDR_HIGH_H: u64 = genmask64(63, 38);
const CMPT_BADDR_HIGH_L: u64 = genmask64(37, 6);
const CMPT_BADDR_LOW: u64 = genmask64(5, 2);
const CMPT_PIDX_L: u32 = genmask(3, 0);
const CMPT_PIDX_H: u32 = genmask(15, 4);
const CMPT_PASID_L: u32 = genmask(8, 0);
const CMPT_PASID_H: u32 = genmask(21, 9);

pub fn pack_cmpt(ctxt: &CmptContext, words: &mut [u32; 6]) -> usize {
    let baddr_high_l = field_get64(CMPT_BADDR_HIGH_L, ctxt.bs_addr) as u32;
    let baddr_high_h = field_get64(CMPT_BADDR_HIGH_H, ctxt.bs_addr) as u32;
    let baddr_low = field_get64(CMPT_BADDR_LOW, ctxt.bs_addr) as u32;
    let pidx_l = field_get(CMPT_PIDX_L, ctxt.pidx.into());
    let pidx_h = field_get(CMPT_PIDX_H, ctxt.pidx.into());
    let pasid_l = field_get(CMPT_PASID_L, ctxt.pasid);
    let pasid_h = field_get(CMPT_PASID_H, ctxt.pasid);

    words[0] = field_set(CMPT_W0_EN_STAT_DESC, ctxt.en_stat_desc.into())
        | field_set(CMPT_W0_EN_INT, ctxt.en_int.into())
        | field_set(CMPT_W0_TRIG_MODE, ctxt.trig_mode.into())
        | field_set(CMPT_W0_FNC_ID, ctxt.fnc_id.into())
        | field_set(CMPT_W0_CNTER_IX, ctxt.counter_idx.into())
        | field_set(CMPT_W0_TIMER_IX, ctxt.timer_idx.into())
        | field_set(CMPT_W0_INT_ST, ctxt.in_st.into())
        | field_set(CMPT_W0_COLOR, ctxt.color.into())
        | field_set(CMPT_W0_QSIZE_IX, ctxt.ringsz_idx.into());

    words[1] = baddr_high_l;

    words[2] = field_set(CMPT_W2_BADDR4_HIGH_H, baddr_high_h)
        | field_set(CMPT_W2_DESC_SIZE, ctxt.desc_sz.into())
        | field_set(CMPT_W2_PIDX_L, pidx_l);

    words[3] = field_set(CMPT_W3_PIDX_H, pidx_h)
        | field_set(CMPT_W3_CIDX, ctxt.cidx.into())
        | field_set(CMPT_W3_ERR, ctxt.err.into())
        | field_set(CMPT_W3_USER_TRIG_PEND, ctxt.user_trig_pend.into())
        | field_set(CMPT_W3_VALID, ctxt.valid.into());

    words[4] = field_set(CMPT_W4_TIMER_RUNNING, ctxt.timer_running.into())
        | field_set(CMPT_W4_FULL_UPD, ctxt.full_upd.into())
        | field_set(CMPT_W4_OVF_CHK_DIS, ctxt.ovf_chk_dis.into())
        | field_set(CMPT_W4_AT, ctxt.at.into())
        | field_set(CMPT_W4_VEC, ctxt.vec.into())
        | field_set(CMPT_W4_INT_AGGR, ctxt.int_aggr.into())
        | field_set(CMPT_W4_DIS_INTR_ON_VF, ctxt.dis_intr_on_vf.into())
        | field_set(CMPT_W4_VIO, ctxt.vio.into())
        | field_set(CMPT_W4_DIR_C2H, ctxt.dir_c2h.into())
        | field_set(CMPT_W4_HOST_ID, ctxt.host_id.into())
        | field_set(CMPT_W4_PASID_L, pasid_l);

    words[5] = field_set(CMPT_W5_PASID_H, pasid_h)
        | field_set(CMPT_W5_PASID_EN, ctxt.pasid_en.into())
        | field_set(CMPT_W5_BADDR4_LOW, baddr_low)
        | field_set(CMPT_W5_VIO_EOP, ctxt.vio_eop.into())
        | field_set(CMPT_W5_SH_CMPT, ctxt.sh_cmpt.into());

    CMPT_CTXT_NUM_WORDS
}

pub fn unpack_cmpt(words: &[u32; 6]) -> CmptContext {
    let baddr_high_l = field_get(genmask(31, 0), words[1]);
    let baddr_high_h = field_get(CMPT_W2_BADDR4_HIGH_H, words[2]);
    let baddr_low = field_get(CMPT_W5_BADDR4_LOW, words[5]);
    let pidx_l = field_get(CMPT_W2_PIDX_L, words[2]);
    let pidx_h = field_get(CMPT_W3_PIDX_H, words[3]);
    let pasid_l = field_get(CMPT_W4_PASID_L, words[4]);
    let pasid_h = field_get(CMPT_W5_PASID_H, words[5]);

    CmptContext {
        en_stat_desc: field_get(CMPT_W0_EN_STAT_DESC, words[0]) != 0,
        en_int: field_get(CMPT_W0_EN_INT, words[0]) != 0,
        trig_mode: field_get(CMPT_W0_TRIG_MODE, words[0]) as u8,
        fnc_id: field_get(CMPT_W0_FNC_ID, words[0]) as u16,
        counter_idx: field_get(CMPT_W0_CNTER_IX, words[0]) as u8,
        timer_idx: field_get(CMPT_W0_TIMER_IX, words[0]) as u8,
        in_st: field_get(CMPT_W0_INT_ST, words[0]) as u8,
        color: field_get(CMPT_W0_COLOR, words[0]) != 0,
        ringsz_idx: field_get(CMPT_W0_QSIZE_IX, words[0]) as u8,

        bs_addr: field_set64(CMPT_BADDR_HIGH_L, baddr_high_l.into())
            | field_set64(CMPT_BADDR_HIGH_H, baddr_high_h.into())
            | field_set64(CMPT_BADDR_LOW, baddr_low.into()),
        desc_sz: field_get(CMPT_W2_DESC_SIZE, words[2]) as u8,
        pidx: (field_set(CMPT_PIDX_L, pidx_l)
            | field_set(CMPT_PIDX_H, pidx_h)) as u16,
        cidx: field_get(CMPT_W3_CIDX, words[3]) as u16,
        valid: field_get(CMPT_W3_VALID, words[3]) != 0,
        err: field_get(CMPT_W3_ERR, words[3]) as u8,
        user_trig_pend: field_get(CMPT_W3_USER_TRIG_PEND, words[3]) != 0,

        timer_running: field_get(CMPT_W4_TIMER_RUNNING, words[4]) != 0,
        full_upd: field_get(CMPT_W4_FULL_UPD, words[4]) != 0,
        ovf_chk_dis: field_get(CMPT_W4_OVF_CHK_DIS, words[4]) != 0,
        at: field_get(CMPT_W4_AT, words[4]) != 0,
        vec: field_get(CMPT_W4_VEC, words[4]) as u16,
        int_aggr: field_get(CMPT_W4_INT_AGGR, words[4]) != 0,
        dis_intr_on_vf: field_get(CMPT_W4_DIS_INTR_ON_VF, words[4]) != 0,
        vio: field_get(CMPT_W4_VIO, words[4]) != 0,
        dir_c2h: field_get(CMPT_W4_DIR_C2H, words[4]) != 0,
        host_id: field_get(CMPT_W4_HOST_ID, words[4]) as u8,
        pasid: field_set(CMPT_PASID_L, pasid_l)
            | field_set(CMPT_PASID_H, pasid_h),
        pasid_en: field_get(CMPT_W5_PASID_EN, words[5]) != 0,
        vio_eop: field_get(CMPT_W5_VIO_EOP, words[5]) != 0,
        sh_cmpt: field_get(CMPT_W5_SH_CMPT, words[5]) != 0,
    }
}

// Prefetch context.
const PFTCH_W0_BYPASS: u32 = bit(0);
const PFTCH_W0_BUF_SZ_IDX: u32 = genmask(4, 1);
const PFTCH_W0_PORT_ID: u32 = genmask(7, 5);
const PFTCH_W0_VAR_DESC: u32 = bit(8);
const PFTCH_W0_NUM_PFCH: u32 = genmask(18, 9);
const PFTCH_W0_ERR: u32 = bit(26);
const PFTCH_W0_PFCH_EN: u32 = bit(27);
const PFTCH_W0_PFCH: u32 = bit(28);
const PFTCH_W0_SW_CRDT_L: u32 = genmask(31, 29);
const PFTCH_W1_SW_CRDT_H: u32 = genmask(12, 0);
const PFTCH_W1_VALID: u32 = bit(13);

const PFTCH_SW_CRDT_L: u32 = genmask(2, 0);
const PFTCH_SW_CRDT_H: u32 = genmask(15, 3);

pub fn pack_pfetch(ctxt: &PrefetchContext, words: &mut [u32; 2]) -> usize {
    let crdt_l = field_get(PFTCH_SW_CRDT_L, ctxt.sw_crdt.into());
    let crdt_h = field_get(PFTCH_SW_CRDT_H, ctxt.sw_crdt.into());

    words[0] = field_set(PFTCH_W0_BYPASS, ctxt.bypass.into())
        | field_set(PFTCH_W0_BUF_SZ_IDX, ctxt.bufsz_idx.into())
        | field_set(PFTCH_W0_PORT_ID, ctxt.port_id.into())
        | field_set(PFTCH_W0_VAR_DESC, ctxt.var_desc.into())
        | field_set(PFTCH_W0_NUM_PFCH, ctxt.num_pftch.into())
        | field_set(PFTCH_W0_ERR, ctxt.err.into())
        | field_set(PFTCH_W0_PFCH_EN, ctxt.pfch_en.into())
        | field_set(PFTCH_W0_PFCH, ctxt.pfch.into())
        | field_set(PFTCH_W0_SW_CRDT_L, crdt_l);

    words[1] = field_set(PFTCH_W1_SW_CRDT_H, crdt_h)
        | field_set(PFTCH_W1_VALID, ctxt.valid.into());

    2
}

pub fn unpack_pfetch(words: &[u32; 2]) -> PrefetchContext {
    let crdt_l = field_get(PFTCH_W0_SW_CRDT_L, words[0]);
    let crdt_h = field_get(PFTCH_W1_SW_CRDT_H, words[1]);

    PrefetchContext {
        bypass: field_get(PFTCH_W0_BYPASS, words[0]) != 0,
        bufsz_idx: field_get(PFTCH_W0_BUF_SZ_IDX, words[0]) as u8,
        port_id: field_get(PFTCH_W0_PORT_ID, words[0]) as u8,
        var_desc: field_get(PFTCH_W0_VAR_DESC, words[0]) != 0,
        num_pftch: field_get(PFTCH_W0_NUM_PFCH, words[0]) as u16,
        err: field_get(PFTCH_W0_ERR, words[0]) != 0,
        pfch_en: field_get(PFTCH_W0_PFCH_EN, words[0]) != 0,
        pfch: field_get(PFTCH_W0_PFCH, words[0]) != 0,
        sw_crdt: (field_set(PFTCH_SW_CRDT_L, crdt_l)
            | field_set(PFTCH_SW_CRDT_H, crdt_h)) as u16,
        valid: field_get(PFTCH_W1_VALID, words[1]) != 0,
    }
}

// Interrupt aggregation ring context.
const INTR_W0_VALID: u32 = bit(0);
const INTR_W0_VEC: u32 = genmask(11, 1);
const INTR_W0_INT_ST: u32 = bit(13);
const INTR_W0_COLOR: u32 = bit(14);
const INTR_W0_BADDR_L: u32 = genmask(31, 15);
const INTR_W2_BADDR_H: u32 = genmask(2, 0);
const INTR_W2_PAGE_SIZE: u32 = genmask(5, 3);
const INTR_W2_PIDX: u32 = genmask(17, 6);
const INTR_W2_AT: u32 = bit(18);
const INTR_W2_HOST_ID: u32 = genmask(22, 19);
const INTR_W2_PASID_L: u32 = genmask(31, 23);
const INTR_W3_PASID_H: u32 = genmask(12, 0);
const INTR_W3_PASID_EN: u32 = bit(13);
const INTR_W3_FUNC_ID: u32 = genmask(29, 18);

const INTR_BADDR_L: u64 = genmask64(16, 0);
const INTR_BADDR_M: u64 = genmask64(48, 17);
const INTR_BADDR_H: u64 = genmask64(51, 49);
const INTR_PASID_L: u32 = genmask(8, 0);
const INTR_PASID_H: u32 = genmask(21, 9);

pub fn pack_intr(ctxt: &IntrContext, words: &mut [u32; 4]) -> usize {
    let baddr_l = field_get64(INTR_BADDR_L, ctxt.baddr_4k) as u32;
    let baddr_m = field_get64(INTR_BADDR_M, ctxt.baddr_4k) as u32;
    let baddr_h = field_get64(INTR_BADDR_H, ctxt.baddr_4k) as u32;
    let pasid_l = field_get(INTR_PASID_L, ctxt.pasid);
    let pasid_h = field_get(INTR_PASID_H, ctxt.pasid);

    words[0] = field_set(INTR_W0_VEC, ctxt.vec.into())
        | field_set(INTR_W0_INT_ST, ctxt.int_st.into())
        | field_set(INTR_W0_COLOR, ctxt.color.into())
        | field_set(INTR_W0_BADDR_L, baddr_l)
        | field_set(INTR_W0_VALID, ctxt.valid.into());

    words[1] = baddr_m;

    words[2] = field_set(INTR_W2_BADDR_H, baddr_h)
        | field_set(INTR_W2_PAGE_SIZE, ctxt.page_size.into())
        | field_set(INTR_W2_PIDX, ctxt.pidx.into())
        | field_set(INTR_W2_AT, ctxt.at.into())
        | field_set(INTR_W2_HOST_ID, ctxt.host_id.into())
        | field_set(INTR_W2_PASID_L, pasid_l);

    words[3] = field_set(INTR_W3_PASID_H, pasid_h)
        | field_set(INTR_W3_PASID_EN, ctxt.pasid_en.into())
        | field_set(INTR_W3_FUNC_ID, ctxt.func_id.into());

    INTR_CTXT_NUM_WORDS
}

pub fn unpack_intr(words: &[u32; 4]) -> IntrContext {
    let baddr_l = field_get(INTR_W0_BADDR_L, words[0]);
    let baddr_m = words[1];
    let baddr_h = field_get(INTR_W2_BADDR_H, words[2]);
    let pasid_l = field_get(INTR_W2_PASID_L, words[2]);
    let pasid_h = field_get(INTR_W3_PASID_H, words[3]);

    IntrContext {
        valid: field_get(INTR_W0_VALID, words[0]) != 0,
        vec: field_get(INTR_W0_VEC, words[0]) as u16,
        int_st: field_get(INTR_W0_INT_ST, words[0]) != 0,
        color: field_get(INTR_W0_COLOR, words[0]) != 0,
        baddr_4k: field_set64(INTR_BADDR_L, baddr_l.into())
            | field_set64(INTR_BADDR_M, baddr_m.into())
            | field_set64(INTR_BADDR_H, baddr_h.into()),
        page_size: field_get(INTR_W2_PAGE_SIZE, words[2]) as u8,
        pidx: field_get(INTR_W2_PIDX, words[2]) as u16,
        at: field_get(INTR_W2_AT, words[2]) != 0,
        host_id: field_get(INTR_W2_HOST_ID, words[2]) as u8,
        pasid: field_set(INTR_PASID_L, pasid_l)
            | field_set(INTR_PASID_H, pasid_h),
        pasid_en: field_get(INTR_W3_PASID_EN, words[3]) != 0,
        func_id: field_get(INTR_W3_FUNC_ID, words[3]) as u16,
    }
}

// Function map context.
const FMAP_W0_QID_BASE: u32 = genmask(11, 0);
const FMAP_W1_QID_MAX: u32 = genmask(12, 0);

pub fn pack_fmap(cfg: &FmapCfg, words: &mut [u32; 2]) -> usize {
    words[0] = field_set(FMAP_W0_QID_BASE, cfg.qbase.into());
    words[1] = field_set(FMAP_W1_QID_MAX, cfg.qmax.into());
    FMAP_CTXT_NUM_WORDS
}

pub fn unpack_fmap(words: &[u32; 2]) -> FmapCfg {
    FmapCfg {
        qbase: field_get(FMAP_W0_QID_BASE, words[0]) as u16,
        qmax: field_get(FMAP_W1_QID_MAX, words[1]) as u16,
    }
}
