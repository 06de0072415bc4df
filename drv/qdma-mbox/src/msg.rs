// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mailbox message codec.
//!
//! A message is a fixed 32-word frame. The head of the frame bit-packs
//! the header — opcode in bits [7:0], status in [15:8], source function
//! in [27:16], destination function in [39:28] — and the payload starts
//! at the next word boundary. Every request opcode has a response
//! opcode at `base + 0x80`, and each opcode's payload placement is fixed
//! here and nowhere else.
//!
//! Word-aligned bulk payloads (CSR snapshots, register lists) overlay
//! little-endian wire structs; bit-packed fields go through the mask
//! helpers.

use drv_qdma::context::{
    marshal_descq_context, marshal_intr_context, unmarshal_descq_context,
    unmarshal_intr_context, DESCQ_CTXT_MARSHAL_WORDS,
};
use drv_qdma_api::*;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive as _;
use zerocopy::byteorder::little_endian::{U16, U32};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Words in a mailbox frame.
pub const MBOX_MSG_REG_MAX: usize = 32;

/// First payload word; the header owns words 0 and 1.
const PAYLOAD: usize = 2;

/// Interrupt-ring contexts per message. Eight rings per function exist,
/// but each ring costs five payload words, so a full set takes two
/// messages.
pub const MBOX_INTR_CTXT_MAX_RINGS: usize = 4;

/// Offset from a request opcode to its response opcode.
pub const RESP_OP_OFFSET: u8 = 0x80;

/// Mailbox message opcodes. Values are the wire encoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum MboxOp {
    VfBye = 0,
    Hello = 1,
    Fmap = 2,
    Csr = 3,
    Qreq = 4,
    QnotifyAdd = 5,
    QnotifyDel = 6,
    GetQactiveCnt = 7,
    QctxtWrt = 8,
    QctxtRd = 9,
    QctxtClr = 10,
    QctxtInv = 11,
    IntrCtxtWrt = 12,
    IntrCtxtRd = 13,
    IntrCtxtClr = 14,
    IntrCtxtInv = 15,
    ResetPrepare = 16,
    ResetDone = 17,
    RegListRead = 18,
    PfBye = 19,
    PfResetVfBye = 20,
}

impl MboxOp {
    pub fn response(&self) -> u8 {
        *self as u8 + RESP_OP_OFFSET
    }
}

// Header fields across words 0 and 1, viewed as one 64-bit value.
const HDR_OP_MASK: u64 = genmask64(7, 0);
const HDR_STATUS_MASK: u64 = genmask64(15, 8);
const HDR_SRC_MASK: u64 = genmask64(27, 16);
const HDR_DST_MASK: u64 = genmask64(39, 28);

/// Per-message metadata of queue-context operations, one payload word.
const QCTXT_QID_MASK: u32 = genmask(15, 0);
const QCTXT_ST_MASK: u32 = bit(16);
const QCTXT_C2H_MASK: u32 = bit(17);
const QCTXT_CMPT_KIND_MASK: u32 = genmask(19, 18);

// DescqConfig flags word.
const CFG_FORCED_EN: u32 = bit(0);
const CFG_EN_BYPASS: u32 = bit(1);
const CFG_IRQ_ARM: u32 = bit(2);
const CFG_WBI_INTVL_EN: u32 = bit(3);
const CFG_WBI_CHK: u32 = bit(4);
const CFG_AT: u32 = bit(5);
const CFG_WBK_EN: u32 = bit(6);
const CFG_IRQ_EN: u32 = bit(7);
const CFG_PFCH_EN: u32 = bit(8);
const CFG_EN_BYPASS_PREFETCH: u32 = bit(9);
const CFG_DIS_OVERFLOW_CHECK: u32 = bit(10);
const CFG_CMPT_INT_EN: u32 = bit(11);
const CFG_CMPT_AT: u32 = bit(12);
const CFG_CMPL_STAT_EN: u32 = bit(13);
const CFG_CMPT_FULL_UPD: u32 = bit(14);
const CFG_DESC_SZ_MASK: u32 = genmask(17, 16);
const CFG_CMPT_DESC_SZ_MASK: u32 = genmask(19, 18);
const CFG_TRIG_MODE_MASK: u32 = genmask(22, 20);

const CFG_FUNC_ID_MASK: u32 = genmask(11, 0);
const CFG_INTR_ID_MASK: u32 = genmask(26, 16);
const CFG_INTR_AGGR: u32 = bit(27);

// Device-attribute wire words of the hello response.
const CAPA_NUM_QS_MASK: u32 = genmask(15, 0);
const CAPA_NUM_PFS_MASK: u32 = genmask(19, 16);
const CAPA_MM_CHANNEL_MAX_MASK: u32 = genmask(27, 20);
const CAPB_FLR_PRESENT: u32 = bit(0);
const CAPB_ST_EN: u32 = bit(1);
const CAPB_MM_EN: u32 = bit(2);
const CAPB_MM_CMPT_EN: u32 = bit(3);
const CAPB_MAILBOX_EN: u32 = bit(4);
const CAPB_MAILBOX_INTR: u32 = bit(5);
const CAPB_DEBUG_MODE: u32 = bit(6);
const CAPB_DESC_ENG_MODE_MASK: u32 = genmask(8, 7);
const CAPB_SW_DESC_64B: u32 = bit(9);
const CAPB_CMPT_DESC_64B: u32 = bit(10);
const CAPB_CMPT_OVF_CHK_DIS: u32 = bit(11);
const CAPB_DYNAMIC_BAR: u32 = bit(12);
const CAPB_LEGACY_INTR: u32 = bit(13);
const CAPB_CMPT_TRIG_COUNT_TIMER: u32 = bit(14);
const CAPB_QID2VEC_CTX: u32 = bit(15);

/// CSR snapshot as it crosses the wire.
#[derive(FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct CsrInfoWire {
    ringsz: [U16; GLOBAL_CSR_ARRAY_SZ],
    bufsz: [U16; GLOBAL_CSR_ARRAY_SZ],
    timer_cnt: [u8; GLOBAL_CSR_ARRAY_SZ],
    cnt_thres: [u8; GLOBAL_CSR_ARRAY_SZ],
    wb_intvl: U16,
    rsvd: U16,
}

/// One register read as it crosses the wire.
#[derive(Copy, Clone, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RegDataWire {
    addr: U32,
    val: U32,
}

/// One 32-word mailbox frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MboxMessage(pub [u32; MBOX_MSG_REG_MAX]);

impl Default for MboxMessage {
    fn default() -> Self {
        Self([0; MBOX_MSG_REG_MAX])
    }
}

impl MboxMessage {
    pub fn raw(&self) -> &[u32; MBOX_MSG_REG_MAX] {
        &self.0
    }

    pub fn raw_mut(&mut self) -> &mut [u32; MBOX_MSG_REG_MAX] {
        &mut self.0
    }

    fn hdr(&self) -> u64 {
        u64::from(self.0[0]) | (u64::from(self.0[1]) << 32)
    }

    fn set_hdr_field(&mut self, mask: u64, val: u64) {
        let hdr = (self.hdr() & !mask) | field_set64(mask, val);
        self.0[0] = hdr as u32;
        self.0[1] = (hdr >> 32) as u32;
    }

    pub fn op_raw(&self) -> u8 {
        field_get64(HDR_OP_MASK, self.hdr()) as u8
    }

    pub fn op(&self) -> Option<MboxOp> {
        MboxOp::from_u8(self.op_raw())
    }

    pub fn set_op_raw(&mut self, op: u8) {
        self.set_hdr_field(HDR_OP_MASK, op.into());
    }

    pub fn status(&self) -> i8 {
        field_get64(HDR_STATUS_MASK, self.hdr()) as u8 as i8
    }

    pub fn set_status(&mut self, status: i8) {
        self.set_hdr_field(HDR_STATUS_MASK, (status as u8).into());
    }

    /// The response status as a `Result`, the way a VF consumes it.
    pub fn status_result(&self) -> Result<(), QdmaError> {
        match QdmaError::from_code(self.status()) {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }

    pub fn src_func_id(&self) -> u16 {
        field_get64(HDR_SRC_MASK, self.hdr()) as u16
    }

    pub fn set_src_func_id(&mut self, func_id: u16) {
        self.set_hdr_field(HDR_SRC_MASK, func_id.into());
    }

    pub fn dst_func_id(&self) -> u16 {
        field_get64(HDR_DST_MASK, self.hdr()) as u16
    }

    pub fn set_dst_func_id(&mut self, func_id: u16) {
        self.set_hdr_field(HDR_DST_MASK, func_id.into());
    }

    /// The hardware-fault signature: a raised in-message flag but a
    /// frame of all zeros.
    pub fn is_all_zero(&self) -> bool {
        self.0.iter().all(|&w| w == 0)
    }

    /// Whether this frame is the response to `sent`.
    pub fn is_response_to(&self, sent: &MboxMessage) -> bool {
        u32::from(sent.op_raw()) + u32::from(RESP_OP_OFFSET)
            == u32::from(self.op_raw())
    }

    fn payload_bytes(&self) -> &[u8] {
        self.0[PAYLOAD..].as_bytes()
    }

    fn payload_bytes_mut(&mut self) -> &mut [u8] {
        self.0[PAYLOAD..].as_mut_bytes()
    }

    fn request(op: MboxOp, src_func_id: u16) -> Self {
        let mut m = Self::default();
        m.set_op_raw(op as u8);
        m.set_src_func_id(src_func_id);
        m
    }

    fn pf_notice(op: MboxOp, src_func_id: u16, dst_func_id: u16) -> Self {
        let mut m = Self::request(op, src_func_id);
        m.set_dst_func_id(dst_func_id);
        m
    }

    // -- VF -> PF requests ---------------------------------------------

    /// Registration: announces the VF and asks for its queue range.
    pub fn vf_hello(src_func_id: u16, qmax: u16, qbase: i32) -> Self {
        let mut m = Self::request(MboxOp::Hello, src_func_id);
        m.0[PAYLOAD] = qbase as u32;
        m.0[PAYLOAD + 1] = qmax.into();
        m
    }

    /// Unregistration; no response expected.
    pub fn vf_bye(src_func_id: u16) -> Self {
        Self::request(MboxOp::VfBye, src_func_id)
    }

    /// VF acknowledgment of a PF-initiated reset.
    pub fn vf_reset_bye(src_func_id: u16) -> Self {
        Self::request(MboxOp::PfResetVfBye, src_func_id)
    }

    /// Queue-range request.
    pub fn vf_qreq(src_func_id: u16, qmax: u16, qbase: i32) -> Self {
        let mut m = Self::request(MboxOp::Qreq, src_func_id);
        m.0[PAYLOAD] = qbase as u32;
        m.0[PAYLOAD + 1] = qmax.into();
        m
    }

    /// Function-map programming request.
    pub fn vf_fmap_prog(src_func_id: u16, qmax: u16, qbase: i32) -> Self {
        let mut m = Self::request(MboxOp::Fmap, src_func_id);
        m.0[PAYLOAD] = qbase as u32;
        m.0[PAYLOAD + 1] = qmax.into();
        m
    }

    /// Reads the qbase/qmax pair carried by hello, fmap and qreq
    /// messages and their responses.
    pub fn qinfo(&self) -> (i32, u16) {
        (self.0[PAYLOAD] as i32, self.0[PAYLOAD + 1] as u16)
    }

    pub fn set_qinfo(&mut self, qbase: i32, qmax: u16) {
        self.0[PAYLOAD] = qbase as u32;
        self.0[PAYLOAD + 1] = qmax.into();
    }

    /// CSR snapshot request.
    pub fn vf_csr_read(src_func_id: u16) -> Self {
        Self::request(MboxOp::Csr, src_func_id)
    }

    /// Active-queue notification.
    pub fn vf_notify_qadd(src_func_id: u16, qid_hw: u16, q_type: QueueType) -> Self {
        let mut m = Self::request(MboxOp::QnotifyAdd, src_func_id);
        m.0[PAYLOAD] = qid_hw.into();
        m.0[PAYLOAD + 1] = q_type as u32;
        m
    }

    pub fn vf_notify_qdel(src_func_id: u16, qid_hw: u16, q_type: QueueType) -> Self {
        let mut m = Self::request(MboxOp::QnotifyDel, src_func_id);
        m.0[PAYLOAD] = qid_hw.into();
        m.0[PAYLOAD + 1] = q_type as u32;
        m
    }

    pub fn qnotify_info(&self) -> (u16, Option<QueueType>) {
        (
            self.0[PAYLOAD] as u16,
            QueueType::from_u32(self.0[PAYLOAD + 1]),
        )
    }

    pub fn vf_get_active_qcnt(src_func_id: u16) -> Self {
        Self::request(MboxOp::GetQactiveCnt, src_func_id)
    }

    /// Grouped register dump request.
    pub fn vf_reg_list_read(src_func_id: u16, group_num: u16) -> Self {
        let mut m = Self::request(MboxOp::RegListRead, src_func_id);
        m.0[PAYLOAD] = field_set(genmask(15, 0), group_num.into());
        m
    }

    fn qctxt_meta(
        op: MboxOp,
        src_func_id: u16,
        qid_hw: u16,
        st: bool,
        c2h: bool,
        cmpt_kind: CmptCtxtKind,
    ) -> Self {
        let mut m = Self::request(op, src_func_id);
        m.0[PAYLOAD] = field_set(QCTXT_QID_MASK, qid_hw.into())
            | field_set(QCTXT_ST_MASK, st.into())
            | field_set(QCTXT_C2H_MASK, c2h.into())
            | field_set(QCTXT_CMPT_KIND_MASK, cmpt_kind as u32);
        m
    }

    /// Proxied queue-context write, carrying the full semantic queue
    /// configuration for the PF to compose and program.
    pub fn vf_qctxt_write(
        src_func_id: u16,
        qid_hw: u16,
        st: bool,
        c2h: bool,
        cmpt_kind: CmptCtxtKind,
        cfg: &DescqConfig,
    ) -> Self {
        let mut m = Self::qctxt_meta(
            MboxOp::QctxtWrt,
            src_func_id,
            qid_hw,
            st,
            c2h,
            cmpt_kind,
        );
        let p = PAYLOAD + 1;
        m.0[p] = cfg.ring_bs_addr as u32;
        m.0[p + 1] = (cfg.ring_bs_addr >> 32) as u32;
        m.0[p + 2] = cfg.cmpt_ring_bs_addr as u32;
        m.0[p + 3] = (cfg.cmpt_ring_bs_addr >> 32) as u32;
        m.0[p + 4] = field_set(CFG_FORCED_EN, cfg.forced_en.into())
            | field_set(CFG_EN_BYPASS, cfg.en_bypass.into())
            | field_set(CFG_IRQ_ARM, cfg.irq_arm.into())
            | field_set(CFG_WBI_INTVL_EN, cfg.wbi_intvl_en.into())
            | field_set(CFG_WBI_CHK, cfg.wbi_chk.into())
            | field_set(CFG_AT, cfg.at.into())
            | field_set(CFG_WBK_EN, cfg.wbk_en.into())
            | field_set(CFG_IRQ_EN, cfg.irq_en.into())
            | field_set(CFG_PFCH_EN, cfg.pfch_en.into())
            | field_set(CFG_EN_BYPASS_PREFETCH, cfg.en_bypass_prefetch.into())
            | field_set(CFG_DIS_OVERFLOW_CHECK, cfg.dis_overflow_check.into())
            | field_set(CFG_CMPT_INT_EN, cfg.cmpt_int_en.into())
            | field_set(CFG_CMPT_AT, cfg.cmpt_at.into())
            | field_set(CFG_CMPL_STAT_EN, cfg.cmpl_stat_en.into())
            | field_set(CFG_CMPT_FULL_UPD, cfg.cmpt_full_upd.into())
            | field_set(CFG_DESC_SZ_MASK, cfg.desc_sz.into())
            | field_set(CFG_CMPT_DESC_SZ_MASK, cfg.cmpt_desc_sz.into())
            | field_set(CFG_TRIG_MODE_MASK, cfg.triggermode.into());
        m.0[p + 5] = field_set(CFG_FUNC_ID_MASK, cfg.func_id.into())
            | field_set(CFG_INTR_ID_MASK, cfg.intr_id.into())
            | field_set(CFG_INTR_AGGR, cfg.intr_aggr.into());
        m.0[p + 6] = field_set(genmask(7, 0), cfg.cnt_thres.into())
            | field_set(genmask(15, 8), cfg.timer_thres.into());
        m.0[p + 7] = field_set(genmask(15, 0), cfg.ringsz.into())
            | field_set(genmask(31, 16), cfg.bufsz.into());
        m.0[p + 8] = field_set(genmask(15, 0), cfg.cmpt_ringsz.into());
        m
    }

    pub fn vf_qctxt_read(
        src_func_id: u16,
        qid_hw: u16,
        st: bool,
        c2h: bool,
        cmpt_kind: CmptCtxtKind,
    ) -> Self {
        Self::qctxt_meta(MboxOp::QctxtRd, src_func_id, qid_hw, st, c2h, cmpt_kind)
    }

    pub fn vf_qctxt_clear(
        src_func_id: u16,
        qid_hw: u16,
        st: bool,
        c2h: bool,
        cmpt_kind: CmptCtxtKind,
    ) -> Self {
        Self::qctxt_meta(MboxOp::QctxtClr, src_func_id, qid_hw, st, c2h, cmpt_kind)
    }

    pub fn vf_qctxt_invalidate(
        src_func_id: u16,
        qid_hw: u16,
        st: bool,
        c2h: bool,
        cmpt_kind: CmptCtxtKind,
    ) -> Self {
        Self::qctxt_meta(MboxOp::QctxtInv, src_func_id, qid_hw, st, c2h, cmpt_kind)
    }

    /// Reads the per-message metadata of a queue-context operation.
    pub fn qctxt_info(&self) -> (u16, bool, bool, Option<CmptCtxtKind>) {
        let w = self.0[PAYLOAD];
        (
            field_get(QCTXT_QID_MASK, w) as u16,
            field_get(QCTXT_ST_MASK, w) != 0,
            field_get(QCTXT_C2H_MASK, w) != 0,
            CmptCtxtKind::from_u32(field_get(QCTXT_CMPT_KIND_MASK, w)),
        )
    }

    /// Reads the queue configuration out of a context-write request.
    pub fn qctxt_config(&self) -> DescqConfig {
        let p = PAYLOAD + 1;
        let flags = self.0[p + 4];
        DescqConfig {
            ring_bs_addr: u64::from(self.0[p])
                | (u64::from(self.0[p + 1]) << 32),
            cmpt_ring_bs_addr: u64::from(self.0[p + 2])
                | (u64::from(self.0[p + 3]) << 32),
            forced_en: flags & CFG_FORCED_EN != 0,
            en_bypass: flags & CFG_EN_BYPASS != 0,
            irq_arm: flags & CFG_IRQ_ARM != 0,
            wbi_intvl_en: flags & CFG_WBI_INTVL_EN != 0,
            wbi_chk: flags & CFG_WBI_CHK != 0,
            at: flags & CFG_AT != 0,
            wbk_en: flags & CFG_WBK_EN != 0,
            irq_en: flags & CFG_IRQ_EN != 0,
            pfch_en: flags & CFG_PFCH_EN != 0,
            en_bypass_prefetch: flags & CFG_EN_BYPASS_PREFETCH != 0,
            dis_overflow_check: flags & CFG_DIS_OVERFLOW_CHECK != 0,
            cmpt_int_en: flags & CFG_CMPT_INT_EN != 0,
            cmpt_at: flags & CFG_CMPT_AT != 0,
            cmpl_stat_en: flags & CFG_CMPL_STAT_EN != 0,
            cmpt_full_upd: flags & CFG_CMPT_FULL_UPD != 0,
            desc_sz: field_get(CFG_DESC_SZ_MASK, flags) as u8,
            cmpt_desc_sz: field_get(CFG_CMPT_DESC_SZ_MASK, flags) as u8,
            triggermode: field_get(CFG_TRIG_MODE_MASK, flags) as u8,
            func_id: field_get(CFG_FUNC_ID_MASK, self.0[p + 5]) as u16,
            intr_id: field_get(CFG_INTR_ID_MASK, self.0[p + 5]) as u16,
            intr_aggr: self.0[p + 5] & CFG_INTR_AGGR != 0,
            cnt_thres: field_get(genmask(7, 0), self.0[p + 6]) as u8,
            timer_thres: field_get(genmask(15, 8), self.0[p + 6]) as u8,
            ringsz: field_get(genmask(15, 0), self.0[p + 7]) as u16,
            bufsz: field_get(genmask(31, 16), self.0[p + 7]) as u16,
            cmpt_ringsz: field_get(genmask(15, 0), self.0[p + 8]) as u16,
        }
    }

    fn intr_ctxt(
        op: MboxOp,
        src_func_id: u16,
        variant: IpVariant,
        rings: &[(u32, IntrContext)],
    ) -> Result<Self, QdmaError> {
        if rings.len() > MBOX_INTR_CTXT_MAX_RINGS {
            return Err(QdmaError::InvalidParam);
        }
        let mut m = Self::request(op, src_func_id);
        m.0[PAYLOAD] = rings.len() as u32;
        let mut p = PAYLOAD + 1;
        for (ring_index, ctxt) in rings {
            let mut words = [0u32; 4];
            marshal_intr_context(variant, ctxt, &mut words);
            m.0[p] = *ring_index;
            m.0[p + 1..p + 5].copy_from_slice(&words);
            p += 5;
        }
        Ok(m)
    }

    /// Proxied interrupt-ring context write: `(ring index, context)`
    /// pairs, at most [`MBOX_INTR_CTXT_MAX_RINGS`] per message.
    pub fn vf_intr_ctxt_write(
        src_func_id: u16,
        variant: IpVariant,
        rings: &[(u32, IntrContext)],
    ) -> Result<Self, QdmaError> {
        Self::intr_ctxt(MboxOp::IntrCtxtWrt, src_func_id, variant, rings)
    }

    pub fn vf_intr_ctxt_read(
        src_func_id: u16,
        variant: IpVariant,
        rings: &[(u32, IntrContext)],
    ) -> Result<Self, QdmaError> {
        Self::intr_ctxt(MboxOp::IntrCtxtRd, src_func_id, variant, rings)
    }

    pub fn vf_intr_ctxt_clear(
        src_func_id: u16,
        variant: IpVariant,
        rings: &[(u32, IntrContext)],
    ) -> Result<Self, QdmaError> {
        Self::intr_ctxt(MboxOp::IntrCtxtClr, src_func_id, variant, rings)
    }

    pub fn vf_intr_ctxt_invalidate(
        src_func_id: u16,
        variant: IpVariant,
        rings: &[(u32, IntrContext)],
    ) -> Result<Self, QdmaError> {
        Self::intr_ctxt(MboxOp::IntrCtxtInv, src_func_id, variant, rings)
    }

    /// Number of rings in an interrupt-context message.
    pub fn intr_ctxt_num_rings(&self) -> usize {
        (self.0[PAYLOAD] as usize).min(MBOX_INTR_CTXT_MAX_RINGS)
    }

    /// Ring index and context at position `i`.
    pub fn intr_ctxt_ring(
        &self,
        variant: IpVariant,
        i: usize,
    ) -> Option<(u32, IntrContext)> {
        if i >= self.intr_ctxt_num_rings() {
            return None;
        }
        let p = PAYLOAD + 1 + i * 5;
        let mut words = [0u32; 4];
        words.copy_from_slice(&self.0[p + 1..p + 5]);
        Some((self.0[p], unmarshal_intr_context(variant, &words)))
    }

    pub fn set_intr_ctxt_ring(
        &mut self,
        variant: IpVariant,
        i: usize,
        ring_index: u32,
        ctxt: &IntrContext,
    ) {
        let p = PAYLOAD + 1 + i * 5;
        let mut words = [0u32; 4];
        marshal_intr_context(variant, ctxt, &mut words);
        self.0[p] = ring_index;
        self.0[p + 1..p + 5].copy_from_slice(&words);
    }

    pub fn set_intr_ctxt_num_rings(&mut self, n: usize) {
        self.0[PAYLOAD] = n as u32;
    }

    // -- PF -> VF notices ----------------------------------------------

    pub fn pf_reset_prepare(src_func_id: u16, dst_func_id: u16) -> Self {
        Self::pf_notice(MboxOp::ResetPrepare, src_func_id, dst_func_id)
    }

    pub fn pf_reset_done(src_func_id: u16, dst_func_id: u16) -> Self {
        Self::pf_notice(MboxOp::ResetDone, src_func_id, dst_func_id)
    }

    pub fn pf_offline(src_func_id: u16, dst_func_id: u16) -> Self {
        Self::pf_notice(MboxOp::PfBye, src_func_id, dst_func_id)
    }

    // -- Response payloads ---------------------------------------------

    /// Fills a hello response with the range, device index and
    /// capabilities.
    pub fn set_hello_resp(
        &mut self,
        qbase: i32,
        qmax: u16,
        dma_device_index: u32,
        cap: &DeviceAttributes,
    ) {
        self.set_qinfo(qbase, qmax);
        self.0[PAYLOAD + 2] = dma_device_index;
        self.0[PAYLOAD + 3] =
            field_set(CAPA_NUM_QS_MASK, cap.num_qs.into())
                | field_set(CAPA_NUM_PFS_MASK, cap.num_pfs.into())
                | field_set(CAPA_MM_CHANNEL_MAX_MASK, cap.mm_channel_max.into());
        self.0[PAYLOAD + 4] = field_set(CAPB_FLR_PRESENT, cap.flr_present.into())
            | field_set(CAPB_ST_EN, cap.st_en.into())
            | field_set(CAPB_MM_EN, cap.mm_en.into())
            | field_set(CAPB_MM_CMPT_EN, cap.mm_cmpt_en.into())
            | field_set(CAPB_MAILBOX_EN, cap.mailbox_en.into())
            | field_set(CAPB_MAILBOX_INTR, cap.mailbox_intr.into())
            | field_set(CAPB_DEBUG_MODE, cap.debug_mode.into())
            | field_set(CAPB_DESC_ENG_MODE_MASK, cap.desc_eng_mode as u32)
            | field_set(CAPB_SW_DESC_64B, cap.sw_desc_64b.into())
            | field_set(CAPB_CMPT_DESC_64B, cap.cmpt_desc_64b.into())
            | field_set(CAPB_CMPT_OVF_CHK_DIS, cap.cmpt_ovf_chk_dis.into())
            | field_set(CAPB_DYNAMIC_BAR, cap.dynamic_bar.into())
            | field_set(CAPB_LEGACY_INTR, cap.legacy_intr.into())
            | field_set(
                CAPB_CMPT_TRIG_COUNT_TIMER,
                cap.cmpt_trig_count_timer.into(),
            )
            | field_set(CAPB_QID2VEC_CTX, cap.qid2vec_ctx.into());
    }

    /// Device info carried by a hello response.
    pub fn hello_resp_info(&self) -> (DeviceAttributes, u32) {
        let wa = self.0[PAYLOAD + 3];
        let wb = self.0[PAYLOAD + 4];
        let cap = DeviceAttributes {
            num_qs: field_get(CAPA_NUM_QS_MASK, wa) as u16,
            num_pfs: field_get(CAPA_NUM_PFS_MASK, wa) as u8,
            mm_channel_max: field_get(CAPA_MM_CHANNEL_MAX_MASK, wa) as u8,
            flr_present: wb & CAPB_FLR_PRESENT != 0,
            st_en: wb & CAPB_ST_EN != 0,
            mm_en: wb & CAPB_MM_EN != 0,
            mm_cmpt_en: wb & CAPB_MM_CMPT_EN != 0,
            mailbox_en: wb & CAPB_MAILBOX_EN != 0,
            mailbox_intr: wb & CAPB_MAILBOX_INTR != 0,
            debug_mode: wb & CAPB_DEBUG_MODE != 0,
            desc_eng_mode: DescEngMode::from_u32(field_get(
                CAPB_DESC_ENG_MODE_MASK,
                wb,
            ))
            .unwrap_or_default(),
            sw_desc_64b: wb & CAPB_SW_DESC_64B != 0,
            cmpt_desc_64b: wb & CAPB_CMPT_DESC_64B != 0,
            cmpt_ovf_chk_dis: wb & CAPB_CMPT_OVF_CHK_DIS != 0,
            dynamic_bar: wb & CAPB_DYNAMIC_BAR != 0,
            legacy_intr: wb & CAPB_LEGACY_INTR != 0,
            cmpt_trig_count_timer: wb & CAPB_CMPT_TRIG_COUNT_TIMER != 0,
            qid2vec_ctx: wb & CAPB_QID2VEC_CTX != 0,
        };
        (cap, self.0[PAYLOAD + 2])
    }

    pub fn set_csr_resp(&mut self, info: &CsrInfo) {
        let wire = CsrInfoWire {
            ringsz: info.ringsz.map(U16::new),
            bufsz: info.bufsz.map(U16::new),
            timer_cnt: info.timer_cnt,
            cnt_thres: info.cnt_thres,
            wb_intvl: U16::new(info.wb_intvl),
            rsvd: U16::new(0),
        };
        // The wire struct is sized to fit the payload; this cannot fail.
        let _ = wire.write_to_prefix(self.payload_bytes_mut());
    }

    pub fn csr_resp_info(&self) -> Result<CsrInfo, QdmaError> {
        let (wire, _) = CsrInfoWire::read_from_prefix(self.payload_bytes())
            .map_err(|_| QdmaError::Mbox(MboxError::InvalidMessage))?;
        Ok(CsrInfo {
            ringsz: wire.ringsz.map(|v| v.get()),
            bufsz: wire.bufsz.map(|v| v.get()),
            timer_cnt: wire.timer_cnt,
            cnt_thres: wire.cnt_thres,
            wb_intvl: wire.wb_intvl.get(),
        })
    }

    pub fn set_active_qcnt_resp(&mut self, h2c: u32, c2h: u32, cmpt: u32) {
        self.0[PAYLOAD] = h2c;
        self.0[PAYLOAD + 1] = c2h;
        self.0[PAYLOAD + 2] = cmpt;
    }

    pub fn active_qcnt_info(&self, q_type: QueueType) -> u32 {
        self.0[PAYLOAD + q_type as usize]
    }

    /// Group number of a register-list request.
    pub fn reg_list_group(&self) -> u16 {
        field_get(genmask(15, 0), self.0[PAYLOAD]) as u16
    }

    pub fn set_reg_list_resp(
        &mut self,
        num_regs: u16,
        regs: &[RegData; MAX_REGISTER_DUMP],
    ) {
        self.0[PAYLOAD] = field_set(genmask(15, 0), self.reg_list_group().into())
            | field_set(genmask(31, 16), num_regs.into());
        let mut wire = [RegDataWire {
            addr: U32::new(0),
            val: U32::new(0),
        }; MAX_REGISTER_DUMP];
        for (w, r) in wire.iter_mut().zip(regs.iter()) {
            w.addr = U32::new(r.addr);
            w.val = U32::new(r.val);
        }
        let _ = wire.write_to_prefix(self.0[PAYLOAD + 1..].as_mut_bytes());
    }

    pub fn reg_list_info(
        &self,
        out: &mut [RegData; MAX_REGISTER_DUMP],
    ) -> Result<u16, QdmaError> {
        let num = field_get(genmask(31, 16), self.0[PAYLOAD]) as u16;
        if usize::from(num) > MAX_REGISTER_DUMP {
            return Err(QdmaError::Mbox(MboxError::InvalidMessage));
        }
        let (wire, _) = <[RegDataWire; MAX_REGISTER_DUMP]>::read_from_prefix(
            self.0[PAYLOAD + 1..].as_bytes(),
        )
        .map_err(|_| QdmaError::Mbox(MboxError::InvalidMessage))?;
        for (r, w) in out.iter_mut().zip(wire.iter()) {
            r.addr = w.addr.get();
            r.val = w.val.get();
        }
        Ok(num)
    }

    /// Fills a context-read response with the marshaled bundle.
    pub fn set_qctxt_resp(&mut self, variant: IpVariant, ctxt: &DescqContext) {
        let mut words = [0u32; DESCQ_CTXT_MARSHAL_WORDS];
        marshal_descq_context(variant, ctxt, &mut words);
        self.0[PAYLOAD + 1..PAYLOAD + 1 + DESCQ_CTXT_MARSHAL_WORDS]
            .copy_from_slice(&words);
    }

    /// Context bundle carried by a context-read response.
    pub fn qctxt_resp_info(&self, variant: IpVariant) -> DescqContext {
        let mut words = [0u32; DESCQ_CTXT_MARSHAL_WORDS];
        words.copy_from_slice(
            &self.0[PAYLOAD + 1..PAYLOAD + 1 + DESCQ_CTXT_MARSHAL_WORDS],
        );
        unmarshal_descq_context(variant, &words)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_packs_forty_bits() {
        let mut m = MboxMessage::default();
        m.set_op_raw(0xAB);
        m.set_status(-5);
        m.set_src_func_id(0x123);
        m.set_dst_func_id(0xFFF);

        assert_eq!(m.op_raw(), 0xAB);
        assert_eq!(m.status(), -5);
        assert_eq!(m.src_func_id(), 0x123);
        assert_eq!(m.dst_func_id(), 0xFFF);

        // The destination's high bits live in word 1.
        assert_eq!(m.0[1] & 0xFF, 0xFF);
        // And nothing leaks past the header.
        assert_eq!(m.0[1] & !0xFF, 0);
    }

    #[test]
    fn header_fields_are_independent() {
        let mut m = MboxMessage::default();
        m.set_src_func_id(0xABC);
        m.set_dst_func_id(0x555);
        m.set_op_raw(MboxOp::Hello as u8);
        m.set_status(0);
        assert_eq!(m.src_func_id(), 0xABC);
        assert_eq!(m.dst_func_id(), 0x555);
        assert_eq!(m.op(), Some(MboxOp::Hello));
    }

    #[test]
    fn response_opcode_offset() {
        let sent = MboxMessage::vf_hello(5, 0, -1);
        let mut rsp = MboxMessage::default();
        rsp.set_op_raw(MboxOp::Hello.response());
        assert!(rsp.is_response_to(&sent));
        assert_eq!(MboxOp::Hello.response(), 0x81);

        rsp.set_op_raw(MboxOp::Qreq.response());
        assert!(!rsp.is_response_to(&sent));
    }

    #[test]
    fn qctxt_config_roundtrip() {
        let cfg = DescqConfig {
            ring_bs_addr: 0x1234_5678_9ABC_D000,
            cmpt_ring_bs_addr: 0xFEDC_BA98_7654_0000,
            en_bypass: true,
            wbk_en: true,
            pfch_en: true,
            cmpl_stat_en: true,
            desc_sz: 1,
            cmpt_desc_sz: 1,
            triggermode: 5,
            func_id: 0x7FF,
            cnt_thres: 32,
            timer_thres: 25,
            intr_id: 0x55,
            intr_aggr: true,
            ringsz: 256,
            bufsz: 2048,
            cmpt_ringsz: 256,
            ..Default::default()
        };
        let m = MboxMessage::vf_qctxt_write(
            9,
            10,
            true,
            true,
            CmptCtxtKind::WithSt,
            &cfg,
        );
        assert_eq!(m.qctxt_config(), cfg);
        assert_eq!(
            m.qctxt_info(),
            (10, true, true, Some(CmptCtxtKind::WithSt))
        );
    }

    #[test]
    fn csr_resp_roundtrip() {
        let mut info = CsrInfo::default();
        for i in 0..GLOBAL_CSR_ARRAY_SZ {
            info.ringsz[i] = 100 + i as u16;
            info.bufsz[i] = 4096;
            info.timer_cnt[i] = i as u8;
            info.cnt_thres[i] = 2 * i as u8;
        }
        info.wb_intvl = 3;

        let mut m = MboxMessage::default();
        m.set_csr_resp(&info);
        assert_eq!(m.csr_resp_info().unwrap(), info);
    }

    #[test]
    fn hello_resp_roundtrip() {
        let cap = DeviceAttributes {
            num_pfs: 4,
            num_qs: 2048,
            st_en: true,
            mm_en: true,
            mailbox_en: true,
            cmpt_desc_64b: true,
            mm_channel_max: 1,
            ..Default::default()
        };
        let mut m = MboxMessage::default();
        m.set_hello_resp(32, 16, 1, &cap);
        assert_eq!(m.qinfo(), (32, 16));
        let (got, dev_idx) = m.hello_resp_info();
        assert_eq!(got, cap);
        assert_eq!(dev_idx, 1);
    }

    #[test]
    fn reg_list_roundtrip() {
        let mut regs = [RegData::default(); MAX_REGISTER_DUMP];
        for (i, r) in regs.iter_mut().enumerate() {
            r.addr = 0x100 + (i as u32) * 4;
            r.val = 0xA000_0000 | i as u32;
        }
        let mut m = MboxMessage::vf_reg_list_read(3, 2);
        assert_eq!(m.reg_list_group(), 2);

        m.set_reg_list_resp(10, &regs);
        let mut out = [RegData::default(); MAX_REGISTER_DUMP];
        assert_eq!(m.reg_list_info(&mut out).unwrap(), 10);
        assert_eq!(out[..10], regs[..10]);
    }

    #[test]
    fn all_zero_detection() {
        let m = MboxMessage::default();
        assert!(m.is_all_zero());
        let m = MboxMessage::vf_bye(1);
        assert!(!m.is_all_zero());
    }
}
