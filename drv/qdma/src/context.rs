// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indirect-context engine.
//!
//! All per-queue hardware state is programmed through one command
//! register and a small window of data words: software fills the window,
//! writes an opcode + context selector + queue id into the command
//! register, and polls a busy bit. The register-access lock is held from
//! the first window write until the busy bit drains, so no other user of
//! the window can interleave.
//!
//! Word layouts are variant-specific and live in the submodules; the
//! engine here is layout-agnostic.

mod eqdma;
mod s80;
mod soft;

use crate::{hw_monitor_reg, regs, Qdma, QdmaBus};
use crate::{REG_POLL_DFLT_INTERVAL_US, REG_POLL_DFLT_TIMEOUT_US};
use drv_qdma_api::*;
use ringbuf::{ringbuf, ringbuf_entry};

/// Context selector values of the indirect command register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CtxtSel {
    SwC2h = 0,
    SwH2c = 1,
    HwC2h = 2,
    HwH2c = 3,
    CrC2h = 4,
    CrH2c = 5,
    Cmpt = 6,
    Pfetch = 7,
    IntCoal = 8,
    Fmap = 12,
}

impl CtxtSel {
    fn sw(dir: QueueDirection) -> Self {
        if dir.is_c2h() {
            Self::SwC2h
        } else {
            Self::SwH2c
        }
    }

    fn hw(dir: QueueDirection) -> Self {
        if dir.is_c2h() {
            Self::HwC2h
        } else {
            Self::HwH2c
        }
    }

    fn credit(dir: QueueDirection) -> Self {
        if dir.is_c2h() {
            Self::CrC2h
        } else {
            Self::CrH2c
        }
    }
}

// Indirect command register layout.
const IND_CMD_OP_MASK: u32 = genmask(2, 0);
const IND_CMD_SEL_MASK: u32 = genmask(14, 3);
const IND_CMD_QID_MASK: u32 = genmask(26, 15);
const IND_CMD_BUSY_MASK: u32 = bit(27);

// Opcode encodings.
const CMD_CLR: u32 = 0;
const CMD_WR: u32 = 1;
const CMD_RD: u32 = 2;
const CMD_INV: u32 = 3;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    Cmd(u32),
    BusyTimeout(u32),
}
ringbuf!(Trace, 32, Trace::None);

/// The window geometry of one IP variant.
struct Window {
    data: u32,
    mask: u32,
    cmd: u32,
    num_words: usize,
}

fn window(variant: IpVariant) -> Window {
    match variant {
        IpVariant::HardS80Qdma => Window {
            data: regs::s80::IND_CTXT_DATA,
            mask: regs::s80::IND_CTXT_MASK,
            cmd: regs::s80::IND_CTXT_CMD,
            num_words: regs::s80::IND_CTXT_DATA_NUM_REGS,
        },
        _ => Window {
            data: regs::soft::IND_CTXT_DATA,
            mask: regs::soft::IND_CTXT_MASK,
            cmd: regs::soft::IND_CTXT_CMD,
            num_words: 8,
        },
    }
}

fn cmd_word(op: u32, sel: CtxtSel, qid: u16) -> u32 {
    field_set(IND_CMD_OP_MASK, op)
        | field_set(IND_CMD_SEL_MASK, sel as u32)
        | field_set(IND_CMD_QID_MASK, u32::from(qid))
}

/// Issues a data-less command (clear/invalidate) and drains the busy bit.
fn indirect_cmd<B: QdmaBus>(
    dev: &Qdma<B>,
    op: u32,
    sel: CtxtSel,
    qid: u16,
) -> Result<(), QdmaError> {
    let w = window(dev.variant());
    let bus = dev.bus();
    let cmd = cmd_word(op, sel, qid);

    bus.reg_access_lock();
    ringbuf_entry!(Trace::Cmd(cmd));
    bus.reg_write(w.cmd, cmd);
    let rv = hw_monitor_reg(
        bus,
        w.cmd,
        IND_CMD_BUSY_MASK,
        0,
        REG_POLL_DFLT_INTERVAL_US,
        REG_POLL_DFLT_TIMEOUT_US,
    );
    bus.reg_access_release();

    if rv.is_err() {
        ringbuf_entry!(Trace::BusyTimeout(cmd));
        bus.log_error("qdma: indirect context command timed out");
        return Err(QdmaError::BusyTimeout);
    }
    Ok(())
}

fn indirect_clear<B: QdmaBus>(
    dev: &Qdma<B>,
    sel: CtxtSel,
    qid: u16,
) -> Result<(), QdmaError> {
    indirect_cmd(dev, CMD_CLR, sel, qid)
}

fn indirect_invalidate<B: QdmaBus>(
    dev: &Qdma<B>,
    sel: CtxtSel,
    qid: u16,
) -> Result<(), QdmaError> {
    indirect_cmd(dev, CMD_INV, sel, qid)
}

/// Fills the window with `data` (zero-padded), all-ones masks, and the
/// write command, then drains the busy bit.
fn indirect_write<B: QdmaBus>(
    dev: &Qdma<B>,
    sel: CtxtSel,
    qid: u16,
    data: &[u32],
) -> Result<(), QdmaError> {
    let w = window(dev.variant());
    if data.len() > w.num_words {
        return Err(QdmaError::InvalidParam);
    }
    let bus = dev.bus();
    let cmd = cmd_word(CMD_WR, sel, qid);

    bus.reg_access_lock();
    for i in 0..w.num_words {
        let v = data.get(i).copied().unwrap_or(0);
        bus.reg_write(w.data + (i as u32) * 4, v);
        bus.reg_write(w.mask + (i as u32) * 4, !0);
    }
    ringbuf_entry!(Trace::Cmd(cmd));
    bus.reg_write(w.cmd, cmd);
    let rv = hw_monitor_reg(
        bus,
        w.cmd,
        IND_CMD_BUSY_MASK,
        0,
        REG_POLL_DFLT_INTERVAL_US,
        REG_POLL_DFLT_TIMEOUT_US,
    );
    bus.reg_access_release();

    if rv.is_err() {
        ringbuf_entry!(Trace::BusyTimeout(cmd));
        bus.log_error("qdma: indirect context write timed out");
        return Err(QdmaError::BusyTimeout);
    }
    Ok(())
}

/// Issues a read command, drains busy, then copies the window back out.
fn indirect_read<B: QdmaBus>(
    dev: &Qdma<B>,
    sel: CtxtSel,
    qid: u16,
    out: &mut [u32],
) -> Result<(), QdmaError> {
    let w = window(dev.variant());
    if out.len() > w.num_words {
        return Err(QdmaError::InvalidParam);
    }
    let bus = dev.bus();
    let cmd = cmd_word(CMD_RD, sel, qid);

    bus.reg_access_lock();
    ringbuf_entry!(Trace::Cmd(cmd));
    bus.reg_write(w.cmd, cmd);
    let rv = hw_monitor_reg(
        bus,
        w.cmd,
        IND_CMD_BUSY_MASK,
        0,
        REG_POLL_DFLT_INTERVAL_US,
        REG_POLL_DFLT_TIMEOUT_US,
    );
    if rv.is_ok() {
        for (i, v) in out.iter_mut().enumerate() {
            *v = bus.reg_read(w.data + (i as u32) * 4);
        }
    }
    bus.reg_access_release();

    if rv.is_err() {
        ringbuf_entry!(Trace::BusyTimeout(cmd));
        bus.log_error("qdma: indirect context read timed out");
        return Err(QdmaError::BusyTimeout);
    }
    Ok(())
}

/// Software context read/write/clear/invalidate.
pub fn sw_ctx_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    dir: QueueDirection,
    qid: u16,
    ctxt: &mut SwContext,
    op: AccessOp,
) -> Result<(), QdmaError> {
    let sel = CtxtSel::sw(dir);
    match op {
        AccessOp::Clear => indirect_clear(dev, sel, qid),
        AccessOp::Invalidate => indirect_invalidate(dev, sel, qid),
        AccessOp::Write => {
            // The 64-byte software descriptor encoding needs explicit
            // silicon support; the other three sizes are universal.
            if ctxt.desc_sz > DescSize::D64 as u8 {
                return Err(QdmaError::InvalidParam);
            }
            if ctxt.desc_sz == DescSize::D64 as u8
                && ctxt.bypass
                && !dev.attributes().sw_desc_64b
            {
                return Err(QdmaError::FeatureNotSupported);
            }
            let mut words = [0u32; 8];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::pack_sw(ctxt, &mut words),
                IpVariant::SoftQdma => soft::pack_sw(ctxt, &mut words),
                IpVariant::HardS80Qdma => s80::pack_sw(ctxt, &mut words),
            };
            indirect_write(dev, sel, qid, &words[..n])
        }
        AccessOp::Read => {
            let mut words = [0u32; 8];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::SW_CTXT_NUM_WORDS,
                IpVariant::SoftQdma => soft::SW_CTXT_NUM_WORDS,
                IpVariant::HardS80Qdma => s80::SW_CTXT_NUM_WORDS,
            };
            indirect_read(dev, sel, qid, &mut words[..n])?;
            *ctxt = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::unpack_sw(&words),
                IpVariant::SoftQdma => soft::unpack_sw(&words),
                IpVariant::HardS80Qdma => s80::unpack_sw(&words),
            };
            Ok(())
        }
    }
}

/// Hardware context: read-only engine state. Writes are rejected.
pub fn hw_ctx_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    dir: QueueDirection,
    qid: u16,
    ctxt: &mut HwContext,
    op: AccessOp,
) -> Result<(), QdmaError> {
    let sel = CtxtSel::hw(dir);
    match op {
        AccessOp::Clear => indirect_clear(dev, sel, qid),
        AccessOp::Invalidate => indirect_invalidate(dev, sel, qid),
        AccessOp::Write => Err(QdmaError::FeatureNotSupported),
        AccessOp::Read => {
            let mut words = [0u32; 2];
            indirect_read(dev, sel, qid, &mut words)?;
            *ctxt = soft::unpack_hw(&words);
            Ok(())
        }
    }
}

/// Credit context: read-only fetch-credit counter. Writes are rejected.
pub fn credit_ctx_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    dir: QueueDirection,
    qid: u16,
    ctxt: &mut CreditContext,
    op: AccessOp,
) -> Result<(), QdmaError> {
    let sel = CtxtSel::credit(dir);
    match op {
        AccessOp::Clear => indirect_clear(dev, sel, qid),
        AccessOp::Invalidate => indirect_invalidate(dev, sel, qid),
        AccessOp::Write => Err(QdmaError::FeatureNotSupported),
        AccessOp::Read => {
            let mut words = [0u32; 1];
            indirect_read(dev, sel, qid, &mut words)?;
            *ctxt = soft::unpack_credit(&words);
            Ok(())
        }
    }
}

/// Prefetch context, streaming C2H queues only.
pub fn pfetch_ctx_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    qid: u16,
    ctxt: &mut PrefetchContext,
    op: AccessOp,
) -> Result<(), QdmaError> {
    let sel = CtxtSel::Pfetch;
    match op {
        AccessOp::Clear => indirect_clear(dev, sel, qid),
        AccessOp::Invalidate => indirect_invalidate(dev, sel, qid),
        AccessOp::Write => {
            let mut words = [0u32; 2];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::pack_pfetch(ctxt, &mut words),
                _ => soft::pack_pfetch(ctxt, &mut words),
            };
            indirect_write(dev, sel, qid, &words[..n])
        }
        AccessOp::Read => {
            let mut words = [0u32; 2];
            indirect_read(dev, sel, qid, &mut words)?;
            *ctxt = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::unpack_pfetch(&words),
                _ => soft::unpack_pfetch(&words),
            };
            Ok(())
        }
    }
}

/// Completion ring context.
pub fn cmpt_ctx_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    qid: u16,
    ctxt: &mut CmptContext,
    op: AccessOp,
) -> Result<(), QdmaError> {
    let sel = CtxtSel::Cmpt;
    match op {
        AccessOp::Clear => indirect_clear(dev, sel, qid),
        AccessOp::Invalidate => indirect_invalidate(dev, sel, qid),
        AccessOp::Write => {
            if ctxt.trig_mode > TrigMode::UserTimerCount as u8 {
                return Err(QdmaError::InvalidParam);
            }
            if ctxt.desc_sz == DescSize::D64 as u8
                && !dev.attributes().cmpt_desc_64b
            {
                return Err(QdmaError::FeatureNotSupported);
            }
            let mut words = [0u32; 6];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::pack_cmpt(ctxt, &mut words),
                IpVariant::SoftQdma => soft::pack_cmpt(ctxt, &mut words),
                IpVariant::HardS80Qdma => s80::pack_cmpt(ctxt, &mut words),
            };
            indirect_write(dev, sel, qid, &words[..n])
        }
        AccessOp::Read => {
            let mut words = [0u32; 6];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::CMPT_CTXT_NUM_WORDS,
                IpVariant::SoftQdma => soft::CMPT_CTXT_NUM_WORDS,
                IpVariant::HardS80Qdma => s80::CMPT_CTXT_NUM_WORDS,
            };
            indirect_read(dev, sel, qid, &mut words[..n])?;
            *ctxt = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::unpack_cmpt(&words),
                IpVariant::SoftQdma => soft::unpack_cmpt(&words),
                IpVariant::HardS80Qdma => s80::unpack_cmpt(&words),
            };
            Ok(())
        }
    }
}

/// Interrupt aggregation ring context. `ring_index` addresses the ring,
/// not a queue.
pub fn intr_ctx_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    ring_index: u16,
    ctxt: &mut IntrContext,
    op: AccessOp,
) -> Result<(), QdmaError> {
    let sel = CtxtSel::IntCoal;
    match op {
        AccessOp::Clear => indirect_clear(dev, sel, ring_index),
        AccessOp::Invalidate => indirect_invalidate(dev, sel, ring_index),
        AccessOp::Write => {
            let mut words = [0u32; 4];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::pack_intr(ctxt, &mut words),
                _ => soft::pack_intr(ctxt, &mut words),
            };
            indirect_write(dev, sel, ring_index, &words[..n])
        }
        AccessOp::Read => {
            let mut words = [0u32; 4];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::INTR_CTXT_NUM_WORDS,
                _ => soft::INTR_CTXT_NUM_WORDS,
            };
            indirect_read(dev, sel, ring_index, &mut words[..n])?;
            *ctxt = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::unpack_intr(&words),
                _ => soft::unpack_intr(&words),
            };
            Ok(())
        }
    }
}

/// Function-map context: the queue range a function owns.
pub fn fmap_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    func_id: u16,
    cfg: &mut FmapCfg,
    op: AccessOp,
) -> Result<(), QdmaError> {
    let sel = CtxtSel::Fmap;
    match op {
        AccessOp::Clear => indirect_clear(dev, sel, func_id),
        AccessOp::Invalidate => indirect_invalidate(dev, sel, func_id),
        AccessOp::Write => {
            let mut words = [0u32; 2];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::pack_fmap(cfg, &mut words),
                IpVariant::SoftQdma => soft::pack_fmap(cfg, &mut words),
                IpVariant::HardS80Qdma => s80::pack_fmap(cfg, &mut words),
            };
            indirect_write(dev, sel, func_id, &words[..n])
        }
        AccessOp::Read => {
            let mut words = [0u32; 2];
            let n = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::FMAP_CTXT_NUM_WORDS,
                IpVariant::SoftQdma => soft::FMAP_CTXT_NUM_WORDS,
                IpVariant::HardS80Qdma => s80::FMAP_CTXT_NUM_WORDS,
            };
            indirect_read(dev, sel, func_id, &mut words[..n])?;
            *cfg = match dev.variant() {
                IpVariant::EqdmaSoft => eqdma::unpack_fmap(&words),
                IpVariant::SoftQdma => soft::unpack_fmap(&words),
                IpVariant::HardS80Qdma => s80::unpack_fmap(&words),
            };
            Ok(())
        }
    }
}

/// Clears the context memory of every queue and the fmap context of
/// every PF. Run once at master-PF bring-up: the silicon does not reset
/// context RAM on its own.
pub fn init_ctxt_memory<B: QdmaBus>(dev: &Qdma<B>) -> Result<(), QdmaError> {
    let cap = *dev.attributes();

    for qid in 0..cap.num_qs {
        for sel in [
            CtxtSel::SwC2h,
            CtxtSel::SwH2c,
            CtxtSel::HwC2h,
            CtxtSel::HwH2c,
            CtxtSel::CrC2h,
            CtxtSel::CrH2c,
            CtxtSel::Cmpt,
            CtxtSel::Pfetch,
        ] {
            // ST-only context RAMs are absent from MM-only bitstreams.
            if !cap.st_en
                && matches!(sel, CtxtSel::Cmpt | CtxtSel::Pfetch)
            {
                continue;
            }
            indirect_clear(dev, sel, qid)?;
        }
    }

    for pf in 0..u16::from(cap.num_pfs) {
        indirect_clear(dev, CtxtSel::Fmap, pf)?;
    }

    Ok(())
}

/// Composes a software context from a semantic queue configuration,
/// translating the ring size to its CSR index.
pub fn compose_sw_context<B: QdmaBus>(
    dev: &Qdma<B>,
    cfg: &DescqConfig,
    st: bool,
    dir: QueueDirection,
) -> Result<SwContext, QdmaError> {
    let rngsz_idx = crate::csr::find_ring_size_index(dev, cfg.ringsz)?;

    let mut sw = SwContext {
        vec: cfg.intr_id,
        intr_aggr: cfg.intr_aggr,
        ring_bs_addr: cfg.ring_bs_addr,
        wbi_chk: cfg.wbi_chk,
        wbi_intvl_en: cfg.wbi_intvl_en,
        at: cfg.at,
        rngsz_idx,
        bypass: cfg.en_bypass,
        wbk_en: cfg.wbk_en,
        irq_en: cfg.irq_en,
        is_mm: !st,
        mm_chn: false,
        qen: true,
        frcd_en: cfg.forced_en,
        desc_sz: cfg.desc_sz,
        fnc_id: cfg.func_id,
        irq_arm: cfg.irq_arm,
        ..Default::default()
    };

    // Streaming C2H status flows through the completion ring, not the
    // descriptor writeback path.
    if st && dir.is_c2h() {
        sw.irq_en = false;
        sw.irq_arm = false;
        sw.wbk_en = false;
        sw.wbi_chk = false;
    }

    Ok(sw)
}

/// Composes a prefetch context, translating the buffer size to its CSR
/// index.
pub fn compose_prefetch_context<B: QdmaBus>(
    dev: &Qdma<B>,
    cfg: &DescqConfig,
) -> Result<PrefetchContext, QdmaError> {
    let bufsz_idx = crate::csr::find_buf_size_index(dev, cfg.bufsz)?;

    Ok(PrefetchContext {
        valid: true,
        bypass: cfg.en_bypass_prefetch,
        bufsz_idx,
        pfch_en: cfg.pfch_en,
        ..Default::default()
    })
}

/// Composes a completion context, translating ring size, counter and
/// timer thresholds to their CSR indices.
pub fn compose_cmpt_context<B: QdmaBus>(
    dev: &Qdma<B>,
    cfg: &DescqConfig,
) -> Result<CmptContext, QdmaError> {
    let counter_idx = crate::csr::find_counter_index(dev, cfg.cnt_thres)?;
    let timer_idx = crate::csr::find_timer_index(dev, cfg.timer_thres)?;
    let ringsz_idx = crate::csr::find_ring_size_index(dev, cfg.cmpt_ringsz)?;

    Ok(CmptContext {
        bs_addr: cfg.cmpt_ring_bs_addr,
        en_stat_desc: cfg.cmpl_stat_en,
        en_int: cfg.cmpt_int_en,
        trig_mode: cfg.triggermode,
        fnc_id: cfg.func_id,
        timer_idx,
        counter_idx,
        color: true,
        ringsz_idx,
        desc_sz: cfg.cmpt_desc_sz,
        valid: true,
        ovf_chk_dis: cfg.dis_overflow_check,
        vec: cfg.intr_id,
        int_aggr: cfg.intr_aggr,
        full_upd: cfg.cmpt_full_upd,
        at: cfg.cmpt_at,
        ..Default::default()
    })
}

/// Programs all contexts a new queue needs: clears each context about to
/// be written, then writes them, in (sw, prefetch, completion) order.
pub fn program_queue_contexts<B: QdmaBus>(
    dev: &Qdma<B>,
    qid: u16,
    st: bool,
    dir: QueueDirection,
    cmpt_kind: CmptCtxtKind,
    cfg: &DescqConfig,
) -> Result<(), QdmaError> {
    if cmpt_kind == CmptCtxtKind::CmptOnly {
        let mut cmpt = compose_cmpt_context(dev, cfg)?;
        cmpt_ctx_conf(dev, qid, &mut cmpt, AccessOp::Clear)?;
        return cmpt_ctx_conf(dev, qid, &mut cmpt, AccessOp::Write);
    }

    let with_pfetch = st && dir.is_c2h();
    let with_cmpt =
        matches!(cmpt_kind, CmptCtxtKind::WithMm | CmptCtxtKind::WithSt);

    // Compose everything before touching the hardware, so a bad index
    // fails the whole operation without a half-programmed queue.
    let mut sw = compose_sw_context(dev, cfg, st, dir)?;
    let mut pfetch = if with_pfetch {
        Some(compose_prefetch_context(dev, cfg)?)
    } else {
        None
    };
    let mut cmpt = if with_cmpt {
        Some(compose_cmpt_context(dev, cfg)?)
    } else {
        None
    };

    sw_ctx_conf(dev, dir, qid, &mut sw, AccessOp::Clear)?;
    if let Some(p) = pfetch.as_mut() {
        pfetch_ctx_conf(dev, qid, p, AccessOp::Clear)?;
    }
    if let Some(c) = cmpt.as_mut() {
        cmpt_ctx_conf(dev, qid, c, AccessOp::Clear)?;
    }

    sw_ctx_conf(dev, dir, qid, &mut sw, AccessOp::Write)?;
    if let Some(p) = pfetch.as_mut() {
        pfetch_ctx_conf(dev, qid, p, AccessOp::Write)?;
    }
    if let Some(c) = cmpt.as_mut() {
        cmpt_ctx_conf(dev, qid, c, AccessOp::Write)?;
    }
    Ok(())
}

fn for_each_queue_ctxt<B: QdmaBus>(
    dev: &Qdma<B>,
    qid: u16,
    st: bool,
    dir: QueueDirection,
    cmpt_kind: CmptCtxtKind,
    op: AccessOp,
) -> Result<(), QdmaError> {
    if cmpt_kind == CmptCtxtKind::CmptOnly {
        let mut cmpt = CmptContext::default();
        return cmpt_ctx_conf(dev, qid, &mut cmpt, op);
    }

    let mut sw = SwContext::default();
    let mut hw = HwContext::default();
    let mut cr = CreditContext::default();

    sw_ctx_conf(dev, dir, qid, &mut sw, op)?;
    hw_ctx_conf(dev, dir, qid, &mut hw, op)?;
    credit_ctx_conf(dev, dir, qid, &mut cr, op)?;

    if st && dir.is_c2h() {
        let mut pfetch = PrefetchContext::default();
        pfetch_ctx_conf(dev, qid, &mut pfetch, op)?;
    }
    if matches!(cmpt_kind, CmptCtxtKind::WithMm | CmptCtxtKind::WithSt) {
        let mut cmpt = CmptContext::default();
        cmpt_ctx_conf(dev, qid, &mut cmpt, op)?;
    }
    Ok(())
}

/// Clears every context a queue owns.
pub fn clear_queue_contexts<B: QdmaBus>(
    dev: &Qdma<B>,
    qid: u16,
    st: bool,
    dir: QueueDirection,
    cmpt_kind: CmptCtxtKind,
) -> Result<(), QdmaError> {
    for_each_queue_ctxt(dev, qid, st, dir, cmpt_kind, AccessOp::Clear)
}

/// Invalidates every context a queue owns.
pub fn invalidate_queue_contexts<B: QdmaBus>(
    dev: &Qdma<B>,
    qid: u16,
    st: bool,
    dir: QueueDirection,
    cmpt_kind: CmptCtxtKind,
) -> Result<(), QdmaError> {
    for_each_queue_ctxt(dev, qid, st, dir, cmpt_kind, AccessOp::Invalidate)
}

/// Tears down a queue. Invalidate must precede clear: invalidation stops
/// the engines looking at the context, clearing then scrubs it.
pub fn teardown_queue_contexts<B: QdmaBus>(
    dev: &Qdma<B>,
    qid: u16,
    st: bool,
    dir: QueueDirection,
    cmpt_kind: CmptCtxtKind,
) -> Result<(), QdmaError> {
    invalidate_queue_contexts(dev, qid, st, dir, cmpt_kind)?;
    clear_queue_contexts(dev, qid, st, dir, cmpt_kind)
}

/// Flat wire size of a full context bundle: 8 sw + 2 hw + 1 credit +
/// 2 prefetch + 6 completion words.
pub const DESCQ_CTXT_MARSHAL_WORDS: usize = 19;

/// Serializes a context bundle into its variant's word layouts, for
/// shipping over the mailbox. Both ends of a mailbox share silicon, so
/// the variant layouts double as the wire format.
pub fn marshal_descq_context(
    variant: IpVariant,
    ctxt: &DescqContext,
    out: &mut [u32; DESCQ_CTXT_MARSHAL_WORDS],
) {
    let mut sw = [0u32; 8];
    let mut cmpt = [0u32; 6];
    let mut hw = [0u32; 2];
    let mut pfetch = [0u32; 2];
    let mut cr = [0u32; 1];

    match variant {
        IpVariant::EqdmaSoft => {
            eqdma::pack_sw(&ctxt.sw, &mut sw);
            eqdma::pack_cmpt(&ctxt.cmpt, &mut cmpt);
            eqdma::pack_pfetch(&ctxt.pfetch, &mut pfetch);
        }
        IpVariant::SoftQdma => {
            soft::pack_sw(&ctxt.sw, &mut sw);
            soft::pack_cmpt(&ctxt.cmpt, &mut cmpt);
            soft::pack_pfetch(&ctxt.pfetch, &mut pfetch);
        }
        IpVariant::HardS80Qdma => {
            s80::pack_sw(&ctxt.sw, &mut sw);
            s80::pack_cmpt(&ctxt.cmpt, &mut cmpt);
            soft::pack_pfetch(&ctxt.pfetch, &mut pfetch);
        }
    }
    soft::pack_hw(&ctxt.hw, &mut hw);
    soft::pack_credit(&ctxt.cr, &mut cr);

    out[0..8].copy_from_slice(&sw);
    out[8..10].copy_from_slice(&hw);
    out[10] = cr[0];
    out[11..13].copy_from_slice(&pfetch);
    out[13..19].copy_from_slice(&cmpt);
}

/// Inverse of [`marshal_descq_context`].
pub fn unmarshal_descq_context(
    variant: IpVariant,
    words: &[u32; DESCQ_CTXT_MARSHAL_WORDS],
) -> DescqContext {
    let mut sw = [0u32; 8];
    let mut cmpt = [0u32; 6];
    let mut hw = [0u32; 2];
    let mut pfetch = [0u32; 2];

    sw.copy_from_slice(&words[0..8]);
    hw.copy_from_slice(&words[8..10]);
    let cr = [words[10]];
    pfetch.copy_from_slice(&words[11..13]);
    cmpt.copy_from_slice(&words[13..19]);

    let (sw, pfetch, cmpt) = match variant {
        IpVariant::EqdmaSoft => (
            eqdma::unpack_sw(&sw),
            eqdma::unpack_pfetch(&pfetch),
            eqdma::unpack_cmpt(&cmpt),
        ),
        IpVariant::SoftQdma => (
            soft::unpack_sw(&sw),
            soft::unpack_pfetch(&pfetch),
            soft::unpack_cmpt(&cmpt),
        ),
        IpVariant::HardS80Qdma => (
            s80::unpack_sw(&sw),
            soft::unpack_pfetch(&pfetch),
            s80::unpack_cmpt(&cmpt),
        ),
    };

    DescqContext {
        sw,
        hw: soft::unpack_hw(&hw),
        cr: soft::unpack_credit(&cr),
        pfetch,
        cmpt,
    }
}

/// Serializes one interrupt ring context for the mailbox.
pub fn marshal_intr_context(
    variant: IpVariant,
    ctxt: &IntrContext,
    out: &mut [u32; 4],
) {
    match variant {
        IpVariant::EqdmaSoft => eqdma::pack_intr(ctxt, out),
        _ => soft::pack_intr(ctxt, out),
    };
}

/// Inverse of [`marshal_intr_context`].
pub fn unmarshal_intr_context(variant: IpVariant, words: &[u32; 4]) -> IntrContext {
    match variant {
        IpVariant::EqdmaSoft => eqdma::unpack_intr(words),
        _ => soft::unpack_intr(words),
    }
}

/// Reads back every context a queue owns.
pub fn read_queue_contexts<B: QdmaBus>(
    dev: &Qdma<B>,
    qid: u16,
    st: bool,
    dir: QueueDirection,
    cmpt_kind: CmptCtxtKind,
) -> Result<DescqContext, QdmaError> {
    let mut ctxt = DescqContext::default();

    sw_ctx_conf(dev, dir, qid, &mut ctxt.sw, AccessOp::Read)?;
    hw_ctx_conf(dev, dir, qid, &mut ctxt.hw, AccessOp::Read)?;
    credit_ctx_conf(dev, dir, qid, &mut ctxt.cr, AccessOp::Read)?;

    if st && dir.is_c2h() {
        pfetch_ctx_conf(dev, qid, &mut ctxt.pfetch, AccessOp::Read)?;
    }
    if matches!(cmpt_kind, CmptCtxtKind::WithMm | CmptCtxtKind::WithSt) {
        cmpt_ctx_conf(dev, qid, &mut ctxt.cmpt, AccessOp::Read)?;
    }
    Ok(ctxt)
}
