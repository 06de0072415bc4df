// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mailbox protocol: opcode dispatch.
//!
//! The PF side executes proxied operations on behalf of its VFs —
//! context programming, queue-range management, CSR snapshots, register
//! dumps — and reports lifecycle transitions up to its host. The VF
//! side handles the small set of asynchronous PF notices (reset
//! coordination, PF shutdown).
//!
//! Failures never travel as transport errors: the PF stuffs the error
//! code into the response status byte and the VF surfaces it to its own
//! caller.

use crate::msg::{MboxMessage, MboxOp, RESP_OP_OFFSET};
use drv_qdma::resource::{QueueRange, ResourceManager};
use drv_qdma::{context, csr, dump, Qdma, QdmaBus};
use drv_qdma_api::*;
use num_traits::FromPrimitive as _;

/// Lifecycle transitions the PF dispatch reports to its host.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PfEvent {
    /// A VF said hello; its function id.
    VfOnline(u16),
    /// A VF said bye.
    VfOffline(u16),
    /// A VF acknowledged our reset-prepare.
    VfReset(u16),
    /// A VF acknowledged our reset-done.
    PfResetDone(u16),
    /// A VF acknowledged our shutdown notice.
    PfBye(u16),
    /// A VF completed its reset-bye handshake.
    VfResetBye(u16),
}

/// Asynchronous PF notices a VF can receive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VfEvent {
    ResetPrepare,
    ResetDone,
    PfBye,
}

/// What the dispatcher decided about one received request.
pub struct Dispatch {
    pub event: Option<PfEvent>,
    /// Whether `resp` should be queued back to the sender.
    pub respond: bool,
}

fn qid_in_range(
    rm: &ResourceManager,
    dma_device_index: u32,
    func_id: u16,
    qid_hw: u16,
) -> Result<(), QdmaError> {
    match rm.is_queue_in_range(dma_device_index, func_id, qid_hw) {
        QueueRange::InRange => Ok(()),
        QueueRange::OutOfRange => Err(MboxError::InvalidQid.into()),
    }
}

fn handle_qctxt_write<B: QdmaBus>(
    dev: &Qdma<B>,
    rm: &ResourceManager,
    dma_device_index: u32,
    rcv: &MboxMessage,
) -> Result<(), QdmaError> {
    let (qid_hw, st, c2h, kind) = rcv.qctxt_info();
    let kind = kind.ok_or(QdmaError::InvalidParam)?;
    let mut cfg = rcv.qctxt_config();
    // The function id in the config is whatever the VF claimed; the
    // header's source id has already been fixed up by the transport.
    cfg.func_id = rcv.src_func_id();

    rm.qinfo(dma_device_index, cfg.func_id)?;
    qid_in_range(rm, dma_device_index, cfg.func_id, qid_hw)?;

    let dir = if c2h {
        QueueDirection::C2h
    } else {
        QueueDirection::H2c
    };
    context::program_queue_contexts(dev, qid_hw, st, dir, kind, &cfg)
}

fn handle_qctxt_op<B: QdmaBus>(
    dev: &Qdma<B>,
    rm: &ResourceManager,
    dma_device_index: u32,
    rcv: &MboxMessage,
    resp: &mut MboxMessage,
    op: MboxOp,
) -> Result<(), QdmaError> {
    let (qid_hw, st, c2h, kind) = rcv.qctxt_info();
    let kind = kind.ok_or(QdmaError::InvalidParam)?;
    let func_id = rcv.src_func_id();
    let dir = if c2h {
        QueueDirection::C2h
    } else {
        QueueDirection::H2c
    };

    // A completion-only operation touches shared completion state, not
    // the function's own descriptor queues, so it skips the range gate
    // the way the silicon does.
    if kind != CmptCtxtKind::CmptOnly {
        rm.qinfo(dma_device_index, func_id)?;
        qid_in_range(rm, dma_device_index, func_id, qid_hw)?;
    }

    match op {
        MboxOp::QctxtRd => {
            let ctxt =
                context::read_queue_contexts(dev, qid_hw, st, dir, kind)?;
            resp.set_qctxt_resp(dev.variant(), &ctxt);
            Ok(())
        }
        MboxOp::QctxtClr => {
            context::clear_queue_contexts(dev, qid_hw, st, dir, kind)
        }
        MboxOp::QctxtInv => {
            context::invalidate_queue_contexts(dev, qid_hw, st, dir, kind)
        }
        _ => Err(QdmaError::InvalidParam),
    }
}

fn handle_intr_ctxt<B: QdmaBus>(
    dev: &Qdma<B>,
    rcv: &MboxMessage,
    resp: &mut MboxMessage,
    op: MboxOp,
) -> Result<(), QdmaError> {
    let n = rcv.intr_ctxt_num_rings();
    let variant = dev.variant();

    for i in 0..n {
        let (ring_index, mut ctxt) = rcv
            .intr_ctxt_ring(variant, i)
            .ok_or(QdmaError::InvalidParam)?;
        let ring_index = ring_index as u16;

        match op {
            MboxOp::IntrCtxtWrt => {
                context::intr_ctx_conf(
                    dev,
                    ring_index,
                    &mut ctxt,
                    AccessOp::Clear,
                )?;
                context::intr_ctx_conf(
                    dev,
                    ring_index,
                    &mut ctxt,
                    AccessOp::Write,
                )?;
            }
            MboxOp::IntrCtxtRd => {
                let mut out = IntrContext::default();
                context::intr_ctx_conf(
                    dev,
                    ring_index,
                    &mut out,
                    AccessOp::Read,
                )?;
                resp.set_intr_ctxt_ring(variant, i, ring_index.into(), &out);
            }
            MboxOp::IntrCtxtClr => {
                context::intr_ctx_conf(
                    dev,
                    ring_index,
                    &mut ctxt,
                    AccessOp::Clear,
                )?;
            }
            MboxOp::IntrCtxtInv => {
                context::intr_ctx_conf(
                    dev,
                    ring_index,
                    &mut ctxt,
                    AccessOp::Invalidate,
                )?;
            }
            _ => return Err(QdmaError::InvalidParam),
        }
    }

    if op == MboxOp::IntrCtxtRd {
        resp.set_intr_ctxt_num_rings(n);
    }
    Ok(())
}

/// Writes a function map of `{0, 0}`, unmapping the function's queues.
fn fmap_clear<B: QdmaBus>(dev: &Qdma<B>, func_id: u16) -> Result<(), QdmaError> {
    let mut fmap = FmapCfg::default();
    context::fmap_conf(dev, func_id, &mut fmap, AccessOp::Write)
}

/// Handles one raw request received on a PF. Fills `resp` and decides
/// whether it should be sent; the caller owns queuing it. `func_id` is
/// the PF's own function id.
pub fn pf_rcv_msg_handler<B: QdmaBus>(
    dev: &Qdma<B>,
    rm: &ResourceManager,
    dma_device_index: u32,
    func_id: u16,
    rcv: &MboxMessage,
    resp: &mut MboxMessage,
) -> Dispatch {
    let src = rcv.src_func_id();
    let mut event = None;
    let mut respond = true;

    // PF->VF notices come back as bare response opcodes; they carry a
    // lifecycle event and nothing to execute or answer.
    if rcv.op_raw() >= RESP_OP_OFFSET {
        let base = MboxOp::from_u8(rcv.op_raw() - RESP_OP_OFFSET);
        let event = match base {
            Some(MboxOp::ResetPrepare) => Some(PfEvent::VfReset(src)),
            Some(MboxOp::ResetDone) => Some(PfEvent::PfResetDone(src)),
            Some(MboxOp::PfBye) => Some(PfEvent::PfBye(src)),
            _ => {
                dev.bus().log_error("qdma mbox: unexpected response opcode");
                None
            }
        };
        return Dispatch {
            event,
            respond: false,
        };
    }

    let rv: Result<(), QdmaError> = match rcv.op() {
        Some(MboxOp::VfBye) => {
            let rv = fmap_clear(dev, src);
            rm.destroy_entry(dma_device_index, src);
            event = Some(PfEvent::VfOffline(src));
            respond = false;
            rv
        }
        Some(MboxOp::PfResetVfBye) => {
            let rv = fmap_clear(dev, src);
            rm.destroy_entry(dma_device_index, src);
            event = Some(PfEvent::VfResetBye(src));
            rv
        }
        Some(MboxOp::Hello) => {
            let (_, req_qmax) = rcv.qinfo();
            let rv = (|| {
                if rm.qinfo(dma_device_index, src).is_err() {
                    rm.create_entry(dma_device_index, src)?;
                }
                let (mut qbase, mut qmax) = rm.qinfo(dma_device_index, src)?;
                if qmax == 0 && req_qmax != 0 {
                    rm.update(
                        dma_device_index,
                        src,
                        req_qmax.into(),
                        &mut qbase,
                    )?;
                    let info = rm.qinfo(dma_device_index, src)?;
                    qbase = info.0;
                    qmax = info.1;
                }
                resp.set_hello_resp(
                    qbase,
                    qmax as u16,
                    dma_device_index,
                    dev.attributes(),
                );
                Ok(())
            })();
            // The VF starts from an unmapped function table either way.
            let _ = fmap_clear(dev, src);
            event = Some(PfEvent::VfOnline(src));
            rv
        }
        Some(MboxOp::Fmap) => {
            let (qbase, qmax) = rcv.qinfo();
            let mut fmap = FmapCfg {
                qbase: qbase.max(0) as u16,
                qmax,
            };
            context::fmap_conf(dev, src, &mut fmap, AccessOp::Write)
                .map_err(|_| MboxError::FmapWriteFailed.into())
        }
        Some(MboxOp::Csr) => {
            csr::csr_info(dev).map(|info| resp.set_csr_resp(&info))
        }
        Some(MboxOp::Qreq) => {
            let (_, req_qmax) = rcv.qinfo();
            let mut qbase = -1;
            let rv = rm
                .update(dma_device_index, src, req_qmax.into(), &mut qbase)
                .and_then(|()| rm.qinfo(dma_device_index, src))
                .map(|(qbase, qmax)| resp.set_qinfo(qbase, qmax as u16))
                .map_err(|_| QdmaError::from(MboxError::NumQueues));
            if rv.is_ok() {
                // The old mapping is stale; VF re-programs via FMAP.
                let _ = fmap_clear(dev, src);
            }
            rv
        }
        Some(MboxOp::QnotifyAdd) => {
            let (qid_hw, q_type) = rcv.qnotify_info();
            q_type.ok_or(QdmaError::InvalidParam).and_then(|t| {
                qid_in_range(rm, dma_device_index, src, qid_hw)?;
                rm.increment_active_queue(dma_device_index, src, t)
            })
        }
        Some(MboxOp::QnotifyDel) => {
            let (qid_hw, q_type) = rcv.qnotify_info();
            q_type.ok_or(QdmaError::InvalidParam).and_then(|t| {
                qid_in_range(rm, dma_device_index, src, qid_hw)?;
                rm.decrement_active_queue(dma_device_index, src, t)
            })
        }
        Some(MboxOp::GetQactiveCnt) => {
            resp.set_active_qcnt_resp(
                rm.active_queue_count(dma_device_index, src, QueueType::H2c),
                rm.active_queue_count(dma_device_index, src, QueueType::C2h),
                rm.active_queue_count(dma_device_index, src, QueueType::Cmpt),
            );
            Ok(())
        }
        Some(MboxOp::QctxtWrt) => {
            handle_qctxt_write(dev, rm, dma_device_index, rcv)
        }
        Some(op @ (MboxOp::QctxtRd | MboxOp::QctxtClr | MboxOp::QctxtInv)) => {
            handle_qctxt_op(dev, rm, dma_device_index, rcv, resp, op)
        }
        Some(
            op @ (MboxOp::IntrCtxtWrt
            | MboxOp::IntrCtxtRd
            | MboxOp::IntrCtxtClr
            | MboxOp::IntrCtxtInv),
        ) => handle_intr_ctxt(dev, rcv, resp, op),
        Some(MboxOp::RegListRead) => {
            let mut regs = [RegData::default(); MAX_REGISTER_DUMP];
            dump::read_reg_list(dev, rcv.reg_list_group(), &mut regs)
                .ok()
                .filter(|&n| n != 0)
                .map(|n| resp.set_reg_list_resp(n, &regs))
                .ok_or(MboxError::RegReadFailed.into())
        }
        Some(MboxOp::ResetPrepare | MboxOp::ResetDone | MboxOp::PfBye)
        | None => {
            dev.bus().log_error("qdma mbox: invalid opcode on PF");
            Err(MboxError::InvalidMessage.into())
        }
    };

    resp.set_op_raw(rcv.op_raw() + RESP_OP_OFFSET);
    resp.set_dst_func_id(src);
    resp.set_src_func_id(func_id);
    resp.set_status(match rv {
        Ok(()) => 0,
        Err(e) => e.code(),
    });

    Dispatch { event, respond }
}

/// Handles one asynchronous PF notice received on a VF. Returns the
/// event and whether `resp` (the acknowledgment) should be sent.
pub fn vf_rcv_msg_handler(
    rcv: &MboxMessage,
    resp: &mut MboxMessage,
) -> Option<VfEvent> {
    let event = match rcv.op() {
        Some(MboxOp::ResetPrepare) => VfEvent::ResetPrepare,
        Some(MboxOp::ResetDone) => VfEvent::ResetDone,
        Some(MboxOp::PfBye) => VfEvent::PfBye,
        _ => return None,
    };

    resp.set_op_raw(rcv.op_raw() + RESP_OP_OFFSET);
    resp.set_dst_func_id(rcv.src_func_id());
    resp.set_src_func_id(rcv.dst_func_id());
    Some(event)
}
