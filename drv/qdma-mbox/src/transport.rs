// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mailbox register transport.
//!
//! Each endpoint sees one mailbox block at its variant-specific base:
//! a status register (in-message, out-message, ack, source function), a
//! command register (send, receive), the PF-only target register and
//! ack bitmap, and two 32-word message windows. Everything here is raw
//! send/receive; queuing, retry and dispatch live a layer up.

use crate::msg::{MboxMessage, MBOX_MSG_REG_MAX};
use drv_qdma::{regs, Qdma, QdmaBus};
use drv_qdma_api::{bit, field_get, genmask, MboxError, QdmaError};
use ringbuf::{ringbuf, ringbuf_entry};

// Register offsets within the mailbox block.
const MBOX_FN_STATUS: u32 = 0x0;
const MBOX_FN_CMD: u32 = 0x4;
const MBOX_ISR_VEC: u32 = 0x8;
const MBOX_FN_TARGET: u32 = 0xC;
const MBOX_ISR_EN: u32 = 0x10;
const MBOX_PF_ACK_BASE: u32 = 0x20;
const MBOX_PF_ACK_STEP: u32 = 4;
const MBOX_PF_ACK_COUNT: u32 = 8;
const MBOX_IN_MSG_BASE: u32 = 0x800;
const MBOX_OUT_MSG_BASE: u32 = 0xC00;
const MBOX_MSG_STEP: u32 = 4;

// FN_STATUS fields.
const STATUS_IN_MSG: u32 = bit(0);
const STATUS_OUT_MSG: u32 = bit(1);
const STATUS_ACK: u32 = bit(2);
const STATUS_SRC_MASK: u32 = genmask(15, 4);

// FN_CMD fields.
const CMD_SND: u32 = bit(0);
const CMD_RCV: u32 = bit(1);

// FN_TARGET field.
const TARGET_ID_MASK: u32 = genmask(11, 0);

// ISR_VEC field.
const ISR_VEC_MASK: u32 = genmask(4, 0);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    Sent { op: u8, dst: u16 },
    Received { op: u8, src: u16 },
    SendBusy,
    AllZeroMessage,
}
ringbuf!(Trace, 32, Trace::None);

fn mbox_base<B: QdmaBus>(dev: &Qdma<B>) -> u32 {
    if dev.is_vf() {
        regs::mbox_base_vf(dev.variant())
    } else {
        regs::mbox_base_pf(dev.variant())
    }
}

/// Clears every pending ack bit on a PF mailbox.
pub fn pf_clear_ack<B: QdmaBus>(dev: &Qdma<B>) {
    let bus = dev.bus();
    let base = mbox_base(dev);

    let status = bus.reg_read(base + MBOX_FN_STATUS);
    if status & STATUS_ACK == 0 {
        return;
    }

    let mut reg = base + MBOX_PF_ACK_BASE;
    for _ in 0..MBOX_PF_ACK_COUNT {
        let v = bus.reg_read(reg);
        if v != 0 {
            // Write-1-to-clear.
            bus.reg_write(reg, v);
        }
        reg += MBOX_PF_ACK_STEP;
    }
}

fn pf_clear_func_ack<B: QdmaBus>(dev: &Qdma<B>, func_id: u16) {
    let base = mbox_base(dev);
    let idx = u32::from(func_id) / 32;
    let b = u32::from(func_id) % 32;
    dev.bus().reg_write(
        base + MBOX_PF_ACK_BASE + idx * MBOX_PF_ACK_STEP,
        1 << b,
    );
}

/// Whether the outbox still holds an unacknowledged message.
pub fn out_status<B: QdmaBus>(dev: &Qdma<B>) -> bool {
    let base = mbox_base(dev);
    dev.bus().reg_read(base + MBOX_FN_STATUS) & STATUS_OUT_MSG != 0
}

/// Sends one message. On a PF the destination comes from the message
/// header and the destination's ack bit is cleared before the send
/// command fires.
pub fn send<B: QdmaBus>(
    dev: &Qdma<B>,
    msg: &MboxMessage,
) -> Result<(), QdmaError> {
    let bus = dev.bus();
    let base = mbox_base(dev);

    let status = bus.reg_read(base + MBOX_FN_STATUS);
    if status & STATUS_OUT_MSG != 0 {
        ringbuf_entry!(Trace::SendBusy);
        return Err(MboxError::SendBusy.into());
    }

    let dst = msg.dst_func_id();
    if !dev.is_vf() {
        bus.reg_write(
            base + MBOX_FN_TARGET,
            drv_qdma_api::field_set(TARGET_ID_MASK, dst.into()),
        );
    }

    let mut reg = base + MBOX_OUT_MSG_BASE;
    for &w in msg.raw() {
        bus.reg_write(reg, w);
        reg += MBOX_MSG_STEP;
    }

    if !dev.is_vf() {
        pf_clear_func_ack(dev, dst);
    }

    ringbuf_entry!(Trace::Sent {
        op: msg.op_raw(),
        dst
    });
    bus.reg_write(base + MBOX_FN_CMD, CMD_SND);
    Ok(())
}

/// Receives one message if the inbox holds one.
///
/// Two hardware quirks live here. A frame of all zeros with the
/// in-message flag raised is a known fault signature and is rejected
/// rather than dispatched. And on a PF the true source function id is
/// taken from the status register, overwriting whatever the sender put
/// in the header, so a VF cannot impersonate another function.
pub fn recv<B: QdmaBus>(dev: &Qdma<B>) -> Result<MboxMessage, QdmaError> {
    let bus = dev.bus();
    let base = mbox_base(dev);

    let status = bus.reg_read(base + MBOX_FN_STATUS);
    if status & STATUS_IN_MSG == 0 {
        return Err(MboxError::NoMessageIn.into());
    }

    let from_id = field_get(STATUS_SRC_MASK, status) as u16;
    if !dev.is_vf() {
        bus.reg_write(base + MBOX_FN_TARGET, from_id.into());
    }

    let mut msg = MboxMessage::default();
    let mut reg = base + MBOX_IN_MSG_BASE;
    for w in msg.raw_mut() {
        *w = bus.reg_read(reg);
        reg += MBOX_MSG_STEP;
    }
    debug_assert_eq!(msg.raw().len(), MBOX_MSG_REG_MAX);

    // Ack the sender whether or not the frame is usable; leaving the
    // in-message flag up would wedge the channel for good.
    bus.reg_write(base + MBOX_FN_CMD, CMD_RCV);

    if msg.is_all_zero() {
        ringbuf_entry!(Trace::AllZeroMessage);
        bus.log_error("qdma mbox: received all-zero message, hardware fault");
        return Err(MboxError::AllZeroMessage.into());
    }

    if !dev.is_vf() && msg.src_func_id() != from_id {
        msg.set_src_func_id(from_id);
    }

    ringbuf_entry!(Trace::Received {
        op: msg.op_raw(),
        src: msg.src_func_id()
    });
    Ok(msg)
}

/// One-time mailbox bring-up: a VF drains any stale in-message left by
/// a previous life; a PF clears all ack bits.
pub fn hw_init<B: QdmaBus>(dev: &Qdma<B>) {
    let bus = dev.bus();
    let base = mbox_base(dev);

    if dev.is_vf() {
        let status = bus.reg_read(base + MBOX_FN_STATUS);
        if status & STATUS_IN_MSG != 0 {
            bus.reg_write(base + MBOX_FN_CMD, CMD_RCV);
        }
    } else {
        pf_clear_ack(dev);
    }
}

/// Arms the mailbox interrupt on vector 0.
pub fn enable_interrupts<B: QdmaBus>(dev: &Qdma<B>) {
    let bus = dev.bus();
    let base = mbox_base(dev);
    bus.reg_write(base + MBOX_ISR_VEC, drv_qdma_api::field_set(ISR_VEC_MASK, 0));
    bus.reg_write(base + MBOX_ISR_EN, 1);
}

pub fn disable_interrupts<B: QdmaBus>(dev: &Qdma<B>) {
    let base = mbox_base(dev);
    dev.bus().reg_write(base + MBOX_ISR_EN, 0);
}
