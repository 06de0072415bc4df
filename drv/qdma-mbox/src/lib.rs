// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! PF/VF mailbox driver.
//!
//! Messages ride a pair of 32-word register windows per endpoint. This
//! crate queues outbound messages until the outbox drains, pairs
//! responses with their waiters in FIFO order, dispatches inbound
//! requests (`protocol`), and coordinates the PF-driven VF reset dance.
//!
//! The concurrency model is single-threaded cooperative: the host calls
//! [`Mailbox::poll`] from a ~1 ms timer (or its mailbox interrupt
//! handler), and the blocking-style helpers drive the same tick loop
//! inline with `udelay` between ticks. Suspension points are only at
//! tick boundaries, so no in-flight message is ever mutated
//! concurrently. One lock guards both lists; the send walk holds it
//! across the register copy, the receive path releases it before
//! dispatching into the context engine.

#![cfg_attr(not(test), no_std)]

pub mod msg;
pub mod protocol;
pub mod transport;

pub use msg::{MboxMessage, MboxOp, MBOX_MSG_REG_MAX};
pub use protocol::{PfEvent, VfEvent};

use drv_qdma::resource::ResourceManager;
use drv_qdma::{Qdma, QdmaBus};
use drv_qdma_api::{MboxError, QdmaError};
use fixedmap::FixedMap;
use heapless::Vec;
use ringbuf::{ringbuf, ringbuf_entry};
use spin::Mutex;

/// Poll cadence of the send/receive tasks.
pub const MBOX_POLL_FRQ_MS: u32 = 1;

/// How long a waiter will chase a response before giving up.
pub const MBOX_OP_RSP_TIMEOUT_MS: u32 = 10_000;

/// Default retry budget for fire-and-forget sends.
pub const MBOX_SEND_RETRY_COUNT: u32 =
    MBOX_OP_RSP_TIMEOUT_MS / MBOX_POLL_FRQ_MS;

/// How long the PF waits for its VFs to shut down or come back.
pub const RESET_TIMEOUT_MS: u32 = 60_000;

/// In-flight messages per list.
const QUEUE_DEPTH: usize = 16;

/// Most VFs one PF can parent.
const MAX_VFS: usize = 252;

/// VF-side reset coordination state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ResetState {
    Idle,
    /// `RESET_PREPARE` received; the VF is closing down.
    RecvPfResetReq,
    /// `RESET_DONE` received; the VF may re-hello.
    RecvPfResetDone,
}

/// Everything the host can learn from a poll.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MboxEvent {
    Pf(PfEvent),
    Vf(VfEvent),
}

/// PF-side bookkeeping of one child VF.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum VfState {
    Online,
    /// We told it to reset; waiting for its bye.
    ResetSent,
    /// It said bye; waiting for our reset-done and its re-hello.
    ByeDone,
}

/// Ticket for a queued message.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MsgHandle(u32);

#[derive(Copy, Clone)]
struct QueuedMsg {
    handle: u32,
    msg: MboxMessage,
    retry_cnt: u32,
    wait: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    Queued { op: u8, handle: u32 },
    Evicted { handle: u32 },
    RspPaired { handle: u32 },
    Event(MboxEvent),
}
ringbuf!(Trace, 32, Trace::None);

struct State {
    func_id: u16,
    next_handle: u32,
    tx_todo: Vec<QueuedMsg, QUEUE_DEPTH>,
    rx_pend: Vec<QueuedMsg, QUEUE_DEPTH>,
    /// Finished waiters: response frame, or `None` when the send was
    /// evicted unanswered.
    completed: Vec<(u32, Option<MboxMessage>), QUEUE_DEPTH>,
    events: Vec<MboxEvent, QUEUE_DEPTH>,
    reset_state: ResetState,
    vfs: FixedMap<u16, VfState, MAX_VFS>,
    vf_online_count: u32,
}

pub struct Mailbox {
    dma_device_index: u32,
    state: Mutex<State>,
}

/// Removes index `idx` preserving order. `heapless::Vec` only swaps, and
/// response pairing is FIFO, so shift by hand.
fn remove_at<T: Copy, const N: usize>(v: &mut Vec<T, N>, idx: usize) -> T {
    let out = v[idx];
    for i in idx..v.len() - 1 {
        v[i] = v[i + 1];
    }
    v.pop();
    out
}

impl Mailbox {
    pub fn new(dma_device_index: u32, func_id: u16) -> Self {
        Self {
            dma_device_index,
            state: Mutex::new(State {
                func_id,
                next_handle: 1,
                tx_todo: Vec::new(),
                rx_pend: Vec::new(),
                completed: Vec::new(),
                events: Vec::new(),
                reset_state: ResetState::Idle,
                vfs: FixedMap::default(),
                vf_online_count: 0,
            }),
        }
    }

    /// One-time bring-up: scrub stale hardware state and, where the
    /// silicon supports it, arm the mailbox interrupt.
    pub fn init<B: QdmaBus>(&self, dev: &Qdma<B>) {
        transport::hw_init(dev);
        if dev.attributes().mailbox_intr {
            transport::enable_interrupts(dev);
        }
    }

    pub fn func_id(&self) -> u16 {
        self.state.lock().func_id
    }

    pub fn reset_state(&self) -> ResetState {
        self.state.lock().reset_state
    }

    pub fn set_reset_state(&self, rs: ResetState) {
        self.state.lock().reset_state = rs;
    }

    pub fn online_vf_count(&self) -> u32 {
        self.state.lock().vf_online_count
    }

    /// Next queued event, if any.
    pub fn next_event(&self) -> Option<MboxEvent> {
        let mut state = self.state.lock();
        if state.events.is_empty() {
            None
        } else {
            Some(remove_at(&mut state.events, 0))
        }
    }

    /// Queues a message for transmission.
    ///
    /// `timeout_ms == 0` takes the no-wait path: the message gets the
    /// default retry budget and is freed on completion, with no way to
    /// observe the response. A nonzero timeout registers a waiter with
    /// `timeout_ms / poll-frequency + 1` send retries; pass the handle
    /// to [`Mailbox::wait_response`].
    pub fn send(
        &self,
        msg: MboxMessage,
        timeout_ms: u32,
    ) -> Result<MsgHandle, QdmaError> {
        let mut state = self.state.lock();
        let handle = state.next_handle;
        state.next_handle = state.next_handle.wrapping_add(1).max(1);

        let q = QueuedMsg {
            handle,
            msg,
            retry_cnt: if timeout_ms == 0 {
                MBOX_SEND_RETRY_COUNT
            } else {
                timeout_ms / MBOX_POLL_FRQ_MS + 1
            },
            wait: timeout_ms != 0,
        };
        state
            .tx_todo
            .push(q)
            .map_err(|_| QdmaError::NoMemory)?;
        ringbuf_entry!(Trace::Queued {
            op: msg.op_raw(),
            handle
        });
        Ok(MsgHandle(handle))
    }

    /// The send task: walks the to-do list in order, attempting each
    /// entry. A busy outbox burns one retry; an exhausted entry is
    /// evicted (waiters observe `Pipe`, no-wait messages just vanish).
    pub fn service_send<B: QdmaBus>(&self, dev: &Qdma<B>) {
        let mut state = self.state.lock();

        let mut i = 0;
        while i < state.tx_todo.len() {
            let entry = state.tx_todo[i];
            match transport::send(dev, &entry.msg) {
                Ok(()) => {
                    let entry = remove_at(&mut state.tx_todo, i);
                    if entry.wait {
                        // The pending list is bounded like the to-do
                        // list, so this push cannot fail.
                        let _ = state.rx_pend.push(entry);
                    }
                }
                Err(_) => {
                    state.tx_todo[i].retry_cnt -= 1;
                    if state.tx_todo[i].retry_cnt == 0 {
                        let entry = remove_at(&mut state.tx_todo, i);
                        ringbuf_entry!(Trace::Evicted {
                            handle: entry.handle
                        });
                        if entry.wait {
                            let _ =
                                state.completed.push((entry.handle, None));
                        }
                    } else {
                        i += 1;
                    }
                }
            }
        }
    }

    fn deliver_response(&self, state: &mut State, rcv: &MboxMessage) -> bool {
        for i in 0..state.rx_pend.len() {
            if rcv.is_response_to(&state.rx_pend[i].msg) {
                let entry = remove_at(&mut state.rx_pend, i);
                ringbuf_entry!(Trace::RspPaired {
                    handle: entry.handle
                });
                let _ = state.completed.push((entry.handle, Some(*rcv)));
                return true;
            }
        }
        false
    }

    fn push_event(&self, state: &mut State, ev: MboxEvent) {
        ringbuf_entry!(Trace::Event(ev));
        let _ = state.events.push(ev);
    }

    /// The receive task: drains the inbox, pairing responses with
    /// waiters and dispatching requests. PF endpoints must pass the
    /// resource manager for the proxied operations.
    pub fn service_recv<B: QdmaBus>(
        &self,
        dev: &Qdma<B>,
        rm: Option<&ResourceManager>,
    ) {
        loop {
            let rcv = match transport::recv(dev) {
                Ok(m) => m,
                // No message, or the all-zero hardware fault (already
                // logged by the transport); either way stop draining.
                Err(_) => break,
            };

            let mut state = self.state.lock();

            // A fresh VF learns its function id from the first frame
            // addressed to it.
            if dev.is_vf() && state.func_id == 0 {
                state.func_id = rcv.dst_func_id();
            }

            if self.deliver_response(&mut state, &rcv) {
                continue;
            }

            let mut resp = MboxMessage::default();
            if dev.is_vf() {
                if let Some(ev) = protocol::vf_rcv_msg_handler(&rcv, &mut resp)
                {
                    state.reset_state = match ev {
                        VfEvent::ResetPrepare => ResetState::RecvPfResetReq,
                        VfEvent::ResetDone => ResetState::RecvPfResetDone,
                        VfEvent::PfBye => state.reset_state,
                    };
                    self.push_event(&mut state, MboxEvent::Vf(ev));
                    drop(state);
                    // Acknowledge out-of-line via the send queue.
                    let _ = self.send(resp, 0);
                }
            } else {
                let func_id = state.func_id;
                // Dispatch touches the indirect window; do not hold the
                // list lock across it.
                drop(state);
                let d = protocol::pf_rcv_msg_handler(
                    dev,
                    rm.expect("PF mailbox requires a resource manager"),
                    self.dma_device_index,
                    func_id,
                    &rcv,
                    &mut resp,
                );

                let mut state = self.state.lock();
                if let Some(ev) = d.event {
                    self.note_vf_lifecycle(&mut state, ev);
                    self.push_event(&mut state, MboxEvent::Pf(ev));
                }
                drop(state);
                if d.respond {
                    let _ = self.send(resp, 0);
                }
            }
        }
    }

    fn note_vf_lifecycle(&self, state: &mut State, ev: PfEvent) {
        match ev {
            PfEvent::VfOnline(func_id) => {
                let was = state.vfs.get(func_id);
                if state.vfs.try_insert(func_id, VfState::Online).is_ok()
                    && was != Some(VfState::Online)
                {
                    state.vf_online_count += 1;
                }
            }
            PfEvent::VfOffline(func_id) => {
                if state.vfs.remove(func_id).is_some() {
                    state.vf_online_count =
                        state.vf_online_count.saturating_sub(1);
                }
            }
            PfEvent::VfResetBye(func_id) => {
                if state.vfs.get(func_id).is_some() {
                    let _ = state.vfs.try_insert(func_id, VfState::ByeDone);
                    state.vf_online_count =
                        state.vf_online_count.saturating_sub(1);
                }
            }
            PfEvent::VfReset(_) | PfEvent::PfResetDone(_) | PfEvent::PfBye(_) => {}
        }
    }

    /// One timer tick: push queued sends, drain the inbox.
    pub fn poll<B: QdmaBus>(&self, dev: &Qdma<B>, rm: Option<&ResourceManager>) {
        self.service_send(dev);
        self.service_recv(dev, rm);
    }

    /// Non-blocking completion check: `None` while the exchange is in
    /// flight, `Some(Err(Pipe))` if the send died unanswered. Each
    /// completion can be taken once.
    pub fn try_response(
        &self,
        handle: MsgHandle,
    ) -> Option<Result<MboxMessage, QdmaError>> {
        self.take_completion(handle)
            .map(|r| r.ok_or(QdmaError::Mbox(MboxError::Pipe)))
    }

    /// Messages still awaiting transmission.
    pub fn tx_pending(&self) -> usize {
        self.state.lock().tx_todo.len()
    }

    /// Takes the completion for `handle` if it has arrived.
    fn take_completion(&self, handle: MsgHandle) -> Option<Option<MboxMessage>> {
        let mut state = self.state.lock();
        for i in 0..state.completed.len() {
            if state.completed[i].0 == handle.0 {
                return Some(remove_at(&mut state.completed, i).1);
            }
        }
        None
    }

    /// Drives the tick loop until `handle`'s response arrives or its
    /// retry budget dies. The response-pairing walk is FIFO, so
    /// responses reach waiters in send order.
    pub fn wait_response<B: QdmaBus>(
        &self,
        dev: &Qdma<B>,
        rm: Option<&ResourceManager>,
        handle: MsgHandle,
    ) -> Result<MboxMessage, QdmaError> {
        // The eviction path guarantees a completion within the retry
        // budget; the extra margin covers a response in flight.
        let mut budget = MBOX_OP_RSP_TIMEOUT_MS * 2;
        loop {
            self.poll(dev, rm);
            match self.take_completion(handle) {
                Some(Some(rsp)) => return Ok(rsp),
                Some(None) => return Err(MboxError::Pipe.into()),
                None => {}
            }
            if budget == 0 {
                return Err(MboxError::Pipe.into());
            }
            budget -= 1;
            dev.bus().udelay(MBOX_POLL_FRQ_MS * 1000);
        }
    }

    /// Queues `msg` and blocks (cooperatively) for its response.
    pub fn send_and_wait<B: QdmaBus>(
        &self,
        dev: &Qdma<B>,
        rm: Option<&ResourceManager>,
        msg: MboxMessage,
        timeout_ms: u32,
    ) -> Result<MboxMessage, QdmaError> {
        let handle = self.send(msg, timeout_ms)?;
        self.wait_response(dev, rm, handle)
    }

    /// Blocks until the to-do list drains; call before tearing the
    /// mailbox down so queued messages are not dropped on the floor.
    pub fn quiesce<B: QdmaBus>(&self, dev: &Qdma<B>, rm: Option<&ResourceManager>) {
        loop {
            self.poll(dev, rm);
            if self.state.lock().tx_todo.is_empty() {
                break;
            }
            dev.bus().udelay(MBOX_POLL_FRQ_MS * 1000);
        }
        if dev.attributes().mailbox_intr {
            transport::disable_interrupts(dev);
        }
    }

    /// PF shutdown or reset entry: notifies every online VF (reset
    /// prepare for a reset, bye for a shutdown) and waits up to
    /// [`RESET_TIMEOUT_MS`] for their byes. A straggler only costs a
    /// logged warning; the PF proceeds regardless.
    pub fn pf_notify_teardown<B: QdmaBus>(
        &self,
        dev: &Qdma<B>,
        rm: &ResourceManager,
        reset: bool,
    ) -> Result<(), QdmaError> {
        let (func_id, targets) = {
            let state = self.state.lock();
            let mut targets: Vec<u16, MAX_VFS> = Vec::new();
            for (vf, vf_state) in state.vfs.iter() {
                if vf_state == VfState::Online {
                    let _ = targets.push(vf);
                }
            }
            (state.func_id, targets)
        };

        for &vf in &targets {
            let msg = if reset {
                MboxMessage::pf_reset_prepare(func_id, vf)
            } else {
                MboxMessage::pf_offline(func_id, vf)
            };
            self.send(msg, 0)?;
            if reset {
                let mut state = self.state.lock();
                let _ = state.vfs.try_insert(vf, VfState::ResetSent);
            }
        }

        let mut waited = 0;
        while self.online_vf_count() != 0 && waited < RESET_TIMEOUT_MS {
            self.poll(dev, Some(rm));
            dev.bus().udelay(MBOX_POLL_FRQ_MS * 1000);
            waited += MBOX_POLL_FRQ_MS;
        }
        if self.online_vf_count() != 0 {
            dev.bus()
                .log_error("qdma mbox: VFs failed to shut down in time");
        }
        Ok(())
    }

    /// After the PF re-initializes, tells every VF that acknowledged the
    /// reset to come back, then waits up to [`RESET_TIMEOUT_MS`] for
    /// their hellos. Stragglers are logged, not fatal.
    pub fn pf_notify_reset_done<B: QdmaBus>(
        &self,
        dev: &Qdma<B>,
        rm: &ResourceManager,
    ) -> Result<(), QdmaError> {
        let (func_id, targets, expected) = {
            let state = self.state.lock();
            let mut targets: Vec<u16, MAX_VFS> = Vec::new();
            for (vf, vf_state) in state.vfs.iter() {
                if vf_state == VfState::ByeDone {
                    let _ = targets.push(vf);
                }
            }
            let expected = targets.len() as u32;
            (state.func_id, targets, expected)
        };

        for &vf in &targets {
            self.send(MboxMessage::pf_reset_done(func_id, vf), 0)?;
        }

        let mut waited = 0;
        while self.online_vf_count() < expected && waited < RESET_TIMEOUT_MS {
            self.poll(dev, Some(rm));
            dev.bus().udelay(MBOX_POLL_FRQ_MS * 1000);
            waited += MBOX_POLL_FRQ_MS;
        }
        if self.online_vf_count() < expected {
            dev.bus()
                .log_error("qdma mbox: not all VFs returned after reset");
        }
        Ok(())
    }
}
