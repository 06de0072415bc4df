// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register-level simulator of the QDMA block, for the test suites.
//!
//! One `SimMachine` models a device: shared config space, the
//! indirect-context engine with per-(selector, qid) context memory, the
//! write-1-to-clear error registers, and one mailbox endpoint per
//! function wired together the way the silicon wires them. Buses handed
//! out by [`SimMachine::pf_bus`] / [`SimMachine::add_vf`] implement
//! [`drv_qdma::QdmaBus`] and can be driven by the real driver stack.
//!
//! The simulator also records an indirect-command trace and captures
//! driver log lines, so tests can assert on operation ordering and
//! diagnostics without scraping registers.

use drv_qdma::regs::{eqdma, soft};
use drv_qdma::QdmaBus;
use drv_qdma_api::{field_get, field_set, genmask, IpVariant};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// Indirect command register layout (shared contract with the driver).
const IND_CMD_OP_MASK: u32 = genmask(2, 0);
const IND_CMD_SEL_MASK: u32 = genmask(14, 3);
const IND_CMD_QID_MASK: u32 = genmask(26, 15);
const IND_CMD_BUSY_MASK: u32 = 1 << 27;

// Mailbox block offsets.
const MBOX_FN_STATUS: u32 = 0x0;
const MBOX_FN_CMD: u32 = 0x4;
const MBOX_FN_TARGET: u32 = 0xC;
const MBOX_PF_ACK_BASE: u32 = 0x20;
const MBOX_PF_ACK_COUNT: u32 = 8;
const MBOX_IN_MSG_BASE: u32 = 0x800;
const MBOX_OUT_MSG_BASE: u32 = 0xC00;
const MBOX_WORDS: usize = 32;

const CMD_SND: u32 = 1 << 0;
const CMD_RCV: u32 = 1 << 1;

/// One recorded indirect-context command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CtxtCmd {
    pub op: u32,
    pub sel: u32,
    pub qid: u16,
}

/// Everything the simulator knows about one function's mailbox.
struct Endpoint {
    func_id: u16,
    is_vf: bool,
    /// Queued inbound frames: `(source function, payload)`.
    inbox: VecDeque<(u16, [u32; MBOX_WORDS])>,
    /// Scratch registers local to the endpoint's mailbox page,
    /// including the outbound window and identity registers.
    page: HashMap<u32, u32>,
    /// The outbox holds an unacknowledged message.
    out_pending: bool,
    /// PF only: per-function ack bitmap.
    ack_bits: [u32; MBOX_PF_ACK_COUNT as usize],
}

impl Endpoint {
    fn new(func_id: u16, is_vf: bool) -> Self {
        Self {
            func_id,
            is_vf,
            inbox: VecDeque::new(),
            page: HashMap::new(),
            out_pending: false,
            ack_bits: [0; MBOX_PF_ACK_COUNT as usize],
        }
    }
}

struct Machine {
    variant: IpVariant,
    /// Shared config space.
    regs: HashMap<u32, u32>,
    /// Context memory: `(selector, qid)` to window contents + validity.
    ctx: HashMap<(u32, u16), ([u32; 8], bool)>,
    cmd_log: Vec<CtxtCmd>,
    endpoints: Vec<Endpoint>,
    /// When set, the busy bit never drains and context ops time out.
    wedge_ctxt_busy: bool,
    /// When set, the PF neither receives nor acknowledges anything.
    pf_dead: bool,
    logs: Vec<String>,
}

/// Capability knobs for a simulated device.
#[derive(Copy, Clone, Debug)]
pub struct SimConfig {
    pub variant: IpVariant,
    pub num_qs: u16,
    pub num_pfs: u8,
    pub st_en: bool,
    pub mm_en: bool,
    pub mailbox_en: bool,
    pub flr_present: bool,
    pub debug_mode: bool,
    /// BAR index reported as the user BAR for every function.
    pub user_bar: u8,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            variant: IpVariant::EqdmaSoft,
            num_qs: 2048,
            num_pfs: 4,
            st_en: true,
            mm_en: true,
            mailbox_en: true,
            flr_present: true,
            debug_mode: false,
            user_bar: 2,
        }
    }
}

fn w1c_addrs() -> &'static [u32] {
    &[
        soft::GLBL_ERR_STAT,
        soft::GLBL_DSC_ERR_STS,
        soft::GLBL_TRQ_ERR_STS,
        soft::C2H_ERR_STAT,
        soft::C2H_FATAL_ERR_STAT,
        soft::H2C_ERR_STAT,
        soft::RAM_SBE_STS,
        soft::RAM_DBE_STS,
        eqdma::RAM_SBE_1_STS,
        eqdma::RAM_DBE_1_STS,
    ]
}

pub struct SimMachine {
    inner: Arc<Mutex<Machine>>,
}

/// One function's view of the device; implements the driver bus trait.
pub struct SimBus {
    inner: Arc<Mutex<Machine>>,
    ep: usize,
}

impl SimMachine {
    pub fn new(cfg: SimConfig) -> Self {
        let mut regs = HashMap::new();

        regs.insert(
            soft::CONFIG_BLOCK_ID,
            field_set(soft::CONFIG_BLOCK_ID_MASK, soft::CONFIG_BLOCK_MAGIC),
        );

        // Version + capability word. Vivado 2020.2, RTL base.
        let ip = match cfg.variant {
            IpVariant::SoftQdma => 0,
            IpVariant::EqdmaSoft => 1,
            IpVariant::HardS80Qdma => 2,
        };
        let device_id = match cfg.variant {
            IpVariant::HardS80Qdma => 1,
            _ => 0,
        };
        regs.insert(
            soft::GLBL2_MISC_CAP,
            field_set(soft::GLBL2_DEVICE_ID_MASK, device_id)
                | field_set(soft::GLBL2_VIVADO_RELEASE_MASK, 4)
                | field_set(soft::GLBL2_IP_TYPE_MASK, ip)
                | field_set(soft::GLBL2_RTL_VERSION_MASK, 0)
                | field_set(soft::GLBL2_MAILBOX_EN_MASK, cfg.mailbox_en.into())
                | field_set(soft::GLBL2_FLR_PRESENT_MASK, cfg.flr_present.into())
                | field_set(soft::GLBL2_DBG_MODE_MASK, cfg.debug_mode.into()),
        );

        let mut mdma = 0;
        if cfg.st_en {
            mdma |= soft::GLBL2_ST_C2H_MASK | soft::GLBL2_ST_H2C_MASK;
        }
        if cfg.mm_en {
            mdma |= soft::GLBL2_MM_C2H_MASK | soft::GLBL2_MM_H2C_MASK;
        }
        regs.insert(soft::GLBL2_CHANNEL_MDMA, mdma);

        regs.insert(
            soft::GLBL2_CHANNEL_QDMA_CAP,
            field_set(soft::GLBL2_MULTQ_MAX_MASK, cfg.num_qs.into()),
        );

        // One 6-bit BAR-map slot per PF.
        let mut barlite = 0;
        for pf in 0..cfg.num_pfs.min(4) {
            barlite |= 1 << (6 * pf);
        }
        regs.insert(soft::GLBL2_PF_BARLITE_INT, barlite);

        // Same user BAR for every PF slot.
        let mut ext = 0;
        for pf in 0..4 {
            ext |= u32::from(1u8 << cfg.user_bar) << (6 * pf);
        }
        regs.insert(soft::GLBL2_PF_BARLITE_EXT, ext);

        // Bitstream-sized FIFO depths read back by the CSR defaults.
        regs.insert(soft::C2H_PFETCH_CACHE_DEPTH, 16);
        regs.insert(soft::C2H_CMPT_COAL_BUF_DEPTH, 16);

        // The legacy VF version location is visible to every VF; a VF
        // that discovers a relocated map re-reads from its own page.
        regs.insert(
            soft::VF_VERSION,
            field_set(soft::VF_DEVICE_ID_MASK, device_id)
                | field_set(soft::VF_VIVADO_RELEASE_MASK, 4)
                | field_set(soft::VF_IP_TYPE_MASK, ip)
                | field_set(soft::VF_RTL_VERSION_MASK, 0),
        );

        let mut m = Machine {
            variant: cfg.variant,
            regs,
            ctx: HashMap::new(),
            cmd_log: Vec::new(),
            endpoints: Vec::new(),
            wedge_ctxt_busy: false,
            pf_dead: false,
            logs: Vec::new(),
        };

        // Function 0 is the master PF.
        let mut pf = Endpoint::new(0, false);
        Self::seed_identity(&mut pf, cfg.variant, device_id, ip, cfg.user_bar);
        m.endpoints.push(pf);

        Self {
            inner: Arc::new(Mutex::new(m)),
        }
    }

    fn seed_identity(
        ep: &mut Endpoint,
        variant: IpVariant,
        device_id: u32,
        ip: u32,
        user_bar: u8,
    ) {
        if !ep.is_vf {
            return;
        }
        let version = field_set(soft::VF_DEVICE_ID_MASK, device_id)
            | field_set(soft::VF_VIVADO_RELEASE_MASK, 4)
            | field_set(soft::VF_IP_TYPE_MASK, ip)
            | field_set(soft::VF_RTL_VERSION_MASK, 0);
        let base = match variant {
            IpVariant::EqdmaSoft => eqdma::MBOX_BASE_VF,
            _ => soft::MBOX_BASE_VF,
        };
        // Identity registers share the VF mailbox page.
        let version_off = match variant {
            IpVariant::EqdmaSoft => eqdma::VF_VERSION - base,
            _ => soft::VF_VERSION - base,
        };
        let bar_off = match variant {
            IpVariant::EqdmaSoft => eqdma::VF_USER_BAR_ID - base,
            _ => soft::VF_USER_BAR_ID - base,
        };
        ep.page.insert(version_off, version);
        ep.page.insert(bar_off, u32::from(1u8 << user_bar));
    }

    /// The master PF's bus.
    pub fn pf_bus(&self) -> SimBus {
        SimBus {
            inner: Arc::clone(&self.inner),
            ep: 0,
        }
    }

    /// Adds a VF with the given function id and returns its bus.
    pub fn add_vf(&self, func_id: u16) -> SimBus {
        let mut m = self.inner.lock().unwrap();
        let variant = m.variant;
        let (device_id, ip) = {
            let v = m.regs[&soft::GLBL2_MISC_CAP];
            (
                field_get(soft::GLBL2_DEVICE_ID_MASK, v),
                field_get(soft::GLBL2_IP_TYPE_MASK, v),
            )
        };
        let user_bar = {
            let ext = m.regs[&soft::GLBL2_PF_BARLITE_EXT];
            (ext & 0x3F).trailing_zeros() as u8
        };
        let mut ep = Endpoint::new(func_id, true);
        Self::seed_identity(&mut ep, variant, device_id, ip, user_bar);
        m.endpoints.push(ep);
        SimBus {
            inner: Arc::clone(&self.inner),
            ep: m.endpoints.len() - 1,
        }
    }

    /// Ors bits into a (shared) register, for injecting error status.
    pub fn set_reg_bits(&self, addr: u32, bits: u32) {
        let mut m = self.inner.lock().unwrap();
        *m.regs.entry(addr).or_insert(0) |= bits;
    }

    pub fn reg(&self, addr: u32) -> u32 {
        let m = self.inner.lock().unwrap();
        m.regs.get(&addr).copied().unwrap_or(0)
    }

    /// The indirect-command trace so far.
    pub fn cmd_log(&self) -> Vec<CtxtCmd> {
        self.inner.lock().unwrap().cmd_log.clone()
    }

    pub fn clear_cmd_log(&self) {
        self.inner.lock().unwrap().cmd_log.clear();
    }

    /// Raw context words last written for `(sel, qid)`.
    pub fn ctx_words(&self, sel: u32, qid: u16) -> Option<[u32; 8]> {
        let m = self.inner.lock().unwrap();
        m.ctx.get(&(sel, qid)).map(|(w, _)| *w)
    }

    pub fn ctx_valid(&self, sel: u32, qid: u16) -> bool {
        let m = self.inner.lock().unwrap();
        m.ctx.get(&(sel, qid)).map(|(_, v)| *v).unwrap_or(false)
    }

    /// Makes every indirect-context command time out.
    pub fn wedge_ctxt_busy(&self, wedge: bool) {
        self.inner.lock().unwrap().wedge_ctxt_busy = wedge;
    }

    /// Powers the PF off: nothing it should ack is ever acked.
    pub fn power_off_pf(&self) {
        self.inner.lock().unwrap().pf_dead = true;
    }

    /// Captured driver log lines.
    pub fn logs(&self) -> Vec<String> {
        self.inner.lock().unwrap().logs.clone()
    }

    pub fn log_contains(&self, needle: &str) -> bool {
        self.inner
            .lock()
            .unwrap()
            .logs
            .iter()
            .any(|l| l.contains(needle))
    }
}

impl Machine {
    fn mbox_base(&self, ep: usize) -> u32 {
        let is_vf = self.endpoints[ep].is_vf;
        match (self.variant, is_vf) {
            (IpVariant::EqdmaSoft, true) => eqdma::MBOX_BASE_VF,
            (IpVariant::EqdmaSoft, false) => eqdma::MBOX_BASE_PF,
            (_, true) => soft::MBOX_BASE_VF,
            (_, false) => soft::MBOX_BASE_PF,
        }
    }

    fn ep_index_by_func(&self, func_id: u16) -> Option<usize> {
        self.endpoints.iter().position(|e| e.func_id == func_id)
    }

    fn window(&self) -> (u32, u32, usize) {
        match self.variant {
            IpVariant::HardS80Qdma => (
                drv_qdma::regs::s80::IND_CTXT_DATA,
                drv_qdma::regs::s80::IND_CTXT_CMD,
                drv_qdma::regs::s80::IND_CTXT_DATA_NUM_REGS,
            ),
            _ => (soft::IND_CTXT_DATA, soft::IND_CTXT_CMD, 8),
        }
    }

    fn exec_ctxt_cmd(&mut self, val: u32) {
        let op = field_get(IND_CMD_OP_MASK, val);
        let sel = field_get(IND_CMD_SEL_MASK, val);
        let qid = field_get(IND_CMD_QID_MASK, val) as u16;
        self.cmd_log.push(CtxtCmd { op, sel, qid });

        let (data_base, cmd_addr, num_words) = self.window();

        match op {
            // Clear: scrub the context memory.
            0 => {
                self.ctx.insert((sel, qid), ([0; 8], false));
            }
            // Write: latch the data window.
            1 => {
                let mut words = [0u32; 8];
                for (i, w) in words.iter_mut().enumerate().take(num_words) {
                    *w = self
                        .regs
                        .get(&(data_base + (i as u32) * 4))
                        .copied()
                        .unwrap_or(0);
                }
                self.ctx.insert((sel, qid), (words, true));
            }
            // Read: present the context in the data window.
            2 => {
                let (words, _) = self
                    .ctx
                    .get(&(sel, qid))
                    .copied()
                    .unwrap_or(([0; 8], false));
                for (i, w) in words.iter().enumerate().take(num_words) {
                    self.regs.insert(data_base + (i as u32) * 4, *w);
                }
            }
            // Invalidate: drop validity, keep the bits.
            3 => {
                if let Some(e) = self.ctx.get_mut(&(sel, qid)) {
                    e.1 = false;
                } else {
                    self.ctx.insert((sel, qid), ([0; 8], false));
                }
            }
            _ => {}
        }

        let busy = if self.wedge_ctxt_busy {
            IND_CMD_BUSY_MASK
        } else {
            0
        };
        self.regs.insert(cmd_addr, (val & !IND_CMD_BUSY_MASK) | busy);
    }

    fn mbox_read(&mut self, ep: usize, off: u32) -> u32 {
        match off {
            MBOX_FN_STATUS => {
                let e = &self.endpoints[ep];
                let mut v = 0;
                if let Some((src, _)) = e.inbox.front() {
                    v |= 1; // in_msg
                    v |= field_set(genmask(15, 4), (*src).into());
                }
                if e.out_pending {
                    v |= 1 << 1;
                }
                if !e.is_vf && e.ack_bits.iter().any(|&b| b != 0) {
                    v |= 1 << 2;
                }
                v
            }
            _ if (MBOX_IN_MSG_BASE
                ..MBOX_IN_MSG_BASE + (MBOX_WORDS as u32) * 4)
                .contains(&off) =>
            {
                let idx = ((off - MBOX_IN_MSG_BASE) / 4) as usize;
                self.endpoints[ep]
                    .inbox
                    .front()
                    .map(|(_, words)| words[idx])
                    .unwrap_or(0)
            }
            _ if (MBOX_PF_ACK_BASE..MBOX_PF_ACK_BASE + MBOX_PF_ACK_COUNT * 4)
                .contains(&off) =>
            {
                let idx = ((off - MBOX_PF_ACK_BASE) / 4) as usize;
                self.endpoints[ep].ack_bits[idx]
            }
            _ => self.endpoints[ep].page.get(&off).copied().unwrap_or(0),
        }
    }

    fn mbox_write(&mut self, ep: usize, off: u32, val: u32) {
        match off {
            MBOX_FN_CMD => {
                if val & CMD_SND != 0 {
                    self.mbox_send(ep);
                }
                if val & CMD_RCV != 0 {
                    self.mbox_ack(ep);
                }
            }
            _ if (MBOX_PF_ACK_BASE..MBOX_PF_ACK_BASE + MBOX_PF_ACK_COUNT * 4)
                .contains(&off) =>
            {
                // Write-1-to-clear ack bitmap.
                let idx = ((off - MBOX_PF_ACK_BASE) / 4) as usize;
                self.endpoints[ep].ack_bits[idx] &= !val;
            }
            _ => {
                self.endpoints[ep].page.insert(off, val);
            }
        }
    }

    fn mbox_send(&mut self, ep: usize) {
        let (is_vf, func_id) =
            (self.endpoints[ep].is_vf, self.endpoints[ep].func_id);

        // Destination: a VF always talks to the PF; the PF addresses a
        // function through FN_TARGET.
        let dst_func = if is_vf {
            self.endpoints[0].func_id
        } else {
            self.endpoints[ep]
                .page
                .get(&MBOX_FN_TARGET)
                .copied()
                .unwrap_or(0) as u16
        };

        let mut words = [0u32; MBOX_WORDS];
        for (i, w) in words.iter_mut().enumerate() {
            *w = self.endpoints[ep]
                .page
                .get(&(MBOX_OUT_MSG_BASE + (i as u32) * 4))
                .copied()
                .unwrap_or(0);
        }

        self.endpoints[ep].out_pending = true;

        if self.pf_dead && !is_vf {
            // The PF process is gone; its mailbox does nothing.
            return;
        }
        let Some(dst) = self.ep_index_by_func(dst_func) else {
            return;
        };
        if self.pf_dead && !self.endpoints[dst].is_vf {
            // Messages to a dead PF land in a black hole and are never
            // acknowledged, leaving the sender's outbox busy.
            return;
        }
        self.endpoints[dst].inbox.push_back((func_id, words));
    }

    fn mbox_ack(&mut self, ep: usize) {
        let Some((src_func, _)) = self.endpoints[ep].inbox.pop_front() else {
            return;
        };
        let receiver_func = self.endpoints[ep].func_id;

        // Completing the receive releases the sender's outbox, and a
        // VF's ack raises its bit in the PF's ack bitmap.
        if let Some(src) = self.ep_index_by_func(src_func) {
            self.endpoints[src].out_pending = false;
            if !self.endpoints[src].is_vf && self.endpoints[ep].is_vf {
                let idx = (receiver_func / 32) as usize;
                if idx < self.endpoints[src].ack_bits.len() {
                    self.endpoints[src].ack_bits[idx] |=
                        1 << (receiver_func % 32);
                }
            }
        }
    }
}

impl QdmaBus for SimBus {
    fn reg_read(&self, addr: u32) -> u32 {
        let mut m = self.inner.lock().unwrap();
        let base = m.mbox_base(self.ep);
        if (base..base + 0x1000).contains(&addr) {
            return m.mbox_read(self.ep, addr - base);
        }
        m.regs.get(&addr).copied().unwrap_or(0)
    }

    fn reg_write(&self, addr: u32, val: u32) {
        let mut m = self.inner.lock().unwrap();
        let base = m.mbox_base(self.ep);
        if (base..base + 0x1000).contains(&addr) {
            m.mbox_write(self.ep, addr - base, val);
            return;
        }
        let (_, cmd_addr, _) = m.window();
        if addr == cmd_addr {
            m.exec_ctxt_cmd(val);
            return;
        }
        if w1c_addrs().contains(&addr) {
            let cur = m.regs.get(&addr).copied().unwrap_or(0);
            m.regs.insert(addr, cur & !val);
            return;
        }
        m.regs.insert(addr, val);
    }

    fn reg_access_lock(&self) {}
    fn reg_access_release(&self) {}

    fn udelay(&self, _usec: u32) {}

    fn log_error(&self, msg: &str) {
        self.inner.lock().unwrap().logs.push(msg.to_string());
    }

    fn log_info(&self, msg: &str) {
        self.inner.lock().unwrap().logs.push(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_space_defaults() {
        let sim = SimMachine::new(SimConfig::default());
        let bus = sim.pf_bus();
        let id = bus.reg_read(soft::CONFIG_BLOCK_ID);
        assert_eq!(
            field_get(soft::CONFIG_BLOCK_ID_MASK, id),
            soft::CONFIG_BLOCK_MAGIC
        );
    }

    #[test]
    fn ctxt_engine_write_read_roundtrip() {
        let sim = SimMachine::new(SimConfig::default());
        let bus = sim.pf_bus();

        // Window write + command.
        for i in 0..8u32 {
            bus.reg_write(soft::IND_CTXT_DATA + i * 4, 0x100 + i);
        }
        let cmd = field_set(IND_CMD_OP_MASK, 1)
            | field_set(IND_CMD_SEL_MASK, 0)
            | field_set(IND_CMD_QID_MASK, 7);
        bus.reg_write(soft::IND_CTXT_CMD, cmd);
        assert_eq!(bus.reg_read(soft::IND_CTXT_CMD) & IND_CMD_BUSY_MASK, 0);

        // Scramble the window, then read back.
        for i in 0..8u32 {
            bus.reg_write(soft::IND_CTXT_DATA + i * 4, 0);
        }
        let cmd = field_set(IND_CMD_OP_MASK, 2)
            | field_set(IND_CMD_SEL_MASK, 0)
            | field_set(IND_CMD_QID_MASK, 7);
        bus.reg_write(soft::IND_CTXT_CMD, cmd);
        assert_eq!(bus.reg_read(soft::IND_CTXT_DATA), 0x100);
        assert_eq!(bus.reg_read(soft::IND_CTXT_DATA + 28), 0x107);

        assert_eq!(sim.cmd_log().len(), 2);
    }

    #[test]
    fn w1c_registers_clear() {
        let sim = SimMachine::new(SimConfig::default());
        let bus = sim.pf_bus();
        sim.set_reg_bits(soft::GLBL_ERR_STAT, 0x105);
        bus.reg_write(soft::GLBL_ERR_STAT, 0x5);
        assert_eq!(bus.reg_read(soft::GLBL_ERR_STAT), 0x100);
    }

    #[test]
    fn mailbox_delivery_and_ack() {
        let sim = SimMachine::new(SimConfig::default());
        let pf = sim.pf_bus();
        let vf = sim.add_vf(5);

        // VF composes a frame and sends it.
        let vf_base = eqdma::MBOX_BASE_VF;
        vf.reg_write(vf_base + MBOX_OUT_MSG_BASE, 0xAA55);
        vf.reg_write(vf_base + MBOX_FN_CMD, CMD_SND);
        assert_ne!(vf.reg_read(vf_base + MBOX_FN_STATUS) & (1 << 1), 0);

        // PF sees it, with the true source in status.
        let pf_base = eqdma::MBOX_BASE_PF;
        let status = pf.reg_read(pf_base + MBOX_FN_STATUS);
        assert_ne!(status & 1, 0);
        assert_eq!(field_get(genmask(15, 4), status), 5);
        assert_eq!(pf.reg_read(pf_base + MBOX_IN_MSG_BASE), 0xAA55);

        // PF ack releases the VF outbox.
        pf.reg_write(pf_base + MBOX_FN_CMD, CMD_RCV);
        assert_eq!(vf.reg_read(vf_base + MBOX_FN_STATUS) & (1 << 1), 0);
    }
}
