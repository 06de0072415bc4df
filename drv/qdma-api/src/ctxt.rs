// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-queue hardware context structures.
//!
//! These are the in-memory forms of the seven context types programmed
//! through the indirect-context window. The hardware is the system of
//! record: the driver composes one of these, serializes it into the data
//! words, and forgets it. Field widths follow the silicon; single-bit
//! fields are `bool`, everything else is the narrowest integer that fits.

use num_derive::FromPrimitive;

/// What to do with a context: the four opcodes of the indirect command
/// register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AccessOp {
    Clear,
    Write,
    Read,
    Invalidate,
}

/// Direction of a data queue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueueDirection {
    H2c,
    C2h,
}

impl QueueDirection {
    pub fn is_c2h(&self) -> bool {
        matches!(self, Self::C2h)
    }
}

/// Queue flavor as tracked by the per-function active counters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum QueueType {
    H2c = 0,
    C2h = 1,
    Cmpt = 2,
}

impl QueueType {
    pub const COUNT: usize = 3;
}

/// Which completion-context flavor accompanies a queue-context operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum CmptCtxtKind {
    /// Only the completion context itself (MM completion-only queue).
    CmptOnly = 0,
    /// Completion ring paired with an MM queue.
    WithMm = 1,
    /// Completion ring paired with an ST queue.
    WithSt = 2,
    /// No completion context.
    None = 3,
}

/// Descriptor sizes the engines understand. The encoded value is what
/// lands in the context word.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum DescSize {
    D8 = 0,
    D16 = 1,
    D32 = 2,
    D64 = 3,
}

impl DescSize {
    /// Size in bytes.
    pub fn bytes(&self) -> u32 {
        8 << (*self as u32)
    }
}

/// Completion status-write trigger condition.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum TrigMode {
    Disabled = 0,
    Every = 1,
    UserCount = 2,
    User = 3,
    UserTimer = 4,
    /// Timer or counter, whichever fires first. Highest legal encoding.
    UserTimerCount = 5,
}

impl Default for TrigMode {
    fn default() -> Self {
        Self::Disabled
    }
}

/// Software descriptor context. Owned by the driver, fetched by the
/// descriptor engine.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwContext {
    /// Producer index.
    pub pidx: u16,
    /// Interrupt arm on next completion.
    pub irq_arm: bool,
    /// Owning function.
    pub fnc_id: u16,

    /// Queue enable.
    pub qen: bool,
    /// Fetch credits enable.
    pub frcd_en: bool,
    /// Writeback pending check.
    pub wbi_chk: bool,
    /// Writeback interval enable.
    pub wbi_intvl_en: bool,
    /// Address translation.
    pub at: bool,
    /// Maximum outstanding descriptor fetches.
    pub fetch_max: u8,
    /// Ring size table index.
    pub rngsz_idx: u8,
    /// Descriptor size encoding.
    pub desc_sz: u8,
    /// Descriptor bypass.
    pub bypass: bool,
    /// MM channel select.
    pub mm_chn: bool,
    /// Writeback enable.
    pub wbk_en: bool,
    /// Interrupt enable.
    pub irq_en: bool,
    /// Port id.
    pub port_id: u8,
    pub irq_no_last: bool,
    /// Error status (read-only reflection).
    pub err: u8,
    /// Error writeback sent (read-only reflection).
    pub err_wb_sent: bool,
    /// Interrupt pending on arm (read-only reflection).
    pub irq_req: bool,
    /// Marker disable.
    pub mrkr_dis: bool,
    /// Memory-mapped (vs. streaming) queue.
    pub is_mm: bool,

    /// Descriptor ring base address.
    pub ring_bs_addr: u64,

    /// Interrupt vector.
    pub vec: u16,
    /// Interrupt aggregation.
    pub intr_aggr: bool,
    pub dis_intr_on_vf: bool,
    pub virtio_en: bool,
    pub pack_byp_out: bool,
    pub irq_byp: bool,
    pub host_id: u8,
    /// 22-bit process address space id.
    pub pasid: u32,
    pub pasid_en: bool,
    /// 64-bit virtio descriptor base.
    pub virtio_dsc_base: u64,
}

/// Hardware descriptor context: read-only reflection of engine state.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HwContext {
    /// Consumer index.
    pub cidx: u16,
    /// Credits consumed.
    pub crd_use: u16,
    /// Descriptors pending.
    pub dsc_pend: bool,
    /// Queue invalid / no descriptors pending.
    pub idl_stp_b: bool,
    /// Event pending.
    pub evt_pnd: bool,
    /// Descriptor fetches pending.
    pub fetch_pnd: u8,
}

/// Fetch-credit context (read-only).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CreditContext {
    pub credit: u16,
}

/// Prefetch context, streaming C2H queues only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PrefetchContext {
    /// Prefetch bypass.
    pub bypass: bool,
    /// Buffer size table index.
    pub bufsz_idx: u8,
    pub port_id: u8,
    /// Variable descriptor size.
    pub var_desc: bool,
    /// Number of descriptors prefetched.
    pub num_pftch: u16,
    /// Error detected (read-only reflection).
    pub err: bool,
    /// Prefetch enable.
    pub pfch_en: bool,
    /// Queue is in prefetch (read-only reflection).
    pub pfch: bool,
    /// Software credit.
    pub sw_crdt: u16,
    pub valid: bool,
}

/// Completion ring context.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CmptContext {
    /// Completion status writes enabled.
    pub en_stat_desc: bool,
    /// Completion interrupts enabled.
    pub en_int: bool,
    /// Trigger mode encoding (see [`TrigMode`]).
    pub trig_mode: u8,
    /// Owning function.
    pub fnc_id: u16,
    /// Counter threshold table index.
    pub counter_idx: u8,
    /// Timer threshold table index.
    pub timer_idx: u8,
    /// Interrupt state (read-only reflection).
    pub in_st: u8,
    /// Current color.
    pub color: bool,
    /// Ring size table index.
    pub ringsz_idx: u8,
    /// Completion ring base address.
    pub bs_addr: u64,
    /// Completion entry size encoding.
    pub desc_sz: u8,
    pub pidx: u16,
    pub cidx: u16,
    pub valid: bool,
    /// Error status (read-only reflection).
    pub err: u8,
    /// A user trigger is pending (read-only reflection).
    pub user_trig_pend: bool,
    /// Timer running (read-only reflection).
    pub timer_running: bool,
    /// Full update mode.
    pub full_upd: bool,
    /// Overflow check disable.
    pub ovf_chk_dis: bool,
    pub at: bool,
    pub vec: u16,
    pub int_aggr: bool,
    pub dis_intr_on_vf: bool,
    pub vio: bool,
    pub dir_c2h: bool,
    pub host_id: u8,
    pub pasid: u32,
    pub pasid_en: bool,
    pub vio_eop: bool,
    pub sh_cmpt: bool,
}

/// Interrupt aggregation ring context.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IntrContext {
    pub valid: bool,
    /// Interrupt vector index.
    pub vec: u16,
    /// Interrupt state (read-only reflection).
    pub int_st: bool,
    pub color: bool,
    /// 52-bit ring base, in 4 KiB units.
    pub baddr_4k: u64,
    /// Entries-per-page code.
    pub page_size: u8,
    /// 12-bit producer index.
    pub pidx: u16,
    pub at: bool,
    pub func_id: u16,
    pub pasid: u32,
    pub pasid_en: bool,
    pub host_id: u8,
}

/// Function map: the queue range owned by a function.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FmapCfg {
    pub qbase: u16,
    pub qmax: u16,
}

/// Caller-facing queue configuration, in semantic units.
///
/// Ring sizes, buffer sizes and thresholds here are raw values; the core
/// translates each to its CSR table index when composing contexts, and the
/// translation fails if no exact table entry matches.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DescqConfig {
    /// Descriptor ring base address.
    pub ring_bs_addr: u64,
    /// Completion ring base address.
    pub cmpt_ring_bs_addr: u64,
    /// Enable fetch credits.
    pub forced_en: bool,
    /// Descriptor bypass.
    pub en_bypass: bool,
    pub irq_arm: bool,
    pub wbi_intvl_en: bool,
    pub wbi_chk: bool,
    /// Address translation.
    pub at: bool,
    pub wbk_en: bool,
    pub irq_en: bool,
    /// Prefetch enable (ST C2H).
    pub pfch_en: bool,
    /// Prefetch bypass (ST C2H).
    pub en_bypass_prefetch: bool,
    /// Disable completion ring overflow check.
    pub dis_overflow_check: bool,
    /// Completion interrupt enable.
    pub cmpt_int_en: bool,
    /// Completion address translation.
    pub cmpt_at: bool,
    /// Completion status writes enabled.
    pub cmpl_stat_en: bool,
    /// Completion full update.
    pub cmpt_full_upd: bool,
    /// Descriptor size encoding.
    pub desc_sz: u8,
    /// Completion entry size encoding.
    pub cmpt_desc_sz: u8,
    /// Trigger mode encoding.
    pub triggermode: u8,
    /// Owning function.
    pub func_id: u16,
    /// Counter threshold, in packets.
    pub cnt_thres: u8,
    /// Timer threshold, in microseconds.
    pub timer_thres: u8,
    /// Interrupt vector.
    pub intr_id: u16,
    pub intr_aggr: bool,
    /// Descriptor ring size, in descriptors.
    pub ringsz: u16,
    /// C2H buffer size, in bytes.
    pub bufsz: u16,
    /// Completion ring size, in descriptors.
    pub cmpt_ringsz: u16,
}

/// All contexts of one data queue, as returned by a full context read.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DescqContext {
    pub sw: SwContext,
    pub hw: HwContext,
    pub cr: CreditContext,
    pub pfetch: PrefetchContext,
    pub cmpt: CmptContext,
}
