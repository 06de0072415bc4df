// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Client API for the multi-queue DMA (QDMA) subsystem.
//!
//! This crate holds the types shared between the core driver
//! (`drv-qdma`), the PF/VF mailbox layer (`drv-qdma-mbox`), and their
//! hosts: error enums, device capability/version records, the per-queue
//! context structures programmed through the indirect-context window, and
//! the mask-based bit-field helpers everything marshals with.
//!
//! Nothing in here touches hardware; it is types and arithmetic only.

#![cfg_attr(not(test), no_std)]

mod bits;
mod ctxt;
mod error;

pub use bits::*;
pub use ctxt::*;
pub use error::{MboxError, QdmaError};

use num_derive::FromPrimitive;

/// Number of entries in each global CSR lookup table (ring sizes, buffer
/// sizes, timer thresholds, counter thresholds).
pub const GLOBAL_CSR_ARRAY_SZ: usize = 16;

/// Sentinel for "no function": the 12-bit function id space can never
/// produce this value.
pub const FUNC_ID_INVALID: u16 = 0xFFFF;

/// Maximum number of interrupt aggregation rings per function.
pub const NUM_DATA_VEC_FOR_INTR_CTXT: usize = 8;

/// Number of BARs a PCIe function can expose.
pub const BAR_NUM: u8 = 6;

/// How many `(addr, value)` pairs fit in one register-list mailbox
/// response.
pub const MAX_REGISTER_DUMP: usize = 14;

/// The IP variants this driver knows how to drive. The set is closed, so
/// dispatch is by `match` rather than a function table; unused variants
/// compile out with their register tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IpVariant {
    /// Programmable-logic QDMA.
    SoftQdma,
    /// Everest S80 hardened block.
    HardS80Qdma,
    /// Everest QDMA soft IP.
    EqdmaSoft,
}

/// Descriptor engine operating mode, from `GLBL2_MISC_CAP[3:2]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum DescEngMode {
    InternalAndBypass = 0,
    BypassOnly = 1,
    InternalOnly = 2,
}

impl Default for DescEngMode {
    fn default() -> Self {
        Self::InternalAndBypass
    }
}

/// Device capabilities, read once from the capability registers at probe
/// (or received over the mailbox on a VF).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DeviceAttributes {
    /// Number of physical functions with a mapped config BAR.
    pub num_pfs: u8,
    /// Number of hardware queues on the device.
    pub num_qs: u16,
    /// Function-level reset supported.
    pub flr_present: bool,
    /// Streaming engine present (both directions).
    pub st_en: bool,
    /// Memory-mapped engine present (both directions).
    pub mm_en: bool,
    /// Completion rings usable with MM queues.
    pub mm_cmpt_en: bool,
    /// Mailbox block present.
    pub mailbox_en: bool,
    /// Mailbox can raise interrupts (vs. polling only).
    pub mailbox_intr: bool,
    /// Number of MM channels.
    pub mm_channel_max: u8,
    /// Debug-mode registers readable.
    pub debug_mode: bool,
    pub desc_eng_mode: DescEngMode,
    /// 64-byte software descriptors supported.
    pub sw_desc_64b: bool,
    /// 64-byte completion descriptors supported.
    pub cmpt_desc_64b: bool,
    /// Completion overflow check can be disabled per queue.
    pub cmpt_ovf_chk_dis: bool,
    pub dynamic_bar: bool,
    pub legacy_intr: bool,
    /// Completion trigger mode timer+counter supported.
    pub cmpt_trig_count_timer: bool,
    /// Legacy qid-to-vector context (pre-aggregation silicon).
    pub qid2vec_ctx: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum RtlVersion {
    Rtl1 = 0,
    Rtl2 = 1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
pub enum VivadoRelease {
    Vivado2018_3 = 0,
    Vivado2019_1 = 1,
    Vivado2019_2 = 2,
    Vivado2020_1 = 3,
    Vivado2020_2 = 4,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DeviceType {
    Soft,
    VersalCpm4,
    VersalCpm5,
}

/// Hardware version information, decoded from the PF or VF version
/// register.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HwVersion {
    pub rtl_version: RtlVersion,
    pub vivado_release: VivadoRelease,
    pub device_type: DeviceType,
    pub ip_variant: IpVariant,
}

impl RtlVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rtl1 => "RTL Base",
            Self::Rtl2 => "RTL Patch",
        }
    }
}

impl VivadoRelease {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vivado2018_3 => "vivado 2018.3",
            Self::Vivado2019_1 => "vivado 2019.1",
            Self::Vivado2019_2 => "vivado 2019.2",
            Self::Vivado2020_1 => "vivado 2020.1",
            Self::Vivado2020_2 => "vivado 2020.2",
        }
    }
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Soft => "Soft IP",
            Self::VersalCpm4 => "Versal CPM4 Hard IP",
            Self::VersalCpm5 => "Versal CPM5 Hard IP",
        }
    }
}

/// Which global CSR lookup table an operation targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CsrType {
    RingSize,
    BufferSize,
    TimerCount,
    CounterThreshold,
}

/// Snapshot of the four CSR tables plus the writeback interval, as
/// shipped to VFs over the mailbox.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CsrInfo {
    pub ringsz: [u16; GLOBAL_CSR_ARRAY_SZ],
    pub bufsz: [u16; GLOBAL_CSR_ARRAY_SZ],
    pub timer_cnt: [u8; GLOBAL_CSR_ARRAY_SZ],
    pub cnt_thres: [u8; GLOBAL_CSR_ARRAY_SZ],
    pub wb_intvl: u16,
}

impl Default for CsrInfo {
    fn default() -> Self {
        Self {
            ringsz: [0; GLOBAL_CSR_ARRAY_SZ],
            bufsz: [0; GLOBAL_CSR_ARRAY_SZ],
            timer_cnt: [0; GLOBAL_CSR_ARRAY_SZ],
            cnt_thres: [0; GLOBAL_CSR_ARRAY_SZ],
            wb_intvl: 0,
        }
    }
}

/// One register read, as returned by the grouped register-list dump.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RegData {
    pub addr: u32,
    pub val: u32,
}
