// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core driver for the multi-queue DMA (QDMA) block.
//!
//! This crate is the register-facing half of the subsystem: per-variant
//! register tables, the indirect-context engine, the global CSR service,
//! the queue-range resource manager, the hardware-error aggregator, and
//! the capability probe. It performs no I/O of its own; the host hands in
//! something implementing [`QdmaBus`] and everything flows through that
//! seam.
//!
//! The PF/VF mailbox rides on top of this crate; see `drv-qdma-mbox`.

#![cfg_attr(not(test), no_std)]

pub mod context;
pub mod csr;
pub mod dump;
pub mod err;
pub mod probe;
pub mod regs;
pub mod resource;

use drv_qdma_api::{DeviceAttributes, IpVariant, QdmaError};

/// Interval between busy-bit polls of the indirect window.
pub const REG_POLL_DFLT_INTERVAL_US: u32 = 10;

/// How long a busy-bit poll may spin before the operation is declared
/// timed out.
pub const REG_POLL_DFLT_TIMEOUT_US: u32 = 100 * 1000;

/// The host-provided access seam: register I/O, the indirect-window lock,
/// delays and logging. The core never touches memory-mapped space, sleeps
/// or logs except through this trait.
///
/// `reg_write` must have release semantics and `reg_read` acquire
/// semantics with respect to the device (the usual volatile MMIO
/// contract); the core relies on writes landing in program order.
pub trait QdmaBus {
    fn reg_read(&self, addr: u32) -> u32;
    fn reg_write(&self, addr: u32, val: u32);

    /// Serializes use of the single indirect-context window. Held from
    /// the first window write until the busy bit drains.
    fn reg_access_lock(&self);
    fn reg_access_release(&self);

    fn udelay(&self, usec: u32);

    fn log_error(&self, _msg: &str) {}
    fn log_info(&self, _msg: &str) {}
}

/// One DMA device: a bus handle plus the facts the probe established
/// about it. Everything else in this crate takes `&Qdma<B>`.
pub struct Qdma<B> {
    bus: B,
    variant: IpVariant,
    is_vf: bool,
    cap: DeviceAttributes,
}

impl<B: QdmaBus> Qdma<B> {
    /// Brings up a PF device: classifies the IP from the version
    /// register and reads the capability registers.
    pub fn new_pf(bus: B) -> Result<Self, QdmaError> {
        if !probe::is_config_bar(&bus) {
            bus.log_error("qdma: config BAR identifier mismatch");
            return Err(QdmaError::InvalidConfigBar);
        }
        let version = probe::version_from(&bus, false)?;
        let mut dev = Self {
            bus,
            variant: version.ip_variant,
            is_vf: false,
            cap: DeviceAttributes::default(),
        };
        dev.cap = probe::device_attributes(&dev)?;
        Ok(dev)
    }

    /// Brings up a VF device. VFs cannot read the PF-only capability
    /// registers; the attributes arrive later over the mailbox and are
    /// installed with [`Qdma::set_attributes`].
    pub fn new_vf(bus: B) -> Result<Self, QdmaError> {
        let version = probe::version_from(&bus, true)?;
        Ok(Self {
            bus,
            variant: version.ip_variant,
            is_vf: true,
            cap: DeviceAttributes::default(),
        })
    }

    /// Constructs a device with everything already known. Test and
    /// proxy-path constructor.
    pub fn from_parts(
        bus: B,
        variant: IpVariant,
        is_vf: bool,
        cap: DeviceAttributes,
    ) -> Self {
        Self {
            bus,
            variant,
            is_vf,
            cap,
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn variant(&self) -> IpVariant {
        self.variant
    }

    pub fn is_vf(&self) -> bool {
        self.is_vf
    }

    pub fn attributes(&self) -> &DeviceAttributes {
        &self.cap
    }

    /// Installs attributes received out of band (a VF's HELLO response).
    pub fn set_attributes(&mut self, cap: DeviceAttributes) {
        self.cap = cap;
    }
}

/// Polls `addr` until `(value & mask) == expected`, sleeping
/// `interval_us` between reads, for at most `timeout_us`. Returns the
/// final register value, or `BusyTimeout` if the condition never held.
pub fn hw_monitor_reg<B: QdmaBus>(
    bus: &B,
    addr: u32,
    mask: u32,
    expected: u32,
    interval_us: u32,
    timeout_us: u32,
) -> Result<u32, QdmaError> {
    let count = timeout_us / interval_us;

    for _ in 0..count {
        let v = bus.reg_read(addr);
        if v & mask == expected {
            return Ok(v);
        }
        bus.udelay(interval_us);
    }

    // One final read after the last sleep, so a slow-but-successful
    // operation right at the deadline is not misreported.
    let v = bus.reg_read(addr);
    if v & mask == expected {
        return Ok(v);
    }
    Err(QdmaError::BusyTimeout)
}

/// Writes `values` into the register array starting at `base + 4*index`.
pub(crate) fn write_csr_values<B: QdmaBus>(
    bus: &B,
    base: u32,
    index: usize,
    values: &[u32],
) {
    let mut addr = base + (index as u32) * 4;
    for &v in values {
        bus.reg_write(addr, v);
        addr += 4;
    }
}

/// Reads `out.len()` registers starting at `base + 4*index`.
pub(crate) fn read_csr_values<B: QdmaBus>(
    bus: &B,
    base: u32,
    index: usize,
    out: &mut [u32],
) {
    let mut addr = base + (index as u32) * 4;
    for v in out.iter_mut() {
        *v = bus.reg_read(addr);
        addr += 4;
    }
}
