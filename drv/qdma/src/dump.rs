// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Register dump formatting.
//!
//! Dumps render into caller-provided byte buffers with `core::fmt`, so
//! the core needs no allocator and no platform string helpers. A dump
//! line shows the register name, address and raw value; registers with
//! bit-field tables get one indented line per field with the `[msb:lsb]`
//! span and the decoded value.

use crate::regs::{self, ReadType};
use crate::{Qdma, QdmaBus};
use core::fmt::Write;
use drv_qdma_api::{field_get, mask_span, QdmaError, RegData, MAX_REGISTER_DUMP};

/// `core::fmt::Write` over a byte slice. Refuses writes that would
/// overflow rather than truncating silently.
pub struct BufWriter<'a> {
    buf: &'a mut [u8],
    used: usize,
}

impl<'a> BufWriter<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, used: 0 }
    }

    pub fn used(&self) -> usize {
        self.used
    }
}

impl Write for BufWriter<'_> {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        let bytes = s.as_bytes();
        if self.used + bytes.len() > self.buf.len() {
            return Err(core::fmt::Error);
        }
        self.buf[self.used..self.used + bytes.len()].copy_from_slice(bytes);
        self.used += bytes.len();
        Ok(())
    }
}

/// Reads one register and hands a formatted line to the host log. Used
/// by the error aggregator's diagnostic dumps.
pub fn log_reg<B: QdmaBus>(dev: &Qdma<B>, name: &str, addr: u32) {
    let val = dev.bus().reg_read(addr);
    let mut buf = [0u8; 80];
    let mut w = BufWriter::new(&mut buf);
    if write!(w, "{name} [0x{addr:04x}] = 0x{val:08x}").is_ok() {
        let used = w.used();
        if let Ok(s) = core::str::from_utf8(&buf[..used]) {
            dev.bus().log_info(s);
        }
    }
}

fn dump_one(
    w: &mut BufWriter<'_>,
    reg: &regs::RegInfo,
    rep: u16,
    addr: u32,
    val: u32,
) -> core::fmt::Result {
    if reg.repeat > 1 {
        writeln!(w, "[0x{:04x}] {}_{} 0x{:08x}", addr, reg.name, rep, val)?;
    } else {
        writeln!(w, "[0x{:04x}] {} 0x{:08x}", addr, reg.name, val)?;
    }
    for bf in reg.bitfields {
        let (msb, lsb) = mask_span(bf.mask);
        if msb == lsb {
            writeln!(
                w,
                "    [{:2}] {} 0x{:x}",
                lsb,
                bf.name,
                field_get(bf.mask, val)
            )?;
        } else {
            writeln!(
                w,
                "    [{:2}:{:2}] {} 0x{:x}",
                msb,
                lsb,
                bf.name,
                field_get(bf.mask, val)
            )?;
        }
    }
    Ok(())
}

/// Dumps the config registers of this device into `buf`, skipping
/// registers whose mode the device lacks, debug registers on non-debug
/// silicon, and PF-only registers when dumping from a VF. Returns the
/// number of bytes written.
pub fn dump_config_regs<B: QdmaBus>(
    dev: &Qdma<B>,
    buf: &mut [u8],
) -> Result<usize, QdmaError> {
    let cap = dev.attributes();
    let mut w = BufWriter::new(buf);

    for reg in regs::config_regs(dev.variant()) {
        if !reg.mode.present_on(cap) {
            continue;
        }
        if reg.is_debug && !cap.debug_mode {
            continue;
        }
        if dev.is_vf() && reg.read_type == ReadType::PfOnly {
            continue;
        }
        for rep in 0..reg.repeat {
            let addr = reg.addr + u32::from(rep) * 4;
            let val = dev.bus().reg_read(addr);
            dump_one(&mut w, reg, rep, addr, val)
                .map_err(|_| QdmaError::NoMemory)?;
        }
    }
    Ok(w.used())
}

/// Reads the `group_num`-th chunk of the VF-visible config registers as
/// `(addr, value)` pairs, at most [`MAX_REGISTER_DUMP`] per group. This
/// backs the mailbox register-list service: the PF reads on the VF's
/// behalf because most of the map is PF-only.
pub fn read_reg_list<B: QdmaBus>(
    dev: &Qdma<B>,
    group_num: u16,
    out: &mut [RegData; MAX_REGISTER_DUMP],
) -> Result<u16, QdmaError> {
    let cap = dev.attributes();
    let mut produced = 0usize;
    let mut skip = usize::from(group_num) * MAX_REGISTER_DUMP;

    for reg in regs::config_regs(dev.variant()) {
        if !reg.mode.present_on(cap) {
            continue;
        }
        if reg.is_debug && !cap.debug_mode {
            continue;
        }
        for rep in 0..reg.repeat {
            if skip > 0 {
                skip -= 1;
                continue;
            }
            if produced == MAX_REGISTER_DUMP {
                return Ok(produced as u16);
            }
            let addr = reg.addr + u32::from(rep) * 4;
            out[produced] = RegData {
                addr,
                val: dev.bus().reg_read(addr),
            };
            produced += 1;
        }
    }

    Ok(produced as u16)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bufwriter_rejects_overflow() {
        let mut buf = [0u8; 8];
        let mut w = BufWriter::new(&mut buf);
        assert!(write!(w, "12345678").is_ok());
        assert!(write!(w, "9").is_err());
        assert_eq!(w.used(), 8);
    }
}
