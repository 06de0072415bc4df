// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Global CSR service.
//!
//! Four 16-entry lookup tables (ring sizes, C2H buffer sizes, timer
//! thresholds, counter thresholds) plus the writeback interval and the
//! MM channel enables. Context programming stores 4-bit indices into
//! these tables, so every semantic value a caller asks for must resolve
//! to an exact table entry.

use crate::{read_csr_values, regs::soft, write_csr_values, Qdma, QdmaBus};
use drv_qdma_api::*;

/// Default ring sizes, in descriptors. Entry 0 is deliberately large:
/// it is what a context cleared to zero points at.
pub const DEFAULT_RING_SIZES: [u32; GLOBAL_CSR_ARRAY_SZ] = [
    2049, 65, 129, 193, 257, 385, 513, 769, 1025, 1537, 3073, 4097, 6145,
    8193, 12289, 16385,
];

/// Default C2H buffer sizes, in bytes.
pub const DEFAULT_BUF_SIZES: [u32; GLOBAL_CSR_ARRAY_SZ] = [
    4096, 256, 512, 1024, 2048, 3968, 4096, 4096, 4096, 4096, 4096, 4096,
    4096, 8192, 9018, 16384,
];

/// Default completion timer thresholds, in microseconds.
pub const DEFAULT_TIMER_THRESHOLDS: [u32; GLOBAL_CSR_ARRAY_SZ] =
    [1, 2, 4, 5, 8, 10, 15, 20, 25, 30, 50, 75, 100, 125, 150, 200];

/// Default completion counter thresholds, in packets.
pub const DEFAULT_COUNTER_THRESHOLDS: [u32; GLOBAL_CSR_ARRAY_SZ] = [
    2, 4, 8, 16, 24, 32, 48, 64, 80, 96, 112, 128, 144, 160, 176, 192,
];

/// Default writeback accumulation interval encoding.
pub const DEFAULT_WRB_INT: u32 = 1;
/// Default maximum outstanding descriptor fetches encoding.
pub const DEFAULT_MAX_DSC_FETCH: u32 = 6;

/// Spacing of per-channel MM control registers.
const MM_CONTROL_STEP: u32 = 0x100;

fn table_base(csr_type: CsrType) -> u32 {
    match csr_type {
        CsrType::RingSize => soft::GLBL_RNG_SZ,
        CsrType::BufferSize => soft::C2H_BUF_SZ,
        CsrType::TimerCount => soft::C2H_TIMER_CNT,
        CsrType::CounterThreshold => soft::C2H_CNT_TH,
    }
}

/// Checks that this device has the engine a table belongs to.
fn check_capability<B: QdmaBus>(
    dev: &Qdma<B>,
    csr_type: CsrType,
) -> Result<(), QdmaError> {
    let cap = dev.attributes();
    let supported = match csr_type {
        CsrType::RingSize => true,
        CsrType::BufferSize => cap.st_en,
        CsrType::TimerCount | CsrType::CounterThreshold => {
            cap.st_en || cap.mm_cmpt_en
        }
    };
    if supported {
        Ok(())
    } else {
        Err(QdmaError::FeatureNotSupported)
    }
}

/// Reads or writes `count` entries of a CSR table starting at `index`.
/// `index + count` must stay within the 16-entry table.
pub fn global_csr_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    index: usize,
    count: usize,
    values: &mut [u32],
    csr_type: CsrType,
    op: AccessOp,
) -> Result<(), QdmaError> {
    if count == 0 || values.len() < count || index + count > GLOBAL_CSR_ARRAY_SZ
    {
        return Err(QdmaError::InvalidParam);
    }
    check_capability(dev, csr_type)?;

    let base = table_base(csr_type);
    match op {
        AccessOp::Write => {
            write_csr_values(dev.bus(), base, index, &values[..count]);
            Ok(())
        }
        AccessOp::Read => {
            read_csr_values(dev.bus(), base, index, &mut values[..count]);
            Ok(())
        }
        // The tables have no clear/invalidate notion.
        _ => Err(QdmaError::InvalidParam),
    }
}

/// Programs the writeback accumulation interval, preserving the fetch
/// limit sharing the register.
pub fn set_global_writeback_interval<B: QdmaBus>(
    dev: &Qdma<B>,
    interval: u8,
) -> Result<(), QdmaError> {
    if u32::from(interval) > field_get(soft::GLBL_DSC_CFG_WB_ACC_INT_MASK, !0)
    {
        return Err(QdmaError::InvalidParam);
    }
    if !dev.attributes().st_en && !dev.attributes().mm_cmpt_en {
        return Err(QdmaError::FeatureNotSupported);
    }
    let bus = dev.bus();
    let mut v = bus.reg_read(soft::GLBL_DSC_CFG);
    v &= !soft::GLBL_DSC_CFG_WB_ACC_INT_MASK;
    v |= field_set(soft::GLBL_DSC_CFG_WB_ACC_INT_MASK, interval.into());
    bus.reg_write(soft::GLBL_DSC_CFG, v);
    Ok(())
}

pub fn get_global_writeback_interval<B: QdmaBus>(
    dev: &Qdma<B>,
) -> Result<u8, QdmaError> {
    if !dev.attributes().st_en && !dev.attributes().mm_cmpt_en {
        return Err(QdmaError::FeatureNotSupported);
    }
    let v = dev.bus().reg_read(soft::GLBL_DSC_CFG);
    Ok(field_get(soft::GLBL_DSC_CFG_WB_ACC_INT_MASK, v) as u8)
}

/// Starts or stops one MM engine channel.
pub fn mm_channel_conf<B: QdmaBus>(
    dev: &Qdma<B>,
    channel: u8,
    dir: QueueDirection,
    enable: bool,
) -> Result<(), QdmaError> {
    let cap = dev.attributes();
    if !cap.mm_en {
        return Err(QdmaError::FeatureNotSupported);
    }
    if channel >= cap.mm_channel_max {
        return Err(QdmaError::InvalidParam);
    }
    let base = if dir.is_c2h() {
        soft::C2H_MM_CONTROL
    } else {
        soft::H2C_MM_CONTROL
    };
    let addr = base + u32::from(channel) * MM_CONTROL_STEP;
    dev.bus()
        .reg_write(addr, if enable { soft::MM_CONTROL_RUN_MASK } else { 0 });
    Ok(())
}

/// Programs every table and tuning register a PF owns to the defaults.
pub fn set_default_global_csr<B: QdmaBus>(
    dev: &Qdma<B>,
) -> Result<(), QdmaError> {
    let cap = *dev.attributes();
    let bus = dev.bus();

    write_csr_values(bus, soft::GLBL_RNG_SZ, 0, &DEFAULT_RING_SIZES);

    if cap.st_en || cap.mm_cmpt_en {
        write_csr_values(bus, soft::C2H_CNT_TH, 0, &DEFAULT_COUNTER_THRESHOLDS);
        write_csr_values(bus, soft::C2H_TIMER_CNT, 0, &DEFAULT_TIMER_THRESHOLDS);

        let v = field_set(
            soft::GLBL_DSC_CFG_MAX_DSC_FETCH_MASK,
            DEFAULT_MAX_DSC_FETCH,
        ) | field_set(soft::GLBL_DSC_CFG_WB_ACC_INT_MASK, DEFAULT_WRB_INT);
        bus.reg_write(soft::GLBL_DSC_CFG, v);
    }

    if cap.st_en {
        write_csr_values(bus, soft::C2H_BUF_SZ, 0, &DEFAULT_BUF_SIZES);

        // Prefetch and completion-coalesce tuning derive from the cache
        // depths the bitstream was built with.
        let cache_depth = bus.reg_read(soft::C2H_PFETCH_CACHE_DEPTH);
        let v = field_set(soft::C2H_PFCH_FL_TH_MASK, 256)
            | field_set(soft::C2H_PFCH_QCNT_MASK, cache_depth >> 1)
            | field_set(soft::C2H_EVT_QCNT_TH_MASK, (cache_depth >> 1) - 2);
        bus.reg_write(soft::C2H_PFETCH_CFG, v);

        bus.reg_write(soft::C2H_INT_TIMER_TICK, 25);

        let coal_depth = bus.reg_read(soft::C2H_CMPT_COAL_BUF_DEPTH);
        let v = field_set(soft::C2H_TICK_CNT_MASK, 5)
            | field_set(soft::C2H_TICK_VAL_MASK, 25)
            | field_set(soft::C2H_MAX_BUF_SZ_MASK, coal_depth);
        bus.reg_write(soft::C2H_WRB_COAL_CFG, v);

        let (data_thresh, req_thresh) = match dev.variant() {
            IpVariant::EqdmaSoft => (0x5000, 0xC0),
            _ => (0x4000, 0x60),
        };
        let v = field_set(soft::H2C_DATA_THRESH_MASK, data_thresh)
            | field_set(soft::H2C_REQ_THROT_EN_DATA_MASK, 1)
            | field_set(soft::H2C_REQ_THRESH_MASK, req_thresh)
            | field_set(soft::H2C_REQ_THROT_EN_REQ_MASK, 0);
        bus.reg_write(soft::H2C_REQ_THROT, v);
    }

    Ok(())
}

fn find_index<B: QdmaBus>(
    dev: &Qdma<B>,
    csr_type: CsrType,
    matches: impl Fn(u32) -> bool,
    missing: MboxError,
) -> Result<u8, QdmaError> {
    let mut table = [0u32; GLOBAL_CSR_ARRAY_SZ];
    global_csr_conf(
        dev,
        0,
        GLOBAL_CSR_ARRAY_SZ,
        &mut table,
        csr_type,
        AccessOp::Read,
    )?;
    for (i, &v) in table.iter().enumerate() {
        if matches(v) {
            return Ok(i as u8);
        }
    }
    Err(missing.into())
}

/// Resolves a ring size in descriptors to its table index. The table
/// stores usable-entries-plus-one (one slot is always left for the
/// status writeback), so a request for `n` matches an entry of `n + 1`.
pub fn find_ring_size_index<B: QdmaBus>(
    dev: &Qdma<B>,
    ring_sz: u16,
) -> Result<u8, QdmaError> {
    find_index(
        dev,
        CsrType::RingSize,
        |v| v == u32::from(ring_sz) + 1,
        MboxError::InvalidRingSize,
    )
}

/// Resolves a C2H buffer size in bytes to its table index.
pub fn find_buf_size_index<B: QdmaBus>(
    dev: &Qdma<B>,
    buf_sz: u16,
) -> Result<u8, QdmaError> {
    find_index(
        dev,
        CsrType::BufferSize,
        |v| v == u32::from(buf_sz),
        MboxError::InvalidBufSize,
    )
}

/// Resolves a counter threshold in packets to its table index.
pub fn find_counter_index<B: QdmaBus>(
    dev: &Qdma<B>,
    cnt: u8,
) -> Result<u8, QdmaError> {
    find_index(
        dev,
        CsrType::CounterThreshold,
        |v| v == u32::from(cnt),
        MboxError::InvalidCounterThreshold,
    )
}

/// Resolves a timer threshold in microseconds to its table index.
pub fn find_timer_index<B: QdmaBus>(
    dev: &Qdma<B>,
    tmr: u8,
) -> Result<u8, QdmaError> {
    find_index(
        dev,
        CsrType::TimerCount,
        |v| v == u32::from(tmr),
        MboxError::InvalidTimerThreshold,
    )
}

/// Reads the CSR snapshot a VF is entitled to see, skipping tables this
/// bitstream does not implement.
pub fn csr_info<B: QdmaBus>(dev: &Qdma<B>) -> Result<CsrInfo, QdmaError> {
    let cap = *dev.attributes();
    let mut info = CsrInfo::default();
    let mut table = [0u32; GLOBAL_CSR_ARRAY_SZ];

    global_csr_conf(
        dev,
        0,
        GLOBAL_CSR_ARRAY_SZ,
        &mut table,
        CsrType::RingSize,
        AccessOp::Read,
    )?;
    for (dst, src) in info.ringsz.iter_mut().zip(&table) {
        *dst = *src as u16;
    }

    if cap.st_en {
        global_csr_conf(
            dev,
            0,
            GLOBAL_CSR_ARRAY_SZ,
            &mut table,
            CsrType::BufferSize,
            AccessOp::Read,
        )?;
        for (dst, src) in info.bufsz.iter_mut().zip(&table) {
            *dst = *src as u16;
        }
    }

    if cap.st_en || cap.mm_cmpt_en {
        global_csr_conf(
            dev,
            0,
            GLOBAL_CSR_ARRAY_SZ,
            &mut table,
            CsrType::TimerCount,
            AccessOp::Read,
        )?;
        for (dst, src) in info.timer_cnt.iter_mut().zip(&table) {
            *dst = *src as u8;
        }

        global_csr_conf(
            dev,
            0,
            GLOBAL_CSR_ARRAY_SZ,
            &mut table,
            CsrType::CounterThreshold,
            AccessOp::Read,
        )?;
        for (dst, src) in info.cnt_thres.iter_mut().zip(&table) {
            *dst = *src as u8;
        }

        info.wb_intvl = get_global_writeback_interval(dev)?.into();
    }

    Ok(info)
}
