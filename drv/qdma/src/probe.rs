// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device-attribute probe.
//!
//! Runs once at bring-up: checks the config BAR identity, classifies the
//! IP variant from the version register, reads the capability registers,
//! and discovers the user BAR. VFs can only see their own identity
//! registers; their capabilities arrive over the mailbox.

use crate::regs::{self, soft};
use crate::{Qdma, QdmaBus};
use drv_qdma_api::*;
use num_traits::FromPrimitive;

/// Whether the BAR behind `bus` is the QDMA config BAR: its first
/// register carries a fixed identifier.
pub fn is_config_bar<B: QdmaBus>(bus: &B) -> bool {
    let v = bus.reg_read(soft::CONFIG_BLOCK_ID);
    field_get(soft::CONFIG_BLOCK_ID_MASK, v) == soft::CONFIG_BLOCK_MAGIC
}

fn decode_version(
    device_id: u32,
    vivado: u32,
    ip: u32,
    rtl: u32,
) -> Result<HwVersion, QdmaError> {
    let rtl_version =
        RtlVersion::from_u32(rtl).ok_or(QdmaError::InvalidParam)?;
    let vivado_release =
        VivadoRelease::from_u32(vivado).ok_or(QdmaError::InvalidParam)?;
    let device_type = match device_id {
        0 => DeviceType::Soft,
        1 => DeviceType::VersalCpm4,
        2 => DeviceType::VersalCpm5,
        _ => return Err(QdmaError::InvalidParam),
    };
    let ip_variant = match ip {
        0 => IpVariant::SoftQdma,
        1 => IpVariant::EqdmaSoft,
        2 => IpVariant::HardS80Qdma,
        _ => return Err(QdmaError::InvalidParam),
    };
    Ok(HwVersion {
        rtl_version,
        vivado_release,
        device_type,
        ip_variant,
    })
}

/// Reads and decodes the hardware version before a `Qdma` exists; used
/// by the constructors to pick the variant.
pub fn version_from<B: QdmaBus>(
    bus: &B,
    is_vf: bool,
) -> Result<HwVersion, QdmaError> {
    if !is_vf {
        let v = bus.reg_read(soft::GLBL2_MISC_CAP);
        return decode_version(
            field_get(soft::GLBL2_DEVICE_ID_MASK, v),
            field_get(soft::GLBL2_VIVADO_RELEASE_MASK, v),
            field_get(soft::GLBL2_IP_TYPE_MASK, v),
            field_get(soft::GLBL2_RTL_VERSION_MASK, v),
        );
    }

    // A VF does not know where its version register lives until it
    // knows the variant. Start from the legacy location; if that claims
    // a variant whose map moved the register, re-read from there.
    let v = bus.reg_read(soft::VF_VERSION);
    let mut version = decode_version(
        field_get(soft::VF_DEVICE_ID_MASK, v),
        field_get(soft::VF_VIVADO_RELEASE_MASK, v),
        field_get(soft::VF_IP_TYPE_MASK, v),
        field_get(soft::VF_RTL_VERSION_MASK, v),
    )?;

    if version.ip_variant == IpVariant::EqdmaSoft {
        let v = bus.reg_read(regs::eqdma::VF_VERSION);
        version = decode_version(
            field_get(soft::VF_DEVICE_ID_MASK, v),
            field_get(soft::VF_VIVADO_RELEASE_MASK, v),
            field_get(soft::VF_IP_TYPE_MASK, v),
            field_get(soft::VF_RTL_VERSION_MASK, v),
        )?;
    }

    Ok(version)
}

/// The hardware version of an already-probed device.
pub fn version<B: QdmaBus>(dev: &Qdma<B>) -> Result<HwVersion, QdmaError> {
    version_from(dev.bus(), dev.is_vf())
}

/// Reads the capability registers. PF only; a VF gets this structure
/// from its parent over the mailbox.
pub fn device_attributes<B: QdmaBus>(
    dev: &Qdma<B>,
) -> Result<DeviceAttributes, QdmaError> {
    let bus = dev.bus();
    let mut cap = DeviceAttributes::default();

    // One PF per mapped slot in the BARLITE map.
    let v = bus.reg_read(soft::GLBL2_PF_BARLITE_INT);
    let mut num_pfs = 0;
    for mask in [
        soft::GLBL2_PF0_BAR_MAP_MASK,
        soft::GLBL2_PF1_BAR_MAP_MASK,
        soft::GLBL2_PF2_BAR_MAP_MASK,
        soft::GLBL2_PF3_BAR_MAP_MASK,
    ] {
        if field_get(mask, v) != 0 {
            num_pfs += 1;
        }
    }
    cap.num_pfs = num_pfs;

    let v = bus.reg_read(soft::GLBL2_CHANNEL_QDMA_CAP);
    cap.num_qs = field_get(soft::GLBL2_MULTQ_MAX_MASK, v) as u16;

    let v = bus.reg_read(soft::GLBL2_MISC_CAP);
    cap.mailbox_en = field_get(soft::GLBL2_MAILBOX_EN_MASK, v) != 0;
    cap.flr_present = field_get(soft::GLBL2_FLR_PRESENT_MASK, v) != 0;
    cap.debug_mode = field_get(soft::GLBL2_DBG_MODE_MASK, v) != 0;
    cap.desc_eng_mode =
        DescEngMode::from_u32(field_get(soft::GLBL2_DESC_ENG_MODE_MASK, v))
            .ok_or(QdmaError::InvalidParam)?;

    let v = bus.reg_read(soft::GLBL2_CHANNEL_MDMA);
    cap.st_en = field_get(soft::GLBL2_ST_C2H_MASK, v) != 0
        && field_get(soft::GLBL2_ST_H2C_MASK, v) != 0;
    cap.mm_en = field_get(soft::GLBL2_MM_C2H_MASK, v) != 0
        && field_get(soft::GLBL2_MM_H2C_MASK, v) != 0;

    cap.mm_channel_max = 1;

    // Feature bits with no capability register; fixed per variant.
    match dev.variant() {
        IpVariant::EqdmaSoft => {
            cap.mm_cmpt_en = false;
            cap.mailbox_intr = true;
            cap.sw_desc_64b = true;
            cap.cmpt_desc_64b = true;
            cap.dynamic_bar = true;
            cap.legacy_intr = true;
            cap.cmpt_trig_count_timer = true;
            cap.cmpt_ovf_chk_dis = true;
            cap.qid2vec_ctx = false;
        }
        IpVariant::SoftQdma => {
            cap.mm_cmpt_en = false;
            cap.mailbox_intr = true;
            cap.cmpt_trig_count_timer = true;
            cap.cmpt_ovf_chk_dis = true;
        }
        IpVariant::HardS80Qdma => {
            // The hardened block predates interrupt aggregation: queue
            // interrupt steering goes through the qid2vec map.
            cap.qid2vec_ctx = true;
        }
    }

    Ok(cap)
}

/// Finds the "user" (AXI master lite) BAR of a function by scanning its
/// 6-bit slice of the BAR map for the single set bit.
pub fn user_bar<B: QdmaBus>(
    dev: &Qdma<B>,
    func_id: u16,
) -> Result<u8, QdmaError> {
    let bus = dev.bus();
    let bar_map = if dev.is_vf() {
        bus.reg_read(regs::vf_user_bar_reg(dev.variant())) & 0x3F
    } else {
        let v = bus.reg_read(soft::GLBL2_PF_BARLITE_EXT);
        (v >> (6 * u32::from(func_id))) & 0x3F
    };

    for bar_idx in 0..BAR_NUM {
        if bar_map & (1u32 << bar_idx) != 0 {
            return Ok(bar_idx);
        }
    }
    dev.bus().log_error("qdma: user BAR not found");
    Err(QdmaError::BarNotFound)
}
