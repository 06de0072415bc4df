// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Indirect-context engine tests against the register-level simulator:
//! round-trips for every context type and variant, programming-order
//! traces, and the busy-timeout path.

use drv_qdma::context::{self, CtxtSel};
use drv_qdma::{csr, Qdma, QdmaBus};
use drv_qdma_api::*;
use drv_qdma_sim::{SimConfig, SimMachine};

// Indirect command opcode encodings, as they appear in the trace.
const OP_CLR: u32 = 0;
const OP_WR: u32 = 1;
const OP_RD: u32 = 2;
const OP_INV: u32 = 3;

fn pf_device(variant: IpVariant) -> (SimMachine, Qdma<drv_qdma_sim::SimBus>) {
    let sim = SimMachine::new(SimConfig {
        variant,
        ..Default::default()
    });
    let dev = Qdma::new_pf(sim.pf_bus()).expect("probe failed");
    (sim, dev)
}

fn sample_sw_ctxt() -> SwContext {
    SwContext {
        pidx: 0x1234,
        irq_arm: true,
        fnc_id: 0x5A,
        qen: true,
        frcd_en: true,
        wbi_chk: true,
        fetch_max: 5,
        rngsz_idx: 9,
        desc_sz: 2,
        bypass: true,
        wbk_en: true,
        irq_en: true,
        port_id: 3,
        is_mm: true,
        ring_bs_addr: 0x0000_7FFF_FFFF_F000,
        vec: 0x2A,
        intr_aggr: true,
        ..Default::default()
    }
}

#[test]
fn sw_context_roundtrip_all_variants() {
    for variant in [
        IpVariant::EqdmaSoft,
        IpVariant::SoftQdma,
        IpVariant::HardS80Qdma,
    ] {
        let (_sim, dev) = pf_device(variant);
        let mut ctxt = sample_sw_ctxt();
        if variant == IpVariant::EqdmaSoft {
            ctxt.fnc_id = 0xABC; // 12-bit ids exist here only
            ctxt.pasid = 0x3F_FFFF;
            ctxt.pasid_en = true;
            ctxt.virtio_en = true;
            ctxt.virtio_dsc_base = 0x0123_4567_89AB_C000;
            ctxt.host_id = 0xA;
        }
        if variant == IpVariant::HardS80Qdma {
            // No vector word in the hardened layout.
            ctxt.vec = 0;
            ctxt.intr_aggr = false;
            ctxt.fetch_max = 0;
        }

        let dir = QueueDirection::H2c;
        context::sw_ctx_conf(&dev, dir, 3, &mut ctxt, AccessOp::Write)
            .unwrap();

        let mut got = SwContext::default();
        context::sw_ctx_conf(&dev, dir, 3, &mut got, AccessOp::Read).unwrap();
        assert_eq!(got, ctxt, "{variant:?}");
    }
}

#[test]
fn cmpt_context_roundtrip_all_variants() {
    for variant in [
        IpVariant::EqdmaSoft,
        IpVariant::SoftQdma,
        IpVariant::HardS80Qdma,
    ] {
        let (_sim, dev) = pf_device(variant);
        let mut ctxt = CmptContext {
            en_stat_desc: true,
            en_int: true,
            trig_mode: 5,
            fnc_id: 0x33,
            counter_idx: 7,
            timer_idx: 11,
            color: true,
            ringsz_idx: 4,
            bs_addr: 0x0000_0FFF_FFFF_F0C0,
            desc_sz: 1,
            pidx: 0x321,
            cidx: 0x123,
            valid: true,
            ovf_chk_dis: true,
            vec: 0x15,
            int_aggr: true,
            ..Default::default()
        };
        if variant == IpVariant::SoftQdma {
            // The soft layout only keeps 4 KiB aligned base bits.
            ctxt.bs_addr = 0x0000_0FFF_FFFF_F000;
        }
        if variant == IpVariant::HardS80Qdma {
            // Narrower producer index on the hardened block.
            ctxt.pidx = 0x88;
        }
        if variant == IpVariant::EqdmaSoft {
            ctxt.sh_cmpt = true;
            ctxt.dir_c2h = true;
            ctxt.host_id = 5;
        }

        context::cmpt_ctx_conf(&dev, 9, &mut ctxt, AccessOp::Write).unwrap();

        let mut got = CmptContext::default();
        context::cmpt_ctx_conf(&dev, 9, &mut got, AccessOp::Read).unwrap();
        assert_eq!(got, ctxt, "{variant:?}");
    }
}

#[test]
fn pfetch_and_intr_roundtrip() {
    let (_sim, dev) = pf_device(IpVariant::EqdmaSoft);

    let mut pfetch = PrefetchContext {
        bypass: true,
        bufsz_idx: 12,
        port_id: 2,
        var_desc: true,
        num_pftch: 0x155,
        pfch_en: true,
        sw_crdt: 0xF0F0,
        valid: true,
        ..Default::default()
    };
    context::pfetch_ctx_conf(&dev, 4, &mut pfetch, AccessOp::Write).unwrap();
    let mut got = PrefetchContext::default();
    context::pfetch_ctx_conf(&dev, 4, &mut got, AccessOp::Read).unwrap();
    assert_eq!(got, pfetch);

    let mut intr = IntrContext {
        valid: true,
        vec: 0x5A5,
        color: true,
        baddr_4k: 0x000F_FFFF_FFFF_F & 0xF_FFFF_FFFF_FFF,
        page_size: 3,
        pidx: 0xABC,
        func_id: 0x77,
        ..Default::default()
    };
    context::intr_ctx_conf(&dev, 2, &mut intr, AccessOp::Write).unwrap();
    let mut got = IntrContext::default();
    context::intr_ctx_conf(&dev, 2, &mut got, AccessOp::Read).unwrap();
    assert_eq!(got, intr);
}

#[test]
fn fmap_roundtrip() {
    for variant in [
        IpVariant::EqdmaSoft,
        IpVariant::SoftQdma,
        IpVariant::HardS80Qdma,
    ] {
        let (_sim, dev) = pf_device(variant);
        let mut fmap = FmapCfg {
            qbase: 0x340,
            qmax: 0x7F0,
        };
        if variant != IpVariant::EqdmaSoft {
            // Narrower fields on the legacy layouts.
            fmap = FmapCfg {
                qbase: 0x340,
                qmax: 0x700,
            };
        }
        context::fmap_conf(&dev, 2, &mut fmap, AccessOp::Write).unwrap();
        let mut got = FmapCfg::default();
        context::fmap_conf(&dev, 2, &mut got, AccessOp::Read).unwrap();
        assert_eq!(got, fmap, "{variant:?}");
    }
}

#[test]
fn hw_and_credit_contexts_reject_writes() {
    let (_sim, dev) = pf_device(IpVariant::EqdmaSoft);
    let mut hw = HwContext::default();
    assert_eq!(
        context::hw_ctx_conf(&dev, QueueDirection::C2h, 0, &mut hw, AccessOp::Write),
        Err(QdmaError::FeatureNotSupported)
    );
    let mut cr = CreditContext::default();
    assert_eq!(
        context::credit_ctx_conf(
            &dev,
            QueueDirection::C2h,
            0,
            &mut cr,
            AccessOp::Write
        ),
        Err(QdmaError::FeatureNotSupported)
    );
}

#[test]
fn cmpt_write_validates_trigger_mode_and_desc_size() {
    let (_sim, dev) = pf_device(IpVariant::EqdmaSoft);

    let mut bad_trig = CmptContext {
        trig_mode: 6,
        ..Default::default()
    };
    assert_eq!(
        context::cmpt_ctx_conf(&dev, 0, &mut bad_trig, AccessOp::Write),
        Err(QdmaError::InvalidParam)
    );

    // 64-byte completion entries exist on this profile, so they pass.
    let mut big = CmptContext {
        desc_sz: DescSize::D64 as u8,
        valid: true,
        ..Default::default()
    };
    context::cmpt_ctx_conf(&dev, 0, &mut big, AccessOp::Write).unwrap();

    // The soft profile lacks them.
    let (_sim2, dev2) = pf_device(IpVariant::SoftQdma);
    assert_eq!(
        context::cmpt_ctx_conf(&dev2, 0, &mut big, AccessOp::Write),
        Err(QdmaError::FeatureNotSupported)
    );
}

/// Streaming C2H queue bring-up: every context the queue needs is
/// cleared, then written, in (sw, prefetch, completion) order, with all
/// CSR indices resolved from the programmed tables.
#[test]
fn program_streaming_c2h_queue() {
    let (sim, dev) = pf_device(IpVariant::EqdmaSoft);
    csr::set_default_global_csr(&dev).unwrap();
    sim.clear_cmd_log();

    let cfg = DescqConfig {
        ring_bs_addr: 0x1000_0000,
        cmpt_ring_bs_addr: 0x2000_0000,
        ringsz: 256,
        bufsz: 2048,
        cmpt_ringsz: 256,
        cmpt_desc_sz: DescSize::D16 as u8,
        triggermode: TrigMode::UserTimerCount as u8,
        cnt_thres: 32,
        timer_thres: 25,
        func_id: 0,
        pfch_en: true,
        cmpl_stat_en: true,
        ..Default::default()
    };

    context::program_queue_contexts(
        &dev,
        10,
        true,
        QueueDirection::C2h,
        CmptCtxtKind::WithSt,
        &cfg,
    )
    .unwrap();

    let ops: Vec<(u32, u32, u16)> =
        sim.cmd_log().iter().map(|c| (c.op, c.sel, c.qid)).collect();
    assert_eq!(
        ops,
        vec![
            (OP_CLR, CtxtSel::SwC2h as u32, 10),
            (OP_CLR, CtxtSel::Pfetch as u32, 10),
            (OP_CLR, CtxtSel::Cmpt as u32, 10),
            (OP_WR, CtxtSel::SwC2h as u32, 10),
            (OP_WR, CtxtSel::Pfetch as u32, 10),
            (OP_WR, CtxtSel::Cmpt as u32, 10),
        ]
    );

    // The semantic values resolved to the right table indices: 256
    // descriptors is table entry 4 (value 257), 2048 bytes entry 4, 32
    // packets entry 5, 25 microseconds entry 8.
    let mut sw = SwContext::default();
    context::sw_ctx_conf(&dev, QueueDirection::C2h, 10, &mut sw, AccessOp::Read)
        .unwrap();
    assert_eq!(sw.rngsz_idx, 4);
    assert!(sw.qen);
    assert!(!sw.is_mm);
    // Streaming C2H status goes through the completion ring.
    assert!(!sw.irq_en && !sw.wbk_en);

    let mut pfetch = PrefetchContext::default();
    context::pfetch_ctx_conf(&dev, 10, &mut pfetch, AccessOp::Read).unwrap();
    assert_eq!(pfetch.bufsz_idx, 4);
    assert!(pfetch.valid);

    let mut cmpt = CmptContext::default();
    context::cmpt_ctx_conf(&dev, 10, &mut cmpt, AccessOp::Read).unwrap();
    assert_eq!(cmpt.counter_idx, 5);
    assert_eq!(cmpt.timer_idx, 8);
    assert_eq!(cmpt.ringsz_idx, 4);
    assert!(cmpt.valid);
    assert!(cmpt.color);
}

/// Teardown issues invalidate before clear for every context type.
#[test]
fn teardown_invalidates_before_clearing() {
    let (sim, dev) = pf_device(IpVariant::EqdmaSoft);
    csr::set_default_global_csr(&dev).unwrap();
    sim.clear_cmd_log();

    context::teardown_queue_contexts(
        &dev,
        5,
        true,
        QueueDirection::C2h,
        CmptCtxtKind::WithSt,
    )
    .unwrap();

    let log = sim.cmd_log();
    for sel in [
        CtxtSel::SwC2h as u32,
        CtxtSel::HwC2h as u32,
        CtxtSel::CrC2h as u32,
        CtxtSel::Pfetch as u32,
        CtxtSel::Cmpt as u32,
    ] {
        let inv = log
            .iter()
            .position(|c| c.op == OP_INV && c.sel == sel && c.qid == 5);
        let clr = log
            .iter()
            .position(|c| c.op == OP_CLR && c.sel == sel && c.qid == 5);
        let (inv, clr) = (inv.expect("missing INV"), clr.expect("missing CLR"));
        assert!(inv < clr, "sel {sel}: INV at {inv}, CLR at {clr}");
    }
}

#[test]
fn wedged_busy_bit_times_out() {
    let (sim, dev) = pf_device(IpVariant::EqdmaSoft);
    sim.wedge_ctxt_busy(true);

    let mut ctxt = SwContext::default();
    assert_eq!(
        context::sw_ctx_conf(
            &dev,
            QueueDirection::H2c,
            0,
            &mut ctxt,
            AccessOp::Write
        ),
        Err(QdmaError::BusyTimeout)
    );

    sim.wedge_ctxt_busy(false);
    context::sw_ctx_conf(&dev, QueueDirection::H2c, 0, &mut ctxt, AccessOp::Write)
        .unwrap();
}

#[test]
fn read_uses_read_opcode() {
    let (sim, dev) = pf_device(IpVariant::EqdmaSoft);
    let mut ctxt = HwContext::default();
    context::hw_ctx_conf(&dev, QueueDirection::H2c, 1, &mut ctxt, AccessOp::Read)
        .unwrap();
    let log = sim.cmd_log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].op, OP_RD);
    assert_eq!(log[0].sel, CtxtSel::HwH2c as u32);
}
