// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end PF/VF mailbox scenarios over the register-level
//! simulator: VF bring-up, proxied operations, send timeouts, the
//! all-zero hardware fault, and PF reset coordination.

use drv_qdma::resource::ResourceManager;
use drv_qdma::{context, csr, Qdma};
use drv_qdma_api::*;
use drv_qdma_mbox::{
    Mailbox, MboxEvent, MboxMessage, MsgHandle, PfEvent, ResetState, VfEvent,
};
use drv_qdma_sim::{SimBus, SimConfig, SimMachine};

const DMA_DEV_IDX: u32 = 1;

/// Fmap context selector, for checking what landed in hardware.
const SEL_FMAP: u32 = 12;

struct Harness {
    sim: SimMachine,
    pf_dev: Qdma<SimBus>,
    pf_mbox: Mailbox,
    rm: ResourceManager,
}

struct VfSide {
    dev: Qdma<SimBus>,
    mbox: Mailbox,
}

impl Harness {
    fn new() -> Self {
        let sim = SimMachine::new(SimConfig::default());
        let pf_dev = Qdma::new_pf(sim.pf_bus()).unwrap();
        csr::set_default_global_csr(&pf_dev).unwrap();
        context::init_ctxt_memory(&pf_dev).unwrap();

        let rm = ResourceManager::new();
        rm.create_device(DMA_DEV_IDX, u32::from(pf_dev.attributes().num_qs))
            .unwrap();
        // The PF owns the first 32 queues of the pool.
        rm.create_entry(DMA_DEV_IDX, 0).unwrap();
        let mut qbase = -1;
        rm.update(DMA_DEV_IDX, 0, 32, &mut qbase).unwrap();

        let pf_mbox = Mailbox::new(DMA_DEV_IDX, 0);
        pf_mbox.init(&pf_dev);

        Self {
            sim,
            pf_dev,
            pf_mbox,
            rm,
        }
    }

    fn add_vf(&self, func_id: u16) -> VfSide {
        let dev = Qdma::new_vf(self.sim.add_vf(func_id)).unwrap();
        let mbox = Mailbox::new(DMA_DEV_IDX, 0);
        mbox.init(&dev);
        VfSide { dev, mbox }
    }

    /// Runs both endpoints' timer tasks for a few ticks.
    fn tick(&self, vfs: &[&VfSide], n: usize) {
        for _ in 0..n {
            for vf in vfs {
                vf.mbox.poll(&vf.dev, None);
            }
            self.pf_mbox.poll(&self.pf_dev, Some(&self.rm));
        }
    }

    fn exchange(
        &self,
        vf: &VfSide,
        msg: MboxMessage,
    ) -> Result<MboxMessage, QdmaError> {
        let handle = vf.mbox.send(msg, 1000)?;
        self.wait(vf, handle)
    }

    fn wait(
        &self,
        vf: &VfSide,
        handle: MsgHandle,
    ) -> Result<MboxMessage, QdmaError> {
        for _ in 0..50 {
            self.tick(&[vf], 1);
            if let Some(result) = vf.mbox.try_response(handle) {
                return result;
            }
        }
        panic!("no completion after 50 ticks");
    }

    /// The full hello handshake, returning the VF's assigned range.
    fn hello(&self, vf: &mut VfSide, qmax: u16) -> (i32, u16) {
        let rsp = self
            .exchange(vf, MboxMessage::vf_hello(0, qmax, -1))
            .unwrap();
        rsp.status_result().unwrap();

        let (cap, dev_idx) = rsp.hello_resp_info();
        assert_eq!(dev_idx, DMA_DEV_IDX);
        vf.dev.set_attributes(cap);
        vf.mbox.set_reset_state(ResetState::Idle);
        rsp.qinfo()
    }
}

/// S1: VF online. The PF allocates an entry, answers with the range and
/// capabilities, reports `VfOnline`, and scrubs the VF's function map.
#[test]
fn vf_online() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);

    let (qbase, qmax) = h.hello(&mut vf, 16);
    assert_eq!((qbase, qmax), (32, 16));

    // The VF learned its identity and capabilities from the response.
    assert_eq!(vf.mbox.func_id(), 5);
    assert!(vf.dev.attributes().st_en);
    assert!(vf.dev.attributes().mailbox_en);
    assert_eq!(vf.dev.attributes().num_qs, 2048);
    assert_eq!(vf.mbox.reset_state(), ResetState::Idle);

    // The PF host was told, and the VF's function map was written with
    // an empty range.
    assert_eq!(
        h.pf_mbox.next_event(),
        Some(MboxEvent::Pf(PfEvent::VfOnline(5)))
    );
    assert_eq!(h.pf_mbox.online_vf_count(), 1);
    assert_eq!(h.sim.ctx_words(SEL_FMAP, 5), Some([0; 8]));

    // And the manager now shows the allocation.
    assert_eq!(h.rm.qinfo(DMA_DEV_IDX, 5), Ok((32, 16)));
}

/// The proxied context write programs real contexts on the PF, and the
/// proxied read hands them back.
#[test]
fn vf_qctxt_write_and_read() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    let (qbase, _) = h.hello(&mut vf, 16);

    let qid = (qbase as u16) + 2;
    let cfg = DescqConfig {
        ring_bs_addr: 0xDEAD_0000,
        cmpt_ring_bs_addr: 0xBEEF_0000,
        ringsz: 256,
        bufsz: 2048,
        cmpt_ringsz: 256,
        cmpt_desc_sz: DescSize::D16 as u8,
        triggermode: TrigMode::UserTimerCount as u8,
        cnt_thres: 32,
        timer_thres: 25,
        pfch_en: true,
        cmpl_stat_en: true,
        ..Default::default()
    };

    let rsp = h
        .exchange(
            &vf,
            MboxMessage::vf_qctxt_write(
                0,
                qid,
                true,
                true,
                CmptCtxtKind::WithSt,
                &cfg,
            ),
        )
        .unwrap();
    rsp.status_result().unwrap();

    // Read the contexts back through the proxy and check the PF
    // resolved and programmed them.
    let rsp = h
        .exchange(
            &vf,
            MboxMessage::vf_qctxt_read(
                0,
                qid,
                true,
                true,
                CmptCtxtKind::WithSt,
            ),
        )
        .unwrap();
    rsp.status_result().unwrap();

    let ctxt = rsp.qctxt_resp_info(vf.dev.variant());
    assert!(ctxt.sw.qen);
    assert_eq!(ctxt.sw.fnc_id, 5);
    assert_eq!(ctxt.sw.ring_bs_addr, 0xDEAD_0000);
    assert_eq!(ctxt.pfetch.bufsz_idx, 4);
    assert_eq!(ctxt.cmpt.counter_idx, 5);
    assert_eq!(ctxt.cmpt.timer_idx, 8);
    assert!(ctxt.cmpt.valid);
}

/// Out-of-range queue ids are rejected with the typed mailbox error.
#[test]
fn vf_qctxt_out_of_range() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    h.hello(&mut vf, 16);

    let rsp = h
        .exchange(
            &vf,
            MboxMessage::vf_qctxt_read(0, 500, false, false, CmptCtxtKind::None),
        )
        .unwrap();
    assert_eq!(
        rsp.status_result(),
        Err(QdmaError::Mbox(MboxError::InvalidQid))
    );
}

/// Queue notify adjusts the PF-side active counters and polices ranges.
#[test]
fn qnotify_and_active_counts() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    let (qbase, _) = h.hello(&mut vf, 16);
    let qid = qbase as u16;

    let rsp = h
        .exchange(&vf, MboxMessage::vf_notify_qadd(0, qid, QueueType::H2c))
        .unwrap();
    rsp.status_result().unwrap();

    let rsp = h
        .exchange(&vf, MboxMessage::vf_get_active_qcnt(0))
        .unwrap();
    assert_eq!(rsp.active_qcnt_info(QueueType::H2c), 1);
    assert_eq!(rsp.active_qcnt_info(QueueType::C2h), 0);

    let rsp = h
        .exchange(&vf, MboxMessage::vf_notify_qdel(0, qid, QueueType::H2c))
        .unwrap();
    rsp.status_result().unwrap();
    assert_eq!(h.rm.active_queue_count(DMA_DEV_IDX, 5, QueueType::H2c), 0);

    // A queue outside the range is refused.
    let rsp = h
        .exchange(&vf, MboxMessage::vf_notify_qadd(0, 1000, QueueType::H2c))
        .unwrap();
    assert_eq!(
        rsp.status_result(),
        Err(QdmaError::Mbox(MboxError::InvalidQid))
    );
}

/// The CSR snapshot proxied to a VF matches what the PF programmed.
#[test]
fn vf_csr_snapshot() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    h.hello(&mut vf, 16);

    let rsp = h.exchange(&vf, MboxMessage::vf_csr_read(0)).unwrap();
    rsp.status_result().unwrap();
    let info = rsp.csr_resp_info().unwrap();

    assert_eq!(info.ringsz[0], 2049);
    assert_eq!(info.ringsz[15], 16385);
    assert_eq!(info.bufsz[4], 2048);
    assert_eq!(info.timer_cnt[8], 25);
    assert_eq!(info.cnt_thres[5], 32);
}

/// Register-list reads come back in groups with real values.
#[test]
fn vf_reg_list_read() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    h.hello(&mut vf, 16);

    let rsp = h
        .exchange(&vf, MboxMessage::vf_reg_list_read(0, 0))
        .unwrap();
    rsp.status_result().unwrap();

    let mut regs = [RegData::default(); MAX_REGISTER_DUMP];
    let n = rsp.reg_list_info(&mut regs).unwrap();
    assert!(n > 0);
    // First entry of the map is the config identifier.
    assert_eq!(regs[0].addr, 0);
    assert_eq!(regs[0].val >> 16, 0x1FD3);
}

/// S3: send timeout against a dead PF. The retry budget burns down, the
/// entry is evicted from the to-do list, and the waiter gets `Pipe`.
#[test]
fn send_timeout_pipes() {
    let h = Harness::new();
    let vf = h.add_vf(5);
    h.sim.power_off_pf();

    // First message occupies the outbox forever: the dead PF will
    // never acknowledge it.
    vf.mbox.send(MboxMessage::vf_bye(0), 0).unwrap();
    vf.mbox.poll(&vf.dev, None);

    let handle = vf
        .mbox
        .send(MboxMessage::vf_qreq(0, 8, -1), 10)
        .unwrap();

    // 10 ms at a 1 ms poll = 11 retries.
    let mut completed = None;
    for _ in 0..12 {
        vf.mbox.poll(&vf.dev, None);
        if let Some(r) = vf.mbox.try_response(handle) {
            completed = Some(r);
            break;
        }
    }
    assert_eq!(completed, Some(Err(QdmaError::Mbox(MboxError::Pipe))));
    assert_eq!(vf.mbox.tx_pending(), 0);
}

/// S6: an in-message flag with an all-zero frame is dropped before
/// dispatch and diagnosed.
#[test]
fn all_zero_message_rejected() {
    let h = Harness::new();
    let vf = h.add_vf(5);

    // An untouched outbound window is exactly 32 zero words.
    use drv_qdma::QdmaBus;
    let vf_bus = &vf.dev;
    vf_bus
        .bus()
        .reg_write(drv_qdma::regs::eqdma::MBOX_BASE_VF + 0x4, 1);

    h.tick(&[&vf], 2);

    assert_eq!(h.pf_mbox.next_event(), None);
    assert!(h.sim.log_contains("all-zero"));
}

/// Responses pair with their waiters in send order, never crossed.
#[test]
fn response_pairing_in_order() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    h.hello(&mut vf, 16);

    let h1 = vf.mbox.send(MboxMessage::vf_csr_read(0), 1000).unwrap();
    let h2 = vf
        .mbox
        .send(MboxMessage::vf_get_active_qcnt(0), 1000)
        .unwrap();

    let r1 = h.wait(&vf, h1).unwrap();
    let r2 = h.wait(&vf, h2).unwrap();

    assert_eq!(r1.op_raw(), drv_qdma_mbox::MboxOp::Csr.response());
    assert_eq!(
        r2.op_raw(),
        drv_qdma_mbox::MboxOp::GetQactiveCnt.response()
    );
}

/// VF offline: bye tears the entry down and zeroes the function map.
#[test]
fn vf_bye_offline() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    h.hello(&mut vf, 16);
    while h.pf_mbox.next_event().is_some() {}

    vf.mbox.send(MboxMessage::vf_bye(5), 0).unwrap();
    h.tick(&[&vf], 5);

    assert_eq!(
        h.pf_mbox.next_event(),
        Some(MboxEvent::Pf(PfEvent::VfOffline(5)))
    );
    assert_eq!(h.pf_mbox.online_vf_count(), 0);
    assert_eq!(
        h.rm.qinfo(DMA_DEV_IDX, 5),
        Err(QdmaError::ResourceNotExists)
    );
}

/// S5: PF reset coordination with two live VFs. Prepare notices go out,
/// byes come back and destroy the entries, reset-done brings the VFs
/// back and they re-hello.
#[test]
fn pf_reset_coordination() {
    let h = Harness::new();
    let mut vf1 = h.add_vf(5);
    let mut vf2 = h.add_vf(6);
    h.hello(&mut vf1, 8);
    h.hello(&mut vf2, 8);
    assert_eq!(h.pf_mbox.online_vf_count(), 2);
    while h.pf_mbox.next_event().is_some() {}

    // Phase 1: the PF warns every VF.
    h.pf_mbox
        .send(MboxMessage::pf_reset_prepare(0, 5), 0)
        .unwrap();
    h.pf_mbox
        .send(MboxMessage::pf_reset_prepare(0, 6), 0)
        .unwrap();
    h.tick(&[&vf1, &vf2], 5);

    assert_eq!(vf1.mbox.reset_state(), ResetState::RecvPfResetReq);
    assert_eq!(vf2.mbox.reset_state(), ResetState::RecvPfResetReq);
    assert_eq!(
        vf1.mbox.next_event(),
        Some(MboxEvent::Vf(VfEvent::ResetPrepare))
    );

    // Phase 2: each VF closes down and says its reset-bye.
    let b1 = vf1.mbox.send(MboxMessage::vf_reset_bye(5), 1000).unwrap();
    let b2 = vf2.mbox.send(MboxMessage::vf_reset_bye(6), 1000).unwrap();
    for _ in 0..20 {
        h.tick(&[&vf1, &vf2], 1);
        if vf1.mbox.try_response(b1).is_some()
            && vf2.mbox.try_response(b2).is_some()
        {
            break;
        }
    }

    assert_eq!(h.pf_mbox.online_vf_count(), 0);
    assert!(h.rm.qinfo(DMA_DEV_IDX, 5).is_err());
    assert!(h.rm.qinfo(DMA_DEV_IDX, 6).is_err());
    // Function maps were scrubbed on the way out.
    assert_eq!(h.sim.ctx_words(SEL_FMAP, 5), Some([0; 8]));
    assert_eq!(h.sim.ctx_words(SEL_FMAP, 6), Some([0; 8]));

    // Phase 3: PF re-initialized; tell the VFs to come back.
    h.pf_mbox
        .send(MboxMessage::pf_reset_done(0, 5), 0)
        .unwrap();
    h.pf_mbox
        .send(MboxMessage::pf_reset_done(0, 6), 0)
        .unwrap();
    h.tick(&[&vf1, &vf2], 5);

    assert_eq!(vf1.mbox.reset_state(), ResetState::RecvPfResetDone);
    assert_eq!(vf2.mbox.reset_state(), ResetState::RecvPfResetDone);

    // Phase 4: both VFs re-hello and get ranges again.
    let (qb1, qm1) = h.hello(&mut vf1, 8);
    let (qb2, qm2) = h.hello(&mut vf2, 8);
    assert_eq!(qm1, 8);
    assert_eq!(qm2, 8);
    assert_ne!(qb1, qb2);
    assert_eq!(h.pf_mbox.online_vf_count(), 2);
}

/// Queue-range requests allocate and clear the stale function map.
#[test]
fn vf_qreq_allocates() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    // Hello without asking for queues.
    let (qbase, qmax) = h.hello(&mut vf, 0);
    assert_eq!((qbase, qmax), (-1, 0));

    let rsp = h.exchange(&vf, MboxMessage::vf_qreq(0, 24, -1)).unwrap();
    rsp.status_result().unwrap();
    assert_eq!(rsp.qinfo(), (32, 24));

    // Asking for more than the pool holds fails with the typed error.
    let rsp = h
        .exchange(&vf, MboxMessage::vf_qreq(0, 60000, -1))
        .unwrap();
    assert_eq!(
        rsp.status_result(),
        Err(QdmaError::Mbox(MboxError::NumQueues))
    );
}

/// FMAP programming lands in the function-map context.
#[test]
fn vf_fmap_prog() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    let (qbase, qmax) = h.hello(&mut vf, 16);

    let rsp = h
        .exchange(&vf, MboxMessage::vf_fmap_prog(0, qmax, qbase))
        .unwrap();
    rsp.status_result().unwrap();

    let words = h.sim.ctx_words(SEL_FMAP, 5).unwrap();
    assert_eq!(words[0], 32);
    assert_eq!(words[1], 16);
}

/// Proxied interrupt-context write clears then writes each ring.
#[test]
fn vf_intr_ctxt_write_and_read() {
    let h = Harness::new();
    let mut vf = h.add_vf(5);
    h.hello(&mut vf, 16);

    let rings = [
        (
            0u32,
            IntrContext {
                valid: true,
                vec: 3,
                baddr_4k: 0x1234,
                pidx: 7,
                func_id: 5,
                ..Default::default()
            },
        ),
        (
            1u32,
            IntrContext {
                valid: true,
                vec: 4,
                baddr_4k: 0x5678,
                pidx: 9,
                func_id: 5,
                ..Default::default()
            },
        ),
    ];

    let msg =
        MboxMessage::vf_intr_ctxt_write(0, vf.dev.variant(), &rings).unwrap();
    let rsp = h.exchange(&vf, msg).unwrap();
    rsp.status_result().unwrap();

    let msg =
        MboxMessage::vf_intr_ctxt_read(0, vf.dev.variant(), &rings).unwrap();
    let rsp = h.exchange(&vf, msg).unwrap();
    rsp.status_result().unwrap();

    assert_eq!(rsp.intr_ctxt_num_rings(), 2);
    let (idx0, got0) = rsp.intr_ctxt_ring(vf.dev.variant(), 0).unwrap();
    assert_eq!(idx0, 0);
    assert_eq!(got0, rings[0].1);
    let (idx1, got1) = rsp.intr_ctxt_ring(vf.dev.variant(), 1).unwrap();
    assert_eq!(idx1, 1);
    assert_eq!(got1, rings[1].1);
}
