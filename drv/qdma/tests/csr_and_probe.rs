// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CSR table programming, index translation, and the capability probe.

use drv_qdma::{csr, probe, Qdma};
use drv_qdma_api::*;
use drv_qdma_sim::{SimConfig, SimMachine};
use proptest::prelude::*;

fn setup() -> (SimMachine, Qdma<drv_qdma_sim::SimBus>) {
    let sim = SimMachine::new(SimConfig::default());
    let dev = Qdma::new_pf(sim.pf_bus()).unwrap();
    (sim, dev)
}

#[test]
fn probe_classifies_device() {
    let (_sim, dev) = setup();
    assert_eq!(dev.variant(), IpVariant::EqdmaSoft);

    let cap = dev.attributes();
    assert_eq!(cap.num_pfs, 4);
    assert_eq!(cap.num_qs, 2048);
    assert!(cap.st_en && cap.mm_en && cap.mailbox_en && cap.flr_present);
    assert!(cap.cmpt_desc_64b);

    let v = probe::version(&dev).unwrap();
    assert_eq!(v.ip_variant, IpVariant::EqdmaSoft);
    assert_eq!(v.vivado_release, VivadoRelease::Vivado2020_2);
}

#[test]
fn probe_rejects_bad_config_bar() {
    let sim = SimMachine::new(SimConfig::default());
    let bus = sim.pf_bus();
    // Break the identifier.
    use drv_qdma::QdmaBus;
    bus.reg_write(drv_qdma::regs::soft::CONFIG_BLOCK_ID, 0);
    assert_eq!(
        Qdma::new_pf(sim.pf_bus()).err(),
        Some(QdmaError::InvalidConfigBar)
    );
}

#[test]
fn user_bar_discovery() {
    let (_sim, dev) = setup();
    assert_eq!(probe::user_bar(&dev, 0).unwrap(), 2);
}

#[test]
fn default_csr_tables_land_in_registers() {
    let (sim, dev) = setup();
    csr::set_default_global_csr(&dev).unwrap();

    use drv_qdma::regs::soft;
    assert_eq!(sim.reg(soft::GLBL_RNG_SZ), 2049);
    assert_eq!(sim.reg(soft::GLBL_RNG_SZ + 4), 65);
    assert_eq!(sim.reg(soft::GLBL_RNG_SZ + 15 * 4), 16385);
    assert_eq!(sim.reg(soft::C2H_BUF_SZ + 14 * 4), 9018);
    assert_eq!(sim.reg(soft::C2H_TIMER_CNT + 15 * 4), 200);
    assert_eq!(sim.reg(soft::C2H_CNT_TH + 15 * 4), 192);
}

#[test]
fn csr_conf_bounds_and_capability_checks() {
    let (_sim, dev) = setup();
    let mut vals = [0u32; GLOBAL_CSR_ARRAY_SZ];

    // index + count must stay inside the table.
    assert_eq!(
        csr::global_csr_conf(
            &dev,
            10,
            7,
            &mut vals,
            CsrType::RingSize,
            AccessOp::Read
        ),
        Err(QdmaError::InvalidParam)
    );

    // Buffer sizes need the streaming engine.
    let sim = SimMachine::new(SimConfig {
        st_en: false,
        ..Default::default()
    });
    let dev = Qdma::new_pf(sim.pf_bus()).unwrap();
    assert_eq!(
        csr::global_csr_conf(
            &dev,
            0,
            1,
            &mut vals,
            CsrType::BufferSize,
            AccessOp::Read
        ),
        Err(QdmaError::FeatureNotSupported)
    );
}

#[test]
fn mm_channel_enable() {
    let (sim, dev) = setup();
    use drv_qdma::regs::soft;

    csr::mm_channel_conf(&dev, 0, QueueDirection::H2c, true).unwrap();
    assert_eq!(sim.reg(soft::H2C_MM_CONTROL), 1);
    csr::mm_channel_conf(&dev, 0, QueueDirection::C2h, true).unwrap();
    assert_eq!(sim.reg(soft::C2H_MM_CONTROL), 1);
    csr::mm_channel_conf(&dev, 0, QueueDirection::H2c, false).unwrap();
    assert_eq!(sim.reg(soft::H2C_MM_CONTROL), 0);

    // Only the channels the bitstream has.
    assert_eq!(
        csr::mm_channel_conf(&dev, 1, QueueDirection::H2c, true),
        Err(QdmaError::InvalidParam)
    );
}

#[test]
fn config_reg_dump_renders_and_gates() {
    let (_sim, dev) = setup();
    let mut buf = [0u8; 16384];
    let used = drv_qdma::dump::dump_config_regs(&dev, &mut buf).unwrap();
    let text = core::str::from_utf8(&buf[..used]).unwrap();

    assert!(text.contains("GLBL2_MISC_CAP"));
    assert!(text.contains("CFG_BLK_IDENTIFIER"));
    // Bit-field decode lines carry the [msb:lsb] span.
    assert!(text.contains("mailbox_en"));
    // Debug registers are hidden on non-debug silicon.
    assert!(!text.contains("C2H_STAT_DBG_DMA_ENG_0"));
}

#[test]
fn writeback_interval_roundtrip() {
    let (_sim, dev) = setup();
    csr::set_global_writeback_interval(&dev, 4).unwrap();
    assert_eq!(csr::get_global_writeback_interval(&dev).unwrap(), 4);
    assert_eq!(
        csr::set_global_writeback_interval(&dev, 9),
        Err(QdmaError::InvalidParam)
    );
}

#[test]
fn index_translation_error_tags() {
    let (_sim, dev) = setup();
    csr::set_default_global_csr(&dev).unwrap();

    assert_eq!(
        csr::find_ring_size_index(&dev, 1000),
        Err(QdmaError::Mbox(MboxError::InvalidRingSize))
    );
    assert_eq!(
        csr::find_buf_size_index(&dev, 1500),
        Err(QdmaError::Mbox(MboxError::InvalidBufSize))
    );
    assert_eq!(
        csr::find_counter_index(&dev, 3),
        Err(QdmaError::Mbox(MboxError::InvalidCounterThreshold))
    );
    assert_eq!(
        csr::find_timer_index(&dev, 7),
        Err(QdmaError::Mbox(MboxError::InvalidTimerThreshold))
    );
}

proptest! {
    /// Every value present in a programmed table translates to an index
    /// whose entry holds that value; absent values get the typed error.
    #[test]
    fn index_translation_is_exact(v in 0u32..20000) {
        let (_sim, dev) = setup();
        csr::set_default_global_csr(&dev).unwrap();

        // Ring sizes match on table-entry-minus-one.
        match csr::find_ring_size_index(&dev, v as u16) {
            Ok(i) => {
                prop_assert_eq!(
                    csr::DEFAULT_RING_SIZES[i as usize],
                    v + 1
                );
            }
            Err(e) => {
                prop_assert_eq!(
                    e,
                    QdmaError::Mbox(MboxError::InvalidRingSize)
                );
                prop_assert!(
                    !csr::DEFAULT_RING_SIZES.contains(&(v + 1))
                );
            }
        }

        if v <= u32::from(u16::MAX) {
            match csr::find_buf_size_index(&dev, v as u16) {
                Ok(i) => prop_assert_eq!(
                    csr::DEFAULT_BUF_SIZES[i as usize],
                    v
                ),
                Err(_) => prop_assert!(
                    !csr::DEFAULT_BUF_SIZES.contains(&v)
                ),
            }
        }

        if v <= 255 {
            match csr::find_counter_index(&dev, v as u8) {
                Ok(i) => prop_assert_eq!(
                    csr::DEFAULT_COUNTER_THRESHOLDS[i as usize],
                    v
                ),
                Err(_) => prop_assert!(
                    !csr::DEFAULT_COUNTER_THRESHOLDS.contains(&v)
                ),
            }
        }
    }
}

proptest! {
    /// Any sequence of allocate/free operations leaves the per-device
    /// ranges pairwise disjoint.
    #[test]
    fn ranges_stay_disjoint(ops in proptest::collection::vec(
        (0u16..8, 0u32..24, proptest::bool::ANY), 1..40))
    {
        use drv_qdma::resource::ResourceManager;

        let rm = ResourceManager::new();
        rm.create_device(0, 64).unwrap();
        for f in 0..8 {
            rm.create_entry(0, f).unwrap();
        }

        for (func, qmax, free) in ops {
            let mut qbase = -1;
            if free {
                let _ = rm.update(0, func, 0, &mut qbase);
            } else {
                let _ = rm.update(0, func, qmax, &mut qbase);
            }

            let mut ranges = [(0u16, 0u32, 0u32); 8];
            let n = rm.ranges(0, &mut ranges);
            for i in 0..n {
                let (_, lo_a, len_a) = ranges[i];
                prop_assert!(lo_a + len_a <= 64);
                for j in i + 1..n {
                    let (_, lo_b, len_b) = ranges[j];
                    let disjoint =
                        lo_a + len_a <= lo_b || lo_b + len_b <= lo_a;
                    prop_assert!(disjoint, "{ranges:?}");
                }
            }
        }
    }
}
