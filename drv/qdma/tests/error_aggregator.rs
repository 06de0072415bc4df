// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error-aggregator behavior against the simulator: enable fan-out,
//! poll-and-dispatch naming, diagnostic dumps, and write-1-to-clear
//! ordering.

use drv_qdma::err::{self, ErrorIndex, ErrorSel};
use drv_qdma::regs::soft;
use drv_qdma::Qdma;
use drv_qdma_api::{bit, IpVariant};
use drv_qdma_sim::{SimConfig, SimMachine};

fn setup(st_en: bool) -> (SimMachine, Qdma<drv_qdma_sim::SimBus>) {
    let sim = SimMachine::new(SimConfig {
        variant: IpVariant::EqdmaSoft,
        st_en,
        ..Default::default()
    });
    let dev = Qdma::new_pf(sim.pf_bus()).unwrap();
    (sim, dev)
}

#[test]
fn enable_all_sets_leaf_and_root_masks() {
    let (sim, dev) = setup(true);
    err::error_enable(&dev, ErrorSel::All).unwrap();

    // Every leaf's bit lands in the root mask...
    let root = sim.reg(soft::GLBL_ERR_MASK);
    for b in [0, 1, 2, 3, 8, 16] {
        assert_ne!(root & bit(b), 0, "root bit {b}");
    }
    // ...and the leaf masks carry their full error sets.
    assert_eq!(sim.reg(soft::C2H_ERR_MASK), 0x3_F6DF);
    assert_eq!(sim.reg(soft::H2C_ERR_MASK), 0x3F);
    assert_eq!(sim.reg(soft::RAM_SBE_MSK), 0xFFFF_FFFF);
}

#[test]
fn enable_all_skips_streaming_leaves_on_mm_only_devices() {
    let (sim, dev) = setup(false);
    err::error_enable(&dev, ErrorSel::All).unwrap();

    assert_eq!(sim.reg(soft::C2H_ERR_MASK), 0);
    assert_eq!(sim.reg(soft::H2C_ERR_MASK), 0);
    // Non-streaming leaves still armed.
    assert_ne!(sim.reg(soft::GLBL_DSC_ERR_MSK), 0);
}

#[test]
fn enable_one_arms_single_bit() {
    let (sim, dev) = setup(true);
    err::error_enable(&dev, ErrorSel::One(ErrorIndex::C2hLenMismatch))
        .unwrap();
    assert_eq!(sim.reg(soft::C2H_ERR_MASK), bit(1));
    assert_eq!(sim.reg(soft::GLBL_ERR_MASK), bit(8));

    // An index this variant's silicon lacks is rejected.
    assert!(err::error_enable(&dev, ErrorSel::One(ErrorIndex::H2cCsiMop))
        .is_err());
}

/// Streaming C2H errors fire: both conditions are named, the leaf's
/// diagnostic registers are dumped, and both status registers clear
/// (leaf first, root last).
#[test]
fn process_names_dumps_and_clears() {
    let (sim, dev) = setup(true);
    err::error_enable(&dev, ErrorSel::All).unwrap();

    sim.set_reg_bits(soft::GLBL_ERR_STAT, bit(8));
    sim.set_reg_bits(soft::C2H_ERR_STAT, bit(0) | bit(1));

    assert!(err::error_process(&dev).unwrap());

    assert!(sim.log_contains("MTY mismatch error"));
    assert!(sim.log_contains("Packet length mismatch error"));

    for reg in [
        "C2H_ERR_STAT",
        "C2H_FIRST_ERR_QID",
        "C2H_STAT_DBG_DMA_ENG_0",
        "C2H_STAT_DBG_DMA_ENG_1",
        "C2H_STAT_DBG_DMA_ENG_2",
        "C2H_STAT_DBG_DMA_ENG_3",
    ] {
        assert!(sim.log_contains(reg), "missing dump of {reg}");
    }

    assert_eq!(sim.reg(soft::C2H_ERR_STAT), 0);
    assert_eq!(sim.reg(soft::GLBL_ERR_STAT), 0);
}

#[test]
fn process_with_nothing_pending_is_quiet() {
    let (sim, dev) = setup(true);
    assert!(!err::error_process(&dev).unwrap());
    assert!(sim.logs().is_empty());
}

#[test]
fn process_skips_leaves_without_root_bit() {
    let (sim, dev) = setup(true);
    // Leaf status set, but its root bit is not: nothing is consumed
    // except the stale root word itself.
    sim.set_reg_bits(soft::GLBL_ERR_STAT, bit(2));
    sim.set_reg_bits(soft::C2H_ERR_STAT, bit(0));

    err::error_process(&dev).unwrap();
    assert!(!sim.log_contains("MTY mismatch error"));
    assert_eq!(sim.reg(soft::C2H_ERR_STAT), bit(0));
}
