// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hardware-error aggregation.
//!
//! Errors form a two-level tree: one global status/mask register pair at
//! the root, and a status/mask pair per leaf aggregator (descriptor
//! engine, register target, streaming C2H, streaming C2H fatal,
//! streaming H2C, and the RAM ECC banks). Every concrete error condition
//! has its own bit in its leaf.
//!
//! Enabling an error sets its bit in the leaf mask and the leaf's bit in
//! the root mask. Processing walks the set leaves, names every set
//! error, dumps the leaf's diagnostic registers, and clears leaf status
//! before root status (both write-1-to-clear).

use crate::dump::log_reg;
use crate::regs::{eqdma, soft};
use crate::{Qdma, QdmaBus};
use drv_qdma_api::{bit, genmask, IpVariant, QdmaError};
use ringbuf::{ringbuf, ringbuf_entry};

/// Every error condition the driver can name, across all variants. A
/// given variant's table carries the subset its silicon implements.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum ErrorIndex {
    // Descriptor engine.
    DescPoison,
    DescUrCa,
    DescBcnt,
    DescParam,
    DescAddr,
    DescTag,
    DescFlr,
    DescTimeout,
    DescDatPoison,
    DescFlrCancel,
    DescDma,
    DescDsc,
    DescRqCancel,
    DescDbe,
    DescSbe,

    // Register target (TRQ).
    TrqCsrUnmapped,
    TrqVfAccess,
    TrqTcpCsrTimeout,
    TrqQspcUnmapped,
    TrqQidRange,
    TrqTcpQspcTimeout,

    // Streaming C2H.
    C2hMtyMismatch,
    C2hLenMismatch,
    C2hShCmptDsc,
    C2hQidMismatch,
    C2hDescRspErr,
    C2hEngWplDataPar,
    C2hMsiIntFail,
    C2hErrDescCnt,
    C2hPortidCtxtMismatch,
    C2hPortidBypInMismatch,
    C2hCmptInvQ,
    C2hCmptQfull,
    C2hCmptCidx,
    C2hCmptPrty,
    C2hAvlRingDsc,
    C2hHdrEccUnc,
    C2hHdrEccCor,

    // Streaming C2H, fatal.
    C2hFatalMtyMismatch,
    C2hFatalLenMismatch,
    C2hFatalQidMismatch,
    C2hFatalTimerFifoRamRdbe,
    C2hFatalPfchIiRamRdbe,
    C2hFatalCmptCtxtRamRdbe,
    C2hFatalPfchCtxtRamRdbe,
    C2hFatalDescReqFifoRamRdbe,
    C2hFatalIntCtxtRamRdbe,
    C2hFatalCmptCoalDataRamRdbe,
    C2hFatalCmptFifoRamRdbe,
    C2hFatalTuserFifoRamRdbe,
    C2hFatalQidFifoRamRdbe,
    C2hFatalPayloadFifoRamRdbe,
    C2hFatalWplDataPar,
    C2hFatalAvlRingFifoRamRdbe,
    C2hFatalHdrEccUnc,

    // Streaming H2C.
    H2cZeroLenDesc,
    H2cCsiMop,
    H2cSdiMrkrReqMop,
    H2cNoDmaDsc,
    H2cSbe,
    H2cDbe,
    H2cParErr,

    // RAM single-bit ECC.
    SbeMiH2c0Dat,
    SbeMiH2c1Dat,
    SbeMiH2c2Dat,
    SbeMiH2c3Dat,
    SbeMiC2h0Dat,
    SbeMiC2h1Dat,
    SbeMiC2h2Dat,
    SbeMiC2h3Dat,
    SbeH2cRdBrgDat,
    SbeH2cWrBrgDat,
    SbeC2hRdBrgDat,
    SbeC2hWrBrgDat,
    SbeFuncMap,
    SbeDscHwCtxt,
    SbeDscCrdRcv,
    SbeDscSwCtxt,
    SbeDscCpli,
    SbeDscCpld,
    SbePasidCtxtRam,
    SbeMiTlSlvFifoRam,
    SbeTimerFifoRam,
    SbePayloadFifoRam,
    SbeQidFifoRam,
    SbeTuserFifoRam,
    SbeWrbCoalDataRam,
    SbeIntQid2VecRam,
    SbeIntCtxtRam,
    SbeDescReqFifoRam,
    SbePfchCtxtRam,
    SbeWrbCtxtRam,
    SbePfchLlRam,
    SbePendFifoRam,
    SbeRcRrqOddRam,

    // RAM single-bit ECC, second bank (EQDMA only).
    Sbe1RcRrqEvenRam,
    Sbe1TagOddRam,
    Sbe1TagEvenRam,
    Sbe1PfchCtxtCamRam0,
    Sbe1PfchCtxtCamRam1,

    // RAM double-bit ECC.
    DbeMiH2c0Dat,
    DbeMiH2c1Dat,
    DbeMiH2c2Dat,
    DbeMiH2c3Dat,
    DbeMiC2h0Dat,
    DbeMiC2h1Dat,
    DbeMiC2h2Dat,
    DbeMiC2h3Dat,
    DbeH2cRdBrgDat,
    DbeH2cWrBrgDat,
    DbeC2hRdBrgDat,
    DbeC2hWrBrgDat,
    DbeFuncMap,
    DbeDscHwCtxt,
    DbeDscCrdRcv,
    DbeDscSwCtxt,
    DbeDscCpli,
    DbeDscCpld,
    DbePasidCtxtRam,
    DbeMiTlSlvFifoRam,
    DbeTimerFifoRam,
    DbePayloadFifoRam,
    DbeQidFifoRam,
    DbeTuserFifoRam,
    DbeWrbCoalDataRam,
    DbeIntQid2VecRam,
    DbeIntCtxtRam,
    DbeDescReqFifoRam,
    DbePfchCtxtRam,
    DbeWrbCtxtRam,
    DbePfchLlRam,
    DbePendFifoRam,
    DbeRcRrqOddRam,

    // RAM double-bit ECC, second bank (EQDMA only).
    Dbe1RcRrqEvenRam,
    Dbe1TagOddRam,
    Dbe1TagEvenRam,
    Dbe1PfchCtxtCamRam0,
    Dbe1PfchCtxtCamRam1,
}

/// Leaf aggregators, in processing order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Leaf {
    Desc,
    Trq,
    StC2h,
    StC2hFatal,
    StH2c,
    RamSbe1,
    RamSbe,
    RamDbe1,
    RamDbe,
}

/// What to enable.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorSel {
    One(ErrorIndex),
    All,
}

/// One concrete error condition within a leaf.
#[derive(Copy, Clone, Debug)]
pub struct ErrRecord {
    pub index: ErrorIndex,
    pub name: &'static str,
    pub mask: u32,
}

/// One leaf aggregator: its register pair, the bit it owns in the root
/// mask, and its error conditions.
#[derive(Copy, Clone, Debug)]
pub struct LeafRecord {
    pub leaf: Leaf,
    pub stat_addr: u32,
    pub mask_addr: u32,
    /// All implemented error bits of the leaf.
    pub all_mask: u32,
    /// This leaf's bit in the root mask/status.
    pub glbl_mask: u32,
    /// Skip on devices without the streaming engine.
    pub st_gated: bool,
    pub errors: &'static [ErrRecord],
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Trace {
    None,
    GlobalStatus(u32),
    LeafStatus(Leaf, u32),
    Detected(ErrorIndex),
}
ringbuf!(Trace, 64, Trace::None);

macro_rules! err {
    ($idx:ident, $name:expr, $mask:expr) => {
        ErrRecord {
            index: ErrorIndex::$idx,
            name: $name,
            mask: $mask,
        }
    };
}

// Root mask bits, shared placement on all variants.
const GLBL_ERR_RAM_SBE: u32 = bit(0);
const GLBL_ERR_RAM_DBE: u32 = bit(1);
const GLBL_ERR_DSC: u32 = bit(2);
const GLBL_ERR_TRQ: u32 = bit(3);
const GLBL_ERR_ST_C2H: u32 = bit(8);
const GLBL_ERR_ST_H2C_SOFT: u32 = bit(11);
const GLBL_ERR_ST_H2C_EQDMA: u32 = bit(16);

// ---------------------------------------------------------------------
// EQDMA soft IP table.
// ---------------------------------------------------------------------

const EQDMA_DESC_ERRORS: &[ErrRecord] = &[
    err!(DescPoison, "Poison error", bit(1)),
    err!(DescUrCa, "Unsupported request or completer aborted error", bit(2)),
    err!(DescBcnt, "Unexpected Byte count in completion error", bit(3)),
    err!(DescParam, "Parameter mismatch error", bit(4)),
    err!(DescAddr, "Address mismatch error", bit(5)),
    err!(DescTag, "Unexpected tag error", bit(6)),
    err!(DescFlr, "FLR error", bit(8)),
    err!(DescTimeout, "Timed out error", bit(9)),
    err!(DescDatPoison, "Poison data error", bit(16)),
    err!(DescFlrCancel, "Descriptor fetch cancelled due to FLR error", bit(19)),
    err!(DescDma, "DMA engine error", bit(20)),
    err!(DescDsc, "Invalid PIDX update error", bit(21)),
    err!(DescRqCancel, "Descriptor fetch cancelled due to disable register status error", bit(22)),
    err!(DescDbe, "UNC_ERR_RAM_DBE error", bit(23)),
    err!(DescSbe, "UNC_ERR_RAM_SBE error", bit(24)),
];

const EQDMA_TRQ_ERRORS: &[ErrRecord] = &[
    err!(TrqCsrUnmapped, "Access targeted unmapped register space via CSR pathway error", bit(0)),
    err!(TrqVfAccess, "VF attempted to access Global register space or Function map", bit(1)),
    err!(TrqTcpCsrTimeout, "Timeout on request to dma internal csr register", bit(3)),
    err!(TrqQspcUnmapped, "Access targeted unmapped register via queue space pathway", bit(4)),
    err!(TrqQidRange, "Qid range error", bit(5)),
    err!(TrqTcpQspcTimeout, "Timeout on request to dma internal queue space register", bit(7)),
];

const EQDMA_C2H_ERRORS: &[ErrRecord] = &[
    err!(C2hMtyMismatch, "MTY mismatch error", bit(0)),
    err!(C2hLenMismatch, "Packet length mismatch error", bit(1)),
    err!(C2hShCmptDsc, "Shared CMPT queue descriptor error", bit(2)),
    err!(C2hQidMismatch, "Qid mismatch error", bit(3)),
    err!(C2hDescRspErr, "Descriptor response error", bit(4)),
    err!(C2hEngWplDataPar, "Data parity error", bit(6)),
    err!(C2hMsiIntFail, "MSI got a fail response error", bit(7)),
    err!(C2hErrDescCnt, "Descriptor count error", bit(9)),
    err!(C2hPortidCtxtMismatch, "Port id in packet and pfetch ctxt mismatch error", bit(10)),
    err!(C2hCmptInvQ, "Writeback on invalid queue error", bit(12)),
    err!(C2hCmptQfull, "Completion queue gets full error", bit(13)),
    err!(C2hCmptCidx, "Bad CIDX update by the software error", bit(14)),
    err!(C2hCmptPrty, "C2H completion Parity error", bit(15)),
    err!(C2hAvlRingDsc, "Available ring fetch returns descriptor with error", bit(16)),
    err!(C2hHdrEccUnc, "Multi bit error on header fifo ECC", bit(17)),
    err!(C2hHdrEccCor, "Single bit error on header fifo ECC", bit(18)),
];

const EQDMA_C2H_FATAL_ERRORS: &[ErrRecord] = &[
    err!(C2hFatalMtyMismatch, "Fatal MTY mismatch error", bit(0)),
    err!(C2hFatalLenMismatch, "Fatal Len mismatch error", bit(1)),
    err!(C2hFatalQidMismatch, "Fatal Qid mismatch error", bit(3)),
    err!(C2hFatalTimerFifoRamRdbe, "RAM double bit fatal error", bit(4)),
    err!(C2hFatalPfchIiRamRdbe, "RAM double bit fatal error", bit(8)),
    err!(C2hFatalCmptCtxtRamRdbe, "RAM double bit fatal error", bit(9)),
    err!(C2hFatalPfchCtxtRamRdbe, "RAM double bit fatal error", bit(10)),
    err!(C2hFatalDescReqFifoRamRdbe, "RAM double bit fatal error", bit(11)),
    err!(C2hFatalIntCtxtRamRdbe, "RAM double bit fatal error", bit(12)),
    err!(C2hFatalCmptCoalDataRamRdbe, "RAM double bit fatal error", bit(14)),
    err!(C2hFatalCmptFifoRamRdbe, "RAM double bit fatal error", bit(15)),
    err!(C2hFatalQidFifoRamRdbe, "RAM double bit fatal error", bit(16)),
    err!(C2hFatalPayloadFifoRamRdbe, "RAM double bit fatal error", bit(17)),
    err!(C2hFatalWplDataPar, "RAM double bit fatal error", bit(18)),
    err!(C2hFatalAvlRingFifoRamRdbe, "RAM double bit fatal error", bit(19)),
    err!(C2hFatalHdrEccUnc, "RAM double bit fatal error", bit(20)),
];

const EQDMA_H2C_ERRORS: &[ErrRecord] = &[
    err!(H2cZeroLenDesc, "Zero length descriptor error", bit(0)),
    err!(H2cSdiMrkrReqMop, "A non-EOP descriptor received error", bit(1)),
    err!(H2cNoDmaDsc, "No DMA descriptor received error", bit(2)),
    err!(H2cSbe, "Single bit error detected on H2C-ST data error", bit(3)),
    err!(H2cDbe, "Double bit error detected on H2C-ST data error", bit(4)),
    err!(H2cParErr, "Internal data parity error", bit(5)),
];

const EQDMA_SBE_ERRORS: &[ErrRecord] = &[
    err!(SbeMiH2c0Dat, "H2C MM data buffer single bit ECC error", bit(0)),
    err!(SbeMiH2c1Dat, "H2C MM data buffer single bit ECC error", bit(1)),
    err!(SbeMiH2c2Dat, "H2C MM data buffer single bit ECC error", bit(2)),
    err!(SbeMiH2c3Dat, "H2C MM data buffer single bit ECC error", bit(3)),
    err!(SbeMiC2h0Dat, "C2H MM data buffer single bit ECC error", bit(4)),
    err!(SbeMiC2h1Dat, "C2H MM data buffer single bit ECC error", bit(5)),
    err!(SbeMiC2h2Dat, "C2H MM data buffer single bit ECC error", bit(6)),
    err!(SbeMiC2h3Dat, "C2H MM data buffer single bit ECC error", bit(7)),
    err!(SbeH2cRdBrgDat, "Bridge master read single bit ECC error", bit(8)),
    err!(SbeH2cWrBrgDat, "Bridge master write single bit ECC error", bit(9)),
    err!(SbeC2hRdBrgDat, "Bridge slave read data buffer single bit ECC error", bit(10)),
    err!(SbeC2hWrBrgDat, "Bridge slave write data buffer single bit ECC error", bit(11)),
    err!(SbeFuncMap, "Function map RAM single bit ECC error", bit(12)),
    err!(SbeDscHwCtxt, "Descriptor engine hardware context RAM single bit ECC error", bit(13)),
    err!(SbeDscCrdRcv, "Descriptor engine receive credit context RAM single bit ECC error", bit(14)),
    err!(SbeDscSwCtxt, "Descriptor engine software context RAM single bit ECC error", bit(15)),
    err!(SbeDscCpli, "Descriptor engine fetch completion information RAM single bit ECC error", bit(16)),
    err!(SbeDscCpld, "Descriptor engine fetch completion data RAM single bit ECC error", bit(17)),
    err!(SbeMiTlSlvFifoRam, "TL Slave FIFO RAM single bit ECC error", bit(18)),
    err!(SbeTimerFifoRam, "Timer fifo RAM single bit ECC error", genmask(22, 19)),
    err!(SbeQidFifoRam, "C2H ST QID FIFO RAM single bit ECC error", bit(23)),
    err!(SbeWrbCoalDataRam, "Writeback Coalescing RAM single bit ECC error", bit(24)),
    err!(SbeIntCtxtRam, "Interrupt context RAM single bit ECC error", bit(25)),
    err!(SbeDescReqFifoRam, "C2H ST descriptor request RAM single bit ECC error", bit(26)),
    err!(SbePfchCtxtRam, "C2H ST prefetch RAM single bit ECC error", bit(27)),
    err!(SbeWrbCtxtRam, "C2H ST writeback context RAM single bit ECC error", bit(28)),
    err!(SbePfchLlRam, "C2H ST prefetch list RAM single bit ECC error", bit(29)),
    err!(SbePendFifoRam, "Pend FIFO RAM single bit ECC error", bit(30)),
    err!(SbeRcRrqOddRam, "RC RRQ Odd RAM single bit ECC error", bit(31)),
];

const EQDMA_SBE_1_ERRORS: &[ErrRecord] = &[
    err!(Sbe1RcRrqEvenRam, "RC RRQ Even RAM single bit ECC error", bit(0)),
    err!(Sbe1TagOddRam, "Tag Odd RAM single bit ECC error", bit(1)),
    err!(Sbe1TagEvenRam, "Tag Even RAM single bit ECC error", bit(2)),
    err!(Sbe1PfchCtxtCamRam0, "Pfch Ctxt CAM RAM 0 single bit ECC error", bit(3)),
    err!(Sbe1PfchCtxtCamRam1, "Pfch Ctxt CAM RAM 1 single bit ECC error", bit(4)),
];

const EQDMA_DBE_ERRORS: &[ErrRecord] = &[
    err!(DbeMiH2c0Dat, "H2C MM data buffer double bit ECC error", bit(0)),
    err!(DbeMiH2c1Dat, "H2C MM data buffer double bit ECC error", bit(1)),
    err!(DbeMiH2c2Dat, "H2C MM data buffer double bit ECC error", bit(2)),
    err!(DbeMiH2c3Dat, "H2C MM data buffer double bit ECC error", bit(3)),
    err!(DbeMiC2h0Dat, "C2H MM data buffer double bit ECC error", bit(4)),
    err!(DbeMiC2h1Dat, "C2H MM data buffer double bit ECC error", bit(5)),
    err!(DbeMiC2h2Dat, "C2H MM data buffer double bit ECC error", bit(6)),
    err!(DbeMiC2h3Dat, "C2H MM data buffer double bit ECC error", bit(7)),
    err!(DbeH2cRdBrgDat, "Bridge master read double bit ECC error", bit(8)),
    err!(DbeH2cWrBrgDat, "Bridge master write double bit ECC error", bit(9)),
    err!(DbeC2hRdBrgDat, "Bridge slave read data buffer double bit ECC error", bit(10)),
    err!(DbeC2hWrBrgDat, "Bridge slave write data buffer double bit ECC error", bit(11)),
    err!(DbeFuncMap, "Function map RAM double bit ECC error", bit(12)),
    err!(DbeDscHwCtxt, "Descriptor engine hardware context RAM double bit ECC error", bit(13)),
    err!(DbeDscCrdRcv, "Descriptor engine receive credit context RAM double bit ECC error", bit(14)),
    err!(DbeDscSwCtxt, "Descriptor engine software context RAM double bit ECC error", bit(15)),
    err!(DbeDscCpli, "Descriptor engine fetch completion information RAM double bit ECC error", bit(16)),
    err!(DbeDscCpld, "Descriptor engine fetch completion data RAM double bit ECC error", bit(17)),
    err!(DbeMiTlSlvFifoRam, "TL Slave FIFO RAM double bit ECC error", bit(18)),
    err!(DbeTimerFifoRam, "Timer fifo RAM double bit ECC error", genmask(22, 19)),
    err!(DbeQidFifoRam, "C2H ST QID FIFO RAM double bit ECC error", bit(23)),
    err!(DbeWrbCoalDataRam, "Writeback Coalescing RAM double bit ECC error", bit(24)),
    err!(DbeIntCtxtRam, "Interrupt context RAM double bit ECC error", bit(25)),
    err!(DbeDescReqFifoRam, "C2H ST descriptor request RAM double bit ECC error", bit(26)),
    err!(DbePfchCtxtRam, "C2H ST prefetch RAM double bit ECC error", bit(27)),
    err!(DbeWrbCtxtRam, "C2H ST writeback context RAM double bit ECC error", bit(28)),
    err!(DbePfchLlRam, "C2H ST prefetch list RAM double bit ECC error", bit(29)),
    err!(DbePendFifoRam, "Pend FIFO RAM double bit ECC error", bit(30)),
    err!(DbeRcRrqOddRam, "RC RRQ Odd RAM double bit ECC error", bit(31)),
];

const EQDMA_DBE_1_ERRORS: &[ErrRecord] = &[
    err!(Dbe1RcRrqEvenRam, "RC RRQ Even RAM double bit ECC error", bit(0)),
    err!(Dbe1TagOddRam, "Tag Odd RAM double bit ECC error", bit(1)),
    err!(Dbe1TagEvenRam, "Tag Even RAM double bit ECC error", bit(2)),
    err!(Dbe1PfchCtxtCamRam0, "Pfch Ctxt CAM RAM 0 double bit ECC error", bit(3)),
    err!(Dbe1PfchCtxtCamRam1, "Pfch Ctxt CAM RAM 1 double bit ECC error", bit(4)),
];

const EQDMA_LEAVES: &[LeafRecord] = &[
    LeafRecord {
        leaf: Leaf::Desc,
        stat_addr: soft::GLBL_DSC_ERR_STS,
        mask_addr: soft::GLBL_DSC_ERR_MSK,
        all_mask: 0x01F9_037E,
        glbl_mask: GLBL_ERR_DSC,
        st_gated: false,
        errors: EQDMA_DESC_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::Trq,
        stat_addr: soft::GLBL_TRQ_ERR_STS,
        mask_addr: soft::GLBL_TRQ_ERR_MSK,
        all_mask: 0xB3,
        glbl_mask: GLBL_ERR_TRQ,
        st_gated: false,
        errors: EQDMA_TRQ_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::StC2h,
        stat_addr: soft::C2H_ERR_STAT,
        mask_addr: soft::C2H_ERR_MASK,
        all_mask: 0x3_F6DF,
        glbl_mask: GLBL_ERR_ST_C2H,
        st_gated: true,
        errors: EQDMA_C2H_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::StC2hFatal,
        stat_addr: soft::C2H_FATAL_ERR_STAT,
        mask_addr: soft::C2H_FATAL_ERR_MASK,
        all_mask: 0x1F_DF1B,
        glbl_mask: GLBL_ERR_ST_C2H,
        st_gated: true,
        errors: EQDMA_C2H_FATAL_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::StH2c,
        stat_addr: soft::H2C_ERR_STAT,
        mask_addr: soft::H2C_ERR_MASK,
        all_mask: 0x3F,
        glbl_mask: GLBL_ERR_ST_H2C_EQDMA,
        st_gated: true,
        errors: EQDMA_H2C_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::RamSbe1,
        stat_addr: eqdma::RAM_SBE_1_STS,
        mask_addr: eqdma::RAM_SBE_1_MSK,
        all_mask: 0x1F,
        glbl_mask: GLBL_ERR_RAM_SBE,
        st_gated: false,
        errors: EQDMA_SBE_1_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::RamSbe,
        stat_addr: soft::RAM_SBE_STS,
        mask_addr: soft::RAM_SBE_MSK,
        all_mask: 0xFFFF_FFFF,
        glbl_mask: GLBL_ERR_RAM_SBE,
        st_gated: false,
        errors: EQDMA_SBE_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::RamDbe1,
        stat_addr: eqdma::RAM_DBE_1_STS,
        mask_addr: eqdma::RAM_DBE_1_MSK,
        all_mask: 0x1F,
        glbl_mask: GLBL_ERR_RAM_DBE,
        st_gated: false,
        errors: EQDMA_DBE_1_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::RamDbe,
        stat_addr: soft::RAM_DBE_STS,
        mask_addr: soft::RAM_DBE_MSK,
        all_mask: 0xFFFF_FFFF,
        glbl_mask: GLBL_ERR_RAM_DBE,
        st_gated: false,
        errors: EQDMA_DBE_ERRORS,
    },
];

// ---------------------------------------------------------------------
// Soft IP table (also used for the S80 hardened block).
// ---------------------------------------------------------------------

const SOFT_DESC_ERRORS: &[ErrRecord] = &[
    err!(DescPoison, "Poison error", bit(0)),
    err!(DescUrCa, "Unsupported request or completer aborted error", bit(1)),
    err!(DescParam, "Parameter mismatch error", bit(2)),
    err!(DescAddr, "Address mismatch error", bit(3)),
    err!(DescTag, "Unexpected tag error", bit(4)),
    err!(DescFlr, "FLR error", bit(5)),
    err!(DescTimeout, "Timed out error", bit(9)),
    err!(DescDatPoison, "Poison data error", bit(16)),
    err!(DescFlrCancel, "Descriptor fetch cancelled due to FLR error", bit(19)),
    err!(DescDma, "DMA engine error", bit(20)),
    err!(DescDsc, "Invalid PIDX update error", bit(21)),
    err!(DescRqCancel, "Descriptor fetch cancelled due to disable register status error", bit(22)),
    err!(DescDbe, "UNC_ERR_RAM_DBE error", bit(23)),
    err!(DescSbe, "UNC_ERR_RAM_SBE error", bit(24)),
];

const SOFT_TRQ_ERRORS: &[ErrRecord] = &[
    err!(TrqCsrUnmapped, "Access targeted unmapped register space error", bit(0)),
    err!(TrqQidRange, "Qid range error", bit(1)),
    err!(TrqVfAccess, "VF attempted to access Global register space or Function map", bit(2)),
    err!(TrqTcpCsrTimeout, "Timeout on request error", bit(3)),
];

const SOFT_C2H_ERRORS: &[ErrRecord] = &[
    err!(C2hMtyMismatch, "MTY mismatch error", bit(0)),
    err!(C2hLenMismatch, "Packet length mismatch error", bit(1)),
    err!(C2hQidMismatch, "Qid mismatch error", bit(3)),
    err!(C2hDescRspErr, "Descriptor response error", bit(4)),
    err!(C2hEngWplDataPar, "Data parity error", bit(6)),
    err!(C2hMsiIntFail, "MSI got a fail response error", bit(7)),
    err!(C2hErrDescCnt, "Descriptor count error", bit(9)),
    err!(C2hPortidCtxtMismatch, "Port id in packet and pfetch ctxt mismatch error", bit(10)),
    err!(C2hPortidBypInMismatch, "Port id in packet and bypass in mismatch error", bit(11)),
    err!(C2hCmptInvQ, "Writeback on invalid queue error", bit(12)),
    err!(C2hCmptQfull, "Completion queue gets full error", bit(13)),
    err!(C2hCmptCidx, "Bad CIDX update by the software error", bit(14)),
    err!(C2hCmptPrty, "C2H completion Parity error", bit(15)),
];

const SOFT_C2H_FATAL_ERRORS: &[ErrRecord] = &[
    err!(C2hFatalMtyMismatch, "Fatal MTY mismatch error", bit(0)),
    err!(C2hFatalLenMismatch, "Fatal Len mismatch error", bit(1)),
    err!(C2hFatalQidMismatch, "Fatal Qid mismatch error", bit(3)),
    err!(C2hFatalTimerFifoRamRdbe, "RAM double bit fatal error", bit(4)),
    err!(C2hFatalPfchIiRamRdbe, "RAM double bit fatal error", bit(8)),
    err!(C2hFatalCmptCtxtRamRdbe, "RAM double bit fatal error", bit(9)),
    err!(C2hFatalPfchCtxtRamRdbe, "RAM double bit fatal error", bit(10)),
    err!(C2hFatalDescReqFifoRamRdbe, "RAM double bit fatal error", bit(11)),
    err!(C2hFatalIntCtxtRamRdbe, "RAM double bit fatal error", bit(12)),
    err!(C2hFatalCmptCoalDataRamRdbe, "RAM double bit fatal error", bit(14)),
    err!(C2hFatalTuserFifoRamRdbe, "RAM double bit fatal error", bit(15)),
    err!(C2hFatalQidFifoRamRdbe, "RAM double bit fatal error", bit(16)),
    err!(C2hFatalPayloadFifoRamRdbe, "RAM double bit fatal error", bit(17)),
    err!(C2hFatalWplDataPar, "RAM double bit fatal error", bit(18)),
];

const SOFT_H2C_ERRORS: &[ErrRecord] = &[
    err!(H2cZeroLenDesc, "Zero length descriptor error", bit(0)),
    err!(H2cCsiMop, "Non EOP descriptor received error", bit(1)),
    err!(H2cNoDmaDsc, "No DMA descriptor received error", bit(2)),
    err!(H2cSbe, "Single bit error detected on H2C-ST data error", bit(3)),
    err!(H2cDbe, "Double bit error detected on H2C-ST data error", bit(4)),
];

const SOFT_SBE_ERRORS: &[ErrRecord] = &[
    err!(SbeMiH2c0Dat, "H2C MM data buffer single bit ECC error", bit(0)),
    err!(SbeMiC2h0Dat, "C2H MM data buffer single bit ECC error", bit(4)),
    err!(SbeH2cRdBrgDat, "Bridge master read single bit ECC error", bit(9)),
    err!(SbeH2cWrBrgDat, "Bridge master write single bit ECC error", bit(10)),
    err!(SbeC2hRdBrgDat, "Bridge slave read data buffer single bit ECC error", bit(11)),
    err!(SbeC2hWrBrgDat, "Bridge slave write data buffer single bit ECC error", bit(12)),
    err!(SbeFuncMap, "Function map RAM single bit ECC error", bit(13)),
    err!(SbeDscHwCtxt, "Descriptor engine hardware context RAM single bit ECC error", bit(14)),
    err!(SbeDscCrdRcv, "Descriptor engine receive credit context RAM single bit ECC error", bit(15)),
    err!(SbeDscSwCtxt, "Descriptor engine software context RAM single bit ECC error", bit(16)),
    err!(SbeDscCpli, "Descriptor engine fetch completion information RAM single bit ECC error", bit(17)),
    err!(SbeDscCpld, "Descriptor engine fetch completion data RAM single bit ECC error", bit(18)),
    err!(SbePasidCtxtRam, "PASID configuration RAM single bit ECC error", bit(19)),
    err!(SbeTimerFifoRam, "Timer fifo RAM single bit ECC error", bit(20)),
    err!(SbePayloadFifoRam, "C2H ST payload FIFO RAM single bit ECC error", bit(21)),
    err!(SbeQidFifoRam, "C2H ST QID FIFO RAM single bit ECC error", bit(22)),
    err!(SbeTuserFifoRam, "C2H ST TUSER FIFO RAM single bit ECC error", bit(23)),
    err!(SbeWrbCoalDataRam, "Writeback Coalescing RAM single bit ECC error", bit(24)),
    err!(SbeIntQid2VecRam, "Interrupt QID2VEC RAM single bit ECC error", bit(25)),
    err!(SbeIntCtxtRam, "Interrupt context RAM single bit ECC error", bit(26)),
    err!(SbeDescReqFifoRam, "C2H ST descriptor request RAM single bit ECC error", bit(27)),
    err!(SbePfchCtxtRam, "C2H ST prefetch RAM single bit ECC error", bit(28)),
    err!(SbeWrbCtxtRam, "C2H ST writeback context RAM single bit ECC error", bit(29)),
    err!(SbePfchLlRam, "C2H ST prefetch list RAM single bit ECC error", bit(30)),
    err!(SbePendFifoRam, "H2C pending fifo RAM single bit ECC error", bit(31)),
];

const SOFT_DBE_ERRORS: &[ErrRecord] = &[
    err!(DbeMiH2c0Dat, "H2C MM data buffer double bit ECC error", bit(0)),
    err!(DbeMiC2h0Dat, "C2H MM data buffer double bit ECC error", bit(4)),
    err!(DbeH2cRdBrgDat, "Bridge master read double bit ECC error", bit(9)),
    err!(DbeH2cWrBrgDat, "Bridge master write double bit ECC error", bit(10)),
    err!(DbeC2hRdBrgDat, "Bridge slave read data buffer double bit ECC error", bit(11)),
    err!(DbeC2hWrBrgDat, "Bridge slave write data buffer double bit ECC error", bit(12)),
    err!(DbeFuncMap, "Function map RAM double bit ECC error", bit(13)),
    err!(DbeDscHwCtxt, "Descriptor engine hardware context RAM double bit ECC error", bit(14)),
    err!(DbeDscCrdRcv, "Descriptor engine receive credit context RAM double bit ECC error", bit(15)),
    err!(DbeDscSwCtxt, "Descriptor engine software context RAM double bit ECC error", bit(16)),
    err!(DbeDscCpli, "Descriptor engine fetch completion information RAM double bit ECC error", bit(17)),
    err!(DbeDscCpld, "Descriptor engine fetch completion data RAM double bit ECC error", bit(18)),
    err!(DbePasidCtxtRam, "PASID configuration RAM double bit ECC error", bit(19)),
    err!(DbeTimerFifoRam, "Timer fifo RAM double bit ECC error", bit(20)),
    err!(DbePayloadFifoRam, "C2H ST payload FIFO RAM double bit ECC error", bit(21)),
    err!(DbeQidFifoRam, "C2H ST QID FIFO RAM double bit ECC error", bit(22)),
    err!(DbeTuserFifoRam, "C2H ST TUSER FIFO RAM double bit ECC error", bit(23)),
    err!(DbeWrbCoalDataRam, "Writeback Coalescing RAM double bit ECC error", bit(24)),
    err!(DbeIntQid2VecRam, "Interrupt QID2VEC RAM double bit ECC error", bit(25)),
    err!(DbeIntCtxtRam, "Interrupt context RAM double bit ECC error", bit(26)),
    err!(DbeDescReqFifoRam, "C2H ST descriptor request RAM double bit ECC error", bit(27)),
    err!(DbePfchCtxtRam, "C2H ST prefetch RAM double bit ECC error", bit(28)),
    err!(DbeWrbCtxtRam, "C2H ST writeback context RAM double bit ECC error", bit(29)),
    err!(DbePfchLlRam, "C2H ST prefetch list RAM double bit ECC error", bit(30)),
    err!(DbePendFifoRam, "H2C pending fifo RAM double bit ECC error", bit(31)),
];

const SOFT_LEAVES: &[LeafRecord] = &[
    LeafRecord {
        leaf: Leaf::Desc,
        stat_addr: soft::GLBL_DSC_ERR_STS,
        mask_addr: soft::GLBL_DSC_ERR_MSK,
        all_mask: 0x01F9_023F,
        glbl_mask: GLBL_ERR_DSC,
        st_gated: false,
        errors: SOFT_DESC_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::Trq,
        stat_addr: soft::GLBL_TRQ_ERR_STS,
        mask_addr: soft::GLBL_TRQ_ERR_MSK,
        all_mask: 0xF,
        glbl_mask: GLBL_ERR_TRQ,
        st_gated: false,
        errors: SOFT_TRQ_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::StC2h,
        stat_addr: soft::C2H_ERR_STAT,
        mask_addr: soft::C2H_ERR_MASK,
        all_mask: 0xFEDB,
        glbl_mask: GLBL_ERR_ST_C2H,
        st_gated: true,
        errors: SOFT_C2H_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::StC2hFatal,
        stat_addr: soft::C2H_FATAL_ERR_STAT,
        mask_addr: soft::C2H_FATAL_ERR_MASK,
        all_mask: 0x7_DF1B,
        glbl_mask: GLBL_ERR_ST_C2H,
        st_gated: true,
        errors: SOFT_C2H_FATAL_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::StH2c,
        stat_addr: soft::H2C_ERR_STAT,
        mask_addr: soft::H2C_ERR_MASK,
        all_mask: 0x1F,
        glbl_mask: GLBL_ERR_ST_H2C_SOFT,
        st_gated: true,
        errors: SOFT_H2C_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::RamSbe,
        stat_addr: soft::RAM_SBE_STS,
        mask_addr: soft::RAM_SBE_MSK,
        all_mask: 0xFFFF_FF11,
        glbl_mask: GLBL_ERR_RAM_SBE,
        st_gated: false,
        errors: SOFT_SBE_ERRORS,
    },
    LeafRecord {
        leaf: Leaf::RamDbe,
        stat_addr: soft::RAM_DBE_STS,
        mask_addr: soft::RAM_DBE_MSK,
        all_mask: 0xFFFF_FF11,
        glbl_mask: GLBL_ERR_RAM_DBE,
        st_gated: false,
        errors: SOFT_DBE_ERRORS,
    },
];

/// The leaf table of an IP variant.
pub fn leaf_table(variant: IpVariant) -> &'static [LeafRecord] {
    match variant {
        IpVariant::EqdmaSoft => EQDMA_LEAVES,
        _ => SOFT_LEAVES,
    }
}

/// Human-readable name of an error on a variant, if its silicon has it.
pub fn error_name(variant: IpVariant, index: ErrorIndex) -> Option<&'static str> {
    for leaf in leaf_table(variant) {
        for e in leaf.errors {
            if e.index == index {
                return Some(e.name);
            }
        }
    }
    None
}

/// Enables one error, or every error of every leaf. Enabling writes the
/// leaf mask bit(s) and sets the leaf's bit in the root mask. Streaming
/// leaves are skipped on devices without the streaming engine.
pub fn error_enable<B: QdmaBus>(
    dev: &Qdma<B>,
    sel: ErrorSel,
) -> Result<(), QdmaError> {
    let bus = dev.bus();
    let st_en = dev.attributes().st_en;

    match sel {
        ErrorSel::All => {
            for leaf in leaf_table(dev.variant()) {
                if leaf.st_gated && !st_en {
                    continue;
                }
                bus.reg_write(leaf.mask_addr, leaf.all_mask);

                let glbl = bus.reg_read(soft::GLBL_ERR_MASK);
                bus.reg_write(soft::GLBL_ERR_MASK, glbl | leaf.glbl_mask);
            }
            Ok(())
        }
        ErrorSel::One(index) => {
            for leaf in leaf_table(dev.variant()) {
                let Some(e) = leaf.errors.iter().find(|e| e.index == index)
                else {
                    continue;
                };
                if leaf.st_gated && !st_en {
                    // Not an error: the condition cannot fire here.
                    return Ok(());
                }
                let m = bus.reg_read(leaf.mask_addr);
                bus.reg_write(leaf.mask_addr, m | e.mask);

                let glbl = bus.reg_read(soft::GLBL_ERR_MASK);
                bus.reg_write(soft::GLBL_ERR_MASK, glbl | leaf.glbl_mask);
                return Ok(());
            }
            Err(QdmaError::InvalidParam)
        }
    }
}

/// Diagnostic registers dumped when a leaf fires.
fn leaf_dump_regs(variant: IpVariant, leaf: Leaf) -> &'static [(&'static str, u32)] {
    match leaf {
        Leaf::Desc => &[
            ("GLBL_DSC_ERR_STS", soft::GLBL_DSC_ERR_STS),
            ("GLBL_DSC_ERR_LOG0", soft::GLBL_DSC_ERR_LOG0),
            ("GLBL_DSC_ERR_LOG1", soft::GLBL_DSC_ERR_LOG1),
            ("GLBL_DSC_DBG_DAT0", soft::GLBL_DSC_DBG_DAT0),
            ("GLBL_DSC_DBG_DAT1", soft::GLBL_DSC_DBG_DAT1),
            ("GLBL_DSC_ERR_LOG2", soft::GLBL_DSC_ERR_LOG2),
        ],
        Leaf::Trq => &[
            ("GLBL_TRQ_ERR_STS", soft::GLBL_TRQ_ERR_STS),
            ("GLBL_TRQ_ERR_LOG", soft::GLBL_TRQ_ERR_LOG),
        ],
        Leaf::StC2h | Leaf::StC2hFatal => &[
            ("C2H_ERR_STAT", soft::C2H_ERR_STAT),
            ("C2H_FATAL_ERR_STAT", soft::C2H_FATAL_ERR_STAT),
            ("C2H_FIRST_ERR_QID", soft::C2H_FIRST_ERR_QID),
            ("C2H_STAT_S_AXIS_C2H_ACCEPTED", soft::C2H_STAT_S_AXIS_C2H_ACCEPTED),
            ("C2H_STAT_S_AXIS_WRB_ACCEPTED", soft::C2H_STAT_S_AXIS_CMPT_ACCEPTED),
            ("C2H_STAT_DESC_RSP_PKT_ACCEPTED", soft::C2H_STAT_DESC_RSP_PKT_ACCEPTED),
            ("C2H_STAT_AXIS_PKG_CMP", soft::C2H_STAT_AXIS_PKG_CMP),
            ("C2H_STAT_DBG_DMA_ENG_0", soft::C2H_STAT_DBG_DMA_ENG_0),
            ("C2H_STAT_DBG_DMA_ENG_1", soft::C2H_STAT_DBG_DMA_ENG_1),
            ("C2H_STAT_DBG_DMA_ENG_2", soft::C2H_STAT_DBG_DMA_ENG_2),
            ("C2H_STAT_DBG_DMA_ENG_3", soft::C2H_STAT_DBG_DMA_ENG_3),
            ("C2H_STAT_DESC_RSP_DROP_ACCEPTED", soft::C2H_STAT_DESC_RSP_DROP_ACCEPTED),
            ("C2H_STAT_DESC_RSP_ERR_ACCEPTED", soft::C2H_STAT_DESC_RSP_ERR_ACCEPTED),
        ],
        Leaf::StH2c => &[
            ("H2C_ERR_STAT", soft::H2C_ERR_STAT),
            ("H2C_FIRST_ERR_QID", soft::H2C_FIRST_ERR_QID),
            ("H2C_DBG_REG0", soft::H2C_DBG_REG0),
            ("H2C_DBG_REG1", soft::H2C_DBG_REG1),
            ("H2C_DBG_REG2", soft::H2C_DBG_REG2),
            ("H2C_DBG_REG3", soft::H2C_DBG_REG3),
            ("H2C_DBG_REG4", soft::H2C_DBG_REG4),
        ],
        Leaf::RamSbe | Leaf::RamSbe1 => {
            if variant == IpVariant::EqdmaSoft {
                &[
                    ("RAM_SBE_STS_A", soft::RAM_SBE_STS),
                    ("RAM_SBE_STS_1_A", eqdma::RAM_SBE_1_STS),
                ]
            } else {
                &[("RAM_SBE_STS_A", soft::RAM_SBE_STS)]
            }
        }
        Leaf::RamDbe | Leaf::RamDbe1 => {
            if variant == IpVariant::EqdmaSoft {
                &[
                    ("RAM_DBE_STS_A", soft::RAM_DBE_STS),
                    ("RAM_DBE_STS_1_A", eqdma::RAM_DBE_1_STS),
                ]
            } else {
                &[("RAM_DBE_STS_A", soft::RAM_DBE_STS)]
            }
        }
    }
}

/// Polls the error tree once. Returns whether anything fired.
///
/// Order per leaf: read status, dump diagnostics, name every set error,
/// write-1-to-clear the leaf. The root status is cleared last so a
/// condition that fires mid-walk is not lost.
pub fn error_process<B: QdmaBus>(dev: &Qdma<B>) -> Result<bool, QdmaError> {
    let bus = dev.bus();
    let st_en = dev.attributes().st_en;

    let glbl_err_stat = bus.reg_read(soft::GLBL_ERR_STAT);
    if glbl_err_stat == 0 {
        return Ok(false);
    }
    ringbuf_entry!(Trace::GlobalStatus(glbl_err_stat));

    for leaf in leaf_table(dev.variant()) {
        if leaf.st_gated && !st_en {
            continue;
        }
        if glbl_err_stat & leaf.glbl_mask == 0 {
            continue;
        }

        let err_stat = bus.reg_read(leaf.stat_addr);
        if err_stat == 0 {
            continue;
        }
        ringbuf_entry!(Trace::LeafStatus(leaf.leaf, err_stat));

        for (name, addr) in leaf_dump_regs(dev.variant(), leaf.leaf) {
            log_reg(dev, name, *addr);
        }

        for e in leaf.errors {
            if err_stat & e.mask != 0 {
                ringbuf_entry!(Trace::Detected(e.index));
                bus.log_error(e.name);
            }
        }

        bus.reg_write(leaf.stat_addr, err_stat);
    }

    bus.reg_write(soft::GLBL_ERR_STAT, glbl_err_stat);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_masks_within_all_mask() {
        // Two conditions are deliberately absent from their leaf's
        // enable-all mask and stay quiet unless armed individually: the
        // correctable header ECC and the internal CSR timeout.
        let quiet = [ErrorIndex::C2hHdrEccCor, ErrorIndex::TrqTcpCsrTimeout];
        for variant in [IpVariant::SoftQdma, IpVariant::EqdmaSoft] {
            for leaf in leaf_table(variant) {
                for e in leaf.errors {
                    if e.mask & !leaf.all_mask != 0 {
                        assert!(
                            quiet.contains(&e.index),
                            "{:?}/{:?}: {:#x} outside {:#x}",
                            leaf.leaf,
                            e.index,
                            e.mask,
                            leaf.all_mask
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn eqdma_has_nine_leaves() {
        assert_eq!(leaf_table(IpVariant::EqdmaSoft).len(), 9);
        assert_eq!(leaf_table(IpVariant::SoftQdma).len(), 7);
    }

    #[test]
    fn names_resolve_per_variant() {
        assert_eq!(
            error_name(IpVariant::EqdmaSoft, ErrorIndex::C2hMtyMismatch),
            Some("MTY mismatch error")
        );
        // Header ECC exists only on EQDMA.
        assert!(error_name(IpVariant::SoftQdma, ErrorIndex::C2hHdrEccUnc)
            .is_none());
        // The legacy CSI marker error exists only on the soft IP.
        assert!(error_name(IpVariant::EqdmaSoft, ErrorIndex::H2cCsiMop)
            .is_none());
    }
}
