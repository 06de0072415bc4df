// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Errors for the QDMA API.
//!
//! Every error has a stable negative wire code so PF dispatch can stuff a
//! failure into the one-byte status field of a mailbox response and the VF
//! can reconstruct it on the far side.

/// Mailbox-specific failures. Nested under [`QdmaError`] so transport and
/// protocol code can speak precisely while everything still funnels into
/// one error type at the API boundary.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MboxError {
    /// PF could not program the function map on the VF's behalf.
    FmapWriteFailed,
    /// Queue-range request could not be satisfied.
    NumQueues,
    /// Queue id outside the function's `[qbase, qbase+qmax)` range.
    InvalidQid,
    /// Requested ring size has no CSR table entry.
    InvalidRingSize,
    /// Requested buffer size has no CSR table entry.
    InvalidBufSize,
    /// Requested counter threshold has no CSR table entry.
    InvalidCounterThreshold,
    /// Requested timer threshold has no CSR table entry.
    InvalidTimerThreshold,
    /// Opcode not recognized by the receiver.
    InvalidMessage,
    /// Outbox still holds an unacknowledged message.
    SendBusy,
    /// Inbox empty.
    NoMessageIn,
    /// All 32 payload words read back zero: hardware mailbox fault.
    AllZeroMessage,
    /// Grouped register read produced nothing.
    RegReadFailed,
    /// Waiter exhausted its retry budget without seeing a response.
    Pipe,
}

/// An error returned from a QDMA core operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QdmaError {
    /// API precondition violated.
    InvalidParam,
    /// Allocation failure in the host.
    NoMemory,
    /// Indirect-context busy bit did not clear in time.
    BusyTimeout,
    /// Probe failed to find the config BAR.
    InvalidConfigBar,
    /// No legacy interrupt pending when one was expected.
    NoPendingLegacyIntr,
    /// Capability registers disagree with PCI enumeration.
    BarNotFound,
    /// Operation requires a capability this device lacks.
    FeatureNotSupported,
    /// Resource-manager entry already present.
    ResourceExists,
    /// Resource-manager entry missing.
    ResourceNotExists,
    /// Device entry already present.
    DevExists,
    /// Device entry missing.
    DevNotExists,
    /// Contiguous queue-range allocation failed.
    NoQueuesLeft,
    /// Active-queue counter would exceed the configured qmax.
    QmaxConfRejected,
    Mbox(MboxError),
}

impl From<MboxError> for QdmaError {
    fn from(e: MboxError) -> Self {
        Self::Mbox(e)
    }
}

impl QdmaError {
    /// Whether the caller may reasonably retry the failed operation.
    /// Busy-type conditions clear on their own; everything else needs a
    /// configuration or topology change first.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::BusyTimeout
                | Self::Mbox(MboxError::SendBusy)
                | Self::Mbox(MboxError::NoMessageIn)
        )
    }

    /// The negative wire code carried in a mailbox response status byte.
    pub fn code(&self) -> i8 {
        let n: i8 = match self {
            Self::InvalidParam => 1,
            Self::NoMemory => 2,
            Self::BusyTimeout => 3,
            Self::InvalidConfigBar => 4,
            Self::NoPendingLegacyIntr => 5,
            Self::BarNotFound => 6,
            Self::FeatureNotSupported => 7,
            Self::ResourceExists => 8,
            Self::ResourceNotExists => 9,
            Self::DevExists => 10,
            Self::DevNotExists => 11,
            Self::NoQueuesLeft => 12,
            Self::QmaxConfRejected => 13,
            Self::Mbox(m) => match m {
                MboxError::FmapWriteFailed => 14,
                MboxError::NumQueues => 15,
                MboxError::InvalidQid => 16,
                MboxError::InvalidRingSize => 17,
                MboxError::InvalidBufSize => 18,
                MboxError::InvalidCounterThreshold => 19,
                MboxError::InvalidTimerThreshold => 20,
                MboxError::InvalidMessage => 21,
                MboxError::SendBusy => 22,
                MboxError::NoMessageIn => 23,
                MboxError::AllZeroMessage => 24,
                MboxError::RegReadFailed => 25,
                MboxError::Pipe => 26,
            },
        };
        -n
    }

    /// Reconstructs an error from a wire code. `0` is success and maps to
    /// `None`; unknown codes collapse to `InvalidParam` rather than being
    /// silently dropped.
    pub fn from_code(code: i8) -> Option<Self> {
        if code >= 0 {
            return None;
        }
        Some(match -code {
            1 => Self::InvalidParam,
            2 => Self::NoMemory,
            3 => Self::BusyTimeout,
            4 => Self::InvalidConfigBar,
            5 => Self::NoPendingLegacyIntr,
            6 => Self::BarNotFound,
            7 => Self::FeatureNotSupported,
            8 => Self::ResourceExists,
            9 => Self::ResourceNotExists,
            10 => Self::DevExists,
            11 => Self::DevNotExists,
            12 => Self::NoQueuesLeft,
            13 => Self::QmaxConfRejected,
            14 => Self::Mbox(MboxError::FmapWriteFailed),
            15 => Self::Mbox(MboxError::NumQueues),
            16 => Self::Mbox(MboxError::InvalidQid),
            17 => Self::Mbox(MboxError::InvalidRingSize),
            18 => Self::Mbox(MboxError::InvalidBufSize),
            19 => Self::Mbox(MboxError::InvalidCounterThreshold),
            20 => Self::Mbox(MboxError::InvalidTimerThreshold),
            21 => Self::Mbox(MboxError::InvalidMessage),
            22 => Self::Mbox(MboxError::SendBusy),
            23 => Self::Mbox(MboxError::NoMessageIn),
            24 => Self::Mbox(MboxError::AllZeroMessage),
            25 => Self::Mbox(MboxError::RegReadFailed),
            26 => Self::Mbox(MboxError::Pipe),
            _ => Self::InvalidParam,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[QdmaError] = &[
        QdmaError::InvalidParam,
        QdmaError::NoMemory,
        QdmaError::BusyTimeout,
        QdmaError::InvalidConfigBar,
        QdmaError::NoPendingLegacyIntr,
        QdmaError::BarNotFound,
        QdmaError::FeatureNotSupported,
        QdmaError::ResourceExists,
        QdmaError::ResourceNotExists,
        QdmaError::DevExists,
        QdmaError::DevNotExists,
        QdmaError::NoQueuesLeft,
        QdmaError::QmaxConfRejected,
        QdmaError::Mbox(MboxError::FmapWriteFailed),
        QdmaError::Mbox(MboxError::NumQueues),
        QdmaError::Mbox(MboxError::InvalidQid),
        QdmaError::Mbox(MboxError::InvalidRingSize),
        QdmaError::Mbox(MboxError::InvalidBufSize),
        QdmaError::Mbox(MboxError::InvalidCounterThreshold),
        QdmaError::Mbox(MboxError::InvalidTimerThreshold),
        QdmaError::Mbox(MboxError::InvalidMessage),
        QdmaError::Mbox(MboxError::SendBusy),
        QdmaError::Mbox(MboxError::NoMessageIn),
        QdmaError::Mbox(MboxError::AllZeroMessage),
        QdmaError::Mbox(MboxError::RegReadFailed),
        QdmaError::Mbox(MboxError::Pipe),
    ];

    #[test]
    fn wire_codes_roundtrip() {
        for &e in ALL {
            let code = e.code();
            assert!(code < 0);
            assert_eq!(QdmaError::from_code(code), Some(e));
        }
    }

    #[test]
    fn wire_codes_unique() {
        for (i, a) in ALL.iter().enumerate() {
            for b in &ALL[i + 1..] {
                assert_ne!(a.code(), b.code(), "{a:?} vs {b:?}");
            }
        }
    }

    #[test]
    fn success_is_not_an_error() {
        assert_eq!(QdmaError::from_code(0), None);
        assert_eq!(QdmaError::from_code(5), None);
    }

    #[test]
    fn recoverability() {
        assert!(QdmaError::BusyTimeout.is_recoverable());
        assert!(QdmaError::Mbox(MboxError::SendBusy).is_recoverable());
        assert!(!QdmaError::NoQueuesLeft.is_recoverable());
        assert!(!QdmaError::Mbox(MboxError::AllZeroMessage).is_recoverable());
    }
}
