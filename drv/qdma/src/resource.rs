// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Queue-range resource manager.
//!
//! One process-wide table tracks, for every `(dma_device_index,
//! func_id)` pair, the contiguous queue range the function owns and how
//! many queues of each type it currently has active. The manager
//! guarantees ranges never overlap and active counts never exceed the
//! configured range.
//!
//! The whole structure lives behind one lock; queries copy values out
//! under the lock and release it before the caller consumes them. The
//! host creates one `ResourceManager` at driver-root scope and hands it
//! down by reference.

use drv_qdma_api::{QdmaError, QueueType};
use fixedmap::FixedMap;
use spin::Mutex;

/// Maximum DMA devices (PCIe endpoints) tracked at once.
pub const MAX_DMA_DEVICES: usize = 8;

/// Maximum functions tracked across all devices: 4 PFs plus 252 VFs per
/// endpoint is the silicon limit, and one endpoint dominates in
/// practice.
pub const MAX_FUNCTIONS: usize = 256;

/// Sentinel for a function whose range has not been allocated yet.
const QBASE_UNASSIGNED: i32 = -1;

#[derive(Copy, Clone, Debug, Default)]
struct FnEntry {
    qbase: i32,
    qmax: u32,
    active: [u32; QueueType::COUNT],
}

impl FnEntry {
    fn range(&self) -> Option<(u32, u32)> {
        if self.qbase < 0 || self.qmax == 0 {
            None
        } else {
            Some((self.qbase as u32, self.qbase as u32 + self.qmax))
        }
    }

    fn total_active(&self) -> u32 {
        self.active.iter().sum()
    }
}

#[derive(Copy, Clone, Debug)]
struct DeviceEntry {
    /// Total queues on the device: the allocatable pool is `[0, num_qs)`.
    num_qs: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueueRange {
    InRange,
    OutOfRange,
}

struct Inner {
    devices: FixedMap<u32, DeviceEntry, MAX_DMA_DEVICES>,
    funcs: FixedMap<(u32, u16), FnEntry, MAX_FUNCTIONS>,
}

pub struct ResourceManager {
    inner: Mutex<Inner>,
}

impl Default for ResourceManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceManager {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                devices: FixedMap::default(),
                funcs: FixedMap::default(),
            }),
        }
    }

    /// Registers a DMA device and its queue pool. Called by the master
    /// PF at probe.
    pub fn create_device(
        &self,
        dev_idx: u32,
        num_qs: u32,
    ) -> Result<(), QdmaError> {
        let mut inner = self.inner.lock();
        if inner.devices.get(dev_idx).is_some() {
            return Err(QdmaError::ResourceExists);
        }
        inner
            .devices
            .try_insert(dev_idx, DeviceEntry { num_qs })
            .map_err(|_| QdmaError::NoMemory)
    }

    /// Removes a DMA device and all its function entries.
    pub fn destroy_device(&self, dev_idx: u32) {
        let mut inner = self.inner.lock();
        inner.devices.remove(dev_idx);

        // remove() compacts, so restart the scan after each hit.
        loop {
            let victim =
                inner.funcs.iter().map(|(k, _)| k).find(|k| k.0 == dev_idx);
            match victim {
                Some(k) => {
                    inner.funcs.remove(k);
                }
                None => break,
            }
        }
    }

    /// Creates a function entry with no queue range. Fails with
    /// `DevExists` if the function is already registered.
    pub fn create_entry(
        &self,
        dev_idx: u32,
        func_id: u16,
    ) -> Result<(), QdmaError> {
        let mut inner = self.inner.lock();
        if inner.devices.get(dev_idx).is_none() {
            return Err(QdmaError::DevNotExists);
        }
        if inner.funcs.get((dev_idx, func_id)).is_some() {
            return Err(QdmaError::DevExists);
        }
        inner
            .funcs
            .try_insert(
                (dev_idx, func_id),
                FnEntry {
                    qbase: QBASE_UNASSIGNED,
                    ..Default::default()
                },
            )
            .map_err(|_| QdmaError::NoMemory)
    }

    pub fn destroy_entry(&self, dev_idx: u32, func_id: u16) {
        self.inner.lock().funcs.remove((dev_idx, func_id));
    }

    /// Allocates a contiguous range of `requested_qmax` queues for the
    /// function, disjoint from every other function's range on the same
    /// device, and writes the chosen base into `*qbase`. First fit at
    /// the lowest free base.
    pub fn update(
        &self,
        dev_idx: u32,
        func_id: u16,
        requested_qmax: u32,
        qbase: &mut i32,
    ) -> Result<(), QdmaError> {
        let mut inner = self.inner.lock();
        let num_qs = inner
            .devices
            .get(dev_idx)
            .ok_or(QdmaError::DevNotExists)?
            .num_qs;

        let entry = inner
            .funcs
            .get(( dev_idx, func_id))
            .ok_or(QdmaError::ResourceNotExists)?;

        // Resizing out from under live queues would orphan them.
        if entry.total_active() != 0 {
            return Err(QdmaError::QmaxConfRejected);
        }

        if requested_qmax == 0 {
            let mut e = entry;
            e.qbase = QBASE_UNASSIGNED;
            e.qmax = 0;
            // Key is present, so this cannot fail.
            let _ = inner.funcs.try_insert((dev_idx, func_id), e);
            *qbase = QBASE_UNASSIGNED;
            return Ok(());
        }

        if requested_qmax > num_qs {
            return Err(QdmaError::NoQueuesLeft);
        }

        // First-fit scan: start at 0 and hop over every conflicting
        // range until the candidate fits or falls off the pool.
        let mut base: u32 = 0;
        'search: while base + requested_qmax <= num_qs {
            for (k, other) in inner.funcs.iter() {
                if k.0 != dev_idx || k.1 == func_id {
                    continue;
                }
                if let Some((lo, hi)) = other.range() {
                    let end = base + requested_qmax;
                    if base < hi && lo < end {
                        base = hi;
                        continue 'search;
                    }
                }
            }
            // No conflicts at this base.
            let mut e = entry;
            e.qbase = base as i32;
            e.qmax = requested_qmax;
            let _ = inner.funcs.try_insert((dev_idx, func_id), e);
            *qbase = base as i32;
            return Ok(());
        }

        Err(QdmaError::NoQueuesLeft)
    }

    /// Reads back the `(qbase, qmax)` of a function.
    pub fn qinfo(
        &self,
        dev_idx: u32,
        func_id: u16,
    ) -> Result<(i32, u32), QdmaError> {
        let inner = self.inner.lock();
        let e = inner
            .funcs
            .get((dev_idx, func_id))
            .ok_or(QdmaError::ResourceNotExists)?;
        Ok((e.qbase, e.qmax))
    }

    /// Whether a hardware queue id falls inside the function's range.
    pub fn is_queue_in_range(
        &self,
        dev_idx: u32,
        func_id: u16,
        qid_hw: u16,
    ) -> QueueRange {
        let inner = self.inner.lock();
        match inner.funcs.get((dev_idx, func_id)).and_then(|e| e.range()) {
            Some((lo, hi)) if (lo..hi).contains(&u32::from(qid_hw)) => {
                QueueRange::InRange
            }
            _ => QueueRange::OutOfRange,
        }
    }

    /// Accounts one more active queue of the given type. Fails without
    /// changing anything if the function would exceed its range.
    pub fn increment_active_queue(
        &self,
        dev_idx: u32,
        func_id: u16,
        q_type: QueueType,
    ) -> Result<(), QdmaError> {
        let mut inner = self.inner.lock();
        let e = inner
            .funcs
            .get_mut((dev_idx, func_id))
            .ok_or(QdmaError::ResourceNotExists)?;
        let slot = &mut e.active[q_type as usize];
        if *slot >= e.qmax {
            return Err(QdmaError::QmaxConfRejected);
        }
        *slot += 1;
        Ok(())
    }

    /// Accounts one fewer active queue of the given type.
    pub fn decrement_active_queue(
        &self,
        dev_idx: u32,
        func_id: u16,
        q_type: QueueType,
    ) -> Result<(), QdmaError> {
        let mut inner = self.inner.lock();
        let e = inner
            .funcs
            .get_mut((dev_idx, func_id))
            .ok_or(QdmaError::ResourceNotExists)?;
        let slot = &mut e.active[q_type as usize];
        if *slot == 0 {
            return Err(QdmaError::QmaxConfRejected);
        }
        *slot -= 1;
        Ok(())
    }

    /// Current active count for one function and queue type.
    pub fn active_queue_count(
        &self,
        dev_idx: u32,
        func_id: u16,
        q_type: QueueType,
    ) -> u32 {
        let inner = self.inner.lock();
        inner
            .funcs
            .get((dev_idx, func_id))
            .map(|e| e.active[q_type as usize])
            .unwrap_or(0)
    }

    /// Snapshot of all allocated ranges on one device, for diagnostics
    /// and tests. Copies out under the lock.
    pub fn ranges(
        &self,
        dev_idx: u32,
        out: &mut [(u16, u32, u32)],
    ) -> usize {
        let inner = self.inner.lock();
        let mut n = 0;
        for (k, e) in inner.funcs.iter() {
            if k.0 != dev_idx {
                continue;
            }
            if let Some((lo, hi)) = e.range() {
                if n < out.len() {
                    out[n] = (k.1, lo, hi - lo);
                    n += 1;
                }
            }
        }
        n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mgr() -> ResourceManager {
        let rm = ResourceManager::new();
        rm.create_device(0, 64).unwrap();
        rm
    }

    #[test]
    fn entry_lifecycle() {
        let rm = mgr();
        rm.create_entry(0, 5).unwrap();
        assert_eq!(rm.create_entry(0, 5), Err(QdmaError::DevExists));
        assert_eq!(rm.qinfo(0, 5), Ok((-1, 0)));

        rm.destroy_entry(0, 5);
        assert_eq!(rm.qinfo(0, 5), Err(QdmaError::ResourceNotExists));
    }

    #[test]
    fn entry_needs_device() {
        let rm = ResourceManager::new();
        assert_eq!(rm.create_entry(3, 0), Err(QdmaError::DevNotExists));
    }

    #[test]
    fn ranges_do_not_overlap() {
        let rm = mgr();
        let mut qbase = -1;

        rm.create_entry(0, 0).unwrap();
        rm.create_entry(0, 1).unwrap();
        rm.create_entry(0, 2).unwrap();

        rm.update(0, 0, 16, &mut qbase).unwrap();
        assert_eq!(qbase, 0);
        rm.update(0, 1, 16, &mut qbase).unwrap();
        assert_eq!(qbase, 16);
        rm.update(0, 2, 32, &mut qbase).unwrap();
        assert_eq!(qbase, 32);

        // Pool is now exhausted.
        rm.create_entry(0, 3).unwrap();
        assert_eq!(
            rm.update(0, 3, 1, &mut qbase),
            Err(QdmaError::NoQueuesLeft)
        );

        // Freeing the middle range makes its hole reusable.
        rm.update(0, 1, 0, &mut qbase).unwrap();
        rm.update(0, 3, 8, &mut qbase).unwrap();
        assert_eq!(qbase, 16);
    }

    #[test]
    fn oversized_request_fails() {
        let rm = mgr();
        let mut qbase = -1;
        rm.create_entry(0, 0).unwrap();
        assert_eq!(
            rm.update(0, 0, 65, &mut qbase),
            Err(QdmaError::NoQueuesLeft)
        );
        // The entry is untouched.
        assert_eq!(rm.qinfo(0, 0), Ok((-1, 0)));
    }

    #[test]
    fn queue_range_check() {
        let rm = mgr();
        let mut qbase = -1;
        rm.create_entry(0, 7).unwrap();
        rm.update(0, 7, 8, &mut qbase).unwrap();

        assert_eq!(rm.is_queue_in_range(0, 7, 0), QueueRange::InRange);
        assert_eq!(rm.is_queue_in_range(0, 7, 7), QueueRange::InRange);
        assert_eq!(rm.is_queue_in_range(0, 7, 8), QueueRange::OutOfRange);
        assert_eq!(rm.is_queue_in_range(0, 9, 0), QueueRange::OutOfRange);
    }

    #[test]
    fn active_counters_saturate_at_qmax() {
        let rm = mgr();
        let mut qbase = -1;
        rm.create_entry(0, 1).unwrap();
        rm.update(0, 1, 2, &mut qbase).unwrap();

        rm.increment_active_queue(0, 1, QueueType::H2c).unwrap();
        rm.increment_active_queue(0, 1, QueueType::H2c).unwrap();
        assert_eq!(
            rm.increment_active_queue(0, 1, QueueType::H2c),
            Err(QdmaError::QmaxConfRejected)
        );
        assert_eq!(rm.active_queue_count(0, 1, QueueType::H2c), 2);

        // Each direction is tracked separately.
        rm.increment_active_queue(0, 1, QueueType::C2h).unwrap();
        assert_eq!(rm.active_queue_count(0, 1, QueueType::C2h), 1);

        rm.decrement_active_queue(0, 1, QueueType::H2c).unwrap();
        assert_eq!(rm.active_queue_count(0, 1, QueueType::H2c), 1);
    }

    #[test]
    fn decrement_below_zero_fails() {
        let rm = mgr();
        let mut qbase = -1;
        rm.create_entry(0, 1).unwrap();
        rm.update(0, 1, 2, &mut qbase).unwrap();
        assert_eq!(
            rm.decrement_active_queue(0, 1, QueueType::Cmpt),
            Err(QdmaError::QmaxConfRejected)
        );
    }

    #[test]
    fn resize_with_active_queues_rejected() {
        let rm = mgr();
        let mut qbase = -1;
        rm.create_entry(0, 1).unwrap();
        rm.update(0, 1, 4, &mut qbase).unwrap();
        rm.increment_active_queue(0, 1, QueueType::H2c).unwrap();
        assert_eq!(
            rm.update(0, 1, 8, &mut qbase),
            Err(QdmaError::QmaxConfRejected)
        );
    }

    #[test]
    fn device_destroy_drops_functions() {
        let rm = mgr();
        rm.create_entry(0, 1).unwrap();
        rm.create_entry(0, 2).unwrap();
        rm.destroy_device(0);
        assert_eq!(rm.qinfo(0, 1), Err(QdmaError::ResourceNotExists));
        assert_eq!(rm.create_entry(0, 1), Err(QdmaError::DevNotExists));
    }
}
