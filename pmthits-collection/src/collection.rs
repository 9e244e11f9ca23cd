//! Per-event arena of hit records.
//!
//! Records live in a flat vector and are referenced by [`HitHandle`]. An
//! ordered map from sensor id to handle gives sensor-ordered iteration.
//! Clearing the collection at end of event moves every record into a
//! recycle pool; the next event reuses those allocations instead of
//! allocating a new record per sensor.

use crate::error::{Error, Result};
use pmthits_core::{HitRecord, PeakTracker};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;

/// Reference to a record of one event in a [`HitsCollection`].
///
/// Handles carry the event generation they were issued in and are rejected
/// once the collection has been cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitHandle {
    index: usize,
    generation: u32,
}

impl HitHandle {
    /// Slot of the record in the arena.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for HitHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{}", self.index, self.generation)
    }
}

/// Hit records of one event, keyed by sensor id.
#[derive(Debug)]
pub struct HitsCollection {
    records: Vec<HitRecord>,
    by_sensor: BTreeMap<i32, HitHandle>,
    pool: Vec<HitRecord>,
    generation: u32,
    peak: PeakTracker,
}

impl HitsCollection {
    /// Creates an empty collection whose records report to `peak`.
    #[must_use]
    pub fn new(peak: PeakTracker) -> Self {
        Self::with_capacity(0, peak)
    }

    /// Creates an empty collection with room for `capacity` sensors.
    #[must_use]
    pub fn with_capacity(capacity: usize, peak: PeakTracker) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            by_sensor: BTreeMap::new(),
            pool: Vec::new(),
            generation: 0,
            peak,
        }
    }

    /// The run's peak tracker.
    #[must_use]
    pub fn peak(&self) -> &PeakTracker {
        &self.peak
    }

    /// Number of sensors with a record in this event.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if no sensor has a record in this event.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of recycled records waiting for reuse.
    #[must_use]
    pub fn pooled(&self) -> usize {
        self.pool.len()
    }

    /// Returns the handle for `sensor_id`, creating its record if needed.
    pub fn get_or_insert(&mut self, sensor_id: i32) -> HitHandle {
        if let Some(&handle) = self.by_sensor.get(&sensor_id) {
            return handle;
        }

        let record = match self.pool.pop() {
            Some(record) => record.recycled(sensor_id),
            None => HitRecord::new(sensor_id, self.peak.clone()),
        };

        let handle = HitHandle {
            index: self.records.len(),
            generation: self.generation,
        };
        self.records.push(record);
        self.by_sensor.insert(sensor_id, handle);
        handle
    }

    /// Records one arrival at `sensor_id`, creating the record on first use.
    pub fn record_arrival(&mut self, sensor_id: i32, time: f32) -> HitHandle {
        let handle = self.get_or_insert(sensor_id);
        self.records[handle.index].record_arrival(time);
        handle
    }

    /// Handle of the record for `sensor_id`, if it exists in this event.
    #[must_use]
    pub fn handle(&self, sensor_id: i32) -> Option<HitHandle> {
        self.by_sensor.get(&sensor_id).copied()
    }

    fn check(&self, handle: HitHandle) -> Result<usize> {
        if handle.generation == self.generation && handle.index < self.records.len() {
            Ok(handle.index)
        } else {
            Err(Error::UnknownHandle(handle))
        }
    }

    /// Record behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHandle`] for handles from a previous event.
    pub fn get(&self, handle: HitHandle) -> Result<&HitRecord> {
        let index = self.check(handle)?;
        Ok(&self.records[index])
    }

    /// Mutable record behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownHandle`] for handles from a previous event.
    pub fn get_mut(&mut self, handle: HitHandle) -> Result<&mut HitRecord> {
        let index = self.check(handle)?;
        Ok(&mut self.records[index])
    }

    /// Record for `sensor_id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownSensor`] if the sensor has no record this event.
    pub fn by_sensor(&self, sensor_id: i32) -> Result<&HitRecord> {
        let handle = self
            .handle(sensor_id)
            .ok_or(Error::UnknownSensor(sensor_id))?;
        self.get(handle)
    }

    /// Iterates records in ascending sensor id order.
    pub fn iter(&self) -> impl Iterator<Item = &HitRecord> {
        self.by_sensor
            .values()
            .filter_map(|handle| self.records.get(handle.index))
    }

    pub(crate) fn records_mut(&mut self) -> &mut [HitRecord] {
        &mut self.records
    }

    /// Sorts the arrivals of every record, one record per task.
    pub fn sort_all(&mut self) {
        self.records.par_iter_mut().for_each(HitRecord::sort_arrivals);
    }

    /// Sum of arrivals over all sensors of the event.
    #[must_use]
    pub fn total_arrivals(&self) -> u64 {
        self.records
            .iter()
            .map(|record| u64::from(record.total_count()))
            .sum()
    }

    /// Largest per-sensor arrival count of this event.
    ///
    /// Computed from the records alone, without reading the shared tracker.
    #[must_use]
    pub fn peak_count(&self) -> u32 {
        self.records
            .iter()
            .map(HitRecord::total_count)
            .max()
            .unwrap_or(0)
    }

    /// Ends the event: all records move to the recycle pool and every
    /// outstanding handle becomes invalid.
    pub fn clear(&mut self) {
        log::debug!(
            "clearing event {}: recycling {} records",
            self.generation,
            self.records.len()
        );
        self.pool.append(&mut self.records);
        self.by_sensor.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}

impl<'a> IntoIterator for &'a HitsCollection {
    type Item = &'a HitRecord;
    type IntoIter = Box<dyn Iterator<Item = &'a HitRecord> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_or_insert_reuses_handle() {
        let mut hits = HitsCollection::new(PeakTracker::new());
        let a = hits.get_or_insert(12);
        let b = hits.get_or_insert(12);
        assert_eq!(a, b);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_record_arrival_creates_records() {
        let mut hits = HitsCollection::new(PeakTracker::new());
        hits.record_arrival(3, 10.0);
        hits.record_arrival(1, 5.0);
        hits.record_arrival(3, 7.0);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits.by_sensor(3).unwrap().total_count(), 2);
        assert_eq!(hits.by_sensor(1).unwrap().total_count(), 1);
        assert_eq!(hits.total_arrivals(), 3);
        assert_eq!(hits.peak_count(), 2);
        assert_eq!(hits.peak().get(), 2);
    }

    #[test]
    fn test_iter_sensor_order() {
        let mut hits = HitsCollection::new(PeakTracker::new());
        for sensor in [40, 2, 17, 9] {
            hits.record_arrival(sensor, 1.0);
        }
        let ids: Vec<i32> = hits.iter().map(HitRecord::sensor_id).collect();
        assert_eq!(ids, vec![2, 9, 17, 40]);
    }

    #[test]
    fn test_unknown_sensor() {
        let hits = HitsCollection::new(PeakTracker::new());
        assert!(matches!(hits.by_sensor(5), Err(Error::UnknownSensor(5))));
        assert!(hits.handle(5).is_none());
    }

    #[test]
    fn test_clear_invalidates_handles() {
        let mut hits = HitsCollection::new(PeakTracker::new());
        let handle = hits.record_arrival(8, 1.0);
        assert!(hits.get(handle).is_ok());

        hits.clear();
        assert!(hits.is_empty());
        assert_eq!(hits.pooled(), 1);
        assert!(matches!(hits.get(handle), Err(Error::UnknownHandle(h)) if h == handle));

        // Same slot, new event: the old handle is still rejected.
        let fresh = hits.record_arrival(8, 2.0);
        assert_eq!(fresh.index(), handle.index());
        assert!(hits.get(handle).is_err());
        assert!(hits.get(fresh).is_ok());
    }

    #[test]
    fn test_recycled_records_start_empty() {
        let mut hits = HitsCollection::new(PeakTracker::new());
        let handle = hits.record_arrival(1, 1.0);
        {
            let record = hits.get_mut(handle).unwrap();
            record.record_arrival(2.0);
            record.add_parent_id(4);
            record.set_track_id(9);
        }
        hits.clear();

        let handle = hits.record_arrival(6, 3.0);
        let record = hits.get(handle).unwrap();
        assert_eq!(hits.pooled(), 0);
        assert_eq!(record.sensor_id(), 6);
        assert_eq!(record.total_count(), 1);
        assert_eq!(record.arrival_times(), &[3.0]);
        assert!(record.parent_ids().is_empty());
        assert_eq!(record.track_id(), 0);
        // The run-wide peak survives the event boundary.
        assert_eq!(hits.peak().get(), 2);
        assert_eq!(hits.peak_count(), 1);
    }

    #[test]
    fn test_mutable_access_keeps_sensor_index() {
        let mut hits = HitsCollection::new(PeakTracker::new());
        let handle = hits.record_arrival(5, 1.0);
        {
            let record = hits.get_mut(handle).unwrap();
            record.set_track_id(9);
            record.record_arrival(2.0);
            record.add_parent_id(9);
            record.sort_arrivals();
        }
        assert_eq!(hits.by_sensor(5).unwrap().sensor_id(), 5);
        assert!(hits.by_sensor(9).is_err());
        let ids: Vec<i32> = hits.iter().map(HitRecord::sensor_id).collect();
        assert_eq!(ids, vec![5]);
    }

    #[test]
    fn test_sort_all() {
        let mut hits = HitsCollection::new(PeakTracker::new());
        for (sensor, t) in [(1, 9.0), (2, 4.0), (1, 3.0), (2, 1.0), (1, 6.0)] {
            hits.record_arrival(sensor, t);
        }
        hits.sort_all();
        assert_eq!(hits.by_sensor(1).unwrap().arrival_times(), &[3.0, 6.0, 9.0]);
        assert_eq!(hits.by_sensor(2).unwrap().arrival_times(), &[1.0, 4.0]);
    }
}
