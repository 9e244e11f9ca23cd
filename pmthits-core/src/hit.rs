//! Per-sensor photo-hit record.
//!
//! A [`HitRecord`] accumulates the photon arrivals seen by one sensor during
//! one event and answers the two gate queries used to build trigger
//! decisions: the first arrival inside a window and the number of arrivals
//! inside a gate.
//!
//! # Ordering
//!
//! Arrivals are stored in insertion order until [`HitRecord::sort_arrivals`]
//! is called. Only the arrival times are reordered by a sort. The provenance
//! sequences (parent ids, photon start times and positions, photon end
//! positions) keep insertion order, so after a sort index `i` of a provenance
//! sequence no longer necessarily describes `arrival_time(i)`.

use crate::error::{Error, Result};
use crate::geometry::{Vec3, VolumeRef};
use crate::peak::PeakTracker;

/// One detected photon with its provenance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotonArrival {
    /// Arrival time at the sensor.
    pub time: f32,
    /// Primary particle the photon descends from.
    pub parent_id: i32,
    /// Photon creation time.
    pub start_time: f32,
    /// Photon creation point.
    pub start_position: Vec3,
    /// Point where the photon was absorbed.
    pub end_position: Vec3,
}

/// Arrivals and provenance recorded at one sensor during one event.
#[derive(Debug, Clone)]
pub struct HitRecord {
    sensor_id: i32,
    track_id: i32,
    energy_deposit: f64,
    position: Vec3,
    orientation: Vec3,
    volume: Option<VolumeRef>,

    arrival_times: Vec<f32>,
    parent_ids: Vec<i32>,
    photon_start_times: Vec<f32>,
    photon_start_positions: Vec<Vec3>,
    photon_end_positions: Vec<Vec3>,

    count_in_last_gate: u32,
    peak: PeakTracker,
}

fn at<T: Copy>(sequence: &'static str, values: &[T], index: usize) -> Result<T> {
    values.get(index).copied().ok_or(Error::IndexOutOfRange {
        sequence,
        index,
        len: values.len(),
    })
}

impl HitRecord {
    /// Creates an empty record for `sensor_id` attached to a run's peak tracker.
    #[must_use]
    pub fn new(sensor_id: i32, peak: PeakTracker) -> Self {
        Self {
            sensor_id,
            track_id: 0,
            energy_deposit: 0.0,
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            volume: None,
            arrival_times: Vec::new(),
            parent_ids: Vec::new(),
            photon_start_times: Vec::new(),
            photon_start_positions: Vec::new(),
            photon_end_positions: Vec::new(),
            count_in_last_gate: 0,
            peak,
        }
    }

    /// Empties the record and hands it to another sensor, keeping allocations.
    ///
    /// Takes the record by value, so a record borrowed out of a collection
    /// cannot be renamed in place.
    #[must_use]
    pub fn recycled(mut self, sensor_id: i32) -> Self {
        self.sensor_id = sensor_id;
        self.track_id = 0;
        self.energy_deposit = 0.0;
        self.position = Vec3::ZERO;
        self.orientation = Vec3::ZERO;
        self.volume = None;
        self.arrival_times.clear();
        self.parent_ids.clear();
        self.photon_start_times.clear();
        self.photon_start_positions.clear();
        self.photon_end_positions.clear();
        self.count_in_last_gate = 0;
        self
    }

    // Set-once descriptive fields. None of these are validated.

    pub fn set_track_id(&mut self, track_id: i32) {
        self.track_id = track_id;
    }

    pub fn set_energy_deposit(&mut self, energy: f64) {
        self.energy_deposit = energy;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_orientation(&mut self, orientation: Vec3) {
        self.orientation = orientation;
    }

    pub fn set_volume(&mut self, volume: VolumeRef) {
        self.volume = Some(volume);
    }

    #[must_use]
    pub fn sensor_id(&self) -> i32 {
        self.sensor_id
    }

    #[must_use]
    pub fn track_id(&self) -> i32 {
        self.track_id
    }

    #[must_use]
    pub fn energy_deposit(&self) -> f64 {
        self.energy_deposit
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn orientation(&self) -> Vec3 {
        self.orientation
    }

    #[must_use]
    pub fn volume(&self) -> Option<VolumeRef> {
        self.volume
    }

    /// The peak tracker this record reports to.
    #[must_use]
    pub fn peak(&self) -> &PeakTracker {
        &self.peak
    }

    /// Records one arrival and raises the run's peak count if needed.
    pub fn record_arrival(&mut self, time: f32) {
        self.arrival_times.push(time);
        self.peak.observe(self.total_count());
    }

    /// Records an arrival together with all of its provenance.
    pub fn record_photon(&mut self, photon: PhotonArrival) {
        self.record_arrival(photon.time);
        self.add_parent_id(photon.parent_id);
        self.add_photon_start_time(photon.start_time);
        self.add_photon_start_position(photon.start_position);
        self.add_photon_end_position(photon.end_position);
    }

    pub fn add_parent_id(&mut self, parent_id: i32) {
        self.parent_ids.push(parent_id);
    }

    pub fn add_photon_start_time(&mut self, time: f32) {
        self.photon_start_times.push(time);
    }

    pub fn add_photon_start_position(&mut self, position: Vec3) {
        self.photon_start_positions.push(position);
    }

    pub fn add_photon_end_position(&mut self, position: Vec3) {
        self.photon_end_positions.push(position);
    }

    /// Number of arrivals recorded so far, saturating at `u32::MAX`.
    #[inline]
    #[must_use]
    pub fn total_count(&self) -> u32 {
        u32::try_from(self.arrival_times.len()).unwrap_or(u32::MAX)
    }

    /// Result of the most recent [`count_in_window`](Self::count_in_window).
    #[inline]
    #[must_use]
    pub fn count_in_last_gate(&self) -> u32 {
        self.count_in_last_gate
    }

    #[must_use]
    pub fn arrival_times(&self) -> &[f32] {
        &self.arrival_times
    }

    #[must_use]
    pub fn parent_ids(&self) -> &[i32] {
        &self.parent_ids
    }

    #[must_use]
    pub fn photon_start_times(&self) -> &[f32] {
        &self.photon_start_times
    }

    #[must_use]
    pub fn photon_start_positions(&self) -> &[Vec3] {
        &self.photon_start_positions
    }

    #[must_use]
    pub fn photon_end_positions(&self) -> &[Vec3] {
        &self.photon_end_positions
    }

    /// The `index`-th arrival time in current storage order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] past the last arrival.
    pub fn arrival_time(&self, index: usize) -> Result<f32> {
        at("arrival_times", &self.arrival_times, index)
    }

    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] past the last recorded parent id.
    pub fn parent_id(&self, index: usize) -> Result<i32> {
        at("parent_ids", &self.parent_ids, index)
    }

    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] past the last recorded start time.
    pub fn photon_start_time(&self, index: usize) -> Result<f32> {
        at("photon_start_times", &self.photon_start_times, index)
    }

    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] past the last recorded start position.
    pub fn photon_start_position(&self, index: usize) -> Result<Vec3> {
        at("photon_start_positions", &self.photon_start_positions, index)
    }

    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfRange`] past the last recorded end position.
    pub fn photon_end_position(&self, index: usize) -> Result<Vec3> {
        at("photon_end_positions", &self.photon_end_positions, index)
    }

    /// Sorts the arrival times ascending. Provenance sequences are untouched.
    pub fn sort_arrivals(&mut self) {
        self.arrival_times.sort_by(f32::total_cmp);
    }

    /// True if the arrival times are in ascending order.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.arrival_times
            .windows(2)
            .all(|pair| pair[0].total_cmp(&pair[1]).is_le())
    }

    /// First arrival `t` in storage order with `low <= t <= high`.
    ///
    /// The scan follows the current storage order, so the result is the
    /// earliest matching arrival only after [`sort_arrivals`](Self::sort_arrivals).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] if `low > high` or a bound is NaN, and
    /// [`Error::NotFound`] if no arrival falls inside the window.
    pub fn first_arrival_in_window(&self, low: f32, high: f32) -> Result<f32> {
        if low.is_nan() || high.is_nan() || low > high {
            log::warn!(
                "sensor {}: first-arrival window [{low}, {high}] is inverted",
                self.sensor_id
            );
            return Err(Error::InvalidWindow {
                low: f64::from(low),
                high: f64::from(high),
            });
        }
        if log::log_enabled!(log::Level::Debug) && !self.is_sorted() {
            log::debug!(
                "sensor {}: first-arrival query on unsorted arrivals returns storage order",
                self.sensor_id
            );
        }

        self.arrival_times
            .iter()
            .copied()
            .find(|&t| low <= t && t <= high)
            .ok_or(Error::NotFound { low, high })
    }

    /// Counts arrivals with `low <= t <= min(pmt_gate_width, event_gate_width)`.
    ///
    /// The narrower gate width is compared directly against the arrival
    /// times as an absolute upper bound; it is not added to `low`. The count
    /// is cached and available from [`count_in_last_gate`](Self::count_in_last_gate).
    /// Sorting is not required.
    ///
    /// The bound is narrowed to `f32`, the precision arrivals are stored in,
    /// so an arrival equal to the gate width in `f32` is counted.
    #[allow(clippy::cast_possible_truncation)]
    pub fn count_in_window(
        &mut self,
        low: f64,
        pmt_gate_width: f64,
        event_gate_width: f64,
    ) -> u32 {
        let narrower = if pmt_gate_width < event_gate_width {
            pmt_gate_width
        } else {
            event_gate_width
        };
        let bound = f64::from(narrower as f32);

        if pmt_gate_width < 0.0
            || event_gate_width < 0.0
            || low.is_nan()
            || bound.is_nan()
            || bound < low
        {
            log::warn!(
                "sensor {}: gate [{low}, min({pmt_gate_width}, {event_gate_width})] is empty or negative",
                self.sensor_id
            );
        }

        let matches = self
            .arrival_times
            .iter()
            .map(|&t| f64::from(t))
            .filter(|&t| low <= t && t <= bound)
            .count();

        self.count_in_last_gate = u32::try_from(matches).unwrap_or(u32::MAX);
        self.count_in_last_gate
    }
}
