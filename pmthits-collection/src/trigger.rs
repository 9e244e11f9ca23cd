//! Trigger gate evaluation across all sensors of an event.

use crate::collection::HitsCollection;
use crate::error::Result;
use pmthits_core::{Error as CoreError, GateConfig, GateWindow, HitRecord};
use rayon::prelude::*;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Gate results for one sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SensorGate {
    /// Sensor identifier.
    pub sensor_id: i32,
    /// Earliest arrival in `[trigger, trigger + event_window]`.
    pub first_time: Option<f32>,
    /// Arrivals counted by the sensor gate.
    pub count: u32,
}

/// Gate results for every sensor of one event, ordered by sensor id.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EventGateSummary {
    /// Trigger time the gates were opened at.
    pub trigger_time: f32,
    /// Per-sensor results.
    pub sensors: Vec<SensorGate>,
}

impl EventGateSummary {
    /// Result for `sensor_id`, if the sensor had a record.
    #[must_use]
    pub fn sensor(&self, sensor_id: i32) -> Option<&SensorGate> {
        self.sensors
            .binary_search_by_key(&sensor_id, |gate| gate.sensor_id)
            .ok()
            .map(|i| &self.sensors[i])
    }

    /// Sensors with at least one arrival counted by the gate.
    #[must_use]
    pub fn sensors_in_gate(&self) -> usize {
        self.sensors.iter().filter(|gate| gate.count > 0).count()
    }

    /// Sum of gate counts over all sensors.
    #[must_use]
    pub fn total_in_gate(&self) -> u64 {
        self.sensors.iter().map(|gate| u64::from(gate.count)).sum()
    }

    /// Earliest first-arrival time over all sensors.
    #[must_use]
    pub fn earliest(&self) -> Option<f32> {
        self.sensors
            .iter()
            .filter_map(|gate| gate.first_time)
            .min_by(f32::total_cmp)
    }
}

fn evaluate_sensor(
    hit: &mut HitRecord,
    trigger_time: f32,
    window: GateWindow,
    config: &GateConfig,
) -> Result<SensorGate> {
    let first_time = match hit.first_arrival_in_window(window.low(), window.high()) {
        Ok(t) => Some(t),
        Err(CoreError::NotFound { .. }) => None,
        Err(e) => return Err(e.into()),
    };
    let count = hit.count_in_window(
        f64::from(trigger_time),
        config.pmt_gate_width,
        config.event_gate_width,
    );

    Ok(SensorGate {
        sensor_id: hit.sensor_id(),
        first_time,
        count,
    })
}

/// Sorts every record of the event, then runs both gate queries per sensor.
///
/// The first-arrival search covers `[trigger_time, trigger_time + event_window]`.
/// The count uses `trigger_time` as lower bound and the narrower gate width
/// as absolute upper bound, exactly as [`HitRecord::count_in_window`] does.
///
/// # Errors
///
/// Returns a core error if `config` fails validation or the search window
/// cannot be formed from `trigger_time`.
pub fn evaluate_gates(
    hits: &mut HitsCollection,
    trigger_time: f32,
    config: &GateConfig,
) -> Result<EventGateSummary> {
    config.validate()?;
    let window = GateWindow::starting_at(trigger_time, config.event_window)?;

    hits.sort_all();
    let mut sensors = hits
        .records_mut()
        .par_iter_mut()
        .map(|hit| evaluate_sensor(hit, trigger_time, window, config))
        .collect::<Result<Vec<_>>>()?;
    sensors.sort_unstable_by_key(|gate| gate.sensor_id);

    log::trace!(
        "trigger at {trigger_time}: {} sensors, {} in gate",
        sensors.len(),
        sensors.iter().filter(|gate| gate.count > 0).count()
    );

    Ok(EventGateSummary {
        trigger_time,
        sensors,
    })
}
