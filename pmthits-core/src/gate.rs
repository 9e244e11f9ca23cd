//! Trigger gate windows and gate configuration.

use crate::error::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Closed time interval `[low, high]`; both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GateWindow {
    low: f32,
    high: f32,
}

impl GateWindow {
    /// Creates a window, rejecting inverted or NaN bounds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] if `low > high` or either bound is NaN.
    pub fn new(low: f32, high: f32) -> Result<Self> {
        if low.is_nan() || high.is_nan() || low > high {
            return Err(Error::InvalidWindow {
                low: f64::from(low),
                high: f64::from(high),
            });
        }
        Ok(Self { low, high })
    }

    /// Window of length `width` starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidWindow`] for a negative or NaN width.
    pub fn starting_at(start: f32, width: f32) -> Result<Self> {
        Self::new(start, start + width)
    }

    /// Lower bound.
    #[inline]
    #[must_use]
    pub fn low(&self) -> f32 {
        self.low
    }

    /// Upper bound.
    #[inline]
    #[must_use]
    pub fn high(&self) -> f32 {
        self.high
    }

    /// True if `t` lies inside the window, bounds included.
    #[inline]
    #[must_use]
    pub fn contains(&self, t: f32) -> bool {
        self.low <= t && t <= self.high
    }
}

/// Gate widths used when building trigger decisions for one event.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GateConfig {
    /// Sensor integration gate (ns).
    pub pmt_gate_width: f64,
    /// Event readout gate (ns).
    pub event_gate_width: f64,
    /// Span after the trigger time searched for the first arrival (ns).
    pub event_window: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            pmt_gate_width: 200.0,
            event_gate_width: 950.0,
            event_window: 950.0,
        }
    }
}

impl GateConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sensor gate width.
    #[must_use]
    pub fn with_pmt_gate_width(mut self, width: f64) -> Self {
        self.pmt_gate_width = width;
        self
    }

    /// Sets the event gate width.
    #[must_use]
    pub fn with_event_gate_width(mut self, width: f64) -> Self {
        self.event_gate_width = width;
        self
    }

    /// Sets the first-arrival search span.
    #[must_use]
    pub fn with_event_window(mut self, window: f32) -> Self {
        self.event_window = window;
        self
    }

    /// The narrower of the two gate widths.
    #[inline]
    #[must_use]
    pub fn gate_bound(&self) -> f64 {
        if self.pmt_gate_width < self.event_gate_width {
            self.pmt_gate_width
        } else {
            self.event_gate_width
        }
    }

    /// Checks that every width is a non-negative number.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        let widths = [
            ("pmt_gate_width", self.pmt_gate_width),
            ("event_gate_width", self.event_gate_width),
            ("event_window", f64::from(self.event_window)),
        ];
        for (name, value) in widths {
            if value.is_nan() || value < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_window_bounds_inclusive() {
        let window = GateWindow::new(2.0, 6.0).unwrap();
        assert!(window.contains(2.0));
        assert!(window.contains(6.0));
        assert!(window.contains(4.5));
        assert!(!window.contains(1.999));
        assert!(!window.contains(6.001));
    }

    #[test]
    fn test_degenerate_window() {
        let window = GateWindow::new(3.0, 3.0).unwrap();
        assert!(window.contains(3.0));
        assert!(!window.contains(3.5));
    }

    #[test]
    fn test_window_rejects_inverted_and_nan() {
        assert!(matches!(
            GateWindow::new(5.0, 1.0),
            Err(Error::InvalidWindow { .. })
        ));
        assert!(GateWindow::new(f32::NAN, 1.0).is_err());
        assert!(GateWindow::new(0.0, f32::NAN).is_err());
        assert!(GateWindow::starting_at(10.0, -1.0).is_err());
    }

    #[test]
    fn test_window_starting_at() {
        let window = GateWindow::starting_at(100.0, 950.0).unwrap();
        assert_relative_eq!(window.low(), 100.0);
        assert_relative_eq!(window.high(), 1050.0);
    }

    #[test]
    fn test_gate_config_builder() {
        let config = GateConfig::new()
            .with_pmt_gate_width(150.0)
            .with_event_gate_width(400.0)
            .with_event_window(500.0);

        assert_relative_eq!(config.pmt_gate_width, 150.0);
        assert_relative_eq!(config.event_gate_width, 400.0);
        assert_relative_eq!(config.event_window, 500.0);
        assert_relative_eq!(config.gate_bound(), 150.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_gate_config_validation() {
        let negative = GateConfig::new().with_pmt_gate_width(-1.0);
        assert!(matches!(
            negative.validate(),
            Err(Error::InvalidConfig(msg)) if msg.contains("pmt_gate_width")
        ));

        let nan = GateConfig::new().with_event_window(f32::NAN);
        assert!(nan.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_gate_config_from_json() {
        let json = r#"{"pmt_gate_width":120.0,"event_gate_width":800.0,"event_window":900.0}"#;
        let config: GateConfig = serde_json::from_str(json).unwrap();
        assert_relative_eq!(config.gate_bound(), 120.0);
    }
}
