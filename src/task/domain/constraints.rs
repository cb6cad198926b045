//! Temporal constraints attached to tasks.

use super::{TaskDomainError, TimeResolution, Timestamp};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An `[earliest_time, latest_time]` window for a single timepoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TimeWindowData")]
pub struct TimepointConstraint {
    earliest_time: Timestamp,
    latest_time: Timestamp,
}

#[derive(Deserialize)]
struct TimeWindowData {
    earliest_time: Timestamp,
    latest_time: Timestamp,
}

impl TryFrom<TimeWindowData> for TimepointConstraint {
    type Error = TaskDomainError;

    fn try_from(data: TimeWindowData) -> Result<Self, Self::Error> {
        Self::new(data.earliest_time, data.latest_time)
    }
}

impl TimepointConstraint {
    /// Creates a time window.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::InvalidTimeWindow`] when `earliest_time`
    /// lies after `latest_time`.
    pub fn new(earliest_time: Timestamp, latest_time: Timestamp) -> Result<Self, TaskDomainError> {
        if earliest_time > latest_time {
            return Err(TaskDomainError::InvalidTimeWindow {
                earliest: earliest_time.to_string(),
                latest: latest_time.to_string(),
            });
        }
        Ok(Self {
            earliest_time,
            latest_time,
        })
    }

    /// Returns the earliest bound.
    #[must_use]
    pub const fn earliest_time(&self) -> &Timestamp {
        &self.earliest_time
    }

    /// Returns the latest bound.
    #[must_use]
    pub const fn latest_time(&self) -> &Timestamp {
        &self.latest_time
    }

    /// Expresses both bounds as offsets from a zero time point.
    ///
    /// Returns `(earliest_offset, latest_offset)` in `resolution` units.
    /// Bounds before the zero time point yield negative offsets.
    #[must_use]
    pub fn relative_to_ztp(&self, ztp: DateTime<Utc>, resolution: TimeResolution) -> (f64, f64) {
        (
            self.earliest_time.difference(ztp, resolution),
            self.latest_time.difference(ztp, resolution),
        )
    }
}

/// Running statistical estimate of a duration between two timepoints.
///
/// Both fields are `None` until the first statistical update arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InterTimepointConstraint {
    mean: Option<f64>,
    variance: Option<f64>,
}

impl InterTimepointConstraint {
    /// Creates an estimate with known statistics.
    #[must_use]
    pub const fn new(mean: f64, variance: f64) -> Self {
        Self {
            mean: Some(mean),
            variance: Some(variance),
        }
    }

    /// Creates an estimate with no statistics yet.
    #[must_use]
    pub const fn uninitialized() -> Self {
        Self {
            mean: None,
            variance: None,
        }
    }

    /// Replaces the running estimate. Previous values are not retained.
    pub const fn update(&mut self, mean: f64, variance: f64) {
        self.mean = Some(mean);
        self.variance = Some(variance);
    }

    /// Returns the mean, if known.
    #[must_use]
    pub const fn mean(&self) -> Option<f64> {
        self.mean
    }

    /// Returns the variance, if known.
    #[must_use]
    pub const fn variance(&self) -> Option<f64> {
        self.variance
    }

    /// Returns `true` once both statistics are set.
    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.mean.is_some() && self.variance.is_some()
    }

    /// Returns the standard deviation derived from the variance.
    #[must_use]
    pub fn standard_deviation(&self) -> Option<f64> {
        self.variance.map(f64::sqrt)
    }
}

/// Domain-specific temporal constraints carried by a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TemporalConstraints {
    /// Any number of unrelated time windows.
    General {
        /// Time windows in insertion order.
        timepoint_constraints: Vec<TimepointConstraint>,
    },
    /// Pickup window plus a travel-duration estimate.
    Transportation {
        /// Window within which the load must be picked up.
        pickup: TimepointConstraint,
        /// Estimated travel time from pickup to delivery.
        travel_time: InterTimepointConstraint,
    },
}

/// Constraints attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConstraints {
    hard: bool,
    temporal: TemporalConstraints,
}

impl TaskConstraints {
    /// Creates constraints with no time windows.
    #[must_use]
    pub const fn new(hard: bool) -> Self {
        Self {
            hard,
            temporal: TemporalConstraints::General {
                timepoint_constraints: Vec::new(),
            },
        }
    }

    /// Creates general constraints with the given time windows.
    #[must_use]
    pub const fn with_timepoints(hard: bool, timepoint_constraints: Vec<TimepointConstraint>) -> Self {
        Self {
            hard,
            temporal: TemporalConstraints::General {
                timepoint_constraints,
            },
        }
    }

    /// Creates transportation constraints with an uninitialized travel-time
    /// estimate.
    #[must_use]
    pub const fn transportation(hard: bool, pickup: TimepointConstraint) -> Self {
        Self {
            hard,
            temporal: TemporalConstraints::Transportation {
                pickup,
                travel_time: InterTimepointConstraint::uninitialized(),
            },
        }
    }

    /// Returns `true` when the constraints must not be violated.
    #[must_use]
    pub const fn hard(&self) -> bool {
        self.hard
    }

    /// Returns the temporal sub-constraints.
    #[must_use]
    pub const fn temporal(&self) -> &TemporalConstraints {
        &self.temporal
    }

    /// Returns every time window, in order.
    #[must_use]
    pub fn timepoints(&self) -> Vec<&TimepointConstraint> {
        match &self.temporal {
            TemporalConstraints::General {
                timepoint_constraints,
            } => timepoint_constraints.iter().collect(),
            TemporalConstraints::Transportation { pickup, .. } => vec![pickup],
        }
    }

    /// Returns the pickup window of a transportation task.
    #[must_use]
    pub const fn pickup(&self) -> Option<&TimepointConstraint> {
        match &self.temporal {
            TemporalConstraints::Transportation { pickup, .. } => Some(pickup),
            TemporalConstraints::General { .. } => None,
        }
    }

    /// Returns the travel-time estimate of a transportation task.
    #[must_use]
    pub const fn travel_time(&self) -> Option<&InterTimepointConstraint> {
        match &self.temporal {
            TemporalConstraints::Transportation { travel_time, .. } => Some(travel_time),
            TemporalConstraints::General { .. } => None,
        }
    }

    /// Replaces the travel-time estimate.
    ///
    /// Returns `false` and leaves the constraints untouched when they carry
    /// no travel-time estimate.
    pub const fn update_travel_time(&mut self, mean: f64, variance: f64) -> bool {
        match &mut self.temporal {
            TemporalConstraints::Transportation { travel_time, .. } => {
                travel_time.update(mean, variance);
                true
            }
            TemporalConstraints::General { .. } => false,
        }
    }
}
