//! Controls how the simulation time is advanced

use kdam::BarExt;
use serde::{Deserialize, Serialize};

use vessel_flow_concepts::TimeError;

/// A [TimeEvent] describes that a certain action is to be executed after the next iteration step.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Serialize)]
pub enum TimeEvent {
    /// Record a [Frame](crate::backend::serial::Frame) of the current state.
    Snapshot,
}

/// Represents the next time point which is returned by the [TimeStepper::advance] method.
///
/// The absolute time value $t$ is only used to drive the pulsatile phase of the flow and to
/// annotate results.
#[derive(Clone, Debug, PartialEq)]
pub struct NextTimePoint<F> {
    /// Time increment $dt$
    pub increment: F,
    /// Time value $t$
    pub time: F,
    /// Current iteration
    pub iteration: usize,
    /// Event at this iteration, or None
    pub event: Option<TimeEvent>,
}

/// Increments time of the simulation
pub trait TimeStepper<F> {
    /// Advances the time stepper to the next time point. Also returns if there is an event
    /// scheduled to take place and the next time value and iteration number
    #[must_use]
    fn advance(&mut self) -> Result<Option<NextTimePoint<F>>, TimeError>;

    /// Total number of iterations which this stepper will produce
    fn total_iterations(&self) -> usize;

    /// Creates a bar that tracks the simulation progress
    fn initialize_bar(&self) -> Result<kdam::Bar, TimeError>;

    /// Update a given bar to show the current simulation state
    #[allow(unused)]
    fn update_bar(&self, bar: &mut kdam::Bar) -> Result<(), std::io::Error>;
}

/// Time stepping with a fixed time length
///
/// Every tick of the simulation corresponds to one rendered frame which has a fixed duration.
/// ```
/// # use vessel_flow_core::time::{FixedStepsize, TimeStepper};
/// let dt = 1.0 / 60.0;
/// let mut time_stepper = FixedStepsize::from_snapshot_interval(0.0, dt, 600, 60).unwrap();
/// let next = time_stepper.advance().unwrap().unwrap();
/// assert_eq!(next.iteration, 1);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FixedStepsize<F> {
    // The stepsize which was fixed
    dt: F,
    t0: F,
    current_time: F,
    current_iteration: usize,
    maximum_iterations: usize,
    // Every n-th iteration emits a snapshot
    snapshot_interval: Option<usize>,
}

impl<F> FixedStepsize<F>
where
    F: num::Float + num::FromPrimitive,
{
    /// Construct the stepper from the initial time, increment and number of steps.
    /// No snapshot events are emitted.
    pub fn from_steps(t0: F, dt: F, n_steps: usize) -> Result<Self, TimeError> {
        Self::new(t0, dt, n_steps, None)
    }

    /// Construct the stepper from the initial time, increment, number of steps and the
    /// number of steps between two snapshots.
    pub fn from_snapshot_interval(
        t0: F,
        dt: F,
        n_steps: usize,
        snapshot_interval: usize,
    ) -> Result<Self, TimeError> {
        if snapshot_interval == 0 {
            return Err(TimeError(
                "Snapshot interval must be at least one step".to_owned(),
            ));
        }
        Self::new(t0, dt, n_steps, Some(snapshot_interval))
    }

    fn new(
        t0: F,
        dt: F,
        n_steps: usize,
        snapshot_interval: Option<usize>,
    ) -> Result<Self, TimeError> {
        if !t0.is_finite() {
            return Err(TimeError("Initial time point must be finite".to_owned()));
        }
        if !(dt.is_finite() && dt > F::zero()) {
            return Err(TimeError(format!(
                "Invalid time configuration! Time increment must be positive but has type {}",
                std::any::type_name::<F>()
            )));
        }
        Ok(Self {
            dt,
            t0,
            current_time: t0,
            current_iteration: 0,
            maximum_iterations: n_steps,
            snapshot_interval,
        })
    }

    /// Time value of the last iteration
    pub fn current_time(&self) -> F {
        self.current_time
    }
}

impl<F> TimeStepper<F> for FixedStepsize<F>
where
    F: num::Float + num::FromPrimitive,
{
    fn advance(&mut self) -> Result<Option<NextTimePoint<F>>, TimeError> {
        if self.current_iteration >= self.maximum_iterations {
            return Ok(None);
        }
        self.current_iteration += 1;
        self.current_time = F::from_usize(self.current_iteration).ok_or(TimeError(
            "Error when casting from usize to floating point value".to_owned(),
        ))? * self.dt
            + self.t0;
        let event = match self.snapshot_interval {
            Some(interval) if self.current_iteration % interval == 0 => Some(TimeEvent::Snapshot),
            _ => None,
        };
        Ok(Some(NextTimePoint {
            increment: self.dt,
            time: self.current_time,
            iteration: self.current_iteration,
            event,
        }))
    }

    fn total_iterations(&self) -> usize {
        self.maximum_iterations
    }

    fn initialize_bar(&self) -> Result<kdam::Bar, TimeError> {
        let bar_format = "\
        {desc}{percentage:3.0}%|{animation}| \
        {count}/{total} \
        [{elapsed}, \
        {rate:.2}{unit}/s{postfix}]";
        Ok(kdam::BarBuilder::default()
            .total(self.maximum_iterations)
            .bar_format(bar_format)
            .dynamic_ncols(true)
            .build()?)
    }

    fn update_bar(&self, bar: &mut kdam::Bar) -> Result<(), std::io::Error> {
        let _ = bar.update(1)?;
        Ok(())
    }
}

#[cfg(test)]
mod test_time_stepper {
    use super::*;

    #[test]
    fn initialization() -> Result<(), TimeError> {
        let time_stepper = FixedStepsize::from_steps(1.0, 0.2, 10)?;
        assert_eq!(1.0, time_stepper.current_time());
        assert_eq!(0.2, time_stepper.dt);
        assert_eq!(0, time_stepper.current_iteration);
        assert_eq!(10, time_stepper.total_iterations());
        Ok(())
    }

    #[test]
    fn reject_invalid_increment() {
        assert!(FixedStepsize::from_steps(0.0, 0.0, 10).is_err());
        assert!(FixedStepsize::from_steps(0.0, -0.1, 10).is_err());
        assert!(FixedStepsize::from_steps(f64::NAN, 0.1, 10).is_err());
        assert!(FixedStepsize::from_snapshot_interval(0.0, 0.1, 10, 0).is_err());
    }

    #[test]
    fn stepping() -> Result<(), TimeError> {
        let t0 = 1.0;
        let dt = 0.2;
        let mut time_stepper = FixedStepsize::from_snapshot_interval(t0, dt, 10, 5)?;
        for i in 1..11 {
            let next = time_stepper
                .advance()?
                .ok_or(TimeError("stepper ended early".to_owned()))?;
            assert_eq!(dt, next.increment);
            assert_eq!(t0 + i as f64 * dt, next.time);
            assert_eq!(i, next.iteration);
            if i % 5 == 0 {
                assert_eq!(Some(TimeEvent::Snapshot), next.event);
            } else {
                assert_eq!(None, next.event);
            }
        }
        assert_eq!(None, time_stepper.advance()?);
        Ok(())
    }

    #[test]
    fn stepping_single_precision() -> Result<(), TimeError> {
        let mut time_stepper = FixedStepsize::<f32>::from_steps(0.0, 1.0 / 60.0, 100)?;
        let mut count = 0;
        while let Some(next) = time_stepper.advance()? {
            assert_eq!(next.event, None);
            count += 1;
        }
        assert_eq!(count, 100);
        Ok(())
    }
}
