//! Stage identifiers and caller-supplied progress sinks.
//!
//! [`Cumulants::compute_all`](crate::cumulants::engine::Cumulants::compute_all)
//! runs its stages in a fixed order and notifies a [`ProgressSink`] after each
//! one. The sink is the only observable side effect of the pipeline besides
//! `tracing` events.
use std::cell::RefCell;

use tracing::info;

/// One named array produced by the cumulant session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Integrated covariance `C`.
    Covariance,
    /// Third-moment tensor `E_c`.
    ThirdMoment,
    /// Integrated lag intensity `J`.
    IntegratedIntensity,
    /// Empirical third cumulant `K_c`.
    ThirdCumulant,
    /// Theoretical covariance `C_th`.
    TheoreticalCovariance,
    /// Theoretical third cumulant `K_c_th`.
    TheoreticalThirdCumulant,
    /// Every stage requested by `compute_all` has finished.
    All,
}

impl Stage {
    /// Short array name as used in the estimator literature.
    pub fn label(&self) -> &'static str {
        match self {
            Stage::Covariance => "C",
            Stage::ThirdMoment => "E_c",
            Stage::IntegratedIntensity => "J",
            Stage::ThirdCumulant => "K_c",
            Stage::TheoreticalCovariance => "C_th",
            Stage::TheoreticalThirdCumulant => "K_c_th",
            Stage::All => "all",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Receiver of stage-completion notifications.
pub trait ProgressSink {
    fn stage_completed(&self, stage: Stage);
}

/// Emits one `info` event per completed stage.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn stage_completed(&self, stage: Stage) {
        match stage {
            Stage::All => info!("all cumulants are computed"),
            _ => info!(stage = stage.label(), "cumulant stage computed"),
        }
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {
    fn stage_completed(&self, _stage: Stage) {}
}

/// Records the completed stages in order.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    stages: RefCell<Vec<Stage>>,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> Vec<Stage> {
        self.stages.borrow().clone()
    }
}

impl ProgressSink for RecordingProgress {
    fn stage_completed(&self, stage: Stage) {
        self.stages.borrow_mut().push(stage);
    }
}

impl<F: Fn(Stage)> ProgressSink for F {
    fn stage_completed(&self, stage: Stage) {
        self(stage)
    }
}
