//! Treatment report for recovery-model trajectories.

use std::fmt;

use serde::Serialize;

use super::model::{DAMAGED, HEALTHY, RECOVERY_THRESHOLD, STRESS};
use crate::error::SimError;
use crate::sim::Trajectory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecoverySummary {
    pub final_healthy: u64,
    pub final_damaged: u64,
    pub stress_level: u64,
    pub recovered: bool,
}

impl RecoverySummary {
    pub fn from_trajectory(trajectory: &Trajectory) -> Result<Self, SimError> {
        let read = |name: &str| {
            trajectory.final_value(name).ok_or_else(|| {
                SimError::InvalidArgument(format!("trajectory has no final value for '{name}'"))
            })
        };
        let final_damaged = read(DAMAGED)?;
        Ok(Self {
            final_healthy: read(HEALTHY)?,
            final_damaged,
            stress_level: read(STRESS)?,
            recovered: final_damaged < RECOVERY_THRESHOLD,
        })
    }

    pub fn status(&self) -> &'static str {
        if self.recovered {
            "COMPLETE RECOVERY"
        } else {
            "PARTIAL RECOVERY"
        }
    }
}

impl fmt::Display for RecoverySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(40);
        writeln!(f, "{rule}")?;
        writeln!(f, "TREATMENT REPORT")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "Final Healthy Tissue Count:  {}", self.final_healthy)?;
        writeln!(f, "Remaining Damaged Tissue:    {}", self.final_damaged)?;
        writeln!(f, "Stress Accumulated:          {}", self.stress_level)?;
        writeln!(f)?;
        write!(f, "STATUS: {}", self.status())?;
        if self.recovered {
            write!(f, "\nNote: patient requires immediate rest.")
        } else {
            write!(f, " - insufficient enzyme activity")
        }
    }
}

/// Ensemble-level view: how many members recovered, plus mean final counts.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleReport {
    pub members: usize,
    pub recovered: usize,
    pub mean_healthy: f64,
    pub mean_damaged: f64,
    pub mean_stress: f64,
}

impl EnsembleReport {
    pub fn from_summaries(summaries: &[RecoverySummary]) -> Self {
        let members = summaries.len();
        let mean = |f: fn(&RecoverySummary) -> u64| {
            if members == 0 {
                0.0
            } else {
                summaries.iter().map(|s| f(s) as f64).sum::<f64>() / members as f64
            }
        };
        Self {
            members,
            recovered: summaries.iter().filter(|s| s.recovered).count(),
            mean_healthy: mean(|s| s.final_healthy),
            mean_damaged: mean(|s| s.final_damaged),
            mean_stress: mean(|s| s.stress_level),
        }
    }

    pub fn recovered_fraction(&self) -> f64 {
        if self.members == 0 {
            0.0
        } else {
            self.recovered as f64 / self.members as f64
        }
    }
}

impl fmt::Display for EnsembleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "ensemble: {}/{} recovered ({:.1}%)",
            self.recovered,
            self.members,
            self.recovered_fraction() * 100.0
        )?;
        write!(
            f,
            "mean final: healthy={:.1} damaged={:.1} stress={:.1}",
            self.mean_healthy, self.mean_damaged, self.mean_stress
        )
    }
}
