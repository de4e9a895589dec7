// 🎯 Goal Entity - savings target with manual contributions
//
// `current` only moves through `contribute`, which clamps at `target`.
// Reaching the target reports `reached_target` on that one contribution.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{FinanceError, FinanceResult};

/// Quick-add amounts offered next to every goal
pub const CONTRIBUTION_PRESETS: [f64; 2] = [100.0, 500.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GoalIcon {
    Shield,
    Car,
    Plane,
    Laptop,
    Target,
}

impl GoalIcon {
    /// Resolve an icon key, falling back to the target icon
    pub fn from_key(key: &str) -> Self {
        match key {
            "Shield" => GoalIcon::Shield,
            "Car" => GoalIcon::Car,
            "Plane" => GoalIcon::Plane,
            "Laptop" => GoalIcon::Laptop,
            _ => GoalIcon::Target,
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            GoalIcon::Shield => "🛡️",
            GoalIcon::Car => "🚗",
            GoalIcon::Plane => "✈️",
            GoalIcon::Laptop => "💻",
            GoalIcon::Target => "🎯",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub name: String,
    pub target: f64,
    pub current: f64,
    pub deadline: NaiveDate,
    /// Icon key ("Shield", "Car", ...); unknown keys render as a target
    pub icon: String,
    pub color: String,
}

/// Result of one contribution
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub previous: f64,
    pub current: f64,
    /// Amount actually added after clamping
    pub applied: f64,
    /// True only on the contribution that moved the goal onto its target
    pub reached_target: bool,
}

impl Goal {
    pub fn validate(&self) -> FinanceResult<()> {
        if self.target <= 0.0 || !self.target.is_finite() {
            return Err(FinanceError::ZeroGoalTarget(self.id.clone()));
        }
        if self.current > self.target {
            return Err(FinanceError::GoalAboveTarget {
                goal: self.id.clone(),
                current: self.current,
                target: self.target,
            });
        }
        Ok(())
    }

    pub fn icon(&self) -> GoalIcon {
        GoalIcon::from_key(&self.icon)
    }

    /// round(current / target × 100)
    pub fn percentage(&self) -> FinanceResult<u32> {
        self.validate()?;
        Ok((self.current.max(0.0) / self.target * 100.0).round() as u32)
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.target
    }

    pub fn remaining(&self) -> f64 {
        (self.target - self.current).max(0.0)
    }

    pub fn days_left(&self, today: NaiveDate) -> i64 {
        (self.deadline - today).num_days()
    }

    /// current = min(current + amount, target)
    pub fn contribute(&mut self, amount: f64) -> FinanceResult<Contribution> {
        if !amount.is_finite() || amount <= 0.0 {
            warn!(goal = %self.id, amount, "rejected contribution");
            return Err(FinanceError::InvalidContribution(amount));
        }
        self.validate()?;

        let previous = self.current;
        self.current = (self.current + amount).min(self.target);
        let reached_target = previous < self.target && self.current == self.target;

        info!(
            goal = %self.id,
            previous,
            current = self.current,
            reached_target,
            "goal contribution"
        );

        Ok(Contribution {
            previous,
            current: self.current,
            applied: self.current - previous,
            reached_target,
        })
    }
}
