// 🔔 Alert Entity - dashboard notices and the local board holding them

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{info, warn};

use crate::error::{FinanceError, FinanceResult, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Warning,
    Info,
    Success,
}

impl AlertType {
    pub const ALL: [AlertType; 3] = [AlertType::Warning, AlertType::Info, AlertType::Success];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::Warning => "warning",
            AlertType::Info => "info",
            AlertType::Success => "success",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AlertType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "warning" => Ok(AlertType::Warning),
            "info" => Ok(AlertType::Info),
            "success" => Ok(AlertType::Success),
            other => Err(ParseError::AlertType(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub title: String,
    pub message: String,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Number of alerts per type (the three tiles of the alerts page)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub warning: usize,
    pub info: usize,
    pub success: usize,
}

/// Local, non-persistent copy of the alert list
#[derive(Debug, Clone, Default)]
pub struct AlertBoard {
    alerts: Vec<Alert>,
}

impl AlertBoard {
    pub fn new(alerts: Vec<Alert>) -> Self {
        AlertBoard { alerts }
    }

    pub fn all(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }

    /// Alerts of one type, or all of them when `alert_type` is None
    pub fn filter(&self, alert_type: Option<AlertType>) -> Vec<&Alert> {
        self.alerts
            .iter()
            .filter(|a| alert_type.map_or(true, |t| a.alert_type == t))
            .collect()
    }

    pub fn count(&self, alert_type: AlertType) -> usize {
        self.alerts.iter().filter(|a| a.alert_type == alert_type).count()
    }

    pub fn counts(&self) -> AlertCounts {
        AlertCounts {
            warning: self.count(AlertType::Warning),
            info: self.count(AlertType::Info),
            success: self.count(AlertType::Success),
        }
    }

    /// Remove an alert from the board and hand it back
    pub fn dismiss(&mut self, id: &str) -> FinanceResult<Alert> {
        let index = self
            .alerts
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| {
                warn!(alert = id, "dismiss for unknown alert");
                FinanceError::AlertNotFound(id.to_string())
            })?;

        let removed = self.alerts.remove(index);
        info!(alert = %removed.id, kind = %removed.alert_type, "alert dismissed");
        Ok(removed)
    }
}
