use serde::Deserialize;

use crate::record::Status;
use crate::{Decimal, ReconcileError, Result};

/// Policy knobs of a reconciliation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    /// Length of the comparison window in days, counting the period start.
    pub window_days: u32,
    /// Discrepancies with an absolute value at or below this are noise.
    pub discrepancy_tolerance: Decimal,
    /// Statuses that are reconciled against the secondary system.
    pub reconcile_statuses: Vec<Status>,
    /// Statuses reported as flagged, without reconciliation.
    pub flagged_statuses: Vec<Status>,
    /// Leave out primary rows that consumed zero hours.
    pub skip_zero_hours: bool,
    pub columns: Columns,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            window_days: 7,
            discrepancy_tolerance: Decimal::new(1, 2),
            reconcile_statuses: vec![Status::Approved, Status::Posted],
            flagged_statuses: vec![Status::Open, Status::Returned, Status::Submitted],
            skip_zero_hours: true,
            columns: Columns::default(),
        }
    }
}

impl ReconcileConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window_days == 0 {
            return Err(ReconcileError::Config(
                "window_days must be at least 1".to_owned(),
            ));
        }
        if self.discrepancy_tolerance.is_sign_negative() {
            return Err(ReconcileError::Config(
                "discrepancy_tolerance must not be negative".to_owned(),
            ));
        }
        if let Some(status) = self
            .reconcile_statuses
            .iter()
            .find(|status| self.flagged_statuses.contains(status))
        {
            return Err(ReconcileError::Config(format!(
                "status '{status}' is both reconciled and flagged"
            )));
        }
        Ok(())
    }
}

/// Column and segment names of the three input exports.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Columns {
    pub resource_id: String,
    pub resource_name: String,
    pub productive_flag: String,
    pub status: String,
    pub time_period: String,
    pub units_consumed: String,

    pub active_segment: String,
    pub inactive_segment: String,
    pub staff_id: String,
    pub email: String,
    pub owner: String,

    pub user_email: String,
    pub entry_date: String,
    pub timesheet_period: String,
    pub billable_hours: String,
}

impl Default for Columns {
    fn default() -> Self {
        Columns {
            resource_id: "RESOURCEID".to_owned(),
            resource_name: "RESOURCE_NAME".to_owned(),
            productive_flag: "PROJECT_PRODUCTIVE_FLAG".to_owned(),
            status: "TSSTATUS".to_owned(),
            time_period: "TIMEPERIOD".to_owned(),
            units_consumed: "UNITS_CONSUMED".to_owned(),

            active_segment: "Offshore Active".to_owned(),
            inactive_segment: "Offshore Inactive".to_owned(),
            staff_id: "PS ID".to_owned(),
            email: "CG Email Id".to_owned(),
            owner: "P&L Owner new".to_owned(),

            user_email: "User Email".to_owned(),
            entry_date: "Entry Date".to_owned(),
            timesheet_period: "Timesheet Period".to_owned(),
            billable_hours: "Actual Billable Hours (Selected Dates)".to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        ReconcileConfig::default().validate().unwrap();
    }

    #[test]
    fn overlapping_policies_are_rejected() {
        let config = ReconcileConfig {
            flagged_statuses: vec![Status::Submitted, Status::Posted],
            ..ReconcileConfig::default()
        };
        let error = config.validate().unwrap_err();
        assert_eq!(
            error.to_string(),
            "invalid configuration: status 'Posted' is both reconciled and flagged"
        );
    }

    #[test]
    fn empty_window_is_rejected() {
        let config = ReconcileConfig {
            window_days: 0,
            ..ReconcileConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
