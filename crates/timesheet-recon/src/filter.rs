use crate::record::{PrimaryRecord, ProductiveFlag, Status};
use crate::{Decimal, ReconcileConfig};

/// Which primary rows a stage of the run takes in.
#[derive(Debug, Clone, Copy)]
pub struct StatusPolicy<'a> {
    pub statuses: &'a [Status],
    pub skip_zero_hours: bool,
}

impl<'a> StatusPolicy<'a> {
    pub fn reconciliation(config: &'a ReconcileConfig) -> Self {
        StatusPolicy {
            statuses: &config.reconcile_statuses,
            skip_zero_hours: config.skip_zero_hours,
        }
    }

    pub fn flagged(config: &'a ReconcileConfig) -> Self {
        StatusPolicy {
            statuses: &config.flagged_statuses,
            skip_zero_hours: config.skip_zero_hours,
        }
    }

    pub fn admits(&self, record: &PrimaryRecord) -> bool {
        let hours_ok = match record.units_consumed {
            Some(hours) if self.skip_zero_hours => hours > Decimal::ZERO,
            Some(hours) => !hours.is_sign_negative(),
            None => false,
        };
        record.productive_flag == ProductiveFlag::Yes
            && self.statuses.contains(&record.status)
            && hours_ok
    }

    pub fn select<'r>(&self, records: &'r [PrimaryRecord]) -> Vec<&'r PrimaryRecord> {
        records.iter().filter(|record| self.admits(record)).collect()
    }
}
