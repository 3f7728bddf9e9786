//! Reconciling primary timesheet lines against secondary project time actuals.

mod window;

pub use window::{SecondaryIndex, Window};

use std::collections::HashSet;

use crate::filter::StatusPolicy;
use crate::identity::{Identity, IdentityResolver};
use crate::parse;
use crate::record::{IdentityMapping, PrimaryRecord, SecondaryEntry};
use crate::report::{FlaggedRow, ReconciliationRow, Report};
use crate::{Decimal, Diagnostic, ReconcileConfig, Result, Table};

/// The three exports a run consumes, with the mapping split into its segments.
#[derive(Debug, Clone)]
pub struct InputTables {
    pub primary: Table,
    pub mapping_active: Table,
    pub mapping_inactive: Table,
    pub secondary: Table,
}

impl ReconcileConfig {
    /// Run the reconciliation. Fails only on structural problems such as a
    /// missing column; row-level problems end up in [`Report::diagnostics`].
    pub fn reconcile(&self, tables: &InputTables) -> Result<Report> {
        self.validate()?;

        let columns = &self.columns;
        let mut diagnostics: Vec<Diagnostic> = [
            &tables.primary,
            &tables.mapping_active,
            &tables.mapping_inactive,
            &tables.secondary,
        ]
        .into_iter()
        .flat_map(Table::encoding_diagnostics)
        .collect();

        let primary = PrimaryRecord::from_table(&tables.primary, columns, &mut diagnostics)?;
        let active = IdentityMapping::from_table(&tables.mapping_active, columns, &mut diagnostics)?;
        let inactive =
            IdentityMapping::from_table(&tables.mapping_inactive, columns, &mut diagnostics)?;
        let secondary = SecondaryEntry::from_table(&tables.secondary, columns, &mut diagnostics)?;
        tracing::debug!("{} primary rows, {} secondary rows", primary.len(), secondary.len());

        let resolver = IdentityResolver::new(
            [
                (columns.active_segment.as_str(), active),
                (columns.inactive_segment.as_str(), inactive),
            ],
            &mut diagnostics,
        );

        let reconcilable = StatusPolicy::reconciliation(self).select(&primary);
        let flagged = StatusPolicy::flagged(self).select(&primary);
        tracing::debug!(
            "{} rows to reconcile, {} flagged",
            reconcilable.len(),
            flagged.len()
        );

        report_unresolved(
            &resolver,
            reconcilable.iter().chain(&flagged).copied(),
            &mut diagnostics,
        );

        let index = SecondaryIndex::new(&secondary);
        let reconciliation = reconcilable
            .iter()
            .map(|record| {
                let identity = resolve(&resolver, record);
                let secondary_hours = self.matched_hours(&index, record, identity);
                aggregate(record, identity, secondary_hours)
            })
            .collect();

        let flagged = flagged
            .iter()
            .map(|record| flag(record, resolve(&resolver, record)))
            .collect();

        Ok(Report {
            reconciliation,
            flagged,
            diagnostics,
            tolerance: self.discrepancy_tolerance,
        })
    }

    fn matched_hours(
        &self,
        index: &SecondaryIndex<'_>,
        record: &PrimaryRecord,
        identity: Option<Identity<'_>>,
    ) -> Decimal {
        let Some(email) = identity.and_then(|identity| identity.email) else {
            return Decimal::ZERO;
        };
        let Some(window) = record
            .period_start
            .and_then(|start| Window::anchored_at(start, self.window_days))
        else {
            return Decimal::ZERO;
        };

        index
            .matching(&parse::email_key(email), window)
            .filter_map(|entry| entry.billable_hours)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }
}

fn resolve<'r>(resolver: &'r IdentityResolver, record: &PrimaryRecord) -> Option<Identity<'r>> {
    record
        .resource_id
        .as_deref()
        .and_then(|staff_id| resolver.resolve(staff_id))
}

fn aggregate(
    record: &PrimaryRecord,
    identity: Option<Identity<'_>>,
    secondary_hours: Decimal,
) -> ReconciliationRow {
    let primary_hours = record.units_consumed.unwrap_or_default();
    ReconciliationRow {
        name: record.resource_name.clone(),
        staff_id: record.resource_id.clone(),
        email: identity.and_then(|i| i.email).map(ToOwned::to_owned),
        owner: identity.and_then(|i| i.owner).map(ToOwned::to_owned),
        period_start: record.period_start,
        primary_hours,
        secondary_hours,
        discrepancy: primary_hours.saturating_sub(secondary_hours),
    }
}

fn flag(record: &PrimaryRecord, identity: Option<Identity<'_>>) -> FlaggedRow {
    FlaggedRow {
        name: record.resource_name.clone(),
        staff_id: record.resource_id.clone(),
        email: identity.and_then(|i| i.email).map(ToOwned::to_owned),
        owner: identity.and_then(|i| i.owner).map(ToOwned::to_owned),
        period_start: record.period_start,
        primary_hours: record.units_consumed.unwrap_or_default(),
        status: record.status.clone(),
    }
}

// One diagnostic per staff id, in order of first appearance.
fn report_unresolved<'r>(
    resolver: &IdentityResolver,
    records: impl IntoIterator<Item = &'r PrimaryRecord>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut seen = HashSet::new();
    for staff_id in records.into_iter().filter_map(|record| record.resource_id.as_deref()) {
        if resolver.resolve(staff_id).is_none() && seen.insert(staff_id) {
            diagnostics.push(Diagnostic::UnresolvedIdentity {
                staff_id: staff_id.to_owned(),
            });
        }
    }
}
