//! Advisory data-quality diagnostics. None of them block computation.

use crate::aggregate::{self, Activity, Labeled};
use crate::errors::MetricError;
use crate::models::{Dataset, PeriodField, PeriodRecord, RecordSet, ShareRecord, rated_periods};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    ShareTotal,
    ShareMismatch,
    /// An inactive period carries a success rate instead of none.
    InactiveRate,
    /// An active period in a rated series has no success rate.
    MissingRate,
    MeanModeDivergence,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataQualityWarning {
    pub set: RecordSet,
    pub kind: WarningKind,
    pub detail: String,
}

pub fn check_share_total(
    set: RecordSet,
    shares: impl IntoIterator<Item = f64>,
    tolerance: f64,
) -> Option<DataQualityWarning> {
    let mut rows = 0usize;
    let total: f64 = shares.into_iter().inspect(|_| rows += 1).sum();
    if rows == 0 || (total - 100.0).abs() <= tolerance {
        return None;
    }
    Some(DataQualityWarning {
        set,
        kind: WarningKind::ShareTotal,
        detail: format!("shares sum to {total:.2}%, expected 100% +/- {tolerance}"),
    })
}

pub fn check_recorded_shares<R, S, B>(
    set: RecordSet,
    records: &[R],
    recorded: S,
    basis: B,
    tolerance: f64,
) -> Vec<DataQualityWarning>
where
    R: Labeled,
    S: Fn(&R) -> f64,
    B: Fn(&R) -> f64,
{
    let total = aggregate::sum(records, &basis);
    records
        .iter()
        .filter_map(|record| {
            let computed = aggregate::percent_of_total(basis(record), total, 2).ok()?;
            let stated = recorded(record);
            ((computed - stated).abs() > tolerance).then(|| DataQualityWarning {
                set,
                kind: WarningKind::ShareMismatch,
                detail: format!(
                    "'{}' records {stated:.2}% but its data gives {computed:.2}%",
                    record.label()
                ),
            })
        })
        .collect()
}

pub fn check_inactive_success_rates(
    set: RecordSet,
    periods: &[PeriodRecord],
) -> Vec<DataQualityWarning> {
    periods
        .iter()
        .filter(|period| !period.is_active())
        .filter_map(|period| {
            let rate = period.success_rate?;
            Some(DataQualityWarning {
                set,
                kind: WarningKind::InactiveRate,
                detail: format!(
                    "'{}' has no transactions but records a {rate:.2}% success rate",
                    period.label
                ),
            })
        })
        .collect()
}

pub fn check_missing_success_rates(
    set: RecordSet,
    periods: &[PeriodRecord],
) -> Vec<DataQualityWarning> {
    if !periods.iter().any(|period| period.success_rate.is_some()) {
        return Vec::new();
    }
    periods
        .iter()
        .filter(|period| period.rate_missing())
        .map(|period| DataQualityWarning {
            set,
            kind: WarningKind::MissingRate,
            detail: format!(
                "'{}' has {} transactions but no success rate; left out of rate means",
                period.label, period.transaction_count
            ),
        })
        .collect()
}

pub fn check_mean_modes(set: RecordSet, periods: &[PeriodRecord]) -> Option<DataQualityWarning> {
    let inactive = periods.iter().filter(|period| !period.is_active()).count();
    let rated = periods.iter().any(|period| period.success_rate.is_some());
    if inactive == 0 || !rated {
        return None;
    }

    let rate = |period: &&PeriodRecord| PeriodField::SuccessRate.of(period);
    let basis = rated_periods(periods);
    let describe = |mean: Result<f64, MetricError>| match mean {
        Ok(value) => format!("{value:.2}%"),
        Err(_) => "n/a".to_string(),
    };
    Some(DataQualityWarning {
        set,
        kind: WarningKind::MeanModeDivergence,
        detail: format!(
            "{inactive} inactive period(s): success rate mean is {} over all periods, {} over active periods",
            describe(aggregate::mean_all(&basis, rate)),
            describe(aggregate::mean_active(&basis, rate)),
        ),
    })
}

pub fn audit(dataset: &Dataset, tolerance: f64) -> Vec<DataQualityWarning> {
    let mut warnings = Vec::new();

    for (set, periods) in [
        (RecordSet::Monthly, &dataset.monthly),
        (RecordSet::Hourly, &dataset.hourly),
    ] {
        warnings.extend(check_inactive_success_rates(set, periods));
        warnings.extend(check_missing_success_rates(set, periods));
        warnings.extend(check_mean_modes(set, periods));
    }

    warnings.extend(share_checks(RecordSet::Countries, &dataset.countries, tolerance));
    warnings.extend(share_checks(RecordSet::Clients, &dataset.clients, tolerance));

    warnings.extend(check_share_total(
        RecordSet::Failures,
        dataset.failures.iter().map(|failure| failure.percentage),
        tolerance,
    ));
    warnings.extend(check_recorded_shares(
        RecordSet::Failures,
        &dataset.failures,
        |failure| failure.percentage,
        |failure| failure.count as f64,
        tolerance,
    ));

    warnings
}

fn share_checks<R: ShareRecord>(
    set: RecordSet,
    records: &[R],
    tolerance: f64,
) -> Vec<DataQualityWarning> {
    let mut warnings: Vec<_> = check_share_total(
        set,
        records.iter().map(ShareRecord::recorded_share),
        tolerance,
    )
    .into_iter()
    .collect();
    warnings.extend(check_recorded_shares(
        set,
        records,
        |record| record.recorded_share(),
        |record| record.volume(),
        tolerance,
    ));
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClientRecord;

    fn client(name: &str, volume: f64, share: f64) -> ClientRecord {
        ClientRecord {
            client_name: name.to_string(),
            volume,
            transaction_count: 1,
            market_share: share,
        }
    }

    #[test]
    fn builtin_dataset_has_no_warnings() {
        assert!(audit(&Dataset::builtin(), 1.0).is_empty());
    }

    #[test]
    fn share_total_outside_tolerance_is_flagged() {
        let warning = check_share_total(RecordSet::Clients, [60.0, 30.0], 1.0).unwrap();
        assert_eq!(warning.kind, WarningKind::ShareTotal);
        assert!(warning.detail.contains("90.00%"));

        assert!(check_share_total(RecordSet::Clients, [60.0, 39.3], 1.0).is_none());
        assert!(check_share_total(RecordSet::Clients, Vec::new(), 1.0).is_none());
    }

    #[test]
    fn share_mismatch_names_the_row() {
        let clients = vec![client("A", 75.0, 50.0), client("B", 25.0, 50.0)];
        let warnings = share_checks(RecordSet::Clients, &clients, 1.0);
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.kind == WarningKind::ShareMismatch));
        assert!(warnings[0].detail.contains("'A'"));
    }

    #[test]
    fn rate_on_inactive_period_is_flagged() {
        let mut idle = PeriodRecord::month("May", 0, 0.0, 0.0, 0, 0);
        let periods = vec![idle.clone(), PeriodRecord::month("June", 10, 5.0, 80.0, 1, 1)];
        let warnings = check_inactive_success_rates(RecordSet::Monthly, &periods);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::InactiveRate);

        idle.success_rate = Some(65.0);
        let periods = vec![idle.clone(), PeriodRecord::month("June", 10, 5.0, 80.0, 1, 1)];
        let warnings = check_inactive_success_rates(RecordSet::Monthly, &periods);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].detail.contains("65.00%"));

        idle.success_rate = None;
        let periods = vec![idle, PeriodRecord::month("June", 10, 5.0, 80.0, 1, 1)];
        assert!(check_inactive_success_rates(RecordSet::Monthly, &periods).is_empty());
    }

    #[test]
    fn mean_mode_divergence_reports_both_means() {
        let periods = vec![
            PeriodRecord::month("May", 0, 0.0, 0.0, 0, 0),
            PeriodRecord::month("June", 10, 5.0, 80.0, 1, 1),
            PeriodRecord::month("July", 10, 5.0, 90.0, 1, 1),
        ];
        let warning = check_mean_modes(RecordSet::Monthly, &periods).unwrap();
        assert_eq!(warning.kind, WarningKind::MeanModeDivergence);
        assert!(warning.detail.contains("56.67%"));
        assert!(warning.detail.contains("85.00%"));
    }

    #[test]
    fn active_period_without_rate_is_flagged() {
        let mut unrated = PeriodRecord::month("B", 10, 5.0, 0.0, 1, 1);
        unrated.success_rate = None;
        let dataset = Dataset {
            monthly: vec![PeriodRecord::month("A", 10, 5.0, 80.0, 1, 1), unrated],
            ..Dataset::builtin()
        };
        let warnings = audit(&dataset, 1.0);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, WarningKind::MissingRate);
        assert!(warnings[0].detail.contains("'B'"));
    }

    #[test]
    fn unrated_series_is_not_missing_rates() {
        let periods = vec![PeriodRecord::slot("1:30", 10.0, 4)];
        assert!(check_missing_success_rates(RecordSet::Hourly, &periods).is_empty());
    }

    #[test]
    fn unrated_series_has_no_mean_mode_warning() {
        let periods = vec![
            PeriodRecord::slot("1:00", 0.0, 0),
            PeriodRecord::slot("1:30", 10.0, 4),
        ];
        assert!(check_mean_modes(RecordSet::Hourly, &periods).is_none());
    }
}
