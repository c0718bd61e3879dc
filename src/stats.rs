use crate::aggregate::{self, Activity, LabeledDelta, Metric, NaReason};
use crate::config::Settings;
use crate::errors::MetricError;
use crate::models::{
    DashboardSummary, Dataset, DeltaPoint, FailureMetrics, FailureRecord, FailureRow,
    PeriodField, PeriodMetrics, PeriodRecord, RecordSet, ShareField, ShareMetrics, ShareRecord,
    ShareRow, rated_periods,
};
use crate::quality;

pub fn build_summary(dataset: &Dataset, settings: &Settings) -> DashboardSummary {
    DashboardSummary {
        currency: dataset.currency.clone(),
        monthly: period_metrics(RecordSet::Monthly, &dataset.monthly),
        hourly: period_metrics(RecordSet::Hourly, &dataset.hourly),
        countries: share_metrics(RecordSet::Countries, &dataset.countries, settings),
        clients: share_metrics(RecordSet::Clients, &dataset.clients, settings),
        failures: failure_metrics(&dataset.failures, settings),
        warnings: quality::audit(dataset, settings.share_tolerance),
    }
}

pub fn period_metrics(series: RecordSet, periods: &[PeriodRecord]) -> PeriodMetrics {
    let count = |period: &PeriodRecord| PeriodField::TransactionCount.of(period);
    let volume = |period: &PeriodRecord| PeriodField::Volume.of(period);
    let rate = |period: &&PeriodRecord| PeriodField::SuccessRate.of(period);
    let weight = |period: &&PeriodRecord| PeriodField::TransactionCount.of(period);

    // Series without any recorded rate (e.g. intraday slots) have no success metrics at all.
    let rated = periods.iter().any(|period| period.success_rate.is_some());
    let rate_basis = rated_periods(periods);

    let volume_deltas: Vec<DeltaPoint> = aggregate::deltas(periods, volume)
        .map(delta_point)
        .collect();
    let transaction_deltas = aggregate::deltas(periods, count)
        .map(delta_point)
        .collect();
    let latest_volume_delta = volume_deltas
        .last()
        .cloned()
        .ok_or(MetricError::EmptyInput)
        .into();

    PeriodMetrics {
        series,
        periods: periods.len(),
        active_periods: periods.iter().filter(|period| period.is_active()).count(),
        total_transactions: aggregate::checked_sum(periods, |p| p.transaction_count).into(),
        total_volume: aggregate::checked_sum(periods, volume).into(),
        mean_transactions_all: aggregate::mean_all(periods, count).into(),
        mean_transactions_active: aggregate::mean_active(periods, count).into(),
        mean_volume_all: aggregate::mean_all(periods, volume).into(),
        mean_volume_active: aggregate::mean_active(periods, volume).into(),
        success_rate_all: when_rated(rated, aggregate::mean_all(&rate_basis, rate)),
        success_rate_active: when_rated(rated, aggregate::mean_active(&rate_basis, rate)),
        success_rate_weighted: when_rated(
            rated,
            aggregate::weighted_mean(&rate_basis, rate, weight),
        ),
        peak_success_rate: when_rated(rated, aggregate::peak(&rate_basis, rate)),
        peak_volume: aggregate::peak(periods, volume).into(),
        peak_transactions: aggregate::peak(periods, |p| p.transaction_count).into(),
        total_unique_senders: aggregate::checked_sum(periods, |p| p.unique_senders).into(),
        total_unique_recipients: aggregate::checked_sum(periods, |p| p.unique_recipients).into(),
        volume_deltas,
        transaction_deltas,
        latest_volume_delta,
    }
}

pub fn share_metrics<R: ShareRecord>(
    set: RecordSet,
    records: &[R],
    settings: &Settings,
) -> ShareMetrics {
    let ranked_by = ShareField::Volume;
    let total_volume = aggregate::sum(records, |record| record.volume());
    let ranking = aggregate::rank_descending(records, |record| ranked_by.of(record));

    let ranked: Vec<ShareRow> = ranking
        .iter()
        .map(|record| ShareRow {
            label: record.label().to_string(),
            volume: record.volume(),
            transaction_count: record.transaction_count(),
            recorded_share: record.recorded_share(),
            computed_share: aggregate::percent_of_total(
                record.volume(),
                total_volume,
                settings.precision,
            )
            .into(),
        })
        .collect();

    let significant = ranked
        .iter()
        .filter(|row| {
            row.computed_share
                .value()
                .is_some_and(|share| *share > settings.significant_share)
        })
        .map(|row| row.label.clone())
        .collect();

    ShareMetrics {
        set,
        ranked_by,
        total_volume: aggregate::checked_sum(records, |record| record.volume()).into(),
        total_transactions: aggregate::checked_sum(records, |record| record.transaction_count())
            .into(),
        known_entities: records
            .iter()
            .filter(|record| !record.label().eq_ignore_ascii_case(&settings.unknown_label))
            .count(),
        leader: ranking
            .first()
            .map(|record| record.label().to_string())
            .ok_or(MetricError::EmptyInput)
            .into(),
        significant,
        ranked,
    }
}

pub fn failure_metrics(failures: &[FailureRecord], settings: &Settings) -> FailureMetrics {
    let total = aggregate::sum(failures, |failure| failure.count);
    let ranking = aggregate::rank_descending(failures, |failure| failure.count as f64);

    let reasons = ranking
        .iter()
        .map(|failure| FailureRow {
            reason: failure.reason.clone(),
            count: failure.count,
            recorded_percentage: failure.percentage,
            computed_percentage: aggregate::percent_of_total(
                failure.count as f64,
                total as f64,
                settings.precision,
            )
            .into(),
        })
        .collect();

    FailureMetrics {
        total_failures: aggregate::checked_sum(failures, |failure| failure.count).into(),
        dominant_reason: ranking
            .first()
            .map(|failure| failure.reason.clone())
            .ok_or(MetricError::EmptyInput)
            .into(),
        reasons,
    }
}

fn delta_point(step: LabeledDelta<'_>) -> DeltaPoint {
    DeltaPoint {
        previous: step.previous.to_string(),
        current: step.current.to_string(),
        absolute: step.delta.absolute,
        relative: step.delta.relative.into(),
        decline: step.delta.is_decline(),
    }
}

fn when_rated<T>(rated: bool, result: Result<T, MetricError>) -> Metric<T> {
    if !rated {
        return Metric::NotApplicable {
            reason: NaReason::EmptyInput,
        };
    }
    result.into()
}
