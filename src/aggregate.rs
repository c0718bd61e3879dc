//! Pure aggregation over small, immutable record sets. Empty sets, zero
//! denominators and overflowing totals come back as [`MetricError`].

use crate::errors::MetricError;
use serde::Serialize;
use std::cell::OnceCell;

pub trait Labeled {
    fn label(&self) -> &str;
}

pub trait Activity {
    fn is_active(&self) -> bool;
}

impl<T: Labeled + ?Sized> Labeled for &T {
    fn label(&self) -> &str {
        (**self).label()
    }
}

impl<T: Activity + ?Sized> Activity for &T {
    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}

/// Values that can be totalled. Integer totals can overflow and float totals
/// can leave the finite range.
pub trait Total: Copy + Default {
    fn saturating_total(self, other: Self) -> Self;
    fn checked_total(self, other: Self) -> Option<Self>;
}

impl Total for u64 {
    fn saturating_total(self, other: Self) -> Self {
        self.saturating_add(other)
    }

    fn checked_total(self, other: Self) -> Option<Self> {
        self.checked_add(other)
    }
}

impl Total for f64 {
    fn saturating_total(self, other: Self) -> Self {
        self + other
    }

    fn checked_total(self, other: Self) -> Option<Self> {
        let total = self + other;
        total.is_finite().then_some(total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NaReason {
    EmptyInput,
    DivideByZero,
    Overflow,
}

impl From<MetricError> for NaReason {
    fn from(err: MetricError) -> Self {
        match err {
            MetricError::EmptyInput => Self::EmptyInput,
            MetricError::DivideByZero => Self::DivideByZero,
            MetricError::Overflow => Self::Overflow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Metric<T> {
    Value { value: T },
    NotApplicable { reason: NaReason },
}

impl<T> Metric<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value { value } => Some(value),
            Self::NotApplicable { .. } => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Value { .. })
    }
}

impl<T> From<Result<T, MetricError>> for Metric<T> {
    fn from(result: Result<T, MetricError>) -> Self {
        match result {
            Ok(value) => Self::Value { value },
            Err(err) => Self::NotApplicable { reason: err.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peak<T> {
    pub label: String,
    pub value: T,
}

/// Change between two consecutive periods. `absolute` is always defined,
/// `relative` (in percent) is not when the previous value is zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodDelta {
    pub absolute: f64,
    pub relative: Result<f64, MetricError>,
}

impl PeriodDelta {
    pub fn is_decline(&self) -> bool {
        self.absolute < 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledDelta<'a> {
    pub previous: &'a str,
    pub current: &'a str,
    pub delta: PeriodDelta,
}

/// Sum of `field` over `records`. Empty input yields zero and integer totals
/// saturate.
pub fn sum<R, T, F>(records: &[R], field: F) -> T
where
    F: Fn(&R) -> T,
    T: Total,
{
    records
        .iter()
        .map(field)
        .fold(T::default(), T::saturating_total)
}

/// Like [`sum`], but empty input and overflow are reported.
pub fn checked_sum<R, T, F>(records: &[R], field: F) -> Result<T, MetricError>
where
    F: Fn(&R) -> T,
    T: Total,
{
    if records.is_empty() {
        return Err(MetricError::EmptyInput);
    }
    records
        .iter()
        .map(field)
        .try_fold(T::default(), T::checked_total)
        .ok_or(MetricError::Overflow)
}

pub fn mean_all<R, F>(records: &[R], field: F) -> Result<f64, MetricError>
where
    F: Fn(&R) -> f64,
{
    mean_of(records.iter(), field)
}

pub fn mean_active<R, F>(records: &[R], field: F) -> Result<f64, MetricError>
where
    R: Activity,
    F: Fn(&R) -> f64,
{
    mean_of(records.iter().filter(|record| record.is_active()), field)
}

fn mean_of<'a, R, I, F>(records: I, field: F) -> Result<f64, MetricError>
where
    R: 'a,
    I: Iterator<Item = &'a R>,
    F: Fn(&R) -> f64,
{
    let (total, count) = records.fold((0.0, 0usize), |(total, count), record| {
        (total + field(record), count + 1)
    });
    if count == 0 {
        return Err(MetricError::DivideByZero);
    }
    Ok(total / count as f64)
}

pub fn weighted_mean<R, V, W>(records: &[R], value: V, weight: W) -> Result<f64, MetricError>
where
    V: Fn(&R) -> f64,
    W: Fn(&R) -> f64,
{
    let (weighted, total_weight) = records.iter().fold((0.0, 0.0), |(acc, total), record| {
        let w = weight(record);
        (acc + value(record) * w, total + w)
    });
    if total_weight == 0.0 {
        return Err(MetricError::DivideByZero);
    }
    Ok(weighted / total_weight)
}

/// Record with the largest `field`. Ties go to the earliest record.
pub fn peak<R, T, F>(records: &[R], field: F) -> Result<Peak<T>, MetricError>
where
    R: Labeled,
    T: PartialOrd + Copy,
    F: Fn(&R) -> T,
{
    let mut best: Option<(&R, T)> = None;
    for record in records {
        let value = field(record);
        match best {
            Some((_, current)) if !(value > current) => {}
            _ => best = Some((record, value)),
        }
    }

    best.map(|(record, value)| Peak {
        label: record.label().to_string(),
        value,
    })
    .ok_or(MetricError::EmptyInput)
}

pub fn percent_of_total(value: f64, total: f64, precision: u32) -> Result<f64, MetricError> {
    if total == 0.0 {
        return Err(MetricError::DivideByZero);
    }
    Ok(round_to(value / total * 100.0, precision))
}

pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

pub fn period_delta<R, F>(current: &R, previous: &R, field: F) -> PeriodDelta
where
    F: Fn(&R) -> f64,
{
    let now = field(current);
    let before = field(previous);
    let absolute = now - before;
    let relative = if before == 0.0 {
        Err(MetricError::DivideByZero)
    } else {
        Ok(absolute * 100.0 / before)
    };

    PeriodDelta { absolute, relative }
}

pub fn deltas<'a, R, F>(records: &'a [R], field: F) -> impl Iterator<Item = LabeledDelta<'a>>
where
    R: Labeled,
    F: Fn(&R) -> f64 + 'a,
{
    records.windows(2).map(move |pair| LabeledDelta {
        previous: pair[0].label(),
        current: pair[1].label(),
        delta: period_delta(&pair[1], &pair[0], &field),
    })
}

/// Records ordered by `field`, highest first, computed on first use. Equal
/// values keep their original order.
pub struct Ranking<'a, R, F> {
    records: &'a [R],
    field: F,
    order: OnceCell<Vec<usize>>,
}

pub fn rank_descending<R, F>(records: &[R], field: F) -> Ranking<'_, R, F>
where
    F: Fn(&R) -> f64,
{
    Ranking {
        records,
        field,
        order: OnceCell::new(),
    }
}

impl<'a, R, F> Ranking<'a, R, F>
where
    F: Fn(&R) -> f64,
{
    fn order(&self) -> &[usize] {
        self.order.get_or_init(|| {
            let mut order: Vec<usize> = (0..self.records.len()).collect();
            order.sort_by(|&a, &b| {
                (self.field)(&self.records[b]).total_cmp(&(self.field)(&self.records[a]))
            });
            order
        })
    }

    pub fn iter(&self) -> RankIter<'_, 'a, R> {
        RankIter {
            records: self.records,
            order: self.order().iter(),
        }
    }

    pub fn first(&self) -> Option<&'a R> {
        self.iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'r, 'a, R, F> IntoIterator for &'r Ranking<'a, R, F>
where
    F: Fn(&R) -> f64,
{
    type Item = &'a R;
    type IntoIter = RankIter<'r, 'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct RankIter<'r, 'a, R> {
    records: &'a [R],
    order: std::slice::Iter<'r, usize>,
}

impl<'a, R> Iterator for RankIter<'_, 'a, R> {
    type Item = &'a R;

    fn next(&mut self) -> Option<Self::Item> {
        self.order.next().map(|&index| &self.records[index])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<R> ExactSizeIterator for RankIter<'_, '_, R> {}
