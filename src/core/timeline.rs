use super::sampling::{Sampler, collapse};
use super::types::{AgeRange, Bound, ItemSchedule, TimelineKind, YearPoint, YearRow};

#[derive(Debug, Clone)]
pub struct ItemSeries {
    name: String,
    amounts: Vec<Bound>,
    distributions: Option<Vec<Bound>>,
}

impl ItemSeries {
    fn new(name: &str, years: usize, investment: bool) -> Self {
        Self {
            name: name.to_string(),
            amounts: vec![Bound::ZERO; years],
            distributions: investment.then(|| vec![Bound::ZERO; years]),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amounts(&self) -> &[Bound] {
        &self.amounts
    }

    pub fn distributions(&self) -> Option<&[Bound]> {
        self.distributions.as_deref()
    }

    pub(crate) fn amounts_mut(&mut self) -> &mut [Bound] {
        &mut self.amounts
    }

    pub(crate) fn record_distribution(&mut self, index: usize, balance: Bound, distribution: Bound) {
        self.amounts[index] = balance;
        if let Some(distributions) = self.distributions.as_mut() {
            distributions[index] = distribution;
        }
    }
}

/// A pre-allocated table with one row per age, one series per item and,
/// once aggregated, a total column.
#[derive(Debug, Clone)]
pub struct Timeline {
    kind: TimelineKind,
    rows: Vec<YearRow>,
    series: Vec<ItemSeries>,
    totals: Option<Vec<Bound>>,
}

impl Timeline {
    pub fn new(kind: TimelineKind, rows: Vec<YearRow>) -> Self {
        Self {
            kind,
            rows,
            series: Vec::new(),
            totals: None,
        }
    }

    pub fn kind(&self) -> TimelineKind {
        self.kind
    }

    pub fn rows(&self) -> &[YearRow] {
        &self.rows
    }

    pub(crate) fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn index_of_age(&self, age: u32) -> Option<usize> {
        self.rows.iter().position(|row| row.age == age)
    }

    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(ItemSeries::name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.series.iter().any(|s| s.name == name)
    }

    pub fn series(&self) -> &[ItemSeries] {
        &self.series
    }

    pub fn find(&self, name: &str) -> Option<&ItemSeries> {
        self.series.iter().find(|s| s.name == name)
    }

    pub(crate) fn push_series(&mut self, name: &str) -> &mut ItemSeries {
        let series = ItemSeries::new(name, self.rows.len(), self.kind.is_investment());
        self.series.push(series);
        let last = self.series.len() - 1;
        &mut self.series[last]
    }

    pub fn column(&self, name: &str) -> Option<Vec<YearPoint>> {
        self.find(name).map(|s| self.points(&s.amounts))
    }

    pub fn distribution_column(&self, name: &str) -> Option<Vec<YearPoint>> {
        self.find(name)
            .and_then(ItemSeries::distributions)
            .map(|d| self.points(d))
    }

    pub fn total_column(&self) -> Option<Vec<YearPoint>> {
        self.totals.as_deref().map(|t| self.points(t))
    }

    pub fn bound_at(&self, name: &str, index: usize) -> Option<Bound> {
        self.find(name).and_then(|s| s.amounts.get(index).copied())
    }

    pub fn total_at(&self, index: usize) -> Option<Bound> {
        self.totals.as_ref().and_then(|t| t.get(index).copied())
    }

    pub fn totals(&self) -> Option<&[Bound]> {
        self.totals.as_deref()
    }

    pub(crate) fn set_totals(&mut self, totals: Vec<Bound>) {
        debug_assert_eq!(totals.len(), self.rows.len());
        self.totals = Some(totals);
    }

    pub(crate) fn split_mut(&mut self) -> (&[YearRow], &mut [ItemSeries]) {
        (&self.rows, &mut self.series)
    }

    fn points(&self, bounds: &[Bound]) -> Vec<YearPoint> {
        self.rows
            .iter()
            .zip(bounds)
            .map(|(row, bound)| YearPoint::new(*row, *bound))
            .collect()
    }
}

/// Fills `amounts` for every row whose age falls in `ages`, feeding each
/// year's collapsed (5th, 95th) bound into the next year.
///
/// Rows outside `ages` are left as they are, so re-projecting from a
/// later age overwrites only that account's remaining years.
pub(crate) fn project(
    rows: &[YearRow],
    amounts: &mut [Bound],
    ages: AgeRange,
    starting: Bound,
    schedule: &ItemSchedule,
    sampler: &mut Sampler,
) {
    let mut current = starting;
    for (row, slot) in rows.iter().zip(amounts.iter_mut()) {
        if !ages.contains(row.age) {
            continue;
        }

        let contribution = if schedule.contribution_ages.contains(row.age) {
            schedule.contribution
        } else {
            Bound::ZERO
        };

        let mut values = sampler.year_value(current, schedule.growth, contribution);
        current = collapse(&mut values);
        *slot = current;
    }
}

pub(crate) fn build_rows(current_year: i32, current_age: u32, death_age: u32) -> Vec<YearRow> {
    (current_age..death_age)
        .map(|age| YearRow {
            age,
            year: current_year + (age - current_age) as i32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schedule(amount: Bound, active: AgeRange) -> ItemSchedule {
        ItemSchedule {
            name: "Savings".to_string(),
            amount,
            active,
            growth: Bound::ZERO,
            contribution: Bound::ZERO,
            contribution_ages: AgeRange::default(),
        }
    }

    #[test]
    fn rows_pair_ages_with_calendar_years() {
        let rows = build_rows(2024, 30, 33);
        assert_eq!(
            rows,
            vec![
                YearRow { age: 30, year: 2024 },
                YearRow { age: 31, year: 2025 },
                YearRow { age: 32, year: 2026 },
            ]
        );
    }

    #[test]
    fn zero_growth_projection_holds_balance_inside_active_range() {
        let rows = build_rows(2024, 30, 40);
        let mut amounts = vec![Bound::ZERO; rows.len()];
        let schedule = schedule(Bound::fixed(10_000.0), AgeRange::new(32, 35));
        let mut sampler = Sampler::new(128, Some(1));

        project(&rows, &mut amounts, schedule.active, schedule.amount, &schedule, &mut sampler);

        for (row, amount) in rows.iter().zip(&amounts) {
            let expected = if (32..35).contains(&row.age) { 10_000.0 } else { 0.0 };
            assert_eq!(*amount, Bound::fixed(expected), "age {}", row.age);
        }
    }

    #[test]
    fn contributions_apply_only_inside_contribution_ages() {
        let rows = build_rows(2024, 30, 34);
        let mut amounts = vec![Bound::ZERO; rows.len()];
        let mut schedule = schedule(Bound::fixed(1_000.0), AgeRange::new(30, 34));
        schedule.contribution = Bound::fixed(500.0);
        schedule.contribution_ages = AgeRange::new(31, 33);
        let mut sampler = Sampler::new(64, Some(2));

        project(&rows, &mut amounts, schedule.active, schedule.amount, &schedule, &mut sampler);

        let highs: Vec<f64> = amounts.iter().map(|b| b.high).collect();
        assert_eq!(highs, vec![1_000.0, 1_500.0, 2_000.0, 2_000.0]);
    }

    #[test]
    fn growth_compounds_year_over_year() {
        let rows = build_rows(2024, 30, 33);
        let mut amounts = vec![Bound::ZERO; rows.len()];
        let mut schedule = schedule(Bound::fixed(100.0), AgeRange::new(30, 33));
        schedule.growth = Bound::fixed(0.5);
        let mut sampler = Sampler::new(16, Some(3));

        project(&rows, &mut amounts, schedule.active, schedule.amount, &schedule, &mut sampler);

        assert_eq!(amounts, vec![Bound::fixed(150.0), Bound::fixed(225.0), Bound::fixed(337.5)]);
    }

    #[test]
    fn projection_skips_ages_before_first_row() {
        let rows = build_rows(2024, 30, 33);
        let mut amounts = vec![Bound::ZERO; rows.len()];
        let mut schedule = schedule(Bound::fixed(100.0), AgeRange::new(25, 32));
        schedule.growth = Bound::fixed(1.0);
        let mut sampler = Sampler::new(16, Some(4));

        project(&rows, &mut amounts, schedule.active, schedule.amount, &schedule, &mut sampler);

        assert_eq!(amounts, vec![Bound::fixed(200.0), Bound::fixed(400.0), Bound::ZERO]);
    }

    #[test]
    fn reprojection_overwrites_only_later_years() {
        let rows = build_rows(2024, 30, 35);
        let mut amounts = vec![Bound::ZERO; rows.len()];
        let schedule = schedule(Bound::fixed(10_000.0), AgeRange::new(30, 35));
        let mut sampler = Sampler::new(16, Some(5));
        project(&rows, &mut amounts, schedule.active, schedule.amount, &schedule, &mut sampler);

        project(
            &rows,
            &mut amounts,
            AgeRange::new(32, schedule.active.end),
            Bound::fixed(6_000.0),
            &schedule,
            &mut sampler,
        );

        let highs: Vec<f64> = amounts.iter().map(|b| b.high).collect();
        assert_eq!(highs, vec![10_000.0, 10_000.0, 6_000.0, 6_000.0, 6_000.0]);
    }

    #[test]
    fn zero_growth_projection_preserves_interval() {
        let rows = build_rows(2024, 30, 32);
        let mut amounts = vec![Bound::ZERO; rows.len()];
        let schedule = schedule(Bound::new(900.0, 1_100.0), AgeRange::new(30, 32));
        let mut sampler = Sampler::new(100_000, Some(6));

        project(&rows, &mut amounts, schedule.active, schedule.amount, &schedule, &mut sampler);

        for amount in &amounts {
            assert!((amount.low - 900.0).abs() < 3.0, "{amount:?}");
            assert!((amount.high - 1_100.0).abs() < 3.0, "{amount:?}");
        }
    }

    #[test]
    fn timeline_read_interface_returns_year_points() {
        let mut timeline = Timeline::new(TimelineKind::NonRetirement, build_rows(2024, 30, 32));
        let series = timeline.push_series("Brokerage");
        series.amounts_mut()[1] = Bound::new(5.0, 9.0);
        series.record_distribution(0, Bound::fixed(3.0), Bound::new(-2.0, 0.0));

        let column = timeline.column("Brokerage").expect("registered column");
        assert_eq!(column[0], YearPoint { age: 30, year: 2024, low: 3.0, high: 3.0 });
        assert_eq!(column[1].bound(), Bound::new(5.0, 9.0));

        let distributions = timeline
            .distribution_column("Brokerage")
            .expect("investments carry distributions");
        assert_eq!(distributions[0].bound(), Bound::new(-2.0, 0.0));

        assert_eq!(timeline.bound_at("Brokerage", 1), Some(Bound::new(5.0, 9.0)));
        assert_eq!(timeline.bound_at("Missing", 1), None);
        assert!(timeline.total_column().is_none());
    }

    #[test]
    fn flow_timelines_have_no_distribution_column() {
        let mut timeline = Timeline::new(TimelineKind::Income, build_rows(2024, 30, 31));
        timeline.push_series("Salary");
        assert!(timeline.column("Salary").is_some());
        assert!(timeline.distribution_column("Salary").is_none());
    }
}
