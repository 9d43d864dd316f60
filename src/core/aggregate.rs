use super::sampling::{Sampler, collapse};
use super::timeline::Timeline;
use super::types::{Bound, YearRow};

/// Sums every item's population per year and stores the collapsed total.
///
/// Items are drawn independently: trial `t` of one item has nothing to
/// do with trial `t` of another.
pub(crate) fn total(timeline: &mut Timeline, sampler: &mut Sampler) {
    let mut totals = Vec::with_capacity(timeline.len());
    for index in 0..timeline.len() {
        let mut sum = vec![0.0; sampler.samples()];
        for series in timeline.series() {
            let values = sampler.draw(series.amounts()[index]);
            for (acc, value) in sum.iter_mut().zip(values) {
                *acc += value;
            }
        }
        totals.push(collapse(&mut sum));
    }
    timeline.set_totals(totals);
}

pub(crate) struct CategoryTotals<'a> {
    pub income: &'a [Bound],
    pub expenses: &'a [Bound],
    pub non_retirement: &'a [Bound],
    pub retirement: &'a [Bound],
}

pub(crate) fn net_worth(
    rows: &[YearRow],
    totals: CategoryTotals<'_>,
    retirement_age: u32,
    sampler: &mut Sampler,
) -> Vec<Bound> {
    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let income = sampler.draw(totals.income[index]);
            let expenses = sampler.draw(totals.expenses[index]);
            let non_retirement = sampler.draw(totals.non_retirement[index]);
            let retirement = sampler.draw(totals.retirement[index]);
            let include_retirement = row.age >= retirement_age;

            let mut values: Vec<f64> = (0..income.len())
                .map(|t| {
                    let base = income[t] + non_retirement[t] - expenses[t];
                    if include_retirement { base + retirement[t] } else { base }
                })
                .collect();
            collapse(&mut values)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::timeline::build_rows;
    use crate::core::types::TimelineKind;

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn total_of_fixed_items_is_exact() {
        let mut timeline = Timeline::new(TimelineKind::Expenses, build_rows(2024, 30, 32));
        timeline.push_series("Rent").amounts_mut()[0] = Bound::fixed(1_200.0);
        timeline.push_series("Food").amounts_mut()[0] = Bound::fixed(300.0);
        let mut sampler = Sampler::new(64, Some(1));

        total(&mut timeline, &mut sampler);

        assert_eq!(timeline.total_at(0), Some(Bound::fixed(1_500.0)));
        assert_eq!(timeline.total_at(1), Some(Bound::ZERO));
        let column = timeline.total_column().expect("totals present");
        assert_eq!(column[0].age, 30);
        assert_eq!(column[1].year, 2025);
    }

    #[test]
    fn empty_timeline_totals_to_zero() {
        let mut timeline = Timeline::new(TimelineKind::Retirement, build_rows(2024, 30, 33));
        let mut sampler = Sampler::new(16, Some(2));
        total(&mut timeline, &mut sampler);
        assert_eq!(timeline.totals(), Some(&[Bound::ZERO; 3][..]));
    }

    #[test]
    fn total_draws_items_independently() {
        // Two items with std 1000 each: independent sums have std ~1414 and
        // a 90% width near 4652; paired draws would give 6580.
        let mut timeline = Timeline::new(TimelineKind::Income, build_rows(2024, 30, 31));
        timeline.push_series("Salary").amounts_mut()[0] = Bound::new(0.0, 3_290.0);
        timeline.push_series("Bonus").amounts_mut()[0] = Bound::new(0.0, 3_290.0);
        let mut sampler = Sampler::new(100_000, Some(3));

        total(&mut timeline, &mut sampler);

        let bound = timeline.total_at(0).expect("total present");
        assert_approx_tol(bound.width(), 3_290.0 * 2f64.sqrt(), 120.0);
        assert_approx_tol(bound.midpoint(), 3_290.0, 30.0);
    }

    fn flat(value: f64, years: usize) -> Vec<Bound> {
        vec![Bound::fixed(value); years]
    }

    #[test]
    fn net_worth_excludes_retirement_before_retirement_age() {
        let rows = build_rows(2024, 58, 62);
        let income = flat(50_000.0, 4);
        let expenses = flat(30_000.0, 4);
        let non_retirement = flat(100_000.0, 4);
        let retirement = flat(400_000.0, 4);
        let mut sampler = Sampler::new(32, Some(4));

        let net = net_worth(
            &rows,
            CategoryTotals {
                income: &income,
                expenses: &expenses,
                non_retirement: &non_retirement,
                retirement: &retirement,
            },
            60,
            &mut sampler,
        );

        assert_eq!(net[0], Bound::fixed(120_000.0));
        assert_eq!(net[1], Bound::fixed(120_000.0));
        assert_eq!(net[2], Bound::fixed(520_000.0));
        assert_eq!(net[3], Bound::fixed(520_000.0));
    }

    #[test]
    fn net_worth_goes_negative_when_expenses_dominate() {
        let rows = build_rows(2024, 30, 31);
        let mut sampler = Sampler::new(32, Some(5));
        let net = net_worth(
            &rows,
            CategoryTotals {
                income: &flat(1_000.0, 1),
                expenses: &flat(5_000.0, 1),
                non_retirement: &flat(0.0, 1),
                retirement: &flat(0.0, 1),
            },
            60,
            &mut sampler,
        );
        assert_eq!(net[0], Bound::fixed(-4_000.0));
    }

    #[test]
    fn net_worth_combines_categories_independently() {
        let rows = build_rows(2024, 30, 31);
        let mut sampler = Sampler::new(100_000, Some(6));
        let spread = Bound::new(-1_645.0, 1_645.0);
        let net = net_worth(
            &rows,
            CategoryTotals {
                income: &[spread],
                expenses: &[spread],
                non_retirement: &flat(0.0, 1),
                retirement: &flat(0.0, 1),
            },
            60,
            &mut sampler,
        );
        // Independent income and expense draws do not cancel.
        assert_approx_tol(net[0].width(), 3_290.0 * 2f64.sqrt(), 120.0);
    }
}
