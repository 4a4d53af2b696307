//! Presentation formatter — display order, per-year grids and currency text.
//!
//! Chart series keep raw numbers; only table cells go through
//! [`format_currency`].

use serde::Serialize;

use super::engine::MonthlyBucket;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// One month in a [`YearView`]. Zero-filled when the month has no records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthRow {
    pub month: u32,
    pub name: &'static str,
    pub short_name: &'static str,
    pub amount: f64,
    pub service_cost: f64,
    pub spare_cost: f64,
}

/// Sums across the twelve months of a [`YearView`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearTotal {
    pub amount: f64,
    pub service_cost: f64,
    pub spare_cost: f64,
}

/// Revenue grid for one calendar year: always exactly 12 rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct YearView {
    pub year: i32,
    pub months: Vec<MonthRow>,
    pub total: YearTotal,
}

/// Long English name of a month (1–12). Out-of-range months give `""`.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("")
}

/// Three-letter month abbreviation.
pub fn short_month_name(month: u32) -> &'static str {
    let name = month_name(month);
    name.get(..3).unwrap_or(name)
}

/// Lay the buckets of `year` out over all twelve months.
pub fn year_view(buckets: &[MonthlyBucket], year: i32) -> YearView {
    let mut months: Vec<MonthRow> = (1..=12)
        .map(|month| MonthRow {
            month,
            name: month_name(month),
            short_name: short_month_name(month),
            amount: 0.0,
            service_cost: 0.0,
            spare_cost: 0.0,
        })
        .collect();

    for bucket in buckets.iter().filter(|b| b.year == year) {
        let Some(row) = bucket
            .month
            .checked_sub(1)
            .and_then(|i| months.get_mut(i as usize))
        else {
            continue;
        };
        row.amount += bucket.amount;
        row.service_cost += bucket.service_cost;
        row.spare_cost += bucket.spare_cost;
    }

    let total = months.iter().fold(YearTotal::default(), |mut acc, row| {
        acc.amount += row.amount;
        acc.service_cost += row.service_cost;
        acc.spare_cost += row.spare_cost;
        acc
    });

    YearView {
        year,
        months,
        total,
    }
}

/// Order buckets newest month first.
pub fn sort_reverse_chronological(buckets: &mut [MonthlyBucket]) {
    buckets.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
}

/// Format an amount with grouping separators and two decimals.
///
/// Non-finite input renders as zero.
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let amount = if amount.is_finite() { amount } else { 0.0 };
    let cents = (amount.abs() * 100.0).round() as u64;
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!(
        "{sign}{symbol}{}.{:02}",
        format_number(cents / 100),
        cents % 100
    )
}

/// Format an integer with comma separators.
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, ch) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.chars().rev().collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket(month: u32, year: i32, service: f64, spare: f64) -> MonthlyBucket {
        MonthlyBucket {
            month_year: format!("{} {}", month_name(month), year),
            month,
            year,
            amount: service + spare,
            service_cost: service,
            spare_cost: spare,
        }
    }

    #[test]
    fn year_view_always_has_twelve_months() {
        let view = year_view(&[], 2025);
        assert_eq!(view.months.len(), 12);
        assert!(view.months.iter().all(|m| m.amount == 0.0));
        assert_eq!(view.total, YearTotal::default());

        let view = year_view(&[bucket(3, 2025, 10.0, 5.0)], 2025);
        assert_eq!(view.months.len(), 12);
    }

    #[test]
    fn year_view_fills_matching_months_only() {
        let buckets = vec![
            bucket(1, 2025, 300.0, 50.0),
            bucket(3, 2025, 100.0, 0.0),
            bucket(3, 2024, 999.0, 0.0),
        ];
        let view = year_view(&buckets, 2025);

        assert_eq!(view.months[0].amount, 350.0);
        assert_eq!(view.months[0].name, "January");
        assert_eq!(view.months[1].amount, 0.0);
        assert_eq!(view.months[2].amount, 100.0);
        assert_eq!(view.total.amount, 450.0);
        assert_eq!(view.total.service_cost, 400.0);
        assert_eq!(view.total.spare_cost, 50.0);
    }

    #[test]
    fn sorts_newest_first() {
        let mut buckets = vec![
            bucket(1, 2025, 1.0, 0.0),
            bucket(12, 2024, 1.0, 0.0),
            bucket(3, 2025, 1.0, 0.0),
        ];
        sort_reverse_chronological(&mut buckets);
        let labels: Vec<&str> = buckets.iter().map(|b| b.month_year.as_str()).collect();
        assert_eq!(labels, vec!["March 2025", "January 2025", "December 2024"]);
    }

    #[test]
    fn month_names() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "");
        assert_eq!(month_name(13), "");
        assert_eq!(short_month_name(9), "Sep");
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency(0.0, "₹"), "₹0.00");
        assert_eq!(format_currency(1234.5, "₹"), "₹1,234.50");
        assert_eq!(format_currency(1234567.891, "$"), "$1,234,567.89");
        assert_eq!(format_currency(-42.0, "₹"), "-₹42.00");
        assert_eq!(format_currency(f64::NAN, "₹"), "₹0.00");
    }

    #[test]
    fn number_grouping() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }
}
