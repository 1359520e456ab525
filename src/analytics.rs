//! Derived views over a loaded transaction list.
//!
//! Everything here is a pure function of its inputs: callers load the
//! lists from storage and pass in "today" explicitly, so nothing reads the
//! store or the clock. Sums use plain `f64` accumulation; rounding is left
//! to presentation. Divisions that could hit zero are defined away by
//! convention (an empty denominator yields 0).

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{Budget, BudgetPeriod, Transaction, TransactionType};

pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

pub const TOP_CATEGORY_COUNT: usize = 5;

/// Inclusive calendar-day window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        DateRange { start, end }
    }

    /// The calendar month containing `date`.
    pub fn month_of(date: NaiveDate) -> Self {
        let start = first_of_month(date);
        DateRange { start, end: last_of_month(start) }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days covered; 0 for an inverted window.
    pub fn day_count(&self) -> i64 {
        if self.end < self.start {
            0
        } else {
            (self.end - self.start).num_days() + 1
        }
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |d| *d <= self.end)
    }

    /// First day of every calendar month the window touches, in order.
    pub fn months(&self) -> Vec<NaiveDate> {
        let mut months = Vec::new();
        if self.end < self.start {
            return months;
        }
        let last = first_of_month(self.end);
        let mut current = first_of_month(self.start);
        while current <= last {
            months.push(current);
            current = current + Months::new(1);
        }
        months
    }
}

/// Look-back presets offered by the analytics view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[serde(rename = "30days")]
    Last30Days,
    #[serde(rename = "3months")]
    Last3Months,
    #[default]
    #[serde(rename = "6months")]
    Last6Months,
    #[serde(rename = "1year")]
    LastYear,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Last30Days => "30days",
            TimeRange::Last3Months => "3months",
            TimeRange::Last6Months => "6months",
            TimeRange::LastYear => "1year",
        }
    }

    /// Window ending on `today`.
    pub fn window(&self, today: NaiveDate) -> DateRange {
        let start = match self {
            TimeRange::Last30Days => today - Duration::days(30),
            TimeRange::Last3Months => today - Months::new(3),
            TimeRange::Last6Months => today - Months::new(6),
            TimeRange::LastYear => today - Months::new(12),
        };
        DateRange::new(start, today)
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "30days" => Ok(TimeRange::Last30Days),
            "3months" => Ok(TimeRange::Last3Months),
            "6months" => Ok(TimeRange::Last6Months),
            "1year" => Ok(TimeRange::LastYear),
            other => Err(format!(
                "unknown time range '{}' (expected 30days, 3months, 6months or 1year)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekdaySpending {
    pub day: &'static str,
    pub amount: f64,
    pub count: usize,
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyTrend {
    pub month: NaiveDate,
    pub label: String,
    pub income: f64,
    pub expenses: f64,
    pub profit: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySpending {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_income: f64,
    pub total_expenses: f64,
    pub net_savings: f64,
    pub savings_rate: f64,
    pub avg_daily_expense: f64,
    pub avg_transaction: f64,
    pub transaction_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    Good,
    Warning,
    Exceeded,
}

impl BudgetHealth {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetHealth::Good => "good",
            BudgetHealth::Warning => "warning",
            BudgetHealth::Exceeded => "exceeded",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetStatus {
    pub spent: f64,
    pub percentage: f64,
    pub remaining: f64,
    pub status: BudgetHealth,
}

pub fn filter_by_range<'a>(transactions: &'a [Transaction], range: &DateRange) -> Vec<&'a Transaction> {
    transactions.iter().filter(|t| range.contains(t.date)).collect()
}

fn total_of<'a, I>(transactions: I, kind: TransactionType) -> f64
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|t| t.transaction_type == kind)
        .map(|t| t.amount)
        .sum()
}

pub fn savings_rate(income: f64, expenses: f64) -> f64 {
    if income > 0.0 {
        (income - expenses) / income * 100.0
    } else {
        0.0
    }
}

/// Expense totals per category, largest first. Ties keep first-seen order.
pub fn category_breakdown(transactions: &[Transaction], range: &DateRange) -> Vec<CategoryTotal> {
    breakdown_of(filter_by_range(transactions, range))
}

fn breakdown_of<'a, I>(transactions: I) -> Vec<CategoryTotal>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut totals: Vec<CategoryTotal> = Vec::new();
    for t in transactions.into_iter().filter(|t| t.is_expense()) {
        match totals.iter_mut().find(|c| c.name == t.category) {
            Some(entry) => entry.value += t.amount,
            None => totals.push(CategoryTotal { name: t.category.clone(), value: t.amount }),
        }
    }
    // sort_by is stable
    totals.sort_by(|a, b| b.value.total_cmp(&a.value));
    totals
}

pub fn top_categories(transactions: &[Transaction], range: &DateRange, count: usize) -> Vec<CategoryTotal> {
    let mut breakdown = category_breakdown(transactions, range);
    breakdown.truncate(count);
    breakdown
}

/// Always seven slots, Sunday first.
pub fn weekday_spending(transactions: &[Transaction], range: &DateRange) -> [WeekdaySpending; 7] {
    let mut slots: [WeekdaySpending; 7] = std::array::from_fn(|i| WeekdaySpending {
        day: WEEKDAYS[i],
        amount: 0.0,
        count: 0,
        average: 0.0,
    });

    for t in filter_by_range(transactions, range).into_iter().filter(|t| t.is_expense()) {
        let slot = &mut slots[t.date.weekday().num_days_from_sunday() as usize];
        slot.amount += t.amount;
        slot.count += 1;
    }
    for slot in slots.iter_mut().filter(|s| s.count > 0) {
        slot.average = slot.amount / slot.count as f64;
    }
    slots
}

/// One bucket per calendar month the window spans, zero months included.
/// Buckets cover the whole month, not just the part inside the window.
pub fn income_expense_trend(transactions: &[Transaction], range: &DateRange) -> Vec<MonthlyTrend> {
    range
        .months()
        .into_iter()
        .map(|month| {
            let bounds = DateRange::month_of(month);
            let in_month = filter_by_range(transactions, &bounds);
            let income = total_of(in_month.iter().copied(), TransactionType::Income);
            let expenses = total_of(in_month.iter().copied(), TransactionType::Expense);
            MonthlyTrend {
                month,
                label: month.format("%b %Y").to_string(),
                income,
                expenses,
                profit: income - expenses,
            }
        })
        .collect()
}

/// Expense total for every day of the window, in order.
pub fn daily_spending(transactions: &[Transaction], range: &DateRange) -> Vec<DailySpending> {
    let expenses: Vec<&Transaction> = filter_by_range(transactions, range)
        .into_iter()
        .filter(|t| t.is_expense())
        .collect();
    range
        .days()
        .map(|date| DailySpending {
            date,
            amount: expenses.iter().filter(|t| t.date == date).map(|t| t.amount).sum(),
        })
        .collect()
}

pub fn statistics(transactions: &[Transaction], range: &DateRange) -> Statistics {
    let filtered = filter_by_range(transactions, range);
    let income = total_of(filtered.iter().copied(), TransactionType::Income);
    let expenses = total_of(filtered.iter().copied(), TransactionType::Expense);
    let expense_count = filtered.iter().filter(|t| t.is_expense()).count();

    Statistics {
        total_income: income,
        total_expenses: expenses,
        net_savings: income - expenses,
        savings_rate: savings_rate(income, expenses),
        avg_daily_expense: expenses / range.day_count().max(1) as f64,
        avg_transaction: expenses / expense_count.max(1) as f64,
        transaction_count: filtered.len(),
    }
}

/// Everything the analytics view shows for one window.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
    pub range: DateRange,
    pub statistics: Statistics,
    pub trend: Vec<MonthlyTrend>,
    pub category_breakdown: Vec<CategoryTotal>,
    pub top_categories: Vec<CategoryTotal>,
    pub daily_spending: Vec<DailySpending>,
    pub weekday_spending: [WeekdaySpending; 7],
}

/// `daily_days` keeps only the most recent days of the daily pattern.
pub fn analytics_report(transactions: &[Transaction], range: DateRange, daily_days: usize) -> AnalyticsReport {
    let breakdown = category_breakdown(transactions, &range);
    let mut daily = daily_spending(transactions, &range);
    if daily.len() > daily_days {
        daily.drain(..daily.len() - daily_days);
    }

    AnalyticsReport {
        range,
        statistics: statistics(transactions, &range),
        trend: income_expense_trend(transactions, &range),
        top_categories: breakdown.iter().take(TOP_CATEGORY_COUNT).cloned().collect(),
        category_breakdown: breakdown,
        daily_spending: daily,
        weekday_spending: weekday_spending(transactions, &range),
    }
}

/// The current week (Sunday to Saturday), month or year around `today`.
pub fn period_window(period: BudgetPeriod, today: NaiveDate) -> DateRange {
    match period {
        BudgetPeriod::Weekly => {
            let start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
            DateRange::new(start, start + Duration::days(6))
        }
        BudgetPeriod::Monthly => DateRange::month_of(today),
        BudgetPeriod::Yearly => {
            let start = today - Duration::days(today.ordinal0() as i64);
            let end = start + Months::new(12) - Duration::days(1);
            DateRange::new(start, end)
        }
    }
}

pub fn budget_spent(budget: &Budget, transactions: &[Transaction], today: NaiveDate) -> f64 {
    let window = period_window(budget.period, today);
    transactions
        .iter()
        .filter(|t| t.is_expense() && t.category == budget.category && window.contains(t.date))
        .map(|t| t.amount)
        .sum()
}

pub fn classify(percentage: f64, alert_threshold: u8) -> BudgetHealth {
    if percentage >= 100.0 {
        BudgetHealth::Exceeded
    } else if percentage >= alert_threshold as f64 {
        BudgetHealth::Warning
    } else {
        BudgetHealth::Good
    }
}

pub fn budget_status(budget: &Budget, transactions: &[Transaction], today: NaiveDate) -> BudgetStatus {
    let spent = budget_spent(budget, transactions, today);
    // A non-positive ceiling only comes from imported data; any spending
    // against it counts as fully used.
    let percentage = if budget.amount > 0.0 {
        spent / budget.amount * 100.0
    } else if spent > 0.0 {
        100.0
    } else {
        0.0
    };
    BudgetStatus {
        spent,
        percentage,
        remaining: budget.amount - spent,
        status: classify(percentage, budget.alert_threshold),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    pub balance: f64,
    pub savings_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetReport {
    #[serde(flatten)]
    pub budget: Budget,
    #[serde(flatten)]
    pub status: BudgetStatus,
}

/// Dashboard landing view for the month containing `today`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overview {
    pub summary: MonthSummary,
    pub monthly_trend: Vec<MonthlyTrend>,
    pub category_breakdown: Vec<CategoryTotal>,
    pub budgets: Vec<BudgetReport>,
}

pub fn budget_reports(budgets: &[Budget], transactions: &[Transaction], today: NaiveDate) -> Vec<BudgetReport> {
    budgets
        .iter()
        .map(|b| BudgetReport { budget: b.clone(), status: budget_status(b, transactions, today) })
        .collect()
}

pub fn overview(transactions: &[Transaction], budgets: &[Budget], today: NaiveDate) -> Overview {
    let month = DateRange::month_of(today);
    let in_month = filter_by_range(transactions, &month);
    let income = total_of(in_month.iter().copied(), TransactionType::Income);
    let expenses = total_of(in_month.iter().copied(), TransactionType::Expense);

    let six_months = DateRange::new(first_of_month(today) - Months::new(5), month.end);

    Overview {
        summary: MonthSummary {
            total_income: income,
            total_expenses: expenses,
            balance: income - expenses,
            savings_rate: savings_rate(income, expenses),
        },
        monthly_trend: income_expense_trend(transactions, &six_months),
        category_breakdown: breakdown_of(in_month.iter().copied()),
        budgets: budget_reports(budgets, transactions, today),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.day0() as i64)
}

fn last_of_month(first: NaiveDate) -> NaiveDate {
    first + Months::new(1) - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(kind: TransactionType, amount: f64, category: &str, on: NaiveDate) -> Transaction {
        Transaction {
            id: format!("{}-{}-{}", category, amount, on),
            transaction_type: kind,
            amount,
            category: category.to_string(),
            description: String::new(),
            date: on,
        }
    }

    fn june_sample() -> Vec<Transaction> {
        vec![
            tx(TransactionType::Income, 1000.0, "Salary", date(2024, 6, 1)),
            tx(TransactionType::Expense, 200.0, "Food", date(2024, 6, 5)),
            tx(TransactionType::Expense, 100.0, "Transport", date(2024, 6, 10)),
        ]
    }

    fn budget(category: &str, amount: f64, period: BudgetPeriod, threshold: u8) -> Budget {
        Budget {
            id: "b1".to_string(),
            category: category.to_string(),
            amount,
            period,
            alert_threshold: threshold,
            notes: String::new(),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn june_example_statistics() {
        let june = DateRange::month_of(date(2024, 6, 15));
        let stats = statistics(&june_sample(), &june);
        assert_eq!(stats.total_income, 1000.0);
        assert_eq!(stats.total_expenses, 300.0);
        assert_eq!(stats.net_savings, 700.0);
        assert_eq!(stats.savings_rate, 70.0);
        assert_eq!(stats.avg_daily_expense, 10.0);
        assert_eq!(stats.avg_transaction, 150.0);
        assert_eq!(stats.transaction_count, 3);

        assert_eq!(
            category_breakdown(&june_sample(), &june),
            vec![
                CategoryTotal { name: "Food".to_string(), value: 200.0 },
                CategoryTotal { name: "Transport".to_string(), value: 100.0 },
            ]
        );
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let range = DateRange::new(date(2024, 6, 5), date(2024, 6, 10));
        let sample = june_sample();
        let filtered = filter_by_range(&sample, &range);
        assert_eq!(filtered.len(), 2);
        assert!(filter_by_range(&june_sample(), &DateRange::new(date(2024, 6, 6), date(2024, 6, 9))).is_empty());
    }

    #[test]
    fn net_savings_matches_totals() {
        let mut data = june_sample();
        data.push(tx(TransactionType::Expense, 1234.56, "Rent", date(2024, 6, 20)));
        data.push(tx(TransactionType::Income, 0.44, "Interest", date(2024, 6, 30)));
        let range = DateRange::month_of(date(2024, 6, 1));
        let stats = statistics(&data, &range);
        assert_eq!(stats.total_income - stats.total_expenses, stats.net_savings);
    }

    #[test]
    fn savings_rate_is_zero_without_income() {
        let data = vec![tx(TransactionType::Expense, 50.0, "Food", date(2024, 6, 2))];
        let stats = statistics(&data, &DateRange::month_of(date(2024, 6, 1)));
        assert_eq!(stats.savings_rate, 0.0);
        assert_eq!(stats.net_savings, -50.0);
        assert_eq!(savings_rate(0.0, 0.0), 0.0);
    }

    #[test]
    fn empty_input_yields_zeroes() {
        let stats = statistics(&[], &DateRange::month_of(date(2024, 2, 1)));
        assert_eq!(stats, Statistics::default());
    }

    #[test]
    fn breakdown_sums_to_total_expenses() {
        let mut data = june_sample();
        data.push(tx(TransactionType::Expense, 75.25, "Food", date(2024, 6, 12)));
        data.push(tx(TransactionType::Expense, 19.5, "Fun", date(2024, 6, 13)));
        let range = DateRange::month_of(date(2024, 6, 1));
        let breakdown = category_breakdown(&data, &range);
        let sum: f64 = breakdown.iter().map(|c| c.value).sum();
        assert!((sum - statistics(&data, &range).total_expenses).abs() < 1e-9);
        assert_eq!(breakdown[0].name, "Food");
        assert!(breakdown.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn breakdown_ties_keep_first_seen_order() {
        let data = vec![
            tx(TransactionType::Expense, 10.0, "B", date(2024, 6, 1)),
            tx(TransactionType::Expense, 10.0, "A", date(2024, 6, 2)),
        ];
        let names: Vec<String> = category_breakdown(&data, &DateRange::month_of(date(2024, 6, 1)))
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn top_categories_truncates() {
        let data: Vec<Transaction> = (1..=7)
            .map(|i| tx(TransactionType::Expense, i as f64, &format!("C{}", i), date(2024, 6, i)))
            .collect();
        let top = top_categories(&data, &DateRange::month_of(date(2024, 6, 1)), TOP_CATEGORY_COUNT);
        assert_eq!(top.len(), 5);
        assert_eq!(top[0].name, "C7");
    }

    #[test]
    fn weekday_buckets_are_fixed() {
        let empty = weekday_spending(&[], &DateRange::month_of(date(2024, 6, 1)));
        assert_eq!(empty.len(), 7);
        assert_eq!(empty[0].day, "Sunday");
        assert_eq!(empty[6].day, "Saturday");
        assert!(empty.iter().all(|d| d.amount == 0.0 && d.count == 0 && d.average == 0.0));

        let slots = weekday_spending(&june_sample(), &DateRange::month_of(date(2024, 6, 1)));
        // 2024-06-05 was a Wednesday, 2024-06-10 a Monday
        assert_eq!(slots[3].amount, 200.0);
        assert_eq!(slots[1].amount, 100.0);
        assert_eq!(slots[1].average, 100.0);
        assert_eq!(slots[6].count, 0);
    }

    #[test]
    fn trend_spans_every_month_in_order() {
        let range = DateRange::new(date(2024, 4, 15), date(2024, 6, 10));
        let trend = income_expense_trend(&june_sample(), &range);
        let labels: Vec<&str> = trend.iter().map(|m| m.label.as_str()).collect();
        assert_eq!(labels, vec!["Apr 2024", "May 2024", "Jun 2024"]);
        assert_eq!(trend[0].income, 0.0);
        assert_eq!(trend[1].expenses, 0.0);
        assert_eq!(trend[2].profit, 700.0);
    }

    #[test]
    fn trend_crosses_year_boundary() {
        let months = DateRange::new(date(2023, 11, 30), date(2024, 2, 1)).months();
        assert_eq!(months, vec![date(2023, 11, 1), date(2023, 12, 1), date(2024, 1, 1), date(2024, 2, 1)]);
    }

    #[test]
    fn daily_spending_covers_each_day() {
        let range = DateRange::new(date(2024, 6, 4), date(2024, 6, 6));
        let daily = daily_spending(&june_sample(), &range);
        assert_eq!(daily.len(), 3);
        assert_eq!(daily[1], DailySpending { date: date(2024, 6, 5), amount: 200.0 });
        assert_eq!(daily[0].amount, 0.0);
    }

    #[test]
    fn report_keeps_latest_days() {
        let range = TimeRange::Last3Months.window(date(2024, 6, 30));
        let report = analytics_report(&june_sample(), range, 30);
        assert_eq!(report.daily_spending.len(), 30);
        assert_eq!(report.daily_spending.last().unwrap().date, date(2024, 6, 30));
        assert_eq!(report.trend.len(), 4);
    }

    #[test]
    fn time_range_windows() {
        let today = date(2024, 8, 31);
        assert_eq!(TimeRange::Last30Days.window(today).start, date(2024, 8, 1));
        assert_eq!(TimeRange::Last6Months.window(today).start, date(2024, 2, 29));
        assert_eq!(TimeRange::LastYear.window(today).start, date(2023, 8, 31));
        assert_eq!("3months".parse::<TimeRange>().unwrap(), TimeRange::Last3Months);
        assert!("2weeks".parse::<TimeRange>().is_err());
    }

    #[test]
    fn period_windows() {
        // Wednesday
        let today = date(2024, 6, 5);
        assert_eq!(
            period_window(BudgetPeriod::Weekly, today),
            DateRange::new(date(2024, 6, 2), date(2024, 6, 8))
        );
        assert_eq!(
            period_window(BudgetPeriod::Monthly, date(2024, 2, 10)),
            DateRange::new(date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            period_window(BudgetPeriod::Yearly, today),
            DateRange::new(date(2024, 1, 1), date(2024, 12, 31))
        );
    }

    #[test]
    fn budget_status_thresholds() {
        let today = date(2024, 6, 15);
        let data = june_sample();

        let good = budget_status(&budget("Food", 1000.0, BudgetPeriod::Monthly, 80), &data, today);
        assert_eq!(good.spent, 200.0);
        assert_eq!(good.percentage, 20.0);
        assert_eq!(good.remaining, 800.0);
        assert_eq!(good.status, BudgetHealth::Good);

        let warning = budget_status(&budget("Food", 250.0, BudgetPeriod::Monthly, 80), &data, today);
        assert_eq!(warning.percentage, 80.0);
        assert_eq!(warning.status, BudgetHealth::Warning);

        let exceeded = budget_status(&budget("Food", 200.0, BudgetPeriod::Monthly, 80), &data, today);
        assert_eq!(exceeded.percentage, 100.0);
        assert_eq!(exceeded.status, BudgetHealth::Exceeded);
        assert_eq!(exceeded.remaining, 0.0);
    }

    #[test]
    fn budget_status_uses_period_window() {
        let data = june_sample();
        // Week of 2024-06-09..15 holds only the Transport expense.
        let weekly = budget("Food", 100.0, BudgetPeriod::Weekly, 50);
        assert_eq!(budget_status(&weekly, &data, date(2024, 6, 12)).spent, 0.0);
        assert_eq!(budget_status(&weekly, &data, date(2024, 6, 6)).spent, 200.0);

        let yearly = budget("Transport", 1000.0, BudgetPeriod::Yearly, 50);
        assert_eq!(budget_status(&yearly, &data, date(2024, 12, 31)).spent, 100.0);
        assert_eq!(budget_status(&yearly, &data, date(2025, 1, 1)).spent, 0.0);
    }

    #[test]
    fn zero_ceiling_does_not_divide_by_zero() {
        let data = june_sample();
        let status = budget_status(&budget("Food", 0.0, BudgetPeriod::Monthly, 80), &data, date(2024, 6, 1));
        assert_eq!(status.percentage, 100.0);
        assert_eq!(status.status, BudgetHealth::Exceeded);
        let idle = budget_status(&budget("Gifts", 0.0, BudgetPeriod::Monthly, 80), &data, date(2024, 6, 1));
        assert_eq!(idle.status, BudgetHealth::Good);
    }

    #[test]
    fn classify_matches_threshold_rules() {
        assert_eq!(classify(99.99, 100), BudgetHealth::Good);
        assert_eq!(classify(100.0, 100), BudgetHealth::Exceeded);
        assert_eq!(classify(0.0, 0), BudgetHealth::Warning);
        assert_eq!(classify(79.9, 80), BudgetHealth::Good);
    }

    #[test]
    fn overview_summarises_current_month() {
        let budgets = vec![budget("Food", 400.0, BudgetPeriod::Monthly, 80)];
        let view = overview(&june_sample(), &budgets, date(2024, 6, 20));
        assert_eq!(view.summary.balance, 700.0);
        assert_eq!(view.summary.savings_rate, 70.0);
        assert_eq!(view.monthly_trend.len(), 6);
        assert_eq!(view.monthly_trend[0].label, "Jan 2024");
        assert_eq!(view.category_breakdown.len(), 2);
        assert_eq!(view.budgets[0].status.percentage, 50.0);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["budgets"][0]["category"], "Food");
        assert_eq!(json["budgets"][0]["status"], "good");
    }
}
