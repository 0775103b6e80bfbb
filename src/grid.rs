//! Month grid generation.
//!
//! A [`MonthGrid`] covers the displayed month padded with leading and trailing
//! days from the adjacent months, so that it is made of whole weeks.

use crate::model::Event;
use chrono::{Datelike, Days, Local, Months, NaiveDate, Weekday};
use std::collections::HashMap;

/// One displayed day.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell<'a> {
    pub date: NaiveDate,
    /// Events on this day, earliest first.
    pub events: Vec<&'a Event>,
    /// False for leading/trailing days of the adjacent months.
    pub in_month: bool,
    pub is_today: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Week<'a> {
    pub days: [Cell<'a>; 7],
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid<'a> {
    month_start: NaiveDate,
    week_start: Weekday,
    pub weeks: Vec<Week<'a>>,
}

impl<'a> MonthGrid<'a> {
    /// First day of the displayed month.
    pub fn month_start(&self) -> NaiveDate {
        self.month_start
    }

    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// e.g. "March 2024"
    pub fn title(&self) -> String {
        self.month_start.format("%B %Y").to_string()
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell<'a>> {
        self.weeks.iter().flat_map(|w| w.days.iter())
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&Cell<'a>> {
        self.cells().find(|c| c.date == date)
    }
}

/// Builds the grid for the month containing `reference`.
pub fn generate<'a>(
    reference: NaiveDate,
    events: &'a [Event],
    today: NaiveDate,
    week_start: Weekday,
) -> MonthGrid<'a> {
    let month_start = first_of_month(reference);
    let month_end = last_of_month(reference);
    let grid_start = start_of_week(month_start, week_start);
    let grid_end = start_of_week(month_end, week_start)
        .checked_add_days(Days::new(6))
        .unwrap_or(NaiveDate::MAX);

    let mut by_day: HashMap<NaiveDate, Vec<&'a Event>> = HashMap::new();
    for event in events {
        let day = event.day();
        if day >= grid_start && day <= grid_end {
            by_day.entry(day).or_default().push(event);
        }
    }

    let mut weeks = Vec::new();
    let mut row_start = grid_start;
    // Rows are clamped at the ends of the representable date range
    loop {
        let days = std::array::from_fn(|i| {
            let date = row_start
                .checked_add_days(Days::new(i as u64))
                .unwrap_or(NaiveDate::MAX);
            let mut events = by_day.remove(&date).unwrap_or_default();
            events.sort_by_key(|e| e.date);
            Cell {
                date,
                events,
                in_month: date.year() == month_start.year() && date.month() == month_start.month(),
                is_today: date == today,
            }
        });
        weeks.push(Week { days });
        match row_start.checked_add_days(Days::new(7)) {
            Some(next) if next <= grid_end => row_start = next,
            _ => break,
        }
    }

    MonthGrid {
        month_start,
        week_start,
        weeks,
    }
}

/// [`generate`] with today's local date and weeks starting on Sunday.
pub fn generate_grid(reference: NaiveDate, events: &[Event]) -> MonthGrid<'_> {
    generate(reference, events, Local::now().date_naive(), Weekday::Sun)
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Days::new(date.day0() as u64)
}

pub fn last_of_month(date: NaiveDate) -> NaiveDate {
    first_of_month(date) + Days::new(days_in_month(date.year(), date.month()) as u64 - 1)
}

pub fn start_of_week(date: NaiveDate, week_start: Weekday) -> NaiveDate {
    let offset =
        (7 + date.weekday().num_days_from_monday() - week_start.num_days_from_monday()) % 7;
    date
        .checked_sub_days(Days::new(offset as u64))
        .unwrap_or(NaiveDate::MIN)
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Same day next month, clamped to the month's last day.
pub fn next_month(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1)).unwrap_or(date)
}

/// Same day last month, clamped to the month's last day.
pub fn prev_month(date: NaiveDate) -> NaiveDate {
    date.checked_sub_months(Months::new(1)).unwrap_or(date)
}

/// Full weekday names in display order.
pub fn weekday_labels(week_start: Weekday) -> [&'static str; 7] {
    let mut day = week_start;
    std::array::from_fn(|_| {
        let label = match day {
            Weekday::Mon => "Monday",
            Weekday::Tue => "Tuesday",
            Weekday::Wed => "Wednesday",
            Weekday::Thu => "Thursday",
            Weekday::Fri => "Friday",
            Weekday::Sat => "Saturday",
            Weekday::Sun => "Sunday",
        };
        day = day.succ();
        label
    })
}
