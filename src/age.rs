// Copyright 2025 Cowboy AI, LLC.

//! Age derived from a birth date

use chrono::{Local, NaiveDate};

/// Whole years elapsed between `birth_date` and `today`.
///
/// A year only counts once the birth month/day has been reached in the
/// current year. An absent or future birth date yields 0, never a negative
/// value.
///
/// ```rust
/// use chrono::NaiveDate;
/// use petclinic_domain::age_in_years;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// let birth = NaiveDate::from_ymd_opt(2019, 6, 16).unwrap();
/// assert_eq!(age_in_years(Some(birth), today), 4);
/// assert_eq!(age_in_years(None, today), 0);
/// ```
pub fn age_in_years(birth_date: Option<NaiveDate>, today: NaiveDate) -> u32 {
    birth_date
        .and_then(|birth| today.years_since(birth))
        .unwrap_or(0)
}

/// Today's date on the local clock.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
