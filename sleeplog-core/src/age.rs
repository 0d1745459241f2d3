use chrono::{Datelike, Months, NaiveDate};

/// Age between `birthday` and `today` as `X岁Y个月Z天`.
///
/// Zero year and month parts are left out; the day part is shown when it is
/// non-zero or when nothing else would be. A birthday on or after `today`
/// renders as `0天`.
pub fn describe_age(birthday: NaiveDate, today: NaiveDate) -> String {
    if today <= birthday {
        return "0天".to_string();
    }

    // Whole months elapsed, then the days left over since the last monthly
    // anniversary. Anniversaries clamp to month end (Jan 31 + 1 month = Feb 28).
    let mut months = (today.year() - birthday.year()) * 12 + today.month() as i32
        - birthday.month() as i32;
    let mut anchor = anniversary(birthday, months);
    if anchor.map_or(true, |a| a > today) {
        months -= 1;
        anchor = anniversary(birthday, months);
    }
    let days = anchor.map_or(0, |a| (today - a).num_days());

    let years = months / 12;
    let months = months % 12;

    let mut out = String::new();
    if years > 0 {
        out.push_str(&format!("{}岁", years));
    }
    if months > 0 {
        out.push_str(&format!("{}个月", months));
    }
    if days > 0 || out.is_empty() {
        out.push_str(&format!("{}天", days));
    }
    out
}

fn anniversary(birthday: NaiveDate, months: i32) -> Option<NaiveDate> {
    u32::try_from(months)
        .ok()
        .and_then(|m| birthday.checked_add_months(Months::new(m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn months_and_days() {
        assert_eq!(describe_age(date(2025, 5, 10), date(2026, 1, 8)), "7个月29天");
    }

    #[test]
    fn borrows_from_short_february() {
        assert_eq!(describe_age(date(2025, 1, 31), date(2025, 3, 1)), "1个月1天");
    }

    #[test]
    fn exact_anniversary_has_no_day_part() {
        assert_eq!(describe_age(date(2025, 5, 10), date(2026, 5, 10)), "1岁");
    }

    #[test]
    fn birthday_today_is_zero_days() {
        assert_eq!(describe_age(date(2025, 5, 10), date(2025, 5, 10)), "0天");
    }
}
