use crate::record::{ClockTime, DailyRecord};

/// Rendered in place of a time the fitness API did not report.
pub const MISSING: &str = "数据缺失";

/// Render a record as its posted line.
///
/// ```text
/// 2026-01-06: 睡觉 23:30 起床 07:00
/// 2026-01-06: 睡觉 23:30 起床 数据缺失
/// ```
pub fn format_record(record: &DailyRecord) -> String {
    format!(
        "{}: 睡觉 {} 起床 {}",
        record.date.format("%Y-%m-%d"),
        render(record.sleep),
        render(record.wake)
    )
}

fn render(time: Option<ClockTime>) -> String {
    time.map_or_else(|| MISSING.to_string(), |t| t.to_string())
}
