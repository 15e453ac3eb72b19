use chrono::NaiveDate;

/// Last regular-season week
pub const FINAL_WEEK: u32 = 15;

/// Season week for `date`.
///
/// Week 1 runs Monday `week1_start` through the following Sunday and each
/// later week is another Monday-Sunday cycle. Anything earlier, including
/// the week 0 weekend, is week 0.
pub fn current_week(date: NaiveDate, week1_start: NaiveDate) -> u32 {
    if date < week1_start {
        return 0;
    }
    let days = (date - week1_start).num_days();
    let week = u32::try_from(days / 7 + 1).unwrap_or(FINAL_WEEK);
    week.min(FINAL_WEEK)
}
