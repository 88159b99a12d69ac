/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Commission lifecycle dates carry no time of day.
pub type CalendarDate = chrono::NaiveDate;

/// Today's date in UTC.
pub fn today() -> CalendarDate {
    chrono::Utc::now().date_naive()
}
