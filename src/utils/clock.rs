use chrono::{DateTime, Local, NaiveDate};

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// The calendar day a fresh planner starts on.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

pub struct DefaultClock;

impl Clock for DefaultClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}
