use chrono::{Days, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Countdown {
    NoStartDate,
    Remaining { days: i64, target: NaiveDate },
    DueToday { target: NaiveDate },
    Exceeded { days: i64, target: NaiveDate },
}

impl Countdown {
    /// Calendar arithmetic: the target is `start` plus `window_days` days,
    /// compared with `today` at whole-day granularity.
    pub fn compute(start: Option<NaiveDate>, today: NaiveDate, window_days: i64) -> Self {
        let Some(start) = start else {
            return Self::NoStartDate;
        };
        let target = if window_days >= 0 {
            start.checked_add_days(Days::new(window_days as u64))
        } else {
            start.checked_sub_days(Days::new(window_days.unsigned_abs()))
        }
        .unwrap_or(start);

        let remaining = (target - today).num_days();
        if remaining > 0 {
            Self::Remaining { days: remaining, target }
        } else if remaining == 0 {
            Self::DueToday { target }
        } else {
            Self::Exceeded { days: -remaining, target }
        }
    }

    pub fn target(&self) -> Option<NaiveDate> {
        match self {
            Self::NoStartDate => None,
            Self::Remaining { target, .. }
            | Self::DueToday { target }
            | Self::Exceeded { target, .. } => Some(*target),
        }
    }
}
