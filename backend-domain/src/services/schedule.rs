use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

use crate::entities::EmailReportPreference;
use crate::utils::hours_between;
use crate::value_objects::ReportFrequency;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("time of day must be HH:MM, got {0:?}")]
    InvalidTime(String),
    #[error("day of week must be 0-6, got {0}")]
    InvalidDayOfWeek(u32),
    #[error("day of month must be 1-31, got {0}")]
    InvalidDayOfMonth(u32),
    #[error("frequency must be daily, weekly or monthly")]
    UnknownFrequency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSpec {
    pub frequency: ReportFrequency,
    pub time_of_day: NaiveTime,
    /// 0 = Sunday.
    pub day_of_week: u32,
    pub day_of_month: u32,
}

impl ScheduleSpec {
    pub fn new(
        frequency: ReportFrequency,
        time_of_day: &str,
        day_of_week: u32,
        day_of_month: u32,
    ) -> Result<Self, ScheduleError> {
        if frequency == ReportFrequency::Unrecognised {
            return Err(ScheduleError::UnknownFrequency);
        }
        let time_of_day = parse_time_of_day(time_of_day)
            .ok_or_else(|| ScheduleError::InvalidTime(time_of_day.to_string()))?;
        if day_of_week > 6 {
            return Err(ScheduleError::InvalidDayOfWeek(day_of_week));
        }
        if !(1..=31).contains(&day_of_month) {
            return Err(ScheduleError::InvalidDayOfMonth(day_of_month));
        }
        Ok(Self {
            frequency,
            time_of_day,
            day_of_week,
            day_of_month,
        })
    }

    pub fn from_preference(preference: &EmailReportPreference) -> Result<Self, ScheduleError> {
        Self::new(
            preference.frequency,
            &preference.time_of_day,
            preference.day_of_week,
            preference.day_of_month,
        )
    }
}

/// Strict `HH:MM`, 24-hour clock.
pub fn parse_time_of_day(raw: &str) -> Option<NaiveTime> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

fn at_local(date: NaiveDate, time: NaiveTime, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = NaiveDateTime::new(date, time);
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// `day` in the given month, pulled back to the month's last day when it does not exist.
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(last_day_of_month(year, month)))
}

/// Next send instant strictly after `now`, in `now`'s offset.
pub fn next_send_time(spec: &ScheduleSpec, now: DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    let offset = *now.offset();
    let today = now.date_naive();
    match spec.frequency {
        ReportFrequency::Daily => {
            let candidate = at_local(today, spec.time_of_day, offset);
            if candidate > now {
                candidate
            } else {
                candidate + Duration::days(1)
            }
        }
        ReportFrequency::Weekly | ReportFrequency::Unrecognised => {
            let current = today.weekday().num_days_from_sunday();
            let ahead = (spec.day_of_week + 7 - current) % 7;
            let candidate = at_local(
                today + Duration::days(i64::from(ahead)),
                spec.time_of_day,
                offset,
            );
            if candidate > now {
                candidate
            } else {
                candidate + Duration::days(7)
            }
        }
        ReportFrequency::Monthly => {
            let this_month = clamped_date(today.year(), today.month(), spec.day_of_month)
                .map(|date| at_local(date, spec.time_of_day, offset));
            match this_month {
                Some(candidate) if candidate > now => candidate,
                _ => {
                    let (year, month) = if today.month() == 12 {
                        (today.year() + 1, 1)
                    } else {
                        (today.year(), today.month() + 1)
                    };
                    clamped_date(year, month, spec.day_of_month)
                        .map(|date| at_local(date, spec.time_of_day, offset))
                        .unwrap_or_else(|| now + Duration::days(30))
                }
            }
        }
    }
}

/// Never-sent preferences are always due, unrecognised frequencies never are.
pub fn is_due(frequency: ReportFrequency, last_sent: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    let Some(min_hours) = frequency.min_hours_between_sends() else {
        return false;
    };
    match last_sent {
        None => true,
        Some(last_sent) => hours_between(last_sent, now) >= min_hours,
    }
}
