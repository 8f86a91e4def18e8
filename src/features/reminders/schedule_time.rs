//! Fixed-offset time convention and reminder input validation
//!
//! Human input (`YYYY-MM-DD` + `HH:mm`) is read in a fixed UTC offset and
//! converted to a UTC instant immediately. The offset is applied again only
//! when rendering.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;

use crate::database::TargetType;

/// Reasons a reminder request is rejected before anything is stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderInputError {
    /// Target is not a `<#channel>` or `<@user>` mention
    InvalidTarget(String),
    InvalidDateTime { date: String, time: String },
    NotInFuture,
    EmptyMessage,
}

impl std::fmt::Display for ReminderInputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReminderInputError::InvalidTarget(raw) => write!(
                f,
                "Target must be a channel mention `<#id>` or user mention `<@id>`, got `{raw}`"
            ),
            ReminderInputError::InvalidDateTime { date, time } => write!(
                f,
                "Invalid date/time `{date} {time}`. Use `YYYY-MM-DD` and `HH:mm` (24h)"
            ),
            ReminderInputError::NotInFuture => write!(f, "Reminder time must be in the future"),
            ReminderInputError::EmptyMessage => write!(f, "Reminder message must not be empty"),
        }
    }
}

impl std::error::Error for ReminderInputError {}

/// A resolved delivery target parsed from a mention
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTarget {
    pub target_type: TargetType,
    pub target_id: String,
}

impl ReminderTarget {
    /// Parse `<@id>`, `<@!id>` or `<#id>` with a 17-20 digit snowflake
    pub fn parse(raw: &str) -> Result<Self, ReminderInputError> {
        let raw = raw.trim();
        let patterns = [
            (r"^<@!?(\d{17,20})>$", TargetType::User),
            (r"^<#(\d{17,20})>$", TargetType::Channel),
        ];

        for (pattern, target_type) in patterns {
            if let Ok(re) = Regex::new(pattern) {
                if let Some(caps) = re.captures(raw) {
                    return Ok(Self {
                        target_type,
                        target_id: caps[1].to_string(),
                    });
                }
            }
        }
        Err(ReminderInputError::InvalidTarget(raw.to_string()))
    }

    /// Discord mention markup for this target
    pub fn mention(&self) -> String {
        mention(self.target_type, &self.target_id)
    }
}

pub fn mention(target_type: TargetType, target_id: &str) -> String {
    match target_type {
        TargetType::Channel => format!("<#{target_id}>"),
        TargetType::User => format!("<@{target_id}>"),
    }
}

/// Which local day an instant falls on, relative to now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
    Other,
}

/// Fixed UTC offset used at the input/rendering boundary
#[derive(Debug, Clone)]
pub struct TimeConvention {
    offset: FixedOffset,
    label: String,
}

impl TimeConvention {
    pub fn new(offset_minutes: i32, label: impl Into<String>) -> Result<Self> {
        let offset = offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| anyhow!("UTC offset out of range: {} minutes", offset_minutes))?;
        Ok(Self {
            offset,
            label: label.into(),
        })
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Interpret a local date and time as an absolute UTC instant
    pub fn parse_local(&self, date: &str, time: &str) -> Result<DateTime<Utc>, ReminderInputError> {
        let invalid = || ReminderInputError::InvalidDateTime {
            date: date.trim().to_string(),
            time: time.trim().to_string(),
        };

        let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").map_err(|_| invalid())?;
        let clock = NaiveTime::parse_from_str(time.trim(), "%H:%M").map_err(|_| invalid())?;
        self.offset
            .from_local_datetime(&day.and_time(clock))
            .single()
            .map(|local| local.with_timezone(&Utc))
            .ok_or_else(invalid)
    }

    /// Parse and require the instant to be strictly after `now`
    pub fn parse_future(
        &self,
        date: &str,
        time: &str,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ReminderInputError> {
        let remind_at = self.parse_local(date, time)?;
        if remind_at <= now {
            return Err(ReminderInputError::NotInFuture);
        }
        Ok(remind_at)
    }

    pub fn local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    pub fn relative_day(&self, instant: DateTime<Utc>, now: DateTime<Utc>) -> RelativeDay {
        let today = self.local_date(now);
        let day = self.local_date(instant);
        if day == today {
            RelativeDay::Today
        } else if day == today + Duration::days(1) {
            RelativeDay::Tomorrow
        } else {
            RelativeDay::Other
        }
    }

    /// `Sunday, 18 October 2026 21:00 WIB`
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        format!(
            "{} {}",
            instant
                .with_timezone(&self.offset)
                .format("%A, %d %B %Y %H:%M"),
            self.label
        )
    }

    /// Like `format`, prefixed with `today`/`tomorrow` where it applies
    pub fn describe(&self, instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
        match self.relative_day(instant, now) {
            RelativeDay::Today => format!("today, {}", self.format(instant)),
            RelativeDay::Tomorrow => format!("tomorrow, {}", self.format(instant)),
            RelativeDay::Other => self.format(instant),
        }
    }
}
