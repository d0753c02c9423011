use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

const DAY_NAMES: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// The window during which scheduling is permitted. Days are numbered
/// 0-6 with 0 = Sunday. The end time is exclusive: a 17:00 end means the
/// last schedulable minute is 16:59.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
    pub days: Vec<u32>,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            end: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            days: vec![1, 2, 3, 4, 5],
        }
    }
}

impl BusinessHours {
    pub fn parse(start: &str, end: &str, days: &[u32]) -> anyhow::Result<Self> {
        let start = NaiveTime::parse_from_str(start, "%H:%M")
            .map_err(|_| anyhow::anyhow!("invalid start time: {start}"))?;
        let end = NaiveTime::parse_from_str(end, "%H:%M")
            .map_err(|_| anyhow::anyhow!("invalid end time: {end}"))?;
        if start >= end {
            anyhow::bail!("start must be before end");
        }
        for day in days {
            if *day > 6 {
                anyhow::bail!("invalid weekday number: {day}");
            }
        }
        Ok(Self {
            start,
            end,
            days: days.to_vec(),
        })
    }

    /// Weekday must be in the configured day set and the minute-of-day must
    /// lie in the half-open interval [start, end).
    pub fn is_open_at(&self, dt: &NaiveDateTime) -> bool {
        let weekday = dt.weekday().num_days_from_sunday();
        if !self.days.contains(&weekday) {
            return false;
        }
        let minute = dt.time().hour() * 60 + dt.time().minute();
        let start = self.start.hour() * 60 + self.start.minute();
        let end = self.end.hour() * 60 + self.end.minute();
        start <= minute && minute < end
    }

    /// Speech-friendly rendering, e.g. "Monday through Friday, 9:00 AM to
    /// 5:00 PM". Non-contiguous day sets are listed individually.
    pub fn to_speech(&self) -> String {
        let mut days = self.days.clone();
        days.sort_unstable();
        days.dedup();

        let day_part = if days.is_empty() {
            "no days".to_string()
        } else if days.len() == 1 {
            day_name(days[0]).to_string()
        } else if is_contiguous(&days) {
            format!(
                "{} through {}",
                day_name(days[0]),
                day_name(days[days.len() - 1])
            )
        } else {
            days.iter()
                .map(|d| day_name(*d))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "{day_part}, {} to {}",
            self.start.format("%-I:%M %p"),
            self.end.format("%-I:%M %p")
        )
    }
}

fn day_name(day: u32) -> &'static str {
    DAY_NAMES.get(day as usize).copied().unwrap_or("Sunday")
}

fn is_contiguous(sorted_days: &[u32]) -> bool {
    sorted_days.windows(2).all(|w| w[1] == w[0] + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_default_window() {
        let hours = BusinessHours::default();
        assert_eq!(hours.days, vec![1, 2, 3, 4, 5]);
        assert_eq!(hours.start.format("%H:%M").to_string(), "09:00");
        assert_eq!(hours.end.format("%H:%M").to_string(), "17:00");
    }

    #[test]
    fn test_open_within_hours() {
        let hours = BusinessHours::default();
        // 2025-06-16 is a Monday
        assert!(hours.is_open_at(&dt("2025-06-16 09:00")));
        assert!(hours.is_open_at(&dt("2025-06-16 12:30")));
        assert!(hours.is_open_at(&dt("2025-06-16 16:59")));
    }

    #[test]
    fn test_end_boundary_is_exclusive() {
        let hours = BusinessHours::default();
        assert!(!hours.is_open_at(&dt("2025-06-16 17:00")));
        assert!(!hours.is_open_at(&dt("2025-06-16 17:01")));
    }

    #[test]
    fn test_closed_before_start() {
        let hours = BusinessHours::default();
        assert!(!hours.is_open_at(&dt("2025-06-16 08:59")));
    }

    #[test]
    fn test_closed_on_weekend() {
        let hours = BusinessHours::default();
        // 2025-06-15 is a Sunday, 2025-06-21 a Saturday
        assert!(!hours.is_open_at(&dt("2025-06-15 10:00")));
        assert!(!hours.is_open_at(&dt("2025-06-21 10:00")));
    }

    #[test]
    fn test_parse_valid() {
        let hours = BusinessHours::parse("08:30", "18:00", &[1, 3, 5]).unwrap();
        assert!(hours.is_open_at(&dt("2025-06-16 08:30")));
        assert!(!hours.is_open_at(&dt("2025-06-17 10:00")));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(BusinessHours::parse("25:00", "17:00", &[1]).is_err());
        assert!(BusinessHours::parse("17:00", "09:00", &[1]).is_err());
        assert!(BusinessHours::parse("09:00", "17:00", &[7]).is_err());
    }

    #[test]
    fn test_to_speech_contiguous() {
        let hours = BusinessHours::default();
        assert_eq!(
            hours.to_speech(),
            "Monday through Friday, 9:00 AM to 5:00 PM"
        );
    }

    #[test]
    fn test_to_speech_scattered_days() {
        let hours = BusinessHours::parse("10:00", "14:00", &[1, 3, 5]).unwrap();
        assert_eq!(
            hours.to_speech(),
            "Monday, Wednesday, Friday, 10:00 AM to 2:00 PM"
        );
    }
}
