use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

/// Resolve a spoken date/time phrase to a concrete instant. Ordered checks:
/// "today"/"tomorrow" with an explicit time, a weekday name with a time, a
/// slash date, a "Month Day" date, and finally a bare time (today). A phrase
/// with no recoverable time-of-day fails so the caller can ask a clarifying
/// question instead of guessing.
pub fn resolve_date_time(phrase: &str, now: NaiveDateTime) -> Option<NaiveDateTime> {
    let text = phrase.trim().to_lowercase();
    let time = find_time_of_day(&text);

    if text.contains("tomorrow") {
        return time.map(|t| (now.date() + Duration::days(1)).and_time(t));
    }
    if text.contains("today") {
        return time.map(|t| now.date().and_time(t));
    }
    if let Some(weekday) = find_weekday(&text) {
        // A bare weekday means the next occurrence; the same weekday as
        // today rolls over to next week.
        return time.map(|t| next_weekday(now.date(), weekday, false).and_time(t));
    }
    if let Some(date) = find_slash_date(&text, now.date().year()) {
        return time.map(|t| date.and_time(t));
    }
    if let Some(date) = find_month_day(&text, now.date().year()) {
        return time.map(|t| date.and_time(t));
    }

    // An explicit time with no date qualifier means today.
    time.map(|t| now.date().and_time(t))
}

/// Day-only variant for listing contexts. Unlike `resolve_date_time`, a
/// weekday matching today resolves to today.
pub fn resolve_date(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = phrase.trim().to_lowercase();

    if text.contains("tomorrow") {
        return Some(today + Duration::days(1));
    }
    if text.contains("today") {
        return Some(today);
    }
    if let Some(weekday) = find_weekday(&text) {
        return Some(next_weekday(today, weekday, true));
    }
    if let Some(date) = find_slash_date(&text, today.year()) {
        return Some(date);
    }
    find_month_day(&text, today.year())
}

/// Scan for a time-of-day: "3 pm", "3:30pm", or bare 24-hour "HH:MM".
fn find_time_of_day(text: &str) -> Option<NaiveTime> {
    let tokens: Vec<String> = text
        .split_whitespace()
        .map(|t| t.trim_matches(|c: char| c == ',' || c == '?' || c == '!').replace('.', ""))
        .collect();

    for (i, token) in tokens.iter().enumerate() {
        // Attached meridiem: "3pm", "3:30am"
        if let Some(stripped) = token.strip_suffix("pm") {
            if let Some(t) = parse_clock(stripped, true) {
                return Some(t);
            }
        }
        if let Some(stripped) = token.strip_suffix("am") {
            if let Some(t) = parse_clock(stripped, false) {
                return Some(t);
            }
        }
        // Detached meridiem: "3 pm", "3:30 am"
        if let Some(next) = tokens.get(i + 1) {
            if next == "pm" {
                if let Some(t) = parse_clock(token, true) {
                    return Some(t);
                }
            }
            if next == "am" {
                if let Some(t) = parse_clock(token, false) {
                    return Some(t);
                }
            }
        }
        // Bare 24-hour clock: "15:00"
        if token.contains(':') {
            if let Some(t) = parse_24h(token) {
                return Some(t);
            }
        }
    }

    None
}

/// "3" or "3:30" plus a meridiem flag.
fn parse_clock(s: &str, pm: bool) -> Option<NaiveTime> {
    let (hour_part, minute_part) = match s.split_once(':') {
        Some((h, m)) => (h, m),
        None => (s, "0"),
    };
    let hour: u32 = hour_part.trim().parse().ok()?;
    let minute: u32 = minute_part.trim().parse().ok()?;
    if !(1..=12).contains(&hour) || minute > 59 {
        return None;
    }
    let hour24 = if pm { hour % 12 + 12 } else { hour % 12 };
    NaiveTime::from_hms_opt(hour24, minute, 0)
}

fn parse_24h(s: &str) -> Option<NaiveTime> {
    let (hour_part, minute_part) = s.split_once(':')?;
    let hour: u32 = hour_part.parse().ok()?;
    let minute: u32 = minute_part.parse().ok()?;
    if hour > 23 || minute > 59 {
        return None;
    }
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn find_weekday(text: &str) -> Option<Weekday> {
    const NAMES: [(&str, Weekday); 7] = [
        ("monday", Weekday::Mon),
        ("tuesday", Weekday::Tue),
        ("wednesday", Weekday::Wed),
        ("thursday", Weekday::Thu),
        ("friday", Weekday::Fri),
        ("saturday", Weekday::Sat),
        ("sunday", Weekday::Sun),
    ];
    NAMES
        .iter()
        .find(|(name, _)| text.contains(name))
        .map(|(_, wd)| *wd)
}

fn next_weekday(from: NaiveDate, target: Weekday, allow_today: bool) -> NaiveDate {
    let current = from.weekday().num_days_from_monday() as i64;
    let wanted = target.num_days_from_monday() as i64;
    let mut ahead = (wanted - current).rem_euclid(7);
    if ahead == 0 && !allow_today {
        ahead = 7;
    }
    from + Duration::days(ahead)
}

/// "6/20" or "6/20/2025" (two-digit years are 2000-based).
fn find_slash_date(text: &str, default_year: i32) -> Option<NaiveDate> {
    for token in text.split_whitespace() {
        let token = token.trim_matches(|c: char| c == ',' || c == '.');
        let parts: Vec<&str> = token.split('/').collect();
        if parts.len() != 2 && parts.len() != 3 {
            continue;
        }
        let month: u32 = match parts[0].parse() {
            Ok(m) => m,
            Err(_) => continue,
        };
        let day: u32 = match parts[1].parse() {
            Ok(d) => d,
            Err(_) => continue,
        };
        let year: i32 = match parts.get(2) {
            Some(y) => match y.parse::<i32>() {
                Ok(y) if y < 100 => 2000 + y,
                Ok(y) => y,
                Err(_) => continue,
            },
            None => default_year,
        };
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            return Some(date);
        }
    }
    None
}

/// "june 20" / "june 20th".
fn find_month_day(text: &str, default_year: i32) -> Option<NaiveDate> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];

    let tokens: Vec<&str> = text.split_whitespace().collect();
    for (i, token) in tokens.iter().enumerate() {
        let month = match MONTHS.iter().position(|m| m == token) {
            Some(idx) => idx as u32 + 1,
            None => continue,
        };
        let day_token = tokens.get(i + 1)?;
        let day_digits: String = day_token
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect();
        let day: u32 = day_digits.parse().ok()?;
        // Only accept ordinal suffixes after the digits ("20th", "1st").
        let suffix = &day_token[day_digits.len()..];
        let suffix = suffix.trim_matches(|c: char| c == ',' || c == '.');
        if !matches!(suffix, "" | "st" | "nd" | "rd" | "th") {
            return None;
        }
        return NaiveDate::from_ymd_opt(default_year, month, day);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2025-06-16 is a Monday.
    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2025-06-16 10:00", "%Y-%m-%d %H:%M").unwrap()
    }

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_tomorrow_with_time() {
        assert_eq!(
            resolve_date_time("tomorrow at 3 pm", now()),
            Some(dt("2025-06-17 15:00"))
        );
        assert_eq!(
            resolve_date_time("tomorrow at 3:30pm", now()),
            Some(dt("2025-06-17 15:30"))
        );
    }

    #[test]
    fn test_today_with_time() {
        assert_eq!(
            resolve_date_time("today at 9:30 am", now()),
            Some(dt("2025-06-16 09:30"))
        );
    }

    #[test]
    fn test_relative_day_without_time_fails() {
        assert_eq!(resolve_date_time("tomorrow", now()), None);
        assert_eq!(resolve_date_time("today", now()), None);
    }

    #[test]
    fn test_noon_and_midnight_wrap() {
        assert_eq!(
            resolve_date_time("today at 12 pm", now()),
            Some(dt("2025-06-16 12:00"))
        );
        assert_eq!(
            resolve_date_time("today at 12 am", now()),
            Some(dt("2025-06-16 00:00"))
        );
    }

    #[test]
    fn test_weekday_with_time() {
        assert_eq!(
            resolve_date_time("friday at 2 pm", now()),
            Some(dt("2025-06-20 14:00"))
        );
    }

    #[test]
    fn test_same_weekday_rolls_to_next_week() {
        assert_eq!(
            resolve_date_time("monday at 1 pm", now()),
            Some(dt("2025-06-23 13:00"))
        );
    }

    #[test]
    fn test_slash_date_with_time() {
        assert_eq!(
            resolve_date_time("6/20 at 10 am", now()),
            Some(dt("2025-06-20 10:00"))
        );
        assert_eq!(
            resolve_date_time("6/20/2026 at 10 am", now()),
            Some(dt("2026-06-20 10:00"))
        );
    }

    #[test]
    fn test_month_day_with_time() {
        assert_eq!(
            resolve_date_time("june 20th at 10 am", now()),
            Some(dt("2025-06-20 10:00"))
        );
        assert_eq!(
            resolve_date_time("july 1 at 4 pm", now()),
            Some(dt("2025-07-01 16:00"))
        );
    }

    #[test]
    fn test_bare_time_means_today() {
        assert_eq!(
            resolve_date_time("3:30 pm", now()),
            Some(dt("2025-06-16 15:30"))
        );
    }

    #[test]
    fn test_bare_24_hour_clock() {
        assert_eq!(
            resolve_date_time("tomorrow at 15:00", now()),
            Some(dt("2025-06-17 15:00"))
        );
    }

    #[test]
    fn test_unresolvable_phrase() {
        assert_eq!(resolve_date_time("sometime soon", now()), None);
        assert_eq!(resolve_date_time("", now()), None);
    }

    #[test]
    fn test_invalid_clock_values_rejected() {
        assert_eq!(resolve_date_time("today at 13 pm", now()), None);
        assert_eq!(resolve_date_time("today at 25:00", now()), None);
    }

    #[test]
    fn test_resolve_date_relative() {
        let today = date("2025-06-16");
        assert_eq!(resolve_date("today", today), Some(today));
        assert_eq!(resolve_date("tomorrow", today), Some(date("2025-06-17")));
    }

    #[test]
    fn test_resolve_date_weekday_includes_today() {
        let today = date("2025-06-16");
        assert_eq!(resolve_date("monday", today), Some(today));
        assert_eq!(resolve_date("friday", today), Some(date("2025-06-20")));
    }

    #[test]
    fn test_resolve_date_explicit() {
        let today = date("2025-06-16");
        assert_eq!(resolve_date("6/20", today), Some(date("2025-06-20")));
        assert_eq!(resolve_date("june 20th", today), Some(date("2025-06-20")));
    }

    #[test]
    fn test_resolve_date_unknown() {
        assert_eq!(resolve_date("whenever", date("2025-06-16")), None);
    }
}
