use chrono::{NaiveDateTime, NaiveTime};

/// Render a phone number so a TTS engine reads it digit by digit. Ten-digit
/// numbers are grouped 3-3-4 with a comma pause between groups; anything
/// else is spoken as a flat digit sequence.
pub fn format_phone_for_speech(raw: &str) -> String {
    let digits: Vec<char> = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    let spell = |chunk: &[char]| {
        chunk
            .iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    };

    if digits.len() == 10 {
        format!(
            "{}, {}, {}",
            spell(&digits[..3]),
            spell(&digits[3..6]),
            spell(&digits[6..])
        )
    } else {
        spell(&digits)
    }
}

/// "Monday, June 16, 2025 at 3:00 PM"
pub fn format_date_time_for_speech(dt: &NaiveDateTime) -> String {
    dt.format("%A, %B %-d, %Y at %-I:%M %p").to_string()
}

/// "Monday, June 16"
pub fn format_day_for_speech(dt: &chrono::NaiveDate) -> String {
    dt.format("%A, %B %-d").to_string()
}

/// "3:00 PM"
pub fn format_time_for_speech(time: &NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// Comma-join up to `cap` items. Callers pick the cap that suits the spoken
/// context (3 for disambiguation lists, 5 for day listings).
pub fn format_spoken_list<I, S>(items: I, cap: usize) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    items
        .into_iter()
        .take(cap)
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    #[test]
    fn test_ten_digit_phone_grouped() {
        assert_eq!(
            format_phone_for_speech("5551234567"),
            "5 5 5, 1 2 3, 4 5 6 7"
        );
    }

    #[test]
    fn test_formatted_phone_stripped_first() {
        assert_eq!(
            format_phone_for_speech("555-123-4567"),
            "5 5 5, 1 2 3, 4 5 6 7"
        );
        assert_eq!(
            format_phone_for_speech("(555) 123-4567"),
            "5 5 5, 1 2 3, 4 5 6 7"
        );
    }

    #[test]
    fn test_non_ten_digit_phone_flat() {
        assert_eq!(format_phone_for_speech("+15551234567"), "1 5 5 5 1 2 3 4 5 6 7");
        assert_eq!(format_phone_for_speech("911"), "9 1 1");
    }

    #[test]
    fn test_empty_phone() {
        assert_eq!(format_phone_for_speech("ext."), "");
    }

    #[test]
    fn test_date_time_for_speech() {
        assert_eq!(
            format_date_time_for_speech(&dt("2025-06-16 15:00")),
            "Monday, June 16, 2025 at 3:00 PM"
        );
        assert_eq!(
            format_date_time_for_speech(&dt("2025-06-17 09:30")),
            "Tuesday, June 17, 2025 at 9:30 AM"
        );
    }

    #[test]
    fn test_time_for_speech() {
        let time = NaiveTime::from_hms_opt(14, 5, 0).unwrap();
        assert_eq!(format_time_for_speech(&time), "2:05 PM");
    }

    #[test]
    fn test_spoken_list_caps_length() {
        let items = ["Alice", "Bob", "Carol", "Dave"];
        assert_eq!(format_spoken_list(items, 3), "Alice, Bob, Carol");
    }

    #[test]
    fn test_spoken_list_short() {
        let items = ["Alice"];
        assert_eq!(format_spoken_list(items, 5), "Alice");
    }
}
