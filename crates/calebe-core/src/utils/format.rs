use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc};

/// Extensions rendered as pictures when reviewing submissions
const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "gif", "webp", "bmp"];

/// Keep only the digits of a CPF as typed (dots and dash removed)
pub fn cpf_digits(cpf: &str) -> String {
    cpf.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Format a CPF for display
/// Normalizes 11 digits to XXX.XXX.XXX-XX
pub fn format_cpf(cpf: &str) -> String {
    let digits = cpf_digits(cpf);

    match digits.len() {
        11 => format!(
            "{}.{}.{}-{}",
            &digits[0..3],
            &digits[3..6],
            &digits[6..9],
            &digits[9..11]
        ),
        _ => cpf.to_string(), // Return original if can't format
    }
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Format an optional string, returning a default if None
pub fn format_optional(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Parse an API date (RFC 3339 timestamp or plain YYYY-MM-DD) as a calendar day in `tz`
pub fn parse_api_date<Tz: TimeZone>(date: &str, tz: &Tz) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        Some(dt.with_timezone(tz).date_naive())
    } else {
        date.get(..10)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
    }
}

/// Format an API date as dd/mm/yyyy, in the local time zone
pub fn format_date(date: &str) -> String {
    match parse_api_date(date, &Local) {
        Some(d) => d.format("%d/%m/%Y").to_string(),
        None => date.to_string(),
    }
}

/// Parse a user-typed date, either dd/mm/yyyy or yyyy-mm-dd
pub fn parse_input_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    NaiveDate::parse_from_str(input, "%d/%m/%Y")
        .or_else(|_| NaiveDate::parse_from_str(input, "%Y-%m-%d"))
        .ok()
}

/// Start of a calendar day in `tz`, the instant sent to the API for picked dates
pub fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a daylight saving jump
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| midnight.and_utc())
}

/// Release dates up to the end of `now`'s day, in `now`'s time zone, cannot be picked.
pub fn is_disabled_release_date<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> bool {
    date <= now.date_naive()
}

/// Guess whether an uploaded file URL points to an image
pub fn is_image_url(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    path.rsplit_once('.')
        .map(|(_, ext)| {
            let ext = ext.to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone};

    fn brasilia() -> FixedOffset {
        FixedOffset::west_opt(3 * 3600).unwrap()
    }

    #[test]
    fn test_format_cpf() {
        assert_eq!(format_cpf("12345678901"), "123.456.789-01");
        assert_eq!(format_cpf("123.456.789-01"), "123.456.789-01");
        assert_eq!(format_cpf("123"), "123"); // Too short, return as-is
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("Hello", 10), "Hello");
        assert_eq!(truncate_string("Hello World", 8), "Hello...");
        assert_eq!(truncate_string("Hi", 2), "Hi");
        assert_eq!(truncate_string("Devoção diária", 9), "Devoçã...");
        assert_eq!(truncate_string("Devoção diária", 10), "Devoção...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2021-05-01T12:00:00.000Z"), "01/05/2021");
        assert_eq!(format_date("2021-12-25"), "25/12/2021");
        assert_eq!(format_date("soon"), "soon");
    }

    #[test]
    fn test_parse_api_date_uses_given_zone() {
        let expected = NaiveDate::from_ymd_opt(2021, 5, 1);
        assert_eq!(parse_api_date("2021-05-01T03:00:00.000Z", &brasilia()), expected);
        assert_eq!(parse_api_date("2021-05-01T02:00:00.000Z", &brasilia()), NaiveDate::from_ymd_opt(2021, 4, 30));
        assert_eq!(parse_api_date("2021-05-01T02:00:00.000Z", &Utc), expected);
        assert_eq!(parse_api_date("2021-05-01", &brasilia()), expected);
    }

    #[test]
    fn test_start_of_day_is_local_midnight() {
        let day = NaiveDate::from_ymd_opt(2021, 5, 1).unwrap();
        assert_eq!(start_of_day(day, &brasilia()).to_rfc3339(), "2021-05-01T03:00:00+00:00");
        assert_eq!(start_of_day(day, &Utc).to_rfc3339(), "2021-05-01T00:00:00+00:00");
    }

    #[test]
    fn test_parse_input_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_input_date("09/03/2024"), expected);
        assert_eq!(parse_input_date("2024-03-09"), expected);
        assert_eq!(parse_input_date("March 9"), None);
    }

    #[test]
    fn test_disabled_release_date() {
        let now = Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap();
        assert!(is_disabled_release_date(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(), &now));
        assert!(is_disabled_release_date(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), &now));
        assert!(!is_disabled_release_date(NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), &now));
    }

    #[test]
    fn test_release_date_follows_local_day() {
        // 22:00 in Brasilia is already the next day in UTC
        let now = brasilia().with_ymd_and_hms(2030, 1, 9, 22, 0, 0).unwrap();
        let tomorrow = NaiveDate::from_ymd_opt(2030, 1, 10).unwrap();
        assert!(!is_disabled_release_date(tomorrow, &now));
        assert!(is_disabled_release_date(tomorrow, &now.with_timezone(&Utc)));
    }

    #[test]
    fn test_is_image_url() {
        assert!(is_image_url("https://cdn.example/respostas/a.PNG"));
        assert!(is_image_url("https://cdn.example/a.jpeg?token=1"));
        assert!(!is_image_url("https://cdn.example/a.mp4"));
        assert!(!is_image_url("https://cdn.example/no-extension"));
    }
}
