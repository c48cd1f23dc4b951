//! Date helper functions

use anyhow::{anyhow, Result};
use chrono::{DateTime, Locale, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::Write;

use crate::config::SiteConfig;

/// Formats publication dates in the site's timezone and language
#[derive(Debug, Clone)]
pub struct DateFormatter {
    timezone: Tz,
    locale: Locale,
    date_format: String,
    datetime_format: String,
}

impl DateFormatter {
    /// Build a formatter from Moment.js style patterns
    pub fn new(timezone: Tz, locale: Locale, date_format: &str, datetime_format: &str) -> Self {
        Self {
            timezone,
            locale,
            date_format: moment_to_chrono_format(date_format),
            datetime_format: moment_to_chrono_format(datetime_format),
        }
    }

    /// Build a formatter from the site configuration.
    ///
    /// Fails on an unknown timezone or a pattern chrono cannot render.
    pub fn from_config(config: &SiteConfig) -> Result<Self> {
        let timezone = timezone_for(&config.timezone)?;
        let locale = locale_for(&config.language);
        let formatter = Self::new(
            timezone,
            locale,
            &config.date_format,
            &config.datetime_format,
        );

        let sample = Utc::now();
        for pattern in [&formatter.date_format, &formatter.datetime_format] {
            formatter
                .render(&sample, pattern)
                .map_err(|_| anyhow!("Invalid date format: {}", pattern))?;
        }
        Ok(formatter)
    }

    /// Short date, e.g. `25 mar 2021`
    pub fn date(&self, at: &DateTime<Utc>) -> String {
        self.render(at, &self.date_format)
            .unwrap_or_else(|_| date_xml(at))
    }

    /// Date and time, e.g. `25 mar 2021, às 19:25`
    pub fn datetime(&self, at: &DateTime<Utc>) -> String {
        self.render(at, &self.datetime_format)
            .unwrap_or_else(|_| date_xml(at))
    }

    fn render(&self, at: &DateTime<Utc>, chrono_format: &str) -> std::result::Result<String, std::fmt::Error> {
        let local = at.with_timezone(&self.timezone);
        let mut out = String::new();
        write!(out, "{}", local.format_localized(chrono_format, self.locale))?;
        Ok(out)
    }
}

/// Parse an IANA timezone name such as `America/Sao_Paulo`
pub fn timezone_for(name: &str) -> Result<Tz> {
    if name.trim().is_empty() {
        return Ok(Tz::UTC);
    }
    name.parse::<Tz>()
        .map_err(|_| anyhow!("Unknown timezone: {}", name))
}

/// Map a site language (`pt-br`, `en`) to a chrono locale.
///
/// Unknown languages fall back to POSIX (English names).
pub fn locale_for(language: &str) -> Locale {
    let language = language.trim().replace('-', "_");
    let (lang, region) = match language.split_once('_') {
        Some((lang, region)) => (lang.to_lowercase(), Some(region.to_uppercase())),
        None => (language.to_lowercase(), None),
    };

    let mut candidates = Vec::new();
    match region {
        Some(region) => candidates.push(format!("{}_{}", lang, region)),
        None if lang == "en" => candidates.push("en_US".to_string()),
        None => candidates.push(format!("{}_{}", lang, lang.to_uppercase())),
    }

    candidates
        .iter()
        .find_map(|name| Locale::try_from(name.as_str()).ok())
        .unwrap_or(Locale::POSIX)
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Zone: TimeZone>(date: &DateTime<Zone>) -> String
where
    Zone::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}

/// Convert Moment.js format to chrono format.
///
/// Text inside `[...]` is copied literally.
pub fn moment_to_chrono_format(format: &str) -> String {
    let mut result = String::with_capacity(format.len() * 2);
    let mut rest = format;

    while !rest.is_empty() {
        match rest.find('[') {
            Some(open) => {
                result.push_str(&convert_tokens(&rest[..open]));
                let after = &rest[open + 1..];
                match after.find(']') {
                    Some(close) => {
                        result.push_str(&after[..close].replace('%', "%%"));
                        rest = &after[close + 1..];
                    }
                    None => {
                        // Unterminated bracket: keep the rest as literal text
                        result.push_str(&after.replace('%', "%%"));
                        rest = "";
                    }
                }
            }
            None => {
                result.push_str(&convert_tokens(rest));
                rest = "";
            }
        }
    }

    result
}

/// Moment tokens and their chrono equivalents, longest first within a letter
const TOKENS: [(&str, &str); 15] = [
    ("YYYY", "%Y"),
    ("YY", "%y"),
    ("MMMM", "%B"),
    ("MMM", "%b"),
    ("MM", "%m"),
    ("DDDD", "%j"),
    ("DD", "%d"),
    ("HH", "%H"),
    ("hh", "%I"),
    ("mm", "%M"),
    ("ss", "%S"),
    ("dddd", "%A"),
    ("ddd", "%a"),
    ("ZZ", "%z"),
    ("SSS", "%3f"),
];

fn convert_tokens(segment: &str) -> String {
    let mut result = String::with_capacity(segment.len() * 2);
    let mut rest = segment;

    while let Some(c) = rest.chars().next() {
        if let Some((from, to)) = TOKENS.iter().find(|(from, _)| rest.starts_with(from)) {
            result.push_str(to);
            rest = &rest[from.len()..];
            continue;
        }
        if c == '%' {
            result.push_str("%%");
        } else {
            result.push(c);
        }
        rest = &rest[c.len_utf8()..];
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn published() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap()
    }

    #[test]
    fn test_moment_to_chrono() {
        assert_eq!(moment_to_chrono_format("YYYY-MM-DD"), "%Y-%m-%d");
        assert_eq!(moment_to_chrono_format("HH:mm:ss"), "%H:%M:%S");
    }

    #[test]
    fn test_adjacent_tokens() {
        assert_eq!(moment_to_chrono_format("MMmm"), "%m%M");
        assert_eq!(moment_to_chrono_format("DDdddd"), "%d%A");
        assert_eq!(moment_to_chrono_format("YYYYMMDDHHmmss"), "%Y%m%d%H%M%S");
    }

    #[test]
    fn test_bracketed_literals() {
        assert_eq!(
            moment_to_chrono_format("DD MMM YYYY, [às] HH:mm"),
            "%d %b %Y, às %H:%M"
        );
        assert_eq!(moment_to_chrono_format("[100%] YYYY"), "100%% %Y");
        assert_eq!(moment_to_chrono_format("YYYY [open"), "%Y open");
    }

    #[test]
    fn test_english_formatting() {
        let formatter = DateFormatter::new(Tz::UTC, Locale::POSIX, "YYYY-MM-DD", "DD MMMM YYYY HH:mm");
        assert_eq!(formatter.date(&published()), "2021-03-25");
        assert_eq!(formatter.datetime(&published()), "25 March 2021 19:25");
    }

    #[test]
    fn test_portuguese_month_names() {
        let formatter = DateFormatter::new(
            Tz::UTC,
            locale_for("pt-br"),
            "DD [de] MMMM [de] YYYY",
            "DD MMM YYYY",
        );
        assert_eq!(formatter.date(&published()), "25 de março de 2021");
    }

    #[test]
    fn test_timezone_conversion() {
        let formatter = DateFormatter::new(
            timezone_for("America/Sao_Paulo").unwrap(),
            Locale::POSIX,
            "YYYY-MM-DD",
            "YYYY-MM-DD HH:mm",
        );
        // 01:30 UTC is still the previous evening in Sao Paulo
        let at = Utc.with_ymd_and_hms(2021, 3, 26, 1, 30, 0).unwrap();
        assert_eq!(formatter.date(&at), "2021-03-25");
        assert_eq!(formatter.datetime(&at), "2021-03-25 22:30");
    }

    #[test]
    fn test_locale_fallbacks() {
        assert_eq!(locale_for("pt-br"), Locale::pt_BR);
        assert_eq!(locale_for("en"), Locale::en_US);
        assert_eq!(locale_for("xx-unknown"), Locale::POSIX);
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        assert!(timezone_for("Mars/Olympus_Mons").is_err());
        assert_eq!(timezone_for("").unwrap(), Tz::UTC);
    }

    #[test]
    fn test_from_config_defaults() {
        let formatter = DateFormatter::from_config(&SiteConfig::default()).unwrap();
        let at = Utc.with_ymd_and_hms(2021, 3, 25, 19, 25, 28).unwrap();
        let rendered = formatter.datetime(&at);
        assert!(rendered.starts_with("25 "));
        assert!(rendered.ends_with("2021, às 16:25"));
    }

    #[test]
    fn test_date_xml() {
        assert_eq!(date_xml(&published()), "2021-03-25T19:25:28.000+00:00");
    }
}
