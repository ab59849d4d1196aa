//! Calendar URLs that depend on the current date
//!
//! Some providers publish one file per month or per year (e.g. `https://example.com/{year}/{month}/calendar.ics`). \
//! Placeholders are resolved on every download, not once at startup, so that such calendars keep on following the current date.

use std::fmt;

use chrono::{DateTime, Datelike, TimeZone};

const YEAR: &str = "{year}";
const MONTH: &str = "{month}";

/// A URL that may contain `{year}` and `{month}` placeholders
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UrlTemplate(String);

impl UrlTemplate {
    pub fn new<S: ToString>(template: S) -> Self {
        Self(template.to_string())
    }

    /// Whether this template changes with the date
    pub fn has_placeholders(&self) -> bool {
        self.0.contains(YEAR) || self.0.contains(MONTH)
    }

    /// Substitute `{year}` with the four-digit year and `{month}` with the zero-padded month of `now`.
    ///
    /// Any other brace-delimited text is kept as-is.
    pub fn resolve<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> String {
        if self.has_placeholders() == false {
            return self.0.clone();
        }
        self.0
            .replace(YEAR, &format!("{:04}", now.year()))
            .replace(MONTH, &format!("{:02}", now.month()))
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn resolves_year_and_month() {
        let template = UrlTemplate::new("http://127.0.0.1/test/{year}/{month}/allday.ics");
        let now = Utc.with_ymd_and_hms(2022, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(template.resolve(&now), "http://127.0.0.1/test/2022/01/allday.ics");
    }

    #[test]
    fn repeated_placeholders() {
        let template = UrlTemplate::new("http://x/{year}-{month}/{year}{month}.ics");
        let now = Utc.with_ymd_and_hms(2023, 11, 30, 23, 59, 59).unwrap();
        assert_eq!(template.resolve(&now), "http://x/2023-11/202311.ics");
    }

    #[test]
    fn plain_urls_are_untouched() {
        let template = UrlTemplate::new("http://x/{day}/a.ics");
        let now = Utc.with_ymd_and_hms(2022, 6, 15, 0, 0, 0).unwrap();
        assert_eq!(template.has_placeholders(), false);
        assert_eq!(template.resolve(&now), "http://x/{day}/a.ics");
    }
}
