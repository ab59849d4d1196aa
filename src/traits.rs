use async_trait::async_trait;

use crate::calendar_data::FetchOutcome;

/// A calendar whose content is downloaded on demand and cached
#[async_trait]
pub trait CalendarSource {
    /// The name of this calendar, used for diagnostics
    fn name(&self) -> &str;

    /// Download the calendar if enough time has elapsed since the last attempt.
    ///
    /// This never fails: errors are logged, and leave the source without data.
    async fn download_calendar(&mut self) -> FetchOutcome;

    /// Returns the text of the last successful download, or `None` if there is none (or if the last attempt failed)
    /// This never triggers any network access.
    fn get(&self) -> Option<&str>;
}
