//! This crate downloads remote iCalendar feeds and keeps their latest content in memory.
//!
//! The main type is [`CalendarData`], that owns one calendar source: its (possibly templated) URL, the HTTP options to use, and the text of the last successful download. \
//! A poller (typically the scheduler of a home-automation platform) calls [`CalendarData::download_calendar`] on every tick. \
//! A real download only happens when the configured minimum interval has elapsed since the previous attempt, so that ticks can be as frequent as the caller wants.
//!
//! Failures never propagate to the poller: a calendar that cannot be downloaded (network error, HTTP error status, undecodable body...) simply has no data until the next successful download.
//!
//! Parsing the downloaded iCalendar text is out of the scope of this crate; consumers read it with [`CalendarData::get`].

pub mod traits;

pub mod calendar_data;
pub use calendar_data::CalendarData;
pub use calendar_data::CacheState;
pub use calendar_data::FetchOutcome;
pub mod clock;
pub mod config;
pub use config::ConnectionOptions;
pub use config::SourceConfig;
pub mod decode;
pub mod error;
pub use error::FetchError;
pub mod template;
