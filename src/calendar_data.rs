//! A time-gated, in-memory cache of a remote calendar

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use url::Url;

use crate::clock::{Clock, SystemClock};
use crate::config::{ConnectionOptions, SourceConfig};
use crate::error::FetchError;
use crate::template::UrlTemplate;
use crate::traits::CalendarSource;

/// The result of a call to [`CalendarData::download_calendar`]
#[derive(Debug)]
pub enum FetchOutcome {
    /// A new version of the calendar has been downloaded and cached
    Fetched,
    /// Not enough time has elapsed since the last attempt. Nothing has been downloaded and the cache is unchanged
    Skipped,
    /// A download has been attempted but failed. The cache is now empty
    Failed(FetchError),
}

impl FetchOutcome {
    /// Whether fresh data has been downloaded
    pub fn is_fetched(&self) -> bool {
        matches!(self, FetchOutcome::Fetched)
    }
}

/// What [`CalendarData::get`] currently has to offer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheState {
    /// No download has ever been attempted
    Uninitialized,
    /// The last download attempt succeeded
    HasData,
    /// The last download attempt failed
    NoData,
}

#[derive(Clone, PartialEq, Eq)]
struct Credentials {
    username: String,
    password: String,
}

/// One remote calendar, and the text of its latest successful download
pub struct CalendarData<C = SystemClock> {
    client: reqwest::Client,
    clock: C,

    name: String,
    url: UrlTemplate,
    min_update_time: Duration,

    headers: HeaderMap,
    credentials: Option<Credentials>,
    timeout: Option<Duration>,

    last_download: Option<DateTime<Local>>,
    calendar_data: Option<String>,
}

impl CalendarData<SystemClock> {
    /// Create a calendar source that uses the system clock. This does not start any download.
    ///
    /// `client` is usually shared among every calendar of the application.
    pub fn new(client: reqwest::Client, config: SourceConfig) -> Self {
        Self::with_clock(client, config, SystemClock)
    }
}

impl<C: Clock> CalendarData<C> {
    /// Create a calendar source that reads the current time from `clock`
    pub fn with_clock(client: reqwest::Client, config: SourceConfig, clock: C) -> Self {
        Self {
            client,
            clock,
            name: config.name,
            url: UrlTemplate::new(config.url),
            min_update_time: config.min_update_time,
            headers: HeaderMap::new(),
            credentials: None,
            timeout: None,
            last_download: None,
            calendar_data: None,
        }
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn url(&self) -> &UrlTemplate { &self.url }
    pub fn min_update_time(&self) -> Duration { self.min_update_time }
    /// The time of the last download attempt, successful or not
    pub fn last_download(&self) -> Option<DateTime<Local>> { self.last_download }

    /// Returns the text of the last successful download.
    ///
    /// This is `None` before the first download, and after a failed one.
    pub fn get(&self) -> Option<&str> {
        self.calendar_data.as_deref()
    }

    pub fn state(&self) -> CacheState {
        match (&self.last_download, &self.calendar_data) {
            (None, _) => CacheState::Uninitialized,
            (Some(_), Some(_)) => CacheState::HasData,
            (Some(_), None) => CacheState::NoData,
        }
    }

    /// Apply every connection option at once. Should be called once, before the first download
    pub fn configure(&mut self, options: &ConnectionOptions) {
        self.set_headers(&options.username, &options.password, &options.user_agent, &options.accept_header);
        match options.timeout {
            Some(seconds) => self.set_timeout(seconds),
            None => self.timeout = None,
        }
    }

    /// Set the headers and credentials to send.
    ///
    /// Empty values are not sent. Credentials are only used when both `username` and `password` are non-empty. \
    /// This replaces any previously set headers and credentials.
    pub fn set_headers(&mut self, username: &str, password: &str, user_agent: &str, accept_header: &str) {
        self.headers = HeaderMap::new();
        self.credentials = None;

        if username.is_empty() == false && password.is_empty() == false {
            self.credentials = Some(Credentials {
                username: username.to_string(),
                password: password.to_string(),
            });
        }

        for (name, value) in [(USER_AGENT, user_agent), (ACCEPT, accept_header)] {
            if value.is_empty() {
                continue;
            }
            match HeaderValue::from_str(value) {
                Ok(value) => { self.headers.insert(name, value); },
                Err(err) => log::warn!("Ignoring invalid {} header for calendar {} ({})", name, self.name, err),
            }
        }
    }

    /// Bound the duration of every subsequent download (connection, request, response and pool wait included)
    pub fn set_timeout(&mut self, seconds: f64) {
        self.timeout = match Duration::try_from_secs_f64(seconds) {
            Ok(timeout) => Some(timeout),
            Err(err) => {
                log::warn!("Ignoring invalid timeout {} for calendar {} ({})", seconds, self.name, err);
                None
            },
        };
    }

    /// Download the calendar, unless the last attempt is too recent.
    ///
    /// Failures are logged, and clear the cached data. They are never returned as errors.
    pub async fn download_calendar(&mut self) -> FetchOutcome {
        let now = self.clock.now();
        if self.is_due(&now) == false {
            log::debug!("Calendar {} was downloaded recently, not downloading it again", self.name);
            return FetchOutcome::Skipped;
        }

        // Recorded before downloading: failed attempts are gated too
        self.last_download = Some(now);

        match self.fetch(&now).await {
            Ok(text) => {
                log::debug!("Downloaded calendar {} ({} bytes)", self.name, text.len());
                self.calendar_data = Some(text);
                FetchOutcome::Fetched
            },
            Err(err) => {
                self.calendar_data = None;
                match &err {
                    FetchError::Status(status) => log::error!("Unable to download calendar {}: HTTP status {}", self.name, status),
                    FetchError::Decode(msg) => log::error!("Unable to decode calendar {}: {}", self.name, msg),
                    FetchError::Transport { kind, message } => log::error!("Unable to download calendar {} ({}): {}", self.name, kind, message),
                }
                FetchOutcome::Failed(err)
            },
        }
    }

    fn is_due(&self, now: &DateTime<Local>) -> bool {
        match self.last_download {
            None => true,
            // A negative elapsed time (the clock went backwards) does not convert
            Some(last) => match (*now - last).to_std() {
                Ok(elapsed) => elapsed >= self.min_update_time,
                Err(_) => false,
            },
        }
    }

    async fn fetch(&self, now: &DateTime<Local>) -> Result<String, FetchError> {
        let url = Url::parse(&self.url.resolve(now))?;
        log::debug!("Downloading calendar {} from {}", self.name, url);

        let mut request = self.client
            .get(url)
            .headers(self.headers.clone());
        if let Some(credentials) = &self.credentials {
            request = request.basic_auth(&credentials.username, Some(&credentials.password));
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        if response.status().is_success() == false {
            return Err(FetchError::Status(response.status()));
        }

        let content_type = response.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let body = response.bytes().await?;

        crate::decode::decode_body(&body, content_type.as_deref())
    }
}

#[async_trait]
impl<C: Clock> CalendarSource for CalendarData<C> {
    fn name(&self) -> &str {
        CalendarData::name(self)
    }

    async fn download_calendar(&mut self) -> FetchOutcome {
        CalendarData::download_calendar(self).await
    }

    fn get(&self) -> Option<&str> {
        CalendarData::get(self)
    }
}
