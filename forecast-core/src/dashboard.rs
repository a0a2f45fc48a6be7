//! Owned dashboard state and the fetch lifecycle that drives it.
//!
//! [`DashboardState`] changes only at three points: fetch-start
//! ([`DashboardState::begin_fetch`]), fetch-success and fetch-failure (both
//! through [`DashboardState::complete`]). Each fetch carries a sequence
//! number; a result whose ticket is not the latest issued is dropped, so a
//! slow request for an old place can never overwrite a newer one.

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::{
    config::Config,
    model::RawForecastResponse,
    provider::{FetchError, ForecastSource},
    search::{AllowList, UNKNOWN_PLACE_MESSAGE, UnknownPlace},
    transform::DashboardView,
};

/// Generic message shown when a forecast could not be fetched.
pub const FETCH_ERROR_MESSAGE: &str = "날씨 가져오기 에러";

/// Sequence number handed out at fetch dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Latest fetch succeeded; its payload is now current.
    Applied,
    /// Latest fetch failed; the previous payload, if any, is kept.
    Failed,
    /// A newer fetch was issued meanwhile; the result was dropped.
    Discarded,
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    place: String,
    forecast: Option<RawForecastResponse>,
    loading: bool,
    fetch_error: Option<&'static str>,
    search_error: Option<&'static str>,
    last_failure: Option<FetchError>,
    issued: u64,
}

impl DashboardState {
    pub fn new(place: impl Into<String>) -> Self {
        Self {
            place: place.into(),
            forecast: None,
            loading: false,
            fetch_error: None,
            search_error: None,
            last_failure: None,
            issued: 0,
        }
    }

    pub fn place(&self) -> &str {
        &self.place
    }

    pub fn forecast(&self) -> Option<&RawForecastResponse> {
        self.forecast.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Localized message for the last failed fetch, cleared by the next success.
    pub fn fetch_error(&self) -> Option<&'static str> {
        self.fetch_error
    }

    /// Localized message for the last rejected search, cleared by the next accepted one.
    pub fn search_error(&self) -> Option<&'static str> {
        self.search_error
    }

    /// Underlying cause of the last failed fetch.
    pub fn last_failure(&self) -> Option<&FetchError> {
        self.last_failure.as_ref()
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.0 == self.issued
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.loading = true;
        FetchTicket(self.issued)
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<RawForecastResponse, FetchError>,
    ) -> FetchOutcome {
        if !self.is_current(ticket) {
            warn!(ticket = ticket.0, latest = self.issued, "discarding superseded forecast");
            return FetchOutcome::Discarded;
        }

        self.loading = false;
        match result {
            Ok(raw) => {
                info!(place = %self.place, entries = raw.list.len(), "forecast updated");
                self.forecast = Some(raw);
                self.fetch_error = None;
                self.last_failure = None;
                FetchOutcome::Applied
            }
            Err(err) => {
                warn!(place = %self.place, error = %err, "forecast fetch failed");
                self.fetch_error = Some(FETCH_ERROR_MESSAGE);
                self.last_failure = Some(err);
                FetchOutcome::Failed
            }
        }
    }

    /// Switch place if `value` is on the allow-list. Returns whether the place changed.
    pub fn submit_search(
        &mut self,
        allow_list: &AllowList,
        value: &str,
    ) -> Result<bool, UnknownPlace> {
        match allow_list.validate(value) {
            Ok(place) => {
                self.search_error = None;
                let changed = place != self.place;
                self.place = place.to_string();
                Ok(changed)
            }
            Err(err) => {
                self.search_error = Some(UNKNOWN_PLACE_MESSAGE);
                Err(err)
            }
        }
    }

    pub fn view(&self, now: DateTime<Utc>) -> Option<DashboardView> {
        self.forecast.as_ref().map(|raw| DashboardView::build(raw, now))
    }
}

/// Drives fetches for the active place against a [`ForecastSource`].
#[derive(Debug)]
pub struct Dashboard<S> {
    source: S,
    allow_list: AllowList,
    count: u32,
    state: Mutex<DashboardState>,
}

impl<S: ForecastSource> Dashboard<S> {
    pub fn new(source: S, allow_list: AllowList, place: impl Into<String>, count: u32) -> Self {
        Self { source, allow_list, count, state: Mutex::new(DashboardState::new(place)) }
    }

    pub fn from_config(source: S, config: &Config) -> Self {
        Self::new(source, config.allow_list(), config.default_place.clone(), config.forecast.count)
    }

    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Fetch the active place. The lock is not held while the request runs.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> FetchOutcome {
        let (ticket, place) = {
            let mut state = self.state.lock().await;
            let ticket = state.begin_fetch();
            (ticket, state.place().to_string())
        };

        let result = self.source.fetch_forecast(&place, self.count).await;

        self.state.lock().await.complete(ticket, result)
    }

    /// Submit a search. Re-fetches only when an accepted value changes the place.
    pub async fn search(&self, value: &str) -> Result<Option<FetchOutcome>, UnknownPlace> {
        let changed = self.state.lock().await.submit_search(&self.allow_list, value)?;

        if changed {
            Ok(Some(self.refresh().await))
        } else {
            Ok(None)
        }
    }

    pub async fn snapshot(&self) -> DashboardState {
        self.state.lock().await.clone()
    }

    pub async fn view(&self, now: DateTime<Utc>) -> Option<DashboardView> {
        self.state.lock().await.view(now)
    }
}
