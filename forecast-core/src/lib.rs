//! Core library for the `forecast` dashboard.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The upstream forecast payload and the client that fetches it
//! - Pure reshaping into today / hourly / daily view-models with unit conversions
//! - The owned dashboard state and its fetch lifecycle
//! - The chat-completion client behind the Q&A panel
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod chat;
pub mod config;
pub mod dashboard;
pub mod model;
pub mod provider;
pub mod search;
pub mod transform;
pub mod units;

pub use chat::{ChatBackend, ChatClient, ChatConfig, ChatError};
pub use config::{Config, ForecastConfig, ServiceConfig};
pub use dashboard::{Dashboard, DashboardState, FetchOutcome, FetchTicket};
pub use model::{ForecastEntry, Place, RawForecastResponse};
pub use provider::{FetchError, ForecastSource, ServiceId, openweather::OpenWeatherClient};
pub use search::{AllowList, UnknownPlace};
pub use transform::{
    DashboardView, ForecastRow, HourlyItem, TodaySummary, select_daily_forecast, select_today,
    select_today_strip,
};
