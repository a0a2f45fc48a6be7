use std::{net::SocketAddr, sync::Arc};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand};
use forecast_core::{
    ChatBackend, ChatClient, Config, Dashboard, FetchOutcome, ForecastSource, ServiceId,
    provider::forecast_source_from_config,
};
use inquire::Password;

use crate::{render, server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather dashboard")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a service.
    Configure {
        /// Service short name: "openweather" or "openai".
        service: String,
    },

    /// Show today's conditions, the hourly strip and the daily forecast.
    Show {
        /// Place to search for; must be one of the known cities.
        #[arg(long)]
        place: Option<String>,

        /// Print the view as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// List the cities the search accepts.
    Cities,

    /// Ask the chat assistant a single question.
    Ask {
        /// Question text.
        prompt: String,
    },

    /// Serve the chat proxy endpoint (POST /api/gpt).
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { service } => configure(&service),
            Command::Show { place, json } => show(place.as_deref(), json).await,
            Command::Cities => {
                let config = Config::load()?;
                for city in config.allow_list().iter() {
                    println!("{city}");
                }
                Ok(())
            }
            Command::Ask { prompt } => ask(&prompt).await,
            Command::Serve { addr } => {
                let config = Config::load()?;
                let client = ChatClient::from_config(&config).with_context(|| {
                    format!(
                        "Chat proxy needs an API key.\n\
                         Hint: run `forecast configure openai` or set {}.",
                        ServiceId::OpenAi.env_var()
                    )
                })?;
                server::serve(addr, Arc::new(client)).await
            }
        }
    }
}

fn configure(service: &str) -> anyhow::Result<()> {
    let id = ServiceId::try_from(service)?;
    let mut config = Config::load()?;

    let api_key = Password::new(&format!("API key for {id}:"))
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    if api_key.trim().is_empty() {
        return Err(anyhow!("API key cannot be empty"));
    }

    config.upsert_service_api_key(id, api_key.trim().to_string());
    let path = config.save()?;

    println!("Saved {id} credentials to {}", path.display());
    Ok(())
}

async fn show(place: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let source = forecast_source_from_config(&config)?;
    let dashboard = Dashboard::from_config(source, &config);

    let outcome = load_place(&dashboard, place).await?;

    let state = dashboard.snapshot().await;
    if outcome == FetchOutcome::Failed {
        let cause = state
            .last_failure()
            .map(ToString::to_string)
            .unwrap_or_default();
        return Err(anyhow!("{} ({cause})", state.fetch_error().unwrap_or_default()));
    }

    let view = state
        .view(chrono::Utc::now())
        .ok_or_else(|| anyhow!("No forecast available for '{}'", state.place()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", render::render_dashboard(&view));
    }

    Ok(())
}

/// Switch to `place` when given, then make sure the active place has been fetched.
async fn load_place<S: ForecastSource>(
    dashboard: &Dashboard<S>,
    place: Option<&str>,
) -> anyhow::Result<FetchOutcome> {
    let searched = match place {
        Some(place) => dashboard.search(place).await?,
        None => None,
    };

    match searched {
        Some(outcome) => Ok(outcome),
        None => Ok(dashboard.refresh().await),
    }
}

async fn ask(prompt: &str) -> anyhow::Result<()> {
    if prompt.trim().is_empty() {
        return Ok(());
    }

    let config = Config::load()?;
    let client = ChatClient::from_config(&config)?;
    let answer = client.ask(prompt).await?;

    println!("{answer}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use forecast_core::{AllowList, FetchError, RawForecastResponse, UnknownPlace};

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_place_and_json() {
        let cli = Cli::try_parse_from(["forecast", "show", "--place", "incheon", "--json"]).unwrap();
        match cli.command {
            Command::Show { place, json } => {
                assert_eq!(place.as_deref(), Some("incheon"));
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn serve_defaults_to_localhost() {
        let cli = Cli::try_parse_from(["forecast", "serve"]).unwrap();
        match cli.command {
            Command::Serve { addr } => assert_eq!(addr.to_string(), "127.0.0.1:3000"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn configure_requires_service() {
        assert!(Cli::try_parse_from(["forecast", "configure"]).is_err());
    }

    #[derive(Debug)]
    struct EmptySource;

    #[async_trait::async_trait]
    impl ForecastSource for EmptySource {
        async fn fetch_forecast(
            &self,
            _place: &str,
            _count: u32,
        ) -> Result<RawForecastResponse, FetchError> {
            Ok(RawForecastResponse::default())
        }
    }

    fn dashboard() -> Dashboard<EmptySource> {
        Dashboard::new(EmptySource, AllowList::default(), "seoul", 56)
    }

    #[tokio::test]
    async fn unknown_place_is_an_error_and_nothing_is_fetched() {
        let dash = dashboard();

        let err = load_place(&dash, Some("busan")).await.unwrap_err();

        assert!(err.downcast_ref::<UnknownPlace>().is_some());
        assert!(err.to_string().contains("해당하는 지역이 없습니다"));
        assert!(dash.snapshot().await.forecast().is_none());
    }

    #[tokio::test]
    async fn known_place_is_fetched_once() {
        let dash = dashboard();

        assert_eq!(load_place(&dash, Some("incheon")).await.unwrap(), FetchOutcome::Applied);
        assert_eq!(dash.snapshot().await.place(), "incheon");
    }

    #[tokio::test]
    async fn default_place_is_fetched_without_search() {
        let dash = dashboard();

        assert_eq!(load_place(&dash, None).await.unwrap(), FetchOutcome::Applied);
        assert_eq!(load_place(&dash, Some("seoul")).await.unwrap(), FetchOutcome::Applied);
        assert_eq!(dash.snapshot().await.place(), "seoul");
    }

    #[tokio::test]
    async fn blank_prompt_is_a_no_op() {
        assert!(ask("   ").await.is_ok());
    }
}
