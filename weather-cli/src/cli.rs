use anyhow::{Context, bail};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{InquireError, Password, Text};
use tracing::debug;

use cityweather_core::{Config, Document, HttpBackend, Outcome, UiEvent, WeatherWidget};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "City weather lookup")]
pub struct Cli {
    /// Backend base URL, overriding the configured one for this run.
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the backend URL, request timeout and login.
    Configure,

    /// Show weather for one city.
    Show {
        /// City name, e.g. "Paris" or "São Paulo".
        city: String,
    },

    /// Prompt for cities until cancelled (Esc or Ctrl-C).
    Interactive,
}

/// Log filter for a `-v` count.
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;

        match self.command {
            Command::Configure => configure(&mut config),
            Command::Show { city } => {
                let widget = build_widget(&config, self.url.as_deref())?;
                login_if_configured(&widget, &config).await?;
                widget.set_input(&city);

                match widget.handle(UiEvent::ButtonClick).await {
                    Outcome::Rendered => {
                        print!("{}", widget.with_view(render::document));
                        Ok(())
                    }
                    Outcome::Failed(message) => bail!("{message}"),
                    Outcome::Ignored => bail!("City name must not be empty."),
                    Outcome::Stale => Ok(()),
                }
            }
            Command::Interactive => {
                let widget = build_widget(&config, self.url.as_deref())?;
                login_if_configured(&widget, &config).await?;
                interactive(&widget).await
            }
        }
    }
}

fn build_widget(
    config: &Config,
    url_override: Option<&str>,
) -> anyhow::Result<WeatherWidget<HttpBackend, Document>> {
    let mut config = config.clone();
    if let Some(url) = url_override {
        config.set_base_url(url)?;
    }

    let backend = HttpBackend::from_config(&config)?;
    debug!(base_url = backend.base_url(), "Using weather backend");

    let view = Document::new(&config.labels.idle);
    Ok(WeatherWidget::new(backend, view, config.labels))
}

/// Open a session when credentials are configured; the backend may gate
/// `/weather` behind a login.
async fn login_if_configured(
    widget: &WeatherWidget<HttpBackend, Document>,
    config: &Config,
) -> anyhow::Result<()> {
    let Some(credentials) = &config.credentials else {
        debug!("No credentials configured, skipping login");
        return Ok(());
    };

    widget
        .backend()
        .login(&credentials.username, &credentials.password)
        .await
        .with_context(|| format!("Failed to log in as '{}'", credentials.username))
}

async fn interactive(widget: &WeatherWidget<HttpBackend, Document>) -> anyhow::Result<()> {
    loop {
        let line = match Text::new("City:").prompt() {
            Ok(line) => line,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to read city"),
        };

        widget.set_input(&line);
        if widget.handle(UiEvent::KeyPress("Enter".to_string())).await == Outcome::Ignored {
            continue;
        }
        print!("{}", widget.with_view(render::document));
    }
}

fn configure(config: &mut Config) -> anyhow::Result<()> {
    let url = Text::new("Backend URL:")
        .with_default(&config.base_url)
        .prompt()
        .context("Failed to read backend URL")?;
    config.set_base_url(&url)?;

    let current_timeout = config
        .timeout_secs
        .map(|secs| secs.to_string())
        .unwrap_or_default();
    let timeout = Text::new("Request timeout in seconds (empty for none):")
        .with_initial_value(&current_timeout)
        .prompt()
        .context("Failed to read timeout")?;
    config.timeout_secs = parse_timeout(&timeout)?;

    let current_user = config
        .credentials
        .as_ref()
        .map(|c| c.username.clone())
        .unwrap_or_default();
    let username = Text::new("Username (empty for no login):")
        .with_initial_value(&current_user)
        .prompt()
        .context("Failed to read username")?;
    let password = if username.trim().is_empty() {
        String::new()
    } else {
        Password::new("Password:")
            .without_confirmation()
            .prompt()
            .context("Failed to read password")?
    };
    config.set_credentials(&username, password);

    config.save()?;
    println!(
        "Saved configuration to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

fn parse_timeout(input: &str) -> anyhow::Result<Option<u64>> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let secs: u64 = input
        .parse()
        .with_context(|| format!("Invalid timeout '{input}', expected whole seconds"))?;
    if secs == 0 {
        bail!("Timeout must be at least one second.");
    }
    Ok(Some(secs))
}
