//! Per-invocation wiring: config, session, API client and navigator

use anyhow::{bail, Result};
use std::sync::Arc;

use crate::api::ApiClient;
use crate::auth::{self, SessionStore};
use crate::config::{self, Config, OutputFormat};
use crate::router::{Navigation, Navigator, RouteMatch};

use super::{info, login, warn, Cli};

/// Everything a command needs, built once from the CLI flags
pub struct AppContext {
    pub config: Config,
    pub format: OutputFormat,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
    pub navigator: Navigator,
}

impl AppContext {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = config::load_config_or_default(cli.config.as_deref())?;
        if let Some(base_url) = &cli.base_url {
            config.api.base_url = base_url.clone();
        }
        let format = cli.format.unwrap_or(config.output.format);

        let session = Arc::new(auth::open_session_store(&config.session));
        Self::assemble(config, format, session)
    }

    /// Build a context around an existing session store
    pub fn assemble(config: Config, format: OutputFormat, session: Arc<SessionStore>) -> Result<Self> {
        let api = ApiClient::new(&config.api, Arc::clone(&session))?;
        let navigator = Navigator::new(Arc::clone(&session));

        // Status line, the terminal's navigation bar.
        session.on_change(|event| match &event.user {
            Some(user) if event.is_authenticated => {
                super::success(&format!("Logged in as {}", user))
            }
            _ => info("Logged out"),
        });

        Ok(Self {
            config,
            format,
            session,
            api,
            navigator,
        })
    }

    /// Navigate to `path`, returning the match only if the guard allows it
    ///
    /// A redirect runs the login page instead (when interactive); the original
    /// destination is not resumed afterwards.
    pub async fn enter(&self, path: &str) -> Result<Option<RouteMatch>> {
        match self.navigator.navigate(path) {
            Navigation::Proceed(matched) => Ok(Some(matched)),
            Navigation::Redirect { to } => {
                warn(&format!("You need to log in to open {}.", path));
                if !login::is_interactive() {
                    bail!("Not logged in. Run 'libris login' first.");
                }
                tracing::debug!(from = path, to, "Showing login page");
                login::login_page(self, None, None).await?;
                info("Run the command again to continue.");
                Ok(None)
            }
            Navigation::Blocked { route } => {
                bail!(
                    "Access denied: {} requires one of {}",
                    route.path,
                    route.allowed_roles.join(", ")
                );
            }
            Navigation::NotFound { path } => bail!("No route matches {}", path),
        }
    }
}
