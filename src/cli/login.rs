//! Login page: credential prompts and the login call

use anyhow::Result;
use console::Term;
use dialoguer::{theme::ColorfulTheme, Input, Password};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::auth::{Credentials, Profile};
use crate::error::Error;

use super::context::AppContext;

/// Whether prompts can be shown
pub fn is_interactive() -> bool {
    Term::stdout().is_term() && Term::stderr().is_term()
}

/// Prompt for whatever credentials are missing, then log in
pub async fn login_page(
    ctx: &AppContext,
    username: Option<String>,
    password: Option<String>,
) -> Result<Profile> {
    let theme = ColorfulTheme::default();

    let username = match username {
        Some(username) => username,
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Username")
            .interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::with_theme(&theme)
            .with_prompt("Password")
            .interact()?,
    };

    let credentials = Credentials::new(username, password);

    let spinner = is_interactive().then(|| {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(format!("Signing in as {}...", credentials.username));
        pb.enable_steady_tick(Duration::from_millis(100));
        pb
    });

    let result = ctx.session.login(&ctx.api, &credentials).await;

    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    match result {
        Ok(profile) => Ok(profile),
        Err(Error::Unauthenticated) => Err(anyhow::anyhow!("Invalid username or password")),
        Err(e) => Err(e.into()),
    }
}

/// Read a password for a new account, asking twice
pub fn new_password(password: Option<String>) -> Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let password = Password::with_theme(&ColorfulTheme::default())
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;
    Ok(password)
}
