//! Login with interactive fallback
//!
//! Email and password not given on the command line or in the settings file
//! are asked for on the terminal. A rejected password login clears both and
//! asks again, up to [`LOGIN_ATTEMPTS`] attempts.

use std::io::{self, IsTerminal, Write};

use async_trait::async_trait;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use secrecy::SecretString;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use crate::controller::{Credentials, SessionApi, TenantInfo};
use crate::errors::UpgradeError;

/// Password login attempts before giving up
pub const LOGIN_ATTEMPTS: usize = 3;

/// How a run logs in
#[derive(Debug, Clone)]
pub enum Login {
    /// Static API token, never prompted for
    Token(SecretString),
    /// Email and password, missing values are prompted for
    Password {
        email: Option<String>,
        password: Option<SecretString>,
    },
}

/// Source of credentials not given up front
#[async_trait]
pub trait CredentialPrompt: Send + Sync {
    /// Whether the prompt can ask anyone
    fn interactive(&self) -> bool;

    async fn email(&self) -> Result<String, UpgradeError>;

    async fn password(&self) -> Result<SecretString, UpgradeError>;
}

fn missing_credentials() -> UpgradeError {
    UpgradeError::ConfigError(
        "no credentials: set X_AUTH_TOKEN/AUTH_TOKEN or provide --email and --pass".to_string(),
    )
}

/// Prompts on stdin/stdout when stdin is a terminal
#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    interactive: bool,
}

impl TerminalPrompt {
    pub fn new(interactive: bool) -> Self {
        Self { interactive }
    }

    /// Prompt only if stdin is attached to a terminal
    pub fn detect() -> Self {
        Self::new(io::stdin().is_terminal())
    }
}

#[async_trait]
impl CredentialPrompt for TerminalPrompt {
    fn interactive(&self) -> bool {
        self.interactive
    }

    async fn email(&self) -> Result<String, UpgradeError> {
        if !self.interactive {
            return Err(missing_credentials());
        }
        print!("email: ");
        io::stdout().flush()?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin()).read_line(&mut line).await?;
        let email = line.trim();
        if email.is_empty() {
            return Err(UpgradeError::AuthError("no email given".to_string()));
        }
        Ok(email.to_string())
    }

    async fn password(&self) -> Result<SecretString, UpgradeError> {
        if !self.interactive {
            return Err(missing_credentials());
        }
        print!("password: ");
        io::stdout().flush()?;

        let password = tokio::task::spawn_blocking(read_hidden)
            .await
            .map_err(|e| UpgradeError::ConfigError(format!("password prompt failed: {e}")))??;
        Ok(SecretString::from(password))
    }
}

/// Read one line without echo
fn read_hidden() -> io::Result<String> {
    terminal::enable_raw_mode()?;
    let input = read_keys();
    let restored = terminal::disable_raw_mode();
    println!();
    let input = input?;
    restored?;
    Ok(input)
}

fn read_keys() -> io::Result<String> {
    let mut input = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind,
            ..
        }) = event::read()?
        else {
            continue;
        };
        if kind != KeyEventKind::Press {
            continue;
        }
        match code {
            KeyCode::Enter => return Ok(input),
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "login aborted"));
            }
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            _ => {}
        }
    }
}

/// Log in, prompting for missing credentials and again after a rejected
/// password login. Token logins are attempted exactly once.
pub async fn login<S, P>(session: &S, method: &Login, prompt: &P) -> Result<TenantInfo, UpgradeError>
where
    S: SessionApi + ?Sized,
    P: CredentialPrompt + ?Sized,
{
    let (mut known_email, mut known_password) = match method {
        Login::Token(token) => return session.login(&Credentials::Token(token.clone())).await,
        Login::Password { email, password } => (email.clone(), password.clone()),
    };

    let mut attempt = 1;
    loop {
        let email = match known_email.take() {
            Some(email) => email,
            None => prompt.email().await?,
        };
        let password = match known_password.take() {
            Some(password) => password,
            None => prompt.password().await?,
        };

        match session.login(&Credentials::Password { email, password }).await {
            Err(UpgradeError::AuthError(reason))
                if attempt < LOGIN_ATTEMPTS && prompt.interactive() =>
            {
                warn!("Login attempt {} failed: {}", attempt, reason);
                attempt += 1;
            }
            result => return result,
        }
    }
}
