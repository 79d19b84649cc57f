// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Interactive credential prompt on the controlling terminal.

use async_trait::async_trait;
use std::io::{self, BufRead, IsTerminal, Write};
use svw_adapters::{CredentialPrompt, PromptError};
use svw_core::Credential;

/// Asks on stderr and reads from stdin. Declines when stdin is not a terminal.
#[derive(Clone, Debug, Default)]
pub struct TerminalPrompt {
    default_username: Option<String>,
}

impl TerminalPrompt {
    pub fn new(default_username: Option<String>) -> Self {
        Self { default_username }
    }
}

#[async_trait]
impl CredentialPrompt for TerminalPrompt {
    async fn prompt(
        &self,
        realm: Option<&str>,
        previous_username: Option<&str>,
    ) -> Result<Option<Credential>, PromptError> {
        if !io::stdin().is_terminal() {
            tracing::debug!("stdin is not a terminal, not prompting");
            return Ok(None);
        }

        let realm = realm.map(str::to_string);
        let suggested = previous_username.map(str::to_string).or_else(|| self.default_username.clone());
        tokio::task::spawn_blocking(move || ask(realm.as_deref(), suggested.as_deref()))
            .await
            .map_err(|e| PromptError::Unavailable(e.to_string()))?
    }
}

fn ask(realm: Option<&str>, suggested: Option<&str>) -> Result<Option<Credential>, PromptError> {
    let mut stderr = io::stderr();
    if let Some(realm) = realm {
        writeln!(stderr, "Authentication realm: {realm}")?;
    }
    match suggested {
        Some(name) => write!(stderr, "Username [{name}]: ")?,
        None => write!(stderr, "Username: ")?,
    }
    stderr.flush()?;

    let Some(typed) = read_line()? else {
        return Ok(None);
    };
    let username = match (typed.is_empty(), suggested) {
        (false, _) => typed,
        (true, Some(name)) => name.to_string(),
        (true, None) => return Ok(None),
    };

    write!(stderr, "Password for '{username}': ")?;
    stderr.flush()?;
    let Some(password) = read_hidden_line()? else {
        return Ok(None);
    };

    Ok(Some(Credential::new(username, password)))
}

/// One line from stdin without its terminator; `None` at end of input.
fn read_line() -> io::Result<Option<String>> {
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

#[cfg(unix)]
fn read_hidden_line() -> io::Result<Option<String>> {
    use nix::sys::termios::{self, LocalFlags, SetArg};

    let stdin = io::stdin();
    let original = termios::tcgetattr(&stdin)?;
    let mut silent = original.clone();
    silent.local_flags.remove(LocalFlags::ECHO);
    silent.local_flags.insert(LocalFlags::ECHONL);
    termios::tcsetattr(&stdin, SetArg::TCSANOW, &silent)?;

    let line = read_line();
    // Restore echo before surfacing any read error
    termios::tcsetattr(&stdin, SetArg::TCSANOW, &original)?;
    line
}

#[cfg(not(unix))]
fn read_hidden_line() -> io::Result<Option<String>> {
    tracing::warn!("cannot disable terminal echo on this platform");
    read_line()
}
