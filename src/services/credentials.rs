//! Credential acquisition for the management API
//!
//! Resolves a Basic auth header once, at client construction: either from a
//! `~/.netrc` entry for the management host or from an interactive stdin
//! prompt. Passwords are never accepted on the command line.

use crate::types::{Result, TallyError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use directories::BaseDirs;
use std::io::{BufRead, Write};
use std::path::Path;

/// Where to look for credentials, chosen by CLI flags.
#[derive(Debug, Clone)]
pub enum CredentialSource {
    /// Look the management host up in `~/.netrc`
    Netrc,
    /// Prompt on stdin; the username may be pre-supplied with `--username`
    Prompt { username: Option<String> },
}

/// A resolved login/password pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    /// Resolve credentials for `host` from the chosen source.
    pub fn resolve(source: &CredentialSource, host: &str) -> Result<Self> {
        match source {
            CredentialSource::Netrc => {
                let base_dirs = BaseDirs::new()
                    .ok_or_else(|| TallyError::Auth("Cannot determine home directory".into()))?;
                let netrc_path = base_dirs.home_dir().join(".netrc");
                from_netrc_file(&netrc_path, host)
            }
            CredentialSource::Prompt { username } => prompt(username.as_deref()),
        }
    }

    /// `Basic <base64(login:password)>` header value.
    pub fn basic_auth_header(&self) -> String {
        let pair = format!("{}:{}", self.username, self.password);
        format!("Basic {}", BASE64.encode(pair.as_bytes()))
    }
}

fn from_netrc_file(path: &Path, host: &str) -> Result<Credentials> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        TallyError::Auth(format!("cannot read netrc at {}: {}", path.display(), e))
    })?;
    parse_netrc(&content, host).ok_or_else(|| {
        TallyError::Auth(format!(
            "there is no entry for {} in the netrc file",
            host
        ))
    })
}

/// Scan whitespace-separated netrc tokens for `machine <host>` and collect
/// its `login` and `password` values. Entries may span lines; other machines
/// and unknown tokens are skipped.
fn parse_netrc(content: &str, host: &str) -> Option<Credentials> {
    let mut tokens = content.split_whitespace();
    let mut in_target = false;
    let mut login: Option<&str> = None;
    let mut password: Option<&str> = None;

    while let Some(token) = tokens.next() {
        match token {
            "machine" => {
                if in_target {
                    break; // next entry begins; target entry is complete
                }
                in_target = tokens.next() == Some(host);
            }
            "default" => {
                if in_target {
                    break;
                }
            }
            "login" if in_target => login = tokens.next(),
            "password" if in_target => password = tokens.next(),
            _ => {}
        }
        if login.is_some() && password.is_some() {
            break;
        }
    }

    match (login, password) {
        (Some(l), Some(p)) => Some(Credentials {
            username: l.to_string(),
            password: p.to_string(),
        }),
        _ => None,
    }
}

fn prompt(preset_username: Option<&str>) -> Result<Credentials> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    let username = match preset_username {
        Some(u) => u.to_string(),
        None => {
            print!("USER NAME: ");
            std::io::stdout().flush()?;
            read_prompt_line(&mut lines)?
        }
    };

    print!("Password for {}: ", username);
    std::io::stdout().flush()?;
    let password = read_prompt_line(&mut lines)?;

    Ok(Credentials { username, password })
}

fn read_prompt_line(
    lines: &mut impl Iterator<Item = std::io::Result<String>>,
) -> Result<String> {
    let line = lines
        .next()
        .transpose()?
        .ok_or_else(|| TallyError::Auth("stdin closed while prompting for credentials".into()))?;
    Ok(line.trim().to_string())
}
