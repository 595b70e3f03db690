//! Startup configuration for the `protocols-io` binary.
//!
//! Environment:
//! - `PROTOCOLS_IO_TOKEN`: bearer token; wins over the credentials file
//! - `PROTOCOLS_IO_CREDS`: path of a file holding the token (default `.creds`)
//! - `PROTOCOLS_IO_URL`: service base URL (default `https://www.protocols.io`)
//!
//! Positional arguments: `[KEY] [PROTOCOL_ID] [FILTER]`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use protocols_core::{ProtocolFilter, ProtocolId, DEFAULT_BASE_URL};

pub const TOKEN_VAR: &str = "PROTOCOLS_IO_TOKEN";
pub const CREDS_VAR: &str = "PROTOCOLS_IO_CREDS";
pub const URL_VAR: &str = "PROTOCOLS_IO_URL";

pub const DEFAULT_CREDS_FILE: &str = ".creds";
pub const DEFAULT_KEY: &str = "restriction enzyme";
pub const DEFAULT_PROTOCOL_ID: ProtocolId = 137;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub token: String,
    pub base_url: String,
    pub key: String,
    pub protocol_id: ProtocolId,
    pub filter: ProtocolFilter,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::load(|name| std::env::var(name).ok(), std::env::args().skip(1))
    }

    /// Build a config from an environment lookup and positional arguments.
    pub fn load<E, A>(env: E, args: A) -> Result<Self>
    where
        E: Fn(&str) -> Option<String>,
        A: IntoIterator<Item = String>,
    {
        let token = match env(TOKEN_VAR) {
            Some(token) => non_empty_token(&token).with_context(|| format!("{TOKEN_VAR} is set"))?,
            None => {
                let path = env(CREDS_VAR)
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDS_FILE));
                load_token(&path)?
            }
        };
        let base_url = env(URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut args = args.into_iter();
        let key = args.next().unwrap_or_else(|| DEFAULT_KEY.to_string());
        let protocol_id = match args.next() {
            Some(raw) => raw
                .parse::<ProtocolId>()
                .with_context(|| format!("invalid protocol id `{raw}`"))?,
            None => DEFAULT_PROTOCOL_ID,
        };
        let filter = match args.next() {
            Some(raw) => raw.parse::<ProtocolFilter>()?,
            None => ProtocolFilter::Public,
        };
        if let Some(extra) = args.next() {
            bail!("unexpected argument `{extra}`; usage: protocols-io [KEY] [PROTOCOL_ID] [FILTER]");
        }

        Ok(Self {
            token,
            base_url,
            key,
            protocol_id,
            filter,
        })
    }
}

/// Read a bearer token from `path`, trimming surrounding whitespace.
pub fn load_token(path: &Path) -> Result<String> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading credentials from {}", path.display()))?;
    non_empty_token(&raw).with_context(|| format!("credentials file {}", path.display()))
}

fn non_empty_token(raw: &str) -> Result<String> {
    let token = raw.trim();
    if token.is_empty() {
        bail!("token is empty");
    }
    Ok(token.to_string())
}
