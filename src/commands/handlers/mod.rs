//! Command handlers for dossier.
//!
//! Each family module exposes its handlers as plain `fn` items returning a
//! boxed future, plus a `register` function that installs them. Handlers
//! parse their own arguments and report failures with a reason code.

pub mod association;
pub mod information;
pub mod location;
pub mod ring;
pub mod subject;
pub mod system;
pub mod time;

use super::registry::Registry;
use super::sequence::parse_ids;
use crate::error::DossierError;
use thiserror::Error;

/// Why a handler could not produce a result.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The request was well-formed but there is nothing to act on.
    #[error("{0}")]
    NoData(String),

    /// The arguments are missing or malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Storage, I/O or an unexpected state.
    #[error(transparent)]
    Internal(#[from] DossierError),
}

impl HandlerError {
    pub fn no_data(msg: impl Into<String>) -> Self {
        Self::NoData(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(DossierError::internal(msg))
    }

    /// A bad request carrying the command's usage line.
    pub fn usage(usage: &str) -> Self {
        Self::BadRequest(format!("usage: {usage}"))
    }

    /// Short reason code shown next to the failing command.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoData(_) => "no-data",
            Self::BadRequest(_) => "bad-request",
            Self::Internal(_) => "internal",
        }
    }
}

/// Registers every built-in command and alias.
pub fn register_all(registry: &mut Registry) {
    ring::register(registry);
    subject::register(registry);
    information::register(registry);
    location::register(registry);
    time::register(registry);
    association::register(registry);
    system::register(registry);

    registry.alias("rings", "r");
    registry.alias("subjects", "s");
    registry.alias("assocs", "a");

    system::register_help(registry);
}

/// Returns argument `index` or a usage error.
fn arg<'a>(args: &'a [String], index: usize, usage: &str) -> Result<&'a str, HandlerError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| HandlerError::usage(usage))
}

/// Joins the arguments from `index` on with single spaces.
fn rest(args: &[String], index: usize) -> String {
    args.get(index..).map(|a| a.join(" ")).unwrap_or_default()
}

/// Parses a single numeric id.
fn parse_id(text: &str, what: &str) -> Result<i64, HandlerError> {
    text.parse()
        .map_err(|_| HandlerError::bad_request(format!("invalid {what} id '{text}'")))
}

/// Parses an id sequence such as `1,3-5`; an empty sequence is a usage error.
fn id_list(args: &[String], index: usize, usage: &str) -> Result<Vec<i64>, HandlerError> {
    let ids = parse_ids(arg(args, index, usage)?);
    if ids.is_empty() {
        return Err(HandlerError::usage(usage));
    }
    Ok(ids)
}
