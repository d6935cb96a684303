// Error types the rest of the crate needs to branch on. Everything else
// travels as `anyhow::Error` with context attached at the boundary.

use std::path::PathBuf;

/// Startup configuration problems. All of them are fatal: `main` prints the
/// message (which doubles as guidance) and exits with status 1.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine the home directory to look for the config file")]
    NoHome,

    #[error("Could not read the config file [{path}]: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("The config file [{path}] is not valid YAML: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(
        "The config file [{path}] does not contain a dictionary of API keys under the heading of 'api_key'"
    )]
    MissingApiKeys { path: PathBuf },

    #[error(
        "The config file [{path}] does not contain the sender's address under the heading of 'from' ({reason}).\n\
         You need to make sure to have the right fields. The website at\n\
         https://goshippo.com/docs/reference#addresses has a list of those fields."
    )]
    MissingSender { path: PathBuf, reason: String },

    #[error("The shipping service rejected the sender address from the config file:\n{messages}")]
    InvalidSender { messages: String },

    #[error("Could not load the parcel templates from [{path}]: {reason}")]
    Templates { path: PathBuf, reason: String },
}

/// Failures talking to the remote shipping service.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to the shipping service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("the shipping service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("could not decode the {what} returned by the shipping service: {source}")]
    Decode {
        what: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("the {0} returned by the shipping service has no object id")]
    MissingId(&'static str),
}

/// Workflow errors that abort the current shipment attempt.
#[derive(Debug, thiserror::Error)]
pub enum ShipError {
    #[error("No carrier returned a rate for this shipment. Check the addresses and parcel and try again.")]
    NoRates,
}
