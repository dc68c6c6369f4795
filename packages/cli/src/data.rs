//! Wires the map collaborators from local files or the hosted backend.

use std::path::PathBuf;

use clap::Args;
use cowork_map_backend::{
    BackendError,
    boundary::{BoundarySource, FileBoundarySource, HttpBoundarySource},
    config::{BackendConfig, FALLBACK_TOKEN_VAR, PLACEHOLDER_FALLBACK_TOKEN},
    locations::{FileLocationService, HttpLocationService, LocationService},
    token::{HttpTokenService, StaticTokenService, TokenService},
};
use cowork_map_explorer::Collaborators;

/// Where map data comes from. Anything not given as a file is read from
/// the backend configured in the environment.
#[derive(Args, Debug, Clone, Default)]
pub struct DataArgs {
    /// Province boundary `GeoJSON` file
    #[arg(long, global = true)]
    pub boundaries: Option<PathBuf>,

    /// JSON array of location rows
    #[arg(long, global = true)]
    pub locations: Option<PathBuf>,
}

fn required(backend: &Result<BackendConfig, BackendError>) -> Result<&BackendConfig, BackendError> {
    backend.as_ref().map_err(|e| BackendError::Config {
        message: format!("{e} (or pass --boundaries and --locations)"),
    })
}

/// Builds the collaborators for `args`.
///
/// # Errors
///
/// Returns [`BackendError::Config`] if a collaborator needs the backend and
/// it is not configured.
pub fn collaborators(args: &DataArgs) -> Result<Collaborators, BackendError> {
    let offline = args.boundaries.is_some() && args.locations.is_some();
    let backend = if offline {
        Err(BackendError::Config {
            message: "offline".to_string(),
        })
    } else {
        BackendConfig::from_env()
    };

    let boundaries: Box<dyn BoundarySource> = match &args.boundaries {
        Some(path) => Box::new(FileBoundarySource::new(path.clone())),
        None => Box::new(HttpBoundarySource::new(
            required(&backend)?.boundaries_url.clone(),
        )),
    };

    let locations: Box<dyn LocationService> = match &args.locations {
        Some(path) => Box::new(FileLocationService::new(path.clone())),
        None => Box::new(HttpLocationService::new(required(&backend)?)),
    };

    let (tokens, fallback_token): (Box<dyn TokenService>, String) = match &backend {
        Ok(config) => (
            Box::new(HttpTokenService::new(config)),
            config.fallback_token.clone(),
        ),
        Err(_) => {
            log::debug!("No backend configured; map token comes from {FALLBACK_TOKEN_VAR}");
            (
                Box::new(StaticTokenService::unavailable()),
                std::env::var(FALLBACK_TOKEN_VAR)
                    .unwrap_or_else(|_| PLACEHOLDER_FALLBACK_TOKEN.to_string()),
            )
        }
    };

    Ok(Collaborators {
        boundaries,
        tokens,
        locations,
        fallback_token,
    })
}
