//! Initialization and lifecycle management for detgeom.
//!
//! This module provides the functions to initialize and shut down the
//! global editor state, and to read and change its options.

use crate::{with_context, with_context_mut, Options, Result};

/// Initializes detgeom with default options.
///
/// This must be called before any other detgeom function. It sets up the
/// global scene and installs an `env_logger` logger if none is installed,
/// so degraded placements show up under `RUST_LOG=warn`.
///
/// # Errors
///
/// Returns an error if detgeom has already been initialized.
///
/// # Example
///
/// ```no_run
/// use detgeom::*;
///
/// fn main() -> Result<()> {
///     init()?;
///     add_volume(Volume::new("Tank", VolumeKind::Cylinder))?;
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    let _ = env_logger::try_init();
    detgeom_core::state::init_context()?;
    log::info!("detgeom initialized");
    Ok(())
}

/// Returns whether detgeom has been initialized.
#[must_use]
pub fn is_initialized() -> bool {
    detgeom_core::state::is_initialized()
}

/// Shuts down detgeom and clears the scene.
///
/// Note: the global context lives in a `OnceLock`, so it cannot be
/// initialized again in the same process.
pub fn shutdown() {
    detgeom_core::state::shutdown_context();
    log::info!("detgeom shut down");
}

/// Replaces the global options.
pub fn set_options(options: Options) {
    with_context_mut(|ctx| {
        ctx.options = options;
    });
}

/// Returns a copy of the global options.
#[must_use]
pub fn get_options() -> Options {
    with_context(|ctx| ctx.options.clone())
}

/// Replaces the global options with ones read from JSON.
///
/// Fields missing from `json` take their default value.
pub fn load_options_str(json: &str) -> Result<()> {
    let options = Options::from_json_str(json)?;
    set_options(options);
    Ok(())
}
