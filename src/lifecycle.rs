//! Starting and stopping the engine's integration inside a host
//! application.
//!
//! The host calls [`Lifecycle::on_register`] when the add-on is enabled,
//! [`Lifecycle::on_load`] after every file load and
//! [`Lifecycle::on_unregister`] when the add-on is disabled. What
//! "registering" means is up to the [`Integration`].

use std::path::Path;

use log::{debug, info, warn};
use thiserror::Error;

use crate::sdk::{SdkError, SdkLocation};

/// The engine-side part living in the SDK.
pub trait Integration {
    fn register(&mut self, scripts_dir: &Path, local_sdk: bool) -> anyhow::Result<()>;

    fn unregister(&mut self) -> anyhow::Result<()>;
}

#[derive(Error, Debug)]
pub enum LifecycleError {
    #[error(transparent)]
    Sdk(#[from] SdkError),
    #[error(
        "'armory' folder not found in {0}. Please make sure the SDK path is correct or that the SDK was downloaded correctly."
    )]
    ArmoryMissing(String),
    #[error("Integration failed: {0}")]
    Integration(#[from] anyhow::Error),
}

pub struct Lifecycle<I> {
    integration: I,
    location: Result<SdkLocation, SdkError>,
    running: bool,
}

impl<I: Integration> Lifecycle<I> {
    pub fn new(integration: I, location: Result<SdkLocation, SdkError>) -> Self {
        Self {
            integration,
            location,
            running: false,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn integration(&self) -> &I {
        &self.integration
    }

    /// Points the lifecycle at another SDK, e.g. after the path setting
    /// changed. A running integration is left alone.
    pub fn set_location(&mut self, location: Result<SdkLocation, SdkError>) {
        self.location = location;
    }

    pub fn start(&mut self) -> Result<(), LifecycleError> {
        let location = match &self.location {
            Ok(location) => location,
            Err(error) => return Err(error.clone().into()),
        };
        if !location.armory_path().exists() {
            return Err(LifecycleError::ArmoryMissing(
                location.root().display().to_string(),
            ));
        }
        let scripts = location.scripts_path();
        debug!("Registering integration from {}", scripts.display());
        self.integration.register(&scripts, location.is_local())?;
        self.running = true;
        info!("Armory integration started");
        Ok(())
    }

    /// Returns `false` without touching the integration when the SDK has no
    /// scripts directory.
    pub fn stop(&mut self) -> Result<bool, LifecycleError> {
        let scripts = match &self.location {
            Ok(location) => location.scripts_path(),
            Err(_) => return Ok(false),
        };
        if !scripts.exists() {
            debug!("No integration scripts at {}", scripts.display());
            return Ok(false);
        }
        self.integration.unregister()?;
        self.running = false;
        info!("Armory integration stopped");
        Ok(true)
    }

    pub fn on_load(&mut self) -> Result<(), LifecycleError> {
        if self.running {
            return Ok(());
        }
        self.start()
    }

    pub fn on_register(&mut self) -> Result<(), LifecycleError> {
        if self.running {
            return Ok(());
        }
        if let Err(error) = &self.location {
            warn!("{}", error);
            return Ok(());
        }
        self.start()
    }

    pub fn on_unregister(&mut self) -> Result<bool, LifecycleError> {
        self.stop()
    }
}
