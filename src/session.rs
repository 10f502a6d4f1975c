//! Seams between the dispatcher and the remote vCD service.
//!
//! The HTTP client in `client` implements both traits; tests swap in an
//! in-memory backend.

use async_trait::async_trait;

use crate::config::Config;
use crate::error::{ApiError, Error};
use crate::vcd::{ExtraConfigEntry, HardwareItem, Reference};

/// An authenticated session. Lookups return `Ok(None)` when the name does not
/// exist under the given parent.
#[async_trait]
pub trait Session: Send + Sync {
    async fn find_org(&self, name: &str) -> Result<Option<Reference>, ApiError>;

    async fn find_vdc(&self, org: &Reference, name: &str) -> Result<Option<Reference>, ApiError>;

    async fn find_vapp(&self, vdc: &Reference, name: &str) -> Result<Option<Reference>, ApiError>;

    /// Matches either the VM name or its id.
    async fn find_vm(&self, vapp: &Reference, name: &str) -> Result<Option<Reference>, ApiError>;

    async fn hardware(&self, vm: &Reference) -> Result<Vec<HardwareItem>, ApiError>;

    async fn extra_config(&self, vm: &Reference) -> Result<Vec<ExtraConfigEntry>, ApiError>;

    /// Creates or overwrites the given keys.
    async fn update_extra_config(
        &self,
        vm: &Reference,
        entries: &[ExtraConfigEntry],
    ) -> Result<(), ApiError>;

    /// Removes the given keys; values are ignored.
    async fn delete_extra_config(
        &self,
        vm: &Reference,
        entries: &[ExtraConfigEntry],
    ) -> Result<(), ApiError>;

    async fn disconnect(&self) -> Result<(), ApiError>;
}

/// Opens a session from a configuration.
#[async_trait]
pub trait Connector: Sync {
    type Session: Session;

    async fn connect(&self, config: &Config) -> Result<Self::Session, Error>;
}
