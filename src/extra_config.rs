use std::io::Write;

use tracing::{debug, info, instrument};

use crate::error::{ApiError, Error};
use crate::session::Session;
use crate::vcd::{ExtraConfigEntry, Reference, RESOURCE_TYPE_MEMORY, RESOURCE_TYPE_PROCESSOR};

/// Prints CPU and memory, then every extra-config entry.
///
/// Hardware lines are written before the extra config is fetched, so a failure
/// of the second call leaves them on the console.
#[instrument(skip_all, fields(vm = %vm.name))]
pub async fn show<S: Session + ?Sized>(
    session: &S,
    vm: &Reference,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let hardware = session.hardware(vm).await.map_err(Error::HardwareFetch)?;

    writeln!(out, "VM Name: {}", vm.name)?;
    for item in &hardware {
        debug!("{}: {}", item.label, item.quantity);
        match item.resource_type {
            RESOURCE_TYPE_PROCESSOR => writeln!(out, "CPU: {}", item.quantity)?,
            RESOURCE_TYPE_MEMORY => writeln!(out, "Memory: {} MB", item.quantity)?,
            _ => {}
        }
    }
    out.flush()?;

    let entries = session
        .extra_config(vm)
        .await
        .map_err(Error::ExtraConfigFetch)?;

    writeln!(out, "ExtraConfig:")?;
    for entry in &entries {
        writeln!(out, "  {}: {}", entry.key, entry.value)?;
    }

    Ok(())
}

#[instrument(skip(session, vm), fields(vm = %vm.name))]
pub async fn set<S: Session + ?Sized>(
    session: &S,
    vm: &Reference,
    key: &str,
    value: &str,
) -> Result<(), Error> {
    session
        .update_extra_config(vm, &[ExtraConfigEntry::new(key, value)])
        .await
        .map_err(|source| Error::ExtraConfigSet {
            key: key.to_string(),
            source,
        })?;

    info!("Set {}={} on {}", key, value, vm.name);
    Ok(())
}

/// Removes one key. A key the VM does not carry is reported as an error
/// instead of being sent to the service.
#[instrument(skip(session, vm), fields(vm = %vm.name))]
pub async fn delete<S: Session + ?Sized>(
    session: &S,
    vm: &Reference,
    key: &str,
) -> Result<(), Error> {
    let failed = |source| Error::ExtraConfigDelete {
        key: key.to_string(),
        source,
    };

    let present = session.extra_config(vm).await.map_err(failed)?;
    if !present.iter().any(|entry| entry.key == key) {
        return Err(failed(ApiError::KeyNotPresent));
    }

    session
        .delete_extra_config(vm, &[ExtraConfigEntry::new(key, "")])
        .await
        .map_err(failed)?;

    info!("Deleted {} from {}", key, vm.name);
    Ok(())
}
