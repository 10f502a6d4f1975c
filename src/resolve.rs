use tracing::{debug, instrument};

use crate::error::{ApiError, Error};
use crate::session::Session;
use crate::vcd::Reference;

/// Names identifying one VM in the org → VDC → vApp → VM hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmPath {
    pub org: String,
    pub vdc: String,
    pub vapp: String,
    pub vm: String,
}

/// Walks the hierarchy one scope at a time, stopping at the first miss.
#[instrument(skip(session))]
pub async fn find_vm<S: Session + ?Sized>(session: &S, path: &VmPath) -> Result<Reference, Error> {
    let org = session
        .find_org(&path.org)
        .await
        .map_err(|source| lookup("organization", &path.org, source))?
        .ok_or_else(|| Error::OrgNotFound(path.org.clone()))?;
    debug!("Found organization {} at {}", org.name, org.href);

    let vdc = session
        .find_vdc(&org, &path.vdc)
        .await
        .map_err(|source| lookup("VDC", &path.vdc, source))?
        .ok_or_else(|| Error::VdcNotFound(path.vdc.clone()))?;
    debug!("Found VDC {} at {}", vdc.name, vdc.href);

    let vapp = session
        .find_vapp(&vdc, &path.vapp)
        .await
        .map_err(|source| lookup("vApp", &path.vapp, source))?
        .ok_or_else(|| Error::VappNotFound(path.vapp.clone()))?;
    debug!("Found vApp {} at {}", vapp.name, vapp.href);

    let vm = session
        .find_vm(&vapp, &path.vm)
        .await
        .map_err(|source| lookup("VM", &path.vm, source))?
        .ok_or_else(|| Error::VmNotFound(path.vm.clone()))?;
    debug!("Found VM {} at {}", vm.name, vm.href);

    Ok(vm)
}

fn lookup(scope: &'static str, name: &str, source: ApiError) -> Error {
    Error::Lookup {
        scope,
        name: name.to_string(),
        source,
    }
}
