use serde::{Deserialize, Deserializer, Serialize};

// OVF resource types (CIM_ResourceAllocationSettingData)
pub const RESOURCE_TYPE_PROCESSOR: u32 = 3;
pub const RESOURCE_TYPE_MEMORY: u32 = 4;

pub const VDC_TYPE_PREFIX: &str = "application/vnd.vmware.vcloud.vdc+";
pub const VAPP_TYPE_PREFIX: &str = "application/vnd.vmware.vcloud.vApp+";

/// vCD sends `null` for unset members; treat it like an absent one.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Name and href of an entity; the href is the handle for every follow-up call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Reference {
    pub name: String,
    pub href: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrgList {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) org: Vec<Reference>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Org {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) link: Vec<Link>,
}

#[derive(Debug, Deserialize)]
pub struct Link {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub(crate) media_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) name: String,
    pub(crate) href: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Vdc {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) resource_entities: ResourceEntities,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceEntities {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) resource_entity: Vec<Link>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VApp {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) children: Children,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Children {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) vm: Vec<VmChild>,
}

#[derive(Debug, Deserialize)]
pub struct VmChild {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) id: String,
    pub(crate) name: String,
    pub(crate) href: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct VirtualHardwareSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) item: Vec<Item>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Item {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) resource_type: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) element_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) virtual_quantity: i64,
}

/// Hardware item reduced to what the `get` action prints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareItem {
    pub resource_type: u32,
    pub label: String,
    pub quantity: i64,
}

impl From<Item> for HardwareItem {
    fn from(item: Item) -> Self {
        HardwareItem {
            resource_type: item.resource_type,
            label: item.element_name,
            quantity: item.virtual_quantity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraConfigEntry {
    pub key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl ExtraConfigEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        ExtraConfigEntry {
            key: key.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtraConfigSection {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) extra_config: Vec<ExtraConfigEntry>,
}

#[derive(Debug, Deserialize)]
pub struct Task {
    pub(crate) href: String,
    pub(crate) status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) operation: String,
    #[serde(default)]
    pub(crate) error: Option<VcdError>,
}

/// Error document returned with non-2xx responses and failed tasks.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VcdError {
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) major_error_code: u16,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) minor_error_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub(crate) message: String,
}
