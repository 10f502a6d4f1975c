use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, instrument, trace};
use url::Url;

use crate::config::Config;
use crate::error::{ApiError, Error};
use crate::session::{Connector, Session};
use crate::vcd::{
    ExtraConfigEntry, ExtraConfigSection, HardwareItem, Org, OrgList, Reference, Task, VApp,
    VcdError, Vdc, VirtualHardwareSection, VAPP_TYPE_PREFIX, VDC_TYPE_PREFIX,
};

const ACCESS_TOKEN_HEADER: &str = "x-vmware-vcloud-access-token";
const LEGACY_TOKEN_HEADER: &str = "x-vcloud-authorization";
const EXTRA_CONFIG_MEDIA_TYPE: &str = "application/vnd.vmware.vcloud.virtualHardwareSection+json";
const TASK_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Parses the configured base URL; only absolute URLs with a host are accepted.
pub fn parse_base_url(raw: &str) -> Result<Url, Error> {
    let invalid = |reason: String| Error::InvalidUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid("not an absolute URL with a host".to_string()));
    }

    Ok(url)
}

/// Authenticated session against the vCD legacy REST API.
#[derive(Debug)]
pub struct VcdClient {
    http: Client,
    base_url: String,
}

impl VcdClient {
    #[instrument(skip_all, fields(url = %config.url, org = %config.org, user = %config.user))]
    pub async fn connect(config: &Config) -> Result<Self, Error> {
        let base = parse_base_url(&config.url)?;
        let base_url = base.as_str().trim_end_matches('/').to_string();
        let accept = format!("application/*+json;version={}", config.api);

        let accept_header =
            HeaderValue::from_str(&accept).map_err(|e| Error::Authentication(e.to_string()))?;
        let login = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .build()
            .map_err(|e| Error::Authentication(e.to_string()))?;

        let sessions_url = format!("{}/sessions", base_url);
        debug!("Logging in to {} as {}@{}", sessions_url, config.user, config.org);
        let response = login
            .post(&sessions_url)
            .header(ACCEPT, accept_header.clone())
            .basic_auth(format!("{}@{}", config.user, config.org), Some(&config.password))
            .send()
            .await
            .map_err(|e| Error::Authentication(e.to_string()))?;

        if !response.status().is_success() {
            let err = error_from_response(response).await;
            return Err(Error::Authentication(err.to_string()));
        }

        let authorization = token_header(response.headers()).ok_or_else(|| {
            Error::Authentication("login response carried no access token".to_string())
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, accept_header);
        headers.insert(authorization.0, authorization.1);

        let http = Client::builder()
            .danger_accept_invalid_certs(config.insecure)
            .default_headers(headers)
            .build()
            .map_err(|e| Error::Authentication(e.to_string()))?;

        info!("Logged in to {}", base_url);
        Ok(VcdClient { http, base_url })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn get<T: DeserializeOwned>(&self, href: &str) -> Result<T, ApiError> {
        debug!("GET {}", href);
        let response = self.http.get(href).send().await?;
        decode(response).await
    }

    async fn put<B: Serialize>(&self, href: &str, body: &B) -> Result<Task, ApiError> {
        debug!("PUT {}", href);
        let response = self
            .http
            .put(href)
            .header(CONTENT_TYPE, EXTRA_CONFIG_MEDIA_TYPE)
            .json(body)
            .send()
            .await?;
        decode(response).await
    }

    /// Polls a task until it leaves the queued/running states.
    async fn wait_task(&self, mut task: Task) -> Result<(), ApiError> {
        loop {
            trace!("Task {} status {}", task.href, task.status);
            match task.status.as_str() {
                "success" => return Ok(()),
                "error" | "aborted" | "canceled" => {
                    return Err(ApiError::Task {
                        operation: task.operation,
                        status: task.status,
                        message: task.error.map(|e| e.message).unwrap_or_default(),
                    });
                }
                _ => {
                    tokio::time::sleep(TASK_POLL_INTERVAL).await;
                    task = self.get(&task.href).await?;
                }
            }
        }
    }

    async fn write_extra_config(
        &self,
        vm: &Reference,
        entries: Vec<ExtraConfigEntry>,
    ) -> Result<(), ApiError> {
        let section = ExtraConfigSection {
            extra_config: entries,
        };
        let task = self.put(&extra_config_href(vm), &section).await?;
        self.wait_task(task).await
    }
}

#[async_trait]
impl Session for VcdClient {
    #[instrument(skip(self))]
    async fn find_org(&self, name: &str) -> Result<Option<Reference>, ApiError> {
        let orgs: OrgList = self.get(&self.endpoint("org")).await?;
        Ok(orgs.org.into_iter().find(|org| org.name == name))
    }

    #[instrument(skip(self, org), fields(org = %org.name))]
    async fn find_vdc(&self, org: &Reference, name: &str) -> Result<Option<Reference>, ApiError> {
        let org: Org = self.get(&org.href).await?;
        Ok(org
            .link
            .into_iter()
            .find(|link| link.media_type.starts_with(VDC_TYPE_PREFIX) && link.name == name)
            .map(|link| Reference {
                name: link.name,
                href: link.href,
            }))
    }

    #[instrument(skip(self, vdc), fields(vdc = %vdc.name))]
    async fn find_vapp(
        &self,
        vdc: &Reference,
        name: &str,
    ) -> Result<Option<Reference>, ApiError> {
        let vdc: Vdc = self.get(&vdc.href).await?;
        Ok(vdc
            .resource_entities
            .resource_entity
            .into_iter()
            .find(|entity| entity.media_type.starts_with(VAPP_TYPE_PREFIX) && entity.name == name)
            .map(|entity| Reference {
                name: entity.name,
                href: entity.href,
            }))
    }

    #[instrument(skip(self, vapp), fields(vapp = %vapp.name))]
    async fn find_vm(&self, vapp: &Reference, name: &str) -> Result<Option<Reference>, ApiError> {
        let vapp: VApp = self.get(&vapp.href).await?;
        Ok(vapp
            .children
            .vm
            .into_iter()
            .find(|vm| vm.name == name || vm.id == name)
            .map(|vm| Reference {
                name: vm.name,
                href: vm.href,
            }))
    }

    #[instrument(skip(self, vm), fields(vm = %vm.name))]
    async fn hardware(&self, vm: &Reference) -> Result<Vec<HardwareItem>, ApiError> {
        let section: VirtualHardwareSection = self.get(&hardware_href(vm)).await?;
        Ok(section.item.into_iter().map(HardwareItem::from).collect())
    }

    #[instrument(skip(self, vm), fields(vm = %vm.name))]
    async fn extra_config(&self, vm: &Reference) -> Result<Vec<ExtraConfigEntry>, ApiError> {
        let section: ExtraConfigSection = self.get(&extra_config_href(vm)).await?;
        Ok(section.extra_config)
    }

    #[instrument(skip(self, vm), fields(vm = %vm.name))]
    async fn update_extra_config(
        &self,
        vm: &Reference,
        entries: &[ExtraConfigEntry],
    ) -> Result<(), ApiError> {
        self.write_extra_config(vm, entries.to_vec()).await
    }

    #[instrument(skip(self, vm), fields(vm = %vm.name))]
    async fn delete_extra_config(
        &self,
        vm: &Reference,
        entries: &[ExtraConfigEntry],
    ) -> Result<(), ApiError> {
        // The hypervisor drops extra-config keys whose value is empty.
        let cleared = entries
            .iter()
            .map(|entry| ExtraConfigEntry::new(entry.key.clone(), ""))
            .collect();
        self.write_extra_config(vm, cleared).await
    }

    #[instrument(skip(self))]
    async fn disconnect(&self) -> Result<(), ApiError> {
        let url = self.endpoint("session");
        debug!("DELETE {}", url);
        let response = self.http.delete(&url).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        info!("Logged out of {}", self.base_url);
        Ok(())
    }
}

/// Opens `VcdClient` sessions over HTTP.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

#[async_trait]
impl Connector for HttpConnector {
    type Session = VcdClient;

    async fn connect(&self, config: &Config) -> Result<VcdClient, Error> {
        VcdClient::connect(config).await
    }
}

fn hardware_href(vm: &Reference) -> String {
    format!("{}/virtualHardwareSection", vm.href.trim_end_matches('/'))
}

fn extra_config_href(vm: &Reference) -> String {
    format!("{}/extraConfig", hardware_href(vm))
}

/// Picks the header to send back on every request after login.
fn token_header(headers: &HeaderMap) -> Option<(reqwest::header::HeaderName, HeaderValue)> {
    if let Some(token) = headers.get(ACCESS_TOKEN_HEADER) {
        let bearer = format!("Bearer {}", token.to_str().ok()?);
        return Some((AUTHORIZATION, HeaderValue::from_str(&bearer).ok()?));
    }

    headers.get(LEGACY_TOKEN_HEADER).map(|token| {
        (
            reqwest::header::HeaderName::from_static(LEGACY_TOKEN_HEADER),
            token.clone(),
        )
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }

    let body = response.text().await?;
    trace!("Response body: {}", body);
    serde_json::from_str(&body).map_err(|e| ApiError::Decode(e.to_string()))
}

async fn error_from_response(response: Response) -> ApiError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<VcdError>(&body) {
        Ok(err) if !err.message.is_empty() => {
            if err.minor_error_code.is_empty() {
                err.message
            } else {
                format!("[{} {}] {}", err.major_error_code, err.minor_error_code, err.message)
            }
        }
        _ if body.is_empty() => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
        _ => body,
    };

    ApiError::status(status.as_u16(), message)
}
