use std::io::Write;
use std::str::FromStr;

use tracing::{info, instrument, warn};

use crate::cli::Cli;
use crate::config::Config;
use crate::error::Error;
use crate::extra_config;
use crate::resolve::{self, VmPath};
use crate::session::{Connector, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Find,
    Get,
    Set,
    Delete,
}

impl Action {
    pub fn name(self) -> &'static str {
        match self {
            Action::Find => "find",
            Action::Get => "get",
            Action::Set => "set",
            Action::Delete => "delete",
        }
    }

    fn needs_key(self) -> bool {
        matches!(self, Action::Set | Action::Delete)
    }

    fn needs_value(self) -> bool {
        self == Action::Set
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "find" => Ok(Action::Find),
            "get" => Ok(Action::Get),
            "set" => Ok(Action::Set),
            "delete" => Ok(Action::Delete),
            other => Err(Error::UnknownAction(other.to_string())),
        }
    }
}

/// A validated invocation: every identifier the action needs is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub action: Action,
    pub path: VmPath,
    pub key: String,
    pub value: String,
}

impl Request {
    /// Applies the org/vdc/vapp overrides and checks the action's requirements.
    pub fn new(action: Action, cli: &Cli, config: &Config) -> Result<Self, Error> {
        let path = VmPath {
            org: pick(&cli.org, &config.org),
            vdc: pick(&cli.vdc, &config.vdc),
            vapp: pick(&cli.vapp, &config.vapp),
            vm: pick(&cli.vm, ""),
        };
        let key = pick(&cli.key, "");
        let value = pick(&cli.value, "");

        let mut missing = Vec::new();
        for (flag, given) in [
            ("-org", &path.org),
            ("-vdc", &path.vdc),
            ("-vapp", &path.vapp),
            ("-vm", &path.vm),
        ] {
            if given.is_empty() {
                missing.push(flag);
            }
        }
        if action.needs_key() && key.is_empty() {
            missing.push("-key");
        }
        if action.needs_value() && value.is_empty() {
            missing.push("-value");
        }

        if !missing.is_empty() {
            return Err(Error::MissingArguments {
                action: action.name(),
                missing,
            });
        }

        Ok(Request {
            action,
            path,
            key,
            value,
        })
    }
}

/// Explicit non-empty argument first, configuration second.
fn pick(arg: &Option<String>, fallback: &str) -> String {
    match arg.as_deref() {
        Some(value) if !value.is_empty() => value.to_string(),
        _ => fallback.to_string(),
    }
}

/// Runs one invocation end to end. Nothing touches the network until the
/// request has been validated, and an opened session is always closed.
pub async fn run<C: Connector>(cli: &Cli, connector: &C, out: &mut dyn Write) -> Result<(), Error> {
    let action: Action = cli
        .action
        .as_deref()
        .filter(|a| !a.is_empty())
        .ok_or(Error::MissingAction)?
        .parse()?;

    let config = Config::load(&cli.config)?;
    let request = Request::new(action, cli, &config)?;

    let session = connector.connect(&config).await?;
    let result = execute(&session, &request, out).await;

    if let Err(e) = session.disconnect().await {
        warn!("Error disconnecting: {}", e);
    }

    result
}

#[instrument(skip(session, out))]
async fn execute<S: Session>(
    session: &S,
    request: &Request,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let vm = resolve::find_vm(session, &request.path).await?;

    match request.action {
        Action::Find => {
            writeln!(out, "VM found: {}", vm.name)?;
        }
        Action::Get => {
            extra_config::show(session, &vm, out).await?;
        }
        Action::Set => {
            extra_config::set(session, &vm, &request.key, &request.value).await?;
            writeln!(out, "ExtraConfig {}={} set", request.key, request.value)?;
        }
        Action::Delete => {
            extra_config::delete(session, &vm, &request.key).await?;
            writeln!(out, "ExtraConfig {} deleted", request.key)?;
        }
    }

    info!("{} finished for {}", request.action.name(), vm.name);
    Ok(())
}
