use std::ffi::OsString;
use std::path::PathBuf;

use clap::{CommandFactory, Parser};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "vcd-extraconfig",
    about = "Find a vCloud Director VM and read or edit its ExtraConfig",
    after_help = "Flags may be written with one or two dashes (-action get or --action get)."
)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "config.json")]
    pub config: PathBuf,

    /// Action: find, get, set, delete
    #[arg(long)]
    pub action: Option<String>,

    /// Organization name (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    pub org: Option<String>,

    /// VDC name (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    pub vdc: Option<String>,

    /// vApp name (overrides config)
    #[arg(long, allow_hyphen_values = true)]
    pub vapp: Option<String>,

    /// VM name
    #[arg(long, allow_hyphen_values = true)]
    pub vm: Option<String>,

    /// ExtraConfig key (for set/delete)
    #[arg(long, allow_hyphen_values = true)]
    pub key: Option<String>,

    /// ExtraConfig value (for set)
    #[arg(long, allow_hyphen_values = true)]
    pub value: Option<String>,
}

/// Parses the process arguments, accepting single-dash long flags.
pub fn parse<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    Cli::try_parse_from(normalize_args(args))
}

/// Exit status for a parser outcome: help and version exit 0, every real
/// parse error exits 1.
pub fn exit_status(err: &clap::Error) -> u8 {
    if err.use_stderr() {
        1
    } else {
        0
    }
}

/// Rewrites `-flag` and `-flag=x` to their `--` form for every long flag the
/// parser knows. Anything else, values included, passes through untouched.
pub fn normalize_args<I, T>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let command = Cli::command();
    let known: Vec<&str> = command
        .get_arguments()
        .filter_map(|arg| arg.get_long())
        .chain(["help"])
        .collect();

    let mut expect_value = false;
    args.into_iter()
        .map(Into::into)
        .enumerate()
        .map(|(i, arg)| {
            if i == 0 || std::mem::take(&mut expect_value) {
                return arg;
            }
            let Some(text) = arg.to_str() else {
                return arg;
            };
            let (single, flag) = match text.strip_prefix("--") {
                Some(flag) => (false, flag),
                None => match text.strip_prefix('-') {
                    Some(flag) => (true, flag),
                    None => return arg,
                },
            };
            let name = flag.split_once('=').map_or(flag, |(name, _)| name);
            if !known.contains(&name) {
                return arg;
            }
            expect_value = name != "help" && !flag.contains('=');
            if single {
                OsString::from(format!("-{}", text))
            } else {
                arg
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["vcd-extraconfig"];
        argv.extend_from_slice(args);
        super::parse(argv).unwrap()
    }

    #[test]
    fn single_dash_flags_are_accepted() {
        let cli = parse(&[
            "-action", "set", "-vm", "VM1", "-key", "guestinfo.foo", "-value", "bar",
        ]);
        assert_eq!(cli.action.as_deref(), Some("set"));
        assert_eq!(cli.vm.as_deref(), Some("VM1"));
        assert_eq!(cli.key.as_deref(), Some("guestinfo.foo"));
        assert_eq!(cli.value.as_deref(), Some("bar"));
        assert_eq!(cli.config, PathBuf::from("config.json"));
    }

    #[test]
    fn double_dash_and_equals_forms_work() {
        let cli = parse(&["--action", "get", "-org=Org2", "--vdc=Vdc2", "-config", "other.json"]);
        assert_eq!(cli.action.as_deref(), Some("get"));
        assert_eq!(cli.org.as_deref(), Some("Org2"));
        assert_eq!(cli.vdc.as_deref(), Some("Vdc2"));
        assert_eq!(cli.config, PathBuf::from("other.json"));
    }

    #[test]
    fn values_that_look_like_flags_are_kept() {
        let cli = parse(&["-action", "set", "-key", "-vm", "-value", "-x"]);
        assert_eq!(cli.key.as_deref(), Some("-vm"));
        assert_eq!(cli.value.as_deref(), Some("-x"));
        assert_eq!(cli.vm, None);

        let cli = parse(&["--action", "set", "--key", "-org", "-vm", "VM1"]);
        assert_eq!(cli.key.as_deref(), Some("-org"));
        assert_eq!(cli.org, None);
        assert_eq!(cli.vm.as_deref(), Some("VM1"));
    }

    #[test]
    fn unknown_single_dash_flags_are_left_alone() {
        let args = normalize_args(["vcd-extraconfig", "-bogus", "-h"]);
        assert_eq!(args, vec!["vcd-extraconfig", "-bogus", "-h"]);
    }

    #[test]
    fn identifiers_may_start_with_a_dash() {
        let cli = parse(&["-action", "find", "-vm", "-web01", "-vapp", "-app", "-org", "-o", "-vdc", "-d"]);
        assert_eq!(cli.vm.as_deref(), Some("-web01"));
        assert_eq!(cli.vapp.as_deref(), Some("-app"));
        assert_eq!(cli.org.as_deref(), Some("-o"));
        assert_eq!(cli.vdc.as_deref(), Some("-d"));
    }

    #[test]
    fn parser_errors_exit_one() {
        let err = super::parse(["vcd-extraconfig", "-bogus"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::UnknownArgument);
        assert_eq!(exit_status(&err), 1);

        let err = super::parse(["vcd-extraconfig", "-action", "get", "-vm"]).unwrap_err();
        assert_eq!(exit_status(&err), 1);
    }

    #[test]
    fn help_exits_zero() {
        for flag in ["-help", "--help", "-h"] {
            let err = super::parse(["vcd-extraconfig", flag]).unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
            assert_eq!(exit_status(&err), 0);
        }
    }
}
