use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cli::Args;
use crate::error::{Error, Result};
use crate::hosts::HostType;

pub const PROFILE_FILE: &str = "config.toml";

pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_HOST_TYPE: &str = "SSHPICK_HOST_TYPE";

/// Profile and instance caches live side by side in here.
pub fn tool_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
    Ok(home.join(".config").join("sshpick"))
}

/// On-disk profile: one `[default]` table, written by the setup wizard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub default: ProfileDefaults,
}

/// Empty strings, zero port and zero strict mode mean "not set" and lose
/// the merge to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDefaults {
    pub aws_region: String,
    pub host_type: String,
    pub ssh_user: String,
    pub ssh_identity_file: String,
    pub ssh_port: u16,
    pub ssh_strict_host_key_checking_no: i8,
    pub use_ssh_config: bool,
}

impl Profile {
    /// A missing profile is not an error, everything else is. Loaded
    /// values go through the same checks the wizard applies before saving.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(PROFILE_FILE);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::ProfileRead { path, source: e }),
        };
        let profile: Self =
            toml::from_str(&contents).map_err(|e| Error::ProfileParse { path, source: e })?;
        profile.default.validate()?;
        Ok(profile)
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        self.default.validate()?;
        let path = dir.join(PROFILE_FILE);
        let contents = toml::to_string_pretty(self).map_err(|e| Error::ProfileWrite {
            path: path.clone(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        fs::create_dir_all(dir).map_err(|e| Error::ProfileWrite {
            path: path.clone(),
            source: e,
        })?;
        fs::write(&path, contents).map_err(|e| Error::ProfileWrite { path, source: e })?;
        Ok(())
    }
}

impl ProfileDefaults {
    /// Same value rules the merged settings go through; runs after every
    /// load and before every save.
    pub fn validate(&self) -> Result<()> {
        if !self.host_type.is_empty() && HostType::parse(&self.host_type).is_none() {
            return Err(Error::InvalidHostType(self.host_type.clone()));
        }
        check_identity_file(&self.ssh_identity_file)?;
        check_strict_mode(self.ssh_strict_host_key_checking_no)?;
        Ok(())
    }
}

/// The environment layer, read in one place so the merge stays a pure
/// function of its inputs.
#[derive(Debug, Clone, Default)]
pub struct EnvDefaults {
    pub region: String,
    pub host_type: String,
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        Self {
            region: std::env::var(ENV_AWS_REGION).unwrap_or_default(),
            host_type: std::env::var(ENV_HOST_TYPE).unwrap_or_default(),
        }
    }
}

/// Operating configuration after the three-layer merge. Built once in
/// main and passed by reference from there on.
#[derive(Debug, Clone)]
pub struct Settings {
    pub reload: bool,
    pub region: String,
    pub host_type: HostType,
    pub ssh_user: String,
    pub identity_file: String,
    pub port: u16,
    pub strict_host_key_checking_no: i8,
    pub use_ssh_config: bool,
}

impl Settings {
    /// Per-field merge, option > profile > environment. An option only
    /// wins with a non-default value: a set flag, a non-empty string, a
    /// port above zero, a strict mode other than -1. Only region and
    /// host type have an environment layer.
    pub fn resolve(args: &Args, profile: &ProfileDefaults, env: &EnvDefaults) -> Result<Self> {
        let host_type_flags = [args.public_ip, args.private_ip, args.name_tag]
            .iter()
            .filter(|set| **set)
            .count();
        if host_type_flags > 1 {
            return Err(Error::HostTypeConflict);
        }
        if args.use_ssh_config && args.use_ec2 {
            return Err(Error::SourceConflict);
        }

        let host_type = if args.public_ip {
            HostType::Public
        } else if args.private_ip {
            HostType::Private
        } else if args.name_tag {
            HostType::Name
        } else {
            fallback_host_type(&profile.host_type, &env.host_type)?
        };

        let port = match args.port {
            Some(port) if port > 0 => port,
            _ => profile.ssh_port,
        };

        let strict = if args.strict_host_key_checking_no != -1 {
            args.strict_host_key_checking_no
        } else {
            profile.ssh_strict_host_key_checking_no
        };

        let mut use_ssh_config = profile.use_ssh_config;
        if args.use_ssh_config {
            use_ssh_config = true;
        }
        if args.use_ec2 {
            use_ssh_config = false;
        }

        Ok(Self {
            reload: args.force,
            region: pick_string(args.region.as_deref(), &profile.aws_region, &env.region),
            host_type,
            ssh_user: pick_string(args.user.as_deref(), &profile.ssh_user, ""),
            identity_file: pick_string(
                args.identity_file.as_deref(),
                &profile.ssh_identity_file,
                "",
            ),
            port,
            strict_host_key_checking_no: strict,
            use_ssh_config,
        })
    }

    /// Checks that only make sense on the merged result. Runs before any
    /// network or interactive work.
    pub fn validate(&self) -> Result<()> {
        check_strict_mode(self.strict_host_key_checking_no)?;
        check_identity_file(&self.identity_file)?;
        if !self.use_ssh_config && self.region.is_empty() {
            return Err(Error::MissingRegion);
        }
        Ok(())
    }
}

fn pick_string(option: Option<&str>, profile: &str, env: &str) -> String {
    if let Some(value) = option {
        if !value.is_empty() {
            return value.to_string();
        }
    }
    if !profile.is_empty() {
        return profile.to_string();
    }
    env.to_string()
}

/// A profile host type must be valid, it is durable user state. An
/// unrecognized environment value is only warned about and ignored, so a
/// stray variable cannot make every candidate unreachable.
fn fallback_host_type(profile_value: &str, env_value: &str) -> Result<HostType> {
    if !profile_value.is_empty() {
        return HostType::parse(profile_value)
            .ok_or_else(|| Error::InvalidHostType(profile_value.to_string()));
    }
    if !env_value.is_empty() {
        match HostType::parse(env_value) {
            Some(host_type) => return Ok(host_type),
            None => warn!("ignoring unrecognized {ENV_HOST_TYPE} value {env_value:?}"),
        }
    }
    Ok(HostType::default())
}

fn check_strict_mode(value: i8) -> Result<()> {
    match value {
        -1 | 0 | 1 => Ok(()),
        _ => Err(Error::InvalidStrictMode(value)),
    }
}

fn check_identity_file(path: &str) -> Result<()> {
    if path.is_empty() {
        return Ok(());
    }
    let expanded = shellexpand::tilde(path);
    if !Path::new(expanded.as_ref()).exists() {
        return Err(Error::IdentityFileNotFound(PathBuf::from(expanded.as_ref())));
    }
    Ok(())
}
