use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a run. Cache problems are deliberately absent:
/// a stale or unwritable cache degrades to a live fetch instead of failing.
#[derive(Debug, Error)]
pub enum Error {
    // Validation
    #[error("invalid host type {0:?} (expected public, private or name)")]
    InvalidHostType(String),

    #[error("invalid strict-host-key-checking value {0} (expected -1, 0 or 1)")]
    InvalidStrictMode(i8),

    #[error("identity file does not exist: {}", .0.display())]
    IdentityFileNotFound(PathBuf),

    #[error("only one of -P, -p and -n can be given")]
    HostTypeConflict,

    #[error("--use-ssh-config and --use-ec2 are mutually exclusive")]
    SourceConflict,

    #[error("aws region is not set (use -r, AWS_REGION or `sshpick --init`)")]
    MissingRegion,

    // Candidate sources
    #[error("failed to fetch ec2 instances: {0}")]
    Fetch(String),

    #[error("no running instance in {region}")]
    NoRunningInstances { region: String },

    #[error("ssh config does not exist: {}", .0.display())]
    SshConfigNotFound(PathBuf),

    #[error("ssh config has no host entries")]
    NoSshConfigHosts,

    // Selection
    #[error("no selection made")]
    NoSelection,

    // Profile
    #[error("cannot determine home directory")]
    NoHomeDir,

    #[error("cannot read profile {}: {source}", .path.display())]
    ProfileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse profile {}: {source}", .path.display())]
    ProfileParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot write profile {}: {source}", .path.display())]
    ProfileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_running_instances_names_region() {
        let err = Error::NoRunningInstances {
            region: "ap-northeast-1".to_string(),
        };
        assert_eq!(format!("{err}"), "no running instance in ap-northeast-1");
    }

    #[test]
    fn test_cancelled_selection_message() {
        assert_eq!(format!("{}", Error::NoSelection), "no selection made");
    }

    #[test]
    fn test_io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
