use std::process::Command;

use crate::config::Settings;
use crate::error::Result;

/// Build the argument vector handed to `ssh`, ending with the target.
///
/// Options come out in a fixed order: login name, identity file, port,
/// host key checking overrides, then `[user@]host`. A user given in the
/// query wins over `-l` on the ssh side, so both may be present.
pub fn build_args(settings: &Settings, query_user: &str, host: &str) -> Vec<String> {
    let mut args = Vec::new();

    if !settings.ssh_user.is_empty() {
        args.push(format!("-l{}", settings.ssh_user));
    }
    if !settings.identity_file.is_empty() {
        args.push(format!("-i{}", settings.identity_file));
    }
    if settings.port > 0 {
        args.push(format!("-p{}", settings.port));
    }
    if settings.strict_host_key_checking_no == 1 {
        args.push("-oStrictHostKeyChecking=no".to_string());
        args.push("-oUserKnownHostsFile=/dev/null".to_string());
    }

    if query_user.is_empty() {
        args.push(host.to_string());
    } else {
        args.push(format!("{query_user}@{host}"));
    }

    args
}

/// Render the full command for `--show-command` output.
pub fn command_line(args: &[String]) -> String {
    format!("ssh {}", args.join(" "))
}

/// Run ssh in the foreground, inheriting the terminal, and hand back its
/// exit code. A signal death maps to 1.
pub fn run(args: &[String]) -> Result<i32> {
    let status = Command::new("ssh").args(args).status()?;
    Ok(status.code().unwrap_or(1))
}
