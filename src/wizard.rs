use std::path::Path;

use crate::config::{Profile, ProfileDefaults};
use crate::error::Result;
use crate::picker::{choose, Choice, Choosable, Picker};

/// Interactive first-run setup. Asks for the profile fields that have no
/// workable built-in default and writes them to config.toml, leaving the
/// rest at their zero values.
pub fn run(picker: &dyn Picker, dir: &Path) -> Result<()> {
    let regions = [
        Choice::new("ap-northeast-1 (Tokyo)", "ap-northeast-1"),
        Choice::new("ap-southeast-1 (Singapore)", "ap-southeast-1"),
        Choice::new("ap-southeast-2 (Sydney)", "ap-southeast-2"),
        Choice::new("eu-central-1 (Frankfurt)", "eu-central-1"),
        Choice::new("eu-west-1 (Ireland)", "eu-west-1"),
        Choice::new("sa-east-1 (Sao Paulo)", "sa-east-1"),
        Choice::new("us-east-1 (N. Virginia)", "us-east-1"),
        Choice::new("us-west-1 (N. California)", "us-west-1"),
        Choice::new("us-west-2 (Oregon)", "us-west-2"),
    ];
    let region = choose(picker, "select default AWS region", "", &regions)?.value();

    let host_types = [
        Choice::new("PublicIP (default)", "public"),
        Choice::new("PrivateIP (for VPN or bastion setups)", "private"),
        Choice::new("Name tag (resolved through ssh config)", "name"),
    ];
    let host_type = choose(picker, "select default host type", "", &host_types)?.value();

    let strict_modes = [
        Choice::new("Not specify (default)", "0"),
        Choice::new("StrictHostKeyChecking=no (skip host key checks)", "1"),
    ];
    let strict = choose(picker, "select StrictHostKeyChecking handling", "", &strict_modes)?
        .value()
        .parse::<i8>()
        .unwrap_or(0);

    let profile = Profile {
        default: ProfileDefaults {
            aws_region: region,
            host_type,
            ssh_strict_host_key_checking_no: strict,
            ..ProfileDefaults::default()
        },
    };
    profile.save(dir)
}
