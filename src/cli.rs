use clap::Parser;

/// sshpick - fuzzy-pick an EC2 instance or ssh-config host and ssh into it
#[derive(Parser, Debug, Clone)]
#[command(name = "sshpick", version, about)]
pub struct Args {
    /// Refetch the instance list from AWS instead of using the cache
    #[arg(short = 'f', long)]
    pub force: bool,

    /// Connect to the instance public IP (default host type)
    #[arg(short = 'P', long)]
    pub public_ip: bool,

    /// Connect to the instance private IP (VPN / bastion setups)
    #[arg(short = 'p', long)]
    pub private_ip: bool,

    /// Connect to the instance Name tag (needs matching ssh config entries)
    #[arg(short = 'n', long)]
    pub name_tag: bool,

    /// AWS region to list instances from
    #[arg(short = 'r', long)]
    pub region: Option<String>,

    /// ssh login user
    #[arg(short = 'l', long)]
    pub user: Option<String>,

    /// ssh identity file, passed through to ssh as given
    #[arg(short = 'i', long)]
    pub identity_file: Option<String>,

    /// ssh port
    #[arg(long)]
    pub port: Option<u16>,

    /// 1: pass -oStrictHostKeyChecking=no and -oUserKnownHostsFile=/dev/null, 0: off, -1: unset
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub strict_host_key_checking_no: i8,

    /// Pick from ~/.ssh/config host aliases instead of EC2
    #[arg(long)]
    pub use_ssh_config: bool,

    /// Pick from EC2 even when the profile prefers ssh config
    #[arg(long)]
    pub use_ec2: bool,

    /// Print the ssh command instead of running it
    #[arg(short = 's', long)]
    pub show_command: bool,

    /// Run the setup wizard and save the default profile
    #[arg(long)]
    pub init: bool,

    /// Filter for the host picker, optionally user@filter
    pub query: Vec<String>,
}

/// Splits a leading `user@` off the query. An @ at position 0 belongs to
/// the filter, not to a user.
pub fn split_user_query(query: &str) -> (String, String) {
    match query.find('@') {
        Some(idx) if idx > 0 => {
            let (user, rest) = query.split_at(idx);
            (user.to_string(), rest[1..].to_string())
        }
        _ => (String::new(), query.to_string()),
    }
}
