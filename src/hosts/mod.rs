pub mod cache;
pub mod ec2;
pub mod ssh_config;

use std::path::Path;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::picker::Choosable;

/// Which instance field becomes the ssh destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HostType {
    #[default]
    Public,
    Private,
    Name,
}

impl HostType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            "name" => Some(Self::Name),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Name => "name",
        }
    }
}

/// Collect the selectable targets for the configured source.
pub async fn load_choosables(
    settings: &Settings,
    tool_dir: &Path,
) -> Result<Vec<Box<dyn Choosable>>> {
    if settings.use_ssh_config {
        let aliases = ssh_config::load_aliases(&ssh_config::default_path()?)?;
        if aliases.is_empty() {
            return Err(Error::NoSshConfigHosts);
        }
        Ok(aliases
            .into_iter()
            .map(|a| Box::new(a) as Box<dyn Choosable>)
            .collect())
    } else {
        let hosts = ec2::Ec2Source::new(tool_dir, settings).load().await?;
        Ok(hosts
            .into_iter()
            .map(|h| Box::new(h) as Box<dyn Choosable>)
            .collect())
    }
}

/// Pads a label cell out to a column the way a per-row tab writer would:
/// at least 14 wide, otherwise the cell plus four spaces. The last cell of
/// a label is never padded.
pub(crate) fn column(cell: &str) -> String {
    let width = (cell.len() + 4).max(14);
    format!("{cell:<width$}")
}
