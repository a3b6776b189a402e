use std::path::Path;

use aws_config::{BehaviorVersion, Region};
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::Instance;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::cache::{self, CacheRead, InstanceCache, Plan};
use super::{column, HostType};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::picker::Choosable;

/// Lifecycle state a record must be in to become a candidate.
const RUNNING_STATE: &str = "running";

/// Placeholder for the public address column of instances without one.
pub const NO_PUBLIC_IP: &str = "NO_PUBLIC_IP";

/// Snapshot document as cached on disk. The top-level key is part of the
/// cache format and must not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub ec2_instances: Vec<RawInstance>,
}

/// One instance as fetched or cached. Every field is optional so older
/// snapshots and foreign records still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawInstance {
    pub instance_id: Option<String>,
    pub state: Option<String>,
    pub public_ip_address: Option<String>,
    pub private_ip_address: Option<String>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub key: Option<String>,
    pub value: Option<String>,
}

impl RawInstance {
    fn from_sdk(instance: &Instance) -> Self {
        Self {
            instance_id: instance.instance_id().map(str::to_string),
            state: instance
                .state()
                .and_then(|s| s.name())
                .map(|n| n.as_str().to_string()),
            public_ip_address: instance.public_ip_address().map(str::to_string),
            private_ip_address: instance.private_ip_address().map(str::to_string),
            tags: instance
                .tags()
                .iter()
                .map(|t| Tag {
                    key: t.key().map(str::to_string),
                    value: t.value().map(str::to_string),
                })
                .collect(),
        }
    }
}

/// A running instance with a usable connection target.
#[derive(Debug, Clone, PartialEq)]
pub struct Ec2Host {
    pub instance_id: String,
    pub name: String,
    pub public_ip: String,
    pub private_ip: String,
    host_type: HostType,
}

impl Ec2Host {
    /// One raw record to at most one candidate. Non-running records and
    /// records with nothing to connect to for this host type are dropped.
    pub fn from_record(record: &RawInstance, host_type: HostType) -> Option<Self> {
        if record.state.as_deref() != Some(RUNNING_STATE) {
            return None;
        }

        let name = record
            .tags
            .iter()
            .find(|t| t.key.as_deref() == Some("Name"))
            .and_then(|t| t.value.clone())
            .unwrap_or_default();

        let host = Self {
            instance_id: record.instance_id.clone().unwrap_or_default(),
            name,
            public_ip: record.public_ip_address.clone().unwrap_or_default(),
            private_ip: record.private_ip_address.clone().unwrap_or_default(),
            host_type,
        };

        if host.target().is_empty() {
            return None;
        }

        Some(host)
    }

    /// The field the configured host type connects to.
    pub fn target(&self) -> &str {
        match self.host_type {
            HostType::Public => &self.public_ip,
            HostType::Private => &self.private_ip,
            HostType::Name => &self.name,
        }
    }
}

impl Choosable for Ec2Host {
    fn label(&self) -> String {
        match self.host_type {
            // Name mode shows both addresses so the user can tell what the
            // alias will actually reach.
            HostType::Name => {
                let public = if self.public_ip.is_empty() {
                    NO_PUBLIC_IP
                } else {
                    self.public_ip.as_str()
                };
                format!(
                    "{}{}{}{}",
                    column(&self.instance_id),
                    column(&self.name),
                    column(public),
                    self.private_ip
                )
            }
            _ => format!(
                "{}{}{}",
                column(&self.instance_id),
                column(&self.name),
                self.target()
            ),
        }
    }

    fn value(&self) -> String {
        self.target().to_string()
    }
}

/// Extract candidates from raw records, ordered by name. The sort is
/// stable, so equally named instances keep their discovery order.
pub fn running_hosts(records: &[RawInstance], host_type: HostType) -> Vec<Ec2Host> {
    let mut hosts: Vec<Ec2Host> = records
        .iter()
        .filter_map(|r| Ec2Host::from_record(r, host_type))
        .collect();
    hosts.sort_by(|a, b| a.name.cmp(&b.name));
    hosts
}

/// One DescribeInstances call for the region, no filters. Filtering to
/// running instances happens at extraction so the cache keeps everything.
pub async fn fetch_instances(region: &str) -> Result<Vec<RawInstance>> {
    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .load()
        .await;
    let client = aws_sdk_ec2::Client::new(&config);

    let response = client
        .describe_instances()
        .send()
        .await
        .map_err(|e| Error::Fetch(DisplayErrorContext(e).to_string()))?;

    let mut records = Vec::new();
    for reservation in response.reservations() {
        for instance in reservation.instances() {
            records.push(RawInstance::from_sdk(instance));
        }
    }

    Ok(records)
}

/// EC2-backed candidate source: cache first, fetch when the cache cannot
/// serve, never fail on cache writes.
pub struct Ec2Source {
    cache: InstanceCache,
    region: String,
    host_type: HostType,
    reload: bool,
}

impl Ec2Source {
    pub fn new(tool_dir: &Path, settings: &Settings) -> Self {
        Self {
            cache: InstanceCache::new(tool_dir.to_path_buf()),
            region: settings.region.clone(),
            host_type: settings.host_type,
            reload: settings.reload,
        }
    }

    pub async fn load(&self) -> Result<Vec<Ec2Host>> {
        let read = self.cache.read(&self.region);
        if let CacheRead::Unreadable(reason) = &read {
            warn!(
                "instance cache for {} is unreadable, refetching: {reason}",
                self.region
            );
        }

        let records = match cache::plan(self.reload, read) {
            Plan::Serve(records) => records,
            Plan::Refresh(reason) => {
                debug!("refreshing instance list for {} ({reason:?})", self.region);
                let fetched = fetch_instances(&self.region).await?;
                if let Err(err) = self.cache.write(&self.region, &fetched) {
                    warn!("failed to store ec2 list cache: {err}");
                }
                fetched
            }
        };

        let hosts = running_hosts(&records, self.host_type);
        if hosts.is_empty() {
            return Err(Error::NoRunningInstances {
                region: self.region.clone(),
            });
        }

        Ok(hosts)
    }
}
