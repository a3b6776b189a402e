use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::ec2::{RawInstance, Snapshot};

pub const CACHE_FILE_PREFIX: &str = "aws.instances.cache.";
pub const CACHE_FILE_EXT: &str = "json";

/// Outcome of a cache read. Unreadable covers io and decode failures
/// alike; the caller treats both as grounds for a refetch.
#[derive(Debug, PartialEq)]
pub enum CacheRead {
    Hit(Vec<RawInstance>),
    Miss,
    Unreadable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    Forced,
    Missing,
    Unreadable,
}

#[derive(Debug, PartialEq)]
pub enum Plan {
    Serve(Vec<RawInstance>),
    Refresh(RefreshReason),
}

/// Cache-or-fetch decision. A forced reload refetches even over a good
/// snapshot; everything else serves the cache when it is usable.
pub fn plan(force_reload: bool, read: CacheRead) -> Plan {
    if force_reload {
        return Plan::Refresh(RefreshReason::Forced);
    }
    match read {
        CacheRead::Hit(records) => Plan::Serve(records),
        CacheRead::Miss => Plan::Refresh(RefreshReason::Missing),
        CacheRead::Unreadable(_) => Plan::Refresh(RefreshReason::Unreadable),
    }
}

/// Region-keyed snapshot files inside the tool directory.
pub struct InstanceCache {
    dir: PathBuf,
}

impl InstanceCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path_for(&self, region: &str) -> PathBuf {
        self.dir
            .join(format!("{CACHE_FILE_PREFIX}{region}.{CACHE_FILE_EXT}"))
    }

    pub fn read(&self, region: &str) -> CacheRead {
        let path = self.path_for(region);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return CacheRead::Miss,
            Err(e) => return CacheRead::Unreadable(e.to_string()),
        };
        match serde_json::from_str::<Snapshot>(&contents) {
            Ok(snapshot) => CacheRead::Hit(snapshot.ec2_instances),
            Err(e) => CacheRead::Unreadable(e.to_string()),
        }
    }

    /// Replace the region snapshot. The document lands under a temp name
    /// first and is renamed over the target, so a concurrent reader sees
    /// either the old file or the new one, never a torn write.
    pub fn write(&self, region: &str, records: &[RawInstance]) -> io::Result<()> {
        let snapshot = Snapshot {
            ec2_instances: records.to_vec(),
        };
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        atomic_write(&self.path_for(region), &json)
    }
}

fn atomic_write(path: &Path, contents: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = path.with_extension("tmp");
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;

    {
        let mut writer = BufWriter::new(&mut file);
        writer.write_all(contents)?;
        writer.flush()?;
    }

    file.sync_all()?;
    fs::rename(&tmp_path, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hosts::ec2::{running_hosts, Tag};
    use crate::hosts::HostType;
    use tempfile::TempDir;

    fn sample_records() -> Vec<RawInstance> {
        vec![
            RawInstance {
                instance_id: Some("i-1".to_string()),
                state: Some("running".to_string()),
                public_ip_address: Some("54.0.0.1".to_string()),
                private_ip_address: Some("10.0.0.1".to_string()),
                tags: vec![Tag {
                    key: Some("Name".to_string()),
                    value: Some("web".to_string()),
                }],
            },
            RawInstance {
                instance_id: Some("i-2".to_string()),
                state: Some("stopped".to_string()),
                public_ip_address: None,
                private_ip_address: Some("10.0.0.2".to_string()),
                tags: vec![],
            },
        ]
    }

    #[test]
    fn test_cache_file_name_embeds_region() {
        let cache = InstanceCache::new(PathBuf::from("/var/tmp/x"));
        assert_eq!(
            cache.path_for("eu-west-1"),
            PathBuf::from("/var/tmp/x/aws.instances.cache.eu-west-1.json")
        );
    }

    #[test]
    fn test_missing_file_reads_as_miss() {
        let dir = TempDir::new().unwrap();
        let cache = InstanceCache::new(dir.path().to_path_buf());
        assert_eq!(cache.read("us-east-1"), CacheRead::Miss);
    }

    #[test]
    fn test_round_trip_preserves_candidates() {
        let dir = TempDir::new().unwrap();
        let cache = InstanceCache::new(dir.path().to_path_buf());
        let records = sample_records();

        cache.write("us-east-1", &records).unwrap();
        let cached = match cache.read("us-east-1") {
            CacheRead::Hit(cached) => cached,
            other => panic!("expected a cache hit, got {other:?}"),
        };
        assert_eq!(cached, records);
        assert_eq!(
            running_hosts(&cached, HostType::Public),
            running_hosts(&records, HostType::Public)
        );
    }

    #[test]
    fn test_snapshot_document_uses_fixed_top_level_key() {
        let dir = TempDir::new().unwrap();
        let cache = InstanceCache::new(dir.path().to_path_buf());
        cache.write("us-east-1", &sample_records()).unwrap();

        let contents = fs::read_to_string(cache.path_for("us-east-1")).unwrap();
        assert!(contents.contains("\"ec2_instances\""));
    }

    #[test]
    fn test_corrupt_file_reads_as_unreadable() {
        let dir = TempDir::new().unwrap();
        let cache = InstanceCache::new(dir.path().to_path_buf());
        fs::write(cache.path_for("us-east-1"), "{ not json").unwrap();

        assert!(matches!(
            cache.read("us-east-1"),
            CacheRead::Unreadable(_)
        ));
    }

    #[test]
    fn test_write_replaces_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let cache = InstanceCache::new(dir.path().to_path_buf());
        let records = sample_records();

        cache.write("us-east-1", &records).unwrap();
        cache.write("us-east-1", &records[..1]).unwrap();

        assert_eq!(cache.read("us-east-1"), CacheRead::Hit(records[..1].to_vec()));
        let tmp = cache.path_for("us-east-1").with_extension("tmp");
        assert!(!tmp.exists());
    }

    #[test]
    fn test_regions_do_not_share_snapshots() {
        let dir = TempDir::new().unwrap();
        let cache = InstanceCache::new(dir.path().to_path_buf());
        cache.write("us-east-1", &sample_records()).unwrap();

        assert_eq!(cache.read("ap-northeast-1"), CacheRead::Miss);
    }

    #[test]
    fn test_plan_decision_table() {
        let records = sample_records();

        assert_eq!(
            plan(true, CacheRead::Hit(records.clone())),
            Plan::Refresh(RefreshReason::Forced)
        );
        assert_eq!(
            plan(false, CacheRead::Hit(records.clone())),
            Plan::Serve(records)
        );
        assert_eq!(
            plan(false, CacheRead::Miss),
            Plan::Refresh(RefreshReason::Missing)
        );
        assert_eq!(
            plan(false, CacheRead::Unreadable("bad".to_string())),
            Plan::Refresh(RefreshReason::Unreadable)
        );
        assert_eq!(
            plan(true, CacheRead::Miss),
            Plan::Refresh(RefreshReason::Forced)
        );
    }
}
