use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use regex::Regex;

use super::column;
use crate::error::{Error, Result};
use crate::picker::Choosable;

/// One usable Host block: the alias ssh resolves and the hostname shown
/// next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasEntry {
    pub alias: String,
    pub host_name: String,
}

impl Choosable for AliasEntry {
    fn label(&self) -> String {
        format!("{}{}", column(&self.alias), self.host_name)
    }

    fn value(&self) -> String {
        self.alias.clone()
    }
}

pub fn default_path() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or(Error::NoHomeDir)?;
    Ok(home.join(".ssh").join("config"))
}

pub fn load_aliases(path: &Path) -> Result<Vec<AliasEntry>> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(Error::SshConfigNotFound(path.to_path_buf()))
        }
        Err(e) => return Err(e.into()),
    };
    Ok(parse_aliases(&contents))
}

enum ParserState {
    SeekingHost,
    SeekingHostName { alias: String },
}

/// Single forward pass with two states: looking for a `Host` declaration,
/// then for the `HostName` that completes it. Wildcard values are skipped
/// in place and malformed lines are stepped over, never a hard failure.
pub fn parse_aliases(contents: &str) -> Vec<AliasEntry> {
    let host_re = Regex::new(r"Host\s+([^ #]+)").expect("valid pattern");
    let host_name_re = Regex::new(r"HostName\s+([^ #]+)").expect("valid pattern");

    let mut entries = Vec::new();
    let mut state = ParserState::SeekingHost;

    for line in contents.lines() {
        state = match state {
            ParserState::SeekingHost => match non_wildcard_capture(&host_re, line) {
                Some(alias) => ParserState::SeekingHostName { alias },
                None => ParserState::SeekingHost,
            },
            ParserState::SeekingHostName { alias } => {
                match non_wildcard_capture(&host_name_re, line) {
                    Some(host_name) => {
                        entries.push(AliasEntry { alias, host_name });
                        ParserState::SeekingHost
                    }
                    None => ParserState::SeekingHostName { alias },
                }
            }
        };
    }

    entries
}

fn non_wildcard_capture(re: &Regex, line: &str) -> Option<String> {
    let caps = re.captures(line)?;
    let value = &caps[1];
    if value.contains('*') {
        return None;
    }
    Some(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_host_blocks() {
        let content = r#"
Host web01
    HostName 192.168.1.1
    User deploy

Host db01
    HostName db.internal.example.com
    Port 2222
"#;
        let entries = parse_aliases(content);
        assert_eq!(
            entries,
            vec![
                AliasEntry {
                    alias: "web01".to_string(),
                    host_name: "192.168.1.1".to_string(),
                },
                AliasEntry {
                    alias: "db01".to_string(),
                    host_name: "db.internal.example.com".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_wildcard_host_is_skipped() {
        let content = r#"
Host *
    ServerAliveInterval 60

Host web01
    HostName 192.168.1.1
"#;
        let entries = parse_aliases(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].alias, "web01");
    }

    #[test]
    fn test_wildcard_hostname_keeps_waiting_for_a_real_one() {
        let content = r#"
Host web01
    HostName *.example.com
    HostName 192.168.1.1
"#;
        let entries = parse_aliases(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host_name, "192.168.1.1");
    }

    #[test]
    fn test_host_without_hostname_swallows_the_next_block_header() {
        // A second Host line is not a HostName, so the pass steps over it
        // and the first alias pairs with the later HostName.
        let content = r#"
Host web01
Host db01
    HostName 10.0.0.5
"#;
        let entries = parse_aliases(content);
        assert_eq!(
            entries,
            vec![AliasEntry {
                alias: "web01".to_string(),
                host_name: "10.0.0.5".to_string(),
            }]
        );
    }

    #[test]
    fn test_hostname_before_any_host_is_ignored() {
        let content = r#"
HostName 192.168.1.9
Host web01
    HostName 192.168.1.1
"#;
        let entries = parse_aliases(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host_name, "192.168.1.1");
    }

    #[test]
    fn test_declaration_matches_anywhere_in_the_line() {
        // The patterns are unanchored, so indentation and even comment
        // markers before the keyword do not stop a match.
        let content = "  # Host commented\n    HostName 10.9.9.9\n";
        let entries = parse_aliases(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].alias, "commented");
        assert_eq!(entries[0].host_name, "10.9.9.9");
    }

    #[test]
    fn test_capture_stops_at_space_or_hash() {
        let content = "Host web01#prod extra\n  HostName 192.168.1.1 # primary\n";
        let entries = parse_aliases(content);
        assert_eq!(entries[0].alias, "web01");
        assert_eq!(entries[0].host_name, "192.168.1.1");
    }

    #[test]
    fn test_interleaved_noise_is_stepped_over() {
        let content = r#"
Host web01
    User deploy
    IdentityFile ~/.ssh/id_rsa
    HostName 192.168.1.1
"#;
        let entries = parse_aliases(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].host_name, "192.168.1.1");
    }

    #[test]
    fn test_empty_input_yields_no_entries() {
        assert!(parse_aliases("").is_empty());
    }

    #[test]
    fn test_label_pads_alias_column() {
        let entry = AliasEntry {
            alias: "web".to_string(),
            host_name: "192.168.1.1".to_string(),
        };
        assert_eq!(entry.label(), format!("{:<14}{}", "web", "192.168.1.1"));
        assert_eq!(entry.value(), "web");
    }
}
