//! M3U playlist import.
//!
//! A line scanner: an `#EXTINF` line opens a pending entry, the next line that
//! is neither blank nor a comment supplies the stream URL and completes it.

use crate::channels::{ChannelStore, NewChannel};
use crate::errors::{IptvError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

static ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([A-Za-z0-9_-]+)="([^"]*)""#).expect("valid attribute regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M3uEntry {
    pub name: String,
    pub url: String,
    pub logo: Option<String>,
    pub group: Option<String>,
}

impl From<M3uEntry> for NewChannel {
    fn from(entry: M3uEntry) -> Self {
        let channel = NewChannel::new(entry.name, entry.url).with_logo(entry.logo);
        match entry.group {
            Some(group) => channel.with_category(group),
            None => channel,
        }
    }
}

#[derive(Debug, Default)]
struct Pending {
    name: String,
    logo: Option<String>,
    group: Option<String>,
}

fn attribute(info: &str, key: &str) -> Option<String> {
    ATTR_RE
        .captures_iter(info)
        .find(|cap| cap[1].eq_ignore_ascii_case(key))
        .map(|cap| cap[2].trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_extinf(info: &str) -> Pending {
    // Display name follows the last comma outside quoted attribute values
    let mut in_quotes = false;
    let mut split_at = None;
    for (i, ch) in info.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => split_at = Some(i),
            _ => {}
        }
    }
    let name = split_at
        .map(|i| info[i + 1..].trim().to_string())
        .unwrap_or_default();

    Pending {
        name,
        logo: attribute(info, "tvg-logo"),
        group: attribute(info, "group-title"),
    }
}

/// Rest of `line` after `tag`, matching the tag without regard to ASCII case
fn strip_tag<'a>(line: &'a str, tag: &str) -> Option<&'a str> {
    let head = line.get(..tag.len())?;
    head.eq_ignore_ascii_case(tag).then(|| &line[tag.len()..])
}

pub fn parse(content: &str) -> Vec<M3uEntry> {
    let mut entries = Vec::new();
    let mut pending: Option<Pending> = None;

    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(info) = strip_tag(line, "#EXTINF") {
            pending = Some(parse_extinf(info));
        } else if let Some(group) = strip_tag(line, "#EXTGRP:") {
            if let Some(p) = pending.as_mut() {
                if p.group.is_none() && !group.trim().is_empty() {
                    p.group = Some(group.trim().to_string());
                }
            }
        } else if line.starts_with('#') {
            continue;
        } else if let Some(p) = pending.take() {
            let name = if p.name.is_empty() {
                line.to_string()
            } else {
                p.name
            };
            entries.push(M3uEntry {
                name,
                url: line.to_string(),
                logo: p.logo,
                group: p.group,
            });
        }
    }

    if pending.is_some() {
        debug!("dropping trailing #EXTINF without stream url");
    }
    entries
}

/// Parse `content` and append every entry to `store`. Returns the number of
/// channels added.
pub fn import_into(store: &mut ChannelStore, content: &str) -> usize {
    let entries = parse(content);
    let added = store.add_many(entries.into_iter().map(NewChannel::from));
    info!(added, "imported m3u playlist");
    added
}

pub fn read_local_playlist(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)
        .map_err(|e| IptvError::Storage(format!("{}: {}", path.display(), e)))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Heuristic used by the CLI to tell a URL from a local path
pub fn is_remote_source(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic_entry() {
        let content = r#"#EXTM3U
#EXTINF:-1 tvg-id="cnn" tvg-logo="http://logo/cnn.png" group-title="News",CNN International
http://example.com/live/1.ts
"#;
        let entries = parse(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "CNN International");
        assert_eq!(entries[0].logo.as_deref(), Some("http://logo/cnn.png"));
        assert_eq!(entries[0].group.as_deref(), Some("News"));
        assert_eq!(entries[0].url, "http://example.com/live/1.ts");
    }

    #[test]
    fn test_tags_match_any_case() {
        let content = "#extm3u\n#extinf:-1 group-title=\"News\",Lower\nhttp://a/1.ts\n\
                       #ExtInf:-1,Mixed\n#extgrp:Movies\nhttp://a/2.ts";
        let entries = parse(content);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "Lower");
        assert_eq!(entries[1].group.as_deref(), Some("Movies"));
    }

    #[test]
    fn test_read_local_playlist_is_lossy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.m3u");
        std::fs::write(&path, b"#EXTINF:-1,Caf\xe9\r\nhttp://a/1.ts\r\n").unwrap();

        let content = read_local_playlist(&path).unwrap();
        let entries = parse(&content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Caf\u{fffd}");

        let missing = read_local_playlist(&dir.path().join("missing.m3u"));
        assert!(matches!(missing, Err(IptvError::Storage(_))));
    }

    #[test]
    fn test_comma_inside_group_title() {
        let entries = parse("#EXTINF:-1 group-title=\"News, Local\",Channel 5\nhttp://a/5.ts");
        assert_eq!(entries[0].name, "Channel 5");
        assert_eq!(entries[0].group.as_deref(), Some("News, Local"));
    }

    #[test]
    fn test_trailing_metadata_is_dropped() {
        let content = "#EXTINF:-1,One\nhttp://a/1\n#EXTINF:-1,Two\n";
        assert_eq!(parse(content).len(), 1);
    }

    #[test]
    fn test_second_extinf_replaces_pending() {
        let content = "#EXTINF:-1,Lost\n#EXTINF:-1,Kept\nhttp://a/kept";
        let entries = parse(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "Kept");
    }

    #[test]
    fn test_comment_lines_between_metadata_and_url() {
        let content = "#EXTINF:-1,Opt\n#EXTVLCOPT:http-user-agent=VLC\n\n#EXTGRP:Movies\nhttp://a/opt.m3u8";
        let entries = parse(content);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].group.as_deref(), Some("Movies"));
    }

    #[test]
    fn test_crlf_and_bom() {
        let content = "\u{feff}#EXTM3U\r\n#EXTINF:-1,Win\r\nhttp://a/win\r\n";
        let entries = parse(content);
        assert_eq!(entries[0].name, "Win");
        assert_eq!(entries[0].url, "http://a/win");
    }

    #[test]
    fn test_missing_name_falls_back_to_url() {
        let entries = parse("#EXTINF:-1\nhttp://a/noname");
        assert_eq!(entries[0].name, "http://a/noname");
    }

    #[test]
    fn test_url_without_metadata_is_ignored() {
        assert!(parse("http://a/orphan\n").is_empty());
    }

    #[test]
    fn test_is_remote_source() {
        assert!(is_remote_source("HTTPS://host/list.m3u"));
        assert!(!is_remote_source("/home/me/list.m3u"));
    }
}
