use crate::errors::{IptvError, Result};
use crate::prefs::Preferences;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const KEY_CUSTOM_CHANNELS: &str = "custom_channels";
pub const KEY_NEXT_CHANNEL_ID: &str = "next_channel_id";

pub const DEFAULT_CATEGORY: &str = "Uncategorized";
/// Synthetic first sidebar entry that matches every channel
pub const ALL_CATEGORY: &str = "All";

const RECORD_SEPARATOR: char = '|';
const FIELD_SEPARATOR: char = ',';

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub logo: Option<String>,
    pub category: String,
}

/// A channel that has not been given an id yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannel {
    pub name: String,
    pub url: String,
    pub logo: Option<String>,
    pub category: String,
}

impl NewChannel {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            logo: None,
            category: DEFAULT_CATEGORY.to_string(),
        }
    }

    pub fn with_logo(mut self, logo: Option<String>) -> Self {
        self.logo = logo.filter(|l| !l.trim().is_empty());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        let category = category.into();
        self.category = if category.trim().is_empty() {
            DEFAULT_CATEGORY.to_string()
        } else {
            category.trim().to_string()
        };
        self
    }
}

/// Built-in demo channels. Their ids are fixed and never persisted.
pub fn sample_channels() -> Vec<Channel> {
    let demo = |id: u32, name: &str, url: &str, category: &str| Channel {
        id,
        name: name.to_string(),
        url: url.to_string(),
        logo: None,
        category: category.to_string(),
    };
    vec![
        demo(
            1,
            "Big Buck Bunny",
            "https://test-streams.mux.dev/x36xhzz/x36xhzz.m3u8",
            "Demo",
        ),
        demo(
            2,
            "Apple BipBop",
            "https://devstreaming-cdn.apple.com/videos/streaming/examples/img_bipbop_adv_example_fmp4/master.m3u8",
            "Demo",
        ),
        demo(
            3,
            "Tears of Steel",
            "https://demo.unified-streaming.com/k8s/features/stable/video/tears-of-steel/tears-of-steel.ism/.m3u8",
            "Demo",
        ),
        demo(
            4,
            "Akamai Live Test",
            "https://cph-p2p-msl.akamaized.net/hls/live/2000341/test/master.m3u8",
            "Live Test",
        ),
    ]
}

/// Sample + custom channel lists with sequential id assignment.
///
/// The store itself is purely in-memory; callers persist it with
/// [`ChannelStore::save`] after mutating.
#[derive(Debug, Clone)]
pub struct ChannelStore {
    sample: Vec<Channel>,
    custom: Vec<Channel>,
    next_id: u32,
}

impl Default for ChannelStore {
    fn default() -> Self {
        Self::with_sample(sample_channels())
    }
}

impl ChannelStore {
    pub fn with_sample(sample: Vec<Channel>) -> Self {
        let mut store = Self {
            sample,
            custom: Vec::new(),
            next_id: 1,
        };
        store.repair_counter();
        store
    }

    /// Restore the custom list and id counter from preferences
    pub fn load(prefs: &dyn Preferences) -> Self {
        let mut store = Self::default();
        if let Some(encoded) = prefs.get_string(KEY_CUSTOM_CHANNELS) {
            store.custom = decode_channels(&encoded);
        }
        if let Some(next) = prefs.get_i64(KEY_NEXT_CHANNEL_ID) {
            store.next_id = u32::try_from(next).unwrap_or(1);
        }
        // Drop custom records that collide with an earlier id or leave no
        // room for the counter
        let mut seen: Vec<u32> = store.sample.iter().map(|c| c.id).collect();
        store.custom.retain(|c| {
            if c.id == u32::MAX {
                warn!(id = c.id, "dropping persisted channel with out of range id");
                false
            } else if seen.contains(&c.id) {
                warn!(id = c.id, "dropping persisted channel with duplicate id");
                false
            } else {
                seen.push(c.id);
                true
            }
        });
        store.repair_counter();
        debug!(custom = store.custom.len(), next_id = store.next_id, "loaded channel store");
        store
    }

    pub fn save(&self, prefs: &mut dyn Preferences) -> Result<()> {
        prefs.put_string(KEY_CUSTOM_CHANNELS, encode_channels(&self.custom));
        prefs.put_i64(KEY_NEXT_CHANNEL_ID, i64::from(self.next_id));
        prefs.flush()
    }

    /// Keep the counter above every id in use, even if the counter key was lost
    fn repair_counter(&mut self) {
        let max_id = self
            .sample
            .iter()
            .chain(self.custom.iter())
            .map(|c| c.id)
            .max()
            .unwrap_or(0);
        if self.next_id <= max_id {
            self.next_id = max_id.saturating_add(1);
        }
    }

    /// `None` once the id space is exhausted
    fn assign(&mut self, entry: NewChannel) -> Option<Channel> {
        let next = self.next_id.checked_add(1)?;
        let channel = Channel {
            id: self.next_id,
            name: entry.name.trim().to_string(),
            url: entry.url.trim().to_string(),
            logo: entry.logo,
            category: entry.category,
        };
        self.next_id = next;
        Some(channel)
    }

    pub fn add_channel(&mut self, entry: NewChannel) -> Result<Channel> {
        if entry.name.trim().is_empty() {
            return Err(IptvError::InvalidInput("channel name is empty".into()));
        }
        if entry.url.trim().is_empty() {
            return Err(IptvError::InvalidInput("stream url is empty".into()));
        }
        let channel = self
            .assign(entry)
            .ok_or_else(|| IptvError::Storage("channel id counter exhausted".into()))?;
        info!(id = channel.id, name = %channel.name, "added channel");
        self.custom.push(channel.clone());
        Ok(channel)
    }

    /// Bulk add, skipping invalid entries. Returns how many were added.
    pub fn add_many(&mut self, entries: impl IntoIterator<Item = NewChannel>) -> usize {
        let mut added = 0;
        for entry in entries {
            if entry.name.trim().is_empty() || entry.url.trim().is_empty() {
                continue;
            }
            let Some(channel) = self.assign(entry) else {
                warn!(added, "channel id counter exhausted, stopping import");
                break;
            };
            self.custom.push(channel);
            added += 1;
        }
        added
    }

    pub fn remove_channel(&mut self, id: u32) -> Result<Channel> {
        if self.sample.iter().any(|c| c.id == id) {
            return Err(IptvError::InvalidInput(
                "built-in channels cannot be removed".into(),
            ));
        }
        let pos = self
            .custom
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| IptvError::InvalidInput(format!("no channel with id {}", id)))?;
        Ok(self.custom.remove(pos))
    }

    /// Remove every custom channel. The id counter keeps counting so ids are
    /// never reused.
    pub fn clear_custom(&mut self) -> usize {
        let removed = self.custom.len();
        self.custom.clear();
        removed
    }

    pub fn all_channels(&self) -> Vec<Channel> {
        self.sample.iter().chain(self.custom.iter()).cloned().collect()
    }

    pub fn custom_channels(&self) -> &[Channel] {
        &self.custom
    }

    pub fn len(&self) -> usize {
        self.sample.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: u32) -> Option<&Channel> {
        self.sample.iter().chain(self.custom.iter()).find(|c| c.id == id)
    }

    /// Position of `id` in [`ChannelStore::all_channels`]
    pub fn index_of(&self, id: u32) -> Option<usize> {
        self.sample.iter().chain(self.custom.iter()).position(|c| c.id == id)
    }

    /// Channel `delta` steps from `index` in the full list, clamped at the ends
    pub fn adjacent(&self, index: usize, delta: isize) -> Option<&Channel> {
        let target = adjacent_index(self.len(), index, delta)?;
        self.sample.iter().chain(self.custom.iter()).nth(target)
    }

    pub fn categories(&self) -> Vec<String> {
        derive_categories(&self.all_channels())
    }

    pub fn channels_in(&self, category: &str) -> Vec<Channel> {
        filter_by_category(&self.all_channels(), category)
    }

    pub fn next_id(&self) -> u32 {
        self.next_id
    }
}

/// `All` followed by distinct categories in first-appearance order
pub fn derive_categories(channels: &[Channel]) -> Vec<String> {
    let mut categories = vec![ALL_CATEGORY.to_string()];
    for channel in channels {
        if !categories.iter().any(|c| c == &channel.category) {
            categories.push(channel.category.clone());
        }
    }
    categories
}

pub fn filter_by_category(channels: &[Channel], category: &str) -> Vec<Channel> {
    if category == ALL_CATEGORY {
        return channels.to_vec();
    }
    channels
        .iter()
        .filter(|c| c.category == category)
        .cloned()
        .collect()
}

/// Index of the channel `delta` steps away from `index`, clamped to the list
pub fn adjacent_index(len: usize, index: usize, delta: isize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let target = (index as isize).saturating_add(delta);
    Some(target.clamp(0, len as isize - 1) as usize)
}

fn escape_field(field: &str) -> String {
    field
        .replace('%', "%25")
        .replace(FIELD_SEPARATOR, "%2C")
        .replace(RECORD_SEPARATOR, "%7C")
}

fn unescape_field(field: &str) -> String {
    field
        .replace("%2C", ",")
        .replace("%7C", "|")
        .replace("%25", "%")
}

pub fn encode_channels(channels: &[Channel]) -> String {
    channels
        .iter()
        .map(|c| {
            [
                c.id.to_string(),
                escape_field(&c.name),
                escape_field(&c.url),
                escape_field(c.logo.as_deref().unwrap_or("")),
                escape_field(&c.category),
            ]
            .join(",")
        })
        .collect::<Vec<_>>()
        .join("|")
}

pub fn decode_channels(encoded: &str) -> Vec<Channel> {
    encoded
        .split(RECORD_SEPARATOR)
        .filter(|r| !r.trim().is_empty())
        .filter_map(|record| {
            let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
            if fields.len() != 5 {
                warn!(record, "skipping malformed channel record");
                return None;
            }
            let id = fields[0].trim().parse::<u32>().ok()?;
            let logo = unescape_field(fields[3]);
            Some(Channel {
                id,
                name: unescape_field(fields[1]),
                url: unescape_field(fields[2]),
                logo: if logo.is_empty() { None } else { Some(logo) },
                category: unescape_field(fields[4]),
            })
        })
        .collect()
}
