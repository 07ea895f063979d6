//! Remote-control navigation for the in-player channel overlay.
//!
//! The overlay is a channel list with an optional category sidebar to its
//! left. All indices are bounded: moving past either end is a no-op.

use crate::channels::{
    adjacent_index, derive_categories, filter_by_category, Channel, ALL_CATEGORY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Left,
    Right,
    Select,
    Back,
    ChannelUp,
    ChannelDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    Hidden,
    List,
    ListWithSidebar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Ignored,
    Redraw,
    /// Play the channel at this index of the full channel list
    Play(usize),
    /// Leave the player
    Exit,
}

#[derive(Debug, Clone)]
pub struct OverlayNav {
    pub list_visible: bool,
    pub sidebar_visible: bool,
    pub selected_category: String,
    pub selected_list_index: usize,
    pub selected_sidebar_index: usize,
    /// Index into the full list of the channel currently playing
    pub playing_index: usize,
}

impl OverlayNav {
    pub fn new(playing_index: usize) -> Self {
        Self {
            list_visible: false,
            sidebar_visible: false,
            selected_category: ALL_CATEGORY.to_string(),
            selected_list_index: 0,
            selected_sidebar_index: 0,
            playing_index,
        }
    }

    pub fn state(&self) -> OverlayState {
        match (self.list_visible, self.sidebar_visible) {
            (false, _) => OverlayState::Hidden,
            (true, false) => OverlayState::List,
            (true, true) => OverlayState::ListWithSidebar,
        }
    }

    /// Channels shown in the list for the committed category
    pub fn visible_channels(&self, channels: &[Channel]) -> Vec<Channel> {
        filter_by_category(channels, &self.selected_category)
    }

    pub fn highlighted_channel(&self, channels: &[Channel]) -> Option<Channel> {
        self.visible_channels(channels)
            .into_iter()
            .nth(self.selected_list_index)
    }

    fn hide(&mut self) {
        self.list_visible = false;
        self.sidebar_visible = false;
    }

    fn open_list(&mut self, channels: &[Channel]) {
        let categories = derive_categories(channels);
        if !categories.contains(&self.selected_category) {
            self.selected_category = ALL_CATEGORY.to_string();
        }
        let playing_id = channels.get(self.playing_index).map(|c| c.id);
        self.selected_list_index = self
            .visible_channels(channels)
            .iter()
            .position(|c| Some(c.id) == playing_id)
            .unwrap_or(0);
        self.list_visible = true;
        self.sidebar_visible = false;
    }

    fn open_sidebar(&mut self, channels: &[Channel]) {
        let categories = derive_categories(channels);
        self.selected_sidebar_index = categories
            .iter()
            .position(|c| c == &self.selected_category)
            .unwrap_or(0);
        self.sidebar_visible = true;
    }

    pub fn handle(&mut self, key: NavKey, channels: &[Channel]) -> NavOutcome {
        match self.state() {
            OverlayState::Hidden => self.handle_hidden(key, channels),
            OverlayState::List => self.handle_list(key, channels),
            OverlayState::ListWithSidebar => self.handle_sidebar(key, channels),
        }
    }

    fn handle_hidden(&mut self, key: NavKey, channels: &[Channel]) -> NavOutcome {
        match key {
            NavKey::Select => {
                self.open_list(channels);
                NavOutcome::Redraw
            }
            NavKey::ChannelUp | NavKey::ChannelDown => {
                let delta = if key == NavKey::ChannelUp { -1 } else { 1 };
                match adjacent_index(channels.len(), self.playing_index, delta) {
                    Some(next) if next != self.playing_index => {
                        self.playing_index = next;
                        NavOutcome::Play(next)
                    }
                    _ => NavOutcome::Ignored,
                }
            }
            NavKey::Back => NavOutcome::Exit,
            _ => NavOutcome::Ignored,
        }
    }

    fn handle_list(&mut self, key: NavKey, channels: &[Channel]) -> NavOutcome {
        let visible = self.visible_channels(channels);
        match key {
            NavKey::Up => step(&mut self.selected_list_index, visible.len(), -1),
            NavKey::Down => step(&mut self.selected_list_index, visible.len(), 1),
            NavKey::Left => {
                self.open_sidebar(channels);
                NavOutcome::Redraw
            }
            NavKey::Right | NavKey::Back => {
                self.hide();
                NavOutcome::Redraw
            }
            NavKey::Select => {
                let Some(chosen) = visible.get(self.selected_list_index) else {
                    return NavOutcome::Ignored;
                };
                match channels.iter().position(|c| c.id == chosen.id) {
                    Some(index) => {
                        self.playing_index = index;
                        self.hide();
                        NavOutcome::Play(index)
                    }
                    None => NavOutcome::Ignored,
                }
            }
            NavKey::ChannelUp | NavKey::ChannelDown => NavOutcome::Ignored,
        }
    }

    fn handle_sidebar(&mut self, key: NavKey, channels: &[Channel]) -> NavOutcome {
        let categories = derive_categories(channels);
        match key {
            NavKey::Up => step(&mut self.selected_sidebar_index, categories.len(), -1),
            NavKey::Down => step(&mut self.selected_sidebar_index, categories.len(), 1),
            NavKey::Select => {
                if let Some(category) = categories.get(self.selected_sidebar_index) {
                    self.selected_category = category.clone();
                    self.selected_list_index = 0;
                }
                self.sidebar_visible = false;
                NavOutcome::Redraw
            }
            NavKey::Right | NavKey::Back => {
                self.sidebar_visible = false;
                NavOutcome::Redraw
            }
            NavKey::Left => {
                self.hide();
                NavOutcome::Redraw
            }
            NavKey::ChannelUp | NavKey::ChannelDown => NavOutcome::Ignored,
        }
    }
}

/// Move `index` by `delta` inside `[0, len-1]`
fn step(index: &mut usize, len: usize, delta: isize) -> NavOutcome {
    match adjacent_index(len, *index, delta) {
        Some(next) if next != *index => {
            *index = next;
            NavOutcome::Redraw
        }
        _ => NavOutcome::Ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(id: u32, category: &str) -> Channel {
        Channel {
            id,
            name: format!("Channel {}", id),
            url: format!("http://s/{}.ts", id),
            logo: None,
            category: category.to_string(),
        }
    }

    fn lineup() -> Vec<Channel> {
        vec![ch(1, "News"), ch(2, "Sports"), ch(3, "News"), ch(4, "Kids")]
    }

    #[test]
    fn test_select_opens_list_on_playing_channel() {
        let channels = lineup();
        let mut nav = OverlayNav::new(2);
        assert_eq!(nav.handle(NavKey::Select, &channels), NavOutcome::Redraw);
        assert_eq!(nav.state(), OverlayState::List);
        assert_eq!(nav.selected_list_index, 2);
    }

    #[test]
    fn test_left_then_left_closes_overlay() {
        let channels = lineup();
        let mut nav = OverlayNav::new(0);
        nav.handle(NavKey::Select, &channels);
        nav.handle(NavKey::Left, &channels);
        assert_eq!(nav.state(), OverlayState::ListWithSidebar);
        nav.handle(NavKey::Left, &channels);
        assert_eq!(nav.state(), OverlayState::Hidden);
    }

    #[test]
    fn test_right_closes_sidebar_then_overlay() {
        let channels = lineup();
        let mut nav = OverlayNav::new(0);
        nav.handle(NavKey::Select, &channels);
        nav.handle(NavKey::Left, &channels);
        nav.handle(NavKey::Right, &channels);
        assert_eq!(nav.state(), OverlayState::List);
        nav.handle(NavKey::Right, &channels);
        assert_eq!(nav.state(), OverlayState::Hidden);
    }

    #[test]
    fn test_sidebar_select_filters_and_resets_index() {
        let channels = lineup();
        let mut nav = OverlayNav::new(0);
        nav.handle(NavKey::Select, &channels);
        nav.handle(NavKey::Down, &channels);
        nav.handle(NavKey::Down, &channels);
        assert_eq!(nav.selected_list_index, 2);

        nav.handle(NavKey::Left, &channels);
        // All, News, Sports, Kids
        nav.handle(NavKey::Down, &channels);
        assert_eq!(nav.handle(NavKey::Select, &channels), NavOutcome::Redraw);
        assert_eq!(nav.selected_category, "News");
        assert_eq!(nav.selected_list_index, 0);
        assert_eq!(nav.state(), OverlayState::List);
        assert_eq!(nav.visible_channels(&channels).len(), 2);
    }

    #[test]
    fn test_select_in_filtered_list_plays_full_index() {
        let channels = lineup();
        let mut nav = OverlayNav::new(0);
        nav.selected_category = "News".into();
        nav.handle(NavKey::Select, &channels);
        nav.handle(NavKey::Down, &channels);
        assert_eq!(nav.handle(NavKey::Select, &channels), NavOutcome::Play(2));
        assert_eq!(nav.state(), OverlayState::Hidden);
        assert_eq!(nav.playing_index, 2);
    }

    #[test]
    fn test_channel_keys_clamp_at_ends() {
        let channels = lineup();
        let mut nav = OverlayNav::new(0);
        assert_eq!(nav.handle(NavKey::ChannelUp, &channels), NavOutcome::Ignored);
        assert_eq!(nav.handle(NavKey::ChannelDown, &channels), NavOutcome::Play(1));
        nav.playing_index = 3;
        assert_eq!(nav.handle(NavKey::ChannelDown, &channels), NavOutcome::Ignored);
    }

    #[test]
    fn test_back_from_hidden_exits() {
        let mut nav = OverlayNav::new(0);
        assert_eq!(nav.handle(NavKey::Back, &lineup()), NavOutcome::Exit);
    }

    #[test]
    fn test_empty_list_is_inert() {
        let mut nav = OverlayNav::new(0);
        nav.handle(NavKey::Select, &[]);
        assert_eq!(nav.handle(NavKey::Down, &[]), NavOutcome::Ignored);
        assert_eq!(nav.handle(NavKey::Select, &[]), NavOutcome::Ignored);
        assert_eq!(nav.selected_list_index, 0);
    }
}
