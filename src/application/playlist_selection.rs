use crate::domain::VideoDescriptor;

/// Fetched playlist entries plus a parallel checked flag per entry.
///
/// Entries are addressed by their index, which stays valid until the
/// next [`PlaylistSelection::replace`] or [`PlaylistSelection::clear`].
#[derive(Debug, Clone, Default)]
pub struct PlaylistSelection {
    videos: Vec<VideoDescriptor>,
    checked: Vec<bool>,
}

impl PlaylistSelection {
    pub fn replace(&mut self, videos: Vec<VideoDescriptor>) {
        self.checked = vec![false; videos.len()];
        self.videos = videos;
    }

    pub fn clear(&mut self) {
        self.videos.clear();
        self.checked.clear();
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Unknown indices are ignored.
    pub fn set_checked(&mut self, index: usize, checked: bool) {
        if let Some(flag) = self.checked.get_mut(index) {
            *flag = checked;
        }
    }

    pub fn select_all(&mut self) {
        self.checked.iter_mut().for_each(|flag| *flag = true);
    }

    pub fn clear_selection(&mut self) {
        self.checked.iter_mut().for_each(|flag| *flag = false);
    }

    pub fn checked_count(&self) -> usize {
        self.checked.iter().filter(|flag| **flag).count()
    }

    /// URLs of checked entries, in listing order.
    pub fn selected_urls(&self) -> Vec<String> {
        self.iter()
            .filter(|(_, _, checked)| *checked)
            .map(|(_, video, _)| video.url.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &VideoDescriptor, bool)> {
        self.videos
            .iter()
            .zip(self.checked.iter().copied())
            .enumerate()
            .map(|(index, (video, checked))| (index, video, checked))
    }
}
