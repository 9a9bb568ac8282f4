//! Whether a song needs a download, and how each output channel is reported.

use std::fmt;

use crate::config::Actions;

/// Lyrics that already existed when the run started. Frozen per song.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Presence {
    pub file: bool,
    pub tag: bool,
}

/// Same answer before the fetch and when the log line is built, since both
/// inputs are fixed for the run.
pub fn download_required(actions: &Actions, presence: Presence) -> bool {
    if !actions.save_to_file && !actions.save_to_tag {
        return false;
    }
    if actions.overwrite {
        return true;
    }
    let file_required = actions.save_to_file && !presence.file;
    let tag_required = actions.save_to_tag && !presence.tag;
    file_required || tag_required
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Channel disabled in settings.
    Ignored,
    /// Lyrics already there, nothing downloaded.
    Present,
    Saved,
    Failed,
}

impl ChannelStatus {
    pub fn derive(enabled: bool, required: bool, saved: bool) -> Self {
        match (enabled, required, saved) {
            (false, _, _) => ChannelStatus::Ignored,
            (true, false, _) => ChannelStatus::Present,
            (true, true, true) => ChannelStatus::Saved,
            (true, true, false) => ChannelStatus::Failed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChannelStatus::Ignored => "Ignored",
            ChannelStatus::Present => "Present",
            ChannelStatus::Saved => "Saved",
            ChannelStatus::Failed => "Failed",
        }
    }
}

impl fmt::Display for ChannelStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
