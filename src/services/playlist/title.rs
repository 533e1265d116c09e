//! The listing service reports deleted and private videos by replacing their
//! title with a marker string. All comparisons against those markers live here.

pub const DELETED_VIDEO_TITLE: &str = "[Deleted video]";
pub const PRIVATE_VIDEO_TITLE: &str = "[Private video]";

/// What a remote title says about the video behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStatus<'a> {
    Deleted,
    Private,
    Titled(&'a str),
}

impl<'a> TitleStatus<'a> {
    pub fn classify(title: &'a str) -> Self {
        match title {
            DELETED_VIDEO_TITLE => TitleStatus::Deleted,
            PRIVATE_VIDEO_TITLE => TitleStatus::Private,
            title => TitleStatus::Titled(title),
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, TitleStatus::Deleted)
    }

    pub fn is_private(&self) -> bool {
        matches!(self, TitleStatus::Private)
    }
}
