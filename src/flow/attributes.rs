//! Well-known attribute names

/// Name of the unit's content, used for archive entry names and result naming.
pub const FILENAME: &str = "filename";

/// Relative directory of the unit's content.
pub const PATH: &str = "path";

pub const MIME_TYPE: &str = "mime.type";

/// Identifier shared by every fragment of one original unit.
pub const FRAGMENT_ID: &str = "fragment.identifier";

/// Zero-based position of a fragment.
pub const FRAGMENT_INDEX: &str = "fragment.index";

/// Total number of fragments. Also written on every merge result as the member count.
pub const FRAGMENT_COUNT: &str = "fragment.count";

/// Filename of the unit that was split into fragments.
pub const SEGMENT_ORIGINAL_FILENAME: &str = "segment.original.filename";
