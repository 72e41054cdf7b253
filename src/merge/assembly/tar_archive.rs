//! Tar packaging

use super::{entry_name, open_member};
use crate::content::ContentStore;
use crate::error::MergeError;
use crate::flow::FlowUnit;
use std::io::Write;
use tar::{Builder, EntryType, Header};

/// One regular-file entry per member, then the end-of-archive blocks.
pub(super) fn write<W: Write>(
    store: &dyn ContentStore,
    units: &[FlowUnit],
    keep_path: bool,
    sink: &mut W,
) -> Result<(), MergeError> {
    let mtime = chrono::Utc::now().timestamp().max(0) as u64;
    let mut builder = Builder::new(sink);
    for unit in units {
        let mut header = Header::new_gnu();
        header.set_entry_type(EntryType::Regular);
        header.set_size(unit.size());
        header.set_mode(0o755);
        header.set_mtime(mtime);
        builder.append_data(&mut header, entry_name(unit, keep_path), open_member(store, unit)?)?;
    }
    builder.into_inner()?.flush()?;
    Ok(())
}
