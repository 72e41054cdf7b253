//! Zip packaging

use super::{entry_name, open_member};
use crate::content::ContentStore;
use crate::error::MergeError;
use crate::flow::FlowUnit;
use std::io::{self, Seek, Write};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// One deflated entry per member, then the central directory.
pub(super) fn write<W: Write + Seek>(
    store: &dyn ContentStore,
    units: &[FlowUnit],
    keep_path: bool,
    sink: &mut W,
) -> Result<(), MergeError> {
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o755);
    let mut zip = ZipWriter::new(sink);
    for unit in units {
        zip.start_file(entry_name(unit, keep_path), options)?;
        io::copy(&mut open_member(store, unit)?, &mut zip)?;
    }
    zip.finish()?.flush()?;
    Ok(())
}
