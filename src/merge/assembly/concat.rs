//! Binary concatenation

use super::open_member;
use crate::config::Delimiters;
use crate::content::ContentStore;
use crate::error::MergeError;
use crate::flow::FlowUnit;
use std::io::{self, Write};

/// Header, members separated by the demarcator, footer.
pub(super) fn write<W: Write>(
    store: &dyn ContentStore,
    units: &[FlowUnit],
    delimiters: &Delimiters,
    sink: &mut W,
) -> Result<(), MergeError> {
    if let Some(header) = &delimiters.header {
        sink.write_all(header)?;
    }
    for (position, unit) in units.iter().enumerate() {
        if position > 0 {
            if let Some(demarcator) = &delimiters.demarcator {
                sink.write_all(demarcator)?;
            }
        }
        io::copy(&mut open_member(store, unit)?, sink)?;
    }
    if let Some(footer) = &delimiters.footer {
        sink.write_all(footer)?;
    }
    sink.flush()?;
    Ok(())
}
