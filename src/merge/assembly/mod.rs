//! Content assembly
//!
//! Packages a bin's ordered members into one payload: binary concatenation with optional
//! header, footer and demarcator, or a tar or zip archive with one entry per member.

mod concat;
mod tar_archive;
mod zip_archive;

use crate::config::{Delimiters, MergeConfig, MergeFormat};
use crate::content::ContentStore;
use crate::error::MergeError;
use crate::flow::attributes;
use crate::flow::{Attributes, FlowUnit};
use std::io::{self, Cursor, Read, Seek, Write};

/// Builds merged content and its derived metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentMerger {
    format: MergeFormat,
    delimiters: Delimiters,
    keep_path: bool,
}

impl ContentMerger {
    pub fn new(format: MergeFormat, delimiters: Delimiters, keep_path: bool) -> Self {
        Self {
            format,
            delimiters,
            keep_path,
        }
    }

    pub fn from_config(config: &MergeConfig) -> Self {
        Self::new(config.merge_format, config.delimiters.clone(), config.keep_path)
    }

    pub fn format(&self) -> MergeFormat {
        self.format
    }

    /// Write the packaged content of `units`, in order, to `sink`.
    pub fn assemble<W: Write + Seek>(
        &self,
        store: &dyn ContentStore,
        units: &[FlowUnit],
        sink: &mut W,
    ) -> Result<(), MergeError> {
        match self.format {
            MergeFormat::Concatenation => concat::write(store, units, &self.delimiters, sink),
            MergeFormat::Tar => tar_archive::write(store, units, self.keep_path, sink),
            MergeFormat::Zip => zip_archive::write(store, units, self.keep_path, sink),
        }
    }

    /// Filename for the merge result.
    ///
    /// A single member lends its own filename; otherwise the first member's
    /// `segment.original.filename` is used. Archive formats fall back to the merged
    /// attributes' filename and append their extension.
    pub fn derive_filename(&self, units: &[FlowUnit], merged: &Attributes) -> Option<String> {
        let derived = match units {
            [single] => single.filename(),
            [first, ..] => first.attribute(attributes::SEGMENT_ORIGINAL_FILENAME),
            [] => None,
        }
        .filter(|name| !name.is_empty())
        .map(str::to_string);

        match self.format.filename_suffix() {
            None => derived,
            Some(suffix) => derived
                .or_else(|| merged.get(attributes::FILENAME).cloned())
                .filter(|name| !name.is_empty())
                .map(|name| format!("{}{}", name, suffix)),
        }
    }

    /// Assemble `units` into a new payload in `store` and return the merge result carrying
    /// `attributes` plus `mime.type`, `filename` and `fragment.count`.
    ///
    /// Nothing is written to the store unless assembly succeeds.
    pub fn merge(
        &self,
        store: &dyn ContentStore,
        units: &[FlowUnit],
        attributes: Attributes,
    ) -> Result<FlowUnit, MergeError> {
        let mut sink = Cursor::new(Vec::new());
        self.assemble(store, units, &mut sink)?;
        let content = sink.into_inner();
        let size = content.len() as u64;

        let filename = self.derive_filename(units, &attributes);
        let claim = store.write(content)?;
        let mut result = FlowUnit::new(Some(claim), size);
        result.set_attributes(attributes);
        result.set_attribute(attributes::MIME_TYPE, self.format.mime_type());
        if let Some(filename) = filename {
            result.set_attribute(attributes::FILENAME, filename);
        }
        result.set_attribute(attributes::FRAGMENT_COUNT, units.len().to_string());
        Ok(result)
    }
}

/// Reader over a member's payload that fails unless the store yields exactly the unit's
/// declared size.
struct MemberReader {
    inner: Box<dyn Read + Send>,
    remaining: u64,
}

impl Read for MemberReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        if self.remaining == 0 {
            let mut extra = [0u8; 1];
            return match self.inner.read(&mut extra)? {
                0 => Ok(0),
                _ => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "payload is longer than the declared size",
                )),
            };
        }
        let limit = usize::try_from(self.remaining).map_or(buf.len(), |r| r.min(buf.len()));
        let n = self.inner.read(&mut buf[..limit])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("payload ended {} bytes short", self.remaining),
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

fn open_member(store: &dyn ContentStore, unit: &FlowUnit) -> Result<MemberReader, MergeError> {
    let inner: Box<dyn Read + Send> = match unit.claim() {
        Some(claim) => store.read(claim)?,
        None => Box::new(io::empty()),
    };
    Ok(MemberReader {
        inner,
        remaining: unit.size(),
    })
}

/// Archive entry name for `unit`: its filename (or id), under its `path` when keeping paths.
fn entry_name(unit: &FlowUnit, keep_path: bool) -> String {
    let id = unit.id().to_string();
    let name = unit
        .filename()
        .filter(|name| !name.is_empty())
        .unwrap_or(&id);
    let name = name.trim_start_matches('/');

    let path = unit
        .attribute(attributes::PATH)
        .filter(|_| keep_path)
        .map(|path| path.trim_start_matches("./").trim_matches('/'))
        .filter(|path| !path.is_empty() && *path != ".");

    match path {
        Some(path) => format!("{}/{}", path, name),
        None => name.to_string(),
    }
}
