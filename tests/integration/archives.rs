//! Archive packaging through the merge stage

use super::test_utils::{named, settings, store};
use flowmerge::config::{Delimiters, MergeFormat};
use flowmerge::content::memory::MemoryContentStore;
use flowmerge::flow::attributes;
use flowmerge::flow::{Attributes, FlowUnit, ProcessSession, Relationship};
use flowmerge::merge::{ContentMerger, MergeProcessor};
use std::io::{Cursor, Read};

fn members(store: &MemoryContentStore) -> Vec<FlowUnit> {
    vec![
        named(store, "a.txt", "alpha").with_attribute(attributes::PATH, "./"),
        named(store, "b.txt", "bravo").with_attribute(attributes::PATH, "./logs/2024"),
        named(store, "c.txt", "").with_attribute(attributes::PATH, "./logs/"),
    ]
}

fn tar_entries(bytes: &[u8]) -> Vec<(String, String, u32)> {
    let mut archive = tar::Archive::new(bytes);
    archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut entry = entry.unwrap();
            let name = entry.path().unwrap().to_string_lossy().to_string();
            let mode = entry.header().mode().unwrap();
            let mut body = String::new();
            entry.read_to_string(&mut body).unwrap();
            (name, body, mode)
        })
        .collect()
}

fn zip_entries(bytes: Vec<u8>) -> Vec<(String, String)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut body = String::new();
            file.read_to_string(&mut body).unwrap();
            (file.name().to_string(), body)
        })
        .collect()
}

#[test]
fn test_tar_flat_entries() {
    let store = store();
    let merger = ContentMerger::new(MergeFormat::Tar, Delimiters::default(), false);
    let units = members(&store);
    let result = merger.merge(store.as_ref(), &units, Attributes::new()).unwrap();

    let entries = tar_entries(&store.content_of(&result).unwrap());
    let names: Vec<_> = entries.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt"]);
    assert_eq!(entries[0].1, "alpha");
    assert_eq!(entries[2].1, "");
    assert!(entries.iter().all(|(_, _, mode)| *mode == 0o755));
}

#[test]
fn test_tar_keep_path() {
    let store = store();
    let merger = ContentMerger::new(MergeFormat::Tar, Delimiters::default(), true);
    let units = members(&store);
    let result = merger.merge(store.as_ref(), &units, Attributes::new()).unwrap();

    let entries = tar_entries(&store.content_of(&result).unwrap());
    let names: Vec<_> = entries.iter().map(|(name, _, _)| name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "logs/2024/b.txt", "logs/c.txt"]);
}

#[test]
fn test_zip_entries_and_keep_path() {
    let store = store();
    let units = members(&store);

    let flat = ContentMerger::new(MergeFormat::Zip, Delimiters::default(), false);
    let result = flat.merge(store.as_ref(), &units, Attributes::new()).unwrap();
    let entries = zip_entries(store.content_of(&result).unwrap());
    assert_eq!(
        entries,
        vec![
            ("a.txt".to_string(), "alpha".to_string()),
            ("b.txt".to_string(), "bravo".to_string()),
            ("c.txt".to_string(), String::new()),
        ]
    );

    let nested = ContentMerger::new(MergeFormat::Zip, Delimiters::default(), true);
    let result = nested.merge(store.as_ref(), &units, Attributes::new()).unwrap();
    let names: Vec<_> = zip_entries(store.content_of(&result).unwrap())
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(names, vec!["a.txt", "logs/2024/b.txt", "logs/c.txt"]);
}

#[test]
fn test_archive_ignores_delimiters() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[
            ("Merge Strategy", "Bin-Packing Algorithm"),
            ("Merge Format", "ZIP"),
            ("Delimiter Strategy", "Text"),
            ("Header File", "HEAD"),
            ("Minimum Number of Entries", "2"),
        ]),
        store.clone(),
    )
    .unwrap();

    let mut session = ProcessSession::new();
    processor.on_trigger(
        &mut session,
        vec![named(&store, "x", "1"), named(&store, "y", "2")],
    );
    let merged = session.take(Relationship::Merged);
    assert_eq!(merged.len(), 1);
    let entries = zip_entries(store.content_of(&merged[0]).unwrap());
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|(_, body)| !body.contains("HEAD")));
    assert_eq!(merged[0].attribute(attributes::MIME_TYPE), Some("application/zip"));
}

#[test]
fn test_concatenation_of_empty_members_is_delimiters_only() {
    let store = store();
    let merger = ContentMerger::new(
        MergeFormat::Concatenation,
        Delimiters::text("<", ">", "|"),
        false,
    );
    let units = vec![store.import("").unwrap(), store.import("").unwrap()];
    let result = merger.merge(store.as_ref(), &units, Attributes::new()).unwrap();
    assert_eq!(store.content_of(&result).unwrap(), b"<|>");
    assert_eq!(result.size(), 3);
}
