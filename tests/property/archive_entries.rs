//! Property-based tests for content assembly

use flowmerge::config::{Delimiters, MergeFormat};
use flowmerge::content::memory::MemoryContentStore;
use flowmerge::flow::attributes;
use flowmerge::flow::Attributes;
use flowmerge::merge::ContentMerger;
use proptest::prelude::*;
use std::io::{Cursor, Read};

fn payloads() -> impl Strategy<Value = Vec<Vec<u8>>> {
    prop::collection::vec(prop::collection::vec(any::<u8>(), 0..600), 1..5)
}

/// Concatenation output is header, members joined by the demarcator, footer
#[test]
fn test_concatenation_layout() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(payloads(), "[a-z]{0,3}", "[a-z]{0,3}", "[a-z]{0,3}"), |(bodies, h, f, d)| {
            let store = MemoryContentStore::new();
            let units: Vec<_> = bodies.iter().map(|b| store.import(b.clone()).unwrap()).collect();
            let merger = ContentMerger::new(
                MergeFormat::Concatenation,
                Delimiters::text(&h, &f, &d),
                false,
            );
            let result = merger.merge(&store, &units, Attributes::new()).unwrap();

            let mut expected = h.as_bytes().to_vec();
            expected.extend(bodies.join(d.as_bytes()));
            expected.extend(f.as_bytes());
            prop_assert_eq!(result.size(), expected.len() as u64);
            prop_assert_eq!(store.content_of(&result).unwrap(), expected);
            Ok(())
        })
        .unwrap();
}

/// Members as (path, filename, body); filenames carry their position so they stay unique
fn members() -> impl Strategy<Value = Vec<(String, String, Vec<u8>)>> {
    prop::collection::vec(
        (
            "(\\./)?([a-z]{1,4}(/[a-z]{1,4})?)?",
            "[a-zA-Z0-9_.]{1,12}",
            prop::collection::vec(any::<u8>(), 0..600),
        ),
        1..5,
    )
    .prop_map(|members| {
        members
            .into_iter()
            .enumerate()
            .map(|(i, (path, name, body))| (path, format!("{}-{}", i, name), body))
            .collect()
    })
}

/// Merge `members` into one archive and return the stored bytes with the expected
/// (entry name, body) pairs.
fn merge_members(
    format: MergeFormat,
    members: &[(String, String, Vec<u8>)],
    keep_path: bool,
) -> (Vec<u8>, Vec<(String, Vec<u8>)>) {
    let store = MemoryContentStore::new();
    let units: Vec<_> = members
        .iter()
        .map(|(path, name, body)| {
            store
                .import(body.clone())
                .unwrap()
                .with_attribute(attributes::FILENAME, name.as_str())
                .with_attribute(attributes::PATH, path.as_str())
        })
        .collect();
    let merger = ContentMerger::new(format, Delimiters::default(), keep_path);
    let result = merger.merge(&store, &units, Attributes::new()).unwrap();

    let expected = members
        .iter()
        .map(|(path, name, body)| {
            let dir = path.trim_start_matches("./");
            let entry = if keep_path && !dir.is_empty() {
                format!("{}/{}", dir, name)
            } else {
                name.clone()
            };
            (entry, body.clone())
        })
        .collect();
    (store.content_of(&result).unwrap(), expected)
}

/// Tar entries come back in member order with their exact names and bytes
#[test]
fn test_tar_preserves_members() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(members(), any::<bool>()), |(members, keep_path)| {
            let (bytes, expected) = merge_members(MergeFormat::Tar, &members, keep_path);

            let mut archive = tar::Archive::new(bytes.as_slice());
            let mut read_back = Vec::new();
            for entry in archive.entries().unwrap() {
                let mut entry = entry.unwrap();
                let name = entry.path().unwrap().to_string_lossy().to_string();
                let mut body = Vec::new();
                entry.read_to_end(&mut body).unwrap();
                read_back.push((name, body));
            }
            prop_assert_eq!(read_back, expected);
            Ok(())
        })
        .unwrap();
}

/// Zip entries come back in member order with their exact names and bytes
#[test]
fn test_zip_preserves_members() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&(members(), any::<bool>()), |(members, keep_path)| {
            let (bytes, expected) = merge_members(MergeFormat::Zip, &members, keep_path);

            let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
            let mut read_back = Vec::new();
            for i in 0..archive.len() {
                let mut file = archive.by_index(i).unwrap();
                let mut body = Vec::new();
                file.read_to_end(&mut body).unwrap();
                read_back.push((file.name().to_string(), body));
            }
            prop_assert_eq!(read_back, expected);
            Ok(())
        })
        .unwrap();
}
