//! End-to-end merge scenarios through the merge stage

use super::test_utils::{digits, fragment, named, settings, store};
use flowmerge::flow::attributes;
use flowmerge::flow::{ProcessSession, Relationship};
use flowmerge::merge::MergeProcessor;
use std::io::Read;
use std::time::{Duration, Instant};

#[test]
fn test_defragment_two_bundles_out_of_order() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[
            ("Merge Strategy", "Defragment"),
            ("Merge Format", "Binary Concatenation"),
            ("Delimiter Strategy", "Text"),
        ]),
        store.clone(),
    )
    .unwrap();

    let mut session = ProcessSession::new();
    for i in [0, 2, 5, 4, 1, 3] {
        let (id, index) = if i < 3 { ("0", i) } else { ("1", i - 3) };
        let unit = fragment(&store, id, index, 3, digits(i));
        processor.on_trigger(&mut session, vec![unit]);
    }

    let merged = session.take(Relationship::Merged);
    assert_eq!(merged.len(), 2);
    let first = store.content_of(&merged[0]).unwrap();
    let second = store.content_of(&merged[1]).unwrap();
    assert_eq!(first.len(), 96);
    assert_eq!(String::from_utf8(first).unwrap(), digits(0) + &digits(1) + &digits(2));
    assert_eq!(String::from_utf8(second).unwrap(), digits(3) + &digits(4) + &digits(5));
    assert_eq!(session.count(Relationship::Original), 6);
    assert_eq!(session.count(Relationship::Failure), 0);
}

#[test]
fn test_defragment_with_delimiter_files() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let header = temp_dir.path().join("header.txt");
    let footer = temp_dir.path().join("footer.txt");
    let demarcator = temp_dir.path().join("demarcator.txt");
    std::fs::write(&header, "header").unwrap();
    std::fs::write(&footer, "footer").unwrap();
    std::fs::write(&demarcator, "demarcator").unwrap();

    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[
            ("Delimiter Strategy", "Filename"),
            ("Header File", header.to_str().unwrap()),
            ("Footer File", footer.to_str().unwrap()),
            ("Demarcator File", demarcator.to_str().unwrap()),
        ]),
        store.clone(),
    )
    .unwrap();

    let mut session = ProcessSession::new();
    let inbound: Vec<_> = [2, 0, 1]
        .into_iter()
        .map(|i| fragment(&store, "0", i, 3, digits(i)))
        .collect();
    processor.on_trigger(&mut session, inbound);

    let merged = session.take(Relationship::Merged);
    assert_eq!(merged.len(), 1);
    let expected = format!(
        "header{}demarcator{}demarcator{}footer",
        digits(0),
        digits(1),
        digits(2)
    );
    assert_eq!(store.content_of(&merged[0]).unwrap(), expected.as_bytes());
}

#[test]
fn test_defragment_incomplete_bundle_merged_at_max_bin_age() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[("Delimiter Strategy", "Text"), ("Max Bin Age", "1 sec")]),
        store.clone(),
    )
    .unwrap();

    let start = Instant::now();
    let mut session = ProcessSession::new();
    for i in [0, 2, 5, 1, 3] {
        let (id, index) = if i < 3 { ("0", i) } else { ("1", i - 3) };
        processor.on_trigger_at(
            &mut session,
            vec![fragment(&store, id, index, 3, digits(i))],
            start,
        );
    }
    assert_eq!(session.count(Relationship::Merged), 1);

    processor.on_trigger_at(&mut session, Vec::new(), start + Duration::from_secs(2));
    let merged = session.take(Relationship::Merged);
    assert_eq!(merged.len(), 2);
    assert_eq!(merged[0].size(), 96);
    assert_eq!(merged[1].size(), 64);
    assert_eq!(
        store.content_of(&merged[1]).unwrap(),
        (digits(3) + &digits(5)).as_bytes()
    );
    assert_eq!(merged[1].attribute(attributes::FRAGMENT_COUNT), Some("2"));
}

#[test]
fn test_bin_pack_by_minimum_size() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[
            ("Merge Strategy", "Bin-Packing Algorithm"),
            ("Delimiter Strategy", "Text"),
            ("Minimum Group Size", "96"),
            ("Correlation Attribute Name", "tag"),
        ]),
        store.clone(),
    )
    .unwrap();

    let mut session = ProcessSession::new();
    for i in 0..6 {
        let unit = store.import(digits(i)).unwrap().with_attribute("tag", "tag");
        processor.on_trigger(&mut session, vec![unit]);
    }

    let merged = session.take(Relationship::Merged);
    assert_eq!(merged.len(), 2);
    assert_eq!(
        store.content_of(&merged[0]).unwrap(),
        (digits(0) + &digits(1) + &digits(2)).as_bytes()
    );
    assert_eq!(
        store.content_of(&merged[1]).unwrap(),
        (digits(3) + &digits(4) + &digits(5)).as_bytes()
    );
}

#[test]
fn test_bin_pack_on_correlation_attribute() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[
            ("Merge Strategy", "Bin-Packing Algorithm"),
            ("Minimum Number of Entries", "3"),
            ("Correlation Attribute Name", "tag"),
        ]),
        store.clone(),
    )
    .unwrap();

    let mut session = ProcessSession::new();
    for i in 0..6 {
        let tag = if i % 2 == 0 { "even" } else { "odd" };
        let unit = store.import(i.to_string()).unwrap().with_attribute("tag", tag);
        processor.on_trigger(&mut session, vec![unit]);
    }

    let merged = session.take(Relationship::Merged);
    assert_eq!(merged.len(), 2);
    assert_eq!(store.content_of(&merged[0]).unwrap(), b"024");
    assert_eq!(merged[0].attribute("tag"), Some("even"));
    assert_eq!(store.content_of(&merged[1]).unwrap(), b"135");
    assert_eq!(merged[1].attribute("tag"), Some("odd"));
}

fn tagged_fragments(
    store: &flowmerge::content::memory::MemoryContentStore,
) -> Vec<flowmerge::flow::FlowUnit> {
    [1, 2, 0]
        .into_iter()
        .map(|i| {
            let mut unit = fragment(store, "0", i, 3, digits(i))
                .with_attribute(attributes::MIME_TYPE, "application/octet-stream")
                .with_attribute("tagCommon", "common")
                .with_attribute(
                    "tagUncommon",
                    if i % 2 == 0 { "uncommon1" } else { "uncommon2" },
                );
            match i {
                1 => unit.set_attribute("tagUnique1", "unique1"),
                2 => unit.set_attribute("tagUnique2", "unique2"),
                _ => {}
            }
            unit
        })
        .collect()
}

#[test]
fn test_tar_keeping_only_common_attributes() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[("Merge Format", "TAR"), ("Delimiter Strategy", "Text")]),
        store.clone(),
    )
    .unwrap();

    let mut session = ProcessSession::new();
    processor.on_trigger(&mut session, tagged_fragments(&store));

    let merged = session.take(Relationship::Merged);
    assert_eq!(merged.len(), 1);
    let result = &merged[0];
    assert!(result.attribute("tagUncommon").is_none());
    assert!(result.attribute("tagUnique1").is_none());
    assert!(result.attribute("tagUnique2").is_none());
    assert_eq!(result.attribute("tagCommon"), Some("common"));
    assert_eq!(result.attribute(attributes::MIME_TYPE), Some("application/tar"));

    let bytes = store.content_of(result).unwrap();
    let mut archive = tar::Archive::new(bytes.as_slice());
    let bodies: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|entry| {
            let mut body = String::new();
            entry.unwrap().read_to_string(&mut body).unwrap();
            body
        })
        .collect();
    assert_eq!(bodies, vec![digits(0), digits(1), digits(2)]);
}

#[test]
fn test_tar_keeping_all_unique_attributes() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[
            ("Merge Format", "TAR"),
            ("Delimiter Strategy", "Text"),
            ("Attribute Strategy", "Keep All Unique Attributes"),
        ]),
        store.clone(),
    )
    .unwrap();

    let mut session = ProcessSession::new();
    processor.on_trigger(&mut session, tagged_fragments(&store));

    let merged = session.take(Relationship::Merged);
    let result = &merged[0];
    assert!(result.attribute("tagUncommon").is_none());
    assert_eq!(result.attribute("tagUnique1"), Some("unique1"));
    assert_eq!(result.attribute("tagUnique2"), Some("unique2"));
    assert_eq!(result.attribute("tagCommon"), Some("common"));
    assert_eq!(result.attribute(attributes::MIME_TYPE), Some("application/tar"));
}

#[test]
fn test_single_member_lends_filename() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[("Merge Strategy", "Bin-Packing Algorithm"), ("Merge Format", "ZIP")]),
        store.clone(),
    )
    .unwrap();

    let mut session = ProcessSession::new();
    processor.on_trigger(&mut session, vec![named(&store, "report.csv", "a,b\n")]);
    let merged = session.take(Relationship::Merged);
    assert_eq!(merged[0].filename(), Some("report.csv.zip"));
    assert_eq!(merged[0].attribute(attributes::MIME_TYPE), Some("application/zip"));
}

#[test]
fn test_every_unit_transferred_exactly_once() {
    let store = store();
    let processor = MergeProcessor::schedule(
        &settings(&[
            ("Merge Strategy", "Defragment"),
            ("Maximum Group Size", "40"),
        ]),
        store.clone(),
    )
    .unwrap();

    let inbound = vec![
        fragment(&store, "a", 0, 2, "x"),
        fragment(&store, "a", 1, 2, "y"),
        fragment(&store, "b", 5, 2, "bad index"),
        store.import("no identifier").unwrap(),
        fragment(&store, "c", 0, 1, vec![0u8; 41]),
        fragment(&store, "d", 0, 3, "pending"),
    ];
    let ids: Vec<_> = inbound.iter().map(|u| u.id()).collect();

    let mut session = ProcessSession::new();
    processor.on_trigger(&mut session, inbound);
    processor.flush(&mut session);

    let mut transferred: Vec<_> = session
        .transferred(Relationship::Original)
        .chain(session.transferred(Relationship::Failure))
        .map(|u| u.id())
        .collect();
    transferred.sort();
    let mut expected = ids;
    expected.sort();
    assert_eq!(transferred, expected);

    // "a" merges, "d" is flushed incomplete and still validates.
    assert_eq!(session.count(Relationship::Merged), 2);
    // "b" fails validation, the unidentified unit and the oversized one are rejected.
    assert_eq!(session.count(Relationship::Failure), 3);
}
