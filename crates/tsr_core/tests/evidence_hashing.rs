use std::io::{self, Cursor, Read};

use tsr_core::chain;
use tsr_core::domain::{
    AnchorStatus, EvidenceFile, Incident, IncidentLocation, IncidentStatus, IncidentType,
    VerificationStatus,
};
use tsr_core::evidence::{prepare_evidence, EvidenceUpload};

fn sample_incident() -> Incident {
    Incident {
        id: "inc-1".to_string(),
        reporter_name: None,
        incident_type: IncidentType::Theft,
        severity: 7,
        location: IncidentLocation {
            lat: 40.7128,
            lng: -74.0060,
            address: Some("Times Square, NYC".to_string()),
        },
        notes: "Phone stolen.".to_string(),
        files: vec![EvidenceFile {
            id: "file-1".to_string(),
            name: "photo.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            size_bytes: 3,
            content_hash: chain::hash_bytes(b"abc"),
            preview: None,
        }],
        status: IncidentStatus::Pending,
        anchor_status: AnchorStatus::NotAnchored,
        verification_status: VerificationStatus::Pending,
        chain_tx_id: None,
        chain_hash: None,
        reported_at: "2026-01-01T06:00:00Z".to_string(),
        acknowledged_at: None,
        resolved_at: None,
        verification_at: None,
        audit_log: Vec::new(),
    }
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "device unreadable"))
    }
}

fn ok_upload(name: &str, mime: &str, bytes: &[u8]) -> EvidenceUpload<Box<dyn Read>> {
    EvidenceUpload {
        name: name.to_string(),
        mime_type: mime.to_string(),
        preview: None,
        reader: Box::new(Cursor::new(bytes.to_vec())),
    }
}

#[test]
fn distinct_byte_sequences_hash_to_distinct_digests() {
    let corpus: Vec<&[u8]> = vec![
        b"a",
        b"b",
        b"ab",
        b"ba",
        b"witness statement",
        b"witness statement ",
        &[0u8; 32],
        &[0u8; 33],
    ];

    let digests: Vec<String> = corpus.iter().map(|bytes| chain::hash_bytes(bytes)).collect();
    for i in 0..digests.len() {
        for j in (i + 1)..digests.len() {
            assert_ne!(digests[i], digests[j], "corpus items {i} and {j} collided");
        }
    }
}

#[test]
fn bundle_hash_is_stable_for_unchanged_content() {
    let incident = sample_incident();
    assert_eq!(
        chain::evidence_bundle_hash(&incident),
        chain::evidence_bundle_hash(&incident.clone())
    );
}

#[test]
fn bundle_hash_tracks_every_identity_field() {
    let base = sample_incident();
    let base_hash = chain::evidence_bundle_hash(&base);

    let mut changed = base.clone();
    changed.notes.push_str(" Updated.");
    assert_ne!(chain::evidence_bundle_hash(&changed), base_hash);

    let mut changed = base.clone();
    changed.severity = 8;
    assert_ne!(chain::evidence_bundle_hash(&changed), base_hash);

    let mut changed = base.clone();
    changed.files.push(EvidenceFile {
        id: "file-2".to_string(),
        name: "clip.mp4".to_string(),
        mime_type: "video/mp4".to_string(),
        size_bytes: 5,
        content_hash: chain::hash_bytes(b"video"),
        preview: None,
    });
    assert_ne!(chain::evidence_bundle_hash(&changed), base_hash);

    let mut changed = base.clone();
    changed.location.address = None;
    assert_ne!(chain::evidence_bundle_hash(&changed), base_hash);

    // Lifecycle-only fields are not part of the bundle identity.
    let mut changed = base.clone();
    changed.status = IncidentStatus::Resolved;
    changed.anchor_status = AnchorStatus::Anchored;
    assert_eq!(chain::evidence_bundle_hash(&changed), base_hash);
}

#[test]
fn prepared_files_keep_upload_order_and_content_hashes() {
    let uploads: Vec<EvidenceUpload<Box<dyn Read>>> = vec![
        EvidenceUpload {
            name: "scene.png".to_string(),
            mime_type: "image/png".to_string(),
            preview: Some("data:image/png;base64,AAAA".to_string()),
            reader: Box::new(Cursor::new(b"png-bytes".to_vec())),
        },
        ok_upload("statement.txt", "text/plain", b"witness statement"),
    ];

    let (files, warnings) = prepare_evidence(uploads);
    assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
    assert_eq!(files.len(), 2);

    assert_eq!(files[0].name, "scene.png");
    assert_eq!(files[0].content_hash, chain::hash_bytes(b"png-bytes"));
    assert_eq!(files[0].size_bytes, 9);
    assert!(files[0].preview.is_some(), "image previews are kept");

    assert_eq!(files[1].name, "statement.txt");
    assert_eq!(
        files[1].content_hash,
        chain::hash_bytes(b"witness statement")
    );
    assert_ne!(files[0].id, files[1].id);
}

#[test]
fn unreadable_uploads_are_dropped_without_sinking_the_batch() {
    let uploads: Vec<EvidenceUpload<Box<dyn Read>>> = vec![
        ok_upload("a.txt", "text/plain", b"first"),
        EvidenceUpload {
            name: "bad.bin".to_string(),
            mime_type: "application/octet-stream".to_string(),
            preview: None,
            reader: Box::new(FailingReader),
        },
        ok_upload("c.txt", "text/plain", b"third"),
    ];

    let (files, warnings) = prepare_evidence(uploads);
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "a.txt");
    assert_eq!(files[1].name, "c.txt");

    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, "EVIDENCE_HASH_FAILED");
    assert!(warnings[0].message.contains("bad.bin"));
}

#[test]
fn previews_are_only_honored_for_images() {
    let uploads: Vec<EvidenceUpload<Box<dyn Read>>> = vec![EvidenceUpload {
        name: "report.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        preview: Some("data:application/pdf;base64,AAAA".to_string()),
        reader: Box::new(Cursor::new(b"pdf".to_vec())),
    }];

    let (files, warnings) = prepare_evidence(uploads);
    assert_eq!(files.len(), 1);
    assert!(files[0].preview.is_none());
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, "EVIDENCE_PREVIEW_DROPPED");
}
