//! End-to-end package assembly: build a pass, add assets, sign with a
//! generated certificate, and verify the resulting archive structure.

use cryptographic_message_syntax::SignedData;
use pkpass::package::{ImageDensity, ImageRole};
use pkpass::{Error, Pass, PassPackage, SigningCredentials};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::io::{Cursor, Read};
use x509_certificate::{CapturedX509Certificate, InMemorySigningKeyPair};
use zip::ZipArchive;

fn demo_pass() -> Pass {
    let mut pass = Pass::new();
    pass.standard()
        .pass_type_identifier("pass.com.example.demo")
        .serial_number("0001")
        .team_identifier("AB12CD34EF")
        .organization_name("Example")
        .description("Demo pass");
    pass.store_card()
        .primary_fields()
        .add("balance")
        .label("Balance")
        .value("$25.00");
    pass
}

fn demo_credentials() -> SigningCredentials {
    let certified = rcgen::generate_simple_self_signed(["pass.test".to_string()]).unwrap();
    let certificate = CapturedX509Certificate::from_der(certified.cert.der().to_vec()).unwrap();
    let signing_key =
        InMemorySigningKeyPair::from_pkcs8_der(&certified.key_pair.serialize_der()).unwrap();

    let authority = rcgen::generate_simple_self_signed(["wwdr.test".to_string()]).unwrap();
    let intermediate = CapturedX509Certificate::from_der(authority.cert.der().to_vec()).unwrap();

    SigningCredentials::new(certificate, signing_key).with_intermediate(intermediate)
}

fn build_demo_archive() -> Vec<u8> {
    let mut package = PassPackage::new(demo_pass());
    package
        .add_image(ImageRole::Icon, ImageDensity::Standard, b"icon-png-bytes".to_vec())
        .unwrap();
    package
        .add_image_stream(
            ImageRole::Logo,
            ImageDensity::Double,
            Cursor::new(b"logo-png-bytes".to_vec()),
        )
        .unwrap();
    package.sign_and_build(&demo_credentials()).unwrap()
}

fn read_entries(archive_bytes: &[u8]) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes.to_vec())).unwrap();
    let mut entries = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        entries.insert(entry.name().to_owned(), content);
    }
    entries
}

#[test]
fn archive_contains_expected_entries() {
    let entries = read_entries(&build_demo_archive());
    let names: Vec<&str> = entries.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["icon.png", "logo@2x.png", "manifest.json", "pass.json", "signature"]
    );
}

#[test]
fn manifest_covers_every_entry_with_correct_digests() {
    let entries = read_entries(&build_demo_archive());
    let manifest: BTreeMap<String, String> =
        serde_json::from_slice(&entries["manifest.json"]).unwrap();

    // One digest per entry, excluding the manifest and signature themselves.
    let expected_names: Vec<&str> = entries
        .keys()
        .map(String::as_str)
        .filter(|name| *name != "manifest.json" && *name != "signature")
        .collect();
    let manifest_names: Vec<&str> = manifest.keys().map(String::as_str).collect();
    assert_eq!(manifest_names, expected_names);

    for (name, digest) in &manifest {
        let mut hasher = Sha1::new();
        hasher.update(&entries[name]);
        assert_eq!(digest, &hex::encode(hasher.finalize()), "digest mismatch for {name}");
    }
}

#[test]
fn pass_json_matches_builder_output() {
    let entries = read_entries(&build_demo_archive());
    assert_eq!(entries["pass.json"], demo_pass().to_json().unwrap());
}

#[test]
fn signature_is_detached_signed_data_over_manifest() {
    let entries = read_entries(&build_demo_archive());
    let signed_data = SignedData::parse_ber(&entries["signature"]).unwrap();
    assert!(signed_data.signed_content().is_none());
    assert_eq!(signed_data.signers().count(), 1);
    // Leaf plus intermediate.
    assert!(signed_data.certificates().count() >= 2);
}

#[test]
fn assembly_is_idempotent_apart_from_signing_time() {
    let first = read_entries(&build_demo_archive());
    let second = read_entries(&build_demo_archive());
    assert_eq!(first["pass.json"], second["pass.json"]);
    assert_eq!(first["manifest.json"], second["manifest.json"]);
    assert_eq!(first["icon.png"], second["icon.png"]);
}

#[test]
fn archive_round_trips_through_disk_and_file_streams() {
    let dir = tempfile::tempdir().unwrap();
    let icon_path = dir.path().join("icon.png");
    std::fs::write(&icon_path, b"icon-png-bytes").unwrap();

    let mut package = PassPackage::new(demo_pass());
    package
        .add_image_stream(
            ImageRole::Icon,
            ImageDensity::Standard,
            std::fs::File::open(&icon_path).unwrap(),
        )
        .unwrap();
    let archive = package.sign_and_build(&demo_credentials()).unwrap();

    let out_path = dir.path().join("demo.pkpass");
    std::fs::write(&out_path, &archive).unwrap();

    let entries = read_entries(&std::fs::read(&out_path).unwrap());
    assert_eq!(entries["icon.png"], b"icon-png-bytes".to_vec());
}

#[test]
fn reserved_entry_name_fails_assembly() {
    let mut package = PassPackage::new(demo_pass());
    package.add_file("pass.json", b"{}".to_vec()).unwrap();
    let err = package.sign_and_build(&demo_credentials()).unwrap_err();
    assert!(matches!(err, Error::DuplicateEntry(name) if name == "pass.json"));
}

#[test]
fn failed_stream_aborts_before_archive_bytes() {
    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("stream is broken"))
        }
    }

    impl std::io::Seek for FailingReader {
        fn seek(&mut self, _pos: std::io::SeekFrom) -> std::io::Result<u64> {
            Ok(0)
        }
    }

    let mut package = PassPackage::new(demo_pass());
    package.add_stream("icon.png", FailingReader).unwrap();
    let err = package.sign_and_build(&demo_credentials()).unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}
