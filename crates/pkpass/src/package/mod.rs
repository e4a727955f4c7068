//! Pass package assembly.
//!
//! Turns a [`Pass`] document plus named binary assets into a signed
//! `.pkpass` archive: a ZIP container holding `pass.json`, the image
//! entries, a `manifest.json` mapping every entry name to its SHA-1 digest,
//! and a detached CMS `signature` over the manifest bytes.
//!
//! Assembly is all-or-nothing: a digest or signing failure aborts before any
//! archive bytes are produced. The manifest is regenerated fresh on every
//! build.

use crate::crypto::{self, SigningCredentials};
use crate::pass::Pass;
use crate::{Error, Result};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Content-Type value for `.pkpass` files.
pub const PKPASS_MIME_TYPE: &str = "application/vnd.apple.pkpass";

const PASS_ENTRY_NAME: &str = "pass.json";
const MANIFEST_ENTRY_NAME: &str = "manifest.json";
const SIGNATURE_ENTRY_NAME: &str = "signature";

/// Seekable byte source for stream-backed package entries.
///
/// Entries are read once for digesting and again for archive writing, so the
/// source must support rewinding. The `Seek` bound makes a non-rewindable
/// source a compile-time error rather than a runtime one.
pub trait EntrySource: Read + Seek + Send {}

impl<T: Read + Seek + Send> EntrySource for T {}

/// Logical role of an image asset inside the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRole {
    Icon,
    Logo,
    Strip,
    Footer,
    Background,
    Thumbnail,
}

impl ImageRole {
    /// All roles, in the order they conventionally appear in a package.
    pub const ALL: [ImageRole; 6] = [
        ImageRole::Icon,
        ImageRole::Logo,
        ImageRole::Strip,
        ImageRole::Footer,
        ImageRole::Background,
        ImageRole::Thumbnail,
    ];

    fn base_name(self) -> &'static str {
        match self {
            ImageRole::Icon => "icon",
            ImageRole::Logo => "logo",
            ImageRole::Strip => "strip",
            ImageRole::Footer => "footer",
            ImageRole::Background => "background",
            ImageRole::Thumbnail => "thumbnail",
        }
    }
}

/// Pixel density variant of an image asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageDensity {
    #[default]
    Standard,
    Double,
    Triple,
}

impl ImageDensity {
    fn suffix(self) -> &'static str {
        match self {
            ImageDensity::Standard => "",
            ImageDensity::Double => "@2x",
            ImageDensity::Triple => "@3x",
        }
    }
}

/// File name for an image asset, e.g. `icon@2x.png`.
pub fn image_file_name(role: ImageRole, density: ImageDensity) -> String {
    format!("{}{}.png", role.base_name(), density.suffix())
}

/// Whether `name` matches the image entry naming convention.
pub fn is_image_entry_name(name: &str) -> bool {
    ImageRole::ALL.iter().any(|role| {
        [ImageDensity::Standard, ImageDensity::Double, ImageDensity::Triple]
            .iter()
            .any(|density| image_file_name(*role, *density) == name)
    })
}

enum EntryContent {
    Bytes(Vec<u8>),
    Stream(Box<dyn EntrySource>),
}

impl EntryContent {
    /// SHA-1 digest as lower-case hex. Streams are rewound before hashing.
    fn digest(&mut self) -> Result<String> {
        let mut hasher = Sha1::new();
        match self {
            EntryContent::Bytes(bytes) => hasher.update(&bytes[..]),
            EntryContent::Stream(stream) => {
                stream.seek(SeekFrom::Start(0))?;
                let mut buffer = [0u8; 8192];
                loop {
                    let read = stream.read(&mut buffer)?;
                    if read == 0 {
                        break;
                    }
                    hasher.update(&buffer[..read]);
                }
            }
        }
        Ok(hex::encode(hasher.finalize()))
    }

    fn write_to(&mut self, target: &mut impl Write) -> Result<()> {
        match self {
            EntryContent::Bytes(bytes) => target.write_all(bytes)?,
            EntryContent::Stream(stream) => {
                stream.seek(SeekFrom::Start(0))?;
                std::io::copy(stream, target)?;
            }
        }
        Ok(())
    }
}

/// Assembles a pass document and its binary assets into a signed archive.
///
/// Each build owns its package exclusively: the entry map is mutated in
/// place and the manifest assumes a stable entry set, so a package must not
/// be shared across concurrent builds. Stream-backed entries are owned by
/// the package and released when [`sign_and_build`](PassPackage::sign_and_build)
/// consumes it, whether assembly succeeds or fails.
pub struct PassPackage {
    pass: Pass,
    files: BTreeMap<String, EntryContent>,
}

impl PassPackage {
    /// Creates a package for the given pass with no assets yet.
    pub fn new(pass: Pass) -> Self {
        Self {
            pass,
            files: BTreeMap::new(),
        }
    }

    /// Registers a named entry backed by an owned byte buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateEntry`] if an entry with the same name was
    /// already registered.
    pub fn add_file(&mut self, name: impl Into<String>, content: Vec<u8>) -> Result<()> {
        self.insert(name.into(), EntryContent::Bytes(content))
    }

    /// Registers a named entry backed by a seekable stream.
    ///
    /// The stream is read to completion twice: once for digesting and once
    /// for archive writing, rewinding in between.
    pub fn add_stream(
        &mut self,
        name: impl Into<String>,
        content: impl Read + Seek + Send + 'static,
    ) -> Result<()> {
        self.insert(name.into(), EntryContent::Stream(Box::new(content)))
    }

    /// Registers an image asset under its conventional file name.
    pub fn add_image(
        &mut self,
        role: ImageRole,
        density: ImageDensity,
        content: Vec<u8>,
    ) -> Result<()> {
        self.add_file(image_file_name(role, density), content)
    }

    /// Streaming variant of [`add_image`](PassPackage::add_image).
    pub fn add_image_stream(
        &mut self,
        role: ImageRole,
        density: ImageDensity,
        content: impl Read + Seek + Send + 'static,
    ) -> Result<()> {
        self.add_stream(image_file_name(role, density), content)
    }

    fn insert(&mut self, name: String, content: EntryContent) -> Result<()> {
        if self.files.contains_key(&name) {
            return Err(Error::DuplicateEntry(name));
        }
        self.files.insert(name, content);
        Ok(())
    }

    /// Serializes the pass, digests every entry into the manifest, signs the
    /// manifest, and writes the final ZIP archive.
    ///
    /// Consumes the package; stream resources it owns are dropped on return.
    ///
    /// # Errors
    ///
    /// - [`Error::DuplicateEntry`] if a caller registered an entry under one
    ///   of the generated names (`pass.json`, `manifest.json`, `signature`)
    /// - [`Error::Io`] if a stream-backed entry cannot be read
    /// - [`Error::Signing`] if CMS signature generation fails
    /// - [`Error::Zip`] if the archive cannot be written
    pub fn sign_and_build(mut self, credentials: &SigningCredentials) -> Result<Vec<u8>> {
        let pass_json = self.pass.to_json()?;
        self.insert(PASS_ENTRY_NAME.into(), EntryContent::Bytes(pass_json))?;

        let manifest = self.create_manifest()?;
        let manifest_bytes = serde_json::to_vec(&manifest)?;
        let signature = crypto::sign_detached(&manifest_bytes, credentials)?;

        self.insert(MANIFEST_ENTRY_NAME.into(), EntryContent::Bytes(manifest_bytes))?;
        self.insert(SIGNATURE_ENTRY_NAME.into(), EntryContent::Bytes(signature))?;

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, content) in self.files.iter_mut() {
            zip.start_file(name.as_str(), options)?;
            content.write_to(&mut zip)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// Digest map over every registered entry.
    ///
    /// Called before the manifest and signature entries exist, so they never
    /// digest themselves.
    fn create_manifest(&mut self) -> Result<BTreeMap<String, String>> {
        let mut manifest = BTreeMap::new();
        for (name, content) in self.files.iter_mut() {
            manifest.insert(name.clone(), content.digest()?);
        }
        Ok(manifest)
    }
}
