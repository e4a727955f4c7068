//! Pass document construction.
//!
//! A pass is a nested JSON document described by Apple's PassKit package
//! format. This module provides the [`AttributeDocument`] backing store, the
//! scoped builder views over it ([`Pass`] and friends), and the typed domain
//! values (barcodes, locations, beacons, NFC payloads) with their canonical
//! PassKit string encodings.

pub mod builder;
pub mod document;
pub mod values;

pub use builder::Pass;
pub use document::AttributeDocument;
pub use values::{
    Barcode, BarcodeFormat, Beacon, DataDetectorType, DateStyle, Location, Nfc, NumberStyle,
    TextAlignment, TransitType,
};
