//! Typed domain values and their canonical PassKit encodings.
//!
//! PassKit renders enumerated values as `PK`-prefixed symbolic strings and
//! dates as UTC ISO-8601 strings. The enums here are closed, so the mapping
//! to the protocol string is total and checked at compile time; adding a
//! variant without a mapping is a compile error, never a runtime default.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Map, Value};

/// Renders a date as `yyyy-MM-ddTHH:mm:ssZ` in UTC.
///
/// This is the only date encoding the pass document uses; offsets are
/// normalized away before formatting.
pub fn encode_date<Tz: TimeZone>(value: &DateTime<Tz>) -> String {
    value
        .with_timezone(&Utc)
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}

/// Barcode symbology shown on the pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarcodeFormat {
    Qr,
    Pdf417,
    Aztec,
    Code128,
}

impl BarcodeFormat {
    /// The PassKit protocol string for this format.
    pub fn pass_kit_name(self) -> &'static str {
        match self {
            BarcodeFormat::Qr => "PKBarcodeFormatQR",
            BarcodeFormat::Pdf417 => "PKBarcodeFormatPDF417",
            BarcodeFormat::Aztec => "PKBarcodeFormatAztec",
            BarcodeFormat::Code128 => "PKBarcodeFormatCode128",
        }
    }
}

/// Transit type for boarding passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitType {
    Air,
    Boat,
    Bus,
    Generic,
    Train,
}

impl TransitType {
    pub fn pass_kit_name(self) -> &'static str {
        match self {
            TransitType::Air => "PKTransitTypeAir",
            TransitType::Boat => "PKTransitTypeBoat",
            TransitType::Bus => "PKTransitTypeBus",
            TransitType::Generic => "PKTransitTypeGeneric",
            TransitType::Train => "PKTransitTypeTrain",
        }
    }
}

/// Display style for date and time field values.
///
/// Used for both the date and the time component, as PassKit shares one
/// style enumeration between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    None,
    Short,
    Medium,
    Long,
    Full,
}

impl DateStyle {
    pub fn pass_kit_name(self) -> &'static str {
        match self {
            DateStyle::None => "PKDateStyleNone",
            DateStyle::Short => "PKDateStyleShort",
            DateStyle::Medium => "PKDateStyleMedium",
            DateStyle::Long => "PKDateStyleLong",
            DateStyle::Full => "PKDateStyleFull",
        }
    }
}

/// Display style for numeric field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal,
    Percent,
    Scientific,
    SpellOut,
}

impl NumberStyle {
    pub fn pass_kit_name(self) -> &'static str {
        match self {
            NumberStyle::Decimal => "PKNumberStyleDecimal",
            NumberStyle::Percent => "PKNumberStylePercent",
            NumberStyle::Scientific => "PKNumberStyleScientific",
            NumberStyle::SpellOut => "PKNumberStyleSpellOut",
        }
    }
}

/// Alignment of a field's contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
    Natural,
}

impl TextAlignment {
    pub fn pass_kit_name(self) -> &'static str {
        match self {
            TextAlignment::Left => "PKTextAlignmentLeft",
            TextAlignment::Center => "PKTextAlignmentCenter",
            TextAlignment::Right => "PKTextAlignmentRight",
            TextAlignment::Natural => "PKTextAlignmentNatural",
        }
    }
}

/// Data detectors applied to a field's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDetectorType {
    PhoneNumber,
    Link,
    Address,
    CalendarEvent,
}

impl DataDetectorType {
    pub fn pass_kit_name(self) -> &'static str {
        match self {
            DataDetectorType::PhoneNumber => "PKDataDetectorTypePhoneNumber",
            DataDetectorType::Link => "PKDataDetectorTypeLink",
            DataDetectorType::Address => "PKDataDetectorTypeAddress",
            DataDetectorType::CalendarEvent => "PKDataDetectorTypeCalendarEvent",
        }
    }
}

/// A barcode to display on the pass.
///
/// `message_encoding` defaults to `iso-8859-1`, the encoding iOS scanners
/// expect unless told otherwise.
#[derive(Debug, Clone)]
pub struct Barcode {
    pub format: BarcodeFormat,
    pub message: String,
    pub alt_text: Option<String>,
    pub message_encoding: String,
}

impl Barcode {
    pub fn new(message: impl Into<String>, format: BarcodeFormat) -> Self {
        Self {
            format,
            message: message.into(),
            alt_text: None,
            message_encoding: "iso-8859-1".into(),
        }
    }

    /// Human-readable text shown near the barcode.
    pub fn with_alt_text(mut self, alt_text: impl Into<String>) -> Self {
        self.alt_text = Some(alt_text.into());
        self
    }

    pub fn with_message_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.message_encoding = encoding.into();
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("format".into(), self.format.pass_kit_name().into());
        map.insert("message".into(), self.message.clone().into());
        if let Some(alt_text) = &self.alt_text {
            map.insert("altText".into(), alt_text.clone().into());
        }
        map.insert("messageEncoding".into(), self.message_encoding.clone().into());
        Value::Object(map)
    }
}

/// A geographic location where the pass is relevant.
#[derive(Debug, Clone)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub relevant_text: Option<String>,
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            relevant_text: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    /// Text displayed on the lock screen when the pass becomes relevant.
    pub fn with_relevant_text(mut self, text: impl Into<String>) -> Self {
        self.relevant_text = Some(text.into());
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("latitude".into(), self.latitude.into());
        map.insert("longitude".into(), self.longitude.into());
        if let Some(altitude) = self.altitude {
            map.insert("altitude".into(), altitude.into());
        }
        if let Some(text) = &self.relevant_text {
            map.insert("relevantText".into(), text.clone().into());
        }
        Value::Object(map)
    }
}

/// An iBeacon region where the pass is relevant.
#[derive(Debug, Clone)]
pub struct Beacon {
    pub proximity_uuid: String,
    pub major: Option<u32>,
    pub minor: Option<u32>,
    pub relevant_text: Option<String>,
}

impl Beacon {
    pub fn new(proximity_uuid: impl Into<String>) -> Self {
        Self {
            proximity_uuid: proximity_uuid.into(),
            major: None,
            minor: None,
            relevant_text: None,
        }
    }

    pub fn with_major(mut self, major: u32) -> Self {
        self.major = Some(major);
        self
    }

    pub fn with_minor(mut self, minor: u32) -> Self {
        self.minor = Some(minor);
        self
    }

    pub fn with_relevant_text(mut self, text: impl Into<String>) -> Self {
        self.relevant_text = Some(text.into());
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("proximityUUID".into(), self.proximity_uuid.clone().into());
        if let Some(major) = self.major {
            map.insert("major".into(), major.into());
        }
        if let Some(minor) = self.minor {
            map.insert("minor".into(), minor.into());
        }
        if let Some(text) = &self.relevant_text {
            map.insert("relevantText".into(), text.clone().into());
        }
        Value::Object(map)
    }
}

/// NFC payload for contactless passes.
#[derive(Debug, Clone)]
pub struct Nfc {
    pub message: String,
    pub encryption_public_key: Option<String>,
}

impl Nfc {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            encryption_public_key: None,
        }
    }

    pub fn with_encryption_public_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_public_key = Some(key.into());
        self
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("message".into(), self.message.clone().into());
        if let Some(key) = &self.encryption_public_key {
            map.insert("encryptionPublicKey".into(), key.clone().into());
        }
        Value::Object(map)
    }
}
