//! Hierarchical pass builder.
//!
//! [`Pass`] owns the attribute document; every builder view is a thin struct
//! holding a mutable reference into it plus the sub-path it writes to. Views
//! expose only the setters valid for their semantic region and convert typed
//! domain values to their canonical encodings before writing. No view
//! validates cross-field consistency; the document is trusted to the caller
//! until a consuming client verifies it.
//!
//! # Example
//!
//! ```
//! use pkpass::Pass;
//!
//! let mut pass = Pass::new();
//! pass.standard()
//!     .pass_type_identifier("pass.com.example.demo")
//!     .serial_number("E5982H-I2")
//!     .description("Demo coupon");
//! pass.coupon()
//!     .primary_fields()
//!     .add("offer")
//!     .label("Any premium dog food")
//!     .value("20% off");
//! let bytes = pass.to_json()?;
//! # Ok::<(), pkpass::Error>(())
//! ```

use crate::pass::document::AttributeDocument;
use crate::pass::values::{
    encode_date, Barcode, Beacon, DataDetectorType, DateStyle, Location, Nfc, NumberStyle,
    TextAlignment, TransitType,
};
use crate::Result;
use chrono::{DateTime, TimeZone};
use serde_json::{Map, Value};

/// The five mutually-intended-exclusive layout templates.
///
/// The builder does not enforce exclusivity; a well-formed pass populates
/// exactly one style subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StyleKey {
    BoardingPass,
    Coupon,
    EventTicket,
    Generic,
    StoreCard,
}

impl StyleKey {
    fn key(self) -> &'static str {
        match self {
            StyleKey::BoardingPass => "boardingPass",
            StyleKey::Coupon => "coupon",
            StyleKey::EventTicket => "eventTicket",
            StyleKey::Generic => "generic",
            StyleKey::StoreCard => "storeCard",
        }
    }
}

/// A pass document under construction.
///
/// Obtain scoped views with [`standard`](Pass::standard),
/// [`visual_appearance`](Pass::visual_appearance), the style accessors, and
/// so on; each view writes into the same backing document.
#[derive(Debug, Clone, Default)]
pub struct Pass {
    doc: AttributeDocument,
}

impl Pass {
    /// Creates an empty pass.
    pub fn new() -> Self {
        Self {
            doc: AttributeDocument::new(),
        }
    }

    /// Wraps an existing `pass.json` document.
    ///
    /// Useful when the document was authored elsewhere and only packaging
    /// and signing are needed.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            doc: AttributeDocument::from_json(bytes)?,
        })
    }

    /// Required top-level keys. Creating this view seeds `formatVersion: 1`.
    pub fn standard(&mut self) -> StandardBuilder<'_> {
        self.doc.set("formatVersion", Value::from(1));
        StandardBuilder { doc: &mut self.doc }
    }

    /// Keys for the update web service the pass phones home to.
    pub fn web_service(&mut self) -> WebServiceBuilder<'_> {
        WebServiceBuilder { doc: &mut self.doc }
    }

    /// Expiration and voiding keys.
    pub fn expiration(&mut self) -> ExpirationBuilder<'_> {
        ExpirationBuilder { doc: &mut self.doc }
    }

    /// Relevance keys controlling when the pass surfaces on the lock screen.
    pub fn relevance(&mut self) -> RelevanceBuilder<'_> {
        RelevanceBuilder { doc: &mut self.doc }
    }

    /// Visual appearance keys (colors, barcodes, logo text).
    pub fn visual_appearance(&mut self) -> VisualAppearanceBuilder<'_> {
        VisualAppearanceBuilder { doc: &mut self.doc }
    }

    /// Keys linking the pass to an associated iOS app.
    pub fn associated_app(&mut self) -> AssociatedAppBuilder<'_> {
        AssociatedAppBuilder { doc: &mut self.doc }
    }

    /// Keys for a paired watch companion app.
    pub fn companion_app(&mut self) -> CompanionAppBuilder<'_> {
        CompanionAppBuilder { doc: &mut self.doc }
    }

    /// Sets the NFC payload for contactless passes.
    pub fn nfc(&mut self, value: Nfc) -> &mut Self {
        self.doc.set("nfc", value.to_value());
        self
    }

    pub fn boarding_pass(&mut self) -> StyleBuilder<'_> {
        self.style(StyleKey::BoardingPass)
    }

    pub fn coupon(&mut self) -> StyleBuilder<'_> {
        self.style(StyleKey::Coupon)
    }

    pub fn event_ticket(&mut self) -> StyleBuilder<'_> {
        self.style(StyleKey::EventTicket)
    }

    pub fn generic(&mut self) -> StyleBuilder<'_> {
        self.style(StyleKey::Generic)
    }

    pub fn store_card(&mut self) -> StyleBuilder<'_> {
        self.style(StyleKey::StoreCard)
    }

    fn style(&mut self, style: StyleKey) -> StyleBuilder<'_> {
        // Materialize the style bag so the style key is present even when no
        // style-level setter is ever called.
        self.doc.bag(style.key());
        StyleBuilder {
            doc: &mut self.doc,
            style,
        }
    }

    /// Read access to the backing document.
    pub fn document(&self) -> &AttributeDocument {
        &self.doc
    }

    /// Renders the pass as canonical UTF-8 JSON bytes.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        self.doc.to_json()
    }
}

/// View over the required top-level pass keys.
#[derive(Debug)]
pub struct StandardBuilder<'a> {
    doc: &'a mut AttributeDocument,
}

impl StandardBuilder<'_> {
    fn set(self, name: &str, value: Value) -> Self {
        self.doc.set(name, value);
        self
    }

    /// Pass type identifier, as issued by Apple. Must correspond with the
    /// signing certificate.
    pub fn pass_type_identifier(self, value: &str) -> Self {
        self.set("passTypeIdentifier", value.into())
    }

    /// Team identifier of the organization that signed the pass.
    pub fn team_identifier(self, value: &str) -> Self {
        self.set("teamIdentifier", value.into())
    }

    /// Display name of the organization that originated the pass.
    pub fn organization_name(self, value: &str) -> Self {
        self.set("organizationName", value.into())
    }

    /// Serial number unique within the pass type.
    pub fn serial_number(self, value: &str) -> Self {
        self.set("serialNumber", value.into())
    }

    /// Brief description used by accessibility technologies.
    pub fn description(self, value: &str) -> Self {
        self.set("description", value.into())
    }

    /// Removes the Share button on the back of the pass (iOS 11+).
    pub fn sharing_prohibited(self, value: bool) -> Self {
        self.set("sharingProhibited", value.into())
    }
}

/// View over the web-service keys.
#[derive(Debug)]
pub struct WebServiceBuilder<'a> {
    doc: &'a mut AttributeDocument,
}

impl WebServiceBuilder<'_> {
    /// Authorization token the device presents when calling the web service.
    pub fn authentication_token(self, value: &str) -> Self {
        self.doc.set("authenticationToken", value.into());
        self
    }

    /// Base URL of the update web service.
    pub fn web_service_url(self, value: &str) -> Self {
        self.doc.set("webServiceURL", value.into());
        self
    }
}

/// View over expiration keys.
#[derive(Debug)]
pub struct ExpirationBuilder<'a> {
    doc: &'a mut AttributeDocument,
}

impl ExpirationBuilder<'_> {
    /// Date after which the pass is no longer valid.
    pub fn expiration_date<Tz: TimeZone>(self, value: &DateTime<Tz>) -> Self {
        self.doc.set("expirationDate", encode_date(value).into());
        self
    }

    /// Marks the pass as voided (redeemed or canceled).
    pub fn voided(self, value: bool) -> Self {
        self.doc.set("voided", value.into());
        self
    }
}

/// View over relevance keys.
#[derive(Debug)]
pub struct RelevanceBuilder<'a> {
    doc: &'a mut AttributeDocument,
}

impl RelevanceBuilder<'_> {
    /// Adds a relevant location. Repeatable.
    pub fn location(self, value: Location) -> Self {
        self.doc.append("locations", value.to_value());
        self
    }

    /// Adds a relevant iBeacon region. Repeatable.
    pub fn beacon(self, value: Beacon) -> Self {
        self.doc.append("beacons", value.to_value());
        self
    }

    /// Maximum distance in meters at which the pass is relevant.
    pub fn max_distance(self, value: u32) -> Self {
        self.doc.set("maxDistance", value.into());
        self
    }

    /// Date and time when the pass becomes relevant.
    pub fn relevant_date<Tz: TimeZone>(self, value: &DateTime<Tz>) -> Self {
        self.doc.set("relevantDate", encode_date(value).into());
        self
    }
}

/// View over visual-appearance keys.
#[derive(Debug)]
pub struct VisualAppearanceBuilder<'a> {
    doc: &'a mut AttributeDocument,
}

impl VisualAppearanceBuilder<'_> {
    fn set(self, name: &str, value: Value) -> Self {
        self.doc.set(name, value);
        self
    }

    /// Adds a barcode. Repeatable; the first entry is the one iOS displays
    /// on devices that support only a single barcode.
    pub fn barcode(self, value: Barcode) -> Self {
        self.doc.append("barcodes", value.to_value());
        self
    }

    /// Background color, as a CSS-style `rgb(r, g, b)` string.
    pub fn background_color(self, value: &str) -> Self {
        self.set("backgroundColor", value.into())
    }

    /// Foreground (value text) color, as a CSS-style `rgb(r, g, b)` string.
    pub fn foreground_color(self, value: &str) -> Self {
        self.set("foregroundColor", value.into())
    }

    /// Label text color, as a CSS-style `rgb(r, g, b)` string.
    pub fn label_color(self, value: &str) -> Self {
        self.set("labelColor", value.into())
    }

    /// Text displayed next to the logo.
    pub fn logo_text(self, value: &str) -> Self {
        self.set("logoText", value.into())
    }

    /// Identifier used to group related event-ticket or boarding passes.
    pub fn grouping_identifier(self, value: &str) -> Self {
        self.set("groupingIdentifier", value.into())
    }

    /// Disables the shine effect over the strip image.
    pub fn suppress_strip_shine(self, value: bool) -> Self {
        self.set("suppressStripShine", value.into())
    }
}

/// View over associated-app keys.
#[derive(Debug)]
pub struct AssociatedAppBuilder<'a> {
    doc: &'a mut AttributeDocument,
}

impl AssociatedAppBuilder<'_> {
    /// URL launched when the associated app opens from the pass.
    pub fn app_launch_url(self, value: &str) -> Self {
        self.doc.set("appLaunchURL", value.into());
        self
    }

    /// iTunes Store item identifiers of the associated apps.
    pub fn associated_store_identifiers(self, values: &[i64]) -> Self {
        let ids: Vec<Value> = values.iter().map(|id| Value::from(*id)).collect();
        self.doc.set("associatedStoreIdentifiers", Value::Array(ids));
        self
    }
}

/// View over companion-app keys.
#[derive(Debug)]
pub struct CompanionAppBuilder<'a> {
    doc: &'a mut AttributeDocument,
}

impl CompanionAppBuilder<'_> {
    /// Arbitrary JSON payload handed to the companion app.
    pub fn user_info(self, value: Value) -> Self {
        self.doc.set("userInfo", value);
        self
    }
}

/// View over one style subtree (boarding pass, coupon, event ticket,
/// generic, store card).
#[derive(Debug)]
pub struct StyleBuilder<'a> {
    doc: &'a mut AttributeDocument,
    style: StyleKey,
}

impl<'a> StyleBuilder<'a> {
    /// Type of transit. Required for boarding passes, not allowed elsewhere.
    pub fn transit_type(self, value: TransitType) -> Self {
        self.doc
            .bag(self.style.key())
            .insert("transitType".into(), value.pass_kit_name().into());
        self
    }

    pub fn header_fields(self) -> FieldsBuilder<'a> {
        self.fields("headerFields")
    }

    pub fn primary_fields(self) -> FieldsBuilder<'a> {
        self.fields("primaryFields")
    }

    pub fn secondary_fields(self) -> FieldsBuilder<'a> {
        self.fields("secondaryFields")
    }

    pub fn auxiliary_fields(self) -> FieldsBuilder<'a> {
        self.fields("auxiliaryFields")
    }

    /// Fields shown on the back of the pass.
    pub fn back_fields(self) -> FieldsBuilder<'a> {
        self.fields("backFields")
    }

    fn fields(self, collection: &'static str) -> FieldsBuilder<'a> {
        FieldsBuilder {
            doc: self.doc,
            style: self.style,
            collection,
        }
    }
}

/// View over one field collection of a style.
#[derive(Debug)]
pub struct FieldsBuilder<'a> {
    doc: &'a mut AttributeDocument,
    style: StyleKey,
    collection: &'static str,
}

impl FieldsBuilder<'_> {
    /// Starts a new field with the given stable key and returns a view bound
    /// to it. Key uniqueness within the collection is not validated.
    pub fn add(&mut self, key: &str) -> FieldBuilder<'_> {
        let slot = self.doc.append_bag_item(self.style.key(), self.collection);
        slot.insert("key".into(), key.into());
        FieldBuilder { slot }
    }

    /// Shorthand for the common key/label/value triple.
    pub fn add_text(&mut self, key: &str, label: &str, value: &str) -> &mut Self {
        self.add(key).label(label).value(value);
        self
    }
}

/// View over a single field's sub-document.
///
/// Every setter targets the field started by the preceding
/// [`add`](FieldsBuilder::add) call.
#[derive(Debug)]
pub struct FieldBuilder<'a> {
    slot: &'a mut Map<String, Value>,
}

impl FieldBuilder<'_> {
    fn set(self, name: &str, value: Value) -> Self {
        self.slot.insert(name.into(), value);
        self
    }

    /// Label text for the field.
    pub fn label(self, value: &str) -> Self {
        self.set("label", value.into())
    }

    /// Value of the field.
    pub fn value(self, value: &str) -> Self {
        self.set("value", value.into())
    }

    /// Numeric value of the field.
    pub fn value_number(self, value: f64) -> Self {
        self.set("value", value.into())
    }

    /// Integer value of the field.
    pub fn value_integer(self, value: i64) -> Self {
        self.set("value", value.into())
    }

    /// Date value of the field, encoded as UTC ISO-8601.
    pub fn value_date<Tz: TimeZone>(self, value: &DateTime<Tz>) -> Self {
        let encoded = encode_date(value);
        self.set("value", encoded.into())
    }

    /// Attributed (HTML-anchor) value; overrides `value` for display.
    pub fn attributed_value(self, value: &str) -> Self {
        self.set("attributedValue", value.into())
    }

    /// Format string for the update alert, containing the `%@` escape.
    /// Without it the user is not notified when the field changes.
    pub fn change_message(self, value: &str) -> Self {
        self.set("changeMessage", value.into())
    }

    /// Alignment for the field's contents.
    pub fn text_alignment(self, value: TextAlignment) -> Self {
        self.set("textAlignment", value.pass_kit_name().into())
    }

    /// Data detectors applied to the field's value.
    pub fn data_detector_types(self, values: &[DataDetectorType]) -> Self {
        let names: Vec<Value> = values
            .iter()
            .map(|detector| Value::from(detector.pass_kit_name()))
            .collect();
        self.set("dataDetectorTypes", Value::Array(names))
    }

    /// Style of date to display.
    pub fn date_style(self, value: DateStyle) -> Self {
        self.set("dateStyle", value.pass_kit_name().into())
    }

    /// Style of time to display.
    pub fn time_style(self, value: DateStyle) -> Self {
        self.set("timeStyle", value.pass_kit_name().into())
    }

    /// Always display the value in the encoded time zone instead of the
    /// user's current one.
    pub fn ignores_time_zone(self, value: bool) -> Self {
        self.set("ignoresTimeZone", value.into())
    }

    /// Display the value as a relative date rather than an absolute one.
    pub fn is_relative(self, value: bool) -> Self {
        self.set("isRelative", value.into())
    }

    /// ISO 4217 currency code for the field's value.
    pub fn currency_code(self, value: &str) -> Self {
        self.set("currencyCode", value.into())
    }

    /// Style of number to display.
    pub fn number_style(self, value: NumberStyle) -> Self {
        self.set("numberStyle", value.pass_kit_name().into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn as_value(pass: &Pass) -> Value {
        serde_json::from_slice(&pass.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_standard_seeds_format_version() {
        let mut pass = Pass::new();
        pass.standard().serial_number("001");
        let value = as_value(&pass);
        assert_eq!(value["formatVersion"], json!(1));
        assert_eq!(value["serialNumber"], json!("001"));
    }

    #[test]
    fn test_setters_overwrite() {
        let mut pass = Pass::new();
        pass.standard().description("first").description("second");
        assert_eq!(as_value(&pass)["description"], json!("second"));
    }

    #[test]
    fn test_repeatable_setters_append() {
        let mut pass = Pass::new();
        pass.relevance()
            .location(Location::new(37.6189722, -122.3748889))
            .location(Location::new(37.33182, -122.03118))
            .beacon(Beacon::new("uuid-1"));
        let value = as_value(&pass);
        assert_eq!(value["locations"].as_array().unwrap().len(), 2);
        assert_eq!(value["beacons"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_well_formed_pass_has_one_style_key() {
        let mut pass = Pass::new();
        pass.standard().serial_number("001");
        pass.event_ticket().primary_fields().add("event").value("The Beat Goes On");
        let value = as_value(&pass);
        let style_keys = ["boardingPass", "coupon", "eventTicket", "generic", "storeCard"];
        let populated: Vec<&str> = style_keys
            .iter()
            .copied()
            .filter(|key| value.get(key).is_some())
            .collect();
        assert_eq!(populated, vec!["eventTicket"]);
    }

    #[test]
    fn test_style_exclusivity_is_not_enforced() {
        // The builder trusts the caller; both subtrees end up populated.
        let mut pass = Pass::new();
        pass.coupon().primary_fields().add("a");
        pass.store_card().primary_fields().add("b");
        let value = as_value(&pass);
        assert!(value.get("coupon").is_some());
        assert!(value.get("storeCard").is_some());
    }

    #[test]
    fn test_field_setters_target_current_field() {
        let mut pass = Pass::new();
        let mut fields = pass.coupon().primary_fields();
        fields.add("offer").label("Any premium dog food").value("20% off");
        fields.add("expires").is_relative(true).date_style(DateStyle::Short);
        let value = as_value(&pass);
        assert_eq!(
            value["coupon"]["primaryFields"],
            json!([
                {"key": "offer", "label": "Any premium dog food", "value": "20% off"},
                {"key": "expires", "isRelative": true, "dateStyle": "PKDateStyleShort"},
            ])
        );
    }

    #[test]
    fn test_field_collections_land_in_own_lists() {
        let mut pass = Pass::new();
        pass.boarding_pass().transit_type(TransitType::Air);
        pass.boarding_pass().primary_fields().add("origin").value("SFO");
        pass.boarding_pass().back_fields().add("terms").value("...");
        let value = as_value(&pass);
        assert_eq!(value["boardingPass"]["transitType"], json!("PKTransitTypeAir"));
        assert_eq!(value["boardingPass"]["primaryFields"][0]["key"], json!("origin"));
        assert_eq!(value["boardingPass"]["backFields"][0]["key"], json!("terms"));
    }

    #[test]
    fn test_add_text_shorthand() {
        let mut pass = Pass::new();
        pass.generic()
            .secondary_fields()
            .add_text("loc", "LOCATION", "Moscone West")
            .add_text("time", "TIME", "10:00");
        let value = as_value(&pass);
        assert_eq!(value["generic"]["secondaryFields"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_date_fields_encode_utc() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0).unwrap();
        let mut pass = Pass::new();
        pass.expiration().expiration_date(&date).voided(false);
        pass.relevance().relevant_date(&date);
        let value = as_value(&pass);
        assert_eq!(value["expirationDate"], json!("2024-06-01T12:30:00Z"));
        assert_eq!(value["relevantDate"], json!("2024-06-01T12:30:00Z"));
        assert_eq!(value["voided"], json!(false));
    }

    #[test]
    fn test_nfc_is_single_valued() {
        let mut pass = Pass::new();
        pass.nfc(Nfc::new("first"));
        pass.nfc(Nfc::new("second"));
        assert_eq!(as_value(&pass)["nfc"], json!({"message": "second"}));
    }

    #[test]
    fn test_associated_and_companion_app() {
        let mut pass = Pass::new();
        pass.associated_app()
            .app_launch_url("myapp://open")
            .associated_store_identifiers(&[123456789]);
        pass.companion_app().user_info(json!({"k": "v"}));
        let value = as_value(&pass);
        assert_eq!(value["appLaunchURL"], json!("myapp://open"));
        assert_eq!(value["associatedStoreIdentifiers"], json!([123456789]));
        assert_eq!(value["userInfo"], json!({"k": "v"}));
    }

    #[test]
    fn test_serialize_twice_is_identical() {
        let mut pass = Pass::new();
        pass.standard().serial_number("001").description("demo");
        pass.store_card().primary_fields().add("balance").value_number(25.0);
        assert_eq!(pass.to_json().unwrap(), pass.to_json().unwrap());
    }

    #[test]
    fn test_unset_optionals_are_absent() {
        let mut pass = Pass::new();
        pass.standard().serial_number("001");
        let value = as_value(&pass);
        assert!(value.get("description").is_none());
        assert!(value.get("webServiceURL").is_none());
        let text = String::from_utf8(pass.to_json().unwrap()).unwrap();
        assert!(!text.contains("null"));
    }
}
