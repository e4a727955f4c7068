//! Apple Wallet (PassKit) pass generation and signing.
//!
//! This crate builds `pass.json` documents with a hierarchical builder API,
//! assembles them together with image assets into signed `.pkpass` archives,
//! and implements the request-routing side of the PassKit web-service
//! protocol (device registration, pass refresh, log submission).
//!
//! # Example
//!
//! ```no_run
//! use pkpass::{Pass, PassPackage, SigningCredentials};
//! use pkpass::package::{ImageDensity, ImageRole};
//! use pkpass::pass::{Barcode, BarcodeFormat};
//!
//! let mut pass = Pass::new();
//! pass.standard()
//!     .pass_type_identifier("pass.com.example.demo")
//!     .team_identifier("AB12CD34EF")
//!     .organization_name("Example")
//!     .serial_number("0001")
//!     .description("Demo pass");
//! pass.visual_appearance()
//!     .barcode(Barcode::new("1234567890128", BarcodeFormat::Code128))
//!     .background_color("rgb(149, 165, 166)");
//! pass.store_card().primary_fields().add("balance").label("Balance").value("$25.00");
//!
//! let p12 = std::fs::read("pass.p12")?;
//! let wwdr = std::fs::read("AppleWWDRCA.cer")?;
//! let credentials = SigningCredentials::from_p12(&p12, "password")?
//!     .with_intermediate_bytes(&wwdr)?;
//!
//! let mut package = PassPackage::new(pass);
//! package.add_image(ImageRole::Icon, ImageDensity::Standard, std::fs::read("icon.png")?)?;
//! let archive = package.sign_and_build(&credentials)?;
//! std::fs::write("demo.pkpass", archive)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod crypto;
pub mod error;
pub mod package;
pub mod pass;
pub mod web;

pub use crypto::SigningCredentials;
pub use error::Error;
pub use package::{PassPackage, PKPASS_MIME_TYPE};
pub use pass::Pass;
pub use web::{PassKitRouter, PassKitService};

pub type Result<T> = std::result::Result<T, Error>;
