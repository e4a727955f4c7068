//! Signing credentials and detached CMS signature generation.

pub mod cms;
pub mod credentials;

pub use cms::sign_detached;
pub use credentials::SigningCredentials;
