//! PassKit web-service protocol support.
//!
//! Implements the request-routing side of Apple's three-endpoint update
//! protocol: device registration, pass refresh, and diagnostic logs. The
//! storage and push-notification sides live behind the [`PassKitService`]
//! trait and are supplied by the host application.

pub mod router;
pub mod service;

pub use router::PassKitRouter;
pub use service::PassKitService;
