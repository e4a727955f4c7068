//! External pass service contract.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use http::StatusCode;

/// Backing service for the web-service router.
///
/// Implementations own device registrations, pass versions, and push
/// delivery. Each operation returns the HTTP status the router should relay;
/// the conventions are 200 for success with content, 201 created, 204/304
/// success without content, 400 malformed, 401 unauthorized. Concurrency
/// safety is the implementation's responsibility; the router holds no state
/// of its own across requests.
#[async_trait]
pub trait PassKitService: Send + Sync {
    /// Registers a device to receive push notifications for a pass.
    async fn register_device(
        &self,
        device_id: &str,
        pass_type: &str,
        serial: &str,
        auth_token: &str,
        push_token: &str,
    ) -> StatusCode;

    /// Removes a device's registration for a pass.
    async fn unregister_device(
        &self,
        device_id: &str,
        pass_type: &str,
        serial: &str,
        auth_token: &str,
    ) -> StatusCode;

    /// Serial numbers of the device's passes updated since the given tag.
    ///
    /// On 200 the returned serial list and new freshness tag are rendered to
    /// the client; any other status is relayed with an empty body.
    async fn get_associated_passes(
        &self,
        device_id: &str,
        pass_type: &str,
        updated_since: Option<&str>,
    ) -> (StatusCode, Option<Vec<String>>, Option<String>);

    /// The current `.pkpass` archive for a pass.
    ///
    /// On 200 the implementation MUST supply both the pass content and its
    /// last-modified timestamp; the router treats a violation as a fatal
    /// contract error, not a client error.
    async fn get_pass(
        &self,
        pass_type: &str,
        serial: &str,
        auth_token: &str,
        if_modified_since: Option<DateTime<Utc>>,
    ) -> (StatusCode, Option<Vec<u8>>, Option<DateTime<Utc>>);

    /// Stores diagnostic log lines reported by devices.
    async fn process_logs(&self, logs: Vec<String>);
}
