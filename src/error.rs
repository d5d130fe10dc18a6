use crate::device::DeviceId;
use thiserror::Error;

/// Errors surfaced by the synchronization core
///
/// Unknown device identifiers and stale messages are not errors; they are
/// dropped by the registry and only logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SyncError {
    /// A snapshot or patch was routed to a record it does not belong to
    #[error("{kind} for device {found} does not belong to device {expected}")]
    IdentityMismatch {
        kind: &'static str,
        expected: DeviceId,
        found: String,
    },

    /// Accessory context names a device class outside the known set
    #[error("unknown device class name '{0}'")]
    UnknownDeviceClass(String),

    /// Timestamp could not be converted to the canonical representation
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
