// Accessory kinds, dispatch and state rendering
pub mod accessory;

// Runtime owning the registry
pub mod bridge;

// Configuration loading
pub mod config;

// Device records and identifiers
pub mod device;

// Vendor constants
pub mod dictionary;

// Error types
pub mod error;

// Snapshot and message payloads
pub mod message;

// Structural patch engine
pub mod patch;

// Device registry
pub mod registry;
