// Device records and their change notifications

mod id;
mod record;

pub use id::DeviceId;
pub use record::{Device, DeviceUpdate};
