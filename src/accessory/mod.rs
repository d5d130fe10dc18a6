// Device classes, accessory bootstrap and normalized state rendering

mod context;
mod kind;
mod state;

pub use context::{
    create_device_accessory, infer_category, infer_switch_service, reconcile_accessories,
    AccessoryContext, AccessoryPlan, Category, SwitchService,
};
pub use kind::DeviceKind;
pub use state::{
    AccessoryState, BatteryStatus, ContactState, DoorState, DoorTarget, HeatingCooling, LockState,
    SecurityState, ThermostatState,
};
