// Vendor vocabulary used when interpreting device payloads

/// Field names inside device records and message envelopes
pub mod field {
    pub const ID: &str = "Id";
    pub const NAME: &str = "Name";
    pub const TYPE: &str = "Type";
    pub const EQUIPMENT_CODE: &str = "EquipmentCode";
    pub const STATUS: &str = "Status";
    pub const VALUE: &str = "Value";
    pub const BATTERY_LEVEL: &str = "BatteryLevel";
    pub const LOW_BATTERY: &str = "LowBattery";
    pub const TAMPER: &str = "Tamper";
    pub const SERIAL_NUMBER: &str = "SerialNumber";
    pub const SERIAL_NUMBER_32BIT: &str = "SerialNumber32Bit";
    pub const ACTUAL_TYPE: &str = "ActualType";
    pub const CURRENT_SOFTWARE_VERSION: &str = "CurrentSoftwareVersion";
    pub const SOFTWARE_VERSION: &str = "SoftwareVersion";
    pub const OPERATING_STATE: &str = "OperatingState";
    pub const OPERATING_MODE: &str = "OperatingMode";
    pub const CURRENT_TEMPERATURE: &str = "CurrentTemperature";
    pub const COOL_SET_POINT: &str = "CoolSetPoint";
    pub const HEAT_SET_POINT: &str = "HeatSetPoint";
    pub const HUMIDITY: &str = "Humidity";
    pub const VISITOR_DETECTED: &str = "VisitorDetected";
}

/// `Type` values of panel devices
pub mod device_type {
    pub const WIRELESS_SENSOR: &str = "wireless_sensor";
    pub const DOOR_LOCK: &str = "door_lock_device";
    pub const THERMOSTAT: &str = "thermostat_device";
    pub const GARAGE_DOOR: &str = "garage_door_device";
    pub const PANEL: &str = "primary_touch_link_device";
    pub const CAMERA: &str = "camera_device";
    pub const BINARY_SWITCH: &str = "binary_switch";
    pub const MULTILEVEL_SWITCH: &str = "multilevel_switch";

    /// Types that never map to an accessory
    pub const IRRELEVANT: &[&str] = &[
        "sensor_group",
        "network_hosts_service",
        "panel_diagnostics_service",
        "iot_service",
        "scheduler_service",
        "yofi_device",
        "keyfob_device",
    ];
}

/// `Type` of real-time message envelopes carrying free-text alerts
pub const INBOX_MESSAGE_TYPE: &str = "inbox_message";

/// Markers in the subject of a lock-failure alert: `Alert: <name> failed to lock`
pub const JAM_ALERT_PREFIX: &str = "Alert: ";
pub const JAM_ALERT_SUFFIX: &str = " failed to lock";

/// `Status` written onto a lock when a jam alert is resolved to it
pub const LOCK_JAMMED_STATUS: i64 = 2;

/// Wireless sensor equipment codes, grouped by the accessory they become
pub mod equipment_code {
    pub const CONTACT: &[i64] = &[
        DW21R_RECESSED_DOOR,
        DW10_THIN_DOOR_WINDOW,
        DW11_THIN_DOOR_WINDOW,
        DW20_RECESSED_DOOR,
        EXISTING_DOOR_WINDOW_CONTACT,
        TAKE_TAKEOVER,
        GB1_GLASS_BREAK,
        GB2_GLASS_BREAK,
        EXISTING_GLASS_BREAK,
        HW_GLASS_BREAK_5853,
        TILT_SENSOR_2GIG_345,
        EXISTING_HEAT,
        EXISTING_FLOOD_TEMP,
    ];

    pub const SMOKE: &[i64] = &[
        FIREFIGHTER_AUDIO_DETECTOR,
        HW_SMOKE_5808W3,
        EXISTING_SMOKE,
        SMKE1_SMOKE_CANADA,
        SMKE1_SMOKE,
        VS_SMKT_SMOKE_DETECTOR,
        SMKT2_GE_SMOKE_HEAT,
        SMKT3_2GIG,
        SMKT6_2GIG,
    ];

    pub const CARBON_MONOXIDE: &[i64] = &[
        VS_CO3_DETECTOR,
        EXISTING_CO,
        CO1_CO_CANADA,
        CO1_CO,
        CO3_2GIG_CO,
        CARBON_MONOXIDE_DETECTOR_345_MHZ,
    ];

    pub const MOTION: &[i64] = &[PIR1_MOTION, PIR2_MOTION, EXISTING_MOTION_DETECTOR];

    /// Dictionary name of an equipment code, used as the accessory model
    pub fn name_of(code: i64) -> Option<&'static str> {
        NAMES.iter().find(|(c, _)| *c == code).map(|(_, name)| *name)
    }

    const NAMES: &[(i64, &str)] = &[
        (DW21R_RECESSED_DOOR, "DW21R_RECESSED_DOOR"),
        (DW10_THIN_DOOR_WINDOW, "DW10_THIN_DOOR_WINDOW"),
        (DW11_THIN_DOOR_WINDOW, "DW11_THIN_DOOR_WINDOW"),
        (DW20_RECESSED_DOOR, "DW20_RECESSED_DOOR"),
        (EXISTING_DOOR_WINDOW_CONTACT, "EXISTING_DOOR_WINDOW_CONTACT"),
        (TAKE_TAKEOVER, "TAKE_TAKEOVER"),
        (GB1_GLASS_BREAK, "GB1_GLASS_BREAK"),
        (GB2_GLASS_BREAK, "GB2_GLASS_BREAK"),
        (EXISTING_GLASS_BREAK, "EXISTING_GLASS_BREAK"),
        (HW_GLASS_BREAK_5853, "HW_GLASS_BREAK_5853"),
        (TILT_SENSOR_2GIG_345, "TILT_SENSOR_2GIG_345"),
        (EXISTING_HEAT, "EXISTING_HEAT"),
        (EXISTING_FLOOD_TEMP, "EXISTING_FLOOD_TEMP"),
        (FIREFIGHTER_AUDIO_DETECTOR, "FIREFIGHTER_AUDIO_DETECTOR"),
        (HW_SMOKE_5808W3, "HW_SMOKE_5808W3"),
        (EXISTING_SMOKE, "EXISTING_SMOKE"),
        (SMKE1_SMOKE_CANADA, "SMKE1_SMOKE_CANADA"),
        (SMKE1_SMOKE, "SMKE1_SMOKE"),
        (VS_SMKT_SMOKE_DETECTOR, "VS_SMKT_SMOKE_DETECTOR"),
        (SMKT2_GE_SMOKE_HEAT, "SMKT2_GE_SMOKE_HEAT"),
        (SMKT3_2GIG, "SMKT3_2GIG"),
        (SMKT6_2GIG, "SMKT6_2GIG"),
        (VS_CO3_DETECTOR, "VS_CO3_DETECTOR"),
        (EXISTING_CO, "EXISTING_CO"),
        (CO1_CO_CANADA, "CO1_CO_CANADA"),
        (CO1_CO, "CO1_CO"),
        (CO3_2GIG_CO, "CO3_2GIG_CO"),
        (CARBON_MONOXIDE_DETECTOR_345_MHZ, "CARBON_MONOXIDE_DETECTOR_345_MHZ"),
        (PIR1_MOTION, "PIR1_MOTION"),
        (PIR2_MOTION, "PIR2_MOTION"),
        (EXISTING_MOTION_DETECTOR, "EXISTING_MOTION_DETECTOR"),
    ];

    pub const DW21R_RECESSED_DOOR: i64 = 1249;
    pub const DW10_THIN_DOOR_WINDOW: i64 = 1251;
    pub const DW11_THIN_DOOR_WINDOW: i64 = 1252;
    pub const DW20_RECESSED_DOOR: i64 = 1248;
    pub const EXISTING_DOOR_WINDOW_CONTACT: i64 = 1128;
    pub const TAKE_TAKEOVER: i64 = 1263;
    pub const GB1_GLASS_BREAK: i64 = 864;
    pub const GB2_GLASS_BREAK: i64 = 1247;
    pub const EXISTING_GLASS_BREAK: i64 = 475;
    pub const HW_GLASS_BREAK_5853: i64 = 1144;
    pub const TILT_SENSOR_2GIG_345: i64 = 1061;
    pub const EXISTING_HEAT: i64 = 708;
    pub const EXISTING_FLOOD_TEMP: i64 = 556;

    pub const FIREFIGHTER_AUDIO_DETECTOR: i64 = 1269;
    pub const HW_SMOKE_5808W3: i64 = 1058;
    pub const EXISTING_SMOKE: i64 = 692;
    pub const SMKE1_SMOKE_CANADA: i64 = 1266;
    pub const SMKE1_SMOKE: i64 = 1267;
    pub const VS_SMKT_SMOKE_DETECTOR: i64 = 2002;
    pub const SMKT2_GE_SMOKE_HEAT: i64 = 1026;
    pub const SMKT3_2GIG: i64 = 1066;
    pub const SMKT6_2GIG: i64 = 1067;

    pub const VS_CO3_DETECTOR: i64 = 1242;
    pub const EXISTING_CO: i64 = 691;
    pub const CO1_CO_CANADA: i64 = 1257;
    pub const CO1_CO: i64 = 1258;
    pub const CO3_2GIG_CO: i64 = 1254;
    pub const CARBON_MONOXIDE_DETECTOR_345_MHZ: i64 = 1253;

    pub const PIR1_MOTION: i64 = 609;
    pub const PIR2_MOTION: i64 = 1236;
    pub const EXISTING_MOTION_DETECTOR: i64 = 1233;
}

/// Panel arm state as reported in the system-level `Status`
pub mod security_state {
    pub const DISARMED: i64 = 0;
    pub const ARMING_AWAY_IN_EXIT_DELAY: i64 = 1;
    pub const ARMING_STAY_IN_EXIT_DELAY: i64 = 2;
    pub const ARMED_STAY: i64 = 3;
    pub const ARMED_AWAY: i64 = 4;
    pub const ARMED_STAY_IN_ENTRY_DELAY: i64 = 5;
    pub const ARMED_AWAY_IN_ENTRY_DELAY: i64 = 6;
    pub const ALARM: i64 = 7;
    pub const ALARM_FIRE: i64 = 8;
    pub const DISABLED: i64 = 11;
    pub const WALK_TEST: i64 = 12;
}

/// Garage door `Status` values
pub mod garage_door_state {
    pub const UNKNOWN: i64 = 0;
    pub const CLOSED: i64 = 1;
    pub const CLOSING: i64 = 2;
    pub const STOPPED: i64 = 3;
    pub const OPENING: i64 = 4;
    pub const OPENED: i64 = 5;
}

/// Thermostat `OperatingState` values
pub mod operating_state {
    pub const IDLE: i64 = 0;
    pub const HEATING: i64 = 1;
    pub const COOLING: i64 = 2;
}

/// Thermostat `OperatingMode` values
pub mod operating_mode {
    pub const OFF: i64 = 0;
    pub const HEAT: i64 = 1;
    pub const COOL: i64 = 2;
    pub const AUTO: i64 = 3;
    pub const ECO: i64 = 100;
}
