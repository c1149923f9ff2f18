//! Device type definitions for bridged endpoints.
//!
//! Device type tags are registered with each endpoint and published by the
//! stack in the Descriptor cluster's DeviceTypeList.

/// A device type tag: id plus revision.
///
/// Same shape as `rs_matter::dm::DeviceType`, so the constants below carry
/// over unchanged to a stack built on rs-matter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceType {
    pub dtype: u32,
    pub drev: u16,
}

/// Matter Bridged Node device type
///
/// Device Type ID: 0x0013 (19 decimal)
/// Device Type Revision: 1
///
/// Required clusters:
/// - BridgedDeviceBasicInformation (0x0039)
/// - Descriptor (standard)
///
/// Added to bridged device endpoints alongside their functional device type.
pub const DEV_TYPE_BRIDGED_NODE: DeviceType = DeviceType {
    dtype: 0x0013,
    drev: 1,
};

/// Matter Aggregator device type (for bridge root)
///
/// Device Type ID: 0x000E (14 decimal)
///
/// The parent endpoint that enumerates bridged devices.
pub const DEV_TYPE_AGGREGATOR: DeviceType = DeviceType {
    dtype: 0x000E,
    drev: 1,
};

/// Matter Temperature Sensor device type
///
/// Device Type ID: 0x0302 (770 decimal)
///
/// Required clusters:
/// - TemperatureMeasurement (0x0402)
pub const DEV_TYPE_TEMPERATURE_SENSOR: DeviceType = DeviceType {
    dtype: 0x0302,
    drev: 2,
};

/// Matter Humidity Sensor device type
///
/// Device Type ID: 0x0307 (775 decimal)
///
/// Required clusters:
/// - RelativeHumidityMeasurement (0x0405)
pub const DEV_TYPE_HUMIDITY_SENSOR: DeviceType = DeviceType {
    dtype: 0x0307,
    drev: 2,
};

/// Matter Occupancy Sensor device type
///
/// Device Type ID: 0x0107 (263 decimal)
///
/// Required clusters:
/// - OccupancySensing (0x0406)
pub const DEV_TYPE_OCCUPANCY_SENSOR: DeviceType = DeviceType {
    dtype: 0x0107,
    drev: 1,
};

/// Matter On/Off Plug-in Unit device type
///
/// Device Type ID: 0x010A (266 decimal)
///
/// Required clusters:
/// - OnOff (0x0006)
pub const DEV_TYPE_ON_OFF_PLUG_IN_UNIT: DeviceType = DeviceType {
    dtype: 0x010A,
    drev: 2,
};
