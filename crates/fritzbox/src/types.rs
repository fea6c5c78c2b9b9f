//! Wire types of the Fritz!Box REST API (`/api/v0`).

use homegate_core::mac::normalize_mac;
use serde::{Deserialize, Serialize};

/// A device known to the router's home network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Landevice {
    #[serde(rename = "UID", default)]
    pub uid: String,
    #[serde(default)]
    pub friendly_name: String,
    #[serde(default)]
    pub mac: String,
    #[serde(default)]
    pub active: String,
    /// Owning user profile(s). Empty when the device has no profile.
    #[serde(rename = "user_UIDs", default)]
    pub user_uids: String,
    /// `"1"` when internet access is currently blocked.
    #[serde(default)]
    pub blocked: String,
}

impl Landevice {
    pub fn is_blocked(&self) -> bool {
        self.blocked == "1"
    }

    pub fn normalized_mac(&self) -> String {
        normalize_mac(&self.mac)
    }
}

/// Body of `GET /api/v0/landevice`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LandeviceResponse {
    #[serde(default)]
    pub landevice: Vec<Landevice>,
}

/// Body of `GET /api/v0/monitor/configuration`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Comma-separated landevice UIDs shown in the online monitor.
    #[serde(rename = "displayHomenetDevices", default)]
    pub display_homenet_devices: String,
}

impl MonitorConfig {
    /// The configured UIDs, in order, without blanks.
    pub fn device_uids(&self) -> Vec<String> {
        self.display_homenet_devices
            .split(',')
            .map(str::trim)
            .filter(|uid| !uid.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(rename = "dataSources", default)]
    pub data_sources: Vec<DataSource>,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub subsets: Vec<Subset>,
    #[serde(rename = "UID", default)]
    pub uid: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    #[serde(rename = "landeviceUid", default)]
    pub landevice_uid: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(rename = "dataSourceName", default)]
    pub data_source_name: String,
    #[serde(default)]
    pub unit: String,
}

/// A time-series bucket at one sampling granularity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subset {
    #[serde(default)]
    pub duration: f64,
    #[serde(rename = "sampleInterval", default)]
    pub sample_interval: f64,
    #[serde(rename = "UID", default)]
    pub uid: String,
}

/// One data source's measurements within a subset, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubsetData {
    #[serde(default)]
    pub timestamp: String,
    /// `rcv_<mac>` or `snd_<mac>`, MAC normalized.
    #[serde(rename = "dataSourceName", default)]
    pub data_source_name: String,
    #[serde(default)]
    pub measurements: Vec<f64>,
}

impl SubsetData {
    pub fn new(data_source_name: impl Into<String>, measurements: Vec<f64>) -> Self {
        Self {
            timestamp: String::new(),
            data_source_name: data_source_name.into(),
            measurements,
        }
    }
}
