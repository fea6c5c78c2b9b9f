use async_trait::async_trait;

use crate::error::RouterError;
use crate::types::{Dataset, Landevice, MonitorConfig, SubsetData};

/// Router capabilities used by the monitor.
///
/// Calls are issued one at a time and carry no caller-side timeout; any
/// timeout belongs to the implementation.
#[async_trait]
pub trait RouterClient: Send + Sync {
    /// Authenticate and open a session.
    async fn connect(&self) -> Result<(), RouterError>;

    async fn get_landevices(&self) -> Result<Vec<Landevice>, RouterError>;

    async fn get_monitor_config(&self) -> Result<MonitorConfig, RouterError>;

    async fn get_monitor_datasets(&self) -> Result<Vec<Dataset>, RouterError>;

    /// Measurements of every data source in `dataset`/`subset`.
    async fn get_monitor_data(
        &self,
        dataset: &str,
        subset: &str,
    ) -> Result<Vec<SubsetData>, RouterError>;

    /// Block (`true`) or unblock (`false`) internet access for a user
    /// profile or device identifier.
    async fn block_device(&self, identifier: &str, block: bool) -> Result<(), RouterError>;
}
