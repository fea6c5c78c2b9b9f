//! In-memory [`RouterClient`] that records calls and replays scripted
//! responses. Enabled with the `fake` feature.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::client::RouterClient;
use crate::error::RouterError;
use crate::types::{Dataset, Landevice, MonitorConfig, SubsetData};

/// Router capability, used to script failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Connect,
    GetLandevices,
    GetMonitorConfig,
    GetMonitorDatasets,
    GetMonitorData,
    BlockDevice,
}

/// One recorded call with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterCall {
    Connect,
    GetLandevices,
    GetMonitorConfig,
    GetMonitorDatasets,
    GetMonitorData { dataset: String, subset: String },
    BlockDevice { identifier: String, block: bool },
}

#[derive(Debug, Default)]
struct FakeState {
    landevices: Vec<Landevice>,
    monitor_config: MonitorConfig,
    datasets: Vec<Dataset>,
    monitor_data: Vec<SubsetData>,
    failures: HashMap<Operation, String>,
    calls: Vec<RouterCall>,
}

#[derive(Debug, Default)]
pub struct FakeRouterClient {
    state: Mutex<FakeState>,
}

impl FakeRouterClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn with_landevices(self, landevices: Vec<Landevice>) -> Self {
        self.state().landevices = landevices;
        self
    }

    pub fn with_monitor_config(self, uids: &str) -> Self {
        self.state().monitor_config = MonitorConfig {
            display_homenet_devices: uids.to_string(),
        };
        self
    }

    pub fn with_datasets(self, datasets: Vec<Dataset>) -> Self {
        self.state().datasets = datasets;
        self
    }

    pub fn with_monitor_data(self, data: Vec<SubsetData>) -> Self {
        self.state().monitor_data = data;
        self
    }

    /// Make every call to `op` fail with an API error carrying `message`.
    pub fn failing(self, op: Operation, message: &str) -> Self {
        self.state().failures.insert(op, message.to_string());
        self
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<RouterCall> {
        self.state().calls.clone()
    }

    /// Arguments of every `block_device` call, in order.
    pub fn block_calls(&self) -> Vec<(String, bool)> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                RouterCall::BlockDevice { identifier, block } => Some((identifier.clone(), *block)),
                _ => None,
            })
            .collect()
    }

    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    /// Record `call` and return the scripted failure for `op`, if any.
    fn record(&self, op: Operation, call: RouterCall) -> Result<MutexGuard<'_, FakeState>, RouterError> {
        let mut state = self.state();
        state.calls.push(call);
        match state.failures.get(&op) {
            Some(message) => Err(RouterError::Api {
                status: 500,
                body: message.clone(),
            }),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl RouterClient for FakeRouterClient {
    async fn connect(&self) -> Result<(), RouterError> {
        let _state = self.record(Operation::Connect, RouterCall::Connect)?;
        Ok(())
    }

    async fn get_landevices(&self) -> Result<Vec<Landevice>, RouterError> {
        let state = self.record(Operation::GetLandevices, RouterCall::GetLandevices)?;
        Ok(state.landevices.clone())
    }

    async fn get_monitor_config(&self) -> Result<MonitorConfig, RouterError> {
        let state = self.record(Operation::GetMonitorConfig, RouterCall::GetMonitorConfig)?;
        Ok(state.monitor_config.clone())
    }

    async fn get_monitor_datasets(&self) -> Result<Vec<Dataset>, RouterError> {
        let state = self.record(Operation::GetMonitorDatasets, RouterCall::GetMonitorDatasets)?;
        Ok(state.datasets.clone())
    }

    async fn get_monitor_data(
        &self,
        dataset: &str,
        subset: &str,
    ) -> Result<Vec<SubsetData>, RouterError> {
        let call = RouterCall::GetMonitorData {
            dataset: dataset.to_string(),
            subset: subset.to_string(),
        };
        let state = self.record(Operation::GetMonitorData, call)?;
        Ok(state.monitor_data.clone())
    }

    async fn block_device(&self, identifier: &str, block: bool) -> Result<(), RouterError> {
        let call = RouterCall::BlockDevice {
            identifier: identifier.to_string(),
            block,
        };
        let _state = self.record(Operation::BlockDevice, call)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[tokio::test]
    async fn records_calls_in_order() {
        let fake = FakeRouterClient::new().with_monitor_config("landevice1");

        fake.connect().await.unwrap();
        let config = fake.get_monitor_config().await.unwrap();
        fake.block_device("user1", true).await.unwrap();

        assert_eq!(config.display_homenet_devices, "landevice1");
        assert_eq!(
            fake.calls(),
            vec![
                RouterCall::Connect,
                RouterCall::GetMonitorConfig,
                RouterCall::BlockDevice {
                    identifier: "user1".to_string(),
                    block: true
                },
            ]
        );
        assert_eq!(fake.block_calls(), vec![("user1".to_string(), true)]);
    }

    #[tokio::test]
    async fn scripted_failures_are_still_recorded() {
        let fake = FakeRouterClient::new().failing(Operation::BlockDevice, "boom");

        assert_matches!(
            fake.block_device("user1", false).await,
            Err(RouterError::Api { status: 500, ref body }) if body == "boom"
        );
        assert_eq!(fake.block_calls(), vec![("user1".to_string(), false)]);
    }
}
