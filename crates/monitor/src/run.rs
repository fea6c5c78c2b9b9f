//! Monitor orchestrator: one fetch, analyze, report and enforce pass.
//!
//! A run authenticates, loads the router's device list, resolves the target
//! devices, fetches one measurement subset and then walks the targets in
//! order. Config and router-call failures end the run (fatal); a target
//! without measurements or a failed block/unblock is recorded in the
//! summary and the run moves on (soft).

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use homegate_core::clock::Clock;
use homegate_core::error::CoreError;
use homegate_core::mac::normalize_mac;
use homegate_core::period::{Period, MONITOR_DATASET};
use homegate_core::policy::PolicyTable;
use homegate_core::summary::{DeviceUsage, Summary};
use homegate_core::types::LocalTime;
use homegate_core::usage::{self, DAILY_INTERVALS, TIMELINE_WINDOW};
use homegate_fritzbox::types::{Landevice, SubsetData};
use homegate_fritzbox::{RouterClient, RouterError};

use crate::error::{EnforcementAction, MonitorError, RunStep};
use crate::options::MonitorOptions;
use crate::report::{bracketed, Report};
use crate::state::RunState;

const RCV_PREFIX: &str = "rcv_";
const SND_PREFIX: &str = "snd_";

/// Result of one run. `error` is set when the run ended early; `summary`
/// then holds whatever was gathered before the failure.
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: Summary,
    pub state: RunState,
    pub error: Option<MonitorError>,
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Monitor {
    client: Arc<dyn RouterClient>,
    clock: Arc<dyn Clock>,
    options: MonitorOptions,
}

/// Validated run inputs.
struct RunPlan {
    period: Period,
    policy: Option<PolicyTable>,
}

struct Target {
    /// Normalized MAC.
    mac: String,
    name: String,
}

/// Mutable bookkeeping of a run in progress.
struct Progress {
    state: RunState,
    summary: Summary,
}

impl Progress {
    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_transition_to(&next),
            "invalid run transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(from = %self.state, to = %next, "Run state transition");
        self.state = next;
    }

    fn soft_error(&mut self, err: MonitorError) {
        tracing::warn!(kind = ?err.kind(), error = %err, "Device skipped or not enforced");
        self.summary.errors.push(err.to_string());
    }
}

/// Lookups shared by every target of a run.
struct RunContext<'a> {
    plan: &'a RunPlan,
    landevices: &'a [Landevice],
    user_index: &'a HashMap<String, String>,
    data: &'a [SubsetData],
    now: LocalTime,
}

impl Monitor {
    pub fn new(
        client: Arc<dyn RouterClient>,
        clock: Arc<dyn Clock>,
        options: MonitorOptions,
    ) -> Self {
        Self {
            client,
            clock,
            options,
        }
    }

    pub fn options(&self) -> &MonitorOptions {
        &self.options
    }

    /// Execute one run, writing the report to `out`.
    pub async fn run<W: Write + Send>(&self, out: &mut W) -> RunOutcome {
        let started = Instant::now();
        let start_time = Utc::now();
        let mut report = Report::new(out);
        let mut progress = Progress {
            state: RunState::Connecting,
            summary: Summary::default(),
        };

        let result = self.execute(&mut progress, &mut report).await;

        progress.summary.start_time = Some(start_time);
        progress.summary.duration = started.elapsed();

        let error = match result {
            Ok(()) => {
                progress.advance(RunState::Completed);
                tracing::info!(
                    devices_checked = progress.summary.devices_checked,
                    users_fetched = progress.summary.users_fetched,
                    errors = progress.summary.errors.len(),
                    "Monitor run completed",
                );
                None
            }
            Err(err) => {
                tracing::error!(state = %progress.state, error = %err, "Monitor run failed");
                progress.summary.errors.push(err.to_string());
                progress.advance(RunState::Failed(err.to_string()));
                Some(err)
            }
        };

        RunOutcome {
            summary: progress.summary,
            state: progress.state,
            error,
        }
    }

    async fn execute<W: Write>(
        &self,
        progress: &mut Progress,
        report: &mut Report<'_, W>,
    ) -> Result<(), MonitorError> {
        let plan = self.plan()?;

        report.line(format_args!("Connecting to Fritz!Box"));
        self.client
            .connect()
            .await
            .map_err(collaborator(RunStep::Connect))?;
        report.line(format_args!("Connected"));
        progress.advance(RunState::Authenticated);

        report.line(format_args!("Fetching landevices"));
        let landevices = self
            .client
            .get_landevices()
            .await
            .map_err(collaborator(RunStep::FetchLandevices))?;
        report.line(format_args!("Fetched {} devices", landevices.len()));

        let user_index = user_index(&landevices);
        progress.summary.devices_checked = landevices.len();
        progress.summary.users_fetched = user_index.len();
        progress.advance(RunState::DevicesFetched);

        progress.advance(match plan.policy {
            Some(_) => RunState::PolicyParsed,
            None => RunState::NoPolicy,
        });

        let targets = self.resolve_targets(&landevices, report).await?;
        tracing::info!(targets = targets.len(), period = %plan.period, "Resolved target devices");
        progress.advance(RunState::TargetsResolved);

        let data = self
            .client
            .get_monitor_data(MONITOR_DATASET, plan.period.subset_id())
            .await
            .map_err(collaborator(RunStep::FetchMonitorData))?;
        progress.advance(RunState::DataFetched);

        progress.advance(RunState::PerDeviceProcessing);
        let ctx = RunContext {
            plan: &plan,
            landevices: &landevices,
            user_index: &user_index,
            data: &data,
            now: self.clock.now(),
        };
        for target in &targets {
            self.process_target(&ctx, target, progress, report).await;
        }

        Ok(())
    }

    /// Check credentials, period and policy before touching the router.
    fn plan(&self) -> Result<RunPlan, MonitorError> {
        if self.options.username.is_empty() || self.options.password.is_empty() {
            return Err(MonitorError::MissingCredentials);
        }

        let period: Period = self
            .options
            .period
            .parse()
            .map_err(MonitorError::InvalidPeriod)?;

        let policy = self
            .options
            .policy
            .as_deref()
            .map(PolicyTable::parse)
            .transpose()
            .map_err(MonitorError::InvalidPolicy)?;

        Ok(RunPlan { period, policy })
    }

    async fn resolve_targets<W: Write>(
        &self,
        landevices: &[Landevice],
        report: &mut Report<'_, W>,
    ) -> Result<Vec<Target>, MonitorError> {
        if let Some(mac) = self.options.mac.as_deref().filter(|m| !m.trim().is_empty()) {
            return Ok(vec![Target {
                mac: normalize_mac(mac),
                name: mac.to_string(),
            }]);
        }

        let config = self
            .client
            .get_monitor_config()
            .await
            .map_err(collaborator(RunStep::FetchMonitorConfig))?;

        report.line(format_args!("No MAC specified, fetching configured devices"));
        let uids = config.device_uids();
        report.line(format_args!("Configured UIDs: {}", bracketed(&uids)));

        let mut targets = Vec::new();
        for uid in &uids {
            let Some(device) = landevices.iter().find(|d| &d.uid == uid) else {
                tracing::debug!(uid = %uid, "Configured device not in landevice list");
                continue;
            };
            let target = Target {
                mac: device.normalized_mac(),
                name: device.friendly_name.clone(),
            };
            report.line(format_args!("Added device: {} ({})", target.name, target.mac));
            targets.push(target);
        }
        report.line(format_args!("Total target devices: {}", targets.len()));

        Ok(targets)
    }

    async fn process_target<W: Write>(
        &self,
        ctx: &RunContext<'_>,
        target: &Target,
        progress: &mut Progress,
        report: &mut Report<'_, W>,
    ) {
        let Some((rcv, snd)) = find_series(ctx.data, &target.mac) else {
            let err = MonitorError::DeviceNotFound(CoreError::DeviceNotFound {
                name: target.name.clone(),
            });
            report.line(format_args!("{err}"));
            progress.soft_error(err);
            return;
        };

        let device = ctx
            .landevices
            .iter()
            .find(|d| d.normalized_mac() == target.mac)
            .cloned()
            .unwrap_or_default();

        match ctx.plan.period {
            Period::Hour => {
                let totals =
                    usage::compute_hourly_totals(rcv, snd, ctx.plan.period.interval_seconds());
                report.line(format_args!("{} usage in last hour:", target.name));
                report.line(format_args!("Downstream: {} bytes", totals.downstream_bytes));
                report.line(format_args!("Upstream: {} bytes", totals.upstream_bytes));
            }
            Period::Day => {
                self.process_day(ctx, target, &device, (rcv, snd), progress, report)
                    .await;
            }
        }

        report.blank();
    }

    async fn process_day<W: Write>(
        &self,
        ctx: &RunContext<'_>,
        target: &Target,
        device: &Landevice,
        (rcv, snd): (&[f64], &[f64]),
        progress: &mut Progress,
        report: &mut Report<'_, W>,
    ) {
        let threshold = self.options.activity_threshold;
        let elapsed = usage::intervals_since_midnight(&ctx.now);
        let daily = usage::compute_daily_activity(rcv, snd, threshold, elapsed);
        let timeline = usage::compute_timeline(rcv, snd, threshold, TIMELINE_WINDOW, elapsed);

        report.line(format_args!("{} activity in last 12 hours:", target.name));
        report.line(format_args!(
            "Active: {} minutes ({}/{} intervals)",
            timeline.active_minutes(),
            timeline.active_count(),
            timeline.len()
        ));
        report.line(format_args!(
            "Daily total: {} minutes ({}/{DAILY_INTERVALS} intervals)",
            daily.active_minutes, daily.active_count
        ));

        if let Some(policy) = &ctx.plan.policy {
            let allowed = policy.allowed_minutes_for(ctx.now.date_naive());
            tracing::info!(
                mac = %target.mac,
                name = %target.name,
                active_minutes = daily.active_minutes,
                allowed_minutes = allowed,
                "Evaluated daily policy",
            );

            if daily.active_minutes < allowed {
                report.line(format_args!("Within policy"));
                if self.options.enforce && device.is_blocked() {
                    let action = EnforcementAction::Unblock;
                    let identifier = enforcement_identifier(device, ctx.user_index, &target.mac, action);
                    self.enforce(action, identifier, progress, report).await;
                }
            } else {
                report.line(format_args!("Exceeded policy"));
                if self.options.enforce {
                    let action = EnforcementAction::Block;
                    let identifier = enforcement_identifier(device, ctx.user_index, &target.mac, action);
                    self.enforce(action, identifier, progress, report).await;
                }
            }
        }

        report.line(format_args!("Timeline: {}", timeline.render()));

        progress.summary.devices.push(DeviceUsage {
            mac: target.mac.clone(),
            name: target.name.clone(),
            daily_active_minutes: daily.active_minutes,
            active: usage::active_periods(&daily.window, &ctx.now),
        });
    }

    async fn enforce<W: Write>(
        &self,
        action: EnforcementAction,
        identifier: Option<String>,
        progress: &mut Progress,
        report: &mut Report<'_, W>,
    ) {
        let Some(identifier) = identifier else {
            report.line(format_args!("No user UID found for device, cannot {action}"));
            progress.soft_error(MonitorError::NoIdentifier { action });
            return;
        };

        if action.blocks() {
            report.line(format_args!("Blocking using UID: {identifier}"));
        }

        let result = self.client.block_device(&identifier, action.blocks()).await;
        match result {
            Ok(()) => {
                let done = match action {
                    EnforcementAction::Block => "Device blocked",
                    EnforcementAction::Unblock => "Device unblocked",
                };
                report.line(format_args!("{done}"));
                tracing::info!(identifier = %identifier, %action, "Enforcement applied");
            }
            Err(source) => {
                report.line(format_args!("Failed to {action} device: {source}"));
                progress.soft_error(MonitorError::Enforcement { action, source });
            }
        }
    }
}

fn collaborator(step: RunStep) -> impl FnOnce(RouterError) -> MonitorError {
    move |source| MonitorError::Collaborator { step, source }
}

/// Normalized MAC to owning-user identifier, for devices that have one.
fn user_index(landevices: &[Landevice]) -> HashMap<String, String> {
    landevices
        .iter()
        .filter(|d| !d.user_uids.is_empty())
        .map(|d| (d.normalized_mac(), d.user_uids.clone()))
        .collect()
}

/// Receive and send series whose source name ends with `mac`. Both must
/// be present.
fn find_series<'a>(data: &'a [SubsetData], mac: &str) -> Option<(&'a [f64], &'a [f64])> {
    let mut rcv = None;
    let mut snd = None;

    for series in data.iter().filter(|s| s.data_source_name.ends_with(mac)) {
        if series.data_source_name.starts_with(RCV_PREFIX) {
            rcv = Some(series.measurements.as_slice());
        } else if series.data_source_name.starts_with(SND_PREFIX) {
            snd = Some(series.measurements.as_slice());
        }
    }

    Some((rcv?, snd?))
}

/// Identifier for a block/unblock call: the device's own user identifier,
/// then the MAC index. Blocking also falls back to the device UID;
/// unblocking does not.
fn enforcement_identifier(
    device: &Landevice,
    user_index: &HashMap<String, String>,
    mac: &str,
    action: EnforcementAction,
) -> Option<String> {
    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    let user = non_empty(&device.user_uids).or_else(|| user_index.get(mac).cloned());
    match action {
        EnforcementAction::Block => user.or_else(|| non_empty(&device.uid)),
        EnforcementAction::Unblock => user,
    }
}
