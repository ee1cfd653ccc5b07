// Device power flag and connection indicator. Toggling power runs a timed
// flicker sequence; a new toggle cancels the sequence still in flight.

mod sequence;

pub use sequence::{SequencePlan, SequenceTiming};

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{ConnectionStatus, DeviceState};

struct Inner {
    state: DeviceState,
    /// Bumped on every power toggle; sequence writes carrying an older value are dropped.
    generation: u64,
}

pub(crate) struct Shared {
    inner: Mutex<Inner>,
    tx: broadcast::Sender<DeviceState>,
}

impl Shared {
    /// Applies `next` to the status if `generation` is still current. Returns
    /// false when the sequence has been superseded.
    fn apply(
        &self,
        generation: u64,
        operation: &'static str,
        next: impl FnOnce(ConnectionStatus) -> ConnectionStatus,
    ) -> bool {
        let mut inner = self.inner.lock();
        if inner.generation != generation {
            tracing::debug!(operation, generation, "Superseded power sequence stopped");
            return false;
        }
        let status = next(inner.state.status);
        self.commit(&mut inner, status, operation);
        true
    }

    /// Caller holds the lock so events go out in commit order.
    fn commit(&self, inner: &mut Inner, status: ConnectionStatus, operation: &'static str) {
        if inner.state.status == status {
            return;
        }
        inner.state.status = status;
        self.publish(inner.state, operation);
    }

    fn publish(&self, state: DeviceState, operation: &'static str) {
        tracing::debug!(
            operation,
            powered_on = state.powered_on,
            status = %state.status,
            "Device state changed"
        );
        if self.tx.send(state).is_err() {
            tracing::trace!(operation, "No device status subscribers");
        }
    }
}

pub struct DeviceStatus {
    shared: Arc<Shared>,
    timing: SequenceTiming,
    sequence: Mutex<Option<JoinHandle<()>>>,
}

impl DeviceStatus {
    /// Starts powered off with status `Off`. Fails with `InvalidArgument` for a
    /// zero tick interval.
    pub fn new(timing: SequenceTiming, broadcast_capacity: usize) -> Result<Self> {
        timing.validate()?;
        let (tx, _) = broadcast::channel(broadcast_capacity.max(1));
        Ok(Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(Inner {
                    state: DeviceState::default(),
                    generation: 0,
                }),
                tx,
            }),
            timing,
            sequence: Mutex::new(None),
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Self::new(config.sequencer.timing(), config.events.broadcast_capacity)
    }

    pub fn timing(&self) -> SequenceTiming {
        self.timing
    }

    pub fn powered_on(&self) -> bool {
        self.shared.inner.lock().state.powered_on
    }

    pub fn status(&self) -> ConnectionStatus {
        self.shared.inner.lock().state.status
    }

    pub fn state(&self) -> DeviceState {
        self.shared.inner.lock().state
    }

    /// True while a power sequence task has not reached its terminal status.
    pub fn is_sequencing(&self) -> bool {
        self.sequence
            .lock()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DeviceState> {
        self.shared.tx.subscribe()
    }

    /// Flips the power flag and starts the matching sequence, cancelling any
    /// sequence still running. Returns the new power flag.
    ///
    /// Outside a Tokio runtime this fails with `NoRuntime` and leaves the state untouched.
    pub fn change_power(&self) -> Result<bool> {
        let runtime = Handle::try_current()?;
        let mut slot = self.sequence.lock();
        if let Some(previous) = slot.take()
            && !previous.is_finished()
        {
            previous.abort();
            tracing::debug!(operation = "change_power", "In-flight power sequence cancelled");
        }

        let (powered_on, plan, generation) = {
            let mut inner = self.shared.inner.lock();
            inner.generation += 1;
            inner.state.powered_on = !inner.state.powered_on;
            let plan = SequencePlan::for_power(inner.state.powered_on, &self.timing);
            inner.state.status = plan.start;
            self.shared.publish(inner.state, "change_power");
            (inner.state.powered_on, plan, inner.generation)
        };

        tracing::info!(
            powered_on,
            settle = ?plan.duration(&self.timing),
            "Power toggled"
        );

        *slot = Some(runtime.spawn(sequence::run(
            Arc::clone(&self.shared),
            plan,
            self.timing,
            generation,
            Instant::now(),
        )));
        Ok(powered_on)
    }

    /// Sets the status directly. Ignored while powered off; returns whether the
    /// write took effect. A running power sequence keeps ticking afterwards.
    pub fn change_connection_status(&self, status: ConnectionStatus) -> bool {
        let mut inner = self.shared.inner.lock();
        if !inner.state.powered_on {
            tracing::debug!(
                operation = "change_connection_status",
                requested = %status,
                "Ignored while powered off"
            );
            return false;
        }
        self.shared
            .commit(&mut inner, status, "change_connection_status");
        true
    }

    /// Like [`change_connection_status`](Self::change_connection_status) but
    /// takes a wire label (`wifi-off`, `wifi-1`, `wifi-2`, `wifi`). Unknown
    /// labels fail with `InvalidArgument` whatever the power state.
    pub fn change_connection_status_label(&self, label: &str) -> Result<bool> {
        let status: ConnectionStatus = label.parse()?;
        Ok(self.change_connection_status(status))
    }
}

impl Drop for DeviceStatus {
    fn drop(&mut self) {
        if let Some(handle) = self.sequence.get_mut().take() {
            handle.abort();
        }
    }
}
