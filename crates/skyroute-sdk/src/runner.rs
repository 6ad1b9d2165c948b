//! Async mission loop.
//!
//! The runner owns the controller and is the only consumer of the telemetry channel,
//! so events reach the state machine one at a time and in order.

use crate::link::ChannelLink;
use serde::Serialize;
use skyroute_core::{
    FlightPhase, FlightPhaseController, GoalResolver, MissionError, MissionPlan, TelemetryEvent,
    Transition,
};
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error(transparent)]
    Mission(#[from] MissionError),

    #[error("telemetry stream closed during {phase} after {events} events")]
    TelemetryClosed { phase: FlightPhase, events: usize },
}

/// Summary of a completed mission.
#[derive(Debug, Clone, Serialize)]
pub struct MissionReport {
    pub events: usize,
    pub transitions: Vec<Transition>,
    pub plan: Option<MissionPlan>,
}

pub struct MissionRunner<G> {
    controller: FlightPhaseController<G>,
    link: ChannelLink,
}

impl<G: GoalResolver> MissionRunner<G> {
    pub fn new(controller: FlightPhaseController<G>, link: ChannelLink) -> Self {
        Self { controller, link }
    }

    /// Start the mission and feed telemetry until the vehicle is back in Manual.
    ///
    /// Telemetry already queued before the call is applied first, so the controller
    /// knows the vehicle's position when planning.
    pub async fn run(
        mut self,
        mut telemetry: mpsc::Receiver<TelemetryEvent>,
    ) -> Result<MissionReport, RunnerError> {
        let mut events = 0usize;
        while let Ok(event) = telemetry.try_recv() {
            self.controller.handle_telemetry(event, &mut self.link)?;
            events += 1;
        }

        self.controller.start_mission(&mut self.link)?;
        tracing::info!(phase = %self.controller.phase(), "Mission started");

        while let Some(event) = telemetry.recv().await {
            events += 1;
            self.controller.handle_telemetry(event, &mut self.link)?;
            if !self.controller.mission_state().in_mission {
                tracing::info!(
                    events,
                    transitions = self.controller.transitions().len(),
                    "Mission complete"
                );
                return Ok(self.report(events));
            }
        }

        let phase = self.controller.phase();
        tracing::warn!(%phase, events, "Telemetry stream closed before mission completed");
        Err(RunnerError::TelemetryClosed { phase, events })
    }

    fn report(&self, events: usize) -> MissionReport {
        MissionReport {
            events,
            transitions: self.controller.transitions().to_vec(),
            plan: self.controller.plan().cloned(),
        }
    }
}

/// Spawn the runner on the current tokio runtime.
pub fn spawn_mission<G>(
    runner: MissionRunner<G>,
    telemetry: mpsc::Receiver<TelemetryEvent>,
) -> tokio::task::JoinHandle<Result<MissionReport, RunnerError>>
where
    G: GoalResolver + Send + 'static,
{
    tokio::spawn(runner.run(telemetry))
}
