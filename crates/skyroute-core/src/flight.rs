//! Flight-phase state machine.
//!
//! Telemetry updates are folded into a [`TelemetrySnapshot`], the guard of the current
//! phase turns the snapshot into at most one [`FlightEvent`], and [`next_phase`] decides
//! whether that event moves the mission forward. Actions run once, on entry to the
//! new phase.

use crate::colliders::ObstacleMap;
use crate::error::{MissionError, PlanningError};
use crate::models::{
    GeodeticPosition, GoalPosition, LocalPosition, LocalVelocity, TelemetryEvent, VehicleStatus,
    Waypoint,
};
use crate::pipeline::{plan_mission, GoalResolver, MissionPlan};
use crate::rules::{FlightRules, PlannerConfig};
use crate::spatial::local_to_global;
use crate::vehicle::VehicleCommands;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightPhase {
    #[default]
    Manual,
    Arming,
    Planning,
    Takeoff,
    Waypoint,
    Landing,
    Disarming,
}

impl fmt::Display for FlightPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightPhase::Manual => "manual",
            FlightPhase::Arming => "arming",
            FlightPhase::Planning => "planning",
            FlightPhase::Takeoff => "takeoff",
            FlightPhase::Waypoint => "waypoint",
            FlightPhase::Landing => "landing",
            FlightPhase::Disarming => "disarming",
        };
        f.write_str(name)
    }
}

/// Logical events produced by guard evaluation (or raised internally by planning).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightEvent {
    MissionStart,
    ArmedConfirmed,
    PlanningComplete,
    PlanningFailed,
    AltitudeReached,
    /// Arrived at a waypoint with more queued behind it.
    PositionReached,
    /// Arrived at the last waypoint and slowed below the landing speed.
    FinalWaypointReached,
    LandingConfirmed,
    DisarmedConfirmed,
}

/// Transition table. `None` means the event does not apply in this phase.
pub fn next_phase(phase: FlightPhase, event: FlightEvent) -> Option<FlightPhase> {
    use FlightEvent as E;
    use FlightPhase as P;

    match (phase, event) {
        (P::Manual, E::MissionStart) => Some(P::Arming),
        (P::Arming, E::ArmedConfirmed) => Some(P::Planning),
        (P::Planning, E::PlanningComplete) => Some(P::Takeoff),
        (P::Planning, E::PlanningFailed) => Some(P::Manual),
        (P::Takeoff, E::AltitudeReached) => Some(P::Waypoint),
        (P::Waypoint, E::PositionReached) => Some(P::Waypoint),
        (P::Waypoint, E::FinalWaypointReached) => Some(P::Landing),
        (P::Landing, E::LandingConfirmed) => Some(P::Disarming),
        (P::Disarming, E::DisarmedConfirmed) => Some(P::Manual),
        _ => None,
    }
}

/// One applied transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: FlightPhase,
    pub event: FlightEvent,
    pub to: FlightPhase,
}

/// Mission bookkeeping owned by the controller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MissionState {
    pub target: Waypoint,
    pub waypoints: VecDeque<Waypoint>,
    pub phase: FlightPhase,
    pub in_mission: bool,
}

/// Latest telemetry seen by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub local_position: Option<LocalPosition>,
    pub local_velocity: Option<LocalVelocity>,
    pub global_position: Option<GeodeticPosition>,
    pub status: VehicleStatus,
}

impl TelemetrySnapshot {
    pub fn apply(&mut self, event: &TelemetryEvent) {
        match *event {
            TelemetryEvent::LocalPosition(position) => self.local_position = Some(position),
            TelemetryEvent::LocalVelocity(velocity) => self.local_velocity = Some(velocity),
            TelemetryEvent::GlobalPosition(position) => self.global_position = Some(position),
            TelemetryEvent::Status(status) => self.status = status,
        }
    }
}

pub struct FlightPhaseController<G = GoalPosition> {
    map: ObstacleMap,
    goal: G,
    config: PlannerConfig,
    rules: FlightRules,
    state: MissionState,
    telemetry: TelemetrySnapshot,
    plan: Option<MissionPlan>,
    transitions: Vec<Transition>,
}

impl<G: GoalResolver> FlightPhaseController<G> {
    pub fn new(map: ObstacleMap, goal: G, config: PlannerConfig) -> Self {
        Self {
            map,
            goal,
            config,
            rules: FlightRules::default(),
            state: MissionState::default(),
            telemetry: TelemetrySnapshot::default(),
            plan: None,
            transitions: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: FlightRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn phase(&self) -> FlightPhase {
        self.state.phase
    }

    pub fn mission_state(&self) -> &MissionState {
        &self.state
    }

    pub fn telemetry(&self) -> &TelemetrySnapshot {
        &self.telemetry
    }

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Plan of the current (or last successful) mission.
    pub fn plan(&self) -> Option<&MissionPlan> {
        self.plan.as_ref()
    }

    /// Begin a mission: take control and arm. Only valid from Manual.
    pub fn start_mission(&mut self, vehicle: &mut dyn VehicleCommands) -> Result<(), MissionError> {
        if self.state.phase != FlightPhase::Manual {
            return Err(MissionError::NotInManual(self.state.phase));
        }
        self.state.in_mission = true;
        self.dispatch(FlightEvent::MissionStart, vehicle)
    }

    /// Process one telemetry update.
    pub fn handle_telemetry(
        &mut self,
        event: TelemetryEvent,
        vehicle: &mut dyn VehicleCommands,
    ) -> Result<(), MissionError> {
        self.telemetry.apply(&event);
        if !self.state.in_mission {
            return Ok(());
        }
        match self.evaluate_guard() {
            Some(flight_event) => self.dispatch(flight_event, vehicle),
            None => {
                tracing::trace!(phase = %self.state.phase, ?event, "No guard satisfied");
                Ok(())
            }
        }
    }

    fn evaluate_guard(&self) -> Option<FlightEvent> {
        let snapshot = &self.telemetry;
        match self.state.phase {
            FlightPhase::Manual | FlightPhase::Planning => None,
            FlightPhase::Arming => snapshot.status.armed.then_some(FlightEvent::ArmedConfirmed),
            FlightPhase::Takeoff => {
                let altitude = snapshot.local_position?.altitude();
                let threshold = self.rules.takeoff_altitude_fraction * self.state.target.altitude;
                (altitude >= threshold).then_some(FlightEvent::AltitudeReached)
            }
            FlightPhase::Waypoint => {
                if !self.target_reached()? {
                    return None;
                }
                if !self.state.waypoints.is_empty() {
                    return Some(FlightEvent::PositionReached);
                }
                // Unknown velocity never satisfies the landing speed.
                let speed = snapshot
                    .local_velocity
                    .map_or(f64::INFINITY, |velocity| velocity.horizontal_speed());
                (speed < self.rules.landing_speed_mps).then_some(FlightEvent::FinalWaypointReached)
            }
            FlightPhase::Landing => {
                let global = snapshot.global_position?;
                let local = snapshot.local_position?;
                let above_home = global.altitude - self.map.home.altitude;
                let landed = above_home < self.rules.landed_altitude_m
                    && local.down.abs() < self.rules.landed_down_m;
                landed.then_some(FlightEvent::LandingConfirmed)
            }
            FlightPhase::Disarming => (!snapshot.status.armed && !snapshot.status.guided)
                .then_some(FlightEvent::DisarmedConfirmed),
        }
    }

    fn target_reached(&self) -> Option<bool> {
        let position = self.telemetry.local_position?;
        let target = &self.state.target;
        let horizontal = (target.north - position.north).hypot(target.east - position.east);
        let vertical = (target.altitude - position.altitude()).abs();
        Some(
            horizontal < self.rules.waypoint_horizontal_tolerance_m
                && vertical < self.rules.waypoint_vertical_tolerance_m,
        )
    }

    fn dispatch(
        &mut self,
        event: FlightEvent,
        vehicle: &mut dyn VehicleCommands,
    ) -> Result<(), MissionError> {
        let from = self.state.phase;
        let Some(to) = next_phase(from, event) else {
            tracing::trace!(phase = %from, ?event, "Event ignored in this phase");
            return Ok(());
        };

        self.state.phase = to;
        self.transitions.push(Transition { from, event, to });
        tracing::info!(%from, %to, ?event, "Flight phase transition");

        match event {
            FlightEvent::MissionStart => {
                vehicle.acquire_control();
                vehicle.arm();
            }
            FlightEvent::ArmedConfirmed => match self.plan_route(vehicle) {
                Ok(()) => return self.dispatch(FlightEvent::PlanningComplete, vehicle),
                Err(err) => {
                    tracing::warn!(error = %err, "Planning failed, aborting mission");
                    self.dispatch(FlightEvent::PlanningFailed, vehicle)?;
                    return Err(err.into());
                }
            },
            FlightEvent::PlanningComplete => {
                vehicle.takeoff(self.state.target.altitude);
            }
            FlightEvent::PlanningFailed => {
                vehicle.disarm();
                vehicle.release_control();
                self.reset();
            }
            FlightEvent::AltitudeReached | FlightEvent::PositionReached => {
                if let Some(next) = self.state.waypoints.pop_front() {
                    self.state.target = next;
                }
                let target = self.state.target;
                tracing::info!(
                    north = target.north,
                    east = target.east,
                    altitude = target.altitude,
                    remaining = self.state.waypoints.len(),
                    "Commanding waypoint"
                );
                vehicle.command_position(
                    target.north,
                    target.east,
                    target.altitude,
                    target.heading,
                );
            }
            FlightEvent::FinalWaypointReached => {
                vehicle.land();
            }
            FlightEvent::LandingConfirmed => {
                vehicle.disarm();
                vehicle.release_control();
            }
            FlightEvent::DisarmedConfirmed => {
                self.reset();
            }
        }
        Ok(())
    }

    fn plan_route(
        &mut self,
        vehicle: &mut dyn VehicleCommands,
    ) -> Result<(), PlanningError> {
        vehicle.set_home_position(self.map.home);

        let current = self.current_global_position();
        let plan = plan_mission(&self.map, &current, &mut self.goal, &self.config)?;

        let local = self.telemetry.local_position.unwrap_or_default();
        self.state.target =
            Waypoint::new(local.north, local.east, self.config.cruise_altitude_m, 0.0);
        self.state.waypoints = plan.waypoints.iter().copied().collect();
        vehicle.send_waypoints(&plan.waypoints);
        self.plan = Some(plan);
        Ok(())
    }

    fn current_global_position(&self) -> GeodeticPosition {
        match (self.telemetry.global_position, self.telemetry.local_position) {
            (Some(global), _) => global,
            (None, Some(local)) => local_to_global(&local, &self.map.home),
            (None, None) => self.map.home,
        }
    }

    fn reset(&mut self) {
        self.state = MissionState::default();
    }
}
