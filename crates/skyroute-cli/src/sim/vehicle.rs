//! Point-mass vehicle that answers flight commands.
//!
//! The vehicle moves toward its current target at bounded horizontal and vertical
//! speeds and reports local position, velocity, global position and status every step.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skyroute_core::{
    local_to_global, GeodeticPosition, LocalPosition, LocalVelocity, TelemetryEvent,
    VehicleCommands, VehicleStatus, Waypoint,
};

#[derive(Debug, Clone)]
pub struct SimParams {
    pub horizontal_speed_mps: f64,
    pub vertical_speed_mps: f64,
    /// Half-width of the uniform noise added to reported north/east, meters
    pub position_noise_m: f64,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            horizontal_speed_mps: 5.0,
            vertical_speed_mps: 2.0,
            position_noise_m: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Idle,
    Climb { altitude: f64 },
    Goto { north: f64, east: f64, altitude: f64 },
    Land,
}

pub struct SimVehicle {
    home: GeodeticPosition,
    position: LocalPosition,
    velocity: LocalVelocity,
    status: VehicleStatus,
    mode: Mode,
    route: Vec<Waypoint>,
    params: SimParams,
    rng: StdRng,
}

impl SimVehicle {
    pub fn new(
        home: GeodeticPosition,
        position: LocalPosition,
        params: SimParams,
        seed: u64,
    ) -> Self {
        Self {
            home,
            position,
            velocity: LocalVelocity::default(),
            status: VehicleStatus::default(),
            mode: Mode::Idle,
            route: Vec::new(),
            params,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn position(&self) -> LocalPosition {
        self.position
    }

    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    /// Route published by the controller, if any.
    pub fn route(&self) -> &[Waypoint] {
        &self.route
    }

    /// Advance by `dt` seconds and return this tick's telemetry.
    pub fn step(&mut self, dt: f64) -> Vec<TelemetryEvent> {
        let before = self.position;
        match self.mode {
            Mode::Idle => {}
            Mode::Climb { altitude } => {
                self.move_vertically(altitude, dt);
            }
            Mode::Goto {
                north,
                east,
                altitude,
            } => {
                self.move_horizontally(north, east, dt);
                self.move_vertically(altitude, dt);
            }
            Mode::Land => {
                self.move_vertically(0.0, dt);
                if self.position.down >= 0.0 {
                    self.position.down = 0.0;
                    self.mode = Mode::Idle;
                }
            }
        }

        self.velocity = if dt > 0.0 {
            LocalVelocity::new(
                (self.position.north - before.north) / dt,
                (self.position.east - before.east) / dt,
                (self.position.down - before.down) / dt,
            )
        } else {
            LocalVelocity::default()
        };

        let reported = self.reported_position();
        vec![
            TelemetryEvent::LocalPosition(reported),
            TelemetryEvent::LocalVelocity(self.velocity),
            TelemetryEvent::GlobalPosition(local_to_global(&reported, &self.home)),
            TelemetryEvent::Status(self.status),
        ]
    }

    fn reported_position(&mut self) -> LocalPosition {
        let noise = self.params.position_noise_m;
        if noise <= 0.0 {
            return self.position;
        }
        LocalPosition::new(
            self.position.north + self.rng.random_range(-noise..noise),
            self.position.east + self.rng.random_range(-noise..noise),
            self.position.down,
        )
    }

    fn move_horizontally(&mut self, north: f64, east: f64, dt: f64) {
        let d_north = north - self.position.north;
        let d_east = east - self.position.east;
        let distance = d_north.hypot(d_east);
        let reach = self.params.horizontal_speed_mps * dt;
        if distance <= reach {
            self.position.north = north;
            self.position.east = east;
        } else {
            self.position.north += d_north / distance * reach;
            self.position.east += d_east / distance * reach;
        }
    }

    fn move_vertically(&mut self, altitude: f64, dt: f64) {
        let current = self.position.altitude();
        let reach = self.params.vertical_speed_mps * dt;
        let next = if (altitude - current).abs() <= reach {
            altitude
        } else {
            current + reach * (altitude - current).signum()
        };
        self.position.down = -next;
    }
}

impl VehicleCommands for SimVehicle {
    fn arm(&mut self) {
        self.status.armed = true;
    }

    fn disarm(&mut self) {
        if self.position.altitude() > 0.0 {
            tracing::warn!(altitude = self.position.altitude(), "Refusing to disarm in the air");
            return;
        }
        self.status.armed = false;
        self.mode = Mode::Idle;
    }

    fn acquire_control(&mut self) {
        self.status.guided = true;
    }

    fn release_control(&mut self) {
        self.status.guided = false;
    }

    fn takeoff(&mut self, altitude: f64) {
        if !self.status.armed {
            tracing::warn!("Takeoff ignored, vehicle not armed");
            return;
        }
        self.mode = Mode::Climb { altitude };
    }

    fn command_position(&mut self, north: f64, east: f64, altitude: f64, _heading: f64) {
        if !self.status.armed {
            tracing::warn!("Position command ignored, vehicle not armed");
            return;
        }
        self.mode = Mode::Goto {
            north,
            east,
            altitude,
        };
    }

    fn land(&mut self) {
        self.mode = Mode::Land;
    }

    fn set_home_position(&mut self, home: GeodeticPosition) {
        self.home = home;
    }

    fn send_waypoints(&mut self, waypoints: &[Waypoint]) {
        self.route = waypoints.to_vec();
    }
}
