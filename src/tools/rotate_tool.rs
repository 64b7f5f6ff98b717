//! Rotate Tool
//!
//! Turntable spin of one prim about a single axis. The caller owns the
//! frame clock and calls [`Turntable::tick`] once per frame.

use crate::error::VrResult;
use crate::host::SceneHost;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 1.0;
pub const DEFAULT_SPEED: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Axis {
    X,
    #[default]
    Y,
    Z,
}

impl Axis {
    /// Component index in an XYZ rotation
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

impl std::str::FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "X" => Ok(Axis::X),
            "Y" => Ok(Axis::Y),
            "Z" => Ok(Axis::Z),
            other => Err(format!("unknown axis '{}'", other)),
        }
    }
}

/// Spin direction, as seen from above the turntable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Counter-clockwise, angle increases
    Left,
    /// Clockwise, angle decreases
    Right,
}

#[derive(Debug, Clone)]
pub struct Turntable {
    pub prim_path: String,
    pub axis: Axis,
    speed: f64,
    direction: Direction,
    running: bool,
    angle: f64,
}

impl Turntable {
    pub fn new(prim_path: &str, axis: Axis, speed: f64) -> Self {
        Self {
            prim_path: prim_path.to_string(),
            axis,
            speed: speed.clamp(MIN_SPEED, MAX_SPEED),
            direction: Direction::Left,
            running: false,
            angle: 0.0,
        }
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Degrees per frame, clamped to the slider range
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.clamp(MIN_SPEED, MAX_SPEED);
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Accumulated angle about the chosen axis
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Start spinning. The first start picks up the prim's current angle.
    pub fn start<H: SceneHost + ?Sized>(&mut self, host: &H, direction: Direction) -> VrResult<()> {
        let rotation = host.rotation(&self.prim_path)?;
        if self.angle == 0.0 {
            self.angle = rotation[self.axis.index()];
        }
        self.direction = direction;
        self.running = true;
        info!(
            "🔁 Spinning {} about {:?} ({:?}, {} deg/frame)",
            self.prim_path, self.axis, direction, self.speed
        );
        Ok(())
    }

    pub fn stop(&mut self) {
        if self.running {
            debug!("Turntable stopped at {:.1} deg", self.angle);
        }
        self.running = false;
    }

    /// Advance one frame. Returns whether the prim was rotated.
    pub fn tick<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> VrResult<bool> {
        if !self.running || !host.prim_exists(&self.prim_path) {
            return Ok(false);
        }

        match self.direction {
            Direction::Left => self.angle += self.speed,
            Direction::Right => self.angle -= self.speed,
        }

        let mut rotation = host.rotation(&self.prim_path)?;
        rotation[self.axis.index()] = self.angle;
        host.set_rotation(&self.prim_path, rotation)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Stage;

    fn stage() -> Stage {
        let mut stage = Stage::new();
        stage.define_prim("/World/Car", "Xform").unwrap();
        stage.set_rotation("/World/Car", [5.0, 90.0, -3.0]).unwrap();
        stage
    }

    #[test]
    fn test_axis_parsing() {
        assert_eq!("x".parse::<Axis>(), Ok(Axis::X));
        assert_eq!("Z".parse::<Axis>(), Ok(Axis::Z));
        assert!("w".parse::<Axis>().is_err());
        assert_eq!(Axis::default(), Axis::Y);
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut turntable = Turntable::new("/World/Car", Axis::Y, 5.0);
        assert_eq!(turntable.speed(), MAX_SPEED);
        turntable.set_speed(0.0);
        assert_eq!(turntable.speed(), MIN_SPEED);
    }

    #[test]
    fn test_spin_left_then_right() {
        let mut stage = stage();
        let mut turntable = Turntable::new("/World/Car", Axis::Y, 0.5);

        assert!(!turntable.tick(&mut stage).unwrap());

        turntable.start(&stage, Direction::Left).unwrap();
        assert_eq!(turntable.angle(), 90.0);
        for _ in 0..4 {
            turntable.tick(&mut stage).unwrap();
        }
        assert_eq!(stage.rotation("/World/Car").unwrap(), [5.0, 92.0, -3.0]);

        turntable.stop();
        assert!(!turntable.tick(&mut stage).unwrap());

        // The accumulated angle survives a restart
        turntable.start(&stage, Direction::Right).unwrap();
        turntable.tick(&mut stage).unwrap();
        assert_eq!(stage.rotation("/World/Car").unwrap(), [5.0, 91.5, -3.0]);
    }

    #[test]
    fn test_spin_other_axis() {
        let mut stage = stage();
        let mut turntable = Turntable::new("/World/Car", Axis::X, 1.0);
        turntable.start(&stage, Direction::Right).unwrap();
        turntable.tick(&mut stage).unwrap();
        assert_eq!(stage.rotation("/World/Car").unwrap(), [4.0, 90.0, -3.0]);
    }

    #[test]
    fn test_missing_prim() {
        let mut stage = stage();
        let mut turntable = Turntable::new("/World/Gone", Axis::Y, 0.5);
        assert!(turntable.start(&stage, Direction::Left).is_err());
        assert!(!turntable.tick(&mut stage).unwrap());
    }
}
