// Projectile lab: closed-form results for a launch on flat ground

use serde::Serialize;

pub const GRAVITY: f64 = 9.8;
pub const ANGLE_RANGE: (f64, f64) = (10.0, 85.0);
pub const VELOCITY_RANGE: (f64, f64) = (1.0, 50.0);

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileStats {
    /// Peak height in metres
    pub max_height: f64,
    /// Horizontal distance in metres
    pub range: f64,
    /// Seconds in the air
    pub flight_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectileLab {
    angle: f64,
    velocity: f64,
}

impl ProjectileLab {
    pub fn new() -> Self {
        Self {
            angle: 45.0,
            velocity: 20.0,
        }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn set_angle(&mut self, degrees: f64) {
        self.angle = degrees.clamp(ANGLE_RANGE.0, ANGLE_RANGE.1);
    }

    pub fn set_velocity(&mut self, velocity: f64) {
        self.velocity = velocity.clamp(VELOCITY_RANGE.0, VELOCITY_RANGE.1);
    }

    pub fn stats(&self) -> ProjectileStats {
        let rad = self.angle.to_radians();
        let v2 = self.velocity.powi(2);
        ProjectileStats {
            max_height: round2(v2 * rad.sin().powi(2) / (2.0 * GRAVITY)),
            range: round2(v2 * (2.0 * rad).sin() / GRAVITY),
            flight_time: round2(2.0 * self.velocity * rad.sin() / GRAVITY),
        }
    }
}

impl Default for ProjectileLab {
    fn default() -> Self {
        Self::new()
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_launch() {
        let stats = ProjectileLab::new().stats();
        assert_eq!(stats.max_height, 10.2);
        assert_eq!(stats.range, 40.82);
        assert_eq!(stats.flight_time, 2.89);
    }

    #[test]
    fn test_inputs_are_clamped() {
        let mut lab = ProjectileLab::new();
        lab.set_angle(90.0);
        lab.set_velocity(-3.0);
        assert_eq!(lab.angle(), 85.0);
        assert_eq!(lab.velocity(), 1.0);
        lab.set_angle(0.0);
        assert_eq!(lab.angle(), 10.0);
    }

    #[test]
    fn test_complementary_angles_share_range() {
        let mut lab = ProjectileLab::new();
        lab.set_angle(30.0);
        let low = lab.stats();
        lab.set_angle(60.0);
        let high = lab.stats();
        assert_eq!(low.range, high.range);
        assert!(high.max_height > low.max_height);
    }
}
