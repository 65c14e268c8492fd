use glam::{Quat, Vec3};
use std::f32::consts::{PI, TAU};

/// Lowest frequency a spring accepts; below it the coefficients blow up.
const MIN_FREQUENCY: f32 = 1e-3;

/// Values a spring can drive.
pub trait SpringValue: Clone + Copy {
    fn zero() -> Self;
    fn add(self, other: Self) -> Self;
    fn sub(self, other: Self) -> Self;
    fn scale(self, factor: f32) -> Self;
}

impl SpringValue for f32 {
    fn zero() -> Self { 0.0 }
    fn add(self, other: Self) -> Self { self + other }
    fn sub(self, other: Self) -> Self { self - other }
    fn scale(self, factor: f32) -> Self { self * factor }
}

impl SpringValue for Vec3 {
    fn zero() -> Self { Vec3::ZERO }
    fn add(self, other: Self) -> Self { self + other }
    fn sub(self, other: Self) -> Self { self - other }
    fn scale(self, factor: f32) -> Self { self * factor }
}

/// Frequency (Hz), damping ratio and initial response of a spring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringParams {
    pub frequency: f32,
    pub damping: f32,
    pub response: f32,
}

impl SpringParams {
    pub fn new(frequency: f32, damping: f32, response: f32) -> Self {
        Self {
            frequency,
            damping,
            response,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpringPreset {
    /// Tracks closely with a slight overshoot; hands.
    Snappy,
    /// Critically damped; head and hips.
    Smooth,
    Bouncy,
    /// Heavy lag; feet on noisy trackers.
    Sluggish,
}

impl SpringPreset {
    pub fn params(self) -> SpringParams {
        match self {
            SpringPreset::Snappy => SpringParams::new(4.0, 0.5, 2.0),
            SpringPreset::Smooth => SpringParams::new(2.0, 1.0, 0.0),
            SpringPreset::Bouncy => SpringParams::new(3.0, 0.3, 1.0),
            SpringPreset::Sluggish => SpringParams::new(1.0, 1.5, 0.0),
        }
    }
}

/// Coefficients of `y + k1·y' + k2·y'' = x + k3·x'`, plus what the
/// large-step correction needs.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Coefficients {
    omega: f32,
    damping: f32,
    /// Damped frequency, `ω·sqrt(|ζ² − 1|)`.
    damped: f32,
    k1: f32,
    k2: f32,
    k3: f32,
}

impl Coefficients {
    fn new(params: SpringParams) -> Self {
        let f = params.frequency.max(MIN_FREQUENCY);
        let z = params.damping.max(0.0);
        let omega = TAU * f;
        Self {
            omega,
            damping: z,
            damped: omega * (z * z - 1.0).abs().sqrt(),
            k1: z / (PI * f),
            k2: 1.0 / (omega * omega),
            k3: params.response * z / (PI * f),
        }
    }

    /// `(k1, k2)` for a step of `dt`.
    ///
    /// Small steps only clamp k2. Once `ω·dt` passes the damping ratio the
    /// poles of the discrete system are matched to the continuous ones, so
    /// long frames neither explode nor jitter.
    fn stable(&self, dt: f32) -> (f32, f32) {
        if self.omega * dt < self.damping {
            let k2 = self
                .k2
                .max(dt * dt / 2.0 + dt * self.k1 / 2.0)
                .max(dt * self.k1);
            return (self.k1, k2);
        }

        let t1 = (-self.damping * self.omega * dt).exp();
        let oscillation = if self.damping <= 1.0 {
            (dt * self.damped).cos()
        } else {
            (dt * self.damped).cosh()
        };
        let alpha = 2.0 * t1 * oscillation;
        let beta = t1 * t1;
        let t2 = dt / (1.0 + beta - alpha);
        ((1.0 - beta) * t2, dt * t2)
    }
}

/// Second-order system following an input signal.
#[derive(Debug, Clone, Copy)]
pub struct SecondOrderDynamics<T: SpringValue> {
    y: T,
    yd: T,
    xp: T,
    coefficients: Coefficients,
}

impl<T: SpringValue> SecondOrderDynamics<T> {
    pub fn new(params: SpringParams, initial: T) -> Self {
        Self {
            y: initial,
            yd: T::zero(),
            xp: initial,
            coefficients: Coefficients::new(params),
        }
    }

    pub fn from_preset(preset: SpringPreset, initial: T) -> Self {
        Self::new(preset.params(), initial)
    }

    pub fn set_params(&mut self, params: SpringParams) {
        self.coefficients = Coefficients::new(params);
    }

    /// Jumps to `value` with zero velocity.
    pub fn reset(&mut self, value: T) {
        self.y = value;
        self.yd = T::zero();
        self.xp = value;
    }

    /// Advances by `dt`, estimating the input's velocity from the last call.
    pub fn update(&mut self, x: T, dt: f32) -> T {
        if dt <= 0.0 {
            return self.y;
        }
        let xd = x.sub(self.xp).scale(1.0 / dt);
        self.update_with_velocity(x, xd, dt)
    }

    /// Advances by `dt` with a known input velocity, e.g. from a tracker
    /// that reports one.
    pub fn update_with_velocity(&mut self, x: T, xd: T, dt: f32) -> T {
        if dt <= 0.0 {
            return self.y;
        }
        self.xp = x;

        let (k1, k2) = self.coefficients.stable(dt);
        self.y = self.y.add(self.yd.scale(dt));
        let accel = x
            .add(xd.scale(self.coefficients.k3))
            .sub(self.y)
            .sub(self.yd.scale(k1))
            .scale(1.0 / k2);
        self.yd = self.yd.add(accel.scale(dt));

        self.y
    }

    pub fn current(&self) -> T {
        self.y
    }

    pub fn velocity(&self) -> T {
        self.yd
    }
}

/// Shortest rotation taking `from` to `to`, as a scaled axis.
fn rotation_error(from: Quat, to: Quat) -> Vec3 {
    let delta = to * from.inverse();
    let delta = if delta.w < 0.0 { -delta } else { delta };
    delta.to_scaled_axis()
}

/// The same spring acting on orientation. State is a rotation plus a world
/// angular velocity; errors are measured along the shortest arc.
#[derive(Debug, Clone, Copy)]
pub struct RotationSpring {
    y: Quat,
    yd: Vec3,
    xp: Quat,
    coefficients: Coefficients,
}

impl RotationSpring {
    pub fn new(params: SpringParams, initial: Quat) -> Self {
        Self {
            y: initial,
            yd: Vec3::ZERO,
            xp: initial,
            coefficients: Coefficients::new(params),
        }
    }

    pub fn from_preset(preset: SpringPreset, initial: Quat) -> Self {
        Self::new(preset.params(), initial)
    }

    pub fn reset(&mut self, value: Quat) {
        self.y = value;
        self.yd = Vec3::ZERO;
        self.xp = value;
    }

    pub fn update(&mut self, x: Quat, dt: f32) -> Quat {
        if dt <= 0.0 {
            return self.y;
        }
        let xd = rotation_error(self.xp, x) / dt;
        self.xp = x;

        let (k1, k2) = self.coefficients.stable(dt);
        self.y = (Quat::from_scaled_axis(self.yd * dt) * self.y).normalize();
        let error = rotation_error(self.y, x);
        let accel = (error + xd * self.coefficients.k3 - self.yd * k1) / k2;
        self.yd += accel * dt;

        self.y
    }

    pub fn current(&self) -> Quat {
        self.y
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.yd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn settles_on_a_constant_input() {
        let mut spring = SecondOrderDynamics::from_preset(SpringPreset::Smooth, 0.0f32);
        for _ in 0..600 {
            spring.update(1.0, 1.0 / 90.0);
        }
        assert_relative_eq!(spring.current(), 1.0, epsilon = 1e-3);
        assert_relative_eq!(spring.velocity(), 0.0, epsilon = 1e-2);
    }

    #[test]
    fn long_frames_stay_bounded() {
        let mut spring = SecondOrderDynamics::from_preset(SpringPreset::Bouncy, 0.0f32);
        let mut peak = 0.0f32;
        for _ in 0..200 {
            peak = peak.max(spring.update(1.0, 0.5).abs());
        }
        assert!(peak < 2.0, "{peak}");
        assert_relative_eq!(spring.current(), 1.0, epsilon = 1e-3);
    }

    #[test]
    fn zero_dt_holds_state() {
        let mut spring = SecondOrderDynamics::from_preset(SpringPreset::Snappy, Vec3::ONE);
        assert_eq!(spring.update(Vec3::ZERO, 0.0), Vec3::ONE);
    }

    #[test]
    fn reset_clears_velocity() {
        let mut spring = SecondOrderDynamics::from_preset(SpringPreset::Bouncy, 0.0f32);
        spring.update(5.0, 0.1);
        spring.reset(2.0);
        assert_eq!(spring.current(), 2.0);
        assert_eq!(spring.velocity(), 0.0);
    }

    #[test]
    fn known_input_velocity_leads_the_response() {
        let params = SpringParams::new(2.0, 1.0, 1.0);
        let mut estimated = SecondOrderDynamics::new(params, 0.0f32);
        let mut told = SecondOrderDynamics::new(params, 0.0f32);
        estimated.update(0.0, 0.1);
        told.update_with_velocity(0.0, 1.0, 0.1);
        told.update_with_velocity(0.0, 1.0, 0.1);
        assert!(told.current() > estimated.current());
    }

    #[test]
    fn rotation_spring_takes_the_short_way_round() {
        let start = Quat::from_rotation_y(3.0);
        let goal = Quat::from_rotation_y(-3.0);
        let mut spring = RotationSpring::from_preset(SpringPreset::Smooth, start);
        let first = spring.update(goal, 1.0 / 90.0);
        let second = spring.update(goal, 1.0 / 90.0);
        // Past ±π rather than back through zero.
        let yaw = |q: Quat| q.to_euler(glam::EulerRot::YXZ).0;
        assert!(yaw(first).abs() >= 3.0 - 1e-4, "{}", yaw(first));
        assert!(second.angle_between(goal) < start.angle_between(goal));

        for _ in 0..900 {
            spring.update(goal, 1.0 / 90.0);
        }
        assert!(spring.current().angle_between(goal) < 1e-3);
        assert!(spring.angular_velocity().length() < 1e-2);
    }
}
