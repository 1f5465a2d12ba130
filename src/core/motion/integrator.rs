use crate::domain::models::SpringParameters;

pub const MAX_FRAME_DELTA: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameOutcome {
    Idle,
    Moved(f64),
    Settled(f64),
}

#[derive(Debug, Clone)]
pub struct SpringIntegrator {
    parameters: SpringParameters,
    from: f64,
    to: f64,
    value: f64,
    velocity: f64,
    running: bool,
    elapsed: f64,
}

impl SpringIntegrator {
    pub fn new(parameters: SpringParameters, from: f64, to: f64) -> Self {
        Self {
            parameters,
            from,
            to,
            value: from,
            velocity: parameters.initial_velocity(),
            running: false,
            elapsed: 0.0,
        }
    }

    pub fn parameters(&self) -> &SpringParameters {
        &self.parameters
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Semi-implicit Euler: velocity is updated first and the new velocity
    /// moves the position. Non-positive (or NaN) deltas leave the state untouched.
    pub fn step(&mut self, delta_seconds: f64) {
        if !(delta_seconds > 0.0) {
            return;
        }
        let dt = delta_seconds.min(MAX_FRAME_DELTA);
        let displacement = self.value - self.to;
        let spring_force = -self.parameters.stiffness() * displacement;
        let damping_force = -self.parameters.damping() * self.velocity;
        let acceleration = (spring_force + damping_force) / self.parameters.mass();

        self.velocity += acceleration * dt;
        self.value += self.velocity * dt;
        self.elapsed += dt;
    }

    pub fn should_complete(&self) -> bool {
        let tolerance = self.parameters.tolerance();
        (self.value - self.to).abs() < tolerance && self.velocity.abs() < tolerance
    }

    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.elapsed = 0.0;
        true
    }

    pub fn advance(&mut self, delta_seconds: f64) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Idle;
        }
        self.step(delta_seconds);
        if self.should_complete() {
            self.value = self.to;
            self.velocity = 0.0;
            self.running = false;
            return FrameOutcome::Settled(self.value);
        }
        FrameOutcome::Moved(self.value)
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn reset(&mut self) {
        self.value = self.from;
        self.velocity = self.parameters.initial_velocity();
        self.running = false;
        self.elapsed = 0.0;
    }

    pub fn is_completed(&self) -> bool {
        !self.running && (self.value - self.to).abs() < self.parameters.tolerance()
    }

    pub fn rebase(&self, target: f64) -> SpringIntegrator {
        SpringIntegrator {
            parameters: self.parameters,
            from: self.value,
            to: target,
            value: self.value,
            velocity: self.velocity,
            running: self.running,
            elapsed: self.elapsed,
        }
    }

    pub fn update_target(&mut self, target: f64) {
        *self = self.rebase(target);
    }
}
