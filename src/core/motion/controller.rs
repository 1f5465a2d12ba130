use crate::core::motion::driver::{FrameDriver, HeadlessDriver};
use crate::core::motion::integrator::{FrameOutcome, SpringIntegrator};
use crate::core::motion::listeners::{ListenerId, ListenerRegistry};
use crate::domain::models::{SpringError, SpringParameters};
use crate::domain::state_machine::{ControllerMachine, ControllerState};
use std::fmt;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnimationOutcome {
    Completed(f64),
    Interrupted,
}

#[derive(Debug)]
pub struct AnimationHandle {
    receiver: Option<oneshot::Receiver<f64>>,
    outcome: Option<AnimationOutcome>,
}

impl AnimationHandle {
    fn pending() -> (oneshot::Sender<f64>, Self) {
        let (sender, receiver) = oneshot::channel();
        (
            sender,
            Self {
                receiver: Some(receiver),
                outcome: None,
            },
        )
    }

    fn completed(value: f64) -> Self {
        Self {
            receiver: None,
            outcome: Some(AnimationOutcome::Completed(value)),
        }
    }

    pub fn try_outcome(&mut self) -> Option<AnimationOutcome> {
        if self.outcome.is_none() {
            if let Some(receiver) = self.receiver.as_mut() {
                match receiver.try_recv() {
                    Ok(value) => self.outcome = Some(AnimationOutcome::Completed(value)),
                    Err(TryRecvError::Closed) => self.outcome = Some(AnimationOutcome::Interrupted),
                    Err(TryRecvError::Empty) => {}
                }
            }
        }
        self.outcome
    }

    pub fn is_finished(&mut self) -> bool {
        self.try_outcome().is_some()
    }

    pub async fn finished(mut self) -> AnimationOutcome {
        if let Some(outcome) = self.try_outcome() {
            return outcome;
        }
        match self.receiver.take() {
            Some(receiver) => match receiver.await {
                Ok(value) => AnimationOutcome::Completed(value),
                Err(_) => AnimationOutcome::Interrupted,
            },
            None => AnimationOutcome::Interrupted,
        }
    }
}

struct Animation {
    integrator: SpringIntegrator,
    completion: Option<oneshot::Sender<f64>>,
}

#[derive(Debug, Clone, Copy)]
struct BounceLoop {
    min: f64,
    max: f64,
    dwell: f64,
    hold: Option<f64>,
}

impl BounceLoop {
    fn opposite(&self, current: f64) -> f64 {
        if current == self.max {
            self.min
        } else {
            self.max
        }
    }
}

pub struct AnimationController {
    parameters: SpringParameters,
    value: f64,
    target: f64,
    animation: Option<Animation>,
    machine: ControllerMachine,
    listeners: ListenerRegistry,
    driver: Box<dyn FrameDriver>,
    frames_wanted: bool,
    last_frame: Option<Instant>,
    bounce: Option<BounceLoop>,
}

impl AnimationController {
    pub fn new(
        parameters: SpringParameters,
        initial_value: f64,
        driver: impl FrameDriver + 'static,
    ) -> Self {
        Self {
            parameters,
            value: initial_value,
            target: initial_value,
            animation: None,
            machine: ControllerMachine::new(),
            listeners: ListenerRegistry::new(),
            driver: Box::new(driver),
            frames_wanted: false,
            last_frame: None,
            bounce: None,
        }
    }

    pub fn headless(parameters: SpringParameters, initial_value: f64) -> Self {
        Self::new(parameters, initial_value, HeadlessDriver)
    }

    pub fn toggle(
        parameters: SpringParameters,
        initial: bool,
        driver: impl FrameDriver + 'static,
    ) -> Self {
        Self::new(parameters, if initial { 1.0 } else { 0.0 }, driver)
    }

    /// Controller that starts at `min`, springs to `max`, and keeps alternating,
    /// resting `period` at each end, until disposed.
    pub fn bounce(
        parameters: SpringParameters,
        min: f64,
        max: f64,
        period: Duration,
        driver: impl FrameDriver + 'static,
    ) -> Result<Self, SpringError> {
        ensure_finite_target(min)?;
        ensure_finite_target(max)?;
        let mut controller = Self::new(parameters, min, driver);
        controller.bounce = Some(BounceLoop {
            min,
            max,
            dwell: period.as_secs_f64(),
            hold: None,
        });
        controller.start_animation(max)?;
        Ok(controller)
    }

    pub fn parameters(&self) -> &SpringParameters {
        &self.parameters
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn velocity(&self) -> f64 {
        self.animation
            .as_ref()
            .map(|animation| animation.integrator.velocity())
            .unwrap_or(0.0)
    }

    pub fn state(&self) -> ControllerState {
        self.machine.state()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn is_completed(&self) -> bool {
        !self.machine.is_disposed() && self.animation.is_none() && self.value == self.target
    }

    pub fn is_disposed(&self) -> bool {
        self.machine.is_disposed()
    }

    pub fn wants_frames(&self) -> bool {
        self.frames_wanted
    }

    pub fn add_listener(&mut self, listener: impl FnMut(f64) + 'static) -> ListenerId {
        self.listeners.add(listener)
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(id)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Springs from the current value toward `target`.
    ///
    /// A running animation is rebased instead of restarted, so value and
    /// velocity carry over. Without a frame source the target is applied at
    /// once and the returned handle is already complete.
    pub fn animate_to(&mut self, target: f64) -> Result<AnimationHandle, SpringError> {
        self.guard("animate_to")?;
        ensure_finite_target(target)?;
        self.start_animation(target)
    }

    pub fn set_value(&mut self, value: f64) -> Result<(), SpringError> {
        self.guard("set_value")?;
        ensure_finite_target(value)?;
        self.interrupt();
        self.target = value;
        self.publish_value(value);
        self.machine.rest("set_value")
    }

    pub fn stop(&mut self) {
        if self.machine.is_disposed() {
            return;
        }
        self.interrupt();
        self.target = self.value;
        self.machine.settle();
    }

    pub fn reset(&mut self) -> Result<(), SpringError> {
        self.guard("reset")?;
        self.interrupt();
        self.target = 0.0;
        self.publish_value(0.0);
        self.machine.rest("reset")
    }

    pub fn toggle_value(&mut self) -> Result<AnimationHandle, SpringError> {
        if self.target == 0.0 {
            self.animate_to(1.0)
        } else {
            self.animate_to(0.0)
        }
    }

    pub fn forward(&mut self) -> Result<AnimationHandle, SpringError> {
        self.animate_to(1.0)
    }

    pub fn reverse(&mut self) -> Result<AnimationHandle, SpringError> {
        self.animate_to(0.0)
    }

    pub fn dispose(&mut self) {
        if self.machine.is_disposed() {
            return;
        }
        self.interrupt();
        self.bounce = None;
        self.machine.dispose();
        tracing::debug!(value = self.value, "animation controller disposed");
    }

    pub fn on_frame(&mut self, now: Instant) -> bool {
        let delta = self
            .last_frame
            .map(|previous| now.saturating_duration_since(previous).as_secs_f64())
            .unwrap_or(0.0);
        self.last_frame = Some(now);
        self.tick(delta)
    }

    pub fn tick(&mut self, delta_seconds: f64) -> bool {
        if self.machine.is_disposed() {
            return false;
        }
        let outcome = self
            .animation
            .as_mut()
            .map(|animation| animation.integrator.advance(delta_seconds));
        match outcome {
            Some(FrameOutcome::Moved(value)) => {
                tracing::trace!(value, "spring frame");
                self.apply_value(value);
            }
            Some(FrameOutcome::Settled(value)) => self.finish_animation(value),
            Some(FrameOutcome::Idle) => {
                self.animation = None;
                self.machine.settle();
                self.cancel_frames();
            }
            None => self.advance_bounce_hold(delta_seconds),
        }
        self.frames_wanted
    }

    fn guard(&self, operation: &'static str) -> Result<(), SpringError> {
        self.machine.ensure_usable(operation).inspect_err(|error| {
            tracing::warn!(code = error.code(), "{error}");
        })
    }

    fn start_animation(&mut self, target: f64) -> Result<AnimationHandle, SpringError> {
        self.target = target;
        if let Some(bounce) = self.bounce.as_mut() {
            bounce.hold = None;
        }

        if !self.driver.is_available() {
            tracing::debug!(to = target, "no frame source, applying target immediately");
            self.cancel_animation();
            self.publish_value(target);
            self.machine.rest("animate_to")?;
            return Ok(AnimationHandle::completed(target));
        }

        let integrator = match self.animation.take() {
            Some(previous) if previous.integrator.is_running() => {
                tracing::debug!(
                    value = self.value,
                    velocity = previous.integrator.velocity(),
                    to = target,
                    "retargeting running spring"
                );
                previous.integrator.rebase(target)
            }
            _ => {
                let mut fresh = SpringIntegrator::new(self.parameters, self.value, target);
                fresh.start();
                tracing::debug!(from = self.value, to = target, "spring animation started");
                fresh
            }
        };

        let (sender, handle) = AnimationHandle::pending();
        self.animation = Some(Animation {
            integrator,
            completion: Some(sender),
        });
        self.machine.begin("animate_to")?;
        self.request_frames();
        Ok(handle)
    }

    fn finish_animation(&mut self, value: f64) {
        let finished = self.animation.take();
        self.target = value;
        self.publish_value(value);
        self.machine.settle();

        if let Some(animation) = finished {
            tracing::debug!(
                value,
                elapsed = animation.integrator.elapsed(),
                "spring animation settled"
            );
            if let Some(sender) = animation.completion {
                // The caller may have dropped its handle.
                let _ = sender.send(value);
            }
        }

        let dwell = match self.bounce.as_mut() {
            Some(bounce) if self.driver.is_available() => {
                bounce.hold = Some(bounce.dwell);
                Some(bounce.dwell)
            }
            _ => None,
        };
        match dwell {
            Some(dwell) if dwell <= 0.0 => self.advance_bounce_hold(0.0),
            Some(_) => {}
            None => self.cancel_frames(),
        }
    }

    fn advance_bounce_hold(&mut self, delta_seconds: f64) {
        let next = {
            let Some(bounce) = self.bounce.as_mut() else {
                return;
            };
            let Some(remaining) = bounce.hold else {
                return;
            };
            let remaining = remaining - delta_seconds.max(0.0);
            if remaining > 0.0 {
                bounce.hold = Some(remaining);
                return;
            }
            bounce.hold = None;
            bounce.opposite(self.target)
        };
        if let Err(error) = self.start_animation(next) {
            tracing::warn!(code = error.code(), "bounce could not continue: {error}");
        }
    }

    fn interrupt(&mut self) {
        self.cancel_animation();
        self.cancel_frames();
        if let Some(bounce) = self.bounce.as_mut() {
            bounce.hold = None;
        }
    }

    fn cancel_animation(&mut self) {
        if let Some(mut animation) = self.animation.take() {
            animation.integrator.stop();
            tracing::debug!(value = self.value, "spring animation interrupted");
        }
    }

    fn request_frames(&mut self) {
        if !self.frames_wanted {
            self.frames_wanted = true;
            self.last_frame = None;
            self.driver.request_frames();
        }
    }

    fn cancel_frames(&mut self) {
        if self.frames_wanted {
            self.frames_wanted = false;
            self.driver.cancel_frames();
        }
        self.last_frame = None;
    }

    // Per-frame updates only notify on change.
    fn apply_value(&mut self, value: f64) {
        if self.value != value {
            self.publish_value(value);
        }
    }

    fn publish_value(&mut self, value: f64) {
        self.value = value;
        self.listeners.notify(value);
    }
}

impl fmt::Debug for AnimationController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AnimationController")
            .field("parameters", &self.parameters)
            .field("value", &self.value)
            .field("target", &self.target)
            .field("state", &self.machine.state())
            .field("frames_wanted", &self.frames_wanted)
            .field("listeners", &self.listeners)
            .finish()
    }
}

fn ensure_finite_target(target: f64) -> Result<(), SpringError> {
    if !target.is_finite() {
        return Err(SpringError::validation(
            "target",
            format!("animation targets must be finite, got {target}"),
        ));
    }
    Ok(())
}
