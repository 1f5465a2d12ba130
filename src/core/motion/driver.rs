use std::cell::Cell;
use std::rc::Rc;

/// Host capability that delivers one tick per rendered frame.
///
/// The controller asks for frames while an animation (or a bounce dwell) is
/// in progress and cancels the request once it comes to rest. The host then
/// calls `AnimationController::on_frame` or `tick` for every frame it renders.
pub trait FrameDriver {
    fn is_available(&self) -> bool;
    fn request_frames(&mut self);
    fn cancel_frames(&mut self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessDriver;

impl FrameDriver for HeadlessDriver {
    fn is_available(&self) -> bool {
        false
    }

    fn request_frames(&mut self) {}

    fn cancel_frames(&mut self) {}
}

/// Clones share the request flag, so a host loop can keep one clone and poll
/// [`frames_requested`](Self::frames_requested) while the controller owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualDriver {
    requested: Rc<Cell<bool>>,
    requests: Rc<Cell<u64>>,
}

impl ManualDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames_requested(&self) -> bool {
        self.requested.get()
    }

    pub fn request_count(&self) -> u64 {
        self.requests.get()
    }
}

impl FrameDriver for ManualDriver {
    fn is_available(&self) -> bool {
        true
    }

    fn request_frames(&mut self) {
        if !self.requested.replace(true) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    fn cancel_frames(&mut self) {
        self.requested.set(false);
    }
}
