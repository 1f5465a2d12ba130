use crate::core::motion::controller::AnimationController;
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

pub const FRAME_INTERVAL: Duration = Duration::from_nanos(16_666_667);

/// Pumps frames into `controller` until it stops asking for them.
///
/// Never returns for a controller that keeps requesting frames (for example a
/// bounce loop); use [`drive_frames`] to bound those.
pub async fn drive_until_idle(controller: &mut AnimationController, frame_interval: Duration) -> u64 {
    pump(controller, frame_interval, None).await
}

pub async fn drive_frames(
    controller: &mut AnimationController,
    frame_interval: Duration,
    max_frames: u64,
) -> u64 {
    pump(controller, frame_interval, Some(max_frames)).await
}

async fn pump(
    controller: &mut AnimationController,
    frame_interval: Duration,
    max_frames: Option<u64>,
) -> u64 {
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut frames = 0;
    while controller.wants_frames() && max_frames.map_or(true, |max| frames < max) {
        let now = ticker.tick().await;
        controller.on_frame(now.into_std());
        frames += 1;
    }
    tracing::debug!(frames, value = controller.value(), "frame pump finished");
    frames
}
