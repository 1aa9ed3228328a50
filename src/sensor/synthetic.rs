//! Deterministic in-process sensor used when no hardware is present and as
//! the test substrate. Emits all four channels at depth-camera geometry with
//! up to two animated walkers in the scene.

use std::{
    collections::VecDeque,
    thread,
    time::{Duration, Instant},
};

use rayon::prelude::*;

use super::{SensorDevice, SensorError};
use crate::types::{
    Body, BodyFrame, CameraPoint, ClippedEdges, ColorFrame, DepthFrame, FrameChannel,
    FrameDescription, FrameEvent, HandState, InfraredFrame, JointKind, TrackingState,
};

pub const INFRARED_DESCRIPTION: FrameDescription = FrameDescription {
    width: 512,
    height: 424,
    bytes_per_pixel: 2,
};
pub const DEPTH_DESCRIPTION: FrameDescription = FrameDescription {
    width: 512,
    height: 424,
    bytes_per_pixel: 2,
};
pub const COLOR_DESCRIPTION: FrameDescription = FrameDescription {
    width: 1920,
    height: 1080,
    bytes_per_pixel: 4,
};

/// Near noise floor reported with every depth frame.
pub const MIN_RELIABLE_DISTANCE: u16 = 500;

const TICK_INTERVAL: Duration = Duration::from_millis(33);
const CHANNELS: [FrameChannel; 4] = [
    FrameChannel::Infrared,
    FrameChannel::Color,
    FrameChannel::Depth,
    FrameChannel::Body,
];

pub struct SyntheticSensor {
    tick: u64,
    last_tick: Instant,
    pending: VecDeque<FrameEvent>,
}

impl SyntheticSensor {
    pub fn new() -> Self {
        Self {
            tick: 0,
            last_tick: Instant::now() - TICK_INTERVAL,
            pending: VecDeque::new(),
        }
    }

    fn seconds(&self) -> f32 {
        self.tick as f32 * TICK_INTERVAL.as_secs_f32()
    }

    fn generate_tick(&mut self) {
        let now = Instant::now();
        let bodies = self.bodies();
        let infrared = self.infrared_pixels();
        let color = self.color_pixels();
        let depth = self.depth_pixels(&bodies);

        self.pending.push_back(FrameEvent::Infrared(InfraredFrame {
            description: INFRARED_DESCRIPTION,
            pixels: infrared,
            timestamp: now,
        }));
        self.pending.push_back(FrameEvent::Color(ColorFrame {
            description: COLOR_DESCRIPTION,
            bgra: color,
            timestamp: now,
        }));
        self.pending.push_back(FrameEvent::Depth(DepthFrame {
            description: DEPTH_DESCRIPTION,
            min_reliable_distance: MIN_RELIABLE_DISTANCE,
            pixels: depth,
            timestamp: now,
        }));
        self.pending.push_back(FrameEvent::Body(BodyFrame {
            bodies,
            timestamp: now,
        }));
    }

    /// Six hardware body slots; untracked slots stay in the frame.
    fn bodies(&self) -> Vec<Body> {
        let mut bodies = vec![Body::untracked(); 6];
        let t = self.seconds();

        bodies[0] = walker(1, t, 0.0);

        // The second walker leaves the scene every few seconds and comes
        // back with a fresh tracking identifier.
        let epoch = self.tick / 150;
        if epoch % 2 == 0 {
            bodies[1] = walker(2 + epoch / 2, t, std::f32::consts::PI);
        }

        bodies
    }

    fn infrared_pixels(&self) -> Vec<u16> {
        let width = INFRARED_DESCRIPTION.width as usize;
        let height = INFRARED_DESCRIPTION.height as usize;
        let tick = self.tick as usize;

        let mut pixels = vec![0u16; width * height];
        pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, sample) in row.iter_mut().enumerate() {
                    *sample = (((x + tick * 3) * 131) ^ (y * 111)) as u16;
                }
            });
        pixels
    }

    fn depth_pixels(&self, bodies: &[Body]) -> Vec<u16> {
        let width = DEPTH_DESCRIPTION.width as usize;
        let height = DEPTH_DESCRIPTION.height as usize;

        // Silhouette disks where the walkers stand.
        let silhouettes: Vec<(f32, f32, u16)> = bodies
            .iter()
            .filter(|body| body.is_tracked)
            .map(|body| {
                let spine = body.joint(JointKind::SpineMid).position;
                let (x, y) = crate::pipeline::skeleton::project_to_display(
                    spine,
                    DEPTH_DESCRIPTION.width,
                    DEPTH_DESCRIPTION.height,
                );
                (x, y, (spine.z * 1000.0) as u16)
            })
            .collect();

        let mut pixels = vec![0u16; width * height];
        pixels
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, sample) in row.iter_mut().enumerate() {
                    // Left border stays under the noise floor and renders
                    // black downstream.
                    if x < 8 {
                        *sample = 0;
                        continue;
                    }
                    let mut depth = 800 + (y as u32 * 8).min(3600) as u16;
                    for &(sx, sy, sz) in &silhouettes {
                        let (dx, dy) = (x as f32 - sx, y as f32 - sy);
                        if dx * dx + dy * dy < 60.0 * 60.0 {
                            depth = sz;
                        }
                    }
                    *sample = depth;
                }
            });
        pixels
    }

    fn color_pixels(&self) -> Vec<u8> {
        let width = COLOR_DESCRIPTION.width as usize;
        let height = COLOR_DESCRIPTION.height as usize;
        let tick = self.tick as usize;

        let mut bgra = vec![0u8; width * height * 4];
        bgra.par_chunks_mut(width * 4)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, px) in row.chunks_exact_mut(4).enumerate() {
                    px[0] = (x * 256 / width) as u8;
                    px[1] = (y * 256 / height) as u8;
                    px[2] = ((x + y + tick * 4) & 255) as u8;
                    px[3] = 255;
                }
            });
        bgra
    }
}

impl Default for SyntheticSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorDevice for SyntheticSensor {
    fn name(&self) -> &str {
        "synthetic sensor"
    }

    fn channels(&self) -> &[FrameChannel] {
        &CHANNELS
    }

    fn description(&self, channel: FrameChannel) -> Option<FrameDescription> {
        match channel {
            FrameChannel::Infrared => Some(INFRARED_DESCRIPTION),
            FrameChannel::Color => Some(COLOR_DESCRIPTION),
            FrameChannel::Depth => Some(DEPTH_DESCRIPTION),
            // Body frames render in depth geometry.
            FrameChannel::Body => Some(DEPTH_DESCRIPTION),
        }
    }

    fn acquire(&mut self) -> Result<Option<FrameEvent>, SensorError> {
        if let Some(event) = self.pending.pop_front() {
            return Ok(Some(event));
        }

        let elapsed = self.last_tick.elapsed();
        if elapsed < TICK_INTERVAL {
            thread::sleep(TICK_INTERVAL - elapsed);
        }
        self.last_tick = Instant::now();
        self.tick += 1;

        // Every so often a tick carries no frame; consumers must skip it.
        if self.tick % 127 == 0 {
            return Ok(None);
        }

        self.generate_tick();
        Ok(self.pending.pop_front())
    }
}

/// Builds one animated walker: a 25-joint figure strolling an oval path,
/// with gait-phased limbs and cycling hand states.
fn walker(tracking_id: u64, t: f32, phase_offset: f32) -> Body {
    let phase = t * 2.2 + phase_offset;
    let cx = (t * 0.5 + phase_offset).sin() * 1.5;
    let cz = 2.5 + (t * 0.3 + phase_offset).cos();
    let swing = phase.sin() * 0.25;

    let mut body = Body::untracked();
    body.tracking_id = tracking_id;
    body.is_tracked = true;

    let mut set = |kind: JointKind, x: f32, y: f32, z: f32| {
        *body.joint_mut(kind) = crate::types::Joint {
            position: CameraPoint::new(cx + x, y, cz + z),
            tracking: TrackingState::Tracked,
        };
    };

    set(JointKind::Head, 0.0, 0.70, 0.0);
    set(JointKind::Neck, 0.0, 0.55, 0.0);
    set(JointKind::SpineShoulder, 0.0, 0.45, 0.0);
    set(JointKind::SpineMid, 0.0, 0.10, 0.0);
    set(JointKind::SpineBase, 0.0, -0.20, 0.0);

    set(JointKind::ShoulderLeft, 0.22, 0.45, 0.0);
    set(JointKind::ElbowLeft, 0.30, 0.15, swing * 0.4);
    set(JointKind::WristLeft, 0.32, -0.10, swing);
    set(JointKind::HandLeft, 0.33, -0.16, swing);
    set(JointKind::HandTipLeft, 0.33, -0.22, swing);
    set(JointKind::ThumbLeft, 0.28, -0.18, swing);

    set(JointKind::ShoulderRight, -0.22, 0.45, 0.0);
    set(JointKind::ElbowRight, -0.30, 0.15, -swing * 0.4);
    set(JointKind::WristRight, -0.32, -0.10, -swing);
    set(JointKind::HandRight, -0.33, -0.16, -swing);
    set(JointKind::HandTipRight, -0.33, -0.22, -swing);
    set(JointKind::ThumbRight, -0.28, -0.18, -swing);

    set(JointKind::HipLeft, 0.12, -0.25, 0.0);
    set(JointKind::KneeLeft, 0.13, -0.70, -swing * 0.6);
    set(JointKind::AnkleLeft, 0.14, -1.10, -swing);
    set(JointKind::FootLeft, 0.14, -1.15, -swing + 0.08);

    set(JointKind::HipRight, -0.12, -0.25, 0.0);
    set(JointKind::KneeRight, -0.13, -0.70, swing * 0.6);
    set(JointKind::AnkleRight, -0.14, -1.10, swing);
    set(JointKind::FootRight, -0.14, -1.15, swing + 0.08);

    // Lower legs degrade to inferred mid-stride, and an inferred thumb
    // reproduces the negative-Z defect the renderer has to clamp.
    if (phase * 2.0).sin() > 0.3 {
        for kind in [
            JointKind::AnkleLeft,
            JointKind::FootLeft,
            JointKind::AnkleRight,
            JointKind::FootRight,
        ] {
            body.joint_mut(kind).tracking = TrackingState::Inferred;
        }
        body.joint_mut(JointKind::ThumbLeft).tracking = TrackingState::Inferred;
        body.joint_mut(JointKind::ThumbLeft).position.z = -0.05;
    }
    if (phase * 2.0).sin() > 0.8 {
        body.joint_mut(JointKind::FootLeft).tracking = TrackingState::NotTracked;
    }

    body.hand_left = match (t * 0.7) as u64 % 3 {
        0 => HandState::Open,
        1 => HandState::Closed,
        _ => HandState::Lasso,
    };
    body.hand_right = HandState::Open;

    body.clipped_edges = ClippedEdges {
        left: cx > 1.2,
        right: cx < -1.2,
        top: false,
        bottom: cz < 1.7,
    };

    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_one_tick(sensor: &mut SyntheticSensor) -> Vec<FrameEvent> {
        let mut events = Vec::new();
        while events.len() < 4 {
            if let Some(event) = sensor.acquire().expect("synthetic never fails") {
                events.push(event);
            }
        }
        events
    }

    #[test]
    fn emits_every_channel_each_tick() {
        let mut sensor = SyntheticSensor::new();
        let events = drain_one_tick(&mut sensor);
        let channels: Vec<_> = events.iter().map(|e| e.channel()).collect();
        assert_eq!(channels, CHANNELS.to_vec());
    }

    #[test]
    fn frames_match_their_descriptions() {
        let mut sensor = SyntheticSensor::new();
        for event in drain_one_tick(&mut sensor) {
            match event {
                FrameEvent::Infrared(frame) => {
                    assert!(frame.description.matches_buffer(frame.pixels.len() * 2));
                }
                FrameEvent::Depth(frame) => {
                    assert!(frame.description.matches_buffer(frame.pixels.len() * 2));
                    assert_eq!(frame.min_reliable_distance, MIN_RELIABLE_DISTANCE);
                }
                FrameEvent::Color(frame) => {
                    assert!(frame.description.matches_buffer(frame.bgra.len()));
                }
                FrameEvent::Body(frame) => {
                    assert_eq!(frame.bodies.len(), 6);
                }
            }
        }
    }

    #[test]
    fn tracked_bodies_have_nonzero_identifiers() {
        let mut sensor = SyntheticSensor::new();
        for event in drain_one_tick(&mut sensor) {
            if let FrameEvent::Body(frame) = event {
                for body in frame.bodies.iter().filter(|b| b.is_tracked) {
                    assert_ne!(body.tracking_id, 0);
                }
            }
        }
    }
}
