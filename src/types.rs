use std::time::Instant;

/// Sensor channels a device can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameChannel {
    Infrared,
    Color,
    Depth,
    Body,
}

impl FrameChannel {
    pub fn label(&self) -> &'static str {
        match self {
            FrameChannel::Infrared => "infrared",
            FrameChannel::Color => "color",
            FrameChannel::Depth => "depth",
            FrameChannel::Body => "body",
        }
    }
}

/// Geometry of one channel's native buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameDescription {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: u32,
}

impl FrameDescription {
    pub fn new(width: u32, height: u32, bytes_per_pixel: u32) -> Self {
        Self {
            width,
            height,
            bytes_per_pixel,
        }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// A buffer is usable only when its pixel count matches the declared
    /// dimensions exactly.
    pub fn matches_buffer(&self, byte_len: usize) -> bool {
        self.bytes_per_pixel != 0 && self.pixel_count() == byte_len / self.bytes_per_pixel as usize
    }
}

/// One frame-arrival notification, tagged by channel.
#[derive(Clone, Debug)]
pub enum FrameEvent {
    Infrared(InfraredFrame),
    Color(ColorFrame),
    Depth(DepthFrame),
    Body(BodyFrame),
}

impl FrameEvent {
    pub fn channel(&self) -> FrameChannel {
        match self {
            FrameEvent::Infrared(_) => FrameChannel::Infrared,
            FrameEvent::Color(_) => FrameChannel::Color,
            FrameEvent::Depth(_) => FrameChannel::Depth,
            FrameEvent::Body(_) => FrameChannel::Body,
        }
    }
}

/// 16-bit infrared samples, one per pixel.
#[derive(Clone, Debug)]
pub struct InfraredFrame {
    pub description: FrameDescription,
    pub pixels: Vec<u16>,
    #[allow(dead_code)]
    pub timestamp: Instant,
}

/// 16-bit millimeter distances, one per pixel.
#[derive(Clone, Debug)]
pub struct DepthFrame {
    pub description: FrameDescription,
    /// Distances below this are noise and render as black.
    pub min_reliable_distance: u16,
    pub pixels: Vec<u16>,
    #[allow(dead_code)]
    pub timestamp: Instant,
}

/// Vendor-native 32-bit BGRA pixels.
#[derive(Clone, Debug)]
pub struct ColorFrame {
    pub description: FrameDescription,
    pub bgra: Vec<u8>,
    #[allow(dead_code)]
    pub timestamp: Instant,
}

#[derive(Clone, Debug)]
pub struct BodyFrame {
    pub bodies: Vec<Body>,
    #[allow(dead_code)]
    pub timestamp: Instant,
}

/// Per-joint tracking confidence reported by the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackingState {
    NotTracked,
    Inferred,
    Tracked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandState {
    NotTracked,
    Unknown,
    Open,
    Closed,
    Lasso,
}

/// 3-D position in camera space, meters. +X left of the sensor (the image is
/// mirrored), +Y up, +Z away from the lens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl CameraPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Joint {
    pub position: CameraPoint,
    pub tracking: TrackingState,
}

impl Joint {
    pub fn not_tracked() -> Self {
        Self {
            position: CameraPoint::new(0.0, 0.0, 0.0),
            tracking: TrackingState::NotTracked,
        }
    }
}

/// Named skeletal landmarks (the 25-joint rig of the sensor).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum JointKind {
    SpineBase,
    SpineMid,
    Neck,
    Head,
    ShoulderLeft,
    ElbowLeft,
    WristLeft,
    HandLeft,
    ShoulderRight,
    ElbowRight,
    WristRight,
    HandRight,
    HipLeft,
    KneeLeft,
    AnkleLeft,
    FootLeft,
    HipRight,
    KneeRight,
    AnkleRight,
    FootRight,
    SpineShoulder,
    HandTipLeft,
    ThumbLeft,
    HandTipRight,
    ThumbRight,
}

impl JointKind {
    pub const COUNT: usize = 25;

    pub const ALL: [JointKind; JointKind::COUNT] = [
        JointKind::SpineBase,
        JointKind::SpineMid,
        JointKind::Neck,
        JointKind::Head,
        JointKind::ShoulderLeft,
        JointKind::ElbowLeft,
        JointKind::WristLeft,
        JointKind::HandLeft,
        JointKind::ShoulderRight,
        JointKind::ElbowRight,
        JointKind::WristRight,
        JointKind::HandRight,
        JointKind::HipLeft,
        JointKind::KneeLeft,
        JointKind::AnkleLeft,
        JointKind::FootLeft,
        JointKind::HipRight,
        JointKind::KneeRight,
        JointKind::AnkleRight,
        JointKind::FootRight,
        JointKind::SpineShoulder,
        JointKind::HandTipLeft,
        JointKind::ThumbLeft,
        JointKind::HandTipRight,
        JointKind::ThumbRight,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// Which screen edges a body's silhouette is touching.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClippedEdges {
    pub top: bool,
    pub bottom: bool,
    pub left: bool,
    pub right: bool,
}

impl ClippedEdges {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.top || self.bottom || self.left || self.right
    }
}

/// One tracked person. Sensor body slots are reused across frames; the
/// tracking id is the stable handle for matching a person between frames.
#[derive(Clone, Debug)]
pub struct Body {
    pub tracking_id: u64,
    pub is_tracked: bool,
    pub joints: [Joint; JointKind::COUNT],
    pub hand_left: HandState,
    pub hand_right: HandState,
    pub clipped_edges: ClippedEdges,
}

impl Body {
    pub fn untracked() -> Self {
        Self {
            tracking_id: 0,
            is_tracked: false,
            joints: [Joint::not_tracked(); JointKind::COUNT],
            hand_left: HandState::NotTracked,
            hand_right: HandState::NotTracked,
            clipped_edges: ClippedEdges::none(),
        }
    }

    pub fn joint(&self, kind: JointKind) -> &Joint {
        &self.joints[kind.index()]
    }

    pub fn joint_mut(&mut self, kind: JointKind) -> &mut Joint {
        &mut self.joints[kind.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_matches_exact_buffer() {
        let desc = FrameDescription::new(512, 424, 2);
        assert!(desc.matches_buffer(512 * 424 * 2));
        assert!(!desc.matches_buffer(512 * 424));
        assert!(!desc.matches_buffer(0));
    }

    #[test]
    fn joint_kind_indices_are_dense() {
        for (i, kind) in JointKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
