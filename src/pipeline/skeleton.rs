use super::raster::{self, Color};
use crate::types::{Body, CameraPoint, HandState, JointKind, TrackingState};

/// The fixed bone graph: torso, arms, legs. Never mutated.
pub const BONES: &[(JointKind, JointKind)] = &[
    // Torso
    (JointKind::Head, JointKind::Neck),
    (JointKind::Neck, JointKind::SpineShoulder),
    (JointKind::SpineShoulder, JointKind::SpineMid),
    (JointKind::SpineMid, JointKind::SpineBase),
    (JointKind::SpineShoulder, JointKind::ShoulderRight),
    (JointKind::SpineShoulder, JointKind::ShoulderLeft),
    (JointKind::SpineBase, JointKind::HipRight),
    (JointKind::SpineBase, JointKind::HipLeft),
    // Right arm
    (JointKind::ShoulderRight, JointKind::ElbowRight),
    (JointKind::ElbowRight, JointKind::WristRight),
    (JointKind::WristRight, JointKind::HandRight),
    (JointKind::HandRight, JointKind::HandTipRight),
    (JointKind::WristRight, JointKind::ThumbRight),
    // Left arm
    (JointKind::ShoulderLeft, JointKind::ElbowLeft),
    (JointKind::ElbowLeft, JointKind::WristLeft),
    (JointKind::WristLeft, JointKind::HandLeft),
    (JointKind::HandLeft, JointKind::HandTipLeft),
    (JointKind::WristLeft, JointKind::ThumbLeft),
    // Right leg
    (JointKind::HipRight, JointKind::KneeRight),
    (JointKind::KneeRight, JointKind::AnkleRight),
    (JointKind::AnkleRight, JointKind::FootRight),
    // Left leg
    (JointKind::HipLeft, JointKind::KneeLeft),
    (JointKind::KneeLeft, JointKind::AnkleLeft),
    (JointKind::AnkleLeft, JointKind::FootLeft),
];

/// One color per sensor body slot (the hardware tracks at most 6).
pub const BODY_COLORS: [Color; 6] = [
    [220, 38, 38, 255],  // red
    [249, 115, 22, 255], // orange
    [34, 197, 94, 255],  // green
    [59, 130, 246, 255], // blue
    [75, 0, 130, 255],   // indigo
    [167, 139, 250, 255], // violet
];

pub const BACKGROUND_COLOR: Color = [48, 0, 80, 255];

const TRACKED_JOINT_COLOR: Color = [68, 192, 68, 255];
const INFERRED_JOINT_COLOR: Color = [250, 204, 21, 255];
const INFERRED_BONE_COLOR: Color = [128, 128, 128, 255];
const EDGE_INDICATOR_COLOR: Color = [75, 0, 130, 255];
const HAND_CLOSED_COLOR: Color = [255, 0, 0, 255];
const HAND_OPEN_COLOR: Color = [0, 255, 0, 255];
const HAND_LASSO_COLOR: Color = [0, 0, 255, 255];

const JOINT_RADIUS: i32 = 3;
const HAND_RADIUS: i32 = 20;
const CLIP_BOUNDS_THICKNESS: i32 = 10;
const BONE_THICKNESS: i32 = 6;
const INFERRED_BONE_THICKNESS: i32 = 1;

/// Inferred poses occasionally report a negative Z, which a pinhole
/// projection maps to infinity. Clamp before projecting.
const INFERRED_Z_POSITION_CLAMP: f32 = 0.1;

/// Focal length of the depth camera in pixels (512x424 geometry).
const DEPTH_FOCAL_LENGTH: f32 = 365.456;

/// Projects a camera-space joint into display coordinates via a pinhole
/// model centered on the surface. Always finite thanks to the Z clamp.
pub fn project_to_display(position: CameraPoint, width: u32, height: u32) -> (f32, f32) {
    let z = position.z.max(INFERRED_Z_POSITION_CLAMP);
    let x = width as f32 / 2.0 + position.x * DEPTH_FOCAL_LENGTH / z;
    let y = height as f32 / 2.0 - position.y * DEPTH_FOCAL_LENGTH / z;
    (x, y)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BoneStyle {
    Tracked,
    Inferred,
}

/// A bone draws only when both endpoints are at least inferred, and in the
/// body's own color only when both are fully tracked.
pub fn bone_style(a: TrackingState, b: TrackingState) -> Option<BoneStyle> {
    if a == TrackingState::NotTracked || b == TrackingState::NotTracked {
        return None;
    }
    if a == TrackingState::Tracked && b == TrackingState::Tracked {
        Some(BoneStyle::Tracked)
    } else {
        Some(BoneStyle::Inferred)
    }
}

/// Draws every tracked body into the buffer: bones, joints, hand-state
/// circles and edge-clipping indicator bars.
pub fn draw_bodies(buffer: &mut [u8], width: u32, height: u32, bodies: &[Body]) {
    for (slot, body) in bodies.iter().enumerate() {
        let body_color = BODY_COLORS[slot % BODY_COLORS.len()];
        if !body.is_tracked {
            continue;
        }

        draw_clipped_edges(buffer, width, height, body);

        let mut points = [(0.0f32, 0.0f32); JointKind::COUNT];
        for kind in JointKind::ALL {
            points[kind.index()] = project_to_display(body.joint(kind).position, width, height);
        }

        for &(a, b) in BONES {
            let style = bone_style(body.joint(a).tracking, body.joint(b).tracking);
            let (color, thickness) = match style {
                Some(BoneStyle::Tracked) => (body_color, BONE_THICKNESS),
                Some(BoneStyle::Inferred) => (INFERRED_BONE_COLOR, INFERRED_BONE_THICKNESS),
                None => continue,
            };
            raster::draw_line(
                buffer,
                width,
                height,
                points[a.index()],
                points[b.index()],
                color,
                thickness,
            );
        }

        for kind in JointKind::ALL {
            let color = match body.joint(kind).tracking {
                TrackingState::Tracked => TRACKED_JOINT_COLOR,
                TrackingState::Inferred => INFERRED_JOINT_COLOR,
                TrackingState::NotTracked => continue,
            };
            let (x, y) = points[kind.index()];
            raster::fill_circle(buffer, width, height, (x as i32, y as i32), JOINT_RADIUS, color);
        }

        draw_hand(buffer, width, height, body.hand_left, points[JointKind::HandLeft.index()]);
        draw_hand(buffer, width, height, body.hand_right, points[JointKind::HandRight.index()]);
    }
}

/// Red circle = closed, green = open, blue = lasso. Untracked hands draw
/// nothing.
fn draw_hand(buffer: &mut [u8], width: u32, height: u32, state: HandState, position: (f32, f32)) {
    let color = match state {
        HandState::Closed => HAND_CLOSED_COLOR,
        HandState::Open => HAND_OPEN_COLOR,
        HandState::Lasso => HAND_LASSO_COLOR,
        HandState::NotTracked | HandState::Unknown => return,
    };
    raster::fill_circle(
        buffer,
        width,
        height,
        (position.0 as i32, position.1 as i32),
        HAND_RADIUS,
        color,
    );
}

fn draw_clipped_edges(buffer: &mut [u8], width: u32, height: u32, body: &Body) {
    let edges = body.clipped_edges;
    if !edges.any() {
        return;
    }
    let (w, h) = (width as i32, height as i32);

    if edges.bottom {
        raster::fill_rect(
            buffer,
            width,
            height,
            0,
            h - CLIP_BOUNDS_THICKNESS,
            w,
            CLIP_BOUNDS_THICKNESS,
            EDGE_INDICATOR_COLOR,
        );
    }
    if edges.top {
        raster::fill_rect(buffer, width, height, 0, 0, w, CLIP_BOUNDS_THICKNESS, EDGE_INDICATOR_COLOR);
    }
    if edges.left {
        raster::fill_rect(buffer, width, height, 0, 0, CLIP_BOUNDS_THICKNESS, h, EDGE_INDICATOR_COLOR);
    }
    if edges.right {
        raster::fill_rect(
            buffer,
            width,
            height,
            w - CLIP_BOUNDS_THICKNESS,
            0,
            CLIP_BOUNDS_THICKNESS,
            h,
            EDGE_INDICATOR_COLOR,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Body, CameraPoint, HandState, TrackingState};

    #[test]
    fn bone_style_truth_table() {
        use TrackingState::*;
        assert_eq!(bone_style(Tracked, Tracked), Some(BoneStyle::Tracked));
        assert_eq!(bone_style(Tracked, Inferred), Some(BoneStyle::Inferred));
        assert_eq!(bone_style(Inferred, Tracked), Some(BoneStyle::Inferred));
        assert_eq!(bone_style(Inferred, Inferred), Some(BoneStyle::Inferred));
        assert_eq!(bone_style(NotTracked, Tracked), None);
        assert_eq!(bone_style(Inferred, NotTracked), None);
        assert_eq!(bone_style(NotTracked, NotTracked), None);
    }

    #[test]
    fn bone_graph_is_complete() {
        assert_eq!(BONES.len(), 24);
        // Every joint except the four spine/neck chain midpoints appears as
        // a bone endpoint; spot-check the extremities.
        for kind in [
            JointKind::Head,
            JointKind::HandTipLeft,
            JointKind::ThumbRight,
            JointKind::FootLeft,
            JointKind::FootRight,
        ] {
            assert!(
                BONES.iter().any(|&(a, b)| a == kind || b == kind),
                "{kind:?} missing from bone graph"
            );
        }
    }

    #[test]
    fn negative_z_projects_finite() {
        let (x, y) = project_to_display(CameraPoint::new(0.3, -0.2, -1.5), 512, 424);
        assert!(x.is_finite() && y.is_finite());
        // Clamped to 0.1, identical to a joint sitting right at the clamp.
        let (cx, cy) = project_to_display(CameraPoint::new(0.3, -0.2, 0.1), 512, 424);
        assert_eq!((x, y), (cx, cy));
    }

    #[test]
    fn origin_projects_to_surface_center() {
        let (x, y) = project_to_display(CameraPoint::new(0.0, 0.0, 2.0), 512, 424);
        assert_eq!((x, y), (256.0, 212.0));
    }

    #[test]
    fn untracked_body_draws_nothing() {
        let mut buf = vec![0u8; 64 * 64 * 4];
        draw_bodies(&mut buf, 64, 64, &[Body::untracked()]);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn tracked_hand_draws_circle() {
        let mut body = Body::untracked();
        body.is_tracked = true;
        body.tracking_id = 1;
        body.hand_left = HandState::Closed;
        body.joint_mut(JointKind::HandLeft).position = CameraPoint::new(0.0, 0.0, 2.0);

        let mut buf = vec![0u8; 64 * 64 * 4];
        draw_bodies(&mut buf, 64, 64, &[body]);
        let center = (32 * 64 + 32) * 4;
        assert_eq!(&buf[center..center + 4], &HAND_CLOSED_COLOR);
    }

    #[test]
    fn clipped_edge_paints_indicator_bar() {
        let mut body = Body::untracked();
        body.is_tracked = true;
        body.tracking_id = 1;
        body.clipped_edges.top = true;

        let mut buf = vec![0u8; 64 * 64 * 4];
        draw_bodies(&mut buf, 64, 64, &[body]);
        assert_eq!(&buf[0..4], &EDGE_INDICATOR_COLOR);
    }
}
