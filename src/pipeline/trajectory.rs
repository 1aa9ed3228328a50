//! Top-down trajectory view: a fixed slot table ties each stable tracking
//! identifier to a color, and positions are mapped into a field-of-view
//! canvas seen from above (camera at the bottom edge).

use super::raster::{self, Color};
use crate::types::CameraPoint;

/// Hardware limit on concurrently tracked people.
pub const MAX_TRACKED_IDENTITIES: usize = 6;

/// Depth span of the field canvas, millimeters.
const FIELD_DEPTH_MM: f32 = 5000.0;

/// Half opening angle of the sensor's horizontal field of view.
const FIELD_OF_VIEW_HALF_ANGLE: f32 = 35.0;

/// One dot color per identity slot.
pub const SLOT_COLORS: [Color; MAX_TRACKED_IDENTITIES] = [
    [220, 38, 38, 255],  // red
    [23, 23, 23, 255],   // near-black
    [34, 197, 94, 255],  // green
    [59, 130, 246, 255], // blue
    [75, 0, 130, 255],   // indigo
    [167, 139, 250, 255], // violet
];

const FIELD_BACKGROUND: Color = [24, 16, 36, 255];
const FIELD_CONE_COLOR: Color = [88, 48, 120, 255];
const MARK_RADIUS: i32 = 7;

/// First-fit slot table mapping tracking identifiers to display slots.
/// Identifier 0 is the sentinel for an unoccupied slot. No eviction and no
/// reordering: a slot keeps its identity until that person leaves the scene.
pub struct IdentityTable {
    ids: [u64; MAX_TRACKED_IDENTITIES],
}

impl IdentityTable {
    pub fn new() -> Self {
        Self {
            ids: [0; MAX_TRACKED_IDENTITIES],
        }
    }

    pub fn slot_of(&self, id: u64) -> Option<usize> {
        if id == 0 {
            return None;
        }
        self.ids.iter().position(|&slot| slot == id)
    }

    /// Reconciles the table with the identifiers tracked this frame: slots
    /// whose identifier vanished are freed, known identifiers keep their
    /// slot, new ones first-fit into a free slot. Returns the slot per input
    /// identifier, `None` when all six slots are taken (that person is
    /// simply not drawn).
    pub fn refresh(&mut self, tracked_ids: &[u64]) -> Vec<Option<usize>> {
        for slot in self.ids.iter_mut() {
            if *slot != 0 && !tracked_ids.contains(slot) {
                *slot = 0;
            }
        }

        tracked_ids
            .iter()
            .map(|&id| {
                if id == 0 {
                    return None;
                }
                if let Some(slot) = self.slot_of(id) {
                    return Some(slot);
                }
                let free = self.ids.iter().position(|&slot| slot == 0)?;
                self.ids[free] = id;
                Some(free)
            })
            .collect()
    }
}

impl Default for IdentityTable {
    fn default() -> Self {
        Self::new()
    }
}

/// One stamped position on the field canvas.
#[derive(Clone, Copy, Debug)]
pub struct FieldMark {
    pub x: f32,
    pub y: f32,
    pub slot: usize,
}

/// Maps a camera-space position (meters) onto the top-view canvas. X mirrors
/// the sensor's mirrored image; Z runs away from the camera at the bottom
/// edge.
pub fn field_position(position: CameraPoint, width: u32, height: u32) -> (f32, f32) {
    let scale = height as f32 / FIELD_DEPTH_MM;
    let x = width as f32 / 2.0 - position.x * 1000.0 * scale;
    let y = height as f32 - position.z * 1000.0 * scale;
    (x, y)
}

/// Vertices of the field-of-view cone: apex at the camera (bottom center),
/// opening toward the far edge.
pub fn field_of_view_triangle(width: u32, height: u32) -> [(f32, f32); 3] {
    let (w, h) = (width as f32, height as f32);
    let spread = h * FIELD_OF_VIEW_HALF_ANGLE.to_radians().sin();
    [
        (w / 2.0, h),
        (w / 2.0 - spread, 0.0),
        (w / 2.0 + spread, 0.0),
    ]
}

/// Redraws the whole field canvas: cone, the session's travelled path as
/// single-pixel traces, and the current positions as filled dots.
pub fn render_field(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    trail: &[FieldMark],
    current: &[FieldMark],
) {
    for px in buffer.chunks_exact_mut(4) {
        px.copy_from_slice(&FIELD_BACKGROUND);
    }
    raster::fill_triangle(
        buffer,
        width,
        height,
        field_of_view_triangle(width, height),
        FIELD_CONE_COLOR,
    );

    for mark in trail {
        raster::put_pixel(
            buffer,
            width,
            height,
            mark.x as i32,
            mark.y as i32,
            SLOT_COLORS[mark.slot % SLOT_COLORS.len()],
        );
    }

    for mark in current {
        raster::fill_circle(
            buffer,
            width,
            height,
            (mark.x as i32, mark.y as i32),
            MARK_RADIUS,
            SLOT_COLORS[mark.slot % SLOT_COLORS.len()],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_identifiers_fill_first_free_slots() {
        let mut table = IdentityTable::new();
        let slots = table.refresh(&[101, 202]);
        assert_eq!(slots, vec![Some(0), Some(1)]);
    }

    #[test]
    fn known_identifier_keeps_its_slot() {
        let mut table = IdentityTable::new();
        table.refresh(&[101, 202]);
        // 101 leaves, 202 stays put.
        let slots = table.refresh(&[202]);
        assert_eq!(slots, vec![Some(1)]);
        // A newcomer reuses the freed slot 0.
        let slots = table.refresh(&[202, 303]);
        assert_eq!(slots, vec![Some(1), Some(0)]);
    }

    #[test]
    fn vanished_identifier_freed_exactly_once() {
        let mut table = IdentityTable::new();
        table.refresh(&[101]);
        assert_eq!(table.slot_of(101), Some(0));
        table.refresh(&[]);
        assert_eq!(table.slot_of(101), None);
        // A second empty refresh changes nothing.
        table.refresh(&[]);
        assert_eq!(table.ids, [0; MAX_TRACKED_IDENTITIES]);
    }

    #[test]
    fn seventh_identity_is_not_assigned() {
        let mut table = IdentityTable::new();
        let six: Vec<u64> = (1..=6).collect();
        let slots = table.refresh(&six);
        assert!(slots.iter().all(|s| s.is_some()));

        let mut seven = six.clone();
        seven.push(7);
        let slots = table.refresh(&seven);
        assert_eq!(slots[6], None);
        // No eviction: the first six keep their slots.
        for (i, slot) in slots[..6].iter().enumerate() {
            assert_eq!(*slot, Some(i));
        }
    }

    #[test]
    fn zero_identifier_never_occupies_a_slot() {
        let mut table = IdentityTable::new();
        let slots = table.refresh(&[0, 101]);
        assert_eq!(slots, vec![None, Some(0)]);
    }

    #[test]
    fn field_position_maps_camera_origin_to_bottom_center() {
        let (x, y) = field_position(CameraPoint::new(0.0, 0.0, 0.0), 512, 424);
        assert_eq!((x, y), (256.0, 424.0));
        // 5m away lands on the far edge.
        let (_, y) = field_position(CameraPoint::new(0.0, 0.0, 5.0), 512, 424);
        assert_eq!(y, 0.0);
    }

    #[test]
    fn field_position_mirrors_x() {
        let (left, _) = field_position(CameraPoint::new(1.0, 0.0, 2.0), 512, 424);
        assert!(left < 256.0);
    }
}
