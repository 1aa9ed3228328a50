use rayon::prelude::*;

use super::convert::{depth_to_byte, infrared_to_grey};
use crate::types::{ColorFrame, DepthFrame, FrameDescription, InfraredFrame};

/// Reusable RGBA pixel buffer backing the on-screen image for the active
/// channel. Recreated whenever the channel (and thus the geometry) changes,
/// owned by the window for its whole lifetime.
pub struct DisplaySurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
    dirty: bool,
}

/// Scoped-write bracket over the surface pixels. The whole surface is marked
/// dirty when the guard is released, on every exit path.
pub struct SurfaceWrite<'a> {
    surface: &'a mut DisplaySurface,
}

impl SurfaceWrite<'_> {
    pub fn pixels(&mut self) -> &mut [u8] {
        &mut self.surface.pixels
    }
}

impl Drop for SurfaceWrite<'_> {
    fn drop(&mut self) {
        self.surface.dirty = true;
    }
}

impl DisplaySurface {
    pub fn new(width: u32, height: u32) -> Self {
        let mut pixels = vec![0u8; (width as usize) * (height as usize) * 4];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self {
            width,
            height,
            pixels,
            dirty: true,
        }
    }

    pub fn for_description(description: &FrameDescription) -> Self {
        Self::new(description.width, description.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns whether the surface changed since the last call, clearing
    /// the mark.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    pub fn lock(&mut self) -> SurfaceWrite<'_> {
        SurfaceWrite { surface: self }
    }

    /// Floods the surface with one color, alpha forced opaque.
    pub fn fill(&mut self, color: [u8; 4]) {
        let mut write = self.lock();
        for px in write.pixels().chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// The invariant gating every conversion: the buffer must carry exactly
    /// the declared pixel count and the frame must match the surface size.
    fn accepts(&self, description: &FrameDescription, byte_len: usize) -> bool {
        description.matches_buffer(byte_len)
            && description.width == self.width
            && description.height == self.height
    }

    /// Converts a 16-bit infrared frame into grey pixels. A frame whose
    /// dimensions disagree with the surface is dropped whole; nothing is
    /// written and no error is surfaced.
    pub fn write_infrared(&mut self, frame: &InfraredFrame) {
        if !self.accepts(&frame.description, frame.pixels.len() * 2) {
            log::debug!(
                "dropping infrared frame {}x{} ({} samples), surface is {}x{}",
                frame.description.width,
                frame.description.height,
                frame.pixels.len(),
                self.width,
                self.height
            );
            return;
        }

        let mut write = self.lock();
        write
            .pixels()
            .par_chunks_mut(4)
            .zip(frame.pixels.par_iter().copied())
            .for_each(|(dst, sample)| {
                let grey = infrared_to_grey(sample);
                dst[0] = grey;
                dst[1] = grey;
                dst[2] = grey;
                dst[3] = 255;
            });
    }

    /// Converts a millimeter depth frame into grey pixels, black outside the
    /// reliable range. Same drop-whole-frame rule as infrared.
    pub fn write_depth(&mut self, frame: &DepthFrame) {
        if !self.accepts(&frame.description, frame.pixels.len() * 2) {
            log::debug!(
                "dropping depth frame {}x{} ({} samples), surface is {}x{}",
                frame.description.width,
                frame.description.height,
                frame.pixels.len(),
                self.width,
                self.height
            );
            return;
        }

        // Far field past the reliable range is deliberately kept visible;
        // only the near noise floor is clamped out.
        let min_reliable = frame.min_reliable_distance;
        let max_reliable = u16::MAX;

        let mut write = self.lock();
        write
            .pixels()
            .par_chunks_mut(4)
            .zip(frame.pixels.par_iter().copied())
            .for_each(|(dst, depth)| {
                let grey = depth_to_byte(depth, min_reliable, max_reliable);
                dst[0] = grey;
                dst[1] = grey;
                dst[2] = grey;
                dst[3] = 255;
            });
    }

    /// Copies a native 32-bit BGRA frame into the surface. Pure byte
    /// shuffling, no numeric transform.
    pub fn write_color(&mut self, frame: &ColorFrame) {
        if !self.accepts(&frame.description, frame.bgra.len()) {
            log::debug!(
                "dropping color frame {}x{}, surface is {}x{}",
                frame.description.width,
                frame.description.height,
                self.width,
                self.height
            );
            return;
        }

        let mut write = self.lock();
        write
            .pixels()
            .par_chunks_mut(4)
            .zip(frame.bgra.par_chunks_exact(4))
            .for_each(|(dst, src)| {
                dst[0] = src[2];
                dst[1] = src[1];
                dst[2] = src[0];
                dst[3] = src[3];
            });
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    fn infrared_frame(width: u32, height: u32, sample: u16) -> InfraredFrame {
        InfraredFrame {
            description: FrameDescription::new(width, height, 2),
            pixels: vec![sample; (width * height) as usize],
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn matching_infrared_frame_written_and_marked_dirty() {
        let mut surface = DisplaySurface::new(4, 4);
        assert!(surface.take_dirty());

        surface.write_infrared(&infrared_frame(4, 4, u16::MAX));
        assert!(surface.take_dirty());
        let grey = infrared_to_grey(u16::MAX);
        assert_eq!(&surface.pixels()[0..4], &[grey, grey, grey, 255]);
    }

    #[test]
    fn mismatched_dimensions_write_nothing() {
        let mut surface = DisplaySurface::new(4, 4);
        surface.take_dirty();
        let before = surface.pixels().to_vec();

        surface.write_infrared(&infrared_frame(5, 4, u16::MAX));
        assert_eq!(surface.pixels(), before.as_slice());
        assert!(!surface.take_dirty());
    }

    #[test]
    fn short_buffer_writes_nothing() {
        let mut surface = DisplaySurface::new(4, 4);
        surface.take_dirty();
        let before = surface.pixels().to_vec();

        let frame = InfraredFrame {
            description: FrameDescription::new(4, 4, 2),
            pixels: vec![1000; 10],
            timestamp: Instant::now(),
        };
        surface.write_infrared(&frame);
        assert_eq!(surface.pixels(), before.as_slice());
        assert!(!surface.take_dirty());
    }

    #[test]
    fn depth_frame_respects_reliable_range() {
        let mut surface = DisplaySurface::new(2, 1);
        let frame = DepthFrame {
            description: FrameDescription::new(2, 1, 2),
            min_reliable_distance: 500,
            pixels: vec![499, 3100],
            timestamp: Instant::now(),
        };
        surface.write_depth(&frame);
        assert_eq!(&surface.pixels()[0..4], &[0, 0, 0, 255]);
        assert_eq!(&surface.pixels()[4..8], &[100, 100, 100, 255]);
    }

    #[test]
    fn color_frame_swizzles_bgra_to_rgba() {
        let mut surface = DisplaySurface::new(1, 1);
        let frame = ColorFrame {
            description: FrameDescription::new(1, 1, 4),
            bgra: vec![10, 20, 30, 255],
            timestamp: Instant::now(),
        };
        surface.write_color(&frame);
        assert_eq!(surface.pixels(), &[30, 20, 10, 255]);
    }

    #[test]
    fn scoped_write_marks_dirty_on_release() {
        let mut surface = DisplaySurface::new(2, 2);
        surface.take_dirty();
        {
            let mut write = surface.lock();
            write.pixels()[0] = 7;
        }
        assert!(surface.take_dirty());
    }
}
