use super::{Arc, ImageBuffer, ImageFrame, Rgba};
use super::RenderImage;
use crate::pipeline::DisplaySurface;

pub(super) fn surface_to_image(surface: &DisplaySurface) -> Option<Arc<RenderImage>> {
    let mut rgba = surface.pixels().to_vec();

    // GPUI expects BGRA; convert in place to avoid the async asset pipeline and flicker.
    for px in rgba.chunks_exact_mut(4) {
        px.swap(0, 2);
    }

    let buffer =
        ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(surface.width(), surface.height(), rgba)?;
    let frame = ImageFrame::new(buffer);

    Some(Arc::new(RenderImage::new(vec![frame])))
}
