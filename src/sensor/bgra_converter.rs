//! Decodes whatever pixel format the capture backend hands us into the
//! vendor-native 32-bit BGRA layout the color channel carries.

use anyhow::{Result, anyhow};
use nokhwa::{Buffer, utils::FrameFormat};
use rayon::prelude::*;
use yuv::{
    YuvBiPlanarImage, YuvConversionMode, YuvPackedImage, YuvRange, YuvStandardMatrix,
    yuv_nv12_to_bgra, yuyv422_to_bgra,
};
use zune_jpeg::{
    JpegDecoder,
    zune_core::{bytestream::ZCursor, colorspace::ColorSpace, options::DecoderOptions},
};

#[derive(Debug)]
pub struct NativeColor {
    pub bgra: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub fn convert_capture_frame(frame: &Buffer) -> Result<NativeColor> {
    let resolution = frame.resolution();
    let width = resolution.width_x;
    let height = resolution.height_y;
    let data = frame.buffer();

    let bgra = match frame.source_frame_format() {
        FrameFormat::NV12 => nv12_to_bgra(data, width, height)?,
        FrameFormat::YUYV => yuyv_to_bgra(data, width, height)?,
        FrameFormat::MJPEG => mjpeg_to_bgra(data)?,
        FrameFormat::RAWRGB => rgb_like_to_bgra(data, width, height, false)?,
        FrameFormat::RAWBGR => rgb_like_to_bgra(data, width, height, true)?,
        FrameFormat::GRAY => gray_to_bgra(data, width, height)?,
    };

    Ok(NativeColor {
        bgra,
        width,
        height,
    })
}

fn nv12_to_bgra(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let y_plane_len = width as usize * height as usize;
    let uv_plane_len = y_plane_len / 2;

    if data.len() < y_plane_len + uv_plane_len {
        return Err(anyhow!(
            "NV12 buffer too small: got {}, expected {}",
            data.len(),
            y_plane_len + uv_plane_len
        ));
    }

    let mut bgra = vec![0u8; y_plane_len * 4];
    let image = YuvBiPlanarImage {
        y_plane: &data[..y_plane_len],
        y_stride: width,
        uv_plane: &data[y_plane_len..y_plane_len + uv_plane_len],
        uv_stride: width,
        width,
        height,
    };

    yuv_nv12_to_bgra(
        &image,
        &mut bgra,
        width * 4,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
        YuvConversionMode::Balanced,
    )
    .map_err(|err| anyhow!("NV12→BGRA failed: {err:?}"))?;

    Ok(bgra)
}

fn yuyv_to_bgra(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize * 2;
    if data.len() < expected_len {
        return Err(anyhow!(
            "YUYV buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }

    let mut bgra = vec![0u8; (width as usize * height as usize) * 4];
    let packed = YuvPackedImage {
        yuy: data,
        yuy_stride: width * 2,
        width,
        height,
    };

    yuyv422_to_bgra(
        &packed,
        &mut bgra,
        width * 4,
        YuvRange::Full,
        YuvStandardMatrix::Bt709,
    )
    .map_err(|err| anyhow!("YUYV422→BGRA failed: {err:?}"))?;

    Ok(bgra)
}

fn mjpeg_to_bgra(data: &[u8]) -> Result<Vec<u8>> {
    let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::BGRA);
    let mut decoder = JpegDecoder::new_with_options(ZCursor::new(data), options);
    let bgra = decoder
        .decode()
        .map_err(|err| anyhow!("MJPEG decode failed: {err:?}"))?;

    if let Some(info) = decoder.info() {
        let expected_len = info.width as usize * info.height as usize * 4;
        if bgra.len() < expected_len {
            return Err(anyhow!(
                "MJPEG decode produced too few bytes: got {}, expected {}",
                bgra.len(),
                expected_len
            ));
        }
    }

    Ok(bgra)
}

fn rgb_like_to_bgra(data: &[u8], width: u32, height: u32, is_bgr: bool) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize * 3;
    if data.len() < expected_len {
        return Err(anyhow!(
            "RGB buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }

    let mut bgra = vec![0u8; (width as usize * height as usize) * 4];
    bgra.par_chunks_mut(4)
        .zip(data.par_chunks_exact(3))
        .for_each(|(dst, src)| {
            if is_bgr {
                dst[0] = src[0];
                dst[1] = src[1];
                dst[2] = src[2];
            } else {
                dst[0] = src[2];
                dst[1] = src[1];
                dst[2] = src[0];
            }
            dst[3] = 255;
        });

    Ok(bgra)
}

fn gray_to_bgra(data: &[u8], width: u32, height: u32) -> Result<Vec<u8>> {
    let expected_len = width as usize * height as usize;
    if data.len() < expected_len {
        return Err(anyhow!(
            "GRAY buffer too small: got {}, expected {}",
            data.len(),
            expected_len
        ));
    }

    let mut bgra = vec![0u8; expected_len * 4];
    bgra.par_chunks_mut(4)
        .zip(data.par_iter().copied())
        .for_each(|(dst, value)| {
            dst[0] = value;
            dst[1] = value;
            dst[2] = value;
            dst[3] = 255;
        });

    Ok(bgra)
}
