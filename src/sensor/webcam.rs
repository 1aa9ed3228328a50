//! Color-only device backed by a real camera. Depth, infrared and body
//! channels are not available on this backend.

use std::time::Instant;

use anyhow::anyhow;
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    query,
    utils::{ApiBackend, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType},
};

use super::{SensorDevice, SensorError, bgra_converter};
use crate::types::{ColorFrame, FrameChannel, FrameDescription, FrameEvent};

// Prefer pixel formats that are widely supported; some built-in cameras
// reject YUYV even though the backend reports it.
const PREFERRED_PIXEL_FORMATS: &[FrameFormat] = &[
    FrameFormat::RAWRGB,
    FrameFormat::RAWBGR,
    FrameFormat::GRAY,
    FrameFormat::YUYV,
    FrameFormat::NV12,
    FrameFormat::MJPEG,
];

const CHANNELS: [FrameChannel; 1] = [FrameChannel::Color];

fn requested_formats() -> [RequestedFormat<'static>; 4] {
    [
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestFrameRate,
            PREFERRED_PIXEL_FORMATS,
        ),
        RequestedFormat::with_formats(
            RequestedFormatType::AbsoluteHighestResolution,
            PREFERRED_PIXEL_FORMATS,
        ),
        // Fall back to anything decodable, but prefer higher FPS to avoid
        // very low default rates that some drivers reject.
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::None),
    ]
}

pub struct WebcamSensor {
    label: String,
    camera: Camera,
    description: FrameDescription,
}

impl WebcamSensor {
    /// Opens the first camera the platform reports. `DeviceUnavailable`
    /// when none is present.
    pub fn open() -> Result<Self, SensorError> {
        let cameras = query(ApiBackend::Auto).map_err(|err| anyhow!(err))?;
        let Some(info) = cameras.first() else {
            return Err(SensorError::DeviceUnavailable);
        };

        let label = info.human_name();
        let camera = build_camera(info.index().clone())?;
        let resolution = camera.resolution();
        let description = FrameDescription::new(resolution.width_x, resolution.height_y, 4);

        Ok(Self {
            label,
            camera,
            description,
        })
    }
}

fn build_camera(index: CameraIndex) -> Result<Camera, SensorError> {
    let mut last_err = None;

    for requested in requested_formats() {
        match Camera::new(index.clone(), requested) {
            Ok(mut camera) => match camera.open_stream() {
                Ok(()) => return Ok(camera),
                Err(err) => last_err = Some(err),
            },
            Err(err) => last_err = Some(err),
        }
    }

    Err(match last_err {
        Some(err) => SensorError::Backend(anyhow!(err)),
        None => SensorError::DeviceUnavailable,
    })
}

impl SensorDevice for WebcamSensor {
    fn name(&self) -> &str {
        &self.label
    }

    fn channels(&self) -> &[FrameChannel] {
        &CHANNELS
    }

    fn description(&self, channel: FrameChannel) -> Option<FrameDescription> {
        (channel == FrameChannel::Color).then_some(self.description)
    }

    fn acquire(&mut self) -> Result<Option<FrameEvent>, SensorError> {
        // Blocks until the camera has a frame, which paces the stream.
        let frame = match self.camera.frame() {
            Ok(frame) => frame,
            Err(err) => {
                // A missed capture is an empty notification, not a failure.
                log::warn!("camera frame read failed: {err:?}");
                return Ok(None);
            }
        };

        let converted = match bgra_converter::convert_capture_frame(&frame) {
            Ok(native) => native,
            Err(err) => {
                log::warn!("failed to decode camera frame: {err:?}");
                return Ok(None);
            }
        };

        Ok(Some(FrameEvent::Color(ColorFrame {
            description: FrameDescription::new(converted.width, converted.height, 4),
            bgra: converted.bgra,
            timestamp: Instant::now(),
        })))
    }
}
