//! Per-channel pixel transforms. Each conversion is a stateless function of
//! one native sample; whole-buffer application lives in the display surface.

/// Lower bound of rendered infrared intensity. Raising it moves the dark
/// "brightness wall" closer.
pub const INFRARED_OUTPUT_VALUE_MINIMUM: f32 = 0.01;
pub const INFRARED_OUTPUT_VALUE_MAXIMUM: f32 = 1.0;
pub const INFRARED_SOURCE_VALUE_MAXIMUM: f32 = u16::MAX as f32;
/// Scale applied to raw infrared before normalization; washes out
/// saturation highlights.
pub const INFRARED_SOURCE_SCALE: f32 = 0.75;

/// Maps the 0..8000mm working depth range onto a byte.
pub const MAP_DEPTH_TO_BYTE: u32 = 8000 / 256;

/// Normalizes a 16-bit infrared sample into
/// `[INFRARED_OUTPUT_VALUE_MINIMUM, INFRARED_OUTPUT_VALUE_MAXIMUM]`.
pub fn infrared_to_intensity(sample: u16) -> f32 {
    INFRARED_OUTPUT_VALUE_MAXIMUM.min(
        (sample as f32 / INFRARED_SOURCE_VALUE_MAXIMUM * INFRARED_SOURCE_SCALE)
            * (INFRARED_OUTPUT_VALUE_MAXIMUM - INFRARED_OUTPUT_VALUE_MINIMUM)
            + INFRARED_OUTPUT_VALUE_MINIMUM,
    )
}

/// Infrared intensity as an 8-bit grey level for the display surface.
pub fn infrared_to_grey(sample: u16) -> u8 {
    (infrared_to_intensity(sample) * 255.0) as u8
}

/// Maps a millimeter depth sample to a grey byte. Samples outside
/// `[min_reliable, max_reliable]` render as 0 (black / unknown).
///
/// `depth / MAP_DEPTH_TO_BYTE` exceeds 255 for depths past ~7.9m; the `as u8`
/// cast wraps modulo 256, matching the byte-cast behavior of the sensor SDK
/// samples this math comes from.
pub fn depth_to_byte(depth: u16, min_reliable: u16, max_reliable: u16) -> u8 {
    if depth >= min_reliable && depth <= max_reliable {
        (depth as u32 / MAP_DEPTH_TO_BYTE) as u8
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infrared_zero_maps_to_floor() {
        assert!((infrared_to_intensity(0) - 0.01).abs() < f32::EPSILON);
    }

    #[test]
    fn infrared_saturated_maps_below_one() {
        // 0.75 * (1.0 - 0.01) + 0.01
        let expected = 0.7525;
        assert!((infrared_to_intensity(u16::MAX) - expected).abs() < 1e-6);
    }

    #[test]
    fn infrared_output_stays_in_range() {
        for sample in (0..=u16::MAX).step_by(257) {
            let out = infrared_to_intensity(sample);
            assert!(
                (INFRARED_OUTPUT_VALUE_MINIMUM..=INFRARED_OUTPUT_VALUE_MAXIMUM).contains(&out),
                "sample {sample} produced {out}"
            );
        }
        let out = infrared_to_intensity(u16::MAX);
        assert!(out <= INFRARED_OUTPUT_VALUE_MAXIMUM);
    }

    #[test]
    fn depth_scale_constant_truncates_to_31() {
        assert_eq!(MAP_DEPTH_TO_BYTE, 31);
    }

    #[test]
    fn depth_in_reliable_range_divides_by_scale() {
        assert_eq!(depth_to_byte(500, 500, u16::MAX), (500 / 31) as u8);
        assert_eq!(depth_to_byte(3100, 500, u16::MAX), 100);
    }

    #[test]
    fn depth_below_min_reliable_is_black() {
        assert_eq!(depth_to_byte(0, 0, u16::MAX), 0);
        assert_eq!(depth_to_byte(499, 500, u16::MAX), 0);
        assert_eq!(depth_to_byte(4000, 4001, u16::MAX), 0);
    }

    #[test]
    fn depth_above_byte_range_wraps() {
        // 8000 / 31 = 258, cast to byte wraps to 2.
        assert_eq!(depth_to_byte(8000, 0, u16::MAX), 2);
        // 65535 / 31 = 2114 -> 2114 % 256 = 66.
        assert_eq!(depth_to_byte(u16::MAX, 0, u16::MAX), 66);
    }
}
