//! Bounds-checked software drawing over an RGBA byte buffer. Everything
//! clips at the buffer edges instead of panicking.

pub type Color = [u8; 4];

pub fn put_pixel(buffer: &mut [u8], width: u32, height: u32, x: i32, y: i32, color: Color) {
    if x < 0 || y < 0 {
        return;
    }
    let (ux, uy) = (x as u32, y as u32);
    if ux >= width || uy >= height {
        return;
    }
    let idx = ((uy * width + ux) as usize) * 4;
    if idx + 3 < buffer.len() {
        buffer[idx..idx + 4].copy_from_slice(&color);
    }
}

/// Bresenham line with a diamond-shaped brush of the given thickness.
pub fn draw_line(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    p0: (f32, f32),
    p1: (f32, f32),
    color: Color,
    thickness: i32,
) {
    let (mut x0, mut y0) = (p0.0 as i32, p0.1 as i32);
    let (x1, y1) = (p1.0 as i32, p1.1 as i32);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let radius = (thickness.max(1) - 1) / 2;

    loop {
        put_pixel(buffer, width, height, x0, y0, color);
        if radius > 0 {
            for ox in -radius..=radius {
                for oy in -radius..=radius {
                    if ox == 0 && oy == 0 {
                        continue;
                    }
                    if ox.abs() + oy.abs() <= radius {
                        put_pixel(buffer, width, height, x0 + ox, y0 + oy, color);
                    }
                }
            }
        }
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

pub fn fill_circle(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    center: (i32, i32),
    radius: i32,
    color: Color,
) {
    let (cx, cy) = center;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                put_pixel(buffer, width, height, cx + dx, cy + dy, color);
            }
        }
    }
}

pub fn fill_rect(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    rect_width: i32,
    rect_height: i32,
    color: Color,
) {
    for py in y..y + rect_height {
        for px in x..x + rect_width {
            put_pixel(buffer, width, height, px, py, color);
        }
    }
}

/// Scanline-free triangle fill: edge-function test over the bounding box.
pub fn fill_triangle(
    buffer: &mut [u8],
    width: u32,
    height: u32,
    vertices: [(f32, f32); 3],
    color: Color,
) {
    let [a, b, c] = vertices;
    let min_x = a.0.min(b.0).min(c.0).floor().max(0.0) as i32;
    let max_x = a.0.max(b.0).max(c.0).ceil().min(width as f32) as i32;
    let min_y = a.1.min(b.1).min(c.1).floor().max(0.0) as i32;
    let max_y = a.1.max(b.1).max(c.1).ceil().min(height as f32) as i32;

    let edge = |p: (f32, f32), q: (f32, f32), x: f32, y: f32| {
        (q.0 - p.0) * (y - p.1) - (q.1 - p.1) * (x - p.0)
    };

    for py in min_y..max_y {
        for px in min_x..max_x {
            let (fx, fy) = (px as f32 + 0.5, py as f32 + 0.5);
            let w0 = edge(a, b, fx, fy);
            let w1 = edge(b, c, fx, fy);
            let w2 = edge(c, a, fx, fy);
            let inside = (w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0)
                || (w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0);
            if inside {
                put_pixel(buffer, width, height, px, py, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = [255, 0, 0, 255];

    fn blank(width: u32, height: u32) -> Vec<u8> {
        vec![0u8; (width * height * 4) as usize]
    }

    #[test]
    fn put_pixel_clips_out_of_bounds() {
        let mut buf = blank(4, 4);
        put_pixel(&mut buf, 4, 4, -1, 0, RED);
        put_pixel(&mut buf, 4, 4, 0, -1, RED);
        put_pixel(&mut buf, 4, 4, 4, 0, RED);
        put_pixel(&mut buf, 4, 4, 0, 4, RED);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn draw_line_covers_endpoints() {
        let mut buf = blank(8, 8);
        draw_line(&mut buf, 8, 8, (0.0, 0.0), (7.0, 7.0), RED, 1);
        assert_eq!(&buf[0..4], &RED);
        let last = (7 * 8 + 7) * 4;
        assert_eq!(&buf[last..last + 4], &RED);
    }

    #[test]
    fn fill_rect_stays_in_bounds() {
        let mut buf = blank(4, 4);
        fill_rect(&mut buf, 4, 4, 2, 2, 10, 10, RED);
        // (1, 1) untouched, (3, 3) painted.
        assert_eq!(&buf[(1 * 4 + 1) * 4..(1 * 4 + 1) * 4 + 4], &[0, 0, 0, 0]);
        assert_eq!(&buf[(3 * 4 + 3) * 4..(3 * 4 + 3) * 4 + 4], &RED);
    }

    #[test]
    fn fill_triangle_paints_interior() {
        let mut buf = blank(8, 8);
        fill_triangle(&mut buf, 8, 8, [(0.0, 0.0), (7.0, 0.0), (0.0, 7.0)], RED);
        let inside = (1 * 8 + 1) * 4;
        assert_eq!(&buf[inside..inside + 4], &RED);
        let outside = (7 * 8 + 7) * 4;
        assert_eq!(&buf[outside..outside + 4], &[0, 0, 0, 0]);
    }
}
