pub fn resample_nearest(src: &[u8], width: u32, height: u32, size: u32) -> Vec<u8> {
    let mut out = vec![0u8; (size * size * 4) as usize];
    if width == 0 || height == 0 || src.len() < (width * height * 4) as usize {
        return out;
    }
    for y in 0..size {
        let sy = (y * height / size).min(height - 1);
        for x in 0..size {
            let sx = (x * width / size).min(width - 1);
            let from = ((sy * width + sx) * 4) as usize;
            let to = ((y * size + x) * 4) as usize;
            out[to..to + 4].copy_from_slice(&src[from..from + 4]);
        }
    }
    out
}

pub fn mask_circle(pixels: &mut [u8], size: u32) {
    let radius = size as f32 * 0.5;
    let radius_sq = radius * radius;
    for y in 0..size {
        for x in 0..size {
            let dx = x as f32 + 0.5 - radius;
            let dy = y as f32 + 0.5 - radius;
            if dx * dx + dy * dy > radius_sq {
                let alpha = ((y * size + x) * 4 + 3) as usize;
                if let Some(a) = pixels.get_mut(alpha) {
                    *a = 0;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(pixels: &[u8], size: u32, x: u32, y: u32) -> u8 {
        pixels[((y * size + x) * 4 + 3) as usize]
    }

    #[test]
    fn upsample_repeats_source_pixels() {
        // 2x1: red, blue
        let src = [255, 0, 0, 255, 0, 0, 255, 255];
        let out = resample_nearest(&src, 2, 1, 4);
        assert_eq!(out.len(), 64);
        assert_eq!(&out[0..4], &[255, 0, 0, 255]);
        assert_eq!(&out[4..8], &[255, 0, 0, 255]);
        assert_eq!(&out[8..12], &[0, 0, 255, 255]);
        assert_eq!(&out[60..64], &[0, 0, 255, 255]);
    }

    #[test]
    fn downsample_keeps_size() {
        let src = vec![200u8; 128 * 96 * 4];
        let out = resample_nearest(&src, 128, 96, 64);
        assert_eq!(out.len(), 64 * 64 * 4);
        assert!(out.iter().all(|&b| b == 200));
    }

    #[test]
    fn short_buffer_yields_transparent_square() {
        let out = resample_nearest(&[1, 2, 3], 4, 4, 8);
        assert!(out.iter().all(|&b| b == 0));
    }

    #[test]
    fn circle_mask_clears_corners_only() {
        let size = 64;
        let mut pixels = vec![255u8; (size * size * 4) as usize];
        mask_circle(&mut pixels, size);

        assert_eq!(alpha(&pixels, size, 0, 0), 0);
        assert_eq!(alpha(&pixels, size, 63, 63), 0);
        assert_eq!(alpha(&pixels, size, 63, 0), 0);
        assert_eq!(alpha(&pixels, size, 32, 32), 255);
        assert_eq!(alpha(&pixels, size, 0, 32), 255);
        assert_eq!(alpha(&pixels, size, 32, 0), 255);
        assert_eq!(pixels[0], 255);
    }
}
