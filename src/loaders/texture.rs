use anyhow::{ensure, Context, Result};
use std::path::Path;

/// Decoded RGBA8 image, rows top to bottom
#[derive(Debug, Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl ImageData {
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "Image has zero size: {}x{}", width, height);
        ensure!(
            data.len() == (width * height * 4) as usize,
            "Invalid RGBA buffer size: expected {} bytes, got {}",
            width * height * 4,
            data.len()
        );
        Ok(Self { width, height, data })
    }

    /// Two-colour checkerboard with `cells` squares along each side
    pub fn checkerboard(size: u32, cells: u32, a: [u8; 4], b: [u8; 4]) -> Self {
        let size = size.max(1);
        let cell = (size / cells.max(1)).max(1);
        let mut data = Vec::with_capacity((size * size * 4) as usize);
        for y in 0..size {
            for x in 0..size {
                let color = if (x / cell + y / cell) % 2 == 0 { a } else { b };
                data.extend_from_slice(&color);
            }
        }
        Self {
            width: size,
            height: size,
            data,
        }
    }
}

/// Loads an image file (TGA, PNG, JPEG, ...) as RGBA8
pub fn load_image(path: impl AsRef<Path>) -> Result<ImageData> {
    let path = path.as_ref();
    log::info!("Loading texture: {:?}", path);

    let bytes = std::fs::read(path).with_context(|| format!("Failed to read texture file: {:?}", path))?;
    // TGA has no magic number, so the extension decides when it is known
    let image = match image::ImageFormat::from_path(path) {
        Ok(format) => decode_image_with_format(&bytes, format),
        Err(_) => decode_image(&bytes),
    }
    .with_context(|| format!("Failed to load texture: {:?}", path))?;

    log::info!("  {}x{}", image.width, image.height);
    Ok(image)
}

/// Decodes an in-memory image; the format is guessed from the content
pub fn decode_image(bytes: &[u8]) -> Result<ImageData> {
    let img = image::load_from_memory(bytes).context("Failed to decode image from memory")?;
    to_image_data(img)
}

pub fn decode_image_with_format(bytes: &[u8], format: image::ImageFormat) -> Result<ImageData> {
    let img = image::load_from_memory_with_format(bytes, format)
        .with_context(|| format!("Failed to decode {:?} image", format))?;
    to_image_data(img)
}

fn to_image_data(img: image::DynamicImage) -> Result<ImageData> {
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    ImageData::new(width, height, rgba.into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_layout() {
        let white = [255, 255, 255, 255];
        let black = [0, 0, 0, 255];
        let img = ImageData::checkerboard(4, 2, white, black);
        assert_eq!(img.width, 4);
        assert_eq!(img.data.len(), 64);
        assert_eq!(&img.data[0..4], &white);
        // Third pixel of the first row is in the second cell
        assert_eq!(&img.data[8..12], &black);
        // First pixel of the third row
        assert_eq!(&img.data[32..36], &black);
    }

    #[test]
    fn test_new_rejects_wrong_size() {
        assert!(ImageData::new(2, 2, vec![0; 15]).is_err());
        assert!(ImageData::new(0, 2, vec![]).is_err());
        assert!(ImageData::new(1, 1, vec![1, 2, 3, 4]).is_ok());
    }

    #[test]
    fn test_decode_png() {
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgba([255, 0, 0, 255]));
        img.put_pixel(1, 0, image::Rgba([0, 0, 255, 128]));
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode png");

        let decoded = decode_image(&bytes).expect("decode png");
        assert_eq!((decoded.width, decoded.height), (2, 1));
        assert_eq!(decoded.data, vec![255, 0, 0, 255, 0, 0, 255, 128]);
    }

    #[test]
    fn test_decode_tga_needs_format() {
        // 1x1 uncompressed true-colour TGA, top-left origin, one red pixel (BGR)
        let bytes = [
            0u8, 0, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 1, 0, 24, 0x20, //
            0, 0, 255,
        ];
        let decoded = decode_image_with_format(&bytes, image::ImageFormat::Tga).expect("decode tga");
        assert_eq!(decoded.data, vec![255, 0, 0, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_image(b"not an image").is_err());
    }
}
