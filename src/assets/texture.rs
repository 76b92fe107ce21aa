//! Image file loading and decoding.

use anyhow::anyhow;
use image::GenericImageView;

use crate::scene::{CubemapData, ImageData};

/// Read a file relative to the assets directory.
pub async fn load_binary(assets_dir: &str, file_name: &str) -> anyhow::Result<Vec<u8>> {
    let path = std::path::Path::new(assets_dir).join(file_name);
    let data = tokio::fs::read(&path).await?;
    Ok(data)
}

/// Decode image bytes to RGBA8. `format` is an optional extension hint
/// ("png", "jpg"); without it the format is sniffed from the bytes.
pub fn decode_image(bytes: &[u8], format: Option<&str>) -> anyhow::Result<ImageData> {
    let img = match format.and_then(image::ImageFormat::from_extension) {
        Some(fmt) => image::load_from_memory_with_format(bytes, fmt)?,
        None => image::load_from_memory(bytes)?,
    };
    let (width, height) = img.dimensions();
    Ok(ImageData {
        width,
        height,
        rgba: img.to_rgba8().into_raw(),
    })
}

pub async fn load_image(assets_dir: &str, file_name: &str) -> anyhow::Result<ImageData> {
    let bytes = load_binary(assets_dir, file_name).await?;
    let format = file_name.rsplit('.').next();
    decode_image(&bytes, format)
}

/// Load the six cubemap faces (+X, -X, +Y, -Y, +Z, -Z) concurrently.
/// All faces must be square and share the same size.
pub async fn load_cubemap(assets_dir: &str, faces: &[String; 6]) -> anyhow::Result<CubemapData> {
    let loads = faces.iter().map(|face| load_image(assets_dir, face));
    let mut images = futures::future::join_all(loads).await;
    for (face, image) in faces.iter().zip(&images) {
        if let Err(e) = image {
            return Err(anyhow!("cubemap face {} failed to load: {}", face, e));
        }
    }
    let images: Vec<ImageData> = images.drain(..).map(|r| r.unwrap()).collect();
    let size = images[0].width;
    for (face, image) in faces.iter().zip(&images) {
        if image.width != size || image.height != size {
            return Err(anyhow!(
                "cubemap face {} is {}x{}, expected {}x{}",
                face,
                image.width,
                image.height,
                size,
                size
            ));
        }
    }
    let faces: [ImageData; 6] = images
        .try_into()
        .map_err(|_| anyhow!("expected exactly six cubemap faces"))?;
    Ok(CubemapData { size, faces })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    #[test]
    fn decode_produces_rgba8() {
        let data = decode_image(&png_bytes(4, 2), Some("png")).unwrap();
        assert_eq!((data.width, data.height), (4, 2));
        assert_eq!(data.rgba.len(), 4 * 2 * 4);
        assert_eq!(&data.rgba[0..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn decode_sniffs_format_without_hint() {
        let data = decode_image(&png_bytes(2, 2), None).unwrap();
        assert_eq!(data.width, 2);
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(decode_image(&[0, 1, 2, 3], None).is_err());
    }
}
