use anyhow::*;
use image::{DynamicImage, ImageFormat};

#[cfg(target_arch = "wasm32")]
fn format_url(root: &str, file_name: &str) -> Result<reqwest::Url> {
    let window = web_sys::window().context("no window")?;
    let href = window
        .location()
        .href()
        .map_err(|e| anyhow!("reading page location: {e:?}"))?;
    let base = reqwest::Url::parse(&href)?.join(&format!("{}/", root.trim_end_matches('/')))?;
    Ok(base.join(file_name)?)
}

#[cfg(not(target_arch = "wasm32"))]
fn asset_path(root: &str, file_name: &str) -> std::path::PathBuf {
    std::path::Path::new(root).join(file_name)
}

pub async fn load_string(root: &str, file_name: &str) -> Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(root, file_name)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = tokio::fs::read_to_string(asset_path(root, file_name)).await?;

    Ok(txt)
}

pub async fn load_binary(root: &str, file_name: &str) -> Result<Vec<u8>> {
    #[cfg(target_arch = "wasm32")]
    let data = {
        let url = format_url(root, file_name)?;
        reqwest::get(url)
            .await?
            .error_for_status()?
            .bytes()
            .await?
            .to_vec()
    };
    #[cfg(not(target_arch = "wasm32"))]
    let data = tokio::fs::read(asset_path(root, file_name)).await?;

    Ok(data)
}

/// Fetches and decodes an image. The file extension is used as a format hint
/// and the content is sniffed otherwise.
pub async fn load_image(root: &str, file_name: &str) -> Result<DynamicImage> {
    let data = load_binary(root, file_name)
        .await
        .with_context(|| format!("reading {file_name}"))?;
    decode_image(&data, file_name)
}

pub fn decode_image(data: &[u8], file_name: &str) -> Result<DynamicImage> {
    let hint = std::path::Path::new(file_name)
        .extension()
        .and_then(ImageFormat::from_extension);
    let img = match hint {
        Some(format) => image::load_from_memory_with_format(data, format)
            .or_else(|_| image::load_from_memory(data)),
        None => image::load_from_memory(data),
    }
    .with_context(|| format!("decoding {file_name}"))?;
    Ok(img)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(2, 3, image::Rgba([9, 8, 7, 255])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn decodes_with_uppercase_extension() {
        let img = decode_image(&png_bytes(), "Alan.PNG").unwrap();
        assert_eq!((img.width(), img.height()), (2, 3));
    }

    #[test]
    fn sniffs_content_when_extension_lies() {
        let img = decode_image(&png_bytes(), "images.jpg").unwrap();
        assert_eq!(img.width(), 2);
    }

    #[test]
    fn garbage_is_an_error_naming_the_file() {
        let err = decode_image(b"not an image", "Pim.PNG").unwrap_err();
        assert!(format!("{err:#}").contains("Pim.PNG"));
    }
}
