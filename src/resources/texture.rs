use anyhow::{Context, ensure};
use image::{ImageFormat, RgbaImage, imageops::FilterType};

use crate::resources::load_binary;

/// The scene texture shipped in `assets/`.
pub const SCENE_TEXTURE: &str = "texture.png";
/// Mip levels generated for the scene texture.
pub const MIP_LEVELS: usize = 6;

/// Decoded bitmaps ready for upload: level 0 is the full image and every further level
/// halves both dimensions of the previous one (rounding down, never below one pixel).
#[derive(Clone, Debug)]
pub struct MipChain {
    levels: Vec<RgbaImage>,
}

impl MipChain {
    pub fn new(levels: Vec<RgbaImage>) -> anyhow::Result<Self> {
        let first = levels.first().context("mip chain has no levels")?;
        ensure!(
            first.width() > 0 && first.height() > 0,
            "mip level 0 is empty"
        );
        for (index, pair) in levels.windows(2).enumerate() {
            let (w, h) = pair[0].dimensions();
            let expected = ((w / 2).max(1), (h / 2).max(1));
            ensure!(
                pair[1].dimensions() == expected,
                "mip level {} is {:?}, expected {:?}",
                index + 1,
                pair[1].dimensions(),
                expected
            );
        }
        Ok(Self { levels })
    }

    /// Builds up to `max_levels` levels from `base`, stopping early at 1x1.
    pub fn from_image(base: RgbaImage, max_levels: usize) -> anyhow::Result<Self> {
        ensure!(max_levels > 0, "at least one mip level is required");
        let mut levels = vec![base];
        while levels.len() < max_levels {
            let Some(previous) = levels.last() else { break };
            let (w, h) = previous.dimensions();
            if w <= 1 && h <= 1 {
                break;
            }
            let next = image::imageops::resize(
                previous,
                (w / 2).max(1),
                (h / 2).max(1),
                FilterType::Triangle,
            );
            levels.push(next);
        }
        Self::new(levels)
    }

    pub fn from_png(bytes: &[u8], max_levels: usize) -> anyhow::Result<Self> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .context("decoding png texture")?
            .to_rgba8();
        Self::from_image(image, max_levels)
    }

    pub fn levels(&self) -> &[RgbaImage] {
        &self.levels
    }

    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Size of level 0.
    pub fn dimensions(&self) -> (u32, u32) {
        self.levels[0].dimensions()
    }
}

pub async fn load_mip_chain(file_name: &str) -> anyhow::Result<MipChain> {
    let data = load_binary(file_name).await?;
    MipChain::from_png(&data, MIP_LEVELS).with_context(|| format!("loading texture {file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 90, 255]))
    }

    #[test]
    fn halves_until_the_level_limit() {
        let chain = MipChain::from_image(image(64, 32), MIP_LEVELS).unwrap();
        let sizes: Vec<_> = chain.levels().iter().map(|l| l.dimensions()).collect();
        assert_eq!(sizes, [(64, 32), (32, 16), (16, 8), (8, 4), (4, 2), (2, 1)]);
    }

    #[test]
    fn stops_at_a_single_pixel() {
        let chain = MipChain::from_image(image(4, 4), MIP_LEVELS).unwrap();
        assert_eq!(chain.level_count(), 3);
        assert_eq!(chain.levels()[2].dimensions(), (1, 1));
    }

    #[test]
    fn rejects_malformed_chains() {
        assert!(MipChain::new(Vec::new()).is_err());
        assert!(MipChain::new(vec![image(8, 8), image(3, 4)]).is_err());
        assert!(MipChain::new(vec![image(5, 3), image(2, 1), image(1, 1)]).is_ok());
    }

    #[test]
    fn decodes_png_bytes() {
        let mut png = Vec::new();
        image(16, 16)
            .write_to(&mut std::io::Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        let chain = MipChain::from_png(&png, MIP_LEVELS).unwrap();
        assert_eq!(chain.dimensions(), (16, 16));
        assert_eq!(chain.level_count(), 5);
        assert!(MipChain::from_png(b"not a png", MIP_LEVELS).is_err());
    }
}
