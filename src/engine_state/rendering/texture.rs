//! Texture handling for the rendering pipeline.
//!
//! This module provides the depth buffer and the block texture atlas. The atlas is a
//! PNG decoded to RGBA8 on the CPU and uploaded once at startup.

use std::path::Path;

use image::RgbaImage;
use log::info;
use wgpu::util::DeviceExt;

use crate::error::StartupError;

/// Tiles per atlas row and column.
pub const ATLAS_TILES: u32 = 16;

/// Represents a GPU texture with associated view and sampler.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    #[allow(dead_code)]
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

impl Texture {
    /// The texture format used for depth buffers.
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface size.
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };
        let desc = wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        };

        let texture = device.create_texture(&desc);
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            lod_min_clamp: 0.0,
            lod_max_clamp: 100.0,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Uploads a decoded atlas as an sRGB texture sampled with nearest filtering.
    pub fn from_atlas(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        atlas: &RgbaImage,
        label: &str,
    ) -> Self {
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: atlas.width(),
                    height: atlas.height(),
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            atlas.as_raw(),
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

/// Reads and decodes the atlas PNG at `path` into RGBA8.
pub fn load_atlas(path: &Path) -> Result<RgbaImage, StartupError> {
    let atlas = image::open(path)
        .map_err(|source| StartupError::AtlasDecode {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    if atlas.width() % ATLAS_TILES != 0 || atlas.height() % ATLAS_TILES != 0 {
        log::warn!(
            "Atlas {} is {}x{}, which does not split into {ATLAS_TILES}x{ATLAS_TILES} tiles",
            path.display(),
            atlas.width(),
            atlas.height()
        );
    }
    info!(
        "Loaded texture atlas {} ({}x{})",
        path.display(),
        atlas.width(),
        atlas.height()
    );
    Ok(atlas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn decodes_png_to_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        let mut source = RgbaImage::from_pixel(32, 16, Rgba([10, 20, 30, 255]));
        source.put_pixel(31, 15, Rgba([200, 100, 50, 128]));
        source.save(&path).unwrap();

        let atlas = load_atlas(&path).unwrap();

        assert_eq!(atlas.dimensions(), (32, 16));
        assert_eq!(atlas.as_raw().len(), 32 * 16 * 4);
        assert_eq!(atlas.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
        assert_eq!(atlas.get_pixel(31, 15), &Rgba([200, 100, 50, 128]));
    }

    #[test]
    fn missing_atlas_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.png");

        match load_atlas(&path) {
            Err(StartupError::AtlasDecode { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected an atlas error, got {other:?}"),
        }
    }

    #[test]
    fn corrupt_atlas_is_a_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("atlas.png");
        std::fs::write(&path, b"definitely not a png").unwrap();

        assert!(matches!(
            load_atlas(&path),
            Err(StartupError::AtlasDecode { .. })
        ));
    }

    #[test]
    fn shipped_atlas_has_sixteen_by_sixteen_tiles() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/textures/texture_atlas.png");
        let atlas = load_atlas(&path).unwrap();

        assert_eq!(atlas.width() % ATLAS_TILES, 0);
        assert_eq!(atlas.height() % ATLAS_TILES, 0);
    }

    #[test]
    fn shipped_atlas_keeps_grass_in_the_sampled_tile() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/textures/texture_atlas.png");
        let atlas = load_atlas(&path).unwrap();
        let tile = atlas.width() / ATLAS_TILES;

        // Block texcoords start at v = 0.875, which is tile row 14 from the top.
        let Rgba([r, g, b, _]) = *atlas.get_pixel(0, 14 * tile);
        assert!(g > r && g > b, "top edge of the tile should be grass, got {r},{g},{b}");

        let background = atlas.get_pixel(0, 0);
        assert_ne!(atlas.get_pixel(tile / 2, 14 * tile + tile / 2), background);
    }
}
