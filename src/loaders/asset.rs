//! The fixed set of assets the scene uses.

use super::{LoadError, ObjLoader};
use crate::geometry::MeshData;
use crate::texture::{ImageData, SamplerSettings};
use std::fmt;
use std::sync::Arc;

/// Assets requested at startup. Each one is optional for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    /// Equirectangular background and environment map.
    Environment,
    /// Pattern projected by the flickering spot light.
    LightPattern,
    /// Texture sampled by the cold overlay.
    SnowTexture,
    /// Tree model, instanced several times by the scene assembly.
    TreeMesh,
}

impl AssetKind {
    /// Number of asset kinds.
    pub const COUNT: usize = 4;

    /// Every asset kind, in request order.
    pub const ALL: [AssetKind; Self::COUNT] = [
        AssetKind::Environment,
        AssetKind::LightPattern,
        AssetKind::SnowTexture,
        AssetKind::TreeMesh,
    ];

    /// Position in [`AssetKind::ALL`].
    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }

    /// Short identifier used by hosts, e.g. `"snow_texture"`.
    pub fn name(self) -> &'static str {
        match self {
            AssetKind::Environment => "environment",
            AssetKind::LightPattern => "light_pattern",
            AssetKind::SnowTexture => "snow_texture",
            AssetKind::TreeMesh => "tree_mesh",
        }
    }

    /// Look up a kind by [`AssetKind::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Path relative to the asset root.
    pub fn default_path(self) -> &'static str {
        match self {
            AssetKind::Environment => "resources/fireplace_2k.jpg",
            AssetKind::LightPattern => "resources/voronoi_8.png",
            AssetKind::SnowTexture => "resources/snow.png",
            AssetKind::TreeMesh => "resources/tree.obj",
        }
    }

    /// Decode raw file bytes into the payload this kind expects.
    pub fn decode(self, bytes: &[u8]) -> Result<AssetPayload, LoadError> {
        match self {
            AssetKind::TreeMesh => {
                // the model's first object is the tree
                let object = ObjLoader::new()
                    .load_from_bytes(bytes)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| LoadError::InvalidData("OBJ contains no geometry".into()))?;
                Ok(AssetPayload::Mesh(Arc::new(object.mesh)))
            }
            AssetKind::SnowTexture => {
                let image = ImageData::decode(bytes)?.with_sampler(SamplerSettings::repeating());
                Ok(AssetPayload::Image(Arc::new(image)))
            }
            AssetKind::Environment | AssetKind::LightPattern => {
                Ok(AssetPayload::Image(Arc::new(ImageData::decode(bytes)?)))
            }
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetKind::Environment => "environment",
            AssetKind::LightPattern => "light pattern",
            AssetKind::SnowTexture => "snow texture",
            AssetKind::TreeMesh => "tree mesh",
        };
        f.write_str(name)
    }
}

/// A decoded asset, shared between the scene and GPU uploads.
#[derive(Debug, Clone)]
pub enum AssetPayload {
    /// Decoded image.
    Image(Arc<ImageData>),
    /// Triangle mesh.
    Mesh(Arc<MeshData>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::WrapMode;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([200, 220, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_snow_texture_repeats() {
        match AssetKind::SnowTexture.decode(&png_bytes()).unwrap() {
            AssetPayload::Image(image) => assert_eq!(image.sampler.wrap, WrapMode::Repeat),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_tree_takes_first_object() {
        let obj = b"o a\nv 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\no b\nv 0 0 1\nf 1 2 4\n";
        match AssetKind::TreeMesh.decode(obj).unwrap() {
            AssetPayload::Mesh(mesh) => assert_eq!(mesh.positions.len(), 3),
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_empty_obj_fails() {
        assert!(AssetKind::TreeMesh.decode(b"# nothing\n").is_err());
    }

    #[test]
    fn test_names_resolve() {
        for kind in AssetKind::ALL {
            assert_eq!(AssetKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(AssetKind::from_name("skybox"), None);
    }

    #[test]
    fn test_index_matches_all() {
        for (i, kind) in AssetKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
