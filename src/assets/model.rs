//! glTF model import.
//!
//! Every node of the default scene is visited, node transforms are composed
//! down the hierarchy and baked into the vertex data, so the renderer draws
//! each primitive with an identity model matrix.

use std::path::Path;

use glam::{Mat3, Mat4, Vec3};

use crate::error::VitrineError;

/// One triangle list with its material.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshData {
    /// World-space positions.
    pub positions: Vec<[f32; 3]>,
    /// World-space unit normals, one per position.
    pub normals: Vec<[f32; 3]>,
    /// First UV set, one per position (zeros when absent).
    pub uvs: Vec<[f32; 2]>,
    /// Triangle list indices.
    pub indices: Vec<u32>,
    /// Index into [`Model::materials`].
    pub material: usize,
}

/// Metallic-roughness material factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Linear RGBA base colour multiplier.
    pub base_color_factor: [f32; 4],
    /// Index into [`Model::textures`] for the base colour map.
    pub base_color_texture: Option<usize>,
    /// Metalness in `[0, 1]`.
    pub metallic_factor: f32,
    /// Roughness in `[0, 1]`.
    pub roughness_factor: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            metallic_factor: 1.0,
            roughness_factor: 1.0,
        }
    }
}

/// 8-bit RGBA texture decoded from the glTF bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA bytes.
    pub rgba: Vec<u8>,
}

/// A loaded model: flattened meshes, their materials and textures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    /// Triangle lists in world space.
    pub meshes: Vec<MeshData>,
    /// Materials; the last entry is the fallback for unassigned primitives.
    pub materials: Vec<Material>,
    /// Textures indexed by glTF image index.
    pub textures: Vec<TextureData>,
}

impl Model {
    /// Import a `.gltf` / `.glb` file with its buffers and images.
    ///
    /// # Errors
    ///
    /// Returns [`VitrineError::AssetLoad`] if the file cannot be imported
    /// or contains no drawable triangles.
    pub fn load(path: &Path) -> Result<Self, VitrineError> {
        let label = path.display().to_string();
        let (document, buffers, images) =
            gltf::import(path).map_err(|e| VitrineError::asset(&label, e))?;

        let textures = images.iter().map(convert_image).collect();

        let mut materials: Vec<Material> =
            document.materials().map(|m| convert_material(&m)).collect();
        let fallback = materials.len();
        materials.push(Material::default());

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| VitrineError::asset(&label, "no scene"))?;

        let mut meshes = Vec::new();
        let mut stack: Vec<(gltf::Node<'_>, Mat4)> =
            scene.nodes().map(|n| (n, Mat4::IDENTITY)).collect();
        while let Some((node, parent)) = stack.pop() {
            let world = parent
                * Mat4::from_cols_array_2d(&node.transform().matrix());
            if let Some(mesh) = node.mesh() {
                for primitive in mesh.primitives() {
                    if primitive.mode() != gltf::mesh::Mode::Triangles {
                        log::debug!("{label}: skipping non-triangle primitive");
                        continue;
                    }
                    let reader = primitive
                        .reader(|b| buffers.get(b.index()).map(|d| d.0.as_slice()));
                    let Some(positions) = reader.read_positions() else {
                        continue;
                    };
                    let positions: Vec<[f32; 3]> = positions.collect();
                    let indices: Vec<u32> = match reader.read_indices() {
                        Some(i) => i.into_u32().collect(),
                        None => (0..positions.len() as u32).collect(),
                    };
                    let normals: Option<Vec<[f32; 3]>> =
                        reader.read_normals().map(Iterator::collect);
                    let uvs: Vec<[f32; 2]> = reader
                        .read_tex_coords(0)
                        .map_or_else(
                            || vec![[0.0; 2]; positions.len()],
                            |t| t.into_f32().collect(),
                        );
                    let material =
                        primitive.material().index().unwrap_or(fallback);
                    if let Some(data) = bake_primitive(
                        world, positions, normals, uvs, indices, material,
                    ) {
                        meshes.push(data);
                    }
                }
            }
            stack.extend(node.children().map(|c| (c, world)));
        }

        if meshes.is_empty() {
            return Err(VitrineError::asset(&label, "no triangle meshes"));
        }
        log::info!(
            "loaded {label}: {} primitive(s), {} material(s), {} texture(s)",
            meshes.len(),
            materials.len() - 1,
            images.len()
        );
        Ok(Self {
            meshes,
            materials,
            textures,
        })
    }

    /// Total vertex count across meshes.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.positions.len()).sum()
    }

    /// World-space axis-aligned bounds, `None` for an empty model.
    #[must_use]
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self
            .meshes
            .iter()
            .flat_map(|m| m.positions.iter().map(|p| Vec3::from_array(*p)));
        let first = points.next()?;
        Some(points.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p))))
    }
}

/// Transform a primitive into world space; fill missing normals with flat
/// face normals. Returns `None` for degenerate index data.
fn bake_primitive(
    world: Mat4,
    positions: Vec<[f32; 3]>,
    normals: Option<Vec<[f32; 3]>>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
    material: usize,
) -> Option<MeshData> {
    let vertex_count = positions.len();
    if indices.len() < 3 || indices.iter().any(|&i| i as usize >= vertex_count) {
        return None;
    }
    let normal_matrix = Mat3::from_mat4(world).inverse().transpose();

    let positions: Vec<[f32; 3]> = positions
        .into_iter()
        .map(|p| world.transform_point3(Vec3::from_array(p)).to_array())
        .collect();

    let normals = match normals {
        Some(n) if n.len() == vertex_count => n
            .into_iter()
            .map(|n| {
                (normal_matrix * Vec3::from_array(n))
                    .normalize_or(Vec3::Y)
                    .to_array()
            })
            .collect(),
        _ => flat_normals(&positions, &indices),
    };

    let mut uvs = uvs;
    uvs.resize(vertex_count, [0.0; 2]);

    Some(MeshData {
        positions,
        normals,
        uvs,
        indices,
        material,
    })
}

/// Area-weighted vertex normals from the triangle list.
fn flat_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut acc = vec![Vec3::ZERO; positions.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
        let pa = Vec3::from_array(positions[a]);
        let face = (Vec3::from_array(positions[b]) - pa)
            .cross(Vec3::from_array(positions[c]) - pa);
        acc[a] += face;
        acc[b] += face;
        acc[c] += face;
    }
    acc.into_iter()
        .map(|n| n.normalize_or(Vec3::Y).to_array())
        .collect()
}

fn convert_material(material: &gltf::Material<'_>) -> Material {
    let pbr = material.pbr_metallic_roughness();
    Material {
        base_color_factor: pbr.base_color_factor(),
        base_color_texture: pbr
            .base_color_texture()
            .map(|info| info.texture().source().index()),
        metallic_factor: pbr.metallic_factor(),
        roughness_factor: pbr.roughness_factor(),
    }
}

fn convert_image(data: &gltf::image::Data) -> TextureData {
    use gltf::image::Format;

    let rgba = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => expand(&data.pixels, 3, |p| [p[0], p[1], p[2], 255]),
        Format::R8G8 => expand(&data.pixels, 2, |p| [p[0], p[1], 0, 255]),
        Format::R8 => expand(&data.pixels, 1, |p| [p[0], p[0], p[0], 255]),
        Format::R16G16B16A16 => {
            expand(&data.pixels, 8, |p| [p[1], p[3], p[5], p[7]])
        }
        Format::R16G16B16 => expand(&data.pixels, 6, |p| [p[1], p[3], p[5], 255]),
        Format::R16G16 => expand(&data.pixels, 4, |p| [p[1], p[3], 0, 255]),
        Format::R16 => expand(&data.pixels, 2, |p| [p[1], p[1], p[1], 255]),
        Format::R32G32B32FLOAT => expand(&data.pixels, 12, |p| {
            let c = |i: usize| float_to_unorm(&p[i * 4..i * 4 + 4]);
            [c(0), c(1), c(2), 255]
        }),
        Format::R32G32B32A32FLOAT => expand(&data.pixels, 16, |p| {
            let c = |i: usize| float_to_unorm(&p[i * 4..i * 4 + 4]);
            [c(0), c(1), c(2), c(3)]
        }),
    };
    TextureData {
        width: data.width,
        height: data.height,
        rgba,
    }
}

/// 16-bit channels are little-endian, so the high byte is the odd one.
fn expand(pixels: &[u8], stride: usize, f: impl Fn(&[u8]) -> [u8; 4]) -> Vec<u8> {
    pixels.chunks_exact(stride).flat_map(f).collect()
}

fn float_to_unorm(bytes: &[u8]) -> u8 {
    let mut raw = [0_u8; 4];
    raw.copy_from_slice(bytes);
    (f32::from_le_bytes(raw).clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One triangle under a translated parent and child node; the buffer
    /// holds positions, UVs and u16 indices but no normals.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [
            {"translation": [0.0, 2.0, 0.0], "children": [1]},
            {"translation": [1.0, 0.0, 0.0], "mesh": 0}
        ],
        "meshes": [{"primitives": [{
            "attributes": {"POSITION": 0, "TEXCOORD_0": 1},
            "indices": 2,
            "material": 0
        }]}],
        "materials": [{"pbrMetallicRoughness": {
            "baseColorFactor": [1.0, 0.5, 0.25, 1.0],
            "metallicFactor": 0.0,
            "roughnessFactor": 0.6
        }}],
        "buffers": [{
            "byteLength": 66,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAIA/AAAAAAAAAAAAAIA/AAABAAIA"
        }],
        "bufferViews": [
            {"buffer": 0, "byteOffset": 0, "byteLength": 36},
            {"buffer": 0, "byteOffset": 36, "byteLength": 24},
            {"buffer": 0, "byteOffset": 60, "byteLength": 6}
        ],
        "accessors": [
            {"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
             "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]},
            {"bufferView": 1, "componentType": 5126, "count": 3, "type": "VEC2"},
            {"bufferView": 2, "componentType": 5123, "count": 3, "type": "SCALAR"}
        ]
    }"#;

    fn write_model(name: &str, json: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir()
            .join(format!("vitrine_model_{}_{name}.gltf", std::process::id()));
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn imports_triangle_with_composed_transforms() {
        let path = write_model("triangle", TRIANGLE_GLTF);
        let model = Model::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.positions[0], [1.0, 2.0, 0.0]);
        assert_eq!(mesh.positions[1], [2.0, 2.0, 0.0]);
        assert_eq!(mesh.positions[2], [1.0, 3.0, 0.0]);
        assert_eq!(mesh.uvs[1], [1.0, 0.0]);
        // Counter-clockwise in the XY plane faces +Z.
        for n in &mesh.normals {
            assert!((Vec3::from_array(*n) - Vec3::Z).length() < 1e-5);
        }

        let material = model.materials[mesh.material];
        assert_eq!(material.base_color_factor, [1.0, 0.5, 0.25, 1.0]);
        assert_eq!(material.metallic_factor, 0.0);
        assert!((material.roughness_factor - 0.6).abs() < 1e-6);
        assert!(material.base_color_texture.is_none());

        let (lo, hi) = model.bounds().unwrap();
        assert_eq!(lo, Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(hi, Vec3::new(2.0, 3.0, 0.0));
        assert_eq!(model.vertex_count(), 3);
    }

    #[test]
    fn missing_model_is_an_asset_error() {
        let err = Model::load(Path::new("/nonexistent/scene.gltf")).unwrap_err();
        assert!(matches!(err, VitrineError::AssetLoad { .. }));
    }

    #[test]
    fn out_of_range_indices_are_dropped() {
        assert!(bake_primitive(
            Mat4::IDENTITY,
            vec![[0.0; 3]; 3],
            None,
            vec![],
            vec![0, 1, 7],
            0,
        )
        .is_none());
    }

    #[test]
    fn rgb8_images_gain_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![10, 20, 30, 40, 50, 60],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };
        let tex = convert_image(&data);
        assert_eq!(tex.rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }
}
