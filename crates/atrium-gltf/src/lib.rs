use std::path::Path;

use anyhow::{Context, bail};
use atrium_3d::{Aabb, GpuMesh, Material, Model, Vertex};
use glam::{Mat4, Vec3};
use wgpu::{BindGroupLayout, Device, Queue};

/// Loads a `.glb`/`.gltf` file into GPU buffers. Node transforms are baked
/// into the vertex data, so the returned model only needs a placement
/// transform. `bounds` covers every baked vertex position.
pub fn load_gltf_model(
    device: &Device,
    queue: &Queue,
    material_bgl: &BindGroupLayout,
    path: &Path,
) -> anyhow::Result<Model> {
    let (document, buffers, images) = gltf::import(path)
        .with_context(|| format!("importing {}", path.display()))?;

    let mut materials: Vec<Material> = Vec::new();
    for material in document.materials() {
        let pbr = material.pbr_metallic_roughness();
        let gpu_material = match pbr.base_color_texture() {
            Some(info) => {
                let data = &images[info.texture().source().index()];
                match rgba_pixels(data) {
                    Some(pixels) => Material::from_rgba8(
                        device,
                        queue,
                        material_bgl,
                        &pixels,
                        data.width,
                        data.height,
                    ),
                    None => flat_material(device, queue, material_bgl, pbr.base_color_factor()),
                }
            }
            None => flat_material(device, queue, material_bgl, pbr.base_color_factor()),
        };
        materials.push(gpu_material);
    }
    // Primitives without a material index fall through to this entry.
    materials.push(flat_material(device, queue, material_bgl, [1.0; 4]));
    let default_material_id = materials.len() - 1;

    let mut meshes = Vec::new();
    let mut bounds = Aabb::EMPTY;
    for scene in document.scenes() {
        for node in scene.nodes() {
            bake_node(
                device,
                &node,
                &buffers,
                Mat4::IDENTITY,
                default_material_id,
                &mut meshes,
                &mut bounds,
            );
        }
    }

    if meshes.is_empty() {
        bail!("{} contains no triangle meshes", path.display());
    }

    Ok(Model {
        meshes,
        materials,
        bounds,
    })
}

fn bake_node(
    device: &Device,
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent: Mat4,
    default_material_id: usize,
    meshes: &mut Vec<GpuMesh>,
    bounds: &mut Aabb,
) {
    let xform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    let normal_xform = xform.inverse().transpose();

    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<Vec3> = positions
                .map(|p| xform.transform_point3(Vec3::from_array(p)))
                .collect();

            let normals: Vec<Vec3> = match reader.read_normals() {
                Some(iter) => iter
                    .map(|n| normal_xform.transform_vector3(Vec3::from_array(n)))
                    .collect(),
                None => vec![Vec3::Y; positions.len()],
            };

            let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                Some(iter) => iter.into_f32().collect(),
                None => vec![[0.0, 0.0]; positions.len()],
            };

            let indices: Vec<u32> = match reader.read_indices() {
                Some(iter) => iter.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let vertices: Vec<Vertex> = positions
                .iter()
                .zip(normals.iter().zip(uvs.iter()))
                .map(|(p, (n, uv))| Vertex {
                    position: p.to_array(),
                    normal: n.to_array(),
                    uv: *uv,
                })
                .collect();

            for p in &positions {
                bounds.grow(*p);
            }

            let material_id = primitive
                .material()
                .index()
                .unwrap_or(default_material_id);
            meshes.push(GpuMesh::new(device, &vertices, &indices, material_id));
        }
    }

    for child in node.children() {
        bake_node(
            device,
            &child,
            buffers,
            xform,
            default_material_id,
            meshes,
            bounds,
        );
    }
}

fn flat_material(
    device: &Device,
    queue: &Queue,
    material_bgl: &BindGroupLayout,
    factor: [f32; 4],
) -> Material {
    let pixel = [
        (factor[0].clamp(0.0, 1.0) * 255.0) as u8,
        (factor[1].clamp(0.0, 1.0) * 255.0) as u8,
        (factor[2].clamp(0.0, 1.0) * 255.0) as u8,
        (factor[3].clamp(0.0, 1.0) * 255.0) as u8,
    ];
    Material::from_rgba8(device, queue, material_bgl, &pixel, 1, 1)
}

/// Expands an imported image to tightly packed RGBA8, or `None` for pixel
/// formats the viewer does not handle.
fn rgba_pixels(data: &gltf::image::Data) -> Option<Vec<u8>> {
    use gltf::image::Format;
    match data.format {
        Format::R8G8B8A8 => Some(data.pixels.clone()),
        Format::R8G8B8 => {
            let rgb = image::RgbImage::from_raw(data.width, data.height, data.pixels.clone())?;
            Some(image::DynamicImage::ImageRgb8(rgb).into_rgba8().into_raw())
        }
        Format::R8 => {
            let gray = image::GrayImage::from_raw(data.width, data.height, data.pixels.clone())?;
            Some(image::DynamicImage::ImageLuma8(gray).into_rgba8().into_raw())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_pixels_gain_opaque_alpha() {
        let data = gltf::image::Data {
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
            pixels: vec![10, 20, 30, 40, 50, 60],
        };
        let rgba = rgba_pixels(&data).unwrap();
        assert_eq!(rgba, vec![10, 20, 30, 255, 40, 50, 60, 255]);
    }

    #[test]
    fn unsupported_format_is_rejected() {
        let data = gltf::image::Data {
            format: gltf::image::Format::R16G16B16,
            width: 1,
            height: 1,
            pixels: vec![0; 6],
        };
        assert!(rgba_pixels(&data).is_none());
    }
}
