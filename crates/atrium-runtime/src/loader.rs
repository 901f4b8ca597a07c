use std::path::{Path, PathBuf};
use std::sync::Arc;

use atrium_3d::{Layouts, Renderer3D};
use atrium_gltf::load_gltf_model;
use atrium_scene::Scene;
use glam::{Mat4, Vec3};
use wgpu::{Device, Queue};

use crate::ViewerSettings;

/// Lists model files in `dir`, sorted by file name so load order (and with
/// it house ids) is deterministic across runs.
pub fn discover_house_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| is_model_file(path))
        .collect();
    files.sort();
    Ok(files)
}

fn is_model_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb") || ext.eq_ignore_ascii_case("gltf"))
}

/// House name shown in the UI and used as the comment key: the file stem.
pub fn house_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Scans the configured directory and loads every model into the scene and
/// the renderer. Files that fail to load are logged and skipped; a missing
/// directory leaves the scene empty.
pub fn load_houses(
    device: &Device,
    queue: &Queue,
    layouts: &Layouts,
    renderer: &mut Renderer3D,
    settings: &ViewerSettings,
) -> Scene {
    let mut scene = Scene::new();

    let files = match discover_house_files(&settings.houses_dir) {
        Ok(files) => files,
        Err(e) => {
            log::error!(
                "cannot read houses directory {}: {e}",
                settings.houses_dir.display()
            );
            return scene;
        }
    };

    for path in files {
        match load_gltf_model(device, queue, &layouts.material_bgl, &path) {
            Ok(model) => {
                let slot = scene.houses().len();
                let transform = Mat4::from_translation(Vec3::new(
                    slot as f32 * settings.spacing,
                    0.0,
                    -settings.row_offset,
                )) * Mat4::from_scale(Vec3::splat(settings.model_scale));

                let name = house_name(&path);
                let model = Arc::new(model);
                renderer.add_model(device, layouts, Arc::clone(&model), transform);
                let id = scene.add_house(name.as_str(), transform, model.bounds);
                log::info!("loaded house '{name}' (#{}) from {}", id.0, path.display());
            }
            Err(e) => log::error!("failed to load model {}: {e:#}", path.display()),
        }
    }

    if scene.is_empty() {
        log::warn!(
            "no houses loaded from {}; nothing will be selectable",
            settings.houses_dir.display()
        );
    }

    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("atrium-loader-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn discovery_filters_and_sorts_model_files() {
        let dir = scratch_dir("discover");
        for name in ["b_house.glb", "a_house.glb", "notes.txt", "shed.gltf", "thumb.png"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }

        let files = discover_house_files(&dir).unwrap();
        let names: Vec<String> = files.iter().map(|p| house_name(p)).collect();
        assert_eq!(names, ["a_house", "b_house", "shed"]);

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = scratch_dir("missing").join("does-not-exist");
        assert!(discover_house_files(&dir).is_err());
    }

    #[test]
    fn house_name_strips_directory_and_extension() {
        assert_eq!(house_name(Path::new("/models/house1.glb")), "house1");
        assert_eq!(house_name(Path::new("house.two.gltf")), "house.two");
    }
}
