use scene_primer::loaders::{load_image, load_obj, parse_obj};
use scene_primer::mesh::MeshData;
use std::io::Cursor;
use std::path::PathBuf;

fn asset(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(path)
}

#[cfg(test)]
mod mesh_tests {
    use super::*;

    #[test]
    fn test_load_shipped_model() {
        let mesh = load_obj(asset("assets/meshes/model.obj")).expect("shipped model loads");
        assert!(mesh.triangle_count() > 0);
        assert_eq!(mesh.indices.len() % 3, 0);
        assert!(mesh
            .indices
            .iter()
            .all(|&i| (i as usize) < mesh.vertices.len()));
        for v in &mesh.vertices {
            let n = v.normal;
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-3, "normal {:?} is not unit length", n);
        }
    }

    #[test]
    fn test_missing_model_is_an_error() {
        let err = load_obj(asset("assets/meshes/does_not_exist.obj")).unwrap_err();
        assert!(format!("{:#}", err).contains("does_not_exist.obj"));
    }

    #[test]
    fn test_quads_are_triangulated() {
        let source = "\
v -1 -1 0
v 1 -1 0
v 1 1 0
v -1 1 0
f 1 2 3 4
";
        let mesh = parse_obj(&mut Cursor::new(source)).expect("quad parses");
        assert_eq!(mesh.triangle_count(), 2);
        // No normals in the file, so they are computed facing +Z
        for v in &mesh.vertices {
            assert!((v.normal[2] - 1.0).abs() < 1e-5);
            assert_eq!(v.tex_coord, [0.0, 0.0]);
        }
    }

    #[test]
    fn test_sphere_and_cuboid_indices_in_range() {
        for mesh in [MeshData::sphere(0.4, 50), MeshData::cuboid(1.0, 2.0, 3.0)] {
            assert!(mesh
                .indices
                .iter()
                .all(|&i| (i as usize) < mesh.vertices.len()));
        }
    }

    #[test]
    fn test_load_shipped_textures() {
        for name in ["model.tga", "earth.tga", "crate.tga"] {
            let image = load_image(asset(&format!("assets/textures/{}", name)))
                .unwrap_or_else(|e| panic!("{} failed to load: {:#}", name, e));
            assert!(image.width > 0 && image.height > 0);
            assert_eq!(image.data.len(), (image.width * image.height * 4) as usize);
        }
    }
}
