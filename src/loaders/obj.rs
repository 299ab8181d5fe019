use anyhow::{bail, Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::mesh::MeshData;
use crate::types::Vertex;

/// Loads a Wavefront OBJ file into a single triangle mesh
pub fn load_obj(path: impl AsRef<Path>) -> Result<MeshData> {
    let path = path.as_ref();
    log::info!("Loading OBJ file: {:?}", path);

    let file = File::open(path).with_context(|| format!("Failed to open OBJ file: {:?}", path))?;
    let mesh = parse_obj(&mut BufReader::new(file))
        .with_context(|| format!("Failed to load OBJ file: {:?}", path))?;

    log::info!(
        "OBJ loaded: {} vertices, {} triangles",
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Parses OBJ text. Faces are triangulated and every model in the file is
/// merged into one mesh. Material libraries are ignored.
pub fn parse_obj<R: BufRead>(reader: &mut R) -> Result<MeshData> {
    let (models, _materials) = tobj::load_obj_buf(
        reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |_| Err(tobj::LoadError::OpenFileFailed),
    )
    .context("Failed to parse OBJ data")?;

    let mut data = MeshData::default();

    for model in &models {
        let mesh = &model.mesh;
        let vertex_count = mesh.positions.len() / 3;
        if vertex_count == 0 {
            continue;
        }

        let has_normals = mesh.normals.len() == mesh.positions.len();
        let has_tex_coords = mesh.texcoords.len() / 2 == vertex_count;

        let mut part = MeshData {
            vertices: (0..vertex_count)
                .map(|i| {
                    let position = [
                        mesh.positions[3 * i],
                        mesh.positions[3 * i + 1],
                        mesh.positions[3 * i + 2],
                    ];
                    let normal = if has_normals {
                        [mesh.normals[3 * i], mesh.normals[3 * i + 1], mesh.normals[3 * i + 2]]
                    } else {
                        [0.0; 3]
                    };
                    let tex_coord = if has_tex_coords {
                        [mesh.texcoords[2 * i], mesh.texcoords[2 * i + 1]]
                    } else {
                        [0.0; 2]
                    };
                    Vertex::new(position, normal, tex_coord)
                })
                .collect(),
            indices: mesh.indices.clone(),
        };

        // Only this model's normals are derived; other models keep theirs
        if !has_normals {
            log::warn!("OBJ model '{}' has no vertex normals, computing smooth normals", model.name);
            part.compute_smooth_normals();
        }

        let base = data.vertices.len() as u32;
        data.vertices.extend(part.vertices);
        data.indices.extend(part.indices.iter().map(|&i| base + i));
    }

    if data.vertices.is_empty() || data.indices.is_empty() {
        bail!("OBJ data contains no triangles");
    }

    Ok(data)
}
