//! ASCII PLY export for live point clouds.

use crate::grid::GridTopology;
use crate::point::CloudPoint;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write the current cloud to an ASCII PLY file.
///
/// Colors are quantized to 8-bit. When a topology is supplied the grid
/// triangles are written as faces, producing a mesh viewers can shade;
/// without one the file is a pure point cloud.
pub fn write_cloud_to_ply(
    path: impl AsRef<Path>,
    points: &[CloudPoint],
    topology: Option<&GridTopology>,
) -> Result<(), std::io::Error> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut out = BufWriter::new(file);

    let face_count = topology.map_or(0, |t| t.triangles().len());

    writeln!(out, "ply")?;
    writeln!(out, "format ascii 1.0")?;
    writeln!(out, "element vertex {}", points.len())?;
    writeln!(out, "property float x")?;
    writeln!(out, "property float y")?;
    writeln!(out, "property float z")?;
    writeln!(out, "property uchar red")?;
    writeln!(out, "property uchar green")?;
    writeln!(out, "property uchar blue")?;
    if face_count > 0 {
        writeln!(out, "element face {}", face_count)?;
        writeln!(out, "property list uchar uint vertex_indices")?;
    }
    writeln!(out, "end_header")?;

    for p in points {
        let r = (p.color.x.clamp(0.0, 1.0) * 255.0) as u8;
        let g = (p.color.y.clamp(0.0, 1.0) * 255.0) as u8;
        let b = (p.color.z.clamp(0.0, 1.0) * 255.0) as u8;
        writeln!(
            out,
            "{} {} {} {} {} {}",
            p.position.x, p.position.y, p.position.z, r, g, b
        )?;
    }

    if let Some(topo) = topology {
        for tri in topo.triangles() {
            writeln!(out, "3 {} {} {}", tri[0], tri[1], tri[2])?;
        }
    }

    out.flush()?;
    info!(
        "Wrote {} points, {} faces to {}",
        points.len(),
        face_count,
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec3, Vec4};

    fn sample_points() -> Vec<CloudPoint> {
        vec![
            CloudPoint::new(Vec3::ZERO, Vec4::new(1.0, 0.0, 0.0, 1.0), 0.04),
            CloudPoint::new(Vec3::X, Vec4::new(0.0, 1.0, 0.0, 1.0), 0.04),
            CloudPoint::new(Vec3::Y, Vec4::new(0.0, 0.0, 1.0, 1.0), 0.04),
            CloudPoint::new(Vec3::ONE, Vec4::ONE, 0.04),
        ]
    }

    #[test]
    fn test_export_point_cloud() {
        let path = std::env::temp_dir().join("parallax_ply_points_test.ply");
        write_cloud_to_ply(&path, &sample_points(), None).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("ply"));
        assert!(contents.contains("element vertex 4"));
        assert!(!contents.contains("element face"));
        // One data line per vertex after the header
        let body: Vec<&str> = contents
            .lines()
            .skip_while(|l| *l != "end_header")
            .skip(1)
            .collect();
        assert_eq!(body.len(), 4);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_export_with_faces() {
        let topo = GridTopology::build(2, 2);
        let path = std::env::temp_dir().join("parallax_ply_faces_test.ply");
        write_cloud_to_ply(&path, &sample_points(), Some(&topo)).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("element face 2"));
        assert!(contents.contains("3 2 0 1"));
        std::fs::remove_file(&path).ok();
    }
}
