//! Example: Slicing a Cube
//!
//! This example cuts a unit cube with a horizontal plane and prints what each
//! half looks like:
//! - Triangle and vertex counts
//! - Cap statistics and warnings from the slice report
//! - Volume and bounding box of each half (with the `mesh-ops` feature)
//!
//! Usage: `cargo run --example slice_cube -- [height]` where `height` is the
//! plane's y coordinate (default 0.0).

use meshslice::mesh_ops::{compute_mesh_signed_volume, is_watertight};
use meshslice::{Mesh, Plane, Side, slice};
use nalgebra::{Point3, Vector3};
use std::env;

fn unit_cube() -> Mesh {
    let h = 0.5;
    Mesh::from_triangles(
        vec![
            Point3::new(-h, -h, -h),
            Point3::new(h, -h, -h),
            Point3::new(h, h, -h),
            Point3::new(-h, h, -h),
            Point3::new(-h, -h, h),
            Point3::new(h, -h, h),
            Point3::new(h, h, h),
            Point3::new(-h, h, h),
        ],
        vec![
            0, 2, 1, 0, 3, 2, 4, 5, 6, 4, 6, 7, 0, 1, 5, 0, 5, 4, 2, 3, 7, 2, 7, 6, 0, 4, 7, 0, 7,
            3, 1, 2, 6, 1, 6, 5,
        ],
    )
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let height: f64 = match env::args().nth(1) {
        Some(arg) => arg.parse()?,
        None => 0.0,
    };

    let mesh = unit_cube();
    let plane = Plane::new(Vector3::y(), Point3::new(0.0, height, 0.0));

    println!("Slicing a unit cube at y = {}", height);
    println!("  Source: {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count());
    println!();

    let result = slice(&mesh, &plane)?;
    let report = &result.report;

    println!("Slice Report:");
    println!("  Cut triangles: {}", report.cut_triangles);
    println!("  Cut edges: {}", report.cut_edges);
    println!("  Skipped triangles: {}", report.skipped_triangles);
    println!();

    for side in [Side::Positive, Side::Negative] {
        let half = result.mesh(side);
        let stats = report.side(side);

        println!("{} half:", side);
        println!("  Vertices: {}", half.vertex_count());
        println!("  Triangles: {}", half.triangle_count());
        println!("    Copied: {}", stats.copied_triangles);
        println!("    Cap: {} (from {} loops)", stats.cap_triangles, stats.capped_loops);
        println!("  Signed volume: {:.6}", compute_mesh_signed_volume(half));
        println!("  Watertight: {}", is_watertight(half, 1e-9));

        #[cfg(feature = "mesh-ops")]
        {
            if !half.is_empty() {
                let volume = meshslice::mesh_ops::compute_mesh_volume(half)?;
                let (min, max) = meshslice::mesh_ops::compute_mesh_aabb(half)?;
                println!("  Volume (parry3d): {:.6}", volume);
                println!(
                    "  Bounding box: ({:.3}, {:.3}, {:.3}) to ({:.3}, {:.3}, {:.3})",
                    min.x, min.y, min.z, max.x, max.y, max.z
                );
            }
        }
        println!();
    }

    if report.is_clean() {
        println!("✓ No warnings");
    } else {
        println!("Warnings:");
        for warning in &report.warnings {
            println!("  - {}", warning);
        }
    }

    Ok(())
}
