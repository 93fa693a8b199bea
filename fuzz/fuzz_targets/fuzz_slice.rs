#![no_main]

use libfuzzer_sys::arbitrary::{Arbitrary, Result, Unstructured};
use libfuzzer_sys::fuzz_target;
use meshslice::{Mesh, Plane, SliceConfig, Slicer};
use nalgebra::{Point3, Vector3};

#[derive(Debug)]
struct FuzzSlice {
    vertices: Vec<(f64, f64, f64)>,
    triangles: Vec<usize>,
    normal: (f64, f64, f64),
    point: (f64, f64, f64),
    max_cap_iterations: usize,
    cap_sections: bool,
}

impl<'a> Arbitrary<'a> for FuzzSlice {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let vertex_count = u.int_in_range(0..=64)?;
        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            vertices.push((u.arbitrary()?, u.arbitrary()?, u.arbitrary()?));
        }

        // Mostly in-range indices, with the odd out-of-range one to exercise validation
        let index_count = u.int_in_range(0..=96)?;
        let mut triangles = Vec::with_capacity(index_count);
        for _ in 0..index_count {
            triangles.push(u.int_in_range(0..=vertex_count)?);
        }

        Ok(FuzzSlice {
            vertices,
            triangles,
            normal: u.arbitrary()?,
            point: u.arbitrary()?,
            max_cap_iterations: u.int_in_range(0..=10_000)?,
            cap_sections: u.arbitrary()?,
        })
    }
}

fuzz_target!(|input: FuzzSlice| {
    // Slicing must never panic, whatever the input; invalid input is an error
    let vertices = input
        .vertices
        .iter()
        .map(|&(x, y, z)| Point3::new(x, y, z))
        .collect();
    let mesh = Mesh::from_triangles(vertices, input.triangles);

    let (nx, ny, nz) = input.normal;
    let (px, py, pz) = input.point;
    let plane = Plane::new(Vector3::new(nx, ny, nz), Point3::new(px, py, pz));

    let config = SliceConfig::new()
        .with_max_cap_iterations(input.max_cap_iterations)
        .with_capping(input.cap_sections);

    if let Ok(result) = Slicer::new(config).slice(&mesh, &plane) {
        let output_indices_valid = [&result.positive, &result.negative]
            .iter()
            .all(|half| half.triangles.iter().all(|&i| i < half.vertex_count()));
        assert!(output_indices_valid, "output mesh references missing vertex");
    }
});
