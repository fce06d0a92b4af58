use std::time::Instant;

use strokesplit_rs::color::partition_by_color;
use strokesplit_rs::config::{IdMode, PartitionMode, SegmentConfig};
use strokesplit_rs::mesh::{AttributeChannel, Mesh};
use strokesplit_rs::partition::partition_by_stroke;
use strokesplit_rs::vertex::tag::tag_mesh;

fn murmur3(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;

    h
}

/// Builds `strokes` ribbon strokes of `length` quads each, stored one after another like a merged sketch.
fn sketch(strokes: u32, length: u32) -> Mesh {
    let vertex_count = (strokes * (length + 1) * 2) as usize;

    let mut positions = Vec::with_capacity(vertex_count);
    let mut timestamps = Vec::with_capacity(vertex_count);
    let mut colors = Vec::with_capacity(vertex_count);
    let mut indices = Vec::with_capacity((strokes * length * 6) as usize);

    for s in 0..strokes {
        let base = positions.len() as u32;
        // stroke ids are start timestamps in milliseconds
        let key = 1000.0 + s as f32 * 250.0;
        let color = [(murmur3(s) % 8) as f32 / 8.0, 0.5, 1.0, 1.0];

        for x in 0..=length {
            for y in 0..2 {
                positions.push([x as f32, y as f32, s as f32]);
                timestamps.push([key, key + x as f32, 0.0]);
                colors.push(color);
            }
        }

        for x in 0..length {
            let v = base + x * 2;

            indices.extend_from_slice(&[v + 0, v + 2, v + 1]);
            indices.extend_from_slice(&[v + 1, v + 2, v + 3]);
        }
    }

    Mesh::new("sketch", positions, indices)
        .with_channel(2, AttributeChannel::Vec3(timestamps))
        .with_colors(colors)
}

fn time<T>(label: &str, verbose: bool, f: impl FnOnce() -> T) -> (T, f64) {
    let t0 = Instant::now();
    let result = f();
    let elapsed = t0.elapsed().as_secs_f64();

    if verbose {
        println!("{}: {:.2} ms", label, elapsed * 1_000.0);
    }

    (result, elapsed)
}

fn main() {
    env_logger::init();

    const STROKES: u32 = 2000;
    const LENGTH: u32 = 250;

    let verbose = std::env::args().any(|a| a == "-v");

    let source = sketch(STROKES, LENGTH);

    if verbose {
        println!(
            "source: {} vertices, {} triangles",
            source.vertex_count(),
            source.triangle_count()
        );
    }

    let isolated = SegmentConfig::default();
    let shared = SegmentConfig::default().with_partition_mode(PartitionMode::SharedVertices);

    let mut best = [f64::MAX; 5];

    for _ in 0..5 {
        let mut tagged = source.clone();

        let (set, tag_time) = time("tag", verbose, || tag_mesh(&mut tagged, &isolated));
        let set = set.unwrap();
        assert_eq!(set.len(), STROKES as usize);

        let markers = isolated.clone().with_id_mode(IdMode::ExplicitMarkers);
        let (parts, marker_time) = time("split (markers)", verbose, || partition_by_stroke(&tagged, &markers));
        assert_eq!(parts.unwrap().parts.len(), STROKES as usize);

        let (parts, isolated_time) = time("split (isolated)", verbose, || partition_by_stroke(&source, &isolated));
        assert_eq!(parts.unwrap().parts.len(), STROKES as usize);

        let (parts, shared_time) = time("split (shared)", verbose, || partition_by_stroke(&source, &shared));
        assert_eq!(parts.unwrap().parts.len(), STROKES as usize);

        let (parts, color_time) = time("split (color)", verbose, || partition_by_color(&source));
        assert!(parts.unwrap().parts.len() <= 8);

        for (best, time) in best
            .iter_mut()
            .zip([tag_time, marker_time, isolated_time, shared_time, color_time])
        {
            *best = best.min(time);
        }
    }

    let triangles = source.triangle_count() as f64;

    println!("Algorithm     :\ttag\tmarkers\tisolated\tshared\tcolor");
    println!(
        "Score (Mtri/s):\t{:.2}\t{:.2}\t{:.2}\t\t{:.2}\t{:.2}",
        triangles / best[0] / 1e6,
        triangles / best[1] / 1e6,
        triangles / best[2] / 1e6,
        triangles / best[3] / 1e6,
        triangles / best[4] / 1e6,
    );
}
