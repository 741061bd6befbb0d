use emerald_render::geometry::{ExportData, RenderStyle};
use emerald_render::raster::{export_raster, RasterFormat};
use emerald_render::{AlignmentEdge, AlignmentSegment, ExportSource, SceneSource};

fn demo_data_dense() -> ExportData {
    // A long diagonal trace to exercise edge drawing at scale
    let edges = (0..200)
        .map(|i| {
            let i = i as f64;
            AlignmentEdge::new([i, i], [i + 1.0, i + 1.0], if i as u32 % 2 == 0 { 1.0 } else { 0.4 })
        })
        .collect();
    ExportData {
        width: 320.0,
        height: 240.0,
        representative_length: Some(200),
        member_length: Some(200),
        ..ExportData::new(vec![AlignmentSegment::trace("#e53935", edges)], "", "")
    }
}

fn histogram(png_bytes: &[u8]) -> [u32; 256] {
    let img = image::load_from_memory(png_bytes).unwrap().to_rgba8();
    let mut hist = [0u32; 256];
    for p in img.pixels() {
        // bucket by red channel for stability across tiny antialiasing diffs
        hist[p[0] as usize] += 1;
    }
    hist
}

#[test]
fn png_histogram_is_stable() {
    let source = SceneSource::new(demo_data_dense(), RenderStyle::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let f1 = dir.path().join("d1.png");
    let f2 = dir.path().join("d2.png");

    export_raster(&source, RasterFormat::Png, 1.0, 1.0, &f1).unwrap();
    export_raster(&source, RasterFormat::Png, 1.0, 1.0, &f2).unwrap();
    let b1 = std::fs::read(&f1).unwrap();
    let b2 = std::fs::read(&f2).unwrap();

    assert_eq!(histogram(&b1), histogram(&b2), "Histogram differs between identical renders");
}

#[test]
fn high_res_render_keeps_proportions() {
    let source = SceneSource::new(demo_data_dense(), RenderStyle::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let base_path = dir.path().join("base.png");
    let hi_path = dir.path().join("hi.png");

    export_raster(&source, RasterFormat::Png, 1.0, 1.0, &base_path).unwrap();
    export_raster(&source, RasterFormat::Png, 1.0, 3.0, &hi_path).unwrap();

    let base = image::open(&base_path).unwrap().to_rgba8();
    let hi = image::open(&hi_path).unwrap().to_rgba8();
    assert_eq!(hi.dimensions(), (base.width() * 3, base.height() * 3));

    // Same scene point, same color.
    assert_eq!(base.get_pixel(2, 2), hi.get_pixel(6, 6));
    let canvas = source.canvas().unwrap();
    assert_eq!((canvas.width(), canvas.height()), (320, 240));
}

#[test]
fn jpeg_export_decodes() {
    let source = SceneSource::new(demo_data_dense(), RenderStyle::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plot.jpg");
    export_raster(&source, RasterFormat::Jpeg, 0.7, 2.0, &path).unwrap();
    let img = image::open(&path).unwrap();
    assert_eq!((img.width(), img.height()), (640, 480));
}
