//! Editor benchmarks
//!
//! Run with: cargo bench -p phasekit-gcode

use std::fmt::Write as _;
use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use phasekit_core::{LayerInfo, ParameterSchedule, Shift};
use phasekit_gcode::{scan_layers, ExtrudeRatioTable, GcodeEditor};

const LAYERS: u32 = 200;

/// Sliced-looking G-code: a square perimeter plus some infill per layer
fn synthetic_gcode(layers: u32) -> String {
    let mut gcode = String::from("; layer_height=0.2\nG28\n");
    for layer in 0..layers {
        let z = 0.2 * (layer + 1) as f64;
        let _ = write!(
            gcode,
            ";BEFORE_LAYER_CHANGE\n;LAYER_CHANGE\nG1 Z{z:.3} F9000\n;TYPE:External perimeter\n"
        );
        for (x, y) in [(0.0, 0.0), (40.0, 0.0), (40.0, 40.0), (0.0, 40.0), (0.0, 0.0)] {
            let _ = writeln!(gcode, "G1 X{x:.3} Y{y:.3} E0.8 F1800");
        }
        gcode.push_str(";WIPE_START\nG1 X2 Y2 F9000\n;TYPE:Solid infill\n");
        for row in 0..50 {
            let y = row as f64 * 0.8;
            let _ = writeln!(gcode, "G1 X40.000 Y{y:.3} E1.2\nG1 X0.000 Y{y:.3} E1.2");
        }
    }
    gcode
}

fn schedule() -> ParameterSchedule {
    ParameterSchedule::new(
        vec![0.0, 30.0, 70.0, 100.0],
        vec![205.0, 215.0, 200.0, 210.0],
        vec![100.0, 140.0, 90.0, 120.0],
        4.0,
        Shift::new(1.0, -1.0),
        true,
    )
    .expect("valid schedule")
}

fn bench_editor(c: &mut Criterion) {
    let gcode = synthetic_gcode(LAYERS);
    let schedule = schedule();
    let ratios = ExtrudeRatioTable::from_schedule(&schedule).expect("valid ratios");
    let info = LayerInfo::new(0.2, LAYERS, "synthetic").expect("layers present");

    let mut group = c.benchmark_group("editor");
    group.throughput(Throughput::Bytes(gcode.len() as u64));

    group.bench_function("scan_layers", |b| {
        b.iter(|| scan_layers(Cursor::new(black_box(gcode.as_bytes())), "synthetic"))
    });

    group.bench_function("rewrite", |b| {
        b.iter(|| {
            let mut editor = GcodeEditor::new(&schedule, &ratios, info);
            let mut out = Vec::with_capacity(gcode.len() * 2);
            let _ = editor.rewrite(Cursor::new(black_box(gcode.as_bytes())), &mut out);
            black_box(editor.finish())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_editor);
criterion_main!(benches);
