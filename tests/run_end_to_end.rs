//! Whole runs through the library entry point

use std::fs;
use std::path::Path;

use phasekit::{check_parameters, run, RunConfig, RunOutcome};
use tempfile::tempdir;

const RULE: &str = "------------------------------------------------------------------";

fn parameter_file(temperatures: [f64; 2], speeds: [f64; 2], heating: u8) -> String {
    format!(
        "Parameter template\n\
         {RULE}\nPhase 0 (%) : 0\nPhase 1 (%) : 100\n\
         {RULE}\nPhase 0 (°C) : {}\nPhase 1 (°C) : {}\n\
         {RULE}\nPhase 0 (%) : {}\nPhase 1 (%) : {}\n\
         {RULE}\nCorrection (%) : 5\n\
         {RULE}\nShift_x (mm) : 1\nShift_y (mm) : 1\n\
         {RULE}\nHeating : {heating}\n",
        temperatures[0], temperatures[1], speeds[0], speeds[1]
    )
}

fn write(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

#[test]
fn test_run_writes_default_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("part.gcode");
    let parameters = dir.path().join("params.txt");
    write(&input, "; layer_height=0.2\nG1 X10 Y10 F1000 E1\n;LAYER_CHANGE\n");
    write(&parameters, &parameter_file([200.0, 210.0], [100.0, 150.0], 0));

    let outcome = run(&RunConfig::new(&input, &parameters)).unwrap();
    let RunOutcome::Completed(summary) = outcome else {
        panic!("run was canceled");
    };
    let expected_output = dir.path().join("modified_part.gcode");
    assert_eq!(summary.output, expected_output);
    assert_eq!(summary.lines_read, 3);
    assert_eq!(summary.lines_modified, 1);
    assert_eq!(summary.heating_blocks, 0);
    assert_eq!(summary.layers, 1);

    let text = fs::read_to_string(expected_output).unwrap();
    assert_eq!(
        text,
        "; layer_height=0.2\nG1 X11.000 Y11.000 F1000.000 E1.050 ;Modified\n;LAYER_CHANGE\n"
    );
    assert!(!text.contains(";HEATING_PHASE"));
}

#[test]
fn test_rejected_parameters_cancel_run() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("part.gcode");
    let parameters = dir.path().join("params.txt");
    let output = dir.path().join("out.gcode");
    write(&input, ";LAYER_CHANGE\nG1 X1 Y1\n");
    // Negative speed is an error
    write(&parameters, &parameter_file([200.0, 210.0], [-10.0, 150.0], 0));
    write(&output, "previous run\n");

    let outcome = run(&RunConfig::new(&input, &parameters).with_output(&output)).unwrap();
    assert!(matches!(outcome, RunOutcome::Canceled(_)));
    assert!(outcome.to_string().starts_with("Canceled: "));
    assert_eq!(fs::read_to_string(&output).unwrap(), "previous run\n");
}

#[test]
fn test_gcode_without_layers_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("flat.gcode");
    let parameters = dir.path().join("params.txt");
    write(&input, "G1 X1 Y1\n");
    write(&parameters, &parameter_file([200.0, 210.0], [100.0, 150.0], 1));

    let err = run(&RunConfig::new(&input, &parameters)).unwrap_err();
    assert!(format!("{err:#}").contains("No layer change marker"));
    assert!(!dir.path().join("modified_flat.gcode").exists());
}

#[test]
fn test_degenerate_ratio_is_reported() {
    let dir = tempdir().unwrap();
    let parameters = dir.path().join("params.txt");
    write(&parameters, &parameter_file([200.0, 200.0], [100.0, 100.0], 0));

    let report = check_parameters(&parameters).unwrap();
    assert!(!report.is_correct());
    assert!(report
        .errors()
        .any(|d| d.message.contains("Cannot derive extrusion ratios")));

    let input = dir.path().join("part.gcode");
    write(&input, ";LAYER_CHANGE\n");
    let err = run(&RunConfig::new(&input, &parameters)).unwrap_err();
    assert!(err.to_string().contains("Cannot derive extrusion ratios"));
}

#[test]
fn test_output_must_differ_from_input() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("part.gcode");
    let config = RunConfig::new(&input, dir.path().join("params.txt")).with_output(&input);
    assert!(run(&config).is_err());
}
