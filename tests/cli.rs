use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn renders_a_grayscale_png() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("simple.png");
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["-o", output.to_str().unwrap(), "-s", "32x24", "-w", "3"])
        .assert()
        .success();
    let image = image::open(&output).unwrap().to_luma8();
    assert_eq!(image.dimensions(), (32, 24));
}

#[test]
fn renders_a_supersampled_rainbow_png() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("color.png");
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&[
            "-o",
            output.to_str().unwrap(),
            "-s",
            "20x20",
            "--colorizer",
            "rainbow",
            "--colors",
            "8",
            "--smooth",
            "1",
            "-c",
            "-0.5,0.1",
            "-p",
            "2.5",
        ])
        .assert()
        .success();
    let image = image::open(&output).unwrap().to_rgba8();
    assert_eq!(image.dimensions(), (20, 20));
}

#[test]
fn rejects_a_bad_size() {
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["-o", "never.png", "-s", "wide"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Could not parse output image size"));
}

#[test]
fn rejects_zero_workers() {
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["-o", "never.png", "-w", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Worker count must be between"));
}

#[test]
fn rejects_an_empty_image() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("empty.png");
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&["-o", output.to_str().unwrap(), "-s", "0x10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("positive size"));
    assert!(!output.exists());
}

#[test]
fn sweeps_the_power_across_numbered_frames() {
    let dir = tempdir().unwrap();
    let output = dir.path().join("pow.png");
    Command::cargo_bin("mandelbrot")
        .unwrap()
        .args(&[
            "-o",
            output.to_str().unwrap(),
            "-s",
            "16x16",
            "--frames",
            "3",
            "--power-to",
            "3",
        ])
        .assert()
        .success();
    for name in &["pow_0000.png", "pow_0001.png", "pow_0002.png"] {
        let frame = image::open(dir.path().join(name)).unwrap().to_luma8();
        assert_eq!(frame.dimensions(), (16, 16));
    }
    assert!(!output.exists());
    assert!(!dir.path().join("pow_0003.png").exists());
}
