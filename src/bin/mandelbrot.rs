use clap::{App, Arg, ArgMatches};
use failure::err_msg;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, Luma, Pixel};
use log::info;
use mandelbrot::config::{power_sweep, MAX_SMOOTH};
use mandelbrot::{Color, Colorizer, Config, Raster};
use num::Complex;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;

/// Splits `s` at `separator` and parses both halves.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let (left, right) = s.split_once(separator)?;
    Some((left.parse().ok()?, right.parse().ok()?))
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex { re, im })
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    parse_pair::<T>(s, separator)
        .map(|_| ())
        .ok_or_else(|| err.to_string())
}

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    s.parse::<T>().map(|_| ()).map_err(|_| err.to_string())
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    nan_err: &str,
    range_err: &str,
) -> Result<(), String> {
    let n = s.parse::<T>().map_err(|_| nan_err.to_string())?;
    if n < low || n > high {
        return Err(range_err.to_string());
    }
    Ok(())
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const ROTATE: &str = "rotate";
const ZOOM: &str = "zoom";
const CENTER: &str = "center";
const ITERATIONS: &str = "iterations";
const FACTOR: &str = "iteration-factor";
const POWER: &str = "power";
const WORKERS: &str = "workers";
const COLORIZER: &str = "colorizer";
const COLORS: &str = "colors";
const SHIFT: &str = "shift";
const SMOOTH: &str = "smooth";
const POWER_TO: &str = "power-to";
const FRAMES: &str = "frames";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandelbrot")
        .version("0.1.0")
        .about("Escape-time fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; the format follows the extension"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("1024x1024")
                .validator(|s| validate_pair::<u32>(&s, 'x', "Could not parse output image size"))
                .help("Size of output image"),
        )
        .arg(
            Arg::with_name(ROTATE)
                .long(ROTATE)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse rotation"))
                .help("Rotation in radians"),
        )
        .arg(
            Arg::with_name(ZOOM)
                .long(ZOOM)
                .short("z")
                .takes_value(true)
                .default_value("1.6")
                .validator(|s| validate_number::<f64>(&s, "Could not parse zoom"))
                .help("Zoom, relative to the whole set fitting the image"),
        )
        .arg(
            Arg::with_name(CENTER)
                .long(CENTER)
                .short("c")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-0.75,0")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse center point"))
                .help("Point of the complex plane at the center of the image"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        10_000_000usize,
                        "Could not parse iteration count",
                        "Iteration count must be between 0 and 10000000",
                    )
                })
                .help("Iteration bound; derived from the zoom if absent"),
        )
        .arg(
            Arg::with_name(FACTOR)
                .long(FACTOR)
                .short("k")
                .takes_value(true)
                .default_value("10")
                .validator(|s| validate_number::<f64>(&s, "Could not parse iteration factor"))
                .help("Iterations per unit of log-scale when the bound is derived"),
        )
        .arg(
            Arg::with_name(POWER)
                .long(POWER)
                .short("p")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("2")
                .validator(|s| validate_number::<f64>(&s, "Could not parse power"))
                .help("Exponent of the iterated function"),
        )
        .arg(
            Arg::with_name(WORKERS)
                .long(WORKERS)
                .short("w")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        65_536usize,
                        "Could not parse worker count",
                        "Worker count must be between 1 and 65536",
                    )
                })
                .help("Number of bands to split the image into; four per CPU if absent"),
        )
        .arg(
            Arg::with_name(COLORIZER)
                .long(COLORIZER)
                .takes_value(true)
                .possible_values(&["bw", "inverted", "rainbow"])
                .default_value("bw")
                .help("Coloring scheme"),
        )
        .arg(
            Arg::with_name(COLORS)
                .long(COLORS)
                .takes_value(true)
                .default_value("16")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        4096usize,
                        "Could not parse color count",
                        "Color count must be between 1 and 4096",
                    )
                })
                .help("Number of rainbow colors"),
        )
        .arg(
            Arg::with_name(SHIFT)
                .long(SHIFT)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<i64>(&s, "Could not parse palette shift"))
                .help("Palette shift"),
        )
        .arg(
            Arg::with_name(SMOOTH)
                .long(SMOOTH)
                .takes_value(true)
                .default_value("0")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        MAX_SMOOTH,
                        "Could not parse smoothing",
                        &format!("Smoothing must be between 0 and {}", MAX_SMOOTH),
                    )
                })
                .help("Supersample 2^N times in each direction, then downscale"),
        )
        .arg(
            Arg::with_name(POWER_TO)
                .long(POWER_TO)
                .takes_value(true)
                .allow_hyphen_values(true)
                .validator(|s| validate_number::<f64>(&s, "Could not parse final power"))
                .help("Sweep the power from --power to this value across --frames images"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .takes_value(true)
                .default_value("1")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        100_000usize,
                        "Could not parse frame count",
                        "Frame count must be between 1 and 100000",
                    )
                })
                .help("Number of images; more than one numbers the output files"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, failure::Error> {
    let raw = matches
        .value_of(name)
        .ok_or_else(|| err_msg(format!("missing value for --{}", name)))?;
    T::from_str(raw).map_err(|_| err_msg(format!("could not parse --{} {}", name, raw)))
}

fn optional<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<Option<T>, failure::Error> {
    if matches.is_present(name) {
        value(matches, name).map(Some)
    } else {
        Ok(None)
    }
}

fn config(matches: &ArgMatches) -> Result<Config, failure::Error> {
    let (width, height) = parse_pair(matches.value_of(SIZE).unwrap_or_default(), 'x')
        .ok_or_else(|| err_msg("Error parsing image dimensions"))?;
    let center = parse_complex(matches.value_of(CENTER).unwrap_or_default())
        .ok_or_else(|| err_msg("Error parsing center point"))?;
    let config = Config {
        width,
        height,
        rotate: value(matches, ROTATE)?,
        zoom: value(matches, ZOOM)?,
        center,
        max_iterations: optional(matches, ITERATIONS)?,
        iteration_factor: value(matches, FACTOR)?,
        power: value(matches, POWER)?,
        workers: optional(matches, WORKERS)?,
        smooth: value(matches, SMOOTH)?,
    };
    config.validate()?;
    Ok(config)
}

/// Render at the supersampled size, then reduce to the output size.
fn draw<P>(config: &Config, colorizer: &Colorizer<P>) -> Result<Raster<P>, failure::Error>
where
    P: Pixel + Send + Sync + 'static,
    P::Subpixel: Send + 'static,
{
    let (width, height) = config.render_size();
    let renderer = config.renderer()?;
    let evaluator = config.evaluator();
    info!(
        "rendering {}x{}, {} iterations, {} bands",
        width,
        height,
        evaluator.max_iterations(),
        renderer.workers()
    );

    let mut image: Raster<P> = ImageBuffer::new(width, height);
    let start = Instant::now();
    renderer.render(&mut image, &config.transform(), &evaluator, colorizer)?;
    info!("rendered in {:?}", start.elapsed());

    if config.smooth > 0 {
        let start = Instant::now();
        image = imageops::resize(&image, config.width, config.height, FilterType::Lanczos3);
        info!("resized in {:?}", start.elapsed());
    }
    Ok(image)
}

/// `dir/name.png` becomes `dir/name_0007.png` for frame 7.
fn frame_path(output: &str, index: usize) -> PathBuf {
    let path = Path::new(output);
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("frame");
    let name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_{:04}.{}", stem, index, ext),
        None => format!("{}_{:04}", stem, index),
    };
    path.with_file_name(name)
}

fn render_one(config: &Config, matches: &ArgMatches, output: &Path) -> Result<(), failure::Error> {
    let image = match matches.value_of(COLORIZER).unwrap_or("bw") {
        "rainbow" => {
            let colorizer: Colorizer<Color> =
                Colorizer::rainbow(value(matches, COLORS)?, value(matches, SHIFT)?)?;
            DynamicImage::ImageRgba8(draw(config, &colorizer)?)
        }
        scheme => {
            let colorizer: Colorizer<Luma<u8>> = Colorizer::binary(scheme == "inverted");
            DynamicImage::ImageLuma8(draw(config, &colorizer)?)
        }
    };

    image.save(output)?;
    info!("wrote {}", output.display());
    Ok(())
}

fn run() -> Result<(), failure::Error> {
    let matches = args();
    let config = config(&matches)?;
    let output = matches
        .value_of(OUTPUT)
        .ok_or_else(|| err_msg("An output file is required"))?;

    let frames: usize = value(&matches, FRAMES)?;
    if frames == 1 {
        return render_one(&config, &matches, Path::new(output));
    }

    let to = optional(&matches, POWER_TO)?.unwrap_or(config.power);
    for (index, power) in power_sweep(config.power, to, frames).into_iter().enumerate() {
        info!("frame {}: power {}", index, power);
        let frame = Config {
            power,
            ..config.clone()
        };
        render_one(&frame, &matches, &frame_path(output, index))?;
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
