// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use log::info;
use num::Complex;
use std::fmt::Display;
use std::str::FromStr;

use mandelbrot::compare;
use mandelbrot::{
    write_png, EscapeConfig, ImageSize, Palette, RenderError, Renderer, Strategy, Viewport,
};

/// Splits `s` at the first `separator` and parses both halves.
fn parse_pair<T: FromStr>(s: &str, separator: char) -> Option<(T, T)> {
    let index = s.find(separator)?;
    let left: T = s[..index].parse().ok()?;
    let right: T = s[index + 1..].parse().ok()?;
    Some((left, right))
}

fn parse_complex(s: &str) -> Option<Complex<f64>> {
    parse_pair(s, ',').map(|(re, im)| Complex::new(re, im))
}

/// `WIDTHxHEIGHT`, checked by the library so the validator and the
/// renderer agree on what a usable size is.
fn parse_size(s: &str) -> Result<ImageSize, String> {
    let (width, height) =
        parse_pair::<i64>(s, 'x').ok_or_else(|| "Could not parse output image size".to_string())?;
    ImageSize::new(width, height).map_err(|e| e.to_string())
}

fn parse_corner(s: &str, which: &str) -> Result<Complex<f64>, String> {
    parse_complex(s).ok_or_else(|| format!("Could not parse {} corner", which))
}

/// Parses a whole number and checks it against an inclusive range.
/// `what` names the quantity in both error messages.
fn parse_in_range<T>(s: &str, low: T, high: T, what: &str) -> Result<T, String>
where
    T: FromStr + PartialOrd + Display,
{
    let n: T = s
        .parse()
        .map_err(|_| format!("Could not parse {}", what.to_lowercase()))?;
    if n < low || n > high {
        return Err(format!("{} must be between {} and {}", what, low, high));
    }
    Ok(n)
}

const OUTPUT: &str = "output";
const SIZE: &str = "size";
const LEFTLOWER: &str = "leftlower";
const RIGHTUPPER: &str = "rightupper";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const STRATEGY: &str = "strategy";
const PALETTE: &str = "palette";
const COMPARE: &str = "compare";

const MAX_THREADS: usize = 1024;
const MAX_ITERATIONS: usize = 200_000;
const THREAD_COUNT: &str = "Thread count";
const ITERATION_COUNT: &str = "Iteration count";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandel")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Multi-threaded Mandelbrot renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output PNG file"),
        )
        .arg(
            Arg::with_name(SIZE)
                .required(false)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x600")
                .validator(|s| parse_size(&s).map(|_| ()))
                .help("Size of output image, WIDTHxHEIGHT"),
        )
        .arg(
            Arg::with_name(LEFTLOWER)
                .required(false)
                .long(LEFTLOWER)
                .short("l")
                .takes_value(true)
                .allow_hyphen_values(true)
                .requires(RIGHTUPPER)
                .validator(|s| parse_corner(&s, "left lower").map(|_| ()))
                .help("Left lower corner of the complex plane, RE,IM"),
        )
        .arg(
            Arg::with_name(RIGHTUPPER)
                .required(false)
                .long(RIGHTUPPER)
                .short("r")
                .takes_value(true)
                .allow_hyphen_values(true)
                .requires(LEFTLOWER)
                .validator(|s| parse_corner(&s, "right upper").map(|_| ()))
                .help("Right upper corner of the complex plane, RE,IM"),
        )
        .arg(
            Arg::with_name(THREADS)
                .required(false)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .validator(|s| parse_in_range(&s, 1, MAX_THREADS, THREAD_COUNT).map(|_| ()))
                .help("Number of worker threads (default: one per core)"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .required(false)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("100")
                .validator(|s| {
                    parse_in_range(&s, 1, MAX_ITERATIONS, ITERATION_COUNT).map(|_| ())
                })
                .help("Maximum iterations per point"),
        )
        .arg(
            Arg::with_name(STRATEGY)
                .required(false)
                .long(STRATEGY)
                .takes_value(true)
                .possible_values(&["pool", "rows", "sequential"])
                .default_value("pool")
                .help("How rows are spread across threads"),
        )
        .arg(
            Arg::with_name(PALETTE)
                .required(false)
                .long(PALETTE)
                .takes_value(true)
                .possible_values(&["grayscale", "binary"])
                .default_value("grayscale")
                .help("How escape times become colours"),
        )
        .arg(
            Arg::with_name(COMPARE)
                .long(COMPARE)
                .help("Print a timing table of every strategy before rendering"),
        )
        .get_matches()
}

fn renderer(matches: &ArgMatches) -> Result<Renderer, RenderError> {
    let size = parse_size(matches.value_of(SIZE).unwrap_or("800x600"))
        .map_err(RenderError::InvalidInput)?;

    let corners = (
        matches.value_of(LEFTLOWER).and_then(parse_complex),
        matches.value_of(RIGHTUPPER).and_then(parse_complex),
    );
    let viewport = match corners {
        (Some(leftlower), Some(rightupper)) => Viewport::new(size, leftlower, rightupper)?,
        _ => Viewport::for_size(size),
    };

    let iterations = matches
        .value_of(ITERATIONS)
        .and_then(|s| parse_in_range(s, 1, MAX_ITERATIONS, ITERATION_COUNT).ok())
        .unwrap_or(mandelbrot::escape::DEFAULT_MAX_ITERATIONS);
    let config = EscapeConfig::new(iterations, mandelbrot::escape::DEFAULT_ESCAPE_RADIUS)?;

    let palette = match matches.value_of(PALETTE) {
        Some("binary") => Palette::Binary,
        _ => Palette::Grayscale,
    };

    Ok(Renderer::new(viewport, config, palette))
}

fn strategy(matches: &ArgMatches) -> Strategy {
    let threads = matches
        .value_of(THREADS)
        .and_then(|s| parse_in_range(s, 1, MAX_THREADS, THREAD_COUNT).ok())
        .unwrap_or_else(num_cpus::get);
    match matches.value_of(STRATEGY) {
        Some("sequential") => Strategy::Sequential,
        Some("rows") => Strategy::RowTasks,
        _ => Strategy::WorkerPool(threads),
    }
}

fn run(matches: &ArgMatches) -> Result<String, RenderError> {
    let renderer = renderer(matches)?;
    let strategy = strategy(matches);

    if matches.is_present(COMPARE) {
        println!("{}", compare::standard_comparison(&renderer)?);
        let counts: Vec<usize> = (0..)
            .map(|p: u32| 1usize << p)
            .take_while(|&n| n <= 2 * num_cpus::get())
            .collect();
        println!("{}", compare::worker_scaling(&renderer, &counts)?);
    }

    let canvas = renderer.render(strategy)?;
    let output = matches.value_of(OUTPUT).unwrap_or("mandelbrot.png");
    write_png(output, &canvas)?;
    Ok(output.to_string())
}

fn main() {
    env_logger::init();
    let matches = args();
    info!("starting render");

    match run(&matches) {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(output) => println!("Saved {}", output),
    }
}
