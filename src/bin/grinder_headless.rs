//! Grinder Headless Runner
//!
//! Renders text into a headless display and prints the presented frame.
//! Useful for testing and generating deterministic snapshots.
//!
//! # Usage
//!
//! ```bash
//! # Render stdin into an 80x25 screen and print it as text
//! printf 'hello\nworld' | grinder-headless
//!
//! # Render a file into a 40x10 screen, reverse video, as JSON
//! grinder-headless --columns 40 --rows 10 --reverse --json notes.txt
//!
//! # Decode key codes
//! grinder-headless --key-name -63234 --key-name -262145
//! ```

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error};

use grinder_display::app::{CliArgs, Config};
use grinder_display::backend::{start_or_exit, Backend, HeadlessBackend};
use grinder_display::core::{attr, Snapshot};
use grinder_display::keys::key_name;

const TAB_WIDTH: i32 = 8;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "grinder-headless")]
#[command(version)]
#[command(about = "Render text into a headless character-cell display", long_about = None)]
struct Args {
    /// Input file (stdin if not specified)
    #[arg(value_name = "INPUT")]
    input: Option<PathBuf>,

    /// Output the frame as JSON instead of text
    #[arg(short, long)]
    json: bool,

    /// Draw the text in reverse video
    #[arg(long)]
    reverse: bool,

    /// Decode a virtual key code and exit (repeatable)
    #[arg(long = "key-name", value_name = "CODE", allow_negative_numbers = true)]
    key_names: Vec<i32>,

    #[command(flatten)]
    display: CliArgs,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();

    if !args.key_names.is_empty() {
        for code in &args.key_names {
            println!("{}\t{}", code, key_name(*code));
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Fatal error: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_with_args(&args.display)?;

    let text = match &args.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut data = String::new();
            io::stdin().read_to_string(&mut data)?;
            data
        }
    };

    let mut display = HeadlessBackend::new();
    display.init(&std::env::args().collect::<Vec<_>>());
    start_or_exit(&mut display, &config);

    if args.reverse {
        display.set_attr(!0, attr::REVERSE);
    }
    display.clear_screen();
    let (x, y) = draw_text(&mut display, &text);
    display.set_cursor(x, y, true);
    display.sync();

    let frame = display
        .last_frame()
        .ok_or("display presented no frame")?
        .clone();
    display.shutdown();

    if args.json {
        println!("{}", frame.to_json()?);
    } else {
        print_text(&frame);
    }

    Ok(())
}

/// Lay `text` out from the top-left corner, one line per row.
///
/// Returns where the cursor ends up. Overflow is clipped by the display.
fn draw_text(display: &mut dyn Backend, text: &str) -> (i32, i32) {
    let (mut x, mut y) = (0i32, 0i32);
    for c in text.chars() {
        match c {
            '\n' => {
                x = 0;
                y = y.saturating_add(1);
            }
            '\r' => x = 0,
            '\t' => x = (x / TAB_WIDTH + 1).saturating_mul(TAB_WIDTH),
            c if c.is_control() => debug!("skipping control character {:?}", c),
            c => {
                display.write_char(x, y, c);
                x = x.saturating_add(1);
            }
        }
    }
    (x, y)
}

fn print_text(frame: &Snapshot) {
    println!("Screen ({}x{}):", frame.width, frame.height);
    println!("Cursor: ({}, {})", frame.cursor.x, frame.cursor.y);
    println!("---");
    print!("{}", frame.to_text());
    println!("---");
}
