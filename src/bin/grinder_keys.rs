//! Grinder Key Viewer
//!
//! Opens a window and shows the virtual key name of everything typed.
//! Closing the window or pressing Ctrl+Q exits.

use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use grinder_display::app::{CliArgs, Config};
use grinder_display::backend::{start_or_exit, Backend, GuiBackend};
use grinder_display::core::attr;
use grinder_display::input::timeout_from_secs;
use grinder_display::keys::VirtualKey;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "grinder-keys")]
#[command(version)]
#[command(about = "Show the virtual key code of each key pressed", long_about = None)]
struct Args {
    /// Seconds to wait for a key before reporting a timeout (negative waits forever)
    #[arg(short, long, default_value_t = -1.0, allow_negative_numbers = true)]
    timeout: f64,

    #[command(flatten)]
    display: CliArgs,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = match Config::load_with_args(&args.display) {
        Ok(config) => config,
        Err(e) => {
            error!("Config error: {}", e);
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut display = GuiBackend::new();
    display.init(&std::env::args().collect::<Vec<_>>());
    start_or_exit(&mut display, &config);

    run(&mut display, timeout_from_secs(args.timeout));

    display.shutdown();
    ExitCode::SUCCESS
}

fn run(display: &mut dyn Backend, timeout: Option<std::time::Duration>) {
    let quit = VirtualKey::ctrl_letter('q', false);
    let mut history: Vec<String> = Vec::new();

    loop {
        draw(display, &history);
        display.sync();

        let key = display.read_key(timeout);
        if key == VirtualKey::QUIT || Some(key) == quit {
            info!("exiting on {}", key);
            break;
        }

        let line = match key.as_char() {
            Some(c) => format!("{:>8}  {:?}", key.raw(), c),
            None => format!("{:>8}  {}", key.raw(), display.key_name(key.raw())),
        };
        history.push(line);
    }
}

fn draw(display: &mut dyn Backend, history: &[String]) {
    let (width, height) = display.screen_size();

    display.set_attr(0, 0);
    display.clear_screen();

    display.set_attr(!0, attr::REVERSE | attr::BOLD);
    display.clear_area(0, 0, width - 1, 0);
    put_str(display, 1, 0, "grinder-keys: press keys, Ctrl+Q quits");
    display.set_attr(0, 0);

    // Newest at the bottom, as many as fit under the title row.
    let rows = usize::try_from(height - 1).unwrap_or(0);
    let shown = &history[history.len().saturating_sub(rows)..];
    for (i, line) in shown.iter().enumerate() {
        let y = i32::try_from(i + 1).unwrap_or(i32::MAX);
        put_str(display, 1, y, line);
    }

    let cursor_y = i32::try_from(shown.len() + 1).unwrap_or(i32::MAX);
    display.set_cursor(1, cursor_y, true);
}

fn put_str(display: &mut dyn Backend, x: i32, y: i32, s: &str) {
    for (i, c) in s.chars().enumerate() {
        let dx = i32::try_from(i).unwrap_or(i32::MAX);
        display.write_char(x.saturating_add(dx), y, c);
    }
}
