// Copyright (C) 2025  Tom Waddington
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published
// by the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! steno: burn the keys pressed in a VHS tape into its recording

mod compositor;
mod duration;
mod error;
mod glyph;
mod logging;
mod overlay;
mod parser;
mod timeline;
mod types;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use crate::compositor::Compositor;
use crate::timeline::TimelineBuilder;
use crate::types::{GlyphStyle, OverlayStyle, TimingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "steno",
    about = "Inject a keypress overlay into a VHS recording",
    version
)]
struct Cli {
    /// VHS tape file that produced the recording
    tape: PathBuf,

    /// Recording to draw the keypresses onto
    recording: PathBuf,

    /// Output file to write to
    #[arg(short, long, default_value = "output.mp4")]
    output: PathBuf,

    /// Font size
    #[arg(short, long, default_value_t = 30)]
    size: u32,

    /// Font color
    #[arg(short, long, default_value = "white")]
    color: String,

    /// Font file to render the overlay with
    #[arg(short, long)]
    fontfile: Option<PathBuf>,

    /// Horizontal position (ffmpeg expression)
    #[arg(short, default_value = "(w-text_w)/2")]
    x: String,

    /// Vertical position (ffmpeg expression)
    #[arg(short, default_value = "h-text_h-40")]
    y: String,

    /// Show <ENTER>-style tokens instead of symbols
    #[arg(long)]
    no_symbols: bool,

    /// Delay between typed characters, matching the tape's TypingSpeed
    #[arg(long, default_value_t = 50, value_name = "MS")]
    typing_speed: u64,

    /// ffmpeg binary to run
    #[arg(long, default_value = "ffmpeg", value_name = "PROGRAM")]
    ffmpeg: String,

    /// Print the ffmpeg command instead of running it
    #[arg(long)]
    dry_run: bool,

    /// Enable logging
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: Cli) -> Result<()> {
    let tape = parser::read_tape(&cli.tape).context("Failed to parse tape")?;

    let style = if cli.no_symbols {
        GlyphStyle::Tokens
    } else {
        GlyphStyle::Symbols
    };
    let timing = TimingConfig {
        typing_speed_ms: cli.typing_speed,
    };
    let events = TimelineBuilder::new(timing, style)
        .build(&tape.commands)
        .context("Failed to build keypress timeline")?;
    let draws = overlay::build_draw_calls(&events);

    let compositor = Compositor::new(
        cli.ffmpeg,
        OverlayStyle {
            font_size: cli.size,
            font_color: cli.color,
            font_file: cli.fontfile,
            x: cli.x,
            y: cli.y,
        },
    );

    if cli.dry_run {
        println!(
            "{}",
            compositor.command_line(&cli.recording, &cli.output, &draws)
        );
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to install Ctrl-C handler")?;

    compositor
        .render(&cli.recording, &cli.output, &draws, &running)
        .context("Could not inject text")?;

    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
