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

//! ffmpeg handoff
//!
//! Turns draw calls into a chain of `drawtext` filters and burns them into
//! the recording with a single ffmpeg run.

use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::types::{DrawCall, OverlayStyle};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Visible on `[start, end)`, or from `start` onwards when unbounded.
pub fn enable_expression(draw: &DrawCall) -> String {
    if draw.unbounded {
        format!("gte(t,{:.6})", draw.start)
    } else {
        format!("gte(t,{:.6})*lt(t,{:.6})", draw.start, draw.end)
    }
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// Option values are unescaped twice: once by the filter graph parser, then
// by the filter's own option parser.
fn escape_value(value: &str) -> String {
    let option = escape_chars(value, &['\\', '\'', ':', '=']);
    escape_chars(&option, &['\\', '\'', '[', ']', ',', ';'])
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./=:+@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}

pub struct Compositor {
    program: String,
    style: OverlayStyle,
}

impl Compositor {
    pub fn new(program: impl Into<String>, style: OverlayStyle) -> Self {
        Self {
            program: program.into(),
            style,
        }
    }

    fn drawtext(&self, draw: &DrawCall) -> String {
        let mut options = vec![
            ("text", draw.text.clone()),
            ("expansion", "none".to_string()),
            ("enable", enable_expression(draw)),
            ("fontsize", self.style.font_size.to_string()),
            ("fontcolor", self.style.font_color.clone()),
            ("x", self.style.x.clone()),
            ("y", self.style.y.clone()),
        ];
        if let Some(font_file) = &self.style.font_file {
            options.push(("fontfile", font_file.display().to_string()));
        }

        let options: Vec<String> = options
            .iter()
            .map(|(key, value)| format!("{}={}", key, escape_value(value)))
            .collect();
        format!("drawtext={}", options.join(":"))
    }

    pub fn filter_graph(&self, draws: &[DrawCall]) -> String {
        draws
            .iter()
            .map(|draw| self.drawtext(draw))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn args_with_filter(
        &self,
        recording: &Path,
        output: &Path,
        filter: Option<(&str, OsString)>,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
            "-y".into(),
            "-i".into(),
            recording.into(),
        ];
        if let Some((flag, value)) = filter {
            args.push(flag.into());
            args.push(value);
        }
        args.push(output.into());
        args
    }

    /// Arguments for a run that reads the filter graph from `filter_script`.
    pub fn args(
        &self,
        recording: &Path,
        output: &Path,
        filter_script: Option<&Path>,
    ) -> Vec<OsString> {
        let filter: Option<(&str, OsString)> =
            filter_script.map(|path| ("-filter_script:v", path.into()));
        self.args_with_filter(recording, output, filter)
    }

    /// Printable command with the graph inlined through `-vf`.
    pub fn command_line(&self, recording: &Path, output: &Path, draws: &[DrawCall]) -> String {
        let filter: Option<(&str, OsString)> =
            (!draws.is_empty()).then(|| ("-vf", self.filter_graph(draws).into()));

        let mut line = shell_quote(&self.program);
        for arg in self.args_with_filter(recording, output, filter) {
            line.push(' ');
            line.push_str(&shell_quote(&arg.to_string_lossy()));
        }
        line
    }

    // The graph repeats all text typed so far per keypress, so it quickly
    // outgrows the per-argument limit and goes through a file instead.
    fn write_filter_script(&self, draws: &[DrawCall]) -> Result<NamedTempFile> {
        let graph = self.filter_graph(draws);
        let mut script = tempfile::Builder::new()
            .prefix("steno-")
            .suffix(".filter")
            .tempfile()?;
        script.write_all(graph.as_bytes())?;
        script.flush()?;
        debug!(
            path = %script.path().display(),
            bytes = graph.len(),
            "wrote filter script"
        );
        Ok(script)
    }

    /// Runs the compositor to completion. Clearing `running` kills it and
    /// removes the partially written output.
    pub fn render(
        &self,
        recording: &Path,
        output: &Path,
        draws: &[DrawCall],
        running: &AtomicBool,
    ) -> Result<()> {
        // Kept alive until the compositor exits
        let script = if draws.is_empty() {
            None
        } else {
            Some(self.write_filter_script(draws)?)
        };
        let args = self.args(recording, output, script.as_ref().map(|s| s.path()));
        debug!(program = %self.program, args = args.len(), "starting compositor");

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: self.program.clone(),
                source,
            })?;

        // Drain stderr so a chatty compositor never blocks on a full pipe
        let stderr = child.stderr.take();
        let stderr_task = thread::spawn(move || -> String {
            let mut output = String::new();
            if let Some(mut stderr) = stderr {
                if let Err(err) = stderr.read_to_string(&mut output) {
                    output.push_str(&format!("<failed to read stderr: {err}>"));
                }
            }
            output
        });

        let status = loop {
            if !running.load(Ordering::SeqCst) {
                warn!("interrupted, stopping {}", self.program);
                let _ = child.kill();
                let _ = child.wait();
                let _ = stderr_task.join();
                if let Err(err) = std::fs::remove_file(output) {
                    debug!(error = %err, path = %output.display(), "no partial output removed");
                }
                return Err(Error::Interrupted);
            }

            if let Some(status) = child.try_wait()? {
                break status;
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stderr_output = stderr_task
            .join()
            .unwrap_or_else(|_| "<failed to join stderr reader>".to_string());

        if !status.success() {
            return Err(Error::Compositor {
                program: self.program.clone(),
                status,
                stderr: stderr_output.trim().to_string(),
            });
        }

        info!(
            output = %output.display(),
            overlays = draws.len(),
            "burned keypress overlays into recording"
        );
        Ok(())
    }
}
