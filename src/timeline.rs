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

//! Keypress timeline for a parsed tape
//!
//! Replays the commands against a single time cursor to estimate when VHS
//! pressed each key. The timing rules are an empirical approximation of the
//! recorder, not a model of it:
//! - literal keys are pressed at the cursor and do not move it, except Space,
//!   which advances it by the typing speed
//! - typed text advances the cursor between characters but not after the last
//! - Sleep advances the cursor by its duration

use tracing::{debug, info, warn};

use crate::duration::parse_duration;
use crate::error::Result;
use crate::glyph::glyph;
use crate::types::{Command, CommandKind, GlyphStyle, KeypressEvent, TimingConfig};

pub struct TimelineBuilder {
    config: TimingConfig,
    style: GlyphStyle,
}

impl TimelineBuilder {
    pub fn new(config: TimingConfig, style: GlyphStyle) -> Self {
        Self { config, style }
    }

    /// Builds the keypress events for `commands`. Fails without a partial
    /// timeline if any Sleep duration is malformed.
    pub fn build(&self, commands: &[Command]) -> Result<Vec<KeypressEvent>> {
        let speed = self.config.typing_speed_ms;
        let mut events = Vec::with_capacity(commands.len());
        // Milliseconds since the start of the recording
        let mut t: u64 = 0;

        for command in commands {
            match command.kind {
                CommandKind::Type => {
                    if !command.options.is_empty() {
                        warn!(
                            options = %command.options,
                            "per-command typing speed is not supported, using {speed}ms"
                        );
                    }
                    let mut chars = command.args.chars().peekable();
                    while let Some(c) = chars.next() {
                        events.push(KeypressEvent::new(c.to_string(), t));
                        // No delay after the last character
                        if chars.peek().is_some() {
                            t = t.saturating_add(speed);
                        }
                    }
                }
                CommandKind::Sleep => {
                    let duration = parse_duration(&command.args)?;
                    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
                    t = t.saturating_add(millis);
                }
                kind => {
                    let Some(display) = glyph(kind, self.style) else {
                        debug!(?kind, "skipping command without a keypress");
                        continue;
                    };
                    events.push(KeypressEvent::new(display, t));
                    if kind == CommandKind::Space {
                        t = t.saturating_add(speed);
                    }
                }
            }
        }

        info!(
            commands = commands.len(),
            events = events.len(),
            end_ms = t,
            "built keypress timeline"
        );
        Ok(events)
    }
}

impl Default for TimelineBuilder {
    fn default() -> Self {
        Self::new(TimingConfig::default(), GlyphStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::parse_tape;

    fn key(kind: CommandKind) -> Command {
        Command::new(kind, "1")
    }

    fn type_text(text: &str) -> Command {
        Command::new(CommandKind::Type, text)
    }

    fn sleep(duration: &str) -> Command {
        Command::new(CommandKind::Sleep, duration)
    }

    fn times(events: &[KeypressEvent]) -> Vec<u64> {
        events.iter().map(|e| e.when_ms).collect()
    }

    #[test]
    fn test_empty_commands() {
        let events = TimelineBuilder::default().build(&[]).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_literal_keys_do_not_advance() {
        let commands: Vec<Command> = [
            CommandKind::Backspace,
            CommandKind::Delete,
            CommandKind::Ctrl,
            CommandKind::Alt,
            CommandKind::Down,
            CommandKind::PageDown,
            CommandKind::Up,
            CommandKind::PageUp,
            CommandKind::Left,
            CommandKind::Right,
            CommandKind::Enter,
            CommandKind::Escape,
            CommandKind::Tab,
            CommandKind::Paste,
        ]
        .into_iter()
        .map(key)
        .collect();

        let events = TimelineBuilder::default().build(&commands).unwrap();
        assert_eq!(events.len(), commands.len());
        assert!(events.iter().all(|e| e.when_ms == 0));
    }

    #[test]
    fn test_type_spacing() {
        let events = TimelineBuilder::default()
            .build(&[type_text("hello")])
            .unwrap();
        let display: String = events.iter().map(|e| e.display.as_str()).collect();
        assert_eq!(display, "hello");
        assert_eq!(times(&events), vec![0, 50, 100, 150, 200]);
    }

    #[test]
    fn test_type_has_no_trailing_delay() {
        let events = TimelineBuilder::default()
            .build(&[type_text("ab"), key(CommandKind::Enter)])
            .unwrap();
        assert_eq!(times(&events), vec![0, 50, 50]);
    }

    #[test]
    fn test_empty_type_does_not_move_cursor() {
        let events = TimelineBuilder::default()
            .build(&[type_text(""), key(CommandKind::Enter)])
            .unwrap();
        assert_eq!(events, vec![KeypressEvent::new("↵", 0)]);
    }

    #[test]
    fn test_type_renders_characters_regardless_of_style() {
        let builder = TimelineBuilder::new(TimingConfig::default(), GlyphStyle::Tokens);
        let events = builder.build(&[type_text("é ü")]).unwrap();
        let display: Vec<&str> = events.iter().map(|e| e.display.as_str()).collect();
        assert_eq!(display, vec!["é", " ", "ü"]);
    }

    #[test]
    fn test_custom_typing_speed() {
        let builder = TimelineBuilder::new(
            TimingConfig {
                typing_speed_ms: 120,
            },
            GlyphStyle::Symbols,
        );
        let events = builder
            .build(&[type_text("abc"), key(CommandKind::Space), key(CommandKind::Tab)])
            .unwrap();
        assert_eq!(times(&events), vec![0, 120, 240, 240, 360]);
    }

    #[test]
    fn test_sleep_then_key() {
        let events = TimelineBuilder::default()
            .build(&[sleep("1s"), key(CommandKind::Enter)])
            .unwrap();
        assert_eq!(events, vec![KeypressEvent::new("↵", 1000)]);
    }

    #[test]
    fn test_sleep_from_non_zero_cursor() {
        let events = TimelineBuilder::default()
            .build(&[
                key(CommandKind::Space),
                sleep("250ms"),
                key(CommandKind::Escape),
            ])
            .unwrap();
        assert_eq!(times(&events), vec![0, 300]);
    }

    #[test]
    fn test_sleep_truncates_to_milliseconds() {
        let events = TimelineBuilder::default()
            .build(&[sleep("1500us"), key(CommandKind::Up)])
            .unwrap();
        assert_eq!(times(&events), vec![1]);
    }

    #[test]
    fn test_invalid_sleep_aborts() {
        let result = TimelineBuilder::default().build(&[
            type_text("abc"),
            sleep("forever"),
            key(CommandKind::Enter),
        ]);
        assert!(matches!(result, Err(Error::InvalidDuration(ref d)) if d == "forever"));
    }

    #[test]
    fn test_other_commands_are_ignored() {
        let commands = vec![
            Command::new(CommandKind::Set, "FontSize 32").with_options("FontSize"),
            Command::new(CommandKind::Output, "demo.gif"),
            Command::new(CommandKind::Hide, ""),
            key(CommandKind::Enter),
            Command::new(CommandKind::Show, ""),
            Command::new(CommandKind::Wait, "/\\$/"),
        ];
        let events = TimelineBuilder::default().build(&commands).unwrap();
        assert_eq!(events, vec![KeypressEvent::new("↵", 0)]);
    }

    #[test]
    fn test_type_speed_override_is_ignored() {
        let commands = vec![type_text("ab").with_options("500ms")];
        let events = TimelineBuilder::default().build(&commands).unwrap();
        assert_eq!(times(&events), vec![0, 50]);
    }

    #[test]
    fn test_spaces_then_type_then_enter() {
        let events = TimelineBuilder::default()
            .build(&[
                key(CommandKind::Space),
                key(CommandKind::Space),
                type_text("ab"),
                key(CommandKind::Enter),
            ])
            .unwrap();
        assert_eq!(
            events,
            vec![
                KeypressEvent::new("⎵", 0),
                KeypressEvent::new("⎵", 50),
                KeypressEvent::new("a", 100),
                KeypressEvent::new("b", 150),
                KeypressEvent::new("↵", 150),
            ]
        );
    }

    #[test]
    fn test_timestamps_never_decrease() {
        let commands = vec![
            type_text("ls -la"),
            key(CommandKind::Enter),
            sleep("2s"),
            key(CommandKind::Space),
            type_text("x"),
            key(CommandKind::Backspace),
            sleep("100ms"),
            type_text("exit"),
        ];
        let events = TimelineBuilder::default().build(&commands).unwrap();
        assert!(events.windows(2).all(|w| w[0].when_ms <= w[1].when_ms));
    }

    const EVERY_SYMBOL_TAPE: &str = r#"
Backspace
Delete
Ctrl+C
Ctrl+D
Alt+Enter
Down
Up
Right
Left
PageDown
PageUp
Space
Tab
Escape
Enter
Paste
Type "a"
Type "bc"
"#;

    #[test]
    fn test_every_symbol_tape_with_tokens() {
        let tape = parse_tape(EVERY_SYMBOL_TAPE).unwrap();
        let builder = TimelineBuilder::new(TimingConfig::default(), GlyphStyle::Tokens);
        let events = builder.build(&tape.commands).unwrap();

        let expected = vec![
            KeypressEvent::new("<BACKSPACE>", 0),
            KeypressEvent::new("<DELETE>", 0),
            KeypressEvent::new("<CTRL>+", 0),
            KeypressEvent::new("<CTRL>+", 0),
            KeypressEvent::new("<ALT>+", 0),
            KeypressEvent::new("<DOWN>", 0),
            KeypressEvent::new("<UP>", 0),
            KeypressEvent::new("<RIGHT>", 0),
            KeypressEvent::new("<LEFT>", 0),
            KeypressEvent::new("<PAGEDOWN>", 0),
            KeypressEvent::new("<PAGEUP>", 0),
            KeypressEvent::new("<SPACE>", 0),
            KeypressEvent::new("<TAB>", 50),
            KeypressEvent::new("<ESCAPE>", 50),
            KeypressEvent::new("<ENTER>", 50),
            KeypressEvent::new("<PASTE>", 50),
            KeypressEvent::new("a", 50),
            KeypressEvent::new("b", 50),
            KeypressEvent::new("c", 100),
        ];
        assert_eq!(events, expected);
    }

    #[test]
    fn test_every_symbol_tape_with_symbols() {
        let tape = parse_tape(EVERY_SYMBOL_TAPE).unwrap();
        let events = TimelineBuilder::default().build(&tape.commands).unwrap();

        let display: Vec<&str> = events.iter().map(|e| e.display.as_str()).collect();
        assert_eq!(
            display,
            vec![
                "⌫", "␡", "C-", "C-", "⎇-", "↓", "↑", "→", "←", "⤓", "⤒", "⎵", "⇥", "⎋", "↵",
                "C-V", "a", "b", "c",
            ]
        );
        assert_eq!(events.last().map(|e| e.when_ms), Some(100));
    }
}
