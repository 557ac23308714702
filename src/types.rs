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

//! Core types shared by the timeline and overlay stages

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Backspace,
    Delete,
    Ctrl,
    Alt,
    Down,
    PageDown,
    Up,
    PageUp,
    Left,
    Right,
    Space,
    Enter,
    Escape,
    Tab,
    Paste,
    Type,
    Sleep,
    // Recognised by the parser, no keypress or timing effect
    Set,
    Output,
    Hide,
    Show,
    Require,
    Source,
    Screenshot,
    Copy,
    Env,
    Wait,
    Insert,
    Shift,
    ScrollUp,
    ScrollDown,
    // Any other keyword
    Unknown,
}

impl CommandKind {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let kind = match keyword {
            "Backspace" => Self::Backspace,
            "Delete" => Self::Delete,
            "Ctrl" => Self::Ctrl,
            "Alt" => Self::Alt,
            "Down" => Self::Down,
            "PageDown" => Self::PageDown,
            "Up" => Self::Up,
            "PageUp" => Self::PageUp,
            "Left" => Self::Left,
            "Right" => Self::Right,
            "Space" => Self::Space,
            "Enter" => Self::Enter,
            "Escape" => Self::Escape,
            "Tab" => Self::Tab,
            "Paste" => Self::Paste,
            "Type" => Self::Type,
            "Sleep" => Self::Sleep,
            "Set" => Self::Set,
            "Output" => Self::Output,
            "Hide" => Self::Hide,
            "Show" => Self::Show,
            "Require" => Self::Require,
            "Source" => Self::Source,
            "Screenshot" => Self::Screenshot,
            "Copy" => Self::Copy,
            "Env" => Self::Env,
            "Wait" => Self::Wait,
            "Insert" => Self::Insert,
            "Shift" => Self::Shift,
            "ScrollUp" => Self::ScrollUp,
            "ScrollDown" => Self::ScrollDown,
            _ => return None,
        };
        Some(kind)
    }

    /// Keys that accept `@speed` and a repeat count, shown or not.
    pub fn is_repeatable(self) -> bool {
        self.is_literal_key() || matches!(self, Self::Insert | Self::ScrollUp | Self::ScrollDown)
    }

    /// Keys that are shown as a single glyph and may carry `@speed` and a count.
    pub fn is_literal_key(self) -> bool {
        matches!(
            self,
            Self::Backspace
                | Self::Delete
                | Self::Ctrl
                | Self::Alt
                | Self::Down
                | Self::PageDown
                | Self::Up
                | Self::PageUp
                | Self::Left
                | Self::Right
                | Self::Space
                | Self::Enter
                | Self::Escape
                | Self::Tab
                | Self::Paste
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    // Modifiers such as a per-command typing speed (`Type@100ms`)
    pub options: String,
    // Text to type, sleep duration, key count, chord or setting value
    pub args: String,
}

impl Command {
    pub fn new(kind: CommandKind, args: impl Into<String>) -> Self {
        Self {
            kind,
            options: String::new(),
            args: args.into(),
        }
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = options.into();
        self
    }
}

#[derive(Debug, Default)]
pub struct Tape {
    pub commands: Vec<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeypressEvent {
    pub display: String,
    // Milliseconds since the start of the recording
    pub when_ms: u64,
}

impl KeypressEvent {
    pub fn new(display: impl Into<String>, when_ms: u64) -> Self {
        Self {
            display: display.into(),
            when_ms,
        }
    }
}

/// One overlay: the text typed so far, visible on `[start, end)` seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCall {
    pub text: String,
    pub start: f64,
    // f64::INFINITY when unbounded
    pub end: f64,
    // Visible until the end of the recording
    pub unbounded: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GlyphStyle {
    // ⌫, ↵, ⎵ ...
    #[default]
    Symbols,
    // <BACKSPACE>, <ENTER>, <SPACE> ...
    Tokens,
}

#[derive(Debug, Clone)]
pub struct TimingConfig {
    // Delay between typed characters in milliseconds
    pub typing_speed_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            typing_speed_ms: 50,
        }
    }
}

/// Presentation options forwarded verbatim to every `drawtext` filter.
#[derive(Debug, Clone)]
pub struct OverlayStyle {
    pub font_size: u32,
    pub font_color: String,
    pub font_file: Option<PathBuf>,
    // ffmpeg position expressions
    pub x: String,
    pub y: String,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            font_size: 30,
            font_color: "white".to_string(),
            font_file: None,
            x: "(w-text_w)/2".to_string(),
            y: "h-text_h-40".to_string(),
        }
    }
}
