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

//! Display glyphs for literal key commands

use crate::types::{CommandKind, GlyphStyle};

/// Returns the overlay text for a literal key, or `None` for kinds that are
/// not shown as a single key (typed text, sleeps, settings).
pub fn glyph(kind: CommandKind, style: GlyphStyle) -> Option<&'static str> {
    let (symbol, token) = match kind {
        CommandKind::Backspace => ("⌫", "<BACKSPACE>"),
        CommandKind::Delete => ("␡", "<DELETE>"),
        CommandKind::Ctrl => ("C-", "<CTRL>+"),
        CommandKind::Alt => ("⎇-", "<ALT>+"),
        CommandKind::Down => ("↓", "<DOWN>"),
        CommandKind::PageDown => ("⤓", "<PAGEDOWN>"),
        CommandKind::Up => ("↑", "<UP>"),
        CommandKind::PageUp => ("⤒", "<PAGEUP>"),
        CommandKind::Left => ("←", "<LEFT>"),
        CommandKind::Right => ("→", "<RIGHT>"),
        CommandKind::Space => ("⎵", "<SPACE>"),
        CommandKind::Enter => ("↵", "<ENTER>"),
        CommandKind::Escape => ("⎋", "<ESCAPE>"),
        CommandKind::Tab => ("⇥", "<TAB>"),
        CommandKind::Paste => ("C-V", "<PASTE>"),
        _ => return None,
    };

    Some(match style {
        GlyphStyle::Symbols => symbol,
        GlyphStyle::Tokens => token,
    })
}
