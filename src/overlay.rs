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

//! Overlay intervals from a keypress timeline
//!
//! Every keypress produces one draw call showing everything typed so far.
//! Each call stays visible until the next keypress; the last one stays up
//! until the end of the recording.

use tracing::debug;

use crate::types::{DrawCall, KeypressEvent};

pub fn build_draw_calls(events: &[KeypressEvent]) -> Vec<DrawCall> {
    let mut draws = Vec::with_capacity(events.len());
    let mut text = String::new();

    for (i, event) in events.iter().enumerate() {
        text.push_str(&event.display);

        let start = event.when_ms as f64 / 1000.0;
        let (end, unbounded) = match events.get(i + 1) {
            Some(next) => (next.when_ms as f64 / 1000.0, false),
            None => (f64::INFINITY, true),
        };

        let draw = DrawCall {
            text: text.clone(),
            start,
            end,
            unbounded,
        };
        debug!(?draw, "draw call");
        draws.push(draw);
    }

    draws
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::TimelineBuilder;
    use crate::types::{Command, CommandKind};

    fn event(display: &str, when_ms: u64) -> KeypressEvent {
        KeypressEvent::new(display, when_ms)
    }

    #[test]
    fn test_empty_timeline() {
        assert!(build_draw_calls(&[]).is_empty());
    }

    #[test]
    fn test_single_event_is_unbounded() {
        let draws = build_draw_calls(&[event("a", 1200)]);
        assert_eq!(draws.len(), 1);
        assert_eq!(draws[0].text, "a");
        assert_eq!(draws[0].start, 1.2);
        assert!(draws[0].unbounded);
        assert!(draws[0].end.is_infinite());
    }

    #[test]
    fn test_accumulates_text() {
        let events = vec![
            event("⎵", 0),
            event("⎵", 50),
            event("a", 100),
            event("b", 150),
            event("↵", 150),
        ];
        let draws = build_draw_calls(&events);

        let texts: Vec<&str> = draws.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["⎵", "⎵⎵", "⎵⎵a", "⎵⎵ab", "⎵⎵ab↵"]);

        let starts: Vec<f64> = draws.iter().map(|d| d.start).collect();
        assert_eq!(starts, vec![0.0, 0.05, 0.1, 0.15, 0.15]);

        let ends: Vec<f64> = draws[..4].iter().map(|d| d.end).collect();
        assert_eq!(ends, vec![0.05, 0.1, 0.15, 0.15]);
    }

    #[test]
    fn test_intervals_tile_the_timeline() {
        let events = vec![
            event("l", 0),
            event("s", 50),
            event("↵", 50),
            event("c", 2050),
            event("d", 2100),
        ];
        let draws = build_draw_calls(&events);
        assert_eq!(draws.len(), events.len());

        for pair in draws.windows(2) {
            assert!(!pair[0].unbounded);
            assert_eq!(pair[0].end, pair[1].start);
        }
        let unbounded: Vec<bool> = draws.iter().map(|d| d.unbounded).collect();
        assert_eq!(unbounded, vec![false, false, false, false, true]);
    }

    #[test]
    fn test_text_only_grows() {
        let events = vec![event("<CTRL>+", 0), event("x", 10), event("<ENTER>", 20)];
        let draws = build_draw_calls(&events);
        for (pair, next_event) in draws.windows(2).zip(&events[1..]) {
            assert_eq!(pair[1].text, format!("{}{}", pair[0].text, next_event.display));
        }
    }

    #[test]
    fn test_commands_to_draw_calls() {
        let commands = vec![
            Command::new(CommandKind::Space, "1"),
            Command::new(CommandKind::Space, "1"),
            Command::new(CommandKind::Type, "ab"),
            Command::new(CommandKind::Enter, "1"),
        ];
        let events = TimelineBuilder::default().build(&commands).unwrap();
        let draws = build_draw_calls(&events);

        let texts: Vec<&str> = draws.iter().map(|d| d.text.as_str()).collect();
        assert_eq!(texts, vec!["⎵", "⎵⎵", "⎵⎵a", "⎵⎵ab", "⎵⎵ab↵"]);

        let starts: Vec<f64> = draws.iter().map(|d| d.start).collect();
        assert_eq!(starts, vec![0.0, 0.05, 0.1, 0.15, 0.15]);

        let unbounded: Vec<bool> = draws.iter().map(|d| d.unbounded).collect();
        assert_eq!(unbounded, vec![false, false, false, false, true]);
    }
}
