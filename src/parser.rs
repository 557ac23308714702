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

//! Tape parser for VHS scripts
//!
//! Parses one command per line:
//! - # comments
//! - `Type[@speed] "text"...`
//! - `Sleep <duration>`
//! - `<Key>[@speed] [count]`, `Ctrl+<keys>`, `Alt+<keys>`, `Shift+<keys>`
//! - settings and other directives (`Set`, `Output`, `Hide`, ...)
//!
//! Unrecognised keywords are kept as `CommandKind::Unknown` so tapes written
//! for newer VHS releases still parse.

use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{take_till1, take_until},
    character::complete::{alpha1, char, digit1, space1},
    combinator::opt,
    multi::separated_list1,
    sequence::{delimited, preceded},
};
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};
use crate::types::{Command, CommandKind, Tape};

fn parse_token(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c.is_whitespace())(input)
}

fn parse_speed(input: &str) -> IResult<&str, Option<&str>> {
    opt(preceded(char('@'), take_till1(|c: char| c.is_whitespace()))).parse(input)
}

fn parse_string(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), take_until("\""), char('"')),
        delimited(char('\''), take_until("'"), char('\'')),
        delimited(char('`'), take_until("`"), char('`')),
    ))
    .parse(input)
}

fn parse_type(input: &str) -> IResult<&str, Command> {
    let (input, speed) = parse_speed(input)?;
    let (input, _) = space1(input)?;
    let (input, strings) = separated_list1(space1, parse_string).parse(input)?;

    let command = Command::new(CommandKind::Type, strings.join(" "));
    Ok((input, command.with_options(speed.unwrap_or(""))))
}

fn parse_count(input: &str) -> IResult<&str, &str> {
    preceded(space1, digit1).parse(input)
}

fn parse_key(kind: CommandKind, input: &str) -> IResult<&str, Command> {
    let (input, speed) = parse_speed(input)?;
    let (input, count) = opt(parse_count).parse(input)?;

    let command = Command::new(kind, count.unwrap_or("1"));
    Ok((input, command.with_options(speed.unwrap_or(""))))
}

// `Ctrl+Alt+C` keeps `Alt+C`
fn parse_chord(kind: CommandKind, input: &str) -> IResult<&str, Command> {
    let (input, chord) = preceded(char('+'), parse_token).parse(input)?;
    Ok((input, Command::new(kind, chord)))
}

fn parse_sleep(input: &str) -> IResult<&str, Command> {
    let (input, duration) = preceded(space1, parse_token).parse(input)?;

    // A bare number is a count of seconds
    let args = if duration.ends_with(|c: char| c.is_ascii_digit()) {
        format!("{duration}s")
    } else {
        duration.to_string()
    };
    Ok((input, Command::new(CommandKind::Sleep, args)))
}

fn parse_rest(kind: CommandKind, input: &str) -> IResult<&str, Command> {
    Ok(("", Command::new(kind, input.trim())))
}

fn parse_set(input: &str) -> IResult<&str, Command> {
    let (input, setting) = preceded(space1, alpha1).parse(input)?;
    let value = input.trim();
    let command = Command::new(CommandKind::Set, value).with_options(setting);
    Ok(("", command))
}

fn parse_command(input: &str) -> std::result::Result<Command, String> {
    let (rest, keyword) = alpha1::<_, nom::error::Error<&str>>(input)
        .map_err(|_| format!("Expected a command, found '{}'", input))?;
    let kind = CommandKind::from_keyword(keyword).unwrap_or_else(|| {
        warn!(keyword, "ignoring unknown command");
        CommandKind::Unknown
    });

    let parsed = match kind {
        CommandKind::Type => parse_type(rest),
        CommandKind::Sleep => parse_sleep(rest),
        CommandKind::Set => parse_set(rest),
        CommandKind::Ctrl | CommandKind::Alt | CommandKind::Shift => parse_chord(kind, rest),
        kind if kind.is_repeatable() => parse_key(kind, rest),
        kind => parse_rest(kind, rest),
    };

    match parsed {
        Ok((remaining, command)) => {
            if !remaining.trim().is_empty() {
                return Err(format!(
                    "Unexpected text after command: '{}'",
                    remaining.trim()
                ));
            }
            Ok(command)
        }
        Err(e) => Err(format!("Invalid {} command: {}", keyword, e)),
    }
}

pub fn parse_tape(input: &str) -> Result<Tape> {
    let mut commands = Vec::new();

    for (line_num, line) in input.lines().enumerate() {
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let command =
            parse_command(trimmed).map_err(|message| Error::parse(line_num + 1, message))?;
        commands.push(command);
    }

    Ok(Tape { commands })
}

pub fn read_tape(path: &Path) -> Result<Tape> {
    let input = std::fs::read_to_string(path).map_err(|source| Error::ReadTape {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tape(&input)
}
