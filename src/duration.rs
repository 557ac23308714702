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

//! Short duration parser
//!
//! Accepts the same strings as VHS `Sleep` arguments:
//! - one or more `<decimal><unit>` pairs, e.g. `500ms`, `2s`, `1m30s`, `1.5s`
//! - units `ns`, `us` (`µs`), `ms`, `s`, `m`, `h`
//! - a bare `0`

use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, digit0},
    combinator::{all_consuming, opt},
    multi::many1,
    sequence::preceded,
};
use std::time::Duration;

use crate::error::{Error, Result};

// Digits past this are below nanosecond resolution for every unit
const MAX_FRACTION_DIGITS: usize = 18;

struct Component<'a> {
    whole: &'a str,
    fraction: &'a str,
    unit: &'a str,
}

fn parse_fraction(input: &str) -> IResult<&str, &str> {
    preceded(char('.'), digit0).parse(input)
}

fn parse_unit(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphabetic())(input)
}

fn parse_component(input: &str) -> IResult<&str, Component<'_>> {
    let (input, whole) = digit0(input)?;
    let (input, fraction) = opt(parse_fraction).parse(input)?;
    let (input, unit) = parse_unit(input)?;
    Ok((
        input,
        Component {
            whole,
            fraction: fraction.unwrap_or(""),
            unit,
        },
    ))
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 60 * 60 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

fn component_nanos(component: &Component) -> Option<u128> {
    if component.whole.is_empty() && component.fraction.is_empty() {
        return None;
    }
    let unit = unit_nanos(component.unit)?;

    let whole: u128 = if component.whole.is_empty() {
        0
    } else {
        component.whole.parse().ok()?
    };
    let mut nanos = whole.checked_mul(unit)?;

    if !component.fraction.is_empty() {
        let digits = &component.fraction[..component.fraction.len().min(MAX_FRACTION_DIGITS)];
        let scale = 10u128.pow(digits.len() as u32);
        let fraction: u128 = digits.parse().ok()?;
        nanos = nanos.checked_add(fraction.checked_mul(unit)? / scale)?;
    }

    Some(nanos)
}

pub fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || Error::InvalidDuration(input.to_string());

    let text = input.trim();
    let text = text.strip_prefix('+').unwrap_or(text);
    if text == "0" {
        return Ok(Duration::ZERO);
    }

    let (_, components) = all_consuming(many1(parse_component))
        .parse(text)
        .map_err(|_| invalid())?;

    let mut total: u128 = 0;
    for component in &components {
        let nanos = component_nanos(component).ok_or_else(invalid)?;
        total = total.checked_add(nanos).ok_or_else(invalid)?;
    }

    let total = u64::try_from(total).map_err(|_| invalid())?;
    Ok(Duration::from_nanos(total))
}
