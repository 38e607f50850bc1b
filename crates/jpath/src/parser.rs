//! A `nom`-based parser for dot-delimited paths such as `site.name` or `photos.0.url`.
use super::ast::{Path, PathSegment};
use crate::error::JPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::is_not,
    character::complete::{char, u64 as nom_u64},
    combinator::map,
    multi::many0,
    sequence::{delimited, pair, preceded},
};

// --- Main Public Parser ---

pub fn parse_path(input: &str) -> Result<Path, JPathError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Path::default());
    }
    match full_path(trimmed) {
        Ok(("", path)) => Ok(path),
        Ok((rem, _)) => Err(JPathError::Parse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(JPathError::Parse(input.to_string(), e.to_string())),
    }
}

// --- Combinators ---

fn key_text(input: &str) -> IResult<&str, &str> {
    is_not(".[]").parse(input)
}

fn key_segment(input: &str) -> IResult<&str, PathSegment> {
    map(key_text, |s: &str| PathSegment::Key(s.to_string())).parse(input)
}

fn dotted_segment(input: &str) -> IResult<&str, PathSegment> {
    preceded(char('.'), key_segment).parse(input)
}

fn index_segment(input: &str) -> IResult<&str, PathSegment> {
    map(delimited(char('['), nom_u64, char(']')), |i| {
        PathSegment::Index(i as usize)
    })
    .parse(input)
}

fn full_path(input: &str) -> IResult<&str, Path> {
    map(
        pair(
            alt((index_segment, key_segment)),
            many0(alt((dotted_segment, index_segment))),
        ),
        |(first, mut rest)| {
            let mut segments = vec![first];
            segments.append(&mut rest);
            Path(segments)
        },
    )
    .parse(input)
}
