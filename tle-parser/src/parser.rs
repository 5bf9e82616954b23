//! A fixed-column parser for NORAD two and three-line element sets

use crate::{checksum::checksum, fields, LINE_LENGTH, NAME_LINE_PREFIX};
use nom::{
    bytes::complete::take,
    character::complete::char,
    error::{ErrorKind, FromExternalError},
    Err::Failure,
};
use orbit_types::prelude::*;
use tracing::debug;

pub type Result<I, O, E = ParseError<I>> = std::result::Result<(I, O), nom::Err<E>>;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseError<I> {
    #[error("Expected line number '{0}' in column 1")]
    LineNumber(char),
    #[error("Line is {0} columns long")]
    LineLength(usize),
    #[error("Checksum mismatch, line says {written}, computed {computed}")]
    Checksum { written: u8, computed: u8 },
    #[error("Unparsable field '{0}'")]
    Field(&'static str),
    #[error("Parse error")]
    Nom(I, ErrorKind),
}

/// The reason a block was rejected
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailureKind {
    #[error("Truncated element set")]
    Truncated,
    #[error("Line {line} does not start with its line number")]
    BadLineIdentifier { line: u8 },
    #[error("Line {line} checksum is {written}, expected {computed}")]
    ChecksumMismatch { line: u8, written: u8, computed: u8 },
    #[error("Unparsable field '{field}'")]
    UnparsableField { field: &'static str },
}

/// A rejected block, identified by the 1-based input line it starts on
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Element set at line {line} ({}): {kind}", .name.as_deref().unwrap_or("unnamed"))]
pub struct ParseFailure {
    pub line: usize,
    pub name: Option<String>,
    pub kind: ParseFailureKind,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseOutput {
    pub objects: Vec<TrackedObject>,
    pub failures: Vec<ParseFailure>,
}

/// Parse a catalog of element sets.
///
/// Blocks are a name line followed by line 1 and line 2, or a bare line 1 and
/// line 2 pair. Blank lines between blocks are ignored. A malformed block is
/// recorded as a failure and never affects its neighbours: a block missing a
/// data line ends at the first line that does not continue it.
pub fn parse(text: &str) -> ParseOutput {
    let lines: Vec<(usize, &str)> = text
        .lines()
        .enumerate()
        .map(|(idx, l)| (idx + 1, l.trim_end()))
        .filter(|(_, l)| !l.is_empty())
        .collect();

    let mut out = ParseOutput::default();
    let mut rest = lines.as_slice();
    while let Some(&(start, first)) = rest.first() {
        let (name, data) = if is_data_line(first) {
            (None, rest)
        } else {
            (Some(object_name(first)), &rest[1..])
        };

        let (result, consumed) = match next_block(data) {
            Block::Complete(line1, line2) => (parse_element_set(line1, line2), 2),
            Block::Rejected { kind, consumed } => (Err(kind), consumed),
        };
        rest = &data[consumed..];

        match result {
            Ok(elements) => out.objects.push(TrackedObject::new(name, elements)),
            Err(kind) => {
                debug!(line = start, name = ?name, %kind, "Rejected element set");
                out.failures.push(ParseFailure {
                    line: start,
                    name,
                    kind,
                });
            }
        }
    }

    debug!(
        objects = out.objects.len(),
        failures = out.failures.len(),
        "Parsed element sets"
    );
    out
}

/// Parse and validate one line 1 and line 2 pair
pub fn parse_element_set(
    line1: &str,
    line2: &str,
) -> std::result::Result<ElementSet, ParseFailureKind> {
    let (_, l1) = first_line(line1).map_err(|e| failure_kind(1, e))?;
    let (_, l2) = second_line(line2).map_err(|e| failure_kind(2, e))?;

    if l1.catalog_id != l2.catalog_id {
        return Err(ParseFailureKind::UnparsableField {
            field: "catalog number",
        });
    }

    let raw = RawElements {
        catalog_id: l1.catalog_id,
        classification: l1.classification,
        international_designator: l1.international_designator,
        epoch: l1.epoch,
        mean_motion_dot: l1.mean_motion_dot,
        mean_motion_ddot: l1.mean_motion_ddot,
        bstar: l1.bstar,
        ephemeris_type: l1.ephemeris_type,
        element_set_number: l1.element_set_number,
        inclination: l2.inclination,
        right_ascension: l2.right_ascension,
        eccentricity: l2.eccentricity,
        argument_of_perigee: l2.argument_of_perigee,
        mean_anomaly: l2.mean_anomaly,
        mean_motion: l2.mean_motion,
        revolution_number: l2.revolution_number,
        line1_checksum: l1.checksum,
        line2_checksum: l2.checksum,
    };
    ElementSet::try_from(raw).map_err(|e| ParseFailureKind::UnparsableField { field: e.field() })
}

fn failure_kind(line: u8, e: nom::Err<ParseError<&str>>) -> ParseFailureKind {
    match e {
        nom::Err::Error(e) | nom::Err::Failure(e) => match e {
            ParseError::LineNumber(_) => ParseFailureKind::BadLineIdentifier { line },
            ParseError::Checksum { written, computed } => ParseFailureKind::ChecksumMismatch {
                line,
                written,
                computed,
            },
            ParseError::LineLength(_) => ParseFailureKind::UnparsableField {
                field: "line length",
            },
            ParseError::Field(field) => ParseFailureKind::UnparsableField { field },
            ParseError::Nom(_, _) => ParseFailureKind::UnparsableField { field: "line" },
        },
        nom::Err::Incomplete(_) => ParseFailureKind::UnparsableField { field: "line" },
    }
}

/// The data lines of one block, found by their line number prefix only so
/// that a malformed data line is never mistaken for a name
enum Block<'a> {
    Complete(&'a str, &'a str),
    /// `consumed` data lines belong to the rejected block
    Rejected {
        kind: ParseFailureKind,
        consumed: usize,
    },
}

fn next_block<'a>(data: &[(usize, &'a str)]) -> Block<'a> {
    match data {
        [(_, l1), (_, l2), ..] if is_line(l1, '1') && is_line(l2, '2') => Block::Complete(*l1, *l2),
        // A swapped pair of the same object is a single failure
        [(_, l2), (_, l1), ..]
            if is_line(l2, '2') && is_line(l1, '1') && l2.get(2..7) == l1.get(2..7) =>
        {
            Block::Rejected {
                kind: ParseFailureKind::BadLineIdentifier { line: 1 },
                consumed: 2,
            }
        }
        [(_, l2), ..] if is_line(l2, '2') => Block::Rejected {
            kind: ParseFailureKind::BadLineIdentifier { line: 1 },
            consumed: 1,
        },
        // Line 2 is missing, the next line starts another block
        [(_, l1), ..] if is_line(l1, '1') => Block::Rejected {
            kind: ParseFailureKind::Truncated,
            consumed: 1,
        },
        _ => Block::Rejected {
            kind: ParseFailureKind::Truncated,
            consumed: 0,
        },
    }
}

fn is_line(line: &str, number: char) -> bool {
    let mut columns = line.chars();
    columns.next() == Some(number) && columns.next() == Some(' ')
}

fn is_data_line(line: &str) -> bool {
    is_line(line, '1') || is_line(line, '2')
}

fn object_name(line: &str) -> String {
    line.strip_prefix(NAME_LINE_PREFIX)
        .unwrap_or(line)
        .trim()
        .to_owned()
}

#[derive(Clone, Debug, PartialEq)]
struct FirstLine {
    catalog_id: CatalogId,
    classification: Classification,
    international_designator: String,
    epoch: UtcTimestamp,
    mean_motion_dot: f64,
    mean_motion_ddot: f64,
    bstar: f64,
    ephemeris_type: u8,
    element_set_number: u16,
    checksum: u8,
}

#[derive(Clone, Debug, PartialEq)]
struct SecondLine {
    catalog_id: CatalogId,
    inclination: f64,
    right_ascension: f64,
    eccentricity: f64,
    argument_of_perigee: f64,
    mean_anomaly: f64,
    mean_motion: f64,
    revolution_number: u32,
    checksum: u8,
}

/// ```text
/// 1 NNNNNC NNNNNAAA NNNNN.NNNNNNNN +.NNNNNNNN +NNNNN-N +NNNNN-N N NNNNN
/// ```
fn first_line(s: &str) -> Result<&str, FirstLine> {
    let s = framed_line(s, '1')?;
    let (s, _) = line_number(s, '1')?;
    let (s, _) = blank(s)?;
    let (s, catalog_id) = field("catalog number", 5, fields::catalog_number)(s)?;
    let (s, classification) = field("classification", 1, fields::classification)(s)?;
    let (s, _) = blank(s)?;
    let (s, international_designator) =
        field("international designator", 8, fields::international_designator)(s)?;
    let (s, _) = blank(s)?;
    let (s, epoch) = field("epoch", 14, fields::epoch)(s)?;
    let (s, _) = blank(s)?;
    let (s, mean_motion_dot) = field("mean motion dot", 10, fields::decimal)(s)?;
    let (s, _) = blank(s)?;
    let (s, mean_motion_ddot) =
        field("mean motion ddot", 8, fields::implied_decimal_exponent)(s)?;
    let (s, _) = blank(s)?;
    let (s, bstar) = field("bstar", 8, fields::implied_decimal_exponent)(s)?;
    let (s, _) = blank(s)?;
    let (s, ephemeris_type) = field("ephemeris type", 1, fields::unsigned::<u8>)(s)?;
    let (s, _) = blank(s)?;
    let (s, element_set_number) =
        field("element set number", 4, fields::unsigned::<u16>)(s)?;
    let (s, checksum) = field("checksum", 1, fields::checksum_digit)(s)?;
    Ok((
        s,
        FirstLine {
            catalog_id,
            classification,
            international_designator,
            epoch,
            mean_motion_dot,
            mean_motion_ddot,
            bstar,
            ephemeris_type,
            element_set_number,
            checksum,
        },
    ))
}

/// ```text
/// 2 NNNNN NNN.NNNN NNN.NNNN NNNNNNN NNN.NNNN NNN.NNNN NN.NNNNNNNNNNNNNN
/// ```
fn second_line(s: &str) -> Result<&str, SecondLine> {
    let s = framed_line(s, '2')?;
    let (s, _) = line_number(s, '2')?;
    let (s, _) = blank(s)?;
    let (s, catalog_id) = field("catalog number", 5, fields::catalog_number)(s)?;
    let (s, _) = blank(s)?;
    let (s, inclination) = field("inclination", 8, fields::decimal)(s)?;
    let (s, _) = blank(s)?;
    let (s, right_ascension) = field("right ascension", 8, fields::decimal)(s)?;
    let (s, _) = blank(s)?;
    let (s, eccentricity) = field("eccentricity", 7, fields::implied_decimal)(s)?;
    let (s, _) = blank(s)?;
    let (s, argument_of_perigee) = field("argument of perigee", 8, fields::decimal)(s)?;
    let (s, _) = blank(s)?;
    let (s, mean_anomaly) = field("mean anomaly", 8, fields::decimal)(s)?;
    let (s, _) = blank(s)?;
    let (s, mean_motion) = field("mean motion", 11, fields::decimal)(s)?;
    let (s, revolution_number) = field("revolution number", 5, fields::unsigned::<u32>)(s)?;
    let (s, checksum) = field("checksum", 1, fields::checksum_digit)(s)?;
    Ok((
        s,
        SecondLine {
            catalog_id,
            inclination,
            right_ascension,
            eccentricity,
            argument_of_perigee,
            mean_anomaly,
            mean_motion,
            revolution_number,
            checksum,
        },
    ))
}

/// Line number, length and checksum, checked in that order before any field
fn framed_line(s: &str, number: char) -> std::result::Result<&str, nom::Err<ParseError<&str>>> {
    line_number(s, number)?;
    if s.len() != LINE_LENGTH || !s.is_ascii() {
        return Err(Failure(ParseError::LineLength(s.chars().count())));
    }
    let (_, written) = field("checksum", 1, fields::checksum_digit)(&s[LINE_LENGTH - 1..])?;
    let computed = checksum(s);
    if written != computed {
        return Err(Failure(ParseError::Checksum { written, computed }));
    }
    Ok(s)
}

fn line_number(s: &str, number: char) -> Result<&str, char> {
    char(number)(s).map_err(|_: nom::Err<ParseError<&str>>| Failure(ParseError::LineNumber(number)))
}

/// Separator columns are always blank
fn blank(s: &str) -> Result<&str, char> {
    char(' ')(s).map_err(|_: nom::Err<ParseError<&str>>| Failure(ParseError::Field("separator")))
}

/// Take exactly `width` columns and decode all of them
fn field<'a, O>(
    name: &'static str,
    width: usize,
    decode: fn(&'a str) -> Result<&'a str, O>,
) -> impl FnMut(&'a str) -> Result<&'a str, O> {
    move |s: &'a str| {
        let (s, columns) = take(width)(s)?;
        match decode(columns) {
            Ok(("", value)) => Ok((s, value)),
            _ => Err(Failure(ParseError::Field(name))),
        }
    }
}

impl<I> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(s: I, kind: ErrorKind) -> Self {
        ParseError::Nom(s, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}

impl<I, E> FromExternalError<I, E> for ParseError<I> {
    fn from_external_error(s: I, kind: ErrorKind, _: E) -> Self {
        ParseError::Nom(s, kind)
    }
}
