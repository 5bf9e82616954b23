//! Decoders for the TLE field micro-formats.
//!
//! Each decoder is handed exactly the columns of its field and must consume
//! all of them.

use crate::parser::{ParseError, Result};
use nom::{
    branch::alt,
    bytes::complete::take_while_m_n,
    character::complete::{anychar, digit1, one_of, space0},
    combinator::{eof, map, map_opt, map_res, opt, rest},
    error::ErrorKind,
    number::complete::recognize_float,
    sequence::delimited,
    Err::Error,
};
use orbit_types::{
    catalog::CatalogId,
    elements::Classification,
    time::{epoch_from_year_and_day, expand_two_digit_year, UtcTimestamp},
};
use std::str::FromStr;

/// Catalog number, numeric or Alpha-5
pub fn catalog_number(s: &str) -> Result<&str, CatalogId> {
    map_res(rest, CatalogId::from_str)(s)
}

pub fn classification(s: &str) -> Result<&str, Classification> {
    map_opt(anychar, Classification::from_char)(s)
}

/// Launch year, launch number and piece, possibly blank
pub fn international_designator(s: &str) -> Result<&str, String> {
    map(rest, |d: &str| d.trim().to_owned())(s)
}

/// `YYDDD.DDDDDDDD`, a two-digit year and fractional day of year
pub fn epoch(s: &str) -> Result<&str, UtcTimestamp> {
    let (s, yy) = map_res(take_while_m_n(2, 2, |c: char| c.is_ascii_digit()), |d: &str| {
        d.parse::<u32>()
    })(s)?;
    let (s, day) = decimal(s)?;
    let epoch = epoch_from_year_and_day(expand_two_digit_year(yy), day)
        .ok_or(Error(ParseError::Nom(s, ErrorKind::Verify)))?;
    Ok((s, epoch))
}

/// A decimal number with an optional sign and an optional leading `.`, e.g. `-.00002182`
pub fn decimal(s: &str) -> Result<&str, f64> {
    map_res(delimited(space0, recognize_float, space0), |f: &str| {
        f.parse::<f64>()
    })(s)
}

/// A decimal with an implied leading `0.`, e.g. `0006703` is 0.0006703
pub fn implied_decimal(s: &str) -> Result<&str, f64> {
    map_res(digit1, |d: &str| format!("0.{d}").parse::<f64>())(s)
}

/// A decimal with an implied leading `0.` and a power of ten exponent,
/// e.g. `-11606-4` is -0.11606e-4. An all-blank field is zero.
pub fn implied_decimal_exponent(s: &str) -> Result<&str, f64> {
    let (s, _) = space0(s)?;
    alt((map(eof, |_| 0.0), exponent_form))(s)
}

fn exponent_form(s: &str) -> Result<&str, f64> {
    let (s, sign) = opt(one_of("+-"))(s)?;
    let (s, mantissa) = digit1(s)?;
    let (s, exp_sign) = one_of("+-")(s)?;
    let (s, exponent) = digit1(s)?;
    let (s, _) = space0(s)?;
    let magnitude = format!("0.{mantissa}e{exp_sign}{exponent}")
        .parse::<f64>()
        .map_err(|_| Error(ParseError::Nom(s, ErrorKind::Float)))?;
    let value = if sign == Some('-') {
        -magnitude
    } else {
        magnitude
    };
    Ok((s, value))
}

/// A right-aligned unsigned integer; an all-blank field is zero
pub fn unsigned<T: FromStr + Default>(s: &str) -> Result<&str, T> {
    let (s, _) = space0(s)?;
    alt((
        map(eof, |_| T::default()),
        map_res(delimited(space0, digit1, space0), |d: &str| d.parse::<T>()),
    ))(s)
}

pub fn checksum_digit(s: &str) -> Result<&str, u8> {
    map_opt(anychar, |c: char| c.to_digit(10).map(|d| d as u8))(s)
}
