pub use crate::checksum::checksum;
pub use crate::parser::{
    parse, parse_element_set, ParseError, ParseFailure, ParseFailureKind, ParseOutput,
};

pub mod checksum;
pub mod fields;
pub mod parser;

/// Every data line is exactly this many columns, checksum included
pub const LINE_LENGTH: usize = 69;

/// Space-Track three-line sets prefix the name line with this
pub const NAME_LINE_PREFIX: &str = "0 ";
