//! The modulo-10 line checksum

/// Sum of the digits of the first 68 columns, plus one for every `-`, modulo 10
pub fn checksum(line: &str) -> u8 {
    let sum: u32 = line
        .bytes()
        .take(crate::LINE_LENGTH - 1)
        .map(|b| match b {
            b'0'..=b'9' => u32::from(b - b'0'),
            b'-' => 1,
            _ => 0,
        })
        .sum();
    (sum % 10) as u8
}

/// The checksum digit written in column 69, if there is one
pub fn written_checksum(line: &str) -> Option<u8> {
    let b = *line.as_bytes().get(crate::LINE_LENGTH - 1)?;
    b.is_ascii_digit().then(|| b - b'0')
}
