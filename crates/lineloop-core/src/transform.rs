/// Terminator appended to every payload.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Uppercases ASCII letters, leaving every other byte untouched.
#[must_use]
pub fn normalise(line: &[u8]) -> Vec<u8> {
    line.to_ascii_uppercase()
}

/// Builds the payload for `line`: the normalised bytes followed by exactly
/// one terminator.
#[must_use]
pub fn transform(line: &[u8]) -> Vec<u8> {
    let mut payload = normalise(line);
    payload.push(LINE_TERMINATOR);
    payload
}
