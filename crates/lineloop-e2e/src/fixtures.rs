//! Line files used by the end-to-end scenarios.

/// Lines served in the reference scenario.
pub const SERVER_LINES: &str = "apple\nBanana\n";

/// Client copy sharing only `apple` with [`SERVER_LINES`].
pub const PARTIAL_CLIENT_LINES: &str = "apple\ncherry\n";

/// Client copy sharing nothing with [`SERVER_LINES`].
pub const DISJOINT_CLIENT_LINES: &str = "kiwi\nmango\n";

/// Latin-1 encoded lines, which are not valid UTF-8.
pub const LATIN1_LINES: &[u8] = b"caf\xe9\nna\xefve\n";

/// Short alphabet used to observe the shared cursor.
pub const ALPHABET: &str = "a\nb\nc\n";
