//! Rendering of command-line usage errors.

use std::io::Write;
use std::process::ExitCode;

/// Writes a clap error to the stream clap intends for it and returns clap's
/// exit status.
///
/// Help and version output go to `stdout` and exit with status 0; genuine
/// usage errors go to `stderr` and exit with status 2.
pub fn report_usage<W: Write, E: Write>(
    error: &clap::Error,
    stdout: &mut W,
    stderr: &mut E,
) -> ExitCode {
    let rendered = error.render().to_string();
    if error.use_stderr() {
        let _ = write!(stderr, "{rendered}");
    } else {
        let _ = write!(stdout, "{rendered}");
    }
    u8::try_from(error.exit_code()).map_or(ExitCode::FAILURE, ExitCode::from)
}
