//! Multi-section rendering of errors, and the display-then-panic entry point.
//!
//! ```text
//! [FATAL] AssertFail: cond failed
//! Occurred at: 2026-10-16 09:12:44.101 UTC
//! Suggestion:
//! - check your input
//!
//! Context:
//! - n: 5
//!
//! Stack trace:
//! - assert::cond
//!
//! Caused by:
//! [ERROR] BadParameter: n must be positive
//! Occurred at: ...
//! ```
//!
//! The short line is written first, then the detail block (built in memory,
//! including every nested cause) in one more write. A sink that accepts fewer
//! bytes than offered fails the call with [`io::ErrorKind::WriteZero`].

use crate::Fault;
use crate::context::Info;
use std::error::Error;
use std::fmt::Write as _;
use std::io;
use std::panic;

/// Render `err` and its chain of inner errors to `sink`.
///
/// - `err == None`: nothing is written, `Ok(())`
/// - `sink == None`: `WriteZero` without writing
/// - otherwise the short form plus `\n`, followed by the detail sections when
///   `err` is a [`Fault`] carrying an [`Info`]
///
/// # Errors
///
/// Any error from the sink, or `WriteZero` on a short write.
pub fn display_error<W>(sink: Option<&mut W>, err: Option<&(dyn Error + 'static)>) -> io::Result<()>
where
    W: io::Write + ?Sized,
{
    let Some(err) = err else {
        return Ok(());
    };
    let Some(sink) = sink else {
        return Err(io::ErrorKind::WriteZero.into());
    };

    let mut line = err.to_string();
    line.push('\n');
    write_all_at_once(sink, line.as_bytes())?;

    let Some(info) = err.downcast_ref::<Fault>().and_then(Fault::info) else {
        return Ok(());
    };

    let mut block = Vec::new();
    render_info(info, &mut block)?;
    if block.is_empty() {
        return Ok(());
    }

    write_all_at_once(sink, &block)
}

/// Display `err` to `sink`, then panic with `err` as the payload.
///
/// Returns only when `err` is `None`. A rendering failure panics with the
/// `io::Error` instead.
///
/// The payload can be recovered with `catch_unwind` and
/// `downcast::<E>()`.
pub fn panic_with<W, E>(sink: Option<&mut W>, err: Option<E>)
where
    W: io::Write + ?Sized,
    E: Error + Send + 'static,
{
    let Some(err) = err else {
        return;
    };

    if let Err(io_err) = display_error(sink, Some(&err)) {
        panic::panic_any(io_err);
    }

    panic::panic_any(err)
}

/// One `write` call; anything less than the full buffer is a short write.
fn write_all_at_once<W>(sink: &mut W, data: &[u8]) -> io::Result<()>
where
    W: io::Write + ?Sized,
{
    let written = sink.write(data)?;
    if written != data.len() {
        return Err(io::ErrorKind::WriteZero.into());
    }
    Ok(())
}

fn render_info(info: &Info, out: &mut Vec<u8>) -> io::Result<()> {
    let mut text = String::new();

    // Writing into a String cannot fail.
    if let Some(ts) = info.timestamp() {
        let _ = writeln!(text, "Occurred at: {ts}");
    }

    if info.suggestions().next().is_some() {
        text.push_str("Suggestion:\n");
        for suggestion in info.suggestions() {
            let _ = writeln!(text, "- {suggestion}");
        }
    }

    if info.context().next().is_some() {
        text.push_str("\nContext:\n");
        for (key, entry) in info.context() {
            let _ = writeln!(text, "- {key}: {}", entry.rendered());
        }
    }

    if let Some(trace) = info.stack_trace() {
        let _ = write!(text, "\nStack trace:\n- {trace}\n");
    }

    out.extend_from_slice(text.as_bytes());

    if let Some(inner) = info.inner() {
        out.extend_from_slice(b"\nCaused by:\n");
        display_error(Some(out), Some(inner as &(dyn Error + 'static)))?;
    }

    Ok(())
}
