//! Invariant guards that panic with a FATAL [`Fault`].
//!
//! Every helper returns silently when its check holds (value-returning helpers
//! hand the value back). When the check fails it builds a FATAL fault, adds
//! its own name as a stack frame, renders the fault to the thread's
//! [diagnostic sink](crate::config) and panics with the fault as the payload.
//! There is no soft mode.
//!
//! | Helper | Failure message |
//! |---|---|
//! | [`cond`] | the message |
//! | [`cond_f`] | the formatted message |
//! | [`no_err`] | `<label> = <error>` |
//! | [`ok`] | `<label> = false` |
//! | [`not_ok`] | `<label> = true` |
//! | [`not_nil`] | `<name> = nil` |
//! | [`not_zero`] | `<name> = <value>` |
//! | [`is_type`], [`conv`] | `<name> = <actual>, expected <wanted>` |
//! | [`constructed`] | the constructor's error, or `object must not be the zero value` |
//! | [`validate`], [`fix`] | `"<name>" must not be nil`, or the object's error |
//!
//! The payload can be recovered with `std::panic::catch_unwind` and
//! `downcast::<Fault>()`.

use crate::capability::{Fixable, Validatable};
use crate::dynamic::{Dynamic, unwrap_shared};
use crate::{BoxError, ErrorCode, Fault, SeverityLevel, config};
use std::any::{self, Any};
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::panic;

/// Substituted for an empty object name.
const DEFAULT_NAME: &str = "object";

#[inline]
fn object_name(name: &str) -> &str {
    if name.is_empty() { DEFAULT_NAME } else { name }
}

#[cold]
#[inline(never)]
#[track_caller]
fn fail(code: ErrorCode, message: impl Into<Cow<'static, str>>, frame: impl Into<Cow<'static, str>>) -> ! {
    let mut fault = Fault::with_severity(SeverityLevel::Fatal, code, message);
    fault.add_frame(frame);
    raise(fault)
}

#[cold]
#[inline(never)]
#[track_caller]
fn raise(fault: Fault) -> ! {
    config::emit(&fault);
    panic::panic_any(fault)
}

/// Panic with `msg` unless `cond` holds.
#[inline]
#[track_caller]
pub fn cond(cond: bool, msg: impl Into<Cow<'static, str>>) {
    if !cond {
        fail(ErrorCode::AssertFail, msg, "assert::cond");
    }
}

/// Panic with the formatted message unless `cond` holds.
///
/// Usually called through [`cond_f!`](crate::cond_f).
#[inline]
#[track_caller]
pub fn cond_f(cond: bool, args: fmt::Arguments<'_>) {
    if !cond {
        fail(ErrorCode::AssertFail, args.to_string(), "assert::cond_f");
    }
}

/// Panic with `<label> = <err>` when an error is present.
///
/// ```rust
/// # use bulwark_errors::assert;
/// let parsed: Result<u16, std::num::ParseIntError> = "8080".parse();
/// assert::no_err(parsed.as_ref().err(), "parse port");
/// ```
#[inline]
#[track_caller]
pub fn no_err<E>(err: Option<&E>, label: impl fmt::Display)
where
    E: Error + ?Sized,
{
    if let Some(err) = err {
        fail(ErrorCode::AssertFail, format!("{label} = {err}"), "assert::no_err");
    }
}

/// Panic with `<label> = false` unless `ok`.
#[inline]
#[track_caller]
pub fn ok(ok: bool, label: impl fmt::Display) {
    if !ok {
        fail(ErrorCode::AssertFail, format!("{label} = false"), "assert::ok");
    }
}

/// Panic with `<label> = true` if `ok`.
#[inline]
#[track_caller]
pub fn not_ok(ok: bool, label: impl fmt::Display) {
    if ok {
        fail(ErrorCode::AssertFail, format!("{label} = true"), "assert::not_ok");
    }
}

/// Unwrap `value`, panicking with `<name> = nil` when absent.
///
/// ```rust
/// # use bulwark_errors::assert;
/// let port = assert::not_nil(Some(8080), "port");
/// assert_eq!(port, 8080);
/// ```
#[inline]
#[track_caller]
pub fn not_nil<T>(value: Option<T>, name: &str) -> T {
    match value {
        Some(value) => value,
        None => fail(
            ErrorCode::AssertFail,
            format!("{} = nil", object_name(name)),
            "assert::not_nil",
        ),
    }
}

/// Panic with `<name> = <value>` when `value` equals `T::default()`.
#[inline]
#[track_caller]
pub fn not_zero<T>(value: &T, name: &str)
where
    T: Default + PartialEq + fmt::Debug,
{
    if *value == T::default() {
        fail(
            ErrorCode::AssertFail,
            format!("{} = {value:?}", object_name(name)),
            "assert::not_zero",
        );
    }
}

/// Panic unless `value` holds a `T`.
///
/// An absent value passes only when `allow_nil`. A `Box` or `Arc` around a
/// tagged value is looked through, and context values from
/// [`Fault::value`] can be passed as they are.
///
/// ```rust
/// # use bulwark_errors::{assert, Dynamic};
/// let value: &dyn Dynamic = &5i32;
/// assert::is_type::<i32, _>(Some(value), "value", false);
/// ```
#[inline]
#[track_caller]
pub fn is_type<T, V>(value: Option<&V>, name: &str, allow_nil: bool)
where
    T: Any,
    V: Dynamic + ?Sized,
{
    match value.map(unwrap_shared) {
        Some((any, _)) if any.is::<T>() => {}
        None if allow_nil => {}
        value => type_mismatch::<T>(value.map(|(_, label)| label), name, "assert::is_type"),
    }
}

/// Downcast `value` to a `T`, panicking when it holds something else or is
/// absent.
///
/// ```rust
/// # use bulwark_errors::{assert, Dynamic};
/// let value: &dyn Dynamic = &String::from("ok");
/// let s: &String = assert::conv(Some(value), "value");
/// assert_eq!(s, "ok");
/// ```
#[inline]
#[track_caller]
pub fn conv<'a, T, V>(value: Option<&'a V>, name: &str) -> &'a T
where
    T: Any,
    V: Dynamic + ?Sized,
{
    match value.map(unwrap_shared) {
        Some((any, label)) => match any.downcast_ref::<T>() {
            Some(converted) => converted,
            None => type_mismatch::<T>(Some(label), name, "assert::conv"),
        },
        None => type_mismatch::<T>(None, name, "assert::conv"),
    }
}

#[cold]
#[track_caller]
fn type_mismatch<T: Any>(actual: Option<&str>, name: &str, frame: &'static str) -> ! {
    let message = format!(
        "{} = {}, expected {}",
        object_name(name),
        actual.unwrap_or("nil"),
        any::type_name::<T>()
    );
    fail(ErrorCode::AssertFail, message, frame)
}

/// Accept the output of a fallible constructor.
///
/// A constructor error is wrapped (its message and diagnostics are kept); an
/// `Ok(None)` fails with `object must not be the zero value`.
#[inline]
#[track_caller]
pub fn constructed<T, E>(result: Result<Option<T>, E>) -> T
where
    E: Into<BoxError>,
{
    match result {
        Ok(Some(value)) => value,
        Ok(None) => fail(
            ErrorCode::AssertFail,
            "object must not be the zero value",
            "assert::constructed",
        ),
        Err(err) => {
            let mut fault = Fault::wrap(ErrorCode::AssertFail, err);
            fault.change_severity(SeverityLevel::Fatal);
            fault.add_frame("assert::constructed");
            raise(fault)
        }
    }
}

/// Panic with an `InvalidState` fault unless `value` validates.
///
/// An absent value passes only when `allow_nil`. The frame is
/// `Validate["<name>", <allow_nil>]`, or `Validate[receiver, <allow_nil>]`
/// for an empty name.
#[track_caller]
pub fn validate<V>(name: &str, value: Option<&V>, allow_nil: bool)
where
    V: Validatable + ?Sized,
{
    let outcome = match value {
        None if allow_nil => return,
        None => None,
        Some(value) => match value.validate() {
            Ok(()) => return,
            Err(err) => Some(err),
        },
    };

    capability_failure(ErrorCode::InvalidState, "Validate", name, allow_nil, outcome)
}

/// Panic with a `FailFix` fault unless `value` fixes itself.
///
/// Same rules as [`validate`], with frames `Fix[...]`.
#[track_caller]
pub fn fix<V>(name: &str, value: Option<&mut V>, allow_nil: bool)
where
    V: Fixable + ?Sized,
{
    let outcome = match value {
        None if allow_nil => return,
        None => None,
        Some(value) => match value.fix() {
            Ok(()) => return,
            Err(err) => Some(err),
        },
    };

    capability_failure(ErrorCode::FailFix, "Fix", name, allow_nil, outcome)
}

#[cold]
#[track_caller]
fn capability_failure<E>(
    code: ErrorCode,
    method: &str,
    name: &str,
    allow_nil: bool,
    err: Option<E>,
) -> !
where
    E: Error + Send + Sync + 'static,
{
    let mut fault = match err {
        Some(err) => {
            let mut fault = Fault::wrap(code, err);
            fault.change_severity(SeverityLevel::Fatal);
            fault
        }
        None if name.is_empty() => {
            Fault::with_severity(SeverityLevel::Fatal, code, "receiver must not be nil")
        }
        None => Fault::with_severity(
            SeverityLevel::Fatal,
            code,
            format!("{name:?} must not be nil"),
        ),
    };

    let frame = if name.is_empty() {
        format!("{method}[receiver, {allow_nil}]")
    } else {
        format!("{method}[{name:?}, {allow_nil}]")
    };
    fault.add_frame(frame);

    raise(fault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DiagnosticSink, set_diagnostic_sink};
    use std::io;
    use std::panic::AssertUnwindSafe;

    fn caught(f: impl FnOnce()) -> Fault {
        set_diagnostic_sink(DiagnosticSink::Silent);
        let payload = panic::catch_unwind(AssertUnwindSafe(f)).expect_err("expected a panic");
        *payload.downcast::<Fault>().expect("payload is a Fault")
    }

    fn frames(fault: &Fault) -> String {
        fault.info().unwrap().stack_trace().unwrap().to_string()
    }

    #[test]
    fn passing_guards_are_silent() {
        cond(true, "never");
        ok(true, "ready");
        not_ok(false, "closed");
        no_err::<io::Error>(None, "io");
        not_zero(&5, "x");
        assert_eq!(not_nil(Some("v"), "v"), "v");
    }

    #[test]
    fn cond_failure_is_fatal_assert_fail() {
        let fault = caught(|| cond(false, "x > 0"));
        assert_eq!(fault.severity(), SeverityLevel::Fatal);
        assert!(fault.is(ErrorCode::AssertFail));
        assert_eq!(fault.to_string(), "[FATAL] AssertFail: x > 0");
        assert_eq!(frames(&fault), "assert::cond");
    }

    #[test]
    fn cond_f_formats() {
        let fault = caught(|| cond_f(false, format_args!("len = {}", 0)));
        assert_eq!(fault.message(), "len = 0");
        assert_eq!(frames(&fault), "assert::cond_f");
    }

    #[test]
    fn no_err_appends_error_text() {
        let err = io::Error::other("disk full");
        let fault = caught(|| no_err(Some(&err), "write"));
        assert_eq!(fault.message(), "write = disk full");
        assert_eq!(frames(&fault), "assert::no_err");
    }

    #[test]
    fn no_err_accepts_trait_objects() {
        let err: Box<dyn Error + Send + Sync> = "boom".into();
        let fault = caught(|| no_err(Some(err.as_ref()), "op"));
        assert_eq!(fault.message(), "op = boom");
    }

    #[test]
    fn ok_and_not_ok_suffixes() {
        assert_eq!(caught(|| ok(false, "ready")).message(), "ready = false");
        assert_eq!(caught(|| not_ok(true, "closed")).message(), "closed = true");
    }

    #[test]
    fn not_nil_names_the_object() {
        let fault = caught(|| {
            not_nil::<u8>(None, "port");
        });
        assert_eq!(fault.message(), "port = nil");

        let fault = caught(|| {
            not_nil::<u8>(None, "");
        });
        assert_eq!(fault.message(), "object = nil");
        assert_eq!(frames(&fault), "assert::not_nil");
    }

    #[test]
    fn not_zero_reports_zero_value() {
        let fault = caught(|| not_zero(&0, "x"));
        assert!(fault.message().contains("x = 0"));
        assert_eq!(fault.severity(), SeverityLevel::Fatal);
        assert!(fault.is(ErrorCode::AssertFail));

        let fault = caught(|| not_zero(&String::new(), ""));
        assert_eq!(fault.message(), "object = \"\"");
    }

    #[test]
    fn is_type_checks_concrete_type() {
        is_type::<i32, _>(Some(&5i32), "v", false);
        is_type::<i32, i32>(None, "v", true);

        let fault = caught(|| is_type::<i32, _>(Some(&"hello"), "v", false));
        assert!(fault.message().contains("expected i32"));
        assert_eq!(fault.message(), "v = &str, expected i32");
        assert_eq!(frames(&fault), "assert::is_type");

        let fault = caught(|| is_type::<i32, i32>(None, "", false));
        assert_eq!(fault.message(), "object = nil, expected i32");
    }

    #[test]
    fn is_type_sees_through_trait_objects() {
        let erased: &dyn Dynamic = &3.5f64;
        is_type::<f64, _>(Some(erased), "ratio", false);

        let fault = caught(|| is_type::<u8, _>(Some(erased), "ratio", false));
        assert_eq!(fault.message(), "ratio = f64, expected u8");
    }

    #[test]
    fn is_type_looks_inside_boxes_and_arcs() {
        let boxed: Box<dyn Dynamic> = Box::new(5i32);
        is_type::<i32, _>(Some(&boxed), "v", false);
        is_type::<i32, _>(Some(&*boxed), "v", false);

        let shared: std::sync::Arc<dyn Dynamic> = std::sync::Arc::new(5i32);
        is_type::<i32, _>(Some(&shared), "v", false);

        let fault = caught(|| is_type::<u8, _>(Some(&boxed), "v", false));
        assert_eq!(fault.message(), "v = i32, expected u8");
    }

    #[test]
    fn context_values_feed_type_guards() {
        let fault = Fault::new(ErrorCode::OperationFail, "failed").with_context("port", 8080u16);

        is_type::<u16, _>(fault.value("port"), "port", false);
        let port: &u16 = conv(fault.value("port"), "port");
        assert_eq!(*port, 8080);

        let raised = caught(|| is_type::<String, _>(fault.value("port"), "port", false));
        assert!(raised.message().starts_with("port = dyn core::any::Any"));

        let raised = caught(|| is_type::<u16, _>(fault.value("missing"), "missing", false));
        assert_eq!(raised.message(), "missing = nil, expected u16");
    }

    #[test]
    fn conv_returns_reference() {
        let erased: &dyn Dynamic = &42u64;
        let value: &u64 = conv(Some(erased), "answer");
        assert_eq!(*value, 42);

        let fault = caught(|| {
            conv::<String, _>(Some(erased), "answer");
        });
        assert!(fault.message().starts_with("answer = u64, expected "));
        assert!(fault.message().ends_with("String"));
        assert_eq!(frames(&fault), "assert::conv");

        let fault = caught(|| {
            conv::<String, dyn Dynamic>(None, "answer");
        });
        assert!(fault.message().starts_with("answer = nil, expected "));
    }

    #[test]
    fn constructed_accepts_and_rejects() {
        let value = constructed(Ok::<_, io::Error>(Some(7)));
        assert_eq!(value, 7);

        let fault = caught(|| {
            constructed(Ok::<Option<u8>, io::Error>(None));
        });
        assert_eq!(fault.message(), "object must not be the zero value");
        assert_eq!(frames(&fault), "assert::constructed");

        let inner = Fault::new(ErrorCode::BadParameter, "bad seed").with_suggestion("use a seed > 0");
        let fault = caught(|| {
            constructed(Err::<Option<u8>, _>(inner));
        });
        assert_eq!(fault.severity(), SeverityLevel::Fatal);
        assert!(fault.is(ErrorCode::AssertFail));
        assert_eq!(fault.message(), "bad seed");
        assert_eq!(fault.info().unwrap().suggestions().count(), 1);
    }

    struct Gauge(i32);

    impl Validatable for Gauge {
        type Error = io::Error;

        fn validate(&self) -> Result<(), io::Error> {
            if self.0 < 0 {
                return Err(io::Error::other("gauge below zero"));
            }
            Ok(())
        }
    }

    impl Fixable for Gauge {
        type Error = io::Error;

        fn fix(&mut self) -> Result<(), io::Error> {
            if self.0 == i32::MIN {
                return Err(io::Error::other("gauge overflow"));
            }
            self.0 = self.0.max(0);
            Ok(())
        }
    }

    #[test]
    fn validate_rules() {
        validate("gauge", Some(&Gauge(1)), false);
        validate::<Gauge>("gauge", None, true);

        let fault = caught(|| validate("gauge", Some(&Gauge(-1)), false));
        assert!(fault.is(ErrorCode::InvalidState));
        assert_eq!(fault.severity(), SeverityLevel::Fatal);
        assert_eq!(fault.message(), "gauge below zero");
        assert_eq!(frames(&fault), "Validate[\"gauge\", false]");

        let fault = caught(|| validate::<Gauge>("gauge", None, false));
        assert_eq!(fault.message(), "\"gauge\" must not be nil");

        let fault = caught(|| validate::<Gauge>("", None, false));
        assert_eq!(fault.message(), "receiver must not be nil");
        assert_eq!(frames(&fault), "Validate[receiver, false]");
    }

    #[test]
    fn fix_rules() {
        let mut gauge = Gauge(-3);
        fix("gauge", Some(&mut gauge), false);
        assert_eq!(gauge.0, 0);

        let mut broken = Gauge(i32::MIN);
        let fault = caught(|| fix("gauge", Some(&mut broken), true));
        assert!(fault.is(ErrorCode::FailFix));
        assert_eq!(fault.message(), "gauge overflow");
        assert_eq!(frames(&fault), "Fix[\"gauge\", true]");

        let fault = caught(|| fix::<Gauge>("", None, false));
        assert!(fault.is(ErrorCode::FailFix));
        assert_eq!(frames(&fault), "Fix[receiver, false]");
    }

    #[test]
    fn journal_sink_receives_the_fault() {
        let journal = crate::RingBufferLogger::new(8, 4096);
        set_diagnostic_sink(DiagnosticSink::Journal(journal.clone()));
        let outcome = panic::catch_unwind(|| ok(false, "flag"));
        set_diagnostic_sink(DiagnosticSink::Silent);

        assert!(outcome.is_err());
        let entry = &journal.get_recent(1)[0];
        assert_eq!(entry.message.as_ref(), "flag = false");
        assert!(entry.text.contains("Stack trace:\n- assert::ok"));
    }
}
