use bulwark_errors::config::{self, DiagnosticSink};
use bulwark_errors::{Dynamic, Fault, Fixable, Validatable, assert, assert_ok, cond_f, definitions};
use std::panic;

struct Pool {
    size: usize,
    max: usize,
}

impl Validatable for Pool {
    type Error = Fault;

    fn validate(&self) -> Result<(), Fault> {
        if self.size > self.max {
            return Err(definitions::invalid_parameter(format!(
                "size {} exceeds max {}",
                self.size, self.max
            ))
            .with_suggestion("call fix() to clamp the size"));
        }
        Ok(())
    }
}

impl Fixable for Pool {
    type Error = Fault;

    fn fix(&mut self) -> Result<(), Fault> {
        if self.max == 0 {
            return Err(definitions::invalid_parameter("max = 0"));
        }
        self.size = self.size.min(self.max);
        Ok(())
    }
}

/// Run a guard, report what it raised, and keep going.
fn attempt(label: &str, f: impl FnOnce() + panic::UnwindSafe) {
    match panic::catch_unwind(f) {
        Ok(()) => println!("   {label}: ok"),
        Err(payload) => match payload.downcast::<Fault>() {
            Ok(fault) => println!("   {label}: raised {fault}"),
            Err(_) => println!("   {label}: raised a non-fault panic"),
        },
    }
}

fn main() {
    println!("--- Assertion Guards ---\n");

    // Diagnostics would otherwise go to stderr before each panic.
    config::set_diagnostic_sink(DiagnosticSink::Silent);
    panic::set_hook(Box::new(|_| {}));

    println!("1. [BOOLEAN GUARDS]");
    attempt("cond", || assert::cond(1 + 1 == 2, "arithmetic"));
    attempt("cond_f!", || cond_f!(3 < 2, "3 < 2 ({} items)", 3));
    attempt("assert_ok!", || assert_ok!(false, "cache.ready({})", "users"));

    println!("\n2. [VALUE GUARDS]");
    attempt("not_nil", || {
        let token: Option<&str> = None;
        assert::not_nil(token, "token");
    });
    attempt("not_zero", || assert::not_zero(&0u32, "retries"));
    attempt("is_type", || {
        let value: &dyn Dynamic = &"forty-two";
        assert::is_type::<i64, _>(Some(value), "answer", false);
    });

    println!("\n3. [CAPABILITY GUARDS]");
    attempt("validate", || {
        let pool = Pool { size: 12, max: 8 };
        assert::validate("pool", Some(&pool), false);
    });
    attempt("fix", || {
        let mut pool = Pool { size: 12, max: 8 };
        assert::fix("pool", Some(&mut pool), false);
        assert::validate("pool", Some(&pool), false);
    });
    attempt("fix (absent)", || assert::fix::<Pool>("", None, false));

    let _ = panic::take_hook();
    config::reset_diagnostic_sink();
}
