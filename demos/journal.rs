use bulwark_errors::config::{self, DiagnosticSink};
use bulwark_errors::{
    BoxError, ErrorCode, Fault, RingBufferLogger, SeverityLevel, assert, definitions, merge_errors,
};
use std::io;
use std::panic;
use std::thread;

fn main() {
    println!("--- Fault Journal ---\n");

    // 8 entries, 1KB each: the journal never holds more than 8KB of text.
    let journal = RingBufferLogger::new(8, 1024);

    // 1. Faults from ordinary error paths.
    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let journal = journal.clone();
            thread::spawn(move || {
                for job in 0..3 {
                    let fault = definitions::failed_at(
                        &format!("worker {worker} job {job}"),
                        io::Error::other("connection reset"),
                    );
                    journal.log(&fault);
                }
            })
        })
        .collect();

    for handle in handles {
        if handle.join().is_err() {
            eprintln!("worker panicked");
        }
    }

    // 2. Assertion failures routed into the same journal.
    config::set_diagnostic_sink(DiagnosticSink::Journal(journal.clone()));
    panic::set_hook(Box::new(|_| {}));
    let _ = panic::catch_unwind(|| assert::cond(false, "queue drained before shutdown"));
    let _ = panic::take_hook();
    config::reset_diagnostic_sink();

    // 3. A merged error.
    let outer: BoxError = Fault::new(ErrorCode::OperationFail, "flush failed").into();
    let inner: BoxError = io::Error::other("disk full").into();
    if let Some(merged) = merge_errors(Some(outer), Some(inner)) {
        if let Some(fault) = merged.downcast_ref::<Fault>() {
            journal.log(fault);
        }
    }

    println!("entries:   {} / {}", journal.len(), journal.capacity());
    println!("evictions: {}", journal.eviction_count());
    println!("payload:   {} bytes\n", journal.payload_bytes());

    println!("fatal entries:");
    for entry in journal.get_filtered(|e| e.severity == SeverityLevel::Fatal) {
        println!("{}", entry.text);
    }

    println!("most recent three:");
    for entry in journal.get_recent(3) {
        println!("  [{}] {} {}: {}", entry.timestamp, entry.severity, entry.code, entry.message);
    }
}
