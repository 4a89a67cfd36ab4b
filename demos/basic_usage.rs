use bulwark_errors::{ErrorCode, Fault, Result, classify, definitions, display_error};
use std::collections::HashMap;
use std::io;

fn read_setting(settings: &HashMap<&str, &str>, key: &str) -> Result<u16> {
    let raw = settings
        .get(key)
        .ok_or_else(|| definitions::no_such_key(key).with_frame("read_setting"))?;

    raw.parse::<u16>().map_err(|e| {
        Fault::wrap(ErrorCode::BadParameter, e)
            .with_suggestion("ports are integers between 0 and 65535")
            .with_context("key", key.to_owned())
            .with_context("raw", raw.to_string())
            .with_frame("read_setting")
    })
}

fn start_server(settings: &HashMap<&str, &str>) -> Result<()> {
    let port = read_setting(settings, "port").map_err(|mut e| {
        e.add_frame("start_server");
        Fault::from_fault(ErrorCode::OperationFail, &mut e).with_inner(e)
    })?;
    println!("listening on {port}");
    Ok(())
}

fn main() -> io::Result<()> {
    println!("--- Basic Usage Example ---\n");

    let settings = HashMap::from([("port", "http")]);

    match start_server(&settings) {
        Ok(()) => println!("Success!"),
        Err(err) => {
            // 1. One-line form, safe to embed anywhere.
            println!("1. [SHORT FORM]");
            println!("   {err}");

            // 2. Full diagnostic rendering.
            println!("\n2. [FULL RENDERING]");
            display_error(Some(&mut io::stdout().lock()), Some(&err))?;

            // 3. Structured log line.
            println!("\n3. [LOG LINE]");
            err.with_log(|log| {
                let mut line = String::new();
                if log.write_to(&mut line).is_ok() {
                    println!("   {line}");
                }
            });

            // 4. Classification.
            println!("\n4. [CLASSIFICATION]");
            println!(
                "   operation failure: {}",
                classify::is(Some(&err), ErrorCode::OperationFail)
            );
            println!("   raw value: {:?}", err.value_as::<String>("raw").ok());
        }
    }

    Ok(())
}
