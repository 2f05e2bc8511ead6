//! faultkit CLI — build a fault from declarative spec overrides and print
//! its transport JSON.
//!
//! Usage:
//! ```bash
//! # Extend the base type with inline spec overrides and build an instance
//! faultkit render --spec '{"name":"HttpFault","message":"{{name}}: {{status}}","status":"503"}'
//!
//! # Chain several extensions, override the message, attach values
//! faultkit render --spec overrides.json --spec '{"status":"404"}' \
//!     --message "lookup failed" --value 42 --value '{"path":"/users"}'
//!
//! # Pretty-print the output
//! faultkit render --spec '{"name":"X"}' --pretty
//! ```

use std::env;
use std::fs;
use std::process;

use faultkit_core::{AuxValue, FaultType, Props};
use serde_json::Value;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "render" => cmd_render(&args[2..]),
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-V" => {
            println!("faultkit {}", env!("CARGO_PKG_VERSION"));
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    println!("faultkit {}", env!("CARGO_PKG_VERSION"));
    println!("Build templated faults and print their transport JSON\n");
    println!("USAGE:");
    println!("    faultkit <COMMAND>\n");
    println!("COMMANDS:");
    println!("    render    Extend the base type and build an instance");
    println!("    version   Print version");
    println!("    help      Print this help\n");
    println!("RENDER FLAGS:");
    println!("    --spec <JSON|FILE>   Field overrides; repeat to chain extensions");
    println!("    --message <STR>      Message override for the instance");
    println!("    --value <JSON>       Construction value; repeatable, order kept");
    println!("    --push <JSON>        Value pushed after construction; repeatable");
    println!("    --pretty             Pretty-print the output");
}

fn cmd_render(args: &[String]) {
    let mut specs: Vec<String> = Vec::new();
    let mut message: Option<String> = None;
    let mut values: Vec<String> = Vec::new();
    let mut pushes: Vec<String> = Vec::new();
    let mut pretty = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--spec" => {
                i += 1;
                match args.get(i) {
                    Some(s) => specs.push(s.clone()),
                    None => missing_value("--spec"),
                }
            }
            "--message" => {
                i += 1;
                match args.get(i) {
                    Some(s) => message = Some(s.clone()),
                    None => missing_value("--message"),
                }
            }
            "--value" => {
                i += 1;
                match args.get(i) {
                    Some(s) => values.push(s.clone()),
                    None => missing_value("--value"),
                }
            }
            "--push" => {
                i += 1;
                match args.get(i) {
                    Some(s) => pushes.push(s.clone()),
                    None => missing_value("--push"),
                }
            }
            "--pretty" => pretty = true,
            flag => {
                eprintln!("Unknown flag: {flag}");
                process::exit(1);
            }
        }
        i += 1;
    }

    let mut ty = FaultType::base();
    for raw in &specs {
        let overrides = load_overrides(raw);
        let mut props = Props::new();
        for (name, value) in overrides {
            props = props.field(name, value);
        }
        ty = match ty.extend(props) {
            Ok(child) => child,
            Err(e) => {
                eprintln!("Extension error: {e}");
                process::exit(1);
            }
        };
    }

    let mut build_args: Vec<AuxValue> = Vec::new();
    if let Some(m) = message {
        build_args.push(AuxValue::from(m));
    }
    for raw in &values {
        build_args.push(AuxValue::from(parse_json_arg(raw)));
    }

    let fault = ty.build(build_args);
    for raw in &pushes {
        fault.push(parse_json_arg(raw));
    }

    // Run the deferred phase so value replay completes before output.
    ty.scheduler().run_tick();

    let out = fault.transport();
    let rendered = if pretty {
        serde_json::to_string_pretty(&out)
    } else {
        serde_json::to_string(&out)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("JSON serialization error: {e}");
            process::exit(1);
        }
    }
}

fn missing_value(flag: &str) -> ! {
    eprintln!("Error: {flag} requires a value");
    process::exit(1);
}

/// A `--spec` argument is inline JSON when it starts with `{`, otherwise a
/// path to a JSON file. Either way it must be an object of field overrides.
fn load_overrides(raw: &str) -> serde_json::Map<String, Value> {
    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        match fs::read_to_string(raw) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("Cannot read spec file {raw}: {e}");
                process::exit(1);
            }
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            eprintln!("Spec overrides must be a JSON object: {raw}");
            process::exit(1);
        }
        Err(e) => {
            eprintln!("Invalid spec JSON: {e}");
            process::exit(1);
        }
    }
}

/// `--value` / `--push` arguments are JSON when they parse; anything else is
/// taken as a bare string.
fn parse_json_arg(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
