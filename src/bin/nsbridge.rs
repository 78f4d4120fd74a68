//! CLI wrapper for the nsbridge runtime.
//!
//! Usage:
//!   nsbridge <file.nsb>                 # Run a script
//!   nsbridge -e "forms"                 # Evaluate forms
//!   nsbridge --tokens <file.nsb>        # Print the parse tree of a script
//!   nsbridge                            # Start REPL (interactive mode)
//!
//! `--config <file.json>` may precede any of these. Log output is controlled
//! by `NSBRIDGE_LOG` (default `warn`).

use nsbridge::parser::parse_to_token_tree;
use nsbridge::runner::api::Bridge;
use nsbridge::runner::ds::realm::Realm;
use nsbridge::runner::ds::value::Value;
use nsbridge::runner::plugin::config::BridgeConfig;
use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let bridge = match take_config(&mut args) {
        Some(path) => bridge_from_config(&path),
        None => Bridge::shared(Realm::new()),
    };

    match args.as_slice() {
        [] => run_repl(&bridge),
        [flag] if flag == "-h" || flag == "--help" => {
            print_usage();
            process::exit(0);
        }
        [flag, code] if flag == "-e" || flag == "--eval" => eval_code(&bridge, code),
        [flag, file] if flag == "--tokens" => print_tokens(file),
        [file] => run_file(&bridge, file),
        _ => {
            print_usage();
            process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("NSBRIDGE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Remove `--config <path>` from the arguments, returning the path.
fn take_config(args: &mut Vec<String>) -> Option<String> {
    let index = args.iter().position(|a| a == "--config")?;
    if index + 1 >= args.len() {
        print_usage();
        process::exit(1);
    }
    let path = args.remove(index + 1);
    args.remove(index);
    Some(path)
}

fn bridge_from_config(path: &str) -> Bridge {
    let config = match BridgeConfig::load(Path::new(path)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config '{}': {}", path, e);
            process::exit(1);
        }
    };
    match Bridge::from_config(&config) {
        Ok(bridge) => bridge,
        Err(e) => {
            eprintln!("Error applying config '{}': {}", path, e);
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("nsbridge - namespaced function runtime bridge");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  nsbridge [--config <file.json>] <file.nsb>     Run a script");
    eprintln!("  nsbridge [--config <file.json>] -e \"forms\"     Evaluate forms");
    eprintln!("  nsbridge --tokens <file.nsb>                   Print the parse tree");
    eprintln!("  nsbridge [--config <file.json>]                Start REPL (interactive mode)");
}

fn read_source(filename: &str) -> String {
    match fs::read_to_string(filename) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", filename, e);
            process::exit(1);
        }
    }
}

fn run_file(bridge: &Bridge, filename: &str) {
    let source = read_source(filename);
    eval_code(bridge, &source);
}

fn eval_code(bridge: &Bridge, code: &str) {
    match bridge.run_script(code) {
        Ok(value) => print_value(&value),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn print_tokens(filename: &str) {
    let source = read_source(filename);
    match parse_to_token_tree(&source) {
        Ok(tree) => println!("{}", tree),
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn print_value(value: &Value) {
    if !value.is_nil() {
        println!("{}", value);
    }
}

fn run_repl(bridge: &Bridge) {
    println!("nsbridge v{}", env!("CARGO_PKG_VERSION"));
    println!("Type forms and press Enter. Type .exit to quit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut input = String::new();
        match stdin.read_line(&mut input) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("Error reading input: {}", e);
                break;
            }
        }

        let input = input.trim();
        if input == ".exit" || input == ".quit" {
            break;
        }
        if input.is_empty() {
            continue;
        }

        match bridge.run_script(input) {
            Ok(value) => print_value(&value),
            Err(e) => eprintln!("Error: {}", e),
        }
    }

    println!("Goodbye!");
}
