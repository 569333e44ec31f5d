//! CLI driver (spec.md §6): run a 9608 Pseudocode source file, print
//! `OUTPUT`/`INPUT` through the terminal, and exit with the code that
//! matches whichever error family (if any) stopped the program.

use std::path::Path;
use std::{fs, process};

use pseudo9608::{dump_frame, run_source, terminal_handlers};

struct RunnerConfig {
    path: String,
    dump_frame: bool,
    seed: Option<u64>,
}

fn parse_args(args: &[String]) -> RunnerConfig {
    let mut path = None;
    let mut dump_frame = false;
    let mut seed = None;
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--dump-frame" => dump_frame = true,
            "--seed" => {
                let value = iter.next().unwrap_or_else(|| {
                    eprintln!("Error: --seed requires a value");
                    process::exit(65);
                });
                seed = Some(value.parse::<u64>().unwrap_or_else(|_| {
                    eprintln!("Error: --seed must be an integer, got '{value}'");
                    process::exit(65);
                }));
            }
            other => path = Some(other.to_string()),
        }
    }
    RunnerConfig { path: path.unwrap_or_else(|| "main.pseudo".to_string()), dump_frame, seed }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();
    let config = parse_args(&args);

    if !Path::new(&config.path).exists() {
        eprintln!("Error: file '{}' not found", config.path);
        process::exit(70);
    }
    let source = fs::read_to_string(&config.path).unwrap_or_else(|e| {
        eprintln!("Error: could not read '{}': {e}", config.path);
        process::exit(70);
    });

    let mut handlers = terminal_handlers();
    let (result, lines) = run_source(&source, &mut handlers, config.seed);
    match result {
        Ok(frame) => {
            if config.dump_frame {
                print!("{}", dump_frame(&frame));
            }
            process::exit(0);
        }
        Err(err) => {
            eprintln!("{}", err.render(&lines));
            process::exit(err.exit_code());
        }
    }
}
