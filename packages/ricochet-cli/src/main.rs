//! Command-line front end: load an iNES ROM and run it forever, printing one
//! trace line per executed instruction.

use getopts::Options;
use ricochet_core::devices::nes::Nes;
use std::env;
use std::io::Write;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

/// Prints usage information with an optional reason.
fn print_usage(program: &str, opts: &Options, reason: Option<&str>) {
    let mut stderr = std::io::stderr();
    if let Some(r) = reason {
        writeln!(stderr, "{}", r).unwrap();
    }
    write!(
        stderr,
        "{}",
        opts.usage(&format!("Usage: {} [OPTION]... FILE", program))
    )
    .unwrap();
}

/// Initializes and starts the emulator, returning the process exit code.
/// Once emulation starts this only returns if the CPU panics; stopping is
/// the caller's job (ctrl-C).
fn init() -> i32 {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this message");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(f) => {
            print_usage(&program, &opts, Some(&f.to_string()));
            return EXIT_FAILURE;
        }
    };

    if matches.opt_present("help") {
        print_usage(&program, &opts, None);
        return EXIT_SUCCESS;
    }

    // The ROM path is the one required free argument
    let rom_path = match matches.free.as_slice() {
        [path] => path.clone(),
        _ => {
            print_usage(
                &program,
                &opts,
                Some("ricochet: expected exactly one iNES rom file"),
            );
            return EXIT_FAILURE;
        }
    };

    let mut nes = match Nes::new_from_file(&rom_path) {
        Ok(nes) => nes,
        Err(e) => {
            let mut stderr = std::io::stderr();
            writeln!(stderr, "ricochet: cannot load {}: {}", rom_path, e).unwrap();
            return EXIT_FAILURE;
        }
    };

    loop {
        println!("{}", nes.step_debug());
    }
}

fn main() {
    std::process::exit(init());
}
