use std::env;
use std::fs;
use std::process;

use sysyc::error::CompileError;

const VERSION: &str = "sysyc 0.1.0";

fn print_usage() {
    eprintln!("usage: sysyc -koopa|-riscv|-perf <input.sysy> -o <output>");
}

#[derive(Clone, Copy, PartialEq)]
enum Mode {
    Koopa,
    Riscv,
    Perf,
}

struct Options {
    mode: Mode,
    input: String,
    output: String,
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = env::args().collect();
    let mut mode = None;
    let mut input = None;
    let mut output = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-koopa" => mode = Some(Mode::Koopa),
            "-riscv" => mode = Some(Mode::Riscv),
            "-perf" => mode = Some(Mode::Perf),
            "-o" => {
                i += 1;
                output = args.get(i).cloned();
                if output.is_none() {
                    return Err("'-o' needs an argument".to_string());
                }
            }
            "-v" | "--version" => {
                println!("{VERSION}");
                process::exit(0);
            }
            other if !other.starts_with('-') => input = Some(other.to_string()),
            other => return Err(format!("unrecognized option '{other}'")),
        }
        i += 1;
    }

    let mode = mode.ok_or("missing -koopa/-riscv/-perf mode")?;
    let input = input.ok_or("missing input file")?;
    let output = output.ok_or("missing -o <output>")?;
    Ok(Options {
        mode,
        input,
        output,
    })
}

fn run(opts: &Options) -> Result<(), CompileError> {
    let src = fs::read_to_string(&opts.input)?;
    let koopa_text = sysyc::compile_to_koopa(&src)?;

    let text = match opts.mode {
        Mode::Koopa => koopa_text,
        Mode::Riscv | Mode::Perf => sysyc::backend::compile_to_riscv(&koopa_text)?,
    };

    fs::write(&opts.output, text)?;
    Ok(())
}

fn main() {
    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("sysyc: {e}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = run(&opts) {
        eprintln!("sysyc: {e}");
        process::exit(1);
    }
}
