//! the IR generator binary: takes a source file, an output format, and a
//! target workspace flag, and drives `back::encode` over the parsed
//! program.
//!
//! run with `--help` for more info.

use cflat_irgen::{
    back,
    common::IdentId,
    front::{self, IdentPool, StringPool, Syntax, Target, TypePool, Workspace},
};

use clap::{Parser, ValueEnum};

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Args {
    /// the input file
    file: String,
    /// the output format
    #[arg(value_enum, short, long, default_value_t = Output::Ir)]
    out: Output,
    /// target the mipsel data layout instead of x86-64
    #[arg(long, default_value_t = false)]
    mipsel: bool,
    /// target the x86-64 data layout (the default; kept for explicitness)
    #[arg(long, default_value_t = false, conflicts_with = "mipsel")]
    x86_64: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
enum Output {
    /// the ast data structure
    Ast,
    /// the emitted IR text
    Ir,
}

fn main() {
    use Output::*;
    let args = Args::parse();

    let input = String::from_utf8(std::fs::read(&args.file).expect("file should be readable"))
        .expect("input characters should be utf8");

    let target = if args.mipsel { Target::MipsEl } else { Target::X86_64 };
    let workspace = Workspace { target };

    match args.out {
        Ast => {
            println!("{:?}", front::parse(&input).unwrap());
        }
        Ir => {
            // The upstream parser is out of scope (see `front::parse`); once
            // it exists, it is expected to hand back the full `Syntax`
            // bundle rather than a bare `Program`. Until then this path
            // documents the intended command surface.
            let program = front::parse(&input).unwrap();
            let types = TypePool::new();
            let idents = IdentPool::new();
            let strings = StringPool::new();
            let main = IdentId(0);
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            let mut syntax = Syntax { types, idents, strings, main, program, io: &mut handle };
            let mut errors = back::CollectingSink::default();
            let rc = back::encode(&workspace, &mut syntax, &mut errors);
            if rc != 0 {
                eprintln!("encode finished with {rc} error(s): {:?}", errors.errors);
            }
        }
    }
}
