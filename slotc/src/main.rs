use clap::{ArgAction, Parser as ClapParser, ValueEnum};
use std::{
    fs,
    io::{self, Write},
    path::PathBuf,
    process,
};

use bytecode::{Literal, decode};
use slotc::{CompileOptions, Error, StackAccounting, parse_source, render};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Emit {
    /// The serialized code object
    Bytes,
    /// One token per line
    Tokens,
    /// One s-expression per top-level expression
    Ast,
    /// Graphviz DOT of the AST
    Dot,
    /// Human-readable disassembly
    Disasm,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Accounting {
    MaxDepth,
    PushCount,
}

impl From<Accounting> for StackAccounting {
    fn from(value: Accounting) -> Self {
        match value {
            Accounting::MaxDepth => StackAccounting::MaxDepth,
            Accounting::PushCount => StackAccounting::PushCount,
        }
    }
}

#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source file to compile
    input: PathBuf,

    /// Write output here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// What to produce
    #[arg(long, value_enum, default_value_t = Emit::Bytes)]
    emit: Emit,

    /// How the code object's stack usage is computed
    #[arg(long, value_enum, default_value_t = Accounting::MaxDepth)]
    stack_accounting: Accounting,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logger(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default),
    )
    .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let source = match fs::read_to_string(&cli.input) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Error reading file '{}': {}", cli.input.display(), err);
            process::exit(1);
        }
    };

    let options = CompileOptions {
        stack_accounting: cli.stack_accounting.into(),
    };
    let output = match produce(&source, cli.emit, &options) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("Error compiling {}: {}", cli.input.display(), err);
            process::exit(1);
        }
    };

    let written = match &cli.output {
        Some(path) => fs::write(path, &output),
        None => io::stdout().lock().write_all(&output),
    };
    if let Err(err) = written {
        eprintln!("Error writing output: {}", err);
        process::exit(1);
    }
}

fn produce(
    source: &str,
    emit: Emit,
    options: &CompileOptions,
) -> Result<Vec<u8>, Error> {
    let text = match emit {
        Emit::Bytes => {
            let program = parse_source(source)?;
            return render(&program, options);
        }
        Emit::Tokens => {
            let mut out = String::new();
            for token in parser::scan(source)? {
                out.push_str(&format!("{} {}\n", token.span, token.describe()));
            }
            out
        }
        Emit::Ast => {
            let program = parse_source(source)?;
            let mut out = String::new();
            for expr in &program.body {
                out.push_str(&format!("{expr}\n"));
            }
            out
        }
        Emit::Dot => parser::ast::to_dot(&parse_source(source)?),
        Emit::Disasm => {
            let bytes = render(&parse_source(source)?, options)?;
            match decode(&bytes) {
                Ok(Literal::Code(code)) => code.to_string(),
                Ok(other) => other.to_string(),
                Err(err) => format!("undecodable output: {err}\n"),
            }
        }
    };
    Ok(text.into_bytes())
}
