#![forbid(unsafe_code)]
use std::path::PathBuf;
use std::{env, ffi, fs, io};

use adlzw::{Encoder, LzwStatus, Strategy};

fn main() -> CodingResult {
    env_logger::init();
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os());
        run_coding(flags)
    })
}

fn run_coding(flags: Flags) -> Result<LzwStatus, io::Error> {
    let out: Box<dyn io::Write> = match flags.output {
        Some(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        None => Box::new(io::stdout().lock()),
    };

    let mut encoder = Encoder::with_strategy(flags.strategy);
    match flags.input {
        Input::File(file) => {
            let data = fs::File::open(file)?;
            let file = io::BufReader::with_capacity(1 << 20, data);
            encoder.into_stream(out).encode_all(file).status
        }
        Input::Stdin => {
            let input = io::BufReader::with_capacity(1 << 20, io::stdin());
            encoder.into_stream(out).encode_all(input).status
        }
    }
}

struct Flags {
    input: Input,
    output: Option<PathBuf>,
    strategy: Strategy,
}

#[derive(Debug)]
enum Input {
    File(PathBuf),
    Stdin,
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Input::Stdin,
            output: None,
            strategy: Strategy::default(),
        }
    }
}

fn command() -> clap::Command {
    clap::Command::new("adlzw")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress a file with adaptive-width LZW")
        .arg(
            clap::Arg::new("strategy")
                .short('s')
                .long("strategy")
                .default_value("hashed")
                .value_parser(["tree", "hashed"]),
        )
        .arg(
            clap::Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
        .arg(
            clap::Arg::new("file")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(args: impl Iterator<Item = ffi::OsString>) -> Self {
        let mut flags = Flags::default();
        let matches = command().get_matches_from(args);

        match matches.get_one::<String>("strategy").map(String::as_str) {
            Some("tree") => flags.strategy = Strategy::Tree,
            Some("hashed") => flags.strategy = Strategy::Hashed,
            Some(_) => unreachable!("unparsed strategy"),
            None => {}
        }

        flags.output = matches.get_one::<PathBuf>("output").cloned();

        match matches.get_one::<PathBuf>("file") {
            Some(p) if *p != PathBuf::from("-") => flags.input = Input::File(p.clone()),
            _ => flags.input = Input::Stdin,
        }

        flags
    }
}

enum CodingResult {
    Ok,
    Empty,
    Err(io::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> Result<LzwStatus, io::Error>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(LzwStatus::Empty) => CodingResult::Empty,
            Ok(_) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Empty => {
                eprintln!("Nothing to encode, the input is empty.");
                std::process::ExitCode::from(2)
            }
            CodingResult::Err(err) => {
                eprintln!("{}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
