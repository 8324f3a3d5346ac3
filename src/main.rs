use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use loxide::error::LoxError;
use loxide::interpreter::Interpreter;
use loxide::parser::Parser;
use loxide::resolver::Resolver;
use loxide::scanner::Scanner;
use loxide::stmt::Stmt;
use loxide::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },
}

/// Reads the contents of a file into a Vec<u8>
fn read_file(filename: PathBuf) -> Result<Vec<u8>> {
    info!("Reading file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    Ok(buf)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'loxide::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("loxide::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let buf = read_file(filename)?;
                let scanner = Scanner::new(&buf);
                let mut tokenized = true;

                for token in scanner {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            println!("{}", token);
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization error: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let buf = read_file(filename)?;

                // Scan the whole unit up front; lexing failures are static.
                let mut tokens: Vec<Token> = Vec::new();
                let mut lexed = true;

                for token in Scanner::new(&buf) {
                    match token {
                        Ok(token) => tokens.push(token),
                        Err(e) => {
                            lexed = false;

                            debug!("Lex error: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !lexed {
                    std::process::exit(65);
                }

                let statements: Vec<Stmt> = match Parser::new(&tokens).parse() {
                    Ok(statements) => statements,

                    Err(e) => {
                        debug!("Parse error: {}", e);

                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                };

                info!("Parsed {} statements", statements.len());

                let mut interpreter = Interpreter::new();

                // Resolution is whole-program-static and fail-closed: any
                // static error means the unit is never executed.
                if let Err(errors) = Resolver::new(&mut interpreter).resolve(&statements) {
                    for e in &errors {
                        debug!("Resolve error: {}", e);

                        eprintln!("{}", e);
                    }

                    std::process::exit(65);
                }

                match interpreter.interpret(&statements) {
                    Ok(()) => {
                        info!("Program executed successfully");
                    }

                    Err(e @ LoxError::Io(_)) => {
                        // Output channel failure, not a language error.
                        return Err(e.into());
                    }

                    Err(e) => {
                        debug!("Runtime error: {}", e);

                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },
    }

    Ok(())
}
