use vantage::commands::{Engine, Outcome};
use std::io::{self, BufRead};
use std::process::ExitCode;

const DEFAULT_TT_MB: usize = 64;

struct Startup {
    tt_mb: usize,
    log_dir: Option<String>,
}

fn parse_args(args: &[String]) -> Result<Startup, String> {
    let mut tt_mb = DEFAULT_TT_MB;
    let mut log_dir = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--ttMbs" => {
                let value = iter.next().ok_or("--ttMbs requires a value")?;
                tt_mb = value.parse::<usize>().map_err(|_| format!("invalid --ttMbs value: {value}"))?;
            }
            "--log" => {
                let value = iter.next().ok_or("--log requires a directory")?;
                log_dir = Some(value.clone());
            }
            other => return Err(format!("unknown startup flag: {other}")),
        }
    }
    Ok(Startup { tt_mb, log_dir })
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let startup = match parse_args(&args) {
        Ok(s) => s,
        Err(msg) => {
            eprintln!("error: {msg}");
            return ExitCode::FAILURE;
        }
    };

    #[cfg(feature = "cli")]
    {
        let log_path = startup.log_dir.as_deref().unwrap_or("logs").to_string() + "/vantage.log";
        vantage::logger::init_logging(log_path, "info");
    }

    let mut engine = Engine::new(startup.tt_mb);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match engine.execute(line) {
            Ok(Outcome::Output(text)) => println!("{text}"),
            Ok(Outcome::Silent) => {}
            Ok(Outcome::Quit) => break,
            Err(e) => println!("error: {e}"),
        }
    }

    ExitCode::SUCCESS
}
