use clinic_staffing::data::CompareRequest;
use clinic_staffing::error::{SchedulerError, SchedulerResult};
use clinic_staffing::{compare, report, sample, server};
use std::process::ExitCode;

const USAGE: &str = "usage: clinic-staffing [--json] [REQUEST.json]\n       clinic-staffing serve [ADDR]";

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let outcome = match args.first().map(String::as_str) {
        Some("serve") => {
            let addr = args.get(1).map_or(server::DEFAULT_ADDR, String::as_str);
            server::run_server(addr).await
        }
        Some("-h" | "--help") => {
            println!("{USAGE}");
            Ok(())
        }
        _ => run_batch(&args),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_batch(args: &[String]) -> SchedulerResult<()> {
    let json = args.iter().any(|a| a == "--json");
    let request = match args.iter().find(|a| *a != "--json") {
        Some(path) => load_request(path)?,
        None => sample::request(),
    };

    let comparison = compare::run(&request)?;
    if json {
        println!("{}", report::render_json(&comparison)?);
    } else {
        print!("{}", report::render_text(&request.clinic, &comparison));
    }
    Ok(())
}

fn load_request(path: &str) -> SchedulerResult<CompareRequest> {
    let content = std::fs::read_to_string(path).map_err(|e| SchedulerError::Input {
        path: path.to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| SchedulerError::Input {
        path: path.to_string(),
        message: e.to_string(),
    })
}
