extern crate clap;

mod parser;

use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, trace};
use mbtest::{ClientSettings, HttpTransport, MbClient, Response};
use parser::{parse_body, parse_settings};
use serde_json::Value;
use std::error::Error;

const LOG_LEVEL: &str = "LOG_LEVEL";
const DEFAULT_LEVEL: &str = "INFO";

#[derive(Subcommand, Debug)]
enum MbCommand {
    /// Send a GET request to `path`.
    Get { path: String },
    /// Send a POST request to `path`, with the body read from `file`.
    Post {
        path: String,
        #[clap(short, long)]
        file: Option<String>,
    },
    /// Send a PUT request to `path`, with the body read from `file`.
    Put {
        path: String,
        #[clap(short, long)]
        file: Option<String>,
    },
    /// Send a DELETE request to `path`.
    Delete { path: String },
    /// Create the imposter defined in `file` (JSON, or TOML with a `.toml` extension).
    CreateImposter {
        #[clap(short, long)]
        file: String,
    },
    /// Tell whether `protocol` is served by an out-of-process implementation.
    IsOutOfProcess { protocol: String },
}

/// CLI to talk to a locally running imposter server.
#[derive(clap::Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct CliArgs {
    #[clap(subcommand)]
    cmd: MbCommand,
    /// Port of the server.<br>
    /// Default value: `MB_PORT` from the environment, else 2525
    #[clap(short, long)]
    port: Option<u16>,
    /// Path to a TOML settings file, e.g. 'mbtest.toml'
    #[clap(short, long)]
    config: Option<String>,
}

fn read_optional_body(file: Option<String>) -> Result<Option<Value>, parser::ParseError> {
    file.as_deref().map(parse_body).transpose()
}

fn print_response(response: &Response) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(response)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let log_level = std::env::var(LOG_LEVEL).unwrap_or_else(|_| DEFAULT_LEVEL.to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(&log_level)).init();

    let args = CliArgs::parse();

    let settings = match &args.config {
        Some(file_name) => parse_settings(file_name)?,
        None => ClientSettings::default(),
    };
    let config = settings.into_config(args.port)?;
    trace!("Initializing client with {:?}", &config);
    let client = MbClient::with_transport(config, HttpTransport::new()?);
    info!("Talking to {}", client.url());

    match args.cmd {
        MbCommand::Get { path } => print_response(&client.get(&path).await?)?,
        MbCommand::Post { path, file } => {
            let body = read_optional_body(file)?;
            print_response(&client.post(&path, body).await?)?
        }
        MbCommand::Put { path, file } => {
            let body = read_optional_body(file)?;
            print_response(&client.put(&path, body).await?)?
        }
        MbCommand::Delete { path } => print_response(&client.del(&path).await?)?,
        MbCommand::CreateImposter { file } => {
            let imposter = parse_body(&file)?;
            print_response(&client.try_create_imposter(imposter).await?)?
        }
        MbCommand::IsOutOfProcess { protocol } => {
            let out_of_process = client.is_out_of_process_imposter(&protocol).await?;
            println!("{}", out_of_process);
        }
    }

    trace!("Finished");
    Ok(())
}
