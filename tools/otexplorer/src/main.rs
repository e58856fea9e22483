//! OpenTherm gateway explorer
//!
//! Talks to an OpenTherm boiler through the transparent-command interface
//! of a Nevoton BCG-1.0.2-W gateway, over MQTT (Wirenboard control topics)
//! or directly over Modbus-RTU.

mod cli;
mod client;
mod shell;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use otlink::{ExchangeTransport, ModbusExchange, MqttExchange, MqttSettings, SerialSettings};

use crate::cli::{Cli, Command};
use crate::client::{ExplorerClient, OpResult};

fn init_logging(args: &Cli) -> anyhow::Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    let registry = tracing_subscriber::registry().with(filter);

    let mut guard = None;
    let file_layer = match &args.logfile {
        Some(path) => {
            let file = std::fs::File::create(path)?;
            let (writer, g) = tracing_appender::non_blocking(file);
            guard = Some(g);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false),
            )
        }
        None => None,
    };
    let console_layer = if args.console || args.logfile.is_none() {
        Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    } else {
        None
    };
    registry.with(file_layer).with(console_layer).init();
    Ok(guard)
}

fn build_transport(args: &Cli) -> Option<Box<dyn ExchangeTransport>> {
    if let Some(device) = &args.device {
        let mut settings = MqttSettings::new(args.host.clone(), args.port, device.clone());
        settings.username = args.username.clone();
        settings.password = args.password.clone();
        return Some(Box::new(MqttExchange::new(settings)));
    }
    if let Some(serial) = &args.serial {
        let settings = SerialSettings::new(serial.clone(), args.address);
        return Some(Box::new(ModbusExchange::new(settings)));
    }
    None
}

async fn run(args: &Cli, client: &mut ExplorerClient) -> OpResult {
    match &args.command {
        Command::Read { spec } => client.read(spec).await,
        Command::Write { id, value } => client.write(*id, value).await,
        Command::ReadTsp { range } => client.read_tsp(range.as_deref()).await,
        Command::WriteTsp { id, value } => client.write_tsp(*id, value).await,
        Command::ReadErr { index } => client.read_err(index.as_deref()).await,
        Command::Scan => client.scan().await,
        Command::FullScan { range } => client.full_scan(range.as_deref()).await,
        Command::Shell => {
            shell::run(client).await;
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    let _log_guard = match init_logging(&args) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {e}", "Error!".red());
            std::process::exit(1);
        }
    };

    let Some(mut transport) = build_transport(&args) else {
        eprintln!(
            "{} either --device (MQTT) or --serial (Modbus-RTU) must be given",
            "Error!".red()
        );
        std::process::exit(1);
    };
    if let Err(e) = transport.connect().await {
        eprintln!("{} {e}", "Error!".red());
        std::process::exit(1);
    }

    let mut client = ExplorerClient::new(transport, args.verbose, args.retry);
    let outcome = run(&args, &mut client).await;
    client.transport_mut().disconnect().await;

    match outcome {
        Ok(()) => std::process::exit(0),
        Err(failure) => {
            eprintln!("{} {}", "Error!".red(), failure.message);
            std::process::exit(-failure.code);
        }
    }
}
