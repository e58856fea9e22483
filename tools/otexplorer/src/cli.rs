//! Command-line definition

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "otexplorer",
    about = "Explore an OpenTherm boiler through a Nevoton BCG-1.0.2-W gateway",
    version
)]
pub struct Cli {
    /// Wirenboard MQTT device id of the gateway (enables the MQTT transport)
    #[arg(short = 't', long = "device", env = "OTEXPLORER_DEVICE")]
    pub device: Option<String>,

    /// MQTT broker host
    #[arg(long, default_value = "localhost", env = "OTEXPLORER_HOST")]
    pub host: String,

    /// MQTT broker port
    #[arg(short = 'p', long, default_value_t = 1883)]
    pub port: u16,

    /// MQTT username
    #[arg(short = 'u', long, env = "OTEXPLORER_USERNAME")]
    pub username: Option<String>,

    /// MQTT password
    #[arg(short = 'P', long, env = "OTEXPLORER_PASSWORD")]
    pub password: Option<String>,

    /// Serial port of the gateway (enables the Modbus-RTU transport)
    #[arg(short = 'm', long = "serial")]
    pub serial: Option<String>,

    /// Modbus station address of the gateway
    #[arg(short = 'a', long = "address", default_value_t = 11)]
    pub address: u8,

    /// Retry failed exchanges up to 5 times
    #[arg(short = 'r', long)]
    pub retry: bool,

    /// Decode and describe responses instead of printing terse values
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Enable debug-level logging
    #[arg(short = 'd', long)]
    pub debug: bool,

    /// Write the log to this file
    #[arg(short = 'l', long)]
    pub logfile: Option<PathBuf>,

    /// Also log to the console
    #[arg(short = 'c', long)]
    pub console: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read one data-id; SPEC is `<id>` or `<id>/<value>` for ids taking an
    /// input word
    Read { spec: String },

    /// Write a value to one data-id
    Write { id: u8, value: String },

    /// Read transparent slave parameters: one index, an `a-b` range, or all
    ReadTsp { range: Option<String> },

    /// Write one transparent slave parameter
    WriteTsp { id: u8, value: String },

    /// Read the fault history buffer: one index or all
    ReadErr { index: Option<String> },

    /// Read every data-id the dictionary marks readable
    Scan,

    /// Try reading every data-id in a range: `a-b`, `a` (a to 255), or all
    FullScan { range: Option<String> },

    /// Interactive shell
    Shell,
}
