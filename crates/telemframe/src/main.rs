mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "telemframe", version, about = "Serial telemetry framing CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telemframe_frame::{Command as DeviceCommand, Protocol, CONTROL};

    #[test]
    fn parses_monitor_subcommand() {
        let cli = Cli::try_parse_from([
            "telemframe",
            "monitor",
            "/dev/ttyUSB0",
            "--baud",
            "9600",
            "--protocol",
            "legacy",
            "--start",
        ])
        .expect("monitor args should parse");

        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor");
        };
        assert_eq!(args.baud, 9600);
        assert_eq!(args.protocol, Protocol::Legacy);
        assert!(args.start);
        assert_eq!(args.count, None);
    }

    #[test]
    fn parses_send_subcommand() {
        let cli = Cli::try_parse_from(["telemframe", "send", "COM3", "STOP"])
            .expect("send args should parse");

        let Command::Send(args) = cli.command else {
            panic!("expected send");
        };
        assert_eq!(args.command, DeviceCommand::Stop);
        assert_eq!(args.protocol, Protocol::Binary);
        assert_eq!(args.baud, telemframe_transport::DEFAULT_BAUD_RATE);
    }

    #[test]
    fn rejects_unknown_command_word() {
        let err = Cli::try_parse_from(["telemframe", "send", "COM3", "reboot"])
            .expect_err("unknown command should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "telemframe",
            "encode",
            "--identifier",
            "control",
            "--text",
            "start",
            "--hex",
            "00",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn encode_identifier_accepts_names() {
        let cli = Cli::try_parse_from(["telemframe", "encode", "-i", "control", "--text", "x"])
            .expect("encode args should parse");
        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.identifier, CONTROL);
    }
}
