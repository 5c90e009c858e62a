use telemframe_frame::FrameWriter;
use telemframe_transport::{SerialConfig, SerialStream};

use crate::cmd::SendArgs;
use crate::exit::{frame_error, transport_error, CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let config = SerialConfig::with_baud_rate(args.baud);
    let stream = SerialStream::open(args.port.as_str(), &config)
        .map_err(|err| transport_error("open failed", err))?;

    let mut writer = FrameWriter::with_protocol(stream, args.protocol);
    writer
        .send_command(args.command)
        .map_err(|err| frame_error("send failed", err))?;
    tracing::info!(port = %args.port, command = %args.command, "command sent");

    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "port": args.port,
                "command": args.command.as_str(),
                "protocol": args.protocol.as_str(),
                "baud": args.baud,
            })
        ),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("sent {} to {} ({})", args.command, args.port, args.protocol)
        }
        OutputFormat::Raw => {}
    }

    Ok(SUCCESS)
}
