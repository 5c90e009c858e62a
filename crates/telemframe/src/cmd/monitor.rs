use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use telemframe_frame::{
    Command as DeviceCommand, FrameError, FrameReader, FrameWriter, ProtocolDecoder,
};
use telemframe_transport::{SerialConfig, SerialStream};

use crate::cmd::{parse_duration, MonitorArgs};
use crate::exit::{frame_error, transport_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, print_stats, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let config = SerialConfig {
        baud_rate: args.baud,
        timeout: parse_duration(&args.read_timeout)?,
    };
    let stream = SerialStream::open(args.port.as_str(), &config)
        .map_err(|err| transport_error("open failed", err))?;

    let mut writer = if args.start {
        Some(
            FrameWriter::for_serial(&stream, args.protocol)
                .map_err(|err| frame_error("open writer failed", err))?,
        )
    } else {
        None
    };
    prepare_link(
        &mut SerialLink {
            stream: &stream,
            writer: writer.as_mut(),
        },
        args.start,
    )?;

    let mut reader = FrameReader::with_decoder(stream, ProtocolDecoder::new(args.protocol));

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;
    tracing::info!(port = %args.port, baud = args.baud, protocol = %args.protocol, "monitoring");

    let mut printed = 0usize;
    let mut outcome = Ok(SUCCESS);

    while running.load(Ordering::SeqCst) {
        let message = match reader.read_frame() {
            Ok(message) => message,
            Err(FrameError::Io(err)) if err.kind() == ErrorKind::TimedOut => continue,
            Err(FrameError::ConnectionClosed) => {
                tracing::info!("port closed");
                break;
            }
            Err(err) => {
                outcome = Err(frame_error("read failed", err));
                break;
            }
        };

        print_message(&message, format);
        printed = printed.saturating_add(1);

        if args.count.is_some_and(|count| printed >= count) {
            break;
        }
    }

    if let Some(writer) = writer.as_mut() {
        if let Err(err) = writer.send_command(DeviceCommand::Stop) {
            tracing::warn!(error = %err, "failed to send stop");
        }
    }
    print_stats(&reader.decoder().stats());

    outcome
}

/// Steps taken on a freshly opened port before the first read.
trait LinkSetup {
    fn clear_input(&mut self) -> CliResult<()>;
    fn send_start(&mut self) -> CliResult<()>;
}

struct SerialLink<'a> {
    stream: &'a SerialStream,
    writer: Option<&'a mut FrameWriter<SerialStream>>,
}

impl LinkSetup for SerialLink<'_> {
    fn clear_input(&mut self) -> CliResult<()> {
        self.stream
            .clear_input()
            .map_err(|err| transport_error("clear input failed", err))
    }

    fn send_start(&mut self) -> CliResult<()> {
        match self.writer.as_mut() {
            Some(writer) => writer
                .send_command(DeviceCommand::Start)
                .map_err(|err| frame_error("send start failed", err)),
            None => Ok(()),
        }
    }
}

/// Stale driver input is dropped before START goes out, so the rig's first
/// replies are never flushed with it.
fn prepare_link<L: LinkSetup>(link: &mut L, start: bool) -> CliResult<()> {
    link.clear_input()?;
    if start {
        link.send_start()?;
    }
    Ok(())
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
