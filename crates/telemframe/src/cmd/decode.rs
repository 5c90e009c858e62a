use std::fs;
use std::io::Read;

use telemframe_frame::{Message, ProtocolDecoder};

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{io_error, CliError, CliResult, SUCCESS};
use crate::output::{print_message, print_stats, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    if args.chunk == 0 {
        return Err(CliError::usage("--chunk must be greater than zero"));
    }

    let capture = read_capture(&args)?;
    let mut decoder = ProtocolDecoder::new(args.protocol);
    let messages = decode_chunked(&mut decoder, &capture, args.chunk);
    tracing::debug!(
        bytes = capture.len(),
        chunk = args.chunk,
        protocol = %args.protocol,
        messages = messages.len(),
        "decoded capture"
    );

    for message in &messages {
        print_message(message, format);
    }
    if decoder.buffered() > 0 {
        tracing::info!(
            buffered = decoder.buffered(),
            "capture ends inside an incomplete message"
        );
    }
    print_stats(&decoder.stats());

    Ok(SUCCESS)
}

fn read_capture(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }

    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(buf)
}

fn decode_chunked(decoder: &mut ProtocolDecoder, capture: &[u8], chunk: usize) -> Vec<Message> {
    capture
        .chunks(chunk)
        .flat_map(|piece| decoder.feed(piece))
        .collect()
}
