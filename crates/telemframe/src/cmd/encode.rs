use telemframe_frame::FrameEncoder;

use crate::cmd::{parse_hex, EncodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = resolve_payload(&args)?;
    let encoder = if args.data_prefix {
        FrameEncoder::data()
    } else {
        FrameEncoder::command()
    };

    let wire = encoder
        .encode(args.identifier, &payload)
        .map_err(|err| frame_error("encode failed", err))?;
    print_encoded(&wire, format);

    Ok(SUCCESS)
}

fn resolve_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex);
    }
    Ok(args
        .text
        .as_deref()
        .map(|text| text.as_bytes().to_vec())
        .unwrap_or_default())
}
