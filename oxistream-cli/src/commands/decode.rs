//! Decode command implementation.

use crate::utils::{create_progress_bar, input_len, open_input, open_output};
use oxistream::{ByteStream, Chain, ReaderStream, WriterStream, copy};
use std::path::Path;

pub fn cmd_decode(
    chain: &Chain,
    input: &Path,
    output: &Path,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_progress_bar(input_len(input).unwrap_or(0), progress);
    pb.set_message(format!("decoding [{chain}]"));

    let source = ReaderStream::new(pb.wrap_read(open_input(input)?));
    let mut decoder = chain.decoder(source)?;
    let mut sink = WriterStream::new(open_output(output)?);

    let written = copy(&mut decoder, &mut sink)?;
    // Closing checks any CRC trailer the copy did not reach.
    decoder.close()?;
    sink.close()?;
    pb.finish_and_clear();

    tracing::info!(chain = %chain, output = written, "decode finished");
    if progress {
        eprintln!("{} bytes decoded", written);
    }
    Ok(())
}
