//! Encode command implementation.

use crate::utils::{
    CountingWriter, create_progress_bar, input_len, open_input, open_output, space_savings,
};
use oxistream::{ByteStream, Chain, ReaderStream, WriterStream, copy};
use std::path::Path;

pub fn cmd_encode(
    chain: &Chain,
    input: &Path,
    output: &Path,
    progress: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = create_progress_bar(input_len(input).unwrap_or(0), progress);
    pb.set_message(format!("encoding [{chain}]"));

    let mut source = ReaderStream::new(pb.wrap_read(open_input(input)?));
    let mut sink = WriterStream::new(CountingWriter::new(open_output(output)?));

    let read = {
        let mut encoder = chain.encoder(&mut sink)?;
        let read = copy(&mut source, &mut encoder)?;
        encoder.close()?;
        read
    };
    let written = sink.get_ref().count();
    pb.finish_and_clear();

    tracing::info!(
        chain = %chain,
        input = read,
        output = written,
        "encode finished"
    );
    if progress {
        eprintln!(
            "{} -> {} bytes ({:.1}% saved)",
            read,
            written,
            space_savings(read, written)
        );
    }
    Ok(())
}
