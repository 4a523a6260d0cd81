//! `tracing` output. The Worker has no stdout, so formatted events are handed
//! line by line to a sink function (`console_log!` there, a buffer in tests).

use std::io;

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Plain-text fmt subscriber at INFO. No timestamps: the Workers runtime
/// stamps console lines itself and `SystemTime` is unavailable on wasm32.
pub fn subscriber<W>(writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_max_level(Level::INFO)
        .with_target(false)
        .without_time()
        .finish()
}

#[derive(Clone, Copy)]
pub struct LineSink(fn(&str));

impl LineSink {
    pub fn new(emit: fn(&str)) -> Self {
        Self(emit)
    }
}

pub struct LineWriter(fn(&str));

impl<'a> MakeWriter<'a> for LineSink {
    type Writer = LineWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LineWriter(self.0)
    }
}

impl io::Write for LineWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            (self.0)(line);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
