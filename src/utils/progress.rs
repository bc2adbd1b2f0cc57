use std::io::{self, Write};

use indicatif::ProgressBar;
use tracing_subscriber::fmt::MakeWriter;

/// Log writer that hides the progress bar while a line is printed, so
/// every `tracing` event lands above the bar instead of through it.
#[derive(Clone)]
pub struct ProgressLogWriter<M> {
    bar: ProgressBar,
    inner: M,
}

impl<M> ProgressLogWriter<M> {
    pub fn new(bar: ProgressBar, inner: M) -> Self {
        Self { bar, inner }
    }
}

pub struct SuspendingWriter<W> {
    bar: ProgressBar,
    inner: W,
}

impl<'a, M: MakeWriter<'a>> MakeWriter<'a> for ProgressLogWriter<M> {
    type Writer = SuspendingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendingWriter {
            bar: self.bar.clone(),
            inner: self.inner.make_writer(),
        }
    }
}

impl<W: Write> Write for SuspendingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        let inner = &mut self.inner;
        self.bar.suspend(|| inner.flush())
    }
}
