use std::io::{
    self,
    Write,
};

// Raw-mode terminals don't turn "\n" into a carriage return plus a line feed, so log lines would
// drift further right with every line unless we do it ourselves.
struct CrlfWriter<W>(W);

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for (i, chunk) in buf.split(|b| *b == b'\n').enumerate() {
            if i > 0 {
                self.0.write_all(b"\r\n")?;
            }
            self.0.write_all(chunk)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.flush()
    }
}

// The operator talks to us over stdout, so CLI logging always goes to stderr
pub fn setup_for_cli(env_filter: &str, raw_terminal: bool) {
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(env_filter)
        .without_time()
        .compact();

    if raw_terminal {
        builder.with_writer(|| CrlfWriter(io::stderr())).init();
    } else {
        builder.with_writer(io::stderr).init();
    }
}
