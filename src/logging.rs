use env_logger::{Builder, Env, Target};
use std::fs::{File, OpenOptions};
use std::io::{self, Stdout, Write};
use std::path::Path;

/// Install the log backend for the binary
///
/// Verbosity comes from `RUST_LOG` (default `info`). When `log_file` is set,
/// every line is written to stdout and appended to that file.
pub fn init(log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    builder.format(|buf, record| writeln!(buf, "[{:>8}]: {}", record.level(), record.args()));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder.target(Target::Pipe(Box::new(Tee {
                stdout: io::stdout(),
                file,
            })));
        }
        None => {
            builder.target(Target::Stdout);
        }
    }

    builder.try_init().map_err(io::Error::other)
}

/// Writes everything to stdout and a file
struct Tee {
    stdout: Stdout,
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stdout.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()?;
        self.file.flush()
    }
}
