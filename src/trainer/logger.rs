use std::{
    fmt::Debug,
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Receives the losses produced while training.
pub trait Logger: Debug {
    fn epoch_loss(&mut self, epoch: u32, loss: f32);

    fn batch_loss(&mut self, epoch: u32, batch: u32, loss: f32);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockLogger;

impl Logger for MockLogger {
    fn epoch_loss(&mut self, _epoch: u32, _loss: f32) {}

    fn batch_loss(&mut self, _epoch: u32, _batch: u32, _loss: f32) {}
}

/// Writes the loss of every epoch on its own line.
#[derive(Debug)]
pub struct LogFile {
    file: PathBuf,
    writer: BufWriter<File>,
}

impl LogFile {
    pub fn new<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        Ok(Self {
            file: path.as_ref().to_owned(),
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}

impl Logger for LogFile {
    fn epoch_loss(&mut self, epoch: u32, loss: f32) {
        if let Err(e) = writeln!(self.writer, "{}\t{}", epoch, loss) {
            eprintln!(
                "Error while logging loss to file: {}\nError: {}",
                self.file.display(),
                e
            );
        }
    }

    fn batch_loss(&mut self, _epoch: u32, _batch: u32, _loss: f32) {}
}

/// Prints the loss of every `every`th epoch to stdout.
#[derive(Debug, Clone, Copy)]
pub struct StdoutLogger {
    every: u32,
}

impl StdoutLogger {
    /// `every` is clamped to at least one.
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
        }
    }

    fn should_log(&self, epoch: u32) -> bool {
        epoch % self.every == 0
    }
}

impl Logger for StdoutLogger {
    fn epoch_loss(&mut self, epoch: u32, loss: f32) {
        if self.should_log(epoch) {
            println!("Epoch {}:\tloss={}", epoch, loss);
        }
    }

    fn batch_loss(&mut self, _epoch: u32, _batch: u32, _loss: f32) {}
}
