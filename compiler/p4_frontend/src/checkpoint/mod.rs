//! `ToP4` checkpoints: print the current tree to a dump stream.
//!
//! Streams come from a caller-provided [`DumpStreamFactory`], keyed by a tag.
//! A factory returning `None` for a tag disables that dump.

use std::cell::RefCell;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::rc::Rc;

use p4_ir::NodeId;
use tracing::debug;

use crate::context::FrontendContext;
use crate::pass_manager::{Analyses, Pass, PassError};

/// Opens the output stream of a checkpoint.
pub trait DumpStreamFactory {
    /// A writer for the dump tagged `tag`, or `None` to skip it.
    fn open(&mut self, tag: &str) -> Option<Box<dyn Write>>;
}

/// A factory shared by the checkpoints of one pipeline.
pub type SharedDumpStreams = Rc<RefCell<Box<dyn DumpStreamFactory>>>;

enum Sink {
    Streams(SharedDumpStreams),
    File(PathBuf),
}

/// Prints the tree; never changes it.
pub struct ToP4 {
    label: String,
    tag: String,
    sink: Sink,
}

impl ToP4 {
    /// A checkpoint writing to the stream `streams` opens for `tag`.
    pub fn new(label: impl Into<String>, tag: impl Into<String>, streams: SharedDumpStreams) -> Self {
        ToP4 {
            label: label.into(),
            tag: tag.into(),
            sink: Sink::Streams(streams),
        }
    }

    /// A checkpoint writing to the file at `path`.
    pub fn to_file(label: impl Into<String>, path: PathBuf) -> Self {
        ToP4 {
            label: label.into(),
            tag: path.display().to_string(),
            sink: Sink::File(path),
        }
    }

    fn open(&self) -> io::Result<Option<Box<dyn Write>>> {
        match &self.sink {
            Sink::Streams(streams) => Ok(streams.borrow_mut().open(&self.tag)),
            Sink::File(path) => {
                let file = File::create(path)?;
                Ok(Some(Box::new(BufWriter::new(file))))
            }
        }
    }
}

impl Pass for ToP4 {
    fn name(&self) -> &str {
        &self.label
    }

    fn invalidates(&self) -> Analyses {
        Analyses::empty()
    }

    fn run(&mut self, ctx: &mut FrontendContext, root: NodeId) -> Result<NodeId, PassError> {
        let dump_error = |source| PassError::Dump {
            tag: self.tag.clone(),
            source,
        };
        let Some(writer) = self.open().map_err(dump_error)? else {
            debug!(tag = %self.tag, "no stream; dump skipped");
            return Ok(root);
        };
        p4_fmt::write_p4(&ctx.ir, root, writer).map_err(dump_error)?;
        debug!(tag = %self.tag, "dumped");
        Ok(root)
    }
}

/// Keeps every dump in memory, keyed by tag.
///
/// Clones share their dumps, so a caller can keep one clone and hand the
/// other to the pipeline.
#[derive(Clone, Default)]
pub struct MemoryDumpStreams {
    dumps: Rc<RefCell<Vec<(String, Rc<RefCell<Vec<u8>>>)>>>,
}

impl MemoryDumpStreams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tags opened so far, in order.
    pub fn tags(&self) -> Vec<String> {
        self.dumps.borrow().iter().map(|(tag, _)| tag.clone()).collect()
    }

    /// Text of the last dump tagged `tag`.
    pub fn get(&self, tag: &str) -> Option<String> {
        let dumps = self.dumps.borrow();
        let (_, buffer) = dumps.iter().rev().find(|(t, _)| t == tag)?;
        let text = String::from_utf8_lossy(&buffer.borrow()).into_owned();
        Some(text)
    }
}

impl DumpStreamFactory for MemoryDumpStreams {
    fn open(&mut self, tag: &str) -> Option<Box<dyn Write>> {
        let buffer = Rc::new(RefCell::new(Vec::new()));
        self.dumps
            .borrow_mut()
            .push((tag.to_owned(), Rc::clone(&buffer)));
        Some(Box::new(SharedBuffer(buffer)))
    }
}

struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests;
