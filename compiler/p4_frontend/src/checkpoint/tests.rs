use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

use p4_ir::{Ir, NodeId};
use pretty_assertions::assert_eq;

use super::{DumpStreamFactory, MemoryDumpStreams, SharedDumpStreams, ToP4};
use crate::context::FrontendContext;
use crate::pass_manager::{apply_pass, PassError};

fn context() -> (FrontendContext, NodeId) {
    let mut ir = Ir::new();
    let b8 = ir.bits(8);
    let seven = ir.bits_lit(8, 7);
    let k = ir.constant_decl("K", b8, seven);
    let root = ir.program(vec![k]);
    (FrontendContext::new(ir), root)
}

fn shared(factory: impl DumpStreamFactory + 'static) -> SharedDumpStreams {
    let boxed: Box<dyn DumpStreamFactory> = Box::new(factory);
    Rc::new(RefCell::new(boxed))
}

#[test]
fn dumps_go_to_the_tagged_stream() {
    let (mut ctx, root) = context();
    let memory = MemoryDumpStreams::new();
    let mut pass = ToP4::new("mid", "-fe", shared(memory.clone()));

    assert_eq!(apply_pass(&mut pass, &mut ctx, root).ok(), Some(root));
    assert_eq!(memory.tags(), vec!["-fe".to_owned()]);
    assert_eq!(memory.get("-fe").as_deref(), Some("const bit<8> K = 8w7;\n"));
}

struct Nothing;

impl DumpStreamFactory for Nothing {
    fn open(&mut self, _tag: &str) -> Option<Box<dyn Write>> {
        None
    }
}

#[test]
fn missing_streams_skip_the_dump() {
    let (mut ctx, root) = context();
    let mut pass = ToP4::new("last", "-last", shared(Nothing));
    assert_eq!(apply_pass(&mut pass, &mut ctx, root).ok(), Some(root));
}

struct Broken;

impl Write for Broken {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::other("disk full"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct BrokenStreams;

impl DumpStreamFactory for BrokenStreams {
    fn open(&mut self, _tag: &str) -> Option<Box<dyn Write>> {
        Some(Box::new(Broken))
    }
}

#[test]
fn write_failures_are_fatal() {
    let (mut ctx, root) = context();
    let mut pass = ToP4::new("mid", "-fe", shared(BrokenStreams));
    match apply_pass(&mut pass, &mut ctx, root) {
        Err(PassError::Dump { tag, .. }) => assert_eq!(tag, "-fe"),
        other => panic!("expected a dump error, got {other:?}"),
    }
}
