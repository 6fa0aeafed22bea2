//! Channel transport over a spawned evaluator subprocess's stdio.
//!
//! Spawning the evaluator process is explicitly outside `amcts-core`'s
//! scope; this is the orchestrator-side glue that turns a `Command` into an
//! `amcts_core::Channel`. Each message is encoded as 8 little-endian bytes,
//! widened to a 64-bit integer so large variable-ID spaces don't truncate.

use std::io::{Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use amcts_core::{Channel, ChannelError};

pub struct ProcessChannel {
    child: Child,
    stdin: ChildStdin,
    stdout: ChildStdout,
}

impl ProcessChannel {
    pub fn spawn(mut command: Command) -> std::io::Result<Self> {
        let mut child = command.stdin(Stdio::piped()).stdout(Stdio::piped()).spawn()?;
        let stdin = child.stdin.take().expect("piped stdin");
        let stdout = child.stdout.take().expect("piped stdout");
        Ok(Self { child, stdin, stdout })
    }
}

impl Channel for ProcessChannel {
    fn read(&mut self) -> Result<i64, ChannelError> {
        let mut buf = [0u8; 8];
        self.stdout.read_exact(&mut buf)?;
        Ok(i64::from_le_bytes(buf))
    }

    fn write(&mut self, msg: i64) -> Result<(), ChannelError> {
        self.stdin.write_all(&msg.to_le_bytes())?;
        self.stdin.flush()?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), ChannelError> {
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for ProcessChannel {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
