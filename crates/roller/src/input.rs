//! Line input
//!
//! Reads newline-delimited text and turns each line into a `Record`, split
//! into fields on the writer's field delimiter. Record ids are the zero-based
//! line numbers.
//!
//! Files are read through tokio. Stdin is read on a dedicated thread: a
//! blocking read there can never be cancelled, so it must not live on the
//! runtime's blocking pool, which the runtime waits for on shutdown. The
//! thread is detached and dies with the process.

use std::io::{self, BufRead};
use std::thread;

use anyhow::{Context, Result};
use bytes::Bytes;
use roller_sinks::{Record, RecordId};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc;

/// Where input lines come from
pub enum LineSource {
    /// Async reader driven on the runtime
    Reader(Lines<Box<dyn AsyncBufRead + Unpin + Send>>),

    /// Lines read by a detached thread
    Thread(mpsc::Receiver<io::Result<String>>),
}

impl LineSource {
    pub fn reader(reader: impl AsyncBufRead + Unpin + Send + 'static) -> Self {
        let reader: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(reader);
        Self::Reader(reader.lines())
    }

    /// Read the process's stdin on its own thread
    pub fn stdin(capacity: usize) -> io::Result<Self> {
        Self::spawn(io::stdin(), capacity)
    }

    /// Read `reader` line by line on a detached thread
    ///
    /// The thread stops at end of input, after the first read error, or once
    /// this source has been dropped and its next line has nowhere to go.
    pub fn spawn<R>(reader: R, capacity: usize) -> io::Result<Self>
    where
        R: io::Read + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(capacity.max(1));

        thread::Builder::new()
            .name("roller-input".into())
            .spawn(move || {
                for line in io::BufReader::new(reader).lines() {
                    let failed = line.is_err();
                    if tx.blocking_send(line).is_err() || failed {
                        break;
                    }
                }
            })?;

        Ok(Self::Thread(rx))
    }

    async fn next_line(&mut self) -> io::Result<Option<String>> {
        match self {
            Self::Reader(lines) => lines.next_line().await,
            Self::Thread(rx) => rx.recv().await.transpose(),
        }
    }
}

/// Turn one input line into a record
pub fn parse_line(id: u64, line: &str, delimiter: &str) -> Record {
    let fields = if delimiter.is_empty() {
        vec![Bytes::copy_from_slice(line.as_bytes())]
    } else {
        line.split(delimiter)
            .map(|field| Bytes::copy_from_slice(field.as_bytes()))
            .collect()
    };
    Record::new(RecordId::new(id), fields)
}

/// Feed every line of `source` into the sink channel
///
/// Returns the number of records sent. Stops early if the sink has gone away.
/// Dropping the future drops `sender`, even while the source is waiting on
/// an idle input.
pub async fn feed(
    mut source: LineSource,
    delimiter: &str,
    sender: mpsc::Sender<Record>,
) -> Result<u64> {
    let mut sent = 0u64;

    while let Some(line) = source.next_line().await.context("failed to read input")? {
        let line = line.strip_suffix('\r').unwrap_or(&line);
        if sender.send(parse_line(sent, line, delimiter)).await.is_err() {
            tracing::warn!(sent, "sink stopped before input was exhausted");
            break;
        }
        sent += 1;
    }

    Ok(sent)
}
