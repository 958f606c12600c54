//! `websafe serve`: the background event loop over JSON lines.
//!
//! Each stdin line is an [`InputLine`]; replies, badge updates and popup
//! requests come back on stdout as [`OutputLine`]s.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use websafe_core::{BackgroundService, HostEvent, MemoryStore, ServiceConfig};

use crate::exit_codes;
use crate::host::{InputLine, LineHost, OutputLine};

const EVENT_BUFFER: usize = 64;

pub async fn run(config: &ServiceConfig) -> anyhow::Result<i32> {
    let (out_tx, out_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_lines(out_rx, tokio::io::stdout()));

    let service = BackgroundService::start(
        config,
        Arc::new(LineHost::new(out_tx.clone())),
        Arc::new(MemoryStore::new()),
        Arc::new(MemoryStore::new()),
    )
    .await?;
    info!(service = %config.url, "serving host events on stdin");

    let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
    let running = tokio::spawn(service.run(events_rx));
    let mut replies = JoinSet::new();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let input = match serde_json::from_str::<InputLine>(&line) {
            Ok(input) => input,
            Err(e) => {
                warn!(error = %e, "ignoring malformed input line");
                continue;
            }
        };

        let event = into_event(input, &out_tx, &mut replies);
        if events_tx.send(event).await.is_err() {
            break;
        }
        while replies.try_join_next().is_some() {}
    }

    drop(events_tx);
    running.await?;
    while replies.join_next().await.is_some() {}

    // Detached quick analyses may still hold a host handle; the writer
    // drains once they finish.
    drop(out_tx);
    writer.await??;

    Ok(exit_codes::SUCCESS)
}

fn into_event(
    input: InputLine,
    out: &mpsc::UnboundedSender<OutputLine>,
    replies: &mut JoinSet<()>,
) -> HostEvent {
    match input {
        InputLine::TabUpdated {
            tab_id,
            url,
            status,
        } => HostEvent::TabUpdated {
            tab_id,
            url,
            status,
        },
        InputLine::Message { id: None, message } => HostEvent::Message {
            message,
            reply: None,
        },
        InputLine::Message {
            id: Some(id),
            message,
        } => {
            let (reply_tx, reply_rx) = oneshot::channel();
            let out = out.clone();
            replies.spawn(async move {
                // No reply for this action: the sender is dropped unanswered.
                if let Ok(Some(response)) = reply_rx.await {
                    let line = OutputLine::Reply {
                        id,
                        response: Some(response),
                    };
                    if out.send(line).is_err() {
                        debug!("output closed before reply");
                    }
                }
            });
            HostEvent::Message {
                message,
                reply: Some(reply_tx),
            }
        }
    }
}

async fn write_lines<W>(
    mut rx: mpsc::UnboundedReceiver<OutputLine>,
    mut writer: W,
) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(line) = rx.recv().await {
        let mut encoded = serde_json::to_vec(&line)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
    }
    Ok(())
}
