//! Newline-delimited JSON action feed.

use futures::{Stream, StreamExt, future};
use popularity_ranking::ContentAction;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_stream::wrappers::SplitStream;
use tracing::warn;

/// Stream of valid actions read line by line. Blank lines and `#` comments are ignored;
/// malformed lines, including ones that are not UTF-8, are logged and skipped. Ends at EOF
/// or on a read error.
pub(crate) fn actions<R>(reader: R) -> impl Stream<Item = ContentAction>
where
    R: AsyncBufRead + Unpin,
{
    SplitStream::new(reader.split(b'\n'))
        .take_while(|line| {
            if let Err(err) = line {
                warn!(%err, "stopped reading actions");
            }
            future::ready(line.is_ok())
        })
        .enumerate()
        .filter_map(|(index, line)| {
            let line_no = index + 1;
            let action = line.ok().and_then(|bytes| match String::from_utf8(bytes) {
                Ok(line) => parse_line(line_no, &line),
                Err(err) => {
                    warn!(line_no, %err, "skipping non UTF-8 line");
                    None
                }
            });
            future::ready(action)
        })
}

pub(crate) fn parse_line(line_no: usize, line: &str) -> Option<ContentAction> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    match serde_json::from_str(line) {
        Ok(action) => Some(action),
        Err(err) => {
            warn!(line_no, %err, "skipping invalid action");
            None
        }
    }
}
