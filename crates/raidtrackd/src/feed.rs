//! Line-framed event feed from the game-state detector

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Reads NDJSON lines from any async reader (stdin, a pipe, a socket)
pub struct EventFeed<R> {
    reader: BufReader<R>,
    line: String,
}

impl<R: AsyncRead + Unpin> EventFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line: String::new(),
        }
    }

    /// Wait for the next non-blank line. `None` once the feed is closed.
    pub async fn next_line(&mut self) -> std::io::Result<Option<String>> {
        loop {
            self.line.clear();
            let n = self.reader.read_line(&mut self.line).await?;
            if n == 0 {
                return Ok(None);
            }

            let trimmed = self.line.trim();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_string()));
            }
        }
    }

    /// Wait for the next line, then take every further complete line that
    /// is already buffered. The detector writes all messages of one tick in
    /// a single burst, so a burst is treated as one tick.
    pub async fn next_tick(&mut self) -> std::io::Result<Option<Vec<String>>> {
        let Some(first) = self.next_line().await? else {
            return Ok(None);
        };

        let mut tick = vec![first];
        while self.reader.buffer().contains(&b'\n') {
            self.line.clear();
            if self.reader.read_line(&mut self.line).await? == 0 {
                break;
            }
            let trimmed = self.line.trim();
            if !trimmed.is_empty() {
                tick.push(trimmed.to_string());
            }
        }

        Ok(Some(tick))
    }
}
