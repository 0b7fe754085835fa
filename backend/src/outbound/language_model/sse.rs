//! Incremental decoder for `text/event-stream` bodies.

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Buffers raw body chunks and yields complete events.
#[derive(Debug, Default)]
pub(super) struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    /// Append a chunk. Carriage returns are dropped so CRLF streams split
    /// like LF ones.
    pub(super) fn push(&mut self, chunk: &[u8]) {
        self.buffer
            .extend(chunk.iter().copied().filter(|byte| *byte != b'\r'));
    }

    /// Next complete event, if the buffer holds one.
    pub(super) fn next_event(&mut self) -> Option<SseEvent> {
        loop {
            let end = self.buffer.windows(2).position(|pair| pair == b"\n\n")?;
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(event) = parse_block(&String::from_utf8_lossy(&block)) {
                return Some(event);
            }
        }
    }
}

/// Blocks without `data` lines (comments, keep-alives) are skipped.
fn parse_block(block: &str) -> Option<SseEvent> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();
    for line in block.lines() {
        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => event = Some(value.to_owned()),
            "data" => data.push(value),
            _ => {}
        }
    }
    (!data.is_empty()).then(|| SseEvent {
        event,
        data: data.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_split_across_chunks_are_reassembled() {
        let mut decoder = SseDecoder::default();
        decoder.push(b"event: ping\nda");
        assert_eq!(decoder.next_event(), None);
        decoder.push(b"ta: {}\n\nevent: message_stop\r\ndata: {\"type\":\"message_stop\"}\r\n\r\n");

        assert_eq!(
            decoder.next_event(),
            Some(SseEvent {
                event: Some("ping".into()),
                data: "{}".into()
            })
        );
        assert_eq!(
            decoder.next_event().map(|event| event.data),
            Some("{\"type\":\"message_stop\"}".into())
        );
        assert_eq!(decoder.next_event(), None);
    }

    #[test]
    fn comments_are_skipped() {
        let mut decoder = SseDecoder::default();
        decoder.push(b": keep-alive\n\ndata: a\ndata: b\n\n");
        assert_eq!(
            decoder.next_event(),
            Some(SseEvent {
                event: None,
                data: "a\nb".into()
            })
        );
    }
}
