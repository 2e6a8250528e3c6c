use crate::menu::session::{Commit, CommitSink};
use std::io::Write;

/// Writes each committed document, one per line, to `W`.
pub struct WriterSink<W: Write> {
    out: W,
}

pub type StdoutSink = WriterSink<std::io::Stdout>;

impl<W: Write> WriterSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl StdoutSink {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> CommitSink for WriterSink<W> {
    fn publish(&mut self, commit: Commit) {
        log::debug!("Publishing {} ({} bytes)", commit.mime_type, commit.document.len());
        let written = writeln!(self.out, "{}", commit.document).and_then(|_| self.out.flush());
        if let Err(e) = written {
            log::error!("Failed to publish style: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::style::{STYLE_MIME_TYPE, StyleKey, StyleRecord, SvgDefs};

    #[test]
    fn test_writes_document_line() {
        let style = StyleRecord::standard([(StyleKey::Fill, "red")]);
        let document = style.clipboard_document(&SvgDefs::default());
        let mut sink = WriterSink::new(Vec::new());

        sink.publish(Commit {
            style,
            document: document.clone(),
            mime_type: STYLE_MIME_TYPE,
        });

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, format!("{document}\n"));
    }
}
