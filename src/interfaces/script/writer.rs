use crate::domain::operation::RequestCode;
use crate::error::Result;
use crate::interfaces::host::Reply;
use serde::Serialize;
use std::io::Write;

/// The reply to one scripted invocation.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRecord {
    /// 1-based position of the invocation in the script.
    pub call: usize,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_code: Option<RequestCode>,
    pub reply: Reply,
}

/// Writes reply records as JSON lines.
pub struct ReplyWriter<W: Write> {
    writer: W,
}

impl<W: Write> ReplyWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_record(&mut self, record: &ReplyRecord) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    pub fn write_records(&mut self, records: impl IntoIterator<Item = ReplyRecord>) -> Result<()> {
        for record in records {
            self.write_record(&record)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
