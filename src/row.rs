use crate::config::TextEncoding;

use csv::{StringRecord, StringRecordsIntoIter};
use encoding_rs::{CoderResult, Decoder};
use serde::ser::{Serialize, Serializer};
use std::io::{self, Read};

const DECODE_CHUNK: usize = 8 * 1024;

/// One CSV line after the header, keyed by the exact header text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    fields: Vec<(String, String)>,
}

impl Row {
    pub fn new(fields: Vec<(String, String)>) -> Self {
        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn from_record(headers: &StringRecord, record: &StringRecord) -> Self {
        // Extra trailing fields have no column name and are dropped.
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        Self { fields }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter().map(|(k, v)| (k, v)))
    }
}

/// Pull-based stream of rows. Nothing past the current record is read until
/// the caller asks for the next one, and the file is closed when the stream
/// is dropped.
pub struct RowStream<R: Read> {
    headers: StringRecord,
    records: StringRecordsIntoIter<R>,
    next_line: u64,
}

impl<R: Read> RowStream<R> {
    pub fn from_reader(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);
        let headers = rdr.headers()?.clone();

        Ok(Self {
            headers,
            records: rdr.into_records(),
            // line 1 is the header
            next_line: 2,
        })
    }

    pub fn columns(&self) -> Vec<String> {
        self.headers.iter().map(str::to_string).collect()
    }
}

impl<R: Read> Iterator for RowStream<R> {
    type Item = Result<(u64, Row), csv::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };
            if is_blank(&record) {
                continue;
            }

            let line = self.next_line;
            self.next_line += 1;
            return Some(Ok((line, Row::from_record(&self.headers, &record))));
        }
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|field| field.trim().is_empty())
}

/// Header columns plus the first data row, used to preview a mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderPreview {
    pub columns: Vec<String>,
    pub first_row: Option<Row>,
}

/// Decodes any supported text encoding into UTF-8 as it is read, so the csv
/// reader always sees UTF-8 regardless of the source file.
pub struct DecodeReader<R> {
    inner: R,
    decoder: Decoder,
    input: Vec<u8>,
    output: String,
    pos: usize,
    finished: bool,
}

impl<R: Read> DecodeReader<R> {
    pub fn new(inner: R, encoding: TextEncoding) -> Self {
        Self {
            inner,
            decoder: encoding.encoding().new_decoder_with_bom_removal(),
            input: vec![0; DECODE_CHUNK],
            output: String::new(),
            pos: 0,
            finished: false,
        }
    }

    fn fill(&mut self) -> io::Result<()> {
        self.output.clear();
        self.pos = 0;

        let read = self.inner.read(&mut self.input)?;
        let last = read == 0;
        let needed = self
            .decoder
            .max_utf8_buffer_length(read)
            .unwrap_or(read * 3 + 4);
        self.output.reserve(needed);

        let mut src = &self.input[..read];
        loop {
            let (result, consumed, _) = self.decoder.decode_to_string(src, &mut self.output, last);
            src = &src[consumed..];
            match result {
                CoderResult::InputEmpty => break,
                CoderResult::OutputFull => self.output.reserve(DECODE_CHUNK),
            }
        }

        self.finished = last;
        Ok(())
    }
}

impl<R: Read> Read for DecodeReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.output.len() {
            if self.finished {
                return Ok(0);
            }
            self.fill()?;
        }

        let pending = &self.output.as_bytes()[self.pos..];
        let n = pending.len().min(buf.len());
        buf[..n].copy_from_slice(&pending[..n]);
        self.pos += n;
        Ok(n)
    }
}
