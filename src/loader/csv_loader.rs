use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, warn};
use crate::hash_table::{Bid, ChainedHashTable, KeyHasher};

/// Column positions in the eBid monthly sales export
const TITLE_COLUMN: usize = 0;
const BID_ID_COLUMN: usize = 1;
const AMOUNT_COLUMN: usize = 4;
const FUND_COLUMN: usize = 8;

/// Custom error type for CSV loading
#[derive(Debug)]
pub enum LoadError {
    Io(std::io::Error),
    MissingHeader(String),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "IO error: {}", e),
            LoadError::MissingHeader(path) => write!(f, "'{}' has no header row", path),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io(e) => Some(e),
            LoadError::MissingHeader(_) => None,
        }
    }
}

impl From<std::io::Error> for LoadError {
    fn from(error: std::io::Error) -> Self {
        LoadError::Io(error)
    }
}

/// Outcome of a load: rows handed to the table and rows rejected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// Reads bids from a CSV export and inserts each one into the table
/// The first line is treated as a header; short rows and rows without a bid id are skipped
pub fn load_bids<P, H>(path: P, table: &mut ChainedHashTable<H>) -> Result<LoadSummary, LoadError>
where
    P: AsRef<Path>,
    H: KeyHasher,
{
    let path = path.as_ref();
    info!("Loading CSV file {}", path.display());

    let mut reader = BufReader::new(File::open(path)?);
    let mut buf = Vec::new();
    let header = match read_row(&mut reader, &mut buf)? {
        Some(line) => line,
        None => return Err(LoadError::MissingHeader(path.display().to_string())),
    };
    debug!(header = %split_csv_line(&header).join(" | "), "CSV header");

    let mut summary = LoadSummary::default();
    // Line 1 is the header
    let mut line_number = 1;
    while let Some(line) = read_row(&mut reader, &mut buf)? {
        line_number += 1;
        if line.trim().is_empty() {
            continue;
        }

        match parse_bid(&line) {
            Some(bid) => {
                table.insert(bid);
                summary.inserted += 1;
            }
            None => {
                warn!(line = line_number, "Skipping malformed row");
                summary.skipped += 1;
            }
        }
    }

    info!("Loaded {} bids ({} rows skipped)", summary.inserted, summary.skipped);
    Ok(summary)
}

/// Reads the next line without its line ending, or None at end of file
/// Bytes that are not UTF-8 (e.g. Windows-1252 accents) become U+FFFD instead of failing the load
fn read_row<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> std::io::Result<Option<String>> {
    buf.clear();
    if reader.read_until(b'\n', buf)? == 0 {
        return Ok(None);
    }
    if buf.ends_with(b"\n") {
        buf.pop();
    }
    if buf.ends_with(b"\r") {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

/// Builds a bid from one data row, or None if the row is too short or has no id
fn parse_bid(line: &str) -> Option<Bid> {
    let fields = split_csv_line(line);
    if fields.len() <= FUND_COLUMN {
        return None;
    }

    let bid_id = fields[BID_ID_COLUMN].trim();
    if bid_id.is_empty() {
        return None;
    }

    Some(Bid {
        bid_id: bid_id.to_string(),
        title: fields[TITLE_COLUMN].clone(),
        fund: fields[FUND_COLUMN].clone(),
        amount: parse_amount(&fields[AMOUNT_COLUMN]),
    })
}

/// Parses a currency cell such as "$1,234.50"
/// Thousands separators are honoured; a cell with trailing junk like "12abc" is rejected
/// as a whole and becomes 0.0 rather than its numeric prefix
pub fn parse_amount(raw: &str) -> f64 {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return 0.0;
    }
    match cleaned.parse::<f64>() {
        Ok(amount) => amount,
        Err(_) => {
            warn!(amount = raw, "Unparsable amount, using 0");
            0.0
        }
    }
}

/// Splits one CSV line on commas, honouring double-quoted fields and "" escapes
/// Works a line at a time, so a quoted field containing a newline is not supported
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    fields.push(field);
    fields
}
