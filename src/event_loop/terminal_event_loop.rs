use std::io::{self, BufRead, BufReader, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::time::Instant;
use mio::{Events, Interest, Poll, Token};
use mio::unix::SourceFd;
use tracing::{debug, warn};
use bid_table::{load_bids, Bid, ChainedHashTable};
use crate::event_loop::{EventLoop, Session};

pub struct TerminalEventLoop;

const STDIN_TOKEN: Token = Token(0);

impl EventLoop for TerminalEventLoop {
    fn run(&mut self, table: &mut ChainedHashTable, session: &Session) -> io::Result<()> {
        let mut poll = Poll::new()?;
        let mut events = Events::with_capacity(128);

        let mut stdout = io::stdout();
        show_menu(&mut stdout)?;
        prompt(&mut stdout)?;

        let fd = io::stdin().as_raw_fd();
        let mut stdin_fd = SourceFd(&fd);
        // epoll refuses regular files, e.g. `bid_table < commands.txt`
        if let Err(e) = poll.registry().register(&mut stdin_fd, STDIN_TOKEN, Interest::READABLE) {
            warn!("stdin cannot be polled ({}), reading it directly", e);
            return run_blocking(table, session, &mut stdout);
        }

        let mut reader = BufReader::new(io::stdin());
        let mut buffer = String::new();

        loop {
            match poll.poll(&mut events, None) {
                Ok(_) => (),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }

            for event in events.iter() {
                if event.token() != STDIN_TOKEN {
                    continue;
                }
                if drain_lines(&mut reader, &mut buffer, table, session, &mut stdout)? {
                    return Ok(());
                }
            }
        }
    }
}

/// Handles the line that made stdin readable plus any lines already buffered behind it
/// stdin stays blocking, so this stops as soon as the reader's buffer is empty instead of
/// reading again and waiting. Returns true when the session is over
fn drain_lines<R: Read, W: Write>(
    reader: &mut BufReader<R>,
    buffer: &mut String,
    table: &mut ChainedHashTable,
    session: &Session,
    out: &mut W,
) -> io::Result<bool> {
    loop {
        if reader.read_line(buffer)? == 0 {
            writeln!(out, "\nInput stream closed. Good bye.")?;
            return Ok(true);
        }
        let input = buffer.trim().to_string();
        buffer.clear();
        if !input.is_empty() {
            debug!(command = %input, "Handling command");
            if handle_command(&input, table, session, out)? {
                return Ok(true);
            }
        }
        prompt(out)?;
        if reader.buffer().is_empty() {
            return Ok(false);
        }
    }
}

/// Plain line-by-line loop for stdin that cannot be registered with the poller
fn run_blocking<W: Write>(
    table: &mut ChainedHashTable,
    session: &Session,
    out: &mut W,
) -> io::Result<()> {
    for line in io::stdin().lock().lines() {
        let input = line?;
        let input = input.trim();
        if !input.is_empty() && handle_command(input, table, session, out)? {
            return Ok(());
        }
        prompt(out)?;
    }
    writeln!(out, "\nInput stream closed. Good bye.")
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "\nEnter choice: ")?;
    out.flush()
}

/// Runs one menu command; returns true if the command was to exit
pub fn handle_command<W: Write>(
    input: &str,
    table: &mut ChainedHashTable,
    session: &Session,
    out: &mut W,
) -> io::Result<bool> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.is_empty() {
        return Ok(false);
    }
    let argument = parts.get(1).copied();

    match parts[0].to_lowercase().as_str() {
        "9" | "exit" | "quit" => {
            writeln!(out, "Good bye.")?;
            return Ok(true);
        }
        "1" | "load" => {
            let path = argument.map(Path::new).unwrap_or(session.csv_path.as_path());
            handle_load(table, path, out)?;
        }
        "2" | "list" => handle_list(table, out)?,
        "3" | "find" => handle_find(table, argument.unwrap_or(session.bid_id.as_str()), out)?,
        "4" | "remove" => handle_remove(table, argument.unwrap_or(session.bid_id.as_str()), out)?,
        "stats" => show_stats(table, out)?,
        "help" => show_menu(out)?,
        other if other.parse::<i64>().is_ok() => {
            writeln!(out, "✗ Error: {} is not a valid option.", other)?;
        }
        other => {
            writeln!(out, "✗ Unknown command: {}. Type 'help' for available commands.", other)?;
        }
    }
    Ok(false)
}

fn show_menu<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "+-------------------------------------------+")?;
    writeln!(out, "|      eBid Bidder HashTable System         |")?;
    writeln!(out, "+-------------------------------------------+")?;
    writeln!(out, "|   [1] load [path]    Load Bids            |")?;
    writeln!(out, "|   [2] list           Display All Bids     |")?;
    writeln!(out, "|   [3] find [id]      Find Bid             |")?;
    writeln!(out, "|   [4] remove [id]    Remove Bid           |")?;
    writeln!(out, "|       stats          Table Statistics     |")?;
    writeln!(out, "|   [9] exit           Exit                 |")?;
    writeln!(out, "+-------------------------------------------+")
}

fn display_bid<W: Write>(bid: &Bid, out: &mut W) -> io::Result<()> {
    writeln!(out, "{}: {} | {} | {}", bid.bid_id, bid.title, bid.amount, bid.fund)
}

fn report_time<W: Write>(started: Instant, out: &mut W) -> io::Result<()> {
    writeln!(out, "time: {:.6} seconds", started.elapsed().as_secs_f64())
}

fn handle_load<W: Write>(table: &mut ChainedHashTable, path: &Path, out: &mut W) -> io::Result<()> {
    let started = Instant::now();
    match load_bids(path, table) {
        Ok(summary) => {
            writeln!(
                out,
                "✓ Load complete: {} bids read, {} rows skipped",
                summary.inserted, summary.skipped
            )?;
        }
        Err(e) => {
            warn!("Load of {} failed: {}", path.display(), e);
            writeln!(out, "✗ Failed to load {}: {}", path.display(), e)?;
        }
    }
    report_time(started, out)
}

/// Prints every bid as: slot, id, title, amount, fund
fn handle_list<W: Write>(table: &ChainedHashTable, out: &mut W) -> io::Result<()> {
    for (slot, bid) in table {
        writeln!(out, "{}, {}, {}, {}, {}", slot, bid.bid_id, bid.title, bid.amount, bid.fund)?;
    }
    Ok(())
}

fn handle_find<W: Write>(table: &ChainedHashTable, bid_id: &str, out: &mut W) -> io::Result<()> {
    let started = Instant::now();
    let found = table.search(bid_id);
    match found {
        Some(bid) => {
            writeln!(out, "✓ Bid found!")?;
            display_bid(bid, out)?;
        }
        None => writeln!(out, "✗ Bid Id {} not found.", bid_id)?,
    }
    report_time(started, out)
}

fn handle_remove<W: Write>(
    table: &mut ChainedHashTable,
    bid_id: &str,
    out: &mut W,
) -> io::Result<()> {
    if table.search(bid_id).is_none() {
        return writeln!(out, "✗ Bid Id {} not found; nothing removed.", bid_id);
    }
    table.remove(bid_id);
    writeln!(out, "✓ Removed Bid Id {}.", bid_id)
}

fn show_stats<W: Write>(table: &ChainedHashTable, out: &mut W) -> io::Result<()> {
    writeln!(out, "=== Table Statistics ===")?;
    writeln!(out, "  Bids stored:    {}", table.len())?;
    writeln!(out, "  Buckets:        {}", table.bucket_count())?;
    writeln!(out, "  Occupied slots: {}", table.occupied_slots())?;
    writeln!(out, "  Load factor:    {:.3}", table.load_factor())
}
