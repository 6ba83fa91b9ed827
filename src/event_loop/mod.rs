pub mod terminal_event_loop;

use std::io;
use std::path::PathBuf;
use bid_table::ChainedHashTable;

/// Defaults used when a menu command is given without an argument
#[derive(Debug, Clone)]
pub struct Session {
    pub csv_path: PathBuf,
    pub bid_id: String,
}

pub trait EventLoop {
    fn run(&mut self, table: &mut ChainedHashTable, session: &Session) -> io::Result<()>;
}
