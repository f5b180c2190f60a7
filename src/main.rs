//! # media-reconcile CLI
//!
//! Command-line interface for the media reconciler.
//!
//! ## Usage
//! ```bash
//! media-reconcile /Volumes/card/DCIM --dest ~/Pictures/library
//! media-reconcile ~/import --dest ~/Pictures/library --move --dry-run
//! ```

mod cli;

use media_reconciler::Result;

fn main() -> Result<()> {
    cli::run()
}
