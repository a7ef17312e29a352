// Command line for the termgrid host binary.

use std::path::PathBuf;

use clap::Parser;
use termgrid_core::KindFilter;

#[derive(Debug, Parser)]
#[command(name = "termgrid")]
#[command(about = "Build a terminal grid workspace from settings and print its blocks")]
#[command(version)]
pub struct Cli {
    /// Print the text dump instead of JSON
    #[arg(long)]
    pub text: bool,

    /// Only list terminal blocks
    #[arg(long, conflicts_with = "trenches")]
    pub terminals: bool,

    /// Only list trench blocks
    #[arg(long)]
    pub trenches: bool,

    /// Write default settings to FILE and build from them
    #[arg(long, value_name = "FILE")]
    pub init: Option<PathBuf>,
}

impl Cli {
    pub fn filter(&self) -> Option<KindFilter> {
        if self.terminals {
            Some(KindFilter::Terminal)
        } else if self.trenches {
            Some(KindFilter::Trench)
        } else {
            None
        }
    }
}
