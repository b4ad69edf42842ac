use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "College records REST service")]
pub struct Config {
    /// Address the HTTP listener binds to.
    #[arg(long, default_value = "127.0.0.1")]
    pub bind: String,

    /// Port the HTTP listener binds to.
    #[arg(long, default_value_t = 5000)]
    pub port: u16,

    /// Directory holding the SQLite store. Created if missing.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,
}
