//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// OpenTTD server helpers - content sync and shared ban lists
#[derive(Parser, Debug)]
#[command(name = "ottd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Helper settings file (TOML)
    #[arg(long, global = true, env = "OTTD_HELPER_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Prepare a writable server config before the game server starts
    ///
    /// Loads the read-only origin config, optionally merges a ban file into
    /// it and caches its NewGRFs, then saves it as
    /// `<destination>/openttd.cfg`.
    ///
    /// Examples:
    ///   ottd preinit --origin-config /etc/openttd/openttd.cfg --destination /config
    ///   ottd preinit --origin-config openttd.cfg --merge-bans /shared/bans.txt --sync-newgrfs
    Preinit {
        /// Config to copy from (usually read-only)
        #[arg(long, default_value = "openttd.cfg")]
        origin_config: PathBuf,

        /// Directory the writable openttd.cfg is created in
        #[arg(long, default_value = "/config")]
        destination: PathBuf,

        /// Merge bans from this shared ban file
        #[arg(long, value_name = "BAN_FILE")]
        merge_bans: Option<PathBuf>,

        /// Download the NewGRFs listed in the config
        #[arg(long)]
        sync_newgrfs: bool,

        /// Remove a leftover ban file lock before merging
        #[arg(long, requires = "merge_bans")]
        break_stale_lock: bool,
    },

    /// Download any NewGRFs listed in a config that are not cached yet
    SyncContent {
        /// Server config (openttd.cfg)
        config: PathBuf,

        /// Content cache directory, created if missing
        content_dir: PathBuf,
    },

    /// Merge a shared ban file into a server config, in place
    MergeBans {
        /// Server config (openttd.cfg)
        config: PathBuf,

        /// Shared ban file, one entry per line
        ban_file: PathBuf,

        /// Also write the merged list back to the ban file
        #[arg(long)]
        write_back: bool,
    },

    /// Periodically export a server's bans to the shared ban file
    Sidecar {
        /// Server config (openttd.cfg)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Shared ban file
        #[arg(long)]
        ban_file: Option<PathBuf>,

        /// Seconds between rounds
        #[arg(long, value_name = "SECS")]
        interval: Option<u64>,

        /// Run a single round and exit
        #[arg(long)]
        once: bool,
    },
}
