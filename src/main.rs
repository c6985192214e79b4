use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use std::path::PathBuf;

use capmon::session::monitor::{SaveDialog, SessionMonitor};
use capmon::store::layout::SessionLayout;
use capmon::utils::logging;
use capmon::{ApplyOutcome, FilterConfig};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Monitoring session controller for an external packet-capture service")]
struct Args {
    /// Root directory holding the simulated networks
    #[clap(long, default_value = "networks")]
    networks_root: PathBuf,

    /// Numeric session identifier
    #[clap(short, long)]
    session: u64,

    /// Override the derived control endpoint URL
    #[clap(long)]
    endpoint: Option<String>,

    /// Log level (trace, debug, info, warn, error, off)
    #[clap(long, default_value = "info")]
    log_level: String,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the session's reconciled state
    Status,

    /// Start the capture
    Start,

    /// Stop the capture and reload the finalized output
    Stop,

    /// Show one page of captured records
    Show {
        /// Page number (1-based)
        #[clap(long, default_value = "1")]
        page: usize,

        /// Records per page
        #[clap(long, default_value = "100")]
        page_size: usize,
    },

    /// Save a filter configuration to the capture service
    SaveConfig(SaveConfigArgs),

    /// Delete the stored filter configuration
    ClearConfig,

    /// Export the capture archive
    Export {
        /// Destination file to copy the archive to
        #[clap(long)]
        dest: PathBuf,
    },
}

/// Filter fields, passed through to the service unvalidated.
#[derive(ClapArgs, Debug)]
struct SaveConfigArgs {
    /// Match either endpoint address
    #[clap(long)]
    ip: Option<String>,

    /// Match the source address only
    #[clap(long)]
    source_ip: Option<String>,

    /// Match the destination address only
    #[clap(long)]
    destination_ip: Option<String>,

    /// Match a MAC address
    #[clap(long)]
    mac_address: Option<String>,

    /// Match either endpoint port
    #[clap(long)]
    port: Option<String>,

    /// Match the source port only
    #[clap(long)]
    source_port: Option<String>,

    /// Match the destination port only
    #[clap(long)]
    destination_port: Option<String>,

    /// Comma-joined protocol set (tcp, udp, icmp, arp)
    #[clap(long)]
    protocol: Option<String>,

    /// Minimum frame length
    #[clap(long)]
    packet_size_min: Option<String>,

    /// Maximum frame length
    #[clap(long)]
    packet_size_max: Option<String>,

    /// Capture time window
    #[clap(long)]
    time_range: Option<String>,

    /// TCP flag criteria (requires tcp in --protocol)
    #[clap(long)]
    tcp_flags: Option<String>,

    /// UDP payload substring (requires udp in --protocol)
    #[clap(long)]
    payload_content: Option<String>,
}

impl From<SaveConfigArgs> for FilterConfig {
    fn from(args: SaveConfigArgs) -> Self {
        FilterConfig {
            ip: args.ip,
            source_ip: args.source_ip,
            destination_ip: args.destination_ip,
            mac_address: args.mac_address,
            port: args.port,
            source_port: args.source_port,
            destination_port: args.destination_port,
            protocol: args.protocol,
            packet_size_min: args.packet_size_min,
            packet_size_max: args.packet_size_max,
            time_range: args.time_range,
            tcp_flags: args.tcp_flags,
            payload_content: args.payload_content,
        }
    }
}

/// Non-interactive stand-in for the save-file dialog.
struct FixedDestination(PathBuf);

impl SaveDialog for FixedDestination {
    fn pick_destination(&mut self, _suggested_name: &str) -> Option<PathBuf> {
        Some(self.0.clone())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init(logging::parse_level(&args.log_level));
    info!("Starting capmon v{}", env!("CARGO_PKG_VERSION"));

    let mut layout = SessionLayout::new(&args.networks_root, args.session);
    if let Some(endpoint) = args.endpoint {
        layout = layout.with_endpoint(endpoint);
    }

    let mut monitor = SessionMonitor::new(layout)?;
    monitor.open().await?;

    match args.command {
        Command::Status => print_status(&monitor),
        Command::Start => {
            monitor.start_capture().await?;
            println!("capture started");
        }
        Command::Stop => {
            monitor.stop_capture().await?;
            println!(
                "capture stopped; {} records loaded",
                monitor.records().map_or(0, |r| r.len())
            );
        }
        Command::Show { page, page_size } => {
            monitor.set_page_size(page_size);
            monitor.set_page(page);
            print_page(&monitor);
        }
        Command::SaveConfig(fields) => {
            match monitor.save_config(fields.into()).await? {
                ApplyOutcome::Accepted => println!("filter config saved"),
                ApplyOutcome::CompiledWithWarning { message } => {
                    println!("filter config saved, but the filter failed to apply: {message}");
                    println!("showing unfiltered output until the config is fixed");
                }
            }
        }
        Command::ClearConfig => {
            monitor.clear_config().await?;
            println!("filter config cleared");
        }
        Command::Export { dest } => {
            let mut dialog = FixedDestination(dest);
            match monitor.export_archive(&mut dialog).await? {
                Some(path) => println!("archive exported to {}", path.display()),
                None => println!("export cancelled"),
            }
        }
    }

    Ok(())
}

fn print_status(monitor: &SessionMonitor) {
    println!("session:        {}", monitor.session_id());
    println!("filter config:  {}", if monitor.config_exists() { "present" } else { "absent" });
    match monitor.records() {
        Some(records) => println!("records loaded: {}", records.len()),
        None => println!("records loaded: none (no data yet)"),
    }
    println!(
        "archive:        {}",
        monitor.archive_file_name().unwrap_or("none")
    );
    if let Some(error) = monitor.last_config_error() {
        println!("filter warning: {error}");
    }
}

fn print_page(monitor: &SessionMonitor) {
    let Some(records) = monitor.records() else {
        println!("no capture data yet");
        return;
    };
    println!(
        "page {}/{} ({} records total)",
        monitor.page(),
        monitor.page_count(),
        records.len()
    );
    for record in monitor.page_records() {
        let s = record.summary();
        println!(
            "{:<30} {:<18} {:<18} {:<8} {:>8}",
            s.time, s.source, s.destination, s.message_type, s.length
        );
    }
}
