use std::io::Write;
use std::net::Ipv4Addr;

use bgpkit_routegen::encoder::SystemClock;
use bgpkit_routegen::generator::*;
use bgpkit_routegen::models::{AsPath, RootAsPolicy};
use bgpkit_routegen::GeneratorError;
use clap::{ArgAction, Parser};
use env_logger::Env;
use serde_json::json;

/// bgpkit-routegen generates BGP UPDATE messages and MRT table dumps for testing BGP speakers and
/// collectors.
#[derive(Parser, Debug)]
#[clap(name = "bgpkit-routegen", version, about)]
struct Opts {
    /// Enable debug logging
    #[clap(long)]
    debug: bool,

    /// Increment the root AS (the last AS of the path) between messages
    #[clap(long)]
    root_as_inc: bool,

    /// Modulus applied to the incremented root AS, 0 for none
    #[clap(long, default_value_t = 0)]
    root_as_mod: u32,

    /// Comma separated list of AS numbers
    #[clap(long, default_value = "20")]
    aspath: AsPath,

    /// Maximum number of prefixes to generate
    #[clap(short, long, default_value_t = 0xFFFF_FFFF)]
    max_routes: u64,

    /// Maximum number of prefixes per UPDATE message
    #[clap(long, default_value_t = 0xFFFF)]
    max_pack: u32,

    /// Peers of the table dump in form BGPID,PEERIP,PEERAS, space separated or repeated
    #[clap(short, long, action = ArgAction::Append)]
    peers: Vec<String>,

    /// BGP ID of the collector in the table dump
    #[clap(long, default_value = "10.0.0.1")]
    collector_id: Ipv4Addr,

    /// View name of the table dump
    #[clap(long, default_value = "view")]
    view_name: String,

    /// File to write the MRT table dump into, `-` for stdout
    #[clap(short, long)]
    tabledump: Option<String>,

    /// File to write BGP updates into, `-` for stdout
    #[clap(short, long)]
    update: Option<String>,

    /// Print the run summary as JSON
    #[clap(long)]
    json: bool,

    /// PREFIX SUBLEN NEXTHOP triples
    #[clap(name = "TUPLES")]
    tuples: Vec<String>,
}

fn open_output(path: &str) -> Result<Box<dyn Write>, String> {
    match path {
        "-" => Ok(Box::new(std::io::stdout().lock())),
        _ => oneio::get_writer(path).map_err(|e| format!("cannot open {}: {}", path, e)),
    }
}

fn run(opts: Opts) -> Result<(), String> {
    if opts.update.as_deref() == Some("-") && opts.tabledump.as_deref() == Some("-") {
        return Err(GeneratorError::ConflictingOutputs.to_string());
    }

    let config = GeneratorConfig {
        routes: RouteSpec::parse_all(&opts.tuples).map_err(|e| e.to_string())?,
        as_path: opts.aspath,
        root_as: RootAsPolicy::new(opts.root_as_inc, opts.root_as_mod),
        max_routes: opts.max_routes,
        max_pack: opts.max_pack,
    };
    config.validate().map_err(|e| e.to_string())?;

    let mut summary = json!({});

    if let Some(path) = &opts.update {
        let mut writer = open_output(path)?;
        let updates = generate_updates(&mut writer, &config).map_err(|e| e.to_string())?;
        if opts.json {
            summary["updates"] = json!(updates);
        } else {
            eprintln!(
                "Wrote {} BGP updates with {} total NLRI",
                updates.updates, updates.prefixes
            );
        }
    }

    if let Some(path) = &opts.tabledump {
        let peers = opts
            .peers
            .iter()
            .flat_map(|p| p.split_whitespace())
            .map(str::parse::<PeerSpec>)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.to_string())?;
        let table_dump = TableDumpConfig {
            collector_bgp_id: opts.collector_id,
            view_name: opts.view_name.clone(),
            peers,
            ..Default::default()
        };

        let mut writer = open_output(path)?;
        let dump = generate_table_dump(&mut writer, &config, &table_dump, SystemClock)
            .map_err(|e| e.to_string())?;
        if opts.json {
            summary["table_dump"] = json!(dump);
        } else {
            eprintln!(
                "Wrote {} RIB entries, next sequence number {}",
                dump.rib_entries, dump.next_sequence_number
            );
        }
    }

    if opts.json {
        eprintln!("{}", summary);
    }
    Ok(())
}

fn main() {
    let opts: Opts = Opts::parse();

    let default_filter = if opts.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    if let Err(e) = run(opts) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
