//! # custom-dns
//!
//! Resolves hostnames through the configured DNS servers with caching,
//! in-flight deduplication and ordered fallback.

mod bootstrap;
mod di;

use clap::Parser;
use custom_dns_domain::RecordType;
use di::{DnsServices, UseCases};
use futures::future::join_all;
use tracing::info;

#[derive(Parser)]
#[command(name = "custom-dns")]
#[command(version)]
#[command(about = "Resolve hostnames through user-chosen DNS servers")]
struct Cli {
    /// Configuration file (default: ./custom-dns.toml or /etc/custom-dns/custom-dns.toml)
    #[arg(short = 'c', long)]
    config: Option<String>,

    /// Server to use instead of the configured list, e.g. udp://1.1.1.1,
    /// tls://1.1.1.1#cloudflare-dns.com, https://1.1.1.1/dns-query. Repeatable.
    #[arg(short = 's', long = "server")]
    servers: Vec<String>,

    /// Record type to ask for
    #[arg(short = 't', long = "type", default_value = "A")]
    record_type: RecordType,

    /// Resolve everything this many times; later rounds hit the cache
    #[arg(short = 'r', long, default_value_t = 1)]
    repeat: u32,

    #[arg(required = true)]
    hostnames: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap::load_config(cli.config.as_deref())?;
    let cli_servers = bootstrap::parse_servers(&cli.servers)?;
    bootstrap::init_logging(&config);

    info!(
        config_file = cli.config.as_deref().unwrap_or("default"),
        servers = config.servers.len(),
        on_exhaustion = ?config.resolver.on_exhaustion,
        "Configuration loaded"
    );

    let dns = DnsServices::new(&config)?;
    let use_cases = UseCases::new(&config, &dns)?;

    if !cli_servers.is_empty() {
        let applied = use_cases.update_servers.execute(&cli_servers)?;
        info!(servers = applied, "Server list replaced from command line");
    }

    for round in 1..=cli.repeat.max(1) {
        if cli.repeat > 1 {
            println!("# round {}", round);
        }
        let lookups = cli
            .hostnames
            .iter()
            .map(|host| use_cases.resolve_host.execute(host, cli.record_type));
        let results = join_all(lookups).await;

        for (host, result) in cli.hostnames.iter().zip(results) {
            match result {
                Ok(addrs) if addrs.is_empty() => println!("{} {} (no addresses)", host, cli.record_type),
                Ok(addrs) => {
                    let joined = addrs.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
                    println!("{} {} {}", host, cli.record_type, joined);
                }
                Err(e) => println!("{} {} error: {}", host, cli.record_type, e),
            }
        }
    }

    if let Some(cache) = &dns.cache {
        let stats = cache.stats();
        println!(
            "# cache: entries={} hits={} misses={} hit_rate={:.2} evictions={} flushes={}",
            stats.entries,
            stats.hits,
            stats.misses,
            stats.hit_rate(),
            stats.evictions,
            stats.flushes
        );
    }
    let inflight = dns.resolver.inflight_stats();
    println!(
        "# in-flight: started={} joined={} overrides={}",
        inflight.started,
        inflight.joined,
        use_cases.overrides.len()
    );

    Ok(())
}
