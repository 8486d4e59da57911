use anyhow::Context;
use custom_dns_domain::{Config, EndpointConfig};

pub fn load_config(config_path: Option<&str>) -> anyhow::Result<Config> {
    let config = Config::load(config_path)?;
    config.validate()?;
    Ok(config)
}

/// Compact `--server` forms, e.g. `tls://1.1.1.1#cloudflare-dns.com`.
pub fn parse_servers(servers: &[String]) -> anyhow::Result<Vec<EndpointConfig>> {
    servers
        .iter()
        .map(|s| {
            s.parse::<EndpointConfig>()
                .with_context(|| format!("invalid --server '{}'", s))
        })
        .collect()
}
