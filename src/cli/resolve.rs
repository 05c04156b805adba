use super::harness::Harness;
use anyhow::Result;

/// Prints the URL a service is currently reachable at
pub fn run(service: &str, harness: &Harness) -> Result<()> {
    let address = harness.resolver().resolve(service)?;
    println!("{}", address.url());
    Ok(())
}
