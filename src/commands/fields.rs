use anyhow::Result;
use tasksync_core::ProviderKind;

use crate::provider::mapper_for;

/// Print a provider's mapping table.
pub fn run(provider: &str) -> Result<()> {
    let kind: ProviderKind = provider.parse()?;
    let mapper = mapper_for(kind);

    println!("Field mapping for {}:\n", kind);
    println!("    {:<14} {:<20} {:<16} transforms", "internal", "external", "policy");

    for entry in mapper.entries() {
        let policy = if entry.preserve_local_value {
            "local only"
        } else if mapper.provider_owned().contains(&entry.internal_field) {
            "provider owned"
        } else {
            "sync"
        };

        let transforms = match (entry.to_external.is_some(), entry.to_internal.is_some()) {
            (true, true) => "out, in",
            (true, false) => "out",
            (false, true) => "in",
            (false, false) => "-",
        };

        println!(
            "    {:<14} {:<20} {:<16} {}",
            entry.internal_field.name(),
            entry.external_field,
            policy,
            transforms
        );
    }

    Ok(())
}
