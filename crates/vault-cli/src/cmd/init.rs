use anyhow::Context;
use std::path::Path;
use vault_core::{config::Config, io, paths, Vault};

use crate::output::print_json;

pub fn run(root: &Path, no_seed: bool, json: bool) -> anyhow::Result<()> {
    let dir = paths::vault_dir(root);
    io::ensure_dir(&dir).with_context(|| format!("failed to create {}", dir.display()))?;

    let config_path = paths::config_path(root);
    let created_config = !config_path.exists();
    let config = if created_config {
        let cfg = Config {
            seed_defaults: !no_seed,
            ..Config::default()
        };
        cfg.save(root).context("failed to write config.yaml")?;
        cfg
    } else {
        Config::load(root).context("failed to read config.yaml")?
    };

    let db_path = config.database_path(root);
    let mut vault = Vault::open(&db_path)
        .with_context(|| format!("failed to open {}", db_path.display()))?;
    let report = if config.seed_defaults {
        vault.seed_defaults()?
    } else {
        vault_core::seed::SeedReport {
            user: vault.ensure_default_user()?,
            ..Default::default()
        }
    };

    if json {
        return print_json(&serde_json::json!({
            "root": root,
            "config_created": created_config,
            "database": db_path,
            "seeded": report,
        }));
    }

    println!("Initializing cmdvault in: {}", root.display());
    let status = if created_config { "created" } else { "exists" };
    println!("  {status}: {}", paths::CONFIG_FILE);
    println!("  database: {}", db_path.display());
    if report.user {
        println!(
            "  created user '{}' (change the password with `cmdvault passwd`)",
            vault_core::auth::DEFAULT_USERNAME
        );
    }
    if report.commands > 0 || report.tags > 0 || report.placeholders > 0 {
        println!(
            "  seeded {} commands, {} tags, {} placeholders",
            report.commands, report.tags, report.placeholders
        );
    }
    for w in config.validate() {
        eprintln!("warning: {}", w.message);
    }
    Ok(())
}
