//! First-run sample data. Each group is written only when its table is
//! empty, so seeding is safe to repeat.

use serde::Serialize;

use crate::db::Vault;
use crate::error::Result;
use crate::types::{CommandBody, NewCommand};

const TAGS: &[&str] = &["Reconnaissance", "Enumeration", "Exploitation"];

const PLACEHOLDERS: &[&str] = &["target", "ip", "port", "url", "wordlist"];

/// (name, command, description, tag)
const COMMANDS: &[(&str, &str, &str, &str)] = &[
    (
        "Nmap Port Scan",
        "nmap -sS -p- {{target}}",
        "Perform a full TCP port scan using Nmap",
        "Reconnaissance",
    ),
    (
        "Subdomain Enumeration",
        "subfinder -d {{target}}",
        "Find subdomains using Subfinder",
        "Reconnaissance",
    ),
    (
        "Service Version Detection",
        "nmap -sV -p {{port}} {{target}}",
        "Detect service versions on open ports",
        "Enumeration",
    ),
    (
        "SSH Brute Force",
        "hydra -l admin -P /path/to/wordlist.txt ssh://{{target}} -p {{port}}",
        "Brute force SSH using Hydra",
        "Enumeration",
    ),
    (
        "SQL Injection Test",
        "sqlmap -u \"{{url}}\" --batch --dbs",
        "Run SQLMap against a URL",
        "Exploitation",
    ),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub user: bool,
    pub tags: usize,
    pub commands: usize,
    pub placeholders: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        !self.user && self.tags == 0 && self.commands == 0 && self.placeholders == 0
    }
}

impl Vault {
    fn table_is_empty(&self, table: &str) -> Result<bool> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        Ok(n == 0)
    }

    pub fn seed_defaults(&mut self) -> Result<SeedReport> {
        let mut report = SeedReport {
            user: self.ensure_default_user()?,
            ..SeedReport::default()
        };

        if self.table_is_empty("tags")? {
            for name in TAGS {
                self.create_tag(name)?;
                report.tags += 1;
            }
        }

        if self.table_is_empty("commands")? {
            let tags = self.list_tags()?;
            for (name, command, description, tag) in COMMANDS {
                let tag_ids = tags
                    .iter()
                    .filter(|t| t.name == *tag)
                    .map(|t| t.id)
                    .collect();
                self.create_command(NewCommand {
                    name: name.to_string(),
                    description: description.to_string(),
                    body: CommandBody::Flat {
                        command: command.to_string(),
                    },
                    tag_ids,
                })?;
                report.commands += 1;
            }
        }

        if self.table_is_empty("placeholders")? {
            for name in PLACEHOLDERS {
                self.create_placeholder(name)?;
                report.placeholders += 1;
            }
        }

        if !report.is_empty() {
            tracing::info!(
                tags = report.tags,
                commands = report.commands,
                placeholders = report.placeholders,
                "seeded defaults"
            );
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_once() {
        let mut vault = Vault::open_in_memory().unwrap();
        let first = vault.seed_defaults().unwrap();
        assert!(first.user);
        assert_eq!(first.tags, 3);
        assert_eq!(first.commands, 5);
        assert_eq!(first.placeholders, 5);

        let second = vault.seed_defaults().unwrap();
        assert!(second.is_empty());
        assert_eq!(vault.list_commands().unwrap().len(), 5);
    }

    #[test]
    fn seeded_commands_carry_their_tag() {
        let mut vault = Vault::open_in_memory().unwrap();
        vault.seed_defaults().unwrap();
        let sqli = vault
            .list_commands()
            .unwrap()
            .into_iter()
            .find(|c| c.name == "SQL Injection Test")
            .unwrap();
        assert_eq!(sqli.tags[0].name, "Exploitation");
        assert_eq!(sqli.command, "sqlmap -u \"{{url}}\" --batch --dbs");
    }

    #[test]
    fn existing_tags_are_left_alone() {
        let mut vault = Vault::open_in_memory().unwrap();
        vault.create_tag("Mine").unwrap();
        let report = vault.seed_defaults().unwrap();
        assert_eq!(report.tags, 0);
        // Seeded commands reference tags that do not exist, so they get none.
        assert!(vault.list_commands().unwrap().iter().all(|c| c.tags.is_empty()));
    }
}
