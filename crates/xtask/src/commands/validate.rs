//! Load the ability catalogue and check it against the handler registry
//!
//! Runs the same startup validation the runtime performs, without starting
//! a simulation.

use anyhow::Result;
use clap::Parser;
use console::style;
use std::path::PathBuf;

use arena_core::HandlerRegistry;

use crate::content;

/// Validate content against the handler registry
#[derive(Parser)]
pub struct Validate {
    /// Data directory holding abilities.ron, effects.ron, champions.ron and config.toml
    /// (defaults to $ARENA_DATA_DIR, then the embedded content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Print every ability and champion
    #[arg(short, long)]
    verbose: bool,
}

impl Validate {
    pub fn execute(self) -> Result<()> {
        let (bundle, source) = match content::load(self.data_dir) {
            Ok(loaded) => loaded,
            Err(err) => {
                println!("{} Content failed validation", style("✗").red().bold());
                return Err(err);
            }
        };
        let registry = HandlerRegistry::global();
        let catalogue = &bundle.catalogue;

        println!(
            "{} Content from {}",
            style("✓").green().bold(),
            style(&source).cyan()
        );
        println!(
            "  {} abilities, {} effects, {} champions",
            catalogue.abilities().count(),
            catalogue.effects().len(),
            catalogue.champions().count()
        );
        println!(
            "  {} handlers registered, tick rate {} Hz",
            registry.len(),
            bundle.config.tick_rate
        );

        if self.verbose {
            println!();
            println!("{}", style("Abilities").bold());
            let mut abilities: Vec<_> = catalogue.abilities().collect();
            abilities.sort_by_key(|def| def.kind);
            for def in abilities {
                let handler = if registry.contains(def.kind) {
                    style("handler").green()
                } else {
                    style("generic").yellow()
                };
                println!(
                    "  {:<16} {:<20} max rank {}  {}",
                    def.kind.to_string(),
                    def.name,
                    def.max_rank,
                    handler
                );
            }

            println!();
            println!("{}", style("Champions").bold());
            let mut champions: Vec<_> = catalogue.champions().collect();
            champions.sort_by(|a, b| a.name.cmp(&b.name));
            for champion in champions {
                let kit = champion
                    .loadout
                    .iter()
                    .map(|(slot, kind)| format!("{slot}:{kind}"))
                    .collect::<Vec<_>>()
                    .join(" ");
                println!("  {:<10} {}", champion.name, style(kit).dim());
            }
        }

        Ok(())
    }
}
