//! `vaultcert list` command handler

use std::io::Write;

use serde::Serialize;

use vaultcert_scenarios::{Scenario, catalog};

use crate::error::CliError;
use crate::output::{OutputWriter, Render};

pub fn execute(writer: &OutputWriter) -> Result<(), CliError> {
    writer.render(&ScenarioList::from_catalog(&catalog()))
}

/// Catalog listing.
#[derive(Serialize)]
pub struct ScenarioList {
    pub scenarios: Vec<ScenarioSummary>,
}

#[derive(Serialize)]
pub struct ScenarioSummary {
    pub name: String,
    pub description: String,
    /// Flow descriptions, in run order.
    pub flows: Vec<String>,
}

impl ScenarioList {
    pub fn from_catalog(scenarios: &[Scenario]) -> Self {
        Self {
            scenarios: scenarios
                .iter()
                .map(|s| ScenarioSummary {
                    name: s.name.to_owned(),
                    description: s.description.to_owned(),
                    flows: s.flows.iter().map(|f| f.description.clone()).collect(),
                })
                .collect(),
        }
    }
}

impl Render for ScenarioList {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Scenarios ({}):", self.scenarios.len())?;
        for scenario in &self.scenarios {
            writeln!(w)?;
            writeln!(w, "  {}  {}", scenario.name.bold(), scenario.description)?;
            for flow in &scenario.flows {
                writeln!(w, "    - {flow}")?;
            }
        }
        Ok(())
    }
}
