//! `options`: parameter table of the current module.

use std::io::Write;

use secfuzz_core::module::parameter::display_value;
use secfuzz_core::module::Module;

use crate::command::{Command, CommandEnv};
use crate::error::CommandError;

pub struct CommandOptions;

impl Command for CommandOptions {
    fn name(&self) -> &'static str {
        "options"
    }

    fn description(&self) -> &'static str {
        "Shows the parameters of the current module"
    }

    fn run(&self, _args: &[String], env: &mut CommandEnv<'_>) -> Result<(), CommandError> {
        let table = render_options(env.current()?);
        env.out.write_all(table.as_bytes())?;
        Ok(())
    }
}

fn render_options(module: &Module) -> String {
    let params = module.parameters();
    if params.is_empty() {
        return format!("Module {} has no parameters\n", module.qualified_name());
    }

    let rows: Vec<[String; 5]> = params
        .iter()
        .map(|p| {
            [
                p.name().to_string(),
                display_value(p.value()),
                p.kind().type_name().to_string(),
                if p.is_required() { "yes" } else { "no" }.to_string(),
                p.description().to_string(),
            ]
        })
        .collect();
    let header = ["Name", "Value", "Type", "Required", "Description"];

    let mut widths = header.map(str::len);
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let mut s = format!("\nOptions for {}:\n\n", module.qualified_name());
    let line = |cells: [&str; 5]| {
        let mut l = String::from(" ");
        for (i, cell) in cells.iter().enumerate() {
            if i == cells.len() - 1 {
                l.push_str(&format!(" {}", cell));
            } else {
                l.push_str(&format!(" {:<width$}", cell, width = widths[i]));
            }
        }
        format!("{}\n", l.trim_end())
    };
    s.push_str(&line(header));
    s.push_str(&line(header.map(|h| &"--------"[..h.len().min(8)])));
    for row in &rows {
        s.push_str(&line([
            row[0].as_str(),
            row[1].as_str(),
            row[2].as_str(),
            row[3].as_str(),
            row[4].as_str(),
        ]));
    }
    s.push('\n');
    s
}
