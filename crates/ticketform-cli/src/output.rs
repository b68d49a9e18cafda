//! Output formatting

use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }

    /// Structured data: a table of rows, or the whole value as JSON/YAML
    pub fn print_rows<T, R>(&self, data: &T, rows: Vec<R>)
    where
        T: Serialize,
        R: Tabled,
    {
        match self {
            OutputFormat::Table => {
                if !rows.is_empty() {
                    println!("{}", Table::new(rows));
                }
            }
            _ => self.print(data),
        }
    }

    pub fn print<T: Serialize>(&self, data: &T) {
        match self {
            OutputFormat::Yaml => {
                println!("{}", serde_yaml::to_string(data).unwrap_or_default());
            }
            _ => {
                println!("{}", serde_json::to_string_pretty(data).unwrap_or_default());
            }
        }
    }

    pub fn is_table(&self) -> bool {
        *self == OutputFormat::Table
    }
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

pub fn failure(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

pub fn note(message: &str) {
    println!("{}", message.dimmed());
}
