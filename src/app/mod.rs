use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

use crate::config::Settings;
use crate::dsl::{FilterAst, parse_filter};
use crate::tagging::effective_tags;

#[derive(Parser)]
#[command(author, version, about = "Tag filter expressions for ping targets", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a filter expression and print its normalized form
    Check {
        /// Filter expression
        expr: String,
    },

    /// Evaluate a filter expression against a set of tags
    Match {
        /// Filter expression
        expr: String,

        /// Tag to include in the set (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },

    /// List targets from a settings file
    List {
        /// Filter expression (defaults to the saved filter)
        #[arg(short, long)]
        filter: Option<String>,

        /// Settings file (.json, .yaml); searched in the current directory if omitted
        #[arg(short, long, env = "PINGTAGS_CONFIG")]
        config: Option<PathBuf>,
    },
}

pub fn run(command: &Command, out: &mut impl Write) -> Result<()> {
    match command {
        Command::Check { expr } => check(expr, out),
        Command::Match { expr, tags } => match_tags(expr, tags, out),
        Command::List { filter, config } => list(filter.as_deref(), config.as_ref(), out),
    }
}

fn parse(expr: &str) -> Result<FilterAst> {
    parse_filter(expr).with_context(|| format!("CLI: Invalid filter `{expr}`"))
}

pub fn check(expr: &str, out: &mut impl Write) -> Result<()> {
    let ast = parse(expr)?;
    let normalized = ast
        .simplify()
        .to_filter_string()
        .context("CLI: Failed to print filter")?;
    writeln!(out, "{normalized}")?;
    Ok(())
}

pub fn match_tags(expr: &str, tags: &[String], out: &mut impl Write) -> Result<()> {
    let ast = parse(expr)?;
    let set: BTreeSet<String> = tags.iter().cloned().collect();
    writeln!(out, "{}", ast.is_match(&set))?;
    Ok(())
}

pub fn list(filter: Option<&str>, config: Option<&PathBuf>, out: &mut impl Write) -> Result<()> {
    let settings = match config {
        Some(path) => Settings::load(path)?,
        None => {
            let cwd = std::env::current_dir().context("CLI: Cannot determine current directory")?;
            Settings::load_or_default(&Settings::candidates_in(&cwd)).0
        }
    };

    let ast = match filter {
        Some(expr) => Some(parse(expr)?),
        None => settings.compiled_filter()?,
    };
    let criteria = settings.criteria.as_ref().map(|c| c.compile());
    let rules = &settings.automatic_tags;

    let rows: Vec<String> = settings
        .targets
        .par_iter()
        .filter_map(|target| {
            let tags = effective_tags(target, rules);
            let keep = ast.as_ref().is_none_or(|ast| ast.is_match(&tags))
                && criteria.as_ref().is_none_or(|c| c.matches(target, &tags));
            keep.then(|| {
                let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
                format!(
                    "{}\t{}\t{}",
                    target.address(),
                    target.label().unwrap_or("-"),
                    tags.join(",")
                )
            })
        })
        .collect();

    tracing::info!(
        "Listing {} of {} targets",
        rows.len(),
        settings.targets.len()
    );
    for row in rows {
        writeln!(out, "{row}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(command: Command) -> Result<String> {
        let mut buf = Vec::new();
        run(&command, &mut buf)?;
        Ok(String::from_utf8(buf).unwrap())
    }

    #[test]
    fn check_normalizes() {
        let out = output(Command::Check {
            expr: "a&(b&c)|  'd e'".into(),
        })
        .unwrap();
        assert_eq!(out, "a & b & c | \"d e\"\n");
    }

    #[test]
    fn check_reports_parse_errors() {
        let err = output(Command::Check { expr: "a &".into() }).unwrap_err();
        assert!(format!("{err:#}").contains("Operand missing after `&`"));
    }

    #[test]
    fn match_prints_bool() {
        let out = output(Command::Match {
            expr: "web & !down".into(),
            tags: vec!["web".into()],
        })
        .unwrap();
        assert_eq!(out, "true\n");
    }
}
