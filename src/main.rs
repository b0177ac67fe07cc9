use clap::{Parser, Subcommand};
use grid_mapcss::catalog::{VariableCategory, describe_variable, extract_variables};
use grid_mapcss::config::{self, GeneratorConfig};
use grid_mapcss::generate::{self, resolve_profile};
use grid_mapcss::output;
use grid_mapcss::profile::ProfileName;
use grid_mapcss::regions::Dialect;
use grid_mapcss::render::VariableValue;
use grid_mapcss::rules::{RawVoltageRule, build_rule_set, parse_rule_lines};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Flags that select and adjust the profile. Applied on top of `mapcss.toml`.
#[derive(clap::Args, Clone)]
struct ProfileArgs {
    /// Style profile: default, dense or custom
    #[arg(long)]
    profile: Option<ProfileName>,

    /// Voltage rule as `lower upper color [halo]`; repeatable, replaces the profile's rules
    #[arg(long = "rule", value_name = "RULE", allow_hyphen_values = true)]
    rules: Vec<RawVoltageRule>,

    /// File with one voltage rule per line (blank lines and `#` comments ignored)
    #[arg(long, value_name = "FILE")]
    rules_file: Option<PathBuf>,

    /// Config file (default: ./mapcss.toml if present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "grid-mapcss")]
#[command(about = "MapCSS style generator for power-grid maps")]
#[command(long_about = "\
MapCSS style generator for power-grid maps

Fills a MapCSS template with the values of a style profile and regenerates
its voltage-dependent regions from a list of voltage rules.

Template regions (grid dialect), each running from its begin marker to the
next end marker:

  /* Voltage-based classes */              ...  /* End of voltage-based classes */
  /* Switchgears voltage-based styles */   ...  /* End of switchgears voltage-based styles */
  /* Power lines voltage-based styles */   ...  /* End of power lines voltage-based styles */

Everything outside the regions is copied verbatim; {{ name }} placeholders
are replaced by profile values.

Voltage rules are `lower upper color [halo]`, bounds in volts, -1 for no
limit:

  -1 -1 #FFFFFF #000000      catch-all for lines without a voltage
  -1 50000 #7c7c7c           below 50 kV
  550000 -1 #00ced1          550 kV and above

Run 'grid-mapcss gen-config' to generate a documented mapcss.toml.")]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the template variables used by a template
    Vars {
        /// MapCSS template
        template: PathBuf,

        /// Print as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Show the resolved voltage rules and range warnings
    Rules {
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Rewrite the template regions and fill in the variables
    Generate {
        /// MapCSS template
        template: PathBuf,

        /// Output file (default: output_<template name>)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        profile: ProfileArgs,

        /// Variable override as `name=value`; repeatable
        #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, VariableValue)>,

        /// Fail on placeholders without a value
        #[arg(long)]
        strict: bool,

        /// Template dialect: grid or legacy
        #[arg(long)]
        dialect: Option<Dialect>,
    },
    /// Print a stock mapcss.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "grid_mapcss=debug,info"
    } else {
        "grid_mapcss=info,warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Vars {
            template,
            json,
            profile,
        } => {
            let text = generate::read_template(&template)?;
            let names = extract_variables(&text);
            let config = load_config(&profile)?;
            let data = resolve_profile(&config)?;
            if json {
                let entries: Vec<serde_json::Value> = names
                    .iter()
                    .map(|name| {
                        serde_json::json!({
                            "name": name,
                            "category": VariableCategory::of(name).title(),
                            "description": describe_variable(name),
                            "value": data.variables.get(name),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                output::print_variables_output(&names, &data.variables);
            }
        }
        Command::Rules { profile } => {
            let config = load_config(&profile)?;
            let data = resolve_profile(&config)?;
            let (rules, warnings) = build_rule_set(&data.voltage_rules);
            output::print_rules_output(&data.name, &rules, &warnings);
        }
        Command::Generate {
            template,
            output: output_path,
            profile,
            set,
            strict,
            dialect,
        } => {
            let mut config = load_config(&profile)?;
            config.variables.extend(set);
            if strict {
                config.render.strict = true;
            }
            if let Some(dialect) = dialect {
                config.rewrite.dialect = dialect;
            }

            let text = generate::read_template(&template)?;
            let generation = generate::run(&text, &config)?;
            let output_path =
                output_path.unwrap_or_else(|| generate::default_output_path(&template));
            generate::write_output(&output_path, &generation.output)?;
            output::print_generate_output(&generation, &output_path);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load `mapcss.toml` (or `--config`) and apply the profile flags on top.
fn load_config(args: &ProfileArgs) -> Result<GeneratorConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => {
            if !path.exists() {
                return Err(format!("config file not found: {}", path.display()).into());
            }
            config::load_config_file(path)?
        }
        None => config::load_config(Path::new("."))?,
    };
    debug!(profile = %config.profile, "loaded config");

    if let Some(profile) = args.profile {
        config.profile = profile;
    }

    let mut rules = args.rules.clone();
    if let Some(path) = &args.rules_file {
        rules.extend(read_rules_file(path)?);
    }
    if !rules.is_empty() {
        config.voltage_rules = rules;
    }
    config.validate()?;
    Ok(config)
}

/// Parse a rules file. Malformed lines are reported and skipped.
fn read_rules_file(path: &Path) -> Result<Vec<RawVoltageRule>, std::io::Error> {
    let content = std::fs::read_to_string(path)?;
    let (rules, errors) = parse_rule_lines(&content);
    for error in &errors {
        warn!("{}: {}", path.display(), error);
    }
    Ok(rules)
}

/// Parse `name=value`, inferring the value type.
fn parse_assignment(s: &str) -> Result<(String, VariableValue), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in `{s}`"));
    }
    Ok((name.to_string(), VariableValue::infer(value.trim())))
}
