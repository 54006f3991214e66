use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::flags::{Cli, Command, CompleteAction, MonitorAction, RulesAction};
use crate::completed::CompletedStore;
use crate::config::{load_config, AppConfig};
use crate::core::finding::RawReport;
use crate::core::store::StateStore;
use crate::history::HistoryStore;
use crate::monitor::Monitor;
use crate::pipeline::process_scan;
use crate::rules::{detect_vendor_dirs, IgnoreRule, RuleMap, RuleStore};
use crate::score::score;
use crate::structure::validate_structure;

pub fn run(cli: Cli) -> Result<()> {
    let mut cfg = load_config(cli.config.as_deref())?;
    if let Some(dir) = &cli.data_dir {
        cfg.data_dir = dir.to_string_lossy().to_string();
    }
    let store = StateStore::new(Path::new(&cfg.data_dir))?;

    match cli.command {
        Command::Scan { package, input } => run_scan(&store, &cfg, &package, &input),
        Command::Score { errors, warnings } => print_json(&score(errors, warnings)),
        Command::History { package } => {
            let history = HistoryStore::new(&store, cfg.history_limit);
            print_json(&history.statistics(&package))
        }
        Command::Rules { action } => run_rules(&store, action),
        Command::Complete { action } => run_complete(&store, action),
        Command::Rediscovered { package } => {
            let history = HistoryStore::new(&store, cfg.history_limit);
            let completed = CompletedStore::new(&store);
            let (errors, warnings) = match history.last_scan(&package) {
                Some(record) => (record.errors, record.warnings),
                None => (Vec::new(), Vec::new()),
            };
            print_json(&completed.find_rediscovered(&package, &errors, &warnings))
        }
        Command::Monitor { action } => run_monitor(&store, &cfg, action),
        Command::Validate { root } => print_json(&validate_structure(&root)),
    }
}

fn run_scan(store: &StateStore, cfg: &AppConfig, package: &str, input: &Path) -> Result<()> {
    let data = fs::read_to_string(input)
        .with_context(|| format!("reading report {}", input.display()))?;
    let raw: RawReport = serde_json::from_str(&data)
        .with_context(|| format!("parsing report {}", input.display()))?;
    let outcome = process_scan(store, cfg, package, &raw)?;
    print_json(&outcome)
}

fn run_rules(store: &StateStore, action: RulesAction) -> Result<()> {
    let rules = RuleStore::new(store);
    match action {
        RulesAction::Add {
            scope,
            path,
            code,
            reason,
            note,
            by,
        } => {
            let rule = IgnoreRule::new(scope.into(), &path, code, reason.into(), &note, by)?;
            let id = rules.add(rule)?;
            println!("{id}");
            Ok(())
        }
        RulesAction::Remove { id } => {
            if rules.remove(&id)? {
                println!("removed {id}");
            } else {
                println!("no rule with id {id}");
            }
            Ok(())
        }
        RulesAction::List | RulesAction::Export => print_json(&rules.export()),
        RulesAction::Import { input } => {
            let data = fs::read_to_string(&input)
                .with_context(|| format!("reading rules {}", input.display()))?;
            let incoming: RuleMap = serde_json::from_str(&data)
                .with_context(|| format!("parsing rules {}", input.display()))?;
            let count = rules.import(incoming)?;
            println!("imported {count} rule(s)");
            Ok(())
        }
        RulesAction::DetectVendor { root } => print_json(&detect_vendor_dirs(&root)),
    }
}

fn run_complete(store: &StateStore, action: CompleteAction) -> Result<()> {
    let completed = CompletedStore::new(store);
    match action {
        CompleteAction::Mark {
            package,
            file,
            line,
            code,
            by,
        } => {
            let key = completed.mark_complete(&package, &file, line, &code, by)?;
            println!("{key}");
            Ok(())
        }
        CompleteAction::List { package } => print_json(&completed.list(&package)),
    }
}

fn run_monitor(store: &StateStore, cfg: &AppConfig, action: MonitorAction) -> Result<()> {
    let monitor = Monitor::new(store, cfg.source_extensions.clone(), cfg.monitor_log_limit);
    match action {
        MonitorAction::Start { package, root } => {
            let state = monitor.start(&package, &root)?;
            println!(
                "monitoring {} ({} files)",
                state.plugin,
                state.checksums.len()
            );
            Ok(())
        }
        MonitorAction::Check => match monitor.check_changes()? {
            Some(delta) => print_json(&delta),
            None => {
                println!("no changes");
                Ok(())
            }
        },
        MonitorAction::Stop => {
            if monitor.stop()? {
                println!("monitoring stopped");
            } else {
                println!("no active session");
            }
            Ok(())
        }
        MonitorAction::Status => match monitor.active() {
            Some(state) => print_json(&state),
            None => {
                println!("no active session");
                Ok(())
            }
        },
        MonitorAction::Log => print_json(&monitor.activity_log()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
