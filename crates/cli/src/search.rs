use std::path::PathBuf;

use chainscope_api::{InMemoryTypeModel, InvocationSite, MemberInfo, TypeRef};
use chainscope_core::{
    Chain, ChainConfig, ChainSearch, ChainSummary, ExpectedType, SearchContext, SearchRequest,
    SearchStrategy, StopReason,
};
use clap::Args;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};
use tracing::info;

#[derive(Args)]
pub struct SearchArgs {
    /// JSON type model snapshot
    #[arg(long, value_name = "MODEL_JSON")]
    pub model: PathBuf,

    /// Type the chain must produce, e.g. `com.foo.Bar[]`. Repeat to search several
    #[arg(long, value_name = "TYPE", required = true)]
    pub expected: Vec<String>,

    /// Complete inside the body of this type, offering its fields and methods
    #[arg(long = "this", value_name = "TYPE", conflicts_with_all = ["receiver", "static_type"])]
    pub this_type: Option<String>,

    /// Complete after `receiver.` where the receiver has this type
    #[arg(long, value_name = "TYPE", conflicts_with = "static_type")]
    pub receiver: Option<String>,

    /// Complete after `Type.`, offering static members only
    #[arg(long = "static", value_name = "TYPE")]
    pub static_type: Option<String>,

    /// Local variable in scope, as `name:Type`
    #[arg(long = "local", value_name = "NAME:TYPE", value_parser = parse_local)]
    pub locals: Vec<MemberInfo>,

    /// Only offer entry points whose name starts with this prefix
    #[arg(long, default_value = "")]
    pub prefix: String,

    /// Package of the completion site when no --this type is given
    #[arg(long, value_name = "PACKAGE")]
    pub package: Option<String>,

    /// JSON search settings file
    #[arg(long, value_name = "CONFIG_JSON")]
    pub config: Option<PathBuf>,

    /// Search strategy (breadth or graph)
    #[arg(long)]
    pub strategy: Option<SearchStrategy>,

    #[arg(long)]
    pub max_chains: Option<usize>,

    #[arg(long)]
    pub min_length: Option<usize>,

    #[arg(long)]
    pub max_length: Option<usize>,

    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl SearchArgs {
    fn site(&self) -> InvocationSite {
        match (&self.this_type, &self.package) {
            (Some(enclosing), _) => InvocationSite::within(enclosing),
            (None, Some(package)) => InvocationSite::in_package(package),
            (None, None) => InvocationSite::default(),
        }
    }

    /// Settings file (or defaults) with command-line overrides applied.
    fn settings(&self) -> chainscope_core::Result<ChainConfig> {
        let mut config = match &self.config {
            Some(path) => ChainConfig::load(path)?,
            None => ChainConfig::default(),
        };
        if let Some(strategy) = self.strategy {
            config.strategy = strategy;
        }
        if let Some(max_chains) = self.max_chains {
            config.max_chains = max_chains;
        }
        if let Some(min) = self.min_length {
            config.min_chain_length = min;
        }
        if let Some(max) = self.max_length {
            config.max_chain_length = max;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_local(arg: &str) -> Result<MemberInfo, String> {
    let (name, type_name) = arg
        .split_once(':')
        .ok_or_else(|| format!("expected NAME:TYPE, got `{arg}`"))?;
    let (name, type_name) = (name.trim(), type_name.trim());
    if name.is_empty() || type_name.is_empty() {
        return Err(format!("expected NAME:TYPE, got `{arg}`"));
    }
    Ok(MemberInfo::local(name, TypeRef::parse(type_name)))
}

#[derive(Tabled)]
struct ChainRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Completion")]
    code: String,
    #[tabled(rename = "Length")]
    length: usize,
    #[tabled(rename = "Produces")]
    produces: String,
}

#[derive(Serialize)]
struct SearchReport {
    stop_reason: StopReason,
    incomplete: bool,
    chains: Vec<ChainSummary>,
}

pub fn run(args: SearchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = args.settings()?;
    let model = InMemoryTypeModel::load(&args.model)?;
    info!(
        "Loaded {} types from {}",
        model.type_count(),
        args.model.display()
    );

    let context = SearchContext::new(&model, args.site());
    let collector = context.collector().with_prefix(&args.prefix);
    let entrypoints = if let Some(enclosing) = &args.this_type {
        collector.enclosing_scope(enclosing, &args.locals)
    } else if let Some(receiver) = &args.receiver {
        collector.instance_receiver(receiver)
    } else if let Some(type_name) = &args.static_type {
        collector.static_receiver(type_name)
    } else {
        collector.visible_scope(&args.locals, &[], &[])
    };
    if entrypoints.is_empty() {
        println!("No entry points in scope.");
        return Ok(());
    }

    let requests = args
        .expected
        .iter()
        .map(|spelling| {
            config
                .request_builder(ExpectedType::parse(spelling)?)
                .entrypoints(entrypoints.iter().cloned())
                .build()
        })
        .collect::<chainscope_core::Result<Vec<SearchRequest>>>()?;

    let engine =
        chainscope_core::search::engine(config.strategy, &model, args.site(), config.worker_threads)?;
    let result = engine.search_all(&requests, &config.budget())?;
    info!(
        "{} strategy found {} chains ({:?})",
        config.strategy,
        result.len(),
        result.stop_reason
    );

    let summaries: Vec<ChainSummary> = result
        .chains
        .iter()
        .map(|chain| chain.summary(&model, rendered_dimension(&context, &requests, chain)))
        .collect();

    if args.json {
        let report = SearchReport {
            stop_reason: result.stop_reason,
            incomplete: result.incomplete(),
            chains: summaries,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No chains found.");
    } else {
        let rows: Vec<ChainRow> = result
            .chains
            .iter()
            .zip(summaries)
            .enumerate()
            .map(|(i, (chain, summary))| ChainRow {
                rank: i + 1,
                code: summary.code,
                length: summary.length,
                produces: chain.last().member().type_ref.simple_name(),
            })
            .collect();
        println!("{}", Table::new(rows).with(Style::psql()));
    }
    if result.incomplete() {
        println!("Search incomplete: {:?}", result.stop_reason);
    }
    Ok(())
}

/// Array dimension of the first expected type the chain satisfies.
fn rendered_dimension(context: &SearchContext<'_>, requests: &[SearchRequest], chain: &Chain) -> usize {
    requests
        .iter()
        .find(|request| context.oracle().is_valid_terminal(chain.last(), &request.expected))
        .map_or(0, |request| request.expected.dimension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cli, Commands};
    use chainscope_api::MemberKind;
    use clap::Parser;

    fn parse(args: &[&str]) -> SearchArgs {
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Search(args) => args,
            Commands::Members(_) => panic!("expected search command"),
        }
    }

    #[test]
    fn test_parse_local() {
        let local = parse_local("items: app.Item[]").unwrap();
        assert_eq!(local.name, "items");
        assert_eq!(local.kind, MemberKind::Local);
        assert_eq!(local.type_ref, TypeRef::parse("app.Item[]"));

        assert!(parse_local("items").is_err());
        assert!(parse_local(":app.Item").is_err());
    }

    #[test]
    fn test_flags_override_settings() {
        let args = parse(&[
            "chainscope",
            "search",
            "--model",
            "model.json",
            "--expected",
            "app.Result",
            "--expected",
            "app.Future",
            "--local",
            "exec:app.Executor",
            "--strategy",
            "graph",
            "--max-length",
            "3",
            "--timeout-ms",
            "100",
        ]);
        assert_eq!(args.expected, vec!["app.Result", "app.Future"]);
        assert_eq!(args.locals.len(), 1);

        let config = args.settings().unwrap();
        assert_eq!(config.strategy, SearchStrategy::Graph);
        assert_eq!(config.max_chain_length, 3);
        assert_eq!(config.min_chain_length, 2);
        assert_eq!(config.timeout_ms, 100);
    }

    #[test]
    fn test_invalid_overrides_are_rejected() {
        let args = parse(&[
            "chainscope",
            "search",
            "--model",
            "model.json",
            "--expected",
            "app.Result",
            "--min-length",
            "5",
            "--max-length",
            "2",
        ]);
        assert!(args.settings().is_err());
    }

    #[test]
    fn test_site_follows_scope_flags() {
        let args = parse(&[
            "chainscope",
            "search",
            "--model",
            "model.json",
            "--expected",
            "app.Result",
            "--this",
            "app.Holder",
        ]);
        assert_eq!(args.site(), InvocationSite::within("app.Holder"));

        let args = parse(&[
            "chainscope",
            "search",
            "--model",
            "model.json",
            "--expected",
            "app.Result",
            "--package",
            "app",
        ]);
        assert_eq!(args.site(), InvocationSite::in_package("app"));
    }

    #[test]
    fn test_receiver_conflicts_with_this() {
        let parsed = Cli::try_parse_from([
            "chainscope",
            "search",
            "--model",
            "model.json",
            "--expected",
            "app.Result",
            "--this",
            "app.Holder",
            "--receiver",
            "app.Executor",
        ]);
        assert!(parsed.is_err());
    }
}
