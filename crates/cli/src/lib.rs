use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use vocab_description::{
    has_no_content, language_flags, LanguageAssembler, LanguageFlag, LanguageView,
    LexicalizationModel,
};
use vocab_hierarchy::{
    ConfigStore, DescriptionService, EventBus, Forest, InverseSynchronizer, MemoryGraph,
    TomlConfigStore,
};
use vocab_model::{HierarchyConfiguration, HierarchyKind, HierarchyScope, ResourceRef, Role};

#[derive(Parser)]
#[command(name = "vocab")]
#[command(about = "Browse hierarchies and descriptions of a vocabulary graph", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the per-language view of a resource description as JSON
    Describe(DescribeArgs),

    /// Print a hierarchy outline
    Tree(TreeArgs),

    /// Complete broader/narrower property lists with their inverses
    #[command(name = "sync-inverses")]
    SyncInverses(SyncArgs),
}

#[derive(Args)]
struct DescribeArgs {
    /// JSON graph fixture
    #[arg(long)]
    graph: PathBuf,

    /// IRI of the resource to describe
    #[arg(long)]
    resource: String,

    /// Lexicalization model of the project
    #[arg(long, value_enum, default_value = "skos")]
    model: ModelArg,

    /// Project language (repeatable)
    #[arg(long = "project-lang")]
    project_langs: Vec<String>,

    /// Language assigned to the user (repeatable)
    #[arg(long = "assigned-lang")]
    assigned_langs: Vec<String>,

    /// Treat the user as a project administrator
    #[arg(long)]
    admin: bool,
}

#[derive(Args)]
struct TreeArgs {
    /// JSON graph fixture
    #[arg(long)]
    graph: PathBuf,

    #[arg(long, value_enum)]
    kind: KindArg,

    /// Levels to expand below the roots
    #[arg(long, default_value_t = 1)]
    depth: usize,

    /// Directory of stored hierarchy configurations
    #[arg(long)]
    config_dir: Option<PathBuf>,
}

#[derive(Args)]
struct SyncArgs {
    /// JSON graph fixture
    #[arg(long)]
    graph: PathBuf,

    /// Directory of stored hierarchy configurations
    #[arg(long)]
    config_dir: PathBuf,

    /// Configuration scope name
    #[arg(long, default_value = "concept")]
    scope: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModelArg {
    Skos,
    Skosxl,
    Rdfs,
    Ontolex,
}

impl From<ModelArg> for LexicalizationModel {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Skos => LexicalizationModel::Skos,
            ModelArg::Skosxl => LexicalizationModel::SkosXl,
            ModelArg::Rdfs => LexicalizationModel::Rdfs,
            ModelArg::Ontolex => LexicalizationModel::Ontolex,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Class,
    Concept,
    Property,
}

impl From<KindArg> for HierarchyKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Class => HierarchyKind::Class,
            KindArg::Concept => HierarchyKind::Concept,
            KindArg::Property => HierarchyKind::Property,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DescribeOutput {
    resource: String,
    model: LexicalizationModel,
    no_content: bool,
    languages: Vec<LanguageFlag>,
    language_view: LanguageView,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Describe(args) => run_describe(args).await?,
        Commands::Tree(args) => run_tree(args).await?,
        Commands::SyncInverses(args) => run_sync_inverses(args).await?,
    }
    Ok(())
}

fn load_graph(path: &Path) -> Result<Arc<MemoryGraph>> {
    let graph = MemoryGraph::from_json_file(path)
        .with_context(|| format!("Failed to load graph {}", path.display()))?;
    Ok(Arc::new(graph))
}

async fn run_describe(args: DescribeArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let resource = graph
        .resource(&args.resource)
        .cloned()
        .unwrap_or_else(|| ResourceRef::new(args.resource.as_str(), Role::Undetermined));

    let description = graph
        .describe(&resource, None)
        .await
        .with_context(|| format!("Failed to describe {}", args.resource))?;

    let model = LexicalizationModel::from(args.model);
    let view = LanguageAssembler::new(model).assemble(&description);
    let flags = language_flags(&view, &args.project_langs, &args.assigned_langs, args.admin);

    let output = DescribeOutput {
        resource: description.resource.id.clone(),
        model,
        no_content: has_no_content(&description),
        languages: flags,
        language_view: view,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

async fn run_tree(args: TreeArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let kind = HierarchyKind::from(args.kind);
    let config = match &args.config_dir {
        Some(dir) => TomlConfigStore::new(dir)
            .load_config(kind.as_str())
            .await
            .context("Failed to load hierarchy configuration")?,
        None => HierarchyConfiguration::default(),
    };

    let bus = EventBus::new();
    let forest = Forest::new(kind, graph, &bus, config);
    forest
        .init_roots(HierarchyScope::unscoped())
        .await
        .context("Failed to load roots")?;

    let mut frontier = forest.roots();
    for level in 0..args.depth {
        let mut next = Vec::new();
        for id in frontier {
            let expandable = forest.node(id).is_some_and(|n| n.has_more || n.is_loaded());
            if !expandable {
                continue;
            }
            forest.expand(id).await?;
            next.extend(forest.children(id).unwrap_or_default());
        }
        log::debug!("expanded level {level}: {} node(s) below", next.len());
        frontier = next;
    }

    print!("{}", forest.outline());
    Ok(())
}

async fn run_sync_inverses(args: SyncArgs) -> Result<()> {
    let graph = load_graph(&args.graph)?;
    let store = TomlConfigStore::new(&args.config_dir);
    let mut config = store
        .load_config(&args.scope)
        .await
        .with_context(|| format!("Failed to load configuration {}", args.scope))?;

    let sync = InverseSynchronizer::new(graph);
    let added = sync.sync_from_broader(&mut config).await?
        + sync.sync_from_narrower(&mut config).await?;
    log::info!("added {added} inverse properties to {}", args.scope);

    store
        .save_config(&args.scope, &config)
        .await
        .with_context(|| format!("Failed to save configuration {}", args.scope))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}
