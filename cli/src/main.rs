#![allow(clippy::print_stdout)]
use crate::cli::{Args, Command, SearchContext};
use anyhow::{bail, Context};
use clap::Parser;
use semsearch::facet::{FacetConfig, FacetQueries};
use semsearch::model::{ProfileDefinition, Query, Search, SearchProfileStore, Variable};
use semsearch::query::{generate_select_query, SearchConfig};
use semsearch::state::{
    decode_state, encode_state, json_to_graph, state_from_token, RawState, SerializedState,
};
use std::fs;
use std::io::{stdin, Read};
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod cli;

pub fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    match args.command {
        Command::Compile { context } => {
            let loaded = LoadedContext::load(&context)?;
            let search = loaded.search()?;
            println!("{}", loaded.compile(search)?);
            Ok(())
        }
        Command::FacetQuery {
            context,
            facet_config,
        } => {
            let facet_config: FacetConfig = match facet_config {
                Some(path) => read_json(&path)?,
                None => FacetConfig::default(),
            };
            let loaded = LoadedContext::load(&context)?;
            let search = loaded.search()?;
            let base_query = loaded.compile(search)?;
            let facet = loaded.state.facet.clone().unwrap_or_default();
            let queries = FacetQueries::new(
                search.domain.clone(),
                base_query,
                facet_config,
                loaded.config.clone(),
                Arc::new(loaded.profile.clone()),
            )?;
            println!("{}", queries.faceted_query(&facet)?);
            Ok(())
        }
        Command::Encode { file } => {
            let state: SerializedState = serde_json::from_str(&read_input(file.as_deref())?)
                .context("The input is not a serialized search state")?;
            println!("{}", encode_state(&state)?);
            Ok(())
        }
        Command::Decode { token } => {
            let token = token_or_stdin(token)?;
            let state = decode_state(&token).context("Invalid state token")?;
            println!("{}", serde_json::to_string_pretty(&state)?);
            Ok(())
        }
        Command::JsonToGraph { file } => {
            let document = serde_json::from_str(&read_input(file.as_deref())?)
                .context("The input is not a JSON document")?;
            let pointed = json_to_graph(&document)?;
            println!("# root: {}", pointed.pointer);
            for triple in &pointed.graph {
                println!("{triple} .");
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Configuration, profile and restored state of a [`SearchContext`].
struct LoadedContext {
    config: SearchConfig,
    profile: SearchProfileStore,
    projection: Variable,
    state: RawState,
}

impl LoadedContext {
    fn load(context: &SearchContext) -> anyhow::Result<Self> {
        let config: SearchConfig = read_json(&context.config)?;
        let definition: ProfileDefinition = read_json(&context.profile)?;
        let profile = SearchProfileStore::from_definition(&definition, &config.prefixes)
            .context("Invalid search profile")?;
        tracing::debug!(
            categories = profile.categories().len(),
            relations = profile.relations().len(),
            "Loaded search profile"
        );
        let projection = Variable::new(context.projection.trim_start_matches(['?', '$']))
            .with_context(|| format!("Invalid projection variable {}", context.projection))?;
        let token = token_or_stdin(context.token.clone())?;
        let state = state_from_token(&profile, &config.prefixes, &token)
            .context("Error restoring search state")?;
        Ok(Self {
            config,
            profile,
            projection,
            state,
        })
    }

    fn search(&self) -> anyhow::Result<&Search> {
        match &self.state.search {
            Some(search) => Ok(search),
            None => bail!("The state token does not contain a search"),
        }
    }

    fn compile(&self, search: &Search) -> anyhow::Result<Query> {
        Ok(generate_select_query(&self.config, &self.projection, search)?)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Cannot read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

fn read_input(file: Option<&Path>) -> anyhow::Result<String> {
    if let Some(file) = file {
        return fs::read_to_string(file).with_context(|| format!("Cannot read {}", file.display()));
    }
    let mut input = String::new();
    stdin().lock().read_to_string(&mut input)?;
    Ok(input)
}

fn token_or_stdin(token: Option<String>) -> anyhow::Result<String> {
    let token = match token {
        Some(token) => token,
        None => read_input(None)?,
    };
    let token = token.trim();
    if token.is_empty() {
        bail!("No state token given");
    }
    Ok(token.to_owned())
}
