use clap::{Args as ClapArgs, Parser, Subcommand, ValueHint};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about, version, name = "semsearch")]
/// Semantic Search command line toolkit
pub struct Args {
    /// Log generated queries and other details to stderr
    ///
    /// The RUST_LOG environment variable takes precedence.
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Command,
}

/// The search configuration and profile a state token is resolved against.
#[derive(ClapArgs)]
pub struct SearchContext {
    /// Search configuration (JSON)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: PathBuf,
    /// Search profile with categories and relations (JSON)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub profile: PathBuf,
    /// Name of the projected variable
    #[arg(long, default_value = "subject")]
    pub projection: String,
    /// State token
    ///
    /// If no token is given, stdin is read.
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile the search of a state token to a SPARQL SELECT query
    Compile {
        #[command(flatten)]
        context: SearchContext,
    },
    /// Build the faceted query of a state token
    ///
    /// The base query is the compiled search; the facet constraints of the token are appended.
    FacetQuery {
        #[command(flatten)]
        context: SearchContext,
        /// Facet configuration (JSON)
        ///
        /// By default the built-in facet queries are used.
        #[arg(long, value_hint = ValueHint::FilePath)]
        facet_config: Option<PathBuf>,
    },
    /// Encode a serialized search state (JSON) into a state token
    Encode {
        /// File to read the state from
        ///
        /// If no file is given, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
    /// Decode a state token into the serialized search state (JSON)
    Decode {
        /// State token
        ///
        /// If no token is given, stdin is read.
        token: Option<String>,
    },
    /// Convert a JSON document to an RDF graph written as N-Triples
    JsonToGraph {
        /// File to read the document from
        ///
        /// If no file is given, stdin is read.
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        file: Option<PathBuf>,
    },
}
