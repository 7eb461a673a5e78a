//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use crate::domain::{DisplayMode, NodeId, ProductId, ShowcaseSlot, TemplateId, WebsiteId};

/// Nested-set catalog tree: nodes, product links, subtree listings, breadcrumbs and sitemaps
#[derive(Parser, Debug)]
#[command(name = "ctree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Directory holding the catalog store (default: ~/.ctree)
    #[arg(short = 'C', long, global = true, env = "CTREE_BASE_DIR", value_hint = ValueHint::DirPath)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create, edit, move and inspect tree nodes
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Register templates and variants
    Product {
        #[command(subcommand)]
        command: ProductCommands,
    },

    /// Link products to nodes
    Link {
        #[command(subcommand)]
        command: LinkCommands,
    },

    /// List the products of a node's subtree
    List {
        /// Node id
        node: NodeId,
        /// Page number (1-indexed)
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        /// Page size (default: the node's products-per-page)
        #[arg(long, allow_negative_numbers = true)]
        per_page: Option<i64>,
        /// Display mode (default: the node's mode)
        #[arg(short, long)]
        mode: Option<DisplayMode>,
    },

    /// Sitemap projection of active nodes
    Sitemap {
        #[command(subcommand)]
        command: SitemapCommands,
    },

    /// Manage websites and their showcase slots
    Website {
        #[command(subcommand)]
        command: WebsiteCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Create a node (as last child of --parent, or as a new root)
    Add {
        /// Display name
        name: String,
        /// Parent node id
        #[arg(short, long)]
        parent: Option<NodeId>,
        /// URL slug (default: derived from the full name)
        #[arg(long)]
        slug: Option<String>,
        /// Ordering among siblings
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        sequence: i32,
        /// Products per listing page
        #[arg(long)]
        per_page: Option<u32>,
        /// Display mode of the listing
        #[arg(long, default_value_t = DisplayMode::Variant)]
        display_mode: DisplayMode,
        /// Hide from the sitemap
        #[arg(long)]
        inactive: bool,
    },

    /// Edit plain attributes of a node
    Edit {
        /// Node id
        id: NodeId,
        #[arg(long)]
        name: Option<String>,
        /// New slug; an empty value regenerates it from the full name
        #[arg(long)]
        slug: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        sequence: Option<i32>,
        #[arg(long)]
        per_page: Option<u32>,
        #[arg(long)]
        display_mode: Option<DisplayMode>,
        #[arg(long)]
        active: Option<bool>,
    },

    /// Reparent a node with its subtree (omit --parent to make it a root)
    Move {
        /// Node id
        id: NodeId,
        /// New parent id
        #[arg(short, long)]
        parent: Option<NodeId>,
    },

    /// Delete a leaf node and its product links
    Rm {
        /// Node id
        id: NodeId,
    },

    /// Show a node
    Show {
        /// Node id
        id: NodeId,
    },

    /// Show the forest as a tree
    Tree {
        /// Only the subtree of this node
        root: Option<NodeId>,
    },

    /// Show the root-to-node path
    Breadcrumb {
        /// Node id
        id: NodeId,
        /// Omit the leading home entry
        #[arg(long)]
        no_home: bool,
    },

    /// Tell whether one node's subtree contains another node
    Contains {
        /// Possible ancestor
        ancestor: NodeId,
        /// Possible descendant
        descendant: NodeId,
    },

    /// Verify the nested-set invariants
    Check,

    /// Rebuild all intervals from parent pointers
    Reindex,
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    /// Register a template
    Template {
        name: String,
        /// Register as inactive
        #[arg(long)]
        inactive: bool,
    },

    /// Register a variant of a template
    Variant {
        template: TemplateId,
        code: String,
        /// Register as not displayed
        #[arg(long)]
        hidden: bool,
    },

    /// Set the displayed flag of a variant
    Display {
        product: ProductId,
        #[arg(action = ArgAction::Set)]
        displayed: bool,
    },

    /// Set the active flag of a template
    Activate {
        template: TemplateId,
        #[arg(action = ArgAction::Set)]
        active: bool,
    },

    /// Remove a variant and its links
    Rm { product: ProductId },
}

#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    /// Link a product to a node
    Add {
        node: NodeId,
        product: ProductId,
        /// Listing position
        #[arg(short, long, allow_negative_numbers = true)]
        sequence: Option<i32>,
    },

    /// Remove a link
    Rm { node: NodeId, product: ProductId },

    /// Change the listing position of a link
    Seq {
        node: NodeId,
        product: ProductId,
        #[arg(allow_negative_numbers = true)]
        sequence: i32,
    },

    /// List a node's own links
    Ls { node: NodeId },

    /// List the nodes a product is linked to
    Nodes { product: ProductId },
}

#[derive(Subcommand, Debug)]
pub enum SitemapCommands {
    /// Show the number of sitemap pages
    Index,

    /// Show the entries of one page
    Page {
        /// Page number (1-indexed)
        number: u32,
    },
}

#[derive(Subcommand, Debug)]
pub enum WebsiteCommands {
    /// Create a website
    Add { name: String },

    /// Add a root node to a website (or remove it with --remove)
    Root {
        website: WebsiteId,
        node: NodeId,
        #[arg(long)]
        remove: bool,
    },

    /// Set a showcase slot (omit the node to clear it)
    Slot {
        website: WebsiteId,
        slot: ShowcaseSlot,
        node: Option<NodeId>,
    },

    /// Show a website, or list the products of one of its slots
    Show {
        website: WebsiteId,
        #[arg(long)]
        slot: Option<ShowcaseSlot>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Print a commented config template
    Template,

    /// Show config paths
    Path,
}
