//! Command dispatch: maps parsed arguments onto service calls and prints results

use std::io;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::ListingRequest;
use crate::application::Paginator;
use crate::cli::args::{
    Cli, Commands, ConfigCommands, LinkCommands, NodeCommands, ProductCommands, SitemapCommands,
    WebsiteCommands,
};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{NewNode, Node, NodeUpdate};
use crate::infrastructure::di::ServiceContainer;

/// Execute a parsed command against the wired services.
pub fn execute(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Node { command }) => node(container, command),
        Some(Commands::Product { command }) => product(container, command),
        Some(Commands::Link { command }) => link(container, command),
        Some(Commands::List {
            node,
            page,
            per_page,
            mode,
        }) => {
            let mut request = ListingRequest::page(*page);
            request.per_page = *per_page;
            request.mode = *mode;
            list(container, *node, &request)
        }
        Some(Commands::Sitemap { command }) => sitemap(container, command),
        Some(Commands::Website { command }) => website(container, command),
        Some(Commands::Config { command }) => config(&container.settings, command),
        Some(Commands::Completion { shell }) => {
            print_completions(*shell);
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `ctree --help`".into(),
        )),
    }
}

/// Write the completion script for `shell` to stdout.
pub fn print_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

#[instrument(level = "debug", skip(c))]
fn node(c: &ServiceContainer, command: &NodeCommands) -> CliResult<()> {
    let tree = &c.hierarchy;
    match command {
        NodeCommands::Add {
            name,
            parent,
            slug,
            sequence,
            per_page,
            display_mode,
            inactive,
        } => {
            let mut draft = NewNode::named(name.as_str())
                .with_sequence(*sequence)
                .with_display_mode(*display_mode);
            draft.parent = *parent;
            draft.slug = slug.clone();
            draft.products_per_page = *per_page;
            if *inactive {
                draft = draft.inactive();
            }
            let node = tree.create_node(draft)?;
            output::action("Created", &output::node_label(&node));
        }
        NodeCommands::Edit {
            id,
            name,
            slug,
            sequence,
            per_page,
            display_mode,
            active,
        } => {
            let update = NodeUpdate {
                name: name.clone(),
                slug: slug.clone(),
                sequence: *sequence,
                display_mode: *display_mode,
                products_per_page: *per_page,
                active: *active,
            };
            let node = tree.update_node(*id, update)?;
            output::action("Updated", &output::node_label(&node));
        }
        NodeCommands::Move { id, parent } => {
            let node = tree.move_node(*id, *parent)?;
            output::action("Moved", &output::node_label(&node));
        }
        NodeCommands::Rm { id } => {
            tree.delete_node(*id)?;
            output::action("Deleted", &format!("node {id}"));
        }
        NodeCommands::Show { id } => {
            let node = tree.get_node(*id)?;
            show_node(&node, &tree.full_name(*id)?, &c.settings);
        }
        NodeCommands::Tree { root } => {
            let nodes = match root {
                Some(id) => tree.subtree(*id)?,
                None => tree.all_nodes()?,
            };
            if nodes.is_empty() {
                output::warning("catalog is empty");
            }
            for t in output::forest(&nodes) {
                output::info(&t);
            }
        }
        NodeCommands::Breadcrumb { id, no_home } => {
            let crumbs = c.breadcrumbs.resolve(*id, !no_home)?;
            let trail: Vec<&str> = crumbs.iter().map(|b| b.label.as_str()).collect();
            output::info(&trail.join(" > "));
            for crumb in &crumbs {
                output::detail(&format!("{:<24} {}", crumb.label, crumb.url));
            }
        }
        NodeCommands::Contains {
            ancestor,
            descendant,
        } => {
            if tree.is_ancestor(*ancestor, *descendant)? {
                output::info(&format!("node {descendant} is inside the subtree of node {ancestor}"));
            } else {
                output::info(&format!("node {descendant} is outside the subtree of node {ancestor}"));
            }
        }
        NodeCommands::Check => {
            tree.check()?;
            output::success("nested-set invariants hold");
        }
        NodeCommands::Reindex => {
            let count = tree.reindex()?;
            output::success(&format!("reindexed {count} nodes"));
        }
    }
    Ok(())
}

fn show_node(node: &Node, full_name: &str, settings: &Settings) {
    output::header(full_name);
    output::detail(&format!("id:                {}", node.id));
    output::detail(&format!("slug:              {}", node.slug));
    output::detail(&format!(
        "parent:            {}",
        node.parent.map_or("-".to_string(), |p| p.to_string())
    ));
    output::detail(&format!("interval:          [{}, {}]", node.left, node.right));
    output::detail(&format!("sequence:          {}", node.sequence));
    output::detail(&format!("display mode:      {}", node.display_mode));
    output::detail(&format!("products per page: {}", node.products_per_page));
    output::detail(&format!("active:            {}", node.active));
    output::detail(&format!("kind:              {}", node.kind));
    output::detail(&format!(
        "address:           {}",
        node.address(1).to_path(&settings.catalog.url_prefix)
    ));
    output::detail(&format!("updated:           {}", node.updated_at.to_rfc3339()));
}

#[instrument(level = "debug", skip(c))]
fn product(c: &ServiceContainer, command: &ProductCommands) -> CliResult<()> {
    let products = &c.products;
    match command {
        ProductCommands::Template { name, inactive } => {
            let t = products.add_template(name, !inactive)?;
            output::action("Template", &format!("#{} {}", t.id, t.name));
        }
        ProductCommands::Variant {
            template,
            code,
            hidden,
        } => {
            let p = products.add_variant(*template, code, !hidden)?;
            output::action(
                "Variant",
                &format!("#{} {} (template #{})", p.id, p.code, p.template),
            );
        }
        ProductCommands::Display { product, displayed } => {
            let p = products.set_displayed(*product, *displayed)?;
            output::action("Variant", &format!("#{} displayed={}", p.id, p.displayed));
        }
        ProductCommands::Activate { template, active } => {
            let t = products.set_template_active(*template, *active)?;
            output::action("Template", &format!("#{} active={}", t.id, t.active));
        }
        ProductCommands::Rm { product } => {
            products.remove_product(*product)?;
            output::action("Deleted", &format!("variant {product}"));
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(c))]
fn link(c: &ServiceContainer, command: &LinkCommands) -> CliResult<()> {
    let links = &c.associations;
    match command {
        LinkCommands::Add {
            node,
            product,
            sequence,
        } => {
            let l = links.link(*node, *product, *sequence)?;
            output::action(
                "Linked",
                &format!("variant {} -> node {} (sequence {})", l.product, l.node, l.sequence),
            );
        }
        LinkCommands::Rm { node, product } => {
            links.unlink(*node, *product)?;
            output::action("Unlinked", &format!("variant {product} from node {node}"));
        }
        LinkCommands::Seq {
            node,
            product,
            sequence,
        } => {
            let l = links.set_sequence(*node, *product, *sequence)?;
            output::action(
                "Linked",
                &format!("variant {} -> node {} (sequence {})", l.product, l.node, l.sequence),
            );
        }
        LinkCommands::Nodes { product } => {
            let nodes = links.nodes_for_product(*product)?;
            if nodes.is_empty() {
                output::warning(&format!("variant {product} is not linked"));
            }
            for node in nodes {
                output::info(&format!("node {node}"));
            }
        }
        LinkCommands::Ls { node } => {
            let rows = links.list_for_node(*node)?;
            if rows.is_empty() {
                output::warning(&format!("node {node} has no linked products"));
            }
            for l in rows {
                output::info(&format!("{:>6}  variant {}", l.sequence, l.product));
            }
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(c))]
fn list(c: &ServiceContainer, node: u64, request: &ListingRequest) -> CliResult<()> {
    let pager = c.listings.products(node, request)?;
    print_page(&pager)
}

fn print_page(pager: &Paginator) -> CliResult<()> {
    let total = pager.count()?;
    let pages = pager.page_count()?;
    debug!(total, pages, "listing");
    output::header(&format!(
        "{} rows ({} mode), page {}/{}",
        total,
        pager.query().mode,
        pager.page(),
        pages.max(1)
    ));
    for row in pager.current_items()? {
        output::info(&format!("{:>6}  {}", row.sequence, row.item));
    }
    Ok(())
}

fn sitemap(c: &ServiceContainer, command: &SitemapCommands) -> CliResult<()> {
    match command {
        SitemapCommands::Index => {
            let index = c.sitemap.index()?;
            output::info(&format!(
                "{} active nodes, {} per page, {} pages",
                index.total_nodes, index.page_size, index.pages
            ));
        }
        SitemapCommands::Page { number } => {
            for entry in c.sitemap.page(*number)? {
                output::info(&format!(
                    "{}  {}  {}",
                    entry.url,
                    entry.lastmod.format("%Y-%m-%d"),
                    entry.changefreq
                ));
            }
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(c))]
fn website(c: &ServiceContainer, command: &WebsiteCommands) -> CliResult<()> {
    let sites = &c.websites;
    match command {
        WebsiteCommands::Add { name } => {
            let site = sites.create(name)?;
            output::action("Website", &format!("#{} {}", site.id, site.name));
        }
        WebsiteCommands::Root {
            website,
            node,
            remove,
        } => {
            let site = if *remove {
                sites.remove_root(*website, *node)?
            } else {
                sites.add_root(*website, *node)?
            };
            output::action("Roots", &format!("{:?}", site.root_nodes));
        }
        WebsiteCommands::Slot {
            website,
            slot,
            node,
        } => {
            sites.set_slot(*website, *slot, *node)?;
            match node {
                Some(n) => output::action("Slot", &format!("{slot} -> node {n}")),
                None => output::action("Slot", &format!("{slot} cleared")),
            }
        }
        WebsiteCommands::Show { website, slot } => match slot {
            Some(slot) => {
                match sites.slot_products(*website, *slot, &ListingRequest::default())? {
                    Some(pager) => print_page(&pager)?,
                    None => output::warning(&format!("slot {slot} is empty")),
                }
            }
            None => {
                let site = sites.get(*website)?;
                output::header(&site.name);
                output::detail(&format!("roots:    {:?}", site.root_nodes));
                output::detail(&format!("featured: {:?}", site.featured));
                output::detail(&format!("latest:   {:?}", site.latest));
                output::detail(&format!("upcoming: {:?}", site.upcoming));
            }
        },
    }
    Ok(())
}

fn config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::detail(&format!("global: {}", p.display())),
                None => output::detail(&"global: (no config directory)"),
            }
            output::detail(&format!(
                "local:  {}",
                local_config_path(&settings.base_dir).display()
            ));
            output::detail(&format!("store:  {}", settings.store_path().display()));
        }
    }
    Ok(())
}
