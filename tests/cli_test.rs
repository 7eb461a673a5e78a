//! End-to-end command dispatch against a file-backed catalog.

use clap::Parser;
use rstest::rstest;
use tempfile::TempDir;

use catalog_tree::cli::{execute, Cli};
use catalog_tree::config::Settings;
use catalog_tree::exitcode;
use catalog_tree::infrastructure::di::ServiceContainer;
use catalog_tree::util::testing::init_test_setup;

fn container(dir: &TempDir) -> ServiceContainer {
    init_test_setup();
    ServiceContainer::new(Settings {
        base_dir: dir.path().to_path_buf(),
        ..Settings::default()
    })
}

fn run(c: &ServiceContainer, args: &[&str]) -> Result<(), i32> {
    let cli = Cli::try_parse_from(std::iter::once("ctree").chain(args.iter().copied()))
        .map_err(|_| exitcode::USAGE)?;
    execute(&cli, c).map_err(|e| e.exit_code())
}

#[test]
fn given_command_sequence_when_executing_then_catalog_is_built() {
    let dir = TempDir::new().unwrap();
    let c = container(&dir);

    for args in [
        vec!["node", "add", "Men"],
        vec!["node", "add", "Shoes", "--parent", "1", "--per-page", "5"],
        vec!["product", "template", "Sneaker"],
        vec!["product", "variant", "1", "SNK-42"],
        vec!["link", "add", "2", "1", "--sequence", "3"],
        vec!["link", "seq", "2", "1", "7"],
        vec!["link", "nodes", "1"],
        vec!["node", "contains", "1", "2"],
        vec!["website", "add", "shop"],
        vec!["website", "root", "1", "1"],
        vec!["website", "root", "1", "1", "--remove"],
        vec!["list", "1", "--mode", "template"],
        vec!["node", "tree"],
        vec!["node", "breadcrumb", "2"],
        vec!["sitemap", "page", "1"],
        vec!["node", "check"],
    ] {
        assert_eq!(run(&c, &args), Ok(()), "ctree {}", args.join(" "));
    }

    let shoes = c.hierarchy.get_node(2).unwrap();
    assert_eq!(shoes.slug, "men-shoes");
    assert_eq!(shoes.products_per_page, 5);
    assert_eq!(c.associations.list_for_node(2).unwrap()[0].sequence, 7);
    assert!(c.websites.get(1).unwrap().root_nodes.is_empty());
}

#[test]
fn given_website_root_when_nesting_it_from_cli_then_data_error() {
    let dir = TempDir::new().unwrap();
    let c = container(&dir);
    for args in [
        vec!["node", "add", "Shop"],
        vec!["node", "add", "Other"],
        vec!["website", "add", "shop"],
        vec!["website", "root", "1", "1"],
    ] {
        run(&c, &args).unwrap();
    }

    assert_eq!(run(&c, &["node", "move", "1", "--parent", "2"]), Err(exitcode::DATAERR));
    assert_eq!(c.hierarchy.get_node(1).unwrap().parent, None);
}

#[rstest]
#[case::cycle(&["node", "move", "1", "--parent", "2"], exitcode::DATAERR)]
#[case::missing_node(&["node", "show", "9"], exitcode::NOINPUT)]
#[case::bad_page_size(&["list", "1", "--per-page", "0"], exitcode::DATAERR)]
#[case::has_children(&["node", "rm", "1"], exitcode::DATAERR)]
#[case::missing_link(&["link", "rm", "1", "1"], exitcode::NOINPUT)]
#[case::missing_link_sequence(&["link", "seq", "1", "1", "4"], exitcode::NOINPUT)]
#[case::no_command(&[], exitcode::USAGE)]
fn given_failing_command_when_executing_then_exit_code_matches(
    #[case] args: &[&str],
    #[case] code: i32,
) {
    let dir = TempDir::new().unwrap();
    let c = container(&dir);
    run(&c, &["node", "add", "Root"]).unwrap();
    run(&c, &["node", "add", "Child", "--parent", "1"]).unwrap();
    run(&c, &["product", "template", "T"]).unwrap();
    run(&c, &["product", "variant", "1", "V"]).unwrap();

    assert_eq!(run(&c, args), Err(code));
}
