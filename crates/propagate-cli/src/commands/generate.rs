use crate::cli::Cli;
use crate::config::Settings;
use crate::support::{
    load_config_or_exit, load_store_or_exit, package_or_exit, print_json_or_exit,
    read_text_or_exit, sha256_hex,
};
use propagate_kernel::{propagate_interfaces, split_capability_list};
use serde_json::json;
use tracing::info;

pub fn run(cli: Cli) {
    let file_config = load_config_or_exit(cli.config.as_deref());
    let settings = Settings::resolve(&cli, file_config);
    let store = load_store_or_exit(&settings.meta);
    let package = package_or_exit(&store, &cli.package);
    let interfaces = split_capability_list(&cli.interfaces);

    let generated = propagate_interfaces(
        &package,
        &store,
        &cli.selector,
        &interfaces,
        &settings.options,
    )
    .unwrap_or_else(|e| {
        eprintln!("error: {e}");
        std::process::exit(1);
    });

    let up_to_date = cli.check.as_deref().map(|path| {
        let existing = read_text_or_exit(path);
        let fresh = existing == generated.source;
        info!(path, up_to_date = fresh, "compared generated output");
        fresh
    });

    if cli.json {
        let aliases: Vec<_> = generated
            .aliases
            .iter()
            .map(|alias| {
                json!({
                    "name": alias.name,
                    "target": alias.target.display_name(),
                })
            })
            .collect();
        let payload = json!({
            "package": package.path,
            "struct": cli.selector,
            "function": settings.options.dispatch_name,
            "base": generated.base,
            "interfaces": generated.capabilities,
            "aliases": aliases,
            "branches": generated.branches,
            "forwarded": generated.forwarded,
            "overridden": generated.overridden,
            "sha256": sha256_hex(&generated.source),
            "up_to_date": up_to_date,
            "source": generated.source,
        });
        print_json_or_exit(&payload);
    } else if up_to_date.is_none() {
        print!("{}", generated.source);
    }

    if let (Some(path), Some(false)) = (cli.check.as_deref(), up_to_date) {
        eprintln!("error: {path} is stale; regenerate it");
        std::process::exit(1);
    }
}
