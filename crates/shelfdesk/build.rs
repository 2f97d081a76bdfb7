//! Renders man pages and shell completion scripts into `OUT_DIR` so
//! packagers can pick them up from `target/*/build/shelfdesk-*/out`.

use std::fs;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::Shell;

#[path = "src/cli.rs"]
mod cli;

const SHELLS: [Shell; 3] = [Shell::Bash, Shell::Zsh, Shell::Fish];

fn main() {
    println!("cargo::rerun-if-changed=src/cli.rs");

    let Some(out_dir) = std::env::var_os("OUT_DIR") else {
        panic!("OUT_DIR not set by Cargo");
    };
    let out_dir = Path::new(&out_dir);

    let man_dir = out_dir.join("man");
    let completion_dir = out_dir.join("completions");
    for dir in [&man_dir, &completion_dir] {
        fs::create_dir_all(dir)
            .unwrap_or_else(|e| panic!("failed to create {}: {e}", dir.display()));
    }

    let mut cmd = cli::Cli::command();
    write_manpages(&cmd, &man_dir);

    for shell in SHELLS {
        clap_complete::generate_to(shell, &mut cmd, "shelfdesk", &completion_dir)
            .unwrap_or_else(|e| panic!("failed to write {shell} completions: {e}"));
    }
}

/// One page per command: `shelfdesk.1`, `shelfdesk-books.1`,
/// `shelfdesk-books-borrow.1`, ...
fn write_manpages(root: &clap::Command, dir: &Path) {
    let mut pending = vec![root.clone()];
    while let Some(cmd) = pending.pop() {
        let name = cmd.get_name().to_owned();
        for sub in cmd.get_subcommands().filter(|s| !s.is_hide_set()) {
            pending.push(sub.clone().name(format!("{name}-{}", sub.get_name())));
        }

        let mut page = Vec::new();
        clap_mangen::Man::new(cmd)
            .render(&mut page)
            .unwrap_or_else(|e| panic!("failed to render man page for `{name}`: {e}"));
        let path = dir.join(format!("{name}.1"));
        fs::write(&path, page).unwrap_or_else(|e| panic!("failed to write {}: {e}", path.display()));
    }
}
