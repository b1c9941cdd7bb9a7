// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

fn name_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).required(true).help(help)
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn report_json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output the teardown report as JSON")
}

fn suffix_arg() -> Arg {
    Arg::new("suffix")
        .short('s')
        .long("suffix")
        .help("Snapshot suffix (default: today's date)")
}

fn build_cli() -> Command {
    Command::new("aptlyctl")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Manage aptly repositories, snapshots and publications")
        .subcommand_required(true)
        .arg(Arg::new("config").long("config").value_name("FILE").help("Configuration file"))
        .arg(Arg::new("aptly_bin").long("aptly-bin").value_name("BIN").help("aptly binary to run"))
        .arg(
            Arg::new("aptly_config")
                .long("aptly-config")
                .value_name("FILE")
                .help("aptly configuration file, passed as -config="),
        )
        .arg(
            Arg::new("dry_run")
                .short('n')
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print mutating aptly commands instead of running them"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v info, -vv debug)"),
        )
        .subcommand(
            Command::new("repo")
                .about("Local repository management")
                .subcommand(
                    Command::new("create")
                        .about("Create a local repository named base-arch-component")
                        .arg(name_arg("name", "Repository name"))
                        .arg(
                            Arg::new("architectures")
                                .short('a')
                                .long("architectures")
                                .value_delimiter(',')
                                .help("Architectures to accept"),
                        ),
                )
                .subcommand(
                    Command::new("drop")
                        .about("Drop a local repository")
                        .arg(name_arg("name", "Repository name"))
                        .arg(
                            Arg::new("force")
                                .short('f')
                                .long("force")
                                .action(ArgAction::SetTrue)
                                .help("Drop even if snapshots were taken from it or it is published"),
                        ),
                )
                .subcommand(
                    Command::new("add")
                        .about("Add package files or directories to a repository")
                        .arg(name_arg("name", "Repository name"))
                        .arg(Arg::new("files").required(true).num_args(1..).help("Package files or directories"))
                        .arg(
                            Arg::new("remove_files")
                                .short('r')
                                .long("remove-files")
                                .action(ArgAction::SetTrue)
                                .help("Remove the files once they have been imported"),
                        ),
                )
                .subcommand(Command::new("list").about("List local repositories").arg(json_arg())),
        )
        .subcommand(
            Command::new("snapshot")
                .about("Snapshot management")
                .subcommand(
                    Command::new("create")
                        .about("Snapshot a repository as <repo>-<suffix>")
                        .arg(name_arg("repo", "Repository name"))
                        .arg(suffix_arg()),
                )
                .subcommand(
                    Command::new("merge")
                        .about("Merge snapshots into a new snapshot")
                        .arg(name_arg("dest", "Name of the merged snapshot"))
                        .arg(Arg::new("sources").num_args(0..).help("Source snapshots, in merge order"))
                        .arg(
                            Arg::new("latest")
                                .long("latest")
                                .action(ArgAction::SetTrue)
                                .help("Keep only the latest version of each package"),
                        ),
                )
                .subcommand(
                    Command::new("drop")
                        .about("Drop a snapshot")
                        .arg(name_arg("name", "Snapshot name"))
                        .arg(
                            Arg::new("force")
                                .short('f')
                                .long("force")
                                .action(ArgAction::SetTrue)
                                .help("Drop even if other snapshots were merged from it"),
                        ),
                )
                .subcommand(
                    Command::new("list")
                        .about("List snapshots")
                        .arg(Arg::new("repo").long("repo").help("Only snapshots taken from this repository"))
                        .arg(json_arg()),
                ),
        )
        .subcommand(
            Command::new("multiarch")
                .about("Multi-architecture snapshot management")
                .subcommand(
                    Command::new("create")
                        .about("Snapshot per-arch repositories and merge them as base-component-suffix")
                        .arg(Arg::new("repos").required(true).num_args(1..).help("Per-arch repositories"))
                        .arg(suffix_arg()),
                )
                .subcommand(
                    Command::new("drop")
                        .about("Drop a unified snapshot and its per-arch constituents")
                        .arg(name_arg("name", "Unified snapshot name"))
                        .arg(report_json_arg()),
                ),
        )
        .subcommand(
            Command::new("publish")
                .about("Publication management")
                .subcommand(
                    Command::new("create")
                        .about("Publish snapshots, one component per snapshot")
                        .arg(Arg::new("snapshots").required(true).num_args(1..).help("Snapshots to publish"))
                        .arg(
                            Arg::new("prefix")
                                .short('p')
                                .long("prefix")
                                .value_name("PREFIX[/DIST]")
                                .help("Publication prefix, or prefix/distribution"),
                        ),
                )
                .subcommand(
                    Command::new("drop")
                        .about("Drop a publication")
                        .arg(name_arg("publication", "Publication (prefix/distribution)"))
                        .arg(
                            Arg::new("all")
                                .short('a')
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Also drop the snapshots backing the publication"),
                        )
                        .arg(report_json_arg()),
                )
                .subcommand(
                    Command::new("list")
                        .about("List publications")
                        .arg(Arg::new("names").num_args(0..).help("Only publications that mention every name"))
                        .arg(json_arg()),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show the snapshots backing a publication")
                        .arg(name_arg("publication", "Publication (prefix/distribution)")),
                ),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completions")
                .arg(
                    Arg::new("shell")
                        .required(true)
                        .value_parser(["bash", "zsh", "fish", "powershell", "elvish"])
                        .help("Shell to generate completions for"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let out_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let man_dir = out_dir.join("man");
    fs::create_dir_all(&man_dir).expect("Failed to create man directory");

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();
    man.render(&mut buffer).expect("Failed to render man page");

    let man_path = man_dir.join("aptlyctl.1");
    fs::write(&man_path, buffer).expect("Failed to write man page");
}
