use clap::{Arg, ArgMatches, Command};
use std::fs;
use std::process;

use pkgmeta_rs::metadata;
use pkgmeta_rs::pkginfo::PkgInfo;

fn main() {
    let app = create_app();
    let matches = app.get_matches();

    if matches.get_flag("verbose") {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    let result = run_pkgmeta(matches);
    process::exit(result);
}

fn create_app() -> Command {
    Command::new("pkgmeta")
        .version("0.1.0")
        .about("Convert PKG-INFO metadata to the Metadata 2.0 format")
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Verbose output")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("requires")
                .long("requires")
                .short('r')
                .help("Rewrite the header block using this requires.txt listing")
                .value_name("FILE"),
        )
        .arg(
            Arg::new("path")
                .help("Path to the PKG-INFO file")
                .required(true),
        )
}

fn run_pkgmeta(matches: ArgMatches) -> i32 {
    let path = matches
        .get_one::<String>("path")
        .expect("path is required");

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("pkgmeta: cannot read {}: {}", path, e);
            return 1;
        }
    };

    let mut pkg_info = match PkgInfo::parse(&data) {
        Ok(pkg_info) => pkg_info,
        Err(e) => {
            eprintln!("pkgmeta: {}: {}", path, e);
            return 1;
        }
    };

    if let Some(requires_path) = matches.get_one::<String>("requires") {
        let requires = match fs::read_to_string(requires_path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("pkgmeta: cannot read {}: {}", requires_path, e);
                return 1;
            }
        };
        if let Err(e) = metadata::pkginfo_to_metadata(&mut pkg_info, Some(&requires)) {
            eprintln!("pkgmeta: {}", e);
            return 1;
        }
        print!("{}", String::from_utf8_lossy(&pkg_info.render()));
        return 0;
    }

    let document = metadata::pkginfo_to_dict(&pkg_info, None);
    match serde_json::to_string_pretty(&document) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("pkgmeta: {}", e);
            1
        }
    }
}
