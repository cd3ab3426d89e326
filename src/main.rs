use std::env;
use std::fs;
use std::path::Path;
use std::process;

use facheck::core::nfa::Nfa;
use facheck::core::{antichain, format, relation, simulation};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: facheck <command> [args]

Commands:
  print <files...>                         load and re-emit each automaton
  universal <files...> [--simulation | --identity]
                                           decide universality per file
  inclusion <fileA> <fileB> [--simulation | --identity]
                                           decide language inclusion
  simulation <files...>                    print the maximal simulation matrix
  all_final <dir> <files...>               copy files with every state final

The trace level is controlled via the RUST_LOG environment variable.";

/// Subsumption quasi-order selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Subsumption {
    Simulation,
    Identity,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(message) = run(&args) {
        eprintln!("{message}");
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let Some((command, rest)) = args.split_first() else {
        return Err(USAGE.to_owned());
    };
    match command.as_str() {
        "print" => cmd_print(rest),
        "universal" => cmd_universal(rest),
        "inclusion" => cmd_inclusion(rest),
        "simulation" => cmd_simulation(rest),
        "all_final" => cmd_all_final(rest),
        unknown => Err(format!("unknown command `{unknown}`\n\n{USAGE}")),
    }
}

fn cmd_print(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err(USAGE.to_owned());
    }
    for path in args {
        let nfa = load(path)?;
        print!("{nfa}");
    }
    Ok(())
}

fn cmd_universal(args: &[String]) -> Result<(), String> {
    let (files, mode) = split_mode(args)?;
    if files.is_empty() {
        return Err(USAGE.to_owned());
    }
    for path in files {
        let mut nfa = load(path)?;
        nfa.prune();
        let subsumption = match mode {
            Subsumption::Simulation => simulation::maximal(&nfa),
            Subsumption::Identity => simulation::identity(&nfa),
        };
        let verdict = antichain::is_universal(&nfa, &subsumption);
        println!(
            "{path}: {}",
            if verdict { "universal" } else { "not universal" }
        );
    }
    Ok(())
}

fn cmd_inclusion(args: &[String]) -> Result<(), String> {
    let (files, mode) = split_mode(args)?;
    let &[left_path, right_path] = files.as_slice() else {
        return Err(USAGE.to_owned());
    };

    let mut left = load(left_path)?;
    let mut right = load(right_path)?;
    left.prune();
    right.prune();

    let union = left.union(&right);
    let subsumption = match mode {
        Subsumption::Simulation => simulation::maximal(&union),
        Subsumption::Identity => simulation::identity(&union),
    };
    let verdict = antichain::is_included(&left, &right, &subsumption);
    println!("included: {verdict}");
    Ok(())
}

fn cmd_simulation(args: &[String]) -> Result<(), String> {
    if args.is_empty() {
        return Err(USAGE.to_owned());
    }
    for path in args {
        let nfa = load(path)?;
        let maximal = simulation::maximal(&nfa);
        println!("{path}:");
        print!("{}", relation::render(&maximal, &nfa));
    }
    Ok(())
}

fn cmd_all_final(args: &[String]) -> Result<(), String> {
    let Some((dir, files)) = args.split_first() else {
        return Err(USAGE.to_owned());
    };
    if files.is_empty() {
        return Err(USAGE.to_owned());
    }
    fs::create_dir_all(dir).map_err(|err| format!("{dir}: {err}"))?;

    for path in files {
        let mut nfa = load(path)?;
        let names: Vec<String> = nfa
            .states()
            .filter_map(|id| nfa.state_name(id).map(str::to_owned))
            .collect();
        for name in &names {
            nfa.mark_final(name);
        }

        let file_name = Path::new(path)
            .file_name()
            .ok_or_else(|| format!("{path}: not a file path"))?;
        let target = Path::new(dir).join(file_name);
        fs::write(&target, nfa.to_string())
            .map_err(|err| format!("{}: {err}", target.display()))?;
    }
    Ok(())
}

/// Splits the trailing subsumption flag off the file arguments. The
/// simulation preorder is the default.
fn split_mode(args: &[String]) -> Result<(Vec<&String>, Subsumption), String> {
    let mut mode = Subsumption::Simulation;
    let mut files = Vec::new();
    for arg in args {
        match arg.as_str() {
            "--simulation" => mode = Subsumption::Simulation,
            "--identity" => mode = Subsumption::Identity,
            flag if flag.starts_with("--") => {
                return Err(format!("unknown flag `{flag}`\n\n{USAGE}"));
            }
            _ => files.push(arg),
        }
    }
    Ok((files, mode))
}

fn load(path: &str) -> Result<Nfa, String> {
    let text = fs::read_to_string(path).map_err(|err| format!("{path}: {err}"))?;
    format::parse(&text).map_err(|err| format!("{path}: {err}"))
}
