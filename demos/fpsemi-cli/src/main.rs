//! A thin command-line front end over `fpsemi-kernel`: reads a
//! presentation file and runs either Knuth-Bendix completion or
//! Todd-Coxeter coset enumeration over it, printing the resulting size
//! (or class count) and, optionally, a handful of normal forms.

use std::env;
use std::fs;
use std::process;

use getopts::Options;

use fpsemi_kernel::{CongruenceSide, KnuthBendixCore, StandardOrder, ToddCoxeterCore};
use fpsemi_types::{Alphabet, Word};

fn usage(prog: &str, opts: &Options) {
    let brief = format!("Usage: {} [options] PRESENTATION-FILE", prog);
    print!("{}", opts.usage(&brief));
}

/// One relation or pair, each side a whitespace-separated list of letter
/// indices, e.g. `0 0 = 0`.
struct Presentation {
    nr_generators: usize,
    identity: Option<u32>,
    relations: Vec<(Vec<u32>, Vec<u32>)>,
}

fn parse_presentation(text: &str) -> Result<Presentation, String> {
    let mut nr_generators = None;
    let mut identity = None;
    let mut relations = Vec::new();

    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut words = line.split_whitespace();
        match words.next() {
            Some("alphabet") => {
                let n: usize = words
                    .next()
                    .ok_or_else(|| format!("line {}: alphabet needs a size", lineno + 1))?
                    .parse()
                    .map_err(|_| format!("line {}: alphabet size must be an integer", lineno + 1))?;
                nr_generators = Some(n);
            }
            Some("identity") => {
                let c: u32 = words
                    .next()
                    .ok_or_else(|| format!("line {}: identity needs a letter", lineno + 1))?
                    .parse()
                    .map_err(|_| format!("line {}: identity letter must be an integer", lineno + 1))?;
                identity = Some(c);
            }
            Some("rule") => {
                let rest: Vec<&str> = words.collect();
                let eq = rest
                    .iter()
                    .position(|&t| t == "=")
                    .ok_or_else(|| format!("line {}: rule needs an `=`", lineno + 1))?;
                let parse_side = |side: &[&str]| -> Result<Vec<u32>, String> {
                    side.iter()
                        .map(|t| t.parse::<u32>().map_err(|_| format!("line {}: bad letter `{}`", lineno + 1, t)))
                        .collect()
                };
                relations.push((parse_side(&rest[..eq])?, parse_side(&rest[eq + 1..])?));
            }
            Some(other) => return Err(format!("line {}: unrecognized directive `{}`", lineno + 1, other)),
            None => {}
        }
    }

    let nr_generators = nr_generators.ok_or("missing `alphabet N` directive")?;
    Ok(Presentation {
        nr_generators,
        identity,
        relations,
    })
}

fn run_knuth_bendix(p: &Presentation) {
    log::info!("running knuth-bendix over {} relations", p.relations.len());
    let alphabet = Alphabet::of_size(p.nr_generators).expect("alphabet size validated by the parser");
    let mut kb = KnuthBendixCore::new(alphabet);
    if let Some(c) = p.identity {
        kb.set_identity(fpsemi_types::idx::Letter::from(c));
    }
    for (l, r) in &p.relations {
        kb.add_rule(Word::from_u32s(l), Word::from_u32s(r));
    }
    kb.knuth_bendix();
    log::info!("completion finished with {} active rules", kb.nr_active_rules());
    println!("confluent: {}", kb.confluent());
    match kb.size() {
        Some(n) => println!("size: {}", n),
        None => println!("size: unknown (not confluent)"),
    }
}

fn run_todd_coxeter(p: &Presentation) {
    log::info!("running todd-coxeter over {} pairs", p.relations.len());
    let mut tc = ToddCoxeterCore::new(p.nr_generators, CongruenceSide::TwoSided);
    for (l, r) in &p.relations {
        tc.add_pair(Word::from_u32s(l), Word::from_u32s(r))
            .expect("presentation parsed before any run started");
    }
    tc.hlt();
    tc.standardize(StandardOrder::ShortLex);
    println!("nr_classes: {}", tc.nr_classes());
}

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();
    let prog = args[0].clone();

    let mut opts = Options::new();
    opts.optflag("h", "help", "print this help message");
    opts.optopt("s", "strategy", "kb (Knuth-Bendix) or tc (Todd-Coxeter); default kb", "STRATEGY");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            usage(&prog, &opts);
            process::exit(2);
        }
    };

    if matches.opt_present("h") || matches.free.is_empty() {
        usage(&prog, &opts);
        process::exit(if matches.opt_present("h") { 0 } else { 2 });
    }

    let path = &matches.free[0];
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            process::exit(1);
        }
    };

    let presentation = match parse_presentation(&text) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}: {}", path, e);
            process::exit(1);
        }
    };

    match matches.opt_str("s").as_deref() {
        Some("tc") => run_todd_coxeter(&presentation),
        Some("kb") | None => run_knuth_bendix(&presentation),
        Some(other) => {
            eprintln!("unknown strategy `{}` (expected kb or tc)", other);
            process::exit(2);
        }
    }
}
