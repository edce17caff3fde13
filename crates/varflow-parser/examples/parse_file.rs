use std::env;
use varflow_parser::parse_file;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <file.vf>", args[0]);
        std::process::exit(1);
    }

    let filename = &args[1];

    match parse_file(filename) {
        Ok(module) => {
            let defined = module.defined_routines().count();
            println!(
                "{} parsed: {} routines ({} with bodies), {} globals",
                filename,
                module.routines.len(),
                defined,
                module.globals.len()
            );
        }
        Err(e) => {
            eprintln!("{}: {}", filename, e);
            std::process::exit(1);
        }
    }
}
