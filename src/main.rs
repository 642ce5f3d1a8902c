use std::process;

use petprobe::config::Config;

fn main() {
    // Print the banner before anything else.
    let banner = include_str!("../banner");
    println!("{}", banner);

    let config = Config::build_config().unwrap_or_else(|err| {
        eprintln!("Error building config: {}", err);
        process::exit(1);
    });

    petprobe::logging::init(config.verbose);

    // Assemble the selected suite and run it.
    let report = petprobe::exec(&config).unwrap_or_else(|err| {
        eprintln!("Error executing test cases: {:#}", err);
        process::exit(1);
    });

    report.print(config.verbose);

    if !report.all_passed() {
        process::exit(1);
    }
}
