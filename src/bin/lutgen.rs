use lutgen::{LutConfig, LutGenerator};

use flexi_logger::{Logger, opt_format};
use log::{error, info};

use std::path::Path;
use std::process;

/// Generate the lookup table header.
///
/// Takes an optional JSON config file as only argument. Without it, the
/// default settings are used. Set RUST_LOG to change the log level.
fn main () {
    let logger = Logger::with_env_or_str("lutgen=info")
                        .format(opt_format)
                        .start();
    if let Err(e) = logger {
        eprintln!("Unable to start logger: {}", e);
    }

    let config = match std::env::args().nth(1) {
        Some(filename) => LutConfig::load(Path::new(&filename)),
        None => Ok(LutConfig::default()),
    };

    let result = config.and_then(|c| LutGenerator::new(c).run());
    match result {
        Ok(summary) => {
            info!("Wrote {} tables with {} samples to [{}]",
                summary.num_tables, summary.resolution, summary.header.display());
            for plot in summary.plots.iter() {
                info!("Plot: [{}]", plot.display());
            }
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("lutgen failed: {}", e);
            process::exit(1);
        }
    }
}
