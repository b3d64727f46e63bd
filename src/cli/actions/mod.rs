pub mod server;

use crate::cli::commands::gate::Options;

/// Action to perform after argument parsing
#[derive(Debug)]
pub enum Action {
    Server { port: u16, options: Options },
}
