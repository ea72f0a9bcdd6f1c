pub mod analysis;
pub mod builder;
pub mod cli;
pub mod config;
pub mod mappers;
pub mod names;
pub mod schema;
pub mod usage;
pub mod wrap;

fn main() -> anyhow::Result<()> {
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
