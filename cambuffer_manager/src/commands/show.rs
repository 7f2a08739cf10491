//! Print the launch descriptor the way a supervisor would receive it

use anyhow::Result;
use cambuffer_core::launch::{launch_with, LaunchDescriptor, Supervisor};
use cambuffer_core::CambufferResult;
use clap::ValueEnum;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

/// Stands in for the supervisor: takes the descriptor and writes it out
pub struct PrintSupervisor<W: Write> {
    format: Format,
    out: W,
}

impl<W: Write> PrintSupervisor<W> {
    pub fn new(format: Format, out: W) -> Self {
        Self { format, out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Supervisor for PrintSupervisor<W> {
    fn launch(&mut self, descriptor: LaunchDescriptor) -> CambufferResult<()> {
        let text = match self.format {
            Format::Json => descriptor.to_json_pretty()?,
            Format::Yaml => descriptor.to_yaml()?,
        };
        writeln!(self.out, "{}", text.trim_end())?;
        Ok(())
    }
}

pub fn run_show(descriptor: LaunchDescriptor, format: Format) -> Result<()> {
    let stdout = std::io::stdout();
    let mut supervisor = PrintSupervisor::new(format, stdout.lock());
    launch_with(&mut supervisor, || descriptor)?;
    Ok(())
}
