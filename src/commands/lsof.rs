use std::io::Write;

use anyhow::Result;
use clap::{Arg, ArgAction};
use cliframe::{Application, Invocation};

pub fn spec() -> Application {
    Application::new("lsof")
        .about("List open files")
        .param(
            Arg::new("and")
                .short('a')
                .help("Causes list selection options to be ANDed")
                .action(ArgAction::SetTrue),
        )
        .param(
            Arg::new("no-block")
                .short('b')
                .help("Avoid kernel functions that might block - lstat(2), readlink(2), and stat(2)")
                .action(ArgAction::SetTrue),
        )
        .main(action)
}

fn action(app: &mut Invocation<'_>) -> Result<()> {
    writeln!(
        app.out,
        "running {} with: and={} no-block={}",
        app.name,
        app.params.get_flag("and"),
        app.params.get_flag("no-block")
    )?;
    Ok(())
}
