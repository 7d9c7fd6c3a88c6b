use std::io::{self, Write};
use std::process::Command;

use anyhow::{Context, Result};
use clap::Arg;
use cliframe::{Abort, Application, Invocation};

pub fn spec() -> Application {
    Application::new("sh")
        .about("Run the given arguments as a command in the shell")
        .param(
            Arg::new("command")
                .help("The command to pass to the shell")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
        .main(action)
}

fn action(app: &mut Invocation<'_>) -> Result<()> {
    let command: Vec<&str> = app
        .params
        .get_many::<String>("command")
        .map(|values| values.map(String::as_str).collect())
        .unwrap_or_default();
    if command.is_empty() {
        return Ok(());
    }

    let output = Command::new("sh")
        .arg("-c")
        .arg(command.join(" "))
        .output()
        .context("Failed to start sh")?;
    app.out.write_all(&output.stdout)?;
    io::stderr().write_all(&output.stderr)?;

    if !output.status.success() {
        return Err(Abort::new(output.status.code().unwrap_or(1)).into());
    }
    Ok(())
}
