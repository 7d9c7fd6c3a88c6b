use std::io::Write;

use anyhow::Result;
use clap::{Arg, ArgAction};
use cliframe::{Application, Invocation};

pub fn spec() -> Application {
    Application::new("ls")
        .about("List directory contents")
        .with_logging()
        .with_completion()
        .param(
            Arg::new("long")
                .short('l')
                .long("long")
                .help("Use a long listing format")
                .action(ArgAction::SetTrue),
        )
        .param(
            Arg::new("all")
                .short('a')
                .long("all")
                .help("Do not ignore entries starting with .")
                .action(ArgAction::SetTrue),
        )
        .param(
            Arg::new("sort")
                .long("sort")
                .help("Sort by WORD instead of name")
                .value_name("WORD"),
        )
        .param(Arg::new("files").num_args(0..).value_name("FILE"))
        .main(action)
}

fn action(app: &mut Invocation<'_>) -> Result<()> {
    let files: Vec<&String> = app
        .params
        .get_many::<String>("files")
        .map(|values| values.collect())
        .unwrap_or_default();

    writeln!(
        app.out,
        "running {} with: long={} all={} sort={} files={:?}",
        app.name,
        app.params.get_flag("long"),
        app.params.get_flag("all"),
        app.params
            .get_one::<String>("sort")
            .map(String::as_str)
            .unwrap_or("name"),
        files
    )?;
    Ok(())
}
