mod commands;

use cliframe::InteractiveShell;

use crate::commands::{ls, lsof, sh};

fn main() {
    let version = env!("CARGO_PKG_VERSION");

    let mut shell = InteractiveShell::new("cliframe").history(true);
    shell.add_command(ls::spec().version(version));
    shell.add_command(lsof::spec());
    shell.add_command(sh::spec());
    shell.alias("dir", "ls");

    shell.run_and_exit()
}
