// ABOUTME: Entry point for the keyward CLI.
// ABOUTME: Parses flags, sets up logging, and dispatches to the key manager.

use anyhow::Result;
use clap::Parser;
use keyward_cli::{default_prompter, dispatch, normalize_args, resolve_settings, Cli};
use keyward_ssh::{KeyManager, SshKeygen};

fn main() -> Result<()> {
    let cli = Cli::parse_from(normalize_args(std::env::args_os()));
    keyward_log::init(cli.verbose);

    let settings = resolve_settings(cli.ssh_dir.clone())?;
    tracing::debug!(ssh_dir = %settings.ssh_dir.display(), "resolved settings");

    let keygen = SshKeygen::new(settings.keygen_program.clone());
    let mut manager = KeyManager::new(settings, keygen, default_prompter());

    dispatch(cli.mode(), &mut manager)
}
